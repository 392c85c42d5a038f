//! Closed set of interruption intents.
//!
//! Variant declaration order is the tie-break priority: when two intents
//! collect the same number of pattern matches, the earlier variant wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Clarification,
    Objection,
    ExampleRequest,
    DepthRequest,
    SummaryRequest,
    TopicPivot,
    /// No pattern family matched.
    Other,
}

impl Intent {
    /// All intents in tie-break priority order (highest first).
    pub const PRIORITY: [Intent; 7] = [
        Intent::Clarification,
        Intent::Objection,
        Intent::ExampleRequest,
        Intent::DepthRequest,
        Intent::SummaryRequest,
        Intent::TopicPivot,
        Intent::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Intent::Clarification => "clarification",
            Intent::Objection => "objection",
            Intent::ExampleRequest => "example_request",
            Intent::DepthRequest => "depth_request",
            Intent::SummaryRequest => "summary_request",
            Intent::TopicPivot => "topic_pivot",
            Intent::Other => "other",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
