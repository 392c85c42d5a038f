//! Semantic unit — the atom of dialogue progression.
//!
//! Units are produced by the segmenter and never mutated afterwards; the
//! state machine walks them by `position`.

use serde::{Deserialize, Serialize};

/// The coarse document section a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Introduction,
    Body,
    Methodology,
    Conclusion,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Introduction => "introduction",
            SectionKind::Body => "body",
            SectionKind::Methodology => "methodology",
            SectionKind::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cohesive chunk of document content.
///
/// Invariants (upheld by the segmenter):
/// - `positions` form `[0, N)` without gaps for one document
/// - `id` is a deterministic function of section and group index
/// - `text` is non-empty, `word_count >= 1`, `cohesion` in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticUnit {
    /// Stable id, unique within the document (e.g. "S0_1")
    pub id: String,

    /// Section heading, if the parent section had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The unit's content: paragraphs joined by blank lines
    pub text: String,

    /// Which kind of section the unit came from
    pub section_kind: SectionKind,

    /// Zero-based order in the document
    pub position: usize,

    /// Average pairwise similarity of the unit's paragraphs (1.0 for singletons)
    pub cohesion: f32,

    /// Total whitespace-separated words across the unit's paragraphs
    pub word_count: usize,

    /// Free-form enrichment (paragraph_count, complexity markers, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SemanticUnit {
    /// Read a string-valued metadata key, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}
