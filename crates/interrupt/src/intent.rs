//! Keyword-pattern intent classification for user interruptions.
//!
//! Best-effort by design: fixed regex families per intent, no learned
//! components. Confidence is the winning family's share of all pattern
//! matches, so a message that clearly signals one intent scores high even
//! when it trips only a couple of that family's patterns.

use regex_lite::Regex;
use roleweave_core::Intent;
use std::collections::BTreeMap;
use tracing::debug;

/// Classification result for one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentClassification {
    pub intent: Intent,

    /// Winning family's share of all matches, in [0, 1]; 0.0 when nothing
    /// matched.
    pub confidence: f64,

    /// Matching-pattern count per intent, for diagnostics.
    pub matches: BTreeMap<Intent, usize>,
}

/// Classifies interruption messages into the closed intent set.
///
/// Patterns are compiled once at construction; classification itself is
/// pure and allocation-light.
pub struct IntentClassifier {
    families: Vec<(Intent, Vec<Regex>)>,
}

impl IntentClassifier {
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("static pattern"))
                .collect()
        };

        // Families in tie-break priority order
        let families = vec![
            (
                Intent::Clarification,
                compile(&[
                    r"explain.*more",
                    r"don'?t understand",
                    r"clarify",
                    r"what.*mean",
                    r"simpler",
                    r"confused",
                ]),
            ),
            (
                Intent::Objection,
                compile(&[
                    r"disagree",
                    r"doesn'?t (sound|seem) right",
                    r"but.*what if",
                    r"wrong",
                    r"incorrect",
                ]),
            ),
            (
                Intent::ExampleRequest,
                compile(&[
                    r"example",
                    r"concrete",
                    r"real.*world",
                    r"illustrate",
                    r"instance",
                    r"demonstrate",
                ]),
            ),
            (
                Intent::DepthRequest,
                compile(&[
                    r"deeper",
                    r"tell.*more",
                    r"elaborate",
                    r"more.*detail",
                    r"expand on",
                ]),
            ),
            (
                Intent::SummaryRequest,
                compile(&[
                    r"summarize",
                    r"recap",
                    r"key.*point",
                    r"main.*idea",
                    r"in.*short",
                ]),
            ),
            (
                Intent::TopicPivot,
                compile(&[
                    r"let'?s.*talk.*about",
                    r"skip.*to",
                    r"next.*topic",
                    r"change.*subject",
                    r"move on",
                ]),
            ),
        ];

        Self { families }
    }

    /// Classify a user message.
    ///
    /// Stable under case and surrounding whitespace: the input is trimmed
    /// and lowercased before matching.
    pub fn classify(&self, text: &str) -> IntentClassification {
        let normalized = text.trim().to_lowercase();

        let mut matches: BTreeMap<Intent, usize> = BTreeMap::new();
        let mut total = 0usize;

        for (intent, patterns) in &self.families {
            let count = patterns.iter().filter(|p| p.is_match(&normalized)).count();
            matches.insert(*intent, count);
            total += count;
        }
        matches.insert(Intent::Other, 0);

        if total == 0 {
            return IntentClassification {
                intent: Intent::Other,
                confidence: 0.0,
                matches,
            };
        }

        // Highest count wins; families iterate in priority order, so a
        // strict > keeps the earlier intent on ties.
        let mut winner = Intent::Other;
        let mut best = 0usize;
        for (intent, _) in &self.families {
            let count = matches[intent];
            if count > best {
                best = count;
                winner = *intent;
            }
        }

        let confidence = best as f64 / total as f64;
        debug!(intent = %winner, confidence, "Classified interruption");

        IntentClassification {
            intent: winner,
            confidence,
            matches,
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
