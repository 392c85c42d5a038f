//! Per-(unit, role) scoring.
//!
//! Three components, each in [0, 10]:
//! - structural: base weight + section bonus + position heuristic + length band
//! - lexical: priority-keyword density, avoid-keyword penalty, signature patterns
//! - topic: affinity tags, complexity marker, title overlap
//!
//! The weighted total (defaults 0.4 / 0.3 / 0.3) ranks the queue.

use regex_lite::Regex;
use roleweave_config::ScoringConfig;
use roleweave_core::{Role, ScoreBreakdown, SectionKind, SemanticUnit};

use crate::catalog;

/// Cap on the lexical signature-pattern bonus.
const PATTERN_BONUS_CAP: f64 = 1.5;

/// Scores semantic units for role suitability. Compiles its signature
/// patterns once at construction.
pub struct Scorer {
    definition: Regex,
    example: Regex,
    summary: Regex,
    misconception: Regex,
    challenge: Regex,
    question: Regex,
}

impl Scorer {
    pub fn new() -> Self {
        Self {
            definition: Regex::new(r"\b(is defined as|refers to|means|defined as)\b")
                .expect("static pattern"),
            example: Regex::new(r"\b(for example|for instance|such as|e\.g\.)\b")
                .expect("static pattern"),
            summary: Regex::new(r"\b(in summary|in conclusion|to summarize|key points)\b")
                .expect("static pattern"),
            misconception: Regex::new(r"\b(mistake|error|misconception|incorrect|confuse)\b")
                .expect("static pattern"),
            challenge: Regex::new(r"\b(however|but|limitation|trade-off|what if)\b")
                .expect("static pattern"),
            question: Regex::new(r"\b(what|why|how|when|where|who)\b").expect("static pattern"),
        }
    }

    /// Score one (unit, role) pair.
    pub fn score(
        &self,
        unit: &SemanticUnit,
        role: Role,
        total_units: usize,
        config: &ScoringConfig,
    ) -> ScoreBreakdown {
        let structural = self.structural_score(unit, role, total_units);
        let lexical = self.lexical_score(unit, role);
        let topic = self.topic_score(unit, role);

        let total = config.structural_weight * structural
            + config.lexical_weight * lexical
            + config.topic_weight * topic;

        ScoreBreakdown {
            structural,
            lexical,
            topic,
            total,
        }
    }

    fn structural_score(&self, unit: &SemanticUnit, role: Role, total_units: usize) -> f64 {
        let profile = catalog::profile(role);
        let mut score = profile.base_weight;

        score += section_bonus(unit.section_kind, role);

        // Position heuristic, at most +1.0: Explainer early, Summarizer
        // late, Challenger mid-document.
        let relative = unit.position as f64 / total_units.max(1) as f64;
        score += match role {
            Role::Explainer => 1.0 - relative,
            Role::Summarizer => relative,
            Role::Challenger => (1.0 - (0.5 - relative).abs() * 2.0).max(0.0),
            _ => 0.0,
        };

        // Word-count band
        let wc = unit.word_count;
        let band_match = match role {
            Role::Summarizer => wc < 100,
            Role::Explainer => (100..=300).contains(&wc),
            _ => (50..=250).contains(&wc),
        };
        if band_match {
            score += 0.2 * profile.base_weight;
        }

        score.min(10.0)
    }

    fn lexical_score(&self, unit: &SemanticUnit, role: Role) -> f64 {
        let profile = catalog::profile(role);
        let text = unit.text.to_lowercase();

        let priority_hits: usize = profile
            .priority_keywords
            .iter()
            .map(|kw| text.matches(kw).count())
            .sum();
        let norm = (unit.word_count as f64 / 100.0).max(1.0);
        let mut score = (priority_hits as f64 / norm) * 2.0 + 0.5 * profile.base_weight;

        let avoid_hits: usize = profile
            .avoid_keywords
            .iter()
            .map(|kw| text.matches(kw).count())
            .sum();
        score -= 0.5 * avoid_hits as f64;

        score += (0.5 * self.pattern_hits(role, &text) as f64).min(PATTERN_BONUS_CAP);

        score.clamp(0.0, 10.0)
    }

    fn topic_score(&self, unit: &SemanticUnit, role: Role) -> f64 {
        let profile = catalog::profile(role);
        let mut score = profile.base_weight;

        for tag in profile.affinity_tags {
            if *tag == unit.section_kind {
                score += 1.5;
            }
        }

        if matches!(role, Role::Explainer | Role::MisconceptionSpotter)
            && unit.metadata_str("complexity") == Some("high")
        {
            score += 1.0;
        }

        if let Some(title) = &unit.title {
            let title = title.to_lowercase();
            if profile
                .priority_keywords
                .iter()
                .any(|kw| title.contains(kw))
            {
                score += 0.3 * unit.cohesion as f64 * 10.0;
            }
        }

        score.min(10.0)
    }

    fn pattern_hits(&self, role: Role, text: &str) -> usize {
        match role {
            Role::Explainer => self.definition.find_iter(text).count(),
            Role::ExampleGenerator => self.example.find_iter(text).count(),
            Role::Summarizer => self.summary.find_iter(text).count(),
            Role::MisconceptionSpotter => self.misconception.find_iter(text).count(),
            Role::Challenger => {
                self.challenge.find_iter(text).count() + self.question.find_iter(text).count()
            }
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

fn section_bonus(section: SectionKind, role: Role) -> f64 {
    match (section, role) {
        (SectionKind::Introduction, Role::Summarizer) => 2.0,
        (SectionKind::Introduction, Role::Explainer) => 2.0,
        (SectionKind::Introduction, Role::MisconceptionSpotter) => 1.0,
        (SectionKind::Conclusion, Role::Summarizer) => 3.0,
        (SectionKind::Conclusion, Role::Explainer) => 0.5,
        (SectionKind::Conclusion, Role::Challenger) => 0.5,
        (SectionKind::Methodology, Role::MisconceptionSpotter) => 2.5,
        (SectionKind::Methodology, Role::Explainer) => 2.0,
        (SectionKind::Methodology, Role::ExampleGenerator) => 1.5,
        (SectionKind::Body, Role::Challenger) => 1.5,
        (SectionKind::Body, Role::ExampleGenerator) => 1.0,
        _ => 0.0,
    }
}
