//! Assignment artifact — the mapping from units to role queues plus score
//! telemetry, produced once per document by the assignment engine and
//! shared read-only across sessions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::role::{Role, RoleQueue};

/// How the assignment engine orders primaries across the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Per unit, the highest-scoring role leads the queue.
    Greedy,
    /// Primaries are steered toward per-role target ratios across the
    /// document; the rest of each queue stays score-ordered.
    Balanced,
}

/// The three score components plus the weighted total for one (unit, role).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub structural: f64,
    pub lexical: f64,
    pub topic: f64,
    pub total: f64,
}

/// The assignment for a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAssignment {
    pub unit_id: String,

    /// All five roles, primary first, then descending total.
    pub queue: RoleQueue,

    /// The role leading the queue.
    pub primary: Role,

    /// Gap between the best and second-best totals, normalized to [0, 1].
    pub confidence: f64,

    /// Full score table for all five roles.
    pub scores: BTreeMap<Role, ScoreBreakdown>,
}

/// The full document assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unit ids in document order.
    pub unit_order: Vec<String>,

    /// Per-unit assignment keyed by unit id.
    pub units: BTreeMap<String, UnitAssignment>,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.unit_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_order.is_empty()
    }

    pub fn queue_for(&self, unit_id: &str) -> Option<&RoleQueue> {
        self.units.get(unit_id).map(|u| &u.queue)
    }

    pub fn primary_for(&self, unit_id: &str) -> Option<Role> {
        self.units.get(unit_id).map(|u| u.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(total: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            structural: total,
            lexical: total,
            topic: total,
            total,
        }
    }

    #[test]
    fn assignment_lookup_by_unit_id() {
        let queue = RoleQueue::new([
            Role::Summarizer,
            Role::Explainer,
            Role::Challenger,
            Role::ExampleGenerator,
            Role::MisconceptionSpotter,
        ])
        .unwrap();
        let scores: BTreeMap<Role, ScoreBreakdown> =
            Role::ALL.into_iter().map(|r| (r, breakdown(5.0))).collect();

        let mut units = BTreeMap::new();
        units.insert(
            "S0_0".to_string(),
            UnitAssignment {
                unit_id: "S0_0".into(),
                queue: queue.clone(),
                primary: Role::Summarizer,
                confidence: 0.1,
                scores,
            },
        );
        let assignment = Assignment {
            unit_order: vec!["S0_0".into()],
            units,
        };

        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.primary_for("S0_0"), Some(Role::Summarizer));
        assert_eq!(assignment.queue_for("S0_0"), Some(&queue));
        assert_eq!(assignment.queue_for("S9_9"), None);
    }

    #[test]
    fn scores_serialize_with_role_name_keys() {
        let scores: BTreeMap<Role, ScoreBreakdown> = [(Role::ExampleGenerator, breakdown(3.0))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&scores).unwrap();
        assert!(json.contains("Example-Generator"));
    }
}
