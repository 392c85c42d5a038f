//! Deterministic role-to-unit assignment.
//!
//! Greedy mode ranks each unit's queue purely by score. Balanced mode
//! steers primaries toward per-role target shares while leaving the rest
//! of each queue score-ordered. Ties break lexicographically on role name
//! so identical input always yields identical output.

use std::collections::BTreeMap;

use roleweave_config::ScoringConfig;
use roleweave_core::{
    Assignment, AssignmentMode, Result, Role, RoleQueue, ScoreBreakdown, SemanticUnit,
    UnitAssignment,
};
use tracing::debug;

use crate::scoring::Scorer;

/// Assign a role queue to every unit.
///
/// Pure and deterministic: for fixed `(units, mode, config)`, repeated
/// calls produce identical output.
pub fn assign(
    units: &[SemanticUnit],
    mode: AssignmentMode,
    config: &ScoringConfig,
) -> Result<Assignment> {
    let scorer = Scorer::new();
    let total_units = units.len();

    let mut unit_order = Vec::with_capacity(total_units);
    let mut assigned: BTreeMap<String, UnitAssignment> = BTreeMap::new();

    // Primary counts, for balanced mode
    let mut counts: BTreeMap<Role, usize> = Role::ALL.into_iter().map(|r| (r, 0)).collect();
    let mut n = 0usize;

    for unit in units {
        let scores: BTreeMap<Role, ScoreBreakdown> = Role::ALL
            .into_iter()
            .map(|role| (role, scorer.score(unit, role, total_units, config)))
            .collect();

        let ranked = ranked_roles(&scores);

        let primary = match mode {
            AssignmentMode::Greedy => ranked[0],
            AssignmentMode::Balanced => {
                // Admit the best-scoring role whose current primary share
                // has not overshot its target; with nothing assigned yet
                // every share is 0, so the first unit always takes its
                // top-scoring role. All over target: highest score wins.
                ranked
                    .iter()
                    .copied()
                    .find(|role| {
                        counts[role] as f64 / n.max(1) as f64
                            <= config.target_ratios.ratio(*role)
                    })
                    .unwrap_or(ranked[0])
            }
        };

        let mut queue_order = vec![primary];
        queue_order.extend(ranked.iter().copied().filter(|r| *r != primary));
        let queue = RoleQueue::from_ranked(queue_order)?;

        let confidence = ((scores[&ranked[0]].total - scores[&ranked[1]].total) / 10.0)
            .clamp(0.0, 1.0);

        unit_order.push(unit.id.clone());
        assigned.insert(
            unit.id.clone(),
            UnitAssignment {
                unit_id: unit.id.clone(),
                queue,
                primary,
                confidence,
                scores,
            },
        );

        *counts.entry(primary).or_default() += 1;
        n += 1;
    }

    debug!(units = total_units, ?mode, "Assigned role queues");
    Ok(Assignment {
        unit_order,
        units: assigned,
    })
}

/// All five roles sorted by descending total, ties by ascending name.
fn ranked_roles(scores: &BTreeMap<Role, ScoreBreakdown>) -> Vec<Role> {
    let mut roles: Vec<Role> = Role::ALL.to_vec();
    roles.sort_by(|a, b| {
        scores[b]
            .total
            .partial_cmp(&scores[a].total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    roles
}
