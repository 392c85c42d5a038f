//! Role queue reallocation under interruption.
//!
//! Scores every role as `base_weight + 5.0 × alignment(intent, role)
//! − 0.2 × usage[role]`, pins hysteresis-locked roles to the tail, and
//! reports which roles were demoted far enough to earn a new cooldown.
//! The bounded-delay window lives in the state machine — this module is a
//! pure function of its inputs and safe from any scheduler context.

use std::collections::BTreeMap;

use roleweave_core::{Intent, Result, Role, RoleQueue};
use roleweave_roles::catalog;
use tracing::debug;

/// A role must fall this many positions to acquire hysteresis.
const DEMOTION_DISTANCE: usize = 2;

/// Outcome of a reallocation computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReallocationResult {
    pub queue: RoleQueue,

    /// Roles demoted by at least two positions; the caller stamps their
    /// hysteresis cooldowns.
    pub demoted: Vec<Role>,
}

/// How strongly an intent calls for a role, in [0, 1].
pub fn alignment(intent: Intent, role: Role) -> f64 {
    match (intent, role) {
        (Intent::Clarification, Role::Explainer) => 0.9,
        (Intent::Clarification, Role::MisconceptionSpotter) => 0.8,
        (Intent::Objection, Role::Challenger) => 0.9,
        (Intent::Objection, Role::MisconceptionSpotter) => 0.8,
        (Intent::Objection, Role::Explainer) => 0.3,
        (Intent::ExampleRequest, Role::ExampleGenerator) => 0.95,
        (Intent::ExampleRequest, Role::Explainer) => 0.3,
        (Intent::DepthRequest, Role::Challenger) => 0.85,
        (Intent::DepthRequest, Role::Explainer) => 0.6,
        (Intent::SummaryRequest, Role::Summarizer) => 0.95,
        (Intent::TopicPivot, Role::Summarizer) => 0.5,
        _ => 0.0,
    }
}

/// Reorder the queue for a detected intent.
///
/// A role whose `hysteresis_until` entry is still ahead of `current_turn`
/// scores negative infinity and therefore lands at the tail regardless of
/// alignment. Ties break lexicographically on role name.
pub fn reallocate(
    current: &RoleQueue,
    intent: Intent,
    usage: &BTreeMap<Role, u32>,
    hysteresis_until: &BTreeMap<Role, u64>,
    current_turn: u64,
) -> Result<ReallocationResult> {
    let mut scored: Vec<(Role, f64)> = Role::ALL
        .into_iter()
        .map(|role| {
            let locked = hysteresis_until
                .get(&role)
                .is_some_and(|&until| until > current_turn);
            let score = if locked {
                f64::NEG_INFINITY
            } else {
                catalog::profile(role).base_weight + 5.0 * alignment(intent, role)
                    - 0.2 * usage.get(&role).copied().unwrap_or(0) as f64
            };
            (role, score)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let queue = RoleQueue::from_ranked(scored.iter().map(|(role, _)| *role))?;

    let demoted: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|&role| {
            queue.position_of(role) >= current.position_of(role) + DEMOTION_DISTANCE
        })
        .collect();

    debug!(%intent, ?demoted, "Reallocated role queue");
    Ok(ReallocationResult { queue, demoted })
}
