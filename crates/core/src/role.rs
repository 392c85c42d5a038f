//! The five pedagogical roles and the per-unit role queue.
//!
//! Roles are a closed set; the catalog in `roleweave-roles` attaches
//! prompts and weights to them. Variant declaration order is the
//! lexicographic order of the display names, so the derived `Ord` doubles
//! as the deterministic tie-break used throughout the engine.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// One of the five pedagogical voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Challenger,
    #[serde(rename = "Example-Generator")]
    ExampleGenerator,
    Explainer,
    #[serde(rename = "Misconception-Spotter")]
    MisconceptionSpotter,
    Summarizer,
}

impl Role {
    /// All roles, in lexicographic name order.
    pub const ALL: [Role; 5] = [
        Role::Challenger,
        Role::ExampleGenerator,
        Role::Explainer,
        Role::MisconceptionSpotter,
        Role::Summarizer,
    ];

    /// The canonical display name.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Challenger => "Challenger",
            Role::ExampleGenerator => "Example-Generator",
            Role::Explainer => "Explainer",
            Role::MisconceptionSpotter => "Misconception-Spotter",
            Role::Summarizer => "Summarizer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = Error;

    /// Case-insensitive name lookup (persistence path).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.name().to_lowercase() == lower)
            .ok_or_else(|| Error::NotFound(format!("unknown role name: {s}")))
    }
}

/// An ordered queue of all five roles for one unit.
///
/// Invariant: a permutation — every role appears exactly once. Constructed
/// by the assignment engine; only the reallocator produces replacements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleQueue([Role; 5]);

impl RoleQueue {
    /// Build a queue, validating the permutation invariant.
    pub fn new(roles: [Role; 5]) -> Result<Self, Error> {
        for role in Role::ALL {
            if !roles.contains(&role) {
                return Err(Error::InputInvalid(format!(
                    "role queue is missing {role}",
                )));
            }
        }
        Ok(Self(roles))
    }

    /// Build a queue from an iterator that must yield each role once.
    pub fn from_ranked(ranked: impl IntoIterator<Item = Role>) -> Result<Self, Error> {
        let collected: Vec<Role> = ranked.into_iter().collect();
        let arr: [Role; 5] = collected
            .try_into()
            .map_err(|v: Vec<Role>| Error::InputInvalid(format!(
                "role queue must hold exactly 5 roles, got {}",
                v.len()
            )))?;
        Self::new(arr)
    }

    pub fn roles(&self) -> &[Role; 5] {
        &self.0
    }

    pub fn first(&self) -> Role {
        self.0[0]
    }

    pub fn get(&self, index: usize) -> Option<Role> {
        self.0.get(index).copied()
    }

    /// Position of a role in the queue. Always succeeds by the invariant.
    pub fn position_of(&self, role: Role) -> usize {
        self.0.iter().position(|&r| r == role).unwrap_or(self.0.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Display names in order, for summaries and persisted blobs.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|r| r.name()).collect()
    }
}

impl<'de> Deserialize<'de> for RoleQueue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let roles: Vec<Role> = Vec::deserialize(deserializer)?;
        let arr: [Role; 5] = roles
            .try_into()
            .map_err(|v: Vec<Role>| D::Error::custom(format!(
                "role queue must hold exactly 5 roles, got {}",
                v.len()
            )))?;
        RoleQueue::new(arr).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_lexicographic_by_name() {
        let mut sorted = Role::ALL;
        sorted.sort_by_key(|r| r.name());
        assert_eq!(sorted, Role::ALL);
    }

    #[test]
    fn derived_ord_matches_name_order() {
        assert!(Role::Challenger < Role::ExampleGenerator);
        assert!(Role::ExampleGenerator < Role::Explainer);
        assert!(Role::MisconceptionSpotter < Role::Summarizer);
    }

    #[test]
    fn role_names_roundtrip_case_insensitively() {
        for role in Role::ALL {
            assert_eq!(role.name().parse::<Role>().unwrap(), role);
            assert_eq!(role.name().to_uppercase().parse::<Role>().unwrap(), role);
        }
        assert!("Narrator".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Role::ExampleGenerator).unwrap();
        assert_eq!(json, "\"Example-Generator\"");
        let role: Role = serde_json::from_str("\"Misconception-Spotter\"").unwrap();
        assert_eq!(role, Role::MisconceptionSpotter);
    }

    #[test]
    fn queue_rejects_duplicates() {
        let result = RoleQueue::new([
            Role::Explainer,
            Role::Explainer,
            Role::Summarizer,
            Role::Challenger,
            Role::ExampleGenerator,
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn queue_accepts_any_permutation() {
        let queue = RoleQueue::new([
            Role::Summarizer,
            Role::MisconceptionSpotter,
            Role::Explainer,
            Role::ExampleGenerator,
            Role::Challenger,
        ])
        .unwrap();
        assert_eq!(queue.first(), Role::Summarizer);
        assert_eq!(queue.position_of(Role::Challenger), 4);
    }

    #[test]
    fn queue_deserialization_enforces_permutation() {
        let ok = "[\"Explainer\",\"Challenger\",\"Summarizer\",\"Example-Generator\",\"Misconception-Spotter\"]";
        let queue: RoleQueue = serde_json::from_str(ok).unwrap();
        assert_eq!(queue.first(), Role::Explainer);

        let dup = "[\"Explainer\",\"Explainer\",\"Summarizer\",\"Example-Generator\",\"Misconception-Spotter\"]";
        assert!(serde_json::from_str::<RoleQueue>(dup).is_err());

        let short = "[\"Explainer\"]";
        assert!(serde_json::from_str::<RoleQueue>(short).is_err());
    }

    #[test]
    fn queue_serializes_as_name_list() {
        let queue = RoleQueue::new([
            Role::Explainer,
            Role::Challenger,
            Role::Summarizer,
            Role::ExampleGenerator,
            Role::MisconceptionSpotter,
        ])
        .unwrap();
        let json = serde_json::to_string(&queue).unwrap();
        assert!(json.starts_with("[\"Explainer\""));
        assert!(json.contains("Example-Generator"));
    }
}
