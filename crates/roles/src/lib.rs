//! # Roleweave Roles
//!
//! The immutable role catalog and the deterministic assignment engine
//! that maps semantic units to ordered role queues.
//!
//! Both halves are stateless producers of immutable values: the catalog
//! is process-wide static data, and `assign` is a pure function of its
//! inputs.

pub mod assign;
pub mod catalog;
pub mod scoring;

pub use assign::assign;
pub use catalog::{all, profile, RoleProfile};
pub use scoring::Scorer;
