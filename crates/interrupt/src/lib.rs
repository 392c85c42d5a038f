//! # Roleweave Interrupt
//!
//! Interruption handling: classifies what the user wants when they break
//! into the dialogue, and reorders the remaining role queue to serve it.
//!
//! Both halves are pure: the classifier holds only compiled patterns, and
//! the reallocator is a function of `(queue, intent, usage, hysteresis,
//! turn)`. Stability policy (bounded delay, cooldown stamping) belongs to
//! the state machine that owns the session.

pub mod intent;
pub mod realloc;

pub use intent::{IntentClassification, IntentClassifier};
pub use realloc::{alignment, reallocate, ReallocationResult};
