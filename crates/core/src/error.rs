//! Error types for the roleweave domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error type; the engine folds
//! them into the top-level `Error`.

use thiserror::Error;

/// The top-level error type for all roleweave operations.
///
/// Every fallible verb on the state machine returns this; errors surface
/// as values, never as panics across the engine boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// An event was rejected in the current session state.
    #[error("Invalid transition: event {event} not accepted in state {state}")]
    InvalidTransition { state: String, event: String },

    /// A verb was called before its preconditions held.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A unit or session referenced by id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    // --- Generator collaborator ---
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    // --- Embedding collaborator ---
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// A persisted blob carries a schema version this build cannot read.
    #[error("Schema mismatch: blob has version {found}, this build reads version {supported}")]
    SchemaMismatch { found: u32, supported: u32 },

    /// Empty or malformed input where non-empty text is required.
    #[error("Invalid input: {0}")]
    InputInvalid(String),

    /// Reallocation refused inside the bounded-delay window. Soft; the
    /// queue is left untouched and the session continues.
    #[error("Reallocation blocked for {retry_after_turns} more turn(s)")]
    StabilityBlock { retry_after_turns: u64 },

    // --- Session store collaborator ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable code for this error, used in summaries and
    /// structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidTransition { .. } => "INVALID_TRANSITION",
            Error::PreconditionFailed(_) => "PRECONDITION_FAILED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Generator(GeneratorError::Timeout { .. }) => "GENERATOR_TIMEOUT",
            Error::Generator(_) => "GENERATOR_ERROR",
            Error::Embedding(_) => "EMBEDDING_ERROR",
            Error::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Error::InputInvalid(_) => "INPUT_INVALID",
            Error::StabilityBlock { .. } => "STABILITY_BLOCK",
            Error::Store(_) => "STORE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("Generation timed out after {deadline_secs}s")]
    Timeout { deadline_secs: u64 },

    #[error("Generator backend failed: {0}")]
    Backend(String),

    #[error("Generation was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("Embedding backend failed: {0}")]
    Backend(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage failed: {0}")]
    Storage(String),

    #[error("Corrupt session blob for {session_id}: {reason}")]
    Corrupt { session_id: String, reason: String },
}
