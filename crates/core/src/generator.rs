//! Generator trait — the abstraction over the text-generation collaborator.
//!
//! The engine builds a role-tagged prompt, attaches a cancellation token,
//! and awaits a single completed response. Streaming, retries, and auth
//! are the backend's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::GeneratorError;

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The full prompt: role system prompt + context block + current unit.
    pub prompt: String,

    /// Sampling temperature; 0.0 for the deterministic roles.
    pub temperature: f32,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// Cooperative cancellation; honoring it is best-effort.
    pub cancel: CancelToken,
}

/// A completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,

    /// Which model actually responded, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The generator collaborator.
///
/// Implementations must be safe for concurrent invocation; the engine
/// serializes calls per session but not globally.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable backend name, for logs.
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, GeneratorError>;
}
