//! Embedder trait — `(text) → vector` collaborator used by the segmenter.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// The embedding collaborator.
///
/// A given implementation produces vectors of a fixed dimension. The
/// contract does not require determinism, but reproducible segmentation
/// depends on it; test stubs should be deterministic.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A human-readable backend name, for logs.
    fn name(&self) -> &str;

    /// The dimensionality of returned vectors.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError>;
}
