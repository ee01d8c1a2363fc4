//! The neural encoder boundary.

use async_trait::async_trait;

/// Turns text into dense embedding vectors of a fixed dimensionality.
///
/// The encoder is an external collaborator (typically a DPR-style dual
/// encoder behind a model runtime); the core only depends on this trait.
/// Passage encoding is batched by the caller, so implementations see at
/// most `batch_size` texts per call. Failures are propagated unmodified —
/// the core does not retry encoder calls.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Embed a batch of passage texts, one vector per input, in order.
    async fn encode_passages(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single question.
    async fn encode_query(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Fixed output dimensionality of this encoder.
    fn dimension(&self) -> usize;
}
