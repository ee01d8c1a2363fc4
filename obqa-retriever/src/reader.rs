//! The answer-extraction boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An extracted answer span within the retrieved context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text.
    pub answer: String,
    /// The reader's confidence in the span.
    pub score: f64,
    /// Start offset of the span within the context string.
    pub start: usize,
    /// End offset of the span within the context string.
    pub end: usize,
}

/// Extracts an answer span from a question plus assembled context.
///
/// External collaborator (typically an extractive QA model); its result is
/// returned to the caller unchanged.
#[async_trait]
pub trait Reader: Send + Sync {
    async fn answer(&self, question: &str, context: &str) -> anyhow::Result<Answer>;
}
