//! The parallel passage pipeline: clean → segment → chunk → combine.
//!
//! Combine work is an embarrassingly-parallel map: each chunk is processed
//! independently with no shared mutable state, one blocking task per chunk.
//! Tasks are joined in submission order, which restores global order across
//! chunks regardless of completion order; within a chunk the combiner
//! already preserves generation order. Passage-to-document provenance and
//! within-document order therefore survive the parallel phase.

use crate::error::Result;
use crate::store::Document;
use futures::future::try_join_all;
use obqa_passage::{Chunker, Combiner, Passage, SentenceSegmenter, clean_text};

/// The sentinel passage substituted when segmentation yields nothing, so
/// every document produces at least one passage.
const EMPTY_DOCUMENT_SENTINEL: &str = "z";

/// A passage annotated with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedPassage {
    pub source: String,
    pub passage: Passage,
}

/// Configuration-driven passage construction over whole documents.
#[derive(Debug, Clone)]
pub struct PassagePipeline {
    chunker: Chunker,
    combiner: Combiner,
}

impl PassagePipeline {
    /// Worker count, target token budget, and ceiling multiplier are
    /// explicit parameters; nothing here derives from ambient state.
    pub fn new(worker_count: usize, target: usize, ceiling_multiplier: f64) -> Self {
        Self {
            chunker: Chunker::new(worker_count),
            combiner: Combiner::with_ceiling_multiplier(target, ceiling_multiplier),
        }
    }

    /// Build passages for every document, preserving document order and
    /// reading order within each document.
    pub async fn build_passages(
        &self,
        documents: &[Document],
        segmenter: &dyn SentenceSegmenter,
    ) -> Result<Vec<SourcedPassage>> {
        let mut all = Vec::new();
        for document in documents {
            let passages = self.document_passages(document, segmenter).await?;
            all.extend(passages.into_iter().map(|passage| SourcedPassage {
                source: document.source.clone(),
                passage,
            }));
        }
        Ok(all)
    }

    async fn document_passages(
        &self,
        document: &Document,
        segmenter: &dyn SentenceSegmenter,
    ) -> Result<Vec<Passage>> {
        let text = clean_text(&document.text);
        let mut sentences = segmenter.segment(&text);
        if sentences.is_empty() {
            sentences = vec![EMPTY_DOCUMENT_SENTINEL.to_string()];
        }

        let chunks = self.chunker.chunk(&sentences);
        tracing::debug!(
            source = %document.source,
            sentences = sentences.len(),
            chunks = chunks.len(),
            "combining document"
        );

        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let combiner = self.combiner.clone();
                tokio::task::spawn_blocking(move || combiner.combine(&chunk.sentences))
            })
            .collect();

        // try_join_all yields results in submission order, restoring the
        // original chunk sequence.
        let per_chunk = try_join_all(handles).await?;
        Ok(per_chunk.into_iter().flatten().collect())
    }
}
