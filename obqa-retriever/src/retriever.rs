//! Retrieval orchestration: prepare an index, answer questions against it.

use crate::encoder::Encoder;
use crate::error::{Result, RetrieverError};
use crate::pipeline::PassagePipeline;
use crate::reader::{Answer, Reader};
use crate::store::{Document, PassageRecord, PassageStore};
use obqa_passage::{RegexSegmenter, SentenceSegmenter};
use obqa_search::{SearchBackend, SearchIndex};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the retriever.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Search backend tag: `"faiss"`, `"annoy"` or `"scann"`.
    pub searcher_type: String,
    /// Target token budget per passage.
    pub target_token_count: usize,
    /// Ceiling multiplier applied to the target.
    pub ceiling_multiplier: f64,
    /// Number of passages retrieved per question.
    pub top_k: usize,
    /// Batch size for passage encoding.
    pub batch_size: usize,
    /// Location of the vectorized-passage snapshot.
    pub persist_path: PathBuf,
    /// Worker count for the parallel combine phase.
    pub worker_count: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            searcher_type: "faiss".to_string(),
            target_token_count: 60,
            ceiling_multiplier: 1.2,
            top_k: 10,
            batch_size: 16,
            persist_path: PathBuf::from("context.json"),
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl RetrieverConfig {
    pub fn with_searcher_type(mut self, searcher_type: impl Into<String>) -> Self {
        self.searcher_type = searcher_type.into();
        self
    }

    pub fn with_target_token_count(mut self, target: usize) -> Self {
        self.target_token_count = target;
        self
    }

    pub fn with_ceiling_multiplier(mut self, multiplier: f64) -> Self {
        self.ceiling_multiplier = multiplier;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = path.into();
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }
}

struct Prepared {
    store: PassageStore,
    index: SearchIndex,
}

/// Orchestrates passage construction, embedding, indexing, and question
/// answering over external Encoder and Reader collaborators.
///
/// [`Retriever::prepare`] must run before [`Retriever::ask`]; asking first
/// fails with [`RetrieverError::NotReady`]. Once prepared, the index is
/// immutable — a changed corpus requires calling `prepare` again with the
/// old snapshot removed.
pub struct Retriever {
    config: RetrieverConfig,
    encoder: Arc<dyn Encoder>,
    reader: Arc<dyn Reader>,
    segmenter: Arc<dyn SentenceSegmenter>,
    prepared: Option<Prepared>,
}

impl Retriever {
    pub fn new(config: RetrieverConfig, encoder: Arc<dyn Encoder>, reader: Arc<dyn Reader>) -> Self {
        Self {
            config,
            encoder,
            reader,
            segmenter: Arc::new(RegexSegmenter::new()),
            prepared: None,
        }
    }

    /// Substitute the sentence segmenter (the default splits on sentence
    /// punctuation).
    pub fn with_segmenter(mut self, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Whether `prepare` has completed.
    pub fn is_ready(&self) -> bool {
        self.prepared.is_some()
    }

    /// Build or load the passage store, then build the search index.
    ///
    /// A readable snapshot at `persist_path` is authoritative: it is loaded
    /// as-is and the documents are not re-segmented or re-embedded.
    /// Otherwise the pipeline builds passages from `documents`, embeds them
    /// in `batch_size` batches, and writes a fresh snapshot.
    pub async fn prepare(&mut self, documents: &[Document]) -> Result<()> {
        // Resolve the backend before any expensive work so a bad tag fails
        // fast.
        let backend = SearchBackend::parse(&self.config.searcher_type)?;

        let store = if self.config.persist_path.is_file() {
            PassageStore::load(&self.config.persist_path).await?
        } else {
            let store = self.embed_documents(documents).await?;
            store.save(&self.config.persist_path).await?;
            store
        };

        if let Some(dimension) = store.dimension() {
            if dimension != self.encoder.dimension() {
                return Err(RetrieverError::config(format!(
                    "snapshot dimension {} does not match encoder dimension {}",
                    dimension,
                    self.encoder.dimension()
                )));
            }
        }

        let index = SearchIndex::build(backend, &store.vectors())?;
        self.prepared = Some(Prepared { store, index });
        tracing::info!(backend = backend.tag(), "preparation completed");
        Ok(())
    }

    async fn embed_documents(&self, documents: &[Document]) -> Result<PassageStore> {
        let pipeline = PassagePipeline::new(
            self.config.worker_count,
            self.config.target_token_count,
            self.config.ceiling_multiplier,
        );
        let passages = pipeline
            .build_passages(documents, self.segmenter.as_ref())
            .await?;

        let texts: Vec<String> = passages.iter().map(|p| p.passage.text.clone()).collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let embedded = self
                .encoder
                .encode_passages(batch)
                .await
                .map_err(RetrieverError::encoding)?;
            if embedded.len() != batch.len() {
                return Err(RetrieverError::config(format!(
                    "encoder returned {} vectors for a batch of {}",
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
            tracing::debug!(embedded = vectors.len(), total = texts.len(), "encoding batch done");
        }

        let records = passages
            .into_iter()
            .zip(vectors)
            .map(|(sourced, vector)| PassageRecord {
                text: sourced.passage.text,
                source: Some(sourced.source),
                vector,
            })
            .collect();
        Ok(PassageStore::new(records))
    }

    /// Answer a question against the prepared index.
    ///
    /// The question is vectorized, the `top_k` most similar passages are
    /// retrieved, their texts are joined with single spaces in ranked order
    /// to form the context, and the reader's result is returned unchanged.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let prepared = self.prepared.as_ref().ok_or(RetrieverError::NotReady)?;

        let query = self
            .encoder
            .encode_query(question)
            .await
            .map_err(RetrieverError::encoding)?;
        let ranked = prepared.index.rank(&query, self.config.top_k)?;

        let context = ranked
            .iter()
            .filter_map(|&i| prepared.store.get(i).map(|r| r.text.as_str()))
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!(passages = ranked.len(), "context assembled");
        self.reader
            .answer(question, &context)
            .await
            .map_err(RetrieverError::reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RetrieverConfig::default();
        assert_eq!(config.searcher_type, "faiss");
        assert_eq!(config.target_token_count, 60);
        assert_eq!(config.ceiling_multiplier, 1.2);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.persist_path, PathBuf::from("context.json"));
        assert!(config.worker_count >= 1);
    }

    #[test]
    fn test_config_builders() {
        let config = RetrieverConfig::default()
            .with_searcher_type("annoy")
            .with_target_token_count(40)
            .with_top_k(5)
            .with_worker_count(2);
        assert_eq!(config.searcher_type, "annoy");
        assert_eq!(config.target_token_count, 40);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.worker_count, 2);
    }
}
