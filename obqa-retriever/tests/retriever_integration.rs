//! Integration tests for the full prepare/ask path with stub collaborators.
//!
//! The stubs keep everything deterministic: the encoder hashes words into a
//! fixed-dimension bag-of-words vector (so passages sharing words with a
//! question score higher), and the reader records the context it was handed
//! and returns a canned span.

use anyhow::Result;
use async_trait::async_trait;
use obqa_retriever::{
    Answer, Document, Encoder, Reader, Retriever, RetrieverConfig, RetrieverError,
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;
use tokio::sync::Mutex;

const DIM: usize = 32;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .ok(); // Ignore if already initialized
}

fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIM];
    for word in text.split_whitespace() {
        let word: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        let mut hasher = DefaultHasher::new();
        word.hash(&mut hasher);
        vector[(hasher.finish() % DIM as u64) as usize] += 1.0;
    }
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Deterministic word-hash encoder; counts batch calls so tests can verify
/// the snapshot short-circuit.
#[derive(Default)]
struct HashEncoder {
    passage_batches: AtomicUsize,
}

#[async_trait]
impl Encoder for HashEncoder {
    async fn encode_passages(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.passage_batches.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| bag_of_words(t)).collect())
    }

    async fn encode_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(bag_of_words(text))
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Records the context it receives and answers with the context's first
/// word.
#[derive(Default)]
struct RecordingReader {
    last_context: Mutex<Option<String>>,
}

#[async_trait]
impl Reader for RecordingReader {
    async fn answer(&self, _question: &str, context: &str) -> Result<Answer> {
        *self.last_context.lock().await = Some(context.to_string());
        let answer = context.split_whitespace().next().unwrap_or("").to_string();
        let end = answer.len();
        Ok(Answer {
            answer,
            score: 0.9,
            start: 0,
            end,
        })
    }
}

fn corpus() -> Vec<Document> {
    vec![
        Document::new(
            "whales",
            "Whales roam the deep ocean water hunting giant squid. \
             The sperm whale dives deeper than any other mammal alive. \
             Baleen whales filter krill through plates in their huge jaws.",
        ),
        Document::new(
            "trains",
            "Steam locomotives pulled freight across the continent for decades. \
             The railway timetable governed life in every small town. \
             Diesel engines replaced steam traction after the second war.",
        ),
    ]
}

fn test_config(persist: &std::path::Path) -> RetrieverConfig {
    RetrieverConfig::default()
        .with_persist_path(persist)
        .with_target_token_count(12)
        .with_worker_count(2)
        .with_top_k(3)
}

#[tokio::test]
async fn test_ask_before_prepare_is_not_ready() {
    let temp_dir = tempdir().unwrap();
    let retriever = Retriever::new(
        test_config(&temp_dir.path().join("context.json")),
        Arc::new(HashEncoder::default()),
        Arc::new(RecordingReader::default()),
    );

    let err = retriever.ask("anything at all?").await.unwrap_err();
    assert!(matches!(err, RetrieverError::NotReady));
}

#[tokio::test]
async fn test_prepare_then_ask_assembles_ranked_context() -> Result<()> {
    init_tracing();
    let temp_dir = tempdir()?;
    let reader = Arc::new(RecordingReader::default());
    let mut retriever = Retriever::new(
        test_config(&temp_dir.path().join("context.json")),
        Arc::new(HashEncoder::default()),
        reader.clone(),
    );

    retriever.prepare(&corpus()).await?;
    assert!(retriever.is_ready());

    let answer = retriever
        .ask("Which whale dives deeper than any other mammal?")
        .await?;
    assert_eq!(answer.score, 0.9);
    assert!(!answer.answer.is_empty());

    // The best-matching passage leads the context; off-topic passages about
    // trains must not outrank every whale passage.
    let context = reader.last_context.lock().await.clone().unwrap();
    assert!(context.contains("whale"), "context: {context}");
    let first_passage_end = context.find("whale").unwrap();
    assert!(
        !context[..first_passage_end].contains("locomotive"),
        "context: {context}"
    );
    Ok(())
}

#[tokio::test]
async fn test_snapshot_short_circuits_reembedding() -> Result<()> {
    let temp_dir = tempdir()?;
    let persist = temp_dir.path().join("context.json");

    let first_encoder = Arc::new(HashEncoder::default());
    let mut retriever = Retriever::new(
        test_config(&persist),
        first_encoder.clone(),
        Arc::new(RecordingReader::default()),
    );
    retriever.prepare(&corpus()).await?;
    assert!(first_encoder.passage_batches.load(Ordering::SeqCst) > 0);
    assert!(persist.is_file());

    // A fresh retriever over the same path must load the snapshot and skip
    // passage encoding entirely.
    let second_encoder = Arc::new(HashEncoder::default());
    let mut reloaded = Retriever::new(
        test_config(&persist),
        second_encoder.clone(),
        Arc::new(RecordingReader::default()),
    );
    reloaded.prepare(&[]).await?;
    assert_eq!(second_encoder.passage_batches.load(Ordering::SeqCst), 0);

    let answer = reloaded.ask("What replaced steam traction?").await?;
    assert!(!answer.answer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_searcher_type_fails_prepare() {
    let temp_dir = tempdir().unwrap();
    let config =
        test_config(&temp_dir.path().join("context.json")).with_searcher_type("elasticsearch");
    let mut retriever = Retriever::new(
        config,
        Arc::new(HashEncoder::default()),
        Arc::new(RecordingReader::default()),
    );

    let err = retriever.prepare(&corpus()).await.unwrap_err();
    assert!(matches!(
        err,
        RetrieverError::Search {
            source: obqa_search::SearchError::Config { .. }
        }
    ));
}

#[tokio::test]
async fn test_snapshot_dimension_mismatch_is_config_error() -> Result<()> {
    let temp_dir = tempdir()?;
    let persist = temp_dir.path().join("context.json");

    // A snapshot whose vectors are narrower than the encoder's output.
    let stale = serde_json::json!([
        {"text": "old passage", "vector": [0.1, 0.2]}
    ]);
    tokio::fs::write(&persist, serde_json::to_vec(&stale)?).await?;

    let mut retriever = Retriever::new(
        test_config(&persist),
        Arc::new(HashEncoder::default()),
        Arc::new(RecordingReader::default()),
    );
    let err = retriever.prepare(&corpus()).await.unwrap_err();
    assert!(matches!(err, RetrieverError::Config { .. }));
    Ok(())
}

#[tokio::test]
async fn test_every_backend_round_trips() -> Result<()> {
    init_tracing();
    for backend in ["faiss", "annoy", "scann"] {
        let temp_dir = tempdir()?;
        let config = test_config(&temp_dir.path().join("context.json"))
            .with_searcher_type(backend);
        let mut retriever = Retriever::new(
            config,
            Arc::new(HashEncoder::default()),
            Arc::new(RecordingReader::default()),
        );

        retriever.prepare(&corpus()).await?;
        let answer = retriever.ask("Who filters krill through plates?").await?;
        assert!(!answer.answer.is_empty(), "backend {backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_document_still_answerable() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut retriever = Retriever::new(
        test_config(&temp_dir.path().join("context.json")),
        Arc::new(HashEncoder::default()),
        Arc::new(RecordingReader::default()),
    );

    // Segmentation yields nothing; the sentinel passage keeps the corpus
    // non-empty so prepare and ask both succeed.
    retriever
        .prepare(&[Document::new("blank", "   ")])
        .await?;
    let answer = retriever.ask("anything?").await?;
    assert_eq!(answer.answer, "z");
    Ok(())
}
