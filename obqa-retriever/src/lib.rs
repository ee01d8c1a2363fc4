//! # obqa-retriever
//!
//! Retrieval orchestration for open-book question answering. This crate
//! wires the passage pipeline (`obqa-passage`) and the pluggable vector
//! search (`obqa-search`) to two external collaborators — an [`Encoder`]
//! that turns text into vectors and a [`Reader`] that extracts an answer
//! span from a question/context pair.
//!
//! ## Key modules
//!
//! - **[`pipeline`]**: parallel passage construction over whole documents
//! - **[`store`]**: the ordered passage collection and its JSON snapshot
//! - **[`retriever`]**: `prepare` / `ask` orchestration
//! - **[`encoder`] / [`reader`]**: collaborator traits
//!
//! ## Data flow
//!
//! ```text
//! Documents → clean → segment → chunk ∥ combine → PassageStore
//!                                                     ↓ Encoder
//! question → Encoder → SearchIndex.rank → context → Reader → Answer
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use obqa_retriever::{Document, Retriever, RetrieverConfig};
//! # use obqa_retriever::{Encoder, Reader};
//! # use std::sync::Arc;
//!
//! # async fn example(encoder: Arc<dyn Encoder>, reader: Arc<dyn Reader>) -> anyhow::Result<()> {
//! let config = RetrieverConfig::default().with_searcher_type("faiss");
//! let mut retriever = Retriever::new(config, encoder, reader);
//!
//! let documents = vec![Document::new("moby-dick", "Call me Ishmael. ...")];
//! retriever.prepare(&documents).await?;
//!
//! let answer = retriever.ask("What is the narrator's name?").await?;
//! println!("{} (score {:.3})", answer.answer, answer.score);
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod retriever;
pub mod store;

pub use encoder::Encoder;
pub use error::{Result, RetrieverError};
pub use pipeline::{PassagePipeline, SourcedPassage};
pub use reader::{Answer, Reader};
pub use retriever::{Retriever, RetrieverConfig};
pub use store::{Document, PassageRecord, PassageStore};
