//! Passage construction for open-domain question answering.
//!
//! This crate turns long documents into retrieval-ready passages: text is
//! cleaned, segmented into sentences, partitioned into contiguous chunks for
//! parallel processing, and finally merged into passages whose token counts
//! approximate a configurable budget. The downstream search and retrieval
//! layers live in the companion crates; this one is purely synchronous text
//! handling.
//!
//! ## Pipeline shape
//!
//! ```text
//! raw text → clean → SentenceSegmenter → Chunker → Combiner → passages
//! ```
//!
//! Sentence order is semantically meaningful (reading order) and every stage
//! preserves it: chunking is a partition of the sentence sequence, and
//! combining is a single forward pass inside each chunk.

pub mod chunker;
pub mod clean;
pub mod combiner;
pub mod segment;
pub mod tokens;

pub use chunker::{Chunk, Chunker};
pub use clean::clean_text;
pub use combiner::{Combiner, Passage};
pub use segment::{RegexSegmenter, SentenceSegmenter};
pub use tokens::TokenCounter;
