//! Partitioning a sentence sequence into chunks for parallel processing.

use serde::Serialize;

/// A contiguous slice of a sentence sequence, identified by its starting
/// offset in the parent sequence.
///
/// Chunks exist only transiently, for distributing combine work across
/// workers; they are never persisted. Offsets make it possible to restore
/// global order after the parallel phase regardless of completion order.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    /// Starting offset of this chunk in the parent sentence sequence.
    pub offset: usize,
    /// The sentences of this chunk, in source order.
    pub sentences: Vec<String>,
}

/// Partitions sentence sequences into contiguous chunks sized for a worker
/// pool.
///
/// With `worker_count` workers, the chunk size is
/// `len / (worker_count - 1)` (integer division), producing
/// `ceil(len / chunk_size)` chunks. When the sequence divides evenly this
/// yields one fewer chunk than there are workers, leaving one worker free —
/// intentional load-balancing slack, not an error.
#[derive(Debug, Clone)]
pub struct Chunker {
    worker_count: usize,
}

impl Chunker {
    /// Create a chunker for an explicit worker count. The count is a plain
    /// configuration value; nothing here reads process-wide state.
    pub fn new(worker_count: usize) -> Self {
        Self { worker_count }
    }

    /// Split `sentences` into contiguous chunks.
    ///
    /// The result is always a partition: concatenating the chunks in order
    /// reproduces the input exactly. Degenerate inputs (fewer than two
    /// workers, an empty sequence, or a sequence shorter than the worker
    /// count) degrade to a single chunk at offset 0.
    pub fn chunk(&self, sentences: &[String]) -> Vec<Chunk> {
        let chunk_size = if self.worker_count >= 2 {
            sentences.len() / (self.worker_count - 1)
        } else {
            0
        };

        if chunk_size == 0 {
            return vec![Chunk {
                offset: 0,
                sentences: sentences.to_vec(),
            }];
        }

        sentences
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, window)| Chunk {
                offset: i * chunk_size,
                sentences: window.to_vec(),
            })
            .collect()
    }
}
