//! # obqa-search
//!
//! Pluggable vector search over passage embeddings. One contract, three
//! interchangeable backends with very different indexing/query cost models:
//!
//! - **`faiss`** → [`FlatIndex`]: exact max-inner-product ranking, O(n·d)
//!   per query, no approximation error.
//! - **`annoy`** → [`TreeIndex`]: a forest of randomized hyperplane trees;
//!   approximate, recall governed by the tree count.
//! - **`scann`** → [`QuantizedIndex`]: k-means partitioning with an exact
//!   brute-force rescore over a candidate pool; the pool size trades recall
//!   for latency.
//!
//! The backend is resolved once from its string tag at construction; an
//! unrecognized tag is a [`SearchError::Config`], never a silent fallback.
//! A built [`SearchIndex`] is immutable: a changed corpus requires a full
//! rebuild, and concurrent `rank` calls on one index are safe.
//!
//! ```
//! use obqa_search::{SearchBackend, SearchIndex};
//!
//! # fn example() -> obqa_search::Result<()> {
//! let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
//! let backend = SearchBackend::parse("faiss")?;
//! let index = SearchIndex::build(backend, &vectors)?;
//! assert_eq!(index.rank(&[0.9, 0.1], 1)?, vec![0]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod flat;
pub mod metric;
pub mod quantized;
pub mod seed;
pub mod tree;

pub use error::{Result, SearchError};
pub use flat::FlatIndex;
pub use quantized::{QuantizedIndex, QuantizedParams};
pub use tree::{TreeIndex, TreeParams};

/// The three supported similarity-search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    /// Exact inner-product ranking over a flat array (`"faiss"`).
    ExactInnerProduct,
    /// Randomized-tree approximate search (`"annoy"`).
    TreeApproximate,
    /// Quantized approximate search with brute-force rescoring (`"scann"`).
    QuantizedApproximate,
}

impl SearchBackend {
    /// Resolve a backend from its configuration tag.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "faiss" => Ok(Self::ExactInnerProduct),
            "annoy" => Ok(Self::TreeApproximate),
            "scann" => Ok(Self::QuantizedApproximate),
            other => Err(SearchError::config(format!(
                "unknown searcher type {other:?} (expected \"faiss\", \"annoy\" or \"scann\")"
            ))),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::ExactInnerProduct => "faiss",
            Self::TreeApproximate => "annoy",
            Self::QuantizedApproximate => "scann",
        }
    }
}

/// A built search index: a closed union over the three backends.
///
/// Exactly one variant is active for the lifetime of an instance; there is
/// no runtime switching after construction.
#[derive(Debug)]
pub enum SearchIndex {
    Flat(FlatIndex),
    Tree(TreeIndex),
    Quantized(QuantizedIndex),
}

impl SearchIndex {
    /// Build an index over one complete vector snapshot with the backend's
    /// default parameters.
    ///
    /// Fails with [`SearchError::Config`] when the snapshot is empty and
    /// with [`SearchError::DimensionMismatch`] when the vectors disagree on
    /// dimensionality.
    pub fn build(backend: SearchBackend, vectors: &[Vec<f32>]) -> Result<Self> {
        let index = match backend {
            SearchBackend::ExactInnerProduct => Self::Flat(FlatIndex::build(vectors)?),
            SearchBackend::TreeApproximate => {
                Self::Tree(TreeIndex::build(vectors, TreeParams::default())?)
            }
            SearchBackend::QuantizedApproximate => {
                Self::Quantized(QuantizedIndex::build(vectors, QuantizedParams::default())?)
            }
        };
        tracing::info!(
            backend = backend.tag(),
            vectors = index.total_vectors(),
            dimension = index.dimension(),
            "indexing completed"
        );
        Ok(index)
    }

    /// Build a tree-approximate index with explicit parameters.
    pub fn build_tree(vectors: &[Vec<f32>], params: TreeParams) -> Result<Self> {
        Ok(Self::Tree(TreeIndex::build(vectors, params)?))
    }

    /// Build a quantized index with explicit parameters.
    pub fn build_quantized(vectors: &[Vec<f32>], params: QuantizedParams) -> Result<Self> {
        Ok(Self::Quantized(QuantizedIndex::build(vectors, params)?))
    }

    /// Rank indexed positions against `query`, most similar first.
    ///
    /// Returns at most `min(top_k, total_vectors)` positions, each within
    /// `[0, total_vectors)`; ties break toward the lower position.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Result<Vec<usize>> {
        match self {
            Self::Flat(index) => index.rank(query, top_k),
            Self::Tree(index) => index.rank(query, top_k),
            Self::Quantized(index) => index.rank(query, top_k),
        }
    }

    /// Number of vectors this index was built over; fixed after `build`.
    pub fn total_vectors(&self) -> usize {
        match self {
            Self::Flat(index) => index.len(),
            Self::Tree(index) => index.len(),
            Self::Quantized(index) => index.len(),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Self::Flat(index) => index.dimension(),
            Self::Tree(index) => index.dimension(),
            Self::Quantized(index) => index.dimension(),
        }
    }

    pub fn backend(&self) -> SearchBackend {
        match self {
            Self::Flat(_) => SearchBackend::ExactInnerProduct,
            Self::Tree(_) => SearchBackend::TreeApproximate,
            Self::Quantized(_) => SearchBackend::QuantizedApproximate,
        }
    }
}
