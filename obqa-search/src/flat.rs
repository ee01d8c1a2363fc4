//! Exact max-inner-product search over a flat vector array.

use crate::error::{Result, SearchError};
use crate::metric::{Hit, dot, stable_top_k};

/// Exact inner-product index: vectors stored contiguously, every query
/// scored against every vector. No approximation error; the baseline the
/// approximate backends rescore against.
///
/// The approximate backends embed a `FlatIndex` for candidate rescoring, so
/// validation of the build input lives here.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    data: Vec<f32>,
    dimension: usize,
    len: usize,
}

impl FlatIndex {
    /// Build from one complete vector set snapshot.
    ///
    /// Fails with a config error when the set is empty or the vectors do
    /// not share one dimensionality.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let first = vectors
            .first()
            .ok_or_else(|| SearchError::config("cannot build an index from zero vectors"))?;
        let dimension = first.len();
        if dimension == 0 {
            return Err(SearchError::config("vectors must have non-zero dimension"));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for vector in vectors {
            if vector.len() != dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            data,
            dimension,
            len: vectors.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The stored vector at position `index`.
    pub fn vector(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.data[start..start + self.dimension]
    }

    pub(crate) fn check_query(&self, query: &[f32]) -> Result<()> {
        if query.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(())
    }

    /// Exact ranking of all vectors against `query`.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Result<Vec<usize>> {
        self.check_query(query)?;
        let hits = (0..self.len)
            .map(|i| Hit {
                index: i,
                score: dot(self.vector(i), query),
            })
            .collect();
        Ok(stable_top_k(hits, top_k)
            .into_iter()
            .map(|h| h.index)
            .collect())
    }

    /// Exact ranking restricted to a candidate set. Candidates must already
    /// be deduplicated and in range.
    pub(crate) fn rescore(&self, candidates: &[usize], query: &[f32], top_k: usize) -> Vec<usize> {
        let hits = candidates
            .iter()
            .map(|&i| Hit {
                index: i,
                score: dot(self.vector(i), query),
            })
            .collect();
        stable_top_k(hits, top_k)
            .into_iter()
            .map(|h| h.index)
            .collect()
    }
}
