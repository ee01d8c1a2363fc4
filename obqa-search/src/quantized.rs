//! Quantized approximate search: k-means partitioning with exact rescoring.
//!
//! Build time trains a small codebook over the vectors and assigns each one
//! to its nearest centroid. A query scores the centroids by inner product,
//! gathers the members of the best few partitions as a candidate pool, and
//! brute-force rescores that pool exactly. The number of partitions probed
//! trades recall for latency.

use crate::error::Result;
use crate::flat::FlatIndex;
use crate::metric::{Hit, dot, stable_top_k};
use crate::seed::SplitMix64;

/// Construction and query parameters for [`QuantizedIndex`].
#[derive(Debug, Clone)]
pub struct QuantizedParams {
    /// Codebook size; defaults to `ceil(sqrt(n))` when unset.
    pub partitions: Option<usize>,
    /// Number of partitions probed per query.
    pub search_partitions: usize,
    /// Lloyd iterations when training the codebook.
    pub iterations: usize,
    /// RNG seed for codebook initialization.
    pub seed: u64,
}

impl Default for QuantizedParams {
    fn default() -> Self {
        Self {
            partitions: None,
            search_partitions: 8,
            iterations: 10,
            seed: 0x5ca9_9001,
        }
    }
}

impl QuantizedParams {
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions);
        self
    }

    pub fn with_search_partitions(mut self, search_partitions: usize) -> Self {
        self.search_partitions = search_partitions;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Approximate index over a k-means codebook.
#[derive(Debug)]
pub struct QuantizedIndex {
    base: FlatIndex,
    centroids: Vec<Vec<f32>>,
    members: Vec<Vec<u32>>,
    params: QuantizedParams,
}

impl QuantizedIndex {
    pub fn build(vectors: &[Vec<f32>], params: QuantizedParams) -> Result<Self> {
        let base = FlatIndex::build(vectors)?;
        let k = params
            .partitions
            .unwrap_or_else(|| (base.len() as f64).sqrt().ceil() as usize)
            .clamp(1, base.len());

        let mut rng = SplitMix64::new(params.seed);
        let mut centroids = init_centroids(&base, k, &mut rng);

        let mut assignments = vec![0usize; base.len()];
        for _ in 0..params.iterations {
            for i in 0..base.len() {
                assignments[i] = nearest_centroid(base.vector(i), &centroids);
            }
            recompute_centroids(&base, &assignments, &mut centroids);
        }
        for i in 0..base.len() {
            assignments[i] = nearest_centroid(base.vector(i), &centroids);
        }

        let mut members = vec![Vec::new(); centroids.len()];
        for (i, &c) in assignments.iter().enumerate() {
            members[c].push(i as u32);
        }

        tracing::debug!(
            partitions = centroids.len(),
            vectors = base.len(),
            "quantized index built"
        );
        Ok(Self {
            base,
            centroids,
            members,
            params,
        })
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.base.dimension()
    }

    /// Approximate ranking: probe the best partitions by centroid score,
    /// then exact-rescore the pooled members. Extra partitions are pulled
    /// in when the pool would otherwise be smaller than `top_k`.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Result<Vec<usize>> {
        self.base.check_query(query)?;

        let hits = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| Hit {
                index: i,
                score: dot(c, query),
            })
            .collect();
        let probe_order = stable_top_k(hits, self.centroids.len());

        let mut candidates = Vec::new();
        for (probed, hit) in probe_order.iter().enumerate() {
            if probed >= self.params.search_partitions && candidates.len() >= top_k {
                break;
            }
            candidates.extend(self.members[hit.index].iter().map(|&i| i as usize));
        }

        Ok(self.base.rescore(&candidates, query, top_k))
    }
}

/// k-means++ style seeding: the first centroid uniform, the rest drawn with
/// probability proportional to squared distance from the chosen set.
fn init_centroids(base: &FlatIndex, k: usize, rng: &mut SplitMix64) -> Vec<Vec<f32>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(base.vector(rng.next_below(base.len())).to_vec());

    let mut distances: Vec<f64> = (0..base.len())
        .map(|i| squared_distance(base.vector(i), &centroids[0]) as f64)
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();
        let chosen = if total > 0.0 {
            let mut draw = rng.next_f64() * total;
            let mut chosen = base.len() - 1;
            for (i, &d) in distances.iter().enumerate() {
                if draw < d {
                    chosen = i;
                    break;
                }
                draw -= d;
            }
            chosen
        } else {
            rng.next_below(base.len())
        };

        let centroid = base.vector(chosen).to_vec();
        for i in 0..base.len() {
            let d = squared_distance(base.vector(i), &centroid) as f64;
            if d < distances[i] {
                distances[i] = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(vector, centroid);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

/// Move each centroid to the mean of its members; centroids that lost all
/// members keep their previous position.
fn recompute_centroids(base: &FlatIndex, assignments: &[usize], centroids: &mut [Vec<f32>]) {
    let dim = base.dimension();
    let mut sums = vec![vec![0.0f32; dim]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (i, &c) in assignments.iter().enumerate() {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(base.vector(i)) {
            *s += v;
        }
    }

    for (c, centroid) in centroids.iter_mut().enumerate() {
        if counts[c] > 0 {
            for (value, sum) in centroid.iter_mut().zip(&sums[c]) {
                *value = sum / counts[c] as f32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    fn params() -> QuantizedParams {
        QuantizedParams::default().with_partitions(3)
    }

    fn clustered_vectors() -> Vec<Vec<f32>> {
        let mut vectors = Vec::new();
        for axis in 0..3 {
            for jitter in 0..5 {
                let mut v = vec![0.0f32; 6];
                v[axis] = 1.0;
                v[(axis + 3) % 6] = 0.02 * jitter as f32;
                vectors.push(v);
            }
        }
        vectors
    }

    #[test]
    fn test_empty_build_fails() {
        let err = QuantizedIndex::build(&[], params()).unwrap_err();
        assert!(matches!(err, SearchError::Config { .. }));
    }

    #[test]
    fn test_identity_query_found_first() {
        let vectors = clustered_vectors();
        let index = QuantizedIndex::build(&vectors, params()).unwrap();
        for (i, vector) in vectors.iter().enumerate() {
            let ranked = index.rank(vector, 1).unwrap();
            assert_eq!(ranked[0], i, "vector {i} should rank itself first");
        }
    }

    #[test]
    fn test_indices_in_range_and_unique() {
        let vectors = clustered_vectors();
        let index = QuantizedIndex::build(&vectors, params()).unwrap();
        let ranked = index.rank(&[0.4, 0.3, 0.2, 0.1, 0.0, 0.0], 10).unwrap();
        assert!(ranked.len() <= 10);
        let mut sorted = ranked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ranked.len());
        assert!(ranked.iter().all(|&i| i < vectors.len()));
    }

    #[test]
    fn test_pool_extends_to_cover_top_k() {
        // One probed partition cannot satisfy top_k alone; the pool must
        // pull in further partitions instead of coming up short.
        let vectors = clustered_vectors();
        let index = QuantizedIndex::build(
            &vectors,
            params().with_search_partitions(1),
        )
        .unwrap();
        let ranked = index.rank(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn test_build_is_deterministic() {
        let vectors = clustered_vectors();
        let a = QuantizedIndex::build(&vectors, params().with_seed(5)).unwrap();
        let b = QuantizedIndex::build(&vectors, params().with_seed(5)).unwrap();
        let query = vec![0.2; 6];
        assert_eq!(a.rank(&query, 6).unwrap(), b.rank(&query, 6).unwrap());
    }

    #[test]
    fn test_single_vector_set() {
        let index = QuantizedIndex::build(&[vec![1.0, 2.0]], params()).unwrap();
        assert_eq!(index.rank(&[1.0, 2.0], 3).unwrap(), vec![0]);
    }
}
