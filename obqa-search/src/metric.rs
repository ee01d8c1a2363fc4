//! Similarity scoring helpers shared by all backends.

/// Inner product of two equal-length vectors.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// A scored candidate: a passage position plus its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub score: f32,
}

/// Sort hits from most to least similar and keep the best `k`.
///
/// Ties break toward the lower index, so ranking is stable with respect to
/// insertion order.
pub fn stable_top_k(mut hits: Vec<Hit>, k: usize) -> Vec<Hit> {
    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.index.cmp(&b.index))
    });
    hits.truncate(k);
    hits
}
