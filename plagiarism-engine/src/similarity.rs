//! Nearest-neighbor search over L2-normalized embeddings. Each problem's
//! candidate set is the handful of other users' submissions for that
//! problem, so a brute-force top-1 scan is the right size of tool: there
//! is no index-build cost to amortize and no approximate-recall tradeoff
//! to accept.

/// The inner product of two L2-normalized vectors equals their cosine
/// similarity; panics if the vectors differ in length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "embedding dimension mismatch");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// The index into `candidates` with the highest similarity to `query`,
/// and that similarity score. `None` if `candidates` is empty.
pub fn top1(query: &[f32], candidates: &[Vec<f32>]) -> Option<(usize, f32)> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, cosine_similarity(query, c)))
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}
