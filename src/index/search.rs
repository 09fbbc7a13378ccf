//! Brute-force cosine scan over the stored vector array.
//!
//! Every stored and query vector is unit-normalized (or an all-zero
//! sentinel), so cosine similarity reduces to a dot product and exact
//! search is a single linear pass. No approximate index structures — at
//! this corpus scale the scan is fast enough and always exact.

/// Score every stored vector against the query and return the top `k`
/// `(label, similarity)` pairs in descending similarity order.
pub fn top_k(query: &[f32], vectors: &[f32], dim: usize, k: usize) -> Vec<(usize, f32)> {
    if dim == 0 || vectors.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = vectors
        .chunks_exact(dim)
        .enumerate()
        .map(|(label, row)| (label, dot(query, row)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    scored
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
