//! Flat in-memory vector index.
//!
//! Exact cosine scan over every catalog vector. Immutable after construction.

#[derive(Debug, Clone)]
struct IndexEntry {
    row_index: usize,
    vector: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    /// Pairs row indices with their vectors. Both slices must be the same length.
    pub fn build(row_indices: &[usize], vectors: Vec<Vec<f32>>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            row_indices.len() == vectors.len(),
            "index build got {} rows but {} vectors",
            row_indices.len(),
            vectors.len()
        );
        let entries = row_indices
            .iter()
            .zip(vectors)
            .map(|(&row_index, vector)| IndexEntry { row_index, vector })
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` rows by cosine similarity, most similar first. Equal scores keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .map(|e| (e.row_index, cosine_similarity(query, &e.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let similarity = if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    };
    // NaN would otherwise outrank every real score under total ordering.
    if similarity.is_nan() {
        0.0
    } else {
        similarity
    }
}
