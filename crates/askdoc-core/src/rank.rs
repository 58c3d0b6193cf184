//! Cosine-similarity ranking of chunks against a query embedding.
//!
//! # Algorithm
//!
//! 1. Score every chunk embedding against the query (cosine similarity).
//! 2. Keep the chunks whose score is at least `threshold`.
//! 3. If none pass and the index is non-empty, keep every chunk instead so
//!    the best `top_k` are returned regardless of the threshold.
//! 4. Sort by score descending. Equal scores keep their original order.
//! 5. Truncate to `top_k`.
//!
//! The fallback in step 3 means a non-empty index never yields zero
//! candidates.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::models::{ChunkIndex, SearchResult};

/// Default minimum similarity for a chunk to count as relevant.
pub const DEFAULT_THRESHOLD: f32 = 0.4;
/// Default number of results returned by [`Ranker::search`].
pub const DEFAULT_TOP_K: usize = 3;

/// Ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranker {
    pub threshold: f32,
    pub top_k: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Ranker {
    pub fn new(threshold: f32, top_k: usize) -> Self {
        Self { threshold, top_k }
    }

    /// Rank raw embeddings, returning `(index, score)` pairs.
    pub fn rank(&self, query: &[f32], embeddings: &[Vec<f32>]) -> Vec<(usize, f32)> {
        let scores: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, e)))
            .collect();

        let mut selected: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .filter(|(_, s)| *s >= self.threshold)
            .collect();

        if selected.is_empty() {
            selected = scores;
        }

        // sort_by is stable: ties stay in index order
        selected.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        selected.truncate(self.top_k);
        selected
    }

    /// Rank the chunks of `index` against `query`.
    pub fn search(&self, query: &[f32], index: &ChunkIndex) -> Vec<SearchResult> {
        self.rank(query, index.embeddings())
            .into_iter()
            .map(|(i, score)| SearchResult {
                index: i,
                chunk: index.chunks()[i].clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(vectors: Vec<Vec<f32>>) -> ChunkIndex {
        let chunks = (0..vectors.len()).map(|i| format!("Chunk {}.", i)).collect();
        ChunkIndex::new("test", chunks, vectors).unwrap()
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = index(Vec::new());
        assert!(Ranker::default().search(&[1.0, 0.0], &idx).is_empty());
        assert!(Ranker::default().search(&[], &idx).is_empty());
    }

    #[test]
    fn results_above_threshold_sorted_descending() {
        let idx = index(vec![
            vec![1.0, 1.0],  // ~0.707
            vec![1.0, 0.0],  // 1.0
            vec![0.0, 1.0],  // 0.0
            vec![1.0, 0.2],  // ~0.98
        ]);
        let results = Ranker::default().search(&[1.0, 0.0], &idx);
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3, 0]);
        assert_eq!(results[0].chunk, "Chunk 1.");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn nan_embedding_scores_zero_and_keeps_order() {
        let idx = index(vec![
            vec![f32::NAN, 0.0],
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
        ]);
        let results = Ranker::new(-1.0, 3).search(&[1.0, 0.0], &idx);
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
    }

    #[test]
    fn threshold_filters_before_top_k() {
        let idx = index(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]]);
        let results = Ranker::new(0.5, 3).search(&[1.0, 0.0], &idx);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
    }

    #[test]
    fn fallback_when_nothing_passes_threshold() {
        let idx = index(vec![
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
            vec![0.3, 1.0],
            vec![0.1, 1.0],
        ]);
        let results = Ranker::new(0.9, 3).search(&[1.0, 0.0], &idx);
        assert_eq!(results.len(), 3);
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 3, 0]);
        assert!(results.iter().all(|r| r.score < 0.9));
    }

    #[test]
    fn fallback_with_fewer_chunks_than_k() {
        let idx = index(vec![vec![0.0, 1.0], vec![-1.0, 0.0]]);
        let results = Ranker::new(0.9, 5).search(&[1.0, 0.0], &idx);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[1].index, 1);
    }

    #[test]
    fn ties_keep_index_order() {
        let idx = index(vec![vec![0.0, 1.0], vec![2.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0]]);
        let results = Ranker::new(0.4, 3).search(&[1.0, 0.0], &idx);
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn scores_within_cosine_range() {
        let idx = index(vec![
            vec![0.3, -0.7, 2.0],
            vec![-5.0, 1.0, 0.5],
            vec![1e-3, 1e3, -1e2],
            vec![0.3, -0.7, 2.0],
        ]);
        for k in 0..6 {
            let results = Ranker::new(-1.0, k).search(&[0.3, -0.7, 2.0], &idx);
            assert!(results.len() <= k);
            for r in &results {
                assert!((-1.0..=1.0).contains(&r.score));
            }
        }
    }

    #[test]
    fn search_is_idempotent() {
        let idx = index(vec![vec![0.2, 0.9], vec![0.9, 0.2], vec![0.5, 0.5]]);
        let ranker = Ranker::default();
        let first = ranker.search(&[0.7, 0.3], &idx);
        let second = ranker.search(&[0.7, 0.3], &idx);
        assert_eq!(first, second);
    }

    #[test]
    fn identical_embedding_scores_one() {
        let idx = index(vec![vec![0.1, 0.2, 0.3]]);
        let results = Ranker::default().search(&[0.1, 0.2, 0.3], &idx);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }
}
