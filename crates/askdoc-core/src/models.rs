//! Core data models shared by the ranker, the formatter, and the app crate.

use anyhow::{bail, Result};
use serde::Serialize;

/// The chunks of one ingested document together with their embeddings.
///
/// Chunks are identified only by their position. A `ChunkIndex` is never
/// mutated after construction; re-ingestion builds a new one.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    source: String,
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    dims: usize,
}

impl ChunkIndex {
    /// Build an index, checking that every chunk has exactly one embedding
    /// and that all embeddings share one dimensionality.
    pub fn new(
        source: impl Into<String>,
        chunks: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            bail!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            );
        }

        let dims = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some((i, v)) = embeddings.iter().enumerate().find(|(_, v)| v.len() != dims) {
            bail!(
                "embedding {} has {} dimensions, expected {}",
                i,
                v.len(),
                dims
            );
        }

        Ok(Self {
            source: source.into(),
            chunks,
            embeddings,
            dims,
        })
    }

    /// Label of the document this index was built from (usually a path).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Shared embedding dimensionality, `0` for an empty index.
    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// One ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Position of the chunk in its [`ChunkIndex`].
    pub index: usize,
    pub chunk: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

/// The answer returned to a caller of `ask`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub answer: String,
    pub similarity_score: f32,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_rejects_count_mismatch() {
        let err = ChunkIndex::new("doc", vec!["a".into(), "b".into()], vec![vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn index_rejects_mixed_dimensions() {
        let err = ChunkIndex::new(
            "doc",
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 0.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("dimensions"));
    }

    #[test]
    fn empty_index_has_zero_dims() {
        let index = ChunkIndex::new("doc", Vec::new(), Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dims(), 0);
    }

    #[test]
    fn response_record_omits_missing_processing_time() {
        let record = ResponseRecord {
            answer: "Based on the document, Lele.".to_string(),
            similarity_score: 0.5,
            source: "Relevant document excerpt".to_string(),
            processing_time: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("processing_time").is_none());
        assert_eq!(json["similarity_score"], 0.5);
    }
}
