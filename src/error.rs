//! Errors surfaced by the question-answering engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::extract::ExtractError;

#[derive(Debug, Error)]
pub enum AskError {
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Extraction(ExtractError),
    /// Chunking, embedding, or index construction failed.
    #[error("ingestion failed: {0}")]
    Ingestion(String),
    #[error("no document has been processed yet")]
    NotReady,
    #[error("query failed: {0}")]
    Query(String),
}

impl From<ExtractError> for AskError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NotFound(path) => AskError::NotFound(path),
            other => AskError::Extraction(other),
        }
    }
}

impl AskError {
    pub(crate) fn ingestion(err: anyhow::Error) -> Self {
        AskError::Ingestion(format!("{:#}", err))
    }

    pub(crate) fn query(err: anyhow::Error) -> Self {
        AskError::Query(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_extraction_maps_to_not_found() {
        let err: AskError = ExtractError::NotFound(PathBuf::from("data/lele.pdf")).into();
        assert!(matches!(err, AskError::NotFound(_)));
        assert_eq!(err.to_string(), "document not found: data/lele.pdf");
    }

    #[test]
    fn other_extraction_errors_are_wrapped() {
        let err: AskError = ExtractError::Pdf("bad xref".to_string()).into();
        assert!(matches!(err, AskError::Extraction(_)));
        assert_eq!(err.to_string(), "PDF extraction failed: bad xref");
    }

    #[test]
    fn ingestion_keeps_cause_chain() {
        let cause = anyhow::anyhow!("connection refused").context("embedding batch failed");
        let err = AskError::ingestion(cause);
        assert_eq!(
            err.to_string(),
            "ingestion failed: embedding batch failed: connection refused"
        );
    }
}
