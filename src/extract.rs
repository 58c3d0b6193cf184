//! Plain-text extraction from uploaded or on-disk documents.
//!
//! PDF is the primary format; `text/plain` is accepted as-is so documents
//! that were already extracted can be ingested directly. PDF parsing is
//! CPU-bound and runs on tokio's blocking pool.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("document is not valid UTF-8 text")]
    InvalidText,
}

/// Guess a content type from a file extension. Unknown extensions are
/// treated as PDF, the service's native format.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("txt") | Some("md") => MIME_TEXT,
        _ => MIME_PDF,
    }
}

/// Extracts plain text from in-memory document bytes.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
    match content_type {
        MIME_PDF => extract_pdf(bytes),
        MIME_TEXT => String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::InvalidText),
        _ => Err(ExtractError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Read and extract the document at `path`.
pub async fn extract_file(path: &Path) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    extract_bytes(bytes, content_type_for(path)).await
}

/// Extract owned bytes on the blocking pool.
pub async fn extract_bytes(bytes: Vec<u8>, content_type: &str) -> Result<String, ExtractError> {
    let content_type = content_type.to_string();
    tokio::task::spawn_blocking(move || extract_text(&bytes, &content_type))
        .await
        .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {}", e)))?
}
