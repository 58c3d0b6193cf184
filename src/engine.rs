//! Question-answering engine: ingestion and query orchestration.
//!
//! [`QaEngine`] owns the current [`ChunkIndex`] behind an
//! [`ArcSwapOption`]. `None` means NOT_READY; `Some` means READY. Ingestion
//! builds a complete new index off to the side and publishes it with a
//! single atomic store, so a concurrent `ask` sees either the previous
//! index or the new one, never a mix.
//!
//! ```text
//!  ingest_*()                              ask()
//!     │                                      │
//!     ▼                                      ▼
//!  extract → chunk → embed → ChunkIndex   normalize → embed → rank → compose
//!                               │                               ▲
//!                               └──── ArcSwapOption::store ─────┘
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use arc_swap::ArcSwapOption;
use serde::Serialize;
use tokio::sync::Mutex;

use askdoc_core::answer::{compose_answer, AnswerPolicy};
use askdoc_core::chunk::split_into_chunks;
use askdoc_core::models::{ChunkIndex, ResponseRecord};
use askdoc_core::query::normalize_query;
use askdoc_core::rank::Ranker;

use crate::config::Config;
use crate::embedding::{embed_in_batches, embed_query, EmbeddingProvider};
use crate::error::AskError;
use crate::extract;

pub const SOURCE_FOUND: &str = "Relevant document excerpt";
pub const SOURCE_NONE: &str = "No relevant source";

/// Readiness as reported by `GET /status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady,
}

/// Settings the engine needs from [`Config`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub chunk_words: usize,
    pub batch_size: usize,
    pub ranker: Ranker,
    pub answer: AnswerPolicy,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_words: config.chunking.chunk_words,
            batch_size: config.embedding.batch_size,
            ranker: config.retrieval.ranker(),
            answer: config.retrieval.answer_policy(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct QaEngine {
    provider: Arc<dyn EmbeddingProvider>,
    settings: EngineSettings,
    index: ArcSwapOption<ChunkIndex>,
    /// Serializes ingestions; queries never take it.
    ingest_lock: Mutex<()>,
}

impl QaEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, settings: EngineSettings) -> Self {
        Self {
            provider,
            settings,
            index: ArcSwapOption::empty(),
            ingest_lock: Mutex::new(()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.index.load().is_some()
    }

    pub fn status(&self) -> Readiness {
        if self.is_ready() {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }

    /// Number of chunks in the current index, `None` when NOT_READY.
    pub fn chunk_count(&self) -> Option<usize> {
        self.index.load().as_ref().map(|idx| idx.len())
    }

    /// The current index, if any.
    pub fn current_index(&self) -> Option<Arc<ChunkIndex>> {
        self.index.load_full()
    }

    /// Ingest the document at `path`, replacing the current index.
    pub async fn ingest_path(&self, path: &Path) -> Result<usize, AskError> {
        let _guard = self.ingest_lock.lock().await;
        self.ingest_path_locked(path).await
    }

    async fn ingest_path_locked(&self, path: &Path) -> Result<usize, AskError> {
        self.index.store(None);
        tracing::info!(path = %path.display(), "processing document");

        let result = async {
            let text = extract::extract_file(path).await?;
            self.build_index(&text, &path.display().to_string()).await
        }
        .await;
        self.publish(result)
    }

    /// Ingest an in-memory document, replacing the current index.
    pub async fn ingest_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        label: &str,
    ) -> Result<usize, AskError> {
        let _guard = self.ingest_lock.lock().await;
        self.index.store(None);
        tracing::info!(document = label, content_type, "processing document");

        let result = async {
            let text = extract::extract_bytes(bytes, content_type).await?;
            self.build_index(&text, label).await
        }
        .await;
        self.publish(result)
    }

    /// Ingest already-extracted text, replacing the current index.
    pub async fn ingest_text(&self, text: &str, label: &str) -> Result<usize, AskError> {
        let _guard = self.ingest_lock.lock().await;
        self.index.store(None);
        tracing::info!(document = label, "processing text");

        let result = self.build_index(text, label).await;
        self.publish(result)
    }

    /// Ingest `path` unless an index is already loaded.
    ///
    /// Readiness is checked under the ingestion lock, so callers racing a
    /// startup ingestion do not process the document twice.
    pub async fn ensure_ready(&self, path: &Path) -> Result<(), AskError> {
        if self.is_ready() {
            return Ok(());
        }
        let _guard = self.ingest_lock.lock().await;
        if self.is_ready() {
            return Ok(());
        }
        self.ingest_path_locked(path).await.map(|_| ())
    }

    async fn build_index(&self, text: &str, label: &str) -> Result<ChunkIndex, AskError> {
        let chunks = split_into_chunks(text, self.settings.chunk_words);
        if chunks.is_empty() {
            return Err(AskError::Ingestion(format!("no text found in {}", label)));
        }
        tracing::info!(
            chunks = chunks.len(),
            model = self.provider.model_name(),
            "generating embeddings"
        );

        let embeddings = embed_in_batches(self.provider.as_ref(), &chunks, self.settings.batch_size)
            .await
            .context("embedding document chunks")
            .map_err(AskError::ingestion)?;

        let expected = self.provider.dims();
        if let Some(v) = embeddings.iter().find(|v| v.len() != expected) {
            return Err(AskError::Ingestion(format!(
                "model {} returned a {}-dimensional vector, expected {}",
                self.provider.model_name(),
                v.len(),
                expected
            )));
        }

        ChunkIndex::new(label, chunks, embeddings).map_err(AskError::ingestion)
    }

    fn publish(&self, result: Result<ChunkIndex, AskError>) -> Result<usize, AskError> {
        match result {
            Ok(index) => {
                let count = index.len();
                self.index.store(Some(Arc::new(index)));
                tracing::info!(chunks = count, "document ready");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "document processing failed");
                Err(e)
            }
        }
    }

    /// Answer a question from the current index.
    pub async fn ask(&self, query: &str) -> Result<ResponseRecord, AskError> {
        let index = self.index.load_full().ok_or(AskError::NotReady)?;
        tracing::info!(query, "question received");
        let started = Instant::now();

        let normalized = normalize_query(query);
        let query_vec = embed_query(self.provider.as_ref(), &normalized)
            .await
            .map_err(AskError::query)?;

        if !index.is_empty() && query_vec.len() != index.dims() {
            return Err(AskError::query(anyhow!(
                "query embedding has {} dimensions, index has {}",
                query_vec.len(),
                index.dims()
            )));
        }

        let results = self.settings.ranker.search(&query_vec, &index);

        let mut record = match compose_answer(&normalized, &results, &self.settings.answer) {
            Some(answer) => ResponseRecord {
                answer,
                similarity_score: results[0].score,
                source: SOURCE_FOUND.to_string(),
                processing_time: None,
            },
            None => not_found_record(&normalized),
        };

        let elapsed = started.elapsed().as_secs_f64();
        tracing::info!(elapsed_secs = elapsed, score = record.similarity_score, "question answered");
        record.processing_time = Some(format!("{:.2} seconds", elapsed));
        Ok(record)
    }
}

/// Answer for an index with no chunks. Ingestion never publishes one, so
/// this is only reached through an index built elsewhere.
fn not_found_record(query: &str) -> ResponseRecord {
    ResponseRecord {
        answer: format!(
            "Sorry, no relevant information about '{}' was found in the document.",
            query
        ),
        similarity_score: 0.0,
        source: SOURCE_NONE.to_string(),
        processing_time: None,
    }
}
