//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all, see [`load_config`]) yields a working configuration that reads
//! `data/lele.pdf` and embeds locally with all-MiniLM-L6-v2.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use askdoc_core::answer::AnswerPolicy;
use askdoc_core::rank::Ranker;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    /// Document ingested at startup and on the first question.
    #[serde(default = "default_document_path")]
    pub path: PathBuf,
    /// Directory uploaded documents are written to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: default_document_path(),
            upload_dir: default_upload_dir(),
        }
    }
}

fn default_document_path() -> PathBuf {
    PathBuf::from("data/lele.pdf")
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_words: default_chunk_words(),
        }
    }
}

fn default_chunk_words() -> usize {
    askdoc_core::chunk::DEFAULT_CHUNK_WORDS
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_merge_margin")]
    pub merge_margin: f32,
    #[serde(default = "default_max_answer_chars")]
    pub max_answer_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            top_k: default_top_k(),
            merge_margin: default_merge_margin(),
            max_answer_chars: default_max_answer_chars(),
        }
    }
}

impl RetrievalConfig {
    pub fn ranker(&self) -> Ranker {
        Ranker::new(self.similarity_threshold, self.top_k)
    }

    pub fn answer_policy(&self) -> AnswerPolicy {
        AnswerPolicy {
            merge_margin: self.merge_margin,
            max_answer_chars: self.max_answer_chars,
        }
    }
}

fn default_similarity_threshold() -> f32 {
    askdoc_core::rank::DEFAULT_THRESHOLD
}
fn default_top_k() -> usize {
    askdoc_core::rank::DEFAULT_TOP_K
}
fn default_merge_margin() -> f32 {
    askdoc_core::answer::DEFAULT_MERGE_MARGIN
}
fn default_max_answer_chars() -> usize {
    askdoc_core::answer::DEFAULT_MAX_ANSWER_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Extra attempts for failed remote embedding requests. `0` sends each
    /// request once and reports the first failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    0
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory served at `/` (the chat front end), if any.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load and validate the configuration at `path`.
///
/// A missing file is not an error: built-in defaults are used instead.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_words == 0 {
        bail!("chunking.chunk_words must be > 0");
    }

    let retrieval = &config.retrieval;
    if retrieval.top_k < 1 {
        bail!("retrieval.top_k must be >= 1");
    }
    if !(-1.0..=1.0).contains(&retrieval.similarity_threshold) {
        bail!("retrieval.similarity_threshold must be in [-1.0, 1.0]");
    }
    if !(0.0..=2.0).contains(&retrieval.merge_margin) {
        bail!("retrieval.merge_margin must be in [0.0, 2.0]");
    }
    if retrieval.max_answer_chars == 0 {
        bail!("retrieval.max_answer_chars must be > 0");
    }

    if config.embedding.batch_size == 0 {
        bail!("embedding.batch_size must be > 0");
    }

    match config.embedding.provider.as_str() {
        "local" | "ollama" | "openai" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be local, ollama, or openai.",
            other
        ),
    }

    if config.embedding.provider != "local" {
        if config.embedding.model.is_none() {
            bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    Ok(())
}
