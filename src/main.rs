//! # askdoc CLI
//!
//! ## Usage
//!
//! ```bash
//! askdoc --config ./config/askdoc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askdoc serve` | Start the HTTP server |
//! | `askdoc ask "<question>"` | Ingest the document and answer one question |
//! | `askdoc chunks` | Print the chunks a document is split into |

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use askdoc::config::{self, Config};
use askdoc::core::chunk::split_into_chunks;
use askdoc::embedding::create_provider;
use askdoc::engine::{EngineSettings, QaEngine};
use askdoc::{extract, logging, server};

/// askdoc: answer questions from a PDF document.
#[derive(Parser)]
#[command(name = "askdoc", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is absent.
    #[arg(long, global = true, default_value = "./config/askdoc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind`, ingests `[document].path` in the
    /// background, and serves /ask, /upload, and /status.
    Serve,

    /// Ingest a document and answer a single question.
    ///
    /// Prints the response record as JSON.
    Ask {
        /// The question.
        query: String,

        /// Document to read instead of `[document].path`.
        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Extract and chunk a document without embedding it.
    Chunks {
        /// Document to read instead of `[document].path`.
        #[arg(long)]
        document: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask { query, document } => {
            let path = document.unwrap_or_else(|| cfg.document.path.clone());
            run_ask(&cfg, &path, &query).await?;
        }
        Commands::Chunks { document } => {
            let path = document.unwrap_or_else(|| cfg.document.path.clone());
            run_chunks(&cfg, &path).await?;
        }
    }

    Ok(())
}

async fn run_ask(cfg: &Config, path: &std::path::Path, query: &str) -> anyhow::Result<()> {
    let provider = create_provider(&cfg.embedding)?;
    let engine = QaEngine::new(provider, EngineSettings::from_config(cfg));
    engine.ingest_path(path).await?;

    let record = engine.ask(query).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_chunks(cfg: &Config, path: &std::path::Path) -> anyhow::Result<()> {
    let text = extract::extract_file(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let chunks = split_into_chunks(&text, cfg.chunking.chunk_words);

    println!("{}: {} chunks", path.display(), chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        println!();
        println!("[{}] {} words", i, chunk.split_whitespace().count());
        println!("{}", chunk);
    }
    Ok(())
}

