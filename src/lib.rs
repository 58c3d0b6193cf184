//! # askdoc
//!
//! Ask questions about a PDF document. askdoc extracts the document's text,
//! splits it into passages, embeds them with a sentence-embedding model,
//! and answers each question with the most similar passage(s).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────────┐
//! │ PDF/text │──▶│ Chunk+Embed │──▶│  ChunkIndex    │ (swapped atomically)
//! └──────────┘   └─────────────┘   └───────┬────────┘
//!                                          │
//!             question ──▶ normalize ──▶ rank ──▶ compose answer
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   CLI    │       │   HTTP   │
//!                 │ (askdoc) │       │  (axum)  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! askdoc chunks --document data/lele.pdf     # inspect chunking
//! askdoc ask "apa itu lele?"                 # answer once
//! askdoc serve                               # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | PDF / plain-text extraction |
//! | [`embedding`] | Embedding provider implementations |
//! | [`engine`] | Ingestion and question answering |
//! | [`server`] | HTTP server |
//! | [`logging`] | Tracing subscriber setup |
//!
//! Ranking, chunking, and answer formatting live in [`askdoc_core`].

pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extract;
pub mod logging;
pub mod server;

pub use askdoc_core as core;
