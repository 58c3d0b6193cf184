//! # askdoc Core
//!
//! Pure logic for askdoc: data models, the paragraph chunker, query
//! normalization, the embedding provider trait, similarity ranking, and
//! answer formatting.
//!
//! This crate contains no tokio, HTTP, filesystem I/O, or model runtime
//! dependencies. The application crate supplies extracted text and an
//! [`embedding::EmbeddingProvider`] implementation.

pub mod answer;
pub mod chunk;
pub mod embedding;
pub mod models;
pub mod query;
pub mod rank;
