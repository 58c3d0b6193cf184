//! Sentence-boundary text chunker.
//!
//! Splits extracted document text into chunks of roughly `chunk_words`
//! words. Splitting happens between sentences so each chunk reads as a
//! coherent passage.
//!
//! # Algorithm
//!
//! 1. Collapse all whitespace runs (including PDF line breaks) to one space.
//! 2. Split at sentence boundaries: a `.` followed by whitespace and an
//!    uppercase letter. The period stays with its sentence.
//! 3. Accumulate sentences into a buffer until adding the next one would
//!    push the buffer above `1.5 × chunk_words` words.
//! 4. When exceeded, flush the buffer as a chunk and start a new one with
//!    that sentence. A single oversized sentence becomes its own chunk.
//!
//! # Example
//!
//! ```rust
//! use askdoc_core::chunk::split_into_chunks;
//!
//! let chunks = split_into_chunks("Lele hidup di air tawar.\n\nLele mudah dipelihara.", 300);
//! assert_eq!(chunks, vec!["Lele hidup di air tawar. Lele mudah dipelihara.".to_string()]);
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Default target number of words per chunk.
pub const DEFAULT_CHUNK_WORDS: usize = 300;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s+[A-Z]").unwrap());

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Split normalized text into sentence-like segments.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        // Keep the period; the next segment starts at the uppercase letter.
        segments.push(&text[start..m.start() + 1]);
        start = m.end() - 1;
    }
    segments.push(&text[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split text into chunks of roughly `chunk_words` words.
///
/// Returns an empty vector for empty or whitespace-only input.
pub fn split_into_chunks(text: &str, chunk_words: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    let limit = chunk_words as f64 * 1.5;

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for sentence in split_sentences(&normalized) {
        let words = sentence.split_whitespace().count();

        if current_words > 0 && (current_words + words) as f64 > limit {
            chunks.push(std::mem::take(&mut current));
            current_words = 0;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
        current_words += words;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
