//! Turning ranked chunks into a readable answer.
//!
//! [`post_process_chunk`] cleans raw chunk text (citation markers,
//! bibliography tails, cut-off sentences), [`format_as_answer`] prefixes it
//! with an introduction chosen from the question word, and
//! [`compose_answer`] applies the merge policy for the top two results.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::SearchResult;

/// Second result is merged when its score is within this margin of the top.
pub const DEFAULT_MERGE_MARGIN: f32 = 0.1;
/// A merged answer must stay below this many characters.
pub const DEFAULT_MAX_ANSWER_CHARS: usize = 500;

static CITATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").unwrap());
static REFERENCE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)daftar pustaka|referensi").unwrap());

/// Introductions keyed by the (lowercased) start of the question.
const INTROS: &[(&[&str], &str)] = &[
    (&["apa "], "Based on the document, "),
    (&["bagaimana "], "According to available information, "),
    (&["mengapa ", "kenapa "], "The document explains that "),
];
const DEFAULT_INTRO: &str = "Information from the document states that ";

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Clean a chunk so it reads as a standalone passage.
///
/// ```rust
/// use askdoc_core::answer::post_process_chunk;
///
/// let cleaned = post_process_chunk("ikan. Lele hidup di air tawar [3]. Daftar Pustaka: Budi");
/// assert_eq!(cleaned, "Lele hidup di air tawar .");
/// ```
pub fn post_process_chunk(chunk: &str) -> String {
    let mut text = CITATION.replace_all(chunk, "").into_owned();

    if let Some(m) = REFERENCE_SECTION.find(&text) {
        text.truncate(m.start());
    }

    // Drop a leading fragment cut off mid-sentence.
    if !text.starts_with(|c: char| c.is_ascii_uppercase()) {
        if let Some(pos) = text.find(|c: char| c.is_ascii_uppercase()) {
            text.replace_range(..pos, "");
        }
    }

    let trimmed = text.trim();
    if trimmed.ends_with(is_terminal) {
        return trimmed.to_string();
    }

    match trimmed.rfind(is_terminal) {
        // Terminal marks are ASCII, so `pos + 1` is a char boundary.
        Some(pos) => trimmed[..=pos].to_string(),
        None => format!("{}.", trimmed),
    }
}

/// Pick the introduction for a question. Anything that does not start with
/// a known question word, including an empty question, gets the default.
pub fn intro_phrase(query: &str) -> &'static str {
    let lower = query.to_lowercase();
    INTROS
        .iter()
        .find(|(prefixes, _)| prefixes.iter().any(|p| lower.starts_with(p)))
        .map(|(_, intro)| *intro)
        .unwrap_or(DEFAULT_INTRO)
}

/// Format a chunk as an answer to `query`.
pub fn format_as_answer(query: &str, chunk: &str) -> String {
    format!("{}{}", intro_phrase(query), post_process_chunk(chunk))
}

/// A merged second passage carries no introduction of its own.
fn format_continuation(chunk: &str) -> String {
    post_process_chunk(chunk)
}

/// How the top results are combined into one answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerPolicy {
    pub merge_margin: f32,
    pub max_answer_chars: usize,
}

impl Default for AnswerPolicy {
    fn default() -> Self {
        Self {
            merge_margin: DEFAULT_MERGE_MARGIN,
            max_answer_chars: DEFAULT_MAX_ANSWER_CHARS,
        }
    }
}

/// Build the answer text from ranked results.
///
/// Returns `None` when `results` is empty. The second result is appended
/// as a continuation (without an introduction) only when its score is within
/// `merge_margin` of the top score and the merged text stays shorter than
/// `max_answer_chars`.
pub fn compose_answer(query: &str, results: &[SearchResult], policy: &AnswerPolicy) -> Option<String> {
    let top = results.first()?;
    let mut answer = format_as_answer(query, &top.chunk);

    if let Some(second) = results.get(1) {
        if second.score > top.score - policy.merge_margin {
            let merged = format!("{} {}", answer, format_continuation(&second.chunk));
            if merged.chars().count() < policy.max_answer_chars {
                answer = merged;
            }
        }
    }

    Some(answer)
}
