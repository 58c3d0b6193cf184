//! Query normalization applied before a question is embedded.

use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip punctuation, collapse whitespace, and lowercase a question.
///
/// ```rust
/// use askdoc_core::query::normalize_query;
///
/// assert_eq!(normalize_query("  Apa itu   Lele? "), "apa itu lele");
/// ```
pub fn normalize_query(query: &str) -> String {
    let spaced = NON_WORD.replace_all(query, " ");
    WHITESPACE
        .replace_all(&spaced, " ")
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_becomes_space() {
        assert_eq!(normalize_query("pakan-lele,apa?"), "pakan lele apa");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(normalize_query("Suhu 28_C!"), "suhu 28_c");
    }

    #[test]
    fn empty_and_symbol_only_queries() {
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("?!..."), "");
    }

    #[test]
    fn non_ascii_letters_survive() {
        assert_eq!(normalize_query("Café Ñandú"), "café ñandú");
    }
}
