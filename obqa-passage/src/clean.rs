//! Basic text cleaning applied before sentence segmentation.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static QUOTES: OnceLock<Regex> = OnceLock::new();
static BACKSLASHES: OnceLock<Regex> = OnceLock::new();

/// Normalize raw document text for segmentation.
///
/// Collapses whitespace runs to single spaces, removes quote characters and
/// backslash runs, and drops non-ASCII bytes. The segmenter and combiner
/// both assume cleaned input.
pub fn clean_text(text: &str) -> String {
    let ws = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    let quotes = QUOTES.get_or_init(|| Regex::new(r#"["']"#).unwrap());
    let backslashes = BACKSLASHES.get_or_init(|| Regex::new(r"\\+").unwrap());

    let text = quotes.replace_all(text, "");
    let text = backslashes.replace_all(&text, "");
    let text: String = text.chars().filter(|c| c.is_ascii()).collect();
    ws.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            clean_text("one   two\n\nthree\tfour"),
            "one two three four"
        );
    }

    #[test]
    fn test_strips_quotes_and_backslashes() {
        assert_eq!(clean_text(r#"she said "hello" \\ there"#), "she said hello there");
        assert_eq!(clean_text("it's fine"), "its fine");
    }

    #[test]
    fn test_drops_non_ascii() {
        assert_eq!(clean_text("caf\u{e9} au lait"), "caf au lait");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n  "), "");
    }
}
