//! Word-boundary token counting.

use regex::Regex;

/// Counts tokens as maximal alphanumeric/underscore runs (`\w+` semantics).
///
/// Every component in a run shares the same counting rule, so a passage's
/// token count is reproducible from its text alone.
#[derive(Debug, Clone)]
pub struct TokenCounter {
    word: Regex,
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter {
    pub fn new() -> Self {
        Self {
            // Infallible: the pattern is a compile-time constant.
            word: Regex::new(r"\w+").unwrap(),
        }
    }

    /// Number of word tokens in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.word.find_iter(text).count()
    }
}
