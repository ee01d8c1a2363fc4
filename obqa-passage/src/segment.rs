//! Sentence segmentation boundary.
//!
//! The passage pipeline consumes sentence segmentation as a pluggable
//! capability: any order-preserving splitter can be substituted (a neural
//! segmenter, a language-specific tokenizer, and so on). [`RegexSegmenter`]
//! is the default used by the CLI and tests.

use regex::Regex;

/// Turns cleaned text into an ordered sequence of sentence strings.
///
/// Implementations must preserve input order. Empty input yields an empty
/// sequence; the pipeline substitutes a sentinel passage downstream rather
/// than failing.
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Splits on sentence-final punctuation followed by whitespace.
#[derive(Debug, Clone)]
pub struct RegexSegmenter {
    boundary: Regex,
}

impl Default for RegexSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexSegmenter {
    pub fn new() -> Self {
        Self {
            boundary: Regex::new(r"(?s)(.*?[.!?])\s+|(.+)$").unwrap(),
        }
    }
}

impl SentenceSegmenter for RegexSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.boundary
            .captures_iter(text)
            .filter_map(|cap| {
                cap.get(1)
                    .or_else(|| cap.get(2))
                    .map(|m| m.as_str().trim().to_string())
            })
            .filter(|s| !s.is_empty())
            .collect()
    }
}
