//! Greedy merging of sentences into token-budgeted passages.
//!
//! The [`Combiner`] walks a chunk's sentences once, in order, accumulating
//! them into a passage until the running token count approaches a target
//! budget. Merged passages land between `target` and `ceiling` tokens;
//! single sentences that already exceed the target are emitted standalone
//! and are the only passages allowed past it un-merged.
//!
//! Two rules of the pass are easy to get wrong and worth stating:
//!
//! - Accumulation is keyed by **position**, never by sentence text, so a
//!   sentence repeated within a chunk survives the pass as two passages.
//! - The trailing accumulation at the end of a chunk is **flushed** as a
//!   final passage, never discarded. The running count never exceeds
//!   `target` while accumulating, so the flushed passage always respects
//!   the ceiling bound.

use crate::tokens::TokenCounter;
use serde::Serialize;

/// A retrieval unit of text sized near a token budget.
///
/// Formed by concatenating one or more consecutive sentences with single
/// spaces, preserving source order. The token count is measured at
/// construction time with the same counter used throughout a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    pub text: String,
    pub token_count: usize,
}

/// Merges sentences inside one chunk into passages approximating a target
/// token count.
#[derive(Debug, Clone)]
pub struct Combiner {
    target: usize,
    ceiling: usize,
    counter: TokenCounter,
}

impl Combiner {
    /// Default target token budget per passage.
    pub const DEFAULT_TARGET: usize = 60;
    /// Default ceiling multiplier applied to the target.
    pub const DEFAULT_CEILING_MULTIPLIER: f64 = 1.2;

    /// Create a combiner with the given target and the default ceiling of
    /// `round(target * 1.2)`.
    pub fn new(target: usize) -> Self {
        Self::with_ceiling_multiplier(target, Self::DEFAULT_CEILING_MULTIPLIER)
    }

    /// Create a combiner with an explicit ceiling multiplier.
    pub fn with_ceiling_multiplier(target: usize, multiplier: f64) -> Self {
        let ceiling = (target as f64 * multiplier).round() as usize;
        Self {
            target,
            ceiling,
            counter: TokenCounter::new(),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Combine a chunk of sentences into passages.
    ///
    /// Single forward pass; sentence order is preserved. For each sentence
    /// with token count `v` against the accumulator's running count:
    ///
    /// - empty accumulator: a sentence already over `target` is emitted
    ///   standalone, otherwise it starts the accumulator;
    /// - `running + v` over `ceiling`: the accumulator is emitted without
    ///   the sentence, which is then handled under the empty rule;
    /// - `running + v` over `target` (but within `ceiling`): the sentence
    ///   joins the accumulator and the result is emitted;
    /// - otherwise the sentence accumulates.
    ///
    /// A non-empty accumulator remaining after the pass is flushed as a
    /// final passage.
    pub fn combine(&self, sentences: &[String]) -> Vec<Passage> {
        let mut passages = Vec::new();
        let mut acc: Vec<&str> = Vec::new();
        let mut running = 0usize;

        for sentence in sentences {
            let v = self.counter.count(sentence);

            if acc.is_empty() {
                self.start_or_emit(sentence, v, &mut acc, &mut running, &mut passages);
            } else if running + v > self.ceiling {
                passages.push(Passage {
                    text: acc.join(" "),
                    token_count: running,
                });
                acc.clear();
                running = 0;
                self.start_or_emit(sentence, v, &mut acc, &mut running, &mut passages);
            } else if running + v > self.target {
                acc.push(sentence);
                passages.push(Passage {
                    text: acc.join(" "),
                    token_count: running + v,
                });
                acc.clear();
                running = 0;
            } else {
                acc.push(sentence);
                running += v;
            }
        }

        if !acc.is_empty() {
            passages.push(Passage {
                text: acc.join(" "),
                token_count: running,
            });
        }

        passages
    }

    /// The empty-accumulator rule: oversized sentences go out standalone,
    /// everything else starts a fresh accumulation.
    fn start_or_emit<'a>(
        &self,
        sentence: &'a str,
        tokens: usize,
        acc: &mut Vec<&'a str>,
        running: &mut usize,
        passages: &mut Vec<Passage>,
    ) {
        if tokens > self.target {
            passages.push(Passage {
                text: sentence.to_string(),
                token_count: tokens,
            });
        } else {
            acc.push(sentence);
            *running = tokens;
        }
    }
}
