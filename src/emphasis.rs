//! Alternating syllable emphasis.
//!
//! Slices a word at its syllable boundaries and flags every other syllable
//! for emphasis. Which half of the alternation gets emphasized is the
//! [`Parity`] setting.

use crate::hyphen::Syllables;

/// Which syllable positions to emphasize, counted 1-based per word.
///
/// Parity only affects words with at least two syllables; a word the
/// dictionary cannot split is never emphasized under either setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// Emphasize the 1st, 3rd, 5th, ... syllables.
    First,
    /// Emphasize the 2nd, 4th, 6th, ... syllables (the default).
    #[default]
    Second,
}

impl Parity {
    /// Whether the syllable at 0-based `index` should be emphasized.
    pub fn emphasized(self, index: usize) -> bool {
        match self {
            Parity::First => index % 2 == 0,
            Parity::Second => index % 2 == 1,
        }
    }
}

/// One syllable of a word, with its emphasis flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub emphasized: bool,
}

/// Split `word` into emphasis spans.
///
/// The word must be a contiguous letter run as produced by
/// [`crate::segment::segment`]. Always returns at least one span, and the
/// spans concatenate back to `word` exactly. A word with no usable breaks
/// yields a single unemphasized span; the same holds for break offsets the
/// adapter reports that cannot be applied confidently (out of range, not
/// increasing, not on a character boundary).
pub fn emphasize<'a>(word: &'a str, syllables: &dyn Syllables, parity: Parity) -> Vec<Span<'a>> {
    let breaks = syllables.breaks(word);

    // A word without a break is never emphasized, so fragments left between
    // wrappers by an earlier run stay put on a rerun.
    if breaks.is_empty() || !breaks_are_valid(word, &breaks) {
        return vec![Span {
            text: word,
            emphasized: false,
        }];
    }

    let mut spans = Vec::with_capacity(breaks.len() + 1);
    let mut start = 0;
    for (index, end) in breaks.iter().copied().chain([word.len()]).enumerate() {
        spans.push(Span {
            text: &word[start..end],
            emphasized: parity.emphasized(index),
        });
        start = end;
    }
    spans
}

fn breaks_are_valid(word: &str, breaks: &[usize]) -> bool {
    let mut previous = 0;
    for &offset in breaks {
        if offset <= previous || offset >= word.len() || !word.is_char_boundary(offset) {
            return false;
        }
        previous = offset;
    }
    true
}
