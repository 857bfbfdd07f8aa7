//! Word segmentation for text runs.
//!
//! Splits a text node's character data into maximal runs of Unicode letters
//! (words) and everything between them (separators: whitespace, punctuation,
//! digits, symbols). Joining the pieces in order reproduces the input
//! exactly, which is what lets the rewriter replace words without touching
//! the characters around them.

/// One piece of a segmented text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    /// A maximal run of Unicode letter characters.
    Word(&'a str),
    /// A maximal run of non-letter characters.
    Separator(&'a str),
}

impl<'a> Piece<'a> {
    /// The underlying text of this piece.
    pub fn text(&self) -> &'a str {
        match self {
            Piece::Word(s) | Piece::Separator(s) => s,
        }
    }
}

/// Iterator over the pieces of a text run. See [`segment`].
pub struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        let first = self.rest.chars().next()?;
        let is_word = first.is_alphabetic();

        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_alphabetic() != is_word)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (piece, rest) = self.rest.split_at(end);
        self.rest = rest;

        Some(if is_word {
            Piece::Word(piece)
        } else {
            Piece::Separator(piece)
        })
    }
}

/// Segment `text` into alternating words and separators.
///
/// The iterator is lazy and borrows from `text`. Empty input yields nothing;
/// input without any letter yields a single [`Piece::Separator`].
pub fn segment(text: &str) -> Segments<'_> {
    Segments { rest: text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pieces(text: &str) -> Vec<Piece<'_>> {
        segment(text).collect()
    }

    #[test]
    fn test_simple_sentence() {
        assert_eq!(
            pieces("hello world"),
            vec![
                Piece::Word("hello"),
                Piece::Separator(" "),
                Piece::Word("world"),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(pieces("").is_empty());
    }

    #[test]
    fn test_no_letters() {
        assert_eq!(pieces(" 123 ?! "), vec![Piece::Separator(" 123 ?! ")]);
    }

    #[test]
    fn test_leading_and_trailing_separators() {
        assert_eq!(
            pieces("  Wort.  "),
            vec![
                Piece::Separator("  "),
                Piece::Word("Wort"),
                Piece::Separator(".  "),
            ]
        );
    }

    #[test]
    fn test_digits_split_words() {
        // "mp3" is a letter run, a digit run, nothing more
        assert_eq!(
            pieces("mp3 player"),
            vec![
                Piece::Word("mp"),
                Piece::Separator("3 "),
                Piece::Word("player"),
            ]
        );
    }

    #[test]
    fn test_unicode_letters() {
        assert_eq!(
            pieces("Füße, Straße!"),
            vec![
                Piece::Word("Füße"),
                Piece::Separator(", "),
                Piece::Word("Straße"),
                Piece::Separator("!"),
            ]
        );
    }

    #[test]
    fn test_hyphenated_compound_is_two_words() {
        assert_eq!(
            pieces("well-known"),
            vec![
                Piece::Word("well"),
                Piece::Separator("-"),
                Piece::Word("known"),
            ]
        );
    }

    #[test]
    fn test_pieces_alternate() {
        let kinds: Vec<bool> = segment("a b1c--d")
            .map(|p| matches!(p, Piece::Word(_)))
            .collect();
        for pair in kinds.windows(2) {
            assert_ne!(pair[0], pair[1], "adjacent pieces must alternate");
        }
    }

    proptest! {
        #[test]
        fn prop_concatenation_reproduces_input(text in "\\PC*") {
            let joined: String = segment(&text).map(|p| p.text()).collect();
            prop_assert_eq!(joined, text);
        }

        #[test]
        fn prop_no_empty_pieces(text in "\\PC*") {
            for piece in segment(&text) {
                prop_assert!(!piece.text().is_empty());
            }
        }
    }
}
