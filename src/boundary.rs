//! The sentence-boundary sub-grammar shared across rules.
//!
//! ## What Counts as "the End of a Sentence"?
//!
//! Six of the fourteen rules (list items, blockquote lines, standalone lines,
//! sentences, paragraphs, fallback) embed a *bounded sentence*: a run of
//! non-newline text that stops at a sentence boundary. Getting that boundary
//! right is most of the difficulty in this crate:
//!
//! - `.` `!` `?` `…` end sentences, but `3.14` and `e.g.` must not split
//! - `...` is one terminator, not three
//! - Emoji end sentences too — `"ship it 🚀 then sleep"` splits after the
//!   rocket, a deliberate nod to informal, chat-style text
//! - Emoji may be ZWJ sequences spanning several codepoints; the terminator
//!   is the whole grapheme cluster, never a piece of one
//! - A sentence may also end at a line break or end of input with no
//!   punctuation at all
//!
//! ## Bounded Matching
//!
//! [`Boundary::sentence_span`] caps the sentence at `max_chars` characters.
//! When the cap lands mid-word with a terminator "just out of reach", a
//! bounded lookahead window ([`Limits::lookahead_range`]) searches ahead for
//! the actual boundary rather than truncating. If the window finds nothing,
//! the match *fails* — that is what makes the wider-bounded fallback rule,
//! and ultimately unmatched gaps, reachable.
//!
//! ## Why Hand-Written?
//!
//! The boundary tests need lookbehind (what precedes the terminator) and
//! lookahead (what follows it), which the `regex` crate deliberately does not
//! support. The terminator *class* itself is a regex — emoji classification
//! rides on `\p{Emoji_Presentation}` and `\p{Extended_Pictographic}` — while
//! the assertions around it are a short explicit scanner.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::limits::Limits;

/// Characters a chunk should never begin with, and which are absorbed into
/// the preceding chunk after a boundary: whitespace, closers, comma,
/// apostrophe.
pub(crate) fn is_avoid_at_start(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ']' | '}' | ')' | '>' | ',' | '\'')
}

/// Most terminator units one sentence end may consume (`?!`, `...`, `!!`).
const MAX_TERMINATOR_RUN: usize = 3;

/// The shared boundary grammar: terminator class plus the assertions and
/// scanners built around it. Stateless after construction; cheap to clone
/// (the compiled class is reference-counted).
#[derive(Debug, Clone)]
pub(crate) struct Boundary {
    /// Anchored terminator class: ellipsis, terminal punctuation, Unicode
    /// general-punctuation marks, emoji.
    terminator: Regex,
    lookahead_range: usize,
}

impl Boundary {
    pub(crate) fn new(limits: &Limits) -> Result<Self> {
        let terminator = Regex::new(
            r"^(?:\.{3}|[.!?\u{2026}\u{2047}-\u{2049}]|\p{Emoji_Presentation}|\p{Extended_Pictographic})",
        )?;
        Ok(Self {
            terminator,
            lookahead_range: limits.lookahead_range,
        })
    }

    /// Length of one terminator unit at the start of `rest`, widened to a
    /// full grapheme cluster so ZWJ emoji sequences stay whole.
    fn terminator_len(&self, rest: &str) -> Option<usize> {
        let matched = self.terminator.find(rest)?.end();
        let grapheme = rest.graphemes(true).next().map_or(0, str::len);
        Some(matched.max(grapheme))
    }

    fn is_terminator_char(&self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.terminator.is_match(ch.encode_utf8(&mut buf))
    }

    /// The closing-quote convention: `'` before a backtick, or `''` before a
    /// doubled backtick.
    fn quote_end_len(rest: &str) -> Option<usize> {
        if rest.starts_with("''") && rest[2..].starts_with("``") {
            Some(2)
        } else if rest.starts_with('\'') && rest[1..].starts_with('`') {
            Some(1)
        } else {
            None
        }
    }

    /// Does a sentence end begin at byte offset `at`? Returns the number of
    /// bytes the terminator consumes.
    ///
    /// A terminator run counts only when followed by whitespace, a closer,
    /// or end of input — `3.14` and `e.g.` stay whole — and not when it is
    /// the tail of a `". ."`-style sequence (punctuation, an avoid character,
    /// then more punctuation), which reads as one terminator, not two.
    pub(crate) fn sentence_end_len(&self, text: &str, at: usize) -> Option<usize> {
        let rest = &text[at..];
        if let Some(n) = Self::quote_end_len(rest) {
            return Some(n);
        }

        let mut consumed = 0;
        for _ in 0..MAX_TERMINATOR_RUN {
            match self.terminator_len(&rest[consumed..]) {
                Some(n) => consumed += n,
                None => break,
            }
        }
        if consumed == 0 {
            return None;
        }

        let mut before = text[..at].chars().rev();
        if let (Some(prev), Some(prev2)) = (before.next(), before.next()) {
            if is_avoid_at_start(prev) && self.is_terminator_char(prev2) {
                return None;
            }
        }

        match rest[consumed..].chars().next() {
            None => Some(consumed),
            Some(c) if is_avoid_at_start(c) => Some(consumed),
            Some(_) => None,
        }
    }

    /// Match a bounded sentence starting at byte offset `start`: 1 to
    /// `max_chars` non-newline characters ending at a sentence boundary
    /// (terminator, line end, or end of input). Returns the end offset, with
    /// trailing avoid-at-start characters absorbed.
    ///
    /// When no boundary appears within the cap, a lookahead window of up to
    /// `lookahead_range` characters may still find the terminator; past that
    /// the match fails rather than truncating mid-word.
    pub(crate) fn sentence_span(
        &self,
        text: &str,
        start: usize,
        max_chars: usize,
    ) -> Option<usize> {
        let rest = &text[start..];

        // Never start at a terminator that already ends something.
        if let Some(n) = self.terminator_len(rest) {
            if rest[n..].chars().next().is_some_and(char::is_whitespace) {
                return None;
            }
        }

        let mut consumed = 0usize;
        for (off, ch) in rest.char_indices() {
            let abs = start + off;
            if consumed >= 1 {
                if let Some(n) = self.sentence_end_len(text, abs) {
                    return Some(Self::absorb_trailing(text, abs + n));
                }
            }
            if ch == '\r' || ch == '\n' {
                return (consumed >= 1).then_some(abs);
            }
            if consumed == max_chars {
                return self.lookahead_end(text, abs);
            }
            consumed += 1;
        }
        (consumed >= 1).then_some(text.len())
    }

    /// Search up to `lookahead_range` characters past the cap for a sentence
    /// end. Line ends inside the window fail the match: a sentence that long
    /// with no terminator is not a sentence.
    fn lookahead_end(&self, text: &str, from: usize) -> Option<usize> {
        let mut seen = 0usize;
        for (off, ch) in text[from..].char_indices() {
            if ch == '\r' || ch == '\n' {
                return None;
            }
            if seen > 0 {
                if let Some(n) = self.sentence_end_len(text, from + off) {
                    return Some(Self::absorb_trailing(text, from + off + n));
                }
            }
            seen += 1;
            if seen > self.lookahead_range {
                return None;
            }
        }
        None
    }

    /// Absorb trailing closers, commas, and spaces (not line ends) into the
    /// match so the next chunk never starts mid-delimiter.
    fn absorb_trailing(text: &str, mut end: usize) -> usize {
        for ch in text[end..].chars() {
            if ch == '\r' || ch == '\n' || !is_avoid_at_start(ch) {
                break;
            }
            end += ch.len_utf8();
        }
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary() -> Boundary {
        Boundary::new(&Limits::default()).unwrap()
    }

    fn sentence(text: &str) -> Option<&str> {
        let b = boundary();
        b.sentence_span(text, 0, Limits::default().max_sentence)
            .map(|end| &text[..end])
    }

    #[test]
    fn period_before_space_ends_sentence() {
        assert_eq!(sentence("Hello world. Next sentence!"), Some("Hello world. "));
    }

    #[test]
    fn period_inside_number_does_not_split() {
        assert_eq!(sentence("Pi is 3.14159 roughly"), Some("Pi is 3.14159 roughly"));
    }

    #[test]
    fn ellipsis_is_one_terminator() {
        assert_eq!(sentence("Well... maybe"), Some("Well... "));
    }

    #[test]
    fn emoji_ends_sentence() {
        assert_eq!(sentence("I love this 🎉 More text"), Some("I love this 🎉 "));
    }

    #[test]
    fn zwj_emoji_stays_whole() {
        let text = "family 👨\u{200d}👩\u{200d}👧 next";
        let got = sentence(text).unwrap();
        assert!(got.contains('\u{200d}'), "cluster split: {got:?}");
        assert!(got.ends_with("👧 "), "got {got:?}");
    }

    #[test]
    fn line_end_is_a_boundary() {
        assert_eq!(sentence("no punctuation here\nmore"), Some("no punctuation here"));
    }

    #[test]
    fn end_of_input_is_a_boundary() {
        assert_eq!(sentence("no punctuation at all"), Some("no punctuation at all"));
    }

    #[test]
    fn does_not_start_at_loose_terminator() {
        assert_eq!(sentence("! More text"), None);
    }

    #[test]
    fn empty_and_newline_only_fail() {
        assert_eq!(sentence(""), None);
        assert_eq!(sentence("\nrest"), None);
    }

    #[test]
    fn double_punctuation_consumed_as_one_run() {
        assert_eq!(sentence("What?! Then"), Some("What?! "));
    }

    #[test]
    fn spaced_terminator_tail_is_not_a_second_end() {
        let b = boundary();
        // "x. ." — the second dot follows punctuation + space.
        let text = "x. .y";
        assert_eq!(b.sentence_end_len(text, 3), None);
    }

    #[test]
    fn lookahead_extends_past_cap() {
        let b = boundary();
        // 10-char cap, terminator at 14: within the 100-char window.
        let text = "abcdefghijklmn. tail";
        let end = b.sentence_span(text, 0, 10).unwrap();
        assert_eq!(&text[..end], "abcdefghijklmn. ");
    }

    #[test]
    fn cap_without_boundary_fails() {
        let long = "a".repeat(600);
        let b = boundary();
        assert_eq!(b.sentence_span(&long, 0, 400), None);
    }

    #[test]
    fn trailing_closers_are_absorbed() {
        assert_eq!(sentence("done.) next"), Some("done.) "));
    }
}
