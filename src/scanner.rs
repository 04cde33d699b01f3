//! The scan loop: leftmost match wins, rule order breaks ties.
//!
//! ## The Candidate Cache
//!
//! A naive scan would re-run all fourteen rules from the cursor after every
//! emitted chunk, making a document full of short sentences quadratic in the
//! number of rules that match far ahead. Instead each rule's most recent
//! candidate span is cached: a cached candidate starting at or after the
//! cursor is still the rule's leftmost match and is reused as-is; only
//! candidates the cursor has passed are recomputed. A rule that reports no
//! match is never asked again for this document.

use crate::chunk::Chunk;
use crate::rules::Rule;

/// One rule's cached scan state.
#[derive(Clone, Copy)]
enum Candidate {
    /// Not yet computed, or invalidated by cursor movement.
    Stale,
    /// No match anywhere in the remaining text.
    Exhausted,
    /// Leftmost match at or after the position it was computed from.
    Found(usize, usize),
}

/// Iterator over the chunks of one document, in document order.
///
/// Created by [`Grammar::chunks`](crate::Grammar::chunks). Yields
/// non-overlapping chunks with strictly increasing start offsets; input no
/// rule matches is skipped.
pub struct ChunkStream<'g, 't> {
    rules: &'g [Rule],
    text: &'t str,
    cursor: usize,
    candidates: Vec<Candidate>,
}

impl<'g, 't> ChunkStream<'g, 't> {
    pub(crate) fn new(rules: &'g [Rule], text: &'t str) -> Self {
        Self {
            rules,
            text,
            cursor: 0,
            candidates: vec![Candidate::Stale; rules.len()],
        }
    }

    /// The best candidate across all rules: minimal start, then minimal rule
    /// index. Refreshes stale cache entries along the way.
    fn best_candidate(&mut self) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;
        for (index, rule) in self.rules.iter().enumerate() {
            let cached = match self.candidates[index] {
                Candidate::Exhausted => continue,
                Candidate::Found(start, end) if start >= self.cursor => Some((start, end)),
                _ => None,
            };
            let (start, end) = match cached {
                Some(span) => span,
                None => match rule.find_at(self.text, self.cursor) {
                    Some((start, end)) => {
                        self.candidates[index] = Candidate::Found(start, end);
                        (start, end)
                    }
                    None => {
                        self.candidates[index] = Candidate::Exhausted;
                        continue;
                    }
                },
            };
            // Strict `<` keeps the earliest rule on position ties.
            if best.map_or(true, |(s, _, _)| start < s) {
                best = Some((start, end, index));
            }
        }
        best
    }
}

impl Iterator for ChunkStream<'_, '_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        while self.cursor < self.text.len() {
            let Some((start, end, index)) = self.best_candidate() else {
                self.cursor = self.text.len();
                return None;
            };
            if end <= start {
                // Rules never produce empty spans; skip one character if one
                // somehow does rather than loop forever.
                self.candidates[index] = Candidate::Stale;
                self.cursor = self.text[start..]
                    .chars()
                    .next()
                    .map_or(self.text.len(), |ch| start + ch.len_utf8());
                continue;
            }
            self.cursor = end;
            return Some(Chunk::new(
                &self.text[start..end],
                self.rules[index].kind,
                start,
                end,
            ));
        }
        None
    }
}

impl std::iter::FusedIterator for ChunkStream<'_, '_> {}
