//! Grammar compilation: limits in, a reusable scanner out.

use crate::chunk::Chunk;
use crate::error::Result;
use crate::limits::Limits;
use crate::rules::{build_rules, Rule};
use crate::scanner::ChunkStream;

/// A compiled segmentation grammar: the fourteen rules, priority-ordered,
/// with every bound baked in.
///
/// Compilation is the expensive step (each structural rule compiles to a
/// pattern); scanning reuses the compiled rules, so compile once and scan
/// many documents. A `Grammar` is immutable and can be shared across threads
/// behind an `Arc` or a plain `&` borrow.
///
/// ```rust
/// use seams::{ChunkKind, Grammar, Limits};
///
/// let grammar = Grammar::compile(&Limits::default())?;
/// let chunks = grammar.scan("# Title\n\nBody text.");
///
/// assert_eq!(chunks[0].kind, ChunkKind::Heading);
/// assert_eq!(chunks[0].content, "# Title\n");
/// # Ok::<(), seams::Error>(())
/// ```
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Compile a grammar from the given limits.
    ///
    /// # Errors
    ///
    /// Returns an error when a limit is zero or above
    /// [`LIMIT_CEILING`](crate::LIMIT_CEILING), or when a limit large
    /// enough to overgrow a compiled pattern makes a rule fail to compile.
    pub fn compile(limits: &Limits) -> Result<Self> {
        limits.validate()?;
        Ok(Self {
            rules: build_rules(limits)?,
        })
    }

    /// Segment `text` into typed chunks, in document order.
    ///
    /// Never fails and never panics; text no rule matches is skipped.
    #[must_use]
    pub fn scan(&self, text: &str) -> Vec<Chunk> {
        self.chunks(text).collect()
    }

    /// Lazily segment `text`: an iterator over chunks in document order.
    ///
    /// Equivalent to [`Grammar::scan`] but produces chunks on demand, which
    /// lets callers stop early without paying for the rest of the document.
    #[must_use]
    pub fn chunks<'g, 't>(&'g self, text: &'t str) -> ChunkStream<'g, 't> {
        ChunkStream::new(&self.rules, text)
    }

    /// Number of rules in the grammar.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.rule_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn compiles_with_defaults() {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        assert_eq!(grammar.rule_count(), 14);
    }

    #[test]
    fn compiles_with_generous_body_limits() {
        // Free-content body caps are enforced in code, not in compiled
        // patterns, so raising them never overgrows the regex engine.
        let limits = Limits {
            max_code_block: 50_000,
            max_html_table: 50_000,
            max_html_content: 50_000,
            max_math_block: 50_000,
            ..Limits::default()
        };
        let grammar = Grammar::compile(&limits).unwrap();
        let text = format!("```\n{}\n```\n", "x".repeat(5_000));
        let chunks = grammar.scan(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].kind, crate::chunk::ChunkKind::CodeBlock);
        assert_eq!(chunks[0].span(), 0..text.len());
    }

    #[test]
    fn rejects_invalid_limits() {
        let limits = Limits {
            max_sentence: 0,
            ..Limits::default()
        };
        assert!(matches!(
            Grammar::compile(&limits),
            Err(Error::InvalidLimit { .. })
        ));
    }

    #[test]
    fn grammar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
