//! Length limits that keep every rule's match bounded.
//!
//! ## Why Bounds?
//!
//! Every structural rule in the grammar repeats some sub-pattern: heading
//! content, blockquote lines, code-block bodies, nested list items. Left
//! unbounded, a single degenerate input line could make one match arbitrarily
//! expensive (and one chunk arbitrarily large). Capping every repetition with
//! a small constant keeps worst-case matching cost polynomial and every chunk
//! a practical size for downstream consumers (embedding models, context
//! windows).
//!
//! The defaults mirror the shape of real documents: headings are short,
//! blockquotes rarely run past a dozen lines, fenced code blocks top out
//! around a kilobyte and a half. They are deliberately generous-but-finite.
//!
//! ## Validation
//!
//! A zero limit would make a rule unable to match anything; an enormous one
//! defeats the point of bounding. [`Limits::validate`] rejects both at
//! grammar-compile time, so scanning never has to think about it.

use crate::error::{Error, Result};

/// Ceiling applied to every limit; anything larger would make a "bounded"
/// repetition effectively unbounded.
pub const LIMIT_CEILING: usize = 100_000;

/// Named length bounds for every structural rule.
///
/// Construct with [`Limits::default`] and override fields as needed:
///
/// ```rust
/// use seams::Limits;
///
/// let limits = Limits {
///     max_sentence: 200,
///     ..Limits::default()
/// };
/// assert!(limits.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Longest run of heading marker characters (`#`, `*`, `=`, `-`).
    pub max_heading_marker: usize,
    /// Longest heading content line.
    pub max_heading_content: usize,
    /// Longest Setext underline.
    pub max_heading_underline: usize,
    /// Longest list-item sentence.
    pub max_list_item: usize,
    /// Most nested items captured per nesting tier.
    pub max_nested_list_items: usize,
    /// Deepest indentation recognized for nested list items.
    pub max_list_indent: usize,
    /// Longest blockquote line.
    pub max_blockquote_line: usize,
    /// Most consecutive blockquote lines captured as one chunk.
    pub max_blockquote_lines: usize,
    /// Longest fenced or HTML code-block body.
    pub max_code_block: usize,
    /// Longest fence language tag.
    pub max_code_language: usize,
    /// Most indented code lines captured as one chunk.
    pub max_indented_code_lines: usize,
    /// Longest table row (pipe to pipe).
    pub max_table_cell: usize,
    /// Most table data rows captured as one chunk.
    pub max_table_rows: usize,
    /// Longest HTML `<table>` element.
    pub max_html_table: usize,
    /// Fewest characters forming a horizontal rule.
    pub min_horizontal_rule: usize,
    /// Longest free-standing sentence.
    pub max_sentence: usize,
    /// Longest quoted span.
    pub max_quoted_text: usize,
    /// Longest run of text per parenthesis/bracket nesting level.
    pub max_parenthetical: usize,
    /// Deepest parenthesis/bracket nesting.
    pub max_nested_parens: usize,
    /// Longest inline `$...$` or backtick span.
    pub max_math_inline: usize,
    /// Longest `$$...$$` block.
    pub max_math_block: usize,
    /// Longest paragraph sentence.
    pub max_paragraph: usize,
    /// Longest standalone line (also the fallback rule's bound).
    pub max_standalone_line: usize,
    /// Longest HTML tag attribute list.
    pub max_html_attributes: usize,
    /// Longest generic HTML element content.
    pub max_html_content: usize,
    /// How far past a sentence cap the boundary search may look.
    pub lookahead_range: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_heading_marker: 7,
            max_heading_content: 200,
            max_heading_underline: 200,
            max_list_item: 200,
            max_nested_list_items: 6,
            max_list_indent: 7,
            max_blockquote_line: 200,
            max_blockquote_lines: 15,
            max_code_block: 1500,
            max_code_language: 20,
            max_indented_code_lines: 20,
            max_table_cell: 200,
            max_table_rows: 20,
            max_html_table: 2000,
            min_horizontal_rule: 3,
            max_sentence: 400,
            max_quoted_text: 300,
            max_parenthetical: 200,
            max_nested_parens: 5,
            max_math_inline: 100,
            max_math_block: 500,
            max_paragraph: 1000,
            max_standalone_line: 800,
            max_html_attributes: 100,
            max_html_content: 1000,
            lookahead_range: 100,
        }
    }
}

impl Limits {
    /// Check that every limit is positive and under [`LIMIT_CEILING`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLimit`] for a zero limit and
    /// [`Error::LimitTooLarge`] for one past the ceiling. The offending
    /// field's name is carried in the error.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.entries() {
            if value == 0 {
                return Err(Error::InvalidLimit { name, value });
            }
            if value > LIMIT_CEILING {
                return Err(Error::LimitTooLarge {
                    name,
                    value,
                    max: LIMIT_CEILING,
                });
            }
        }
        Ok(())
    }

    /// Every limit as a `(name, value)` pair, in declaration order.
    fn entries(&self) -> [(&'static str, usize); 26] {
        [
            ("max_heading_marker", self.max_heading_marker),
            ("max_heading_content", self.max_heading_content),
            ("max_heading_underline", self.max_heading_underline),
            ("max_list_item", self.max_list_item),
            ("max_nested_list_items", self.max_nested_list_items),
            ("max_list_indent", self.max_list_indent),
            ("max_blockquote_line", self.max_blockquote_line),
            ("max_blockquote_lines", self.max_blockquote_lines),
            ("max_code_block", self.max_code_block),
            ("max_code_language", self.max_code_language),
            ("max_indented_code_lines", self.max_indented_code_lines),
            ("max_table_cell", self.max_table_cell),
            ("max_table_rows", self.max_table_rows),
            ("max_html_table", self.max_html_table),
            ("min_horizontal_rule", self.min_horizontal_rule),
            ("max_sentence", self.max_sentence),
            ("max_quoted_text", self.max_quoted_text),
            ("max_parenthetical", self.max_parenthetical),
            ("max_nested_parens", self.max_nested_parens),
            ("max_math_inline", self.max_math_inline),
            ("max_math_block", self.max_math_block),
            ("max_paragraph", self.max_paragraph),
            ("max_standalone_line", self.max_standalone_line),
            ("max_html_attributes", self.max_html_attributes),
            ("max_html_content", self.max_html_content),
            ("lookahead_range", self.lookahead_range),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Limits::default().validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let limits = Limits {
            max_sentence: 0,
            ..Limits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLimit {
                name: "max_sentence",
                value: 0
            }
        ));
    }

    #[test]
    fn oversized_limit_is_rejected() {
        let limits = Limits {
            max_code_block: LIMIT_CEILING + 1,
            ..Limits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::LimitTooLarge {
                name: "max_code_block",
                ..
            }
        ));
    }

    #[test]
    fn overrides_keep_other_defaults() {
        let limits = Limits {
            max_table_rows: 5,
            ..Limits::default()
        };
        assert_eq!(limits.max_table_rows, 5);
        assert_eq!(limits.max_code_block, 1500);
    }
}
