//! The Chunk type: a typed piece of text with position metadata.

/// Which structural rule produced a chunk.
///
/// The grammar tries rules in this order; earlier variants outrank later ones
/// when two rules could match at the same position. Each variant has a stable
/// string label ([`ChunkKind::as_str`]) and a 1-based priority
/// ([`ChunkKind::priority`]) so downstream consumers can group and filter by
/// structural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChunkKind {
    /// ATX, Setext, or HTML heading.
    Heading,
    /// `[n]`-style citation marker with its line.
    Citation,
    /// Bullet, numbered, lettered, or task list item (with nested items).
    ListItem,
    /// One or more `>`-prefixed lines.
    Blockquote,
    /// Fenced, indented, or HTML `<pre>`/`<code>` block.
    CodeBlock,
    /// Pipe-delimited or HTML table.
    Table,
    /// `---`-style divider or `<hr>`.
    HorizontalRule,
    /// A full line of prose, optionally tag-wrapped.
    StandaloneLine,
    /// A punctuation-terminated sentence, not line-anchored.
    Sentence,
    /// Quoted, parenthesized, bracketed, or inline-math span.
    DelimitedSpan,
    /// A text block between blank lines.
    Paragraph,
    /// Generic HTML element.
    HtmlElement,
    /// `$$...$$` or inline `$...$` math.
    MathBlock,
    /// Catch-all for text no other rule claims.
    Fallback,
}

impl ChunkKind {
    /// All kinds, in rule-priority order.
    pub const ALL: [Self; 14] = [
        Self::Heading,
        Self::Citation,
        Self::ListItem,
        Self::Blockquote,
        Self::CodeBlock,
        Self::Table,
        Self::HorizontalRule,
        Self::StandaloneLine,
        Self::Sentence,
        Self::DelimitedSpan,
        Self::Paragraph,
        Self::HtmlElement,
        Self::MathBlock,
        Self::Fallback,
    ];

    /// Stable snake_case label, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Citation => "citation",
            Self::ListItem => "list_item",
            Self::Blockquote => "blockquote",
            Self::CodeBlock => "code_block",
            Self::Table => "table",
            Self::HorizontalRule => "horizontal_rule",
            Self::StandaloneLine => "standalone_line",
            Self::Sentence => "sentence",
            Self::DelimitedSpan => "delimited_span",
            Self::Paragraph => "paragraph",
            Self::HtmlElement => "html_element",
            Self::MathBlock => "math_block",
            Self::Fallback => "fallback",
        }
    }

    /// 1-based position of this kind's rule in the grammar.
    #[must_use]
    pub fn priority(self) -> usize {
        1 + Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed chunk of text with its position in the original document.
///
/// ## Byte Offsets
///
/// `start` and `end` are byte offsets into the original text, not character
/// indices. This matches Rust's string slicing semantics:
///
/// ```rust
/// use seams::{Chunk, ChunkKind};
///
/// let text = "Hello, world!";
/// let chunk = Chunk::new("world", ChunkKind::Fallback, 7, 12);
///
/// // The offsets let you recover the original position
/// assert_eq!(&text[chunk.start..chunk.end], "world");
/// ```
///
/// ## Invariants
///
/// Chunks produced by a scan always satisfy `end > start`, hold exactly the
/// source substring `text[start..end]`, arrive in increasing `start` order,
/// and never overlap. Text no rule matched is skipped: consecutive chunks
/// need not be adjacent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chunk {
    /// The chunk text.
    pub content: String,
    /// Which rule matched.
    #[cfg_attr(feature = "serde", serde(rename = "chunk_type"))]
    pub kind: ChunkKind,
    /// Byte offset where this chunk starts in the original document.
    #[cfg_attr(feature = "serde", serde(rename = "start_pos"))]
    pub start: usize,
    /// Byte offset where this chunk ends (exclusive) in the original document.
    #[cfg_attr(feature = "serde", serde(rename = "end_pos"))]
    pub end: usize,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(content: impl Into<String>, kind: ChunkKind, start: usize, end: usize) -> Self {
        Self {
            content: content.into(),
            kind,
            start,
            end,
        }
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether this chunk is empty. Scans never emit empty chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The byte span of this chunk in the original document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ kind: {}, span: {}..{}, len: {} }}",
            self.kind,
            self.start,
            self.end,
            self.len()
        )
    }
}
