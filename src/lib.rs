//! Structural text segmentation: typed, bounded chunks from Markdown, HTML,
//! and prose.
//!
//! `seams` splits mixed-format text into non-overlapping chunks, each tagged
//! with the structural category that claimed it and its byte span in the
//! original document. It is a single left-to-right scan over fourteen
//! priority-ordered rules, not a Markdown parser: there is no document tree,
//! no inline rendering, and no recovery pass. What a rule matches becomes a
//! chunk; what nothing matches is skipped.
//!
//! # Quick Start
//!
//! ```rust
//! use seams::{ChunkKind, Grammar, Limits};
//!
//! let grammar = Grammar::compile(&Limits::default())?;
//!
//! let text = "# Notes\n\n- first point\n- second point\n\nDone for today.";
//! let chunks = grammar.scan(text);
//!
//! assert_eq!(chunks[0].kind, ChunkKind::Heading);
//! assert_eq!(chunks[1].kind, ChunkKind::ListItem);
//! assert_eq!(&text[chunks[0].span()], chunks[0].content);
//! # Ok::<(), seams::Error>(())
//! ```
//!
//! # The Rules
//!
//! Rules are tried in a fixed order; the scanner takes the match that starts
//! earliest in the text, and on position ties the earlier rule wins:
//!
//! | # | Kind | Matches |
//! |---|------|---------|
//! | 1 | [`ChunkKind::Heading`] | ATX `#`, marker-run, Setext, `<h1>`-`<h6>` |
//! | 2 | [`ChunkKind::Citation`] | `[n]` reference markers with their line |
//! | 3 | [`ChunkKind::ListItem`] | bullet/numbered/lettered/task items, nested |
//! | 4 | [`ChunkKind::Blockquote`] | runs of `>`-prefixed lines |
//! | 5 | [`ChunkKind::CodeBlock`] | fenced, indented, `<pre>`/`<code>` |
//! | 6 | [`ChunkKind::Table`] | pipe tables, `<table>` |
//! | 7 | [`ChunkKind::HorizontalRule`] | `---`-style dividers, `<hr>` |
//! | 8 | [`ChunkKind::StandaloneLine`] | one full line of prose |
//! | 9 | [`ChunkKind::Sentence`] | punctuation-terminated sentences |
//! | 10 | [`ChunkKind::DelimitedSpan`] | quotes, parens, brackets, inline code |
//! | 11 | [`ChunkKind::Paragraph`] | blocks between blank lines |
//! | 12 | [`ChunkKind::HtmlElement`] | generic HTML elements |
//! | 13 | [`ChunkKind::MathBlock`] | `$$...$$` and `$...$` |
//! | 14 | [`ChunkKind::Fallback`] | anything sentence-like the rest refused |
//!
//! Sentence boundaries drive rules 3, 4, 8, 9, 11, and 14: terminal
//! punctuation, ellipses, and emoji end sentences, while `3.14` and `e.g.`
//! do not. See the [`Limits`] type for the bound applied to every rule.
//!
//! # Offsets
//!
//! Chunk positions are byte offsets into the input, so
//! `&text[chunk.start..chunk.end]` always recovers the chunk. Inputs are
//! UTF-8 `&str`; chunks never split a character or an emoji ZWJ sequence.
//!
//! # Feature Flags
//!
//! - `serde` — `Serialize`/`Deserialize` for [`Chunk`] and [`ChunkKind`],
//!   with `chunk_type`/`start_pos`/`end_pos` field names on the wire.

mod boundary;
mod chunk;
mod error;
mod grammar;
mod limits;
mod rules;
mod scanner;

pub use chunk::{Chunk, ChunkKind};
pub use error::{Error, Result};
pub use grammar::Grammar;
pub use limits::{Limits, LIMIT_CEILING};
pub use scanner::ChunkStream;
