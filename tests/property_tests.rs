//! Property-based tests for the scanner.
//!
//! These verify the invariants every scan upholds:
//! - Ordered: chunks arrive in increasing start order
//! - Disjoint: chunks never overlap
//! - Non-empty: every chunk spans at least one character
//! - Faithful: chunk content equals the source slice at its span
//! - Bounded: no chunk exceeds the length its rule's limits imply
//! - Deterministic: the same input always yields the same chunks

use proptest::prelude::*;
use seams::{Chunk, ChunkKind, Grammar, Limits};

// =============================================================================
// Test Generators
// =============================================================================

/// Generate free-form single-line-ish text.
fn arbitrary_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(".{0,300}").unwrap()
}

/// Generate text with sentence-like structure.
fn sentence_like_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[A-Za-z]{2,15}").unwrap(), 3..20).prop_map(
        |words| {
            let mut result = String::new();
            for (i, word) in words.iter().enumerate() {
                result.push_str(word);
                if i % 5 == 4 {
                    result.push_str(". ");
                } else {
                    result.push(' ');
                }
            }
            result
        },
    )
}

/// Generate small Markdown-shaped documents: headings, list items, quotes,
/// sentences, blank lines.
fn markdown_like_text() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        prop::string::string_regex("# [A-Za-z ]{1,40}").unwrap(),
        prop::string::string_regex("- [a-z ]{1,40}").unwrap(),
        prop::string::string_regex("> [a-z ]{1,40}\\.").unwrap(),
        prop::string::string_regex("[A-Za-z][a-z ]{1,60}\\.").unwrap(),
        Just(String::new()),
    ];
    prop::collection::vec(line, 1..12).prop_map(|lines| lines.join("\n"))
}

// =============================================================================
// Invariant Helpers
// =============================================================================

fn chunks_ordered_and_disjoint(chunks: &[Chunk]) -> bool {
    chunks.windows(2).all(|w| w[0].end <= w[1].start)
}

fn chunk_bounds_valid(chunks: &[Chunk], text: &str) -> bool {
    chunks
        .iter()
        .all(|c| c.start < c.end && c.end <= text.len())
}

fn chunk_text_matches(chunks: &[Chunk], text: &str) -> bool {
    chunks.iter().all(|c| c.content == text[c.span()])
}

/// Whitespace and closers absorbed after a sentence boundary stay on the
/// boundary's line, so they are bounded by the longest line the generators
/// emit. Every generator here stays under this.
const TAIL_ALLOWANCE: usize = 300;

/// The longest chunk (in chars) each rule can produce under `l`, before the
/// trailing-absorption allowance.
fn implied_bound(kind: ChunkKind, l: &Limits) -> usize {
    let with_lookahead = |cap: usize| cap + l.lookahead_range;
    match kind {
        ChunkKind::Heading => {
            l.max_heading_marker
                + l.max_heading_content
                + l.max_heading_underline
                + l.max_html_attributes
                + 16
        }
        ChunkKind::Citation => l.max_standalone_line + 8,
        ChunkKind::ListItem => {
            (1 + 2 * l.max_nested_list_items)
                * (l.max_list_indent + with_lookahead(l.max_list_item) + 8)
        }
        ChunkKind::Blockquote => {
            l.max_blockquote_lines * (with_lookahead(l.max_blockquote_line) + 8)
        }
        ChunkKind::CodeBlock => {
            let indented = (l.max_indented_code_lines + 1) * (l.max_list_item + 8);
            l.max_code_block.max(indented) + l.max_code_language + 16
        }
        ChunkKind::Table => {
            let rows = (2 + l.max_table_rows) * (l.max_table_cell + 8);
            rows.max(l.max_html_table + l.max_html_attributes + 16)
        }
        ChunkKind::HorizontalRule => l.max_heading_underline + 4,
        ChunkKind::StandaloneLine => {
            with_lookahead(l.max_standalone_line) + l.max_html_attributes + 40
        }
        ChunkKind::Sentence => with_lookahead(l.max_sentence),
        ChunkKind::DelimitedSpan => {
            let parens = l.max_nested_parens * (l.max_parenthetical + 2);
            (l.max_quoted_text + 8).max(parens)
        }
        ChunkKind::Paragraph => with_lookahead(l.max_paragraph) + 8,
        ChunkKind::HtmlElement => l.max_html_content + l.max_html_attributes + 40,
        ChunkKind::MathBlock => l.max_math_block + 4,
        ChunkKind::Fallback => with_lookahead(l.max_standalone_line),
    }
}

fn chunks_respect_bounds(chunks: &[Chunk], l: &Limits) -> bool {
    chunks
        .iter()
        .all(|c| c.content.chars().count() <= implied_bound(c.kind, l) + TAIL_ALLOWANCE)
}

// =============================================================================
// Scan Invariants
// =============================================================================

proptest! {
    #[test]
    fn arbitrary_ordered(text in arbitrary_text()) {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        prop_assert!(chunks_ordered_and_disjoint(&grammar.scan(&text)));
    }

    #[test]
    fn arbitrary_bounds_valid(text in arbitrary_text()) {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        prop_assert!(chunk_bounds_valid(&grammar.scan(&text), &text));
    }

    #[test]
    fn arbitrary_text_matches(text in arbitrary_text()) {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        prop_assert!(chunk_text_matches(&grammar.scan(&text), &text));
    }

    #[test]
    fn sentence_like_never_empty_handed(text in sentence_like_text()) {
        // Word-and-period text always yields at least one chunk.
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        let chunks = grammar.scan(&text);
        prop_assert!(!chunks.is_empty());
        prop_assert!(chunks_ordered_and_disjoint(&chunks));
        prop_assert!(chunk_text_matches(&chunks, &text));
    }

    #[test]
    fn markdown_like_invariants(text in markdown_like_text()) {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        let chunks = grammar.scan(&text);
        prop_assert!(chunks_ordered_and_disjoint(&chunks));
        prop_assert!(chunk_bounds_valid(&chunks, &text));
        prop_assert!(chunk_text_matches(&chunks, &text));
    }

    #[test]
    fn arbitrary_respects_bounds(text in arbitrary_text()) {
        let limits = Limits::default();
        let grammar = Grammar::compile(&limits).unwrap();
        prop_assert!(chunks_respect_bounds(&grammar.scan(&text), &limits));
    }

    #[test]
    fn markdown_like_respects_bounds(text in markdown_like_text()) {
        let limits = Limits::default();
        let grammar = Grammar::compile(&limits).unwrap();
        prop_assert!(chunks_respect_bounds(&grammar.scan(&text), &limits));
    }

    #[test]
    fn scan_is_deterministic(text in markdown_like_text()) {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        prop_assert_eq!(grammar.scan(&text), grammar.scan(&text));
    }

    #[test]
    fn iterator_agrees_with_scan(text in markdown_like_text()) {
        let grammar = Grammar::compile(&Limits::default()).unwrap();
        let collected: Vec<Chunk> = grammar.chunks(&text).collect();
        prop_assert_eq!(collected, grammar.scan(&text));
    }
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn unicode_spans_never_split_characters() {
    let grammar = Grammar::compile(&Limits::default()).unwrap();
    let text = "Hello 世界. Привет мир. مرحبا بالعالم";
    for chunk in grammar.scan(text) {
        // Slicing at the reported offsets must not panic.
        assert_eq!(&text[chunk.span()], chunk.content);
    }
}

#[test]
fn lookahead_keeps_sentences_near_the_cap() {
    // A boundary found inside the lookahead window stretches the chunk past
    // the cap by at most the window plus the absorbed trailing space.
    let limits = Limits::default();
    let grammar = Grammar::compile(&limits).unwrap();
    let text = format!("{}. tail", "a".repeat(450));
    let chunks = grammar.scan(&text);
    assert_eq!(chunks[0].kind, ChunkKind::Sentence);
    assert_eq!(chunks[0].content.chars().count(), 452);
    assert!(chunks[0].content.chars().count() <= limits.max_sentence + limits.lookahead_range + 2);
}

#[test]
fn newline_only_input_yields_nothing() {
    let grammar = Grammar::compile(&Limits::default()).unwrap();
    assert!(grammar.scan("\n\n\n").is_empty());
}

#[test]
fn single_word_input() {
    let grammar = Grammar::compile(&Limits::default()).unwrap();
    let chunks = grammar.scan("hello");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "hello");
}

// =============================================================================
// Shared-Grammar Concurrency
// =============================================================================

#[test]
fn one_grammar_scans_from_many_threads() {
    let grammar = Grammar::compile(&Limits::default()).unwrap();
    let texts = [
        "# Title\n\nBody text.",
        "- one\n- two\n- three",
        "Hello world. Next sentence!",
        "> quoted line.\n> another.",
    ];
    let expected: Vec<Vec<Chunk>> = texts.iter().map(|t| grammar.scan(t)).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = texts
            .iter()
            .map(|text| scope.spawn(|| grammar.scan(text)))
            .collect();
        for (handle, want) in handles.into_iter().zip(&expected) {
            assert_eq!(&handle.join().unwrap(), want);
        }
    });
}
