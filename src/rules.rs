//! The ordered rule set: fourteen structural rules, one matcher each.
//!
//! ## Two Kinds of Matcher
//!
//! Line-shaped structural rules — headings, citations, pipe tables,
//! horizontal rules — compile to `regex` patterns: multiline anchors and
//! bounded repetitions over line-safe classes keep the compiled programs
//! small.
//!
//! Everything else is a short hand-written scanner. The rules built around a
//! *bounded sentence* (list items, blockquotes, standalone lines, sentences,
//! paragraphs, fallback) and the same-quote span rule need lookbehind,
//! lookahead, or backreferences, which the `regex` crate does not do. The
//! free-content bodies (fenced code, `<pre>`, HTML `<table>`, generic HTML
//! elements, display math) would need a counted repetition of the
//! any-character class, which blows past the engine's compiled-size budget;
//! their scanners enforce the same length caps in code. Both kinds sit
//! behind the same [`Matcher`] seam, so the scanner never cares which is
//! which.
//!
//! ## Priority
//!
//! Rules are declared most-specific first. The scanner prefers the earliest
//! match in the text; when two rules match at the same position, the earlier
//! rule in this list wins. That is what keeps a code fence from being read as
//! a paragraph and a `---` divider from being read as a sentence.

use regex::Regex;

use crate::boundary::{is_avoid_at_start, Boundary};
use crate::chunk::ChunkKind;
use crate::error::Result;
use crate::limits::Limits;

/// One rule's matching seam: the leftmost match starting at or after `at`.
///
/// Implementations must return a non-empty span and never match across a
/// position earlier than `at`.
pub(crate) trait Matcher: Send + Sync {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)>;
}

/// A named, ordered pattern fragment: one structural category.
pub(crate) struct Rule {
    pub(crate) kind: ChunkKind,
    matcher: Box<dyn Matcher>,
}

impl Rule {
    fn new(kind: ChunkKind, matcher: impl Matcher + 'static) -> Self {
        Self {
            kind,
            matcher: Box::new(matcher),
        }
    }

    fn pattern(kind: ChunkKind, pattern: &str) -> Result<Self> {
        Ok(Self::new(kind, Pattern(Regex::new(pattern)?)))
    }

    pub(crate) fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        self.matcher.find_at(text, at)
    }
}

/// Build the full priority-ordered rule set.
pub(crate) fn build_rules(limits: &Limits) -> Result<Vec<Rule>> {
    let b = Boundary::new(limits)?;
    Ok(vec![
        Rule::pattern(ChunkKind::Heading, &heading_pattern(limits))?,
        Rule::pattern(ChunkKind::Citation, &citation_pattern(limits))?,
        Rule::new(ChunkKind::ListItem, ListItemRule::new(b.clone(), limits)),
        Rule::new(ChunkKind::Blockquote, BlockquoteRule::new(b.clone(), limits)),
        Rule::new(ChunkKind::CodeBlock, CodeBlockRule::new(limits)),
        Rule::new(ChunkKind::Table, TableRule::new(limits)?),
        Rule::pattern(ChunkKind::HorizontalRule, &horizontal_rule_pattern(limits))?,
        Rule::new(
            ChunkKind::StandaloneLine,
            StandaloneLineRule::new(b.clone(), limits),
        ),
        Rule::new(
            ChunkKind::Sentence,
            SentenceRule::new(b.clone(), limits.max_sentence),
        ),
        Rule::new(ChunkKind::DelimitedSpan, SpanRule::new(limits)),
        Rule::new(ChunkKind::Paragraph, ParagraphRule::new(b.clone(), limits)),
        Rule::new(ChunkKind::HtmlElement, HtmlElementRule::new(limits)),
        Rule::new(ChunkKind::MathBlock, MathBlockRule::new(limits)),
        Rule::new(
            ChunkKind::Fallback,
            SentenceRule::new(b, limits.max_standalone_line),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Regex-backed rules
// ---------------------------------------------------------------------------

struct Pattern(Regex);

impl Matcher for Pattern {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        self.0.find_at(text, at).map(|m| (m.start(), m.end()))
    }
}

/// ATX-style (`#`, or a 2+ run of `*`/`=`/`-`, then a space), Setext
/// underline, or HTML `<h1>`-`<h6>`. A single `-`/`*` marker is left for the
/// list rule, and a bare marker line for the horizontal-rule rule.
fn heading_pattern(l: &Limits) -> String {
    format!(
        r"(?m)(?:^(?:#{{1,{mk}}}|[*=-]{{2,{mk}}})[ \t][^\r\n]{{1,{mc}}}(?:\r?\n|$)|^\w[^\r\n]{{0,{mc}}}\r?\n[-=]{{2,{mu}}}[ \t]*(?:\r?\n|$)|<h[1-6][^>\r\n]{{0,{ma}}}>[^\r\n]{{1,{mc}}}(?:</h[1-6]>)?(?:\r?\n|$))",
        mk = l.max_heading_marker,
        mc = l.max_heading_content,
        mu = l.max_heading_underline,
        ma = l.max_html_attributes,
    )
}

/// `[n]` followed by the cited line.
fn citation_pattern(l: &Limits) -> String {
    format!(
        r"\[[0-9]{{1,4}}\][^\r\n]{{1,{msl}}}",
        msl = l.max_standalone_line
    )
}

/// Pipe-delimited table rows: header, optional alignment row, data rows.
/// The HTML `<table>` form is scanned by hand in [`TableRule`].
fn table_rows_pattern(l: &Limits) -> String {
    format!(
        r"(?m)^\|[^\r\n]{{0,{cell}}}\|[ \t]*(?:\r?\n\|[-:| ]{{1,{cell}}}\|[ \t]*)?(?:\r?\n\|[^\r\n]{{0,{cell}}}\|[ \t]*){{0,{rows}}}",
        cell = l.max_table_cell,
        rows = l.max_table_rows,
    )
}

fn horizontal_rule_pattern(l: &Limits) -> String {
    format!(
        r"(?m)(?:^[-*_]{{{min},{max}}}[ \t]*(?:\r?\n|$)|<hr[ \t]*/?>)",
        min = l.min_horizontal_rule,
        max = l.max_heading_underline,
    )
}

// ---------------------------------------------------------------------------
// Position helpers shared by the hand-written matchers
// ---------------------------------------------------------------------------

fn at_line_start(text: &str, pos: usize) -> bool {
    pos == 0 || text.as_bytes()[pos - 1] == b'\n'
}

fn next_line_start(text: &str, pos: usize) -> Option<usize> {
    text[pos..].find('\n').map(|i| pos + i + 1)
}

/// Length of the line break at `pos`: 2 for `\r\n`, 1 for `\n`, else 0.
fn line_break_len(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    if rest.starts_with("\r\n") {
        2
    } else {
        usize::from(rest.starts_with('\n'))
    }
}

/// Try a line-anchored match at every line start from `at` onward.
fn find_at_line_starts(
    text: &str,
    at: usize,
    mut try_at: impl FnMut(usize) -> Option<usize>,
) -> Option<(usize, usize)> {
    let mut pos = if at_line_start(text, at) {
        at
    } else {
        next_line_start(text, at)?
    };
    loop {
        if let Some(end) = try_at(pos) {
            if end > pos {
                return Some((pos, end));
            }
        }
        pos = next_line_start(text, pos)?;
    }
}

/// Try a free match at every character position from `at` onward.
fn find_at_chars(
    text: &str,
    at: usize,
    mut try_at: impl FnMut(usize) -> Option<usize>,
) -> Option<(usize, usize)> {
    for (off, _) in text[at..].char_indices() {
        let pos = at + off;
        if let Some(end) = try_at(pos) {
            if end > pos {
                return Some((pos, end));
            }
        }
    }
    None
}

/// The earlier of two candidate spans; `a` wins ties.
fn earliest(a: Option<(usize, usize)>, b: Option<(usize, usize)>) -> Option<(usize, usize)> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y.0 < x.0 { y } else { x }),
        (x, y) => x.or(y),
    }
}

fn is_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// `<tag attrs>` at the start of `rest`; returns its byte length.
fn open_tag_len(rest: &str, max_attrs: usize) -> Option<usize> {
    let tail = rest.strip_prefix('<')?;
    let mut chars = tail.char_indices();
    if !chars.next().is_some_and(|(_, c)| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut seen = 0usize;
    for (i, ch) in chars {
        match ch {
            '>' => return Some(1 + i + 1),
            '\r' | '\n' => return None,
            _ => {
                seen += 1;
                if seen > max_attrs {
                    return None;
                }
            }
        }
    }
    None
}

/// `</tag>` at the start of `rest`; returns its byte length.
fn close_tag_len(rest: &str) -> Option<usize> {
    let tail = rest.strip_prefix("</")?;
    let name = tail.bytes().take_while(u8::is_ascii_alphabetic).count();
    (name >= 1 && tail.as_bytes().get(name) == Some(&b'>')).then(|| 2 + name + 1)
}

// ---------------------------------------------------------------------------
// List items
// ---------------------------------------------------------------------------

/// Bullet, task, numbered, or lettered marker; returns its byte length.
/// The caller requires trailing whitespace, which is what keeps `3.14` from
/// reading as a numbered item.
fn list_marker_len(rest: &str) -> Option<usize> {
    let first = rest.chars().next()?;
    match first {
        '-' | '*' | '+' | '•' => Some(first.len_utf8()),
        '[' => matches!(rest.get(..3), Some("[ ]" | "[x]" | "[X]")).then_some(3),
        c if c.is_ascii_digit() => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            (digits <= 3 && rest.as_bytes().get(digits) == Some(&b'.')).then(|| digits + 1)
        }
        c if c.is_ascii_alphabetic() => rest[1..].starts_with('.').then_some(2),
        _ => None,
    }
}

/// A top-level list item plus up to two tiers of nested items, captured as
/// one chunk.
struct ListItemRule {
    boundary: Boundary,
    max_item: usize,
    max_nested: usize,
    max_indent: usize,
}

impl ListItemRule {
    fn new(boundary: Boundary, l: &Limits) -> Self {
        Self {
            boundary,
            max_item: l.max_list_item,
            max_nested: l.max_nested_list_items,
            max_indent: l.max_list_indent,
        }
    }

    /// Indent run, marker, at least one space, bounded sentence.
    fn item(&self, text: &str, pos: usize, min_indent: usize, max_indent: usize) -> Option<usize> {
        let bytes = text.as_bytes();
        let mut p = pos;
        let mut indent = 0usize;
        while indent < max_indent && matches!(bytes.get(p), Some(b' ' | b'\t')) {
            p += 1;
            indent += 1;
        }
        if indent < min_indent {
            return None;
        }
        p += list_marker_len(&text[p..])?;
        let mut spaces = 0usize;
        while matches!(bytes.get(p), Some(b' ' | b'\t')) {
            p += 1;
            spaces += 1;
        }
        if spaces == 0 {
            return None;
        }
        self.boundary.sentence_span(text, p, self.max_item)
    }

    /// A line break followed by a nested item in the given indent band.
    fn continuation(&self, text: &str, pos: usize, min: usize, max: usize) -> Option<usize> {
        let nl = line_break_len(text, pos);
        if nl == 0 {
            return None;
        }
        self.item(text, pos + nl, min, max)
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        let mut cur = self.item(text, pos, 0, 3)?;
        for _ in 0..self.max_nested {
            match self.continuation(text, cur, 2, 5) {
                Some(next) => cur = next,
                None => break,
            }
        }
        for _ in 0..self.max_nested {
            match self.continuation(text, cur, 4, self.max_indent) {
                Some(next) => cur = next,
                None => break,
            }
        }
        Some(cur)
    }
}

impl Matcher for ListItemRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_line_starts(text, at, |pos| self.match_at(text, pos))
    }
}

// ---------------------------------------------------------------------------
// Blockquotes
// ---------------------------------------------------------------------------

/// Consecutive `>`-prefixed lines, nesting up to two levels, one bounded
/// sentence per line.
struct BlockquoteRule {
    boundary: Boundary,
    max_line: usize,
    max_lines: usize,
}

impl BlockquoteRule {
    fn new(boundary: Boundary, l: &Limits) -> Self {
        Self {
            boundary,
            max_line: l.max_blockquote_line,
            max_lines: l.max_blockquote_lines,
        }
    }

    /// One `>` line: marker, up to two nesting units (`>` or a 2+ space run),
    /// then a bounded sentence.
    fn quote_line(&self, text: &str, pos: usize) -> Option<usize> {
        if !text[pos..].starts_with('>') {
            return None;
        }
        let bytes = text.as_bytes();
        let mut p = pos + 1;
        for _ in 0..2 {
            if bytes.get(p) == Some(&b'>') {
                p += 1;
            } else {
                let run = text[p..].bytes().take_while(|b| *b == b' ').count();
                if run >= 2 {
                    p += run;
                } else {
                    break;
                }
            }
        }
        self.boundary.sentence_span(text, p, self.max_line)
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        let mut cur = self.quote_line(text, pos)?;
        let mut lines = 1usize;
        loop {
            let nl = line_break_len(text, cur);
            cur += nl;
            if nl == 0 || lines == self.max_lines || !text[cur..].starts_with('>') {
                return Some(cur);
            }
            match self.quote_line(text, cur) {
                Some(end) => {
                    cur = end;
                    lines += 1;
                }
                None => return Some(cur),
            }
        }
    }
}

impl Matcher for BlockquoteRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_line_starts(text, at, |pos| self.match_at(text, pos))
    }
}

// ---------------------------------------------------------------------------
// Standalone lines
// ---------------------------------------------------------------------------

/// A full line holding one bounded sentence, optionally wrapped in a simple
/// HTML tag pair. Consumes its line terminator.
struct StandaloneLineRule {
    boundary: Boundary,
    max_len: usize,
    max_attrs: usize,
}

impl StandaloneLineRule {
    fn new(boundary: Boundary, l: &Limits) -> Self {
        Self {
            boundary,
            max_len: l.max_standalone_line,
            max_attrs: l.max_html_attributes,
        }
    }

    fn body(&self, text: &str, pos: usize) -> Option<usize> {
        let mut end = self.boundary.sentence_span(text, pos, self.max_len)?;
        if let Some(n) = close_tag_len(&text[end..]) {
            end += n;
        }
        let nl = line_break_len(text, end);
        (nl > 0 || end == text.len()).then(|| end + nl)
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        let first = text[pos..].chars().next()?;
        if is_avoid_at_start(first) {
            return None;
        }
        // Prefer the tag-wrapped reading; fall back to the bare line when the
        // wrapped body does not parse as a sentence.
        if let Some(n) = open_tag_len(&text[pos..], self.max_attrs) {
            if let Some(end) = self.body(text, pos + n) {
                return Some(end);
            }
        }
        self.body(text, pos)
    }
}

impl Matcher for StandaloneLineRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_line_starts(text, at, |pos| self.match_at(text, pos))
    }
}

// ---------------------------------------------------------------------------
// Sentences (and the fallback)
// ---------------------------------------------------------------------------

/// A bounded sentence anywhere in the text. Doubles as the fallback rule
/// with a wider cap.
struct SentenceRule {
    boundary: Boundary,
    max_len: usize,
}

impl SentenceRule {
    fn new(boundary: Boundary, max_len: usize) -> Self {
        Self { boundary, max_len }
    }
}

impl Matcher for SentenceRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_chars(text, at, |pos| {
            let first = text[pos..].chars().next()?;
            if is_avoid_at_start(first) {
                return None;
            }
            self.boundary.sentence_span(text, pos, self.max_len)
        })
    }
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// A text block at input start or after a blank line, running to the next
/// blank line or end of input. Optionally `<p>`-wrapped.
struct ParagraphRule {
    boundary: Boundary,
    max_len: usize,
}

impl ParagraphRule {
    fn new(boundary: Boundary, l: &Limits) -> Self {
        Self {
            boundary,
            max_len: l.max_paragraph,
        }
    }

    fn after_blank_line(text: &str, pos: usize) -> bool {
        if pos == 0 {
            return true;
        }
        let bytes = text.as_bytes();
        if bytes[pos - 1] != b'\n' {
            return false;
        }
        let mut q = pos - 1;
        if q > 0 && bytes[q - 1] == b'\r' {
            q -= 1;
        }
        q > 0 && bytes[q - 1] == b'\n'
    }

    fn blank_line_follows(text: &str, pos: usize) -> bool {
        let rest = &text[pos..];
        if rest.is_empty() {
            return true;
        }
        let first = line_break_len(text, pos);
        first > 0 && line_break_len(text, pos + first) > 0
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        if !Self::after_blank_line(text, pos) {
            return None;
        }
        let first = text[pos..].chars().next()?;
        if is_avoid_at_start(first) {
            return None;
        }
        let start = if text[pos..].starts_with("<p>") {
            pos + 3
        } else {
            pos
        };
        let mut end = self.boundary.sentence_span(text, start, self.max_len)?;
        if text[end..].starts_with("</p>") {
            end += 4;
        }
        Self::blank_line_follows(text, end).then_some(end)
    }
}

impl Matcher for ParagraphRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_line_starts(text, at, |pos| self.match_at(text, pos))
    }
}

// ---------------------------------------------------------------------------
// Delimited spans
// ---------------------------------------------------------------------------

/// Quoted text, balanced parentheses/brackets, and inline math or code
/// spans. The same-quote forms need the close delimiter to equal the open
/// delimiter — a backreference — so this is a hand-written scanner.
struct SpanRule {
    max_quoted: usize,
    max_level: usize,
    max_depth: usize,
    max_inline: usize,
}

impl SpanRule {
    fn new(l: &Limits) -> Self {
        Self {
            max_quoted: l.max_quoted_text,
            max_level: l.max_parenthetical,
            max_depth: l.max_nested_parens,
            max_inline: l.max_math_inline,
        }
    }

    /// The closing delimiter paired with an opening quote character.
    fn close_quote(open: char) -> char {
        match open {
            '\u{2018}' => '\u{2019}',
            '\u{201C}' => '\u{201D}',
            other => other,
        }
    }

    fn prev_is_word(text: &str, pos: usize) -> bool {
        text[..pos].chars().next_back().is_some_and(is_word)
    }

    /// `"""..."""`, content free of double quotes, word-adjacent on neither
    /// side. Content may span lines.
    fn triple_quoted(&self, text: &str, pos: usize) -> Option<usize> {
        if Self::prev_is_word(text, pos) {
            return None;
        }
        let body = text[pos..].strip_prefix(r#"""""#)?;
        let mut chars = 0usize;
        for (off, ch) in body.char_indices() {
            if ch == '"' {
                if !body[off..].starts_with(r#"""""#) {
                    return None;
                }
                let end = pos + 3 + off + 3;
                if text[end..].chars().next().is_some_and(is_word) {
                    return None;
                }
                return Some(end);
            }
            chars += 1;
            if chars > self.max_quoted {
                return None;
            }
        }
        None
    }

    /// `` `...' `` and ``` ``...'' ``` LaTeX-style quotes.
    fn latex_quoted(&self, text: &str, pos: usize, open: &str, close: &str) -> Option<usize> {
        if Self::prev_is_word(text, pos) {
            return None;
        }
        let body = text[pos..].strip_prefix(open)?;
        let mut chars = 0usize;
        for (off, ch) in body.char_indices() {
            if body[off..].starts_with(close) {
                let end = pos + open.len() + off + close.len();
                if text[end..].chars().next().is_some_and(is_word) {
                    return None;
                }
                return Some(end);
            }
            if ch == '\r' || ch == '\n' {
                return None;
            }
            chars += 1;
            if chars > self.max_quoted {
                return None;
            }
        }
        None
    }

    /// Same-character quoting: the close delimiter must match the open one.
    fn same_quoted(&self, text: &str, pos: usize) -> Option<usize> {
        let open = text[pos..].chars().next()?;
        if !matches!(
            open,
            '\'' | '"' | '`' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'
        ) || Self::prev_is_word(text, pos)
        {
            return None;
        }
        let close = Self::close_quote(open);
        let body = &text[pos + open.len_utf8()..];
        let mut chars = 0usize;
        for (off, ch) in body.char_indices() {
            if ch == close {
                let end = pos + open.len_utf8() + off + close.len_utf8();
                if text[end..].chars().next().is_some_and(is_word) {
                    return None;
                }
                return Some(end);
            }
            if ch == '\r' || ch == '\n' {
                return None;
            }
            chars += 1;
            if chars > self.max_quoted {
                return None;
            }
        }
        None
    }

    /// Balanced pairs with a depth cap and a per-level run cap, single line.
    fn balanced(&self, text: &str, pos: usize, open: char, close: char) -> Option<usize> {
        if !text[pos..].starts_with(open) {
            return None;
        }
        let mut level_runs: Vec<usize> = Vec::with_capacity(self.max_depth);
        for (off, ch) in text[pos..].char_indices() {
            match ch {
                c if c == open => {
                    if level_runs.len() == self.max_depth {
                        return None;
                    }
                    level_runs.push(0);
                }
                c if c == close => {
                    level_runs.pop();
                    if level_runs.is_empty() {
                        return Some(pos + off + close.len_utf8());
                    }
                }
                '\r' | '\n' => return None,
                _ => {
                    let run = level_runs.last_mut()?;
                    *run += 1;
                    if *run > self.max_level {
                        return None;
                    }
                }
            }
        }
        None
    }

    /// Inline `$...$` or backtick code span; single line, non-empty.
    fn inline_delimited(&self, text: &str, pos: usize, delim: char) -> Option<usize> {
        let body = text[pos..].strip_prefix(delim)?;
        let mut chars = 0usize;
        for (off, ch) in body.char_indices() {
            if ch == delim {
                return (chars >= 1).then(|| pos + 1 + off + 1);
            }
            if ch == '\r' || ch == '\n' {
                return None;
            }
            chars += 1;
            if chars > self.max_inline {
                return None;
            }
        }
        None
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        self.triple_quoted(text, pos)
            .or_else(|| self.latex_quoted(text, pos, "``", "''"))
            .or_else(|| self.latex_quoted(text, pos, "`", "'"))
            .or_else(|| self.same_quoted(text, pos))
            .or_else(|| self.balanced(text, pos, '(', ')'))
            .or_else(|| self.balanced(text, pos, '[', ']'))
            .or_else(|| self.inline_delimited(text, pos, '$'))
            .or_else(|| self.inline_delimited(text, pos, '`'))
    }
}

impl Matcher for SpanRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_chars(text, at, |pos| {
            let first = text[pos..].chars().next()?;
            if !matches!(
                first,
                '"' | '\'' | '`' | '(' | '[' | '$' | '\u{2018}' | '\u{2019}' | '\u{201C}'
                    | '\u{201D}'
            ) {
                return None;
            }
            self.match_at(text, pos)
        })
    }
}

// ---------------------------------------------------------------------------
// Code blocks
// ---------------------------------------------------------------------------

/// Fenced, indented, or HTML `<pre>`/`<code>` code blocks. A fence body can
/// hold anything, so its length cap is enforced here rather than through a
/// counted any-character repetition in a pattern. The close fence must match
/// the open fence and sit at a line start, so an inline fence marker inside
/// the body cannot close the block.
struct CodeBlockRule {
    max_block: usize,
    max_language: usize,
    max_line: usize,
    max_lines: usize,
}

impl CodeBlockRule {
    fn new(l: &Limits) -> Self {
        Self {
            max_block: l.max_code_block,
            max_language: l.max_code_language,
            max_line: l.max_list_item,
            max_lines: l.max_indented_code_lines,
        }
    }

    /// Opening fence with an optional language tag, body lines, closing
    /// fence alone on its line.
    fn fenced(&self, text: &str, pos: usize, fence: char) -> Option<usize> {
        let mut p = pos;
        for _ in 0..3 {
            if !text[p..].starts_with(fence) {
                return None;
            }
            p += 1;
        }
        let mut lang = 0usize;
        for ch in text[p..].chars() {
            if !is_word(ch) {
                break;
            }
            lang += 1;
            if lang > self.max_language {
                return None;
            }
            p += ch.len_utf8();
        }
        let nl = line_break_len(text, p);
        if nl == 0 {
            return None;
        }
        let mut line = p + nl;
        let mut body = 0usize;
        loop {
            if let Some(end) = Self::close_fence(text, line, fence) {
                return Some(end);
            }
            let next = next_line_start(text, line)?;
            let brk = if text[..next].ends_with("\r\n") { 2 } else { 1 };
            let chars = text[line..next - brk].chars().count();
            if body + chars > self.max_block {
                return None;
            }
            body += chars + brk;
            line = next;
        }
    }

    /// Three fence characters, optional trailing blanks, then a line end
    /// (consumed) or end of input.
    fn close_fence(text: &str, pos: usize, fence: char) -> Option<usize> {
        let mut p = pos;
        for _ in 0..3 {
            if !text[p..].starts_with(fence) {
                return None;
            }
            p += 1;
        }
        while matches!(text.as_bytes().get(p), Some(b' ' | b'\t')) {
            p += 1;
        }
        let nl = line_break_len(text, p);
        (nl > 0 || p == text.len()).then(|| p + nl)
    }

    /// One four-space or tab indented line; returns the position of its
    /// line end.
    fn indented_line(&self, text: &str, pos: usize) -> Option<usize> {
        let rest = &text[pos..];
        let mut p = if rest.starts_with("    ") {
            pos + 4
        } else if rest.starts_with('\t') {
            pos + 1
        } else {
            return None;
        };
        let mut chars = 0usize;
        for ch in text[p..].chars() {
            if ch == '\r' || ch == '\n' {
                break;
            }
            chars += 1;
            if chars > self.max_line {
                return None;
            }
            p += ch.len_utf8();
        }
        Some(p)
    }

    fn indented(&self, text: &str, pos: usize) -> Option<usize> {
        let mut end = self.indented_line(text, pos)?;
        let mut lines = 1usize;
        while lines <= self.max_lines {
            let nl = line_break_len(text, end);
            if nl == 0 {
                break;
            }
            match self.indented_line(text, end + nl) {
                Some(e) => {
                    end = e;
                    lines += 1;
                }
                None => break,
            }
        }
        let nl = line_break_len(text, end);
        (nl > 0 || end == text.len()).then(|| end + nl)
    }

    /// `<pre>`, optional `<code>`, body, nearest closing pair.
    fn pre(&self, text: &str, pos: usize) -> Option<usize> {
        let mut p = pos + "<pre>".len();
        if text[p..].starts_with("<code>") {
            p += "<code>".len();
        }
        let mut chars = 0usize;
        loop {
            let rest = &text[p..];
            if rest.starts_with("</code></pre>") {
                return Some(p + "</code></pre>".len());
            }
            if rest.starts_with("</pre>") {
                return Some(p + "</pre>".len());
            }
            let ch = rest.chars().next()?;
            chars += 1;
            if chars > self.max_block {
                return None;
            }
            p += ch.len_utf8();
        }
    }
}

impl Matcher for CodeBlockRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_chars(text, at, |pos| {
            if at_line_start(text, pos) {
                let block = self
                    .fenced(text, pos, '`')
                    .or_else(|| self.fenced(text, pos, '~'))
                    .or_else(|| self.indented(text, pos));
                if block.is_some() {
                    return block;
                }
            }
            if text[pos..].starts_with("<pre>") {
                return self.pre(text, pos);
            }
            None
        })
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Pipe-delimited rows through a compiled pattern, or an HTML `<table>`
/// whose free-content body is bounded in code.
struct TableRule {
    rows: Regex,
    max_attrs: usize,
    max_html: usize,
}

impl TableRule {
    fn new(l: &Limits) -> Result<Self> {
        Ok(Self {
            rows: Regex::new(&table_rows_pattern(l))?,
            max_attrs: l.max_html_attributes,
            max_html: l.max_html_table,
        })
    }

    fn html_table(&self, text: &str, pos: usize) -> Option<usize> {
        if !text[pos..].starts_with("<table") {
            return None;
        }
        let mut p = pos + "<table".len();
        let mut seen = 0usize;
        loop {
            let ch = text[p..].chars().next()?;
            match ch {
                '>' => {
                    p += 1;
                    break;
                }
                '\r' | '\n' => return None,
                _ => {
                    seen += 1;
                    if seen > self.max_attrs {
                        return None;
                    }
                    p += ch.len_utf8();
                }
            }
        }
        let mut chars = 0usize;
        loop {
            if text[p..].starts_with("</table>") {
                return Some(p + "</table>".len());
            }
            let ch = text[p..].chars().next()?;
            chars += 1;
            if chars > self.max_html {
                return None;
            }
            p += ch.len_utf8();
        }
    }
}

impl Matcher for TableRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        let rows = self.rows.find_at(text, at).map(|m| (m.start(), m.end()));
        let html = find_at_chars(text, at, |pos| self.html_table(text, pos));
        earliest(rows, html)
    }
}

// ---------------------------------------------------------------------------
// HTML elements
// ---------------------------------------------------------------------------

/// Generic `<tag attrs>content</tag>` pair or a self-closing tag. The
/// content between the tags may hold anything, so its cap lives here.
struct HtmlElementRule {
    max_attrs: usize,
    max_content: usize,
}

impl HtmlElementRule {
    fn new(l: &Limits) -> Self {
        Self {
            max_attrs: l.max_html_attributes,
            max_content: l.max_html_content,
        }
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        let rest = &text[pos..];
        if !rest.starts_with('<') {
            return None;
        }
        let mut tag = rest.char_indices().skip(1);
        if !tag.next().is_some_and(|(_, c)| c.is_ascii_alphabetic()) {
            return None;
        }
        let mut seen = 0usize;
        let mut open_end = None;
        for (i, ch) in tag {
            if rest[i..].starts_with("/>") {
                return Some(pos + i + 2);
            }
            match ch {
                '>' => {
                    open_end = Some(pos + i + 1);
                    break;
                }
                '\r' | '\n' => return None,
                _ => {
                    seen += 1;
                    if seen > self.max_attrs {
                        return None;
                    }
                }
            }
        }
        let mut p = open_end?;
        let mut chars = 0usize;
        loop {
            if let Some(n) = close_tag_len(&text[p..]) {
                return Some(p + n);
            }
            let ch = text[p..].chars().next()?;
            chars += 1;
            if chars > self.max_content {
                return None;
            }
            p += ch.len_utf8();
        }
    }
}

impl Matcher for HtmlElementRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_chars(text, at, |pos| self.match_at(text, pos))
    }
}

// ---------------------------------------------------------------------------
// Math blocks
// ---------------------------------------------------------------------------

/// `$$...$$` display math (the body may span lines) or inline `$...$`.
struct MathBlockRule {
    max_block: usize,
    max_inline: usize,
}

impl MathBlockRule {
    fn new(l: &Limits) -> Self {
        Self {
            max_block: l.max_math_block,
            max_inline: l.max_math_inline,
        }
    }

    fn display(&self, text: &str, pos: usize) -> Option<usize> {
        let mut p = pos + 2;
        let mut chars = 0usize;
        loop {
            if text[p..].starts_with("$$") {
                return Some(p + 2);
            }
            let ch = text[p..].chars().next()?;
            chars += 1;
            if chars > self.max_block {
                return None;
            }
            p += ch.len_utf8();
        }
    }

    /// Single line, at least one character of content.
    fn inline(&self, text: &str, pos: usize) -> Option<usize> {
        let mut p = pos + 1;
        let mut chars = 0usize;
        loop {
            let ch = text[p..].chars().next()?;
            match ch {
                '$' => return (chars >= 1).then_some(p + 1),
                '\r' | '\n' => return None,
                _ => {
                    chars += 1;
                    if chars > self.max_inline {
                        return None;
                    }
                    p += ch.len_utf8();
                }
            }
        }
    }

    fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        if text[pos..].starts_with("$$") {
            self.display(text, pos)
        } else if text[pos..].starts_with('$') {
            self.inline(text, pos)
        } else {
            None
        }
    }
}

impl Matcher for MathBlockRule {
    fn find_at(&self, text: &str, at: usize) -> Option<(usize, usize)> {
        find_at_chars(text, at, |pos| self.match_at(text, pos))
    }
}
