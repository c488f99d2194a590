use std::sync::LazyLock;

use regex::Regex;

use crate::blocks::{
    build_image, find_image, is_table_separator, parse_alignments, parse_size_directive,
    parse_video, split_pipe_row,
};
use crate::config::RenderOptions;
use crate::error::Diagnostic;
use crate::footnote::{Line, extract_footnotes};
use crate::inline::format_inline;
use crate::types::{
    Alignment, Block, Document, Footnote, FootnoteTable, Inline, ListItem, Span, TaskItem,
};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}) (.*)$").expect("valid regex"));
static TASK_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[([ xX])\](?: (.*))?$").expect("valid regex"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\. (.*)$").expect("valid regex"));
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<summary>(.*)</summary>\s*$").expect("valid regex"));

/// Result of parsing a post body.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed document.
    pub doc: Document,
    /// Non-fatal diagnostics collected during parsing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a post body with default options.
///
/// This function never panics and never fails. Malformed structure degrades
/// to paragraphs and is reported in `diagnostics`.
pub fn parse(input: &str) -> ParseResult {
    parse_with_options(input, &RenderOptions::default())
}

/// Parse a post body and keep only the document.
pub fn render(input: &str) -> Document {
    parse(input).doc
}

pub fn parse_with_options(input: &str, options: &RenderOptions) -> ParseResult {
    let mut diagnostics = Vec::new();

    // Normalise CRLF → LF.
    let normalised = input.replace("\r\n", "\n");

    // ---------------------------------------------------------------
    // Pre-pass: footnote definitions.
    // ---------------------------------------------------------------
    let pre = extract_footnotes(&normalised, &mut diagnostics);

    // ---------------------------------------------------------------
    // Block segmentation.
    // ---------------------------------------------------------------
    let mut segmenter = Segmenter {
        footnotes: &pre.footnotes,
        options,
        diagnostics: &mut diagnostics,
    };
    let mut blocks = segmenter.segment(&pre.lines, 0);

    if !pre.footnotes.is_empty() {
        blocks.push(footnote_listing(&pre.footnotes));
    }

    log::debug!(
        "parsed {} blocks ({} footnotes, {} diagnostics)",
        blocks.len(),
        pre.footnotes.len(),
        diagnostics.len()
    );

    ParseResult {
        doc: Document { blocks },
        diagnostics,
    }
}

fn footnote_listing(footnotes: &FootnoteTable) -> Block {
    let notes = footnotes
        .iter()
        .enumerate()
        .map(|(idx, (id, text))| Footnote {
            id: id.to_string(),
            number: idx + 1,
            text: text.to_string(),
            content: format_inline(text, footnotes),
        })
        .collect();
    Block::Footnotes { notes }
}

// ------------------------------------------------------------------
// Segmenter
// ------------------------------------------------------------------

/// The container currently being filled.
///
/// Only one can be open at a time, and a code block suppresses every other
/// line rule while it is open.
#[derive(Debug)]
enum State {
    Idle,
    UnorderedList(Vec<ListItem>),
    OrderedList {
        start: u64,
        items: Vec<ListItem>,
    },
    TaskList(Vec<TaskItem>),
    CodeBlock {
        lang: Option<String>,
        lines: Vec<String>,
    },
    Table {
        headers: Vec<String>,
        alignments: Vec<Alignment>,
        rows: Vec<Vec<String>>,
    },
}

impl State {
    fn into_block(self) -> Option<Block> {
        match self {
            State::Idle => None,
            State::UnorderedList(items) => Some(Block::UnorderedList { items }),
            State::OrderedList { start, items } => Some(Block::OrderedList { start, items }),
            State::TaskList(items) => Some(Block::TaskList { items }),
            State::CodeBlock { lang, lines } => Some(Block::CodeBlock { lang, lines }),
            State::Table {
                headers,
                alignments,
                rows,
            } => Some(Block::Table {
                headers,
                alignments,
                rows,
            }),
        }
    }

    /// Whether a line of `kind` continues the open container.
    fn continues_with(&self, kind: &LineKind<'_>) -> bool {
        matches!(
            (self, kind),
            (State::Idle, _)
                | (State::UnorderedList(_), LineKind::Unordered(_))
                | (State::OrderedList { .. }, LineKind::Ordered { .. })
                | (State::TaskList(_), LineKind::Task { .. })
                | (State::Table { .. }, LineKind::TableRow)
        )
    }
}

struct Segmenter<'a> {
    footnotes: &'a FootnoteTable,
    options: &'a RenderOptions,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Segmenter<'_> {
    /// Segment `lines` into blocks. `depth` counts enclosing `<details>`.
    fn segment(&mut self, lines: &[Line<'_>], depth: usize) -> Vec<Block> {
        let mut out = Vec::new();
        let mut state = State::Idle;
        let outline = Outline::of(lines);
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            let next_kind = lines.get(idx + 1).map(|l| classify(l.text));

            if let State::CodeBlock { lines: code, .. } = &mut state {
                if is_fence(line.text) {
                    flush(&mut state, &mut out);
                } else {
                    code.push(line.text.to_string());
                }
                idx += 1;
                continue;
            }

            let kind = classify(line.text);
            if !state.continues_with(&kind) {
                flush(&mut state, &mut out);
            }

            match kind {
                LineKind::Fence { lang } => {
                    if lines[idx + 1..].iter().any(|l| is_fence(l.text)) {
                        state = State::CodeBlock {
                            lang: lang.map(str::to_string),
                            lines: Vec::new(),
                        };
                    } else {
                        self.warn(
                            "W001",
                            "Code fence is never closed; treating it as text",
                            line,
                        );
                        out.push(self.paragraph(line));
                    }
                }

                LineKind::Heading { level, text } => out.push(Block::Heading {
                    level,
                    content: self.inline(text),
                }),

                LineKind::Blockquote(text) => out.push(Block::Blockquote {
                    content: self.inline(text),
                }),

                LineKind::Rule => out.push(Block::HorizontalRule),

                LineKind::Task { checked, text } => {
                    let item = TaskItem {
                        checked,
                        content: self.inline(text),
                    };
                    match &mut state {
                        State::TaskList(items) => items.push(item),
                        _ => state = State::TaskList(vec![item]),
                    }
                    if !matches!(next_kind, Some(LineKind::Task { .. })) {
                        flush(&mut state, &mut out);
                    }
                }

                LineKind::Unordered(text) => {
                    let item = ListItem {
                        content: self.inline(text),
                    };
                    match &mut state {
                        State::UnorderedList(items) => items.push(item),
                        _ => state = State::UnorderedList(vec![item]),
                    }
                    if !matches!(next_kind, Some(LineKind::Unordered(_))) {
                        flush(&mut state, &mut out);
                    }
                }

                LineKind::Ordered { number, text } => {
                    let item = ListItem {
                        content: self.inline(text),
                    };
                    match &mut state {
                        State::OrderedList { items, .. } => items.push(item),
                        _ => {
                            state = State::OrderedList {
                                start: number,
                                items: vec![item],
                            }
                        }
                    }
                    if !matches!(next_kind, Some(LineKind::Ordered { .. })) {
                        flush(&mut state, &mut out);
                    }
                }

                LineKind::DetailsOpen => match outline.close_of(idx) {
                    Some(close) if depth < self.options.max_nesting_depth => {
                        let (summary, inner) = split_summary(&lines[idx + 1..close]);
                        log::trace!(
                            "collapsible section at line {} (depth {})",
                            line.number,
                            depth + 1
                        );
                        let blocks = self.segment(&inner, depth + 1);
                        out.push(Block::Collapsible { summary, blocks });
                        idx = close + 1;
                        continue;
                    }
                    Some(_) => {
                        self.warn(
                            "W003",
                            format!(
                                "Collapsible sections nested deeper than {}; treating <details> as text",
                                self.options.max_nesting_depth
                            ),
                            line,
                        );
                        out.push(self.paragraph(line));
                    }
                    None => {
                        self.warn(
                            "W002",
                            "<details> is never closed; treating it as text",
                            line,
                        );
                        out.push(self.paragraph(line));
                    }
                },

                LineKind::Blank => out.push(Block::Break),

                LineKind::TableRow => {
                    match &mut state {
                        State::Table {
                            alignments, rows, ..
                        } => {
                            if is_table_separator(line.text) {
                                // Only the separator right under the header
                                // carries alignments; later ones are dropped.
                                if rows.is_empty() && alignments.is_empty() {
                                    *alignments = parse_alignments(line.text);
                                }
                            } else {
                                rows.push(split_pipe_row(line.text));
                            }
                        }
                        _ if is_table_separator(line.text) => {
                            out.push(self.paragraph(line));
                        }
                        _ => {
                            state = State::Table {
                                headers: split_pipe_row(line.text),
                                alignments: Vec::new(),
                                rows: Vec::new(),
                            };
                        }
                    }
                    if !matches!(next_kind, Some(LineKind::TableRow)) {
                        flush(&mut state, &mut out);
                    }
                }

                LineKind::Paragraph => out.push(self.paragraph(line)),
            }

            idx += 1;
        }

        flush(&mut state, &mut out);
        out
    }

    /// Fallback block for a line: image, then video, then plain paragraph.
    fn paragraph(&mut self, line: Line<'_>) -> Block {
        if let Some(token) = find_image(line.text) {
            let directive = token.size.and_then(parse_size_directive);
            if let (Some(raw), None) = (token.size, &directive) {
                self.warn(
                    "W004",
                    format!("Unrecognised image size directive \"{raw}\"; using defaults"),
                    line,
                );
            }
            return Block::Image(build_image(&token, directive.as_ref(), self.options));
        }

        if line.text.contains("<video") {
            if let Some(video) = parse_video(line.text, self.options) {
                return Block::Video(video);
            }
            self.warn("W005", "<video> tag without a src; treating it as text", line);
        }

        Block::Paragraph {
            content: self.inline(line.text),
        }
    }

    fn inline(&self, text: &str) -> Vec<Inline> {
        format_inline(text, self.footnotes)
    }

    fn warn(&mut self, code: &str, message: impl Into<String>, line: Line<'_>) {
        let diagnostic = Diagnostic::warning(code, message, Span::line(line.number));
        log::debug!("line {}: {}", line.number, diagnostic.message);
        self.diagnostics.push(diagnostic);
    }
}

/// Push the open container, if any, and reset to idle.
fn flush(state: &mut State, out: &mut Vec<Block>) {
    if let Some(block) = std::mem::replace(state, State::Idle).into_block() {
        out.push(block);
    }
}

// ------------------------------------------------------------------
// Collapsible sections
// ------------------------------------------------------------------

/// Fence-aware structure of one line slice, built in a single pass.
struct Outline {
    /// Per line: inside a code block, delimiters included.
    fenced: Vec<bool>,
    /// Per `<details>` line: index of its matching `</details>`.
    closes: Vec<Option<usize>>,
}

impl Outline {
    fn of(lines: &[Line<'_>]) -> Self {
        let last_fence = lines.iter().rposition(|l| is_fence(l.text));
        let mut fenced = vec![false; lines.len()];
        let mut closes = vec![None; lines.len()];
        let mut open = Vec::new();
        let mut in_fence = false;

        for (idx, line) in lines.iter().enumerate() {
            if in_fence {
                fenced[idx] = true;
                in_fence = !is_fence(line.text);
                continue;
            }
            // A fence only opens when a later one can close it.
            if is_fence(line.text) && last_fence.is_some_and(|last| idx < last) {
                fenced[idx] = true;
                in_fence = true;
                continue;
            }
            match line.text.trim() {
                "<details>" => open.push(idx),
                "</details>" => {
                    if let Some(start) = open.pop() {
                        closes[start] = Some(idx);
                    }
                }
                _ => {}
            }
        }

        Self { fenced, closes }
    }

    fn close_of(&self, open: usize) -> Option<usize> {
        self.closes.get(open).copied().flatten()
    }
}

/// Take the section's own `<summary>` line out of its inner lines.
///
/// Summaries of nested sections and lines inside code blocks stay where
/// they are.
fn split_summary<'a>(inner: &[Line<'a>]) -> (Option<String>, Vec<Line<'a>>) {
    let outline = Outline::of(inner);
    let mut summary = None;
    let mut rest = Vec::with_capacity(inner.len());
    let mut idx = 0;

    while idx < inner.len() {
        if let Some(close) = outline.close_of(idx) {
            rest.extend_from_slice(&inner[idx..=close]);
            idx = close + 1;
            continue;
        }
        let line = inner[idx];
        let is_summary = summary.is_none() && !outline.fenced[idx];
        idx += 1;
        match SUMMARY.captures(line.text) {
            Some(caps) if is_summary => {
                summary = caps.get(1).map(|m| m.as_str().trim().to_string());
            }
            _ => rest.push(line),
        }
    }

    (summary, rest)
}

// ------------------------------------------------------------------
// Line classification helpers
// ------------------------------------------------------------------

/// What a single line starts, in dispatch priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind<'a> {
    Fence { lang: Option<&'a str> },
    Heading { level: u8, text: &'a str },
    Blockquote(&'a str),
    Rule,
    Task { checked: bool, text: &'a str },
    Unordered(&'a str),
    Ordered { number: u64, text: &'a str },
    DetailsOpen,
    Blank,
    TableRow,
    Paragraph,
}

fn is_fence(text: &str) -> bool {
    text.trim_start().starts_with("```")
}

fn classify(text: &str) -> LineKind<'_> {
    let trimmed = text.trim();

    if is_fence(text) {
        let lang = trimmed.trim_start_matches('`').trim();
        return LineKind::Fence {
            lang: (!lang.is_empty()).then_some(lang),
        };
    }

    if let Some(caps) = HEADING.captures(text) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
        let text = caps.get(2).map_or("", |m| m.as_str()).trim();
        return LineKind::Heading { level, text };
    }

    if let Some(rest) = text.strip_prefix("> ") {
        return LineKind::Blockquote(rest);
    }

    if matches!(trimmed, "---" | "***" | "___") {
        return LineKind::Rule;
    }

    if let Some(caps) = TASK_ITEM.captures(text) {
        let checked = caps.get(1).is_some_and(|m| m.as_str() != " ");
        let text = caps.get(2).map_or("", |m| m.as_str());
        return LineKind::Task { checked, text };
    }

    if let Some(rest) = text.strip_prefix("- ") {
        return LineKind::Unordered(rest);
    }

    if let Some(caps) = ORDERED_ITEM.captures(text) {
        let number = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1);
        let text = caps.get(2).map_or("", |m| m.as_str());
        return LineKind::Ordered { number, text };
    }

    if trimmed == "<details>" {
        return LineKind::DetailsOpen;
    }

    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if trimmed.contains('|') {
        return LineKind::TableRow;
    }

    LineKind::Paragraph
}
