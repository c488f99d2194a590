//! Inline formatter.
//!
//! Each inline pattern runs independently over the whole text. The matches
//! are then merged by greedy interval scheduling: sorted by start offset
//! (ties keep pattern declaration order), a match is accepted only if it does
//! not overlap one already accepted. Uncovered spans become `Inline::Text`.
//!
//! Accepted spans are not re-scanned, so `**a *b* c**` yields a single bold
//! node whose text still contains the inner asterisks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::{FootnoteTable, Inline};

/// Inline patterns in tie-breaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Code,
    Bold,
    Italic,
    Strikethrough,
    Link,
    FootnoteRef,
}

const PATTERNS: [Pattern; 6] = [
    Pattern::Code,
    Pattern::Bold,
    Pattern::Italic,
    Pattern::Strikethrough,
    Pattern::Link,
    Pattern::FootnoteRef,
];

static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*)\*").expect("valid regex"));
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid regex"));
static FOOTNOTE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^([^\[\]]+)\]").expect("valid regex"));

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Pattern::Code => &CODE,
            Pattern::Bold => &BOLD,
            Pattern::Italic => &ITALIC,
            Pattern::Strikethrough => &STRIKE,
            Pattern::Link => &LINK,
            Pattern::FootnoteRef => &FOOTNOTE_REF,
        }
    }

    fn build(self, caps: &Captures<'_>, footnotes: &FootnoteTable) -> Inline {
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        match self {
            Pattern::Code => Inline::Code(group(1).to_string()),
            Pattern::Bold => Inline::Bold(vec![Inline::Text(group(1).to_string())]),
            Pattern::Italic => Inline::Italic(vec![Inline::Text(group(1).to_string())]),
            Pattern::Strikethrough => {
                Inline::Strikethrough(vec![Inline::Text(group(1).to_string())])
            }
            Pattern::Link => Inline::Link {
                href: group(2).to_string(),
                content: vec![Inline::Text(group(1).to_string())],
            },
            Pattern::FootnoteRef => {
                let id = group(1);
                match footnotes.number(id) {
                    Some(number) => Inline::FootnoteRef {
                        id: id.to_string(),
                        number,
                    },
                    None => Inline::Text(group(0).to_string()),
                }
            }
        }
    }
}

/// A pattern match covering `start..end` of the input.
#[derive(Debug)]
struct Candidate {
    start: usize,
    end: usize,
    node: Inline,
}

/// Format one line of text into inline nodes.
///
/// The result covers the whole input with no gaps or overlaps. Footnote
/// references resolve against `footnotes`; unknown ids stay literal.
pub fn format_inline(text: &str, footnotes: &FootnoteTable) -> Vec<Inline> {
    let mut candidates = Vec::new();
    for pattern in PATTERNS {
        for caps in pattern.regex().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            candidates.push(Candidate {
                start: whole.start(),
                end: whole.end(),
                node: pattern.build(&caps, footnotes),
            });
        }
    }

    let accepted = schedule(candidates);

    let mut nodes = Vec::new();
    let mut pos = 0;
    for candidate in accepted {
        if candidate.start > pos {
            push_text(&mut nodes, &text[pos..candidate.start]);
        }
        match candidate.node {
            Inline::Text(s) => push_text(&mut nodes, &s),
            node => nodes.push(node),
        }
        pos = candidate.end;
    }
    if pos < text.len() {
        push_text(&mut nodes, &text[pos..]);
    }
    nodes
}

/// Greedy interval scheduling over matches sorted by start offset.
///
/// The sort is stable, so candidates starting at the same offset keep the
/// order they were collected in, which is pattern declaration order.
fn schedule(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by_key(|c| c.start);
    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut frontier = 0;
    for candidate in candidates {
        // Accepted spans are disjoint and ordered, so only the last one can
        // intersect a candidate that starts at or after its start.
        if !accepted.is_empty() && candidate.start < frontier {
            continue;
        }
        frontier = candidate.end;
        accepted.push(candidate);
    }
    accepted
}

/// Append text, merging with a preceding text node.
fn push_text(nodes: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Inline::Text(text.to_string()));
    }
}
