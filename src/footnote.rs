//! Footnote pre-pass.
//!
//! Pulls every `[^id]: text` definition line out of the input before block
//! segmentation, so references resolve no matter where the definition sits.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Diagnostic;
use crate::types::{FootnoteTable, Span};

static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^([^\[\]]+)\]:(.*)$").expect("valid regex"));

/// A body line with its 1-based position in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl Line<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Output of the pre-pass: the definition table and the lines left to segment.
#[derive(Debug)]
pub struct PrePass<'a> {
    pub footnotes: FootnoteTable,
    pub lines: Vec<Line<'a>>,
}

/// Split `input` into lines, extract footnote definitions, and trim leading
/// and trailing blank lines from what remains.
pub fn extract_footnotes<'a>(input: &'a str, diagnostics: &mut Vec<Diagnostic>) -> PrePass<'a> {
    let mut footnotes = FootnoteTable::new();
    let mut lines = Vec::new();

    if input.is_empty() {
        return PrePass { footnotes, lines };
    }

    for (idx, text) in input.split('\n').enumerate() {
        let number = idx + 1;
        match parse_definition(text) {
            Some((id, definition)) => {
                if footnotes.insert(id, definition) {
                    diagnostics.push(Diagnostic::warning(
                        "W006",
                        format!("Footnote '{id}' defined more than once; the last definition wins"),
                        Span::line(number),
                    ));
                }
            }
            None => lines.push(Line { number, text }),
        }
    }

    let start = lines.iter().position(|l| !l.is_blank()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_blank()).map_or(start, |i| i + 1);
    lines.truncate(end);
    lines.drain(..start);

    log::trace!("footnote pre-pass: {} definitions, {} body lines", footnotes.len(), lines.len());

    PrePass { footnotes, lines }
}

/// Match a definition line, returning `(id, trimmed definition text)`.
pub fn parse_definition(line: &str) -> Option<(&str, &str)> {
    let caps = DEFINITION.captures(line)?;
    let id = caps.get(1)?.as_str();
    let text = caps.get(2)?.as_str().trim();
    Some((id, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts<'a>(pass: &PrePass<'a>) -> Vec<&'a str> {
        pass.lines.iter().map(|l| l.text).collect()
    }

    #[test]
    fn definition_lines_are_removed() {
        let mut diags = Vec::new();
        let pass = extract_footnotes("See[^1]\n\n[^1]: Explanation", &mut diags);
        assert_eq!(texts(&pass), vec!["See[^1]"]);
        assert_eq!(pass.footnotes.get("1"), Some("Explanation"));
        assert!(diags.is_empty());
    }

    #[test]
    fn line_numbers_survive_removal() {
        let mut diags = Vec::new();
        let pass = extract_footnotes("[^a]: x\nfirst\n[^b]: y\nsecond", &mut diags);
        let numbers: Vec<usize> = pass.lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn duplicate_definition_warns_and_replaces() {
        let mut diags = Vec::new();
        let pass = extract_footnotes("[^n]: old\n[^n]: new\nbody", &mut diags);
        assert_eq!(pass.footnotes.get("n"), Some("new"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("W006"));
        assert_eq!(diags[0].span, Some(Span::line(2)));
    }

    #[test]
    fn definition_must_start_the_line() {
        assert_eq!(parse_definition(" [^1]: indented"), None);
        assert_eq!(parse_definition("text [^1]: inline"), None);
        assert_eq!(parse_definition("[^long id]:   spaced  "), Some(("long id", "spaced")));
        assert_eq!(parse_definition("[^]: empty id"), None);
    }

    #[test]
    fn empty_input_has_no_lines() {
        let mut diags = Vec::new();
        let pass = extract_footnotes("", &mut diags);
        assert!(pass.lines.is_empty());
        assert!(pass.footnotes.is_empty());
    }

    #[test]
    fn surrounding_blank_lines_are_trimmed() {
        let mut diags = Vec::new();
        let pass = extract_footnotes("\n\nbody\n\nmore\n\n", &mut diags);
        assert_eq!(texts(&pass), vec!["body", "", "more"]);
    }
}
