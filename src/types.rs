use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A rendered post body: the ordered blocks produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over top-level blocks.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}

/// A structural unit of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph {
        content: Vec<Inline>,
    },
    Blockquote {
        content: Vec<Inline>,
    },
    UnorderedList {
        items: Vec<ListItem>,
    },
    /// `start` is the number written on the first item.
    OrderedList {
        start: u64,
        items: Vec<ListItem>,
    },
    TaskList {
        items: Vec<TaskItem>,
    },
    /// Fenced code, lines kept verbatim.
    CodeBlock {
        lang: Option<String>,
        lines: Vec<String>,
    },
    Table {
        headers: Vec<String>,
        /// One entry per separator column; empty when the table had no separator row.
        alignments: Vec<Alignment>,
        rows: Vec<Vec<String>>,
    },
    HorizontalRule,
    /// `<details>` section with its own nested blocks.
    Collapsible {
        summary: Option<String>,
        blocks: Vec<Block>,
    },
    Image(Image),
    Video(Video),
    /// A blank source line.
    Break,
    /// Trailing listing of every footnote definition.
    Footnotes {
        notes: Vec<Footnote>,
    },
}

impl Block {
    /// Short, stable name of the block kind (matches the serde tag).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "Heading",
            Block::Paragraph { .. } => "Paragraph",
            Block::Blockquote { .. } => "Blockquote",
            Block::UnorderedList { .. } => "UnorderedList",
            Block::OrderedList { .. } => "OrderedList",
            Block::TaskList { .. } => "TaskList",
            Block::CodeBlock { .. } => "CodeBlock",
            Block::Table { .. } => "Table",
            Block::HorizontalRule => "HorizontalRule",
            Block::Collapsible { .. } => "Collapsible",
            Block::Image(_) => "Image",
            Block::Video(_) => "Video",
            Block::Break => "Break",
            Block::Footnotes { .. } => "Footnotes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub checked: bool,
    pub content: Vec<Inline>,
}

/// Column alignment taken from a table separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    /// Intrinsic pixel width handed to the presentation layer.
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
}

/// CSS overrides derived from an image size directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStyle {
    pub width: String,
    pub height: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    Cover,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub src: String,
    pub controls: bool,
    /// CSS width, `100%` unless the tag says otherwise.
    pub width: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub id: String,
    /// 1-based position in the footnote listing.
    pub number: usize,
    pub text: String,
    pub content: Vec<Inline>,
}

/// A run of inline content inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link { href: String, content: Vec<Inline> },
    FootnoteRef { id: String, number: usize },
}

/// Concatenate the visible text of a run of inline nodes.
///
/// Markup delimiters are gone; code literals and link labels are included,
/// footnote references contribute nothing.
pub fn plain_text(nodes: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(s) | Inline::Code(s) => out.push_str(s),
            Inline::Bold(children)
            | Inline::Italic(children)
            | Inline::Strikethrough(children)
            | Inline::Link {
                content: children, ..
            } => collect_text(children, out),
            Inline::FootnoteRef { .. } => {}
        }
    }
}

/// Footnote definitions collected before block segmentation.
///
/// Keeps first-definition order; a later definition with the same id replaces
/// the text but not the position.
#[derive(Debug, Clone, Default)]
pub struct FootnoteTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl FootnoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition. Returns `true` if the id was already defined.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) -> bool {
        let id = id.into();
        let text = text.into();
        match self.index.get(&id) {
            Some(&pos) => {
                self.entries[pos].1 = text;
                true
            }
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, text));
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&pos| self.entries[pos].1.as_str())
    }

    /// 1-based number of a footnote, if defined.
    pub fn number(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|&pos| pos + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in listing order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, text)| (id.as_str(), text.as_str()))
    }
}

/// 1-based source line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn line(line: usize) -> Self {
        Self {
            start_line: line,
            end_line: line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn footnote_table_last_definition_wins_keeps_position() {
        let mut table = FootnoteTable::new();
        assert!(!table.insert("a", "first"));
        assert!(!table.insert("b", "second"));
        assert!(table.insert("a", "replaced"));

        assert_eq!(table.get("a"), Some("replaced"));
        assert_eq!(table.number("a"), Some(1));
        assert_eq!(table.number("b"), Some(2));
        let ids: Vec<&str> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn plain_text_strips_markup_nodes() {
        let nodes = vec![
            Inline::Text("a ".into()),
            Inline::Bold(vec![Inline::Text("b".into())]),
            Inline::Code("c".into()),
            Inline::FootnoteRef {
                id: "1".into(),
                number: 1,
            },
            Inline::Link {
                href: "/x".into(),
                content: vec![Inline::Text("d".into())],
            },
        ];
        assert_eq!(plain_text(&nodes), "a bcd");
    }

    #[test]
    fn block_serializes_with_kind_tag() {
        let block = Block::Paragraph {
            content: vec![Inline::Text("hi".into())],
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["kind"], "Paragraph");
        assert_eq!(block.kind_name(), "Paragraph");
    }
}
