//! Markdown re-serializer.
//!
//! Writes a `Document` back out in the dialect the parser reads. For input
//! the parser accepts without diagnostics, parsing the output again yields an
//! equal document.

use crate::types::{Alignment, Block, Document, Image, Inline, ObjectFit};

/// Render a `Document` as markdown source.
pub fn to_markdown(doc: &Document) -> String {
    render_blocks(&doc.blocks)
}

fn render_blocks(blocks: &[Block]) -> String {
    let parts: Vec<String> = blocks.iter().map(render_block).collect();
    parts.join("\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            format!("{} {}", "#".repeat(usize::from(*level)), render_inlines(content))
        }

        Block::Paragraph { content } => render_inlines(content),

        Block::Blockquote { content } => format!("> {}", render_inlines(content)),

        Block::UnorderedList { items } => items
            .iter()
            .map(|item| format!("- {}", render_inlines(&item.content)))
            .collect::<Vec<_>>()
            .join("\n"),

        Block::OrderedList { start, items } => items
            .iter()
            .zip(*start..)
            .map(|(item, n)| format!("{n}. {}", render_inlines(&item.content)))
            .collect::<Vec<_>>()
            .join("\n"),

        Block::TaskList { items } => items
            .iter()
            .map(|item| {
                let mark = if item.checked { 'x' } else { ' ' };
                format!("- [{mark}] {}", render_inlines(&item.content))
            })
            .collect::<Vec<_>>()
            .join("\n"),

        Block::CodeBlock { lang, lines } => {
            let mut out = vec![format!("```{}", lang.as_deref().unwrap_or(""))];
            out.extend(lines.iter().cloned());
            out.push("```".to_string());
            out.join("\n")
        }

        Block::Table {
            headers,
            alignments,
            rows,
        } => {
            let mut lines = vec![format!("| {} |", headers.join(" | "))];
            // A table parsed without a separator row has no alignments;
            // leave the separator out so it parses back the same way.
            if !alignments.is_empty() {
                let sep: Vec<&str> = alignments
                    .iter()
                    .map(|a| match a {
                        Alignment::None => "---",
                        Alignment::Left => ":---",
                        Alignment::Center => ":---:",
                        Alignment::Right => "---:",
                    })
                    .collect();
                lines.push(format!("| {} |", sep.join(" | ")));
            }
            for row in rows {
                lines.push(format!("| {} |", row.join(" | ")));
            }
            lines.join("\n")
        }

        Block::HorizontalRule => "---".to_string(),

        Block::Collapsible { summary, blocks } => {
            let mut out = vec!["<details>".to_string()];
            if let Some(s) = summary {
                out.push(format!("<summary>{s}</summary>"));
            }
            if !blocks.is_empty() {
                out.push(render_blocks(blocks));
            }
            out.push("</details>".to_string());
            out.join("\n")
        }

        Block::Image(image) => render_image(image),

        Block::Video(video) => {
            let controls = if video.controls { " controls" } else { "" };
            format!(
                "<video src=\"{}\"{controls} width=\"{}\"></video>",
                video.src, video.width
            )
        }

        Block::Break => String::new(),

        Block::Footnotes { notes } => notes
            .iter()
            .map(|note| format!("[^{}]: {}", note.id, note.text))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_image(image: &Image) -> String {
    let directive = match &image.style {
        Some(style) if style.object_fit == Some(ObjectFit::Cover) => {
            format!(" \"{}x{}\"", image.width, image.height)
        }
        Some(style) => format!(" \"width:{}\"", style.width),
        None => String::new(),
    };
    format!("![{}]({}{directive})", image.alt, image.src)
}

fn render_inlines(nodes: &[Inline]) -> String {
    nodes.iter().map(render_inline).collect()
}

fn render_inline(node: &Inline) -> String {
    match node {
        Inline::Text(s) => s.clone(),
        Inline::Bold(children) => format!("**{}**", render_inlines(children)),
        Inline::Italic(children) => format!("*{}*", render_inlines(children)),
        Inline::Strikethrough(children) => format!("~~{}~~", render_inlines(children)),
        Inline::Code(code) => format!("`{code}`"),
        Inline::Link { href, content } => format!("[{}]({href})", render_inlines(content)),
        Inline::FootnoteRef { id, .. } => format!("[^{id}]"),
    }
}
