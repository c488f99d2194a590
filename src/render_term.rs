//! ANSI terminal renderer.
//!
//! Produces a colored preview of a post using the `colored` crate, for
//! proof-reading drafts from a shell.

use colored::Colorize;

use crate::types::{Block, Document, Inline};

/// Render a `Document` as ANSI-colored terminal text.
pub fn to_terminal(doc: &Document) -> String {
    render_blocks(&doc.blocks)
}

fn render_blocks(blocks: &[Block]) -> String {
    blocks.iter().map(render_block).collect::<Vec<_>>().join("\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            let text = format!("{} {}", "#".repeat(usize::from(*level)), render_inlines(content));
            if *level <= 2 {
                format!("{}", text.bold().green())
            } else {
                format!("{}", text.bold())
            }
        }

        Block::Paragraph { content } => render_inlines(content),

        Block::Blockquote { content } => {
            format!("{} {}", "\u{2502}".green(), render_inlines(content).italic()) // │
        }

        Block::UnorderedList { items } => items
            .iter()
            .map(|item| format!("  \u{2022} {}", render_inlines(&item.content))) // •
            .collect::<Vec<_>>()
            .join("\n"),

        Block::OrderedList { start, items } => items
            .iter()
            .zip(*start..)
            .map(|(item, n)| format!("  {n}. {}", render_inlines(&item.content)))
            .collect::<Vec<_>>()
            .join("\n"),

        Block::TaskList { items } => items
            .iter()
            .map(|item| {
                if item.checked {
                    let check = format!("{}", "\u{2713}".green()); // ✓
                    format!("  {check} {}", render_inlines(&item.content).dimmed())
                } else {
                    format!("  \u{2610} {}", render_inlines(&item.content)) // ☐
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),

        Block::CodeBlock { lang, lines } => {
            let lang_label = match lang {
                Some(l) => format!(" {}", l.dimmed()),
                None => String::new(),
            };
            let border = format!("{}", "\u{2500}\u{2500}\u{2500}".dimmed()); // ───
            let mut out = vec![format!("{border}{lang_label}")];
            for line in lines {
                out.push(format!("  {line}"));
            }
            out.push(border);
            out.join("\n")
        }

        Block::Table { headers, rows, .. } => {
            if headers.is_empty() {
                return String::new();
            }

            let columns = rows.iter().map(Vec::len).fold(headers.len(), usize::max);
            let mut widths = vec![0; columns];
            for row in std::iter::once(headers).chain(rows) {
                for (i, cell) in row.iter().enumerate() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }

            let format_row = |row: &[String]| {
                let cells: Vec<String> = widths
                    .iter()
                    .enumerate()
                    .map(|(i, &w)| {
                        let cell = row.get(i).map_or("", String::as_str);
                        format!(" {cell:w$} ")
                    })
                    .collect();
                format!("\u{2502}{}\u{2502}", cells.join("\u{2502}"))
            };

            let separator: String = widths
                .iter()
                .map(|&w| "\u{2500}".repeat(w + 2)) // ─
                .collect::<Vec<_>>()
                .join("\u{253C}"); // ┼

            let mut lines = vec![
                format!("{}", format_row(headers.as_slice()).bold()),
                format!("\u{2502}{separator}\u{2502}"),
            ];
            lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
            lines.join("\n")
        }

        Block::HorizontalRule => format!("{}", "\u{2500}".repeat(40).dimmed()),

        Block::Collapsible { summary, blocks } => {
            let title = summary.as_deref().unwrap_or("Details");
            let inner: Vec<String> = render_blocks(blocks)
                .lines()
                .map(|line| format!("  {line}"))
                .collect();
            format!("{} {}\n{}", "\u{25B8}".green(), title.bold(), inner.join("\n")) // ▸
        }

        Block::Image(image) => format!(
            "{} {} {}",
            "[image]".cyan(),
            image.alt,
            format!("({})", image.src).dimmed()
        ),

        Block::Video(video) => format!("{} {}", "[video]".cyan(), video.src.dimmed()),

        Block::Break => String::new(),

        Block::Footnotes { notes } => {
            let mut lines = vec![format!("{}", "\u{2500}".repeat(20).dimmed())];
            for note in notes {
                lines.push(format!(
                    "{} {}",
                    format!("[{}]", note.number).yellow(),
                    render_inlines(&note.content)
                ));
            }
            lines.join("\n")
        }
    }
}

fn render_inlines(nodes: &[Inline]) -> String {
    nodes.iter().map(render_inline).collect()
}

fn render_inline(node: &Inline) -> String {
    match node {
        Inline::Text(s) => s.clone(),
        Inline::Bold(children) => format!("{}", render_inlines(children).bold()),
        Inline::Italic(children) => format!("{}", render_inlines(children).italic()),
        Inline::Strikethrough(children) => {
            format!("{}", render_inlines(children).strikethrough())
        }
        Inline::Code(code) => format!("{}", code.yellow()),
        Inline::Link { href, content } => format!(
            "{} {}",
            render_inlines(content).underline().blue(),
            format!("<{href}>").dimmed()
        ),
        Inline::FootnoteRef { number, .. } => format!("{}", format!("[{number}]").yellow()),
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::render;

    fn plain(input: &str) -> String {
        colored::control::set_override(false);
        render(input).to_terminal()
    }

    #[test]
    fn headings_and_lists() {
        let out = plain("## Title\n- a\n1. b\n- [x] c");
        assert!(out.contains("## Title"));
        assert!(out.contains("\u{2022} a"));
        assert!(out.contains("1. b"));
        assert!(out.contains("\u{2713} c"));
    }

    #[test]
    fn table_columns_are_padded() {
        let out = plain("|Name|Qty|\n|-|-|\n|tomato|3|");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "\u{2502} Name   \u{2502} Qty \u{2502}");
        assert_eq!(lines[2], "\u{2502} tomato \u{2502} 3   \u{2502}");
    }

    #[test]
    fn collapsible_content_is_indented() {
        let out = plain("<details>\n<summary>More</summary>\ninner\n</details>");
        assert!(out.contains("More"));
        assert!(out.contains("\n  inner"));
    }

    #[test]
    fn footnotes_are_numbered() {
        let out = plain("a[^x]\n[^x]: note");
        assert!(out.contains("a[1]"));
        assert!(out.contains("[1] note"));
    }
}
