//! HTML fragment renderer.
//!
//! Produces plain semantic HTML with a few `post-*` hook classes; visual
//! styling belongs to the site's stylesheet. All text and attribute values
//! are HTML-escaped.

use std::collections::HashSet;

use crate::types::{Alignment, Block, Document, Footnote, Image, Inline, Video};

/// Render a `Document` as an HTML fragment.
///
/// No `<html>`, `<head>`, or `<body>` wrapper is added.
pub fn to_html(doc: &Document) -> String {
    HtmlWriter::default().blocks(&doc.blocks)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape and keep only characters that cannot break out of a `style` value.
fn sanitize_css_value(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '%' | '.' | '-' | ' ' | '#'))
        .collect()
}

/// Render state for one document.
#[derive(Debug, Default)]
struct HtmlWriter {
    /// Footnote ids whose `fnref-` anchor has been emitted.
    anchored: HashSet<String>,
}

impl HtmlWriter {
    fn blocks(&mut self, blocks: &[Block]) -> String {
        let parts: Vec<String> = blocks.iter().map(|b| self.block(b)).collect();
        parts.join("\n")
    }

    fn block(&mut self, block: &Block) -> String {
        match block {
            Block::Heading { level, content } => {
                format!("<h{level}>{}</h{level}>", self.inlines(content))
            }

            Block::Paragraph { content } => format!("<p>{}</p>", self.inlines(content)),

            Block::Blockquote { content } => {
                format!("<blockquote>{}</blockquote>", self.inlines(content))
            }

            Block::UnorderedList { items } => {
                let lis: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", self.inlines(&item.content)))
                    .collect();
                format!("<ul>{lis}</ul>")
            }

            Block::OrderedList { start, items } => {
                let lis: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", self.inlines(&item.content)))
                    .collect();
                if *start == 1 {
                    format!("<ol>{lis}</ol>")
                } else {
                    format!("<ol start=\"{start}\">{lis}</ol>")
                }
            }

            Block::TaskList { items } => {
                let lis: String = items
                    .iter()
                    .map(|item| {
                        let checked = if item.checked { " checked" } else { "" };
                        format!(
                            "<li><input type=\"checkbox\" disabled{checked}> {}</li>",
                            self.inlines(&item.content)
                        )
                    })
                    .collect();
                format!("<ul class=\"post-tasks\">{lis}</ul>")
            }

            Block::CodeBlock { lang, lines } => {
                let lang_attr = match lang {
                    Some(l) => format!(" class=\"language-{}\"", escape_html(l)),
                    None => String::new(),
                };
                format!(
                    "<pre><code{lang_attr}>{}</code></pre>",
                    escape_html(&lines.join("\n"))
                )
            }

            Block::Table {
                headers,
                alignments,
                rows,
            } => render_table(headers, alignments, rows),

            Block::HorizontalRule => "<hr>".to_string(),

            Block::Collapsible { summary, blocks } => {
                let summary_html = match summary {
                    Some(s) => format!("<summary>{}</summary>", escape_html(s)),
                    None => String::new(),
                };
                format!("<details>{summary_html}\n{}\n</details>", self.blocks(blocks))
            }

            Block::Image(image) => render_image(image),

            Block::Video(video) => render_video(video),

            Block::Break => "<br>".to_string(),

            Block::Footnotes { notes } => self.footnotes(notes),
        }
    }

    fn footnotes(&mut self, notes: &[Footnote]) -> String {
        let items: String = notes
            .iter()
            .map(|note| {
                let id = escape_html(&note.id);
                let back = if self.anchored.contains(&note.id) {
                    format!(" <a href=\"#fnref-{id}\" aria-label=\"Back to reference\">\u{21a9}</a>")
                } else {
                    String::new()
                };
                format!("<li id=\"fn-{id}\">{}{back}</li>", self.inlines(&note.content))
            })
            .collect();
        format!("<section class=\"footnotes\"><ol>{items}</ol></section>")
    }

    fn inlines(&mut self, nodes: &[Inline]) -> String {
        nodes.iter().map(|n| self.inline(n)).collect()
    }

    fn inline(&mut self, node: &Inline) -> String {
        match node {
            Inline::Text(s) => escape_html(s),
            Inline::Bold(children) => format!("<strong>{}</strong>", self.inlines(children)),
            Inline::Italic(children) => format!("<em>{}</em>", self.inlines(children)),
            Inline::Strikethrough(children) => format!("<del>{}</del>", self.inlines(children)),
            Inline::Code(code) => format!("<code>{}</code>", escape_html(code)),
            Inline::Link { href, content } => format!(
                "<a href=\"{}\">{}</a>",
                escape_html(href),
                self.inlines(content)
            ),
            Inline::FootnoteRef { id, number } => {
                let escaped = escape_html(id);
                // Only the first reference carries the back-link target.
                if self.anchored.insert(id.clone()) {
                    format!("<sup id=\"fnref-{escaped}\"><a href=\"#fn-{escaped}\">{number}</a></sup>")
                } else {
                    format!("<sup><a href=\"#fn-{escaped}\">{number}</a></sup>")
                }
            }
        }
    }
}

fn render_table(headers: &[String], alignments: &[Alignment], rows: &[Vec<String>]) -> String {
    let align = |i: usize| match alignments.get(i) {
        Some(Alignment::Left) => " style=\"text-align: left\"",
        Some(Alignment::Center) => " style=\"text-align: center\"",
        Some(Alignment::Right) => " style=\"text-align: right\"",
        Some(Alignment::None) | None => "",
    };
    let mut html = String::from("<table><thead><tr>");
    for (i, h) in headers.iter().enumerate() {
        html.push_str(&format!("<th scope=\"col\"{}>{}</th>", align(i), escape_html(h)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for (i, cell) in row.iter().enumerate() {
            html.push_str(&format!("<td{}>{}</td>", align(i), escape_html(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn render_image(image: &Image) -> String {
    let style = match &image.style {
        Some(style) => {
            let mut css = format!(
                "width: {}; height: {}",
                sanitize_css_value(&style.width),
                sanitize_css_value(&style.height)
            );
            if style.object_fit.is_some() {
                css.push_str("; object-fit: cover");
            }
            format!(" style=\"{css}\"")
        }
        None => String::new(),
    };
    format!(
        "<figure class=\"post-image\"><img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\" loading=\"lazy\"{style}></figure>",
        escape_html(&image.src),
        escape_html(&image.alt),
        image.width,
        image.height,
    )
}

fn render_video(video: &Video) -> String {
    let controls = if video.controls { " controls" } else { "" };
    format!(
        "<video src=\"{}\"{controls} style=\"width: {}; height: auto\"></video>",
        escape_html(&video.src),
        sanitize_css_value(&video.width),
    )
}


#[cfg(test)]
mod tests {
    use crate::parse::render;
    use pretty_assertions::assert_eq;

    #[test]
    fn heading_and_paragraph() {
        let html = render("# Title\nSome **bold** text").to_html();
        assert_eq!(html, "<h1>Title</h1>\n<p>Some <strong>bold</strong> text</p>");
    }

    #[test]
    fn text_is_escaped() {
        let html = render("a <b> & \"c\"").to_html();
        assert_eq!(html, "<p>a &lt;b&gt; &amp; &quot;c&quot;</p>");
    }

    #[test]
    fn ordered_list_keeps_start() {
        assert_eq!(render("1. a").to_html(), "<ol><li>a</li></ol>");
        assert_eq!(
            render("5. a\n6. b").to_html(),
            "<ol start=\"5\"><li>a</li><li>b</li></ol>"
        );
    }

    #[test]
    fn task_list_checkboxes() {
        let html = render("- [x] done\n- [ ] todo").to_html();
        assert!(html.contains("<input type=\"checkbox\" disabled checked> done"));
        assert!(html.contains("<input type=\"checkbox\" disabled> todo"));
    }

    #[test]
    fn table_with_alignment() {
        let html = render("|A|B|\n|:-:|--|\n|1|2|").to_html();
        assert_eq!(
            html,
            "<table><thead><tr><th scope=\"col\" style=\"text-align: center\">A</th><th scope=\"col\">B</th></tr></thead>\
             <tbody><tr><td style=\"text-align: center\">1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn code_block_is_escaped() {
        let html = render("```html\n<div>\n```").to_html();
        assert_eq!(
            html,
            "<pre><code class=\"language-html\">&lt;div&gt;</code></pre>"
        );
    }

    #[test]
    fn image_with_style_override() {
        let html = render(r#"![cat](/cat.png "300x200")"#).to_html();
        assert!(html.contains("width=\"300\" height=\"200\""));
        assert!(html.contains("style=\"width: 300px; height: 200px; object-fit: cover\""));
    }

    #[test]
    fn video_tag_output() {
        let html = render(r#"<video src="/v.mp4" controls>"#).to_html();
        assert_eq!(
            html,
            "<video src=\"/v.mp4\" controls style=\"width: 100%; height: auto\"></video>"
        );
    }

    #[test]
    fn footnote_reference_and_listing() {
        let html = render("See[^1]\n[^1]: Why").to_html();
        assert!(html.contains("<sup id=\"fnref-1\"><a href=\"#fn-1\">1</a></sup>"));
        assert!(html.contains("<section class=\"footnotes\"><ol><li id=\"fn-1\">Why "));
    }

    #[test]
    fn repeated_reference_anchors_once() {
        let html = render("a[^n] b[^n]\n[^n]: Note").to_html();
        assert_eq!(html.matches("id=\"fnref-n\"").count(), 1);
        assert!(html.contains("<sup id=\"fnref-n\"><a href=\"#fn-n\">1</a></sup> b<sup><a href=\"#fn-n\">1</a></sup>"));
        assert!(html.contains("<a href=\"#fnref-n\" aria-label=\"Back to reference\">"));
    }

    #[test]
    fn unreferenced_note_has_no_back_link() {
        let html = render("plain\n[^n]: Note").to_html();
        assert!(html.contains("<li id=\"fn-n\">Note</li>"));
        assert!(!html.contains("fnref-n"));
    }

    #[test]
    fn collapsible_section() {
        let html = render("<details>\n<summary>More</summary>\nbody\n</details>").to_html();
        assert_eq!(html, "<details><summary>More</summary>\n<p>body</p>\n</details>");
    }

    #[test]
    fn style_values_cannot_escape_attribute() {
        let html = render(r#"![x](/x.png "width:50%;}</style>")"#).to_html();
        assert!(!html.contains("</style>"));
    }
}
