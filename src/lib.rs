//! `blog-markdown` — renderer and content layer for a static personal blog.
//!
//! Post bodies are written in a small markdown dialect (headings, lists, task
//! lists, fenced code, pipe tables, footnotes, `<details>` sections, sized
//! images and `<video>` tags). This crate turns that source into a structured
//! [`Document`] tree and renders it as HTML, markdown or terminal text.
//!
//! # Quick start
//!
//! ```
//! let result = blog_markdown::parse("# Hello\nSee the note[^1].\n[^1]: A note.\n");
//! assert!(result.diagnostics.is_empty());
//! // Heading, paragraph, footnote listing.
//! assert_eq!(result.doc.blocks.len(), 3);
//! assert!(result.doc.to_html().contains("<h1>Hello</h1>"));
//! ```
//!
//! Posts on disk are read through [`ContentStore`], which strips each file's
//! metadata header and estimates its reading time.

pub mod blocks;
pub mod config;
pub mod error;
pub mod footnote;
pub mod inline;
pub mod metadata;
pub mod parse;
pub mod posts;
pub mod read_time;
pub mod render_html;
pub mod render_md;
#[cfg(feature = "terminal")]
pub mod render_term;
pub mod store;
pub mod types;

pub use config::{Config, ContentOptions, RenderOptions};
pub use error::*;
pub use metadata::{PostMeta, extract_metadata, parse_metadata};
pub use parse::{ParseResult, parse, parse_with_options, render};
pub use posts::{Post, PostFilter, PostSummary, all_categories, all_tags, posts_with_tag};
pub use store::ContentStore;
pub use types::*;

impl Document {
    /// Render this document as an HTML fragment.
    pub fn to_html(&self) -> String {
        render_html::to_html(self)
    }

    /// Serialize this document back to markdown source.
    ///
    /// The output can be parsed again with [`parse`] to produce an equal
    /// document when the original parsed without diagnostics.
    pub fn to_markdown(&self) -> String {
        render_md::to_markdown(self)
    }

    /// Render this document as ANSI-colored terminal text.
    #[cfg(feature = "terminal")]
    pub fn to_terminal(&self) -> String {
        render_term::to_terminal(self)
    }

    /// Serialize this document tree as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
