//! Post metadata header extraction.
//!
//! Two header forms are accepted at the top of a post file:
//!
//! ```text
//! ---
//! title: Spirited Away
//! tags: [film, ghibli]
//! ---
//! ```
//!
//! ```text
//! export const metadata = {
//!   title: "Spirited Away",
//!   tags: ["film", "ghibli"],
//! }
//! ```
//!
//! The object-literal form is read as a YAML flow mapping. It is data, never
//! evaluated, so anything beyond plain strings, numbers and lists is a parse
//! error rather than code.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ContentOptions;
use crate::error::MetadataError;

static OBJECT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+const\s+metadata\s*=\s*\{([\s\S]*?)\}\s*;?").expect("valid regex")
});

/// Header fields as written by the author.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    title: Option<String>,
    date: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    /// Older posts use a single `category`, either a string or a list.
    category: Option<OneOrMany>,
    image: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Resolved post metadata with defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub title: String,
    /// ISO `YYYY-MM-DD` date as written; `None` when the header has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Header fields without a typed slot.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PostMeta {
    /// Metadata for a post whose header is missing or unreadable.
    pub fn fallback(options: &ContentOptions) -> Self {
        Self {
            title: options.default_title.clone(),
            date: None,
            description: String::new(),
            tags: Vec::new(),
            categories: vec![options.default_category.clone()],
            image: None,
            extra: BTreeMap::new(),
        }
    }

    fn from_raw(raw: RawMetadata, options: &ContentOptions) -> Self {
        let categories = match (raw.categories, raw.category) {
            (Some(categories), _) => categories,
            (None, Some(OneOrMany::One(category))) => vec![category],
            (None, Some(OneOrMany::Many(categories))) => categories,
            (None, None) => Vec::new(),
        };
        Self {
            title: raw
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| options.default_title.clone()),
            date: raw.date.filter(|d| !d.is_empty()),
            description: raw.description.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            categories,
            image: raw.image.filter(|i| !i.is_empty()),
            extra: raw.extra,
        }
    }
}

/// A post source split into metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub meta: PostMeta,
    /// Post body with the header removed, trimmed.
    pub body: String,
}

/// Located header text, before deserialization.
enum Header {
    FrontMatter(String),
    Object(String),
}

/// Split the header off `source`. Returns the header (if any) and the body.
fn split_header(source: &str) -> Result<(Option<Header>, String), MetadataError> {
    let normalised = source.replace("\r\n", "\n");
    let mut lines = normalised.split('\n');

    if lines.next().is_some_and(|first| first.trim() == "---") {
        let rest: Vec<&str> = lines.collect();
        let close = rest
            .iter()
            .position(|l| l.trim() == "---")
            .ok_or(MetadataError::UnclosedFrontMatter)?;
        let yaml = rest[..close].join("\n");
        let body = rest[close + 1..].join("\n").trim().to_string();
        return Ok((Some(Header::FrontMatter(yaml)), body));
    }

    if let Some(caps) = OBJECT_HEADER.captures(&normalised) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            let literal = format!("{{{}}}", inner.as_str());
            let body = format!(
                "{}{}",
                &normalised[..whole.start()],
                &normalised[whole.end()..]
            );
            return Ok((Some(Header::Object(literal)), body.trim().to_string()));
        }
    }

    Ok((None, normalised.trim().to_string()))
}

fn deserialize(header: &Header) -> Result<RawMetadata, MetadataError> {
    let text = match header {
        Header::FrontMatter(text) | Header::Object(text) => text,
    };
    if text.trim().is_empty() {
        return Ok(RawMetadata::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Parse a post's header strictly.
///
/// A missing header yields fallback metadata; a malformed one is an error.
pub fn parse_metadata(source: &str, options: &ContentOptions) -> Result<Extracted, MetadataError> {
    let (header, body) = split_header(source)?;
    let meta = match header {
        Some(header) => PostMeta::from_raw(deserialize(&header)?, options),
        None => PostMeta::fallback(options),
    };
    Ok(Extracted { meta, body })
}

/// Parse a post's header, falling back to defaults on any problem.
pub fn extract_metadata(source: &str, options: &ContentOptions) -> Extracted {
    let (header, body) = match split_header(source) {
        Ok(split) => split,
        Err(e) => {
            log::warn!("{e}; using default metadata");
            return Extracted {
                meta: PostMeta::fallback(options),
                body: source.trim().to_string(),
            };
        }
    };

    let meta = match header {
        Some(header) => match deserialize(&header) {
            Ok(raw) => PostMeta::from_raw(raw, options),
            Err(e) => {
                log::warn!("{e}; using default metadata");
                PostMeta::fallback(options)
            }
        },
        None => PostMeta::fallback(options),
    };

    Extracted { meta, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opts() -> ContentOptions {
        ContentOptions::default()
    }

    #[test]
    fn object_literal_header() {
        let source = "export const metadata = {\n  title: \"Totoro\",\n  date: \"2024-03-01\",\n  description: 'Forest spirits',\n  tags: [\"film\", \"ghibli\"],\n  categories: [\"Movies\"],\n  image: \"/totoro.png\"\n}\n\n# Body\n";
        let extracted = parse_metadata(source, &opts()).unwrap();
        assert_eq!(extracted.meta.title, "Totoro");
        assert_eq!(extracted.meta.date.as_deref(), Some("2024-03-01"));
        assert_eq!(extracted.meta.description, "Forest spirits");
        assert_eq!(extracted.meta.tags, vec!["film", "ghibli"]);
        assert_eq!(extracted.meta.categories, vec!["Movies"]);
        assert_eq!(extracted.meta.image.as_deref(), Some("/totoro.png"));
        assert_eq!(extracted.body, "# Body");
    }

    #[test]
    fn front_matter_header() {
        let source = "---\ntitle: Ponyo\ndate: 2023-07-19\ntags: [sea]\nmood: calm\n---\nBody text\n";
        let extracted = parse_metadata(source, &opts()).unwrap();
        assert_eq!(extracted.meta.title, "Ponyo");
        assert_eq!(extracted.meta.date.as_deref(), Some("2023-07-19"));
        assert_eq!(extracted.meta.tags, vec!["sea"]);
        assert!(extracted.meta.categories.is_empty());
        assert!(extracted.meta.extra.contains_key("mood"));
        assert_eq!(extracted.body, "Body text");
    }

    #[test]
    fn single_category_becomes_list() {
        let source = "export const metadata = { title: \"x\", category: \"Life\" }\nbody";
        let extracted = parse_metadata(source, &opts()).unwrap();
        assert_eq!(extracted.meta.categories, vec!["Life"]);

        let source = "export const metadata = { category: [\"A\", \"B\"] }\nbody";
        let extracted = parse_metadata(source, &opts()).unwrap();
        assert_eq!(extracted.meta.categories, vec!["A", "B"]);
        assert_eq!(extracted.meta.title, "Untitled");
    }

    #[test]
    fn categories_win_over_category() {
        let source = "export const metadata = { categories: [\"A\"], category: \"B\" }";
        let extracted = parse_metadata(source, &opts()).unwrap();
        assert_eq!(extracted.meta.categories, vec!["A"]);
    }

    #[test]
    fn code_in_header_is_rejected_not_run() {
        let source = "export const metadata = { title: (() => \"x\")() }\nbody";
        assert!(parse_metadata(source, &opts()).is_err());

        let extracted = extract_metadata(source, &opts());
        assert_eq!(extracted.meta, PostMeta::fallback(&opts()));
        assert_eq!(extracted.body, "body");
    }

    #[test]
    fn missing_header_uses_fallback() {
        let extracted = extract_metadata("\n# Just a body\n", &opts());
        assert_eq!(extracted.meta.title, "Untitled");
        assert_eq!(extracted.meta.categories, vec!["Uncategorized"]);
        assert_eq!(extracted.body, "# Just a body");
    }

    #[test]
    fn unclosed_front_matter() {
        let source = "---\ntitle: never closed\nbody";
        assert!(matches!(
            parse_metadata(source, &opts()),
            Err(MetadataError::UnclosedFrontMatter)
        ));
        let extracted = extract_metadata(source, &opts());
        assert_eq!(extracted.meta.title, "Untitled");
        assert_eq!(extracted.body, source);
    }

    #[test]
    fn empty_object_header() {
        let extracted = parse_metadata("export const metadata = {}\nhello", &opts()).unwrap();
        assert_eq!(extracted.meta.title, "Untitled");
        assert!(extracted.meta.categories.is_empty());
        assert_eq!(extracted.body, "hello");
    }
}
