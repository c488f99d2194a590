//! Post records and the listing helpers built on them.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{ContentOptions, RenderOptions};
use crate::metadata::PostMeta;
use crate::parse::{ParseResult, parse_with_options};
use crate::read_time;
use crate::types::Document;

/// Listing entry for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub read_time_minutes: u32,
}

impl PostSummary {
    pub fn new(slug: impl Into<String>, meta: PostMeta, body: &str, options: &ContentOptions) -> Self {
        Self {
            slug: slug.into(),
            title: meta.title,
            date: meta.date,
            description: meta.description,
            tags: meta.tags,
            categories: meta.categories,
            image: meta.image,
            read_time_minutes: read_time::estimate_with(body, options),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// A single post: its summary plus the body with the header removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub summary: PostSummary,
    pub body: String,
}

impl Post {
    /// Render the body with default options.
    pub fn render(&self) -> Document {
        self.parse_with(&RenderOptions::default()).doc
    }

    pub fn parse_with(&self, options: &RenderOptions) -> ParseResult {
        parse_with_options(&self.body, options)
    }
}

/// Newest first. Undated posts sort last; ties break on slug.
pub fn sort_by_date(posts: &mut [PostSummary]) {
    posts.sort_by(|a, b| {
        let by_date = match (&a.date, &b.date) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then_with(|| a.slug.cmp(&b.slug))
    });
}

/// Category and tag constraints, AND-ed. An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl PostFilter {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, post: &PostSummary) -> bool {
        self.category.as_deref().is_none_or(|c| post.in_category(c))
            && self.tag.as_deref().is_none_or(|t| post.has_tag(t))
    }

    pub fn apply<'a>(&self, posts: &'a [PostSummary]) -> Vec<&'a PostSummary> {
        posts.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Every tag used by `posts`, sorted and de-duplicated.
pub fn all_tags(posts: &[PostSummary]) -> Vec<String> {
    let set: BTreeSet<&str> = posts
        .iter()
        .flat_map(|p| p.tags.iter().map(String::as_str))
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Every category used by `posts`, sorted and de-duplicated.
pub fn all_categories(posts: &[PostSummary]) -> Vec<String> {
    let set: BTreeSet<&str> = posts
        .iter()
        .flat_map(|p| p.categories.iter().map(String::as_str))
        .collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn posts_with_tag<'a>(posts: &'a [PostSummary], tag: &str) -> Vec<&'a PostSummary> {
    PostFilter::default().tag(tag).apply(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(slug: &str, date: Option<&str>, tags: &[&str], categories: &[&str]) -> PostSummary {
        PostSummary {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            date: date.map(str::to_string),
            description: String::new(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            image: None,
            read_time_minutes: 1,
        }
    }

    fn slugs(posts: &[&PostSummary]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn sorts_newest_first_undated_last() {
        let mut posts = vec![
            summary("old", Some("2021-05-01"), &[], &[]),
            summary("undated", None, &[], &[]),
            summary("new", Some("2024-01-10"), &[], &[]),
            summary("also-new", Some("2024-01-10"), &[], &[]),
        ];
        sort_by_date(&mut posts);
        let order: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["also-new", "new", "old", "undated"]);
    }

    #[test]
    fn filter_ands_constraints() {
        let posts = vec![
            summary("a", None, &["rust"], &["Code"]),
            summary("b", None, &["rust"], &["Life"]),
            summary("c", None, &["film"], &["Code"]),
        ];
        let filter = PostFilter::default().category("Code").tag("rust");
        assert_eq!(slugs(&filter.apply(&posts)), vec!["a"]);
        assert_eq!(PostFilter::default().apply(&posts).len(), 3);
        assert_eq!(slugs(&posts_with_tag(&posts, "rust")), vec!["a", "b"]);
    }

    #[test]
    fn tag_and_category_listings() {
        let posts = vec![
            summary("a", None, &["rust", "cli"], &["Code"]),
            summary("b", None, &["rust"], &["Life", "Code"]),
        ];
        assert_eq!(all_tags(&posts), vec!["cli", "rust"]);
        assert_eq!(all_categories(&posts), vec!["Code", "Life"]);
    }

    #[test]
    fn summary_carries_read_time() {
        let options = ContentOptions::default();
        let meta = PostMeta::fallback(&options);
        let body = "word ".repeat(250);
        let s = PostSummary::new("x", meta, &body, &options);
        assert_eq!(s.read_time_minutes, 3);
        assert_eq!(s.categories, vec!["Uncategorized"]);
    }

    #[test]
    fn post_renders_body() {
        let post = Post {
            summary: summary("x", None, &[], &[]),
            body: "# Hi".to_string(),
        };
        assert_eq!(post.render().blocks.len(), 1);
    }
}
