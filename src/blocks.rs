//! Per-block content parsers.
//!
//! The segmenter decides *which* block a line starts; the helpers here turn
//! the line's text into the block's fields (table cells, image size
//! directives, video attributes).

use std::sync::LazyLock;

use regex::Regex;

use crate::config::RenderOptions;
use crate::types::{Alignment, Image, ImageStyle, ObjectFit, Video};

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+?)(?:\s+"([^"]+)")?\)"#).expect("valid regex")
});
static EXPLICIT_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)x(\d+)$").expect("valid regex"));
static VIDEO_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<video\s+([^>]*)>").expect("valid regex"));
static VIDEO_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bsrc="([^"]+)""#).expect("valid regex"));
static VIDEO_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bwidth="([^"]+)""#).expect("valid regex"));
static VIDEO_CONTROLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcontrols\b").expect("valid regex"));

// ------------------------------------------------------------------
// Tables
// ------------------------------------------------------------------

/// Check whether a line is a table separator such as `|---|:--:|`.
///
/// Only `|`, `-`, `:` and whitespace are allowed, with at least one pipe and
/// one dash.
pub fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

/// Split a pipe-delimited row into trimmed cell strings, stripping leading and
/// trailing pipes.
pub fn split_pipe_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Read column alignments from a separator row.
pub fn parse_alignments(separator: &str) -> Vec<Alignment> {
    split_pipe_row(separator)
        .iter()
        .map(|cell| match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) if cell.len() > 1 => Alignment::Center,
            (true, _) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        })
        .collect()
}

// ------------------------------------------------------------------
// Images
// ------------------------------------------------------------------

/// The pieces of an `![alt](src "size")` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageToken<'a> {
    pub alt: &'a str,
    pub src: &'a str,
    pub size: Option<&'a str>,
}

/// Find the first image token anywhere in `line`.
pub fn find_image(line: &str) -> Option<ImageToken<'_>> {
    let caps = IMAGE.captures(line)?;
    Some(ImageToken {
        alt: caps.get(1).map_or("", |m| m.as_str()),
        src: caps.get(2)?.as_str(),
        size: caps.get(3).map(|m| m.as_str()),
    })
}

/// Parsed form of an image's quoted size suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeDirective {
    /// `300x200`
    Explicit { width: u32, height: u32 },
    /// `width:50%`, `width:400px`
    Width(String),
}

/// Parse a size directive. Returns `None` for anything malformed.
pub fn parse_size_directive(raw: &str) -> Option<SizeDirective> {
    let raw = raw.trim();
    if let Some(caps) = EXPLICIT_SIZE.captures(raw) {
        let width = caps.get(1)?.as_str().parse().ok()?;
        let height = caps.get(2)?.as_str().parse().ok()?;
        return Some(SizeDirective::Explicit { width, height });
    }
    let value = raw.strip_prefix("width:")?.trim();
    if value.is_empty() {
        return None;
    }
    Some(SizeDirective::Width(value.to_string()))
}

/// Build an image block from a token and its (already parsed) directive.
///
/// Without a directive the configured default size is used and no style
/// override is set.
pub fn build_image(
    token: &ImageToken<'_>,
    directive: Option<&SizeDirective>,
    options: &RenderOptions,
) -> Image {
    let mut image = Image {
        src: token.src.to_string(),
        alt: token.alt.to_string(),
        width: options.default_image_width,
        height: options.default_image_height,
        style: None,
    };

    match directive {
        Some(SizeDirective::Explicit { width, height }) => {
            image.width = *width;
            image.height = *height;
            image.style = Some(ImageStyle {
                width: format!("{width}px"),
                height: format!("{height}px"),
                object_fit: Some(ObjectFit::Cover),
            });
        }
        Some(SizeDirective::Width(value)) => {
            if let Some(px) = pixel_value(value) {
                image.width = px;
                image.height = (f64::from(px) * options.pixel_height_ratio).round() as u32;
            }
            image.style = Some(ImageStyle {
                width: value.clone(),
                height: "auto".to_string(),
                object_fit: None,
            });
        }
        None => {}
    }

    image
}

/// Leading integer of a `<n>px` value.
fn pixel_value(value: &str) -> Option<u32> {
    let number = value.strip_suffix("px")?.trim();
    let digits_end = number
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(number.len());
    number[..digits_end].parse().ok()
}

// ------------------------------------------------------------------
// Video
// ------------------------------------------------------------------

/// Parse a raw `<video ...>` tag. Returns `None` when there is no tag or the
/// tag has no `src`.
pub fn parse_video(line: &str, options: &RenderOptions) -> Option<Video> {
    let attrs = VIDEO_TAG.captures(line)?.get(1)?.as_str();
    let src = VIDEO_SRC.captures(attrs)?.get(1)?.as_str().to_string();
    let width = VIDEO_WIDTH
        .captures(attrs)
        .and_then(|c| c.get(1))
        .map_or_else(|| options.default_video_width.clone(), |m| m.as_str().to_string());
    Some(Video {
        src,
        controls: VIDEO_CONTROLS.is_match(attrs),
        width,
    })
}
