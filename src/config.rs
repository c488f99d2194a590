//! Renderer and content-layer settings, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock behaviour.
//!
//! ```toml
//! [render]
//! default_image_width = 960
//! max_nesting_depth = 8
//!
//! [content]
//! extension = "md"
//! default_category = "Notes"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderOptions,
    pub content: ContentOptions,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Knobs for the markdown renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Width given to images without a size directive.
    pub default_image_width: u32,
    pub default_image_height: u32,
    /// Height/width ratio applied to `width:<n>px` directives.
    pub pixel_height_ratio: f64,
    /// CSS width for `<video>` tags without a `width` attribute.
    pub default_video_width: String,
    /// Deepest `<details>` nesting rendered as sections.
    pub max_nesting_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_image_width: 800,
            default_image_height: 400,
            pixel_height_ratio: 0.6,
            default_video_width: "100%".to_string(),
            max_nesting_depth: 16,
        }
    }
}

/// Knobs for the post store and read-time estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOptions {
    /// File extension of post sources, without the dot.
    pub extension: String,
    pub cjk_chars_per_minute: u32,
    pub words_per_minute: u32,
    /// Category assigned when a header cannot be parsed at all.
    pub default_category: String,
    pub default_title: String,
    /// Fail on a malformed header instead of falling back to defaults.
    pub strict_metadata: bool,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            extension: "mdx".to_string(),
            cjk_chars_per_minute: 200,
            words_per_minute: 100,
            default_category: "Uncategorized".to_string(),
            default_title: "Untitled".to_string(),
            strict_metadata: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.render.default_image_width, 800);
        assert_eq!(config.content.extension, "mdx");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            "[render]\nmax_nesting_depth = 4\n\n[content]\nextension = \"md\"\n",
        )
        .unwrap();
        assert_eq!(config.render.max_nesting_depth, 4);
        assert_eq!(config.render.default_image_height, 400);
        assert_eq!(config.content.extension, "md");
        assert_eq!(config.content.words_per_minute, 100);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = Config::from_toml_str("[render\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("here.toml")),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }
}
