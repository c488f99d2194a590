//! Directory-backed post store.
//!
//! Each post is one file `<slug>.<extension>` directly under the content
//! directory: a metadata header followed by the markdown body.

use std::path::{Path, PathBuf};

use crate::config::{Config, ContentOptions};
use crate::error::ContentError;
use crate::metadata::{Extracted, extract_metadata, parse_metadata};
use crate::posts::{Post, PostSummary, sort_by_date};

#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    options: ContentOptions,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>, options: ContentOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(root, config.content.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &ContentOptions {
        &self.options
    }

    /// Summaries of every post, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostSummary>, ContentError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| io_error(&self.root, source))?;

        let mut posts = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| io_error(&self.root, source))?.path();
            let Some(slug) = self.slug_of(&path) else {
                continue;
            };
            let source = read(&path)?;
            let extracted = self.extract(&path, &source)?;
            posts.push(PostSummary::new(slug, extracted.meta, &extracted.body, &self.options));
        }

        sort_by_date(&mut posts);
        log::debug!("listed {} posts from {}", posts.len(), self.root.display());
        Ok(posts)
    }

    /// Load one post by slug. `Ok(None)` when no such file exists.
    pub fn get_post(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        let Some((path, source)) = self.read_slug(slug)? else {
            return Ok(None);
        };
        let extracted = self.extract(&path, &source)?;
        let summary = PostSummary::new(slug, extracted.meta, &extracted.body, &self.options);
        Ok(Some(Post {
            summary,
            body: extracted.body,
        }))
    }

    /// A post's body with the header removed, ready for the renderer.
    pub fn get_post_content(&self, slug: &str) -> Result<Option<String>, ContentError> {
        Ok(self.get_post(slug)?.map(|post| post.body))
    }

    fn read_slug(&self, slug: &str) -> Result<Option<(PathBuf, String)>, ContentError> {
        validate_slug(slug)?;
        let path = self.root.join(format!("{slug}.{}", self.options.extension));
        match std::fs::read_to_string(&path) {
            Ok(source) => Ok(Some((path, source))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no post at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(io_error(&path, source)),
        }
    }

    fn extract(&self, path: &Path, source: &str) -> Result<Extracted, ContentError> {
        if self.options.strict_metadata {
            return parse_metadata(source, &self.options).map_err(|source| ContentError::Metadata {
                path: path.to_path_buf(),
                source,
            });
        }
        log::trace!("extracting metadata from {}", path.display());
        Ok(extract_metadata(source, &self.options))
    }

    fn slug_of(&self, path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }
        if path.extension()?.to_str()? != self.options.extension {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ContentError {
    ContentError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read(path: &Path) -> Result<String, ContentError> {
    std::fs::read_to_string(path).map_err(|source| io_error(path, source))
}

/// Slugs name a file directly inside the content directory.
fn validate_slug(slug: &str) -> Result<(), ContentError> {
    if slug.is_empty() || slug.contains(['/', '\\']) || slug.contains("..") {
        return Err(ContentError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}
