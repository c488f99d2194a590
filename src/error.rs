use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Span;

/// Errors from the content store.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid post slug '{0}'")]
    InvalidSlug(String),

    #[error("Invalid metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
}

/// Errors from parsing a post's metadata header.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Metadata header opened with `---` but never closed")]
    UnclosedFrontMatter,

    #[error("Failed to parse metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A diagnostic message produced during parsing.
///
/// Diagnostics are non-fatal: the parser always produces a document and
/// records here where it had to degrade malformed structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Diagnostic {
    pub(crate) fn warning(code: &str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span: Some(span),
            code: Some(code.to_string()),
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}
