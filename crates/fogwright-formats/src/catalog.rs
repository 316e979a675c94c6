//! Dynamic content catalog
//!
//! The catalog lists binary assets that can be fetched individually from the
//! CDN. Each entry names the path the asset has inside the packaged game and
//! the CDN-relative URI to download it from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extension used when the URI carries none
pub const DEFAULT_ASSET_EXTENSION: &str = "png";

/// Error raised while reading a catalog or mapping an entry to a local path
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog document is not valid JSON in either accepted shape
    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),

    /// Packaged path cannot be mapped to a local path
    #[error("invalid packaged path '{path}': {reason}")]
    InvalidPath {
        /// Offending packaged path
        path: String,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// One downloadable asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Declared hash of the asset content
    #[serde(default)]
    pub content_hash: String,
    /// Download strategy hint
    #[serde(default)]
    pub download_strategy: String,
    /// Path of the asset inside the packaged game
    pub packaged_path: String,
    /// Schema tag
    #[serde(default)]
    pub schema: String,
    /// CDN-relative URI of the asset
    pub uri: String,
}

/// Parsed dynamic content catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicContentCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogShape {
    Bare(Vec<CatalogEntry>),
    Wrapped { entries: Vec<CatalogEntry> },
}

impl DynamicContentCatalog {
    /// Parse a catalog, either a bare array or `{"entries": [...]}`
    pub fn parse(json: &str) -> Result<Self, CatalogError> {
        let entries = match serde_json::from_str::<CatalogShape>(json)? {
            CatalogShape::Bare(entries) | CatalogShape::Wrapped { entries } => entries,
        };
        Ok(Self { entries })
    }

    /// Entries in document order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<CatalogEntry>> for DynamicContentCatalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

/// Maps catalog entries to canonical local paths
///
/// The canonical path is relative, uses `/` separators and is what the asset
/// registry is asked about.
pub trait AssetPathPolicy: Send + Sync {
    /// Canonical local path for `entry`
    fn local_path(&self, entry: &CatalogEntry) -> Result<String, CatalogError>;
}

/// Maps packaged paths into an engine project layout
///
/// - `/Game/UI/Icon.Icon` with uri `.../Icon.jpg` → `<project>/Content/UI/Icon.jpg`
/// - `/Event01/UI/Icon` → `<project>/Plugins/Event01/Content/UI/Icon.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPathPolicy {
    project: String,
}

impl ProjectPathPolicy {
    /// Create a policy rooted at `project`
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    /// Project root name
    pub fn project(&self) -> &str {
        &self.project
    }
}

impl AssetPathPolicy for ProjectPathPolicy {
    fn local_path(&self, entry: &CatalogEntry) -> Result<String, CatalogError> {
        let invalid = |reason| CatalogError::InvalidPath {
            path: entry.packaged_path.clone(),
            reason,
        };

        let trimmed = entry.packaged_path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("empty path"));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(invalid("path escapes its root"));
        }

        let (root, rest) = match segments.split_first() {
            Some((root, rest)) if !rest.is_empty() => (*root, rest),
            _ => return Err(invalid("path has no root folder")),
        };

        let (dirs, file) = rest.split_at(rest.len() - 1);
        let stem = strip_object_suffix(file[0]);
        let extension = uri_extension(&entry.uri).unwrap_or(DEFAULT_ASSET_EXTENSION);

        let mut path = if root == "Game" {
            format!("{}/Content", self.project)
        } else {
            format!("{}/Plugins/{root}/Content", self.project)
        };
        for dir in dirs {
            path.push('/');
            path.push_str(dir);
        }
        path.push('/');
        path.push_str(stem);
        path.push('.');
        path.push_str(extension);

        Ok(path)
    }
}

fn strip_object_suffix(name: &str) -> &str {
    name.split_once('.').map_or(name, |(stem, _)| stem)
}

fn uri_extension(uri: &str) -> Option<&str> {
    let path = uri.split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;
    let (_, extension) = file.rsplit_once('.')?;
    (!extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(extension)
}
