//! Latest content version resolution
//!
//! The version check is queried with the configured version pattern. When it
//! yields nothing usable, one retry is made with the last two characters of
//! the pattern dropped, which covers an API version lagging one patch digit
//! behind the build.

use fogwright_formats::AvailableVersions;
use tracing::{debug, info, warn};

use crate::config::{CONTENT_VERSION_ENDPOINT, ClientConfig};
use crate::error::{ConfigError, ProtocolError, Result};
use crate::transport::HttpClient;
use crate::url::UrlBuilder;

/// Characters dropped from the pattern for the fallback query
pub const FALLBACK_TRUNCATION: usize = 2;

/// Where a resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Operator override from configuration
    Override,
    /// First version-check query
    Remote,
    /// Retry with the truncated pattern
    Fallback,
}

/// Outcome of comparing the latest version with the stored one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub version: String,
    /// Differs from the previously stored version
    pub changed: bool,
    pub source: VersionSource,
}

/// Resolves the latest published content version
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'a> {
    config: &'a ClientConfig,
    http: &'a HttpClient,
}

impl<'a> VersionResolver<'a> {
    pub fn new(config: &'a ClientConfig, http: &'a HttpClient) -> Self {
        Self { config, http }
    }

    /// Latest version, or the override when one is configured
    pub async fn resolve_latest(&self) -> Result<String> {
        self.resolve_with_source().await.map(|(version, _)| version)
    }

    /// Resolve and compare with `previous`
    pub async fn resolve(&self, previous: Option<&str>) -> Result<Resolution> {
        let (version, source) = self.resolve_with_source().await?;
        let changed = previous != Some(version.as_str());

        if changed {
            info!(
                "Content version changed: {} -> {}",
                previous.unwrap_or("<none>"),
                version
            );
        } else {
            debug!("Content version unchanged: {}", version);
        }

        Ok(Resolution {
            version,
            changed,
            source,
        })
    }

    async fn resolve_with_source(&self) -> Result<(String, VersionSource)> {
        if let Some(version) = self.config.version_override() {
            info!("Using operator version override {}", version);
            return Ok((version.to_string(), VersionSource::Override));
        }

        let pattern = self.config.version_pattern.trim();
        if pattern.is_empty() {
            return Err(ConfigError::EmptyValue("versionPattern").into());
        }

        match self.query(pattern).await {
            Ok(Some(version)) => return Ok((version, VersionSource::Remote)),
            Ok(None) => warn!("No versions available for pattern {}", pattern),
            Err(e) => warn!("Version check for pattern {} failed: {}", pattern, e),
        }

        let truncated = truncate_pattern(pattern);
        if truncated.is_empty() {
            return Err(ProtocolError::VersionResolution(format!(
                "no versions available for '{pattern}'"
            )));
        }

        info!("Retrying version check with pattern {}", truncated);
        match self.query(truncated).await {
            Ok(Some(version)) => Ok((version, VersionSource::Fallback)),
            Ok(None) => Err(ProtocolError::VersionResolution(format!(
                "no versions available for '{pattern}' or '{truncated}'"
            ))),
            Err(e) => Err(ProtocolError::VersionResolution(format!(
                "version check for '{truncated}' failed: {e}"
            ))),
        }
    }

    async fn query(&self, pattern: &str) -> Result<Option<String>> {
        let url = UrlBuilder::new(self.config)
            .api_url(CONTENT_VERSION_ENDPOINT, &[("versionPattern", pattern)])?;
        let body = self.http.get_text(&url).await?;
        let versions = AvailableVersions::parse(&body)?;

        debug!(
            "Version check for {} returned {} candidates",
            pattern,
            versions.len()
        );

        Ok(versions.latest().map(|c| c.version.clone()))
    }
}

/// Pattern for the fallback query
pub fn truncate_pattern(pattern: &str) -> &str {
    let keep = pattern.chars().count().saturating_sub(FALLBACK_TRUNCATION);
    pattern
        .char_indices()
        .nth(keep)
        .map_or(pattern, |(i, _)| &pattern[..i])
}
