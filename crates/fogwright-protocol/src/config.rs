//! Client configuration
//!
//! Loaded from a camelCase JSON file, then overridden from `FOGWRIGHT_*`
//! environment variables:
//!
//! ```json
//! {
//!   "branch": "live",
//!   "versionPattern": "8.1.0",
//!   "branchRoots": { "live": "live" },
//!   "endpoints": {
//!     "api": { "contentVersion": "/utils/contentVersion/version" },
//!     "staticCdn": { "catalog": "/catalog.json" },
//!     "dynamicCdn": { "archives": { "template": "/archives/{0}.json", "ids": ["Tome01"] } }
//!   }
//! }
//! ```
//!
//! Without an `endpoints` object the built-in registry applies. Once the file
//! supplies one, only its `api` table falls back to the built-in version-check
//! endpoint; `staticCdn` and `dynamicCdn` default to empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::branch::Branch;
use crate::error::ConfigError;
use crate::transport::HttpConfig;

/// Name under which the version-check endpoint is registered
pub const CONTENT_VERSION_ENDPOINT: &str = "contentVersion";

/// Section header of the access key source
pub const DEFAULT_ACCESS_KEY_SECTION: &str = "[AccessKeys]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub branch: Branch,

    /// Version pattern sent with the version check, e.g. `8.1.0`
    pub version_pattern: String,

    /// Operator override that bypasses version resolution
    pub custom_version: Option<String>,

    /// API base template for branches outside the Steam family, `{0}` is the branch
    pub api_base_url: String,

    /// API base template for live, ptb and qa
    pub steam_api_base_url: String,

    /// CDN base template, `{0}` is the branch
    pub cdn_base_url: String,

    /// Content path segment template, `{0}` is the branch root
    pub content_segment: String,

    /// Root path fragment per branch name
    pub branch_roots: BTreeMap<String, String>,

    pub endpoints: EndpointConfig,

    /// Decoded documents land in `<outputDir>/<version>/`
    pub output_dir: PathBuf,

    /// Downloaded assets land under this directory
    pub assets_dir: PathBuf,

    pub key_store_path: PathBuf,

    /// Resolved-version record
    pub state_path: PathBuf,

    pub access_key_section: String,

    /// Project folder name used when mapping packaged asset paths
    pub project_name: String,

    pub max_concurrent: usize,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    /// API endpoints by name
    #[serde(default = "default_api_endpoints")]
    pub api: BTreeMap<String, String>,

    /// Static CDN documents by name
    #[serde(default)]
    pub static_cdn: BTreeMap<String, String>,

    /// Dynamic CDN document families by name
    #[serde(default)]
    pub dynamic_cdn: BTreeMap<String, DynamicEndpoint>,
}

/// Family of documents fetched once per identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicEndpoint {
    /// Path template, `{0}` is the identifier
    pub template: String,

    pub ids: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let branch_roots = Branch::ALL
            .into_iter()
            .map(|b| (b.as_str().to_string(), b.as_str().to_string()))
            .collect();

        Self {
            branch: Branch::Live,
            version_pattern: String::new(),
            custom_version: None,
            api_base_url: "https://latest.{0}.example.com/api/v1".to_string(),
            steam_api_base_url: "https://steam.{0}.example.com/api/v1".to_string(),
            cdn_base_url: "https://cdn.{0}.example.com".to_string(),
            content_segment: "/clientData/{0}/content/".to_string(),
            branch_roots,
            endpoints: EndpointConfig::default(),
            output_dir: PathBuf::from("output"),
            assets_dir: PathBuf::from("assets"),
            key_store_path: PathBuf::from("keys.json"),
            state_path: PathBuf::from("state.json"),
            access_key_section: DEFAULT_ACCESS_KEY_SECTION.to_string(),
            project_name: "Game".to_string(),
            max_concurrent: 4,
            connect_timeout: 10,
            request_timeout: 45,
        }
    }
}

fn default_api_endpoints() -> BTreeMap<String, String> {
    let mut api = BTreeMap::new();
    api.insert(
        CONTENT_VERSION_ENDPOINT.to_string(),
        "/utils/contentVersion/version".to_string(),
    );
    api
}

impl Default for EndpointConfig {
    fn default() -> Self {
        let api = default_api_endpoints();

        let mut static_cdn = BTreeMap::new();
        static_cdn.insert("catalog".to_string(), "/catalog.json".to_string());
        static_cdn.insert(
            "dynamicContent".to_string(),
            "/dynamicContent.json".to_string(),
        );

        let mut dynamic_cdn = BTreeMap::new();
        dynamic_cdn.insert(
            "archives".to_string(),
            DynamicEndpoint {
                template: "/archives/{0}.json".to_string(),
                ids: Vec::new(),
            },
        );

        Self {
            api,
            static_cdn,
            dynamic_cdn,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        serde_json::from_str(&json).map_err(ConfigError::Parse)
    }

    /// Create configuration from defaults and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `FOGWRIGHT_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(branch) = std::env::var("FOGWRIGHT_BRANCH") {
            self.branch = branch.parse()?;
        }
        if let Ok(pattern) = std::env::var("FOGWRIGHT_VERSION_PATTERN") {
            self.version_pattern = pattern;
        }
        if let Ok(version) = std::env::var("FOGWRIGHT_CUSTOM_VERSION") {
            self.custom_version = Some(version).filter(|v| !v.trim().is_empty());
        }
        if let Ok(dir) = std::env::var("FOGWRIGHT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Check everything the fetch pipeline depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.branch_root()?;

        if !self.endpoints.api.contains_key(CONTENT_VERSION_ENDPOINT) {
            return Err(ConfigError::MissingApiEndpoint(
                CONTENT_VERSION_ENDPOINT.to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.cdn_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue("cdnBaseUrl"));
        }

        Ok(())
    }

    /// Root path fragment of the configured branch
    pub fn branch_root(&self) -> Result<&str, ConfigError> {
        self.branch_roots
            .get(self.branch.as_str())
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingBranchRoot(self.branch.to_string()))
    }

    /// Non-empty operator override, if any
    pub fn version_override(&self) -> Option<&str> {
        self.custom_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// HTTP settings derived from the timeouts
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.request_timeout),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            ..HttpConfig::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_validate() {
        let config = ClientConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.branch_root().expect("root"), "live");
        assert_eq!(config.max_concurrent, 4);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("fogwright.json");
        std::fs::write(
            &path,
            r#"{"branch":"PTB","versionPattern":"8.1.0","branchRoots":{"ptb":"ptb-root"},"maxConcurrent":2}"#,
        )
        .expect("write");

        let config = ClientConfig::from_file(&path).expect("load");
        assert_eq!(config.branch, Branch::Ptb);
        assert_eq!(config.version_pattern, "8.1.0");
        assert_eq!(config.branch_root().expect("root"), "ptb-root");
        assert_eq!(config.max_concurrent, 2);
        assert!(config.endpoints.api.contains_key(CONTENT_VERSION_ENDPOINT));
        assert!(config.endpoints.static_cdn.contains_key("catalog"));
    }

    #[test]
    fn test_file_endpoints_replace_builtin_documents() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("fogwright.json");
        std::fs::write(
            &path,
            r#"{"versionPattern":"8.1.0","endpoints":{"staticCdn":{"news":"/news.json"}}}"#,
        )
        .expect("write");

        let config = ClientConfig::from_file(&path).expect("load");
        assert!(config.endpoints.api.contains_key(CONTENT_VERSION_ENDPOINT));
        assert_eq!(config.endpoints.static_cdn.len(), 1);
        assert!(config.endpoints.static_cdn.contains_key("news"));
        assert!(config.endpoints.dynamic_cdn.is_empty());
        config.validate().expect("valid");
    }

    #[test]
    fn test_invalid_branch_in_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("fogwright.json");
        std::fs::write(&path, r#"{"branch":"nightly"}"#).expect("write");
        assert!(matches!(
            ClientConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_missing_root() {
        let mut config = ClientConfig::default();
        config.branch = Branch::Uat;
        config.branch_roots.remove("uat");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingBranchRoot(b)) if b == "uat"
        ));
    }

    #[test]
    fn test_validate_missing_version_endpoint() {
        let mut config = ClientConfig::default();
        config.endpoints.api.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingApiEndpoint(_))
        ));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let config = ClientConfig {
            max_concurrent: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = ClientConfig {
            custom_version: Some("  ".to_string()),
            ..ClientConfig::default()
        };
        assert_eq!(config.version_override(), None);
    }
}
