//! API and CDN URL construction
//!
//! Pure functions of the configuration and the content version. Nothing here
//! performs I/O.

use std::sync::LazyLock;

use fogwright_crypto::KeyStore;
use regex::Regex;
use ::url::form_urlencoded::byte_serialize;

use crate::config::ClientConfig;
use crate::error::{ConfigError, ProtocolError, Result};

#[allow(clippy::expect_used)]
// expect_used: the pattern is a literal and known to compile
static API_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.\d+\.\d+)[^A-Za-z]*([A-Za-z]+)").expect("valid regex")
});

/// Replace every `{0}`, `{1}`, ... with the matching argument
pub fn format_template(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |acc, (i, arg)| {
            acc.replace(&format!("{{{i}}}"), arg)
        })
}

/// Access key id for dynamic asset downloads, e.g. `8.1.0_live`
///
/// Derived from the resolved API version by keeping the `major.minor.patch`
/// part and the first alphabetic run after it.
pub fn asset_key_id(api_version: &str) -> Result<String> {
    let captures = API_VERSION
        .captures(api_version)
        .ok_or_else(|| ConfigError::UnrecognizedApiVersion(api_version.to_string()))?;
    Ok(format!("{}_{}", &captures[1], &captures[2]))
}

/// Builds request URLs for one branch and content version
#[derive(Debug, Clone, Copy)]
pub struct UrlBuilder<'a> {
    config: &'a ClientConfig,
    resolved: Option<&'a str>,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(config: &'a ClientConfig) -> Self {
        Self {
            config,
            resolved: None,
        }
    }

    /// Use `version` as the resolved latest version
    #[must_use]
    pub fn with_version(mut self, version: &'a str) -> Self {
        self.resolved = Some(version);
        self
    }

    /// Version used in CDN paths: the override if set, else the resolved one
    pub fn version(&self) -> std::result::Result<&'a str, ConfigError> {
        self.config
            .version_override()
            .or(self.resolved)
            .ok_or(ConfigError::NoVersion)
    }

    /// URL of a registered API endpoint
    pub fn api_url(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<String, ConfigError> {
        let path = self
            .config
            .endpoints
            .api
            .get(endpoint)
            .ok_or_else(|| ConfigError::MissingApiEndpoint(endpoint.to_string()))?;

        let base = if self.config.branch.uses_steam_api() {
            &self.config.steam_api_base_url
        } else {
            &self.config.api_base_url
        };

        let mut url = format_template(base, &[self.config.branch.as_str()]);
        url.push_str(path);

        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.extend(byte_serialize(key.as_bytes()));
            url.push('=');
            url.extend(byte_serialize(value.as_bytes()));
        }

        Ok(url)
    }

    /// CDN URL of a path fragment under the current version
    pub fn cdn_url(&self, fragment: &str) -> std::result::Result<String, ConfigError> {
        let mut url = self.content_base()?;
        url.push_str(fragment);
        Ok(url)
    }

    /// CDN URL of a registered static document
    pub fn static_cdn_url(&self, name: &str) -> std::result::Result<String, ConfigError> {
        let fragment = self
            .config
            .endpoints
            .static_cdn
            .get(name)
            .ok_or_else(|| ConfigError::MissingStaticEndpoint(name.to_string()))?;
        self.cdn_url(fragment)
    }

    /// CDN URL of one document of a dynamic family
    pub fn dynamic_cdn_url(
        &self,
        family: &str,
        id: &str,
    ) -> std::result::Result<String, ConfigError> {
        let endpoint = self
            .config
            .endpoints
            .dynamic_cdn
            .get(family)
            .ok_or_else(|| ConfigError::MissingDynamicFamily(family.to_string()))?;
        self.cdn_url(&format_template(&endpoint.template, &[id]))
    }

    /// CDN URL of a dynamic asset, gated by the access key of the version
    ///
    /// The key is inserted verbatim as `<version>/<key>/<uri>`, base64
    /// punctuation included.
    pub fn dynamic_asset_cdn_url(&self, keys: &KeyStore, uri: &str) -> Result<String> {
        let key_id = asset_key_id(self.version()?)?;
        let key = keys
            .get(&key_id)
            .ok_or_else(|| ProtocolError::UnknownKey(key_id.clone()))?;

        let mut url = self.content_base()?;
        url.push('/');
        url.push_str(key);
        url.push('/');
        url.push_str(uri.trim_start_matches('/'));
        Ok(url)
    }

    fn content_base(&self) -> std::result::Result<String, ConfigError> {
        let branch = self.config.branch.as_str();
        let root = self.config.branch_root()?;
        let version = self.version()?;

        let mut url = format_template(&self.config.cdn_base_url, &[branch]);
        url.push_str(&format_template(&self.config.content_segment, &[root]));
        url.push_str(version);
        Ok(url)
    }
}
