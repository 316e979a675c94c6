//! Content fetching orchestration
//!
//! [`ContentFetcher`] ties version resolution, URL construction and payload
//! decoding together:
//!
//! - [`refresh_all`](ContentFetcher::refresh_all) materializes every static
//!   and dynamic document of a new content version under
//!   `<outputDir>/<version>/`, then records the version.
//! - [`download_dynamic_assets`](ContentFetcher::download_dynamic_assets)
//!   fetches catalog assets that are neither packaged nor already on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use fogwright_crypto::KeyStore;
use fogwright_formats::{
    AssetPathPolicy, CatalogEntry, DynamicContentCatalog, LayeredDecoder, ProjectPathPolicy,
};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::ClientConfig;
use crate::error::{ProtocolError, Result};
use crate::registry::AssetRegistry;
use crate::state::{VersionRecord, write_atomic};
use crate::transport::HttpClient;
use crate::url::UrlBuilder;
use crate::version::VersionResolver;

/// Result of [`ContentFetcher::refresh_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The stored version is still the latest; nothing was fetched
    UpToDate { version: String },
    /// A new version was fetched and recorded
    Updated {
        version: String,
        static_documents: usize,
        dynamic_documents: usize,
        /// Dynamic documents already on disk
        skipped: usize,
    },
}

/// Per-entry outcome of a successful asset step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Downloaded(PathBuf),
    /// The registry resolves the asset locally
    Packaged,
    /// The target file already exists
    Present,
    /// An earlier catalog entry maps to the same file
    Duplicate,
}

#[derive(Debug)]
pub struct AssetOutcome {
    pub packaged_path: String,
    pub result: Result<AssetStatus>,
}

impl AssetOutcome {
    fn new(entry: &CatalogEntry, result: Result<AssetStatus>) -> Self {
        Self {
            packaged_path: entry.packaged_path.clone(),
            result,
        }
    }
}

/// Per-entry results of a dynamic asset download, in catalog order
#[derive(Debug, Default)]
pub struct DownloadReport {
    entries: Vec<AssetOutcome>,
}

impl DownloadReport {
    pub fn entries(&self) -> &[AssetOutcome] {
        &self.entries
    }

    /// Newly written assets
    pub fn downloaded(&self) -> usize {
        self.count(|r| matches!(r, Ok(AssetStatus::Downloaded(_))))
    }

    /// Entries satisfied without a download
    pub fn skipped(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                Ok(AssetStatus::Packaged | AssetStatus::Present | AssetStatus::Duplicate)
            )
        })
    }

    /// Entries not started because of cancellation
    pub fn cancelled(&self) -> usize {
        self.count(|r| matches!(r, Err(ProtocolError::Cancelled)))
    }

    /// Failed entries, cancellation excluded
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProtocolError)> {
        self.entries.iter().filter_map(|e| match &e.result {
            Err(ProtocolError::Cancelled) | Ok(_) => None,
            Err(err) => Some((e.packaged_path.as_str(), err)),
        })
    }

    fn count(&self, predicate: impl Fn(&Result<AssetStatus>) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.result)).count()
    }
}

struct DocumentJob {
    label: String,
    url: String,
    path: PathBuf,
}

/// Fetches, decodes and stores CDN content for one branch
pub struct ContentFetcher {
    config: ClientConfig,
    http: HttpClient,
    keys: KeyStore,
    policy: Box<dyn AssetPathPolicy>,
    latest: Option<String>,
}

impl ContentFetcher {
    /// Create a fetcher, picking up the stored resolved version
    pub fn new(config: ClientConfig, keys: KeyStore) -> Result<Self> {
        let http = HttpClient::with_config(&config.http_config())?;
        Self::with_http(config, keys, http)
    }

    /// Create a fetcher using an existing HTTP client
    pub fn with_http(config: ClientConfig, keys: KeyStore, http: HttpClient) -> Result<Self> {
        config.validate()?;
        let latest = VersionRecord::load(&config.state_path)?.map(|r| r.latest_version);
        let policy = Box::new(ProjectPathPolicy::new(config.project_name.clone()));

        Ok(Self {
            config,
            http,
            keys,
            policy,
            latest,
        })
    }

    /// Replace the catalog path policy
    #[must_use]
    pub fn with_path_policy(mut self, policy: impl AssetPathPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Last resolved version, from this run or the stored record
    pub fn latest_version(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    /// Resolve the version and fetch everything when it changed
    pub async fn refresh_all(&mut self) -> Result<RefreshOutcome> {
        info!("Resolving latest content version for {}", self.config.branch);
        let previous = VersionRecord::load(&self.config.state_path)?.map(|r| r.latest_version);
        let resolution = VersionResolver::new(&self.config, &self.http)
            .resolve(previous.as_deref())
            .await?;

        if !resolution.changed {
            info!("No new version, {} is current", resolution.version);
            self.latest = Some(resolution.version.clone());
            return Ok(RefreshOutcome::UpToDate {
                version: resolution.version,
            });
        }

        let urls = UrlBuilder::new(&self.config).with_version(&resolution.version);
        let version_dir = self.config.output_dir.join(urls.version()?);

        let static_jobs = self
            .config
            .endpoints
            .static_cdn
            .keys()
            .map(|name| {
                Ok(DocumentJob {
                    label: name.clone(),
                    url: urls.static_cdn_url(name)?,
                    path: version_dir.join(format!("{name}.json")),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut dynamic_jobs = Vec::new();
        let mut skipped = 0;
        for (family, endpoint) in &self.config.endpoints.dynamic_cdn {
            for id in &endpoint.ids {
                let path = version_dir.join(family).join(format!("{id}.json"));
                if path.exists() {
                    debug!("Skipping {}/{}, already fetched", family, id);
                    skipped += 1;
                    continue;
                }
                dynamic_jobs.push(DocumentJob {
                    label: format!("{family}/{id}"),
                    url: urls.dynamic_cdn_url(family, id)?,
                    path,
                });
            }
        }

        let static_documents = static_jobs.len();
        let dynamic_documents = dynamic_jobs.len();
        info!(
            "Fetching {} static and {} dynamic documents for {}",
            static_documents, dynamic_documents, resolution.version
        );

        stream::iter(static_jobs.into_iter().chain(dynamic_jobs))
            .map(|job| self.fetch_to_file(job))
            .buffer_unordered(self.config.max_concurrent.max(1))
            .try_collect::<Vec<()>>()
            .await?;

        VersionRecord::now(resolution.version.as_str()).save(&self.config.state_path)?;
        info!("Recorded content version {}", resolution.version);
        self.latest = Some(resolution.version.clone());

        Ok(RefreshOutcome::Updated {
            version: resolution.version,
            static_documents,
            dynamic_documents,
            skipped,
        })
    }

    /// Fetch one document and decode it down to JSON text
    pub async fn fetch_document(&self, url: &str) -> Result<String> {
        let body = self.http.get_text(url).await?;
        debug!("Decoding {} bytes from {}", body.len(), url);
        let text = LayeredDecoder::new(&self.keys, self.config.branch.as_str()).decode(&body)?;
        Ok(text)
    }

    /// Download every catalog asset that is neither packaged nor on disk
    ///
    /// Failures are recorded per entry and never abort the batch.
    pub async fn download_dynamic_assets(
        &self,
        catalog: &DynamicContentCatalog,
        registry: &dyn AssetRegistry,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport> {
        let mut urls = UrlBuilder::new(&self.config);
        if let Some(latest) = self.latest.as_deref() {
            urls = urls.with_version(latest);
        }
        urls.version()?;

        info!("Checking {} catalog assets", catalog.len());

        // Entries sharing a local path are fetched once, by the first of them.
        let mut results: Vec<(usize, AssetOutcome)> = Vec::new();
        let mut pending = Vec::new();
        let mut claimed = HashSet::new();
        for (index, entry) in catalog.entries().iter().enumerate() {
            let result: Result<AssetStatus> = match self.policy.local_path(entry) {
                Ok(local) if claimed.contains(&local) => {
                    debug!(
                        "Skipping {}, same file as an earlier entry",
                        entry.packaged_path
                    );
                    Ok(AssetStatus::Duplicate)
                }
                Ok(local) => {
                    claimed.insert(local.clone());
                    pending.push((index, entry, local));
                    continue;
                }
                Err(e) => {
                    warn!("Failed to map {}: {}", entry.packaged_path, e);
                    Err(e.into())
                }
            };
            results.push((index, AssetOutcome::new(entry, result)));
        }

        let downloads: Vec<(usize, AssetOutcome)> = stream::iter(pending)
            .map(|(index, entry, local)| async move {
                let result = self
                    .download_asset(entry, &local, &urls, registry, cancel)
                    .await;
                if let Err(e) = &result
                    && !matches!(e, ProtocolError::Cancelled)
                {
                    warn!("Failed to download {}: {}", entry.packaged_path, e);
                }
                (index, AssetOutcome::new(entry, result))
            })
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect()
            .await;
        results.extend(downloads);

        results.sort_by_key(|(index, _)| *index);
        let report = DownloadReport {
            entries: results.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        info!(
            "Downloaded {} assets, {} skipped, {} cancelled",
            report.downloaded(),
            report.skipped(),
            report.cancelled()
        );
        Ok(report)
    }

    async fn download_asset(
        &self,
        entry: &CatalogEntry,
        local: &str,
        urls: &UrlBuilder<'_>,
        registry: &dyn AssetRegistry,
        cancel: &CancellationToken,
    ) -> Result<AssetStatus> {
        if cancel.is_cancelled() {
            return Err(ProtocolError::Cancelled);
        }

        if registry.contains(local) {
            debug!("Skipping {}, packaged", local);
            return Ok(AssetStatus::Packaged);
        }

        let path = self.config.assets_dir.join(local);
        if path.exists() {
            debug!("Skipping {}, already downloaded", local);
            return Ok(AssetStatus::Present);
        }

        let url = urls.dynamic_asset_cdn_url(&self.keys, &entry.uri)?;
        let bytes = self.http.get_bytes(&url).await?;
        write_atomic(&path, &bytes)?;
        debug!("Saved {} ({} bytes)", path.display(), bytes.len());

        Ok(AssetStatus::Downloaded(path))
    }

    async fn fetch_to_file(&self, job: DocumentJob) -> Result<()> {
        info!("Fetching {}", job.label);
        let text = self.fetch_document(&job.url).await?;
        save_document(&job.path, &text)?;
        debug!("Saved {}", job.path.display());
        Ok(())
    }
}

fn save_document(path: &Path, text: &str) -> Result<()> {
    write_atomic(path, text.as_bytes())
}

impl std::fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFetcher")
            .field("branch", &self.config.branch)
            .field("keys", &self.keys.len())
            .field("latest", &self.latest)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = DownloadReport {
            entries: vec![
                AssetOutcome {
                    packaged_path: "/Game/A".to_string(),
                    result: Ok(AssetStatus::Downloaded(PathBuf::from("a.png"))),
                },
                AssetOutcome {
                    packaged_path: "/Game/B".to_string(),
                    result: Ok(AssetStatus::Present),
                },
                AssetOutcome {
                    packaged_path: "/Game/C".to_string(),
                    result: Ok(AssetStatus::Packaged),
                },
                AssetOutcome {
                    packaged_path: "/Game/C.C".to_string(),
                    result: Ok(AssetStatus::Duplicate),
                },
                AssetOutcome {
                    packaged_path: "/Game/D".to_string(),
                    result: Err(ProtocolError::Cancelled),
                },
                AssetOutcome {
                    packaged_path: "/Game/E".to_string(),
                    result: Err(ProtocolError::UnknownKey("8.1.0_live".to_string())),
                },
            ],
        };

        assert_eq!(report.downloaded(), 1);
        assert_eq!(report.skipped(), 3);
        assert_eq!(report.cancelled(), 1);
        let failures: Vec<&str> = report.failures().map(|(p, _)| p).collect();
        assert_eq!(failures, vec!["/Game/E"]);
    }

    #[test]
    fn test_new_validates_config() {
        let config = ClientConfig {
            max_concurrent: 0,
            ..ClientConfig::default()
        };
        let result = ContentFetcher::new(config, KeyStore::new());
        assert!(matches!(result, Err(ProtocolError::Config(_))));
    }
}
