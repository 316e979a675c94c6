//! # fogwright-protocol - Versioned CDN content retrieval
//!
//! This crate drives the network side of the fogwright client: it finds the
//! latest published content version of a deployment branch, builds API and
//! CDN URLs for it, and fetches documents and binary assets, handing every
//! document body to the layered payload decoder.
//!
//! ## Architecture Overview
//!
//! 1. **Version resolution** ([`VersionResolver`]): version-check query with a
//!    truncated-pattern fallback and an operator override
//! 2. **URL construction** ([`UrlBuilder`]): pure functions of configuration
//!    and version
//! 3. **Orchestration** ([`ContentFetcher`]): full refresh of static and
//!    dynamic documents, and catalog asset downloads with bounded concurrency
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fogwright_crypto::KeyStoreFile;
//! use fogwright_protocol::{ClientConfig, ContentFetcher, RefreshOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_file("fogwright.json")?;
//!     let keys = KeyStoreFile::open(&config.key_store_path)?.into_store();
//!
//!     let mut fetcher = ContentFetcher::new(config, keys)?;
//!     match fetcher.refresh_all().await? {
//!         RefreshOutcome::UpToDate { version } => println!("{version} is current"),
//!         RefreshOutcome::Updated { version, .. } => println!("fetched {version}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod branch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod registry;
pub mod state;
pub mod transport;
pub mod url;
pub mod version;

pub use branch::Branch;
pub use cancel::CancellationToken;
pub use config::{ClientConfig, DynamicEndpoint, EndpointConfig};
pub use error::{ConfigError, ProtocolError, Result};
pub use fetcher::{AssetOutcome, AssetStatus, ContentFetcher, DownloadReport, RefreshOutcome};
pub use registry::{AssetRegistry, NoPackagedAssets};
pub use state::VersionRecord;
pub use transport::{HttpClient, HttpConfig};
pub use url::UrlBuilder;
pub use version::{Resolution, VersionResolver, VersionSource};
