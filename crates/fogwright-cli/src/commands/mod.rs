//! Subcommand handlers

pub mod assets;
pub mod codec;
pub mod keys;
pub mod refresh;
pub mod version;

use anyhow::Context;
use fogwright_crypto::{KeyStore, KeyStoreFile};
use fogwright_protocol::ClientConfig;

/// Load the persisted key store named by the configuration
pub fn load_keys(config: &ClientConfig) -> anyhow::Result<KeyStore> {
    let file = KeyStoreFile::open(&config.key_store_path).with_context(|| {
        format!(
            "failed to open key store {}",
            config.key_store_path.display()
        )
    })?;
    tracing::debug!(
        "Loaded {} access keys from {}",
        file.store().len(),
        file.path().display()
    );
    Ok(file.into_store())
}
