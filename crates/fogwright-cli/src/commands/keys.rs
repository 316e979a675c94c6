use std::path::Path;

use anyhow::Context;
use fogwright_crypto::KeyStoreFile;
use fogwright_protocol::ClientConfig;
use tracing::info;

pub fn harvest(config: &ClientConfig, source: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let mut file = KeyStoreFile::open(&config.key_store_path)?;
    let new_keys = file.harvest_and_save(&text, &config.access_key_section)?;

    if new_keys.is_empty() {
        info!("No new access keys in {}", source.display());
    }
    for key in &new_keys {
        println!("{}", key.id);
    }
    println!(
        "{} new keys, {} total in {}",
        new_keys.len(),
        file.store().len(),
        file.path().display()
    );
    Ok(())
}
