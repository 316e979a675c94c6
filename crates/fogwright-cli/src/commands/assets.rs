use std::path::{Path, PathBuf};

use anyhow::Context;
use fogwright_formats::{DynamicContentCatalog, LayeredDecoder};
use fogwright_protocol::{
    AssetRegistry, CancellationToken, ClientConfig, ContentFetcher, NoPackagedAssets,
};
use tracing::warn;

pub async fn handle(
    config: ClientConfig,
    catalog_path: &Path,
    packaged_root: Option<PathBuf>,
) -> anyhow::Result<()> {
    let keys = super::load_keys(&config)?;

    let raw = std::fs::read_to_string(catalog_path)
        .with_context(|| format!("failed to read {}", catalog_path.display()))?;
    let json = LayeredDecoder::new(&keys, config.branch.as_str()).decode(&raw)?;
    let catalog = DynamicContentCatalog::parse(&json)?;

    let fetcher = ContentFetcher::new(config, keys)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing downloads in flight");
            on_interrupt.cancel();
        }
    });

    let packaged = packaged_root.map(|root| move |path: &str| root.join(path).exists());
    let registry: &dyn AssetRegistry = match &packaged {
        Some(predicate) => predicate,
        None => &NoPackagedAssets,
    };

    let report = fetcher
        .download_dynamic_assets(&catalog, registry, &cancel)
        .await?;

    for (path, err) in report.failures() {
        eprintln!("failed: {path}: {err}");
    }
    println!(
        "{} downloaded, {} skipped, {} failed, {} cancelled",
        report.downloaded(),
        report.skipped(),
        report.failures().count(),
        report.cancelled()
    );
    Ok(())
}
