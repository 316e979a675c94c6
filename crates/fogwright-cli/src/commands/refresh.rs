use fogwright_protocol::{ClientConfig, ContentFetcher, RefreshOutcome};

pub async fn handle(config: ClientConfig) -> anyhow::Result<()> {
    let keys = super::load_keys(&config)?;
    let output_dir = config.output_dir.clone();
    let mut fetcher = ContentFetcher::new(config, keys)?;

    match fetcher.refresh_all().await? {
        RefreshOutcome::UpToDate { version } => {
            println!("No new version, {version} is current");
        }
        RefreshOutcome::Updated {
            version,
            static_documents,
            dynamic_documents,
            skipped,
        } => {
            println!(
                "Fetched {version}: {static_documents} static and {dynamic_documents} dynamic documents ({skipped} already present) into {}",
                output_dir.join(&version).display()
            );
        }
    }
    Ok(())
}
