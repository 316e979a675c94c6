use fogwright_protocol::{ClientConfig, HttpClient, VersionResolver};

pub async fn handle(config: &ClientConfig) -> anyhow::Result<()> {
    let http = HttpClient::with_config(&config.http_config())?;
    let version = VersionResolver::new(config, &http).resolve_latest().await?;
    println!("{version}");
    Ok(())
}
