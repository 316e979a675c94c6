use std::path::Path;

use anyhow::{Context, bail};
use clap::ValueEnum;
use fogwright_formats::{LayeredDecoder, PayloadBuilder};
use fogwright_protocol::ClientConfig;

/// Encoding layer selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layer {
    Zlib,
    Profile,
    Asset,
}

pub fn decode(config: &ClientConfig, file: &Path) -> anyhow::Result<()> {
    let payload = read(file)?;
    let keys = super::load_keys(config)?;
    let text = LayeredDecoder::new(&keys, config.branch.as_str()).decode(&payload)?;
    println!("{text}");
    Ok(())
}

pub fn encode(
    config: &ClientConfig,
    file: &Path,
    layers: &[Layer],
    key_id: Option<&str>,
) -> anyhow::Result<()> {
    let text = read(file)?;
    let keys = super::load_keys(config)?;

    let mut builder = PayloadBuilder::new(text.trim_end());
    for layer in layers {
        builder = match layer {
            Layer::Zlib => builder.compress()?,
            Layer::Profile => builder.encrypt_profile()?,
            Layer::Asset => {
                let Some(id) = key_id else {
                    bail!("--key-id is required for asset layers");
                };
                let Some(key) = keys.get_key(id) else {
                    bail!(
                        "no access key '{id}' in {}",
                        config.key_store_path.display()
                    );
                };
                builder.encrypt_asset(config.branch.as_str(), &key)?
            }
        };
    }

    println!("{}", builder.build());
    Ok(())
}

fn read(file: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}
