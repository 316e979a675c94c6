//! fogwright binary entry point.
//!
//! Thin wrapper around the fogwright libraries that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Loads configuration
//! 4. Dispatches the subcommand and maps failures to exit status 1

mod commands;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fogwright_formats::DecodeError;
use fogwright_protocol::{Branch, ClientConfig, ProtocolError};
use tracing_subscriber::EnvFilter;

use commands::codec::Layer;

#[derive(Parser)]
#[command(
    name = "fogwright",
    about = "Client for a versioned game-data CDN with layered payload encoding",
    version
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "FOGWRIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Deployment branch, overrides the configuration
    #[arg(short, long, global = true)]
    branch: Option<Branch>,

    /// Log filter, e.g. `debug` or `fogwright_protocol=trace`
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the latest content version
    Version,

    /// Fetch every document of a new content version
    Refresh,

    /// Decode a payload file and print its JSON
    Decode {
        /// File holding the payload text
        file: PathBuf,
    },

    /// Wrap a JSON file in encoding layers, innermost first
    Encode {
        file: PathBuf,

        /// Layer to add; repeat to stack
        #[arg(long = "layer", value_enum, required = true)]
        layers: Vec<Layer>,

        /// Access key id for asset-encrypted layers
        #[arg(long)]
        key_id: Option<String>,
    },

    /// Harvest access keys from an extracted configuration file
    HarvestKeys {
        /// INI-style file containing the access key section
        source: PathBuf,
    },

    /// Download catalog assets that are not present locally
    DownloadAssets {
        /// Dynamic content catalog (JSON or encoded payload)
        catalog: PathBuf,

        /// Directory of packaged assets to treat as already available
        #[arg(long)]
        packaged_root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = hint(&err) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.branch)?;

    match cli.command {
        Commands::Version => commands::version::handle(&config).await,
        Commands::Refresh => commands::refresh::handle(config).await,
        Commands::Decode { file } => commands::codec::decode(&config, &file),
        Commands::Encode {
            file,
            layers,
            key_id,
        } => commands::codec::encode(&config, &file, &layers, key_id.as_deref()),
        Commands::HarvestKeys { source } => commands::keys::harvest(&config, &source),
        Commands::DownloadAssets {
            catalog,
            packaged_root,
        } => commands::assets::handle(config, &catalog, packaged_root).await,
    }
}

fn load_config(path: Option<&Path>, branch: Option<Branch>) -> anyhow::Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    config.apply_env()?;
    if let Some(branch) = branch {
        config.branch = branch;
    }
    Ok(config)
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(err) = err.downcast_ref::<ProtocolError>() {
        return err.hint();
    }
    err.downcast_ref::<DecodeError>()
        .filter(|e| e.is_key_problem())
        .map(|_| "decode failed, check access keys")
}
