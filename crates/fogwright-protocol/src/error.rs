//! Error types for protocol operations

use fogwright_crypto::CryptoError;
use fogwright_formats::{CatalogError, DecodeError};
use reqwest::StatusCode;
use thiserror::Error;

/// Invalid or incomplete configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown branch '{0}'")]
    UnknownBranch(String),

    #[error("no root path configured for branch '{0}'")]
    MissingBranchRoot(String),

    #[error("no API endpoint registered as '{0}'")]
    MissingApiEndpoint(String),

    #[error("no static CDN endpoint registered as '{0}'")]
    MissingStaticEndpoint(String),

    #[error("no dynamic CDN endpoint family registered as '{0}'")]
    MissingDynamicFamily(String),

    #[error("required value '{0}' is empty")]
    EmptyValue(&'static str),

    #[error("no content version resolved and no override set")]
    NoVersion,

    #[error("cannot derive version and environment from '{0}'")]
    UnrecognizedApiVersion(String),

    #[error("maxConcurrent must be at least 1")]
    ZeroConcurrency,

    #[error("cannot read configuration: {0}")]
    Read(#[source] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Key store error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("No access key for '{0}'")]
    UnknownKey(String),

    #[error("Version resolution failed: {0}")]
    VersionResolution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ProtocolError {
    /// Actionable hint for a terminal error message
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Decode(e) if e.is_key_problem() => Some("decode failed, check access keys"),
            Self::Decode(_) | Self::UnknownKey(_) => Some("check access keys"),
            Self::VersionResolution(_) | Self::Config(ConfigError::NoVersion) => {
                Some("failed to determine version")
            }
            _ => None,
        }
    }

    /// Whether the error comes from the network rather than local state
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        let err = ProtocolError::Decode(DecodeError::UnknownKey {
            key_id: "8.1.0_live".to_string(),
        });
        assert_eq!(err.hint(), Some("decode failed, check access keys"));

        let err = ProtocolError::UnknownKey("8.1.0_live".to_string());
        assert_eq!(err.hint(), Some("check access keys"));

        let err = ProtocolError::VersionResolution("no candidates".to_string());
        assert_eq!(err.hint(), Some("failed to determine version"));

        assert_eq!(ProtocolError::Cancelled.hint(), None);
    }

    #[test]
    fn test_config_error_converts() {
        let err: ProtocolError = ConfigError::MissingBranchRoot("qa".to_string()).into();
        assert!(matches!(err, ProtocolError::Config(_)));
        assert!(!err.is_network());
    }
}
