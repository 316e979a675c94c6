//! Payload decode and encode error types

use fogwright_crypto::CryptoError;
use thiserror::Error;

use super::LayerTag;

/// Error raised while unwrapping a payload
///
/// Every variant is fatal for the payload being decoded. None of them are
/// retried and no partial output is ever returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The key id embedded in an asset-encrypted layer is not in the key store
    #[error("unknown access key id '{key_id}'")]
    UnknownKey {
        /// Decoded key id
        key_id: String,
    },

    /// Inflated size differs from the size recorded in the layer header
    #[error("inflated length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Length recorded in the layer
        expected: i32,
        /// Length actually inflated
        actual: usize,
    },

    /// The terminal text is not JSON
    ///
    /// The cipher has no integrity check, so this is the only symptom of a
    /// wrong key or corrupted upstream data.
    #[error("decoded text is not valid JSON (invalid key or corrupt data): {0}")]
    InvalidKeyOrCorruptData(#[source] serde_json::Error),

    /// More layers than the decoder allows
    #[error("payload exceeds the maximum of {max} encoding layers")]
    TooManyLayers {
        /// Configured maximum
        max: usize,
    },

    /// Layer body is not valid base64
    #[error("{layer} layer is not valid base64: {source}")]
    Base64 {
        /// Layer being decoded
        layer: LayerTag,
        /// Underlying error
        #[source]
        source: base64::DecodeError,
    },

    /// Layer body is shorter than its fixed header
    #[error("{layer} layer truncated: need at least {needed} bytes, got {actual}")]
    Truncated {
        /// Layer being decoded
        layer: LayerTag,
        /// Minimum size
        needed: usize,
        /// Actual size
        actual: usize,
    },

    /// Zlib stream could not be inflated
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Inflated bytes are not UTF-16LE text
    #[error("inflated data is not valid UTF-16LE")]
    InvalidUtf16,

    /// Key material or ciphertext rejected by the cipher
    #[error("cipher error: {0}")]
    Cipher(#[from] CryptoError),
}

impl DecodeError {
    /// Whether the failure points at missing or wrong access keys
    pub fn is_key_problem(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey { .. } | Self::InvalidKeyOrCorruptData(_) | Self::Cipher(_)
        )
    }
}

/// Error raised while wrapping a payload
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Encryption failed
    #[error("encryption failed: {0}")]
    Crypto(#[from] CryptoError),

    /// Compression failed
    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// UTF-16 form is too large for the 32-bit length header
    #[error("payload of {0} bytes is too large to compress")]
    TooLarge(usize),
}

/// Result type for payload decoding
pub type DecodeResult<T> = Result<T, DecodeError>;
