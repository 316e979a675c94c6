//! Error types for cryptographic operations

use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key size
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Invalid key format
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Ciphertext is not a whole number of cipher blocks
    #[error("Invalid ciphertext length: {length} is not a multiple of {block_size}")]
    InvalidBlockLength {
        /// Ciphertext length in bytes
        length: usize,
        /// Cipher block size in bytes
        block_size: usize,
    },

    /// Key identifier does not fit the embedded key id field
    #[error("Key id '{key_id}' does not fit a {field_len}-byte key id field")]
    KeyIdTooLong {
        /// Offending key id
        key_id: String,
        /// Size of the embedded field in bytes
        field_len: usize,
    },

    /// Key store I/O error
    #[error("Key store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key store serialization error
    #[error("Key store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
