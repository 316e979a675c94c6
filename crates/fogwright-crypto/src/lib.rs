//! Cryptographic operations for the fogwright CDN client
//!
//! This crate provides the primitives the payload decoder depends on.
//!
//! # Components
//!
//! - **Cipher**: AES-256 in ECB mode without padding ([`AesEcbCipher`])
//! - **Obfuscation**: the byte shift applied to plaintext and embedded key ids
//! - **Key Management**: an append-only [`KeyStore`], harvesting from extracted
//!   configuration text, and JSON persistence ([`KeyStoreFile`])
//!
//! # Examples
//!
//! ## Harvesting Keys
//!
//! ```
//! use fogwright_crypto::KeyStore;
//!
//! let source = r#"
//! [AccessKeys]
//! +Keys=(KeyId="8.1.0_live",Key="AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=")
//! "#;
//!
//! let mut store = KeyStore::new();
//! assert_eq!(store.harvest(source, "[AccessKeys]").len(), 1);
//! assert!(store.harvest(source, "[AccessKeys]").is_empty());
//! ```
//!
//! ## Profile Payload Text
//!
//! ```
//! use fogwright_crypto::obfuscation::{PROFILE_KEY, decrypt_text, encrypt_text};
//!
//! let ciphertext = encrypt_text(PROFILE_KEY, "{}")?;
//! assert_eq!(decrypt_text(PROFILE_KEY, &ciphertext)?, "{}");
//! # Ok::<(), fogwright_crypto::CryptoError>(())
//! ```

#![warn(missing_docs)]

pub mod ecb;
pub mod error;
pub mod file_store;
pub mod harvest;
pub mod keys;
pub mod obfuscation;

pub use error::CryptoError;

// Re-export commonly used types
pub use ecb::AesEcbCipher;
pub use file_store::KeyStoreFile;
pub use keys::{AccessKey, KeyStore};
