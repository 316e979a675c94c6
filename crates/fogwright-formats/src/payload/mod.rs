//! Layered CDN payload encoding
//!
//! CDN documents arrive as text. A payload either starts with one of three
//! 8-character layer tags, or it is terminal and must be empty or JSON:
//!
//! | Tag | Layer | Body |
//! |---|---|---|
//! | `DbdDAgAC` | asset-encrypted | base64(key id field + AES-ECB ciphertext) |
//! | `DbdDAQEB` | profile-encrypted | base64(AES-ECB ciphertext, fixed key) |
//! | `DbdDAwAC` | zlib-compressed | base64(i32 LE inflated length + zlib(UTF-16LE text)) |
//!
//! Each layer unwraps to another payload. Layers stack in any order.

mod builder;
mod decoder;
mod error;

pub use builder::PayloadBuilder;
pub use decoder::{DEFAULT_MAX_LAYERS, LayeredDecoder, MAX_INFLATED_SIZE};
pub use error::{DecodeError, DecodeResult, EncodeError};

use std::fmt;

/// Length of every layer tag
pub const TAG_LEN: usize = 8;

/// Encoding layer identified by a payload prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerTag {
    /// Encrypted with an access key looked up by an embedded id
    AssetEncrypted,
    /// Encrypted with the fixed profile key
    ProfileEncrypted,
    /// Zlib-compressed UTF-16LE text
    Compressed,
}

impl LayerTag {
    /// All tags in detection order
    pub const ALL: [Self; 3] = [Self::AssetEncrypted, Self::ProfileEncrypted, Self::Compressed];

    /// Literal prefix of the layer
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::AssetEncrypted => "DbdDAgAC",
            Self::ProfileEncrypted => "DbdDAQEB",
            Self::Compressed => "DbdDAwAC",
        }
    }

    /// Detect the outermost layer of a payload
    ///
    /// Returns `None` for terminal payloads.
    pub fn detect(payload: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| payload.starts_with(tag.prefix()))
    }
}

impl fmt::Display for LayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetEncrypted => write!(f, "asset-encrypted"),
            Self::ProfileEncrypted => write!(f, "profile-encrypted"),
            Self::Compressed => write!(f, "zlib"),
        }
    }
}
