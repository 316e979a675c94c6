//! Payload encoder, the inverse of [`LayeredDecoder`](super::LayeredDecoder)

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use fogwright_crypto::AccessKey;
use fogwright_crypto::obfuscation::{PROFILE_KEY, encode_key_id, encrypt_text, key_id_field_len};

use super::LayerTag;
use super::error::EncodeError;

/// Wraps text in encoding layers
///
/// Each call adds one layer on the outside, so the last call is the first
/// layer the decoder strips.
///
/// ```
/// use fogwright_formats::payload::{LayeredDecoder, PayloadBuilder};
/// use fogwright_crypto::KeyStore;
///
/// let payload = PayloadBuilder::new(r#"{"ok":true}"#)
///     .compress()?
///     .encrypt_profile()?
///     .build();
///
/// let keys = KeyStore::new();
/// let text = LayeredDecoder::new(&keys, "live").decode(&payload)?;
/// assert_eq!(text, r#"{"ok":true}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    payload: String,
}

impl PayloadBuilder {
    /// Start from terminal text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            payload: text.into(),
        }
    }

    /// Add a zlib layer around the current payload
    pub fn compress(self) -> Result<Self, EncodeError> {
        let utf16: Vec<u8> = self
            .payload
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        let expected = i32::try_from(utf16.len()).map_err(|_| EncodeError::TooLarge(utf16.len()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&utf16)?;
        let compressed = encoder.finish()?;

        let mut body = Vec::with_capacity(4 + compressed.len());
        body.extend_from_slice(&expected.to_le_bytes());
        body.extend_from_slice(&compressed);

        Ok(self.wrap(LayerTag::Compressed, &body))
    }

    /// Add a profile-encrypted layer around the current payload
    ///
    /// The payload must be NUL-free ASCII, which holds for any inner layer.
    pub fn encrypt_profile(self) -> Result<Self, EncodeError> {
        let body = encrypt_text(PROFILE_KEY, &self.payload)?;
        Ok(self.wrap(LayerTag::ProfileEncrypted, &body))
    }

    /// Add an asset-encrypted layer using `key`, embedding its id for `branch`
    pub fn encrypt_asset(self, branch: &str, key: &AccessKey) -> Result<Self, EncodeError> {
        let mut body = encode_key_id(&key.id, key_id_field_len(branch))?;
        body.extend(encrypt_text(&key.material()?, &self.payload)?);
        Ok(self.wrap(LayerTag::AssetEncrypted, &body))
    }

    /// Finish and return the payload text
    pub fn build(self) -> String {
        self.payload
    }

    fn wrap(self, tag: LayerTag, body: &[u8]) -> Self {
        let mut payload = String::from(tag.prefix());
        STANDARD.encode_string(body, &mut payload);
        Self { payload }
    }
}
