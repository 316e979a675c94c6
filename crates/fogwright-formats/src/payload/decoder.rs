//! Recursive payload decoder

use std::borrow::Cow;
use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::ZlibDecoder;
use fogwright_crypto::KeyStore;
use fogwright_crypto::keys::decode_material;
use fogwright_crypto::obfuscation::{PROFILE_KEY, decode_key_id, decrypt_text, key_id_field_len};

use super::error::{DecodeError, DecodeResult};
use super::{LayerTag, TAG_LEN};

/// Maximum number of layers unwrapped before giving up
///
/// Real traffic has been seen with two or three stacked layers. The actual
/// upper bound used upstream is unknown.
pub const DEFAULT_MAX_LAYERS: usize = 5;

/// Maximum inflated size of a single compressed layer (256 MB)
pub const MAX_INFLATED_SIZE: usize = 256 * 1024 * 1024;

/// Unwraps encoding layers until JSON text remains
///
/// The decoder borrows the key store; asset-encrypted layers look their key
/// up by the id embedded in the payload, whose field width depends on the
/// branch name.
#[derive(Debug, Clone, Copy)]
pub struct LayeredDecoder<'a> {
    keys: &'a KeyStore,
    branch: &'a str,
    max_layers: usize,
}

impl<'a> LayeredDecoder<'a> {
    /// Create a decoder for `branch`
    pub fn new(keys: &'a KeyStore, branch: &'a str) -> Self {
        Self {
            keys,
            branch,
            max_layers: DEFAULT_MAX_LAYERS,
        }
    }

    /// Override the layer limit
    #[must_use]
    pub fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = max_layers;
        self
    }

    /// Decode a payload down to its terminal text
    ///
    /// Returns the empty string for an empty payload, otherwise text that
    /// parses as JSON.
    pub fn decode(&self, payload: &str) -> DecodeResult<String> {
        let mut current = Cow::Borrowed(payload);
        let mut layers = 0;

        while let Some(tag) = LayerTag::detect(&current) {
            if layers == self.max_layers {
                return Err(DecodeError::TooManyLayers {
                    max: self.max_layers,
                });
            }
            layers += 1;

            let body = base64_body(tag, &current[TAG_LEN..])?;
            let next = match tag {
                LayerTag::AssetEncrypted => self.decrypt_asset(&body)?,
                LayerTag::ProfileEncrypted => decrypt_text(PROFILE_KEY, &body)?,
                LayerTag::Compressed => inflate_utf16(&body)?,
            };
            current = Cow::Owned(next);
        }

        check_terminal(&current)?;
        Ok(current.into_owned())
    }

    fn decrypt_asset(&self, body: &[u8]) -> DecodeResult<String> {
        let field_len = key_id_field_len(self.branch);
        if body.len() < field_len {
            return Err(DecodeError::Truncated {
                layer: LayerTag::AssetEncrypted,
                needed: field_len,
                actual: body.len(),
            });
        }

        let (field, ciphertext) = body.split_at(field_len);
        let key_id = decode_key_id(field);
        let key = self
            .keys
            .get(&key_id)
            .ok_or(DecodeError::UnknownKey { key_id })?;

        let material = decode_material(key)?;
        Ok(decrypt_text(&material, ciphertext)?)
    }
}

fn base64_body(layer: LayerTag, body: &str) -> DecodeResult<Vec<u8>> {
    STANDARD
        .decode(body.trim())
        .map_err(|source| DecodeError::Base64 { layer, source })
}

fn inflate_utf16(body: &[u8]) -> DecodeResult<String> {
    if body.len() < 4 {
        return Err(DecodeError::Truncated {
            layer: LayerTag::Compressed,
            needed: 4,
            actual: body.len(),
        });
    }

    let expected = i32::from_le_bytes([body[0], body[1], body[2], body[3]]);

    let mut decoder = ZlibDecoder::new(&body[4..]);
    let mut inflated = Vec::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = decoder
            .read(&mut buffer)
            .map_err(|e| DecodeError::Decompression(format!("zlib inflate failed: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        if inflated.len() + bytes_read > MAX_INFLATED_SIZE {
            return Err(DecodeError::Decompression(format!(
                "inflated size exceeds limit of {MAX_INFLATED_SIZE} bytes"
            )));
        }

        inflated.extend_from_slice(&buffer[..bytes_read]);
    }

    if usize::try_from(expected).ok() != Some(inflated.len()) {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: inflated.len(),
        });
    }

    if inflated.len() % 2 != 0 {
        return Err(DecodeError::InvalidUtf16);
    }

    let units: Vec<u16> = inflated
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16)
}

fn check_terminal(text: &str) -> DecodeResult<()> {
    if text.is_empty() {
        return Ok(());
    }

    serde_json::from_str::<serde::de::IgnoredAny>(text)
        .map(|_| ())
        .map_err(DecodeError::InvalidKeyOrCorruptData)
}
