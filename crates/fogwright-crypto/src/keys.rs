//! Access key management
//!
//! Access keys are looked up by a string id: either the id embedded in an
//! asset-encrypted payload, or the `major.minor.patch_environment` id used for
//! dynamic asset downloads. Key material is kept in the base64 text form it
//! was harvested in; [`AccessKey::material`] decodes it for the cipher.
//!
//! The store is append-only and ordered by id, so persisted output is stable.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::ecb::KEY_SIZE;
use crate::error::CryptoError;
use crate::harvest::parse_access_keys;

/// An access key entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    /// Lookup id
    pub id: String,
    /// Key material as harvested (base64 text)
    pub key: String,
}

impl AccessKey {
    /// Create a new access key entry
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }

    /// Create an entry from raw 32-byte key material
    pub fn from_material(id: impl Into<String>, material: &[u8]) -> Self {
        Self::new(id, STANDARD.encode(material))
    }

    /// Decode the key material for use with the cipher
    pub fn material(&self) -> Result<Vec<u8>, CryptoError> {
        decode_material(&self.key)
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.key)
    }
}

/// Decode base64 key text into 32 bytes of key material
pub fn decode_material(key: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = STANDARD
        .decode(key.trim())
        .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid base64: {e}")))?;

    if bytes.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: bytes.len(),
        });
    }

    Ok(bytes)
}

/// Append-only store of access keys, ordered by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStore {
    keys: BTreeMap<String, String>,
}

impl KeyStore {
    /// Create an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up key text by id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.keys.get(id).map(String::as_str)
    }

    /// Look up a full entry by id
    pub fn get_key(&self, id: &str) -> Option<AccessKey> {
        self.get(id).map(|key| AccessKey::new(id, key))
    }

    /// Check whether an id is present
    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains_key(id)
    }

    /// Insert an entry unless its id is already present
    ///
    /// Returns `false` and leaves the existing material untouched when the id
    /// is known.
    pub fn insert(&mut self, key: AccessKey) -> bool {
        if self.keys.contains_key(&key.id) {
            return false;
        }
        self.keys.insert(key.id, key.key);
        true
    }

    /// Harvest keys from a section-delimited text resource
    ///
    /// Returns only the entries that were not already present. Running this
    /// twice on the same text returns nothing the second time.
    pub fn harvest(&mut self, text: &str, section: &str) -> Vec<AccessKey> {
        parse_access_keys(text, section)
            .into_iter()
            .filter(|key| self.insert(key.clone()))
            .collect()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over all keys in id order
    pub fn iter(&self) -> impl Iterator<Item = AccessKey> + '_ {
        self.keys.iter().map(|(id, key)| AccessKey::new(id, key))
    }
}

impl FromIterator<AccessKey> for KeyStore {
    fn from_iter<I: IntoIterator<Item = AccessKey>>(iter: I) -> Self {
        let mut store = Self::new();
        for key in iter {
            store.insert(key);
        }
        store
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_append_only() {
        let mut store = KeyStore::new();
        assert!(store.insert(AccessKey::new("8.1.0_live", "first")));
        assert!(!store.insert(AccessKey::new("8.1.0_live", "second")));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("8.1.0_live"), Some("first"));
    }

    #[test]
    fn test_iter_is_sorted_by_id() {
        let store: KeyStore = [
            AccessKey::new("8.1.0_ptb", "b"),
            AccessKey::new("7.4.0_live", "c"),
            AccessKey::new("8.1.0_live", "a"),
        ]
        .into_iter()
        .collect();

        let ids: Vec<String> = store.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec!["7.4.0_live", "8.1.0_live", "8.1.0_ptb"]);
    }

    #[test]
    fn test_lookup_miss() {
        let store = KeyStore::new();
        assert!(store.get("unknown").is_none());
        assert!(!store.contains("unknown"));
    }

    #[test]
    fn test_material_roundtrip() {
        let key = AccessKey::from_material("id", &[0xAB; 32]);
        assert_eq!(key.material().expect("valid material"), vec![0xAB; 32]);
    }

    #[test]
    fn test_material_wrong_size() {
        let key = AccessKey::new("id", STANDARD.encode([1u8; 16]));
        assert!(matches!(
            key.material(),
            Err(CryptoError::InvalidKeySize {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_material_not_base64() {
        let key = AccessKey::new("id", "not base64 at all!");
        assert!(matches!(key.material(), Err(CryptoError::InvalidKeyFormat(_))));
    }

    #[test]
    fn test_display() {
        let key = AccessKey::new("8.1.0_live", "AAAA");
        assert_eq!(key.to_string(), "8.1.0_live: AAAA");
    }
}
