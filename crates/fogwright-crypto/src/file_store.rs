//! JSON file persistence for the access key store
//!
//! The file holds every key sorted by id:
//!
//! ```json
//! { "keys": [ { "id": "8.1.0_live", "key": "..." } ] }
//! ```
//!
//! Writes go to a temporary sibling first and are renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::keys::{AccessKey, KeyStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyStoreDocument {
    #[serde(default)]
    keys: Vec<AccessKey>,
}

/// Key store backed by a JSON file
#[derive(Debug)]
pub struct KeyStoreFile {
    path: PathBuf,
    store: KeyStore,
}

impl KeyStoreFile {
    /// Open a key store file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CryptoError> {
        let path = path.into();
        let store = if path.exists() {
            let json = fs::read_to_string(&path)?;
            let document: KeyStoreDocument = serde_json::from_str(&json)?;
            document.keys.into_iter().collect()
        } else {
            KeyStore::new()
        };

        Ok(Self { path, store })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded keys
    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    /// Consume the file handle and keep the keys
    pub fn into_store(self) -> KeyStore {
        self.store
    }

    /// Harvest keys from `text` and persist when anything new was found
    pub fn harvest_and_save(
        &mut self,
        text: &str,
        section: &str,
    ) -> Result<Vec<AccessKey>, CryptoError> {
        let new_keys = self.store.harvest(text, section);
        if !new_keys.is_empty() {
            self.save()?;
        }
        Ok(new_keys)
    }

    /// Write the full key set, sorted by id
    pub fn save(&self) -> Result<(), CryptoError> {
        let document = KeyStoreDocument {
            keys: self.store.iter().collect(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
