//! Resolved-version record
//!
//! ```json
//! { "latestVersion": "8.1.0_2047380live", "resolvedAt": 1720000000 }
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub latest_version: String,

    /// Unix seconds
    #[serde(default)]
    pub resolved_at: u64,
}

impl VersionRecord {
    /// Record `version` as resolved now
    pub fn now(version: impl Into<String>) -> Self {
        let resolved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            latest_version: version.into(),
            resolved_at,
        }
    }

    /// Load the record, `None` when nothing was resolved yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Write the record atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)
    }
}

/// Write `data` to a uniquely named sibling, then rename it into place
///
/// Concurrent writers of the same path never share a temporary file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_record() {
        let dir = TempDir::new().expect("temp dir");
        let record = VersionRecord::load(&dir.path().join("state.json")).expect("load");
        assert!(record.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("state.json");

        let record = VersionRecord::now("8.1.0_live");
        record.save(&path).expect("save");

        let loaded = VersionRecord::load(&path).expect("load").expect("present");
        assert_eq!(loaded, record);
        let leftovers = fs::read_dir(dir.path().join("nested")).expect("read dir").count();
        assert_eq!(leftovers, 1);

        let json = fs::read_to_string(&path).expect("read");
        assert!(json.contains("\"latestVersion\""));
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("asset.png");
        write_atomic(&path, b"one").expect("write");
        write_atomic(&path, b"two").expect("write");
        assert_eq!(fs::read(&path).expect("read"), b"two");
    }

    #[test]
    fn test_atomic_write_concurrent_same_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("shared.png");

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u8)
                .map(|i| {
                    let path = &path;
                    scope.spawn(move || write_atomic(path, &[i; 64]))
                })
                .collect();
            for handle in handles {
                handle.join().expect("writer thread").expect("write");
            }
        });

        let written = fs::read(&path).expect("read");
        assert_eq!(written.len(), 64);
        assert!(written.iter().all(|b| *b == written[0]));
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 1);
    }
}
