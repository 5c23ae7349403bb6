//! # Artifact Store
//!
//! Filesystem store for analysis data products that outlive a run
//! directory. Artifacts are copied under `<root>/<event>/<production>/` and
//! recorded in a JSON manifest at the store root. The host is the only
//! writer and serializes access, so the manifest is plain read-modify-write.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

const MANIFEST: &str = "manifest.json";

/// One stored artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub event: String,
    pub production: String,
    pub path: PathBuf,
    pub stored_at: DateTime<Utc>,
}

/// Store rooted at the configured storage directory
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy an artifact into the store and record it in the manifest
    pub fn add_file(&self, event: &str, production: &str, source: &Path) -> Result<PathBuf> {
        let target_dir = self.root.join(event).join(production);
        fs::create_dir_all(&target_dir)?;
        let file_name = source
            .file_name()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"))?;
        let target = target_dir.join(file_name);
        fs::copy(source, &target)?;

        let mut entries = self.entries()?;
        entries.push(StoreEntry {
            event: event.to_string(),
            production: production.to_string(),
            path: target.clone(),
            stored_at: Utc::now(),
        });
        let manifest = serde_json::to_string_pretty(&entries)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.root.join(MANIFEST), manifest)?;

        info!(
            event = %event,
            production = %production,
            path = %target.display(),
            "artifact stored"
        );
        Ok(target)
    }

    /// Manifest entries recorded so far; empty for a fresh store
    pub fn entries(&self) -> Result<Vec<StoreEntry>> {
        let manifest = self.root.join(MANIFEST);
        if !manifest.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(manifest)?;
        let entries = serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_copies_and_records() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("psd.dat");
        fs::write(&source, "2.0e+01 1.0e-23\n").unwrap();

        let store = Store::new(scratch.path().join("store"));
        let stored = store.add_file("GW150914", "Prod0", &source).unwrap();

        assert!(stored.ends_with("GW150914/Prod0/psd.dat"));
        assert_eq!(fs::read_to_string(&stored).unwrap(), "2.0e+01 1.0e-23\n");

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "GW150914");
        assert_eq!(entries[0].production, "Prod0");
    }

    #[test]
    fn test_fresh_store_has_no_entries() {
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::new(scratch.path().join("store"));
        assert!(store.entries().unwrap().is_empty());
    }
}
