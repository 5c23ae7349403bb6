//! Shared fixtures for the lifecycle tests: a production record factory
//! and a fake analysis environment whose `bin/` holds stub shell scripts
//! standing in for the external toolchain.

#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

use tempfile::TempDir;

use bayeswave_adapter::config::{AdapterConfig, PipelinesConfig, StorageConfig};
use bayeswave_adapter::production::{Event, Production, ProductionMeta, Repository};

/// Serializes tests that change the process working directory
pub fn cwd_guard() -> MutexGuard<'static, ()> {
    static CWD_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    CWD_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Metadata mirroring a typical host record for a two-detector event
pub fn sample_meta() -> ProductionMeta {
    serde_json::from_value(serde_json::json!({
        "event time": 1126259462.4,
        "interferometers": ["H1", "L1"],
        "likelihood": {
            "sample rate": 2048,
            "segment length": 8.0,
            "segment start": -4.0
        },
        "data": {
            "channels": {
                "H1": "H1:GDS-CALIB_STRAIN",
                "L1": "L1:GDS-CALIB_STRAIN"
            },
            "frame types": {
                "H1": "H1_HOFT_C00",
                "L1": "L1_HOFT_C00"
            },
            "cache files": {},
            "segment length": 8.0
        },
        "quality": {
            "minimum frequency": {"H1": 20.0, "L1": 20.0}
        },
        "scheduler": {
            "accounting group": "ligo.dev.o4.burst.paramest.bayeswave"
        }
    }))
    .expect("sample metadata deserializes")
}

/// A wait-status production bound to the given run and repository dirs
pub fn make_production(rundir: &Path, repository_dir: &Path) -> Production {
    let event = Event::new("GW150914", Repository::new(repository_dir));
    Production::new(
        "Prod0",
        "bayeswave",
        "analyses",
        rundir,
        sample_meta(),
        event,
    )
}

/// Fake analysis environment: a tempdir whose `bin/` the adapter resolves
/// external executables from
pub struct FakeToolchain {
    root: TempDir,
}

impl FakeToolchain {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("toolchain tempdir");
        fs::create_dir_all(root.path().join("bin")).expect("toolchain bin dir");
        Self { root }
    }

    /// Install a stub executable under `bin/`
    pub fn install(&self, name: &str, body: &str) {
        let path = self.root.path().join("bin").join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
        let mut permissions = fs::metadata(&path).expect("stub metadata").permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).expect("make stub executable");
    }

    /// Adapter configuration pointing at this environment
    pub fn config(&self, storage_dir: &Path) -> AdapterConfig {
        AdapterConfig {
            pipelines: PipelinesConfig {
                environment: self.root.path().to_path_buf(),
            },
            storage: StorageConfig {
                directory: storage_dir.to_path_buf(),
            },
            ..AdapterConfig::default()
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}
