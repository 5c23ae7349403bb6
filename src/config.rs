//! # Adapter Configuration
//!
//! Typed view of the host's configuration sections, loaded through the
//! `config` crate: an optional `bayeswave-adapter.toml` file layered under
//! `BAYESWAVE_ADAPTER_*` environment overrides. Every section has a usable
//! default so the adapter can run against a bare deployment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Paths the host lays analyses out under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory new run directories default into
    pub rundir_default: PathBuf,
    /// Root of the host's result pages
    pub webroot: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            rundir_default: PathBuf::from("runs"),
            webroot: PathBuf::from("public"),
        }
    }
}

/// Location of the analysis toolchain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinesConfig {
    /// Environment prefix the external binaries are installed under
    pub environment: PathBuf,
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            environment: PathBuf::from("/usr"),
        }
    }
}

impl PipelinesConfig {
    /// Resolve an external executable inside the analysis environment
    pub fn executable(&self, name: &str) -> PathBuf {
        self.environment.join("bin").join(name)
    }

    /// Interpreter line generated helper scripts should carry
    pub fn shebang(&self) -> String {
        format!(
            "#!{}",
            self.executable(crate::constants::executables::PYTHON).display()
        )
    }
}

/// Batch-scheduler identity settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CondorConfig {
    /// Fallback submitting user when neither the caller nor the rendered
    /// configuration names one
    pub user: Option<String>,
}

/// Log-file destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
        }
    }
}

/// Artifact store root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("store"),
        }
    }
}

/// Full adapter configuration, one field per host section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub general: GeneralConfig,
    pub pipelines: PipelinesConfig,
    pub condor: CondorConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

impl AdapterConfig {
    /// Load `bayeswave-adapter.toml` from the working directory, if present,
    /// with `BAYESWAVE_ADAPTER_*` environment overrides on top
    pub fn load() -> Result<Self> {
        Self::load_from("bayeswave-adapter")
    }

    /// Load from an explicit file stem, environment overrides on top
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("BAYESWAVE_ADAPTER").separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
