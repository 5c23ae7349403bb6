//! # Production Records
//!
//! The host-owned data model the adapter binds to: a production (one
//! analysis job), its typed metadata, the event it belongs to, and the
//! event's artifact repository. The host creates and destroys these
//! records; the adapter holds a shared handle and mutates status, job id,
//! and one derived metadata key through it.
//!
//! Metadata keys keep the host's spaced spelling (`event time`,
//! `minimum frequency`) through serde renames so records serialize
//! byte-compatibly with the host's ledger.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Shared handle to a host-owned production record
pub type SharedProduction = Arc<Mutex<Production>>;

/// Lifecycle status vocabulary owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Wait,
    Ready,
    Running,
    Stuck,
    Finished,
    Uploaded,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Wait => "wait",
            JobStatus::Ready => "ready",
            JobStatus::Running => "running",
            JobStatus::Stuck => "stuck",
            JobStatus::Finished => "finished",
            JobStatus::Uploaded => "uploaded",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Check if the scheduler may still hold a job for this status
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Running | JobStatus::Stuck)
    }

    /// Check if no further lifecycle calls are expected
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Uploaded | JobStatus::Cancelled
        )
    }
}

/// Sampling and segmentation settings for the likelihood evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodMeta {
    #[serde(rename = "sample rate")]
    pub sample_rate: u32,
    #[serde(rename = "segment length")]
    pub segment_length: f64,
    #[serde(rename = "segment start")]
    pub segment_start: f64,
}

/// Strain-data provenance per detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMeta {
    #[serde(default)]
    pub channels: BTreeMap<String, String>,
    #[serde(rename = "frame types", default)]
    pub frame_types: BTreeMap<String, String>,
    #[serde(rename = "cache files", default)]
    pub cache_files: BTreeMap<String, PathBuf>,
    #[serde(rename = "segment length", default)]
    pub segment_length: f64,
}

/// Data-quality thresholds per detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMeta {
    #[serde(rename = "minimum frequency", default)]
    pub minimum_frequency: BTreeMap<String, f64>,

    /// Derived at adapter construction; `None` until then
    #[serde(rename = "lowest minimum frequency", skip_serializing_if = "Option::is_none")]
    pub lowest_minimum_frequency: Option<f64>,
}

impl QualityMeta {
    /// Minimum across all per-detector minimum frequencies
    pub fn lowest(&self) -> Option<f64> {
        self.minimum_frequency
            .values()
            .copied()
            .fold(None, |acc, f| Some(acc.map_or(f, |a: f64| a.min(f))))
    }
}

/// Batch-scheduler accounting settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerMeta {
    #[serde(rename = "accounting group", default)]
    pub accounting_group: String,
}

/// Full metadata mapping carried by a production record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionMeta {
    #[serde(rename = "event time")]
    pub event_time: f64,
    pub interferometers: Vec<String>,
    pub likelihood: LikelihoodMeta,
    #[serde(default)]
    pub data: DataMeta,
    #[serde(default)]
    pub quality: QualityMeta,
    #[serde(default)]
    pub scheduler: SchedulerMeta,
}

/// One artifact registered against an event's repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryFile {
    pub category: String,
    pub production: String,
    pub path: PathBuf,
    pub added_at: DateTime<Utc>,
}

/// Artifact repository attached to an event
///
/// Registered files are copied under `<directory>/<category>/<production>/`
/// and recorded in order of arrival.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub directory: PathBuf,
    files: Vec<RepositoryFile>,
}

impl Repository {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            files: Vec::new(),
        }
    }

    /// Copy `source` into the repository and record it
    pub fn add_file(&mut self, category: &str, production: &str, source: &Path) -> Result<PathBuf> {
        let target_dir = self.directory.join(category).join(production);
        fs::create_dir_all(&target_dir)?;
        let file_name = source
            .file_name()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"))?;
        let target = target_dir.join(file_name);
        fs::copy(source, &target)?;
        self.files.push(RepositoryFile {
            category: category.to_string(),
            production: production.to_string(),
            path: target.clone(),
            added_at: Utc::now(),
        });
        Ok(target)
    }

    /// Files registered so far, in order of arrival
    pub fn files(&self) -> &[RepositoryFile] {
        &self.files
    }
}

/// The astrophysical event a production analyses
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub repository: Repository,
}

impl Event {
    pub fn new(name: impl Into<String>, repository: Repository) -> Self {
        Self {
            name: name.into(),
            repository,
        }
    }
}

/// Rendered pipeline configuration for one production
///
/// The host renders the analysis ini file into the event repository; this
/// is the adapter-facing view of that artifact.
#[derive(Debug, Clone)]
pub struct PipelineConfiguration {
    pub ini_loc: PathBuf,
    user: Option<String>,
}

impl PipelineConfiguration {
    pub fn new(ini_loc: impl Into<PathBuf>) -> Self {
        Self {
            ini_loc: ini_loc.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Submitting user recorded in the rendered configuration, if any
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// One analysis job owned by the host
#[derive(Debug, Clone)]
pub struct Production {
    pub name: String,
    pub pipeline: String,
    pub category: String,
    pub status: JobStatus,
    pub rundir: PathBuf,
    pub job_id: Option<u64>,
    pub meta: ProductionMeta,
    pub event: Event,
    user: Option<String>,
}

impl Production {
    pub fn new(
        name: impl Into<String>,
        pipeline: impl Into<String>,
        category: impl Into<String>,
        rundir: impl Into<PathBuf>,
        meta: ProductionMeta,
        event: Event,
    ) -> Self {
        Self {
            name: name.into(),
            pipeline: pipeline.into(),
            category: category.into(),
            status: JobStatus::Wait,
            rundir: rundir.into(),
            job_id: None,
            meta,
            event,
            user: None,
        }
    }

    /// Record the identity the analysis should be submitted under
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    /// Rendered configuration for this production
    ///
    /// The ini lives in the event repository under this production's
    /// category, named after the production itself.
    pub fn get_configuration(&self) -> PipelineConfiguration {
        let ini_loc = self
            .event
            .repository
            .directory
            .join(&self.category)
            .join(format!("{}.ini", self.name));
        let configuration = PipelineConfiguration::new(ini_loc);
        match &self.user {
            Some(user) => configuration.with_user(user.clone()),
            None => configuration,
        }
    }

    /// Wrap this record in the shared handle the adapter binds to
    pub fn into_shared(self) -> SharedProduction {
        Arc::new(Mutex::new(self))
    }
}
