//! # Pipeline Plugin Contract
//!
//! The lifecycle surface the host drives adapters through. The host
//! serializes these calls per production; adapters provide no internal
//! serialization and must not be invoked concurrently for the same record.

use crate::assets::Assets;
use crate::error::Result;

/// What a resurrection attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResurrectOutcome {
    /// No rescue files present; the prior run needs no resurrection
    NothingToDo,
    /// Resubmitted from the most recent rescue file; cluster ids returned
    Resubmitted(Vec<u64>),
}

/// Host-facing lifecycle contract every pipeline adapter conforms to
pub trait Pipeline {
    /// Identifier productions declare to select this adapter
    fn name(&self) -> &'static str;

    /// Generate the workflow DAG via the external pipe tool
    ///
    /// `user` overrides the submitting identity; dry-run prints the
    /// would-be command without spawning anything.
    fn build_dag(&self, user: Option<&str>, dryrun: bool) -> Result<()>;

    /// Fix up generated submission files before handing them to the
    /// scheduler
    fn before_submit(&self) -> Result<()>;

    /// Submit the generated DAG; returns every cluster id the scheduler
    /// reported, first id recorded on the production
    fn submit_dag(&self, dryrun: bool) -> Result<Vec<u64>>;

    /// Gather finished data products from the run directory
    fn collect_assets(&self) -> Result<Assets>;

    /// Whether the analysis has produced its completion-defining assets
    fn detect_completion(&self) -> Result<bool>;

    /// Resubmit a failed run from its rescue files, within the retry budget
    fn resurrect(&self) -> Result<ResurrectOutcome>;

    /// Status fragment for the host's dashboard; empty unless finished
    fn html(&self) -> String;
}
