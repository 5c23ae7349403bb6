#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # BayesWave Adapter
//!
//! Rust adapter that lets a workflow-orchestration host drive the external
//! BayesWave burst-analysis toolchain through its full job lifecycle:
//! configuration rendering, DAG generation, submission to the batch
//! scheduler, monitoring, and result collection.
//!
//! ## Overview
//!
//! The adapter contains no algorithmic core of its own. It translates
//! host-side metadata (event parameters, detector list, frequency cutoffs,
//! file paths) into command-line invocations of the external binaries,
//! scrapes their text output for success and failure markers, and maps
//! scheduler job identifiers and filesystem artifacts back into the host's
//! data model. The external tools — `bayeswave_pipe`, `condor_submit_dag`,
//! and `convert_psd_ascii2xml` — are black boxes resolved inside a
//! configured analysis environment.
//!
//! ## Module Organization
//!
//! - [`adapter`] - The [`BayesWave`] adapter bound to one production
//! - [`pipeline`] - The host-facing lifecycle contract
//! - [`production`] - Host-owned job records and their typed metadata
//! - [`assets`] - Data-product discovery in run directories
//! - [`psd`] - ASCII PSD tables and line suppression
//! - [`scheduler`] - Cluster-id scraping and rescue-file bookkeeping
//! - [`process`] - Blocking external-tool invocation
//! - [`store`] - Filesystem artifact store
//! - [`config`] - Typed adapter configuration
//! - [`constants`] - Toolchain names, markers, and filename conventions
//! - [`error`] - Structured error handling
//! - [`logging`] - Console and file tracing setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bayeswave_adapter::{AdapterConfig, BayesWave, Pipeline};
//! use bayeswave_adapter::production::{Event, Production, ProductionMeta, Repository};
//!
//! # fn example(meta: ProductionMeta) -> Result<(), Box<dyn std::error::Error>> {
//! let event = Event::new("GW150914", Repository::new("/data/repositories/GW150914"));
//! let production = Production::new(
//!     "Prod0", "bayeswave", "analyses", "/data/runs/GW150914/Prod0", meta, event,
//! );
//!
//! let adapter = BayesWave::new(production.into_shared(), AdapterConfig::load()?)?;
//! adapter.build_dag(None, false)?;
//! adapter.before_submit()?;
//! let cluster_ids = adapter.submit_dag(false)?;
//! println!("running as cluster {}", cluster_ids[0]);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod assets;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod production;
pub mod psd;
pub mod scheduler;
pub mod store;

pub use adapter::BayesWave;
pub use assets::Assets;
pub use config::AdapterConfig;
pub use constants::PIPELINE_NAME;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, ResurrectOutcome};
pub use production::{JobStatus, Production, SharedProduction};
