//! # Error Types
//!
//! Structured error handling for the adapter. External-tool failures carry
//! the captured process output so the host can surface it for diagnosis.

/// Errors raised while driving a production through the pipeline lifecycle
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The job record names a different pipeline than this adapter
    #[error("Pipeline mismatch: expected '{expected}', production declares '{found}'")]
    PipelineMismatch { expected: String, found: String },

    /// The DAG generator finished without printing its submission marker
    #[error("DAG file could not be created.\n{output}")]
    DagCreation { output: String },

    /// The scheduler front-end printed no parsable cluster id
    #[error("DAG file could not be submitted.\n{output}")]
    DagSubmission { output: String },

    /// The ASCII to XML PSD converter wrote to stderr
    #[error("XML format PSD could not be created.\n{stderr}")]
    PsdConversion { stderr: String },

    /// Five or more rescue files are present; resubmission is refused
    #[error("Resurrection refused: {attempts} rescue files exceed the retry budget")]
    RetryBudgetExhausted { attempts: usize },

    /// A required key is absent from the production's metadata
    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    /// An operation needs a data product the run has not produced
    #[error("No ASCII PSD found for detector '{detector}'")]
    AssetNotFound { detector: String },

    /// A PSD table on disk did not parse as two numeric columns
    #[error("Malformed PSD table {path}: {reason}")]
    PsdFormat { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
