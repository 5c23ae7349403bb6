//! # Pipeline Constants
//!
//! Executable names, output markers, and filename conventions that define
//! the adapter's contract with the external BayesWave toolchain and the
//! batch scheduler. These values are dictated by the external tools and the
//! host's status vocabulary; they are not tunable at runtime.

// Re-export the status type for convenience
pub use crate::production::JobStatus;

/// Name this adapter answers to in job records
pub const PIPELINE_NAME: &str = "bayeswave";

/// External executables, resolved as `<environment>/bin/<name>`
pub mod executables {
    /// DAG generator for the analysis workflow
    pub const PIPE: &str = "bayeswave_pipe";

    /// Batch-scheduler submission front-end
    pub const SUBMIT_DAG: &str = "condor_submit_dag";

    /// ASCII to XML PSD converter
    pub const PSD_CONVERTER: &str = "convert_psd_ascii2xml";

    /// Interpreter for generated helper scripts
    pub const PYTHON: &str = "python";
}

/// Text markers scraped from external-tool output
pub mod markers {
    /// Printed by the DAG generator once the DAG is ready to submit
    pub const DAG_READY: &str = "condor_submit";

    /// Scheduler submission line; trailing integers are cluster ids
    pub const CLUSTER_PATTERN: &str = r"submitted to cluster (\d+)";
}

/// Generated-file fixups applied before submission
pub mod fixups {
    /// Resource request inserted into submit files that lack one
    pub const REQUEST_DISK_LINE: &str = "request_disk = 64M";

    /// Attribute whose presence means a submit file needs no fixup
    pub const REQUEST_DISK_KEY: &str = "request_disk";

    /// Submit-file directive the resource request is inserted before
    pub const QUEUE_DIRECTIVE: &str = "queue";

    /// Stale interpreter line rewritten to the analysis environment's python
    pub const STALE_SHEBANG: &str = "#!/usr/bin/env python";
}

/// Run-directory filename conventions
pub mod layout {
    /// DAG file produced by the generator, relative to the run directory
    pub const DAG_FILE: &str = "multidag.dag";

    /// Subtree holding post-processed data products
    pub const POST_CLEAN: &str = "post/clean";

    /// Trigger-time directory prefix under the run directory
    pub const TRIGTIME_PREFIX: &str = "trigtime_";

    /// ASCII PSD filename prefix; the detector code follows it
    pub const PSD_PREFIX: &str = "glitch_median_PSD_forLI_";

    /// ASCII PSD filename extension
    pub const PSD_EXTENSION: &str = ".dat";

    /// Suffix of the XML-converted PSD, appended to the detector code
    pub const XML_PSD_SUFFIX: &str = "_psd.xml.gz";

    /// Rescue-file name segment left behind by a failed scheduler run
    pub const RESCUE_SEGMENT: &str = ".rescue";
}

/// Most prior rescue files tolerated before resurrection is refused
pub const MAX_RESCUE_ATTEMPTS: usize = 4;

/// Status groupings for lifecycle decisions
pub mod status_groups {
    use super::JobStatus;

    /// Statuses under which the scheduler may still hold the job
    pub const ACTIVE_STATES: &[JobStatus] = &[JobStatus::Running, JobStatus::Stuck];

    /// Statuses from which no further lifecycle calls are expected
    pub const FINAL_STATES: &[JobStatus] = &[
        JobStatus::Finished,
        JobStatus::Uploaded,
        JobStatus::Cancelled,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_groups() {
        assert!(status_groups::ACTIVE_STATES.contains(&JobStatus::Running));
        assert!(status_groups::ACTIVE_STATES.contains(&JobStatus::Stuck));
        assert!(!status_groups::ACTIVE_STATES.contains(&JobStatus::Wait));

        assert!(status_groups::FINAL_STATES.contains(&JobStatus::Finished));
        assert!(status_groups::FINAL_STATES.contains(&JobStatus::Uploaded));
        assert!(!status_groups::FINAL_STATES.contains(&JobStatus::Running));
    }

    #[test]
    fn test_rescue_budget() {
        assert_eq!(MAX_RESCUE_ATTEMPTS, 4);
    }
}
