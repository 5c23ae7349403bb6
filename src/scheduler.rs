//! # Scheduler Interaction
//!
//! Parsing and run-directory bookkeeping for the batch scheduler: cluster
//! ids scraped from the submission front-end's output, rescue files left
//! behind by failed runs, and flat scans over generated files.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::constants::{layout, markers};

/// Cluster ids in scheduler-submission output, in order of appearance
///
/// One id per submitted DAG; an empty result means the submission line
/// never appeared.
pub fn parse_cluster_ids(output: &str) -> Vec<u64> {
    let pattern = Regex::new(markers::CLUSTER_PATTERN).unwrap();
    pattern
        .captures_iter(output)
        .filter_map(|captures| captures[1].parse().ok())
        .collect()
}

/// Rescue files in the run directory, ordered by name
///
/// The scheduler numbers rescue files with an incrementing suffix, so
/// lexicographic order is chronological and the last entry is the most
/// recent attempt.
pub fn rescue_files(rundir: &Path) -> Vec<PathBuf> {
    let mut rescues: Vec<PathBuf> = list_files(rundir)
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().contains(layout::RESCUE_SEGMENT))
                .unwrap_or(false)
        })
        .collect();
    rescues.sort();
    rescues
}

/// Files directly under the run directory with the given extension
pub fn files_with_extension(rundir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = list_files(rundir)
        .into_iter()
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy() == extension)
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_cluster_id() {
        let output = "1 job(s) submitted to cluster 12345.";
        assert_eq!(parse_cluster_ids(output), vec![12345]);
    }

    #[test]
    fn test_parse_multiple_cluster_ids() {
        let output = "\
1 job(s) submitted to cluster 12345.
1 job(s) submitted to cluster 12346.";
        assert_eq!(parse_cluster_ids(output), vec![12345, 12346]);
    }

    #[test]
    fn test_parse_no_cluster_id() {
        assert!(parse_cluster_ids("ERROR: submission failed").is_empty());
    }

    #[test]
    fn test_rescue_files_sorted() {
        let rundir = tempfile::tempdir().unwrap();
        for name in ["multidag.dag.rescue002", "multidag.dag.rescue001"] {
            fs::write(rundir.path().join(name), "").unwrap();
        }
        fs::write(rundir.path().join("multidag.dag"), "").unwrap();

        let rescues = rescue_files(rundir.path());
        assert_eq!(rescues.len(), 2);
        assert!(rescues[0].ends_with("multidag.dag.rescue001"));
        assert!(rescues[1].ends_with("multidag.dag.rescue002"));
    }

    #[test]
    fn test_files_with_extension() {
        let rundir = tempfile::tempdir().unwrap();
        fs::write(rundir.path().join("b.sub"), "").unwrap();
        fs::write(rundir.path().join("a.sub"), "").unwrap();
        fs::write(rundir.path().join("setup.py"), "").unwrap();

        let subs = files_with_extension(rundir.path(), "sub");
        assert_eq!(subs.len(), 2);
        assert!(subs[0].ends_with("a.sub"));

        let scripts = files_with_extension(rundir.path(), "py");
        assert_eq!(scripts.len(), 1);
    }

    #[test]
    fn test_missing_rundir_is_empty() {
        assert!(rescue_files(Path::new("/nonexistent")).is_empty());
        assert!(files_with_extension(Path::new("/nonexistent"), "sub").is_empty());
    }
}
