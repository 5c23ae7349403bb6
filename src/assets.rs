//! # Asset Collection
//!
//! Discovery of finished data products in a run directory. The pipeline
//! writes cleaned PSDs under `trigtime_*/post/clean/` with the detector
//! code embedded in the filename; a missing subtree means the run has not
//! produced anything yet and is never an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::constants::layout;

/// Data products collected from a run directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct Assets {
    /// Detector code to ASCII PSD path
    pub psds: BTreeMap<String, PathBuf>,

    /// Detector code to XML-converted PSD path
    #[serde(rename = "xml psds")]
    pub xml_psds: BTreeMap<String, PathBuf>,
}

impl Assets {
    /// The analysis is complete once at least one PSD exists
    pub fn is_complete(&self) -> bool {
        !self.psds.is_empty()
    }
}

/// Detector code embedded in an ASCII PSD filename, if it matches the
/// naming convention
pub fn detector_from_psd_name(name: &str) -> Option<String> {
    let stem = name.strip_prefix(layout::PSD_PREFIX)?;
    let detector = stem.strip_suffix(layout::PSD_EXTENSION)?;
    if detector.is_empty() {
        None
    } else {
        Some(detector.to_string())
    }
}

/// Path the XML-converted twin of an ASCII PSD lands at
pub fn xml_twin(ascii: &Path, detector: &str) -> PathBuf {
    ascii.with_file_name(format!("{detector}{}", layout::XML_PSD_SUFFIX))
}

/// Find every ASCII PSD under the run directory's trigger-time subtree
///
/// Returns `(detector, path)` pairs sorted by detector code; an absent or
/// empty run directory yields an empty list.
pub fn find_ascii_psds(rundir: &Path) -> Vec<(String, PathBuf)> {
    let mut found = Vec::new();
    if !rundir.is_dir() {
        return found;
    }
    for entry in WalkDir::new(rundir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(detector) = detector_from_psd_name(&name) else {
            continue;
        };
        if in_trigtime_post_clean(entry.path(), rundir) {
            found.push((detector, entry.path().to_path_buf()));
        }
    }
    found.sort();
    found
}

fn in_trigtime_post_clean(path: &Path, rundir: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    if !parent.ends_with(layout::POST_CLEAN) {
        return false;
    }
    let Ok(relative) = path.strip_prefix(rundir) else {
        return false;
    };
    relative.components().any(|component| {
        component
            .as_os_str()
            .to_string_lossy()
            .starts_with(layout::TRIGTIME_PREFIX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detector_extraction() {
        assert_eq!(
            detector_from_psd_name("glitch_median_PSD_forLI_H1.dat"),
            Some("H1".to_string())
        );
        assert_eq!(
            detector_from_psd_name("glitch_median_PSD_forLI_V1.dat"),
            Some("V1".to_string())
        );
        assert_eq!(detector_from_psd_name("glitch_median_PSD_forLI_.dat"), None);
        assert_eq!(detector_from_psd_name("signal_median_PSD_H1.dat"), None);
    }

    #[test]
    fn test_xml_twin_path() {
        let twin = xml_twin(
            Path::new("/run/trigtime_1/post/clean/glitch_median_PSD_forLI_H1.dat"),
            "H1",
        );
        assert_eq!(
            twin,
            Path::new("/run/trigtime_1/post/clean/H1_psd.xml.gz")
        );
    }

    #[test]
    fn test_find_ascii_psds() {
        let rundir = tempfile::tempdir().unwrap();
        let clean = rundir
            .path()
            .join("trigtime_1126259462.40")
            .join("post")
            .join("clean");
        fs::create_dir_all(&clean).unwrap();
        fs::write(clean.join("glitch_median_PSD_forLI_H1.dat"), "20.0 1e-23\n").unwrap();
        fs::write(clean.join("glitch_median_PSD_forLI_L1.dat"), "20.0 1e-23\n").unwrap();
        // Same name outside the post/clean subtree must be ignored
        fs::write(
            rundir.path().join("glitch_median_PSD_forLI_V1.dat"),
            "20.0 1e-23\n",
        )
        .unwrap();

        let found = find_ascii_psds(rundir.path());
        let detectors: Vec<&str> = found.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(detectors, vec!["H1", "L1"]);
    }

    #[test]
    fn test_missing_rundir_is_empty() {
        assert!(find_ascii_psds(Path::new("/nonexistent/rundir")).is_empty());
    }

    #[test]
    fn test_assets_serialize_with_host_keys() {
        let mut assets = Assets::default();
        assets
            .psds
            .insert("H1".to_string(), PathBuf::from("/run/psd.dat"));
        assert!(assets.is_complete());

        let value = serde_json::to_value(&assets).unwrap();
        assert!(value.get("psds").is_some());
        assert!(value.get("xml psds").is_some());
    }
}
