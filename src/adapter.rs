//! # BayesWave Adapter
//!
//! The adapter that binds one production record to the external BayesWave
//! toolchain and carries it through the lifecycle: DAG generation,
//! submission-file fixups, scheduler submission, asset collection, bounded
//! resurrection, and the dashboard status fragment.
//!
//! Everything here is glue: command vectors in, captured text out. Success
//! and failure of the external tools are judged from marker strings in
//! their output, matching the toolchain's observed behavior; exit codes
//! are logged but not trusted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::assets::{find_ascii_psds, xml_twin, Assets};
use crate::config::AdapterConfig;
use crate::constants::{executables, fixups, layout, markers, MAX_RESCUE_ATTEMPTS, PIPELINE_NAME};
use crate::error::{PipelineError, Result};
use crate::pipeline::{Pipeline, ResurrectOutcome};
use crate::process::{render_command, run_captured, ScopedWorkingDir};
use crate::production::{JobStatus, SharedProduction};
use crate::psd::PsdTable;
use crate::scheduler::{files_with_extension, parse_cluster_ids, rescue_files};
use crate::store::Store;

/// Adapter for the BayesWave burst pipeline
///
/// Binds to exactly one production record at construction. Construction
/// validates the record's declared pipeline and derives the lowest minimum
/// frequency across its detectors, caching it both here and in the
/// record's quality metadata.
pub struct BayesWave {
    production: SharedProduction,
    config: AdapterConfig,
    flow: f64,
}

impl BayesWave {
    pub fn new(production: SharedProduction, config: AdapterConfig) -> Result<Self> {
        let flow = {
            let mut record = production.lock();
            if !record.pipeline.eq_ignore_ascii_case(PIPELINE_NAME) {
                return Err(PipelineError::PipelineMismatch {
                    expected: PIPELINE_NAME.to_string(),
                    found: record.pipeline.clone(),
                });
            }
            let flow = record.meta.quality.lowest().ok_or_else(|| {
                PipelineError::MissingMetadata("quality / minimum frequency".to_string())
            })?;
            record.meta.quality.lowest_minimum_frequency = Some(flow);
            flow
        };
        Ok(Self {
            production,
            config,
            flow,
        })
    }

    /// Lowest minimum frequency across the production's detectors
    pub fn flow(&self) -> f64 {
        self.flow
    }

    /// Suppress contaminated PSD bins for one detector
    ///
    /// Rewrites the detector's ASCII PSD in place with power forced to
    /// `1.0` over `[f_low, f_high]` inclusive, then registers the rewritten
    /// table with the artifact store.
    pub fn suppress_psd(&self, detector: &str, f_low: f64, f_high: f64) -> Result<PathBuf> {
        let (rundir, event_name, production_name) = {
            let record = self.production.lock();
            (
                record.rundir.clone(),
                record.event.name.clone(),
                record.name.clone(),
            )
        };
        let ascii = find_ascii_psds(&rundir)
            .into_iter()
            .find(|(found, _)| found == detector)
            .map(|(_, path)| path)
            .ok_or_else(|| PipelineError::AssetNotFound {
                detector: detector.to_string(),
            })?;

        let mut table = PsdTable::read(&ascii)?;
        let bins = table.suppress(f_low, f_high);
        table.write(&ascii)?;

        let store = Store::new(&self.config.storage.directory);
        store.add_file(&event_name, &production_name, &ascii)?;

        info!(
            production = %production_name,
            detector = %detector,
            f_low = f_low,
            f_high = f_high,
            bins = bins,
            "suppressed PSD lines"
        );
        Ok(ascii)
    }

    /// Convert an ASCII PSD to its XML form and register the result with
    /// the event repository
    ///
    /// The converter signals failure by writing to stderr, not through its
    /// exit status.
    fn convert_psd(&self, ascii: &Path, detector: &str) -> Result<PathBuf> {
        let program = self.config.pipelines.executable(executables::PSD_CONVERTER);
        let args = vec![
            "--fname-psd-ascii".to_string(),
            ascii.display().to_string(),
            "--conventional-postfix".to_string(),
            "--ifo".to_string(),
            detector.to_string(),
        ];
        let output = run_captured(&program, &args)?;
        if !output.stderr.trim().is_empty() {
            return Err(PipelineError::PsdConversion {
                stderr: output.stderr,
            });
        }

        let produced = xml_twin(ascii, detector);
        let mut record = self.production.lock();
        let category = record.category.clone();
        let name = record.name.clone();
        record.event.repository.add_file(&category, &name, &produced)?;
        info!(
            production = %name,
            detector = %detector,
            path = %produced.display(),
            "XML PSD registered"
        );
        Ok(produced)
    }

    fn insert_request_disk(original: &str) -> String {
        let mut patched = String::with_capacity(original.len() + fixups::REQUEST_DISK_LINE.len() + 1);
        let mut inserted = false;
        for line in original.lines() {
            if !inserted && line.split_whitespace().next() == Some(fixups::QUEUE_DIRECTIVE) {
                patched.push_str(fixups::REQUEST_DISK_LINE);
                patched.push('\n');
                inserted = true;
            }
            patched.push_str(line);
            patched.push('\n');
        }
        if inserted {
            patched
        } else {
            original.to_string()
        }
    }
}

impl Pipeline for BayesWave {
    fn name(&self) -> &'static str {
        PIPELINE_NAME
    }

    fn build_dag(&self, user: Option<&str>, dryrun: bool) -> Result<()> {
        let (program, args, production_name) = {
            let mut record = self.production.lock();
            let configuration = record.get_configuration();
            let user = user
                .map(str::to_string)
                .or_else(|| configuration.user().map(str::to_string))
                .or_else(|| self.config.condor.user.clone())
                .ok_or_else(|| PipelineError::MissingMetadata("submitting user".to_string()))?;
            record.set_user(user.clone());

            let program = self.config.pipelines.executable(executables::PIPE);
            let args = vec![
                configuration.ini_loc.display().to_string(),
                "--trigger-time".to_string(),
                record.meta.event_time.to_string(),
                "--flow".to_string(),
                self.flow.to_string(),
                "--workdir".to_string(),
                record.rundir.display().to_string(),
                "--user".to_string(),
                user,
            ];
            (program, args, record.name.clone())
        };

        if dryrun {
            println!("{}", render_command(&program, &args));
            return Ok(());
        }

        info!(production = %production_name, "generating DAG");
        let output = run_captured(&program, &args)?;
        let combined = output.combined();
        if combined.contains(markers::DAG_READY) {
            info!(production = %production_name, "DAG generated");
            Ok(())
        } else {
            Err(PipelineError::DagCreation { output: combined })
        }
    }

    fn before_submit(&self) -> Result<()> {
        let rundir = self.production.lock().rundir.clone();

        for sub_file in files_with_extension(&rundir, "sub") {
            let original = fs::read_to_string(&sub_file)?;
            if original.contains(fixups::REQUEST_DISK_KEY) {
                continue;
            }
            let patched = Self::insert_request_disk(&original);
            if patched != original {
                fs::write(&sub_file, patched)?;
                debug!(path = %sub_file.display(), "added disk request to submit file");
            }
        }

        let shebang = self.config.pipelines.shebang();
        for py_file in files_with_extension(&rundir, "py") {
            let original = fs::read_to_string(&py_file)?;
            if let Some(rest) = original.strip_prefix(fixups::STALE_SHEBANG) {
                if rest.is_empty() || rest.starts_with('\n') {
                    fs::write(&py_file, format!("{shebang}{rest}"))?;
                    debug!(path = %py_file.display(), "rewrote interpreter line");
                }
            }
        }

        Ok(())
    }

    fn submit_dag(&self, dryrun: bool) -> Result<Vec<u64>> {
        let (rundir, batch_name, production_name) = {
            let record = self.production.lock();
            (
                record.rundir.clone(),
                format!("bwave/{}/{}", record.event.name, record.name),
                record.name.clone(),
            )
        };
        let program = self.config.pipelines.executable(executables::SUBMIT_DAG);
        let args = vec![
            "-batch-name".to_string(),
            batch_name,
            layout::DAG_FILE.to_string(),
        ];

        if dryrun {
            println!("{}", render_command(&program, &args));
            return Ok(Vec::new());
        }

        // The scheduler resolves DAG-relative paths against the process
        // working directory; the guard restores it on every exit path.
        let _rundir_guard = ScopedWorkingDir::enter(&rundir)?;
        let output = run_captured(&program, &args)?;
        let combined = output.combined();
        let cluster_ids = parse_cluster_ids(&combined);
        if cluster_ids.is_empty() {
            return Err(PipelineError::DagSubmission { output: combined });
        }

        let mut record = self.production.lock();
        record.status = JobStatus::Running;
        record.job_id = Some(cluster_ids[0]);
        info!(
            production = %production_name,
            cluster_ids = ?cluster_ids,
            "DAG submitted"
        );
        Ok(cluster_ids)
    }

    fn collect_assets(&self) -> Result<Assets> {
        let rundir = self.production.lock().rundir.clone();
        let mut assets = Assets::default();
        for (detector, ascii) in find_ascii_psds(&rundir) {
            let twin = xml_twin(&ascii, &detector);
            if twin.exists() {
                assets.xml_psds.insert(detector.clone(), twin);
            } else {
                let produced = self.convert_psd(&ascii, &detector)?;
                assets.xml_psds.insert(detector.clone(), produced);
            }
            assets.psds.insert(detector, ascii);
        }
        Ok(assets)
    }

    fn detect_completion(&self) -> Result<bool> {
        Ok(self.collect_assets()?.is_complete())
    }

    fn resurrect(&self) -> Result<ResurrectOutcome> {
        let rundir = self.production.lock().rundir.clone();
        let rescues = rescue_files(&rundir);
        match rescues.len() {
            0 => Ok(ResurrectOutcome::NothingToDo),
            attempts if attempts <= MAX_RESCUE_ATTEMPTS => {
                if let Some(rescue) = rescues.last() {
                    info!(
                        rescue = %rescue.display(),
                        attempts = attempts,
                        "resubmitting from most recent rescue file"
                    );
                }
                let cluster_ids = self.submit_dag(false)?;
                Ok(ResurrectOutcome::Resubmitted(cluster_ids))
            }
            attempts => Err(PipelineError::RetryBudgetExhausted { attempts }),
        }
    }

    fn html(&self) -> String {
        let record = self.production.lock();
        if record.status != JobStatus::Finished {
            return String::new();
        }
        format!(
            "<div class=\"pipeline-status bayeswave\">\n  \
             <p>{name}</p>\n  \
             <p><a href=\"{webroot}/{event}/{name}/megaplot.html\">Megaplot</a></p>\n\
             </div>",
            name = record.name,
            event = record.event.name,
            webroot = self.config.general.webroot.display(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_request_disk_before_queue() {
        let original = "executable = /bin/true\nqueue 1\n";
        let patched = BayesWave::insert_request_disk(original);
        assert_eq!(
            patched,
            "executable = /bin/true\nrequest_disk = 64M\nqueue 1\n"
        );
    }

    #[test]
    fn test_insert_request_disk_bare_queue() {
        let original = "executable = /bin/true\nqueue\n";
        let patched = BayesWave::insert_request_disk(original);
        assert_eq!(patched, "executable = /bin/true\nrequest_disk = 64M\nqueue\n");
    }

    #[test]
    fn test_insert_request_disk_no_queue_directive() {
        let original = "executable = /bin/true\narguments = -x\n";
        assert_eq!(BayesWave::insert_request_disk(original), original);
    }

    #[test]
    fn test_queue_must_be_a_directive_not_a_substring() {
        let original = "log = queue.log\nqueue 1\n";
        let patched = BayesWave::insert_request_disk(original);
        assert_eq!(patched, "log = queue.log\nrequest_disk = 64M\nqueue 1\n");
    }
}
