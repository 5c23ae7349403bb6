//! # External Process Execution
//!
//! Blocking invocation of the external toolchain. Every call waits for the
//! child to terminate and buffers its full output before any inspection;
//! there is no streaming, timeout, or cancellation. Success and failure are
//! judged by the callers from the captured text, not the exit status, which
//! is logged only.

use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::Result;

/// Fully buffered output of a finished child process
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Both streams as one searchable text, stdout first
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }
}

/// Run an external tool to completion and capture its output
pub fn run_captured<I, S>(program: &Path, args: I) -> Result<CapturedOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());

    debug!(program = %program.display(), "spawning external tool");
    let output = command.output()?;
    debug!(
        program = %program.display(),
        exit_status = ?output.status.code(),
        "external tool finished"
    );

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// One shell-style line for logging or dry-run display
pub fn render_command(program: &Path, args: &[String]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Scoped working-directory change, restored on drop
///
/// The process working directory is global state; submission needs it
/// pointed at the run directory so the scheduler resolves DAG-relative
/// paths, and the caller's directory must survive early error returns.
pub struct ScopedWorkingDir {
    previous: PathBuf,
}

impl ScopedWorkingDir {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(Self { previous })
    }
}

impl Drop for ScopedWorkingDir {
    fn drop(&mut self) {
        if let Err(error) = env::set_current_dir(&self.previous) {
            warn!(
                previous = %self.previous.display(),
                %error,
                "could not restore working directory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captured_merges_streams() {
        let output = run_captured(
            Path::new("/bin/sh"),
            ["-c", "echo on stdout; echo on stderr >&2"],
        )
        .unwrap();

        assert_eq!(output.stdout.trim(), "on stdout");
        assert_eq!(output.stderr.trim(), "on stderr");
        let combined = output.combined();
        assert!(combined.contains("on stdout"));
        assert!(combined.contains("on stderr"));
    }

    #[test]
    fn test_run_captured_missing_program() {
        let result = run_captured(Path::new("/nonexistent/tool"), ["--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_command() {
        let rendered = render_command(
            Path::new("/opt/env/bin/bayeswave_pipe"),
            &["--trigger-time".to_string(), "1126259462.4".to_string()],
        );
        assert_eq!(
            rendered,
            "/opt/env/bin/bayeswave_pipe --trigger-time 1126259462.4"
        );
    }

    #[test]
    fn test_scoped_working_dir_restores() {
        let before = env::current_dir().unwrap();
        let target = tempfile::tempdir().unwrap();
        {
            let _guard = ScopedWorkingDir::enter(target.path()).unwrap();
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                target.path().canonicalize().unwrap()
            );
        }
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
