//! The external transcoder process boundary.
//!
//! Every call into FFmpeg goes through [`ToolRunner`]. [`SystemTool`] spawns
//! the real binary; tests and embedders can plug in their own runner to
//! observe or script invocations without touching the filesystem `PATH`.

use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::error::MkvAudioError;

/// Default program name, resolved on `PATH`.
pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code. `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Everything the tool wrote to stdout.
    pub stdout: String,
    /// Everything the tool wrote to stderr (its diagnostic stream).
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes a single, blocking invocation of the external transcoder.
///
/// Implementations must be [`Send`] and [`Sync`] because the batch runs on
/// a background worker thread.
pub trait ToolRunner: Send + Sync {
    /// Program being driven, for diagnostics.
    fn program(&self) -> &Path;

    /// Run the tool with `arguments` and wait for it to exit.
    ///
    /// # Errors
    ///
    /// [`MkvAudioError::ToolNotFound`] if the program cannot be located;
    /// [`MkvAudioError::ToolInvocation`] for any other spawn failure. A
    /// non-zero exit is *not* an error at this level.
    fn run(&self, arguments: &[OsString]) -> Result<ToolOutput, MkvAudioError>;
}

/// Runs a real binary through [`std::process::Command`].
#[derive(Debug, Clone)]
pub struct SystemTool {
    program: PathBuf,
}

impl SystemTool {
    /// Drive `program`, either a bare name looked up on `PATH` or a path.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ToolRunner for SystemTool {
    fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, arguments: &[OsString]) -> Result<ToolOutput, MkvAudioError> {
        log::debug!("Running {} {:?}", self.program.display(), arguments);

        // stdin is detached so the tool can never block on an interactive prompt.
        let output = Command::new(&self.program)
            .args(arguments)
            .stdin(Stdio::null())
            .output()
            .map_err(|error| match error.kind() {
                ErrorKind::NotFound => MkvAudioError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => MkvAudioError::ToolInvocation {
                    program: self.program.clone(),
                    reason: error.to_string(),
                },
            })?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Check that the tool can be executed and return its version banner line.
///
/// # Errors
///
/// Propagates [`MkvAudioError::ToolNotFound`] from the runner, and returns
/// [`MkvAudioError::ToolInvocation`] if `-version` exits unsuccessfully.
pub fn detect_tool(runner: &dyn ToolRunner) -> Result<String, MkvAudioError> {
    let output = runner.run(&[OsString::from("-version")])?;
    if !output.success() {
        return Err(MkvAudioError::ToolInvocation {
            program: runner.program().to_path_buf(),
            reason: format!("-version exited with {:?}", output.exit_code),
        });
    }

    let version = output
        .stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("unknown version")
        .to_string();
    log::info!("Using {version}");
    Ok(version)
}
