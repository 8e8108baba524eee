//! Audio extraction through the external transcoder.
//!
//! [`AudioTranscoder`] turns one [`Job`] into one FFmpeg invocation (two when
//! a hardware-accelerated attempt has to be retried on the CPU) and
//! classifies the result.
//!
//! # Example
//!
//! ```no_run
//! use std::{path::Path, sync::Arc};
//!
//! use mkvaudio::{AccelerationStrategy, AudioFormat, AudioTranscoder, Job, SystemTool};
//!
//! let job = Job::new(
//!     Path::new("/videos"),
//!     Path::new("/audio"),
//!     Path::new("/videos/movie.mkv"),
//!     AudioFormat::Mp3,
//! )?;
//! job.prepare()?;
//!
//! let transcoder = AudioTranscoder::new(Arc::new(SystemTool::default()));
//! let outcome = transcoder.transcode(&job, AudioFormat::Mp3, AccelerationStrategy::None);
//! println!("{outcome:?}");
//! # Ok::<(), mkvaudio::MkvAudioError>(())
//! ```

use std::{
    ffi::OsString,
    fs,
    io::{self, ErrorKind},
    path::Path,
    sync::Arc,
};

use crate::{
    audio::{AudioFormat, FIRST_AUDIO_STREAM},
    batch::Job,
    error::MkvAudioError,
    hardware_acceleration::{AccelerationStrategy, HardwareDevice},
    tool::{ToolOutput, ToolRunner},
};

/// Diagnostic fragments that mark a failure as acceleration-related, in
/// addition to the device name itself.
const ACCELERATION_MARKERS: [&str; 2] = ["hwaccel", "hwdevice"];

/// How a single job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The output file was written.
    Succeeded {
        /// The successful attempt decoded on the hardware device.
        accelerated: bool,
        /// The success came from the CPU retry.
        fell_back: bool,
    },
    /// No valid output was produced.
    Failed {
        /// Diagnostic text from the last attempt.
        detail: String,
        /// A CPU retry was attempted and also failed.
        fell_back: bool,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }

    /// Whether the CPU retry ran for this job.
    pub fn fell_back(&self) -> bool {
        match self {
            JobOutcome::Succeeded { fell_back, .. } | JobOutcome::Failed { fell_back, .. } => {
                *fell_back
            }
        }
    }

    /// Convert to a `Result`, attributing a failure to `job`'s input.
    pub fn into_result(self, job: &Job) -> Result<(), MkvAudioError> {
        match self {
            JobOutcome::Succeeded { .. } => Ok(()),
            JobOutcome::Failed { detail, .. } => Err(MkvAudioError::Transcode {
                input: job.input().to_path_buf(),
                detail,
            }),
        }
    }
}

/// Build the FFmpeg argument list for one attempt.
///
/// Hardware options precede `-i` because FFmpeg applies them to the next
/// input. Quality options are omitted for lossless formats.
pub fn build_arguments(
    input: &Path,
    output: &Path,
    format: AudioFormat,
    device: Option<HardwareDevice>,
    stream_selector: &str,
    overwrite: bool,
) -> Vec<OsString> {
    let mut arguments: Vec<OsString> = Vec::with_capacity(18);
    arguments.push("-hide_banner".into());
    arguments.push(OsString::from(if overwrite { "-y" } else { "-n" }));

    if let Some(device) = device {
        arguments.extend(device.input_arguments().iter().map(OsString::from));
    }

    arguments.push("-i".into());
    arguments.push(input.into());
    arguments.push("-map".into());
    arguments.push(stream_selector.into());
    arguments.extend(format.quality_arguments().iter().map(OsString::from));
    arguments.push("-acodec".into());
    arguments.push(format.codec().into());
    arguments.push(output.into());
    arguments
}

/// Whether a failed accelerated attempt should be retried on the CPU.
///
/// True when the process died without an exit code, or when its diagnostics
/// mention the device or FFmpeg's hardware subsystems. Lines that echo the
/// `input` path are ignored so a file name cannot trigger a retry.
pub fn is_acceleration_failure(output: &ToolOutput, device: HardwareDevice, input: &Path) -> bool {
    if output.exit_code.is_none() {
        return true;
    }
    let input = input.to_string_lossy().to_ascii_lowercase();
    output
        .stderr
        .to_ascii_lowercase()
        .lines()
        .filter(|line| input.is_empty() || !line.contains(input.as_str()))
        .any(|line| {
            line.contains(device.tool_name())
                || ACCELERATION_MARKERS.iter().any(|marker| line.contains(marker))
        })
}

/// Whether a successful accelerated attempt left any sign of the device in
/// its diagnostics.
fn acceleration_evident(output: &ToolOutput, device: HardwareDevice) -> bool {
    output
        .stderr
        .to_ascii_lowercase()
        .contains(device.tool_name())
}

/// Delete whatever an interrupted attempt left at `path`.
fn remove_partial_output(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

/// Result of a single invocation, before retry policy is applied.
enum Attempt {
    Written(ToolOutput),
    Failed(ToolOutput),
    Unrunnable(String),
}

/// Extracts audio from one job at a time by driving a [`ToolRunner`].
#[derive(Clone)]
pub struct AudioTranscoder {
    runner: Arc<dyn ToolRunner>,
    overwrite: bool,
}

impl AudioTranscoder {
    /// Create a transcoder that refuses to replace existing outputs.
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            overwrite: false,
        }
    }

    /// Allow existing output files to be replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Extract `job`'s audio as `format`.
    pub fn transcode(
        &self,
        job: &Job,
        format: AudioFormat,
        acceleration: AccelerationStrategy,
    ) -> JobOutcome {
        self.transcode_observed(job, format, acceleration, |_| {})
    }

    /// Like [`transcode`](AudioTranscoder::transcode), calling `on_fallback`
    /// with the accelerated attempt's diagnostics right before the CPU retry.
    pub fn transcode_observed<F>(
        &self,
        job: &Job,
        format: AudioFormat,
        acceleration: AccelerationStrategy,
        mut on_fallback: F,
    ) -> JobOutcome
    where
        F: FnMut(&str),
    {
        if !self.overwrite && job.output().exists() {
            return JobOutcome::Failed {
                detail: format!(
                    "output already exists: {} (enable overwrite to replace it)",
                    job.output().display()
                ),
                fell_back: false,
            };
        }

        let device = acceleration.device();
        let first = self.attempt(job, format, device, format.stream_selector());

        let failure = match first {
            Attempt::Written(output) => {
                if let Some(device) = device.filter(|&device| !acceleration_evident(&output, device))
                {
                    log::debug!(
                        "{device} acceleration was enabled for {} but may not have been used",
                        job.relative().display()
                    );
                }
                return JobOutcome::Succeeded {
                    accelerated: device.is_some(),
                    fell_back: false,
                };
            }
            Attempt::Unrunnable(detail) => {
                return JobOutcome::Failed {
                    detail,
                    fell_back: false,
                };
            }
            Attempt::Failed(output) => output,
        };

        let Some(device) =
            device.filter(|&device| is_acceleration_failure(&failure, device, job.input()))
        else {
            log::warn!(
                "Extraction failed for {}: {}",
                job.relative().display(),
                failure.stderr.trim()
            );
            return JobOutcome::Failed {
                detail: failure_detail(&failure),
                fell_back: false,
            };
        };

        log::warn!(
            "{device} acceleration failed for {}, retrying on the CPU",
            job.relative().display()
        );
        // Nothing existed before the first attempt unless overwriting, so
        // anything here now is a partial file from that attempt.
        if let Err(error) = remove_partial_output(job.output()) {
            log::warn!(
                "Could not remove partial output {}: {error}",
                job.output().display()
            );
            return JobOutcome::Failed {
                detail: format!("could not remove partial output: {error}"),
                fell_back: false,
            };
        }
        on_fallback(failure.stderr.trim());

        match self.attempt(job, format, None, FIRST_AUDIO_STREAM) {
            Attempt::Written(_) => JobOutcome::Succeeded {
                accelerated: false,
                fell_back: true,
            },
            Attempt::Failed(output) => {
                log::warn!(
                    "CPU fallback failed for {}: {}",
                    job.relative().display(),
                    output.stderr.trim()
                );
                JobOutcome::Failed {
                    detail: failure_detail(&output),
                    fell_back: true,
                }
            }
            Attempt::Unrunnable(detail) => JobOutcome::Failed {
                detail,
                fell_back: true,
            },
        }
    }

    fn attempt(
        &self,
        job: &Job,
        format: AudioFormat,
        device: Option<HardwareDevice>,
        stream_selector: &str,
    ) -> Attempt {
        let arguments = build_arguments(
            job.input(),
            job.output(),
            format,
            device,
            stream_selector,
            self.overwrite,
        );

        match self.runner.run(&arguments) {
            Ok(output) if output.success() && job.output().is_file() => Attempt::Written(output),
            Ok(mut output) => {
                if output.success() {
                    output.stderr.push_str("\ntool exited successfully but wrote no output file");
                }
                Attempt::Failed(output)
            }
            Err(error) => Attempt::Unrunnable(error.to_string()),
        }
    }
}

fn failure_detail(output: &ToolOutput) -> String {
    let last_line = output
        .stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());
    match (last_line, output.exit_code) {
        (Some(line), _) => line.to_string(),
        (None, Some(code)) => format!("exit status {code}"),
        (None, None) => "terminated by signal".to_string(),
    }
}
