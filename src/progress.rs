//! Progress events and run results.
//!
//! The batch worker never touches a display. It reports what happens as
//! [`ExtractionEvent`]s through an [`ExtractionObserver`], and accumulates
//! counts in a [`RunResult`].
//!
//! # Example
//!
//! ```
//! use mkvaudio::{ExtractionEvent, ExtractionObserver};
//!
//! struct PrintProgress;
//!
//! impl ExtractionObserver for PrintProgress {
//!     fn on_event(&self, event: &ExtractionEvent) {
//!         if let ExtractionEvent::JobFinished { percentage, .. } = event {
//!             println!("{percentage:.0}% complete");
//!         }
//!     }
//! }
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    sync::mpsc::Sender,
};

use serde::Serialize;
use thiserror::Error;

use crate::{
    audio::AudioFormat, error::MkvAudioError, hardware_acceleration::HardwareDevice,
    transcode::JobOutcome,
};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    /// Working on job `current` (zero-based) of `total`.
    Extracting { current: usize, total: usize },
    Completed,
    Aborted,
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Scanning => write!(f, "scanning"),
            RunState::Extracting { current, total } => {
                write!(f, "extracting {}/{}", current + 1, total)
            }
            RunState::Completed => write!(f, "completed"),
            RunState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Why a run stopped before extracting anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    /// The external tool could not be run.
    #[error("FFmpeg not found ({program}): {reason}")]
    ToolNotFound {
        /// Program that was looked for.
        program: PathBuf,
        /// What went wrong when running it.
        reason: String,
    },

    /// A folder selection is missing or unusable.
    #[error("{0}")]
    InvalidSelection(String),

    /// Nothing to do. Informational, not an error condition for the user.
    #[error("No matching video files found in {}", .root.display())]
    EmptyInputSet {
        /// The folder that was scanned.
        root: PathBuf,
    },
}

impl AbortReason {
    /// Whether the abort should be presented as an error rather than a notice.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AbortReason::EmptyInputSet { .. })
    }
}

impl From<AbortReason> for MkvAudioError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::ToolNotFound { program, .. } => MkvAudioError::ToolNotFound { program },
            AbortReason::InvalidSelection(message) => MkvAudioError::InvalidSelection(message),
            AbortReason::EmptyInputSet { root } => MkvAudioError::EmptyInputSet { root },
        }
    }
}

/// Something the worker wants the presentation layer to know.
#[derive(Debug, Clone)]
pub enum ExtractionEvent {
    StateChanged(RunState),
    /// The tool answered `-version`; carries the first banner line.
    ToolDetected { version: String },
    /// Acceleration was requested but the probe did not confirm it; the run
    /// continues on the CPU.
    AccelerationUnavailable { device: HardwareDevice },
    /// Jobs were found and extraction is about to begin.
    BatchPlanned { total: usize, format: AudioFormat },
    JobStarted {
        /// Zero-based position in the batch.
        index: usize,
        total: usize,
        relative: PathBuf,
    },
    /// The accelerated attempt failed and a CPU retry is starting.
    AccelerationFallback { relative: PathBuf, detail: String },
    JobFinished {
        index: usize,
        total: usize,
        relative: PathBuf,
        outcome: JobOutcome,
        /// Batch completion, 0.0 – 100.0.
        percentage: f32,
    },
    Finished(RunResult),
    Aborted(AbortReason),
}

/// Receives events from the batch worker.
///
/// Implementations must be [`Send`] and [`Sync`] because they are called
/// from the worker thread. Observers cannot influence the run.
pub trait ExtractionObserver: Send + Sync {
    fn on_event(&self, event: &ExtractionEvent);
}

/// Discards all events. The default when no observer is configured.
pub(crate) struct NoOpObserver;

impl ExtractionObserver for NoOpObserver {
    fn on_event(&self, _event: &ExtractionEvent) {}
}

impl ExtractionObserver for Sender<ExtractionEvent> {
    fn on_event(&self, event: &ExtractionEvent) {
        // A dropped receiver means nobody is watching; the batch still runs.
        let _ = self.send(event.clone());
    }
}

/// Running totals for one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub format: AudioFormat,
    /// Jobs in the batch.
    pub total: usize,
    /// Jobs whose extraction has resolved so far.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs that needed a CPU retry after an accelerated attempt.
    pub fell_back: usize,
    /// Human-readable status line.
    pub status: String,
}

impl RunResult {
    pub(crate) fn new(format: AudioFormat, total: usize) -> Self {
        Self {
            format,
            total,
            status: format!("Found {total} video file(s). Starting extraction..."),
            ..Self::default()
        }
    }

    pub(crate) fn begin(&mut self, relative: &std::path::Path, index: usize) {
        self.status = format!(
            "Extracting: {} ({}/{})",
            relative.display(),
            index + 1,
            self.total
        );
    }

    pub(crate) fn record(&mut self, outcome: &JobOutcome) {
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if outcome.fell_back() {
            self.fell_back += 1;
        }
    }

    pub(crate) fn finish(&mut self) {
        self.status = format!(
            "Completed! Successfully extracted {} of {} audio files",
            self.succeeded, self.attempted
        );
    }

    /// Completion percentage, 0.0 – 100.0.
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.attempted as f32 / self.total as f32 * 100.0
    }
}
