//! Error types for the `mkvaudio` crate.
//!
//! This module defines [`MkvAudioError`], the unified error type returned by
//! all fallible operations in the crate. Per-file transcode failures are
//! normally contained inside a batch and only surface through
//! [`RunResult`](crate::RunResult) counts; the variants here are what escapes
//! to callers that drive the pieces individually.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `mkvaudio` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MkvAudioError {
    /// The external transcoder could not be found on the execution path.
    #[error("External tool '{program}' was not found (is FFmpeg installed and on PATH?)")]
    ToolNotFound {
        /// Program name or path that failed to spawn.
        program: PathBuf,
    },

    /// One or both folder selections are missing or unusable.
    #[error("Invalid folder selection: {0}")]
    InvalidSelection(String),

    /// The input root does not exist or is not a directory.
    #[error("Input folder not found: {path}")]
    InputNotFound {
        /// The root that was passed to the walker.
        path: PathBuf,
    },

    /// The input tree contains no matching container files.
    #[error("No matching video files found under {root}")]
    EmptyInputSet {
        /// The root that was scanned.
        root: PathBuf,
    },

    /// A single file could not be transcoded.
    #[error("Failed to extract audio from {input}: {detail}")]
    Transcode {
        /// Input file of the failed job.
        input: PathBuf,
        /// Diagnostic text reported by the external tool.
        detail: String,
    },

    /// The requested audio output format is not supported.
    #[error("Unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    /// The requested hardware device name is not recognised.
    #[error("Unknown hardware device: {0}")]
    UnknownHardwareDevice(String),

    /// The external tool could be spawned but the invocation itself failed.
    #[error("Failed to run {program}: {reason}")]
    ToolInvocation {
        /// Program that was run.
        program: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl MkvAudioError {
    /// Whether this error stops a batch before any work is done.
    ///
    /// [`EmptyInputSet`](MkvAudioError::EmptyInputSet) is informational and
    /// per-file errors are recovered locally, so neither is fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MkvAudioError::ToolNotFound { .. }
                | MkvAudioError::InvalidSelection(_)
                | MkvAudioError::InputNotFound { .. }
        )
    }
}
