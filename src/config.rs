//! Run configuration.
//!
//! [`ExtractionRequest`] is a builder that carries the user's folder
//! selections, the target format, the acceleration preference and the
//! overwrite policy into the orchestrator.
//!
//! # Example
//!
//! ```
//! use mkvaudio::{AccelerationStrategy, AudioFormat, ExtractionRequest, HardwareDevice};
//!
//! let request = ExtractionRequest::new()
//!     .with_input_root("/videos")
//!     .with_output_root("/audio")
//!     .with_format(AudioFormat::Flac)
//!     .with_acceleration(AccelerationStrategy::TryThenFallback(HardwareDevice::Cuda));
//! assert!(request.validate_selection().is_ok());
//! ```

use std::path::{Path, PathBuf};

use crate::{
    audio::AudioFormat, error::MkvAudioError, hardware_acceleration::AccelerationStrategy,
};

/// Container extension scanned for when none is configured.
pub const DEFAULT_CONTAINER_EXTENSION: &str = "mkv";

/// Everything needed to run one batch.
///
/// Folder selections are optional so that a missing selection can be
/// reported as [`MkvAudioError::InvalidSelection`] rather than prevented
/// at construction time.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub(crate) input_root: Option<PathBuf>,
    pub(crate) output_root: Option<PathBuf>,
    pub(crate) format: AudioFormat,
    pub(crate) acceleration: AccelerationStrategy,
    pub(crate) overwrite: bool,
    pub(crate) extensions: Vec<String>,
}

impl Default for ExtractionRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionRequest {
    /// Create a request with default settings.
    ///
    /// Defaults: no folders, MP3, CPU only, never overwrite, `.mkv` inputs.
    pub fn new() -> Self {
        Self {
            input_root: None,
            output_root: None,
            format: AudioFormat::default(),
            acceleration: AccelerationStrategy::default(),
            overwrite: false,
            extensions: vec![DEFAULT_CONTAINER_EXTENSION.to_string()],
        }
    }

    /// Set the folder that is scanned for video files.
    #[must_use]
    pub fn with_input_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_root = Some(path.into());
        self
    }

    /// Set the folder that receives the mirrored audio tree.
    #[must_use]
    pub fn with_output_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_root = Some(path.into());
        self
    }

    /// Set the target audio format.
    #[must_use]
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the acceleration strategy.
    #[must_use]
    pub fn with_acceleration(mut self, acceleration: AccelerationStrategy) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Allow existing output files to be replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Replace the set of container extensions that are scanned for.
    ///
    /// Leading dots are stripped and matching is case-insensitive. An empty
    /// list restores the default.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self.extensions = if cleaned.is_empty() {
            vec![DEFAULT_CONTAINER_EXTENSION.to_string()]
        } else {
            cleaned
        };
        self
    }

    pub fn input_root(&self) -> Option<&Path> {
        self.input_root.as_deref()
    }

    pub fn output_root(&self) -> Option<&Path> {
        self.output_root.as_deref()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn acceleration(&self) -> AccelerationStrategy {
        self.acceleration
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Return both folder selections, or the reason they are unusable.
    ///
    /// # Errors
    ///
    /// [`MkvAudioError::InvalidSelection`] if either folder is unset or empty.
    pub fn validate_selection(&self) -> Result<(&Path, &Path), MkvAudioError> {
        fn selected(path: Option<&Path>) -> Option<&Path> {
            path.filter(|p| !p.as_os_str().is_empty())
        }

        match (selected(self.input_root()), selected(self.output_root())) {
            (Some(input), Some(output)) => Ok((input, output)),
            (None, None) => Err(MkvAudioError::InvalidSelection(
                "select both a source and an output folder".to_string(),
            )),
            (None, Some(_)) => Err(MkvAudioError::InvalidSelection(
                "select a source folder".to_string(),
            )),
            (Some(_), None) => Err(MkvAudioError::InvalidSelection(
                "select an output folder".to_string(),
            )),
        }
    }

    /// A copy of this request with acceleration turned off.
    pub(crate) fn without_acceleration(&self) -> Self {
        Self {
            acceleration: AccelerationStrategy::None,
            ..self.clone()
        }
    }
}
