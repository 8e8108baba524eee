//! Input enumeration and output path planning.
//!
//! [`find_containers`] walks the input tree, [`Job`] pairs each input file
//! with its mirrored output path, and [`Batch`] is the ordered list of jobs
//! for one run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
    audio::AudioFormat, config::ExtractionRequest, error::MkvAudioError,
    hardware_acceleration::AccelerationStrategy,
};

/// Recursively collect files under `root` whose extension matches one of
/// `extensions`, ignoring case.
///
/// Directory entries are visited in file-name order so the result is stable
/// for a given tree. Entries that cannot be read are skipped.
///
/// # Errors
///
/// [`MkvAudioError::InputNotFound`] if `root` is not an existing directory.
/// An empty result is not an error.
pub fn find_containers<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
) -> Result<Vec<PathBuf>, MkvAudioError> {
    if !root.is_dir() {
        return Err(MkvAudioError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                log::warn!("Skipping unreadable entry: {error}");
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            found.push(entry.into_path());
        }
    }

    log::debug!("Found {} container file(s) under {}", found.len(), root.display());
    Ok(found)
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| ext.eq_ignore_ascii_case(wanted.as_ref()))
        })
}

/// One input file and where its audio goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    input: PathBuf,
    relative: PathBuf,
    output: PathBuf,
}

impl Job {
    /// Plan the output for `input`, which must live under `input_root`.
    ///
    /// The output keeps the relative directory structure and file stem, with
    /// the extension replaced by `format`'s.
    ///
    /// # Errors
    ///
    /// [`MkvAudioError::InvalidSelection`] if `input` is not under
    /// `input_root`.
    pub fn new(
        input_root: &Path,
        output_root: &Path,
        input: &Path,
        format: AudioFormat,
    ) -> Result<Self, MkvAudioError> {
        let relative = input
            .strip_prefix(input_root)
            .map_err(|_| {
                MkvAudioError::InvalidSelection(format!(
                    "{} is not inside {}",
                    input.display(),
                    input_root.display()
                ))
            })?
            .to_path_buf();
        let output = output_root.join(relative.with_extension(format.extension()));

        Ok(Self {
            input: input.to_path_buf(),
            relative,
            output,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Input path relative to the input root.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Create the output file's parent directory.
    pub fn prepare(&self) -> Result<(), MkvAudioError> {
        if let Some(parent) = self.output.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// The ordered jobs of one run plus the settings they share.
#[derive(Debug, Clone)]
pub struct Batch {
    jobs: Vec<Job>,
    format: AudioFormat,
    acceleration: AccelerationStrategy,
    overwrite: bool,
}

impl Batch {
    /// Scan the request's input folder and plan every job.
    ///
    /// # Errors
    ///
    /// [`MkvAudioError::InvalidSelection`] for missing folder choices and
    /// [`MkvAudioError::InputNotFound`] for a missing input root.
    pub fn plan(request: &ExtractionRequest) -> Result<Self, MkvAudioError> {
        let (input_root, output_root) = request.validate_selection()?;
        let jobs = find_containers(input_root, request.extensions())?
            .iter()
            .map(|input| Job::new(input_root, output_root, input, request.format()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            jobs,
            format: request.format(),
            acceleration: request.acceleration(),
            overwrite: request.overwrite(),
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
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
}
