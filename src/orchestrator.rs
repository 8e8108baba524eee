//! Batch orchestration.
//!
//! [`Extractor`] runs a whole batch: it checks preconditions, probes
//! acceleration, plans the jobs and feeds them one by one to the
//! [`AudioTranscoder`], reporting everything through an
//! [`ExtractionObserver`]. [`spawn_extraction`] does the same on a
//! background thread and hands the events back over a channel.

use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver},
    },
    thread::{self, JoinHandle},
};

use crate::{
    batch::Batch,
    config::ExtractionRequest,
    error::MkvAudioError,
    probe::probe_acceleration,
    progress::{
        AbortReason, ExtractionEvent, ExtractionObserver, NoOpObserver, RunResult, RunState,
    },
    tool::{ToolRunner, detect_tool},
    transcode::{AudioTranscoder, JobOutcome},
};

/// Drives one batch from folder selection to final summary.
#[derive(Clone)]
pub struct Extractor {
    runner: Arc<dyn ToolRunner>,
    observer: Arc<dyn ExtractionObserver>,
}

impl Extractor {
    /// Create an extractor that reports to nobody.
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Attach an observer for progress events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the batch described by `request` to completion.
    ///
    /// Individual job failures never stop the batch; they are counted in the
    /// returned [`RunResult`].
    ///
    /// # Errors
    ///
    /// An [`AbortReason`] when the tool is missing, a folder selection is
    /// unusable, or no input files were found. Nothing is extracted in any of
    /// those cases.
    pub fn run(&self, request: &ExtractionRequest) -> Result<RunResult, AbortReason> {
        self.emit(ExtractionEvent::StateChanged(RunState::Idle));

        let version = detect_tool(self.runner.as_ref()).map_err(|error| {
            self.abort(AbortReason::ToolNotFound {
                program: self.runner.program().to_path_buf(),
                reason: error.to_string(),
            })
        })?;
        self.emit(ExtractionEvent::ToolDetected { version });

        if let Err(error) = request.validate_selection() {
            return Err(self.abort(selection_abort(error)));
        }

        self.emit(ExtractionEvent::StateChanged(RunState::Scanning));

        let request = match request.acceleration().device() {
            Some(device) if !probe_acceleration(self.runner.as_ref(), device) => {
                log::warn!("{device} acceleration unavailable, using the CPU for this run");
                self.emit(ExtractionEvent::AccelerationUnavailable { device });
                request.without_acceleration()
            }
            _ => request.clone(),
        };

        let batch = Batch::plan(&request).map_err(|error| self.abort(selection_abort(error)))?;
        if batch.is_empty() {
            let root = request.input_root().map(|p| p.to_path_buf()).unwrap_or_default();
            return Err(self.abort(AbortReason::EmptyInputSet { root }));
        }

        Ok(self.extract(&batch))
    }

    fn extract(&self, batch: &Batch) -> RunResult {
        let total = batch.len();
        let format = batch.format();
        let acceleration = batch.acceleration();
        let transcoder = AudioTranscoder::new(Arc::clone(&self.runner))
            .with_overwrite(batch.overwrite());
        let mut result = RunResult::new(format, total);

        log::info!(
            "Extracting {format} audio from {total} file(s) (acceleration: {:?})",
            acceleration
        );
        self.emit(ExtractionEvent::BatchPlanned { total, format });

        for (index, job) in batch.jobs().iter().enumerate() {
            self.emit(ExtractionEvent::StateChanged(RunState::Extracting {
                current: index,
                total,
            }));
            result.begin(job.relative(), index);
            self.emit(ExtractionEvent::JobStarted {
                index,
                total,
                relative: job.relative().to_path_buf(),
            });

            let outcome = match job.prepare() {
                Ok(()) => transcoder.transcode_observed(job, format, acceleration, |detail| {
                    self.emit(ExtractionEvent::AccelerationFallback {
                        relative: job.relative().to_path_buf(),
                        detail: detail.to_string(),
                    });
                }),
                Err(error) => {
                    log::warn!(
                        "Could not create output folder for {}: {error}",
                        job.relative().display()
                    );
                    JobOutcome::Failed {
                        detail: error.to_string(),
                        fell_back: false,
                    }
                }
            };

            result.record(&outcome);
            self.emit(ExtractionEvent::JobFinished {
                index,
                total,
                relative: job.relative().to_path_buf(),
                outcome,
                percentage: result.percentage(),
            });
        }

        result.finish();
        log::info!("{}", result.status);
        self.emit(ExtractionEvent::StateChanged(RunState::Completed));
        self.emit(ExtractionEvent::Finished(result.clone()));
        result
    }

    fn emit(&self, event: ExtractionEvent) {
        self.observer.on_event(&event);
    }

    fn abort(&self, reason: AbortReason) -> AbortReason {
        if reason.is_fatal() {
            log::error!("Extraction aborted: {reason}");
        } else {
            log::info!("Extraction aborted: {reason}");
        }
        self.emit(ExtractionEvent::StateChanged(RunState::Aborted));
        self.emit(ExtractionEvent::Aborted(reason.clone()));
        reason
    }
}

fn selection_abort(error: MkvAudioError) -> AbortReason {
    match error {
        MkvAudioError::InvalidSelection(message) => AbortReason::InvalidSelection(message),
        MkvAudioError::InputNotFound { path } => AbortReason::InvalidSelection(format!(
            "source folder does not exist: {}",
            path.display()
        )),
        other => AbortReason::InvalidSelection(other.to_string()),
    }
}

/// A batch running on a background thread.
pub struct BackgroundExtraction {
    events: Receiver<ExtractionEvent>,
    handle: JoinHandle<Result<RunResult, AbortReason>>,
}

impl BackgroundExtraction {
    /// Events in the order the worker produced them. The iterator ends once
    /// the worker has finished.
    pub fn events(&self) -> &Receiver<ExtractionEvent> {
        &self.events
    }

    /// Wait for the worker and return its result.
    ///
    /// # Errors
    ///
    /// The outer error carries the panic payload if the worker panicked.
    pub fn join(self) -> thread::Result<Result<RunResult, AbortReason>> {
        self.handle.join()
    }
}

/// Run `request` on a new worker thread.
///
/// The worker owns the only sender, so iterating
/// [`events`](BackgroundExtraction::events) terminates when the batch ends.
pub fn spawn_extraction(
    request: ExtractionRequest,
    runner: Arc<dyn ToolRunner>,
) -> BackgroundExtraction {
    let (sender, events) = mpsc::channel();
    let handle = thread::spawn(move || {
        Extractor::new(runner)
            .with_observer(Arc::new(sender))
            .run(&request)
    });

    BackgroundExtraction { events, handle }
}
