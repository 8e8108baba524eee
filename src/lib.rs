//! # mkvaudio
//!
//! Batch-extract audio tracks from folders of video files.
//!
//! `mkvaudio` walks an input folder for container files (`.mkv` by default),
//! runs an external FFmpeg binary once per file to pull the audio out, and
//! writes the results into an output folder that mirrors the input's
//! directory layout. All decoding and encoding happens inside FFmpeg; this
//! crate plans the work, drives the subprocess, retries hardware-accelerated
//! attempts on the CPU, and reports progress.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mkvaudio::{AudioFormat, ExtractionRequest, Extractor, SystemTool};
//!
//! let request = ExtractionRequest::new()
//!     .with_input_root("videos")
//!     .with_output_root("audio")
//!     .with_format(AudioFormat::Flac);
//!
//! let result = Extractor::new(Arc::new(SystemTool::default())).run(&request)?;
//! println!("{}", result.status);
//! # Ok::<(), mkvaudio::AbortReason>(())
//! ```
//!
//! ### In the background
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mkvaudio::{ExtractionEvent, ExtractionRequest, SystemTool, spawn_extraction};
//!
//! let request = ExtractionRequest::new()
//!     .with_input_root("videos")
//!     .with_output_root("audio");
//! let run = spawn_extraction(request, Arc::new(SystemTool::default()));
//!
//! for event in run.events() {
//!     if let ExtractionEvent::JobFinished { percentage, .. } = event {
//!         println!("{percentage:.0}%");
//!     }
//! }
//! let _result = run.join();
//! ```
//!
//! ## Requirements
//!
//! An `ffmpeg` executable must be installed and reachable on `PATH` (or
//! passed explicitly to [`SystemTool::new`]).

pub mod audio;
pub mod batch;
pub mod config;
pub mod error;
pub mod hardware_acceleration;
pub mod orchestrator;
pub mod probe;
pub mod progress;
pub mod tool;
pub mod transcode;

pub use audio::AudioFormat;
pub use batch::{Batch, Job, find_containers};
pub use config::ExtractionRequest;
pub use error::MkvAudioError;
pub use hardware_acceleration::{AccelerationStrategy, HardwareDevice};
pub use orchestrator::{BackgroundExtraction, Extractor, spawn_extraction};
pub use probe::{available_hardware_devices, probe_acceleration};
pub use progress::{AbortReason, ExtractionEvent, ExtractionObserver, RunResult, RunState};
pub use tool::{SystemTool, ToolOutput, ToolRunner, detect_tool};
pub use transcode::{AudioTranscoder, JobOutcome};
