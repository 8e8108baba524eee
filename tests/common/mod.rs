//! Shared test helpers: a scripted stand-in for the FFmpeg binary and an
//! observer that records every event.

#![allow(dead_code)]

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use mkvaudio::{ExtractionEvent, ExtractionObserver, MkvAudioError, ToolOutput, ToolRunner};

pub const HWACCELS_WITH_CUDA: &str = "Hardware acceleration methods:\nvdpau\ncuda\nvaapi\n\n";
pub const HWACCELS_WITHOUT_CUDA: &str = "Hardware acceleration methods:\nvaapi\ndrm\n\n";

/// Behaves like a tiny FFmpeg: answers `-version` and `-hwaccels`, writes
/// the output file on success, and records every argument list it sees.
pub struct ScriptedTool {
    program: PathBuf,
    missing: bool,
    hwaccels: String,
    probe_stderr: String,
    acceleration_broken: bool,
    acceleration_interrupted: bool,
    failing_inputs: Vec<String>,
    skip_writing: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            missing: false,
            hwaccels: HWACCELS_WITH_CUDA.to_string(),
            probe_stderr: "[AVHWDeviceContext @ 0x55] cuda device ready\nnone: No such file or directory"
                .to_string(),
            acceleration_broken: false,
            acceleration_interrupted: false,
            failing_inputs: Vec::new(),
            skip_writing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every invocation fails as if the binary were not on PATH.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::new()
        }
    }

    pub fn with_hwaccels(mut self, listing: &str) -> Self {
        self.hwaccels = listing.to_string();
        self
    }

    pub fn with_probe_stderr(mut self, stderr: &str) -> Self {
        self.probe_stderr = stderr.to_string();
        self
    }

    /// Accelerated transcodes fail with a CUDA device error.
    pub fn with_broken_acceleration(mut self) -> Self {
        self.acceleration_broken = true;
        self
    }

    /// Accelerated transcodes write a partial output and then die without an
    /// exit code, as if killed by a signal.
    pub fn with_interrupted_acceleration(mut self) -> Self {
        self.acceleration_interrupted = true;
        self
    }

    /// Inputs whose path contains `fragment` fail with a demuxer error.
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing_inputs.push(fragment.to_string());
        self
    }

    /// Exit successfully without producing an output file.
    pub fn without_output(mut self) -> Self {
        self.skip_writing = true;
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Invocations that carried an input other than the probe's `none`.
    pub fn transcode_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|args| input_of(args).is_some_and(|input| input != "none"))
            .collect()
    }
}

pub fn input_of(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|arg| arg == "-i")
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

pub fn selector_of(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|arg| arg == "-map")
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

pub fn is_accelerated(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "-hwaccel")
}

fn exit(code: i32, stdout: &str, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

impl ToolRunner for ScriptedTool {
    fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, arguments: &[OsString]) -> Result<ToolOutput, MkvAudioError> {
        let args: Vec<String> = arguments
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.calls.lock().unwrap().push(args.clone());

        if self.missing {
            return Err(MkvAudioError::ToolNotFound {
                program: self.program.clone(),
            });
        }

        if args == ["-version"] {
            return Ok(exit(0, "ffmpeg version 7.1-scripted Copyright (c) 2000-2024\n", ""));
        }
        if args.iter().any(|arg| arg == "-hwaccels") {
            return Ok(exit(0, &self.hwaccels, ""));
        }

        let Some(input) = input_of(&args) else {
            return Ok(exit(1, "", "At least one output file must be specified"));
        };
        if input == "none" {
            return Ok(exit(1, "", &self.probe_stderr));
        }
        let output = args.last().expect("output path is the last argument");
        if args.iter().any(|arg| arg == "-n") && Path::new(output).exists() {
            return Ok(exit(1, "", &format!("File '{output}' already exists. Exiting.")));
        }
        if is_accelerated(&args) && self.acceleration_interrupted {
            fs::write(output, b"partial").expect("write partial output");
            return Ok(ToolOutput {
                exit_code: None,
                ..ToolOutput::default()
            });
        }
        if is_accelerated(&args) && self.acceleration_broken {
            return Ok(exit(
                1,
                "",
                "[h264 @ 0x5588] Device creation failed: -542398533.\n[h264 @ 0x5588] Failed setup for format cuda: hwaccel initialisation returned error.",
            ));
        }
        if self.failing_inputs.iter().any(|fragment| input.contains(fragment.as_str())) {
            return Ok(exit(1, "", &format!("{input}: Invalid data found when processing input")));
        }

        if !self.skip_writing {
            fs::write(output, b"scripted audio").expect("write scripted output");
        }
        Ok(exit(0, "", "size=     512kB time=00:01:00.00"))
    }
}

/// Keeps every event the worker emits.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<ExtractionEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ExtractionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn percentages(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ExtractionEvent::JobFinished { percentage, .. } => Some(percentage),
                _ => None,
            })
            .collect()
    }
}

impl ExtractionObserver for RecordingObserver {
    fn on_event(&self, event: &ExtractionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Create an empty file (and its parents) under `root`.
pub fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"").unwrap();
    path
}
