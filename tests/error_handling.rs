//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for the failure
//! conditions callers can hit directly.

use std::path::PathBuf;

use mkvaudio::{AbortReason, AudioFormat, HardwareDevice, MkvAudioError, SystemTool, detect_tool};

#[test]
fn unsupported_format_message() {
    let error = "wav".parse::<AudioFormat>().unwrap_err();
    assert_eq!(error.to_string(), "Unsupported audio format: wav");
    assert!(!error.is_fatal());
}

#[test]
fn unknown_device_message() {
    let error = "opencl".parse::<HardwareDevice>().unwrap_err();
    assert!(error.to_string().contains("opencl"));
}

#[test]
fn tool_not_found_mentions_program() {
    let error = detect_tool(&SystemTool::new("mkvaudio-missing-ffmpeg")).unwrap_err();
    let message = error.to_string();
    assert!(
        message.contains("mkvaudio-missing-ffmpeg"),
        "Error message should name the program: {message}",
    );
    assert!(error.is_fatal());
}

#[test]
fn fatal_classification() {
    assert!(MkvAudioError::InvalidSelection("x".to_string()).is_fatal());
    assert!(
        MkvAudioError::InputNotFound {
            path: PathBuf::from("/nope")
        }
        .is_fatal()
    );
    assert!(
        !MkvAudioError::EmptyInputSet {
            root: PathBuf::from("/videos")
        }
        .is_fatal()
    );
    assert!(
        !MkvAudioError::Transcode {
            input: PathBuf::from("a.mkv"),
            detail: "boom".to_string()
        }
        .is_fatal()
    );
}

#[test]
fn abort_reason_messages() {
    let empty = AbortReason::EmptyInputSet {
        root: PathBuf::from("/videos"),
    };
    assert_eq!(empty.to_string(), "No matching video files found in /videos");

    let missing = AbortReason::ToolNotFound {
        program: PathBuf::from("ffmpeg"),
        reason: "not found".to_string(),
    };
    assert!(missing.to_string().starts_with("FFmpeg not found"));
}

#[test]
fn real_ffmpeg_version_when_installed() {
    let Ok(version) = detect_tool(&SystemTool::default()) else {
        eprintln!("Skipping: ffmpeg not installed");
        return;
    };
    assert!(!version.is_empty());
}

#[test]
fn fatal_abort_stays_fatal_as_error() {
    let error: MkvAudioError = AbortReason::ToolNotFound {
        program: PathBuf::from("/opt/ffmpeg"),
        reason: "No such file or directory".to_string(),
    }
    .into();
    assert!(error.is_fatal());
    assert!(error.to_string().contains("/opt/ffmpeg"));

    let error: MkvAudioError = AbortReason::InvalidSelection("pick a folder".to_string()).into();
    assert!(error.is_fatal());
}
