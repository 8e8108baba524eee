//! Hardware-accelerated decoding through the external tool.
//!
//! The crate never touches a GPU itself. [`AccelerationStrategy`] only
//! decides whether the transcoder is asked for `-hwaccel` decoding and, if
//! so, which [`HardwareDevice`] it should use. When an accelerated attempt
//! fails the transcoder retries once on the CPU.
//!
//! # Platform Support
//!
//! Whether a device works depends on the FFmpeg build and the host drivers.
//! Use [`probe_acceleration`](crate::probe::probe_acceleration) to check
//! before committing a batch to it.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::Serialize;

use crate::error::MkvAudioError;

/// Extra hardware frame buffers requested on accelerated attempts.
pub(crate) const EXTRA_HARDWARE_FRAMES: &str = "2";

/// Hardware decoders FFmpeg can be asked to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareDevice {
    /// NVIDIA CUDA (Linux, Windows). This is the default.
    #[default]
    Cuda,
    /// Video Acceleration API (Linux).
    Vaapi,
    /// Intel Quick Sync Video.
    Qsv,
    /// Apple VideoToolbox (macOS).
    VideoToolbox,
    /// Direct3D 11 Video Acceleration (Windows).
    D3d11va,
    /// DirectX Video Acceleration 2 (Windows).
    Dxva2,
}

impl HardwareDevice {
    /// Every device this crate knows how to request.
    pub const ALL: [HardwareDevice; 6] = [
        HardwareDevice::Cuda,
        HardwareDevice::Vaapi,
        HardwareDevice::Qsv,
        HardwareDevice::VideoToolbox,
        HardwareDevice::D3d11va,
        HardwareDevice::Dxva2,
    ];

    /// Name passed to `-hwaccel` and printed by `ffmpeg -hwaccels`.
    pub fn tool_name(self) -> &'static str {
        match self {
            HardwareDevice::Cuda => "cuda",
            HardwareDevice::Vaapi => "vaapi",
            HardwareDevice::Qsv => "qsv",
            HardwareDevice::VideoToolbox => "videotoolbox",
            HardwareDevice::D3d11va => "d3d11va",
            HardwareDevice::Dxva2 => "dxva2",
        }
    }

    /// Pixel format passed to `-hwaccel_output_format`.
    pub fn output_format(self) -> &'static str {
        match self {
            HardwareDevice::Cuda => "cuda",
            HardwareDevice::Vaapi => "vaapi",
            HardwareDevice::Qsv => "qsv",
            HardwareDevice::VideoToolbox => "videotoolbox_vld",
            HardwareDevice::D3d11va => "d3d11",
            HardwareDevice::Dxva2 => "dxva2_vld",
        }
    }

    /// The input options that request this device, in invocation order.
    pub(crate) fn input_arguments(self) -> [&'static str; 6] {
        [
            "-hwaccel",
            self.tool_name(),
            "-hwaccel_output_format",
            self.output_format(),
            "-extra_hw_frames",
            EXTRA_HARDWARE_FRAMES,
        ]
    }
}

impl Display for HardwareDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.tool_name())
    }
}

impl FromStr for HardwareDevice {
    type Err = MkvAudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        HardwareDevice::ALL
            .into_iter()
            .find(|device| device.tool_name() == needle)
            .ok_or(MkvAudioError::UnknownHardwareDevice(needle))
    }
}

/// How a batch uses hardware decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelerationStrategy {
    /// CPU-only decoding. This is the default.
    #[default]
    None,
    /// Try the device first and fall back to the CPU if it fails.
    TryThenFallback(HardwareDevice),
}

impl AccelerationStrategy {
    /// The device to request on the first attempt, if any.
    pub fn device(self) -> Option<HardwareDevice> {
        match self {
            AccelerationStrategy::None => None,
            AccelerationStrategy::TryThenFallback(device) => Some(device),
        }
    }

    /// Whether any hardware decoding is requested.
    pub fn is_accelerated(self) -> bool {
        self.device().is_some()
    }
}

/// Parse the output of `ffmpeg -hwaccels`.
///
/// The tool prints a header line followed by one backend per line. Names
/// this crate does not model are skipped.
pub fn parse_hardware_listing(listing: &str) -> Vec<HardwareDevice> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .filter_map(|line| line.parse().ok())
        .collect()
}
