//! Audio output formats.
//!
//! [`AudioFormat`] fixes everything the transcoder needs to know about a
//! target: the file extension, the FFmpeg encoder name, whether a quality
//! parameter is passed, and which audio streams are selected.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::Serialize;

use crate::error::MkvAudioError;

/// Stream selector that maps every audio stream of the first input.
pub(crate) const ALL_AUDIO_STREAMS: &str = "0:a";

/// Stream selector that maps only the first audio stream of the first input.
pub(crate) const FIRST_AUDIO_STREAM: &str = "0:a:0";

/// Audio output format.
///
/// Each format maps to exactly one encoder and one quality scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 via libmp3lame, highest VBR quality. This is the default.
    #[default]
    Mp3,
    /// AAC via FFmpeg's native encoder, highest VBR quality.
    Aac,
    /// FLAC. Lossless, no quality parameter.
    Flac,
}

impl Display for AudioFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AudioFormat::Mp3 => write!(f, "MP3"),
            AudioFormat::Aac => write!(f, "AAC"),
            AudioFormat::Flac => write!(f, "FLAC"),
        }
    }
}

impl FromStr for AudioFormat {
    type Err = MkvAudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "aac" => Ok(AudioFormat::Aac),
            "flac" => Ok(AudioFormat::Flac),
            other => Err(MkvAudioError::UnsupportedAudioFormat(other.to_string())),
        }
    }
}

impl AudioFormat {
    /// All supported formats, in the order they are offered to users.
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Mp3, AudioFormat::Aac, AudioFormat::Flac];

    /// File extension (without the dot) written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
        }
    }

    /// FFmpeg encoder passed to `-acodec`.
    pub fn codec(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
        }
    }

    /// Arguments selecting encoder quality. Empty for lossless output.
    pub fn quality_arguments(self) -> &'static [&'static str] {
        if self.is_lossless() {
            &[]
        } else {
            &["-q:a", "0"]
        }
    }

    /// `-map` selector used on a normal attempt.
    pub fn stream_selector(self) -> &'static str {
        if self.is_lossless() {
            FIRST_AUDIO_STREAM
        } else {
            ALL_AUDIO_STREAMS
        }
    }

    /// Whether the format keeps every decoded sample.
    pub fn is_lossless(self) -> bool {
        matches!(self, AudioFormat::Flac)
    }
}
