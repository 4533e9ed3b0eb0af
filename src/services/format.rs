//! Audio container classification by file extension or leading bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Audio containers the transcription service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Mp4,
    Mpeg,
    Mpga,
    M4a,
    Wav,
    Webm,
    Flac,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 8] = [
        AudioFormat::Mp3,
        AudioFormat::Mp4,
        AudioFormat::Mpeg,
        AudioFormat::Mpga,
        AudioFormat::M4a,
        AudioFormat::Wav,
        AudioFormat::Webm,
        AudioFormat::Flac,
    ];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Mp4 => "mp4",
            AudioFormat::Mpeg => "mpeg",
            AudioFormat::Mpga => "mpga",
            AudioFormat::M4a => "m4a",
            AudioFormat::Wav => "wav",
            AudioFormat::Webm => "webm",
            AudioFormat::Flac => "flac",
        }
    }

    /// MIME type used when uploading the audio.
    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Mp3 | AudioFormat::Mpeg | AudioFormat::Mpga => "audio/mpeg",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::M4a => "audio/m4a",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Flac => "audio/flac",
        }
    }

    /// Match an extension, case-insensitively, with or without a dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Known container signatures: (magic bytes, offset, format).
const SIGNATURES: &[(&[u8], usize, AudioFormat)] = &[
    (b"ID3", 0, AudioFormat::Mp3),
    (b"ftypmp4", 4, AudioFormat::Mp4),
    (b"ftypM4A", 4, AudioFormat::M4a),
    (b"RIFF", 0, AudioFormat::Wav),
    (b"\x1aE\xdf\xa3", 0, AudioFormat::Webm),
    (b"fLaC", 0, AudioFormat::Flac),
];

/// True when `data` opens with an MPEG audio frame sync.
fn is_mpeg_frame(data: &[u8]) -> bool {
    matches!(data, [0xff, second, ..] if second & 0b1110_0000 == 0b1110_0000)
}

/// Sniff the container from leading bytes. `None` if unrecognized.
pub fn detect_audio_format(data: &[u8]) -> Option<AudioFormat> {
    let by_signature = SIGNATURES.iter().find_map(|(magic, offset, format)| {
        data.get(*offset..)
            .filter(|rest| rest.starts_with(magic))
            .map(|_| *format)
    });

    by_signature.or_else(|| is_mpeg_frame(data).then_some(AudioFormat::Mpga))
}
