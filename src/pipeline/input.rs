//! Raw pipeline input and its classification.

use crate::error::Result;
use crate::services::AudioFormat;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// How the ingest stage should treat the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// UTF-8 text.
    Text,
    /// Audio in a known container.
    Audio(AudioFormat),
    /// Audio from a stream; the container is sniffed at ingest.
    StreamedAudio,
}

/// Input document before ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub bytes: Vec<u8>,
    pub kind: InputKind,
}

impl RawInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            kind: InputKind::Text,
        }
    }

    /// Bytes expected to be UTF-8 text. Decoding happens at ingest.
    pub fn text_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            kind: InputKind::Text,
        }
    }

    pub fn audio(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            bytes,
            kind: InputKind::Audio(format),
        }
    }

    pub fn streamed_audio(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            kind: InputKind::StreamedAudio,
        }
    }

    /// Read a file. Audio extensions select transcription, anything
    /// else is text.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(match AudioFormat::from_path(path) {
            Some(format) => Self::audio(bytes, format),
            None => Self::text_bytes(bytes),
        })
    }

    /// Read all of stdin, as audio when `transcribe` is set.
    pub async fn from_stdin(transcribe: bool) -> Result<Self> {
        let mut bytes = Vec::new();
        tokio::io::stdin().read_to_end(&mut bytes).await?;
        Ok(if transcribe {
            Self::streamed_audio(bytes)
        } else {
            Self::text_bytes(bytes)
        })
    }

    pub fn is_audio(&self) -> bool {
        !matches!(self.kind, InputKind::Text)
    }
}
