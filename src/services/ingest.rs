use crate::error::{DecoError, Result};
use crate::services::format::{AudioFormat, detect_audio_format};
use async_trait::async_trait;
use std::sync::Mutex;

/// Audio handed to the transcription service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInput {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioInput {
    pub fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// File name used for uploads, e.g. `audio.mp3`.
    pub fn file_name(&self) -> String {
        format!("audio.{}", self.format.extension())
    }
}

/// Trait for speech-to-text ingestion.
///
/// This trait allows swapping implementations (cloud API vs mock).
#[async_trait]
pub trait IngestService: Send + Sync {
    /// Transcribe a recording to text.
    async fn transcribe(&self, audio: &AudioInput, model: &str) -> Result<String>;

    /// Sniff the container of a raw byte stream.
    fn detect_audio_format(&self, data: &[u8]) -> Option<AudioFormat> {
        detect_audio_format(data)
    }

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Mock ingest service for testing
#[derive(Debug, Default)]
pub struct MockIngest {
    transcript: String,
    should_fail: bool,
    calls: Mutex<Vec<(AudioFormat, String)>>,
}

impl MockIngest {
    pub fn new() -> Self {
        Self {
            transcript: "mock transcription".to_string(),
            ..Default::default()
        }
    }

    /// Configure the mock to return a specific transcript
    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Formats and models seen so far, in call order.
    pub fn calls(&self) -> Vec<(AudioFormat, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl IngestService for MockIngest {
    async fn transcribe(&self, audio: &AudioInput, model: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((audio.format, model.to_string()));
        }
        if self.should_fail {
            return Err(DecoError::provider("mock ingest", 500, "transcription failed"));
        }
        Ok(self.transcript.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
