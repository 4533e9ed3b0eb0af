use crate::defaults::MAX_SYNTHESIS_BYTES;
use crate::error::{DecoError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Trait for text-to-speech providers.
///
/// One call synthesizes one chunk. Callers never pass more than
/// [`max_input_bytes`](Self::max_input_bytes); implementations reject it
/// anyway with [`check_chunk`].
#[async_trait]
pub trait SynthesisService: Send + Sync {
    /// Synthesize a single text chunk into encoded audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Largest accepted UTF-8 input.
    fn max_input_bytes(&self) -> usize {
        MAX_SYNTHESIS_BYTES
    }

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Reject chunks above `limit` bytes.
pub fn check_chunk(text: &str, limit: usize) -> Result<()> {
    if text.len() > limit {
        return Err(DecoError::ChunkTooLarge {
            bytes: text.len(),
            limit,
        });
    }
    Ok(())
}

/// Mock synthesizer for testing
///
/// By default returns the chunk's own bytes as "audio", so concatenated
/// output can be compared against the input text.
#[derive(Debug, Default)]
pub struct MockSynthesizer {
    empty_output: bool,
    fail_at: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return zero bytes for every call.
    pub fn with_empty_output(mut self) -> Self {
        self.empty_output = true;
        self
    }

    /// Fail the call with this zero-based index.
    pub fn with_failure_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Texts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SynthesisService for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        check_chunk(text, self.max_input_bytes())?;

        let index = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(text.to_string());
                calls.len() - 1
            }
            Err(_) => 0,
        };

        if self.fail_at == Some(index) {
            return Err(DecoError::provider("mock synthesis", 503, "unavailable"));
        }
        if self.empty_output {
            return Ok(Vec::new());
        }
        Ok(text.as_bytes().to_vec())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
