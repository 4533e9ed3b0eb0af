//! Size-bounded chunk planning for speech synthesis.
//!
//! The synthesis API caps each request at [`MAX_SYNTHESIS_BYTES`] of UTF-8.
//! The planner turns an arbitrarily long document into an ordered list of
//! chunks that each fit, breaking only at sentence boundaries unless a
//! single sentence is itself too long.

use crate::defaults::{MAX_SYNTHESIS_BYTES, clamp_chunk_bytes};
use crate::error::{DecoError, Result};
use crate::text::tokenizer::SentenceTokenizer;
use serde::{Deserialize, Serialize};

/// How sentences are grouped into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkPolicy {
    /// One chunk per sentence.
    #[default]
    PerSentence,
    /// Adjacent sentences share a chunk (joined by a space) while it fits.
    Greedy,
}

/// A unit of synthesis work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Whole sentences (or the whole document) that fit in one request.
    Text(String),
    /// Consecutive byte windows of one oversized sentence, in order.
    Slices(Vec<String>),
}

impl Chunk {
    /// The request texts this chunk expands to, in order.
    pub fn pieces(&self) -> Vec<&str> {
        match self {
            Chunk::Text(text) => vec![text.as_str()],
            Chunk::Slices(slices) => slices.iter().map(String::as_str).collect(),
        }
    }

    /// Number of synthesis calls this chunk needs.
    pub fn request_count(&self) -> usize {
        match self {
            Chunk::Text(_) => 1,
            Chunk::Slices(slices) => slices.len(),
        }
    }

    /// Concatenated text of all pieces.
    pub fn text(&self) -> String {
        self.pieces().concat()
    }
}

/// What the caller hands to the synthesis side.
///
/// Only single text values are planned today; pre-chunked sequences are
/// rejected up front rather than half-supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisInput {
    Text(String),
    PreChunked(Vec<String>),
}

impl From<String> for SynthesisInput {
    fn from(text: String) -> Self {
        SynthesisInput::Text(text)
    }
}

impl From<&str> for SynthesisInput {
    fn from(text: &str) -> Self {
        SynthesisInput::Text(text.to_string())
    }
}

/// Plans synthesis chunks under a byte ceiling.
#[derive(Debug, Clone)]
pub struct ChunkPlanner {
    max_chunk_bytes: usize,
    policy: ChunkPolicy,
    tokenizer: SentenceTokenizer,
}

impl ChunkPlanner {
    /// Create a planner. `max_chunk_bytes` is clamped to what the
    /// synthesizer accepts.
    pub fn new(max_chunk_bytes: usize, policy: ChunkPolicy) -> Self {
        Self {
            max_chunk_bytes: clamp_chunk_bytes(max_chunk_bytes),
            policy,
            tokenizer: SentenceTokenizer::default(),
        }
    }

    /// Replace the sentence tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: SentenceTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Effective ceiling after clamping.
    pub fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    pub fn policy(&self) -> ChunkPolicy {
        self.policy
    }

    /// Plan any synthesis input.
    ///
    /// # Errors
    /// `InvalidInputKind` for pre-chunked input.
    pub fn plan_input(&self, input: &SynthesisInput) -> Result<Vec<Chunk>> {
        match input {
            SynthesisInput::Text(text) => Ok(self.plan(text)),
            SynthesisInput::PreChunked(_) => Err(DecoError::InvalidInputKind {
                message: "pre-chunked input is not supported, pass a single text".to_string(),
            }),
        }
    }

    /// Split `text` into chunks of at most `max_chunk_bytes` each.
    ///
    /// Text that already fits comes back verbatim as a single chunk.
    pub fn plan(&self, text: &str) -> Vec<Chunk> {
        if text.len() <= self.max_chunk_bytes {
            return vec![Chunk::Text(text.to_string())];
        }

        let sentences = self.tokenizer.tokenize(text);
        match self.policy {
            ChunkPolicy::PerSentence => self.plan_per_sentence(sentences),
            ChunkPolicy::Greedy => self.plan_greedy(sentences),
        }
    }

    fn plan_per_sentence(&self, sentences: Vec<String>) -> Vec<Chunk> {
        let longest = sentences.iter().map(String::len).max().unwrap_or(0);
        if longest <= self.max_chunk_bytes {
            return sentences.into_iter().map(Chunk::Text).collect();
        }

        sentences
            .into_iter()
            .map(|sentence| self.fit(sentence))
            .collect()
    }

    fn plan_greedy(&self, sentences: Vec<String>) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if sentence.len() > self.max_chunk_bytes {
                if !current.is_empty() {
                    chunks.push(Chunk::Text(std::mem::take(&mut current)));
                }
                chunks.push(self.fit(sentence));
                continue;
            }

            let joined_len = if current.is_empty() {
                sentence.len()
            } else {
                current.len() + 1 + sentence.len()
            };

            if joined_len > self.max_chunk_bytes {
                chunks.push(Chunk::Text(std::mem::take(&mut current)));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
        }

        if !current.is_empty() {
            chunks.push(Chunk::Text(current));
        }
        chunks
    }

    fn fit(&self, sentence: String) -> Chunk {
        if sentence.len() <= self.max_chunk_bytes {
            Chunk::Text(sentence)
        } else {
            Chunk::Slices(byte_windows(&sentence, self.max_chunk_bytes))
        }
    }
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self::new(MAX_SYNTHESIS_BYTES, ChunkPolicy::default())
    }
}

/// Cut `text` into consecutive windows of at most `max` bytes.
///
/// Windows end on character boundaries, so a window holding multi-byte
/// characters may be a few bytes short of `max`. `max` must be at least 4.
pub fn byte_windows(text: &str, max: usize) -> Vec<String> {
    let max = max.max(4);
    let mut windows = Vec::with_capacity(text.len() / max + 1);
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        windows.push(text[start..end].to_string());
        start = end;
    }
    windows
}
