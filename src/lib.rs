//! deco - document narration through an LLM rewrite chain
//!
//! Reads text or a recording, optionally cleans it up and rewrites it for
//! listening with a chat model, then synthesizes speech in size-bounded
//! chunks and streams the audio out in order.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod text;

// Composition root - needs the cloud clients
#[cfg(feature = "cloud")]
pub mod app;

// Collaborator traits (ingest → chat → synthesis) and test doubles
pub use services::{
    AudioFormat, ChatService, IngestService, MockChat, MockIngest, MockSynthesizer,
    SynthesisService,
};

// Pipeline
pub use pipeline::{
    CollectorSink, FileSink, OutputSink, Pipeline, PipelineConfig, PipelineState, RawInput,
    RunReport, StdoutSink,
};

// Text processing
pub use text::{ChunkPlanner, ChunkPolicy, SentenceTokenizer, extract_section, tokenize};

// Error handling
pub use error::{DecoError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.0+abc1234"` when git hash is available, `"0.3.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
