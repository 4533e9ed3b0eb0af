//! Content pipeline for document narration.
//!
//! Stages run strictly in sequence; the only suspension points are the
//! provider calls and output writes.

pub mod capture;
pub mod input;
pub mod orchestrator;
pub mod sink;
pub mod streamer;

pub use capture::capture;
pub use input::{InputKind, RawInput};
pub use orchestrator::{
    Pipeline, PipelineConfig, PipelineState, RunReport, StageConfig, TokenUsage,
};
pub use sink::{CollectorSink, FileSink, OutputSink, StdoutSink};
pub use streamer::{AudioBlock, SynthesisStream};
