//! Content pipeline: ingest → cleanup → optimize → synthesize.

use crate::config::Config;
use crate::error::{DecoError, Result};
use crate::pipeline::capture::capture;
use crate::pipeline::input::{InputKind, RawInput};
use crate::pipeline::sink::OutputSink;
use crate::pipeline::streamer::SynthesisStream;
use crate::services::{AudioFormat, AudioInput, ChatService, IngestService, SynthesisService};
use crate::text::{ChunkPlanner, ChunkPolicy, SectionMarker, extract_section};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Pipeline position. Stages run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Ingest,
    Cleanup,
    Optimize,
    Synthesize,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Ingest => "ingest",
            PipelineState::Cleanup => "cleanup",
            PipelineState::Optimize => "optimize",
            PipelineState::Synthesize => "synthesize",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Settings for one stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageConfig {
    pub skip: bool,
    /// System prompt for chat stages.
    pub prompt: String,
    pub model_id: String,
    /// Where to capture the stage's output text.
    pub capture_path: Option<PathBuf>,
}

/// Everything the pipeline reads. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Transcription settings; `skip` is unused.
    pub ingest: StageConfig,
    pub cleanup: StageConfig,
    pub optimization: StageConfig,
    /// Only `skip` applies; voice settings live in the synthesis service.
    pub synthesis: StageConfig,
    pub max_chunk_bytes: usize,
    pub chunk_policy: ChunkPolicy,
    pub section_marker: SectionMarker,
    /// Suppress output messages
    pub quiet: bool,
    /// Verbosity level (0=stages, 1=timings and tokens, 2=per-chunk sizes)
    pub verbosity: u8,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ingest: StageConfig {
                skip: false,
                prompt: String::new(),
                model_id: config.transcription.model.clone(),
                capture_path: config.transcription.output_file.clone(),
            },
            cleanup: StageConfig {
                skip: config.cleanup.skip,
                prompt: config.cleanup.prompt.clone(),
                model_id: config.cleanup.model.clone(),
                capture_path: config.cleanup.output_file.clone(),
            },
            optimization: StageConfig {
                skip: config.optimization.skip,
                prompt: config.optimization.prompt.clone(),
                model_id: config.optimization.model.clone(),
                capture_path: config.optimization.output_file.clone(),
            },
            synthesis: StageConfig {
                skip: config.speech_synthesis.skip,
                prompt: String::new(),
                model_id: config.speech_synthesis.voice.name.clone(),
                capture_path: None,
            },
            max_chunk_bytes: config.speech_synthesis.max_chunk_bytes(),
            chunk_policy: config.speech_synthesis.chunk_policy,
            section_marker: SectionMarker::default(),
            quiet: false,
            verbosity: 0,
        }
    }

    pub fn with_logging(mut self, quiet: bool, verbosity: u8) -> Self {
        self.quiet = quiet;
        self.verbosity = verbosity;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Prompt tokens billed per chat stage. `None` when the stage was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub cleanup: Option<u32>,
    pub optimization: Option<u32>,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.cleanup.unwrap_or(0) + self.optimization.unwrap_or(0)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub final_state: PipelineState,
    pub ingested_bytes: usize,
    pub final_text_bytes: usize,
    /// Synthesis requests made.
    pub chunks: usize,
    pub audio_blocks: usize,
    pub audio_bytes: usize,
    pub tokens: TokenUsage,
}

/// The staged content pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    planner: ChunkPlanner,
    ingest: Arc<dyn IngestService>,
    chat: Arc<dyn ChatService>,
    synthesizer: Arc<dyn SynthesisService>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        ingest: Arc<dyn IngestService>,
        chat: Arc<dyn ChatService>,
        synthesizer: Arc<dyn SynthesisService>,
    ) -> Self {
        let planner = ChunkPlanner::new(config.max_chunk_bytes, config.chunk_policy);
        Self {
            config,
            planner,
            ingest,
            chat,
            synthesizer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every enabled stage and write the result to `sink`.
    ///
    /// Capture files already written stay on disk when a later stage
    /// fails. The sink receives nothing unless the run reaches output.
    pub async fn run(&self, input: RawInput, sink: &mut dyn OutputSink) -> Result<RunReport> {
        let started = Instant::now();
        let mut tokens = TokenUsage::default();

        self.enter(PipelineState::Ingest, started);
        let mut text = self.ingest_stage(input).await?;
        let ingested_bytes = text.len();
        self.detail(|| format!("ingested {ingested_bytes} bytes"));

        if self.config.cleanup.skip {
            self.skipped(PipelineState::Cleanup);
        } else {
            self.enter(PipelineState::Cleanup, started);
            let completion = self
                .chat
                .complete(&self.config.cleanup.prompt, &text, &self.config.cleanup.model_id)
                .await?;
            tokens.cleanup = Some(completion.prompt_tokens);
            self.detail(|| format!("cleanup used {} prompt tokens", completion.prompt_tokens));
            text = completion.text;
            self.capture(&self.config.cleanup, &text, "cleanup").await;
        }

        if self.config.optimization.skip {
            self.skipped(PipelineState::Optimize);
        } else {
            self.enter(PipelineState::Optimize, started);
            let completion = self
                .chat
                .complete(
                    &self.config.optimization.prompt,
                    &text,
                    &self.config.optimization.model_id,
                )
                .await?;
            tokens.optimization = Some(completion.prompt_tokens);
            self.detail(|| {
                format!(
                    "optimization used {} prompt tokens",
                    completion.prompt_tokens
                )
            });
            text = extract_section(&completion.text, &self.config.section_marker);
            if text.is_empty() && !self.config.quiet {
                eprintln!(
                    "deco: warning: optimization reply had no \"{} {}\" section",
                    self.config.section_marker.prefix, self.config.section_marker.id
                );
            }
            self.capture(&self.config.optimization, &text, "optimization")
                .await;
        }

        let mut report = RunReport {
            final_state: PipelineState::Synthesize,
            ingested_bytes,
            final_text_bytes: text.len(),
            chunks: 0,
            audio_blocks: 0,
            audio_bytes: 0,
            tokens,
        };

        if self.config.synthesis.skip {
            self.skipped(PipelineState::Synthesize);
            sink.write_text(&text)?;
        } else {
            self.enter(PipelineState::Synthesize, started);
            self.synthesize_stage(&text, sink, &mut report).await?;
        }
        sink.finish()?;

        report.final_state = PipelineState::Done;
        self.enter(PipelineState::Done, started);
        self.detail(|| {
            format!(
                "{} prompt tokens, {} audio bytes in {} blocks",
                report.tokens.total(),
                report.audio_bytes,
                report.audio_blocks
            )
        });
        Ok(report)
    }

    async fn ingest_stage(&self, input: RawInput) -> Result<String> {
        let format = match input.kind {
            InputKind::Text => {
                return String::from_utf8(input.bytes)
                    .map_err(|source| DecoError::Encoding { source });
            }
            InputKind::Audio(format) => format,
            InputKind::StreamedAudio => self.sniff(&input.bytes)?,
        };

        self.detail(|| format!("transcribing {} bytes of {format}", input.bytes.len()));
        let audio = AudioInput::new(input.bytes, format);
        let transcript = self
            .ingest
            .transcribe(&audio, &self.config.ingest.model_id)
            .await?;
        self.capture(&self.config.ingest, &transcript, "transcript")
            .await;
        Ok(transcript)
    }

    fn sniff(&self, bytes: &[u8]) -> Result<AudioFormat> {
        self.ingest.detect_audio_format(bytes).ok_or_else(|| {
            let supported: Vec<&str> = AudioFormat::ALL.iter().map(|f| f.extension()).collect();
            DecoError::UnrecognizedAudioFormat {
                detail: format!(
                    "stdin does not start with a known signature (supported: {})",
                    supported.join(", ")
                ),
            }
        })
    }

    async fn synthesize_stage(
        &self,
        text: &str,
        sink: &mut dyn OutputSink,
        report: &mut RunReport,
    ) -> Result<()> {
        if text.trim().is_empty() {
            return Err(DecoError::EmptySynthesisOutput);
        }

        let mut stream = SynthesisStream::new(self.synthesizer.as_ref(), &self.planner, text);
        report.chunks = stream.remaining();
        self.detail(|| {
            format!(
                "{} synthesis requests, at most {} bytes each",
                report.chunks, self.config.max_chunk_bytes
            )
        });
        if self.config.verbosity >= 2 && !self.config.quiet {
            eprintln!("deco: chunk sizes {:?}", stream.pending_sizes());
        }

        let first = match stream.next_block().await {
            None => return Err(DecoError::EmptySynthesisOutput),
            Some(block) => block?,
        };
        if first.data.is_empty() {
            return Err(DecoError::EmptySynthesisOutput);
        }

        let mut next = Some(first);
        while let Some(block) = next {
            self.trace(|| format!("block {}: {} bytes", block.index, block.data.len()));
            sink.write_audio(&block.data)?;
            report.audio_blocks += 1;
            report.audio_bytes += block.data.len();
            next = stream.next_block().await.transpose()?;
        }
        Ok(())
    }

    async fn capture(&self, stage: &StageConfig, text: &str, label: &str) {
        let written = capture(stage.capture_path.as_deref(), text, label, self.config.quiet).await;
        if written && let Some(path) = &stage.capture_path {
            self.detail(|| format!("wrote {label} to {}", path.display()));
        }
    }

    fn enter(&self, state: PipelineState, started: Instant) {
        if self.config.quiet {
            return;
        }
        if self.config.verbosity >= 1 {
            eprintln!("deco: [{:>6.2}s] {state}", started.elapsed().as_secs_f64());
        } else if state != PipelineState::Done {
            eprintln!("deco: {state}");
        }
    }

    fn skipped(&self, state: PipelineState) {
        if self.config.verbosity >= 1 && !self.config.quiet {
            eprintln!("deco: {state} skipped");
        }
    }

    fn detail(&self, message: impl FnOnce() -> String) {
        if self.config.verbosity >= 1 && !self.config.quiet {
            eprintln!("deco:   {}", message());
        }
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        if self.config.verbosity >= 2 && !self.config.quiet {
            eprintln!("deco:   {}", message());
        }
    }
}
