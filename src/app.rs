//! Narration entry point.
//!
//! Wires the cloud clients into the content pipeline:
//! read input → transcribe → clean up → optimize → synthesize → write

use crate::config::Config;
use crate::defaults::STREAM_TRUNK;
use crate::error::Result;
use crate::pipeline::{
    FileSink, OutputSink, Pipeline, PipelineConfig, RawInput, RunReport, StdoutSink,
};
use crate::services::{GoogleTtsClient, OpenAiClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-invocation options from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub in_file: Option<PathBuf>,
    pub out_file: Option<PathBuf>,
    pub transcribe: bool,
    pub no_cleanup: bool,
    pub no_optimize: bool,
    pub no_speech: bool,
    pub extra_outputs: bool,
    pub quiet: bool,
    pub verbosity: u8,
}

/// Fold command-line flags into the configuration.
pub fn apply_overrides(mut config: Config, options: &RunOptions) -> Config {
    if options.no_cleanup {
        config.cleanup.skip = true;
    }
    if options.no_optimize {
        config.optimization.skip = true;
    }
    if options.no_speech {
        config.speech_synthesis.skip = true;
    }
    if options.extra_outputs {
        let trunk = extra_output_trunk(options.in_file.as_deref(), options.out_file.as_deref());
        config = config.with_extra_outputs(&trunk);
    }
    config
}

/// Path prefix for extra outputs.
///
/// The input file without its extension, else the output file without
/// its extension, else `./deco`.
pub fn extra_output_trunk(in_file: Option<&Path>, out_file: Option<&Path>) -> PathBuf {
    in_file
        .or(out_file)
        .map(|path| path.with_extension(""))
        .unwrap_or_else(|| Path::new(".").join(STREAM_TRUNK))
}

/// Run the narration pipeline against the cloud providers.
pub async fn run_deco_command(config: Config, options: RunOptions) -> Result<RunReport> {
    let config = apply_overrides(config, &options);
    config.validate()?;

    let input = match &options.in_file {
        Some(path) => RawInput::from_path(path).await?,
        None => RawInput::from_stdin(options.transcribe).await?,
    };

    let openai = Arc::new(OpenAiClient::new(&config.openai));
    let synthesizer = Arc::new(GoogleTtsClient::new(&config.speech_synthesis));
    let pipeline_config =
        PipelineConfig::from_config(&config).with_logging(options.quiet, options.verbosity);
    let pipeline = Pipeline::new(pipeline_config, openai.clone(), openai, synthesizer);

    let mut sink: Box<dyn OutputSink> = match &options.out_file {
        Some(path) => Box::new(FileSink::new(path)),
        None => Box::new(StdoutSink),
    };

    if options.verbosity >= 1 && !options.quiet {
        eprintln!(
            "deco {}: {} → {}",
            crate::version_string(),
            describe(options.in_file.as_deref(), "stdin"),
            describe(options.out_file.as_deref(), sink.name())
        );
    }

    pipeline.run(input, sink.as_mut()).await
}

fn describe(path: Option<&Path>, fallback: &str) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_prefers_input_file() {
        let trunk = extra_output_trunk(
            Some(Path::new("/data/talk.m4a")),
            Some(Path::new("/out/talk.mp3")),
        );
        assert_eq!(trunk, PathBuf::from("/data/talk"));
    }

    #[test]
    fn trunk_falls_back_to_output_file() {
        let trunk = extra_output_trunk(None, Some(Path::new("narration.mp3")));
        assert_eq!(trunk, PathBuf::from("narration"));
    }

    #[test]
    fn trunk_for_streams_is_local_deco() {
        assert_eq!(extra_output_trunk(None, None), PathBuf::from("./deco"));
    }

    #[test]
    fn trunk_keeps_inner_dots() {
        let trunk = extra_output_trunk(Some(Path::new("notes.v2.txt")), None);
        assert_eq!(trunk, PathBuf::from("notes.v2"));
    }

    #[test]
    fn flags_set_skips() {
        let options = RunOptions {
            no_cleanup: true,
            no_speech: true,
            ..RunOptions::default()
        };
        let config = apply_overrides(Config::default(), &options);

        assert!(config.cleanup.skip);
        assert!(!config.optimization.skip);
        assert!(config.speech_synthesis.skip);
        assert_eq!(config.cleanup.output_file, None);
    }

    #[test]
    fn extra_outputs_override_config_paths() {
        let mut config = Config::default();
        config.cleanup.output_file = Some(PathBuf::from("/elsewhere/clean.txt"));
        let options = RunOptions {
            in_file: Some(PathBuf::from("/data/talk.m4a")),
            extra_outputs: true,
            ..RunOptions::default()
        };

        let config = apply_overrides(config, &options);
        assert_eq!(
            config.cleanup.output_file,
            Some(PathBuf::from("/data/talk-clean.txt"))
        );
        assert_eq!(
            config.transcription.output_file,
            Some(PathBuf::from("/data/talk-trans.txt"))
        );
    }

    #[test]
    fn flags_absent_keep_config() {
        let mut config = Config::default();
        config.optimization.skip = true;
        let config = apply_overrides(config, &RunOptions::default());
        assert!(config.optimization.skip);
        assert!(!config.cleanup.skip);
    }
}
