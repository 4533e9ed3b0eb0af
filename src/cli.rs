//! Command-line interface for deco
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Turn documents and recordings into narrated audio
#[derive(Parser, Debug)]
#[command(
    name = "deco",
    version,
    about = "Turn documents and recordings into narrated audio"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file (default: stdin). Audio extensions are transcribed:
    /// mp3, mp4, mpeg, mpga, m4a, wav, webm, flac
    #[arg(short, long, value_name = "PATH", conflicts_with = "transcribe")]
    pub in_file: Option<PathBuf>,

    /// Treat stdin as binary audio and transcribe it
    #[arg(short, long)]
    pub transcribe: bool,

    /// Output file (default: stdout). Use a suffix matching the output, e.g. .mp3 or .txt
    #[arg(short, long, value_name = "PATH")]
    pub out_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not clean up the input text
    #[arg(short = 'C', long)]
    pub no_cleanup: bool,

    /// Do not optimize the text for listening
    #[arg(short = 'O', long)]
    pub no_optimize: bool,

    /// Write the final text instead of synthesized speech
    #[arg(short = 'S', long)]
    pub no_speech: bool,

    /// Save intermediate texts next to the input (or output) file
    #[arg(short = 'x', long)]
    pub extra_outputs: bool,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: timings and tokens, -vv: per-chunk sizes)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Dump,
    /// Print the configuration that would be used, after file and env overrides
    Show,
    /// Print the user configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_default_command() {
        let cli = Cli::try_parse_from(["deco"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.in_file.is_none());
        assert!(cli.out_file.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.transcribe);
        assert!(!cli.no_cleanup);
        assert!(!cli.no_optimize);
        assert!(!cli.no_speech);
        assert!(!cli.extra_outputs);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "deco", "-i", "talk.m4a", "-o", "talk.mp3", "-c", "deco.toml", "-C", "-O", "-x",
        ])
        .unwrap();

        assert_eq!(cli.in_file, Some(PathBuf::from("talk.m4a")));
        assert_eq!(cli.out_file, Some(PathBuf::from("talk.mp3")));
        assert_eq!(cli.config, Some(PathBuf::from("deco.toml")));
        assert!(cli.no_cleanup);
        assert!(cli.no_optimize);
        assert!(!cli.no_speech);
        assert!(cli.extra_outputs);
    }

    #[test]
    fn test_parse_long_flags() {
        let cli = Cli::try_parse_from([
            "deco",
            "--transcribe",
            "--out-file",
            "out.txt",
            "--no-speech",
            "--no-cleanup",
        ])
        .unwrap();

        assert!(cli.transcribe);
        assert!(cli.no_speech);
        assert!(cli.no_cleanup);
        assert_eq!(cli.out_file, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_in_file_conflicts_with_transcribe() {
        let result = Cli::try_parse_from(["deco", "-i", "a.mp3", "-t"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["deco", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_quiet_short_flag() {
        let cli = Cli::try_parse_from(["deco", "-q"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_config_dump() {
        let cli = Cli::try_parse_from(["deco", "config", "dump"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Dump
            })
        ));
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["deco", "config", "show", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn test_config_requires_action() {
        assert!(Cli::try_parse_from(["deco", "config"]).is_err());
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["deco", "completions", "bash"]).unwrap();
        match cli.command {
            Some(Commands::Completions { shell }) => assert_eq!(shell, Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_invalid_command_returns_error() {
        assert!(Cli::try_parse_from(["deco", "record"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["deco", "--version"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
