use anyhow::Result;
use clap::{CommandFactory, Parser};
use deco::app::{RunOptions, run_deco_command};
use deco::cli::{Cli, Commands, ConfigAction};
use deco::config::{Config, load_dotenv};
use owo_colors::OwoColorize;
use std::path::Path;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", format!("Error: {e:#}").red());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match load_dotenv() {
        Ok(Some(path)) if cli.verbose >= 1 && !cli.quiet => {
            eprintln!("deco: loaded {}", path.display());
        }
        Ok(_) => {}
        Err(e) => {
            if !cli.quiet {
                eprintln!("deco: warning: {e}");
            }
        }
    }

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            let options = RunOptions {
                in_file: cli.in_file,
                out_file: cli.out_file,
                transcribe: cli.transcribe,
                no_cleanup: cli.no_cleanup,
                no_optimize: cli.no_optimize,
                no_speech: cli.no_speech,
                extra_outputs: cli.extra_outputs,
                quiet: cli.quiet,
                verbosity: cli.verbose,
            };
            let report = run_deco_command(config, options).await?;
            if !cli.quiet && cli.verbose == 0 && report.audio_blocks > 0 {
                eprintln!(
                    "deco: wrote {} bytes of audio ({} chunks)",
                    report.audio_bytes, report.audio_blocks
                );
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "deco", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. ./deco.toml
/// 3. Default config path (~/.config/deco/config.toml)
/// 4. Built-in defaults
///
/// Environment variable overrides are applied last, after `.env` has
/// been loaded.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = Config::discover(custom_path)?;
    Ok(config.with_env_overrides())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Dump => {
            print!("{}", Config::dump_default()?);
        }
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => match Config::default_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("Could not determine config directory"),
        },
    }
    Ok(())
}
