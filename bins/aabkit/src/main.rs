//! aabkit CLI
//!
//! Prepares a machine for a Flutter Android release and builds a signed App
//! Bundle: checks the JDK, installs Flutter and the Android SDK when missing,
//! creates the upload keystore, then runs the Flutter build.

use aabkit_android::fetch::HttpFetcher;
use aabkit_android::pipeline::{Pipeline, PipelineOptions};
use aabkit_android::signing::SigningInputs;
use aabkit_cli::output::{format_duration, Status};
use aabkit_cli::prompt::TerminalPrompt;
use aabkit_core::config::{Config, PipelineConfig};
use aabkit_core::error::exit_codes;
use aabkit_core::process::SystemRunner;
use aabkit_core::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Build a signed Flutter Android App Bundle locally
#[derive(Parser)]
#[command(name = "aabkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keystore password (prompted when omitted)
    #[arg(long, value_name = "PASSWORD")]
    store_pass: Option<String>,

    /// Key password (prompted when omitted)
    #[arg(long, value_name = "PASSWORD")]
    key_pass: Option<String>,

    /// Key alias (prompted when omitted, default "key")
    #[arg(long, value_name = "ALIAS")]
    key_alias: Option<String>,

    /// Skip Flutter and Android SDK installation; tools must be on PATH
    #[arg(long)]
    skip_install: bool,

    /// Flutter project directory
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    project_root: PathBuf,

    /// Config file path, relative to the project directory
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }
    init_logging(cli.verbose);

    let started = Instant::now();
    match run(cli) {
        Ok(artifact) => {
            Status::success(&format!("AAB built: {}", artifact.display()));
            Status::info(&format!("Finished in {}", format_duration(started.elapsed())));
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "pipeline failed");
            Status::fatal(&err);
            ExitCode::from(exit_status(err.exit_code()))
        }
    }
}

/// `RUST_LOG` wins; otherwise the `-v` count picks the level
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<PathBuf> {
    let config = Config::load(&cli.project_root, cli.config.as_deref())?;
    let pipeline_config = PipelineConfig::from_env(&cli.project_root, config.schema)?;

    Status::header(&format!(
        "Building release App Bundle in {}",
        pipeline_config.project_root.display()
    ));

    let fetcher = HttpFetcher::new()?;
    let prompt = TerminalPrompt::new();
    let options = PipelineOptions {
        skip_install: cli.skip_install,
        signing: SigningInputs {
            store_password: cli.store_pass,
            key_password: cli.key_pass,
            key_alias: cli.key_alias,
        },
    };

    let report = Pipeline::new(&pipeline_config, &SystemRunner, &fetcher, &prompt).run(options)?;
    Ok(report.artifact)
}

/// Clamp a failure status into the range a process can report
fn exit_status(code: i32) -> u8 {
    u8::try_from(code.clamp(exit_codes::FAILURE, 255)).unwrap_or(1)
}
