// ABOUTME: Entry point for the pinject CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use pinject::config::{self, Config, PullPolicy};
use pinject::error::Result;
use pinject::output::{Output, OutputMode};
use pinject::runtime::RuntimeType;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let cwd = env::current_dir()?;
    let output = Output::new(mode);

    let Cli {
        config: config_path,
        runtime,
        socket,
        pull,
        command,
        ..
    } = cli;

    match command {
        Commands::Init { force } => {
            let path = config::init_config(&cwd, force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Build {
            source,
            tag,
            dry_run,
        } => {
            let config = load_config(&cwd, config_path.as_deref(), runtime, socket, pull)?;
            commands::build(&config, &source, &tag, dry_run, output).await
        }
        Commands::Detect { source } => {
            let config = load_config(&cwd, config_path.as_deref(), runtime, socket, pull)?;
            commands::detect(&config, &source, output).await
        }
    }
}

/// Load the config file and apply command-line overrides.
fn load_config(
    cwd: &Path,
    path: Option<&Path>,
    runtime: Option<RuntimeType>,
    socket: Option<String>,
    pull: Option<PullPolicy>,
) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(cwd)?,
    };

    if runtime.is_some() {
        config.runtime = runtime;
    }
    if socket.is_some() {
        config.socket = socket;
    }
    if let Some(pull) = pull {
        config.pull = pull;
    }

    Ok(config)
}
