//! Cascade Timer CLI
//!
//! Runs countdown timers with warning and final phases in the terminal:
//! - Each timer counts down through countdown, warning and final phases
//! - At the alarm, the next configured timer can start automatically
//! - Timer layouts can be validated from a JSON file

use anyhow::Result;
use clap::{CommandFactory, Parser};

use cascade_timer::cli::{run, Cli, Commands, Display};
use cascade_timer::config::HostConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the host configuration from `--config` or the default location.
fn load_config(cli: &Cli) -> Result<HostConfig> {
    let config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => match HostConfig::default_path() {
            Some(path) => HostConfig::load_or_default(&path)?,
            None => HostConfig::default(),
        },
    };
    Ok(config)
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match &cli.command {
        Some(Commands::Run(args)) => {
            let config = load_config(&cli)?;
            run::run(args, config).await?;
        }
        Some(Commands::Validate(args)) => {
            let config = load_config(&cli)?;
            run::validate(args, &config)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
