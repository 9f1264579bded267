//! # calibrs Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the `calibrs` CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading configuration and building the `Calibre` façade
//! - Routing execution to appropriate command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! calibrs --help
//!
//! # Convert with the executed command line logged
//! calibrs --log-commands convert dune.epub mobi
//!
//! # List a specific library
//! calibrs --library ~/Books run "calibredb list"
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Load configuration, apply global flag overrides
//! 3. Configure logging based on verbosity level and the command log setting
//! 4. Route to the subcommand handler
//! 5. Format and display any errors that occur
//!
use anyhow::Context;
use calibrs::core::config;
use calibrs::{Calibre, CalibreConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Subcommand handlers (convert, run, exec)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "calibrs",
    about = "📚 calibrs: run the calibre e-book tools with typed, safely quoted arguments",
    long_about = "Builds shell-safe command lines for ebook-convert, calibredb and friends, \
                  runs them, and reports their output.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Calibre library injected into calibredb commands as --library-path.
    #[arg(long, env = "CALIBRS_LIBRARY", global = true, value_name = "PATH")]
    library: Option<String>,

    /// Log every command line before it is executed.
    #[arg(long, global = true)]
    log_commands: bool,
}

/// Enum defining all available top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    #[command(alias = "c")]
    Convert(commands::convert::ConvertArgs),
    #[command(alias = "r")]
    Run(commands::run::RunArgs),
    #[command(alias = "x")]
    Exec(commands::exec::ExecArgs),
}

fn log_level(verbose: u8, log_commands: bool) -> &'static str {
    match verbose {
        0 if log_commands => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Applies the global flags on top of the loaded configuration.
fn resolve_config(cli: &Cli, cfg: &config::Config) -> CalibreConfig {
    let mut calibre_config = cfg.to_calibre_config();
    if let Some(library) = &cli.library {
        calibre_config.library_path = shellexpand::tilde(library).into_owned();
    }
    if cli.log_commands {
        calibre_config.log_commands = true;
    }
    calibre_config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolved before the subscriber is installed: a configured `log_commands`
    // sets the log floor. Messages from the loader itself are not shown.
    let loaded = config::load_config()
        .context("Failed to load calibrs configuration")
        .map(|cfg| resolve_config(&cli, &cfg));
    let log_commands = match &loaded {
        Ok(calibre_config) => calibre_config.log_commands,
        Err(_) => cli.log_commands,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose, log_commands)));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match loaded {
        Ok(calibre_config) => {
            tracing::debug!("Resolved calibre configuration: {:?}", calibre_config);
            let calibre = Calibre::new(calibre_config);
            match cli.command {
                Commands::Convert(args) => commands::convert::handle_convert(args, &calibre).await,
                Commands::Run(args) => commands::run::handle_run(args, &calibre).await,
                Commands::Exec(args) => commands::exec::handle_exec(args, &calibre).await,
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
