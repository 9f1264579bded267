//! # calibrs Run Handler
//!
//! File: cli/src/commands/run.rs
//!
//! ## Overview
//!
//! Implements `calibrs run`, the general form of every call: a command (which may
//! include a subcommand, e.g. `"calibredb list"`), positional arguments and
//! named options are serialized into one command line and executed. The
//! tool's standard output is printed unchanged.
//!
//! With `--dry-run` the command line is printed instead of executed, which is
//! handy for checking quoting and the injected `--library-path`.
//!
//! ## Usage
//!
//! ```bash
//! calibrs --library ~/Books run "calibredb list" -o fields=title,authors -o limit=10
//! calibrs run ebook-meta book.epub -o title="New Title" --dry-run
//! ```
//!
use super::collect_options;
use calibrs::core::error::Result;
use calibrs::Calibre;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `calibrs run`.
#[derive(Parser, Debug)]
#[command(
    about = "Run a calibre command",
    long_about = "Serializes COMMAND, ARGS and options into a shell command line and executes it, printing its output."
)]
pub struct RunArgs {
    /// Tool to run, optionally with a subcommand (e.g. "calibredb list").
    command: String,

    /// Positional arguments, each passed as a single quoted argument.
    args: Vec<String>,

    /// Option as KEY=VALUE. Repeat a key to repeat the flag.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// Bare flag (no value).
    #[arg(short = 'f', long = "flag", value_name = "KEY")]
    flags: Vec<String>,

    /// Print the command line instead of executing it.
    #[arg(long)]
    dry_run: bool,
}

pub async fn handle_run(args: RunArgs, calibre: &Calibre) -> Result<()> {
    info!("Handling run command...");
    debug!("Run args: {:?}", args);

    let options = collect_options(&args.options, &args.flags)?;

    if args.dry_run {
        println!("{}", calibre.command_line(&args.command, &args.args, &options));
        return Ok(());
    }

    let output = calibre.run(&args.command, &args.args, &options).await?;
    print!("{}", output);
    Ok(())
}
