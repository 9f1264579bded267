//! # calibrs Exec Handler
//!
//! File: cli/src/commands/exec.rs
//!
//! ## Overview
//!
//! Implements `calibrs exec`, which hands an already written command line to the
//! shell unchanged. Per-call overrides (`--cwd`, `--timeout`, `--max-buffer`)
//! apply to this invocation only, on top of the configured defaults.
//!
//! ## Usage
//!
//! ```bash
//! calibrs exec 'ebook-meta "my book.epub"'
//! calibrs exec 'calibredb check_library' --timeout 600
//! ```
//!
use calibrs::core::error::Result;
use calibrs::{Calibre, ExecOverrides};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Arguments for `calibrs exec`.
#[derive(Parser, Debug)]
#[command(
    about = "Execute a raw command line",
    long_about = "Passes COMMAND_LINE to the shell as-is and prints its output. Nothing is quoted or added."
)]
pub struct ExecArgs {
    /// Complete command line to execute.
    command_line: String,

    /// Working directory for this call.
    #[arg(long, short = 'C', value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Kill the command after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum bytes captured from stdout or stderr.
    #[arg(long, value_name = "BYTES")]
    max_buffer: Option<usize>,
}

impl ExecArgs {
    fn overrides(&self) -> ExecOverrides {
        ExecOverrides {
            max_buffer: self.max_buffer,
            cwd: self.cwd.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            ..Default::default()
        }
    }
}

pub async fn handle_exec(args: ExecArgs, calibre: &Calibre) -> Result<()> {
    info!("Handling exec command...");
    debug!("Exec args: {:?}", args);

    let output = calibre.exec_with(&args.command_line, &args.overrides()).await?;
    print!("{}", output);
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_args_parsing() {
        let args = ExecArgs::try_parse_from([
            "exec",
            "ebook-meta \"a b.epub\"",
            "-C",
            "/books",
            "--timeout",
            "30",
            "--max-buffer",
            "1024",
        ])
        .unwrap();

        assert_eq!(args.command_line, "ebook-meta \"a b.epub\"");
        let overrides = args.overrides();
        assert_eq!(overrides.cwd, Some(PathBuf::from("/books")));
        assert_eq!(overrides.timeout, Some(Duration::from_secs(30)));
        assert_eq!(overrides.max_buffer, Some(1024));
        assert!(overrides.env.is_empty());
    }

    #[test]
    fn test_exec_without_overrides() {
        let args = ExecArgs::try_parse_from(["exec", "calibredb list"]).unwrap();
        assert_eq!(args.overrides(), ExecOverrides::default());
    }

    #[test]
    fn test_exec_requires_command_line() {
        assert!(ExecArgs::try_parse_from(["exec"]).is_err());
    }
}
