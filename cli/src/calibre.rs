//! # calibrs Command Façade (`calibre`)
//!
//! File: cli/src/calibre.rs
//!
//! ## Overview
//!
//! `Calibre` is the single entry point for invoking the calibre command-line
//! tools. It owns an immutable [`CalibreConfig`] (execution defaults, library
//! path, command logging) and exposes the call surface:
//!
//! - **`run`** / **`run_options`**: serialize a call and execute it.
//! - **`exec`** / **`exec_with`**: execute an already rendered command line.
//! - **`command_line`**: render a call without executing it.
//! - **`ebook_convert`**: convert a file and resolve with the output path.
//!
//! ## Architecture
//!
//! The configuration lives behind an `Arc`, so a `Calibre` is cheap to clone
//! and can be shared across tasks. Every call is a one-shot request/response:
//! each spawns its own child process and no state is shared between calls
//! beyond the read-only configuration.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use calibrs::{CallOptions, Calibre, CalibreConfig};
//!
//! # async fn demo() -> calibrs::ExecResult<()> {
//! let calibre = Calibre::new(CalibreConfig::default().with_library("/books/Calibre Library"));
//!
//! // calibredb list --library-path "/books/Calibre Library" --fields "title,authors"
//! let listing = calibre
//!     .run_options("calibredb list", &CallOptions::new().with("fields", "title,authors"))
//!     .await?;
//! println!("{listing}");
//!
//! let mobi = calibre
//!     .ebook_convert("dune.epub", "mobi", &CallOptions::new())
//!     .await?;
//! assert_eq!(mobi, "dune.epub.mobi");
//! # Ok(())
//! # }
//! ```
//!
use crate::common::command::{build_command, CallOptions};
use crate::common::process::{self, ExecOptions, ExecOverrides};
use crate::core::error::ExecResult;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration held by a [`Calibre`] instance for its whole lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalibreConfig {
    /// Defaults applied to every executed command.
    pub exec: ExecOptions,
    /// Injected as `--library-path` into `calibredb` calls when non-empty.
    pub library_path: String,
    /// Log every command line at `info` level before it runs.
    pub log_commands: bool,
}

impl CalibreConfig {
    pub fn with_library(mut self, path: impl Into<String>) -> Self {
        self.library_path = path.into();
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    pub fn with_exec_options(mut self, exec: ExecOptions) -> Self {
        self.exec = exec;
        self
    }
}

/// Façade over the calibre command-line tools.
#[derive(Debug, Clone, Default)]
pub struct Calibre {
    config: Arc<CalibreConfig>,
}

impl Calibre {
    pub fn new(config: CalibreConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CalibreConfig {
        &self.config
    }

    /// Renders the command line `run` would execute, without executing it.
    pub fn command_line<I, A>(&self, command: &str, args: I, options: &CallOptions) -> String
    where
        I: IntoIterator<Item = A>,
        A: Display,
    {
        build_command(command, args, options, &self.config.library_path)
    }

    /// Serializes `command`, `args` and `options`, then executes the result.
    ///
    /// `command` may carry a subcommand (`"calibredb add"`). Arguments are
    /// quoted in order; options are rendered as flags after them.
    pub async fn run<I, A>(&self, command: &str, args: I, options: &CallOptions) -> ExecResult<String>
    where
        I: IntoIterator<Item = A>,
        A: Display,
    {
        let command_line = self.command_line(command, args, options);
        self.exec(&command_line).await
    }

    /// `run` with no positional arguments.
    pub async fn run_options(&self, command: &str, options: &CallOptions) -> ExecResult<String> {
        self.run(command, std::iter::empty::<&str>(), options).await
    }

    /// Executes a rendered command line with the instance defaults.
    pub async fn exec(&self, command_line: &str) -> ExecResult<String> {
        self.exec_with(command_line, &ExecOverrides::default()).await
    }

    /// Executes a rendered command line with `overrides` merged over the
    /// instance defaults for this call only.
    pub async fn exec_with(
        &self,
        command_line: &str,
        overrides: &ExecOverrides,
    ) -> ExecResult<String> {
        if self.config.log_commands {
            info!("{}", command_line);
        } else {
            debug!("Executing: {}", command_line);
        }
        let options = self.config.exec.merged(overrides);
        process::run_shell(command_line, &options).await
    }

    /// Converts `input` to `format` with `ebook-convert`.
    ///
    /// The output path is `<input>.<format>` and is returned on success in
    /// place of the tool's stdout. Whether the file actually exists is not
    /// checked. Failures are returned unchanged.
    pub async fn ebook_convert(
        &self,
        input: &str,
        format: &str,
        options: &CallOptions,
    ) -> ExecResult<String> {
        let output = format!("{}.{}", input, format);
        self.run("ebook-convert", [input, output.as_str()], options)
            .await?;
        Ok(output)
    }
}
