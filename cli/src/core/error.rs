//! # calibrs Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy shared by the command façade and the
//! CLI. A call to one of the external calibre binaries either resolves with the
//! captured standard output or fails with exactly one `CalibreError`.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `CalibreError`: A `thiserror` enum covering every way an invocation can fail
//! - `Result<T>`: A type alias for `anyhow::Result<T>`, used by configuration
//!   loading and the CLI handlers where context matters more than the variant
//!
//! Invocation failures fall into two shapes:
//! - **Host errors** (`Spawn`, `Exit`, `Io`, `MaxBufferExceeded`, `Timeout`):
//!   the shell could not be started, the process exited unsuccessfully, its
//!   output could not be read, or a resource bound was hit.
//! - **Diagnostic output** (`Stderr`): the process exited successfully but wrote
//!   to standard error. The raw text is carried unmodified.
//!
//! ## Examples
//!
//! ```rust,no_run
//! # async fn demo() {
//! use calibrs::{Calibre, CalibreError};
//!
//! let calibre = Calibre::default();
//! match calibre.exec("ebook-meta book.epub").await {
//!     Ok(stdout) => println!("{stdout}"),
//!     Err(CalibreError::Stderr(text)) => eprintln!("tool complained: {text}"),
//!     Err(e) => eprintln!("invocation failed: {e}"),
//! }
//! # }
//! ```
//!
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while building or executing a calibre command.
// No PartialEq: `io::Error` does not implement it.
#[derive(Error, Debug)]
pub enum CalibreError {
    #[error("Failed to spawn command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command `{command}` failed with {}:\n{stderr}", describe_code(.code))]
    Exit {
        command: String,
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to collect output of `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command `{command}` exceeded the {limit} byte {stream} buffer")]
    MaxBufferExceeded {
        command: String,
        stream: OutputStream,
        limit: usize,
    },

    #[error("Command `{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    /// The process exited successfully but wrote to standard error.
    #[error("{0}")]
    Stderr(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

impl CalibreError {
    /// True for the stderr-only failure, where no host-level error occurred.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, CalibreError::Stderr(_))
    }

    /// Exit code of the failed process, when there was one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CalibreError::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

/// Which captured stream overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStream::Stdout => write!(f, "stdout"),
            OutputStream::Stderr => write!(f, "stderr"),
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

/// Result returned by the façade's execution operations.
pub type ExecResult<T> = std::result::Result<T, CalibreError>;

/// Type alias for Result using anyhow::Error for configuration and CLI code.
pub type Result<T> = anyhow::Result<T>;
