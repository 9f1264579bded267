//! # calibrs Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! This module executes a fully rendered command line through the platform
//! shell (`/bin/sh -c` on Unix, `cmd /C` on Windows) using
//! `tokio::process::Command`, captures its output, and classifies the outcome.
//!
//! ## Architecture
//!
//! - **`ExecOptions`**: the execution defaults held by a façade instance
//!   (output buffer cap, working directory, extra environment, timeout, shell).
//! - **`ExecOverrides`**: per-call overrides merged over `ExecOptions` for a
//!   single invocation; nothing is persisted.
//! - **`run_shell`**: spawns the shell, reads stdout and stderr concurrently
//!   (each capped at `max_buffer` bytes), waits for exit and maps the result:
//!
//! | Outcome                                  | Result                              |
//! |------------------------------------------|-------------------------------------|
//! | shell could not be spawned               | `CalibreError::Spawn`               |
//! | stdout/stderr larger than `max_buffer`   | `CalibreError::MaxBufferExceeded`   |
//! | `timeout` elapsed                        | `CalibreError::Timeout`             |
//! | non-zero exit or killed by a signal      | `CalibreError::Exit`                |
//! | exit 0 with non-empty stderr             | `CalibreError::Stderr`              |
//! | exit 0 with empty stderr                 | `Ok(stdout)`                        |
//!
//! Children are spawned with `kill_on_drop`, and a child that overflows its
//! buffer or times out is killed before the error is returned.
//!
use crate::core::error::{CalibreError, ExecResult, OutputStream};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Default cap on captured stdout/stderr, per stream.
pub const DEFAULT_MAX_BUFFER: usize = 100 * 1024 * 1024;

/// Execution defaults for every command run by a façade instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Maximum bytes captured from each of stdout and stderr.
    pub max_buffer: usize,
    /// Working directory for the shell; inherits the caller's when `None`.
    pub cwd: Option<PathBuf>,
    /// Variables added to the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Kill the process if it runs longer than this.
    pub timeout: Option<Duration>,
    /// Shell program used instead of the platform default.
    pub shell: Option<PathBuf>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            max_buffer: DEFAULT_MAX_BUFFER,
            cwd: None,
            env: BTreeMap::new(),
            timeout: None,
            shell: None,
        }
    }
}

impl ExecOptions {
    /// Returns these options with `overrides` applied on top.
    ///
    /// Scalar fields are replaced when set; environment variables are merged
    /// key by key with the override winning.
    pub fn merged(&self, overrides: &ExecOverrides) -> ExecOptions {
        let mut env = self.env.clone();
        env.extend(overrides.env.clone());
        ExecOptions {
            max_buffer: overrides.max_buffer.unwrap_or(self.max_buffer),
            cwd: overrides.cwd.clone().or_else(|| self.cwd.clone()),
            env,
            timeout: overrides.timeout.or(self.timeout),
            shell: overrides.shell.clone().or_else(|| self.shell.clone()),
        }
    }
}

/// Per-call changes to [`ExecOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOverrides {
    pub max_buffer: Option<usize>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub shell: Option<PathBuf>,
}

impl ExecOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.max_buffer = Some(bytes);
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, after: Duration) -> Self {
        self.timeout = Some(after);
        self
    }

    pub fn shell(mut self, program: impl Into<PathBuf>) -> Self {
        self.shell = Some(program.into());
        self
    }
}

/// Why output capture stopped early.
enum CaptureFailure {
    Io(io::Error),
    Overflow(OutputStream),
    TimedOut(Duration),
}

impl CaptureFailure {
    fn into_error(self, command: &str, limit: usize) -> CalibreError {
        let command = command.to_string();
        match self {
            CaptureFailure::Io(source) => CalibreError::Io { command, source },
            CaptureFailure::Overflow(stream) => CalibreError::MaxBufferExceeded {
                command,
                stream,
                limit,
            },
            CaptureFailure::TimedOut(after) => CalibreError::Timeout { command, after },
        }
    }
}

/// Builds the shell invocation for `command_line`.
fn shell_command(command_line: &str, shell: Option<&Path>) -> Command {
    #[cfg(windows)]
    let (default_shell, flag) = ("cmd", "/C");
    #[cfg(not(windows))]
    let (default_shell, flag) = ("/bin/sh", "-c");

    let mut cmd = match shell {
        Some(program) => Command::new(program),
        None => Command::new(default_shell),
    };
    cmd.arg(flag).arg(command_line);
    cmd
}

/// Reads `reader` to the end, failing once more than `limit` bytes arrive.
async fn read_capped<R>(
    reader: Option<R>,
    limit: usize,
    stream: OutputStream,
) -> Result<Vec<u8>, CaptureFailure>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(reader) = reader else {
        return Ok(buf);
    };
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut buf)
        .await
        .map_err(CaptureFailure::Io)?;
    if buf.len() > limit {
        return Err(CaptureFailure::Overflow(stream));
    }
    Ok(buf)
}

/// Maps a finished process to the caller-facing result.
fn classify(command: &str, status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> ExecResult<String> {
    let stderr = String::from_utf8_lossy(stderr).into_owned();
    if !status.success() {
        return Err(CalibreError::Exit {
            command: command.to_string(),
            code: status.code(),
            stderr,
        });
    }
    if !stderr.is_empty() {
        return Err(CalibreError::Stderr(stderr));
    }
    Ok(String::from_utf8_lossy(stdout).into_owned())
}

/// Runs `command_line` through the shell and returns its standard output.
///
/// # Errors
///
/// See the module table; exactly one `CalibreError` is returned on failure and
/// nothing is retried.
pub async fn run_shell(command_line: &str, options: &ExecOptions) -> ExecResult<String> {
    debug!("Spawning shell for: {}", command_line);
    debug!("Execution options: {:?}", options);

    let mut cmd = shell_command(command_line, options.shell.as_deref());
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(&options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CalibreError::Spawn {
        command: command_line.to_string(),
        source,
    })?;

    let limit = options.max_buffer;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let capture = async {
        let (out, err) = tokio::try_join!(
            read_capped(stdout, limit, OutputStream::Stdout),
            read_capped(stderr, limit, OutputStream::Stderr),
        )?;
        let status = child.wait().await.map_err(CaptureFailure::Io)?;
        Ok::<_, CaptureFailure>((status, out, err))
    };

    let captured = match options.timeout {
        Some(after) => tokio::time::timeout(after, capture)
            .await
            .unwrap_or(Err(CaptureFailure::TimedOut(after))),
        None => capture.await,
    };

    match captured {
        Ok((status, out, err)) => {
            debug!("Command exited with {}", status);
            classify(command_line, status, &out, &err)
        }
        Err(failure) => {
            if let Err(e) = child.kill().await {
                debug!("Could not kill child for `{}`: {}", command_line, e);
            }
            let error = failure.into_error(command_line, limit);
            warn!("{}", error);
            Err(error)
        }
    }
}
