//! # calibrs Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the subcommands of the `calibrs` binary. Each one is a
//! thin layer over the [`Calibre`](calibrs::Calibre) façade built in `main.rs`:
//!
//! - `convert`: `ebook-convert` an input file into another format
//! - `run`: serialize and execute an arbitrary calibre command
//! - `exec`: execute an already written command line
//!
//! ## Option Syntax
//!
//! `convert` and `run` accept named options for the underlying tool:
//!
//! ```bash
//! # -o KEY=VALUE, repeatable; repeating a key repeats the flag
//! calibrs run "calibredb add" book.epub -o authors=A -o authors=B
//! # -f KEY for bare flags
//! calibrs run "calibredb add" book.epub -f duplicates
//! ```
//!
//! Keys may be written in `camelCase` or `kebab-case`; single-character keys
//! become short flags.
//!
use anyhow::anyhow;
use calibrs::core::error::Result;
use calibrs::{CalibreError, CallOptions, OptionValue};

/// Implements `calibrs convert`.
pub mod convert;
/// Implements `calibrs exec`.
pub mod exec;
/// Implements `calibrs run`.
pub mod run;

/// Builds `CallOptions` from `-o KEY=VALUE` and `-f KEY` arguments.
///
/// Values keep their command-line order; a key given several times becomes a
/// repeatable option. A repeated `-f KEY` emits the bare flag once per use.
///
/// # Errors
///
/// Returns `CalibreError::ArgumentParsing` when an option has no `=` or an
/// empty key, or when a key is used both as a flag and with a value.
pub fn collect_options(options: &[String], flags: &[String]) -> Result<CallOptions> {
    let mut collected = CallOptions::new();
    for pair in options {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            anyhow!(CalibreError::ArgumentParsing(format!(
                "Expected KEY=VALUE for option, got '{}'.",
                pair
            )))
        })?;
        if key.is_empty() {
            return Err(anyhow!(CalibreError::ArgumentParsing(format!(
                "Option '{}' has an empty key.",
                pair
            ))));
        }
        collected.append(key, value);
    }
    for flag in flags {
        let has_value = match collected.get(flag) {
            Some(OptionValue::Value(_)) => true,
            Some(OptionValue::Values(values)) => values.iter().any(Option::is_some),
            Some(OptionValue::Flag) | None => false,
        };
        if has_value {
            return Err(anyhow!(CalibreError::ArgumentParsing(format!(
                "'{}' was given both as a flag and with a value.",
                flag
            ))));
        }
        collected.append_flag(flag.as_str());
    }
    Ok(collected)
}
