//! # calibrs Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! The building blocks the [`Calibre`](crate::Calibre) façade is composed of,
//! from the leaf upward:
//!
//! - **`escape`**: makes any value safe inside a double-quoted shell token.
//! - **`command`**: serializes a command, its positional arguments and named
//!   options into one command line.
//! - **`process`**: runs a command line through the shell and classifies the
//!   outcome.
//!
//! ```rust
//! use calibrs::common::{command, escape};
//!
//! assert_eq!(escape::quote(r#"say "hi""#), r#""say \"hi\"""#);
//! assert_eq!(command::kebab_case("libraryPath"), "library-path");
//! ```
//!

/// Serialization of calls into command lines.
pub mod command;
/// Double-quote escaping for argument and option values.
pub mod escape;
/// Shell execution with bounded output capture.
pub mod process;
