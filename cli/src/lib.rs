//! # calibrs
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Typed command construction and async execution for the calibre e-book
//! command-line tools (`ebook-convert`, `calibredb`, `ebook-meta`, ...).
//!
//! A call is described by a command name, positional arguments and named
//! options. It is serialized into a single shell command line, where every
//! value is double-quoted and escaped, and executed as a child process. The
//! result is the captured standard output or a [`CalibreError`].
//!
//! ```rust,no_run
//! use calibrs::{CallOptions, Calibre, CalibreConfig};
//!
//! # async fn demo() -> calibrs::ExecResult<()> {
//! let calibre = Calibre::new(CalibreConfig::default().with_library("/books"));
//! let ids = calibre
//!     .run("calibredb add", ["dune.epub"], &CallOptions::new().with("authors", vec!["Frank Herbert"]))
//!     .await?;
//! println!("{ids}");
//! # Ok(())
//! # }
//! ```
//!
pub mod calibre;
pub mod common;
pub mod core;

pub use crate::calibre::{Calibre, CalibreConfig};
pub use crate::common::command::{CallOptions, OptionValue};
pub use crate::common::process::{ExecOptions, ExecOverrides};
pub use crate::core::error::{CalibreError, ExecResult};
