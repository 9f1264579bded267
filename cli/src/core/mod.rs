//! # calibrs Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure shared by the library and
//! the binary:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: The `CalibreError` taxonomy and `Result` aliases
//!
//! ## Usage
//!
//! ```rust
//! use calibrs::core::config; // For loading configuration
//! use calibrs::core::error::{CalibreError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
