//! # calibrs Convert Handler
//!
//! File: cli/src/commands/convert.rs
//!
//! ## Overview
//!
//! Implements `calibrs convert`, which runs `ebook-convert <INPUT> <INPUT>.<FORMAT>`
//! through the façade and prints the path of the converted file.
//!
//! ## Usage
//!
//! ```bash
//! # Produces dune.epub.mobi
//! calibrs convert dune.epub mobi
//!
//! # Pass conversion options
//! calibrs convert dune.epub azw3 -o outputProfile=kindle -f noInlineToc
//! ```
//!
use super::collect_options;
use anyhow::Context;
use calibrs::core::error::Result;
use calibrs::Calibre;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `calibrs convert`.
#[derive(Parser, Debug)]
#[command(
    about = "Convert an e-book with ebook-convert",
    long_about = "Runs ebook-convert on INPUT and writes INPUT.FORMAT next to it. Prints the output path."
)]
pub struct ConvertArgs {
    /// File to convert.
    input: String,

    /// Target format, used as the output file extension (e.g. mobi, azw3, pdf).
    format: String,

    /// Option for ebook-convert as KEY=VALUE. Repeat a key to repeat the flag.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// Bare flag for ebook-convert (no value).
    #[arg(short = 'f', long = "flag", value_name = "KEY")]
    flags: Vec<String>,
}

pub async fn handle_convert(args: ConvertArgs, calibre: &Calibre) -> Result<()> {
    info!("Handling convert command...");
    debug!("Convert args: {:?}", args);

    let options = collect_options(&args.options, &args.flags)?;
    let output = calibre
        .ebook_convert(&args.input, &args.format, &options)
        .await
        .with_context(|| format!("Failed to convert '{}' to {}", args.input, args.format))?;

    info!("Converted '{}' -> '{}'", args.input, output);
    println!("{}", output);
    Ok(())
}
