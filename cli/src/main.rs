// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Power Transaction Tool
//!
//! Entry point for the `powertx` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand:
//!
//! - `encode`  — JSON object to canonical hex
//! - `decode`  — canonical hex to JSON
//! - `inspect` — field-by-field view of a transaction body or envelope
//! - `version` — print build version information

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use cli::{Commands, PowerTxCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = PowerTxCli::parse();

    logging::init_logging(
        &cli.logging.log_level,
        LogFormat::from_str_lossy(&cli.logging.log_format),
    );

    let output = match cli.command {
        Commands::Encode(args) => commands::encode(&args)?,
        Commands::Decode(args) => commands::decode(&args)?,
        Commands::Inspect(args) => commands::inspect(&args)?,
        Commands::Version => version_text(),
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Version information for the `version` subcommand.
fn version_text() -> String {
    format!(
        "powertx   {}\nenvelope  v{}\nrustc     {}\n",
        env!("CARGO_PKG_VERSION"),
        powertx_protocol::config::ENVELOPE_VERSION,
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    )
}
