//! # CLI Interface
//!
//! Defines the command-line argument structure for `powertx` using `clap`
//! derive. Supports four subcommands: `encode`, `decode`, `inspect`, and
//! `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Power transaction payload tool.
///
/// Converts structured objects to and from the canonical hex transport
/// encoding, and inspects serialized transaction bodies and envelopes.
#[derive(Parser, Debug)]
#[command(
    name = "powertx",
    about = "Power transaction payload tool",
    version,
    propagate_version = true
)]
pub struct PowerTxCli {
    #[command(flatten)]
    pub logging: LoggingArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Logging options shared by every subcommand.
#[derive(Args, Debug)]
pub struct LoggingArgs {
    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "POWERTX_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Level for the powertx targets (or a full filter directive list) when
    /// `RUST_LOG` is not set.
    #[arg(long, global = true, env = "POWERTX_LOG", default_value = "warn")]
    pub log_level: String,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a JSON object into canonical hex. Binary fields are written as
    /// `{"$bin": "<hex>"}`.
    Encode(EncodeArgs),
    /// Decode canonical hex into pretty-printed JSON.
    Decode(DecodeArgs),
    /// Decode a transaction body (or signed envelope) and print its fields.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `encode` subcommand.
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// JSON file to read. Reads stdin when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

/// Arguments for the `decode` subcommand.
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded payload.
    pub hex: String,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Hex-encoded transaction body or envelope.
    pub hex: String,

    /// Treat the payload as a signed envelope instead of a bare body.
    #[arg(long, short = 'e')]
    pub envelope: bool,
}
