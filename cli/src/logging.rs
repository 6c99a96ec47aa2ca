//! # Structured Logging
//!
//! Installs the `tracing` subscriber for the `powertx` binary. Output goes to
//! stderr so that stdout carries only the command's result (hex or JSON),
//! ready to be piped.
//!
//! Event targets worth filtering on:
//!
//! ```text
//! powertx                        — the binary (commands, input handling)
//! powertx_protocol::codec        — trace per encode/decode, debug on rejection
//! powertx_protocol::transaction  — debug when a body or envelope is rejected
//! ```
//!
//! `RUST_LOG` takes precedence over `--log-level`, e.g.
//! `RUST_LOG=powertx_protocol::codec=trace powertx decode c0`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, colored output. Suitable for interactive use.
    Pretty,
    /// Machine-parseable JSON lines. Suitable for log aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Expands `--log-level` into filter directives.
///
/// A bare level applies to this workspace's own targets only, keeping other
/// crates at `warn`. Anything containing `=` or `,` is already a directive
/// list and passes through unchanged.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return "warn".to_string();
    }
    if level.contains(['=', ',']) {
        return level.to_string();
    }
    format!("warn,powertx={0},powertx_protocol={0}", level)
}

/// Initialize the global tracing subscriber.
///
/// Call this exactly once, early in `main()`.
///
/// # Arguments
///
/// * `level` - Used when `RUST_LOG` is not set; see [`filter_directives`].
/// * `format` - Output format (JSON or pretty-printed).
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::debug!("logging initialized (format={:?})", format);
}
