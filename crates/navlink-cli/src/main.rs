//! navlink CLI
//!
//! Talks to a map tool provider (by default the AMap MCP server started via
//! `npx`) and prints canonical results as JSON on stdout. Logs go to stderr.
//!
//! # Examples
//!
//! ```bash
//! navlink poi coffee --lat 31.23 --lon 121.47 --radius 800
//! navlink route --from 31.23,121.47 --to 31.20,121.44 --avoid tolls
//! navlink --transport prefer-length-prefixed tools
//! RUST_LOG=navlink_core=debug navlink debug --probe
//! ```

mod args;
mod commands;

use args::{Cli, LogFormat};
use clap::Parser;
use colored::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match commands::route(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging; RUST_LOG wins over -v
fn init_tracing(cli: &Cli) {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match cli.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}
