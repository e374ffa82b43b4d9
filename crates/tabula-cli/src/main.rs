//! Tabula CLI application
//!
//! Evaluates permission rules and formula columns from definition files.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/tabula-cli
//! ```
//!
//! # Commands
//!
//! ## check
//! Decide whether a subject may perform an action. Prints `allow` or `deny`
//! (or a JSON explanation with `--explain`) and exits 0 on allow, 1 on deny.
//!
//! - **Example:** `tabula check --rules rules.yaml --action write --subject '{"role":"editor"}'`
//!
//! ## eval
//! Compute formula columns for every row of a rows file and print them as
//! JSON, using all rows as the aggregate snapshot.
//!
//! - **Example:** `tabula eval --formulas formulas.toml --rows rows.json`

mod args;
mod commands;
mod router;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tabula_core::config::EngineConfig;
use tracing_subscriber::EnvFilter;

use args::Cli;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    init_tracing(&config, cli.verbose);

    router::route(cli, &config)
}

/// Initialize logging
///
/// `-v` forces debug; otherwise RUST_LOG wins over the configured level.
/// Logs go to stderr so command output stays machine readable.
fn init_tracing(config: &EngineConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.init(),
    }
}
