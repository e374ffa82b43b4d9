//! CLI argument definitions using clap
//!
//! - tabula check --rules <file> --action <action> --subject <json>
//! - tabula eval --formulas <file> --rows <file> [--column <id>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabula_core::Action;

/// Default configuration file name, used only if it exists
pub const DEFAULT_CONFIG_FILE: &str = "tabula.json";

#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Tabula - permission checks and formula columns for tables")]
#[command(version)]
pub struct Cli {
    /// Path to engine configuration file (JSON, YAML or TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a subject may perform an action
    Check {
        /// Rules file with a top-level `rules` list
        #[arg(long)]
        rules: PathBuf,

        /// Action to check (read, write, delete)
        #[arg(long)]
        action: Action,

        /// Subject attributes as a JSON object
        #[arg(long)]
        subject: String,

        /// Resource attributes as a JSON object
        #[arg(long)]
        resource: Option<String>,

        /// Print the deciding rule as JSON instead of allow/deny
        #[arg(long)]
        explain: bool,
    },

    /// Compute formula columns for a set of rows
    Eval {
        /// Formulas file with a top-level `formulas` map
        #[arg(long)]
        formulas: PathBuf,

        /// Rows file holding an array of rows
        #[arg(long)]
        rows: PathBuf,

        /// Only compute this column
        #[arg(long)]
        column: Option<String>,
    },
}
