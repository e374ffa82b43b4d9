//! Command routing logic for CLI

use std::process::ExitCode;

use anyhow::Result;
use tabula_core::config::EngineConfig;

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub fn route(cli: Cli, config: &EngineConfig) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            rules,
            action,
            subject,
            resource,
            explain,
        } => commands::check::run(&rules, action, &subject, resource.as_deref(), explain),
        Commands::Eval {
            formulas,
            rows,
            column,
        } => {
            commands::eval::run(config, &formulas, &rows, column.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
