//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for logs and operation lookup (e.g. "set-value").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Print { .. } => "print",
        Commands::PrintTree { .. } => "print-tree",
        Commands::SetValue { .. } => "set-value",
        Commands::SetList { .. } => "set-list",
        Commands::Json { .. } => "json",
        Commands::Delete { .. } => "delete",
        Commands::Edit { .. } => "edit",
        Commands::Ls { .. } => "ls",
        Commands::Find { .. } => "find",
    }
}

/// Target path argument of any command
pub fn target_path(command: &Commands) -> &str {
    match command {
        Commands::Print { path, .. }
        | Commands::PrintTree { path, .. }
        | Commands::SetValue { path, .. }
        | Commands::SetList { path, .. }
        | Commands::Json { path, .. }
        | Commands::Delete { path }
        | Commands::Edit { path }
        | Commands::Ls { path }
        | Commands::Find { path, .. } => path,
    }
}
