//! CLI parse: clap types for tagtree. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tagtree CLI - inspect and edit tagged binary documents
#[derive(Parser)]
#[command(name = "tagtree")]
#[command(about = "Inspect and edit tagged binary documents, chunk stores and directories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root; relative target paths resolve against it
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Every target is a filesystem path optionally followed by `/`-separated tag names,
/// e.g. `level.dat/Data/Player/Health` or `world.chunks/0.0/Level`.
#[derive(Subcommand)]
pub enum Commands {
    /// Print one node
    Print {
        path: String,
        /// Prefix the output with the node's type marker
        #[arg(long)]
        types: bool,
    },
    /// Print a node and all of its descendants
    PrintTree {
        path: String,
        /// Prefix each line with the node's type marker
        #[arg(long)]
        types: bool,
    },
    /// Set a scalar value
    SetValue {
        path: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Replace the contents of a list, one element per value
    SetList {
        path: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Export a node as JSON
    Json { path: String, out: PathBuf },
    /// Delete a node
    Delete { path: String },
    /// Edit a scalar value interactively
    Edit { path: String },
    /// List a node's children
    Ls { path: String },
    /// Find tags below a node by name and value text
    Find {
        path: String,
        /// Match tags whose name contains this text
        #[arg(long)]
        name: Option<String>,
        /// Match tags whose displayed value contains this text
        #[arg(long, allow_hyphen_values = true)]
        value: Option<String>,
    },
}
