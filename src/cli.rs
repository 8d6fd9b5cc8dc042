//! CLI domain: parse, route, help, output, and presentation only.
//! Tree editing lives in the model; the route table only resolves targets and
//! dispatches to the operation catalog.

mod help;
mod output;
mod parse;
mod path;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use path::{split_target, TargetPath};
pub use presentation::{format_batch_report, format_children_table, BatchReport, ChildRow};
pub use route::RunContext;
