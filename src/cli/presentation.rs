//! CLI presentation: text formatters for batch reports and listings.

mod listing;
mod report;

pub use listing::{format_children_table, ChildRow};
pub use report::{format_batch_report, BatchReport};
