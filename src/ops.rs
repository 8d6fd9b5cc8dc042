//! Batch operation catalog
//!
//! Each operation is a named command the batch runner can apply to a resolved node.
//! `options_valid` checks the argument bag alone, `can_process` inspects the node, and
//! `process` commits.

mod delete;
mod edit;
mod export;
mod print;
mod set_list;

pub use delete::Delete;
pub use edit::EditScalar;
pub use export::Export;
pub use print::{Print, PrintTree};
pub use set_list::SetListContents;

use crate::error::EditError;
use crate::node::{NodeId, TagTree};

/// Arguments shared by every operation
#[derive(Debug, Clone, Default)]
pub struct OpArgs {
    pub values: Vec<String>,
    pub show_types: bool,
}

impl OpArgs {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            show_types: false,
        }
    }

    pub fn with_types(mut self, show_types: bool) -> Self {
        self.show_types = show_types;
        self
    }

    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Result of one successful `process`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpOutput {
    /// Text to show the user
    pub output: Option<String>,
    /// Whether the tree changed and needs saving
    pub modified: bool,
}

impl OpOutput {
    pub fn modified() -> Self {
        Self {
            output: None,
            modified: true,
        }
    }

    pub fn text(output: String) -> Self {
        Self {
            output: Some(output),
            modified: false,
        }
    }
}

pub trait Operation {
    fn name(&self) -> &'static str;

    fn options_valid(&self, args: &OpArgs) -> bool;

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool;

    fn process(&self, tree: &mut TagTree, node: NodeId, args: &OpArgs)
        -> Result<OpOutput, EditError>;
}

/// Every cataloged operation
pub fn catalog() -> Vec<Box<dyn Operation>> {
    vec![
        Box::new(Delete),
        Box::new(EditScalar),
        Box::new(SetListContents),
        Box::new(Export),
        Box::new(Print),
        Box::new(PrintTree),
    ]
}

pub fn find(name: &str) -> Option<Box<dyn Operation>> {
    catalog().into_iter().find(|op| op.name() == name)
}

/// `"<m> text"` when types are requested, plain `text` otherwise.
pub(crate) fn render_node(tree: &TagTree, node: NodeId, show_types: bool) -> String {
    let text = tree.display(node);
    let marker = tree.kind_marker(node);
    if show_types && !marker.is_empty() {
        format!("<{}> {}", marker, text)
    } else {
        text
    }
}
