use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EditError, StorageError};
use crate::node::{NodeData, NodeId, TagTree};
use crate::ops::{OpArgs, OpOutput, Operation};
use crate::tag::json::to_json_string;

/// Write a node's tag as JSON to the path in `values[0]`. A document exports its
/// root compound.
pub struct Export;

impl Operation for Export {
    fn name(&self) -> &'static str {
        "json"
    }

    fn options_valid(&self, args: &OpArgs) -> bool {
        args.values.len() == 1 && !args.values[0].is_empty()
    }

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool {
        tree.node(node).is_some_and(|n| {
            matches!(n.data(), NodeData::Document(_)) || n.data().tag().is_some()
        })
    }

    fn process(&self, tree: &mut TagTree, node: NodeId, args: &OpArgs) -> Result<OpOutput, EditError> {
        let out = args
            .first()
            .ok_or_else(|| EditError::ParseError("no output path given".to_string()))?;

        if matches!(tree.node(node).map(|n| n.data()), Some(NodeData::Document(_))) {
            tree.expand(node)?;
        }
        let tag = tree.tag(node).ok_or_else(|| {
            EditError::CapabilityDenied(format!("'{}' has no tag to export", tree.path(node)))
        })?;

        let text = to_json_string(&tag.borrow())
            .map_err(|e| EditError::ParseError(format!("JSON serialization failed: {}", e)))?;
        fs::write(Path::new(out), text).map_err(StorageError::from)?;
        info!(node = %tree.path(node), out, "Exported JSON");
        Ok(OpOutput::default())
    }
}
