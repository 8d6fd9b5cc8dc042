use tracing::warn;

use crate::error::EditError;
use crate::node::{NodeData, NodeId, ScalarKind, TagTree};
use crate::ops::{OpArgs, OpOutput, Operation};
use crate::tag::Tag;

/// Replace a list's elements with one parsed tag per token.
///
/// Tokens are parsed with the list's current element kind. All of them are parsed
/// before the list is touched, so a bad token leaves the list as it was.
pub struct SetListContents;

impl SetListContents {
    fn element_kind(tree: &TagTree, node: NodeId) -> Result<ScalarKind, EditError> {
        let list = match tree.node(node).map(|n| n.data()) {
            Some(NodeData::List(list)) => list,
            _ => {
                return Err(EditError::CapabilityDenied(format!(
                    "'{}' is not a list",
                    tree.path(node)
                )))
            }
        };
        let element = list.element().ok_or_else(|| {
            EditError::TypeMismatch(format!(
                "'{}' is empty; its element type is unknown",
                tree.path(node)
            ))
        })?;
        ScalarKind::from_kind(element).ok_or_else(|| {
            EditError::TypeMismatch(format!("cannot parse {} elements from text", element))
        })
    }
}

impl Operation for SetListContents {
    fn name(&self) -> &'static str {
        "set-list"
    }

    fn options_valid(&self, _args: &OpArgs) -> bool {
        true
    }

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool {
        tree.node(node)
            .is_some_and(|n| matches!(n.data(), NodeData::List(_)))
    }

    fn process(&self, tree: &mut TagTree, node: NodeId, args: &OpArgs) -> Result<OpOutput, EditError> {
        let kind = Self::element_kind(tree, node)?;
        let parsed: Result<Vec<Tag>, EditError> =
            args.values.iter().map(|token| kind.parse(token)).collect();
        let tags = parsed.inspect_err(|e| {
            warn!(list = %tree.path(node), error = %e, "List left unchanged");
        })?;
        tree.replace_list(node, tags)?;
        Ok(OpOutput::modified())
    }
}
