use crate::editor::FixedText;
use crate::error::EditError;
use crate::node::{NodeData, NodeId, TagTree};
use crate::ops::{OpArgs, OpOutput, Operation};

/// Overwrite a scalar from `values[0]`. Array kinds need a byte-buffer editor and
/// are not handled.
pub struct EditScalar;

impl Operation for EditScalar {
    fn name(&self) -> &'static str {
        "set-value"
    }

    fn options_valid(&self, args: &OpArgs) -> bool {
        args.values.len() == 1
    }

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool {
        let is_scalar = tree
            .node(node)
            .is_some_and(|n| matches!(n.data(), NodeData::Scalar(..)));
        is_scalar && tree.capabilities(node).edit
    }

    fn process(&self, tree: &mut TagTree, node: NodeId, args: &OpArgs) -> Result<OpOutput, EditError> {
        let value = args
            .first()
            .ok_or_else(|| EditError::ParseError("no value given".to_string()))?;
        let mut editor = FixedText::new(value);
        tree.edit_node(node, &mut editor)?;
        Ok(OpOutput::modified())
    }
}
