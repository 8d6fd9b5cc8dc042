use crate::error::EditError;
use crate::node::{NodeId, TagTree};
use crate::ops::{OpArgs, OpOutput, Operation};

pub struct Delete;

impl Operation for Delete {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn options_valid(&self, _args: &OpArgs) -> bool {
        true
    }

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool {
        node != tree.root() && tree.capabilities(node).delete
    }

    fn process(&self, tree: &mut TagTree, node: NodeId, _args: &OpArgs) -> Result<OpOutput, EditError> {
        tree.delete_node(node)?;
        Ok(OpOutput::modified())
    }
}
