use crate::error::EditError;
use crate::node::{NodeId, TagTree};
use crate::ops::{render_node, OpArgs, OpOutput, Operation};

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const GAP: &str = "   ";

/// Render one node
pub struct Print;

impl Operation for Print {
    fn name(&self) -> &'static str {
        "print"
    }

    fn options_valid(&self, _args: &OpArgs) -> bool {
        true
    }

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool {
        tree.node(node).is_some()
    }

    fn process(&self, tree: &mut TagTree, node: NodeId, args: &OpArgs) -> Result<OpOutput, EditError> {
        Ok(OpOutput::text(render_node(tree, node, args.show_types)))
    }
}

/// Render a node and everything below it, expanding as it goes
pub struct PrintTree;

impl PrintTree {
    fn walk(
        tree: &mut TagTree,
        node: NodeId,
        prefix: &str,
        show_types: bool,
        lines: &mut Vec<String>,
    ) -> Result<(), EditError> {
        tree.expand(node)?;
        let children = tree.children(node)?;
        let count = children.len();
        for (index, child) in children.iter().enumerate() {
            let last = index + 1 == count;
            let connector = if last { LAST_BRANCH } else { BRANCH };
            lines.push(format!(
                "{}{}{}",
                prefix,
                connector,
                render_node(tree, *child, show_types)
            ));
            let nested = format!("{}{}", prefix, if last { GAP } else { PIPE });
            Self::walk(tree, *child, &nested, show_types, lines)?;
        }
        Ok(())
    }
}

impl Operation for PrintTree {
    fn name(&self) -> &'static str {
        "print-tree"
    }

    fn options_valid(&self, _args: &OpArgs) -> bool {
        true
    }

    fn can_process(&self, tree: &TagTree, node: NodeId) -> bool {
        tree.node(node).is_some()
    }

    fn process(&self, tree: &mut TagTree, node: NodeId, args: &OpArgs) -> Result<OpOutput, EditError> {
        tree.expand(node)?;
        let mut lines = vec![render_node(tree, node, args.show_types)];
        Self::walk(tree, node, "", args.show_types, &mut lines)?;
        Ok(OpOutput::text(lines.join("\n")))
    }
}
