//! CLI route: single route table and run context. Resolves targets and dispatches to
//! the operation catalog and presentation.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, instrument, warn};

use crate::cli::help::{command_name, target_path};
use crate::cli::parse::Commands;
use crate::cli::path::split_target;
use crate::cli::presentation::{format_batch_report, format_children_table, BatchReport, ChildRow};
use crate::clipboard::Clipboard;
use crate::config::{ConfigLoader, TagTreeConfig};
use crate::editor::PromptEditor;
use crate::error::ApiError;
use crate::node::{DocumentSource, NameValueQuery, NodeData, NodeId, TagTree, TreeSettings};
use crate::ops::{self, OpArgs};
use crate::tag::TagKind;

/// Runtime context for CLI execution: workspace, loaded configuration and the
/// clipboard shared by every tree the context opens.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: TagTreeConfig,
    clipboard: Rc<Clipboard>,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            ApiError::ConfigError(messages.join("; "))
        })?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
            clipboard: Rc::new(Clipboard::new()),
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn config(&self) -> &TagTreeConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Executing command");
        let show_types = self.config.editor.show_types;
        match command {
            Commands::Print { types, .. } | Commands::PrintTree { types, .. } => {
                self.run_operation(command, OpArgs::default().with_types(*types || show_types))
            }
            Commands::SetValue { value, .. } => {
                self.run_operation(command, OpArgs::new(vec![value.clone()]))
            }
            Commands::SetList { values, .. } => {
                self.run_operation(command, OpArgs::new(values.clone()))
            }
            Commands::Json { out, .. } => {
                let out = out.to_string_lossy().into_owned();
                self.run_operation(command, OpArgs::new(vec![out]))
            }
            Commands::Delete { .. } => self.run_operation(command, OpArgs::default()),
            Commands::Edit { path } => self.edit_interactive(path),
            Commands::Ls { path } => self.list_children(path),
            Commands::Find { path, name, value } => self.find_nodes(
                path,
                NameValueQuery {
                    name: name.clone(),
                    value: value.clone(),
                },
            ),
        }
    }

    /// Open the filesystem part of `raw` in a fresh tree. Returns the tree, the
    /// top-level node that owns the storage, and the remaining tag path.
    fn open_top(&self, raw: &str) -> Result<(TagTree, NodeId, String), ApiError> {
        let target = split_target(&self.workspace_root, raw, &self.config.storage)?;
        let mut tree =
            TagTree::with_settings(Rc::clone(&self.clipboard), TreeSettings::from(&self.config));
        let top = tree.open_path(&target.fs_path)?;
        Ok((tree, top, target.tag_path))
    }

    /// Open `raw` and resolve it to exactly one node.
    fn open_target(&self, raw: &str) -> Result<(TagTree, NodeId, NodeId), ApiError> {
        let (mut tree, top, tag_path) = self.open_top(raw)?;
        let node = tree.resolve(top, &tag_path)?;
        Ok((tree, top, node))
    }

    /// Apply a cataloged operation to every node `command`'s target matches. Each
    /// node gets its own status line; a modified node's document is saved right
    /// after the node is processed.
    #[instrument(skip(self, command, args), fields(command = command_name(command)))]
    fn run_operation(&self, command: &Commands, args: OpArgs) -> Result<String, ApiError> {
        let name = command_name(command);
        let op = ops::find(name)
            .ok_or_else(|| ApiError::OperationFailed(format!("unknown operation '{}'", name)))?;
        let (mut tree, top, tag_path) = self.open_top(target_path(command))?;
        let nodes = tree.resolve_all(top, &tag_path)?;
        let options_valid = op.options_valid(&args);
        let mut report = BatchReport::default();

        for node in nodes {
            // Deleting an earlier match also removes the nodes below it.
            if tree.node(node).is_none() {
                continue;
            }
            let path = tree.path(node);
            if !options_valid || !op.can_process(&tree, node) {
                warn!(node = %path, operation = name, "Operation not applicable");
                report.failure(&path, "invalid command");
                continue;
            }

            let owner = tree.owning_document(node).unwrap_or(top);
            match op.process(&mut tree, node, &args) {
                Ok(output) => {
                    if output.modified {
                        match tree.save(owner) {
                            Ok(written) => info!(node = %path, documents = written, "Saved changes"),
                            Err(e) => {
                                warn!(node = %path, error = %e, "Save failed");
                                report.failure(&path, &format!("save: {}", e));
                                continue;
                            }
                        }
                    }
                    report.success(&path, output.output);
                }
                Err(e) => {
                    warn!(node = %path, error = %e, "Operation failed");
                    report.failure(&path, &format!("apply: {}", e));
                }
            }
        }
        finish(report)
    }

    fn edit_interactive(&self, raw: &str) -> Result<String, ApiError> {
        let (mut tree, top, node) = self.open_target(raw)?;
        let path = tree.path(node);
        let mut editor = PromptEditor::new(path.clone());
        let mut report = BatchReport::default();

        match tree.edit_node(node, &mut editor) {
            Ok(true) => {
                tree.save(top)?;
                report.success(&path, None);
            }
            Ok(false) => report.success(&path, Some(format!("{}: unchanged", path))),
            Err(e) => report.failure(&path, &format!("apply: {}", e)),
        }
        finish(report)
    }

    fn list_children(&self, raw: &str) -> Result<String, ApiError> {
        let (mut tree, _, node) = self.open_target(raw)?;
        tree.expand(node)?;
        let rows: Vec<ChildRow> = tree
            .children(node)?
            .iter()
            .map(|child| ChildRow {
                name: tree.path_name(*child),
                kind: kind_label(&tree, *child),
                value: tree.summary(*child),
            })
            .collect();
        Ok(format_children_table(&tree.path(node), &rows))
    }

    fn find_nodes(&self, raw: &str, query: NameValueQuery) -> Result<String, ApiError> {
        let (mut tree, _, node) = self.open_target(raw)?;
        let found = tree.find(node, &query)?;
        info!(node = %tree.path(node), matches = found.len(), "Search complete");
        let mut lines: Vec<String> = found
            .iter()
            .map(|id| format!("{}: {}", tree.path(*id), tree.summary(*id)))
            .collect();
        lines.push(format!("Found {} matching nodes.", found.len()));
        Ok(lines.join("\n"))
    }
}

fn finish(report: BatchReport) -> Result<String, ApiError> {
    let text = format_batch_report(&report);
    if report.has_failures() {
        Err(ApiError::OperationFailed(text))
    } else {
        Ok(text)
    }
}

fn kind_label(tree: &TagTree, id: NodeId) -> String {
    let label = match tree.node(id).map(|node| node.data()) {
        Some(NodeData::Directory(_)) => "Directory",
        Some(NodeData::ChunkStore(_)) => "Chunk store",
        Some(NodeData::Document(doc)) => match doc.source() {
            DocumentSource::File => "Document",
            DocumentSource::Chunk => "Chunk",
        },
        _ => tree.tag_kind(id).map_or("", TagKind::name),
    };
    label.to_string()
}
