//! Logging and debugging facilities for Horizon Designer.
//!
//! This module provides:
//! - Target names for filtering `tracing` output per subsystem
//! - Debug visualization for model trees
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Nothing is printed unless the host installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_designer=debug")
//!     .init();
//! ```

use std::fmt::Write as FmtWrite;

use crate::error::ModelResult;
use crate::model::{ModelTree, NodeId};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_designer_core";
    /// Model tree arena target.
    pub const MODEL: &str = "horizon_designer_core::model";
    /// Broadcast bus target.
    pub const BROADCAST: &str = "horizon_designer_core::broadcast";
    /// Source editor target.
    pub const SOURCE: &str = "horizon_designer_source";
    /// Model parser target.
    pub const PARSER: &str = "horizon_designer::parser";
    /// Structural edit operations target.
    pub const OPS: &str = "horizon_designer::ops";
    /// Descriptor loading target.
    pub const DESCRIPTION: &str = "horizon_designer::description";
    /// Session lifecycle target.
    pub const SESSION: &str = "horizon_designer::session";
}

/// How a payload presents itself in tree dumps.
pub trait TreeLabel {
    /// Display name, usually the variable name.
    fn label(&self) -> String;

    /// Type name, usually fully qualified.
    fn type_label(&self) -> String;
}

impl TreeLabel for &str {
    fn label(&self) -> String {
        (*self).to_string()
    }

    fn type_label(&self) -> String {
        "str".to_string()
    }
}

impl TreeLabel for String {
    fn label(&self) -> String {
        self.clone()
    }

    fn type_label(&self) -> String {
        "String".to_string()
    }
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_types: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            ..Default::default()
        }
    }
}

/// Formats a [`ModelTree`] for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ModelTreeDebug {
    options: TreeFormatOptions,
}

impl ModelTreeDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole tree, or `(empty)` when it has no root.
    pub fn format_tree<T: TreeLabel>(&self, tree: &ModelTree<T>) -> ModelResult<String> {
        match tree.root() {
            Some(root) => self.format_subtree(tree, root),
            None => Ok("(empty)\n".to_string()),
        }
    }

    /// Format the subtree below `root`.
    pub fn format_subtree<T: TreeLabel>(
        &self,
        tree: &ModelTree<T>,
        root: NodeId,
    ) -> ModelResult<String> {
        let mut output = String::new();
        self.format_into(tree, root, &mut Vec::new(), &mut output)?;
        Ok(output)
    }

    fn format_into<T: TreeLabel>(
        &self,
        tree: &ModelTree<T>,
        id: NodeId,
        lasts: &mut Vec<bool>,
        output: &mut String,
    ) -> ModelResult<()> {
        if self.options.max_depth.is_some_and(|max| lasts.len() > max) {
            return Ok(());
        }

        let payload = tree.get(id)?;
        output.push_str(&self.build_prefix(lasts));
        let name = payload.label();
        output.push_str(if name.is_empty() { "(unnamed)" } else { &name });
        if self.options.show_ids {
            let _ = write!(output, " [{}]", id.as_raw());
        }
        if self.options.show_types {
            let type_name = payload.type_label();
            let short = type_name.rsplit('.').next().unwrap_or(&type_name);
            let _ = write!(output, " ({short})");
        }
        output.push('\n');

        let children = tree.children(id)?;
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            lasts.push(i + 1 == count);
            let result = self.format_into(tree, child, lasts, output);
            lasts.pop();
            result?;
        }
        Ok(())
    }

    /// `lasts` holds, from the top level down, whether each node on the path
    /// is its parent's last child. The root is not on it.
    fn build_prefix(&self, lasts: &[bool]) -> String {
        let Some((&is_last, ancestors)) = lasts.split_last() else {
            return String::new();
        };
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };
        let mut prefix = String::new();
        for &closed in ancestors {
            if closed {
                prefix.extend(std::iter::repeat_n(' ', branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time parses and structural edits.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_designer::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
