//! The editing session: one source file, its model tree and the event bus.
//!
//! A [`DesignSession`] owns everything an editor needs to keep a component
//! model and its code in sync. It is an explicit context object: the parser,
//! the structural edit operations and the container adapters all work
//! through it, and nothing is cached in globals.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_designer::{DescriptorRegistry, DesignSession, SessionConfig};
//!
//! let source = "import javax.swing.*;\n\
//!               public class View extends JPanel {\n\
//!               \tpublic View() {\n\
//!               \t\tadd(new JButton(\"OK\"));\n\
//!               \t}\n\
//!               }\n";
//! let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
//! let session = DesignSession::open(source, registry, SessionConfig::default()).unwrap();
//! let root = session.root().unwrap();
//! assert_eq!(session.children(root).unwrap().len(), 1);
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use horizon_designer_core::logging::targets;
use horizon_designer_core::{Broadcast, ModelTree, ModelTreeDebug, NodeId, NodeReplaced};
use horizon_designer_source::syntax::{CompilationUnit, Expr, ExprKind, Stmt, walk_statements};
use horizon_designer_source::{SourceEditor, Span, SpanMap};

use crate::association::Association;
use crate::config::SessionConfig;
use crate::creation::CreationSupport;
use crate::description::{ComponentDescriptor, ContainerKind, DescriptorLookup, DescriptorRegistry};
use crate::diagnostics::{BadNode, DiagnosticsSink};
use crate::error::{DescriptionError, DesignerError, DesignerResult, StructuralEditError};
use crate::info::ComponentInfo;
use crate::ops::OperationState;
use crate::parser::{MAX_EXPOSED_DEPTH, ModelParser, ParseContext};
use crate::variable::{AnonymousAccess, VariableSupport};

/// One open source file and the model built from it.
pub struct DesignSession {
    pub(crate) editor: SourceEditor,
    pub(crate) tree: ModelTree<ComponentInfo>,
    pub(crate) registry: Arc<DescriptorRegistry>,
    pub(crate) bus: Broadcast,
    pub(crate) bad_nodes: Vec<BadNode>,
    pub(crate) config: SessionConfig,
    pub(crate) context: ParseContext,
    pub(crate) last_state: Option<OperationState>,
    sink: Option<Box<dyn DiagnosticsSink>>,
}

impl std::fmt::Debug for DesignSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignSession")
            .field("class", &self.context.class_name)
            .field("entry_method", &self.context.entry_method)
            .field("nodes", &self.tree.len())
            .field("bad_nodes", &self.bad_nodes.len())
            .field("last_state", &self.last_state)
            .finish_non_exhaustive()
    }
}

struct Parsed {
    tree: ModelTree<ComponentInfo>,
    bad_nodes: Vec<BadNode>,
    context: ParseContext,
}

fn build(
    editor: &mut SourceEditor,
    registry: &DescriptorRegistry,
    config: &SessionConfig,
) -> DesignerResult<Parsed> {
    let unit = editor.reparse()?;
    let text = editor.text();
    let output = ModelParser::new(registry, config).parse(&unit, &text)?;
    Ok(Parsed {
        tree: output.tree,
        bad_nodes: output.bad_nodes,
        context: output.context,
    })
}

impl DesignSession {
    /// Parse `source` and build its model.
    pub fn open(
        source: &str,
        registry: Arc<DescriptorRegistry>,
        config: SessionConfig,
    ) -> DesignerResult<Self> {
        let mut editor = SourceEditor::new(source);
        editor.set_indent_unit(config.indent.clone());
        let parsed = build(&mut editor, &registry, &config)?;
        tracing::info!(
            target: targets::SESSION,
            class = %parsed.context.class_name,
            nodes = parsed.tree.len(),
            bad = parsed.bad_nodes.len(),
            "session opened"
        );
        Ok(Self {
            editor,
            tree: parsed.tree,
            registry,
            bus: Broadcast::new(),
            bad_nodes: parsed.bad_nodes,
            config,
            context: parsed.context,
            last_state: None,
            sink: None,
        })
    }

    /// Read a file and open a session on it.
    pub fn open_file(
        path: impl AsRef<Path>,
        registry: Arc<DescriptorRegistry>,
        config: SessionConfig,
    ) -> DesignerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| DesignerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::open(&source, registry, config)
    }

    /// Write the current source to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> DesignerResult<()> {
        let path = path.as_ref();
        self.editor.save(path).map_err(|source| DesignerError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Send bad nodes to `sink`, starting with those already known.
    pub fn set_diagnostics_sink(&mut self, mut sink: Box<dyn DiagnosticsSink>) {
        for bad in &self.bad_nodes {
            sink.report(bad);
        }
        self.sink = Some(sink);
    }

    /// Rebuild the model from the current source.
    ///
    /// Node ids from before the call are invalid afterwards; listeners get a
    /// [`NodeReplaced`] event.
    pub fn refresh(&mut self) -> DesignerResult<()> {
        let parsed = build(&mut self.editor, &self.registry, &self.config)?;
        let old = self.tree.root();
        self.tree = parsed.tree;
        self.bad_nodes = parsed.bad_nodes;
        self.context = parsed.context;
        if let Some(sink) = &mut self.sink {
            for bad in &self.bad_nodes {
                sink.report(bad);
            }
        }
        let new = self.tree.root();
        tracing::debug!(target: targets::SESSION, ?old, ?new, nodes = self.tree.len(), "model rebuilt");
        self.bus.publish(&NodeReplaced { old, new });
        Ok(())
    }

    /// Keep structural edits out of `span`.
    ///
    /// Operations whose edits would touch it are aborted.
    pub fn protect(&mut self, span: Span) -> DesignerResult<()> {
        self.editor.protect(span)?;
        Ok(())
    }

    /// Replace source text outside the model's own edits, then rebuild.
    pub fn edit_source(&mut self, span: Span, text: &str) -> DesignerResult<()> {
        self.editor.replace(span, text)?;
        self.refresh()
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// The model tree.
    pub fn tree(&self) -> &ModelTree<ComponentInfo> {
        &self.tree
    }

    /// The root component, if the file has one.
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    pub fn children(&self, id: NodeId) -> DesignerResult<&[NodeId]> {
        self.tree
            .children(id)
            .map_err(|_| StructuralEditError::UnknownNode(id).into())
    }

    pub fn parent(&self, id: NodeId) -> DesignerResult<Option<NodeId>> {
        self.tree
            .parent(id)
            .map_err(|_| StructuralEditError::UnknownNode(id).into())
    }

    /// Everything known about a node.
    pub fn info(&self, id: NodeId) -> DesignerResult<&ComponentInfo> {
        self.tree
            .get(id)
            .map_err(|_| StructuralEditError::UnknownNode(id).into())
    }

    pub fn creation_support(&self, id: NodeId) -> DesignerResult<&CreationSupport> {
        Ok(&self.info(id)?.creation)
    }

    pub fn variable_support(&self, id: NodeId) -> DesignerResult<&VariableSupport> {
        Ok(&self.info(id)?.variable)
    }

    /// How the node is attached to its parent; `None` for the root.
    pub fn association(&self, id: NodeId) -> DesignerResult<Option<&Association>> {
        Ok(self.info(id)?.association.as_ref())
    }

    /// The descriptor of the node's type.
    pub fn descriptor(&self, id: NodeId) -> DesignerResult<&ComponentDescriptor> {
        let info = self.info(id)?;
        self.registry
            .describe(&info.component_type)
            .ok_or_else(|| DescriptionError::UnknownType(info.component_type.clone()).into())
    }

    /// Constructs the last parse left out of the model.
    pub fn bad_nodes(&self) -> &[BadNode] {
        &self.bad_nodes
    }

    /// Attach a transient annotation to a node. Annotations are dropped by
    /// [`refresh`](Self::refresh).
    pub fn annotate<V: Any + Send>(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: V,
    ) -> DesignerResult<()> {
        self.tree
            .set_annotation(id, key, value)
            .map_err(|_| StructuralEditError::UnknownNode(id).into())
    }

    pub fn annotation<V: Any>(&self, id: NodeId, key: &str) -> DesignerResult<Option<&V>> {
        self.tree
            .annotation(id, key)
            .map_err(|_| StructuralEditError::UnknownNode(id).into())
    }

    /// The current source text.
    pub fn source(&self) -> String {
        self.editor.text()
    }

    /// The underlying source editor.
    pub fn editor(&self) -> &SourceEditor {
        &self.editor
    }

    /// The event bus model changes are published on.
    pub fn bus(&self) -> &Broadcast {
        &self.bus
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    /// Name of the designed class.
    pub fn class_name(&self) -> &str {
        &self.context.class_name
    }

    /// The method the model was read from.
    pub fn entry_method(&self) -> &str {
        &self.context.entry_method
    }

    /// Final state of the last structural edit operation.
    pub fn last_operation_state(&self) -> Option<OperationState> {
        self.last_state
    }

    /// How code inside `method` refers to the node, if it can.
    pub fn reference(&self, id: NodeId, method: &str) -> Option<String> {
        let info = self.tree.get(id).ok()?;
        match &info.variable {
            VariableSupport::Local { name, .. } => (info.own_method == method).then(|| name.clone()),
            VariableSupport::Anonymous(AnonymousAccess::Exposed { .. }) => {
                let parent = self.tree.parent(id).ok()??;
                let parent_ref = self.reference(parent, method)?;
                info.variable.reference(method, Some(&parent_ref))
            }
            variable => variable.reference(method, None),
        }
    }

    /// Indented dump of the model tree.
    pub fn dump(&self) -> DesignerResult<String> {
        Ok(ModelTreeDebug::new().format_tree(&self.tree)?)
    }

    // =========================================================================
    // Helpers for operations
    // =========================================================================

    /// Shift every remembered position through `map`.
    pub(crate) fn apply_map(&mut self, map: &SpanMap) {
        if map.is_empty() {
            return;
        }
        for info in self.tree.payloads_mut() {
            info.apply(map);
        }
    }

    /// Drop fragments whose text was removed.
    pub(crate) fn prune(&mut self) {
        for info in self.tree.payloads_mut() {
            info.prune();
        }
    }

    /// Names a new variable must not take.
    pub(crate) fn taken_names(&mut self) -> DesignerResult<HashSet<String>> {
        let mut taken: HashSet<String> = self
            .tree
            .iter()
            .filter_map(|(_, info)| info.name().map(str::to_string))
            .collect();
        let unit = self.unit()?;
        if let Some(class) = &unit.class {
            taken.extend(class.fields().map(|f| f.name.text.clone()));
            taken.extend(class.methods().map(|m| m.name.text.clone()));
        }
        Ok(taken)
    }

    /// Parse the edited source.
    pub(crate) fn unit(&mut self) -> DesignerResult<Arc<CompilationUnit>> {
        Ok(self.editor.reparse()?)
    }

    /// Containers of `parent` that take `child_type`, in the order they are
    /// tried.
    ///
    /// Slots come first while no sequence of the parent holds a child.
    pub(crate) fn candidate_containers(
        &self,
        parent: NodeId,
        child_type: &str,
    ) -> DesignerResult<Vec<usize>> {
        let descriptor = self.descriptor(parent)?;
        if !descriptor.is_container() {
            return Err(StructuralEditError::NotAContainer {
                type_name: descriptor.type_name.clone(),
            }
            .into());
        }
        let accepting: Vec<usize> = descriptor
            .accepting(child_type, self.registry.as_ref())
            .map(|(index, _)| index)
            .collect();
        if accepting.is_empty() {
            return Err(StructuralEditError::NotAccepted {
                parent_type: descriptor.type_name.clone(),
                child_type: child_type.to_string(),
            }
            .into());
        }
        let sequence_used = self.children(parent)?.iter().any(|&child| {
            self.tree.get(child).is_ok_and(|info| {
                info.container
                    .is_some_and(|c| descriptor.containers[c].kind == ContainerKind::Sequence)
            })
        });
        let (mut slots, mut sequences): (Vec<usize>, Vec<usize>) = accepting
            .into_iter()
            .partition(|&c| descriptor.containers[c].kind == ContainerKind::Slot);
        if sequence_used {
            sequences.extend(slots);
            Ok(sequences)
        } else {
            slots.extend(sequences);
            Ok(slots)
        }
    }

    /// The node occupying slot `container` of `parent`, other than `except`.
    pub(crate) fn occupant(
        &self,
        parent: NodeId,
        container: usize,
        except: Option<NodeId>,
    ) -> DesignerResult<Option<NodeId>> {
        let descriptor = self.descriptor(parent)?;
        if descriptor
            .containers
            .get(container)
            .is_none_or(|c| c.kind == ContainerKind::Sequence)
        {
            return Ok(None);
        }
        Ok(self.children(parent)?.iter().copied().find(|&child| {
            Some(child) != except
                && self
                    .tree
                    .get(child)
                    .is_ok_and(|info| info.container == Some(container))
        }))
    }

    /// Pick the container of `parent` a child of `child_type` goes into.
    pub(crate) fn choose_container(
        &self,
        parent: NodeId,
        child_type: &str,
        moving: Option<NodeId>,
    ) -> DesignerResult<usize> {
        let candidates = self.candidate_containers(parent, child_type)?;
        let mut occupied = None;
        for container in candidates {
            match self.occupant(parent, container, moving)? {
                None => return Ok(container),
                Some(occupant) => occupied = occupied.or(Some(occupant)),
            }
        }
        let occupant = occupied.ok_or(StructuralEditError::UnknownNode(parent))?;
        Err(StructuralEditError::SlotOccupied { parent, occupant }.into())
    }

    /// `requested` if it can take a child of `child_type`, otherwise the
    /// container [`choose_container`](Self::choose_container) picks.
    pub(crate) fn resolve_container(
        &self,
        parent: NodeId,
        child_type: &str,
        requested: Option<usize>,
        moving: Option<NodeId>,
    ) -> DesignerResult<usize> {
        let Some(container) = requested else {
            return self.choose_container(parent, child_type, moving);
        };
        if !self.candidate_containers(parent, child_type)?.contains(&container) {
            return Err(StructuralEditError::NotAccepted {
                parent_type: self.info(parent)?.component_type.clone(),
                child_type: child_type.to_string(),
            }
            .into());
        }
        match self.occupant(parent, container, moving)? {
            Some(occupant) => Err(StructuralEditError::SlotOccupied { parent, occupant }.into()),
            None => Ok(container),
        }
    }

    /// Add the children `id` exposes through accessors.
    pub(crate) fn materialize_exposed(&mut self, id: NodeId, depth: usize) -> DesignerResult<()> {
        if depth >= MAX_EXPOSED_DEPTH {
            return Ok(());
        }
        let registry = self.registry.clone();
        let info = self.info(id)?;
        let Some(descriptor) = registry.describe(&info.component_type) else {
            return Ok(());
        };
        let children: Vec<ComponentInfo> =
            descriptor.exposed.iter().map(|e| info.exposed_child(e)).collect();
        for child in children {
            let child = self.tree.push_child(id, child)?;
            self.materialize_exposed(child, depth + 1)?;
        }
        Ok(())
    }

    /// Register references to `id` found in `expr`, as written by generated
    /// code inside `method`.
    pub(crate) fn note_reference(&mut self, id: NodeId, expr: &Expr, method: &str) {
        let noted = match self.tree.get(id) {
            Ok(info) => Noted::of(&info.variable, expr.unparenthesized(), method),
            Err(_) => return,
        };
        match noted {
            Noted::Name(span) => {
                if let Ok(info) = self.tree.get_mut(id) {
                    info.variable.add_reference(span.into());
                }
            }
            Noted::Accessor(span) => {
                if let Ok(info) = self.tree.get_mut(id) {
                    info.variable.add_accessor_call(span.into());
                }
            }
            Noted::Owner(owner) => {
                if let Ok(Some(parent)) = self.tree.parent(id) {
                    self.note_reference(parent, owner, method);
                }
            }
            Noted::Nothing => {}
        }
    }
}

/// What a reference expression contributes to a variable.
enum Noted<'e> {
    Name(Span),
    Accessor(Span),
    /// `owner.getX()` for an exposed child; the owner names the parent.
    Owner(&'e Expr),
    Nothing,
}

impl<'e> Noted<'e> {
    fn of(variable: &VariableSupport, expr: &'e Expr, method: &str) -> Self {
        match (variable, &expr.kind) {
            (VariableSupport::Lazy { accessor, .. }, ExprKind::Call { name, .. })
                if accessor != method =>
            {
                Self::Accessor(name.span)
            }
            (
                VariableSupport::Local { .. }
                | VariableSupport::Field { .. }
                | VariableSupport::Lazy { .. },
                ExprKind::Name(_),
            ) => Self::Name(expr.span),
            (
                VariableSupport::Anonymous(AnonymousAccess::Exposed { .. }),
                ExprKind::Call {
                    target: Some(owner),
                    ..
                },
            ) => Self::Owner(owner),
            _ => Self::Nothing,
        }
    }
}

/// The statement at exactly `span`, anywhere in the class.
pub(crate) fn statement_at(unit: &CompilationUnit, span: Span) -> Option<&Stmt> {
    let class = unit.class.as_ref()?;
    let mut found = None;
    for method in class.methods() {
        if let Some(body) = &method.body
            && body.span.contains_span(span)
        {
            walk_statements(body, &mut |stmt| {
                if stmt.span == span {
                    found = Some(stmt);
                }
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(source: &str) -> DesignSession {
        let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
        DesignSession::open(source, registry, SessionConfig::default()).unwrap()
    }

    const FRAME: &str = "import javax.swing.*;\n\
        public class Frame extends JFrame {\n\
        \tprivate JButton ok;\n\
        \tpublic Frame() {\n\
        \t\tJPanel panel = new JPanel();\n\
        \t\tgetContentPane().add(panel);\n\
        \t\tok = new JButton(\"OK\");\n\
        \t\tpanel.add(ok);\n\
        \t}\n\
        }\n";

    #[test]
    fn test_references() {
        let session = session(FRAME);
        let root = session.root().unwrap();
        let content = session.children(root).unwrap()[0];
        let panel = session.children(content).unwrap()[0];
        let ok = session.children(panel).unwrap()[0];

        assert_eq!(session.reference(root, "Frame").as_deref(), Some("this"));
        assert_eq!(
            session.reference(content, "Frame").as_deref(),
            Some("getContentPane()")
        );
        assert_eq!(session.reference(panel, "Frame").as_deref(), Some("panel"));
        assert_eq!(session.reference(panel, "other"), None);
        assert_eq!(session.reference(ok, "other").as_deref(), Some("ok"));
    }

    #[test]
    fn test_container_choice() {
        let session = session(FRAME);
        let root = session.root().unwrap();
        let menu_bar = session
            .choose_container(root, "javax.swing.JMenuBar", None)
            .unwrap();
        assert_eq!(session.descriptor(root).unwrap().containers[menu_bar].name, "menuBar");

        let err = session
            .choose_container(root, "javax.swing.JButton", None)
            .unwrap_err();
        assert!(matches!(
            err,
            DesignerError::StructuralEdit(StructuralEditError::NotAccepted { .. })
        ));
    }

    #[test]
    fn test_refresh_publishes_replacement() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let mut session = session(FRAME);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let _guard = session.bus().subscribe_guarded(move |_: &NodeReplaced| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        session.refresh().unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(session.tree().len(), 4);
    }

    #[test]
    fn test_annotations_are_transient() {
        let mut session = session(FRAME);
        let root = session.root().unwrap();
        session.annotate(root, "selected", true).unwrap();
        assert_eq!(session.annotation::<bool>(root, "selected").unwrap(), Some(&true));

        session.refresh().unwrap();
        let root = session.root().unwrap();
        assert_eq!(session.annotation::<bool>(root, "selected").unwrap(), None);
    }

    #[test]
    fn test_debug_summary() {
        let session = session(FRAME);
        let text = format!("{session:?}");
        assert!(text.starts_with("DesignSession {"));
        assert!(text.contains("class: \"Frame\""));
        assert!(text.contains("entry_method: \"Frame\""));
        assert!(text.contains("nodes: 4"));
    }

    #[test]
    fn test_dump() {
        let session = session(FRAME);
        let dump = session.dump().unwrap();
        assert!(dump.contains("getContentPane()"));
        assert!(dump.contains("ok"));
    }
}
