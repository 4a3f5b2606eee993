//! Moving and reordering components.

use std::collections::HashSet;

use horizon_designer_core::logging::targets;
use horizon_designer_core::{ChildMoved, NodeId};
use horizon_designer_source::Span;
use horizon_designer_source::syntax::{CompilationUnit, Expr, ExprKind, StmtKind, walk_statements};

use super::create::statement_expressions;
use super::{Operation, OperationState};
use crate::association::Association;
use crate::description::{AssociationTemplate, InvocationTemplate};
use crate::error::{CapabilityError, DesignerResult, StructuralEditError, live};
use crate::info::ComponentInfo;
use crate::session::{DesignSession, statement_at};
use crate::variable::VariableSupport;

/// Source changes a reparent needs besides moving statements.
enum Rewrite {
    /// Re-render the association statement around the child argument.
    Statement {
        old: InvocationTemplate,
        new: InvocationTemplate,
        parent_ref: String,
    },
    /// Point the constructor's parent argument at the new parent.
    Argument { parent_ref: String },
    Both {
        old: InvocationTemplate,
        new: InvocationTemplate,
        parent_ref: String,
        argument_ref: String,
    },
}

impl DesignSession {
    /// Move a node to `index` under `new_parent`.
    ///
    /// `index` is the final position among the new parent's children.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn move_component(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> DesignerResult<()> {
        self.transact("move", |session, op| {
            session.move_in(op, id, new_parent, None, index)
        })
    }

    /// Reorder the children of `parent`.
    ///
    /// `order` lists every child that is not exposed, in their new order;
    /// exposed children keep the leading positions.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn reorder(&mut self, parent: NodeId, order: &[NodeId]) -> DesignerResult<()> {
        self.transact("reorder", |session, op| {
            let children = session.children(parent)?.to_vec();
            let (exposed, movable): (Vec<NodeId>, Vec<NodeId>) = children
                .into_iter()
                .partition(|&c| session.tree.get(c).is_ok_and(ComponentInfo::is_exposed));
            let wanted: HashSet<NodeId> = order.iter().copied().collect();
            if order.len() != movable.len()
                || wanted.len() != order.len()
                || movable.iter().any(|c| !wanted.contains(c))
            {
                return Err(StructuralEditError::NotAPermutation(parent).into());
            }
            for (position, &child) in order.iter().enumerate() {
                let target = exposed.len() + position;
                if session.tree.index_of(child)? != Some(target) {
                    session.move_in(op, child, parent, None, target)?;
                }
            }
            Ok(())
        })
    }

    pub(crate) fn move_in(
        &mut self,
        op: &mut Operation,
        id: NodeId,
        new_parent: NodeId,
        container: Option<usize>,
        index: usize,
    ) -> DesignerResult<()> {
        let info = self.info(id)?.clone();
        let old_parent = self.parent(id)?.ok_or(CapabilityError::Root("moved"))?;
        let parent_info = self.info(new_parent)?.clone();
        let reparent = old_parent != new_parent;

        if reparent {
            if !info.creation.can_reparent() {
                return Err(CapabilityError::NotReparentable {
                    node: id,
                    reason: info.creation.restriction(),
                }
                .into());
            }
            if self.tree.is_ancestor_of(id, new_parent)? {
                return Err(StructuralEditError::Cycle {
                    node: id,
                    parent: new_parent,
                }
                .into());
            }
        } else if !info.creation.can_reorder() {
            return Err(CapabilityError::NotReorderable {
                node: id,
                reason: info.creation.restriction(),
            }
            .into());
        }

        let container = match (reparent, container, info.container) {
            (false, None, Some(current)) => current,
            (_, requested, _) => {
                self.resolve_container(new_parent, &info.component_type, requested, Some(id))?
            }
        };
        let siblings: Vec<NodeId> = self
            .children(new_parent)?
            .iter()
            .copied()
            .filter(|&c| c != id)
            .collect();
        let exposed = siblings
            .iter()
            .filter(|&&s| self.tree.get(s).is_ok_and(ComponentInfo::is_exposed))
            .count();
        if index < exposed || index > siblings.len() {
            return Err(StructuralEditError::InvalidIndex {
                index,
                min: exposed,
                max: siblings.len(),
            }
            .into());
        }
        let old_index = self
            .tree
            .index_of(id)?
            .ok_or(StructuralEditError::UnknownNode(id))?;

        let subtree = self.tree.depth_first_preorder(id)?;
        let crossing = reparent && parent_info.own_method != info.method;
        if crossing {
            for &node in &subtree {
                let node_info = self.info(node)?;
                if let VariableSupport::Local { name, .. } = &node_info.variable {
                    return Err(StructuralEditError::UnsupportedVariable(format!(
                        "'{name}' is local to {}",
                        node_info.own_method
                    ))
                    .into());
                }
            }
        }
        let rewrite = if reparent || info.container != Some(container) {
            Some(self.plan_rewrite(&info, new_parent, container, &parent_info.own_method)?)
        } else {
            None
        };
        // Nodes whose code sits in the moved node's block move with it.
        let old_block = info.block;
        let followers: Vec<NodeId> = subtree
            .iter()
            .copied()
            .filter(|&node| self.tree.get(node).is_ok_and(|n| n.block == old_block))
            .collect();
        let own_followers: Vec<NodeId> = subtree
            .iter()
            .copied()
            .filter(|&node| self.tree.get(node).is_ok_and(|n| n.own_block == old_block))
            .collect();

        op.enter(OperationState::ApplyingSource);
        let block = live(old_block.get(), "association block")?;
        let group = self.group(id, block)?;
        if !group.is_empty() {
            let target = self.insertion_target(new_parent, &siblings, index)?;
            self.relocate(&group, target)?;
        }
        if let Some(rewrite) = rewrite {
            self.apply_rewrite(id, new_parent, rewrite, &parent_info.own_method, &info.own_method)?;
        }

        op.enter(OperationState::ApplyingModel);
        let new_parent_info = self.info(new_parent)?.clone();
        for node in followers {
            let node_info = self.tree.get_mut(node)?;
            node_info.block = new_parent_info.own_block;
            node_info.method = new_parent_info.own_method.clone();
        }
        for node in own_followers {
            let node_info = self.tree.get_mut(node)?;
            node_info.own_block = new_parent_info.own_block;
            node_info.own_method = new_parent_info.own_method.clone();
        }
        self.tree.get_mut(id)?.container = Some(container);
        self.tree.move_node(id, new_parent, index)?;
        tracing::debug!(
            target: targets::OPS,
            ?id,
            ?old_parent,
            ?new_parent,
            index,
            "component moved"
        );
        op.moved(ChildMoved {
            child: id,
            old_parent,
            old_index,
            new_parent,
            new_index: index,
        });
        Ok(())
    }

    /// Decide how the association changes when `info` goes to `new_parent`.
    fn plan_rewrite(
        &self,
        info: &ComponentInfo,
        new_parent: NodeId,
        container: usize,
        parent_method: &str,
    ) -> DesignerResult<Rewrite> {
        let template = self.descriptor(new_parent)?.containers[container].association.clone();
        let statement_ref = || {
            self.reference(new_parent, parent_method)
                .ok_or(StructuralEditError::NoReference(new_parent))
        };
        let argument_ref = || {
            self.reference(new_parent, &info.own_method)
                .ok_or(StructuralEditError::NoReference(new_parent))
        };
        let rewrite = match (info.association.as_ref(), &template) {
            (Some(Association::Invocation { template: old, .. }), AssociationTemplate::Invocation(new)) => {
                Rewrite::Statement {
                    old: old.clone(),
                    new: new.clone(),
                    parent_ref: statement_ref()?,
                }
            }
            (Some(Association::ConstructorArgument { .. }), AssociationTemplate::Constructor) => {
                Rewrite::Argument {
                    parent_ref: argument_ref()?,
                }
            }
            (Some(Association::Compound { template: old, .. }), AssociationTemplate::Compound(new)) => {
                Rewrite::Both {
                    old: old.clone(),
                    new: new.clone(),
                    parent_ref: statement_ref()?,
                    argument_ref: argument_ref()?,
                }
            }
            _ => {
                return Err(StructuralEditError::NotAccepted {
                    parent_type: self.info(new_parent)?.component_type.clone(),
                    child_type: info.component_type.clone(),
                }
                .into());
            }
        };
        Ok(rewrite)
    }

    fn apply_rewrite(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        rewrite: Rewrite,
        parent_method: &str,
        creation_method: &str,
    ) -> DesignerResult<()> {
        let (statement, argument) = match &rewrite {
            Rewrite::Statement { old, new, parent_ref } => (Some((old, new, parent_ref)), None),
            Rewrite::Argument { parent_ref } => (None, Some(parent_ref)),
            Rewrite::Both {
                old,
                new,
                parent_ref,
                argument_ref,
            } => (Some((old, new, parent_ref)), Some(argument_ref)),
        };

        if let Some(parent_ref) = argument {
            let fragment = self.info(id)?.association.as_ref().and_then(Association::argument).copied();
            let span = live(fragment.and_then(|f| f.get()), "parent argument")?;
            self.forget_references(span);
            self.replace_text(span, parent_ref)?;
            let unit = self.unit()?;
            let written = Span::new(span.start, span.start + parent_ref.len());
            if let Some(expr) = expression_at(&unit, written) {
                self.note_reference(new_parent, expr, creation_method);
            }
        }

        if let Some((old, new, parent_ref)) = statement {
            let span = self.association_statement(id)?;
            let unit = self.unit()?;
            let child = match statement_at(&unit, span).map(|s| &s.kind) {
                Some(StmtKind::Expr(Expr {
                    kind: ExprKind::Call { args, .. },
                    ..
                })) => args.get(old.child_index()).map(|a| a.span),
                _ => None,
            };
            let child = live(child, "association argument")?;
            let child_text = self.editor.read(child)?;
            let rendered = new.render(parent_ref, &child_text);
            let offset = new.child_offset(parent_ref);
            self.replace_text(Span::new(child.end, span.end), &rendered[offset + child_text.len()..])?;
            self.replace_text(Span::new(span.start, child.start), &rendered[..offset])?;

            if let Some(
                Association::Invocation { template, .. } | Association::Compound { template, .. },
            ) = self.tree.get_mut(id)?.association.as_mut()
            {
                *template = new.clone();
            }
            let span = self.association_statement(id)?;
            let unit = self.unit()?;
            if let Some(StmtKind::Expr(Expr {
                kind:
                    ExprKind::Call {
                        target: Some(target),
                        ..
                    },
                ..
            })) = statement_at(&unit, span).map(|s| &s.kind)
            {
                self.note_reference(new_parent, target, parent_method);
            }
        }
        self.prune();
        Ok(())
    }

    fn association_statement(&self, id: NodeId) -> DesignerResult<Span> {
        let fragment = self
            .info(id)?
            .association
            .as_ref()
            .and_then(Association::statement)
            .and_then(|f| f.get());
        live(fragment, "association statement")
    }

    /// Stop tracking any variable reference at exactly `span`.
    fn forget_references(&mut self, span: Span) {
        for info in self.tree.payloads_mut() {
            info.variable.forget(span);
        }
    }
}

/// The expression at exactly `span`, anywhere in a method body.
fn expression_at(unit: &CompilationUnit, span: Span) -> Option<&Expr> {
    let class = unit.class.as_ref()?;
    let mut found = None;
    for body in class.methods().filter_map(|m| m.body.as_ref()) {
        if !body.span.contains_span(span) {
            continue;
        }
        walk_statements(body, &mut |stmt| {
            for expr in statement_expressions(stmt) {
                expr.walk(&mut |e| {
                    if e.span == span && found.is_none() {
                        found = Some(e);
                    }
                });
            }
        });
    }
    found
}
