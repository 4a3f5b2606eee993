//! Structural edit operations.
//!
//! Every operation runs through the same states:
//!
//! ```text
//! Validating -> ApplyingSource -> ApplyingModel -> Broadcasting -> Committed
//!      |              |
//!      +--------------+--> Aborted
//! ```
//!
//! Validation happens before the first edit, so capability and structural
//! errors leave everything untouched. Source edits run inside an editor
//! transaction and node payloads are snapshotted first; when a step fails the
//! transaction is rolled back and the payloads restored, so the source text
//! is byte-identical to what it was and the tree is unchanged. Events are
//! collected while the model changes and published once it is consistent.
//!
//! Operations take `&mut DesignSession`, so one must finish before the next
//! can start.

mod create;
mod delete;
mod placement;
mod refactor;
mod regenerate;
mod relocate;

use horizon_designer_core::logging::targets;
use horizon_designer_core::{Broadcast, ChildAdded, ChildMoved, ChildRemoved};
use horizon_designer_source::{Fragment, Span, StatementTarget};

pub use create::{COMPONENT, Construction, CreateRequest};

use crate::error::{DesignerResult, SourceResultExt};
use crate::session::DesignSession;

/// Where a structural edit operation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    Validating,
    ApplyingSource,
    ApplyingModel,
    Broadcasting,
    Committed,
    Aborted,
}

enum Pending {
    Added(ChildAdded),
    Removed(ChildRemoved),
    Moved(ChildMoved),
}

impl Pending {
    fn publish(&self, bus: &Broadcast) -> usize {
        match self {
            Self::Added(event) => bus.publish(event),
            Self::Removed(event) => bus.publish(event),
            Self::Moved(event) => bus.publish(event),
        }
    }
}

/// A running operation: its state and the events it will publish.
pub(crate) struct Operation {
    name: &'static str,
    state: OperationState,
    /// Set once the tree has been changed structurally.
    model_touched: bool,
    events: Vec<Pending>,
}

impl Operation {
    fn new(name: &'static str) -> Self {
        tracing::debug!(target: targets::OPS, operation = name, "validating");
        Self {
            name,
            state: OperationState::Validating,
            model_touched: false,
            events: Vec::new(),
        }
    }

    pub(crate) fn enter(&mut self, state: OperationState) {
        self.model_touched |= state == OperationState::ApplyingModel;
        if self.state != state {
            tracing::debug!(
                target: targets::OPS,
                operation = self.name,
                from = ?self.state,
                to = ?state,
                "operation state"
            );
            self.state = state;
        }
    }

    pub(crate) fn added(&mut self, event: ChildAdded) {
        self.events.push(Pending::Added(event));
    }

    pub(crate) fn removed(&mut self, event: ChildRemoved) {
        self.events.push(Pending::Removed(event));
    }

    pub(crate) fn moved(&mut self, event: ChildMoved) {
        self.events.push(Pending::Moved(event));
    }
}

impl DesignSession {
    /// Run `body` as one atomic operation.
    pub(crate) fn transact<R>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self, &mut Operation) -> DesignerResult<R>,
    ) -> DesignerResult<R> {
        let mut op = Operation::new(name);
        let snapshot = self.tree.snapshot();
        let context = self.context.clone();
        let marker = self.editor.begin_transaction();

        match body(self, &mut op) {
            Ok(value) => {
                op.enter(OperationState::Broadcasting);
                let mut delivered = 0;
                for event in &op.events {
                    delivered += event.publish(&self.bus);
                }
                self.editor.commit(marker)?;
                op.enter(OperationState::Committed);
                tracing::debug!(
                    target: targets::OPS,
                    operation = name,
                    events = op.events.len(),
                    delivered,
                    "committed"
                );
                self.last_state = Some(op.state);
                Ok(value)
            }
            Err(err) => {
                let model_touched = op.model_touched;
                op.enter(OperationState::Aborted);
                self.last_state = Some(op.state);
                tracing::warn!(target: targets::OPS, operation = name, error = %err, "operation aborted");
                if let Err(rollback) = self.editor.rollback_to(marker) {
                    tracing::error!(
                        target: targets::OPS,
                        operation = name,
                        error = %rollback,
                        "source rollback failed"
                    );
                }
                self.tree.restore(snapshot);
                self.context = context;
                if model_touched && let Err(refresh) = self.refresh() {
                    tracing::error!(
                        target: targets::OPS,
                        operation = name,
                        error = %refresh,
                        "model rebuild after abort failed"
                    );
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Source edits that keep every fragment current
    // =========================================================================

    pub(crate) fn replace_text(&mut self, span: Span, text: &str) -> DesignerResult<()> {
        let edit = self.editor.replace(span, text).rejected()?;
        self.apply_map(&edit.into());
        Ok(())
    }

    pub(crate) fn insert_statements(
        &mut self,
        target: StatementTarget,
        statements: &[String],
    ) -> DesignerResult<Vec<Span>> {
        let (map, spans) = self.editor.insert_statements(target, statements).rejected()?;
        self.apply_map(&map);
        Ok(spans)
    }

    pub(crate) fn relocate(
        &mut self,
        spans: &[Span],
        target: StatementTarget,
    ) -> DesignerResult<Vec<Span>> {
        let (map, moved) = self.editor.relocate_statements(spans, target).rejected()?;
        self.apply_map(&map);
        Ok(moved)
    }

    /// Remove the statement a fragment tracks. Detached fragments are skipped.
    pub(crate) fn remove_statement(&mut self, fragment: Fragment) -> DesignerResult<()> {
        if let Some(span) = fragment.get() {
            let map = self.editor.remove_statement(span).rejected()?;
            self.apply_map(&map);
        }
        Ok(())
    }

    /// Remove the class member a fragment tracks. Detached fragments are skipped.
    pub(crate) fn remove_member(&mut self, fragment: Fragment) -> DesignerResult<()> {
        if let Some(span) = fragment.get() {
            let map = self.editor.remove_member(span).rejected()?;
            self.apply_map(&map);
        }
        Ok(())
    }

    pub(crate) fn insert_field(&mut self, declaration: &str) -> DesignerResult<Span> {
        let (map, span) = self.editor.insert_field(declaration).rejected()?;
        self.apply_map(&map);
        Ok(span)
    }

    pub(crate) fn insert_method(&mut self, method: &str) -> DesignerResult<Span> {
        let (map, span) = self.editor.insert_method(method).rejected()?;
        self.apply_map(&map);
        Ok(span)
    }

    /// Make `qualified` usable by its simple name.
    pub(crate) fn import(&mut self, qualified: &str) -> DesignerResult<()> {
        if let Some(map) = self.editor.ensure_import(qualified).rejected()? {
            self.apply_map(&map);
        }
        self.context.resolver.import(qualified);
        Ok(())
    }
}
