//! Toolkit-agnostic views over a node's children.
//!
//! Concrete toolkits attach children in many ways: `setViewportView(c)`,
//! `add(c)`, `addTab("..", c)`, or a constructor argument. Descriptors name
//! each of those a container of kind `slot` or `sequence`, and the adapters
//! here let callers work with the two shapes without knowing the toolkit:
//!
//! - [`SlotContainer`] holds at most one child: `get`, `set`, `clear`.
//! - [`SequenceContainer`] holds an ordered list: `list`, `insert`, `remove`,
//!   `move_to`.
//!
//! Adapters are views. Every change runs as one structural edit operation on
//! the session, with the same validation, source edits and events as calling
//! [`DesignSession::create`], [`DesignSession::move_component`] or
//! [`DesignSession::delete`] directly.
//!
//! # Example
//!
//! ```ignore
//! use horizon_designer::{ChildSource, CreateRequest};
//!
//! let mut viewport = session.slot_container(scroll_pane)?;
//! viewport.set(CreateRequest::new("javax.swing.JTextArea"))?;
//!
//! let mut row = session.sequence_container(panel)?;
//! let ok = row.insert(CreateRequest::new("javax.swing.JButton"), 0)?;
//! row.move_to(ok, 1)?;
//! ```

mod sequence;
mod slot;

use horizon_designer_core::NodeId;

pub use sequence::SequenceContainer;
pub use slot::SlotContainer;

use crate::description::ContainerKind;
use crate::error::{DesignerResult, StructuralEditError};
use crate::ops::CreateRequest;
use crate::session::DesignSession;

/// What an adapter places into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSource {
    /// A component created for the purpose.
    New(CreateRequest),
    /// A node already in the tree; it is moved.
    Existing(NodeId),
}

impl From<CreateRequest> for ChildSource {
    fn from(request: CreateRequest) -> Self {
        Self::New(request)
    }
}

impl From<NodeId> for ChildSource {
    fn from(id: NodeId) -> Self {
        Self::Existing(id)
    }
}

/// The adapter a parent is best seen through.
pub enum ContainerAdapter<'s> {
    Slot(SlotContainer<'s>),
    Sequence(SequenceContainer<'s>),
}

impl ContainerAdapter<'_> {
    /// The adapted node.
    pub fn parent(&self) -> NodeId {
        match self {
            Self::Slot(slot) => slot.parent(),
            Self::Sequence(sequence) => sequence.parent(),
        }
    }
}

impl DesignSession {
    /// The first slot container of `parent`.
    pub fn slot_container(&mut self, parent: NodeId) -> DesignerResult<SlotContainer<'_>> {
        let container = self.find_container(parent, ContainerKind::Slot, None)?;
        Ok(SlotContainer::new(self, parent, container))
    }

    /// The slot container of `parent` called `name`.
    pub fn slot_container_named(
        &mut self,
        parent: NodeId,
        name: &str,
    ) -> DesignerResult<SlotContainer<'_>> {
        let container = self.find_container(parent, ContainerKind::Slot, Some(name))?;
        Ok(SlotContainer::new(self, parent, container))
    }

    /// The first sequence container of `parent`.
    pub fn sequence_container(&mut self, parent: NodeId) -> DesignerResult<SequenceContainer<'_>> {
        let container = self.find_container(parent, ContainerKind::Sequence, None)?;
        Ok(SequenceContainer::new(self, parent, container))
    }

    /// View `parent` as a slot or a sequence.
    ///
    /// When the parent has both, it is a slot only while its sequence holds
    /// no children.
    pub fn container_adapter(&mut self, parent: NodeId) -> DesignerResult<ContainerAdapter<'_>> {
        let slot = self.find_container(parent, ContainerKind::Slot, None).ok();
        let sequence = self.find_container(parent, ContainerKind::Sequence, None).ok();
        match (slot, sequence) {
            (Some(slot), Some(sequence)) => {
                let sequence_used = self.children(parent)?.iter().any(|&child| {
                    self.tree
                        .get(child)
                        .is_ok_and(|info| info.container == Some(sequence))
                });
                if sequence_used {
                    Ok(ContainerAdapter::Sequence(SequenceContainer::new(self, parent, sequence)))
                } else {
                    Ok(ContainerAdapter::Slot(SlotContainer::new(self, parent, slot)))
                }
            }
            (Some(slot), None) => Ok(ContainerAdapter::Slot(SlotContainer::new(self, parent, slot))),
            (None, Some(sequence)) => Ok(ContainerAdapter::Sequence(SequenceContainer::new(
                self, parent, sequence,
            ))),
            (None, None) => Err(self.not_a_container(parent)),
        }
    }

    fn find_container(
        &self,
        parent: NodeId,
        kind: ContainerKind,
        name: Option<&str>,
    ) -> DesignerResult<usize> {
        self.descriptor(parent)?
            .containers
            .iter()
            .position(|c| c.kind == kind && name.is_none_or(|n| c.name == n))
            .ok_or_else(|| self.not_a_container(parent))
    }

    fn not_a_container(&self, parent: NodeId) -> crate::error::DesignerError {
        match self.info(parent) {
            Ok(info) => StructuralEditError::NotAContainer {
                type_name: info.component_type.clone(),
            }
            .into(),
            Err(err) => err,
        }
    }
}
