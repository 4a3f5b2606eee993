//! A container holding an ordered list of children.

use horizon_designer_core::NodeId;

use super::ChildSource;
use crate::error::{DesignerResult, StructuralEditError};
use crate::session::DesignSession;

/// One sequence of a parent, such as a panel's children.
///
/// Positions count only the children in this sequence; exposed children and
/// children in the parent's slots are skipped.
pub struct SequenceContainer<'s> {
    session: &'s mut DesignSession,
    parent: NodeId,
    container: usize,
}

impl<'s> SequenceContainer<'s> {
    pub(crate) fn new(session: &'s mut DesignSession, parent: NodeId, container: usize) -> Self {
        Self {
            session,
            parent,
            container,
        }
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// The children in this sequence, in order.
    pub fn list(&self) -> DesignerResult<Vec<NodeId>> {
        let children = self.session.children(self.parent)?;
        Ok(children
            .iter()
            .copied()
            .filter(|&child| {
                self.session
                    .tree
                    .get(child)
                    .is_ok_and(|info| info.container == Some(self.container))
            })
            .collect())
    }

    pub fn len(&self) -> DesignerResult<usize> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> DesignerResult<bool> {
        Ok(self.list()?.is_empty())
    }

    /// Put a child at `index` of the sequence.
    pub fn insert(&mut self, child: impl Into<ChildSource>, index: usize) -> DesignerResult<NodeId> {
        let (parent, container) = (self.parent, self.container);
        match child.into() {
            ChildSource::New(request) => {
                let model_index = self.model_index(None, index)?;
                self.session.transact("create", |session, op| {
                    session.create_in(op, parent, Some(container), model_index, &request)
                })
            }
            ChildSource::Existing(id) => {
                let model_index = self.model_index(Some(id), index)?;
                let requested = (self.session.parent(id)? != Some(parent)
                    || self.session.info(id)?.container != Some(container))
                .then_some(container);
                self.session.transact("move", |session, op| {
                    session.move_in(op, id, parent, requested, model_index)?;
                    Ok(id)
                })
            }
        }
    }

    /// Delete a child of the sequence.
    pub fn remove(&mut self, child: NodeId) -> DesignerResult<()> {
        self.member(child)?;
        self.session.delete(child)
    }

    /// Move a child of the sequence to `index`.
    pub fn move_to(&mut self, child: NodeId, index: usize) -> DesignerResult<()> {
        self.member(child)?;
        self.insert(child, index).map(|_| ())
    }

    fn member(&self, child: NodeId) -> DesignerResult<()> {
        if self.list()?.contains(&child) {
            Ok(())
        } else {
            Err(StructuralEditError::UnknownNode(child).into())
        }
    }

    /// The position among all children of the parent for sequence position
    /// `index`, with `moving` taken out first.
    fn model_index(&self, moving: Option<NodeId>, index: usize) -> DesignerResult<usize> {
        let children: Vec<NodeId> = self
            .session
            .children(self.parent)?
            .iter()
            .copied()
            .filter(|&c| Some(c) != moving)
            .collect();
        let list: Vec<NodeId> = self
            .list()?
            .into_iter()
            .filter(|&c| Some(c) != moving)
            .collect();
        if index > list.len() {
            return Err(StructuralEditError::InvalidIndex {
                index,
                min: 0,
                max: list.len(),
            }
            .into());
        }
        let position = |node: NodeId| children.iter().position(|&c| c == node);
        let model_index = match (list.get(index), list.last()) {
            (Some(&next), _) => position(next),
            (None, Some(&last)) => position(last).map(|p| p + 1),
            (None, None) => Some(children.len()),
        };
        model_index.ok_or_else(|| StructuralEditError::UnknownNode(self.parent).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreateRequest;
    use crate::generic::tests::{VIEW, session};

    #[test]
    fn test_insert_list_move_remove() {
        let mut session = session(VIEW);
        let root = session.root().unwrap();
        let dock = session.children(root).unwrap()[0];

        session
            .slot_container(dock)
            .unwrap()
            .set(CreateRequest::new("javax.swing.JTextArea"))
            .unwrap();

        let mut items = session.sequence_container(dock).unwrap();
        assert!(items.is_empty().unwrap());
        let first = items.insert(CreateRequest::new("javax.swing.JButton").with_name("first"), 0).unwrap();
        let second = items.insert(CreateRequest::new("javax.swing.JButton").with_name("second"), 1).unwrap();
        let zeroth = items.insert(CreateRequest::new("javax.swing.JButton").with_name("zeroth"), 0).unwrap();
        assert_eq!(items.list().unwrap(), vec![zeroth, first, second]);

        let err = items.insert(CreateRequest::new("javax.swing.JButton"), 9).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DesignerError::StructuralEdit(StructuralEditError::InvalidIndex { max: 3, .. })
        ));

        items.move_to(zeroth, 2).unwrap();
        assert_eq!(items.list().unwrap(), vec![first, second, zeroth]);
        items.remove(first).unwrap();
        assert_eq!(items.list().unwrap(), vec![second, zeroth]);
        assert_eq!(items.len().unwrap(), 2);

        let source = session.source();
        let second_at = source.find("dock.add(second);").unwrap();
        let zeroth_at = source.find("dock.add(zeroth);").unwrap();
        assert!(second_at < zeroth_at);
        assert!(source.contains("dock.setCenter(textArea);"));
        assert!(!source.contains("first"));
    }
}
