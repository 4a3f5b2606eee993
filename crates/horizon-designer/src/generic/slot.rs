//! A container holding at most one child.

use horizon_designer_core::NodeId;

use super::ChildSource;
use crate::error::{DesignerResult, StructuralEditError};
use crate::session::DesignSession;

/// One slot of a parent, such as a scroll pane's viewport.
pub struct SlotContainer<'s> {
    session: &'s mut DesignSession,
    parent: NodeId,
    container: usize,
}

impl<'s> SlotContainer<'s> {
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

    /// The descriptor name of the slot.
    pub fn name(&self) -> DesignerResult<&str> {
        Ok(&self.session.descriptor(self.parent)?.containers[self.container].name)
    }

    /// The child in the slot.
    pub fn get(&self) -> DesignerResult<Option<NodeId>> {
        self.session.occupant(self.parent, self.container, None)
    }

    /// Put a child into the empty slot.
    pub fn set(&mut self, child: impl Into<ChildSource>) -> DesignerResult<NodeId> {
        if let Some(occupant) = self.get()? {
            return Err(StructuralEditError::SlotOccupied {
                parent: self.parent,
                occupant,
            }
            .into());
        }
        let (parent, container) = (self.parent, self.container);
        match child.into() {
            ChildSource::New(request) => self.session.transact("create", |session, op| {
                let index = session.children(parent)?.len();
                session.create_in(op, parent, Some(container), index, &request)
            }),
            ChildSource::Existing(id) => self.session.transact("move", |session, op| {
                let mut index = session.children(parent)?.len();
                if session.parent(id)? == Some(parent) {
                    index -= 1;
                }
                session.move_in(op, id, parent, Some(container), index)?;
                Ok(id)
            }),
        }
    }

    /// Delete the child in the slot. Returns whether there was one.
    pub fn clear(&mut self) -> DesignerResult<bool> {
        match self.get()? {
            Some(occupant) => {
                self.session.delete(occupant)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::DesignerError;
    use crate::generic::tests::{VIEW, session};
    use crate::{CreateRequest, DescriptorRegistry, SessionConfig};

    #[test]
    fn test_set_get_clear() {
        let mut session = session(VIEW);
        let root = session.root().unwrap();
        let dock = session.children(root).unwrap()[0];

        let mut center = session.slot_container(dock).unwrap();
        assert_eq!(center.name().unwrap(), "center");
        assert_eq!(center.get().unwrap(), None);
        let area = center.set(CreateRequest::new("javax.swing.JTextArea")).unwrap();
        assert_eq!(center.get().unwrap(), Some(area));

        let err = center.set(CreateRequest::new("javax.swing.JLabel")).unwrap_err();
        assert!(matches!(
            err,
            DesignerError::StructuralEdit(StructuralEditError::SlotOccupied { .. })
        ));
        assert!(session.source().contains("\t\tdock.setCenter(textArea);\n"));

        let mut center = session.slot_container(dock).unwrap();
        assert!(center.clear().unwrap());
        assert!(!center.clear().unwrap());
        assert_eq!(session.source(), VIEW);
    }

    #[test]
    fn test_set_moves_existing_child() {
        let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
        let mut session = DesignSession::open(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tJScrollPane scroll = new JScrollPane();\n\
             \t\tadd(scroll);\n\
             \t\tJTextArea text = new JTextArea();\n\
             \t\tadd(text);\n\
             \t}\n\
             }\n",
            registry,
            SessionConfig::default(),
        )
        .unwrap();
        let root = session.root().unwrap();
        let [scroll, text] = session.children(root).unwrap() else {
            panic!("expected two children");
        };
        let (scroll, text) = (*scroll, *text);

        session.slot_container(scroll).unwrap().set(text).unwrap();
        assert_eq!(session.parent(text).unwrap(), Some(scroll));
        assert!(session.source().contains("\t\tscroll.setViewportView(text);\n"));
        assert!(!session.source().contains("add(text)"));
    }
}
