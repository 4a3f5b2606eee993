//! Deleting components.

use horizon_designer_core::{ChildRemoved, NodeId};
use horizon_designer_source::Fragment;

use super::{Operation, OperationState};
use crate::association::Association;
use crate::error::{CapabilityError, DesignerResult, StructuralEditError};
use crate::session::DesignSession;

/// A piece of source owned by a node, re-read before each removal so it
/// reflects earlier edits.
#[derive(Debug, Clone, Copy)]
enum Part {
    Association,
    Related(usize),
    Variable,
    Member(usize),
}

impl DesignSession {
    /// Delete a node, its subtree and all the code that belongs to them.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn delete(&mut self, id: NodeId) -> DesignerResult<()> {
        self.transact("delete", |session, op| session.delete_in(op, id))
    }

    pub(crate) fn delete_in(&mut self, op: &mut Operation, id: NodeId) -> DesignerResult<()> {
        let info = self.info(id)?;
        if self.parent(id)?.is_none() {
            return Err(CapabilityError::Root("deleted").into());
        }
        if !info.creation.can_delete() {
            return Err(CapabilityError::NotDeletable {
                node: id,
                reason: info.creation.restriction(),
            }
            .into());
        }

        let order = self.tree.depth_first_postorder(id)?;
        let mut events = Vec::with_capacity(order.len());
        for &node in &order {
            let parent = self.parent(node)?.ok_or(StructuralEditError::UnknownNode(node))?;
            let index = self
                .tree
                .index_of(node)?
                .ok_or(StructuralEditError::UnknownNode(node))?;
            events.push(ChildRemoved {
                parent,
                child: node,
                index,
            });
        }

        op.enter(OperationState::ApplyingSource);
        for &node in &order {
            self.remove_code(node)?;
        }

        op.enter(OperationState::ApplyingModel);
        self.tree.destroy(id)?;
        self.prune();
        tracing::debug!(target: "horizon_designer::ops", ?id, removed = order.len(), "component deleted");
        for event in events {
            op.removed(event);
        }
        Ok(())
    }

    /// Remove the association, related statements, the variable's statement
    /// and its members, in that order.
    fn remove_code(&mut self, node: NodeId) -> DesignerResult<()> {
        let info = self.info(node)?;
        let mut parts = vec![Part::Association];
        parts.extend((0..info.related.len()).map(Part::Related));
        parts.push(Part::Variable);
        parts.extend((0..info.variable.members().len()).map(Part::Member));

        for part in parts {
            let info = self.info(node)?;
            match part {
                Part::Association => {
                    let statement = info.association.as_ref().and_then(Association::statement).copied();
                    self.remove_statement(statement.unwrap_or_else(Fragment::detached))?;
                }
                Part::Related(index) => {
                    let statement = info.related[index];
                    self.remove_statement(statement)?;
                }
                Part::Variable => {
                    let statement = info.variable.statement().copied();
                    self.remove_statement(statement.unwrap_or_else(Fragment::detached))?;
                }
                Part::Member(index) => {
                    let member = info.variable.members()[index];
                    self.remove_member(member)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use horizon_designer_core::ChildRemoved;
    use parking_lot::Mutex;

    use super::*;
    use crate::error::DesignerError;
    use crate::{DescriptorRegistry, SessionConfig};

    fn session(source: &str) -> DesignSession {
        let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
        DesignSession::open(source, registry, SessionConfig::default()).unwrap()
    }

    #[test]
    fn test_delete_subtree_bottom_up() {
        let mut session = session(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tprivate JButton ok;\n\
             \tpublic View() {\n\
             \t\tJPanel row = new JPanel();\n\
             \t\tadd(row);\n\
             \t\tok = new JButton(\"OK\");\n\
             \t\trow.add(ok);\n\
             \t\tok.setEnabled(false);\n\
             \t\tadd(new JLabel(\"kept\"));\n\
             \t}\n\
             }\n",
        );
        let root = session.root().unwrap();
        let row = session.children(root).unwrap()[0];
        let ok = session.children(row).unwrap()[0];

        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = removed.clone();
        let _guard = session
            .bus()
            .subscribe_guarded(move |event: &ChildRemoved| sink.lock().push(*event));

        session.delete(row).unwrap();
        assert_eq!(
            session.source(),
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tadd(new JLabel(\"kept\"));\n\
             \t}\n\
             }\n"
        );
        let removed = removed.lock();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].child, ok);
        assert_eq!(removed[1].child, row);
        assert_eq!(removed[1].parent, root);
        assert_eq!(session.children(root).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_discarded_construction() {
        let mut session = session(
            "import org.eclipse.swt.SWT;\n\
             import org.eclipse.swt.widgets.*;\n\
             public class Demo {\n\
             \tpublic static void main(String[] args) {\n\
             \t\tShell shell = new Shell();\n\
             \t\tnew Label(shell, SWT.NONE);\n\
             \t\tButton ok = new Button(shell, SWT.PUSH);\n\
             \t}\n\
             }\n",
        );
        let root = session.root().unwrap();
        let label = session.children(root).unwrap()[0];
        session.delete(label).unwrap();
        assert_eq!(
            session.source(),
            "import org.eclipse.swt.SWT;\n\
             import org.eclipse.swt.widgets.*;\n\
             public class Demo {\n\
             \tpublic static void main(String[] args) {\n\
             \t\tShell shell = new Shell();\n\
             \t\tButton ok = new Button(shell, SWT.PUSH);\n\
             \t}\n\
             }\n"
        );
        assert_eq!(session.children(root).unwrap().len(), 1);
    }

    #[test]
    fn test_root_and_exposed_are_not_deletable() {
        let source = "import javax.swing.*;\n\
             public class Frame extends JFrame {\n\
             \tpublic Frame() {\n\
             \t\tgetContentPane().add(new JButton());\n\
             \t}\n\
             }\n";
        let mut session = session(source);
        let root = session.root().unwrap();
        let content = session.children(root).unwrap()[0];

        let err = session.delete(root).unwrap_err();
        assert!(matches!(err, DesignerError::Capability(CapabilityError::Root(_))));
        let err = session.delete(content).unwrap_err();
        assert!(matches!(
            err,
            DesignerError::Capability(CapabilityError::NotDeletable { .. })
        ));
        assert_eq!(session.source(), source);
    }
}
