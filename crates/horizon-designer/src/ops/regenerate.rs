//! Rebuilding the component code from the model.

use std::collections::HashMap;

use horizon_designer_core::NodeId;
use horizon_designer_core::logging::targets;
use horizon_designer_source::{Fragment, Span};

use super::create::{Construction, CreateRequest};
use super::Operation;
use crate::error::{DesignerResult, StructuralEditError, live};
use crate::session::DesignSession;

/// One component to bring back, with its subtree.
#[derive(Debug)]
enum Recipe {
    Create {
        request: CreateRequest,
        container: Option<usize>,
        children: Vec<Recipe>,
    },
    /// Exposed children come back with their owner; only their subtree is
    /// rebuilt.
    Exposed {
        accessor: String,
        children: Vec<Recipe>,
    },
}

impl DesignSession {
    /// Delete every removable component and create it again through the
    /// same paths [`DesignSession::create`] uses.
    ///
    /// Variables keep their names and kinds. Creation expressions and the
    /// statements that use a component are carried over as written. Inline
    /// children come back with the default variable kind.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn regenerate(&mut self) -> DesignerResult<()> {
        let Some(root) = self.root() else {
            return Ok(());
        };
        self.transact("regenerate", |session, op| {
            let mut owners = HashMap::new();
            session.statement_owners(root, None, &mut owners)?;
            let recipes = session.recipes(root, &owners)?;
            session.clear(op, root)?;
            let created = session.rebuild(op, root, &recipes)?;
            tracing::debug!(target: targets::OPS, created, "components regenerated");
            Ok(())
        })
    }

    /// Assign each related statement to the last recreated node, in creation
    /// order, that uses it. Statements of exposed nodes go to their nearest
    /// recreated owner.
    fn statement_owners(
        &self,
        parent: NodeId,
        owner: Option<NodeId>,
        owners: &mut HashMap<Span, NodeId>,
    ) -> DesignerResult<()> {
        for &child in self.children(parent)? {
            let info = self.info(child)?;
            let own = if info.is_exposed() { owner } else { Some(child) };
            if let Some(own) = own {
                for span in info.related.iter().filter_map(Fragment::get) {
                    owners.insert(span, own);
                }
            }
            self.statement_owners(child, own, owners)?;
        }
        Ok(())
    }

    fn recipes(
        &self,
        parent: NodeId,
        owners: &HashMap<Span, NodeId>,
    ) -> DesignerResult<Vec<Recipe>> {
        let mut recipes = Vec::new();
        for &child in self.children(parent)? {
            let info = self.info(child)?;
            let children = self.recipes(child, owners)?;
            if let Some(accessor) = info.creation.exposed_accessor() {
                recipes.push(Recipe::Exposed {
                    accessor: accessor.to_string(),
                    children,
                });
                continue;
            }

            let expression = live(
                info.creation.expression().and_then(Fragment::get),
                "creation expression",
            )?;
            let mut request = CreateRequest::new(info.component_type.clone())
                .with_construction(Construction::Source(self.editor.read(expression)?));
            if let Some(kind) = info.variable.kind() {
                request = request.with_variable(kind);
            }
            if let Some(name) = info.name() {
                request = request.with_name(name);
            }
            let mut statements: Vec<Span> = owners
                .iter()
                .filter(|&(_, &owner)| owner == child)
                .map(|(&span, _)| span)
                .collect();
            statements.sort();
            for span in statements {
                request = request.with_statement(self.editor.read(span)?);
            }
            recipes.push(Recipe::Create {
                request,
                container: info.container,
                children,
            });
        }
        Ok(recipes)
    }

    /// Delete the removable children of `parent`, last first.
    fn clear(&mut self, op: &mut Operation, parent: NodeId) -> DesignerResult<()> {
        let children = self.children(parent)?.to_vec();
        for child in children.into_iter().rev() {
            if self.info(child)?.is_exposed() {
                self.clear(op, child)?;
            } else {
                self.delete_in(op, child)?;
            }
        }
        Ok(())
    }

    /// Returns how many components were created.
    fn rebuild(
        &mut self,
        op: &mut Operation,
        parent: NodeId,
        recipes: &[Recipe],
    ) -> DesignerResult<usize> {
        let mut created = 0;
        for recipe in recipes {
            match recipe {
                Recipe::Create {
                    request,
                    container,
                    children,
                } => {
                    let index = self.children(parent)?.len();
                    let id = self.create_in(op, parent, *container, index, request)?;
                    created += 1 + self.rebuild(op, id, children)?;
                }
                Recipe::Exposed { accessor, children } => {
                    let id = self
                        .children(parent)?
                        .iter()
                        .copied()
                        .find(|&c| {
                            self.tree.get(c).is_ok_and(|i| {
                                i.creation.exposed_accessor() == Some(accessor.as_str())
                            })
                        })
                        .ok_or(StructuralEditError::StaleFragment("exposed child"))?;
                    created += self.rebuild(op, id, children)?;
                }
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{DescriptorRegistry, SessionConfig};

    fn session(source: &str) -> DesignSession {
        let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
        DesignSession::open(source, registry, SessionConfig::default()).unwrap()
    }

    const REGENERATED: &str = "import javax.swing.*;\n\
        public class View extends JPanel {\n\
        \tpublic View() {\n\
        \t\tJPanel row = new JPanel();\n\
        \t\tadd(row);\n\
        \t\tJButton ok = new JButton(\"OK\");\n\
        \t\trow.add(ok);\n\
        \t\tok.setEnabled(false);\n\
        \t\tJLabel label = new JLabel(\"Name\");\n\
        \t\tadd(label);\n\
        \t}\n\
        }\n";

    #[test]
    fn test_regenerate_normalizes_order() {
        let mut session = session(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tJPanel row = new JPanel();\n\
             \t\tadd(row);\n\
             \t\tJButton ok = new JButton(\"OK\");\n\
             \t\tok.setEnabled(false);\n\
             \t\trow.add(ok);\n\
             \t\tadd(new JLabel(\"Name\"));\n\
             \t}\n\
             }\n",
        );
        session.regenerate().unwrap();
        assert_eq!(session.source(), REGENERATED);

        let root = session.root().unwrap();
        let children = session.children(root).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(session.info(children[1]).unwrap().name(), Some("label"));
        let ok = session.children(children[0]).unwrap()[0];
        assert_eq!(session.info(ok).unwrap().properties.len(), 1);
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let mut session = session(REGENERATED);
        let before = session.dump().unwrap();
        session.regenerate().unwrap();
        assert_eq!(session.source(), REGENERATED);
        assert_eq!(session.dump().unwrap(), before);
    }

    #[test]
    fn test_regenerate_keeps_discarded_construction_in_place() {
        let mut session = session(
            "import org.eclipse.swt.SWT;\n\
             import org.eclipse.swt.widgets.*;\n\
             public class Demo {\n\
             \tpublic static void main(String[] args) {\n\
             \t\tShell shell = new Shell();\n\
             \t\tComposite group = new Composite(shell, SWT.NONE);\n\
             \t\tnew Label(shell, SWT.NONE);\n\
             \t\tButton ok = new Button(shell, SWT.PUSH);\n\
             \t}\n\
             }\n",
        );
        session.regenerate().unwrap();
        let source = session.source();
        let group = source.find("Composite group = new Composite(shell, SWT.NONE);").unwrap();
        let label = source.find("label = new Label(shell, SWT.NONE);").unwrap();
        let ok = source.find("Button ok = new Button(shell, SWT.PUSH);").unwrap();
        assert!(group < label && label < ok, "{source}");

        let root = session.root().unwrap();
        let types: Vec<String> = session
            .children(root)
            .unwrap()
            .iter()
            .map(|&c| session.info(c).unwrap().component_type.clone())
            .collect();
        assert_eq!(
            types,
            vec![
                "org.eclipse.swt.widgets.Composite",
                "org.eclipse.swt.widgets.Label",
                "org.eclipse.swt.widgets.Button",
            ]
        );
        let before = session.dump().unwrap();
        session.refresh().unwrap();
        assert_eq!(session.dump().unwrap(), before);
    }

    #[test]
    fn test_regenerate_keeps_exposed_children() {
        let source = "import javax.swing.*;\n\
             public class Frame extends JFrame {\n\
             \tprivate JButton ok;\n\
             \tpublic Frame() {\n\
             \t\tok = new JButton(\"OK\");\n\
             \t\tgetContentPane().add(ok);\n\
             \t}\n\
             }\n";
        let mut session = session(source);
        let before = session.dump().unwrap();
        session.regenerate().unwrap();
        assert_eq!(session.dump().unwrap(), before);
        session.refresh().unwrap();
        assert_eq!(session.dump().unwrap(), before);
        assert!(session.source().contains("\t\tgetContentPane().add(ok);\n"));
    }
}
