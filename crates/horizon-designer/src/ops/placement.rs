//! Where a node's statements go among its siblings'.
//!
//! Code order follows model order: a node inserted at index `i` gets its
//! statements before the first later sibling that has statements in the
//! parent's block, or after the last statement of the nearest earlier
//! sibling. Without siblings to lean on, statements go after the parent's
//! own statements.

use horizon_designer_core::NodeId;
use horizon_designer_source::syntax::{ExprKind, StmtKind};
use horizon_designer_source::{Fragment, Span, StatementTarget};

use crate::association::Association;
use crate::error::{DesignerResult, live};
use crate::session::DesignSession;

impl DesignSession {
    /// The statement a node is ordered by: its association statement, else
    /// its declaration or assignment.
    fn anchor(&self, id: NodeId) -> Option<Span> {
        let info = self.tree.get(id).ok()?;
        info.association
            .as_ref()
            .and_then(Association::statement)
            .and_then(Fragment::get)
            .or_else(|| info.variable.statement().and_then(Fragment::get))
    }

    /// Top-level statements of the subtree of `id` inside `block`, in source
    /// order.
    pub(crate) fn group(&self, id: NodeId, block: Span) -> DesignerResult<Vec<Span>> {
        let mut spans = Vec::new();
        for node in self.tree.depth_first_preorder(id)? {
            spans.extend(
                self.info(node)?
                    .own_statements()
                    .into_iter()
                    .filter(|s| *s != block && block.contains_span(*s)),
            );
        }
        spans.sort();
        spans.dedup();
        let mut outer: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            if !outer.iter().any(|o| o.contains_span(span)) {
                outer.push(span);
            }
        }
        Ok(outer)
    }

    /// Where statements for a node at `index` among `siblings` of `parent` go.
    ///
    /// `siblings` excludes the node itself.
    pub(crate) fn insertion_target(
        &mut self,
        parent: NodeId,
        siblings: &[NodeId],
        index: usize,
    ) -> DesignerResult<StatementTarget> {
        let block = live(self.info(parent)?.own_block.get(), "parent block")?;
        let index = index.min(siblings.len());
        for &sibling in &siblings[index..] {
            if let Some(anchor) = self.anchor(sibling)
                && block.contains_span(anchor)
            {
                return Ok(StatementTarget::Before(anchor));
            }
        }
        for &sibling in siblings[..index].iter().rev() {
            if let Some(last) = self.group(sibling, block)?.last() {
                return Ok(StatementTarget::After(*last));
            }
        }
        self.parent_target(parent, block)
    }

    /// After the parent's own statements in `block`.
    ///
    /// Exposed parents have none; their owner's are used instead.
    fn parent_target(&mut self, parent: NodeId, block: Span) -> DesignerResult<StatementTarget> {
        let mut node = parent;
        loop {
            let info = self.info(node)?;
            if info.is_this() {
                return self.block_start(block);
            }
            let own = info
                .own_statements()
                .into_iter()
                .filter(|s| *s != block && block.contains_span(*s))
                .last();
            if let Some(last) = own {
                return Ok(StatementTarget::After(last));
            }
            match (info.is_exposed(), self.tree.parent(node)?) {
                (true, Some(owner)) => node = owner,
                _ => return Ok(StatementTarget::BlockEnd(block)),
            }
        }
    }

    /// The start of `block`, after a leading `super(..)` or `this(..)` call.
    fn block_start(&mut self, block: Span) -> DesignerResult<StatementTarget> {
        let unit = self.unit()?;
        let leading = unit
            .class
            .as_ref()
            .and_then(|class| {
                class
                    .methods()
                    .filter_map(|m| m.body.as_ref())
                    .find(|body| body.span == block)
            })
            .and_then(|body| body.statements.first())
            .filter(|stmt| {
                matches!(
                    &stmt.kind,
                    StmtKind::Expr(expr) if matches!(
                        &expr.kind,
                        ExprKind::Call { target: None, name, .. }
                            if name.text == "super" || name.text == "this"
                    )
                )
            })
            .map(|stmt| stmt.span);
        Ok(match leading {
            Some(call) => StatementTarget::After(call),
            None => StatementTarget::BlockStart(block),
        })
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

    const PANEL: &str = "import javax.swing.*;\n\
        public class View extends JPanel {\n\
        \tpublic View() {\n\
        \t\tsuper();\n\
        \t\tJButton a = new JButton(\"A\");\n\
        \t\tJButton b = new JButton(\"B\");\n\
        \t\tadd(a);\n\
        \t\tadd(b);\n\
        \t\tb.setEnabled(false);\n\
        \t}\n\
        }\n";

    fn text(session: &DesignSession, span: Span) -> String {
        session.editor().read(span).unwrap()
    }

    #[test]
    fn test_targets_follow_siblings() {
        let mut session = session(PANEL);
        let root = session.root().unwrap();
        let children = session.children(root).unwrap().to_vec();

        let StatementTarget::Before(span) = session.insertion_target(root, &children, 1).unwrap()
        else {
            panic!("expected a statement before the second sibling");
        };
        assert_eq!(text(&session, span), "add(b);");

        let StatementTarget::After(span) = session.insertion_target(root, &children, 2).unwrap()
        else {
            panic!("expected a statement after the last sibling");
        };
        assert_eq!(text(&session, span), "b.setEnabled(false);");
    }

    #[test]
    fn test_empty_this_root_starts_after_super() {
        let mut session = session(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tsuper();\n\
             \t}\n\
             }\n",
        );
        let root = session.root().unwrap();
        let StatementTarget::After(span) = session.insertion_target(root, &[], 0).unwrap() else {
            panic!("expected a statement after the super call");
        };
        assert_eq!(text(&session, span), "super();");
    }

    #[test]
    fn test_group_keeps_outer_statements() {
        let session = session(PANEL);
        let root = session.root().unwrap();
        let b = session.children(root).unwrap()[1];
        let block = session.info(root).unwrap().own_block.get().unwrap();
        let group: Vec<String> = session
            .group(b, block)
            .unwrap()
            .into_iter()
            .map(|s| text(&session, s))
            .collect();
        assert_eq!(
            group,
            ["JButton b = new JButton(\"B\");", "add(b);", "b.setEnabled(false);"]
        );
    }
}
