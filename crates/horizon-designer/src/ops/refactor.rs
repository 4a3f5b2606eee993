//! Variable refactorings: rename and conversions between local and field.

use horizon_designer_core::NodeId;
use horizon_designer_core::logging::targets;
use horizon_designer_source::syntax::{
    ClassDecl, Expr, ExprKind, MethodDecl, StmtKind, walk_statements,
};
use horizon_designer_source::{Fragment, Span};

use super::OperationState;
use super::create::statement_expressions;
use crate::creation::CreationSupport;
use crate::error::{DesignerResult, ParseError, StructuralEditError, live};
use crate::naming::is_identifier;
use crate::session::{DesignSession, statement_at};
use crate::variable::VariableSupport;

fn unsupported(message: impl Into<String>) -> StructuralEditError {
    StructuralEditError::UnsupportedVariable(message.into())
}

impl DesignSession {
    /// Rename a node's variable everywhere it is spelled.
    ///
    /// A lazy accessor whose name follows the configured pattern is renamed
    /// along with its field.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> DesignerResult<()> {
        self.transact("rename", |session, op| {
            let info = session.info(id)?.clone();
            let old = info
                .name()
                .ok_or_else(|| unsupported("the component has no variable"))?
                .to_string();
            if old == new_name {
                return Ok(());
            }
            if !is_identifier(new_name) {
                return Err(StructuralEditError::InvalidName(new_name.to_string()).into());
            }
            let taken = session.taken_names()?;
            if taken.contains(new_name) {
                return Err(StructuralEditError::NameInUse(new_name.to_string()).into());
            }
            let accessor = match info.variable.accessor() {
                Some(current) if current == session.config.accessor_name(&old) => {
                    let renamed = session.config.accessor_name(new_name);
                    if taken.contains(&renamed) {
                        return Err(StructuralEditError::NameInUse(renamed).into());
                    }
                    Some((current.to_string(), renamed))
                }
                _ => None,
            };

            op.enter(OperationState::ApplyingSource);
            let count = info.variable.name_fragments().len();
            for index in 0..count {
                let fragment = session.info(id)?.variable.name_fragments()[index];
                if let Some(span) = fragment.get() {
                    session.replace_text(span, new_name)?;
                }
            }
            if let Some((_, renamed)) = &accessor {
                let count = info.variable.accessor_fragments().len();
                for index in 0..count {
                    let fragment = session.info(id)?.variable.accessor_fragments()[index];
                    if let Some(span) = fragment.get() {
                        session.replace_text(span, renamed)?;
                    }
                }
            }

            op.enter(OperationState::ApplyingModel);
            session.tree.get_mut(id)?.variable.set_name(new_name);
            if let Some((current, renamed)) = accessor {
                let node = session.tree.get_mut(id)?;
                node.variable.set_accessor(&renamed);
                if let CreationSupport::LazyAccessor { accessor, .. } = &mut node.creation {
                    *accessor = renamed.clone();
                }
                for info in session.tree.payloads_mut() {
                    if info.method == current {
                        info.method = renamed.clone();
                    }
                    if info.own_method == current {
                        info.own_method = renamed.clone();
                    }
                }
            }
            tracing::debug!(target: targets::OPS, ?id, old = %old, new = %new_name, "variable renamed");
            Ok(())
        })
    }

    /// Turn a local variable into a field assigned where the local was
    /// declared.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn convert_to_field(&mut self, id: NodeId) -> DesignerResult<()> {
        self.transact("convert to field", |session, op| {
            let VariableSupport::Local {
                name,
                type_prefix,
                ..
            } = session.info(id)?.variable.clone()
            else {
                return Err(unsupported("only local variables become fields").into());
            };
            let prefix = live(type_prefix.get(), "declared type")?;
            let unit = session.unit()?;
            if unit.class.as_ref().and_then(|c| c.field(&name)).is_some() {
                return Err(StructuralEditError::NameInUse(name).into());
            }
            let type_text = session.editor.read(prefix)?.trim_end().to_string();

            op.enter(OperationState::ApplyingSource);
            session.replace_text(prefix, "")?;
            let modifier = session.config.field_modifier.clone();
            session.insert_field(&format!("{modifier} {type_text} {name};"))?;

            let unit = session.unit()?;
            let class = unit.class.as_ref().ok_or(ParseError::NoClass)?;
            let field = class
                .field(&name)
                .ok_or(StructuralEditError::StaleFragment("field"))?;

            op.enter(OperationState::ApplyingModel);
            let node = session.tree.get_mut(id)?;
            let VariableSupport::Local {
                declaration,
                name_span,
                references,
                ..
            } = node.variable.clone()
            else {
                return Err(unsupported("variable changed during conversion").into());
            };
            node.variable = VariableSupport::Field {
                name,
                field: field.span.into(),
                field_name: field.name.span.into(),
                assignment: declaration,
                references: std::iter::once(name_span).chain(references).collect(),
            };
            Ok(())
        })
    }

    /// Turn a field into a local variable of the method that assigns it.
    ///
    /// Every use of the field has to be inside that method.
    #[tracing::instrument(skip(self), target = "horizon_designer::ops", level = "debug")]
    pub fn convert_to_local(&mut self, id: NodeId) -> DesignerResult<()> {
        self.transact("convert to local", |session, op| {
            let VariableSupport::Field {
                name,
                field,
                assignment,
                ..
            } = session.info(id)?.variable.clone()
            else {
                return Err(unsupported("only fields become local variables").into());
            };
            let assignment = live(assignment.get(), "field assignment")?;
            let field_span = live(field.get(), "field declaration")?;

            let unit = session.unit()?;
            let class = unit.class.as_ref().ok_or(ParseError::NoClass)?;
            let method = class
                .method_at(assignment.start)
                .ok_or(StructuralEditError::StaleFragment("assigning method"))?;
            if used_outside(class, method, &name) {
                return Err(
                    unsupported(format!("'{name}' is used outside {}", method.name.text)).into(),
                );
            }
            let type_text = class
                .field(&name)
                .map(|f| session.editor.read(f.ty.span))
                .transpose()?
                .ok_or(StructuralEditError::StaleFragment("field type"))?;

            op.enter(OperationState::ApplyingSource);
            let prefix = format!("{type_text} ");
            session.replace_text(Span::empty(assignment.start), &prefix)?;
            let declaration_span = {
                let node = session.info(id)?;
                let statement = node.variable.statement().and_then(Fragment::get);
                let end = live(statement, "field assignment")?.end;
                Span::new(assignment.start, end)
            };
            let unit = session.unit()?;
            let stmt = statement_at(&unit, declaration_span)
                .ok_or(StructuralEditError::StaleFragment("declaration"))?;
            let StmtKind::Local { ty, name: ident, .. } = &stmt.kind else {
                return Err(StructuralEditError::StaleFragment("declaration").into());
            };
            let name_span = ident.span;

            op.enter(OperationState::ApplyingModel);
            {
                let node = session.tree.get_mut(id)?;
                let kept: Vec<Fragment> = node
                    .variable
                    .name_fragments()
                    .into_iter()
                    .skip(1)
                    .filter(|r| r.get() != Some(name_span))
                    .collect();
                node.variable = VariableSupport::Local {
                    name: name.clone(),
                    declaration: stmt.span.into(),
                    type_prefix: Span::new(ty.span.start, name_span.start).into(),
                    name_span: name_span.into(),
                    references: kept,
                };
            }
            let field_span = field_span_after(session, &name).unwrap_or(field_span);
            session.remove_member(Fragment::new(field_span))?;
            Ok(())
        })
    }
}

/// The current span of field `name`.
fn field_span_after(session: &mut DesignSession, name: &str) -> Option<Span> {
    let unit = session.unit().ok()?;
    Some(unit.class.as_ref()?.field(name)?.span)
}

/// Whether code outside `method` names field `name`, including other
/// fields' initializers.
fn used_outside(class: &ClassDecl, method: &MethodDecl, name: &str) -> bool {
    let names = |expr: &Expr| {
        let mut hit = false;
        expr.walk(&mut |e| {
            hit |= match &e.kind {
                ExprKind::Name(n) => n == name,
                ExprKind::Field { target, name: field } => {
                    matches!(target.kind, ExprKind::This) && field.text == name
                }
                _ => false,
            };
        });
        hit
    };
    let in_fields = class
        .fields()
        .filter_map(|f| f.init.as_ref())
        .any(|init| names(init));
    in_fields
        || class
            .methods()
            .filter(|m| m.span != method.span)
            .filter_map(|m| m.body.as_ref())
            .any(|body| {
                let mut hit = false;
                walk_statements(body, &mut |stmt| {
                    hit |= statement_expressions(stmt).into_iter().any(|e| names(e));
                });
                hit
            })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::DesignerError;
    use crate::{DescriptorRegistry, SessionConfig};

    fn session(source: &str) -> DesignSession {
        let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
        DesignSession::open(source, registry, SessionConfig::default()).unwrap()
    }

    const LOCAL: &str = "import javax.swing.*;\n\
        public class View extends JPanel {\n\
        \tpublic View() {\n\
        \t\tJButton ok = new JButton(\"OK\");\n\
        \t\tadd(ok);\n\
        \t\tok.setEnabled(false);\n\
        \t}\n\
        }\n";

    #[test]
    fn test_rename_local() {
        let mut session = session(LOCAL);
        let root = session.root().unwrap();
        let ok = session.children(root).unwrap()[0];
        session.rename(ok, "confirm").unwrap();
        assert_eq!(
            session.source(),
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tJButton confirm = new JButton(\"OK\");\n\
             \t\tadd(confirm);\n\
             \t\tconfirm.setEnabled(false);\n\
             \t}\n\
             }\n"
        );
        assert_eq!(session.info(ok).unwrap().name(), Some("confirm"));

        let err = session.rename(ok, "View").unwrap_err();
        assert!(matches!(
            err,
            DesignerError::StructuralEdit(StructuralEditError::NameInUse(_))
        ));
    }

    #[test]
    fn test_rename_lazy_renames_accessor() {
        let mut session = session(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tprivate JButton ok;\n\
             \tpublic View() {\n\
             \t\tadd(getOk());\n\
             \t}\n\
             \tprivate JButton getOk() {\n\
             \t\tif (ok == null) {\n\
             \t\t\tok = new JButton();\n\
             \t\t}\n\
             \t\treturn ok;\n\
             \t}\n\
             }\n",
        );
        let root = session.root().unwrap();
        let ok = session.children(root).unwrap()[0];
        session.rename(ok, "confirm").unwrap();
        let source = session.source();
        assert!(source.contains("\tprivate JButton confirm;\n"));
        assert!(source.contains("\t\tadd(getConfirm());\n"));
        assert!(source.contains("\tprivate JButton getConfirm() {\n\t\tif (confirm == null) {\n\t\t\tconfirm = new JButton();\n"));
        assert!(source.contains("\t\treturn confirm;\n"));
        assert_eq!(session.info(ok).unwrap().own_method, "getConfirm");
    }

    #[test]
    fn test_local_field_round_trip() {
        let mut session = session(LOCAL);
        let root = session.root().unwrap();
        let ok = session.children(root).unwrap()[0];

        session.convert_to_field(ok).unwrap();
        assert_eq!(
            session.source(),
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tprivate JButton ok;\n\
             \tpublic View() {\n\
             \t\tok = new JButton(\"OK\");\n\
             \t\tadd(ok);\n\
             \t\tok.setEnabled(false);\n\
             \t}\n\
             }\n"
        );
        assert!(matches!(
            session.variable_support(ok).unwrap(),
            VariableSupport::Field { .. }
        ));

        session.convert_to_local(ok).unwrap();
        assert_eq!(session.source(), LOCAL);
        session.rename(ok, "confirm").unwrap();
        assert!(session.source().contains("\t\tconfirm.setEnabled(false);\n"));
        assert!(!session.source().contains("ok"));
    }

    #[test]
    fn test_field_used_elsewhere_stays_a_field() {
        let source = "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tprivate JButton ok;\n\
             \tpublic View() {\n\
             \t\tok = new JButton(\"OK\");\n\
             \t\tadd(ok);\n\
             \t}\n\
             \tpublic void disable() {\n\
             \t\tok.setEnabled(false);\n\
             \t}\n\
             }\n";
        let mut session = session(source);
        let root = session.root().unwrap();
        let ok = session.children(root).unwrap()[0];
        let err = session.convert_to_local(ok).unwrap_err();
        assert!(matches!(
            err,
            DesignerError::StructuralEdit(StructuralEditError::UnsupportedVariable(_))
        ));
        assert_eq!(session.source(), source);
    }
}
