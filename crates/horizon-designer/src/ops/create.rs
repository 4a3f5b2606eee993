//! Creating components.

use horizon_designer_core::logging::targets;
use horizon_designer_core::{ChildAdded, NodeId};
use horizon_designer_source::syntax::{ClassDecl, CompilationUnit, Expr, ExprKind, Stmt, StmtKind};
use horizon_designer_source::{Fragment, Span};

use super::{Operation, OperationState};
use crate::association::Association;
use crate::creation::CreationSupport;
use crate::description::{AssociationTemplate, ComponentDescriptor, DescriptorLookup, simple_name};
use crate::error::{DescriptionError, DesignerResult, ParseError, StructuralEditError};
use crate::info::{ComponentInfo, PropertyValue};
use crate::naming::{default_name, is_identifier, unique_name};
use crate::parser::lazy_shape;
use crate::session::{DesignSession, statement_at};
use crate::variable::{VariableKind, VariableSupport};

/// Placeholder in [`CreateRequest::statements`] for the new component.
pub const COMPONENT: &str = "%component%";

/// How the new instance is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construction {
    /// A creation template of the type's descriptor; `None` picks the default.
    Descriptor(Option<String>),
    /// A static factory method of `factory`.
    StaticFactory { factory: String, method: String },
    /// A factory method called on another component.
    InstanceFactory { receiver: NodeId, method: String },
    /// An expression written as is.
    Source(String),
}

/// What to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Fully qualified component type.
    pub component_type: String,
    pub construction: Construction,
    /// Variable shape; the session default when `None`.
    pub variable: Option<VariableKind>,
    /// Variable name; derived from the type when `None`.
    pub name: Option<String>,
    /// Statements added after the component's own, with [`COMPONENT`]
    /// standing for its reference.
    pub statements: Vec<String>,
}

impl CreateRequest {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            construction: Construction::Descriptor(None),
            variable: None,
            name: None,
            statements: Vec::new(),
        }
    }

    /// Use the descriptor's creation template `id`.
    pub fn with_creation(mut self, id: impl Into<String>) -> Self {
        self.construction = Construction::Descriptor(Some(id.into()));
        self
    }

    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    pub fn with_variable(mut self, kind: VariableKind) -> Self {
        self.variable = Some(kind);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }
}

/// Everything validation settles before the first edit.
struct Plan {
    parent: NodeId,
    container: usize,
    index: usize,
    siblings: Vec<NodeId>,
    descriptor: ComponentDescriptor,
    construction: Construction,
    kind: VariableKind,
    name: String,
    accessor: Option<String>,
    /// Method holding the association.
    method: String,
    /// Method holding the creation expression.
    creation_method: String,
    association: AssociationTemplate,
    imports: Vec<String>,
    type_text: String,
    expression: String,
    /// Statements for the parent's block.
    statements: Vec<String>,
    association_at: Option<usize>,
    /// Index of the first statement related to the component.
    related_from: usize,
}

impl DesignSession {
    /// Create a component under `parent` at `index`.
    ///
    /// The container is picked from the parent's descriptor; slots are
    /// preferred while the parent has no children in a sequence.
    #[tracing::instrument(skip(self, request), fields(component_type = %request.component_type), target = "horizon_designer::ops", level = "debug")]
    pub fn create(
        &mut self,
        parent: NodeId,
        index: usize,
        request: CreateRequest,
    ) -> DesignerResult<NodeId> {
        self.transact("create", |session, op| {
            session.create_in(op, parent, None, index, &request)
        })
    }

    pub(crate) fn create_in(
        &mut self,
        op: &mut Operation,
        parent: NodeId,
        container: Option<usize>,
        index: usize,
        request: &CreateRequest,
    ) -> DesignerResult<NodeId> {
        let plan = self.plan_creation(parent, container, index, request)?;

        op.enter(OperationState::ApplyingSource);
        for import in &plan.imports {
            self.import(import)?;
        }
        let modifier = self.config.field_modifier.clone();
        if plan.kind != VariableKind::Local {
            self.insert_field(&format!("{modifier} {} {};", plan.type_text, plan.name))?;
        }
        if let Some(accessor) = &plan.accessor {
            let method = self.lazy_method(&modifier, &plan.type_text, accessor, &plan.name, &plan.expression);
            self.insert_method(&method)?;
        }
        let target = self.insertion_target(parent, &plan.siblings, plan.index)?;
        let spans = self.insert_statements(target, &plan.statements)?;

        let unit = self.unit()?;
        let class = unit.class.as_ref().ok_or(ParseError::NoClass)?;
        let built = self.build_info(&plan, &unit, class, &spans)?;

        op.enter(OperationState::ApplyingModel);
        let id = self.tree.insert_child(parent, plan.index, built.info)?;
        self.materialize_exposed(id, 0)?;
        if let Some(stmt) = built.association {
            self.note_association(parent, id, stmt, &plan.association, &plan.method);
        }
        if let Some(argument) = built.parent_argument {
            self.note_reference(parent, argument, &plan.creation_method);
        }
        if let (Construction::InstanceFactory { receiver, .. }, ExprKind::Call { target: Some(target), .. }) =
            (&request.construction, &built.expression.unparenthesized().kind)
        {
            self.note_reference(*receiver, target, &plan.creation_method);
        }
        for stmt in built.related {
            self.note_uses(id, stmt, &plan);
        }
        tracing::debug!(
            target: targets::OPS,
            ?id,
            name = %plan.name,
            kind = ?plan.kind,
            "component created"
        );
        op.added(ChildAdded {
            parent,
            child: id,
            index: plan.index,
        });
        Ok(id)
    }

    fn plan_creation(
        &mut self,
        parent: NodeId,
        container: Option<usize>,
        index: usize,
        request: &CreateRequest,
    ) -> DesignerResult<Plan> {
        let registry = self.registry.clone();
        let component_type = request.component_type.as_str();
        let descriptor = registry
            .describe(component_type)
            .ok_or_else(|| DescriptionError::UnknownType(component_type.to_string()))?
            .clone();
        let container = self.resolve_container(parent, component_type, container, None)?;
        let association = self.descriptor(parent)?.containers[container].association.clone();

        let siblings = self.children(parent)?.to_vec();
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

        let kind = request.variable.unwrap_or(self.config.default_variable);
        let name = self.variable_name(request.name.as_deref(), component_type)?;
        let accessor = (kind == VariableKind::Lazy).then(|| self.config.accessor_name(&name));
        if let Some(accessor) = &accessor
            && self.taken_names()?.contains(accessor)
        {
            return Err(StructuralEditError::NameInUse(accessor.clone()).into());
        }
        let method = self.info(parent)?.own_method.clone();
        let creation_method = accessor.clone().unwrap_or_else(|| method.clone());
        let parent_ref = self
            .reference(parent, &method)
            .ok_or(StructuralEditError::NoReference(parent))?;

        let mut imports = Vec::new();
        let type_text = self.spelling(component_type, &mut imports);
        let parent_type = self.info(parent)?.component_type.clone();
        let not_accepted = || StructuralEditError::NotAccepted {
            parent_type: parent_type.clone(),
            child_type: component_type.to_string(),
        };
        let expression = match &request.construction {
            Construction::Descriptor(id) => {
                let template = descriptor.creation(id.as_deref()).ok_or_else(|| {
                    DescriptionError::UnknownCreation {
                        type_name: component_type.to_string(),
                        id: id.clone().unwrap_or_else(|| "default".to_string()),
                    }
                })?;
                if association.uses_constructor() && !template.needs_parent() {
                    return Err(not_accepted().into());
                }
                for import in &template.imports {
                    self.spelling(import, &mut imports);
                }
                let parent_in_creation = if template.needs_parent() {
                    Some(
                        self.reference(parent, &creation_method)
                            .ok_or(StructuralEditError::NoReference(parent))?,
                    )
                } else {
                    None
                };
                template.render(&type_text, parent_in_creation.as_deref())
            }
            Construction::StaticFactory { factory, method } => {
                if association.uses_constructor() {
                    return Err(not_accepted().into());
                }
                let found = registry
                    .factory_method(factory, method)
                    .filter(|m| m.is_static && registry.is_assignable(&m.returns, component_type))
                    .ok_or_else(|| DescriptionError::UnknownFactory {
                        type_name: factory.clone(),
                        method: method.clone(),
                    })?;
                let factory_text = self.spelling(factory, &mut imports);
                format!("{factory_text}.{method}({})", placeholder_arguments(&found.params))
            }
            Construction::InstanceFactory { receiver, method } => {
                if association.uses_constructor() {
                    return Err(not_accepted().into());
                }
                let receiver_descriptor = self.descriptor(*receiver)?;
                let found = std::iter::once(&receiver_descriptor.type_name)
                    .chain(&receiver_descriptor.ancestors)
                    .find_map(|t| registry.factory_method(t, method))
                    .filter(|m| !m.is_static && registry.is_assignable(&m.returns, component_type))
                    .ok_or_else(|| DescriptionError::UnknownFactory {
                        type_name: receiver_descriptor.type_name.clone(),
                        method: method.clone(),
                    })?;
                let receiver_ref = self
                    .reference(*receiver, &creation_method)
                    .ok_or(StructuralEditError::NoReference(*receiver))?;
                format!("{receiver_ref}.{method}({})", placeholder_arguments(&found.params))
            }
            Construction::Source(text) => text.clone(),
        };

        let child_ref = match &accessor {
            Some(accessor) => format!("{accessor}()"),
            None => name.clone(),
        };
        let mut statements = Vec::new();
        match kind {
            VariableKind::Local => statements.push(format!("{type_text} {name} = {expression};")),
            VariableKind::Field => statements.push(format!("{name} = {expression};")),
            VariableKind::Lazy => {}
        }
        let association_at = association.invocation().map(|template| {
            statements.push(template.render(&parent_ref, &child_ref));
            statements.len() - 1
        });
        let related_from = statements.len();
        if association_at.is_none() && kind == VariableKind::Lazy {
            // Nothing else would call the accessor.
            statements.push(format!("{child_ref};"));
        }
        statements.extend(request.statements.iter().map(|s| s.replace(COMPONENT, &child_ref)));

        Ok(Plan {
            parent,
            container,
            index,
            siblings,
            descriptor,
            construction: request.construction.clone(),
            kind,
            name,
            accessor,
            method,
            creation_method,
            association,
            imports,
            type_text,
            expression,
            statements,
            association_at,
            related_from,
        })
    }

    /// A free variable name, checked when the caller chose it.
    pub(crate) fn variable_name(
        &mut self,
        requested: Option<&str>,
        component_type: &str,
    ) -> DesignerResult<String> {
        let taken = self.taken_names()?;
        match requested {
            Some(name) if !is_identifier(name) => {
                Err(StructuralEditError::InvalidName(name.to_string()).into())
            }
            Some(name) if taken.contains(name) => {
                Err(StructuralEditError::NameInUse(name.to_string()).into())
            }
            Some(name) => Ok(name.to_string()),
            None => Ok(unique_name(&default_name(component_type), &taken)),
        }
    }

    /// How generated code spells `qualified`; imports it needs go to `imports`.
    fn spelling(&self, qualified: &str, imports: &mut Vec<String>) -> String {
        if !qualified.contains('.') {
            return qualified.to_string();
        }
        if self
            .context
            .resolver
            .can_import(qualified, self.registry.as_ref())
        {
            if !imports.iter().any(|i| i == qualified) {
                imports.push(qualified.to_string());
            }
            simple_name(qualified).to_string()
        } else {
            qualified.to_string()
        }
    }

    fn lazy_method(
        &self,
        modifier: &str,
        type_text: &str,
        accessor: &str,
        name: &str,
        expression: &str,
    ) -> String {
        let i = &self.config.indent;
        format!(
            "{modifier} {type_text} {accessor}() {{\n\
             {i}if ({name} == null) {{\n\
             {i}{i}{name} = {expression};\n\
             {i}}}\n\
             {i}return {name};\n\
             }}"
        )
    }

    /// Read the node back from the freshly parsed source.
    fn build_info<'u>(
        &self,
        plan: &Plan,
        unit: &'u CompilationUnit,
        class: &'u ClassDecl,
        spans: &[Span],
    ) -> DesignerResult<Built<'u>> {
        let generated = |what: &'static str| StructuralEditError::StaleFragment(what);
        let statement = |index: usize| {
            spans
                .get(index)
                .and_then(|span| statement_at(unit, *span))
                .ok_or_else(|| generated("generated statement"))
        };

        let parent_info = self.info(plan.parent)?;
        let block = parent_info.own_block;
        let mut own_block = block;
        let mut own_method = plan.method.clone();

        let (variable, expression) = match plan.kind {
            VariableKind::Local => {
                let stmt = statement(0)?;
                let StmtKind::Local {
                    ty,
                    name,
                    init: Some(init),
                } = &stmt.kind
                else {
                    return Err(generated("local declaration").into());
                };
                let variable = VariableSupport::Local {
                    name: plan.name.clone(),
                    declaration: stmt.span.into(),
                    type_prefix: Span::new(ty.span.start, name.span.start).into(),
                    name_span: name.span.into(),
                    references: Vec::new(),
                };
                (variable, init)
            }
            VariableKind::Field => {
                let field = class.field(&plan.name).ok_or_else(|| generated("field"))?;
                let stmt = statement(0)?;
                let StmtKind::Expr(Expr {
                    kind: ExprKind::Assign { target, value },
                    ..
                }) = &stmt.kind
                else {
                    return Err(generated("field assignment").into());
                };
                let variable = VariableSupport::Field {
                    name: plan.name.clone(),
                    field: field.span.into(),
                    field_name: field.name.span.into(),
                    assignment: stmt.span.into(),
                    references: vec![target.span.into()],
                };
                (variable, value.as_ref())
            }
            VariableKind::Lazy => {
                let accessor = plan.accessor.clone().unwrap_or_default();
                let field = class.field(&plan.name).ok_or_else(|| generated("field"))?;
                let method = class.method(&accessor).ok_or_else(|| generated("accessor"))?;
                let shape = lazy_shape(method).ok_or_else(|| generated("accessor body"))?;
                own_block = shape.block.span.into();
                own_method = accessor.clone();
                let variable = VariableSupport::Lazy {
                    name: plan.name.clone(),
                    field: field.span.into(),
                    field_name: field.name.span.into(),
                    accessor,
                    method: method.span.into(),
                    method_name: method.name.span.into(),
                    references: shape.field_refs.iter().map(|&s| Fragment::new(s)).collect(),
                    accessor_calls: Vec::new(),
                };
                (variable, shape.value)
            }
        };

        let parent_argument = match &expression.unparenthesized().kind {
            ExprKind::New { args, .. } => plan
                .descriptor
                .parent_argument(args.len())
                .and_then(|index| args.get(index)),
            _ => None,
        };
        let expression_fragment = Fragment::new(expression.span);
        let creation = match (&plan.accessor, &plan.construction, &expression.unparenthesized().kind) {
            (Some(accessor), _, _) => CreationSupport::LazyAccessor {
                accessor: accessor.clone(),
                expression: expression_fragment,
            },
            (None, Construction::StaticFactory { factory, method }, _) => {
                CreationSupport::StaticFactory {
                    expression: expression_fragment,
                    factory: factory.clone(),
                    method: method.clone(),
                }
            }
            (None, Construction::InstanceFactory { method, .. }, _) => {
                CreationSupport::InstanceFactory {
                    expression: expression_fragment,
                    method: method.clone(),
                }
            }
            (None, _, ExprKind::New { .. }) => CreationSupport::Constructor {
                expression: expression_fragment,
                parent_argument: parent_argument.map(|a| a.span.into()),
            },
            (None, _, ExprKind::Call { target: Some(target), name, .. }) => {
                let registry = self.registry.as_ref();
                let factory = target
                    .dotted_name()
                    .and_then(|written| self.context.resolver.resolve(&written, registry))
                    .filter(|t| registry.factory_method(t, &name.text).is_some_and(|m| m.is_static));
                match factory {
                    Some(factory) => CreationSupport::StaticFactory {
                        expression: expression_fragment,
                        factory,
                        method: name.text.clone(),
                    },
                    None => CreationSupport::Opaque {
                        expression: expression_fragment,
                    },
                }
            }
            (None, _, _) => CreationSupport::Opaque {
                expression: expression_fragment,
            },
        };

        let association_stmt = plan.association_at.map(statement).transpose()?;
        let missing_argument = || StructuralEditError::NotAccepted {
            parent_type: parent_info.component_type.clone(),
            child_type: plan.descriptor.type_name.clone(),
        };
        let association = match &plan.association {
            AssociationTemplate::Invocation(template) => Association::Invocation {
                statement: association_stmt.map(|s| s.span).ok_or_else(|| generated("association"))?.into(),
                template: template.clone(),
            },
            AssociationTemplate::Constructor => Association::ConstructorArgument {
                argument: parent_argument.ok_or_else(missing_argument)?.span.into(),
            },
            AssociationTemplate::Compound(template) => Association::Compound {
                argument: parent_argument.ok_or_else(missing_argument)?.span.into(),
                statement: association_stmt.map(|s| s.span).ok_or_else(|| generated("association"))?.into(),
                template: template.clone(),
            },
        };

        let mut related_stmts = Vec::new();
        for index in plan.related_from..plan.statements.len() {
            related_stmts.push(statement(index)?);
        }
        let mut properties = Vec::new();
        for stmt in &related_stmts {
            if let StmtKind::Expr(Expr {
                kind: ExprKind::Call {
                    target: Some(_),
                    name,
                    args,
                },
                ..
            }) = &stmt.kind
                && let [value] = args.as_slice()
                && let Some(property) = plan.descriptor.property_by_setter(&name.text)
            {
                properties.push(PropertyValue {
                    name: property.name.clone(),
                    setter: property.setter.clone(),
                    value: self.editor.read(value.span).unwrap_or_default(),
                    statement: stmt.span.into(),
                });
            }
        }

        let info = ComponentInfo {
            component_type: plan.descriptor.type_name.clone(),
            creation,
            variable,
            association: Some(association),
            container: Some(plan.container),
            related: related_stmts.iter().map(|s| Fragment::new(s.span)).collect(),
            properties,
            block,
            method: plan.method.clone(),
            own_block,
            own_method,
        };
        Ok(Built {
            info,
            expression,
            association: association_stmt,
            parent_argument,
            related: related_stmts,
        })
    }

    /// Record the references in a freshly written association statement.
    pub(crate) fn note_association(
        &mut self,
        parent: NodeId,
        child: NodeId,
        stmt: &Stmt,
        template: &AssociationTemplate,
        method: &str,
    ) {
        let (
            StmtKind::Expr(Expr {
                kind: ExprKind::Call { target, args, .. },
                ..
            }),
            Some(invocation),
        ) = (&stmt.kind, template.invocation())
        else {
            return;
        };
        if let Some(target) = target {
            self.note_reference(parent, target, method);
        }
        if let Some(argument) = args.get(invocation.child_index()) {
            self.note_reference(child, argument, method);
        }
    }

    /// Record every use of the new component's name in `stmt`.
    fn note_uses(&mut self, id: NodeId, stmt: &Stmt, plan: &Plan) {
        let mut uses = Vec::new();
        for expr in statement_expressions(stmt) {
            expr.walk(&mut |e| match &e.kind {
                ExprKind::Name(name) if *name == plan.name => uses.push(e),
                ExprKind::Call {
                    target: None, name, ..
                } if Some(&name.text) == plan.accessor.as_ref() => uses.push(e),
                _ => {}
            });
        }
        for expr in uses {
            self.note_reference(id, expr, &plan.method);
        }
    }
}

struct Built<'u> {
    info: ComponentInfo,
    expression: &'u Expr,
    association: Option<&'u Stmt>,
    parent_argument: Option<&'u Expr>,
    related: Vec<&'u Stmt>,
}

/// Expressions directly inside a statement.
pub(crate) fn statement_expressions(stmt: &Stmt) -> Vec<&Expr> {
    match &stmt.kind {
        StmtKind::Local { init, .. } => init.iter().collect(),
        StmtKind::Expr(expr) => vec![expr],
        StmtKind::If { cond, .. } => vec![cond],
        StmtKind::Return(value) => value.iter().collect(),
        StmtKind::Block(_) | StmtKind::Other => Vec::new(),
    }
}

/// Arguments for a factory call the user fills in later.
fn placeholder_arguments(params: &[String]) -> String {
    params
        .iter()
        .map(|param| match param.as_str() {
            "boolean" => "false",
            "int" | "long" | "short" | "byte" | "float" | "double" => "0",
            "char" => "' '",
            "java.lang.String" => "\"\"",
            _ => "null",
        })
        .collect::<Vec<_>>()
        .join(", ")
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

    const EMPTY_PANEL: &str = "import javax.swing.*;\n\
        public class View extends JPanel {\n\
        \tpublic View() {\n\
        \t}\n\
        }\n";

    #[test]
    fn test_create_local() {
        let mut session = session(EMPTY_PANEL);
        let root = session.root().unwrap();
        let id = session
            .create(root, 0, CreateRequest::new("javax.swing.JButton").with_creation("text"))
            .unwrap();
        assert_eq!(
            session.source(),
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tJButton button = new JButton(\"New button\");\n\
             \t\tadd(button);\n\
             \t}\n\
             }\n"
        );
        let info = session.info(id).unwrap();
        assert_eq!(info.name(), Some("button"));
        assert!(matches!(
            info.association,
            Some(Association::Invocation { .. })
        ));
    }

    #[test]
    fn test_create_field_with_statements() {
        let mut session = session(EMPTY_PANEL);
        let root = session.root().unwrap();
        let id = session
            .create(
                root,
                0,
                CreateRequest::new("javax.swing.JLabel")
                    .with_variable(VariableKind::Field)
                    .with_name("title")
                    .with_statement("%component%.setText(\"Hello\");"),
            )
            .unwrap();
        let source = session.source();
        assert!(source.contains("\tprivate JLabel title;\n"));
        assert!(source.contains("\t\ttitle = new JLabel();\n\t\tadd(title);\n\t\ttitle.setText(\"Hello\");\n"));
        let info = session.info(id).unwrap();
        assert_eq!(info.properties.len(), 1);
        assert_eq!(info.properties[0].value, "\"Hello\"");
        assert_eq!(info.related.len(), 1);
    }

    #[test]
    fn test_create_lazy() {
        let mut session = session(EMPTY_PANEL);
        let root = session.root().unwrap();
        session
            .create(
                root,
                0,
                CreateRequest::new("javax.swing.JTextField").with_variable(VariableKind::Lazy),
            )
            .unwrap();
        let source = session.source();
        assert!(source.contains("\t\tadd(getTextField());\n"));
        assert!(source.contains(
            "\tprivate JTextField getTextField() {\n\
             \t\tif (textField == null) {\n\
             \t\t\ttextField = new JTextField();\n\
             \t\t}\n\
             \t\treturn textField;\n\
             \t}\n"
        ));

        let before = session.dump().unwrap();
        session.refresh().unwrap();
        assert_eq!(session.dump().unwrap(), before);
    }

    #[test]
    fn test_name_checks() {
        let mut session = session(EMPTY_PANEL);
        let root = session.root().unwrap();
        let err = session
            .create(root, 0, CreateRequest::new("javax.swing.JButton").with_name("new"))
            .unwrap_err();
        assert!(err.to_string().contains("not a valid identifier"));
        assert_eq!(session.source(), EMPTY_PANEL);

        session
            .create(root, 0, CreateRequest::new("javax.swing.JButton"))
            .unwrap();
        let second = session
            .create(root, 1, CreateRequest::new("javax.swing.JButton"))
            .unwrap();
        assert_eq!(session.info(second).unwrap().name(), Some("button_1"));
    }

    #[test]
    fn test_static_factory() {
        let mut session = session(EMPTY_PANEL);
        let root = session.root().unwrap();
        let id = session
            .create(
                root,
                0,
                CreateRequest::new("javax.swing.Box").with_construction(Construction::StaticFactory {
                    factory: "javax.swing.Box".into(),
                    method: "createVerticalBox".into(),
                }),
            )
            .unwrap();
        assert!(session.source().contains("Box box = Box.createVerticalBox();"));
        assert!(matches!(
            session.creation_support(id).unwrap(),
            CreationSupport::StaticFactory { .. }
        ));
    }

    #[test]
    fn test_placeholder_arguments() {
        assert_eq!(
            placeholder_arguments(&["java.awt.Component".into(), "java.lang.String".into()]),
            "null, \"\""
        );
        assert_eq!(placeholder_arguments(&[]), "");
    }
}
