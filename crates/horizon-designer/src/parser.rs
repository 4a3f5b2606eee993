//! Building the model tree from a parsed compilation unit.
//!
//! The walk starts at the entry point (the constructor, or the first
//! configured entry method) and follows the code top-down:
//!
//! - declarations and field assignments whose value constructs a described
//!   type create nodes
//! - calls that match a parent container's association template attach them
//! - `getX()` calls to lazy accessors create the accessor's node on first use
//! - unqualified calls to other methods of the class are followed once
//! - every other statement that mentions a node is remembered as related
//!
//! Children of types the descriptors do not know are reported as
//! [bad nodes](BadNode) and left out with their subtree.

use std::collections::{HashMap, HashSet};

use horizon_designer_core::logging::targets;
use horizon_designer_core::{ModelTree, PerfSpan};
use horizon_designer_source::syntax::{
    Block, ClassDecl, CompilationUnit, Expr, ExprKind, FieldDecl, Ident, MethodDecl, Stmt,
    StmtKind, TypeRef,
};
use horizon_designer_source::{Fragment, Span};

use crate::association::Association;
use crate::config::SessionConfig;
use crate::creation::{CreationSupport, ImplicitKind};
use crate::description::{
    ComponentDescriptor, ContainerDescriptor, ContainerKind, DescriptorLookup, FactoryMethod,
};
use crate::diagnostics::BadNode;
use crate::error::{DesignerResult, ParseError};
use crate::info::{ComponentInfo, PropertyValue};
use crate::resolve::TypeResolver;
use crate::variable::{AnonymousAccess, VariableSupport};

/// Exposed children nested deeper than this are not materialized.
pub(crate) const MAX_EXPOSED_DEPTH: usize = 4;

/// What the parser learned about the file besides the tree.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub class_name: String,
    /// The method the walk started from.
    pub entry_method: String,
    pub resolver: TypeResolver,
}

/// The result of a parse.
pub struct ParseOutput {
    pub tree: ModelTree<ComponentInfo>,
    pub bad_nodes: Vec<BadNode>,
    pub context: ParseContext,
}

/// Turns a compilation unit into a model tree.
pub struct ModelParser<'a> {
    lookup: &'a dyn DescriptorLookup,
    config: &'a SessionConfig,
}

impl<'a> ModelParser<'a> {
    pub fn new(lookup: &'a dyn DescriptorLookup, config: &'a SessionConfig) -> Self {
        Self { lookup, config }
    }

    /// Build the model of `unit`, whose text is `source`.
    pub fn parse(&self, unit: &CompilationUnit, source: &str) -> DesignerResult<ParseOutput> {
        let _perf = PerfSpan::new("parse_model");
        let class = unit.class.as_ref().ok_or(ParseError::NoClass)?;
        let resolver = TypeResolver::new(unit);
        let mut walker = Walker::new(self.lookup, self.config, class, source, resolver.clone());

        let (entry, delegate) = walker.entry().ok_or_else(|| ParseError::NoEntryPoint {
            class: class.name.text.clone(),
        })?;
        walker.install_this(entry, delegate);
        walker.walk_method(entry);
        let (tree, bad_nodes) = walker.finish()?;

        tracing::debug!(
            target: targets::PARSER,
            class = %class.name.text,
            entry = %entry.name.text,
            nodes = tree.len(),
            bad = bad_nodes.len(),
            "parsed model"
        );
        Ok(ParseOutput {
            tree,
            bad_nodes,
            context: ParseContext {
                class_name: class.name.text.clone(),
                entry_method: entry.name.text.clone(),
                resolver,
            },
        })
    }
}

// =============================================================================
// Walker state
// =============================================================================

struct Draft {
    info: ComponentInfo,
    parent: Option<usize>,
    /// Source position of the association, for child order.
    order: usize,
    exposed: bool,
}

#[derive(Debug, Clone)]
enum Binding {
    Node(usize),
    /// Bound to a construction of an undescribed type.
    Unknown { span: Span, type_name: String },
    /// Bound to something left out of the model.
    Bad,
}

#[derive(Debug, Clone)]
enum LazyState {
    Node(usize),
    Unknown { span: Span, type_name: String },
    Bad,
    NotLazy,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    /// The variable name.
    Name,
    /// The identifier of a `getX()` call.
    Accessor,
}

#[derive(Debug, Clone, Copy)]
struct RefSpan {
    node: usize,
    span: Span,
    kind: RefKind,
}

enum Ref {
    Node(usize, Vec<RefSpan>),
    Unknown { span: Span, type_name: String },
    Bad,
    Other,
}

enum Classified {
    Component {
        type_name: String,
        creation: CreationSupport,
        /// Parent passed to the constructor, with the argument span.
        parent: Option<(usize, Span)>,
        refs: Vec<RefSpan>,
    },
    Unknown {
        span: Span,
        type_name: String,
    },
    Bad,
    NotComponent,
}

enum ChildArg {
    Existing(usize, Vec<RefSpan>),
    Inline {
        type_name: String,
        creation: CreationSupport,
        refs: Vec<RefSpan>,
    },
    /// Not a component; the call is not an association.
    NotChild,
    /// Left out of the model; the statement is skipped.
    Skip,
}

#[derive(Debug, Clone)]
struct Scope {
    method: String,
    block: Span,
}

/// `if (x == null) { x = value; ... } return x;`
pub(crate) struct LazyShape<'a> {
    pub(crate) field: String,
    pub(crate) block: &'a Block,
    pub(crate) value: &'a Expr,
    pub(crate) field_refs: Vec<Span>,
}

struct Walker<'a> {
    lookup: &'a dyn DescriptorLookup,
    config: &'a SessionConfig,
    class: &'a ClassDecl,
    source: &'a str,
    resolver: TypeResolver,
    drafts: Vec<Draft>,
    this_node: Option<usize>,
    locals: HashMap<(String, String), Binding>,
    fields: HashMap<String, Binding>,
    exposed: HashMap<(usize, String), usize>,
    lazy: HashMap<String, LazyState>,
    visited: HashSet<String>,
    recorded: HashSet<Span>,
    reported: HashSet<Span>,
    bad_nodes: Vec<BadNode>,
}

impl<'a> Walker<'a> {
    fn new(
        lookup: &'a dyn DescriptorLookup,
        config: &'a SessionConfig,
        class: &'a ClassDecl,
        source: &'a str,
        resolver: TypeResolver,
    ) -> Self {
        Self {
            lookup,
            config,
            class,
            source,
            resolver,
            drafts: Vec::new(),
            this_node: None,
            locals: HashMap::new(),
            fields: HashMap::new(),
            exposed: HashMap::new(),
            lazy: HashMap::new(),
            visited: HashSet::new(),
            recorded: HashSet::new(),
            reported: HashSet::new(),
            bad_nodes: Vec::new(),
        }
    }

    // =========================================================================
    // Entry point and root
    // =========================================================================

    /// The entry method, and the configured method a constructor delegates to.
    fn entry(&self) -> Option<(&'a MethodDecl, Option<&'a MethodDecl>)> {
        let class = self.class;
        if let Some(constructor) = class.constructors().find(|c| c.body.is_some()) {
            let delegate = constructor.body.as_ref().and_then(|body| {
                body.statements.iter().find_map(|stmt| {
                    let StmtKind::Expr(Expr {
                        kind: ExprKind::Call { target, name, args },
                        ..
                    }) = &stmt.kind
                    else {
                        return None;
                    };
                    let on_this = target
                        .as_deref()
                        .is_none_or(|t| matches!(t.kind, ExprKind::This));
                    if on_this && args.is_empty() && self.config.entry_points.contains(&name.text)
                    {
                        self.plain_method(&name.text)
                    } else {
                        None
                    }
                })
            });
            return Some((constructor, delegate));
        }
        self.config
            .entry_points
            .iter()
            .find_map(|name| {
                class
                    .methods()
                    .find(|m| &m.name.text == name && !m.is_constructor() && m.body.is_some())
            })
            .map(|method| (method, None))
    }

    fn plain_method(&self, name: &str) -> Option<&'a MethodDecl> {
        let class = self.class;
        class.methods().find(|m| {
            m.name.text == name && m.param_count == 0 && !m.is_constructor() && m.body.is_some()
        })
    }

    /// Create the `this` node when the class extends a described type.
    fn install_this(&mut self, entry: &'a MethodDecl, delegate: Option<&'a MethodDecl>) {
        let class = self.class;
        let Some(superclass) = &class.superclass else {
            return;
        };
        let Some(type_name) = self.described(&superclass.name) else {
            return;
        };
        let builder = delegate.unwrap_or(entry);
        let Some(body) = &builder.body else {
            return;
        };
        let scope = Scope {
            method: builder.name.text.clone(),
            block: body.span,
        };
        let id = self.add_draft(
            type_name,
            CreationSupport::Implicit(ImplicitKind::This),
            VariableSupport::Anonymous(AnonymousAccess::This),
            &scope,
            class.span.start,
        );
        self.this_node = Some(id);
    }

    fn walk_method(&mut self, method: &'a MethodDecl) {
        self.visited.insert(method.name.text.clone());
        if let Some(body) = &method.body {
            self.walk_block(body, &method.name.text);
        }
    }

    fn finish(self) -> DesignerResult<(ModelTree<ComponentInfo>, Vec<BadNode>)> {
        let root = match self.this_node {
            Some(id) => id,
            None => self
                .drafts
                .iter()
                .position(|d| d.parent.is_none())
                .ok_or_else(|| ParseError::NoRoot {
                    class: self.class.name.text.clone(),
                })?,
        };

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.drafts.len()];
        for (index, draft) in self.drafts.iter().enumerate() {
            if let Some(parent) = draft.parent {
                children[parent].push(index);
            }
        }
        for list in &mut children {
            list.sort_by_key(|&i| (!self.drafts[i].exposed, self.drafts[i].order, i));
        }

        let mut slots: Vec<Option<ComponentInfo>> =
            self.drafts.into_iter().map(|d| Some(d.info)).collect();
        let mut tree = ModelTree::new();
        let root_info = slots[root].take().ok_or_else(|| ParseError::NoRoot {
            class: self.class.name.text.clone(),
        })?;
        let root_id = tree.set_root(root_info)?;
        let mut stack = vec![(root, root_id)];
        while let Some((draft, node)) = stack.pop() {
            for &child in &children[draft] {
                if let Some(info) = slots[child].take() {
                    let id = tree.push_child(node, info)?;
                    stack.push((child, id));
                }
            }
        }

        let unattached = slots.iter().filter(|s| s.is_some()).count();
        if unattached > 0 {
            tracing::debug!(
                target: targets::PARSER,
                unattached,
                "components outside the root's hierarchy were ignored"
            );
        }
        Ok((tree, self.bad_nodes))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn walk_block(&mut self, block: &'a Block, method: &str) {
        let scope = Scope {
            method: method.to_string(),
            block: block.span,
        };
        for stmt in &block.statements {
            self.statement(stmt, &scope);
        }
    }

    fn statement(&mut self, stmt: &'a Stmt, scope: &Scope) {
        match &stmt.kind {
            StmtKind::Local {
                ty,
                name,
                init: Some(init),
            } => self.local(stmt, ty, name, init, scope),
            StmtKind::Expr(expr) => self.expression_statement(stmt, expr, scope),
            StmtKind::Block(block) => self.walk_block(block, &scope.method),
            StmtKind::Local { init: None, .. }
            | StmtKind::If { .. }
            | StmtKind::Return(_)
            | StmtKind::Other => {}
        }
    }

    fn local(
        &mut self,
        stmt: &'a Stmt,
        ty: &'a TypeRef,
        name: &'a Ident,
        init: &'a Expr,
        scope: &Scope,
    ) {
        let declared = self.described(&ty.name);
        let key = (scope.method.clone(), name.text.clone());
        match self.classify(init, declared.as_deref(), scope) {
            Classified::Component {
                type_name,
                creation,
                parent,
                refs,
            } => {
                let variable = VariableSupport::Local {
                    name: name.text.clone(),
                    declaration: Fragment::new(stmt.span),
                    type_prefix: Fragment::new(Span::new(ty.span.start, name.span.start)),
                    name_span: Fragment::new(name.span),
                    references: Vec::new(),
                };
                let id = self.add_draft(type_name, creation, variable, scope, stmt.span.start);
                self.locals.insert(key, Binding::Node(id));
                self.record(&refs);
                if let Some((parent, argument)) = parent {
                    self.attach_by_constructor(id, parent, argument, scope, stmt.span.start);
                }
            }
            Classified::Unknown { span, type_name } => {
                self.locals.insert(key, Binding::Unknown { span, type_name });
            }
            Classified::Bad => {
                self.locals.insert(key, Binding::Bad);
            }
            Classified::NotComponent => self.related(stmt, init, scope),
        }
    }

    fn expression_statement(&mut self, stmt: &'a Stmt, expr: &'a Expr, scope: &Scope) {
        match &expr.kind {
            ExprKind::Assign { target, value } => {
                if let Some((field, name_span)) = self.assigned_field(target, scope) {
                    self.field_assignment(stmt, field, name_span, expr, value, scope);
                } else {
                    self.related(stmt, expr, scope);
                }
            }
            ExprKind::Call { target, name, args } => {
                if self.association(stmt, target.as_deref(), name, args, scope) {
                    return;
                }
                if self.flow_into(target.as_deref(), name, args) {
                    return;
                }
                if !self.discarded_construction(stmt, expr, scope) {
                    self.related(stmt, expr, scope);
                }
            }
            ExprKind::New { .. } => {
                if !self.discarded_construction(stmt, expr, scope) {
                    self.related(stmt, expr, scope);
                }
            }
            _ => self.related(stmt, expr, scope),
        }
    }

    /// A construction whose value is dropped, such as
    /// `new Label(shell, SWT.NONE);`. It is modelled when its constructor
    /// names a parent. Returns whether the statement was consumed.
    fn discarded_construction(&mut self, stmt: &'a Stmt, expr: &'a Expr, scope: &Scope) -> bool {
        match self.classify(expr, None, scope) {
            Classified::Component {
                type_name,
                creation,
                parent: Some((parent, argument)),
                refs,
            } => {
                let variable = VariableSupport::Anonymous(AnonymousAccess::Standalone {
                    statement: Fragment::new(stmt.span),
                });
                let id = self.add_draft(type_name, creation, variable, scope, stmt.span.start);
                self.record(&refs);
                self.attach_by_constructor(id, parent, argument, scope, stmt.span.start);
                true
            }
            Classified::Component { parent: None, .. } | Classified::NotComponent => false,
            Classified::Unknown { span, type_name } => {
                let ExprKind::New { args, .. } = &expr.unparenthesized().kind else {
                    return false;
                };
                if !self.mentions_component(args, scope) {
                    return false;
                }
                self.mark_bad(span, ParseError::UnknownType { type_name });
                true
            }
            Classified::Bad => true,
        }
    }

    fn assigned_field(&self, target: &'a Expr, scope: &Scope) -> Option<(&'a FieldDecl, Span)> {
        let class = self.class;
        match &target.kind {
            ExprKind::Name(name)
                if !self
                    .locals
                    .contains_key(&(scope.method.clone(), name.clone())) =>
            {
                class.field(name).map(|f| (f, target.span))
            }
            ExprKind::Field { target: owner, name } if matches!(owner.kind, ExprKind::This) => {
                class.field(&name.text).map(|f| (f, name.span))
            }
            _ => None,
        }
    }

    fn field_assignment(
        &mut self,
        stmt: &'a Stmt,
        field: &'a FieldDecl,
        name_span: Span,
        expr: &'a Expr,
        value: &'a Expr,
        scope: &Scope,
    ) {
        let declared = self.described(&field.ty.name);
        let name = field.name.text.clone();
        match self.classify(value, declared.as_deref(), scope) {
            Classified::Component {
                type_name,
                creation,
                parent,
                refs,
            } => {
                let variable = VariableSupport::Field {
                    name: name.clone(),
                    field: Fragment::new(field.span),
                    field_name: Fragment::new(field.name.span),
                    assignment: Fragment::new(stmt.span),
                    references: vec![Fragment::new(name_span)],
                };
                self.recorded.insert(name_span);
                let id = self.add_draft(type_name, creation, variable, scope, stmt.span.start);
                self.fields.insert(name, Binding::Node(id));
                self.record(&refs);
                if let Some((parent, argument)) = parent {
                    self.attach_by_constructor(id, parent, argument, scope, stmt.span.start);
                }
            }
            Classified::Unknown { span, type_name } => {
                self.fields.insert(name, Binding::Unknown { span, type_name });
            }
            Classified::Bad => {
                self.fields.insert(name, Binding::Bad);
            }
            Classified::NotComponent => self.related(stmt, expr, scope),
        }
    }

    /// Follow an unqualified call to another method of the class.
    fn flow_into(&mut self, target: Option<&'a Expr>, name: &'a Ident, args: &'a [Expr]) -> bool {
        let on_this = target.is_none_or(|t| matches!(t.kind, ExprKind::This));
        if !on_this || !args.is_empty() {
            return false;
        }
        let Some(method) = self.plain_method(&name.text) else {
            return false;
        };
        if lazy_shape(method).is_some() {
            self.lazy_accessor(&name.text);
            return true;
        }
        if !self.visited.insert(name.text.clone()) {
            return true;
        }
        if let Some(body) = &method.body {
            self.walk_block(body, &name.text);
        }
        true
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// The described type `written` refers to.
    fn described(&self, written: &str) -> Option<String> {
        self.resolver
            .resolve(written, self.lookup)
            .filter(|t| self.lookup.describe(t).is_some())
    }

    fn classify(&mut self, expr: &'a Expr, declared: Option<&str>, scope: &Scope) -> Classified {
        let expr = expr.unparenthesized();
        match &expr.kind {
            ExprKind::New { ty, args, .. } => {
                let Some(type_name) = self.described(&ty.name) else {
                    return Classified::Unknown {
                        span: expr.span,
                        type_name: ty.name.clone(),
                    };
                };
                let lookup = self.lookup;
                let parent_index = lookup
                    .describe(&type_name)
                    .and_then(|d| d.parent_argument(args.len()));
                let mut parent = None;
                let mut refs = Vec::new();
                if let Some(index) = parent_index
                    && let Some(argument) = args.get(index)
                {
                    match self.resolve_ref(argument, scope) {
                        Ref::Node(node, spans) => {
                            parent = Some((node, argument.span));
                            refs = spans;
                        }
                        Ref::Unknown { span, type_name } => {
                            self.mark_bad(span, ParseError::UnknownType { type_name });
                            return Classified::Bad;
                        }
                        Ref::Bad => return Classified::Bad,
                        Ref::Other => {}
                    }
                }
                Classified::Component {
                    type_name,
                    creation: CreationSupport::Constructor {
                        expression: Fragment::new(expr.span),
                        parent_argument: parent.map(|(_, span)| Fragment::new(span)),
                    },
                    parent,
                    refs,
                }
            }
            ExprKind::Call {
                target: Some(target),
                name,
                ..
            } => match self.factory_call(expr, target, name, scope) {
                Some(found) => found,
                None => self.opaque(expr, declared, scope),
            },
            ExprKind::Null => Classified::NotComponent,
            _ => self.opaque(expr, declared, scope),
        }
    }

    /// A described declaration initialized by an expression not understood.
    fn opaque(&mut self, expr: &'a Expr, declared: Option<&str>, scope: &Scope) -> Classified {
        let Some(type_name) = declared else {
            return Classified::NotComponent;
        };
        match self.resolve_ref(expr, scope) {
            Ref::Other => Classified::Component {
                type_name: type_name.to_string(),
                creation: CreationSupport::Opaque {
                    expression: Fragment::new(expr.span),
                },
                parent: None,
                refs: Vec::new(),
            },
            // An alias of a known component.
            Ref::Node(..) | Ref::Unknown { .. } | Ref::Bad => Classified::NotComponent,
        }
    }

    fn factory_call(
        &mut self,
        expr: &'a Expr,
        target: &'a Expr,
        name: &'a Ident,
        scope: &Scope,
    ) -> Option<Classified> {
        let lookup = self.lookup;
        if let Some(dotted) = target.dotted_name()
            && self.binding(&dotted, scope).is_none()
            && let Some(factory) = self.resolver.resolve(&dotted, lookup)
            && let Some(method) = lookup.factory_method(&factory, &name.text)
            && method.is_static
            && lookup.describe(&method.returns).is_some()
        {
            return Some(Classified::Component {
                type_name: method.returns.clone(),
                creation: CreationSupport::StaticFactory {
                    expression: Fragment::new(expr.span),
                    factory,
                    method: name.text.clone(),
                },
                parent: None,
                refs: Vec::new(),
            });
        }

        let Ref::Node(receiver, refs) = self.resolve_ref(target, scope) else {
            return None;
        };
        let receiver_type = self.drafts[receiver].info.component_type.clone();
        let method = instance_factory(lookup, &receiver_type, &name.text)?;
        Some(Classified::Component {
            type_name: method.returns.clone(),
            creation: CreationSupport::InstanceFactory {
                expression: Fragment::new(expr.span),
                method: name.text.clone(),
            },
            parent: None,
            refs,
        })
    }

    fn add_draft(
        &mut self,
        type_name: String,
        creation: CreationSupport,
        variable: VariableSupport,
        scope: &Scope,
        order: usize,
    ) -> usize {
        let info = ComponentInfo {
            component_type: type_name,
            creation,
            variable,
            association: None,
            container: None,
            related: Vec::new(),
            properties: Vec::new(),
            block: Fragment::new(scope.block),
            method: scope.method.clone(),
            own_block: Fragment::new(scope.block),
            own_method: scope.method.clone(),
        };
        self.drafts.push(Draft {
            info,
            parent: None,
            order,
            exposed: false,
        });
        let id = self.drafts.len() - 1;
        self.materialize_exposed(id, 0);
        id
    }

    /// Create the children a node exposes through accessors.
    fn materialize_exposed(&mut self, parent: usize, depth: usize) {
        if depth >= MAX_EXPOSED_DEPTH {
            return;
        }
        let lookup = self.lookup;
        let Some(descriptor) = lookup.describe(&self.drafts[parent].info.component_type) else {
            return;
        };
        for exposed in &descriptor.exposed {
            let info = self.drafts[parent].info.exposed_child(exposed);
            self.drafts.push(Draft {
                info,
                parent: Some(parent),
                order: 0,
                exposed: true,
            });
            let id = self.drafts.len() - 1;
            self.exposed.insert((parent, exposed.accessor.clone()), id);
            self.materialize_exposed(id, depth + 1);
        }
    }

    // =========================================================================
    // Lazy accessors
    // =========================================================================

    fn lazy_accessor(&mut self, name: &str) -> LazyState {
        if let Some(state) = self.lazy.get(name) {
            return state.clone();
        }
        self.lazy.insert(name.to_string(), LazyState::InProgress);
        let state = self.build_lazy(name);
        self.lazy.insert(name.to_string(), state.clone());
        state
    }

    fn build_lazy(&mut self, name: &str) -> LazyState {
        let class = self.class;
        let Some(method) = self.plain_method(name) else {
            return LazyState::NotLazy;
        };
        let Some(shape) = lazy_shape(method) else {
            return LazyState::NotLazy;
        };
        let Some(field) = class.field(&shape.field) else {
            return LazyState::NotLazy;
        };
        self.visited.insert(name.to_string());
        let scope = Scope {
            method: name.to_string(),
            block: shape.block.span,
        };
        let declared = self.described(&field.ty.name);
        match self.classify(shape.value, declared.as_deref(), &scope) {
            Classified::Component {
                type_name,
                creation,
                parent,
                refs,
            } => {
                let expression = creation
                    .expression()
                    .copied()
                    .unwrap_or_else(|| Fragment::new(shape.value.span));
                let variable = VariableSupport::Lazy {
                    name: shape.field.clone(),
                    field: Fragment::new(field.span),
                    field_name: Fragment::new(field.name.span),
                    accessor: name.to_string(),
                    method: Fragment::new(method.span),
                    method_name: Fragment::new(method.name.span),
                    references: shape.field_refs.iter().map(|s| Fragment::new(*s)).collect(),
                    accessor_calls: Vec::new(),
                };
                self.recorded.extend(shape.field_refs.iter().copied());
                let id = self.add_draft(
                    type_name,
                    CreationSupport::LazyAccessor {
                        accessor: name.to_string(),
                        expression,
                    },
                    variable,
                    &scope,
                    method.span.start,
                );
                self.fields.insert(shape.field.clone(), Binding::Node(id));
                self.lazy.insert(name.to_string(), LazyState::Node(id));
                self.record(&refs);
                if let Some((parent, argument)) = parent {
                    self.attach_by_constructor(id, parent, argument, &scope, method.span.start);
                }
                for stmt in shape.block.statements.iter().skip(1) {
                    self.statement(stmt, &scope);
                }
                LazyState::Node(id)
            }
            Classified::Unknown { span, type_name } => {
                self.fields.insert(
                    shape.field.clone(),
                    Binding::Unknown {
                        span,
                        type_name: type_name.clone(),
                    },
                );
                LazyState::Unknown { span, type_name }
            }
            Classified::Bad => {
                self.fields.insert(shape.field.clone(), Binding::Bad);
                LazyState::Bad
            }
            Classified::NotComponent => LazyState::NotLazy,
        }
    }

    // =========================================================================
    // References
    // =========================================================================

    fn binding(&self, name: &str, scope: &Scope) -> Option<Binding> {
        self.locals
            .get(&(scope.method.clone(), name.to_string()))
            .or_else(|| self.fields.get(name))
            .cloned()
    }

    fn binding_ref(binding: Option<Binding>, span: Span) -> Ref {
        match binding {
            Some(Binding::Node(id)) => Ref::Node(
                id,
                vec![RefSpan {
                    node: id,
                    span,
                    kind: RefKind::Name,
                }],
            ),
            Some(Binding::Unknown { span, type_name }) => Ref::Unknown { span, type_name },
            Some(Binding::Bad) => Ref::Bad,
            None => Ref::Other,
        }
    }

    /// Which component, if any, `expr` denotes.
    fn resolve_ref(&mut self, expr: &'a Expr, scope: &Scope) -> Ref {
        let expr = expr.unparenthesized();
        match &expr.kind {
            ExprKind::Name(name) => Self::binding_ref(self.binding(name, scope), expr.span),
            ExprKind::Field { target, name } if matches!(target.kind, ExprKind::This) => {
                Self::binding_ref(self.fields.get(&name.text).cloned(), name.span)
            }
            ExprKind::This => match self.this_node {
                Some(id) => Ref::Node(id, Vec::new()),
                None => Ref::Other,
            },
            ExprKind::Cast { expr, .. } => self.resolve_ref(expr, scope),
            ExprKind::Call { target, name, args } if args.is_empty() => match target.as_deref() {
                Some(owner) if !matches!(owner.kind, ExprKind::This) => {
                    match self.resolve_ref(owner, scope) {
                        Ref::Node(owner, refs) => {
                            match self.exposed.get(&(owner, name.text.clone())) {
                                Some(&id) => Ref::Node(id, refs),
                                None => Ref::Other,
                            }
                        }
                        other => other,
                    }
                }
                _ => match self.lazy_accessor(&name.text) {
                    LazyState::Node(id) => Ref::Node(
                        id,
                        vec![RefSpan {
                            node: id,
                            span: name.span,
                            kind: RefKind::Accessor,
                        }],
                    ),
                    LazyState::Unknown { span, type_name } => Ref::Unknown { span, type_name },
                    LazyState::Bad => Ref::Bad,
                    LazyState::NotLazy | LazyState::InProgress => {
                        let exposed = self
                            .this_node
                            .and_then(|this| self.exposed.get(&(this, name.text.clone())));
                        match exposed {
                            Some(&id) => Ref::Node(id, Vec::new()),
                            None => Ref::Other,
                        }
                    }
                },
            },
            _ => Ref::Other,
        }
    }

    /// Remember identifiers that name components, once each.
    fn record(&mut self, refs: &[RefSpan]) {
        for reference in refs {
            if !self.recorded.insert(reference.span) {
                continue;
            }
            let variable = &mut self.drafts[reference.node].info.variable;
            match reference.kind {
                RefKind::Name => variable.add_reference(Fragment::new(reference.span)),
                RefKind::Accessor => variable.add_accessor_call(Fragment::new(reference.span)),
            }
        }
    }

    fn mark_bad(&mut self, span: Span, error: ParseError) {
        if self.reported.insert(span) {
            tracing::debug!(target: targets::PARSER, ?span, %error, "bad node");
            self.bad_nodes.push(BadNode { span, error });
        }
    }

    // =========================================================================
    // Associations
    // =========================================================================

    /// Try `target.name(args)` as an association. Returns whether the
    /// statement was consumed.
    fn association(
        &mut self,
        stmt: &'a Stmt,
        target: Option<&'a Expr>,
        name: &'a Ident,
        args: &'a [Expr],
        scope: &Scope,
    ) -> bool {
        let receiver = match target {
            None => match self.this_node {
                Some(id) => Ref::Node(id, Vec::new()),
                None => Ref::Other,
            },
            Some(target) => self.resolve_ref(target, scope),
        };
        match receiver {
            Ref::Node(parent, receiver_refs) => {
                self.attach_by_invocation(stmt, parent, receiver_refs, name, args, scope)
            }
            Ref::Bad => true,
            Ref::Unknown { span, type_name } => {
                if self.mentions_component(args, scope) {
                    self.mark_bad(span, ParseError::UnknownType { type_name });
                }
                true
            }
            Ref::Other => {
                let unbound_variable = target.is_some_and(|t| match &t.kind {
                    ExprKind::Name(n) => n.chars().next().is_some_and(char::is_lowercase),
                    _ => false,
                });
                if unbound_variable && self.mentions_component(args, scope) {
                    let text = stmt.span.slice(self.source).unwrap_or_default().to_string();
                    self.mark_bad(stmt.span, ParseError::UnresolvedReceiver { text });
                    return true;
                }
                false
            }
        }
    }

    fn mentions_component(&mut self, args: &'a [Expr], scope: &Scope) -> bool {
        args.iter().any(|arg| {
            matches!(arg.unparenthesized().kind, ExprKind::New { .. })
                || !matches!(self.resolve_ref(arg, scope), Ref::Other)
        })
    }

    fn attach_by_invocation(
        &mut self,
        stmt: &'a Stmt,
        parent: usize,
        receiver_refs: Vec<RefSpan>,
        name: &'a Ident,
        args: &'a [Expr],
        scope: &Scope,
    ) -> bool {
        let lookup = self.lookup;
        let Some(descriptor) = lookup.describe(&self.drafts[parent].info.component_type) else {
            return false;
        };
        let candidates = self.container_preference(parent, descriptor);
        for (position, argument) in args.iter().enumerate() {
            let matching: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&c| {
                    descriptor.containers[c]
                        .association
                        .invocation()
                        .is_some_and(|t| t.matches(&name.text, args.len(), position))
                })
                .collect();
            if matching.is_empty() {
                continue;
            }

            let (child, child_refs) = match self.child_argument(argument, scope) {
                ChildArg::Existing(child, refs) => {
                    let child_type = &self.drafts[child].info.component_type;
                    let Some(container) = matching.iter().copied().find(|&c| {
                        self.fits(parent, descriptor, c, Some(child), child_type)
                    }) else {
                        return false;
                    };
                    (Some((child, container)), refs)
                }
                ChildArg::Inline {
                    type_name,
                    creation,
                    refs,
                } => {
                    let Some(container) = matching
                        .iter()
                        .copied()
                        .find(|&c| self.fits(parent, descriptor, c, None, &type_name))
                    else {
                        return false;
                    };
                    let variable = VariableSupport::Anonymous(AnonymousAccess::Inline);
                    let id = self.add_draft(type_name, creation, variable, scope, stmt.span.start);
                    (Some((id, container)), refs)
                }
                ChildArg::NotChild => (None, Vec::new()),
                ChildArg::Skip => return true,
            };
            let Some((child, container)) = child else {
                continue;
            };

            let Some(template) = descriptor.containers[container]
                .association
                .invocation()
                .cloned()
            else {
                continue;
            };
            let association = Association::Invocation {
                statement: Fragment::new(stmt.span),
                template,
            };
            if !self.attach(child, parent, container, association, scope, stmt.span.start) {
                return false;
            }
            self.record(&receiver_refs);
            self.record(&child_refs);
            return true;
        }
        false
    }

    fn child_argument(&mut self, argument: &'a Expr, scope: &Scope) -> ChildArg {
        match self.resolve_ref(argument, scope) {
            Ref::Node(child, refs) => return ChildArg::Existing(child, refs),
            Ref::Bad => return ChildArg::Skip,
            Ref::Unknown { span, type_name } => {
                self.mark_bad(span, ParseError::UnknownType { type_name });
                return ChildArg::Skip;
            }
            Ref::Other => {}
        }
        match self.classify(argument, None, scope) {
            Classified::Component {
                type_name,
                creation,
                parent: None,
                refs,
            } => ChildArg::Inline {
                type_name,
                creation,
                refs,
            },
            // The constructor already names a parent.
            Classified::Component { .. } => ChildArg::Skip,
            Classified::Unknown { span, type_name } => {
                self.mark_bad(span, ParseError::UnknownType { type_name });
                ChildArg::Skip
            }
            Classified::Bad => ChildArg::Skip,
            Classified::NotComponent => {
                let inner = argument.unparenthesized();
                match &inner.kind {
                    ExprKind::Literal(_) | ExprKind::Null | ExprKind::Binary { .. } => {
                        ChildArg::NotChild
                    }
                    _ => {
                        let text = inner.span.slice(self.source).unwrap_or_default().to_string();
                        self.mark_bad(inner.span, ParseError::UnresolvedArgument { text });
                        ChildArg::Skip
                    }
                }
            }
        }
    }

    fn attach_by_constructor(
        &mut self,
        child: usize,
        parent: usize,
        argument: Span,
        scope: &Scope,
        order: usize,
    ) {
        let lookup = self.lookup;
        let Some(descriptor) = lookup.describe(&self.drafts[parent].info.component_type) else {
            return;
        };
        let child_type = self.drafts[child].info.component_type.clone();
        let container = self
            .container_preference(parent, descriptor)
            .into_iter()
            .find(|&c| {
                descriptor.containers[c].association.uses_constructor()
                    && self.fits(parent, descriptor, c, Some(child), &child_type)
            });
        match container {
            Some(container) => {
                let association = Association::ConstructorArgument {
                    argument: Fragment::new(argument),
                };
                self.attach(child, parent, container, association, scope, order);
            }
            None => tracing::debug!(
                target: targets::PARSER,
                parent = %descriptor.type_name,
                child = %child_type,
                "constructor names a parent that takes no such child"
            ),
        }
    }

    /// Record `child` under `parent`. A second association statement for a
    /// constructor-attached child completes a compound association.
    fn attach(
        &mut self,
        child: usize,
        parent: usize,
        container: usize,
        association: Association,
        scope: &Scope,
        order: usize,
    ) -> bool {
        let draft = &mut self.drafts[child];
        if let Some(existing) = draft.parent {
            let completes = existing == parent && draft.info.container == Some(container);
            if completes
                && let Some(Association::ConstructorArgument { argument }) = &draft.info.association
                && let Association::Invocation {
                    statement,
                    template,
                } = association
            {
                draft.info.association = Some(Association::Compound {
                    argument: *argument,
                    statement,
                    template,
                });
                return true;
            }
            return false;
        }
        draft.parent = Some(parent);
        draft.order = order;
        draft.info.container = Some(container);
        draft.info.association = Some(association);
        draft.info.block = Fragment::new(scope.block);
        draft.info.method = scope.method.clone();
        true
    }

    /// Container indices of `parent` in the order they are tried.
    ///
    /// Slots come first until a sequence holds a child.
    fn container_preference(&self, parent: usize, descriptor: &ComponentDescriptor) -> Vec<usize> {
        let sequence_used = self.drafts.iter().any(|d| {
            d.parent == Some(parent)
                && d.info
                    .container
                    .is_some_and(|c| descriptor.containers[c].kind == ContainerKind::Sequence)
        });
        let (mut slots, mut sequences): (Vec<usize>, Vec<usize>) = (0..descriptor.containers.len())
            .partition(|&c| descriptor.containers[c].kind == ContainerKind::Slot);
        if sequence_used {
            sequences.extend(slots);
            sequences
        } else {
            slots.extend(sequences);
            slots
        }
    }

    /// Whether `child` may sit in `container` of `parent`.
    ///
    /// A slot holds one node; its current occupant still matches it.
    fn fits(
        &self,
        parent: usize,
        descriptor: &ComponentDescriptor,
        container: usize,
        child: Option<usize>,
        child_type: &str,
    ) -> bool {
        let description = &descriptor.containers[container];
        if !accepts(self.lookup, description, child_type) {
            return false;
        }
        description.kind == ContainerKind::Sequence
            || !self.drafts.iter().enumerate().any(|(index, d)| {
                d.parent == Some(parent)
                    && d.info.container == Some(container)
                    && Some(index) != child
            })
    }

    // =========================================================================
    // Related statements
    // =========================================================================

    fn related(&mut self, stmt: &'a Stmt, expr: &'a Expr, scope: &Scope) {
        let mut candidates = Vec::new();
        expr.walk(&mut |e| {
            if matches!(
                e.kind,
                ExprKind::Name(_) | ExprKind::This | ExprKind::Field { .. } | ExprKind::Call { .. }
            ) {
                candidates.push(e);
            }
        });

        let mut nodes = Vec::new();
        let mut refs = Vec::new();
        for candidate in candidates {
            if let ExprKind::Call { target: None, name, .. } = &candidate.kind
                && let Some(this) = self.this_node
                && self.class.find_method(&name.text).is_none()
                && name.text != "super"
                && name.text != "this"
            {
                nodes.push(this);
            }
            match self.resolve_ref(candidate, scope) {
                Ref::Node(node, spans) => {
                    nodes.push(node);
                    refs.extend(spans);
                }
                Ref::Bad | Ref::Unknown { .. } => return,
                Ref::Other => {}
            }
        }
        nodes.sort_unstable();
        nodes.dedup();
        if nodes.is_empty() {
            return;
        }

        for &node in &nodes {
            self.drafts[node].info.related.push(Fragment::new(stmt.span));
        }
        self.property(stmt, expr, scope);
        self.record(&refs);
    }

    fn property(&mut self, stmt: &'a Stmt, expr: &'a Expr, scope: &Scope) {
        let ExprKind::Call { target, name, args } = &expr.kind else {
            return;
        };
        let [value] = args.as_slice() else {
            return;
        };
        let receiver = match target.as_deref() {
            Some(target) => match self.resolve_ref(target, scope) {
                Ref::Node(node, _) => node,
                _ => return,
            },
            None => match self.this_node {
                Some(this) => this,
                None => return,
            },
        };
        let lookup = self.lookup;
        let info = &mut self.drafts[receiver].info;
        let Some(property) = lookup
            .describe(&info.component_type)
            .and_then(|d| d.property_by_setter(&name.text))
        else {
            return;
        };
        info.properties.push(PropertyValue {
            name: property.name.clone(),
            setter: property.setter.clone(),
            value: value.span.slice(self.source).unwrap_or_default().to_string(),
            statement: Fragment::new(stmt.span),
        });
    }
}

fn accepts(lookup: &dyn DescriptorLookup, container: &ContainerDescriptor, child_type: &str) -> bool {
    container.accepts.is_empty()
        || container
            .accepts
            .iter()
            .any(|accepted| lookup.is_assignable(child_type, accepted))
}

/// A non-static factory declared on `type_name` or a supertype.
fn instance_factory(
    lookup: &dyn DescriptorLookup,
    type_name: &str,
    method: &str,
) -> Option<FactoryMethod> {
    let ancestors = lookup
        .describe(type_name)
        .map(|d| d.ancestors.clone())
        .unwrap_or_default();
    std::iter::once(type_name.to_string())
        .chain(ancestors)
        .find_map(|t| lookup.factory_method(&t, method).cloned())
        .filter(|m| !m.is_static && lookup.describe(&m.returns).is_some())
}

/// `x` or `this.x`, with the identifier span.
fn field_ref(expr: &Expr) -> Option<(String, Span)> {
    match &expr.unparenthesized().kind {
        ExprKind::Name(name) => Some((name.clone(), expr.unparenthesized().span)),
        ExprKind::Field { target, name } if matches!(target.kind, ExprKind::This) => {
            Some((name.text.clone(), name.span))
        }
        _ => None,
    }
}

/// Match `if (x == null) { x = value; ... } return x;`.
pub(crate) fn lazy_shape(method: &MethodDecl) -> Option<LazyShape<'_>> {
    let body = method.body.as_ref()?;
    let [first, last] = body.statements.as_slice() else {
        return None;
    };
    let StmtKind::If {
        cond,
        then_branch,
        else_branch: None,
    } = &first.kind
    else {
        return None;
    };
    let StmtKind::Return(Some(returned)) = &last.kind else {
        return None;
    };
    let StmtKind::Block(block) = &then_branch.kind else {
        return None;
    };
    let ExprKind::Binary { op, lhs, rhs } = &cond.unparenthesized().kind else {
        return None;
    };
    if op != "==" {
        return None;
    }
    let (checked, checked_span) = match (&lhs.kind, &rhs.kind) {
        (_, ExprKind::Null) => field_ref(lhs)?,
        (ExprKind::Null, _) => field_ref(rhs)?,
        _ => return None,
    };
    let (returned_name, returned_span) = field_ref(returned)?;
    let StmtKind::Expr(Expr {
        kind: ExprKind::Assign { target, value },
        ..
    }) = &block.statements.first()?.kind
    else {
        return None;
    };
    let (assigned, assigned_span) = field_ref(target)?;
    if checked != returned_name || checked != assigned {
        return None;
    }
    Some(LazyShape {
        field: checked,
        block,
        value,
        field_refs: vec![checked_span, assigned_span, returned_span],
    })
}

#[cfg(test)]
mod tests {
    use horizon_designer_source::syntax::parse;

    use super::*;
    use crate::description::DescriptorRegistry;

    fn model(source: &str) -> ParseOutput {
        let registry = DescriptorRegistry::builtin().unwrap();
        let config = SessionConfig::default();
        let unit = parse(source).unwrap();
        ModelParser::new(&registry, &config).parse(&unit, source).unwrap()
    }

    fn names(output: &ParseOutput) -> Vec<String> {
        let root = output.tree.root().unwrap();
        output
            .tree
            .depth_first_preorder(root)
            .unwrap()
            .into_iter()
            .map(|id| horizon_designer_core::TreeLabel::label(output.tree.get(id).unwrap()))
            .collect()
    }

    #[test]
    fn test_this_root_with_exposed_content_pane() {
        let output = model(
            "import javax.swing.*;\n\
             public class Frame extends JFrame {\n\
             \tpublic Frame() {\n\
             \t\tJPanel panel = new JPanel();\n\
             \t\tgetContentPane().add(panel);\n\
             \t\tJButton ok = new JButton(\"OK\");\n\
             \t\tpanel.add(ok);\n\
             \t\tsetTitle(\"Demo\");\n\
             \t}\n\
             }\n",
        );
        assert_eq!(
            names(&output),
            vec!["(this)", "getContentPane()", "panel", "ok"]
        );
        let root = output.tree.root().unwrap();
        let info = output.tree.get(root).unwrap();
        assert_eq!(info.component_type, "javax.swing.JFrame");
        assert_eq!(info.properties.len(), 1);
        assert_eq!(info.properties[0].value, "\"Demo\"");
        assert!(output.bad_nodes.is_empty());
    }

    #[test]
    fn test_lazy_accessors() {
        let output = model(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tprivate JButton button;\n\
             \tpublic View() {\n\
             \t\tadd(getButton());\n\
             \t}\n\
             \tprivate JButton getButton() {\n\
             \t\tif (button == null) {\n\
             \t\t\tbutton = new JButton();\n\
             \t\t\tbutton.setText(\"Go\");\n\
             \t\t}\n\
             \t\treturn button;\n\
             \t}\n\
             }\n",
        );
        assert_eq!(names(&output), vec!["(this)", "button"]);
        let root = output.tree.root().unwrap();
        let child = output.tree.children(root).unwrap()[0];
        let info = output.tree.get(child).unwrap();
        assert!(matches!(info.creation, CreationSupport::LazyAccessor { .. }));
        assert_eq!(info.variable.accessor(), Some("getButton"));
        assert_eq!(info.own_method, "getButton");
        assert_eq!(info.method, "View");
        assert_eq!(info.properties[0].name, "text");
        match &info.variable {
            VariableSupport::Lazy {
                references,
                accessor_calls,
                ..
            } => {
                // null check, assignment, return and the setText receiver
                assert_eq!(references.len(), 4);
                assert_eq!(accessor_calls.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_constructor_delegates_to_entry_method() {
        let output = model(
            "import javax.swing.*;\n\
             public class View extends JPanel {\n\
             \tpublic View() {\n\
             \t\tinitialize();\n\
             \t}\n\
             \tprivate void initialize() {\n\
             \t\tadd(new JLabel(\"x\"));\n\
             \t}\n\
             }\n",
        );
        let root = output.tree.root().unwrap();
        assert_eq!(output.tree.get(root).unwrap().own_method, "initialize");
        assert_eq!(output.tree.children(root).unwrap().len(), 1);
    }

    #[test]
    fn test_swt_constructor_parent() {
        let output = model(
            "import org.eclipse.swt.SWT;\n\
             import org.eclipse.swt.widgets.*;\n\
             import org.eclipse.swt.custom.ScrolledComposite;\n\
             public class Demo {\n\
             \tpublic static void main(String[] args) {\n\
             \t\tShell shell = new Shell();\n\
             \t\tButton ok = new Button(shell, SWT.PUSH);\n\
             \t\tScrolledComposite scrolled = new ScrolledComposite(shell, SWT.V_SCROLL);\n\
             \t\tComposite inner = new Composite(scrolled, SWT.NONE);\n\
             \t\tscrolled.setContent(inner);\n\
             \t}\n\
             }\n",
        );
        assert_eq!(names(&output), vec!["shell", "ok", "scrolled", "inner"]);
        let root = output.tree.root().unwrap();
        let ok = output.tree.children(root).unwrap()[0];
        assert!(matches!(
            output.tree.get(ok).unwrap().association,
            Some(Association::ConstructorArgument { .. })
        ));
        let scrolled = output.tree.children(root).unwrap()[1];
        let inner = output.tree.children(scrolled).unwrap()[0];
        assert!(matches!(
            output.tree.get(inner).unwrap().association,
            Some(Association::Compound { .. })
        ));
    }

    #[test]
    fn test_discarded_construction_is_modelled() {
        let source = "import org.eclipse.swt.SWT;\n\
             import org.eclipse.swt.widgets.*;\n\
             public class Demo {\n\
             \tpublic static void main(String[] args) {\n\
             \t\tShell shell = new Shell();\n\
             \t\tnew Label(shell, SWT.NONE);\n\
             \t\tButton ok = new Button(shell, SWT.PUSH);\n\
             \t\tnew Fancy(shell, SWT.NONE);\n\
             \t\tnew Object();\n\
             \t}\n\
             }\n";
        let output = model(source);
        assert_eq!(names(&output), vec!["shell", "(inline)", "ok"]);
        let root = output.tree.root().unwrap();
        let label = output.tree.children(root).unwrap()[0];
        let info = output.tree.get(label).unwrap();
        assert_eq!(info.component_type, "org.eclipse.swt.widgets.Label");
        assert!(matches!(
            info.association,
            Some(Association::ConstructorArgument { .. })
        ));
        let statement = info.variable.statement().and_then(Fragment::get).unwrap();
        assert!(statement
            .slice(source)
            .unwrap()
            .starts_with("new Label(shell, SWT.NONE)"));

        assert_eq!(output.bad_nodes.len(), 1);
        assert!(matches!(
            output.bad_nodes[0].error,
            ParseError::UnknownType { ref type_name } if type_name == "Fancy"
        ));
    }

    #[test]
    fn test_static_factory_and_opaque() {
        let output = model(
            "import javax.swing.*;\n\
             public class Demo extends JPanel {\n\
             \tpublic Demo() {\n\
             \t\tBox box = Box.createVerticalBox();\n\
             \t\tadd(box);\n\
             \t\tJPanel shared = Panels.shared();\n\
             \t\tbox.add(shared);\n\
             \t}\n\
             }\n",
        );
        let root = output.tree.root().unwrap();
        let box_node = output.tree.children(root).unwrap()[0];
        let info = output.tree.get(box_node).unwrap();
        assert!(matches!(info.creation, CreationSupport::StaticFactory { .. }));
        let shared = output.tree.children(box_node).unwrap()[0];
        assert!(matches!(
            output.tree.get(shared).unwrap().creation,
            CreationSupport::Opaque { .. }
        ));
    }

    #[test]
    fn test_unknown_receiver_hides_subtree() {
        let output = model(
            "import javax.swing.*;\n\
             public class Demo extends JPanel {\n\
             \tpublic Demo() {\n\
             \t\tFancy fancy = new Fancy();\n\
             \t\tfancy.add(new JButton());\n\
             \t\tfancy.add(new JLabel());\n\
             \t\tadd(fancy);\n\
             \t}\n\
             }\n",
        );
        assert_eq!(names(&output), vec!["(this)"]);
        assert_eq!(output.bad_nodes.len(), 1);
        assert!(matches!(
            output.bad_nodes[0].error,
            ParseError::UnknownType { ref type_name } if type_name == "Fancy"
        ));
    }

    #[test]
    fn test_no_entry_point() {
        let registry = DescriptorRegistry::builtin().unwrap();
        let config = SessionConfig::default();
        let unit = parse("class A { void other() {} }").unwrap();
        let result = ModelParser::new(&registry, &config).parse(&unit, "");
        assert!(matches!(
            result,
            Err(crate::error::DesignerError::Parse(ParseError::NoEntryPoint { .. }))
        ));
    }
}
