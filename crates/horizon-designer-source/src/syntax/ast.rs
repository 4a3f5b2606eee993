//! Syntax tree for the Java subset.
//!
//! Every node carries the byte span it was parsed from. The tree is a
//! read-only snapshot of one parse; spans go stale as soon as the buffer
//! changes.

use crate::span::Span;

/// An identifier and its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

/// A type reference. Generic arguments are dropped from `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Dotted name as written, e.g. `JButton` or `javax.swing.JButton`.
    pub name: String,
    /// Number of `[]` suffixes.
    pub array_dims: usize,
    pub span: Span,
}

impl TypeRef {
    /// The last segment of the name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<String>,
    /// The whole `package ...;` declaration.
    pub package_span: Option<Span>,
    pub imports: Vec<Import>,
    /// The first top-level class, if any.
    pub class: Option<ClassDecl>,
    pub span: Span,
}

/// An `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported name without the trailing `.*`.
    pub path: String,
    pub is_static: bool,
    pub wildcard: bool,
    pub span: Span,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Ident,
    pub superclass: Option<TypeRef>,
    pub members: Vec<Member>,
    /// From the opening to the closing brace, inclusive.
    pub body: Span,
    pub span: Span,
}

impl ClassDecl {
    /// Iterate over field declarations.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    /// Iterate over methods and constructors.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields().find(|f| f.name.text == name)
    }

    /// Find a parameterless method or constructor by name.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods()
            .find(|m| m.name.text == name && m.param_count == 0)
    }

    /// Find the first method with this name, whatever its parameters.
    pub fn find_method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().find(|m| m.name.text == name)
    }

    /// Iterate over constructors.
    pub fn constructors(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods().filter(|m| m.is_constructor())
    }

    /// The method whose body contains `offset`.
    pub fn method_at(&self, offset: usize) -> Option<&MethodDecl> {
        self.methods()
            .find(|m| m.body.as_ref().is_some_and(|b| b.span.contains(offset)))
    }
}

/// A class body member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    /// Initializers, nested types and anything else kept verbatim.
    Other(Span),
}

impl Member {
    /// The member's full span.
    pub fn span(&self) -> Span {
        match self {
            Member::Field(field) => field.span,
            Member::Method(method) => method.span,
            Member::Other(span) => *span,
        }
    }
}

/// A field declaration with a single declarator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Vec<String>,
    pub ty: TypeRef,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub modifiers: Vec<String>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub name: Ident,
    pub param_count: usize,
    pub body: Option<Block>,
    pub span: Span,
}

impl MethodDecl {
    /// Whether this is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    /// From the opening to the closing brace, inclusive.
    pub span: Span,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// `Type name = init;`
    Local {
        ty: TypeRef,
        name: Ident,
        init: Option<Expr>,
    },
    /// `expr;`
    Expr(Expr),
    /// `if (cond) then else otherwise`
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `return value;`
    Return(Option<Expr>),
    /// `{ ... }`
    Block(Block),
    /// Anything else, kept verbatim.
    Other,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `new Type(args)`, with the span of an anonymous class body if present.
    New {
        ty: TypeRef,
        args: Vec<Expr>,
        body: Option<Span>,
    },
    /// `target.name(args)` or `name(args)`.
    Call {
        target: Option<Box<Expr>>,
        name: Ident,
        args: Vec<Expr>,
    },
    /// `target.name`
    Field { target: Box<Expr>, name: Ident },
    /// A bare identifier.
    Name(String),
    This,
    Null,
    /// Number, string, char or boolean literal as written.
    Literal(String),
    /// `target = value`
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Binary operator, including compound assignment.
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Prefix or postfix operator.
    Unary { op: String, operand: Box<Expr> },
    /// `(Type) expr`
    Cast { ty: TypeRef, expr: Box<Expr> },
    /// `(expr)`
    Paren(Box<Expr>),
    /// Lambdas, array access, conditionals and other shapes kept verbatim.
    Other,
}

impl Expr {
    /// The dotted name this expression spells, e.g. `javax.swing.SwingConstants`.
    pub fn dotted_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Name(name) => Some(name.clone()),
            ExprKind::Field { target, name } => {
                let mut prefix = target.dotted_name()?;
                prefix.push('.');
                prefix.push_str(&name.text);
                Some(prefix)
            }
            _ => None,
        }
    }

    /// Call `visit` on this expression and every sub-expression, outermost first.
    ///
    /// Opaque shapes such as lambdas are not entered.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match &self.kind {
            ExprKind::New { args, .. } => args.iter().for_each(|a| a.walk(visit)),
            ExprKind::Call { target, args, .. } => {
                if let Some(target) = target {
                    target.walk(visit);
                }
                args.iter().for_each(|a| a.walk(visit));
            }
            ExprKind::Field { target, .. } => target.walk(visit),
            ExprKind::Assign { target, value } => {
                target.walk(visit);
                value.walk(visit);
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            ExprKind::Unary { operand, .. } => operand.walk(visit),
            ExprKind::Cast { expr, .. } | ExprKind::Paren(expr) => expr.walk(visit),
            ExprKind::Name(_)
            | ExprKind::This
            | ExprKind::Null
            | ExprKind::Literal(_)
            | ExprKind::Other => {}
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparenthesized(),
            _ => self,
        }
    }
}

/// Call `visit` on every statement of `block`, recursing into nested blocks
/// and `if` branches, in source order.
pub fn walk_statements<'a>(block: &'a Block, visit: &mut impl FnMut(&'a Stmt)) {
    for stmt in &block.statements {
        walk_statement(stmt, visit);
    }
}

fn walk_statement<'a>(stmt: &'a Stmt, visit: &mut impl FnMut(&'a Stmt)) {
    visit(stmt);
    match &stmt.kind {
        StmtKind::Block(block) => walk_statements(block, visit),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_statement(then_branch, visit);
            if let Some(else_branch) = else_branch {
                walk_statement(else_branch, visit);
            }
        }
        _ => {}
    }
}
