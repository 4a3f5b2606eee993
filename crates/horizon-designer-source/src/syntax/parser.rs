//! Lenient recursive-descent parser for the Java subset.
//!
//! Members and statements the parser does not understand are kept as
//! `Other` nodes covering their text, so unfamiliar code never prevents a
//! file from loading. Only lexical errors and unbalanced braces fail a parse.

use super::ast::*;
use super::lexer::{tokenize, Token, TokenKind};
use crate::error::SyntaxError;
use crate::span::Span;

type PResult<T> = Result<T, SyntaxError>;

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "transient",
    "volatile",
    "native",
    "strictfp",
    "default",
];

const OPAQUE_STATEMENTS: &[&str] = &[
    "for",
    "while",
    "do",
    "try",
    "switch",
    "synchronized",
    "throw",
    "break",
    "continue",
    "assert",
    "yield",
    "class",
    "interface",
    "enum",
    "record",
];

const ASSIGN_OPS: &[&str] = &["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>="];

/// Parse a complete source file.
pub fn parse(source: &str) -> Result<CompilationUnit, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        src: source,
        tokens,
        pos: 0,
    };
    parser.compilation_unit()
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    // =========================================================================
    // Token access
    // =========================================================================

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn text_at(&self, index: usize) -> &'a str {
        self.tokens
            .get(index)
            .map_or("", |t| &self.src[t.span.range()])
    }

    fn current(&self) -> &'a str {
        self.text_at(self.pos)
    }

    fn at(&self, text: &str) -> bool {
        self.current() == text
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek_at(0).is_some_and(|t| t.kind == kind)
    }

    fn start(&self) -> usize {
        self.peek_at(0).map_or(self.src.len(), |t| t.span.start)
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek_at(0);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.src, self.start(), message)
    }

    fn expect(&mut self, text: &str) -> PResult<Token> {
        if self.at(text) {
            self.bump().ok_or_else(|| self.error(format!("expected `{text}`")))
        } else {
            Err(self.error(format!("expected `{text}`, found `{}`", self.current())))
        }
    }

    fn ident(&mut self) -> PResult<Ident> {
        match self.peek_at(0) {
            Some(token) if token.kind == TokenKind::Ident => {
                self.pos += 1;
                Ok(Ident {
                    text: self.src[token.span.range()].to_string(),
                    span: token.span,
                })
            }
            _ => Err(self.error(format!("expected identifier, found `{}`", self.current()))),
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    // =========================================================================
    // Balanced skipping
    // =========================================================================

    /// Skip a `{ ... }`, `( ... )` or `[ ... ]` group starting at the current token.
    fn skip_group(&mut self) -> PResult<Span> {
        let start = self.start();
        let mut depth = 0usize;
        loop {
            let Some(token) = self.bump() else {
                return Err(SyntaxError::at(self.src, start, "unbalanced brackets"));
            };
            match &self.src[token.span.range()] {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(self.span_from(start));
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip `<...>`, counting `>>` and `>>>` as several closers.
    fn skip_generics(&mut self) -> PResult<()> {
        let mut depth: isize = 0;
        loop {
            let text = self.current();
            match text {
                "<" => depth += 1,
                ">" => depth -= 1,
                ">>" => depth -= 2,
                ">>>" => depth -= 3,
                ";" | "{" | "}" | "(" | ")" | "" => {
                    return Err(self.error("unterminated type arguments"));
                }
                _ => {}
            }
            self.bump();
            if depth <= 0 {
                return Ok(());
            }
        }
    }

    /// Skip one statement the parser does not model.
    fn skip_statement(&mut self) -> Span {
        let start = self.start();
        let mut depth = 0usize;
        while let Some(token) = self.peek_at(0) {
            let text = &self.src[token.span.range()];
            if depth == 0 && text == "}" {
                break;
            }
            self.pos += 1;
            match text {
                "{" | "(" | "[" => depth += 1,
                ")" | "]" => depth = depth.saturating_sub(1),
                "}" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && !matches!(self.current(), "else" | "catch" | "finally") {
                        break;
                    }
                }
                ";" if depth == 0 => break,
                _ => {}
            }
        }
        self.span_from(start)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn compilation_unit(&mut self) -> PResult<CompilationUnit> {
        let mut package = None;
        let mut package_span = None;
        let mut imports = Vec::new();
        let mut class = None;

        while !self.at_eof() && class.is_none() {
            match self.current() {
                "package" => {
                    let start = self.start();
                    self.bump();
                    package = Some(self.qualified_name()?.0);
                    self.expect(";")?;
                    package_span = Some(self.span_from(start));
                }
                "import" => imports.push(self.import()?),
                "@" if self.text_at(self.pos + 1) != "interface" => self.skip_annotation()?,
                "class" => class = Some(self.class_decl()?),
                "interface" | "enum" | "record" | "@" => {
                    while !self.at_eof() && !self.at("{") {
                        self.bump();
                    }
                    if !self.at_eof() {
                        self.skip_group()?;
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }

        Ok(CompilationUnit {
            package,
            package_span,
            imports,
            class,
            span: Span::new(0, self.src.len()),
        })
    }

    fn qualified_name(&mut self) -> PResult<(String, Span)> {
        let first = self.ident()?;
        let mut name = first.text;
        while self.at(".") && self.peek_at(1).is_some_and(|t| t.kind == TokenKind::Ident) {
            self.bump();
            name.push('.');
            name.push_str(&self.ident()?.text);
        }
        Ok((name, self.span_from(first.span.start)))
    }

    fn import(&mut self) -> PResult<Import> {
        let start = self.start();
        self.expect("import")?;
        let is_static = self.at("static");
        if is_static {
            self.bump();
        }
        let (path, _) = self.qualified_name()?;
        let wildcard = self.at(".") && self.text_at(self.pos + 1) == "*";
        if wildcard {
            self.bump();
            self.bump();
        }
        self.expect(";")?;
        Ok(Import {
            path,
            is_static,
            wildcard,
            span: self.span_from(start),
        })
    }

    fn skip_annotation(&mut self) -> PResult<()> {
        self.expect("@")?;
        self.qualified_name()?;
        if self.at("(") {
            self.skip_group()?;
        }
        Ok(())
    }

    fn modifiers(&mut self) -> PResult<Vec<String>> {
        let mut modifiers = Vec::new();
        loop {
            if self.at("@") && self.text_at(self.pos + 1) != "interface" {
                self.skip_annotation()?;
            } else if MODIFIERS.contains(&self.current()) {
                modifiers.push(self.current().to_string());
                self.bump();
            } else {
                return Ok(modifiers);
            }
        }
    }

    fn type_ref(&mut self) -> PResult<TypeRef> {
        let start = self.start();
        let (name, _) = self.qualified_name()?;
        if self.at("<") {
            self.skip_generics()?;
        }
        // Nested generic types: Map.Entry<K, V>.Inner is rare enough to ignore.
        let mut array_dims = 0;
        while self.at("[") && self.text_at(self.pos + 1) == "]" {
            self.bump();
            self.bump();
            array_dims += 1;
        }
        if self.at("...") {
            self.bump();
            array_dims += 1;
        }
        Ok(TypeRef {
            name,
            array_dims,
            span: self.span_from(start),
        })
    }

    fn class_decl(&mut self) -> PResult<ClassDecl> {
        let start = self.start();
        self.expect("class")?;
        let name = self.ident()?;
        if self.at("<") {
            self.skip_generics()?;
        }
        let superclass = if self.at("extends") {
            self.bump();
            Some(self.type_ref()?)
        } else {
            None
        };
        while !self.at_eof() && !self.at("{") {
            self.bump();
        }
        let body_start = self.start();
        self.expect("{")?;

        let mut members = Vec::new();
        loop {
            if self.at_eof() {
                return Err(SyntaxError::at(self.src, body_start, "unterminated class body"));
            }
            if self.at("}") {
                self.bump();
                break;
            }
            let checkpoint = self.pos;
            match self.member(&name.text) {
                Ok(member) => members.push(member),
                Err(err) => {
                    tracing::debug!(target: "horizon_designer_source::parser", %err, "kept unparsed member verbatim");
                    self.pos = checkpoint;
                    let span = self.skip_statement();
                    if span.is_empty() {
                        return Err(err);
                    }
                    members.push(Member::Other(span));
                }
            }
        }

        Ok(ClassDecl {
            name,
            superclass,
            members,
            body: self.span_from(body_start),
            span: self.span_from(start),
        })
    }

    fn member(&mut self, class_name: &str) -> PResult<Member> {
        let start = self.start();
        let modifiers = self.modifiers()?;

        match self.current() {
            "{" => {
                self.skip_group()?;
                return Ok(Member::Other(self.span_from(start)));
            }
            ";" => {
                self.bump();
                return Ok(Member::Other(self.span_from(start)));
            }
            "class" | "interface" | "enum" | "record" | "@" => {
                while !self.at_eof() && !self.at("{") {
                    self.bump();
                }
                self.skip_group()?;
                return Ok(Member::Other(self.span_from(start)));
            }
            "<" => self.skip_generics()?,
            _ => {}
        }

        let is_constructor = self.current() == class_name && self.text_at(self.pos + 1) == "(";
        let return_type = if is_constructor {
            None
        } else {
            Some(self.type_ref()?)
        };
        let name = self.ident()?;

        if self.at("(") {
            let param_count = self.parameters()?;
            while self.at("[") {
                self.skip_group()?;
            }
            if self.at("throws") {
                while !self.at_eof() && !self.at("{") && !self.at(";") {
                    self.bump();
                }
            }
            let body = if self.at(";") {
                self.bump();
                None
            } else {
                Some(self.block()?)
            };
            return Ok(Member::Method(MethodDecl {
                modifiers,
                return_type,
                name,
                param_count,
                body,
                span: self.span_from(start),
            }));
        }

        let ty = return_type.ok_or_else(|| self.error("expected field type"))?;
        let init = if self.at("=") {
            self.bump();
            Some(self.expr()?)
        } else {
            None
        };
        if self.at(",") {
            // Further declarators are kept as part of this field's text.
            while !self.at_eof() && !self.at(";") {
                self.bump();
            }
        }
        self.expect(";")?;
        Ok(Member::Field(FieldDecl {
            modifiers,
            ty,
            name,
            init,
            span: self.span_from(start),
        }))
    }

    fn parameters(&mut self) -> PResult<usize> {
        self.expect("(")?;
        if self.at(")") {
            self.bump();
            return Ok(0);
        }
        let mut count = 1;
        let mut depth = 0isize;
        loop {
            let Some(token) = self.bump() else {
                return Err(self.error("unterminated parameter list"));
            };
            match &self.src[token.span.range()] {
                "(" | "<" => depth += 1,
                ">" => depth -= 1,
                ">>" => depth -= 2,
                ">>>" => depth -= 3,
                ")" if depth == 0 => return Ok(count),
                ")" => depth -= 1,
                "," if depth == 0 => count += 1,
                _ => {}
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self) -> PResult<Block> {
        let start = self.start();
        self.expect("{")?;
        let mut statements = Vec::new();
        loop {
            if self.at_eof() {
                return Err(SyntaxError::at(self.src, start, "unterminated block"));
            }
            if self.at("}") {
                self.bump();
                break;
            }
            statements.push(self.statement()?);
        }
        Ok(Block {
            statements,
            span: self.span_from(start),
        })
    }

    fn statement(&mut self) -> PResult<Stmt> {
        let start = self.start();
        let checkpoint = self.pos;
        match self.try_statement() {
            Ok(kind) => Ok(Stmt {
                kind,
                span: self.span_from(start),
            }),
            Err(err) => {
                tracing::debug!(target: "horizon_designer_source::parser", %err, "kept unparsed statement verbatim");
                self.pos = checkpoint;
                let span = self.skip_statement();
                if span.is_empty() {
                    return Err(err);
                }
                Ok(Stmt {
                    kind: StmtKind::Other,
                    span,
                })
            }
        }
    }

    fn try_statement(&mut self) -> PResult<StmtKind> {
        match self.current() {
            "{" => return Ok(StmtKind::Block(self.block()?)),
            ";" => {
                self.bump();
                return Ok(StmtKind::Other);
            }
            "if" => {
                self.bump();
                self.expect("(")?;
                let cond = self.expr()?;
                self.expect(")")?;
                let then_branch = Box::new(self.statement()?);
                let else_branch = if self.at("else") {
                    self.bump();
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                return Ok(StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                });
            }
            "return" => {
                self.bump();
                let value = if self.at(";") { None } else { Some(self.expr()?) };
                self.expect(";")?;
                return Ok(StmtKind::Return(value));
            }
            text if OPAQUE_STATEMENTS.contains(&text) => {
                self.skip_statement();
                return Ok(StmtKind::Other);
            }
            _ => {}
        }

        while self.at("final") || (self.at("@") && self.peek_at(1).is_some()) {
            if self.at("final") {
                self.bump();
            } else {
                self.skip_annotation()?;
            }
        }

        if let Some(after_type) = self.scan_type(self.pos)
            && self.tokens.get(after_type).is_some_and(|t| t.kind == TokenKind::Ident)
            && matches!(self.text_at(after_type + 1), "=" | ";" | ",")
        {
            let ty = self.type_ref()?;
            let name = self.ident()?;
            let init = if self.at("=") {
                self.bump();
                Some(self.expr()?)
            } else {
                None
            };
            if self.at(",") {
                while !self.at_eof() && !self.at(";") {
                    self.bump();
                }
            }
            self.expect(";")?;
            return Ok(StmtKind::Local { ty, name, init });
        }

        let expr = self.expr()?;
        self.expect(";")?;
        Ok(StmtKind::Expr(expr))
    }

    /// Scan a type starting at token `index` without consuming it.
    ///
    /// Returns the index of the first token after the type.
    fn scan_type(&self, mut index: usize) -> Option<usize> {
        let ident = |i: usize| self.tokens.get(i).is_some_and(|t| t.kind == TokenKind::Ident);
        if !ident(index) {
            return None;
        }
        index += 1;
        while self.text_at(index) == "." && ident(index + 1) {
            index += 2;
        }
        if self.text_at(index) == "<" {
            let mut depth: isize = 0;
            loop {
                match self.text_at(index) {
                    "<" => depth += 1,
                    ">" => depth -= 1,
                    ">>" => depth -= 2,
                    ">>>" => depth -= 3,
                    "," | "." | "?" | "extends" | "super" | "[" | "]" | "&" => {}
                    _ if ident(index) => {}
                    _ => return None,
                }
                index += 1;
                if depth <= 0 {
                    break;
                }
            }
        }
        while self.text_at(index) == "[" && self.text_at(index + 1) == "]" {
            index += 2;
        }
        Some(index)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&mut self) -> PResult<Expr> {
        if self.lambda_ahead() {
            return self.lambda();
        }
        let start = self.start();
        let lhs = self.ternary()?;
        let op = self.current();
        if op == "=" {
            self.bump();
            let value = self.expr()?;
            return Ok(Expr {
                kind: ExprKind::Assign {
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                span: self.span_from(start),
            });
        }
        if ASSIGN_OPS.contains(&op) {
            self.bump();
            let rhs = self.expr()?;
            return Ok(Expr {
                kind: ExprKind::Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span: self.span_from(start),
            });
        }
        Ok(lhs)
    }

    fn lambda_ahead(&self) -> bool {
        if self.at_kind(TokenKind::Ident) && self.text_at(self.pos + 1) == "->" {
            return true;
        }
        if !self.at("(") {
            return false;
        }
        let mut depth = 0usize;
        let mut index = self.pos;
        while index < self.tokens.len() {
            match self.text_at(index) {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth == 0 {
                        return self.text_at(index + 1) == "->";
                    }
                }
                ";" | "{" | "}" => return false,
                _ => {}
            }
            index += 1;
        }
        false
    }

    fn lambda(&mut self) -> PResult<Expr> {
        let start = self.start();
        while !self.at_eof() && !self.at("->") {
            self.bump();
        }
        self.expect("->")?;
        if self.at("{") {
            self.skip_group()?;
        } else {
            self.expr()?;
        }
        Ok(Expr {
            kind: ExprKind::Other,
            span: self.span_from(start),
        })
    }

    fn ternary(&mut self) -> PResult<Expr> {
        let start = self.start();
        let cond = self.binary(0)?;
        if !self.at("?") {
            return Ok(cond);
        }
        self.bump();
        self.expr()?;
        self.expect(":")?;
        self.expr()?;
        Ok(Expr {
            kind: ExprKind::Other,
            span: self.span_from(start),
        })
    }

    fn precedence(op: &str) -> Option<u8> {
        Some(match op {
            "||" => 1,
            "&&" => 2,
            "|" => 3,
            "^" => 4,
            "&" => 5,
            "==" | "!=" => 6,
            "<" | ">" | "<=" | ">=" | "instanceof" => 7,
            "<<" | ">>" | ">>>" => 8,
            "+" | "-" => 9,
            "*" | "/" | "%" => 10,
            _ => return None,
        })
    }

    fn binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let start = self.start();
        let mut lhs = self.unary()?;
        while let Some(prec) = Self::precedence(self.current()) {
            if prec < min_prec {
                break;
            }
            let op = self.current().to_string();
            self.bump();
            let rhs = if op == "instanceof" {
                let ty = self.type_ref()?;
                if self.at_kind(TokenKind::Ident) {
                    self.bump();
                }
                Expr {
                    kind: ExprKind::Name(ty.name),
                    span: ty.span,
                }
            } else {
                self.binary(prec + 1)?
            };
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span: self.span_from(start),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let start = self.start();
        let op = self.current();
        if matches!(op, "!" | "-" | "+" | "~" | "++" | "--") {
            self.bump();
            let operand = self.unary()?;
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op: op.to_string(),
                    operand: Box::new(operand),
                },
                span: self.span_from(start),
            });
        }
        if self.at("(") && self.cast_ahead() {
            self.bump();
            let ty = self.type_ref()?;
            self.expect(")")?;
            let expr = self.unary()?;
            return Ok(Expr {
                kind: ExprKind::Cast {
                    ty,
                    expr: Box::new(expr),
                },
                span: self.span_from(start),
            });
        }
        self.postfix()
    }

    fn cast_ahead(&self) -> bool {
        let Some(after) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if self.text_at(after) != ")" {
            return false;
        }
        let next = after + 1;
        match self.tokens.get(next) {
            Some(token) if token.kind == TokenKind::Ident => self.text_at(next) != "instanceof",
            Some(token) if token.kind != TokenKind::Punct => true,
            Some(_) => matches!(self.text_at(next), "(" | "!" | "~"),
            None => false,
        }
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let start = self.start();
        let mut expr = self.primary()?;
        loop {
            match self.current() {
                "." => {
                    self.bump();
                    if self.at("<") {
                        self.skip_generics()?;
                    }
                    let name = self.ident()?;
                    expr = if self.at("(") {
                        let args = self.arguments()?;
                        Expr {
                            kind: ExprKind::Call {
                                target: Some(Box::new(expr)),
                                name,
                                args,
                            },
                            span: self.span_from(start),
                        }
                    } else {
                        Expr {
                            kind: ExprKind::Field {
                                target: Box::new(expr),
                                name,
                            },
                            span: self.span_from(start),
                        }
                    };
                }
                "[" => {
                    self.skip_group()?;
                    expr = Expr {
                        kind: ExprKind::Other,
                        span: self.span_from(start),
                    };
                }
                "++" | "--" => {
                    let op = self.current().to_string();
                    self.bump();
                    expr = Expr {
                        kind: ExprKind::Unary {
                            op,
                            operand: Box::new(expr),
                        },
                        span: self.span_from(start),
                    };
                }
                "::" => {
                    self.bump();
                    self.bump();
                    expr = Expr {
                        kind: ExprKind::Other,
                        span: self.span_from(start),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let start = self.start();
        let Some(token) = self.peek_at(0) else {
            return Err(self.error("expected expression, found end of file"));
        };
        let text = self.current();
        let kind = match token.kind {
            TokenKind::Number | TokenKind::Str | TokenKind::Char => {
                self.bump();
                ExprKind::Literal(text.to_string())
            }
            TokenKind::Punct => match text {
                "(" => {
                    self.bump();
                    let inner = self.expr()?;
                    self.expect(")")?;
                    ExprKind::Paren(Box::new(inner))
                }
                "{" => {
                    self.skip_group()?;
                    ExprKind::Other
                }
                _ => return Err(self.error(format!("expected expression, found `{text}`"))),
            },
            TokenKind::Ident => match text {
                "true" | "false" => {
                    self.bump();
                    ExprKind::Literal(text.to_string())
                }
                "null" => {
                    self.bump();
                    ExprKind::Null
                }
                "this" if self.text_at(self.pos + 1) != "(" => {
                    self.bump();
                    ExprKind::This
                }
                "new" => return self.new_expr(),
                _ => {
                    let name = self.ident()?;
                    if self.at("(") {
                        let args = self.arguments()?;
                        ExprKind::Call {
                            target: None,
                            name,
                            args,
                        }
                    } else {
                        ExprKind::Name(name.text)
                    }
                }
            },
        };
        Ok(Expr {
            kind,
            span: self.span_from(start),
        })
    }

    fn new_expr(&mut self) -> PResult<Expr> {
        let start = self.start();
        self.expect("new")?;
        let ty_start = self.start();
        let (name, _) = self.qualified_name()?;
        if self.at("<") {
            self.skip_generics()?;
        }
        let ty = TypeRef {
            name,
            array_dims: 0,
            span: self.span_from(ty_start),
        };
        if self.at("[") {
            while self.at("[") {
                self.skip_group()?;
            }
            if self.at("{") {
                self.skip_group()?;
            }
            return Ok(Expr {
                kind: ExprKind::Other,
                span: self.span_from(start),
            });
        }
        let args = self.arguments()?;
        let body = if self.at("{") {
            Some(self.skip_group()?)
        } else {
            None
        };
        Ok(Expr {
            kind: ExprKind::New { ty, args, body },
            span: self.span_from(start),
        })
    }

    fn arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect("(")?;
        let mut args = Vec::new();
        if self.at(")") {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.at(",") {
                self.bump();
                continue;
            }
            self.expect(")")?;
            return Ok(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &str = r#"package demo;

import javax.swing.*;
import java.awt.BorderLayout;

public class MainFrame extends JFrame {
    private JPanel panel;
    private static final long serialVersionUID = 1L;

    public MainFrame() {
        panel = new JPanel();
        getContentPane().add(panel, BorderLayout.CENTER);
        JButton button = new JButton("OK");
        button.setEnabled(count > 0 && !busy);
        panel.add(button);
        for (int i = 0; i < 3; i++) { panel.add(new JLabel()); }
    }

    private JLabel getLabel() {
        if (label == null) {
            label = new JLabel();
        }
        return label;
    }
}
"#;

    fn class(source: &str) -> ClassDecl {
        parse(source).unwrap().class.unwrap()
    }

    #[test]
    fn test_header() {
        let unit = parse(FRAME).unwrap();
        assert_eq!(unit.package.as_deref(), Some("demo"));
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[0].wildcard);
        assert_eq!(unit.imports[0].path, "javax.swing");
        assert_eq!(unit.imports[1].path, "java.awt.BorderLayout");
    }

    #[test]
    fn test_members() {
        let class = class(FRAME);
        assert_eq!(class.name.text, "MainFrame");
        assert_eq!(class.superclass.as_ref().map(|t| t.name.as_str()), Some("JFrame"));
        assert_eq!(class.fields().count(), 2);
        let ctor = class.method("MainFrame").unwrap();
        assert!(ctor.is_constructor());
        assert_eq!(ctor.body.as_ref().unwrap().statements.len(), 6);
        assert!(class.method("getLabel").is_some());
        assert_eq!(&FRAME[class.body.range()][..1], "{");
    }

    #[test]
    fn test_statement_shapes() {
        let class = class(FRAME);
        let body = class.method("MainFrame").unwrap().body.clone().unwrap();
        let kinds: Vec<_> = body.statements.iter().map(|s| &s.kind).collect();

        assert!(matches!(kinds[0], StmtKind::Expr(Expr { kind: ExprKind::Assign { .. }, .. })));
        match kinds[2] {
            StmtKind::Local { ty, name, init } => {
                assert_eq!(ty.name, "JButton");
                assert_eq!(name.text, "button");
                assert!(matches!(init.as_ref().unwrap().kind, ExprKind::New { .. }));
            }
            other => panic!("expected local, got {other:?}"),
        }
        assert!(matches!(kinds[5], StmtKind::Other));
        assert_eq!(
            &FRAME[body.statements[5].span.range()],
            "for (int i = 0; i < 3; i++) { panel.add(new JLabel()); }"
        );
    }

    #[test]
    fn test_call_chain() {
        let class = class(FRAME);
        let body = class.method("MainFrame").unwrap().body.clone().unwrap();
        let StmtKind::Expr(expr) = &body.statements[1].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { target, name, args } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(name.text, "add");
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].dotted_name().as_deref(), Some("BorderLayout.CENTER"));
        let target = target.as_ref().unwrap();
        assert!(matches!(&target.kind, ExprKind::Call { target: None, name, .. } if name.text == "getContentPane"));
    }

    #[test]
    fn test_lazy_accessor_shape() {
        let class = class(FRAME);
        let body = class.method("getLabel").unwrap().body.clone().unwrap();
        assert_eq!(body.statements.len(), 2);
        let StmtKind::If { cond, then_branch, else_branch } = &body.statements[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(&cond.kind, ExprKind::Binary { op, .. } if op == "=="));
        assert!(matches!(then_branch.kind, StmtKind::Block(_)));
        assert!(else_branch.is_none());
        assert!(matches!(body.statements[1].kind, StmtKind::Return(Some(_))));
    }

    #[test]
    fn test_unknown_constructs_kept_verbatim() {
        let source = "class A { void m() { weird stuff here; x = 1; } int[] data = {1, 2}; }";
        let class = class(source);
        let body = class.method("m").unwrap().body.clone().unwrap();
        assert!(matches!(body.statements[0].kind, StmtKind::Other));
        assert_eq!(&source[body.statements[0].span.range()], "weird stuff here;");
        assert!(matches!(body.statements[1].kind, StmtKind::Expr(_)));
        assert_eq!(class.fields().count(), 1);
    }

    #[test]
    fn test_lambda_and_anonymous_class() {
        let source = r#"class A { void m() {
            b.addActionListener(e -> { run(); });
            c.addMouseListener(new MouseAdapter() { public void x() {} });
            Object o = (Object) b;
        } }"#;
        let class = class(source);
        let body = class.method("m").unwrap().body.clone().unwrap();
        assert_eq!(body.statements.len(), 3);
        let StmtKind::Expr(Expr { kind: ExprKind::Call { args, .. }, .. }) = &body.statements[1].kind else {
            panic!("expected call");
        };
        assert!(matches!(&args[0].kind, ExprKind::New { body: Some(_), .. }));
        let StmtKind::Local { init: Some(init), .. } = &body.statements[2].kind else {
            panic!("expected local");
        };
        assert!(matches!(init.kind, ExprKind::Cast { .. }));
    }

    #[test]
    fn test_generics() {
        let source = "class A { java.util.List<Map<String, Integer>> items = new ArrayList<>(); }";
        let field = class(source).field("items").cloned().unwrap();
        assert_eq!(field.ty.name, "java.util.List");
        assert!(matches!(field.init.unwrap().kind, ExprKind::New { ref ty, .. } if ty.name == "ArrayList"));
    }

    #[test]
    fn test_unbalanced_fails() {
        assert!(parse("class A { void m() { ").is_err());
    }
}
