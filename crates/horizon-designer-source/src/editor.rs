//! Rope-backed source editor.
//!
//! [`SourceEditor`] owns the text of one compilation unit. Every mutation
//! goes through [`SourceEditor::replace`], which validates the request,
//! records the replaced text in a journal and returns a [`TextEdit`] so
//! callers can refresh the spans they track. Journal entries make
//! transactions possible: [`rollback_to`](SourceEditor::rollback_to) undoes
//! every replacement made since a marker, restoring the text byte for byte.
//!
//! On top of `replace` sit the statement-level helpers the designer uses to
//! add, remove and move whole statements and class members while keeping
//! the surrounding layout intact.

use std::path::Path;
use std::sync::Arc;

use ropey::Rope;

use crate::error::{MalformedEditError, Result, SyntaxError};
use crate::span::{Relocation, Span, SpanMap, TextEdit};
use crate::syntax::{self, CompilationUnit};

/// The contract the designer needs from whoever owns the source text.
pub trait SourceProvider {
    /// Text covered by `span`.
    fn read(&self, span: Span) -> Result<String>;

    /// Replace `span` with `text`.
    fn replace(&mut self, span: Span, text: &str) -> Result<TextEdit>;

    /// Parse the current text.
    fn reparse(&mut self) -> std::result::Result<Arc<CompilationUnit>, SyntaxError>;
}

/// Where new statements go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementTarget {
    /// Before the statement at this span.
    Before(Span),
    /// After the statement at this span.
    After(Span),
    /// First in the block with this span (braces included).
    BlockStart(Span),
    /// Last in the block with this span (braces included).
    BlockEnd(Span),
}

/// Identifies a point in the edit journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionMarker(usize);

#[derive(Debug, Clone)]
struct JournalEntry {
    /// Where the replacement text lives after the edit.
    inserted: Span,
    /// The text it replaced.
    removed: String,
}

/// How inserted statements are laid out around the insertion point.
enum Layout {
    /// One statement per line.
    Lines {
        indent: String,
        lead: &'static str,
        trail: String,
    },
    /// Same line, each statement followed by a space.
    InlineBefore,
    /// Same line, each statement preceded by a space.
    InlineAfter,
}

struct Placement {
    at: usize,
    layout: Layout,
}

impl Placement {
    /// Build the inserted text and the span of each statement relative to `at`.
    fn render(&self, statements: &[String]) -> (String, Vec<Span>) {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(statements.len());
        let mut push = |text: &mut String, statement: &str| {
            spans.push(Span::new(text.len(), text.len() + statement.len()));
            text.push_str(statement);
        };
        match &self.layout {
            Layout::Lines {
                indent,
                lead,
                trail,
            } => {
                text.push_str(lead);
                for statement in statements {
                    text.push_str(indent);
                    push(&mut text, statement);
                    text.push('\n');
                }
                text.push_str(trail);
            }
            Layout::InlineBefore => {
                for statement in statements {
                    push(&mut text, statement);
                    text.push(' ');
                }
            }
            Layout::InlineAfter => {
                for statement in statements {
                    text.push(' ');
                    push(&mut text, statement);
                }
            }
        }
        (text, spans)
    }
}

/// A mutable source buffer with an undo journal.
pub struct SourceEditor {
    rope: Rope,
    journal: Vec<JournalEntry>,
    /// Open transactions; the journal is dropped when the outermost commits.
    depth: usize,
    protected: Vec<Span>,
    indent_unit: String,
    unit: Option<Arc<CompilationUnit>>,
}

impl SourceEditor {
    /// Create an editor over `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            journal: Vec::new(),
            depth: 0,
            protected: Vec::new(),
            indent_unit: "\t".to_string(),
            unit: None,
        }
    }

    /// Read a file into a new editor.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(&text))
    }

    /// Write the buffer to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.text())
    }

    /// Set the indentation added for each nesting level of generated code.
    pub fn set_indent_unit(&mut self, unit: impl Into<String>) {
        self.indent_unit = unit.into();
    }

    /// The indentation unit.
    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    /// The whole buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn validate(&self, span: Span) -> Result<()> {
        if span.start > span.end {
            return Err(MalformedEditError::InvertedSpan { span });
        }
        if span.end > self.len() {
            return Err(MalformedEditError::OutOfBounds {
                span,
                len: self.len(),
            });
        }
        for offset in [span.start, span.end] {
            if self.rope.char_to_byte(self.rope.byte_to_char(offset)) != offset {
                return Err(MalformedEditError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }

    fn check_protected(&self, span: Span) -> Result<()> {
        let touched = self.protected.iter().find(|region| {
            if span.is_empty() {
                region.start < span.start && span.start < region.end
            } else {
                span.overlaps(**region)
            }
        });
        match touched {
            Some(&region) => Err(MalformedEditError::ProtectedRegion { span, region }),
            None => Ok(()),
        }
    }

    /// Mark `span` as read-only for the designer.
    ///
    /// Protected regions follow later edits like any other span.
    pub fn protect(&mut self, span: Span) -> Result<()> {
        self.validate(span)?;
        self.protected.push(span);
        Ok(())
    }

    /// Current protected regions.
    pub fn protected_regions(&self) -> &[Span] {
        &self.protected
    }

    /// Drop all protected regions.
    pub fn clear_protection(&mut self) {
        self.protected.clear();
    }

    // =========================================================================
    // Primitive editing
    // =========================================================================

    fn slice(&self, start: usize, end: usize) -> String {
        let start = self.rope.byte_to_char(start);
        let end = self.rope.byte_to_char(end);
        self.rope.slice(start..end).to_string()
    }

    fn raw_replace(&mut self, span: Span, text: &str) -> (TextEdit, String) {
        let start = self.rope.byte_to_char(span.start);
        let end = self.rope.byte_to_char(span.end);
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.unit = None;

        let edit = TextEdit::new(span, text.len());
        self.protected = self
            .protected
            .iter()
            .filter_map(|region| edit.map_span(*region))
            .collect();
        (edit, removed)
    }

    /// Text covered by `span`.
    pub fn read(&self, span: Span) -> Result<String> {
        self.validate(span)?;
        Ok(self.slice(span.start, span.end))
    }

    /// Replace `span` with `text`, recording the change in the journal.
    pub fn replace(&mut self, span: Span, text: &str) -> Result<TextEdit> {
        self.validate(span)?;
        self.check_protected(span)?;
        let (edit, removed) = self.raw_replace(span, text);
        tracing::trace!(
            target: "horizon_designer_source",
            range = ?span, inserted = text.len(),
            "replaced source text"
        );
        self.journal.push(JournalEntry {
            inserted: edit.new_range(),
            removed,
        });
        Ok(edit)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Start a transaction; pass the marker to `rollback_to` or `commit`.
    ///
    /// Transactions nest: an inner commit keeps its entries so an outer
    /// rollback can still undo them.
    pub fn begin_transaction(&mut self) -> TransactionMarker {
        self.depth += 1;
        TransactionMarker(self.journal.len())
    }

    /// Undo every replacement made since `marker`, newest first.
    pub fn rollback_to(&mut self, marker: TransactionMarker) -> Result<()> {
        if marker.0 > self.journal.len() {
            return Err(MalformedEditError::UnknownTransaction(marker.0));
        }
        let undone = self.journal.len() - marker.0;
        while self.journal.len() > marker.0 {
            if let Some(entry) = self.journal.pop() {
                self.raw_replace(entry.inserted, &entry.removed);
            }
        }
        self.depth = self.depth.saturating_sub(1);
        tracing::debug!(target: "horizon_designer_source", undone, "rolled back source edits");
        Ok(())
    }

    /// Close the transaction started at `marker`.
    ///
    /// When no outer transaction remains open the journal is cleared.
    pub fn commit(&mut self, marker: TransactionMarker) -> Result<()> {
        if marker.0 > self.journal.len() {
            return Err(MalformedEditError::UnknownTransaction(marker.0));
        }
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
        Ok(())
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    /// Parse the current text, reusing the last parse if nothing changed.
    pub fn reparse(&mut self) -> std::result::Result<Arc<CompilationUnit>, SyntaxError> {
        if let Some(unit) = &self.unit {
            return Ok(unit.clone());
        }
        let unit = Arc::new(syntax::parse(&self.text())?);
        self.unit = Some(unit.clone());
        Ok(unit)
    }

    // =========================================================================
    // Line helpers
    // =========================================================================

    fn line_start(&self, offset: usize) -> usize {
        self.rope.line_to_byte(self.rope.byte_to_line(offset))
    }

    /// Start of the line after the one containing `offset`, or the end of the buffer.
    fn next_line_start(&self, offset: usize) -> usize {
        let line = self.rope.byte_to_line(offset);
        if line + 1 < self.rope.len_lines() {
            self.rope.line_to_byte(line + 1)
        } else {
            self.len()
        }
    }

    /// End of the line containing `offset`, before its line break.
    fn line_end(&self, offset: usize) -> usize {
        let next = self.next_line_start(offset);
        let line = self.slice(self.line_start(offset), next);
        let content = line.trim_end_matches(['\n', '\r']);
        self.line_start(offset) + content.len()
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation(&self, offset: usize) -> String {
        let start = self.line_start(offset);
        self.slice(start, self.line_end(offset))
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn is_blank(&self, start: usize, end: usize) -> bool {
        start >= end || self.slice(start, end).chars().all(char::is_whitespace)
    }

    /// Whether nothing but whitespace shares the lines of `span`.
    pub fn stands_alone(&self, span: Span) -> bool {
        self.is_blank(self.line_start(span.start), span.start)
            && self.is_blank(span.end, self.line_end(span.end))
    }

    /// The text to delete when removing the statement at `span`.
    fn removal_range(&self, span: Span) -> Span {
        if self.stands_alone(span) {
            return Span::new(self.line_start(span.start), self.next_line_start(span.end));
        }
        let trailing = self
            .slice(span.end, self.line_end(span.end))
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .count();
        Span::new(span.start, span.end + trailing)
    }

    fn placement(&self, target: StatementTarget) -> Result<Placement> {
        let placement = match target {
            StatementTarget::Before(span) => {
                self.validate(span)?;
                if self.stands_alone(span) {
                    Placement {
                        at: self.line_start(span.start),
                        layout: Layout::Lines {
                            indent: self.indentation(span.start),
                            lead: "",
                            trail: String::new(),
                        },
                    }
                } else {
                    Placement {
                        at: span.start,
                        layout: Layout::InlineBefore,
                    }
                }
            }
            StatementTarget::After(span) => {
                self.validate(span)?;
                if self.stands_alone(span) {
                    let at = self.next_line_start(span.end);
                    let at_eof_without_newline = at == self.line_end(span.end);
                    Placement {
                        at,
                        layout: Layout::Lines {
                            indent: self.indentation(span.start),
                            lead: if at_eof_without_newline { "\n" } else { "" },
                            trail: String::new(),
                        },
                    }
                } else {
                    Placement {
                        at: span.end,
                        layout: Layout::InlineAfter,
                    }
                }
            }
            StatementTarget::BlockStart(block) => {
                self.expect_braces(block)?;
                let base = self.indentation(block.start);
                let indent = format!("{base}{}", self.indent_unit);
                let open_end = block.start + 1;
                if self.is_blank(open_end, self.line_end(open_end)) {
                    Placement {
                        at: self.next_line_start(open_end),
                        layout: Layout::Lines {
                            indent,
                            lead: "",
                            trail: String::new(),
                        },
                    }
                } else {
                    Placement {
                        at: open_end,
                        layout: Layout::Lines {
                            indent,
                            lead: "\n",
                            trail: base,
                        },
                    }
                }
            }
            StatementTarget::BlockEnd(block) => {
                self.expect_braces(block)?;
                let close = block.end - 1;
                if close > block.start && self.is_blank(self.line_start(close), close) {
                    Placement {
                        at: self.line_start(close),
                        layout: Layout::Lines {
                            indent: format!("{}{}", self.indentation(close), self.indent_unit),
                            lead: "",
                            trail: String::new(),
                        },
                    }
                } else {
                    let base = self.indentation(block.start);
                    Placement {
                        at: close,
                        layout: Layout::Lines {
                            indent: format!("{base}{}", self.indent_unit),
                            lead: "\n",
                            trail: base,
                        },
                    }
                }
            }
        };
        Ok(placement)
    }

    fn expect_braces(&self, block: Span) -> Result<()> {
        self.validate(block)?;
        let text = self.slice(block.start, block.end);
        if text.starts_with('{') && text.ends_with('}') && text.len() >= 2 {
            Ok(())
        } else {
            Err(MalformedEditError::invalid_target(format!(
                "{block:?} is not a braced block"
            )))
        }
    }

    // =========================================================================
    // Statement editing
    // =========================================================================

    /// Insert statements at `target`, copying the surrounding indentation.
    ///
    /// Returns the span map of the edit and the span of each new statement.
    pub fn insert_statements(
        &mut self,
        target: StatementTarget,
        statements: &[String],
    ) -> Result<(SpanMap, Vec<Span>)> {
        let placement = self.placement(target)?;
        let (text, relative) = placement.render(statements);
        let edit = self.replace(Span::empty(placement.at), &text)?;
        let spans = relative
            .iter()
            .map(|r| Span::new(placement.at + r.start, placement.at + r.end))
            .collect();
        Ok((edit.into(), spans))
    }

    /// Remove the statement at `span`, together with its line when it stands alone.
    pub fn remove_statement(&mut self, span: Span) -> Result<SpanMap> {
        self.validate(span)?;
        let range = self.removal_range(span);
        Ok(self.replace(range, "")?.into())
    }

    /// Move statements to `target` verbatim, in the given order.
    ///
    /// Fragments inside the moved statements follow them; the returned spans
    /// are the statements' new locations.
    pub fn relocate_statements(
        &mut self,
        spans: &[Span],
        target: StatementTarget,
    ) -> Result<(SpanMap, Vec<Span>)> {
        let mut texts = Vec::with_capacity(spans.len());
        for span in spans {
            texts.push(self.read(*span)?);
        }
        let placement = self.placement(target)?;
        let mut removals: Vec<Span> = spans.iter().map(|s| self.removal_range(*s)).collect();
        if let Some(inside) = removals
            .iter()
            .find(|r| r.start < placement.at && placement.at < r.end)
        {
            return Err(MalformedEditError::invalid_target(format!(
                "cannot move statements into themselves at {inside:?}"
            )));
        }
        removals.sort();

        let (text, relative) = placement.render(&texts);
        let mut map = SpanMap::new();
        let insert = self.replace(Span::empty(placement.at), &text)?;
        map.push_edit(insert);
        let mut moved: Vec<Option<Span>> = relative
            .iter()
            .map(|r| Some(Span::new(placement.at + r.start, placement.at + r.end)))
            .collect();

        for removal in removals.iter().rev() {
            let current = insert.map_span(*removal).ok_or_else(|| {
                MalformedEditError::invalid_target(format!("{removal:?} overlaps the insertion"))
            })?;
            let edit = self.replace(current, "")?;
            map.push_edit(edit);
            for span in &mut moved {
                *span = span.and_then(|s| edit.map_span(s));
            }
        }

        let mut result = Vec::with_capacity(spans.len());
        for (from, to) in spans.iter().zip(moved) {
            let to = to.ok_or_else(|| {
                MalformedEditError::invalid_target(format!("overlapping statements at {from:?}"))
            })?;
            map.push_relocation(Relocation {
                from: *from,
                to: to.start,
            });
            result.push(to);
        }
        tracing::trace!(target: "horizon_designer_source", count = spans.len(), "relocated statements");
        Ok((map, result))
    }

    // =========================================================================
    // Member editing
    // =========================================================================

    /// Add a field declaration after the last field of the class.
    pub fn insert_field(&mut self, declaration: &str) -> Result<(SpanMap, Span)> {
        let unit = self.reparse()?;
        let class = unit
            .class
            .as_ref()
            .ok_or_else(|| MalformedEditError::invalid_target("no class to add a field to"))?;
        let target = match class.fields().last() {
            Some(field) => StatementTarget::After(field.span),
            None => StatementTarget::BlockStart(class.body),
        };
        let (map, spans) = self.insert_statements(target, &[declaration.to_string()])?;
        let span = spans
            .first()
            .copied()
            .ok_or_else(|| MalformedEditError::invalid_target("field was not inserted"))?;
        Ok((map, span))
    }

    /// Add a method before the closing brace of the class.
    ///
    /// `method` uses the indentation unit for its own nesting, starting at
    /// column zero.
    pub fn insert_method(&mut self, method: &str) -> Result<(SpanMap, Span)> {
        let unit = self.reparse()?;
        let class = unit
            .class
            .as_ref()
            .ok_or_else(|| MalformedEditError::invalid_target("no class to add a method to"))?;
        let close = class.body.end - 1;
        let indent = format!("{}{}", self.indentation(class.body.start), self.indent_unit);
        let indented = method
            .lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let (at, text, offset) = if close > class.body.start && self.is_blank(self.line_start(close), close) {
            (self.line_start(close), format!("\n{indented}\n"), 1)
        } else {
            (close, format!("\n\n{indented}\n"), 2)
        };
        let edit = self.replace(Span::empty(at), &text)?;
        let start = at + offset + indent.len();
        Ok((edit.into(), Span::new(start, at + offset + indented.len())))
    }

    /// Remove a class member with its line and a blank line above it.
    pub fn remove_member(&mut self, span: Span) -> Result<SpanMap> {
        self.validate(span)?;
        let mut range = self.removal_range(span);
        if range.start == self.line_start(span.start) && range.start > 0 {
            let previous = self.line_start(range.start - 1);
            if self.is_blank(previous, range.start) {
                range.start = previous;
            }
        }
        Ok(self.replace(range, "")?.into())
    }

    /// Make `qualified` importable by its simple name.
    ///
    /// Returns `None` when nothing had to change.
    pub fn ensure_import(&mut self, qualified: &str) -> Result<Option<SpanMap>> {
        let Some((package, simple)) = qualified.rsplit_once('.') else {
            return Ok(None);
        };
        if package == "java.lang" {
            return Ok(None);
        }
        let unit = self.reparse()?;
        if unit.package.as_deref() == Some(package) {
            return Ok(None);
        }
        for import in unit.imports.iter().filter(|i| !i.is_static) {
            if (import.wildcard && import.path == package) || import.path == qualified {
                return Ok(None);
            }
            if !import.wildcard && import.path.rsplit('.').next() == Some(simple) {
                tracing::warn!(
                    target: "horizon_designer_source",
                    qualified, existing = %import.path,
                    "simple name already imported from another package"
                );
                return Ok(None);
            }
        }

        let statement = format!("import {qualified};");
        let map = if let Some(last) = unit.imports.last() {
            self.insert_statements(StatementTarget::After(last.span), &[statement])?
                .0
        } else if let Some(package_span) = unit.package_span {
            let at = self.next_line_start(package_span.end);
            self.replace(Span::empty(at), &format!("\n{statement}\n"))?
                .into()
        } else {
            self.replace(Span::empty(0), &format!("{statement}\n\n"))?
                .into()
        };
        tracing::debug!(target: "horizon_designer_source", qualified, "added import");
        Ok(Some(map))
    }
}

impl SourceProvider for SourceEditor {
    fn read(&self, span: Span) -> Result<String> {
        SourceEditor::read(self, span)
    }

    fn replace(&mut self, span: Span, text: &str) -> Result<TextEdit> {
        SourceEditor::replace(self, span, text)
    }

    fn reparse(&mut self) -> std::result::Result<Arc<CompilationUnit>, SyntaxError> {
        SourceEditor::reparse(self)
    }
}

impl std::fmt::Debug for SourceEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEditor")
            .field("len", &self.len())
            .field("journal", &self.journal.len())
            .field("protected", &self.protected)
            .finish()
    }
}
