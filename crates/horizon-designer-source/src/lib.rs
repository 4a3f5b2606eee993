//! Source text services for Horizon Designer.
//!
//! This crate owns everything the designer knows about text:
//!
//! - **Spans**: [`Span`], [`TextEdit`], [`SpanMap`] and [`Fragment`], the
//!   bookkeeping that keeps remembered positions valid while the text changes
//! - **Syntax**: a tokenizer and lenient parser for the Java subset GUI code
//!   is written in, producing a span-carrying [`CompilationUnit`]
//! - **Editor**: [`SourceEditor`], a rope-backed buffer with protected
//!   regions, an undo journal for transactions and statement-level helpers
//!
//! # Example
//!
//! ```
//! use horizon_designer_source::{Fragment, SourceEditor, StatementTarget};
//!
//! let mut editor = SourceEditor::new("class A {\n\tvoid m() {\n\t\ta();\n\t}\n}\n");
//! let unit = editor.reparse().unwrap();
//! let body = unit.class.as_ref().unwrap().method("m").unwrap().body.clone().unwrap();
//! let mut call = Fragment::new(body.statements[0].span);
//!
//! let (map, _) = editor
//!     .insert_statements(StatementTarget::BlockStart(body.span), &["b();".to_string()])
//!     .unwrap();
//! call.apply(&map);
//! assert_eq!(editor.read(call.get().unwrap()).unwrap(), "a();");
//! ```

mod editor;
mod error;
pub mod span;
pub mod syntax;

pub use editor::{SourceEditor, SourceProvider, StatementTarget, TransactionMarker};
pub use error::{MalformedEditError, Result, SyntaxError};
pub use span::{Fragment, Relocation, Span, SpanMap, TextEdit};
pub use syntax::CompilationUnit;
