//! Error types for source parsing and editing.

use crate::span::Span;

/// Result type alias for source editing.
pub type Result<T> = std::result::Result<T, MalformedEditError>;

/// The source text could not be tokenized or parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// What went wrong.
    pub message: String,
    /// Byte offset of the offending text.
    pub offset: usize,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, in characters.
    pub column: u32,
}

impl SyntaxError {
    /// Create a syntax error, computing line and column from `source`.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() as u32 + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count()) as u32
            + 1;
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }
}

/// A request to the source editor could not be honored.
///
/// The buffer is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEditError {
    /// The span reaches past the end of the buffer.
    #[error("Span {span:?} is out of bounds for a buffer of {len} bytes")]
    OutOfBounds { span: Span, len: usize },

    /// An offset falls inside a multi-byte character.
    #[error("Offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// The span ends before it starts.
    #[error("Span {span:?} ends before it starts")]
    InvertedSpan { span: Span },

    /// The edit would change text the designer must not touch.
    #[error("Edit at {span:?} touches protected region {region:?}")]
    ProtectedRegion { span: Span, region: Span },

    /// A statement-level request referenced something that is not there.
    #[error("Invalid edit target: {0}")]
    InvalidTarget(String),

    /// A transaction marker does not belong to the current journal.
    #[error("Unknown transaction marker {0}")]
    UnknownTransaction(usize),

    /// The buffer has to be parsed to place the edit, and it does not parse.
    #[error("Source does not parse: {0}")]
    Unparsable(#[from] SyntaxError),
}

impl MalformedEditError {
    /// Create an invalid target error.
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget(message.into())
    }
}
