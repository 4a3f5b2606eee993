//! Bad nodes: source constructs the model could not represent.

use std::sync::Arc;

use horizon_designer_core::logging::targets;
use horizon_designer_source::Span;
use parking_lot::Mutex;

use crate::error::ParseError;

/// A construct left out of the model, with where it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadNode {
    pub span: Span,
    pub error: ParseError,
}

/// Receives bad nodes as the parser finds them.
pub trait DiagnosticsSink: Send {
    fn report(&mut self, bad: &BadNode);
}

impl DiagnosticsSink for Vec<BadNode> {
    fn report(&mut self, bad: &BadNode) {
        self.push(bad.clone());
    }
}

/// Logs each bad node as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&mut self, bad: &BadNode) {
        tracing::warn!(
            target: targets::PARSER,
            span = ?bad.span,
            error = %bad.error,
            "component left out of the model"
        );
    }
}

/// A sink whose reports can be read from another handle.
#[derive(Debug, Default, Clone)]
pub struct SharedDiagnostics {
    inner: Arc<Mutex<Vec<BadNode>>>,
}

impl SharedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far.
    pub fn snapshot(&self) -> Vec<BadNode> {
        self.inner.lock().clone()
    }

    /// Forget all reports.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl DiagnosticsSink for SharedDiagnostics {
    fn report(&mut self, bad: &BadNode) {
        self.inner.lock().push(bad.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_sink() {
        let shared = SharedDiagnostics::new();
        let mut sink: Box<dyn DiagnosticsSink> = Box::new(shared.clone());
        sink.report(&BadNode {
            span: Span::new(3, 9),
            error: ParseError::UnknownType {
                type_name: "Mystery".into(),
            },
        });
        assert_eq!(shared.snapshot().len(), 1);
        shared.clear();
        assert!(shared.snapshot().is_empty());
    }
}
