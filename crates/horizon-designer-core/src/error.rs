//! Error types for the model tree.

/// Errors that can occur during model tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The node ID is invalid or the node has been destroyed.
    #[error("Invalid or destroyed node ID")]
    InvalidNodeId,
    /// Attempted to set a node as its own parent/ancestor.
    #[error("Cannot set a node as its own parent or ancestor")]
    CircularParentage,
    /// The tree already has a root node.
    #[error("The model tree already has a root node")]
    RootAlreadySet,
    /// The root node has no parent and cannot be given one.
    #[error("The root node cannot be attached to a parent")]
    RootIsDetached,
    /// A child index was outside the parent's child list.
    #[error("Child index {index} out of bounds for {len} children")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of children at the time of the request.
        len: usize,
    },
    /// The tree violates the single-parent invariant.
    #[error("Model tree integrity violated: {0}")]
    Integrity(String),
}

/// Result type for model tree operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
