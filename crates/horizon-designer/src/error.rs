//! Error types for the designer.
//!
//! Each failure family has its own enum so callers can match on exactly what
//! went wrong; [`DesignerError`] gathers them for functions that can fail in
//! more than one way.

use std::path::PathBuf;

use horizon_designer_core::{ModelError, NodeId};
use horizon_designer_source::{MalformedEditError, Span, SyntaxError};

/// Result type alias for designer operations.
pub type DesignerResult<T> = Result<T, DesignerError>;

/// A construct in the source could not be turned into a model node.
///
/// Most of these are reported as [bad nodes](crate::BadNode) and parsing
/// continues; only the structural ones abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The file declares no class.
    #[error("No class declaration found")]
    NoClass,

    /// The class has no constructor and no recognized entry method.
    #[error("Class '{class}' has no entry point")]
    NoEntryPoint { class: String },

    /// Nothing in the entry point builds a described component.
    #[error("No root component found in '{class}'")]
    NoRoot { class: String },

    /// A component of a type the descriptors do not know is used structurally.
    #[error("Unknown component type '{type_name}'")]
    UnknownType { type_name: String },

    /// A component is added to something that could not be resolved.
    #[error("Cannot resolve the receiver of '{text}'")]
    UnresolvedReceiver { text: String },

    /// An association argument could not be resolved.
    #[error("Cannot resolve the component passed in '{text}'")]
    UnresolvedArgument { text: String },
}

/// A requested tree edit is not structurally valid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralEditError {
    /// The node does not belong to this session's tree.
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    /// The target slot already holds a child.
    #[error("Slot of {parent:?} is already occupied by {occupant:?}")]
    SlotOccupied { parent: NodeId, occupant: NodeId },

    /// The parent cannot hold children at all.
    #[error("'{type_name}' is not a container")]
    NotAContainer { type_name: String },

    /// The parent has containers, but none accepts this child type.
    #[error("'{parent_type}' does not accept children of type '{child_type}'")]
    NotAccepted {
        parent_type: String,
        child_type: String,
    },

    /// The index is outside the positions the parent allows.
    #[error("Index {index} is invalid, expected {min}..={max}")]
    InvalidIndex {
        index: usize,
        min: usize,
        max: usize,
    },

    /// The move would make a node its own ancestor.
    #[error("Cannot move {node:?} under its own descendant {parent:?}")]
    Cycle { node: NodeId, parent: NodeId },

    /// Code cannot refer to this node, so nothing can be added to it.
    #[error("Node {0:?} has no source reference")]
    NoReference(NodeId),

    /// The name is already taken in the class.
    #[error("Name '{0}' is already in use")]
    NameInUse(String),

    /// The name is not a valid identifier.
    #[error("'{0}' is not a valid identifier")]
    InvalidName(String),

    /// The node's variable cannot undergo this edit.
    #[error("Unsupported variable edit: {0}")]
    UnsupportedVariable(String),

    /// The permutation passed to reorder does not match the children.
    #[error("New order must be a permutation of the movable children of {0:?}")]
    NotAPermutation(NodeId),

    /// A remembered source position no longer exists.
    #[error("Source for {0} is gone")]
    StaleFragment(&'static str),

    /// The source editor refused an edit; nothing was changed.
    #[error("Source edit rejected: {0}")]
    SourceRejected(#[source] MalformedEditError),
}

impl From<MalformedEditError> for StructuralEditError {
    fn from(err: MalformedEditError) -> Self {
        Self::SourceRejected(err)
    }
}

/// A node's strategies do not allow the requested edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    /// The root stays where it is.
    #[error("The root component cannot be {0}")]
    Root(&'static str),

    #[error("{node:?} cannot be deleted: {reason}")]
    NotDeletable { node: NodeId, reason: &'static str },

    #[error("{node:?} cannot be reordered: {reason}")]
    NotReorderable { node: NodeId, reason: &'static str },

    #[error("{node:?} cannot be moved to another parent: {reason}")]
    NotReparentable { node: NodeId, reason: &'static str },
}

/// Component descriptions could not be loaded or do not cover a request.
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    /// The descriptor file is not valid TOML for the schema.
    #[error("Invalid descriptor set '{origin}': {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read descriptor set '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Descriptor set '{origin}' has unsupported version {version}")]
    UnsupportedVersion { origin: String, version: u32 },

    #[error("Type '{0}' is described more than once")]
    DuplicateType(String),

    #[error("Type '{type_name}' extends undescribed type '{parent}'")]
    UnknownParent { type_name: String, parent: String },

    #[error("Inheritance cycle through '{0}'")]
    InheritanceCycle(String),

    #[error("Invalid template '{template}': {message}")]
    Template { template: String, message: String },

    #[error("Type '{0}' is not described")]
    UnknownType(String),

    #[error("Type '{type_name}' has no creation '{id}'")]
    UnknownCreation { type_name: String, id: String },

    #[error("Type '{type_name}' has no factory method '{method}'")]
    UnknownFactory { type_name: String, method: String },
}

/// Session configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid session configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to read session configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session configuration: {0}")]
    Invalid(String),
}

/// Any designer failure.
#[derive(Debug, thiserror::Error)]
pub enum DesignerError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    MalformedEdit(#[from] MalformedEditError),

    #[error(transparent)]
    StructuralEdit(#[from] StructuralEditError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turn editor failures inside an operation into [`StructuralEditError::SourceRejected`].
pub(crate) trait SourceResultExt<T> {
    fn rejected(self) -> DesignerResult<T>;
}

impl<T> SourceResultExt<T> for Result<T, MalformedEditError> {
    fn rejected(self) -> DesignerResult<T> {
        self.map_err(|err| StructuralEditError::SourceRejected(err).into())
    }
}

/// Resolve a fragment that must still be attached.
pub(crate) fn live(span: Option<Span>, what: &'static str) -> DesignerResult<Span> {
    span.ok_or_else(|| StructuralEditError::StaleFragment(what).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_rejection_is_structural() {
        let err: DesignerResult<()> =
            Err(MalformedEditError::invalid_target("nowhere")).rejected();
        match err {
            Err(DesignerError::StructuralEdit(StructuralEditError::SourceRejected(inner))) => {
                assert!(inner.to_string().contains("nowhere"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_messages() {
        let err = StructuralEditError::InvalidIndex {
            index: 4,
            min: 0,
            max: 2,
        };
        assert_eq!(err.to_string(), "Index 4 is invalid, expected 0..=2");
        let err = DescriptionError::UnknownType("a.B".into());
        assert_eq!(err.to_string(), "Type 'a.B' is not described");
    }
}
