//! How a child is attached to its parent.

use horizon_designer_source::{Fragment, SpanMap};

use crate::description::InvocationTemplate;

/// The association strategy of a non-root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    /// A statement `parent.method(.., child, ..)`.
    Invocation {
        statement: Fragment,
        template: InvocationTemplate,
    },
    /// The parent is passed to the child's constructor.
    ConstructorArgument { argument: Fragment },
    /// Nothing in the code attaches the child.
    Implicit,
    /// A constructor argument and an invocation together.
    Compound {
        argument: Fragment,
        statement: Fragment,
        template: InvocationTemplate,
    },
}

impl Association {
    /// The association statement, if the association has one.
    pub fn statement(&self) -> Option<&Fragment> {
        match self {
            Self::Invocation { statement, .. } | Self::Compound { statement, .. } => {
                Some(statement)
            }
            Self::ConstructorArgument { .. } | Self::Implicit => None,
        }
    }

    /// The constructor argument naming the parent, if any.
    pub fn argument(&self) -> Option<&Fragment> {
        match self {
            Self::ConstructorArgument { argument } | Self::Compound { argument, .. } => {
                Some(argument)
            }
            Self::Invocation { .. } | Self::Implicit => None,
        }
    }

    /// The invocation template, if any.
    pub fn template(&self) -> Option<&InvocationTemplate> {
        match self {
            Self::Invocation { template, .. } | Self::Compound { template, .. } => Some(template),
            Self::ConstructorArgument { .. } | Self::Implicit => None,
        }
    }

    /// Whether this is [`Association::Implicit`].
    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit)
    }

    pub(crate) fn apply(&mut self, map: &SpanMap) {
        match self {
            Self::Invocation { statement, .. } => statement.apply(map),
            Self::ConstructorArgument { argument } => argument.apply(map),
            Self::Compound {
                argument,
                statement,
                ..
            } => {
                argument.apply(map);
                statement.apply(map);
            }
            Self::Implicit => {}
        }
    }
}
