//! How a component instance comes to exist.

use horizon_designer_source::{Fragment, SpanMap};

/// A component that exists without a creation expression of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplicitKind {
    /// The class being designed, as `this`.
    This,
    /// Returned by an accessor of its parent, e.g. `getContentPane()`.
    Exposed { accessor: String },
}

/// The creation strategy of a node.
///
/// Fragments point at the creation expression; it lives inside the
/// statement that declares or assigns the variable, or inside the
/// association for inline children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationSupport {
    /// `new Type(args)`.
    Constructor {
        expression: Fragment,
        /// The argument that names the parent, when the constructor takes one.
        parent_argument: Option<Fragment>,
    },
    /// `Declaring.method(args)`.
    StaticFactory {
        expression: Fragment,
        factory: String,
        method: String,
    },
    /// `receiver.method(args)` on another component.
    InstanceFactory {
        expression: Fragment,
        method: String,
    },
    /// Built inside a `getX()` accessor that creates the instance on first use.
    LazyAccessor {
        accessor: String,
        expression: Fragment,
    },
    Implicit(ImplicitKind),
    /// Any other expression yielding a described type.
    Opaque { expression: Fragment },
}

impl CreationSupport {
    /// Whether deleting the node is allowed.
    pub fn can_delete(&self) -> bool {
        !matches!(self, Self::Implicit(_))
    }

    /// Whether the node may change position among its siblings.
    pub fn can_reorder(&self) -> bool {
        !matches!(self, Self::Implicit(_) | Self::Opaque { .. })
    }

    /// Whether the node may move to another parent.
    pub fn can_reparent(&self) -> bool {
        !matches!(self, Self::Implicit(_) | Self::Opaque { .. })
    }

    /// Why the node cannot be edited, for error messages.
    pub(crate) fn restriction(&self) -> &'static str {
        match self {
            Self::Implicit(ImplicitKind::This) => "it is the designed class itself",
            Self::Implicit(ImplicitKind::Exposed { .. }) => "it is exposed by its parent",
            Self::Opaque { .. } => "its creation is not understood",
            _ => "",
        }
    }

    /// The creation expression, if there is one.
    pub fn expression(&self) -> Option<&Fragment> {
        match self {
            Self::Constructor { expression, .. }
            | Self::StaticFactory { expression, .. }
            | Self::InstanceFactory { expression, .. }
            | Self::LazyAccessor { expression, .. }
            | Self::Opaque { expression } => Some(expression),
            Self::Implicit(_) => None,
        }
    }

    /// The parent argument of a constructor creation.
    pub fn parent_argument(&self) -> Option<&Fragment> {
        match self {
            Self::Constructor {
                parent_argument, ..
            } => parent_argument.as_ref(),
            _ => None,
        }
    }

    /// Whether this is [`CreationSupport::Implicit`].
    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit(_))
    }

    /// The accessor of an exposed node.
    pub fn exposed_accessor(&self) -> Option<&str> {
        match self {
            Self::Implicit(ImplicitKind::Exposed { accessor }) => Some(accessor),
            _ => None,
        }
    }

    pub(crate) fn apply(&mut self, map: &SpanMap) {
        match self {
            Self::Constructor {
                expression,
                parent_argument,
            } => {
                expression.apply(map);
                if let Some(argument) = parent_argument {
                    argument.apply(map);
                }
            }
            Self::StaticFactory { expression, .. }
            | Self::InstanceFactory { expression, .. }
            | Self::LazyAccessor { expression, .. }
            | Self::Opaque { expression } => expression.apply(map),
            Self::Implicit(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_designer_source::Span;

    use super::*;

    #[test]
    fn test_capabilities() {
        let constructor = CreationSupport::Constructor {
            expression: Fragment::new(Span::new(0, 5)),
            parent_argument: None,
        };
        assert!(constructor.can_delete() && constructor.can_reorder() && constructor.can_reparent());

        let opaque = CreationSupport::Opaque {
            expression: Fragment::new(Span::new(0, 5)),
        };
        assert!(opaque.can_delete());
        assert!(!opaque.can_reorder() && !opaque.can_reparent());

        let exposed = CreationSupport::Implicit(ImplicitKind::Exposed {
            accessor: "getContentPane".into(),
        });
        assert!(!exposed.can_delete() && !exposed.can_reorder() && !exposed.can_reparent());
        assert_eq!(exposed.exposed_accessor(), Some("getContentPane"));
        assert!(exposed.expression().is_none());
    }
}
