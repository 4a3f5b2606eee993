//! How code refers to a component.

use horizon_designer_source::{Fragment, Span, SpanMap};
use serde::Deserialize;

/// Variable shapes a created component can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// A local variable in the building method.
    #[default]
    Local,
    /// A field assigned in the building method.
    Field,
    /// A field with a `getX()` accessor that creates it on first use.
    Lazy,
}

/// How a component without a variable is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymousAccess {
    /// The designed class itself.
    This,
    /// Through an accessor on the parent.
    Exposed { accessor: String },
    /// Created inline as an argument; code cannot refer to it.
    Inline,
    /// Created by a statement of its own whose value is discarded.
    Standalone { statement: Fragment },
}

/// The variable strategy of a node.
///
/// Name fragments cover identifiers only, so renaming replaces exactly
/// those spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableSupport {
    Local {
        name: String,
        /// The whole declaration statement.
        declaration: Fragment,
        /// The declared type and the whitespace after it.
        type_prefix: Fragment,
        name_span: Fragment,
        references: Vec<Fragment>,
    },
    Field {
        name: String,
        /// The field declaration member.
        field: Fragment,
        field_name: Fragment,
        /// The `name = ...;` statement.
        assignment: Fragment,
        references: Vec<Fragment>,
    },
    Lazy {
        name: String,
        field: Fragment,
        field_name: Fragment,
        accessor: String,
        /// The accessor method member.
        method: Fragment,
        method_name: Fragment,
        /// Field references inside the accessor.
        references: Vec<Fragment>,
        /// Identifiers of `getX()` calls elsewhere.
        accessor_calls: Vec<Fragment>,
    },
    Anonymous(AnonymousAccess),
}

impl VariableSupport {
    /// The variable name, if there is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Local { name, .. } | Self::Field { name, .. } | Self::Lazy { name, .. } => {
                Some(name)
            }
            Self::Anonymous(_) => None,
        }
    }

    /// The variable shape, if the node has a variable.
    pub fn kind(&self) -> Option<VariableKind> {
        match self {
            Self::Local { .. } => Some(VariableKind::Local),
            Self::Field { .. } => Some(VariableKind::Field),
            Self::Lazy { .. } => Some(VariableKind::Lazy),
            Self::Anonymous(_) => None,
        }
    }

    /// The lazy accessor name.
    pub fn accessor(&self) -> Option<&str> {
        match self {
            Self::Lazy { accessor, .. } => Some(accessor),
            _ => None,
        }
    }

    /// How code inside `method` refers to the component.
    ///
    /// `parent_ref` is the parent's reference in the same method; exposed
    /// components are reached through it.
    pub fn reference(&self, method: &str, parent_ref: Option<&str>) -> Option<String> {
        match self {
            Self::Local { name, .. } | Self::Field { name, .. } => Some(name.clone()),
            Self::Lazy { name, accessor, .. } => {
                if method == accessor {
                    Some(name.clone())
                } else {
                    Some(format!("{accessor}()"))
                }
            }
            Self::Anonymous(AnonymousAccess::This) => Some("this".to_string()),
            Self::Anonymous(AnonymousAccess::Exposed { accessor }) => match parent_ref? {
                "this" => Some(format!("{accessor}()")),
                parent => Some(format!("{parent}.{accessor}()")),
            },
            Self::Anonymous(AnonymousAccess::Inline | AnonymousAccess::Standalone { .. }) => None,
        }
    }

    /// The statement that declares or assigns the variable in its block.
    pub fn statement(&self) -> Option<&Fragment> {
        match self {
            Self::Local { declaration, .. } => Some(declaration),
            Self::Field { assignment, .. } => Some(assignment),
            Self::Anonymous(AnonymousAccess::Standalone { statement }) => Some(statement),
            Self::Lazy { .. } | Self::Anonymous(_) => None,
        }
    }

    /// Class members owned by the variable.
    pub fn members(&self) -> Vec<Fragment> {
        match self {
            Self::Field { field, .. } => vec![*field],
            Self::Lazy { field, method, .. } => vec![*method, *field],
            Self::Local { .. } | Self::Anonymous(_) => Vec::new(),
        }
    }

    /// Every identifier that spells the variable name.
    pub(crate) fn name_fragments(&self) -> Vec<Fragment> {
        match self {
            Self::Local {
                name_span,
                references,
                ..
            } => std::iter::once(*name_span).chain(references.iter().copied()).collect(),
            Self::Field {
                field_name,
                references,
                ..
            }
            | Self::Lazy {
                field_name,
                references,
                ..
            } => std::iter::once(*field_name).chain(references.iter().copied()).collect(),
            Self::Anonymous(_) => Vec::new(),
        }
    }

    /// Every identifier that spells the lazy accessor name.
    pub(crate) fn accessor_fragments(&self) -> Vec<Fragment> {
        match self {
            Self::Lazy {
                method_name,
                accessor_calls,
                ..
            } => std::iter::once(*method_name)
                .chain(accessor_calls.iter().copied())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Remember another identifier that names the variable.
    pub(crate) fn add_reference(&mut self, reference: Fragment) {
        match self {
            Self::Local { references, .. }
            | Self::Field { references, .. }
            | Self::Lazy { references, .. } => references.push(reference),
            Self::Anonymous(_) => {}
        }
    }

    /// Remember another `getX()` call.
    pub(crate) fn add_accessor_call(&mut self, call: Fragment) {
        if let Self::Lazy { accessor_calls, .. } = self {
            accessor_calls.push(call);
        }
    }

    pub(crate) fn set_name(&mut self, new_name: &str) {
        match self {
            Self::Local { name, .. } | Self::Field { name, .. } | Self::Lazy { name, .. } => {
                *name = new_name.to_string();
            }
            Self::Anonymous(_) => {}
        }
    }

    pub(crate) fn set_accessor(&mut self, new_accessor: &str) {
        if let Self::Lazy { accessor, .. } = self {
            *accessor = new_accessor.to_string();
        }
    }

    /// Stop tracking references at exactly `span`.
    pub(crate) fn forget(&mut self, span: Span) {
        let keep = |r: &Fragment| r.get() != Some(span);
        match self {
            Self::Local { references, .. } | Self::Field { references, .. } => {
                references.retain(keep);
            }
            Self::Lazy {
                references,
                accessor_calls,
                ..
            } => {
                references.retain(keep);
                accessor_calls.retain(keep);
            }
            Self::Anonymous(_) => {}
        }
    }

    /// Drop references whose text is gone.
    pub(crate) fn prune(&mut self) {
        match self {
            Self::Local { references, .. } | Self::Field { references, .. } => {
                references.retain(|r| !r.is_detached());
            }
            Self::Lazy {
                references,
                accessor_calls,
                ..
            } => {
                references.retain(|r| !r.is_detached());
                accessor_calls.retain(|r| !r.is_detached());
            }
            Self::Anonymous(_) => {}
        }
    }

    pub(crate) fn apply(&mut self, map: &SpanMap) {
        match self {
            Self::Local {
                declaration,
                type_prefix,
                name_span,
                references,
                ..
            } => {
                declaration.apply(map);
                type_prefix.apply(map);
                name_span.apply(map);
                references.iter_mut().for_each(|r| r.apply(map));
            }
            Self::Field {
                field,
                field_name,
                assignment,
                references,
                ..
            } => {
                field.apply(map);
                field_name.apply(map);
                assignment.apply(map);
                references.iter_mut().for_each(|r| r.apply(map));
            }
            Self::Lazy {
                field,
                field_name,
                method,
                method_name,
                references,
                accessor_calls,
                ..
            } => {
                field.apply(map);
                field_name.apply(map);
                method.apply(map);
                method_name.apply(map);
                references.iter_mut().for_each(|r| r.apply(map));
                accessor_calls.iter_mut().for_each(|r| r.apply(map));
            }
            Self::Anonymous(AnonymousAccess::Standalone { statement }) => statement.apply(map),
            Self::Anonymous(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy() -> VariableSupport {
        VariableSupport::Lazy {
            name: "panel".into(),
            field: Fragment::new(Span::new(0, 10)),
            field_name: Fragment::new(Span::new(4, 9)),
            accessor: "getPanel".into(),
            method: Fragment::new(Span::new(20, 80)),
            method_name: Fragment::new(Span::new(30, 38)),
            references: Vec::new(),
            accessor_calls: Vec::new(),
        }
    }

    #[test]
    fn test_references() {
        let variable = lazy();
        assert_eq!(variable.reference("getPanel", None).as_deref(), Some("panel"));
        assert_eq!(
            variable.reference("initialize", None).as_deref(),
            Some("getPanel()")
        );

        let exposed = VariableSupport::Anonymous(AnonymousAccess::Exposed {
            accessor: "getContentPane".into(),
        });
        assert_eq!(
            exposed.reference("m", Some("this")).as_deref(),
            Some("getContentPane()")
        );
        assert_eq!(
            exposed.reference("m", Some("frame")).as_deref(),
            Some("frame.getContentPane()")
        );
        assert_eq!(exposed.reference("m", None), None);

        let inline = VariableSupport::Anonymous(AnonymousAccess::Inline);
        assert_eq!(inline.reference("m", Some("panel")), None);
        assert_eq!(inline.kind(), None);
        assert_eq!(inline.statement(), None);

        let mut standalone = VariableSupport::Anonymous(AnonymousAccess::Standalone {
            statement: Fragment::new(Span::new(40, 68)),
        });
        assert_eq!(standalone.reference("m", Some("shell")), None);
        let mut map = SpanMap::new();
        map.push_edit(horizon_designer_source::TextEdit::new(Span::new(0, 10), 0));
        standalone.apply(&map);
        assert_eq!(
            standalone.statement().and_then(Fragment::get),
            Some(Span::new(30, 58))
        );
    }

    #[test]
    fn test_members_and_fragments() {
        let mut variable = lazy();
        variable.add_accessor_call(Fragment::new(Span::new(90, 98)));
        variable.add_reference(Fragment::new(Span::new(50, 55)));
        assert_eq!(variable.members().len(), 2);
        assert_eq!(variable.name_fragments().len(), 2);
        assert_eq!(variable.accessor_fragments().len(), 2);

        let mut map = SpanMap::new();
        map.push_edit(horizon_designer_source::TextEdit::new(Span::new(88, 100), 0));
        variable.apply(&map);
        variable.prune();
        assert_eq!(variable.accessor_fragments().len(), 1);
    }
}
