//! The payload of a model node.

use horizon_designer_core::TreeLabel;
use horizon_designer_source::{Fragment, Span, SpanMap};

use crate::association::Association;
use crate::creation::{CreationSupport, ImplicitKind};
use crate::description::ExposedDescriptor;
use crate::variable::{AnonymousAccess, VariableSupport};

/// A recognized property setter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    pub name: String,
    pub setter: String,
    /// The argument as written.
    pub value: String,
    pub statement: Fragment,
}

/// Everything the designer knows about one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Fully qualified type.
    pub component_type: String,
    pub creation: CreationSupport,
    pub variable: VariableSupport,
    /// `None` for the root.
    pub association: Option<Association>,
    /// Index of the parent container this node sits in.
    pub container: Option<usize>,
    /// Statements that use the component without creating or attaching it.
    pub related: Vec<Fragment>,
    pub properties: Vec<PropertyValue>,
    /// The block holding the node's association.
    pub block: Fragment,
    /// The method containing `block`.
    pub method: String,
    /// The block where the node's own children are attached.
    pub own_block: Fragment,
    /// The method containing `own_block`.
    pub own_method: String,
}

impl ComponentInfo {
    /// The variable name, if any.
    pub fn name(&self) -> Option<&str> {
        self.variable.name()
    }

    /// Whether the node is exposed by its parent.
    pub fn is_exposed(&self) -> bool {
        self.creation.exposed_accessor().is_some()
    }

    /// Whether this is the `this` root.
    pub fn is_this(&self) -> bool {
        self.creation == CreationSupport::Implicit(ImplicitKind::This)
    }

    /// Live statements that belong to this node alone, in source order.
    ///
    /// These are the declaration or assignment, the association statement
    /// and related statements.
    pub fn own_statements(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .variable
            .statement()
            .into_iter()
            .chain(self.association.as_ref().and_then(Association::statement))
            .chain(self.related.iter())
            .filter_map(Fragment::get)
            .collect();
        spans.sort();
        spans.dedup();
        spans
    }

    /// Shift every remembered position through `map`.
    pub fn apply(&mut self, map: &SpanMap) {
        self.creation.apply(map);
        self.variable.apply(map);
        if let Some(association) = &mut self.association {
            association.apply(map);
        }
        self.related.iter_mut().for_each(|r| r.apply(map));
        self.properties.iter_mut().for_each(|p| p.statement.apply(map));
        self.block.apply(map);
        self.own_block.apply(map);
    }

    /// The node for a child this component exposes through an accessor.
    ///
    /// Exposed children live wherever their owner builds its children.
    pub(crate) fn exposed_child(&self, exposed: &ExposedDescriptor) -> ComponentInfo {
        ComponentInfo {
            component_type: exposed.type_name.clone(),
            creation: CreationSupport::Implicit(ImplicitKind::Exposed {
                accessor: exposed.accessor.clone(),
            }),
            variable: VariableSupport::Anonymous(AnonymousAccess::Exposed {
                accessor: exposed.accessor.clone(),
            }),
            association: Some(Association::Implicit),
            container: None,
            related: Vec::new(),
            properties: Vec::new(),
            block: self.own_block,
            method: self.own_method.clone(),
            own_block: self.own_block,
            own_method: self.own_method.clone(),
        }
    }

    /// Forget statements whose text is gone.
    pub fn prune(&mut self) {
        self.related.retain(|r| !r.is_detached());
        self.properties.retain(|p| !p.statement.is_detached());
        self.variable.prune();
    }
}

impl TreeLabel for ComponentInfo {
    fn label(&self) -> String {
        match &self.variable {
            VariableSupport::Anonymous(AnonymousAccess::This) => "(this)".to_string(),
            VariableSupport::Anonymous(AnonymousAccess::Exposed { accessor }) => {
                format!("{accessor}()")
            }
            VariableSupport::Anonymous(AnonymousAccess::Inline | AnonymousAccess::Standalone { .. }) => {
                "(inline)".to_string()
            }
            variable => variable.name().unwrap_or_default().to_string(),
        }
    }

    fn type_label(&self) -> String {
        self.component_type.clone()
    }
}
