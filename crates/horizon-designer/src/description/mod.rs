//! Component descriptions.
//!
//! A descriptor tells the designer what it may assume about a component
//! type: how to construct it, which setters are properties, how children are
//! attached and which children exist implicitly. Descriptors are data, read
//! from TOML descriptor sets; two sets (Swing and SWT) are built in.

mod registry;
mod schema;
mod template;

use serde::Deserialize;

pub use registry::{DescriptorLookup, DescriptorRegistry};
pub use template::{AssociationTemplate, CreationTemplate, InvocationTemplate, TemplateArg};

/// Shape of a child container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Holds at most one child.
    Slot,
    /// An ordered list of children.
    Sequence,
}

/// A described constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    pub params: Vec<String>,
    /// Index of the argument that receives the parent.
    pub parent_argument: Option<usize>,
}

/// A setter the designer treats as a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub setter: String,
    pub value_type: String,
}

/// One way a component holds children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub name: String,
    pub kind: ContainerKind,
    pub association: AssociationTemplate,
    /// Accepted child types; empty accepts anything.
    pub accepts: Vec<String>,
}

/// A child that exists as soon as its parent does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedDescriptor {
    pub name: String,
    pub accessor: String,
    pub type_name: String,
}

/// A method that returns a new component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryMethod {
    pub declaring_type: String,
    pub name: String,
    pub is_static: bool,
    pub returns: String,
    pub params: Vec<String>,
}

/// Everything known about one component type, inheritance applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub type_name: String,
    /// Described supertypes, nearest first.
    pub ancestors: Vec<String>,
    pub constructors: Vec<ConstructorDescriptor>,
    pub creations: Vec<CreationTemplate>,
    pub properties: Vec<PropertyDescriptor>,
    pub containers: Vec<ContainerDescriptor>,
    pub exposed: Vec<ExposedDescriptor>,
}

impl ComponentDescriptor {
    /// The unqualified type name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.type_name)
    }

    /// A creation by id, or the first one when `id` is `None`.
    pub fn creation(&self, id: Option<&str>) -> Option<&CreationTemplate> {
        match id {
            Some(id) => self.creations.iter().find(|c| c.id == id),
            None => self
                .creations
                .iter()
                .find(|c| c.id == "default")
                .or_else(|| self.creations.first()),
        }
    }

    /// The property set through `setter`.
    pub fn property_by_setter(&self, setter: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.setter == setter)
    }

    /// The exposed child returned by `accessor`.
    pub fn exposed_by_accessor(&self, accessor: &str) -> Option<&ExposedDescriptor> {
        self.exposed.iter().find(|e| e.accessor == accessor)
    }

    /// Which argument receives the parent when called with `arg_count` arguments.
    pub fn parent_argument(&self, arg_count: usize) -> Option<usize> {
        self.constructors
            .iter()
            .find(|c| c.params.len() == arg_count)
            .and_then(|c| c.parent_argument)
    }

    /// Whether any container exists.
    pub fn is_container(&self) -> bool {
        !self.containers.is_empty()
    }

    /// Containers that accept `child_type`, with their index.
    pub fn accepting<'a>(
        &'a self,
        child_type: &'a str,
        lookup: &'a dyn DescriptorLookup,
    ) -> impl Iterator<Item = (usize, &'a ContainerDescriptor)> + 'a {
        self.containers.iter().enumerate().filter(move |(_, container)| {
            container.accepts.is_empty()
                || container
                    .accepts
                    .iter()
                    .any(|accepted| lookup.is_assignable(child_type, accepted))
        })
    }
}

/// The last segment of a dotted name.
pub fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}
