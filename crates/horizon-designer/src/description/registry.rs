//! The descriptor registry.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use horizon_designer_core::logging::targets;
use include_dir::{Dir, include_dir};
use static_assertions::assert_impl_all;

use super::schema::{ComponentEntry, DescriptorFile, SCHEMA_VERSION};
use super::{
    AssociationTemplate, ComponentDescriptor, ConstructorDescriptor, ContainerDescriptor,
    ContainerKind, CreationTemplate, ExposedDescriptor, FactoryMethod, PropertyDescriptor,
};
use crate::error::DescriptionError;

static BUILTIN: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/resources/descriptors");

/// Read access to component descriptions.
///
/// The parser and the operations only need lookups, so tests can supply
/// their own tables.
pub trait DescriptorLookup {
    /// The descriptor of a fully qualified type.
    fn describe(&self, type_name: &str) -> Option<&ComponentDescriptor>;

    /// A factory method declared on `type_name`.
    fn factory_method(&self, type_name: &str, method: &str) -> Option<&FactoryMethod>;

    /// Whether a value of `type_name` can be used where `target` is expected.
    fn is_assignable(&self, type_name: &str, target: &str) -> bool {
        type_name == target
            || self
                .describe(type_name)
                .is_some_and(|d| d.ancestors.iter().any(|a| a == target))
    }
}

/// All descriptor sets known to a session.
///
/// Sets are merged in the order they are added; inheritance is resolved
/// across sets, so a user set may extend built-in types.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    entries: Vec<ComponentEntry>,
    components: HashMap<String, ComponentDescriptor>,
    factories: HashMap<String, Vec<FactoryMethod>>,
}

assert_impl_all!(DescriptorRegistry: Send, Sync);

impl DescriptorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in descriptor set.
    pub fn builtin() -> Result<Self, DescriptionError> {
        let mut registry = Self::new();
        let mut files: Vec<_> = BUILTIN
            .files()
            .filter(|f| f.path().extension().is_some_and(|e| e == "toml"))
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));
        for file in files {
            let origin = file.path().display().to_string();
            let text = file.contents_utf8().ok_or_else(|| DescriptionError::Template {
                template: origin.clone(),
                message: "descriptor set is not UTF-8".to_string(),
            })?;
            registry.add_toml_str(text, &origin)?;
        }
        Ok(registry)
    }

    /// A registry holding a single descriptor set.
    pub fn from_toml_str(text: &str) -> Result<Self, DescriptionError> {
        let mut registry = Self::new();
        registry.add_toml_str(text, "<string>")?;
        Ok(registry)
    }

    /// A registry holding a single descriptor set read from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DescriptionError> {
        let mut registry = Self::new();
        registry.add_file(path)?;
        Ok(registry)
    }

    /// Merge a descriptor set read from a file.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), DescriptionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_toml_str(&text, &path.display().to_string())
    }

    /// Merge a descriptor set. On error the registry is unchanged.
    pub fn add_toml_str(&mut self, text: &str, origin: &str) -> Result<(), DescriptionError> {
        let file: DescriptorFile =
            toml::from_str(text).map_err(|source| DescriptionError::Toml {
                origin: origin.to_string(),
                source,
            })?;
        if file.version == 0 || file.version > SCHEMA_VERSION {
            return Err(DescriptionError::UnsupportedVersion {
                origin: origin.to_string(),
                version: file.version,
            });
        }

        let mut entries = self.entries.clone();
        let mut seen: HashSet<String> = entries.iter().map(|e| e.type_name.clone()).collect();
        for entry in file.component {
            if !seen.insert(entry.type_name.clone()) {
                return Err(DescriptionError::DuplicateType(entry.type_name));
            }
            entries.push(entry);
        }
        let components = resolve_all(&entries)?;

        let mut factories = self.factories.clone();
        for factory in file.factory {
            let methods = factories.entry(factory.type_name.clone()).or_default();
            methods.extend(factory.methods.into_iter().map(|m| FactoryMethod {
                declaring_type: factory.type_name.clone(),
                name: m.name,
                is_static: m.is_static,
                returns: m.returns,
                params: m.params,
            }));
        }

        tracing::debug!(
            target: targets::DESCRIPTION,
            origin,
            types = components.len(),
            "loaded descriptor set"
        );
        self.entries = entries;
        self.components = components;
        self.factories = factories;
        Ok(())
    }

    /// Number of described types.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no type is described.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over the described type names.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

impl DescriptorLookup for DescriptorRegistry {
    fn describe(&self, type_name: &str) -> Option<&ComponentDescriptor> {
        self.components.get(type_name)
    }

    fn factory_method(&self, type_name: &str, method: &str) -> Option<&FactoryMethod> {
        self.factories
            .get(type_name)?
            .iter()
            .find(|m| m.name == method)
    }
}

fn resolve_all(
    entries: &[ComponentEntry],
) -> Result<HashMap<String, ComponentDescriptor>, DescriptionError> {
    let by_name: HashMap<&str, &ComponentEntry> =
        entries.iter().map(|e| (e.type_name.as_str(), e)).collect();
    let mut resolved = HashMap::with_capacity(entries.len());
    for entry in entries {
        let mut visiting = HashSet::new();
        resolve(entry, &by_name, &mut resolved, &mut visiting)?;
    }
    Ok(resolved)
}

fn resolve(
    entry: &ComponentEntry,
    by_name: &HashMap<&str, &ComponentEntry>,
    resolved: &mut HashMap<String, ComponentDescriptor>,
    visiting: &mut HashSet<String>,
) -> Result<ComponentDescriptor, DescriptionError> {
    if let Some(done) = resolved.get(&entry.type_name) {
        return Ok(done.clone());
    }
    if !visiting.insert(entry.type_name.clone()) {
        return Err(DescriptionError::InheritanceCycle(entry.type_name.clone()));
    }

    let parent = match &entry.extends {
        Some(parent) => {
            let parent_entry =
                by_name
                    .get(parent.as_str())
                    .ok_or_else(|| DescriptionError::UnknownParent {
                        type_name: entry.type_name.clone(),
                        parent: parent.clone(),
                    })?;
            Some(resolve(parent_entry, by_name, resolved, visiting)?)
        }
        None => None,
    };

    let own = own_descriptor(entry)?;
    let descriptor = match parent {
        Some(parent) => inherit(own, parent),
        None => own,
    };
    resolved.insert(entry.type_name.clone(), descriptor.clone());
    Ok(descriptor)
}

fn own_descriptor(entry: &ComponentEntry) -> Result<ComponentDescriptor, DescriptionError> {
    let containers = entry
        .containers
        .iter()
        .enumerate()
        .map(|(index, c)| {
            Ok(ContainerDescriptor {
                name: c.name.clone().unwrap_or_else(|| match c.kind {
                    ContainerKind::Slot => format!("slot{index}"),
                    ContainerKind::Sequence => format!("children{index}"),
                }),
                kind: c.kind,
                association: AssociationTemplate::parse(&c.association)?,
                accepts: c.accepts.clone(),
            })
        })
        .collect::<Result<Vec<_>, DescriptionError>>()?;

    for constructor in &entry.constructors {
        if let Some(index) = constructor.parent_argument
            && index >= constructor.params.len()
        {
            return Err(DescriptionError::Template {
                template: entry.type_name.clone(),
                message: format!("parent_argument {index} is out of range"),
            });
        }
    }

    Ok(ComponentDescriptor {
        type_name: entry.type_name.clone(),
        ancestors: Vec::new(),
        constructors: entry
            .constructors
            .iter()
            .map(|c| ConstructorDescriptor {
                params: c.params.clone(),
                parent_argument: c.parent_argument,
            })
            .collect(),
        creations: entry
            .creations
            .iter()
            .map(|c| CreationTemplate {
                id: c.id.clone(),
                source: c.source.clone(),
                imports: c.imports.clone(),
            })
            .collect(),
        properties: entry
            .properties
            .iter()
            .map(|p| PropertyDescriptor {
                name: p.name.clone(),
                setter: p.setter.clone(),
                value_type: p.value_type.clone(),
            })
            .collect(),
        containers,
        exposed: entry
            .exposed
            .iter()
            .map(|e| ExposedDescriptor {
                name: e.name.clone(),
                accessor: e.accessor.clone(),
                type_name: e.type_name.clone(),
            })
            .collect(),
    })
}

/// Fill what `own` leaves open from its resolved parent.
fn inherit(mut own: ComponentDescriptor, parent: ComponentDescriptor) -> ComponentDescriptor {
    own.ancestors = std::iter::once(parent.type_name.clone())
        .chain(parent.ancestors)
        .collect();
    if own.constructors.is_empty() {
        own.constructors = parent.constructors;
    }
    for creation in parent.creations {
        if !own.creations.iter().any(|c| c.id == creation.id) {
            own.creations.push(creation);
        }
    }
    let mut properties = parent.properties;
    properties.retain(|p| !own.properties.iter().any(|o| o.name == p.name));
    properties.append(&mut own.properties);
    own.properties = properties;
    if own.containers.is_empty() {
        own.containers = parent.containers;
    }
    let mut exposed = parent.exposed;
    exposed.retain(|e| !own.exposed.iter().any(|o| o.name == e.name));
    exposed.append(&mut own.exposed);
    own.exposed = exposed;
    own
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET: &str = r#"
version = 1

[[component]]
type = "a.Base"

[[component.creation]]
source = "new %component.class%()"

[[component.property]]
name = "text"
setter = "setText"
type = "java.lang.String"

[[component]]
type = "a.Box"
extends = "a.Base"

[[component.property]]
name = "text"
setter = "setLabel"
type = "java.lang.String"

[[component.container]]
kind = "sequence"
association = "%parent%.add(%child%)"
accepts = ["a.Base"]

[[component]]
type = "a.Window"
extends = "a.Box"

[[component.exposed]]
name = "content"
accessor = "getContent"
type = "a.Box"

[[factory]]
type = "a.Boxes"

[[factory.method]]
name = "create"
static = true
returns = "a.Box"
"#;

    #[test]
    fn test_inheritance() {
        let registry = DescriptorRegistry::from_toml_str(SET).unwrap();
        let window = registry.describe("a.Window").unwrap();
        assert_eq!(window.ancestors, vec!["a.Box", "a.Base"]);
        assert_eq!(window.creations.len(), 1);
        assert_eq!(window.containers.len(), 1);
        assert_eq!(window.properties.len(), 1);
        assert_eq!(window.properties[0].setter, "setLabel");
        assert!(window.exposed_by_accessor("getContent").is_some());
        assert!(registry.is_assignable("a.Window", "a.Base"));
        assert!(!registry.is_assignable("a.Base", "a.Box"));
    }

    #[test]
    fn test_accepting() {
        let registry = DescriptorRegistry::from_toml_str(SET).unwrap();
        let boxed = registry.describe("a.Box").unwrap();
        assert_eq!(boxed.accepting("a.Window", &registry).count(), 1);
        assert_eq!(boxed.accepting("b.Other", &registry).count(), 0);
    }

    #[test]
    fn test_factories() {
        let registry = DescriptorRegistry::from_toml_str(SET).unwrap();
        let method = registry.factory_method("a.Boxes", "create").unwrap();
        assert!(method.is_static);
        assert_eq!(method.returns, "a.Box");
        assert!(registry.factory_method("a.Boxes", "other").is_none());
    }

    #[test]
    fn test_errors_leave_registry_unchanged() {
        let mut registry = DescriptorRegistry::from_toml_str(SET).unwrap();
        let before = registry.len();

        let duplicate = "version = 1\n[[component]]\ntype = \"a.Box\"\n";
        assert!(matches!(
            registry.add_toml_str(duplicate, "dup"),
            Err(DescriptionError::DuplicateType(_))
        ));
        let orphan = "version = 1\n[[component]]\ntype = \"b.C\"\nextends = \"b.Missing\"\n";
        assert!(matches!(
            registry.add_toml_str(orphan, "orphan"),
            Err(DescriptionError::UnknownParent { .. })
        ));
        assert!(matches!(
            registry.add_toml_str("version = 9", "future"),
            Err(DescriptionError::UnsupportedVersion { version: 9, .. })
        ));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_cycle() {
        let set = "version = 1\n[[component]]\ntype = \"a.A\"\nextends = \"a.B\"\n[[component]]\ntype = \"a.B\"\nextends = \"a.A\"\n";
        assert!(matches!(
            DescriptorRegistry::from_toml_str(set),
            Err(DescriptionError::InheritanceCycle(_))
        ));
    }

    #[test]
    fn test_user_set_extends_builtin() {
        let mut registry = DescriptorRegistry::builtin().unwrap();
        registry
            .add_toml_str(
                "version = 1\n[[component]]\ntype = \"demo.FancyPanel\"\nextends = \"javax.swing.JPanel\"\n",
                "user",
            )
            .unwrap();
        let fancy = registry.describe("demo.FancyPanel").unwrap();
        assert!(fancy.is_container());
        assert!(registry.is_assignable("demo.FancyPanel", "java.awt.Component"));
    }

    #[test]
    fn test_builtin_sets() {
        let registry = DescriptorRegistry::builtin().unwrap();
        assert!(registry.describe("javax.swing.JButton").is_some());
        assert!(registry.describe("org.eclipse.swt.widgets.Button").is_some());
        let frame = registry.describe("javax.swing.JFrame").unwrap();
        assert!(frame.exposed_by_accessor("getContentPane").is_some());
        let button = registry.describe("org.eclipse.swt.widgets.Button").unwrap();
        assert_eq!(button.parent_argument(2), Some(0));
    }
}
