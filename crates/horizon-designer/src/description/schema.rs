//! On-disk layout of descriptor sets.
//!
//! ```toml
//! version = 1
//!
//! [[component]]
//! type = "javax.swing.JPanel"
//! extends = "javax.swing.JComponent"
//!
//! [[component.creation]]
//! source = "new %component.class%()"
//!
//! [[component.container]]
//! kind = "sequence"
//! association = "%parent%.add(%child%)"
//! accepts = ["java.awt.Component"]
//! ```

use serde::Deserialize;

use super::ContainerKind;

/// Highest descriptor set version this build understands.
pub(crate) const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DescriptorFile {
    pub version: u32,
    #[serde(default)]
    pub component: Vec<ComponentEntry>,
    #[serde(default)]
    pub factory: Vec<FactoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ComponentEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default, rename = "constructor")]
    pub constructors: Vec<ConstructorEntry>,
    #[serde(default, rename = "creation")]
    pub creations: Vec<CreationEntry>,
    #[serde(default, rename = "property")]
    pub properties: Vec<PropertyEntry>,
    #[serde(default, rename = "container")]
    pub containers: Vec<ContainerEntry>,
    #[serde(default)]
    pub exposed: Vec<ExposedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConstructorEntry {
    #[serde(default)]
    pub params: Vec<String>,
    /// Index of the argument that receives the parent component.
    #[serde(default)]
    pub parent_argument: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CreationEntry {
    #[serde(default = "default_creation_id")]
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

fn default_creation_id() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PropertyEntry {
    pub name: String,
    pub setter: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ContainerEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ContainerKind,
    pub association: String,
    #[serde(default)]
    pub accepts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ExposedEntry {
    pub name: String,
    pub accessor: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FactoryEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, rename = "method")]
    pub methods: Vec<FactoryMethodEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FactoryMethodEntry {
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    pub returns: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_component() {
        let file: DescriptorFile = toml::from_str(
            r#"
version = 1

[[component]]
type = "a.B"

[[component.creation]]
source = "new %component.class%()"
"#,
        )
        .unwrap();
        assert_eq!(file.component.len(), 1);
        assert_eq!(file.component[0].creations[0].id, "default");
        assert!(file.factory.is_empty());
    }

    #[test]
    fn test_container_kind_names() {
        let file: DescriptorFile = toml::from_str(
            r#"
version = 1

[[component]]
type = "a.Pane"

[[component.container]]
kind = "slot"
association = "%parent%.setContent(%child%)"
"#,
        )
        .unwrap();
        assert_eq!(file.component[0].containers[0].kind, ContainerKind::Slot);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<DescriptorFile, _> =
            toml::from_str("version = 1\n[[component]]\ntype = \"a.B\"\ncolour = 2\n");
        assert!(result.is_err());
    }
}
