//! Session configuration.
//!
//! Everything that shapes generated code lives here. Configuration is read
//! from TOML; every key is optional.
//!
//! ```toml
//! entry_points = ["initialize", "jbInit"]
//! default_variable = "field"
//! field_modifier = "protected"
//! indent = "    "
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::variable::VariableKind;

/// Settings for a [`DesignSession`](crate::DesignSession).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Methods searched, in order, when the class has no constructor.
    ///
    /// A constructor that calls one of these delegates to it.
    pub entry_points: Vec<String>,
    /// Variable shape for created components when the request names none.
    pub default_variable: VariableKind,
    /// Modifier for generated fields and lazy accessors.
    pub field_modifier: String,
    /// One level of indentation in generated code.
    pub indent: String,
    /// Prefix of generated lazy accessor names.
    pub accessor_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entry_points: ["initialize", "createContents", "jbInit", "main"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_variable: VariableKind::Local,
            field_modifier: "private".to_string(),
            indent: "\t".to_string(),
            accessor_prefix: "get".to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::Invalid(format!(
                "indent must be spaces or tabs, got {:?}",
                self.indent
            )));
        }
        if self.accessor_prefix.is_empty() {
            return Err(ConfigError::Invalid("accessor_prefix is empty".into()));
        }
        Ok(())
    }

    /// Name of the lazy accessor for a field.
    pub fn accessor_name(&self, field: &str) -> String {
        let mut chars = field.chars();
        match chars.next() {
            Some(first) => format!(
                "{}{}{}",
                self.accessor_prefix,
                first.to_uppercase(),
                chars.as_str()
            ),
            None => self.accessor_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.entry_points[0], "initialize");
        assert_eq!(config.default_variable, VariableKind::Local);
    }

    #[test]
    fn test_partial_override() {
        let config = SessionConfig::from_toml_str(
            "default_variable = \"lazy\"\nindent = \"    \"\n",
        )
        .unwrap();
        assert_eq!(config.default_variable, VariableKind::Lazy);
        assert_eq!(config.indent, "    ");
        assert_eq!(config.field_modifier, "private");
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            SessionConfig::from_toml_str("colour = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_rejects_bad_indent() {
        assert!(matches!(
            SessionConfig::from_toml_str("indent = \"--\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_accessor_name() {
        let config = SessionConfig::default();
        assert_eq!(config.accessor_name("okButton"), "getOkButton");
    }
}
