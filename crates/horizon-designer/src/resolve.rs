//! Resolving type names as written to described types.

use std::collections::HashMap;

use horizon_designer_source::CompilationUnit;

use crate::description::{DescriptorLookup, simple_name};

/// Maps simple and qualified type names in one file to fully qualified names.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    package: Option<String>,
    explicit: HashMap<String, String>,
    wildcards: Vec<String>,
}

impl TypeResolver {
    /// Collect the imports of `unit`.
    pub fn new(unit: &CompilationUnit) -> Self {
        let mut resolver = Self {
            package: unit.package.clone(),
            ..Self::default()
        };
        for import in unit.imports.iter().filter(|i| !i.is_static) {
            if import.wildcard {
                resolver.wildcards.push(import.path.clone());
            } else {
                resolver
                    .explicit
                    .insert(simple_name(&import.path).to_string(), import.path.clone());
            }
        }
        resolver
    }

    /// The fully qualified name `written` refers to, if it can be decided.
    ///
    /// Explicit imports win; wildcard imports, the file's package and
    /// `java.lang` are only consulted for described types.
    pub fn resolve(&self, written: &str, lookup: &dyn DescriptorLookup) -> Option<String> {
        if written.contains('.') {
            if lookup.describe(written).is_some() {
                return Some(written.to_string());
            }
            // `Outer.Inner` through an import of `Outer`.
            let (head, rest) = written.split_once('.')?;
            let outer = self.explicit.get(head)?;
            return Some(format!("{outer}.{rest}"));
        }
        if let Some(qualified) = self.explicit.get(written) {
            return Some(qualified.clone());
        }
        self.wildcards
            .iter()
            .map(String::as_str)
            .chain(self.package.as_deref())
            .chain(std::iter::once("java.lang"))
            .map(|package| format!("{package}.{written}"))
            .find(|candidate| lookup.describe(candidate).is_some())
    }

    /// Record an import added to the file.
    pub(crate) fn import(&mut self, qualified: &str) {
        self.explicit
            .insert(simple_name(qualified).to_string(), qualified.to_string());
    }

    /// Whether the simple name of `qualified` is free to be imported.
    pub(crate) fn can_import(&self, qualified: &str, lookup: &dyn DescriptorLookup) -> bool {
        self.resolve(simple_name(qualified), lookup)
            .is_none_or(|resolved| resolved == qualified)
    }

    /// How generated code should spell `qualified`.
    ///
    /// The simple name when it resolves back to `qualified`, otherwise the
    /// qualified name.
    pub fn spell(&self, qualified: &str, lookup: &dyn DescriptorLookup) -> String {
        let simple = simple_name(qualified);
        match self.resolve(simple, lookup) {
            Some(resolved) if resolved == qualified => simple.to_string(),
            _ => qualified.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_designer_source::syntax::parse;

    use super::*;
    use crate::description::DescriptorRegistry;

    #[test]
    fn test_resolution_order() {
        let registry = DescriptorRegistry::builtin().unwrap();
        let unit = parse(
            "package demo;\nimport javax.swing.*;\nimport org.eclipse.swt.widgets.Button;\nclass A {}\n",
        )
        .unwrap();
        let resolver = TypeResolver::new(&unit);
        assert_eq!(
            resolver.resolve("JPanel", &registry).as_deref(),
            Some("javax.swing.JPanel")
        );
        assert_eq!(
            resolver.resolve("Button", &registry).as_deref(),
            Some("org.eclipse.swt.widgets.Button")
        );
        assert_eq!(resolver.resolve("Mystery", &registry), None);
        assert_eq!(
            resolver.resolve("javax.swing.JLabel", &registry).as_deref(),
            Some("javax.swing.JLabel")
        );
    }

    #[test]
    fn test_spelling() {
        let registry = DescriptorRegistry::builtin().unwrap();
        let unit = parse("import org.eclipse.swt.widgets.Button;\nclass A {}\n").unwrap();
        let resolver = TypeResolver::new(&unit);
        assert_eq!(
            resolver.spell("org.eclipse.swt.widgets.Button", &registry),
            "Button"
        );
        assert_eq!(resolver.spell("javax.swing.JButton", &registry), "javax.swing.JButton");
    }
}
