//! Variable names for generated code.

use std::collections::HashSet;

use regex::Regex;

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "null", "package", "private", "protected", "public", "return",
    "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

/// Whether `name` can be used as a variable name.
pub fn is_identifier(name: &str) -> bool {
    let Ok(pattern) = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$") else {
        return false;
    };
    pattern.is_match(name) && !KEYWORDS.contains(&name)
}

/// The base variable name for a component type.
///
/// `JButton` becomes `button`, `URLField` becomes `field`, all-caps names
/// are lowercased and names that already start lowercase get a trailing
/// underscore.
pub fn default_name(type_name: &str) -> String {
    let simple = crate::description::simple_name(type_name);
    let Some(first) = simple.chars().next() else {
        return "component".to_string();
    };
    if simple.chars().all(|c| c.is_uppercase()) {
        return simple.to_lowercase();
    }
    if first.is_lowercase() {
        return format!("{simple}_");
    }

    let chars: Vec<char> = simple.chars().collect();
    let mut index = 0;
    while index + 1 < chars.len() && chars[index + 1].is_uppercase() {
        index += 1;
    }
    let mut name: String = chars[index].to_lowercase().collect();
    name.extend(&chars[index + 1..]);
    if KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// `base`, or `base_1`, `base_2`, ... whichever is free first.
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        assert_eq!(default_name("javax.swing.JButton"), "button");
        assert_eq!(default_name("javax.swing.JPanel"), "panel");
        assert_eq!(default_name("demo.URLField"), "field");
        assert_eq!(default_name("org.eclipse.swt.widgets.Button"), "button");
        assert_eq!(default_name("demo.SWT"), "swt");
        assert_eq!(default_name("demo.widget"), "widget_");
        assert_eq!(default_name("demo.Class"), "class_");
    }

    #[test]
    fn test_unique_names() {
        let mut taken = HashSet::new();
        assert_eq!(unique_name("button", &taken), "button");
        taken.insert("button".to_string());
        assert_eq!(unique_name("button", &taken), "button_1");
        taken.insert("button_1".to_string());
        assert_eq!(unique_name("button", &taken), "button_2");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("okButton"));
        assert!(is_identifier("_x$1"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("new"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
