//! Association and creation templates.
//!
//! Association templates describe the statement that attaches a child:
//!
//! - `%parent%.add(%child%)`: an invocation on the parent
//! - `constructor`: the parent is passed to the child's constructor
//! - `constructor; %parent%.setContent(%child%)`: both
//!
//! Creation templates are expressions with `%component.class%` and
//! `%parent%` placeholders.

use regex::Regex;

use crate::error::DescriptionError;

const PARENT: &str = "%parent%";
const CHILD: &str = "%child%";
const CLASS: &str = "%component.class%";

const INVOCATION_PATTERN: &str = r"^%parent%\.([A-Za-z_$][A-Za-z0-9_$]*)\((.*)\)$";

/// One argument of an invocation template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateArg {
    /// Where the child reference goes.
    Child,
    /// Fixed text, emitted as is. Any expression matches it when parsing.
    Fixed(String),
}

/// `%parent%.method(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationTemplate {
    pub method: String,
    pub args: Vec<TemplateArg>,
}

impl InvocationTemplate {
    fn parse(text: &str) -> Result<Self, DescriptionError> {
        let invalid = |message: &str| DescriptionError::Template {
            template: text.to_string(),
            message: message.to_string(),
        };
        let pattern = Regex::new(INVOCATION_PATTERN).map_err(|e| invalid(&e.to_string()))?;
        let captures = pattern
            .captures(text.trim())
            .ok_or_else(|| invalid("expected %parent%.method(...)"))?;
        let method = captures[1].to_string();
        let args: Vec<TemplateArg> = split_arguments(&captures[2])
            .into_iter()
            .map(|arg| {
                if arg == CHILD {
                    Ok(TemplateArg::Child)
                } else if arg.contains('%') {
                    Err(invalid("only %child% may appear in arguments"))
                } else {
                    Ok(TemplateArg::Fixed(arg))
                }
            })
            .collect::<Result<_, _>>()?;
        match args.iter().filter(|a| **a == TemplateArg::Child).count() {
            1 => Ok(Self { method, args }),
            _ => Err(invalid("%child% must appear exactly once")),
        }
    }

    /// Position of the child argument.
    pub fn child_index(&self) -> usize {
        self.args
            .iter()
            .position(|a| *a == TemplateArg::Child)
            .unwrap_or_default()
    }

    /// Whether a call `name(..)` with `arg_count` arguments and the child
    /// at `child_at` has this shape.
    pub fn matches(&self, name: &str, arg_count: usize, child_at: usize) -> bool {
        self.method == name && self.args.len() == arg_count && self.child_index() == child_at
    }

    /// The association statement. A parent reference of `this` is left out.
    pub fn render(&self, parent_ref: &str, child_ref: &str) -> String {
        let args: Vec<&str> = self
            .args
            .iter()
            .map(|arg| match arg {
                TemplateArg::Child => child_ref,
                TemplateArg::Fixed(text) => text.as_str(),
            })
            .collect();
        if parent_ref == "this" {
            format!("{}({});", self.method, args.join(", "))
        } else {
            format!("{parent_ref}.{}({});", self.method, args.join(", "))
        }
    }

    /// Offset of the child reference inside [`render`](Self::render)'s output.
    pub fn child_offset(&self, parent_ref: &str) -> usize {
        let receiver = if parent_ref == "this" {
            0
        } else {
            parent_ref.len() + 1
        };
        let mut offset = receiver + self.method.len() + 1;
        for arg in &self.args {
            match arg {
                TemplateArg::Child => return offset,
                TemplateArg::Fixed(text) => offset += text.len() + 2,
            }
        }
        offset
    }
}

/// How a container attaches its children in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationTemplate {
    Invocation(InvocationTemplate),
    /// The parent is a constructor argument of the child.
    Constructor,
    /// Constructor argument followed by an invocation.
    Compound(InvocationTemplate),
}

impl AssociationTemplate {
    /// Parse a template string.
    pub fn parse(text: &str) -> Result<Self, DescriptionError> {
        let parts: Vec<&str> = text.split(';').map(str::trim).filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            ["constructor"] => Ok(Self::Constructor),
            ["constructor", invocation] => Ok(Self::Compound(InvocationTemplate::parse(invocation)?)),
            [invocation] => Ok(Self::Invocation(InvocationTemplate::parse(invocation)?)),
            _ => Err(DescriptionError::Template {
                template: text.to_string(),
                message: "expected an invocation, 'constructor' or both".to_string(),
            }),
        }
    }

    /// The invocation part, if any.
    pub fn invocation(&self) -> Option<&InvocationTemplate> {
        match self {
            Self::Invocation(invocation) | Self::Compound(invocation) => Some(invocation),
            Self::Constructor => None,
        }
    }

    /// Whether the child's constructor receives the parent.
    pub fn uses_constructor(&self) -> bool {
        matches!(self, Self::Constructor | Self::Compound(_))
    }
}

/// An expression template for creating a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationTemplate {
    pub id: String,
    pub source: String,
    /// Types the expression refers to by simple name.
    pub imports: Vec<String>,
}

impl CreationTemplate {
    /// Whether the expression needs a parent reference.
    pub fn needs_parent(&self) -> bool {
        self.source.contains(PARENT)
    }

    /// Substitute the placeholders.
    pub fn render(&self, class_ref: &str, parent_ref: Option<&str>) -> String {
        let text = self.source.replace(CLASS, class_ref);
        match parent_ref {
            Some(parent) => text.replace(PARENT, parent),
            None => text,
        }
    }
}

/// Split a comma-separated argument list, respecting nesting and strings.
pub(crate) fn split_arguments(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut current = String::new();
    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' | '<' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' | '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => args.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    let last = current.trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }
    args
}
