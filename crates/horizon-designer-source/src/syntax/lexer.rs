//! Tokenizer for the Java subset.
//!
//! Comments and whitespace are dropped. Keywords are returned as
//! [`TokenKind::Ident`]; the parser decides what they mean.

use crate::error::SyntaxError;
use crate::span::Span;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Numeric literal.
    Number,
    /// String literal, quotes included.
    Str,
    /// Character literal, quotes included.
    Char,
    /// Operator or separator.
    Punct,
}

/// A token and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Category.
    pub kind: TokenKind,
    /// Location in the source.
    pub span: Span,
}

// Longest first.
const PUNCTS: &[&str] = &[
    ">>>=", "<<=", ">>=", ">>>", "...", "->", "::", "==", "!=", "<=", ">=", "&&", "||", "++",
    "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>",
];

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if source[pos..].starts_with("//") {
            pos = source[pos..].find('\n').map_or(bytes.len(), |i| pos + i);
            continue;
        }
        if source[pos..].starts_with("/*") {
            let Some(close) = source[pos + 2..].find("*/") else {
                return Err(SyntaxError::at(source, pos, "unterminated comment"));
            };
            pos += 2 + close + 2;
            continue;
        }

        let start = pos;
        let kind = if b == b'"' || b == b'\'' {
            pos = scan_quoted(source, pos, b)?;
            if b == b'"' { TokenKind::Str } else { TokenKind::Char }
        } else if b.is_ascii_digit() || (b == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit)) {
            pos += 1;
            while pos < bytes.len() {
                let c = bytes[pos];
                let exponent_sign = (c == b'+' || c == b'-')
                    && matches!(bytes[pos - 1], b'e' | b'E')
                    && !source[start..pos].starts_with("0x");
                if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' || exponent_sign {
                    pos += 1;
                } else {
                    break;
                }
            }
            TokenKind::Number
        } else if is_ident_start(source, pos) {
            while pos < bytes.len() && is_ident_continue(source, pos) {
                pos += source[pos..].chars().next().map_or(1, char::len_utf8);
            }
            TokenKind::Ident
        } else {
            let punct = PUNCTS.iter().find(|p| source[pos..].starts_with(**p));
            pos += punct.map_or_else(
                || source[pos..].chars().next().map_or(1, char::len_utf8),
                |p| p.len(),
            );
            TokenKind::Punct
        };
        tokens.push(Token {
            kind,
            span: Span::new(start, pos),
        });
    }

    tracing::trace!(target: "horizon_designer_source::lexer", count = tokens.len(), "tokenized source");
    Ok(tokens)
}

fn scan_quoted(source: &str, start: usize, quote: u8) -> Result<usize, SyntaxError> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => break,
            c if c == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(SyntaxError::at(source, start, "unterminated literal"))
}

fn is_ident_start(source: &str, pos: usize) -> bool {
    source[pos..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
}

fn is_ident_continue(source: &str, pos: usize) -> bool {
    source[pos..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        tokenize(source)
            .unwrap()
            .iter()
            .map(|t| &source[t.span.range()])
            .collect()
    }

    #[test]
    fn test_skips_comments() {
        assert_eq!(
            texts("a /* b */ c // d\n e"),
            vec!["a", "c", "e"]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(texts("x >>>= 1; a->b"), vec!["x", ">>>=", "1", ";", "a", "->", "b"]);
    }

    #[test]
    fn test_literals() {
        let tokens = tokenize(r#"s = "a \" b"; c = '\n'; n = 1.5e-3f;"#).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds[2], TokenKind::Str);
        assert_eq!(kinds[6], TokenKind::Char);
        assert_eq!(kinds[10], TokenKind::Number);
        assert_eq!(tokens.len(), 12);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("class A { /* never closed").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }
}
