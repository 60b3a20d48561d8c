//! Resolves a dotted/indexed path string against a [`jtk_value::Value`] tree.
//!
//! Grammar: a bare leading identifier, then zero or more `.identifier` or
//! `[index]` / `["key"]` segments — e.g. `a.b[0].c` or `items[2]["key"]`.
//! This is a navigation path over an already-built tree, not a JSON Pointer
//! or JSONPath query language: no wildcards, slices, or filters.

use std::fmt;

use jtk_value::Value;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Failure resolving or parsing a path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string itself does not match the grammar.
    Syntax { path: String, reason: String },
    /// A `.key` or `["key"]` segment was applied to a non-object value.
    NotAnObject { path: String },
    /// A `[index]` segment was applied to a non-array value.
    NotAnArray { path: String },
    /// The object did not contain the requested key.
    KeyNotFound { path: String, key: String },
    /// The array index was out of range.
    IndexOutOfRange { path: String, index: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { path, reason } => write!(f, "invalid path '{path}': {reason}"),
            Self::NotAnObject { path } => write!(f, "'{path}' does not refer to an object"),
            Self::NotAnArray { path } => write!(f, "'{path}' does not refer to an array"),
            Self::KeyNotFound { path, key } => {
                write!(f, "'{path}' has no key '{key}'")
            }
            Self::IndexOutOfRange { path, index } => {
                write!(f, "'{path}' index {index} is out of range")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Resolve `path` against `root`, returning a shared reference to the node.
///
/// # Errors
///
/// Returns [`PathError::Syntax`] if `path` does not match the grammar, or a
/// traversal error (`NotAnObject`/`NotAnArray`/`KeyNotFound`/`IndexOutOfRange`)
/// if it does but `root`'s shape does not match it.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Result<&'a Value, PathError> {
    let segments = parse(path)?;
    let mut current = root;
    for segment in &segments {
        current = match segment {
            Segment::Key(key) => current
                .as_object()
                .map_err(|_| PathError::NotAnObject { path: path.to_string() })?
                .get(key)
                .ok_or_else(|| PathError::KeyNotFound {
                    path: path.to_string(),
                    key: key.clone(),
                })?,
            Segment::Index(index) => {
                let array = current
                    .as_array()
                    .map_err(|_| PathError::NotAnArray { path: path.to_string() })?;
                array.get(*index).ok_or_else(|| PathError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *index,
                })?
            }
        };
    }
    Ok(current)
}

/// Resolve `path` against `root`, returning a mutable reference to the node.
///
/// # Errors
///
/// Same failure modes as [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Value, PathError> {
    let segments = parse(path)?;
    let mut current = root;
    for segment in &segments {
        current = match segment {
            Segment::Key(key) => current
                .as_object_mut()
                .map_err(|_| PathError::NotAnObject { path: path.to_string() })?
                .get_mut(key)
                .ok_or_else(|| PathError::KeyNotFound {
                    path: path.to_string(),
                    key: key.clone(),
                })?,
            Segment::Index(index) => {
                let array = current
                    .as_array_mut()
                    .map_err(|_| PathError::NotAnArray { path: path.to_string() })?;
                let len = array.len();
                if *index >= len {
                    return Err(PathError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                    });
                }
                &mut array[*index]
            }
        };
    }
    Ok(current)
}

fn parse(path: &str) -> Result<Vec<Segment>, PathError> {
    let syntax_error = |reason: &str| PathError::Syntax {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();

    let leading = consume_identifier(&mut chars);
    if leading.is_empty() {
        return Err(syntax_error("path must start with an identifier"));
    }
    segments.push(Segment::Key(leading));

    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                let segment = consume_identifier(&mut chars);
                if segment.is_empty() {
                    return Err(syntax_error("empty property name after '.'"));
                }
                segments.push(Segment::Key(segment));
            }
            '[' => {
                chars.next();
                match chars.peek() {
                    Some('"' | '\'') => {
                        let quote = chars.next().unwrap_or('"');
                        let key = consume_until(&mut chars, quote);
                        if chars.next() != Some(']') {
                            return Err(syntax_error("missing closing ']' after quoted key"));
                        }
                        segments.push(Segment::Key(key));
                    }
                    _ => {
                        let digits = consume_until(&mut chars, ']');
                        let index: usize = digits
                            .parse()
                            .map_err(|_| syntax_error("expected a non-negative integer index"))?;
                        segments.push(Segment::Index(index));
                    }
                }
            }
            other => return Err(syntax_error(&format!("unexpected character '{other}'"))),
        }
    }

    Ok(segments)
}

fn consume_identifier(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(&c) = chars.peek() {
        if c == '.' || c == '[' {
            break;
        }
        s.push(c);
        chars.next();
    }
    s
}

fn consume_until(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, end: char) -> String {
    let mut s = String::new();
    for c in chars.by_ref() {
        if c == end {
            break;
        }
        s.push(c);
    }
    s
}
