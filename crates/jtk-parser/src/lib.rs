//! Recursive-descent parser: token sequence → [`jtk_value::Value`].
//!
//! Grammar:
//!
//! ```text
//! value  := object | array | STRING | NUMBER | TRUE | FALSE | NULL
//! object := '{' (pair (',' pair)*)? '}'
//! pair   := STRING ':' value
//! array  := '[' (value (',' value)*)? ']'
//! ```
//!
//! A trailing comma before a closing delimiter is rejected. Duplicate
//! object keys silently keep the last assignment. Parsing stops at the
//! first violation — there is no error recovery here; [`jtk_validate`] is
//! the continue-on-error sibling of this crate.

mod error;

use std::collections::BTreeMap;

use jtk_lexer::{Token, TokenKind};
use jtk_value::Value;

pub use error::ParseError;

/// Default maximum nesting depth, past which [`parse`] fails rather than
/// risk overflowing the call stack on adversarial input.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parse `input` as a single complete JSON text, using [`DEFAULT_MAX_DEPTH`].
///
/// # Errors
///
/// Returns a [`ParseError`] on the first lexical or grammatical violation.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    parse_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parse `input`, bailing out with "maximum nesting depth exceeded" once
/// object/array nesting passes `max_depth`.
///
/// # Errors
///
/// Returns a [`ParseError`] on the first lexical or grammatical violation,
/// including depth overflow.
pub fn parse_with_max_depth(input: &str, max_depth: usize) -> Result<Value, ParseError> {
    let _span = tracing::trace_span!("parse", bytes = input.len()).entered();
    let tokens = jtk_lexer::tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        max_depth,
        depth: 0,
    };
    let value = parser.parse_value()?;
    let trailing = parser.current();
    if trailing.kind != TokenKind::Eof {
        return Err(ParseError::new(
            trailing.line,
            trailing.column,
            "unexpected trailing data after JSON value",
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> &'a Token {
        let token = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn enter_container(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let current = self.current();
            return Err(ParseError::new(
                current.line,
                current.column,
                "maximum nesting depth exceeded",
            ));
        }
        Ok(())
    }

    fn leave_container(&mut self) {
        self.depth -= 1;
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&'a Token, ParseError> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            let current = self.current();
            Err(ParseError::new(
                current.line,
                current.column,
                format!("{message}, found {:?}", current.kind),
            ))
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.current().kind {
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::String => Ok(Value::String(self.advance().value.clone())),
            TokenKind::Number => self.parse_number(),
            TokenKind::True => {
                self.advance();
                Ok(Value::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Value::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Value::Null)
            }
            other => {
                let current = self.current();
                Err(ParseError::new(
                    current.line,
                    current.column,
                    format!("unexpected token {other:?}"),
                ))
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let token = self.advance();
        let n: f64 = token.value.parse().map_err(|_| {
            ParseError::new(token.line, token.column, format!("invalid number '{}'", token.value))
        })?;
        if !n.is_finite() {
            return Err(ParseError::new(
                token.line,
                token.column,
                format!("number '{}' is not finite", token.value),
            ));
        }
        Ok(Value::Number(n))
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.expect(TokenKind::LBrace, "expected '{'")?;
        self.enter_container()?;

        let mut object = BTreeMap::new();
        if self.current().kind == TokenKind::RBrace {
            self.advance();
            self.leave_container();
            return Ok(Value::Object(object));
        }

        loop {
            let key_token = self.expect(TokenKind::String, "expected string key")?;
            let key = key_token.value.clone();
            self.expect(TokenKind::Colon, "expected ':'")?;
            let value = self.parse_value()?;
            object.insert(key, value);

            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                    if self.current().kind == TokenKind::RBrace {
                        let current = self.current();
                        return Err(ParseError::new(
                            current.line,
                            current.column,
                            "trailing comma before '}' is not allowed",
                        ));
                    }
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                _ => {
                    let current = self.current();
                    return Err(ParseError::new(
                        current.line,
                        current.column,
                        "expected ',' or '}'",
                    ));
                }
            }
        }

        self.leave_container();
        Ok(Value::Object(object))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.expect(TokenKind::LBracket, "expected '['")?;
        self.enter_container()?;

        let mut array = Vec::new();
        if self.current().kind == TokenKind::RBracket {
            self.advance();
            self.leave_container();
            return Ok(Value::Array(array));
        }

        loop {
            array.push(self.parse_value()?);

            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                    if self.current().kind == TokenKind::RBracket {
                        let current = self.current();
                        return Err(ParseError::new(
                            current.line,
                            current.column,
                            "trailing comma before ']' is not allowed",
                        ));
                    }
                }
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                _ => {
                    let current = self.current();
                    return Err(ParseError::new(
                        current.line,
                        current.column,
                        "expected ',' or ']'",
                    ));
                }
            }
        }

        self.leave_container();
        Ok(Value::Array(array))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_and_array() {
        assert_eq!(parse("{}").unwrap(), Value::Object(BTreeMap::new()));
        assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn nested_structure_round_trips_into_tree() {
        let value = parse(r#"{"a": [1, 2, {"b": null}], "c": true}"#).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["c"], Value::Bool(true));
        let array = obj["a"].as_array().unwrap();
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let value = parse(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(value.as_object().unwrap()["a"], Value::Number(2.0));
    }

    #[test]
    fn trailing_comma_in_object_is_an_error() {
        let err = parse(r#"{"a": 1,}"#).unwrap_err();
        assert!(err.message.contains("trailing comma"));
    }

    #[test]
    fn trailing_comma_in_array_is_an_error() {
        let err = parse("[1, 2,]").unwrap_err();
        assert!(err.message.contains("trailing comma"));
    }

    #[test]
    fn trailing_data_after_root_is_an_error() {
        let err = parse("1 2").unwrap_err();
        assert!(err.message.contains("trailing data"));
    }

    #[test]
    fn non_string_key_is_an_error() {
        let err = parse("{1: 2}").unwrap_err();
        assert!(err.message.contains("expected string key"));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let nested: String = "[".repeat(5) + &"]".repeat(5);
        assert!(parse_with_max_depth(&nested, 3).is_err());
        assert!(parse_with_max_depth(&nested, 10).is_ok());
    }

    #[test]
    fn numbers_parse_to_binary64() {
        assert_eq!(parse("-12.5e2").unwrap(), Value::Number(-1250.0));
        assert_eq!(parse("0").unwrap(), Value::Number(0.0));
    }

    #[test]
    fn lexer_errors_propagate_as_parse_errors() {
        let err = parse("{\"a\": tru}").unwrap_err();
        assert!(err.message.contains("unknown keyword"));
    }
}
