//! Syntax-only JSON validation: same grammar as [`jtk_parser`], but without
//! building a tree, with an optional continue-on-error recovery mode, and
//! with `tokens_consumed`/`lines_consumed` counters reflecting how far
//! validation actually got before it stopped.

use jtk_diagnostics::{truncate_context, Diagnostic};
use jtk_lexer::{Token, TokenKind};

/// Whether the validator stops at the first diagnostic or keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop at the first diagnostic; at most one diagnostic is ever recorded.
    Strict,
    /// After each diagnostic, run `synchronize()` and keep validating so the
    /// caller sees every independent defect in one pass.
    Recovery,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub tokens_consumed: usize,
    pub lines_consumed: usize,
}

/// Validate `input` in [`Mode::Strict`]: stop at the first diagnostic.
#[must_use]
pub fn validate_strict(input: &str) -> ValidationResult {
    validate(input, Mode::Strict)
}

/// Validate `input` in [`Mode::Recovery`]: collect every diagnostic reachable
/// via `synchronize()`.
#[must_use]
pub fn validate_recovery(input: &str) -> ValidationResult {
    validate(input, Mode::Recovery)
}

/// Validate `input` in the given [`Mode`].
#[must_use]
pub fn validate(input: &str, mode: Mode) -> ValidationResult {
    let _span = tracing::trace_span!("validate", bytes = input.len(), mode = ?mode).entered();

    let tokens = match jtk_lexer::tokenize(input) {
        Ok(tokens) => tokens,
        Err(err) => {
            let diagnostic = Diagnostic::new(err.line, err.column, err.message)
                .with_context(context_for_line(input, err.line));
            return ValidationResult {
                valid: false,
                diagnostics: vec![diagnostic],
                tokens_consumed: 0,
                lines_consumed: err.line,
            };
        }
    };

    if tokens.len() == 1 {
        // Only the synthetic Eof token: the input had no content at all.
        return ValidationResult {
            valid: false,
            diagnostics: vec![Diagnostic::new(1, 1, "empty JSON document")],
            tokens_consumed: 0,
            lines_consumed: 1,
        };
    }

    let mut validator = Validator {
        input,
        tokens: &tokens,
        pos: 0,
        mode,
        max_depth: jtk_parser::DEFAULT_MAX_DEPTH,
        diagnostics: Vec::new(),
    };
    validator.validate_value(0);

    if !validator.is_at_end() {
        validator.add_error("unexpected trailing data after JSON value");
    }

    ValidationResult {
        valid: validator.diagnostics.is_empty(),
        diagnostics: validator.diagnostics,
        tokens_consumed: validator.pos,
        lines_consumed: validator.current().line,
    }
}

fn context_for_line(input: &str, line: usize) -> Option<String> {
    input.lines().nth(line.checked_sub(1)?).map(truncate_context)
}

const VALUE_START: &[TokenKind] = &[
    TokenKind::LBrace,
    TokenKind::LBracket,
    TokenKind::String,
    TokenKind::Number,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Null,
];

struct Validator<'a> {
    input: &'a str,
    tokens: &'a [Token],
    pos: usize,
    mode: Mode,
    max_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    fn current(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn should_stop(&self) -> bool {
        self.mode == Mode::Strict && !self.diagnostics.is_empty()
    }

    fn add_error(&mut self, message: impl Into<String>) {
        let current = self.current();
        let context = context_for_line(self.input, current.line);
        self.diagnostics.push(
            Diagnostic::new(current.line, current.column, message).with_context_opt(context),
        );
    }

    /// Discard tokens until one of `, } ] EOF` or the start of a new value
    /// reappears, so validation can resume after a defect.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            let kind = self.current().kind;
            if matches!(kind, TokenKind::Comma | TokenKind::RBrace | TokenKind::RBracket)
                || VALUE_START.contains(&kind)
            {
                return;
            }
            self.advance();
        }
    }

    fn validate_value(&mut self, depth: usize) -> bool {
        if self.should_stop() {
            return false;
        }
        match self.current().kind {
            TokenKind::LBrace => self.validate_object(depth),
            TokenKind::LBracket => self.validate_array(depth),
            TokenKind::String | TokenKind::Number | TokenKind::True | TokenKind::False | TokenKind::Null => {
                self.advance();
                true
            }
            TokenKind::RBrace => {
                self.add_error("unexpected closing brace '}'");
                false
            }
            TokenKind::RBracket => {
                self.add_error("unexpected closing bracket ']'");
                false
            }
            TokenKind::Comma => {
                self.add_error("unexpected comma");
                false
            }
            TokenKind::Colon => {
                self.add_error("unexpected colon");
                false
            }
            TokenKind::Eof => {
                self.add_error("unexpected end of input");
                false
            }
        }
    }

    fn validate_object(&mut self, depth: usize) -> bool {
        self.advance(); // '{'
        let depth = depth + 1;
        if depth > self.max_depth {
            self.add_error("maximum nesting depth exceeded");
            return false;
        }
        if self.check(TokenKind::RBrace) {
            self.advance();
            return true;
        }

        let mut had_error = false;
        loop {
            if !self.check(TokenKind::String) {
                self.add_error("expected string key in object");
                had_error = true;
                if self.mode == Mode::Strict {
                    return false;
                }
                self.synchronize();
                if self.check(TokenKind::RBrace) {
                    self.advance();
                    return !had_error;
                }
                if self.check(TokenKind::Comma) {
                    self.advance();
                }
                continue;
            }
            self.advance(); // key

            if !self.check(TokenKind::Colon) {
                self.add_error("expected ':' after key");
                had_error = true;
                if self.mode == Mode::Strict {
                    return false;
                }
                if !VALUE_START.contains(&self.current().kind) {
                    self.synchronize();
                    continue;
                }
            } else {
                self.advance(); // ':'
            }

            if !self.validate_value(depth) {
                had_error = true;
                if self.mode == Mode::Strict {
                    return false;
                }
                self.synchronize();
            }

            if self.check(TokenKind::Comma) {
                self.advance();
                if self.check(TokenKind::RBrace) {
                    self.add_error("trailing comma before '}' is not allowed");
                    had_error = true;
                    if self.mode == Mode::Strict {
                        return false;
                    }
                    self.advance();
                    return !had_error;
                }
            } else if self.check(TokenKind::RBrace) {
                self.advance();
                return !had_error;
            } else {
                self.add_error("expected ',' or '}' in object");
                had_error = true;
                if self.mode == Mode::Strict {
                    return false;
                }
                self.synchronize();
                if self.check(TokenKind::RBrace) {
                    self.advance();
                    return !had_error;
                }
                if self.is_at_end() {
                    self.add_error("unterminated object (missing '}')");
                    return false;
                }
            }
        }
    }

    fn validate_array(&mut self, depth: usize) -> bool {
        self.advance(); // '['
        let depth = depth + 1;
        if depth > self.max_depth {
            self.add_error("maximum nesting depth exceeded");
            return false;
        }
        if self.check(TokenKind::RBracket) {
            self.advance();
            return true;
        }

        let mut had_error = false;
        loop {
            if !self.validate_value(depth) {
                had_error = true;
                if self.mode == Mode::Strict {
                    return false;
                }
                self.synchronize();
            }

            if self.check(TokenKind::Comma) {
                self.advance();
                if self.check(TokenKind::RBracket) {
                    self.add_error("trailing comma before ']' is not allowed");
                    had_error = true;
                    if self.mode == Mode::Strict {
                        return false;
                    }
                    self.advance();
                    return !had_error;
                }
            } else if self.check(TokenKind::RBracket) {
                self.advance();
                return !had_error;
            } else {
                self.add_error("expected ',' or ']' in array");
                had_error = true;
                if self.mode == Mode::Strict {
                    return false;
                }
                self.synchronize();
                if self.check(TokenKind::RBracket) {
                    self.advance();
                    return !had_error;
                }
                if self.is_at_end() {
                    self.add_error("unterminated array (missing ']')");
                    return false;
                }
            }
        }
    }
}
