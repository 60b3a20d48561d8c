//! Hand-written RFC 8259 JSON lexer.
//!
//! Turns a `&str` (already validated as UTF-8 by its owner) into a flat
//! [`Vec<Token>`] ending in a single [`TokenKind::Eof`]. Structural
//! characters, strings (with `\u` surrogate-pair decoding), numbers, and the
//! three keywords are the full token vocabulary — there is no trivia
//! (comments, trailing commas) to preserve, unlike a source-preserving CST
//! lexer.

mod error;
mod token;

pub use error::LexError;
pub use token::{Token, TokenKind};

/// Tokenize `input` into an ordered token sequence, ending with one `Eof`.
///
/// # Errors
///
/// Returns the first [`LexError`] encountered; no further tokens are
/// produced once an error is returned.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let _span = tracing::trace_span!("tokenize", bytes = input.len()).entered();
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tracing::trace!(tokens = tokens.len(), "tokenize complete");
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.remaining().chars();
        chars.next();
        chars.next()
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", line, column));
        };

        let kind_and_value = match c {
            '{' => Some((TokenKind::LBrace, "{".to_string())),
            '}' => Some((TokenKind::RBrace, "}".to_string())),
            '[' => Some((TokenKind::LBracket, "[".to_string())),
            ']' => Some((TokenKind::RBracket, "]".to_string())),
            ':' => Some((TokenKind::Colon, ":".to_string())),
            ',' => Some((TokenKind::Comma, ",".to_string())),
            _ => None,
        };
        if let Some((kind, value)) = kind_and_value {
            self.bump();
            return Ok(Token::new(kind, value, line, column));
        }

        match c {
            '"' => self.lex_string(line, column),
            '-' | '0'..='9' => self.lex_number(line, column),
            c if c.is_ascii_alphabetic() => self.lex_keyword(line, column),
            other => Err(LexError::new(
                line,
                column,
                format!("unexpected character '{other}'"),
            )),
        }
    }

    fn lex_string(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        self.bump(); // opening quote
        let mut value = String::new();

        loop {
            let Some(c) = self.peek() else {
                return Err(LexError::new(line, column, "unterminated string"));
            };

            match c {
                '"' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::String, value, line, column));
                }
                '\\' => {
                    self.bump();
                    self.lex_escape(&mut value)?;
                }
                c if (c as u32) < 0x20 => {
                    return Err(LexError::new(
                        self.line,
                        self.column,
                        "control character in string",
                    ));
                }
                c => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    fn lex_escape(&mut self, out: &mut String) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        let Some(c) = self.bump() else {
            return Err(LexError::new(
                line,
                column,
                "unexpected end of input after escape",
            ));
        };
        match c {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let cp = self.lex_unicode_escape()?;
                if (0xD800..=0xDBFF).contains(&cp) {
                    let (line2, column2) = (self.line, self.column);
                    if self.peek() != Some('\\') || self.peek2() != Some('u') {
                        return Err(LexError::new(
                            line2,
                            column2,
                            "expected low surrogate after high surrogate",
                        ));
                    }
                    self.bump(); // backslash
                    self.bump(); // 'u'
                    let low = self.lex_unicode_escape()?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(LexError::new(line2, column2, "invalid low surrogate"));
                    }
                    let combined = 0x10000 + ((cp - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined).ok_or_else(|| {
                        LexError::new(line2, column2, "invalid surrogate pair")
                    })?);
                } else if (0xDC00..=0xDFFF).contains(&cp) {
                    return Err(LexError::new(line, column, "lone low surrogate"));
                } else {
                    out.push(char::from_u32(cp).ok_or_else(|| {
                        LexError::new(line, column, "invalid unicode escape")
                    })?);
                }
            }
            other => {
                return Err(LexError::new(
                    line,
                    column,
                    format!("invalid escape sequence '\\{other}'"),
                ));
            }
        }
        Ok(())
    }

    fn lex_unicode_escape(&mut self) -> Result<u32, LexError> {
        let (line, column) = (self.line, self.column);
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.bump();
                }
                _ => return Err(LexError::new(line, column, "expected 4 hex digits")),
            }
        }
        u32::from_str_radix(&hex, 16)
            .map_err(|_| LexError::new(line, column, "expected 4 hex digits"))
    }

    fn lex_number(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.bump();
        }

        match self.peek() {
            Some('0') => {
                self.bump();
            }
            Some(c) if c.is_ascii_digit() => {
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            }
            _ => return Err(LexError::new(self.line, self.column, "expected digit")),
        }

        if self.pos > start {
            let int_part = &self.input[start..self.pos];
            let digits = int_part.trim_start_matches('-');
            if digits.len() > 1 && digits.starts_with('0') {
                return Err(LexError::new(line, column, "leading zero in number"));
            }
        }

        if self.peek() == Some('.') {
            self.bump();
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(LexError::new(
                    self.line,
                    self.column,
                    "expected digit after decimal point",
                ));
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(LexError::new(
                    self.line,
                    self.column,
                    "expected digit in exponent",
                ));
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }

        let lexeme = self.input[start..self.pos].to_string();
        Ok(Token::new(TokenKind::Number, lexeme, line, column))
    }

    fn lex_keyword(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        let word = &self.input[start..self.pos];
        match word {
            "true" => Ok(Token::new(TokenKind::True, word, line, column)),
            "false" => Ok(Token::new(TokenKind::False, word, line, column)),
            "null" => Ok(Token::new(TokenKind::Null, word, line, column)),
            other => Err(LexError::new(
                line,
                column,
                format!("unknown keyword '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn structural_tokens() {
        let tokens = tokenize("{}[]:,").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn whitespace_tracks_line_and_column() {
        let tokens = tokenize("  \n  true").unwrap();
        let true_tok = &tokens[0];
        assert_eq!(true_tok.line, 2);
        assert_eq!(true_tok.column, 3);
    }

    #[test]
    fn string_with_escapes() {
        let tokens = tokenize(r#""a\nb\tc""#).unwrap();
        assert_eq!(tokens[0].value, "a\nb\tc");
    }

    #[test]
    fn string_with_surrogate_pair() {
        let tokens = tokenize(r#""😀""#).unwrap();
        assert_eq!(tokens[0].value, "\u{1F600}");
        assert_eq!(tokens[0].value.as_bytes(), &[0xF0, 0x9F, 0x98, 0x80]);
    }

    #[test]
    fn lone_high_surrogate_errors() {
        let err = tokenize(r#""\uD800""#).unwrap_err();
        assert!(err.message.contains("low surrogate"));
    }

    #[test]
    fn control_character_in_string_errors() {
        let err = tokenize("\"a\u{7}b\"").unwrap_err();
        assert!(err.message.contains("control character"));
    }

    #[test]
    fn number_lexeme_is_preserved_raw() {
        let tokens = tokenize("-12.5e+10").unwrap();
        assert_eq!(tokens[0].value, "-12.5e+10");
    }

    #[test]
    fn leading_zero_is_an_error() {
        let err = tokenize("01").unwrap_err();
        assert!(err.message.contains("leading zero"));
    }

    #[test]
    fn zero_alone_is_fine() {
        let tokens = tokenize("0").unwrap();
        assert_eq!(tokens[0].value, "0");
    }

    #[test]
    fn keywords() {
        let tokens = tokenize("true false null").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let err = tokenize("tru").unwrap_err();
        assert!(err.message.contains("unknown keyword"));
    }

    #[test]
    fn eof_emitted_exactly_once() {
        let tokens = tokenize("1").unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }
}
