use std::fmt;

/// A grammar violation encountered while building a tree from tokens.
///
/// Carries the 1-based position of the offending token, matching
/// [`jtk_lexer::LexError`]'s shape so the two compose cleanly in callers
/// that need "either a lex or a parse error happened".
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

impl From<jtk_lexer::LexError> for ParseError {
    fn from(err: jtk_lexer::LexError) -> Self {
        Self::new(err.line, err.column, err.message)
    }
}
