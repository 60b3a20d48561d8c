//! Shared diagnostic types used by every component of the JSON toolkit.
//!
//! Lexing, parsing, and validation all report failures as a [`Diagnostic`]:
//! a 1-based line/column, a human-readable message, and (when available) a
//! snippet of the offending source line truncated to [`CONTEXT_LIMIT`] bytes.
//! Keeping this as its own crate means `jtk-lexer`/`jtk-parser`/`jtk-validate`
//! never need to agree with each other directly on error shape — they all
//! just produce `Diagnostic`s.

use std::fmt;

use miette::{LabeledSpan, SourceSpan};
use thiserror::Error;

/// Source snippets attached to a diagnostic are truncated to this many bytes.
pub const CONTEXT_LIMIT: usize = 60;

/// A single line/column-addressed problem found in a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub context: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(truncate_context(&context.into()));
        self
    }

    #[must_use]
    pub fn with_context_opt(self, context: Option<String>) -> Self {
        match context {
            Some(context) => self.with_context(context),
            None => self,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  {context}")?;
        }
        Ok(())
    }
}

/// Truncate a source line to [`CONTEXT_LIMIT`] bytes on a char boundary.
#[must_use]
pub fn truncate_context(line: &str) -> String {
    if line.len() <= CONTEXT_LIMIT {
        return line.to_string();
    }
    let mut end = CONTEXT_LIMIT;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &line[..end])
}

/// Convert a byte offset into 1-based (line, column).
///
/// Returns `(1, 1)` if the offset is 0 or the content is empty.
#[must_use]
pub fn offset_to_line_col(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Extract the source line at `line` (1-based), for use as diagnostic context.
#[must_use]
pub fn line_context(content: &str, line: usize) -> Option<String> {
    content.lines().nth(line.checked_sub(1)?).map(str::to_string)
}

/// A `miette`-renderable wrapper around a batch of [`Diagnostic`]s for one
/// named source. Core components never depend on this directly; it lives at
/// the crate boundary for callers that want fancy terminal rendering.
#[derive(Debug, Error)]
#[error("{} diagnostic(s) in {name}", .diagnostics.len())]
pub struct Report {
    pub name: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl miette::Diagnostic for Report {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let spans: Vec<_> = self
            .diagnostics
            .iter()
            .map(|d| {
                let offset = line_col_to_offset(&self.source, d.line, d.column);
                LabeledSpan::new(Some(d.message.clone()), offset, 1)
            })
            .collect();
        Some(Box::new(spans.into_iter()))
    }
}

fn line_col_to_offset(content: &str, line: usize, column: usize) -> usize {
    let mut cur_line = 1;
    let mut offset = 0;
    for (i, ch) in content.char_indices() {
        if cur_line == line {
            return offset + (column - 1);
        }
        if ch == '\n' {
            cur_line += 1;
            offset = i + 1;
        }
    }
    offset
}

impl Report {
    #[must_use]
    pub fn span_for(&self, diagnostic: &Diagnostic) -> SourceSpan {
        let offset = line_col_to_offset(&self.source, diagnostic.line, diagnostic.column);
        (offset, 1).into()
    }
}
