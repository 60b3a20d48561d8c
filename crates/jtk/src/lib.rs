//! A JSON processing toolkit: lexing, tree-building parsing, syntax
//! validation (with error recovery), canonical serialization, and a
//! partition-and-parallelize path for large top-level arrays.
//!
//! This crate re-exports the public surface of its component crates under
//! one namespace — `jtk-lexer`, `jtk-value`, `jtk-parser`, `jtk-validate`,
//! `jtk-serialize`, `jtk-partition`, `jtk-parallel`, and `jtk-path` — the
//! same way the reference workspace's top-level binary crate binds its many
//! single-purpose library crates together. Unlike that reference workspace,
//! `jtk` itself is a library: there is no bundled CLI.

pub use jtk_diagnostics::{Diagnostic, Report, CONTEXT_LIMIT};
pub use jtk_lexer::{tokenize, LexError, Token, TokenKind};
pub use jtk_parallel::{
    parallel_parse, parallel_validate, ParallelError, ParallelOptions, ParallelValidation,
    Progress, ProgressCallback,
};
pub use jtk_parser::{parse, parse_with_max_depth, ParseError, DEFAULT_MAX_DEPTH};
pub use jtk_partition::{partition, ChunkRange};
pub use jtk_path::{resolve, resolve_mut, PathError};
pub use jtk_serialize::{serialize, write_to, Options as SerializeOptions};
pub use jtk_validate::{validate, validate_recovery, validate_strict, Mode, ValidationResult};
pub use jtk_value::{Value, ValueError};

use std::io::Write as _;
use std::path::Path;

/// Serialize `value` and write it to `path`, with a trailing newline —
/// mirrors the original toolkit's file-saving convenience, kept at this
/// I/O-free-core/I/O-at-the-edge boundary so `jtk-serialize` itself never
/// touches the filesystem.
///
/// # Errors
///
/// Returns any [`std::io::Error`] from creating or writing the file.
pub fn write_file(value: &Value, options: &SerializeOptions, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let rendered = serialize(value, options);
    file.write_all(rendered.as_bytes())?;
    file.write_all(b"\n")
}

/// Install a `tracing-tree`-backed subscriber with the given `env_filter`
/// directive (e.g. `"info"`, `"debug"`, `"jtk_parallel=trace"`). Intended
/// for binaries and integration tests embedding this crate; library code
/// never calls this itself.
pub fn init_tracing(env_filter: &str) {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_new(env_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

/// Build a [`Report`] over `source`, named `name`, suitable for `miette`'s
/// fancy terminal rendering — the seam where diagnostics, produced deep
/// inside `jtk-validate`/`jtk-parallel` without any `miette` dependency,
/// meet the presentation layer.
#[must_use]
pub fn report(name: impl Into<String>, source: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Report {
    Report {
        name: name.into(),
        source: source.into(),
        diagnostics,
    }
}
