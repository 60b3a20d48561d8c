//! Parallel parse/validate coordinator.
//!
//! Fans [`jtk_parser`] or [`jtk_validate`] out over the chunk ranges
//! [`jtk_partition`] produces, on a dedicated `rayon::ThreadPool`. Chunk `i`
//! is statically assigned to worker `i mod W` — work is never stolen across
//! that assignment for correctness purposes, though rayon's own scheduler
//! may still steal internally; external observers only ever see results
//! merged back in chunk order, so completion order never leaks out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use jtk_diagnostics::Diagnostic;
use jtk_parser::ParseError;
use jtk_value::Value;

/// Shared, lock-free progress counters updated as chunks complete.
#[derive(Debug, Default)]
pub struct Progress {
    pub processed_chunks: AtomicUsize,
    pub processed_bytes: AtomicUsize,
    pub errors_found: AtomicUsize,
}

/// A callback invoked after each chunk completes. Must tolerate being
/// called concurrently from any worker thread.
pub type ProgressCallback = dyn Fn(&Progress) + Send + Sync;

/// Tuning knobs for the worker pool and the per-chunk parser.
#[derive(Debug, Clone, Copy)]
pub struct ParallelOptions {
    pub workers: usize,
    pub max_depth: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        let logical = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            workers: logical.saturating_sub(1).max(1),
            max_depth: jtk_parser::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything that can go wrong dispatching a parallel parse.
#[derive(Debug, thiserror::Error)]
pub enum ParallelError {
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The merged outcome of a parallel validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelValidation {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `input` (expected to be UTF-8 JSON whose top level is an array),
/// splitting it into chunks and parsing them concurrently, then
/// concatenating the per-chunk elements in file order.
///
/// Falls back to an ordinary sequential parse when [`jtk_partition::partition`]
/// cannot find more than one chunk (non-array input, or too few elements to
/// split).
///
/// # Errors
///
/// Returns the first chunk's [`ParseError`] (by chunk order, not completion
/// order), with its line number remapped back into `input`'s coordinate
/// space.
pub fn parallel_parse(
    input: &[u8],
    options: &ParallelOptions,
    progress: Option<&ProgressCallback>,
) -> Result<Value, ParallelError> {
    let ranges = jtk_partition::partition(input, options.workers);
    let text = std::str::from_utf8(input)?;

    if ranges.len() <= 1 {
        return Ok(jtk_parser::parse_with_max_depth(text, options.max_depth)?);
    }

    let worker_count = options.workers.max(1);
    let _span =
        tracing::info_span!("parallel_parse", chunks = ranges.len(), workers = worker_count)
            .entered();

    let pool = build_pool(worker_count)?;
    let progress_state = Progress::default();
    let slots: Vec<Mutex<Option<Result<Vec<Value>, ParseError>>>> =
        (0..ranges.len()).map(|_| Mutex::new(None)).collect();

    pool.scope(|scope| {
        for worker in 0..worker_count {
            let ranges = &ranges;
            let slots = &slots;
            let progress_state = &progress_state;
            scope.spawn(move |_| {
                let mut i = worker;
                while i < ranges.len() {
                    let range = ranges[i];
                    let synthetic = wrap_as_array(range.slice(input));
                    let outcome = jtk_parser::parse_with_max_depth(&synthetic, options.max_depth)
                        .map(flatten_chunk_array)
                        .map_err(|err| remap_parse_error(err, range.line_offset));

                    progress_state.processed_chunks.fetch_add(1, Ordering::SeqCst);
                    progress_state
                        .processed_bytes
                        .fetch_add(range.byte_end - range.byte_start, Ordering::SeqCst);
                    if outcome.is_err() {
                        progress_state.errors_found.fetch_add(1, Ordering::SeqCst);
                    }
                    tracing::debug!(chunk = i, "chunk parsed");

                    *slots[i].lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
                    if let Some(callback) = progress {
                        callback(progress_state);
                    }
                    i += worker_count;
                }
            });
        }
    });

    let mut merged = Vec::new();
    for slot in slots {
        let outcome = slot
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .expect("every chunk index is assigned to exactly one worker");
        merged.extend(outcome?);
    }
    Ok(Value::Array(merged))
}

/// Validate `input`, splitting it into chunks and validating them
/// concurrently in [`jtk_validate::Mode::Recovery`], then concatenating
/// diagnostics in chunk order with line numbers remapped into `input`'s
/// coordinate space.
#[must_use]
pub fn parallel_validate(
    input: &[u8],
    options: &ParallelOptions,
    progress: Option<&ProgressCallback>,
) -> ParallelValidation {
    let ranges = jtk_partition::partition(input, options.workers);

    let Ok(text) = std::str::from_utf8(input) else {
        return ParallelValidation {
            valid: false,
            diagnostics: vec![Diagnostic::new(1, 1, "input is not valid UTF-8")],
        };
    };

    if ranges.len() <= 1 {
        let result = jtk_validate::validate_recovery(text);
        return ParallelValidation {
            valid: result.valid,
            diagnostics: result.diagnostics,
        };
    }

    let worker_count = options.workers.max(1);
    let _span =
        tracing::info_span!("parallel_validate", chunks = ranges.len(), workers = worker_count)
            .entered();

    let Ok(pool) = build_pool(worker_count) else {
        let result = jtk_validate::validate_recovery(text);
        return ParallelValidation {
            valid: result.valid,
            diagnostics: result.diagnostics,
        };
    };
    let progress_state = Progress::default();
    let slots: Vec<Mutex<Option<(bool, Vec<Diagnostic>)>>> =
        (0..ranges.len()).map(|_| Mutex::new(None)).collect();

    pool.scope(|scope| {
        for worker in 0..worker_count {
            let ranges = &ranges;
            let slots = &slots;
            let progress_state = &progress_state;
            scope.spawn(move |_| {
                let mut i = worker;
                while i < ranges.len() {
                    let range = ranges[i];
                    let synthetic =
                        String::from_utf8_lossy(&wrap_as_array(range.slice(input))).into_owned();
                    let result = jtk_validate::validate_recovery(&synthetic);
                    let diagnostics: Vec<Diagnostic> = result
                        .diagnostics
                        .into_iter()
                        .map(|d| remap_diagnostic(d, range.line_offset))
                        .collect();

                    progress_state.processed_chunks.fetch_add(1, Ordering::SeqCst);
                    progress_state
                        .processed_bytes
                        .fetch_add(range.byte_end - range.byte_start, Ordering::SeqCst);
                    if !result.valid {
                        progress_state.errors_found.fetch_add(1, Ordering::SeqCst);
                    }
                    tracing::debug!(chunk = i, "chunk validated");

                    *slots[i].lock().unwrap_or_else(|e| e.into_inner()) =
                        Some((result.valid, diagnostics));
                    if let Some(callback) = progress {
                        callback(progress_state);
                    }
                    i += worker_count;
                }
            });
        }
    });

    let mut valid = true;
    let mut diagnostics = Vec::new();
    for slot in slots {
        let (chunk_valid, chunk_diagnostics) = slot
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .expect("every chunk index is assigned to exactly one worker");
        valid &= chunk_valid;
        diagnostics.extend(chunk_diagnostics);
    }
    ParallelValidation { valid, diagnostics }
}

fn build_pool(workers: usize) -> Result<rayon::ThreadPool, ParallelError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| ParallelError::PoolBuild(err.to_string()))
}

fn wrap_as_array(chunk: &[u8]) -> String {
    let mut synthetic = String::with_capacity(chunk.len() + 2);
    synthetic.push('[');
    synthetic.push_str(&String::from_utf8_lossy(chunk));
    synthetic.push(']');
    synthetic
}

fn flatten_chunk_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// The synthetic chunk source is `[` + real bytes + `]`; line 1 of that
/// source is the same physical line the chunk's first real byte sits on,
/// so `real_line = synthetic_line + line_offset` for every line. Line 1's
/// column is additionally off by the prepended bracket, and a diagnostic
/// that lands on the bracket itself (column 1, e.g. an empty chunk) has no
/// real counterpart — it is remapped to the chunk's first real byte.
fn remap_position(line: usize, column: usize, line_offset: usize) -> (usize, usize) {
    if line == 1 {
        let real_column = if column <= 1 { 1 } else { column - 1 };
        (line_offset + 1, real_column)
    } else {
        (line_offset + line, column)
    }
}

fn remap_parse_error(error: ParseError, line_offset: usize) -> ParseError {
    let (line, column) = remap_position(error.line, error.column, line_offset);
    ParseError::new(line, column, error.message)
}

fn remap_diagnostic(diagnostic: Diagnostic, line_offset: usize) -> Diagnostic {
    let (line, column) = remap_position(diagnostic.line, diagnostic.column, line_offset);
    let mut remapped = Diagnostic::new(line, column, diagnostic.message);
    remapped.context = diagnostic.context;
    remapped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn opts(workers: usize) -> ParallelOptions {
        ParallelOptions {
            workers,
            max_depth: jtk_parser::DEFAULT_MAX_DEPTH,
        }
    }

    #[test]
    fn parallel_parse_matches_sequential_parse() {
        let input = b"[1,2,3,4,5,6,7,8]";
        let sequential = jtk_parser::parse(std::str::from_utf8(input).unwrap()).unwrap();
        let parallel = parallel_parse(input, &opts(3), None).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_parse_preserves_element_order() {
        let input = br#"["a","b","c","d","e","f"]"#;
        let value = parallel_parse(input, &opts(4), None).unwrap();
        let array = value.as_array().unwrap();
        let strings: Vec<_> = array.iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(strings, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn non_array_input_falls_back_to_sequential_parse() {
        let input = br#"{"a": 1}"#;
        let value = parallel_parse(input, &opts(4), None).unwrap();
        assert_eq!(value.as_object().unwrap()["a"], Value::Number(1.0));
    }

    #[test]
    fn progress_callback_observes_every_chunk() {
        let input = b"[1,2,3,4,5,6]";
        let seen = Mutex::new(0usize);
        let callback = |progress: &Progress| {
            let mut max_seen = seen.lock().unwrap();
            *max_seen = (*max_seen).max(progress.processed_chunks.load(Ordering::SeqCst));
        };
        parallel_parse(input, &opts(3), Some(&callback)).unwrap();
        assert!(*seen.lock().unwrap() > 0);
    }

    #[test]
    fn parallel_validate_reports_chunk_diagnostics_with_correct_line() {
        let input = b"[\n1,\n2,\nbad,\n4\n]";
        let result = parallel_validate(input, &opts(2), None);
        assert!(!result.valid);
        assert!(result.diagnostics.iter().any(|d| d.line == 4));
    }

    #[test]
    fn parallel_validate_matches_sequential_on_valid_input() {
        let input = b"[1,2,3,4,5,6,7,8,9,10]";
        let result = parallel_validate(input, &opts(4), None);
        assert!(result.valid);
        assert!(result.diagnostics.is_empty());
    }
}
