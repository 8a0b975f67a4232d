//! Snippet runner
//!
//! Turns a catalog snippet into the text shown under it:
//!
//! ```text
//! source → dedent → parse → fresh Interpreter + CaptureBuffer → run
//!        → success: captured text, trailing newline dropped, "\n" → "<br>"
//!        → failure: the error's message, partial output discarded
//! ```
//!
//! Every call builds its own interpreter and capture buffer, so nothing a
//! snippet does (globals, heap, output) is visible to the next call. Errors
//! never escape: [`run`] always returns a string.

mod dedent;

pub use dedent::dedent;

use crate::interpreter::{CaptureBuffer, Interpreter, RuntimeError};
use crate::parser::parse::{ParseError, Parser};
use std::thread;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Marker the display layer turns into a line break
pub const LINE_BREAK: &str = "<br>";

/// Stack reserved for the thread a snippet runs on; deep C recursion is
/// deep Rust recursion in a tree-walking interpreter
const RUNNER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Why a snippet produced no output
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The interpreter itself failed; reported like a runtime error
    #[error("Interpreter failure: {0}")]
    Internal(String),
}

impl SnippetError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SnippetError::Syntax(_) => FailureKind::Syntax,
            SnippetError::Runtime(_) | SnippetError::Internal(_) => FailureKind::Runtime,
        }
    }
}

/// Coarse classification of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Syntax,
    Runtime,
}

/// Outcome of one run, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Marked-up output on success, the error message on failure
    pub output: String,
    pub failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Visual lines: the output split on [`LINE_BREAK`]
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.split(LINE_BREAK)
    }
}

/// Runs snippets in-process, each in a fresh interpreter
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetRunner;

impl SnippetRunner {
    pub fn new() -> Self {
        SnippetRunner
    }

    /// Run a snippet and render its result for display
    pub fn run(&self, source: &str) -> ExecutionResult {
        debug!(source_bytes = source.len(), "running snippet");

        match self.execute(source) {
            Ok(captured) => {
                let output = to_markup(&captured);
                info!(output_len = output.len(), "snippet finished");
                ExecutionResult { output, failure: None }
            }
            Err(err) => {
                warn!(kind = ?err.kind(), error = %err, "snippet failed");
                ExecutionResult {
                    output: err.to_string(),
                    failure: Some(err.kind()),
                }
            }
        }
    }

    /// Run a snippet and return exactly what it printed
    pub fn execute(&self, source: &str) -> Result<String, SnippetError> {
        let normalized = dedent(source);

        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("snippet".to_string())
                .stack_size(RUNNER_STACK_SIZE)
                .spawn_scoped(scope, || execute_program(&normalized))
                .map_err(|err| SnippetError::Internal(format!("could not start interpreter: {}", err)))?;

            worker
                .join()
                .map_err(|payload| SnippetError::Internal(panic_message(payload.as_ref())))?
        })
    }
}

fn execute_program(source: &str) -> Result<String, SnippetError> {
    let program = Parser::new(source)?.parse_program()?;

    let mut out = CaptureBuffer::new();
    {
        let mut interpreter = Interpreter::new(program, &mut out)?;
        let status = interpreter.run()?;
        let leaked = interpreter.live_heap_blocks();
        debug!(status, leaked, "program exited");
    }
    Ok(out.into_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "interpreter panicked".to_string())
}

/// Drop one trailing newline, then mark every remaining line break
pub fn to_markup(captured: &str) -> String {
    captured
        .strip_suffix('\n')
        .unwrap_or(captured)
        .replace('\n', LINE_BREAK)
}

/// Run a snippet; the captured output on success, the error message on failure
pub fn run(source: &str) -> String {
    SnippetRunner::new().run(source).output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup() {
        assert_eq!(to_markup("Woof!\n"), "Woof!");
        assert_eq!(to_markup("1\n2\n"), "1<br>2");
        assert_eq!(to_markup("a\n\n"), "a<br>");
        assert_eq!(to_markup("no newline"), "no newline");
        assert_eq!(to_markup(""), "");
    }

    #[test]
    fn test_result_lines() {
        let result = ExecutionResult {
            output: "1<br>2".to_string(),
            failure: None,
        };
        assert!(result.is_success());
        assert_eq!(result.lines().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_error_kinds() {
        let runner = SnippetRunner::new();
        let syntax = runner.run("int main(void) { return 0 }");
        assert_eq!(syntax.failure, Some(FailureKind::Syntax));
        assert!(syntax.output.starts_with("Parse error at line 1"));

        let runtime = runner.run("int main(void) { int x; return x; }");
        assert_eq!(runtime.failure, Some(FailureKind::Runtime));
        assert!(runtime.output.contains("uninitialized variable 'x'"));
    }
}
