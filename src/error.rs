use std::io;

/// Errors produced while compiling a script.
///
/// Every variant except [`Error::Io`] is scoped to the input line that
/// produced it and is collected rather than propagated; processing
/// continues with the next line. `Io` is a failure of the output sink and
/// aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("line {line}: unterminated quote")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: malformed assignment")]
    BadAssignment { line: usize },

    #[error("line {line}: {token:?} is not a number")]
    BadNumber { line: usize, token: String },

    #[error("line {line}: division by zero")]
    DivideByZero { line: usize },

    #[error("line {line}: usage: {usage}")]
    Usage { line: usize, usage: String },

    #[error("line {line}: for: {reason}")]
    BadLoop { line: usize, reason: String },

    #[error("line {line}: {path}: {source}")]
    File {
        line: usize,
        path: String,
        source: io::Error,
    },

    #[error("line {line}: {cmd}: {reason}")]
    Command {
        line: usize,
        cmd: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
