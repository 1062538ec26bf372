use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use codespan_reporting::diagnostic::{Diagnostic, Label};
use fsdir::parser::ParseError;
use thiserror::Error;

/// Every way a load, validation, sandbox run or apply can fail.
#[derive(Debug, Error)]
pub enum DirectorError {
    /// Lexer (syntax) or aggregator/assembler (semantic) rejection.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("statement {position}: unknown directive '{keyword}'")]
    UnknownDirective {
        position: usize,
        keyword: String,
        span: Range<usize>,
    },

    #[error("statement {position}: unknown procedure '{keyword}'")]
    UnknownProcedure {
        position: usize,
        keyword: String,
        span: Range<usize>,
    },

    /// An instruction rejected its parameters, or a procedure was bound to a
    /// directive it does not apply to.
    #[error("statement {position}: {keyword} [{}]: {reason}", .params.join(", "))]
    Validation {
        position: usize,
        keyword: String,
        params: Vec<String>,
        reason: String,
        span: Range<usize>,
    },

    /// An operation was called out of lifecycle order.
    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A failure while a validated statement was running in the sandbox.
    #[error("statement {position}: {keyword} failed: {message}")]
    Execution {
        position: usize,
        keyword: String,
        message: String,
        span: Range<usize>,
    },
}

/// Result type alias for director operations
pub type Result<T> = std::result::Result<T, DirectorError>;

impl DirectorError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        DirectorError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        DirectorError::Precondition(msg.into())
    }

    /// Attach statement context to a failure raised while the statement ran.
    pub(crate) fn in_statement(self, position: usize, keyword: &str, span: Range<usize>) -> Self {
        if matches!(self, DirectorError::Io { .. } | DirectorError::Precondition(_)) {
            DirectorError::Execution {
                position,
                keyword: keyword.to_string(),
                message: self.to_string(),
                span,
            }
        } else {
            self
        }
    }

    /// Source range of the statement the error points at, if any.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            DirectorError::Parse(e) => Some(e.span.clone()),
            DirectorError::UnknownDirective { span, .. }
            | DirectorError::UnknownProcedure { span, .. }
            | DirectorError::Validation { span, .. }
            | DirectorError::Execution { span, .. } => Some(span.clone()),
            DirectorError::Precondition(_) | DirectorError::Io { .. } => None,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        if let DirectorError::Parse(e) = self {
            return e.to_diagnostic();
        }
        let diagnostic = Diagnostic::error().with_message(self.to_string());
        match self.span() {
            Some(span) => diagnostic.with_labels(vec![Label::primary(file_id, span)]),
            None => diagnostic,
        }
    }
}

/// Outcome of an instruction's validation.
pub type Verdict = std::result::Result<(), Rejection>;

/// Why an instruction refused its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection(pub String);

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Rejection(reason.into())
    }
}
