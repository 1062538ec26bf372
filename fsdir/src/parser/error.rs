use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

/// Which stage of the front end rejected the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer met a character it has no rule for.
    Syntax,
    /// The tokens are well-formed but do not make a statement.
    Semantic,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Syntax => write!(f, "syntax"),
            ParseErrorKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// Parse errors with source location information.
#[derive(Debug, Clone, Error)]
#[error("{kind} error: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn semantic(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind: ParseErrorKind::Semantic,
            message: message.into(),
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(self.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
