pub mod param;

use std::ops::Range;

pub use param::Param;

/// A single statement: a directive over one or more paths, optionally with
/// a nested procedure call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    /// Directive keyword, e.g. `EDIT`.
    pub directive: String,
    /// Quoted paths following the directive.
    pub directive_params: Vec<String>,
    /// Procedure keyword, e.g. `APPEND`.
    pub procedure: Option<String>,
    pub procedure_params: Vec<Param>,
    /// Byte span in source for error reporting.
    pub span: Range<usize>,
}

impl Command {
    pub fn is_empty(&self) -> bool {
        self.directive.is_empty()
    }
}
