pub mod command;
pub mod parser;

use crate::command::Command;

/// A parsed fsdir script.
#[derive(Debug, Clone)]
pub struct Script {
    /// Statements in script order.
    pub commands: Vec<Command>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
