pub mod assemble;
pub mod error;
pub mod lexer;
pub mod structural;

pub use error::{ParseError, ParseErrorKind};

use crate::Script;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the script source into its statements.
    /// The first syntax or semantic error aborts the parse.
    pub fn parse(&self) -> Result<Script, ParseError> {
        let tokens = lexer::tokenize(&self.source, self.file_id)?;
        let elements = structural::aggregate(&tokens, self.file_id)?;
        let commands = assemble::assemble(&self.source, &tokens, &elements, self.file_id)?;
        Ok(Script {
            commands,
            source_id: self.file_id,
        })
    }
}
