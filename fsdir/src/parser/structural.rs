use crate::parser::error::ParseError;
use crate::parser::lexer::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Element types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Directive,
    DirectiveParams,
    Procedure,
    ProcedureParams,
    EndCommand,
}

/// A labeled run of tokens: `tokens[start..start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub start: usize,
    pub len: usize,
}

impl Element {
    pub fn tokens<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        &tokens[self.start..self.start + self.len]
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Group a token stream into statement elements.
pub fn aggregate(tokens: &[Token], file_id: usize) -> Result<Vec<Element>, ParseError> {
    let mut state = AggregateState {
        tokens,
        file_id,
        cursor: 0,
        in_statement: false,
        elements: Vec::new(),
    };
    state.run()?;
    Ok(state.elements)
}

// ---------------------------------------------------------------------------
// Aggregation state
// ---------------------------------------------------------------------------

struct AggregateState<'t> {
    tokens: &'t [Token],
    file_id: usize,
    cursor: usize,
    /// Set by a directive, cleared by a newline.
    in_statement: bool,
    elements: Vec<Element>,
}

impl<'t> AggregateState<'t> {
    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(token) = self.tokens.get(self.cursor) {
            let (kind, len) = match token.kind {
                TokenKind::Identifier if !self.in_statement => {
                    self.expect_file_path_after(token)?;
                    self.in_statement = true;
                    (Some(ElementKind::Directive), 1)
                }
                TokenKind::Identifier => (Some(ElementKind::Procedure), 1),
                TokenKind::FilePath => (
                    Some(ElementKind::DirectiveParams),
                    self.run_length(|k| k == TokenKind::FilePath),
                ),
                TokenKind::Parameter | TokenKind::TextParameter => (
                    Some(ElementKind::ProcedureParams),
                    self.run_length(|k| {
                        matches!(k, TokenKind::Parameter | TokenKind::TextParameter)
                    }),
                ),
                TokenKind::Newline => {
                    self.in_statement = false;
                    (Some(ElementKind::EndCommand), 1)
                }
                TokenKind::Comment => (None, 1),
            };

            if let Some(kind) = kind {
                self.elements.push(Element {
                    kind,
                    start: self.cursor,
                    len,
                });
            }
            self.cursor += len;
        }
        Ok(())
    }

    fn expect_file_path_after(&self, directive: &Token) -> Result<(), ParseError> {
        match self.tokens.get(self.cursor + 1) {
            Some(next) if next.kind == TokenKind::FilePath => Ok(()),
            _ => Err(ParseError::semantic(
                "directive needs at least one argument",
                directive.span(),
                self.file_id,
            )
            .with_note("follow the directive with one or more quoted paths, e.g. 'notes.txt'")),
        }
    }

    /// Number of consecutive tokens from the cursor whose kind satisfies `pred`.
    fn run_length(&self, pred: impl Fn(TokenKind) -> bool) -> usize {
        self.tokens[self.cursor..]
            .iter()
            .take_while(|t| pred(t.kind))
            .count()
    }
}
