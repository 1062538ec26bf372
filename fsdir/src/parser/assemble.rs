use std::mem;

use crate::command::{Command, Param};
use crate::parser::error::ParseError;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::structural::{Element, ElementKind};

/// Fold structural elements into one Command per statement.
pub fn assemble(
    source: &str,
    tokens: &[Token],
    elements: &[Element],
    file_id: usize,
) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    let mut command = Command::default();

    for element in elements {
        let element_tokens = element.tokens(tokens);
        let (Some(first), Some(last)) = (element_tokens.first(), element_tokens.last()) else {
            continue;
        };
        let span = first.offset..last.span().end;

        match element.kind {
            ElementKind::Directive => {
                command.directive = first.text(source).to_string();
                command.span = span.clone();
            }
            ElementKind::DirectiveParams => {
                if command.is_empty() {
                    return Err(ParseError::semantic(
                        "statement must start with a directive",
                        span,
                        file_id,
                    ));
                }
                if command.procedure.is_some() {
                    return Err(ParseError::semantic(
                        "file paths must come before the procedure",
                        span,
                        file_id,
                    ));
                }
                command.directive_params = element_tokens
                    .iter()
                    .map(|t| t.text(source).to_string())
                    .collect();
            }
            ElementKind::Procedure => {
                if let Some(existing) = &command.procedure {
                    return Err(ParseError::semantic(
                        "a statement takes at most one procedure",
                        span,
                        file_id,
                    )
                    .with_note(format!("'{}' is already bound to this statement", existing)));
                }
                command.procedure = Some(first.text(source).to_string());
            }
            ElementKind::ProcedureParams => {
                if command.procedure.is_none() {
                    return Err(ParseError::semantic(
                        "parameters need a procedure to bind to",
                        span,
                        file_id,
                    ));
                }
                command
                    .procedure_params
                    .extend(element_tokens.iter().map(|t| to_param(t, source)));
            }
            ElementKind::EndCommand => {
                if !command.is_empty() {
                    commands.push(mem::take(&mut command));
                }
                continue;
            }
        }

        command.span.end = command.span.end.max(span.end);
    }

    if !command.is_empty() {
        commands.push(command);
    }

    Ok(commands)
}

fn to_param(token: &Token, source: &str) -> Param {
    let text = token.text(source);
    match token.kind {
        TokenKind::TextParameter if text.is_empty() => Param::Text(Vec::new()),
        TokenKind::TextParameter => Param::Text(
            text.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect(),
        ),
        _ => Param::Line(text.to_string()),
    }
}
