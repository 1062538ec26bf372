use std::borrow::Cow;
use std::ops::Range;

use fsdir::command::{Command, Param};

/// The parameters of one statement bound to one instruction occurrence.
#[derive(Debug, Clone)]
pub struct Extract {
    pub keyword: String,
    pub params: Vec<Param>,
    pub span: Range<usize>,
    /// The bound procedure's own extract.
    pub sub_extract: Option<Box<Extract>>,
    /// Set when validation rejects this occurrence.
    pub error: Option<String>,
}

impl Extract {
    pub fn from_command(command: &Command) -> Self {
        let sub_extract = command.procedure.as_ref().map(|keyword| {
            Box::new(Extract {
                keyword: keyword.clone(),
                params: command.procedure_params.clone(),
                span: command.span.clone(),
                sub_extract: None,
                error: None,
            })
        });

        Extract {
            keyword: command.directive.clone(),
            params: command
                .directive_params
                .iter()
                .cloned()
                .map(Param::Line)
                .collect(),
            span: command.span.clone(),
            sub_extract,
            error: None,
        }
    }

    /// Parameters as plain strings: the target paths of a directive.
    pub fn paths(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.params.iter().map(Param::joined)
    }

    /// Parameters rendered for diagnostics.
    pub fn describe_params(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|p| match p {
                Param::Line(s) => format!("'{}'", s),
                Param::Text(_) => p.to_string(),
            })
            .collect()
    }
}
