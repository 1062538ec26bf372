use std::borrow::Cow;
use std::fmt;

/// A procedure parameter. `(...)` yields a single line, `{...}` yields the
/// body split into lines. Procedures treat the two differently, so the
/// distinction is kept all the way down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Line(String),
    Text(Vec<String>),
}

impl Param {
    /// Single-line content, or `None` for a multi-line body.
    pub fn as_line(&self) -> Option<&str> {
        match self {
            Param::Line(s) => Some(s),
            Param::Text(_) => None,
        }
    }

    /// The value as one string; multi-line bodies are joined with `\n`.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Param::Line(s) => Cow::Borrowed(s),
            Param::Text(lines) => Cow::Owned(lines.join("\n")),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Param::Line(s) => s.is_empty(),
            Param::Text(lines) => lines.iter().all(|l| l.is_empty()),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Line(s) => write!(f, "({})", s),
            Param::Text(lines) => write!(f, "{{{} line(s)}}", lines.len()),
        }
    }
}
