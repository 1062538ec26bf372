use std::ops::Range;

use crate::parser::error::ParseError;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of upper-case letters: a directive or procedure keyword.
    Identifier,
    /// `'...'`, quotes excluded.
    FilePath,
    /// `(...)`, parentheses excluded.
    Parameter,
    /// `{...}`, braces and at most one surrounding blank line excluded.
    TextParameter,
    /// `#` up to (not including) the line terminator.
    Comment,
    /// One or more consecutive line terminators.
    Newline,
}

/// A byte range of the source tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub length: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span()]
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split script source into tokens in a single left-to-right pass.
/// Blank space is dropped; everything else the lexer recognizes becomes a token.
pub fn tokenize(source: &str, file_id: usize) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        source,
        file_id,
        cursor: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

// ---------------------------------------------------------------------------
// Lexer state
// ---------------------------------------------------------------------------

struct Lexer<'a> {
    source: &'a str,
    file_id: usize,
    cursor: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_uppercase() => self.identifier(),
                c if is_blank(c) => self.blank(),
                c if is_line_terminator(c) => self.newline(),
                '\'' => self.delimited(TokenKind::FilePath, '\'', "file path")?,
                '(' => self.delimited(TokenKind::Parameter, ')', "parameter")?,
                '{' => self.text_parameter()?,
                '#' => self.comment(),
                other => {
                    let rest = &self.source[self.cursor..];
                    return Err(ParseError::syntax(
                        format!("wrong syntax: {}", rest),
                        self.cursor..self.cursor + other.len_utf8(),
                        self.file_id,
                    )
                    .with_note(format!("unexpected character {:?}", other)));
                }
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    /// Offset of the first character at or after `start` that fails `pred`.
    fn scan_while(&self, start: usize, pred: impl Fn(char) -> bool) -> usize {
        self.source[start..]
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.source.len(), |(i, _)| start + i)
    }

    fn push(&mut self, start: usize, end: usize, kind: TokenKind) {
        self.tokens.push(Token {
            offset: start,
            length: end - start,
            kind,
        });
    }

    fn identifier(&mut self) {
        let end = self.scan_while(self.cursor, char::is_uppercase);
        self.push(self.cursor, end, TokenKind::Identifier);
        self.cursor = end;
    }

    fn blank(&mut self) {
        self.cursor = self.scan_while(self.cursor, is_blank);
    }

    fn newline(&mut self) {
        let end = self.scan_while(self.cursor, is_line_terminator);
        self.push(self.cursor, end, TokenKind::Newline);
        self.cursor = end;
    }

    fn comment(&mut self) {
        let end = self.scan_while(self.cursor, |c| !is_line_terminator(c));
        self.push(self.cursor, end, TokenKind::Comment);
        self.cursor = end;
    }

    /// Content between an opening character (already at the cursor) and `close`.
    fn delimited(&mut self, kind: TokenKind, close: char, what: &str) -> Result<(), ParseError> {
        let start = self.cursor + 1;
        let end = self.find_close(start, close, what)?;
        self.push(start, end, kind);
        self.cursor = end + close.len_utf8();
        Ok(())
    }

    fn text_parameter(&mut self) -> Result<(), ParseError> {
        let open = self.cursor + 1;
        let close = self.find_close(open, '}', "text parameter")?;

        // Both strips are measured on the whole body; a body that is nothing
        // but one blank line on each side collapses to empty.
        let body = &self.source[open..close];
        let start = open + leading_blank_line(body);
        let end = (close - trailing_blank_line(body)).max(start);

        self.push(start, end, TokenKind::TextParameter);
        self.cursor = close + 1;
        Ok(())
    }

    fn find_close(&self, start: usize, close: char, what: &str) -> Result<usize, ParseError> {
        self.source[start..]
            .find(close)
            .map(|i| start + i)
            .ok_or_else(|| {
                ParseError::syntax(
                    format!("unterminated {}", what),
                    start - 1..self.source.len(),
                    self.file_id,
                )
                .with_note(format!("expected a closing {:?}", close))
            })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Length of the first line of `body` including its terminator, if that line
/// holds nothing but blank space. Zero otherwise.
fn leading_blank_line(body: &str) -> usize {
    let Some(i) = body.find(is_line_terminator) else {
        return 0;
    };
    if !body[..i].chars().all(is_blank) {
        return 0;
    }
    if body[i..].starts_with("\r\n") {
        i + 2
    } else {
        i + 1
    }
}

/// Length of the last line of `body` including the terminator before it, if
/// that line holds nothing but blank space. Zero otherwise.
fn trailing_blank_line(body: &str) -> usize {
    let Some(i) = body.rfind(is_line_terminator) else {
        return 0;
    };
    if !body[i + 1..].chars().all(is_blank) {
        return 0;
    }
    if body[..=i].ends_with("\r\n") {
        body.len() - i + 1
    } else {
        body.len() - i
    }
}
