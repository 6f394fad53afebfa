//! This lexer turns IPPcode22 source lines into opcode/operand tokens.
//!
//! IPPcode22 holds a single instruction per line, written as
//! `OPCODE [ARG1 [ARG2 [ARG3]]]` with operands separated by whitespace.
//! Comments start with `#` and run to the end of the line.
use std::io::{BufRead, Lines};
use regex::Regex;
use super::error::ParseError;

pub const HEADER: &str = ".IPPcode22";
pub const COMMENT: char = '#';

/// An opcode may carry at most three operands, so a line splits into four pieces at most.
const MAX_FIELDS: usize = 4;

lazy_static! {
    // ASCII whitespace only: a no-break space stays inside its token.
    static ref WHITESPACE: Regex = Regex::new(r"(?-u:\s)+").unwrap();
}

/// A code line broken into its opcode and raw operand tokens.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line<'a> {
    pub number: usize,
    pub opcode: &'a str,
    pub args: Vec<&'a str>,
}

#[inline]
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Drops everything from the first comment character onwards and trims the rest.
pub fn strip_comments(line: &str) -> &str {
    let code = match line.find(COMMENT) {
        Some(idx) => &line[..idx],
        None => line,
    };
    code.trim_matches(is_separator)
}

/// Splits a line into opcode and operands.
/// Returns None if the line holds no code.
pub fn tokenize_line(line: &str, number: usize) -> Option<Line<'_>> {
    let code = strip_comments(line);
    if code.is_empty() {
        return None;
    }

    let mut fields = WHITESPACE.splitn(code, MAX_FIELDS).filter(|f| !f.is_empty());
    let opcode = fields.next()?;
    Some(Line { number, opcode, args: fields.collect() })
}

/// Reads source lines one at a time and counts them.
pub struct SourceReader<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> SourceReader<R> {
    pub fn new(reader: R) -> Self {
        SourceReader { lines: reader.lines(), line: 0 }
    }

    /// Number of the line most recently read, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the next raw line, or None once the input is exhausted.
    pub fn next_line(&mut self) -> Result<Option<String>, ParseError> {
        match self.lines.next() {
            Some(Ok(s)) => {
                self.line += 1;
                Ok(Some(s))
            }
            Some(Err(e)) => Err(ParseError::Input { line: self.line + 1, reason: e.to_string() }),
            None => Ok(None),
        }
    }

    /// Skips blank and comment-only lines, then requires the first code line to be the header.
    pub fn expect_header(&mut self) -> Result<(), ParseError> {
        while let Some(raw) = self.next_line()? {
            let code = strip_comments(&raw);
            if code.is_empty() {
                continue;
            }

            if code.eq_ignore_ascii_case(HEADER) {
                debug!("found header `{}` on line {}", code, self.line);
                return Ok(());
            }
            return Err(ParseError::Header {
                line: self.line,
                expected: HEADER,
                found: code.to_owned(),
            });
        }

        Err(ParseError::MissingHeader { expected: HEADER })
    }
}
