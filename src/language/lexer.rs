use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use crate::output::Output;

use super::{Argument, ArgumentKind, Opcode, Token};

/// Pasted text sometimes carries a stray backspace
const BACKSPACE: char = '\u{8}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    NoCode,
    UnknownOpcode,
    InvalidArgument,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::NoCode => f.write_str("no code to parse"),
            LexErrorKind::UnknownOpcode => f.write_str("unknown opcode"),
            LexErrorKind::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    kind: LexErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl LexError {
    fn new<C, S>(kind: LexErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    fn without_context(kind: LexErrorKind, line_nr: usize) -> Self {
        Self {
            kind,
            context: None,
            line_nr,
        }
    }

    pub fn kind(&self) -> LexErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "[ln: {}] {} - {}", self.line_nr, self.kind, context)
        } else {
            write!(f, "[ln: {}] {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for LexError {}

/// Result of a lexing pass. Errors have already been written to the output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    lines: Lines<'a>,
    line_nr: usize,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: source.lines(),
            line_nr: 0,
            errors: Vec::new(),
        }
    }

    /// Consumes `self` and splits the source into one token group per
    /// instruction line.
    ///
    /// # Errors
    ///
    /// Lexing never fails as a whole. A line with an unknown opcode is dropped,
    /// an argument with an unknown sigil is dropped from its line. Each problem
    /// is written to `output` as an error and collected in [`Lexed::errors`].
    pub fn tokenize<O: Output>(mut self, output: &mut O) -> Lexed {
        let mut tokens = Vec::new();

        if self.source.is_empty() {
            self.report(LexError::without_context(LexErrorKind::NoCode, 1), output);
        }

        while let Some(line) = self.lines.next() {
            self.line_nr += 1;
            if let Some(token) = self.lex_line(line, output) {
                tokens.push(token);
            }
        }

        Lexed {
            tokens,
            errors: self.errors,
        }
    }

    fn report<O: Output>(&mut self, err: LexError, output: &mut O) {
        log::debug!("{}", err);
        output.error(&err.to_string());
        self.errors.push(err);
    }

    /// Tries to lex one line. Blank lines and full line comments yield nothing.
    ///
    /// # Examples
    ///
    /// - `lod $a, !3`
    /// - `out "hello" ; greet`
    fn lex_line<O: Output>(&mut self, line: &str, output: &mut O) -> Option<Token> {
        let line = line.replacen(BACKSPACE, "", 1);
        let line = line.trim_start();

        if line.trim_end().is_empty() || line.starts_with(';') {
            return None;
        }

        // The opcode is always the first three characters
        let split = line.char_indices().nth(3).map_or(line.len(), |(i, _)| i);
        let (mnemonic, rest) = line.split_at(split);

        let opcode = match Opcode::from_mnemonic(mnemonic) {
            Some(opcode) => opcode,
            None => {
                self.report(
                    LexError::new(
                        LexErrorKind::UnknownOpcode,
                        format!("`{}`", mnemonic),
                        self.line_nr,
                    ),
                    output,
                );
                return None;
            }
        };

        let rest = match rest.find(';') {
            Some(comment) => &rest[..comment],
            None => rest,
        };

        let mut arguments = Vec::new();
        for raw in rest.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
            if let Some(argument) = self.lex_argument(raw, output) {
                arguments.push(argument);
            }
        }

        log::debug!(
            "[{}] Found {} with {} argument(s)",
            self.line_nr,
            opcode,
            arguments.len()
        );

        Some(Token {
            line_nr: self.line_nr,
            opcode,
            arguments,
        })
    }

    /// Tries to lex a single trimmed, non-empty argument.
    ///
    /// # Examples
    ///
    /// - `$a`
    /// - `!0x10`
    /// - `"text"`
    /// - `%EQ`
    fn lex_argument<O: Output>(&mut self, raw: &str, output: &mut O) -> Option<Argument> {
        let mut chars = raw.chars();
        let kind = chars.next().and_then(ArgumentKind::from_sigil);
        let body = chars.as_str();

        match kind {
            Some(ArgumentKind::String) => Some(Argument::new(
                ArgumentKind::String,
                body.strip_suffix('"').unwrap_or(body),
            )),
            Some(kind) => Some(Argument::new(kind, body)),
            None => {
                self.report(
                    LexError::new(
                        LexErrorKind::InvalidArgument,
                        format!("`{}`", raw),
                        self.line_nr,
                    ),
                    output,
                );
                None
            }
        }
    }
}

/// Convenience wrapper around [`Lexer::tokenize`]
pub fn tokenize<O: Output>(source: &str, output: &mut O) -> Lexed {
    Lexer::new(source).tokenize(output)
}
