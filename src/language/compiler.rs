use std::{error, fmt};

use crate::output::Output;
use crate::processor::{Emit, Instruction, Operand, Program};
use crate::registers::{Comparison, Value};

use super::{Argument, ArgumentKind, Opcode, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// A literal without leading digits
    InvalidLiteral,
    /// Only a register is accepted here
    ExpectedRegister,
    /// Only a literal is accepted here
    ExpectedLiteral,
    /// Only a register or a literal is accepted here
    ExpectedValue,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileErrorKind::InvalidLiteral => f.write_str("invalid literal"),
            CompileErrorKind::ExpectedRegister => f.write_str("expected a register"),
            CompileErrorKind::ExpectedLiteral => f.write_str("expected a literal"),
            CompileErrorKind::ExpectedValue => f.write_str("expected a register or a literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    kind: CompileErrorKind,
    argument: Argument,
    line_nr: usize,
}

impl CompileError {
    fn new(kind: CompileErrorKind, argument: &Argument, line_nr: usize) -> Self {
        Self {
            kind,
            argument: argument.clone(),
            line_nr,
        }
    }

    pub fn kind(&self) -> CompileErrorKind {
        self.kind
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ln: {}] {} - `{}`",
            self.line_nr, self.kind, self.argument
        )
    }
}

impl error::Error for CompileError {}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;

/// Parses an integer literal. Accepts a sign and `0b`, `0o` or `0x` prefixes,
/// then reads digits up to the first character that is not one, so `1.5`
/// reads as `1` and `12px` as `12`. Fails only when there is no digit at all.
pub fn parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();

    let (negative, digits) = match text.as_bytes() {
        [b'-', ..] => (true, &text[1..]),
        [b'+', ..] => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, offset) = match digits.as_bytes() {
        [b'0', b'b', ..] => (2, 2),
        [b'0', b'o', ..] => (8, 2),
        [b'0', b'x', ..] => (16, 2),
        _ => (10, 0),
    };

    let mut magnitude: Option<Value> = None;
    for digit in digits[offset..].chars().map_while(|c| c.to_digit(radix)) {
        magnitude = Some(magnitude.unwrap_or(0.0) * Value::from(radix) + Value::from(digit));
    }

    let magnitude = magnitude?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Number of arguments an opcode needs before it can be compiled
fn arity(opcode: Opcode) -> usize {
    match opcode {
        Opcode::Increment | Opcode::Decrement | Opcode::Out => 1,
        Opcode::Load
        | Opcode::Move
        | Opcode::Add
        | Opcode::Subtract
        | Opcode::GreaterThan
        | Opcode::LessThan
        | Opcode::Equals => 2,
    }
}

/// Turns token groups into a [`Program`]
#[derive(Debug)]
pub struct Compiler<'o, O: Output> {
    output: &'o mut O,
    errors: Vec<CompileError>,
}

impl<'o, O: Output> Compiler<'o, O> {
    pub fn new(output: &'o mut O) -> Self {
        Self {
            output,
            errors: Vec::new(),
        }
    }

    /// Compiles every token group in order.
    ///
    /// # Errors
    ///
    /// Compilation never fails as a whole. Groups without enough arguments are
    /// skipped silently. Groups with an argument of the wrong kind or an
    /// unparsable literal are skipped and reported to the output.
    pub fn compile(&mut self, tokens: &[Token]) -> Program {
        let mut program = Program::new();

        for token in tokens {
            let required = arity(token.opcode);
            if token.arguments.len() < required {
                log::debug!(
                    "[{}] `{}` needs {} argument(s) but has {}, skipping",
                    token.line_nr,
                    token.opcode,
                    required,
                    token.arguments.len()
                );
                continue;
            }

            match self.compile_token(token) {
                Ok(instruction) => program.push(token.line_nr, instruction),
                Err(err) => {
                    log::debug!("{}", err);
                    self.output.error(&err.to_string());
                    self.errors.push(err);
                }
            }
        }

        program
    }

    /// Errors reported so far
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Compiles a single group. The caller has checked the argument count.
    fn compile_token(&self, token: &Token) -> Result<Instruction> {
        let line_nr = token.line_nr;
        let args = &token.arguments;

        let instruction = match token.opcode {
            Opcode::Load => Instruction::Load {
                register: register(&args[0], line_nr)?,
                value: literal(&args[1], line_nr)?,
            },
            Opcode::Move => Instruction::Move {
                from: register(&args[0], line_nr)?,
                to: register(&args[1], line_nr)?,
            },
            Opcode::Increment => Instruction::Increment {
                register: register(&args[0], line_nr)?,
            },
            Opcode::Decrement => Instruction::Decrement {
                register: register(&args[0], line_nr)?,
            },
            Opcode::Add => Instruction::Add {
                register: register(&args[0], line_nr)?,
                operand: operand(&args[1], line_nr)?,
            },
            Opcode::Subtract => Instruction::Subtract {
                register: register(&args[0], line_nr)?,
                operand: operand(&args[1], line_nr)?,
            },
            Opcode::GreaterThan => compare(Comparison::GreaterThan, args, line_nr)?,
            Opcode::LessThan => compare(Comparison::LessThan, args, line_nr)?,
            Opcode::Equals => compare(Comparison::Equals, args, line_nr)?,
            Opcode::Out => Instruction::Out(emit(&args[0])),
        };

        Ok(instruction)
    }
}

fn register(argument: &Argument, line_nr: usize) -> Result<String> {
    match argument.kind {
        ArgumentKind::Register => Ok(argument.value.clone()),
        _ => Err(CompileError::new(
            CompileErrorKind::ExpectedRegister,
            argument,
            line_nr,
        )),
    }
}

fn literal(argument: &Argument, line_nr: usize) -> Result<Value> {
    match argument.kind {
        ArgumentKind::Literal => parse_literal(&argument.value).ok_or_else(|| {
            CompileError::new(CompileErrorKind::InvalidLiteral, argument, line_nr)
        }),
        _ => Err(CompileError::new(
            CompileErrorKind::ExpectedLiteral,
            argument,
            line_nr,
        )),
    }
}

/// The kind of the argument decides between register and literal
fn operand(argument: &Argument, line_nr: usize) -> Result<Operand> {
    match argument.kind {
        ArgumentKind::Register => Ok(Operand::Register(argument.value.clone())),
        ArgumentKind::Literal => literal(argument, line_nr).map(Operand::Literal),
        ArgumentKind::String | ArgumentKind::Flag => Err(CompileError::new(
            CompileErrorKind::ExpectedValue,
            argument,
            line_nr,
        )),
    }
}

fn compare(comparison: Comparison, args: &[Argument], line_nr: usize) -> Result<Instruction> {
    Ok(Instruction::Compare {
        comparison,
        lhs: operand(&args[0], line_nr)?,
        rhs: operand(&args[1], line_nr)?,
    })
}

fn emit(argument: &Argument) -> Emit {
    match argument.kind {
        ArgumentKind::Register => Emit::Register(argument.value.clone()),
        ArgumentKind::Flag => Emit::Flag(argument.value.clone()),
        ArgumentKind::String | ArgumentKind::Literal => Emit::Text(argument.value.clone()),
    }
}

/// Compiles `tokens`, writing problems to `output`
pub fn compile<O: Output>(tokens: &[Token], output: &mut O) -> Program {
    Compiler::new(output).compile(tokens)
}
