use std::fmt;

use crate::output::{Output, Record};
use crate::registers::{Comparison, Flag, Flags, RegisterError, RegisterFile, Value};
use color_eyre::eyre::{Result, WrapErr};
use log::*;

/// Operand of arithmetic and comparison instructions
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(String),
    Literal(Value),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(name) => write!(f, "${}", name),
            Operand::Literal(value) => write!(f, "!{}", value),
        }
    }
}

/// What `out` prints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    /// Current value of a register
    Register(String),
    /// Current state of a flag
    Flag(String),
    /// Text printed verbatim
    Text(String),
}

impl fmt::Display for Emit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emit::Register(name) => write!(f, "${}", name),
            Emit::Flag(name) => write!(f, "%{}", name),
            Emit::Text(text) => write!(f, "\"{}\"", text),
        }
    }
}

/// A compiled instruction with typed operands.
///
/// Register names are kept as written and are resolved when the instruction
/// runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Load { register: String, value: Value },
    Move { from: String, to: String },
    Increment { register: String },
    Decrement { register: String },
    Add { register: String, operand: Operand },
    Subtract { register: String, operand: Operand },
    Compare {
        comparison: Comparison,
        lhs: Operand,
        rhs: Operand,
    },
    Out(Emit),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load { register, value } => write!(f, "lod ${}, !{}", register, value),
            Instruction::Move { from, to } => write!(f, "mov ${}, ${}", from, to),
            Instruction::Increment { register } => write!(f, "inc ${}", register),
            Instruction::Decrement { register } => write!(f, "dec ${}", register),
            Instruction::Add { register, operand } => write!(f, "add ${}, {}", register, operand),
            Instruction::Subtract { register, operand } => {
                write!(f, "sub ${}, {}", register, operand)
            }
            Instruction::Compare {
                comparison,
                lhs,
                rhs,
            } => {
                let mnemonic = match comparison {
                    Comparison::GreaterThan => "grt",
                    Comparison::LessThan => "lst",
                    Comparison::Equals => "equ",
                };
                write!(f, "{} {}, {}", mnemonic, lhs, rhs)
            }
            Instruction::Out(emit) => write!(f, "out {}", emit),
        }
    }
}

/// An instruction together with the source line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub line_nr: usize,
    pub instruction: Instruction,
}

/// Instructions in source order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Program {
    steps: Vec<Step>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line_nr: usize, instruction: Instruction) {
        self.steps.push(Step {
            line_nr,
            instruction,
        });
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Emulates the register machine
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Processor {
    /// General purpose registers
    pub registers: RegisterFile,
    /// Comparison flags
    pub flags: Flags,
    /// Report every state change as an info record
    pub debug: bool,
}

impl Processor {
    /// Initializes a new CPU with all registers and flags cleared
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }

    /// Clears registers and flags
    pub fn reset(&mut self) {
        self.registers.reset();
        self.flags = Flags::default();
    }

    /// Executes a single instruction.
    ///
    /// Returns the record the instruction wants printed, if any.
    ///
    /// # Errors
    ///
    /// Fails if the instruction names a register that does not exist or
    /// passes something that is not a number.
    pub fn execute_instruction(
        &mut self,
        instruction: &Instruction,
    ) -> Result<Option<Record>, RegisterError> {
        let record = match instruction {
            Instruction::Load { register, value } => {
                self.registers.write(register, *value)?;

                self.report(|| format!("Wrote '{}' to register '{}'.", number(*value), register))
            }
            Instruction::Move { from, to } => {
                self.registers.move_to(from, to)?;

                self.report(|| format!("Moved '{}' to register '{}'.", from, to))
            }
            Instruction::Increment { register } => {
                self.registers.increment(register)?;

                self.report(|| format!("Incremented register '{}'.", register))
            }
            Instruction::Decrement { register } => {
                self.registers.decrement(register)?;

                self.report(|| format!("Decremented register '{}'.", register))
            }
            Instruction::Add { register, operand } => {
                match operand {
                    Operand::Register(other) => self.registers.add_register(register, other)?,
                    Operand::Literal(value) => self.registers.add_value(register, *value)?,
                }

                self.report(|| format!("Added '{}' to register '{}'.", bare(operand), register))
            }
            Instruction::Subtract { register, operand } => {
                match operand {
                    Operand::Register(other) => {
                        self.registers.subtract_register(register, other)?
                    }
                    Operand::Literal(value) => self.registers.subtract_value(register, *value)?,
                }

                self.report(|| {
                    format!(
                        "Subtracted '{}' from register '{}'.",
                        bare(operand),
                        register
                    )
                })
            }
            Instruction::Compare {
                comparison,
                lhs,
                rhs,
            } => {
                let result = self.compare(lhs, *comparison, rhs)?;
                self.flags.set(comparison.flag(), result);

                self.report(|| {
                    let relation = match comparison {
                        Comparison::GreaterThan => "greater than",
                        Comparison::LessThan => "less than",
                        Comparison::Equals => "equal to",
                    };
                    let negation = if result { "" } else { "not " };
                    format!(
                        "'{}' is {}{} '{}'.",
                        bare(lhs),
                        negation,
                        relation,
                        bare(rhs)
                    )
                })
            }
            Instruction::Out(emit) => Some(self.out(emit)),
        };

        Ok(record)
    }

    /// Routes both operands to the matching register file primitive
    fn compare(
        &self,
        lhs: &Operand,
        comparison: Comparison,
        rhs: &Operand,
    ) -> Result<bool, RegisterError> {
        match (lhs, rhs) {
            (Operand::Register(a), Operand::Register(b)) => {
                self.registers.compare_registers(a, comparison, b)
            }
            (Operand::Register(a), Operand::Literal(value)) => {
                self.registers.compare_register_value(a, comparison, *value)
            }
            (Operand::Literal(value), Operand::Register(b)) => {
                self.registers
                    .compare_register_value(b, comparison.flipped(), *value)
            }
            (Operand::Literal(x), Operand::Literal(y)) => {
                RegisterFile::compare_values(*x, comparison, *y)
            }
        }
    }

    /// Names are user input, so unknown ones are reported instead of aborting
    fn out(&self, emit: &Emit) -> Record {
        match emit {
            Emit::Register(name) => match self.registers.read(name) {
                Ok(value) => Record::log(number(value)),
                Err(_) => Record::error(format!("Unknown register '{}'.", name)),
            },
            Emit::Flag(name) => match Flag::from_name(name) {
                Some(flag) => Record::log(self.flags.get(flag).to_string()),
                None => Record::error(format!("Unknown flag '{}'.", name)),
            },
            Emit::Text(text) => Record::log(text.as_str()),
        }
    }

    fn report<F: FnOnce() -> String>(&self, message: F) -> Option<Record> {
        if self.debug {
            Some(Record::info(message()))
        } else {
            None
        }
    }

    /// Runs one step and writes its record to `output`
    pub fn execute<O: Output>(&mut self, step: &Step, output: &mut O) -> Result<()> {
        debug!("[{}] {}", step.line_nr, step.instruction);

        let record = self
            .execute_instruction(&step.instruction)
            .wrap_err_with(|| {
                format!(
                    "Failed to execute `{}` on line {}",
                    step.instruction, step.line_nr
                )
            })?;

        if let Some(record) = record {
            output.record(&record);
        }

        Ok(())
    }

    /// Runs the whole program in order.
    ///
    /// # Errors
    ///
    /// Stops at the first instruction the register file rejects. Records
    /// written before that point stay in `output`.
    pub fn run<O: Output>(&mut self, program: &Program, output: &mut O) -> Result<()> {
        for step in program.steps() {
            self.execute(step, output)?;
        }

        info!("Program terminated after {} instruction(s)", program.len());

        Ok(())
    }
}

/// Formats a register value for display. Negative zero prints as `0`.
fn number(value: Value) -> String {
    if value == 0.0 {
        "0".to_owned()
    } else {
        value.to_string()
    }
}

/// Operand without its sigil, as shown in debug messages
fn bare(operand: &Operand) -> String {
    match operand {
        Operand::Register(name) => name.clone(),
        Operand::Literal(value) => number(*value),
    }
}
