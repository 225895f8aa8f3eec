//! A small register machine for a line oriented assembly language.
//!
//! Source text is tokenized, compiled into a [`Program`] and run against a
//! [`Processor`] holding 14 registers and three comparison flags. Diagnostics
//! and program output go to an [`Output`].

pub mod language;
pub mod machine;
pub mod output;
pub mod processor;
pub mod registers;

pub use machine::Machine;
pub use output::{BufferedOutput, LogOutput, Output, Record, Severity};
pub use processor::{Processor, Program};
pub use registers::{Flags, Register, RegisterFile};
