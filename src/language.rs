//! Source language of the machine. One instruction per line:
//!
//! ```text
//! ; full line comment
//! lod $a, !3      ; load 3 into register a
//! mov $a, $b
//! equ $a, $b
//! out %EQ
//! out "done"
//! ```

use std::convert::TryFrom;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub mod compiler;
pub mod lexer;

macro_rules! opcodes {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $mnemonic:literal , )+ ) => {
        /// Defines the opcodes of the language
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $(
                $( #[doc = $doc] )+
                $name,
            )+
        }

        impl Opcode {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            /// The three character spelling used in source code
            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $( Self::$name => $mnemonic , )+
                }
            }

            pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|opcode| opcode.mnemonic() == mnemonic)
            }
        }

        impl ::std::fmt::Display for Opcode {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.mnemonic())
            }
        }
    }
}

opcodes! {
    /// Load a literal into a register
    /// @param register, literal
    Load = "lod",
    /// Copy a register into another register
    /// @param from, to
    Move = "mov",
    /// Add one to a register
    Increment = "inc",
    /// Subtract one from a register
    Decrement = "dec",
    /// Add a register or literal to a register
    Add = "add",
    /// Subtract a register or literal from a register
    Subtract = "sub",
    /// Store `lhs > rhs` in the GT flag
    GreaterThan = "grt",
    /// Store `lhs < rhs` in the LT flag
    LessThan = "lst",
    /// Store `lhs == rhs` in the EQ flag
    Equals = "equ",
    /// Print a register, flag, string or literal
    Out = "out",
}

/// Kind of an argument, selected by its leading sigil
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(TryFromPrimitive, IntoPrimitive)]
pub enum ArgumentKind {
    Register = b'$',
    Literal = b'!',
    String = b'"',
    Flag = b'%',
}

impl ArgumentKind {
    pub fn from_sigil(sigil: char) -> Option<Self> {
        if sigil.is_ascii() {
            ArgumentKind::try_from(sigil as u8).ok()
        } else {
            None
        }
    }

    pub fn sigil(&self) -> char {
        u8::from(*self) as char
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgumentKind::Register => "register",
            ArgumentKind::Literal => "literal",
            ArgumentKind::String => "string",
            ArgumentKind::Flag => "flag",
        })
    }
}

/// A typed argument with its sigil removed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub value: String,
}

impl Argument {
    pub fn new<S: Into<String>>(kind: ArgumentKind, value: S) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArgumentKind::String => write!(f, "\"{}\"", self.value),
            kind => write!(f, "{}{}", kind.sigil(), self.value),
        }
    }
}

/// All tokens of one source line: the opcode and its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub line_nr: usize,
    pub opcode: Opcode,
    pub arguments: Vec<Argument>,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            let separator = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", separator, argument)?;
        }
        Ok(())
    }
}
