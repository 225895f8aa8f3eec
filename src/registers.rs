use std::convert::TryFrom;
use std::{error, fmt};

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Numeric value stored in a register
pub type Value = f64;

/// Number of registers in the register file
pub const REGISTER_COUNT: usize = 14;

/// The fixed set of registers. The discriminant is the ASCII name used in source code.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(TryFromPrimitive, IntoPrimitive)]
pub enum Register {
    A = b'a',
    B = b'b',
    C = b'c',
    D = b'd',
    E = b'e',
    F = b'f',
    G = b'g',
    H = b'h',
    I = b'i',
    J = b'j',
    K = b'k',
    L = b'l',
    M = b'm',
    N = b'n',
}

/// Declared width and sign of a register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    /// 8 bit signed
    SignedByte,
    /// 8 bit unsigned
    UnsignedByte,
    /// 32 bit float
    Float,
    /// 64 bit integer
    Long,
}

impl RegisterClass {
    pub fn bits(&self) -> u32 {
        match self {
            RegisterClass::SignedByte | RegisterClass::UnsignedByte => 8,
            RegisterClass::Float => 32,
            RegisterClass::Long => 64,
        }
    }
}

impl Register {
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
        Self::M,
        Self::N,
    ];

    /// Resolves a register from its source name, e.g. `"a"`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.as_bytes() {
            [byte] => Register::try_from(*byte).ok(),
            _ => None,
        }
    }

    pub fn name(&self) -> char {
        u8::from(*self) as char
    }

    /// Width/sign class. Purely descriptive, writes are never clamped.
    pub fn class(&self) -> RegisterClass {
        match self {
            Self::A | Self::B | Self::C | Self::D | Self::E | Self::F | Self::G | Self::H => {
                RegisterClass::SignedByte
            }
            Self::I | Self::J | Self::K | Self::L => RegisterClass::UnsignedByte,
            Self::M => RegisterClass::Float,
            Self::N => RegisterClass::Long,
        }
    }

    fn index(self) -> usize {
        (u8::from(self) - b'a') as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Misuse of the register file. These abort a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterError {
    UnknownRegister { name: String },
    InvalidOperand { value: Value },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::UnknownRegister { name } => {
                write!(f, "register `{}` does not exist", name)
            }
            RegisterError::InvalidOperand { value } => {
                write!(f, "operand `{}` is not a number", value)
            }
        }
    }
}

impl error::Error for RegisterError {}

pub type Result<T, E = RegisterError> = std::result::Result<T, E>;

/// A comparison performed by `grt`, `lst` and `equ`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    Equals,
}

impl Comparison {
    pub fn test(&self, lhs: Value, rhs: Value) -> bool {
        match self {
            Comparison::GreaterThan => lhs > rhs,
            Comparison::LessThan => lhs < rhs,
            Comparison::Equals => lhs == rhs,
        }
    }

    /// The comparison with both sides swapped, `x > y` becomes `y < x`
    pub fn flipped(&self) -> Self {
        match self {
            Comparison::GreaterThan => Comparison::LessThan,
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::Equals => Comparison::Equals,
        }
    }

    /// The flag which receives the result
    pub fn flag(&self) -> Flag {
        match self {
            Comparison::GreaterThan => Flag::GT,
            Comparison::LessThan => Flag::LT,
            Comparison::Equals => Flag::EQ,
        }
    }
}

/// Names of the comparison flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    GT,
    LT,
    EQ,
}

impl Flag {
    pub const ALL: [Self; 3] = [Self::GT, Self::LT, Self::EQ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|flag| flag.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Flag::GT => "GT",
            Flag::LT => "LT",
            Flag::EQ => "EQ",
        }
    }
}

/// Comparison flags. Only comparisons write them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags {
    pub gt: bool,
    pub lt: bool,
    pub eq: bool,
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::GT => self.gt,
            Flag::LT => self.lt,
            Flag::EQ => self.eq,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::GT => self.gt = value,
            Flag::LT => self.lt = value,
            Flag::EQ => self.eq = value,
        }
    }
}

/// The 14 registers of the machine.
///
/// Registers are addressed by their source name. Every primitive validates all
/// of its operands before touching any register, so a failed call leaves the
/// file unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RegisterFile {
    values: [Value; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed access which cannot fail
    pub fn get(&self, register: Register) -> Value {
        self.values[register.index()]
    }

    /// Iterates over all registers in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Register, Value)> + '_ {
        Register::ALL
            .iter()
            .map(move |register| (*register, self.get(*register)))
    }

    /// Sets every register back to zero
    pub fn reset(&mut self) {
        self.values = [0.0; REGISTER_COUNT];
    }

    /// Reads the register called `name`
    pub fn read(&self, name: &str) -> Result<Value> {
        Ok(self.get(resolve(name)?))
    }

    /// Overwrites the register called `name` with `value`
    pub fn write(&mut self, name: &str, value: Value) -> Result<()> {
        let register = resolve(name)?;
        let value = validate(value)?;
        self.values[register.index()] = value;
        Ok(())
    }

    pub fn increment(&mut self, name: &str) -> Result<()> {
        self.add_value(name, 1.0)
    }

    pub fn decrement(&mut self, name: &str) -> Result<()> {
        self.subtract_value(name, 1.0)
    }

    /// `a += b`
    pub fn add_register(&mut self, a: &str, b: &str) -> Result<()> {
        let value = self.read(b)?;
        self.add_value(a, value)
    }

    /// `register += value`
    pub fn add_value(&mut self, name: &str, value: Value) -> Result<()> {
        let register = resolve(name)?;
        let value = validate(value)?;
        self.values[register.index()] += value;
        Ok(())
    }

    /// `a -= b`
    pub fn subtract_register(&mut self, a: &str, b: &str) -> Result<()> {
        let value = self.read(b)?;
        self.subtract_value(a, value)
    }

    /// `register -= value`
    pub fn subtract_value(&mut self, name: &str, value: Value) -> Result<()> {
        let register = resolve(name)?;
        let value = validate(value)?;
        self.values[register.index()] -= value;
        Ok(())
    }

    /// Copies the value of `from` into `to`
    pub fn move_to(&mut self, from: &str, to: &str) -> Result<()> {
        let value = self.read(from)?;
        self.write(to, value)
    }

    pub fn compare_registers(&self, a: &str, comparison: Comparison, b: &str) -> Result<bool> {
        let lhs = self.read(a)?;
        let rhs = self.read(b)?;
        Ok(comparison.test(lhs, rhs))
    }

    pub fn compare_register_value(
        &self,
        name: &str,
        comparison: Comparison,
        value: Value,
    ) -> Result<bool> {
        let lhs = self.read(name)?;
        Ok(comparison.test(lhs, validate(value)?))
    }

    pub fn compare_values(lhs: Value, comparison: Comparison, rhs: Value) -> Result<bool> {
        Ok(comparison.test(validate(lhs)?, validate(rhs)?))
    }
}

fn resolve(name: &str) -> Result<Register> {
    Register::from_name(name).ok_or_else(|| RegisterError::UnknownRegister {
        name: name.to_owned(),
    })
}

fn validate(value: Value) -> Result<Value> {
    if value.is_nan() {
        Err(RegisterError::InvalidOperand { value })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    const NAMES: [&str; REGISTER_COUNT] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    ];

    #[test]
    fn test_write_read() -> Result<()> {
        let mut registers = RegisterFile::new();
        for (i, name) in NAMES.iter().enumerate() {
            let value = i as Value * 1.5 - 4.0;
            registers.write(name, value)?;
            assert_eq!(registers.read(name)?, value);
        }

        Ok(())
    }

    #[test]
    fn test_no_clamping() -> Result<()> {
        let mut registers = RegisterFile::new();
        registers.write("a", 300.0)?;
        registers.write("i", -1.0)?;
        assert_eq!(registers.read("a")?, 300.0);
        assert_eq!(registers.read("i")?, -1.0);

        Ok(())
    }

    #[test]
    fn test_unknown_register() {
        let mut registers = RegisterFile::new();
        let unknown = RegisterError::UnknownRegister {
            name: "z".to_owned(),
        };
        assert_eq!(registers.read("z"), Err(unknown.clone()));
        assert_eq!(registers.write("z", 1.0), Err(unknown.clone()));
        assert_eq!(registers.increment("z"), Err(unknown.clone()));
        assert_eq!(registers.decrement("z"), Err(unknown));
        assert!(registers.read("ab").is_err());
        assert!(registers.read("").is_err());
        assert!(registers.read("A").is_err());
    }

    #[test]
    fn test_invalid_operand() {
        let mut registers = RegisterFile::new();
        assert!(matches!(
            registers.write("a", Value::NAN),
            Err(RegisterError::InvalidOperand { .. })
        ));
        assert_eq!(registers, RegisterFile::new());
    }

    #[test]
    fn test_increment_decrement() -> Result<()> {
        let mut registers = RegisterFile::new();
        for name in NAMES.iter() {
            registers.write(name, 7.0)?;
            registers.increment(name)?;
            assert_eq!(registers.read(name)?, 8.0);
            registers.decrement(name)?;
            assert_eq!(registers.read(name)?, 7.0);
        }

        Ok(())
    }

    #[test]
    fn test_add_register() -> Result<()> {
        let mut registers = RegisterFile::new();
        registers.write("a", 2.0)?;
        registers.write("b", 5.0)?;
        registers.add_register("a", "b")?;
        assert_eq!(registers.read("a")?, 7.0);
        assert_eq!(registers.read("b")?, 5.0);

        registers.subtract_register("a", "b")?;
        assert_eq!(registers.read("a")?, 2.0);
        assert_eq!(registers.read("b")?, 5.0);

        Ok(())
    }

    #[test]
    fn test_add_value() -> Result<()> {
        let mut registers = RegisterFile::new();
        registers.add_value("n", 10.0)?;
        registers.subtract_value("n", 25.0)?;
        assert_eq!(registers.read("n")?, -15.0);

        Ok(())
    }

    #[test]
    fn test_add_is_all_or_nothing() -> Result<()> {
        let mut registers = RegisterFile::new();
        registers.write("a", 4.0)?;
        assert!(registers.add_register("a", "x").is_err());
        assert!(registers.subtract_register("a", "x").is_err());
        assert!(registers.add_value("a", Value::NAN).is_err());
        assert_eq!(registers.read("a")?, 4.0);

        Ok(())
    }

    #[test]
    fn test_move() -> Result<()> {
        let mut registers = RegisterFile::new();
        registers.write("m", 1.25)?;
        registers.move_to("m", "c")?;
        assert_eq!(registers.read("c")?, 1.25);
        assert_eq!(registers.read("m")?, 1.25);

        assert!(registers.move_to("m", "q").is_err());
        assert!(registers.move_to("q", "m").is_err());

        Ok(())
    }

    #[test]
    fn test_comparisons_are_antisymmetric() -> Result<()> {
        let mut registers = RegisterFile::new();
        let samples = [-3.0, 0.0, 2.0, 2.0, 0.5];
        for x in samples.iter() {
            for y in samples.iter() {
                registers.write("a", *x)?;
                registers.write("b", *y)?;

                assert_eq!(
                    registers.compare_registers("a", Comparison::GreaterThan, "b")?,
                    registers.compare_registers("b", Comparison::LessThan, "a")?
                );
                assert_eq!(
                    registers.compare_register_value("a", Comparison::GreaterThan, *y)?,
                    registers.compare_register_value("b", Comparison::LessThan, *x)?
                );
                assert_eq!(
                    RegisterFile::compare_values(*x, Comparison::GreaterThan, *y)?,
                    RegisterFile::compare_values(*y, Comparison::LessThan, *x)?
                );
                assert_eq!(
                    registers.compare_registers("a", Comparison::Equals, "b")?,
                    registers.compare_registers("b", Comparison::Equals, "a")?
                );
                assert_eq!(
                    RegisterFile::compare_values(*x, Comparison::Equals, *y)?,
                    x == y
                );
            }
        }

        Ok(())
    }

    #[test]
    fn test_flipped_comparison() {
        for comparison in [
            Comparison::GreaterThan,
            Comparison::LessThan,
            Comparison::Equals,
        ]
        .iter()
        {
            assert_eq!(comparison.test(1.0, 2.0), comparison.flipped().test(2.0, 1.0));
            assert_eq!(comparison.flipped().flipped(), *comparison);
        }
    }

    #[test]
    fn test_register_names() {
        assert_eq!(Register::from_name("a"), Some(Register::A));
        assert_eq!(Register::from_name("n"), Some(Register::N));
        assert_eq!(Register::from_name("o"), None);
        assert_eq!(Register::M.name(), 'm');
        assert_eq!(Register::H.class(), RegisterClass::SignedByte);
        assert_eq!(Register::I.class(), RegisterClass::UnsignedByte);
        assert_eq!(Register::M.class().bits(), 32);
        assert_eq!(Register::N.class().bits(), 64);
    }

    #[test]
    fn test_reset() -> Result<()> {
        let mut registers = RegisterFile::new();
        registers.write("k", 9.0)?;
        registers.reset();
        assert!(registers.iter().all(|(_, value)| value == 0.0));
        assert_eq!(registers.iter().count(), REGISTER_COUNT);

        Ok(())
    }

    #[test]
    fn test_flags() {
        let mut flags = Flags::default();
        flags.set(Flag::EQ, true);
        assert!(flags.get(Flag::EQ));
        assert!(!flags.get(Flag::GT));
        assert_eq!(Flag::from_name("LT"), Some(Flag::LT));
        assert_eq!(Flag::from_name("lt"), None);
        assert_eq!(Comparison::Equals.flag(), Flag::EQ);
    }
}
