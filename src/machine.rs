use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

use crate::language::compiler::compile;
use crate::language::lexer::tokenize;
use crate::output::Output;
use crate::processor::{Processor, Program};
use crate::registers::{Flags, RegisterFile};

/// A compiled program together with the machine it runs on.
///
/// Lexer and compiler diagnostics are written to the output while the machine
/// is constructed, program output while it runs.
#[derive(Debug, Clone)]
pub struct Machine<O: Output> {
    processor: Processor,
    program: Program,
    output: O,
}

impl<O: Output> Machine<O> {
    /// Tokenizes and compiles `source`
    pub fn new(source: &str, mut output: O) -> Self {
        let lexed = tokenize(source, &mut output);
        let program = compile(&lexed.tokens, &mut output);

        log::debug!(
            "Compiled {} instruction(s), {} lexer error(s)",
            program.len(),
            lexed.errors.len()
        );

        Self {
            processor: Processor::new(),
            program,
            output,
        }
    }

    /// Reads the source from a file and compiles it
    pub fn from_file<P: AsRef<Path>>(path: P, output: O) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read program `{}`", path.display()))?;

        Ok(Self::new(&source, output))
    }

    /// Report every state change as an info record
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.processor.debug = debug;
        self
    }

    /// Runs the program once against the current state.
    ///
    /// # Errors
    ///
    /// Fails if an instruction names a register that does not exist. The
    /// state up to that instruction is kept.
    pub fn run(&mut self) -> Result<()> {
        self.processor.run(&self.program, &mut self.output)
    }

    /// Clears registers and flags so the program can run from scratch
    pub fn reset(&mut self) {
        self.processor.reset();
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn register_state(&self) -> &RegisterFile {
        &self.processor.registers
    }

    pub fn flag_state(&self) -> Flags {
        self.processor.flags
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{BufferedOutput, Record, Severity};
    use color_eyre::eyre::Result;

    fn run(source: &str) -> Result<Machine<BufferedOutput>> {
        let mut machine = Machine::new(source, BufferedOutput::new());
        machine.run()?;
        Ok(machine)
    }

    #[test]
    fn run_move_and_compare() -> Result<()> {
        let data = r#"
            lod $a, !3
            mov $a, $b
            equ $a, $b
            out $a
            out $b
            out "test"
        "#;
        let machine = run(data)?;

        assert_eq!(machine.register_state().read("a")?, 3.0);
        assert_eq!(machine.register_state().read("b")?, 3.0);
        assert!(machine.flag_state().eq);
        assert_eq!(
            machine.output().records(),
            &[Record::log("3"), Record::log("3"), Record::log("test")][..]
        );

        Ok(())
    }

    #[test]
    fn run_add_registers() -> Result<()> {
        let data = r#"
            lod $a, !3
            mov $a, $b
            add $a, $b
            equ $a, $b
            out $a
            out $b
            out "test"
        "#;
        let machine = run(data)?;

        assert_eq!(machine.register_state().read("a")?, 6.0);
        assert_eq!(machine.register_state().read("b")?, 3.0);
        assert!(!machine.flag_state().eq);
        assert_eq!(
            machine.output().messages(Severity::Log),
            vec!["6", "3", "test"]
        );

        Ok(())
    }

    #[test]
    fn run_countdown() -> Result<()> {
        let data = r#"
            ; count n down from 2
            lod $n, !2
            dec $n
            dec $n
            lst $n, !1     ; LT
            grt !0, $n     ; GT
            out %LT
            out %GT
            sub $n, !0x0A
            out $n
        "#;
        let machine = run(data)?;

        assert_eq!(
            machine.output().messages(Severity::Log),
            vec!["true", "false", "-10"]
        );

        Ok(())
    }

    #[test]
    fn run_malformed_program() -> Result<()> {
        let data = r#"
            foo $a
            lod $a, !5
            add $a, #b
            out $z
            out %XX
            inc $a
            out $a
        "#;
        let machine = run(data)?;

        assert_eq!(machine.program().len(), 5);
        assert_eq!(
            machine.output().messages(Severity::Error),
            vec![
                "[ln: 2] unknown opcode - `foo`",
                "[ln: 4] invalid argument - `#b`",
                "Unknown register 'z'.",
                "Unknown flag 'XX'.",
            ]
        );
        assert_eq!(machine.output().messages(Severity::Log), vec!["6"]);

        Ok(())
    }

    #[test]
    fn run_truncates_literals() -> Result<()> {
        let machine = run("lod $a, !3.7\nadd $a, !2.9\nlod $m, !12px\nlod $c, !-0\nout $a\nout $m\nout $c")?;

        assert_eq!(machine.program().len(), 7);
        assert!(machine.output().messages(Severity::Error).is_empty());
        assert_eq!(
            machine.output().messages(Severity::Log),
            vec!["5", "12", "0"]
        );

        Ok(())
    }

    #[test]
    fn run_aborts_on_unknown_register() -> Result<()> {
        let mut machine = Machine::new("lod $a, !1\ninc $x\nlod $b, !2", BufferedOutput::new());
        let err = machine.run().unwrap_err();

        assert_eq!(err.root_cause().to_string(), "register `x` does not exist");
        assert_eq!(machine.register_state().read("a")?, 1.0);
        assert_eq!(machine.register_state().read("b")?, 0.0);

        Ok(())
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() -> Result<()> {
        let machine = run("\n; note\n   \n\t\n")?;

        assert!(machine.program().is_empty());
        assert!(machine.output().records().is_empty());

        Ok(())
    }

    #[test]
    fn compile_twice_gives_same_state() -> Result<()> {
        let data = "lod $m, !7\nsub $m, !2\ngrt $m, !4\nlst $m, $n\nequ !5, $m";

        let first = run(data)?;
        let second = run(data)?;

        assert_eq!(first.register_state(), second.register_state());
        assert_eq!(first.flag_state(), second.flag_state());
        assert_eq!(
            first.flag_state(),
            Flags {
                gt: true,
                lt: false,
                eq: true
            }
        );

        Ok(())
    }

    #[test]
    fn reset_and_rerun() -> Result<()> {
        let mut machine = Machine::new("inc $a\nout $a", BufferedOutput::new());
        machine.run()?;
        machine.run()?;
        assert_eq!(machine.register_state().read("a")?, 2.0);

        machine.reset();
        machine.output_mut().clear();
        machine.run()?;
        assert_eq!(machine.output().messages(Severity::Log), vec!["1"]);

        Ok(())
    }

    #[test]
    fn run_in_debug_mode() -> Result<()> {
        let mut machine = Machine::new("lod $a, !3\nout $a", BufferedOutput::new()).with_debug(true);
        machine.run()?;

        let output = machine.into_output();
        assert_eq!(output.messages(Severity::Info), vec!["Wrote '3' to register 'a'."]);
        assert_eq!(output.messages(Severity::Log), vec!["3"]);

        Ok(())
    }

    #[test]
    fn load_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("asmvm-{}.asm", std::process::id()));
        fs::write(&path, "lod $k, !0b11\nout $k\n")?;

        let mut machine = Machine::from_file(&path, BufferedOutput::new())?;
        machine.run()?;
        fs::remove_file(&path)?;

        assert_eq!(machine.output().messages(Severity::Log), vec!["3"]);
        assert!(Machine::from_file(&path, BufferedOutput::new()).is_err());

        Ok(())
    }
}
