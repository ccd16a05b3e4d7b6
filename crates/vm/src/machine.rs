//! VM state management: frames, operand stack, call stack, label table and
//! the I/O endpoints of a run.

use crate::error::RuntimeError;
use crate::frames::Frames;
use crate::stats::Stats;
use crate::type_check;
use ippvm_common::{
    Arg, DecodeError, Instruction, LabelTable, Opcode, Program, TypeTag, Value, VarRef,
};
use std::io::{self, BufRead, Write};

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The instruction pointer ran past the last instruction.
    Finished,
    /// `EXIT` with the given status (0-49).
    Exit(u8),
}

impl Halt {
    /// Process exit status for this halt.
    pub fn code(self) -> i32 {
        match self {
            Halt::Finished => 0,
            Halt::Exit(code) => i32::from(code),
        }
    }
}

/// Where a binary or unary operator takes its operands from and puts its
/// result: instruction arguments, or the operand stack for the `S` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Form {
    Args,
    Stack,
}

/// The IPPcode22 virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Global, local and temporary frames.
    pub(crate) frames: Frames,
    /// Operand stack.
    pub(crate) stack: Vec<Value>,
    /// Return positions pushed by `CALL`.
    pub(crate) call_stack: Vec<usize>,
    /// Position of the next instruction.
    pub(crate) pc: usize,
    /// Position of the instruction being executed.
    pub(crate) current: usize,
    /// Label name → position, built when execution starts.
    pub(crate) labels: LabelTable,
    /// Line source for `READ`.
    pub(crate) input: Box<dyn BufRead + 'a>,
    /// Sink for `WRITE`.
    pub(crate) output: Box<dyn Write + 'a>,
    /// Sink for `DPRINT` and `BREAK`.
    pub(crate) diagnostics: Box<dyn Write + 'a>,
    /// Counters, when enabled.
    pub(crate) stats: Option<Stats>,
    /// Instructions dispatched so far.
    pub(crate) executed: u64,
}

impl<'a> VM<'a> {
    /// Create a VM reading stdin and writing stdout and stderr.
    ///
    /// Stdin is not locked here, so callers may hold its lock and pass it
    /// to [`VM::with_input`].
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            frames: Frames::new(),
            stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            current: 0,
            labels: LabelTable::default(),
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::BufWriter::new(io::stdout())),
            diagnostics: Box::new(io::stderr()),
            stats: None,
            executed: 0,
        }
    }

    /// Replace the `READ` source.
    pub fn with_input(mut self, input: impl BufRead + 'a) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Replace the `WRITE` sink.
    pub fn with_output(mut self, output: impl Write + 'a) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Replace the `DPRINT`/`BREAK` sink.
    pub fn with_diagnostics(mut self, diagnostics: impl Write + 'a) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self) -> Self {
        self.stats = Some(Stats::new());
        self
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// 1-based position of the instruction being executed.
    pub(crate) fn at(&self) -> usize {
        self.current + 1
    }

    pub(crate) fn load_labels(&mut self) -> Result<(), RuntimeError> {
        self.labels = self.program.labels().map_err(|err| match err {
            DecodeError::DuplicateLabel { label, position } => RuntimeError::DuplicateLabel {
                at: position,
                label,
            },
            other => RuntimeError::MalformedInstruction {
                at: 0,
                opcode: Opcode::Label,
                reason: other.to_string(),
            },
        })?;
        Ok(())
    }

    pub(crate) fn io_error(&self, err: io::Error) -> RuntimeError {
        RuntimeError::Io {
            at: self.at(),
            message: err.to_string(),
        }
    }

    /// Fail unless the operand stack holds at least `needed` values.
    pub(crate) fn require_depth(&self, opcode: Opcode, needed: usize) -> Result<(), RuntimeError> {
        if self.stack.len() < needed {
            return Err(RuntimeError::StackUnderflow {
                at: self.at(),
                opcode,
                needed,
                depth: self.stack.len(),
            });
        }
        Ok(())
    }

    /// Pop a value from the operand stack.
    pub(crate) fn pop(&mut self, opcode: Opcode) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            at: self.current + 1,
            opcode,
            needed: 1,
            depth: 0,
        })
    }

    fn malformed(&self, instr: &Instruction, reason: String) -> RuntimeError {
        RuntimeError::MalformedInstruction {
            at: self.at(),
            opcode: instr.opcode,
            reason,
        }
    }

    pub(crate) fn arg<'i>(&self, instr: &'i Instruction, index: usize) -> Result<&'i Arg, RuntimeError> {
        instr
            .args
            .get(index)
            .ok_or_else(|| self.malformed(instr, format!("missing argument {}", index + 1)))
    }

    pub(crate) fn var<'i>(&self, instr: &'i Instruction, index: usize) -> Result<&'i VarRef, RuntimeError> {
        match self.arg(instr, index)? {
            Arg::Var(var) => Ok(var),
            other => Err(self.malformed(
                instr,
                format!("argument {} must be a variable, found {}", index + 1, other.kind_name()),
            )),
        }
    }

    pub(crate) fn label<'i>(&self, instr: &'i Instruction, index: usize) -> Result<&'i str, RuntimeError> {
        match self.arg(instr, index)? {
            Arg::Label(label) => Ok(label),
            other => Err(self.malformed(
                instr,
                format!("argument {} must be a label, found {}", index + 1, other.kind_name()),
            )),
        }
    }

    pub(crate) fn type_arg(&self, instr: &Instruction, index: usize) -> Result<TypeTag, RuntimeError> {
        match self.arg(instr, index)? {
            Arg::Type(tag) => Ok(*tag),
            other => Err(self.malformed(
                instr,
                format!("argument {} must be a type, found {}", index + 1, other.kind_name()),
            )),
        }
    }

    /// The value of a symbol argument: a variable's contents or a converted
    /// literal.
    pub(crate) fn symbol(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        match self.arg(instr, index)? {
            Arg::Var(var) => self.read_var(var),
            Arg::Literal(literal) => type_check::convert(self.at(), literal),
            other => Err(self.malformed(
                instr,
                format!("argument {} must be a symbol, found {}", index + 1, other.kind_name()),
            )),
        }
    }

    /// A symbol argument whose kind must be in `accepted`.
    pub(crate) fn operand(
        &self,
        instr: &Instruction,
        index: usize,
        accepted: &[TypeTag],
    ) -> Result<Value, RuntimeError> {
        let value = self.symbol(instr, index)?;
        type_check::expect(self.at(), instr.opcode, &value, accepted)?;
        Ok(value)
    }

    pub(crate) fn read_var(&self, var: &VarRef) -> Result<Value, RuntimeError> {
        self.frames
            .read(var)
            .cloned()
            .map_err(|err| RuntimeError::from_frame(self.at(), err))
    }

    pub(crate) fn write_var(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        let at = self.at();
        self.frames
            .write(var, value)
            .map_err(|err| RuntimeError::from_frame(at, err))
    }

    pub(crate) fn resolve_label(&self, label: &str) -> Result<usize, RuntimeError> {
        self.labels
            .get(label)
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                at: self.at(),
                label: label.to_string(),
            })
    }

    /// One operand for a unary operator.
    pub(crate) fn unary(
        &mut self,
        instr: &Instruction,
        form: Form,
        accepted: &[TypeTag],
    ) -> Result<Value, RuntimeError> {
        match form {
            Form::Args => self.operand(instr, 1, accepted),
            Form::Stack => {
                self.require_depth(instr.opcode, 1)?;
                let value = self.pop(instr.opcode)?;
                type_check::expect(self.at(), instr.opcode, &value, accepted)?;
                Ok(value)
            }
        }
    }

    /// Both operands of a binary operator. The stack form pops the right
    /// operand first.
    pub(crate) fn binary(
        &mut self,
        instr: &Instruction,
        form: Form,
        left: &[TypeTag],
        right: &[TypeTag],
    ) -> Result<(Value, Value), RuntimeError> {
        match form {
            Form::Args => Ok((
                self.operand(instr, 1, left)?,
                self.operand(instr, 2, right)?,
            )),
            Form::Stack => {
                self.require_depth(instr.opcode, 2)?;
                let b = self.pop(instr.opcode)?;
                let a = self.pop(instr.opcode)?;
                type_check::expect(self.at(), instr.opcode, &a, left)?;
                type_check::expect(self.at(), instr.opcode, &b, right)?;
                Ok((a, b))
            }
        }
    }

    /// Deliver an operator's result to its target variable or the stack.
    pub(crate) fn store(&mut self, instr: &Instruction, form: Form, value: Value) -> Result<(), RuntimeError> {
        match form {
            Form::Args => {
                let var = self.var(instr, 0)?;
                self.write_var(var, value)
            }
            Form::Stack => {
                self.stack.push(value);
                Ok(())
            }
        }
    }

    /// Next input line without its line terminator. `None` at end of input
    /// or when the line is not valid UTF-8.
    pub(crate) fn read_line(&mut self) -> Result<Option<String>, RuntimeError> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Some(line))
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }
}
