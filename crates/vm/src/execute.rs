//! Main execution loop and opcode dispatch for the IPPcode22 VM.

use crate::error::RuntimeError;
use crate::machine::{Form, Halt, VM};
use crate::ops::{self, ArithOp, CmpOp, LogicOp};
use crate::type_check::{self, ANY, BOOL, FLOAT, INT, NUMERIC, ORDERED, STRING};
use ippvm_common::{Arg, Instruction, Opcode, Value};
use std::io::Write;
use tracing::{debug, trace};

impl<'a> VM<'a> {
    /// Execute the program until `EXIT`, the end of the instruction
    /// sequence, or an error. Output is flushed in every case.
    pub fn execute(&mut self) -> Result<Halt, RuntimeError> {
        let result = self.run_loop();
        let flushed = self
            .output
            .flush()
            .and_then(|()| self.diagnostics.flush())
            .map_err(|err| self.io_error(err));
        let halt = result?;
        flushed?;
        Ok(halt)
    }

    fn run_loop(&mut self) -> Result<Halt, RuntimeError> {
        self.load_labels()?;
        debug!(
            instructions = self.program.len(),
            labels = self.labels.len(),
            "label table built"
        );

        let program = self.program;
        while let Some(instr) = program.instructions.get(self.pc) {
            self.current = self.pc;
            self.pc += 1;
            trace!(at = self.at(), order = instr.order, opcode = %instr.opcode, "dispatch");

            let halt = self.step(instr)?;
            self.executed += 1;
            if let Some(stats) = self.stats.as_mut() {
                stats.record(instr, self.frames.live_count());
            }
            if let Some(halt) = halt {
                return Ok(halt);
            }
        }
        Ok(Halt::Finished)
    }

    fn step(&mut self, instr: &Instruction) -> Result<Option<Halt>, RuntimeError> {
        match instr.opcode {
            // Frames, calls
            Opcode::Move => self.exec_move(instr)?,
            Opcode::CreateFrame => self.frames.create_temporary(),
            Opcode::PushFrame => {
                let result = self.frames.push_local();
                result.map_err(|err| RuntimeError::from_frame(self.at(), err))?
            }
            Opcode::PopFrame => {
                let result = self.frames.pop_local();
                result.map_err(|err| RuntimeError::from_frame(self.at(), err))?
            }
            Opcode::DefVar => self.exec_defvar(instr)?,
            Opcode::Call => self.exec_call(instr)?,
            Opcode::Return => self.exec_return()?,

            // Operand stack
            Opcode::PushS => {
                let value = self.symbol(instr, 0)?;
                self.stack.push(value);
            }
            Opcode::PopS => self.exec_pops(instr)?,
            Opcode::ClearS => self.stack.clear(),

            // Arithmetic, relational, boolean, conversion
            Opcode::Add => self.exec_arith(instr, Form::Args, ArithOp::Add)?,
            Opcode::Sub => self.exec_arith(instr, Form::Args, ArithOp::Sub)?,
            Opcode::Mul => self.exec_arith(instr, Form::Args, ArithOp::Mul)?,
            Opcode::IDiv => self.exec_arith(instr, Form::Args, ArithOp::IDiv)?,
            Opcode::Div => self.exec_arith(instr, Form::Args, ArithOp::Div)?,
            Opcode::Lt => self.exec_compare(instr, Form::Args, CmpOp::Lt)?,
            Opcode::Gt => self.exec_compare(instr, Form::Args, CmpOp::Gt)?,
            Opcode::Eq => self.exec_compare(instr, Form::Args, CmpOp::Eq)?,
            Opcode::And => self.exec_logic(instr, Form::Args, LogicOp::And)?,
            Opcode::Or => self.exec_logic(instr, Form::Args, LogicOp::Or)?,
            Opcode::Not => self.exec_not(instr, Form::Args)?,
            Opcode::Int2Char => self.exec_int2char(instr, Form::Args)?,
            Opcode::Stri2Int => self.exec_stri2int(instr, Form::Args)?,
            Opcode::Int2Float => self.exec_int2float(instr, Form::Args)?,
            Opcode::Float2Int => self.exec_float2int(instr, Form::Args)?,

            // Input, output
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => self.exec_write(instr)?,

            // Strings
            Opcode::Concat => self.exec_concat(instr)?,
            Opcode::Strlen => self.exec_strlen(instr)?,
            Opcode::GetChar => self.exec_getchar(instr)?,
            Opcode::SetChar => self.exec_setchar(instr)?,

            // Types
            Opcode::Type => self.exec_type(instr)?,

            // Control flow
            Opcode::Label => {}
            Opcode::Jump => {
                let label = self.label(instr, 0)?;
                self.pc = self.resolve_label(label)?;
            }
            Opcode::JumpIfEq => self.exec_jump_if(instr, Form::Args, true)?,
            Opcode::JumpIfNeq => self.exec_jump_if(instr, Form::Args, false)?,
            Opcode::Exit => return self.exec_exit(instr).map(Some),

            // Debugging
            Opcode::DPrint => self.exec_dprint(instr)?,
            Opcode::Break => self.exec_break(instr)?,

            // Stack variants
            Opcode::AddS => self.exec_arith(instr, Form::Stack, ArithOp::Add)?,
            Opcode::SubS => self.exec_arith(instr, Form::Stack, ArithOp::Sub)?,
            Opcode::MulS => self.exec_arith(instr, Form::Stack, ArithOp::Mul)?,
            Opcode::IDivS => self.exec_arith(instr, Form::Stack, ArithOp::IDiv)?,
            Opcode::DivS => self.exec_arith(instr, Form::Stack, ArithOp::Div)?,
            Opcode::LtS => self.exec_compare(instr, Form::Stack, CmpOp::Lt)?,
            Opcode::GtS => self.exec_compare(instr, Form::Stack, CmpOp::Gt)?,
            Opcode::EqS => self.exec_compare(instr, Form::Stack, CmpOp::Eq)?,
            Opcode::AndS => self.exec_logic(instr, Form::Stack, LogicOp::And)?,
            Opcode::OrS => self.exec_logic(instr, Form::Stack, LogicOp::Or)?,
            Opcode::NotS => self.exec_not(instr, Form::Stack)?,
            Opcode::Int2CharS => self.exec_int2char(instr, Form::Stack)?,
            Opcode::Stri2IntS => self.exec_stri2int(instr, Form::Stack)?,
            Opcode::Int2FloatS => self.exec_int2float(instr, Form::Stack)?,
            Opcode::Float2IntS => self.exec_float2int(instr, Form::Stack)?,
            Opcode::JumpIfEqS => self.exec_jump_if(instr, Form::Stack, true)?,
            Opcode::JumpIfNeqS => self.exec_jump_if(instr, Form::Stack, false)?,
        }
        Ok(None)
    }

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        let value = self.symbol(instr, 1)?;
        self.write_var(var, value)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        let at = self.at();
        self.frames
            .declare(var)
            .map_err(|err| RuntimeError::from_frame(at, err))
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let label = self.label(instr, 0)?;
        let target = self.resolve_label(label)?;
        self.call_stack.push(self.pc);
        debug!(at = self.at(), label, depth = self.call_stack.len(), "call");
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        let resume = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::EmptyCallStack { at: self.at() })?;
        debug!(at = self.at(), resume = resume + 1, "return");
        self.pc = resume;
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        self.require_depth(instr.opcode, 1)?;
        let value = self.pop(instr.opcode)?;
        self.write_var(var, value)
    }

    fn exec_arith(&mut self, instr: &Instruction, form: Form, op: ArithOp) -> Result<(), RuntimeError> {
        let (a, b) = self.binary(instr, form, NUMERIC, NUMERIC)?;
        let result = ops::arithmetic(op, &a, &b)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, form, result)
    }

    fn exec_compare(&mut self, instr: &Instruction, form: Form, op: CmpOp) -> Result<(), RuntimeError> {
        let accepted = if op == CmpOp::Eq { ANY } else { ORDERED };
        let (a, b) = self.binary(instr, form, accepted, accepted)?;
        let result = ops::compare(op, &a, &b)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, form, Value::Bool(result))
    }

    fn exec_logic(&mut self, instr: &Instruction, form: Form, op: LogicOp) -> Result<(), RuntimeError> {
        let (a, b) = self.binary(instr, form, BOOL, BOOL)?;
        let result = ops::logic(op, &a, &b)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, form, Value::Bool(result))
    }

    fn exec_not(&mut self, instr: &Instruction, form: Form) -> Result<(), RuntimeError> {
        let value = self.unary(instr, form, BOOL)?;
        let result = !matches!(value, Value::Bool(true));
        self.store(instr, form, Value::Bool(result))
    }

    fn exec_int2char(&mut self, instr: &Instruction, form: Form) -> Result<(), RuntimeError> {
        let code = type_check::int(self.at(), instr.opcode, self.unary(instr, form, INT)?)?;
        let result = ops::int_to_char(code)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, form, Value::String(result))
    }

    fn exec_stri2int(&mut self, instr: &Instruction, form: Form) -> Result<(), RuntimeError> {
        let (s, index) = self.string_and_index(instr, form)?;
        let result = ops::stri_to_int(&s, index)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, form, Value::Int(result))
    }

    fn exec_int2float(&mut self, instr: &Instruction, form: Form) -> Result<(), RuntimeError> {
        let i = type_check::int(self.at(), instr.opcode, self.unary(instr, form, INT)?)?;
        self.store(instr, form, Value::Float(i as f64))
    }

    fn exec_float2int(&mut self, instr: &Instruction, form: Form) -> Result<(), RuntimeError> {
        let x = type_check::float(self.at(), instr.opcode, self.unary(instr, form, FLOAT)?)?;
        let result = ops::float_to_int(x)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, form, Value::Int(result))
    }

    /// The string and index operands of `STRI2INT` and `GETCHAR`.
    fn string_and_index(&mut self, instr: &Instruction, form: Form) -> Result<(String, i64), RuntimeError> {
        let (s, index) = self.binary(instr, form, STRING, INT)?;
        let (at, opcode) = (self.at(), instr.opcode);
        Ok((type_check::string(at, opcode, s)?, type_check::int(at, opcode, index)?))
    }

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        let tag = self.type_arg(instr, 1)?;
        let line = self.read_line()?;
        self.write_var(var, Value::parse_input(tag, line.as_deref()))
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 0)?;
        let written = write!(self.output, "{value}");
        written.map_err(|err| self.io_error(err))
    }

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (a, b) = self.binary(instr, Form::Args, STRING, STRING)?;
        let mut a = type_check::string(self.at(), instr.opcode, a)?;
        a.push_str(&type_check::string(self.at(), instr.opcode, b)?);
        self.store(instr, Form::Args, Value::String(a))
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = type_check::string(self.at(), instr.opcode, self.unary(instr, Form::Args, STRING)?)?;
        let length = s.chars().count() as i64;
        self.store(instr, Form::Args, Value::Int(length))
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (s, index) = self.string_and_index(instr, Form::Args)?;
        let result = ops::get_char(&s, index)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.store(instr, Form::Args, Value::String(result))
    }

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        let (at, opcode) = (self.at(), instr.opcode);
        let s = type_check::string(at, opcode, self.read_var(var)?)?;
        let index = type_check::int(at, opcode, self.operand(instr, 1, INT)?)?;
        let replacement = type_check::string(at, opcode, self.operand(instr, 2, STRING)?)?;
        let result = ops::set_char(&s, index, &replacement)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        self.write_var(var, Value::String(result))
    }

    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var(instr, 0)?;
        let name = match self.arg(instr, 1)? {
            Arg::Var(source) => {
                let slot = self
                    .frames
                    .slot(source)
                    .map_err(|err| RuntimeError::from_frame(self.at(), err))?;
                slot.map_or("", |value| value.type_tag().name())
            }
            _ => self.symbol(instr, 1)?.type_tag().name(),
        };
        self.write_var(var, Value::String(name.to_string()))
    }

    fn exec_jump_if(&mut self, instr: &Instruction, form: Form, when_equal: bool) -> Result<(), RuntimeError> {
        let label = self.label(instr, 0)?;
        let target = self.resolve_label(label)?;
        let (a, b) = self.binary(instr, form, ANY, ANY)?;
        let equal = ops::compare(CmpOp::Eq, &a, &b)
            .map_err(|err| RuntimeError::from_op(self.at(), instr.opcode, err))?;
        if equal == when_equal {
            self.pc = target;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Halt, RuntimeError> {
        let code = type_check::int(self.at(), instr.opcode, self.operand(instr, 0, INT)?)?;
        match u8::try_from(code) {
            Ok(code) if code <= 49 => {
                debug!(at = self.at(), code, "exit");
                Ok(Halt::Exit(code))
            }
            _ => Err(RuntimeError::InvalidExitCode { at: self.at(), code }),
        }
    }

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 0)?;
        let written = writeln!(self.diagnostics, "{value}");
        written.map_err(|err| self.io_error(err))
    }

    /// Dump the machine state to the diagnostics sink.
    fn exec_break(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let mut dump = format!(
            "BREAK at instruction {} (order {}), {} executed\n",
            self.at(),
            instr.order,
            self.executed
        );
        let stack: Vec<String> = self.stack.iter().map(Value::typed).collect();
        let calls: Vec<String> = self.call_stack.iter().map(|pos| pos.to_string()).collect();
        dump.push_str(&format!("operand stack: [{}]\n", stack.join(", ")));
        dump.push_str(&format!("call stack: [{}]\n", calls.join(", ")));
        dump.push_str(&format!("GF: {}\n", self.frames.global()));
        match self.frames.temporary() {
            Some(frame) => dump.push_str(&format!("TF: {frame}\n")),
            None => dump.push_str("TF: (undefined)\n"),
        }
        if self.frames.locals().is_empty() {
            dump.push_str("LF: (undefined)\n");
        }
        for (depth, frame) in self.frames.locals().iter().enumerate().rev() {
            dump.push_str(&format!("LF[{depth}]: {frame}\n"));
        }
        let written = self.diagnostics.write_all(dump.as_bytes());
        written.map_err(|err| self.io_error(err))
    }
}
