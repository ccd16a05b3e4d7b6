//! Frame and variable storage: the global frame, the local frame stack and
//! the optional temporary frame.
//!
//! A slot holding `None` is a declared but uninitialized variable. Reads go
//! through [`Frames::read`], which rejects such slots; `TYPE` uses
//! [`Frames::slot`] to observe them without failing.

use ippvm_common::{FrameKind, Value, VarRef};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failures of frame and variable operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The targeted local or temporary frame does not exist.
    #[error("frame {0} does not exist")]
    MissingFrame(FrameKind),

    /// The variable was never declared.
    #[error("variable {0} is not defined")]
    Undefined(VarRef),

    /// The variable is already declared in the frame.
    #[error("variable {0} is already defined")]
    Redefined(VarRef),

    /// The variable is declared but holds no value yet.
    #[error("variable {0} is not initialized")]
    Uninitialized(VarRef),
}

/// A single variable scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    vars: BTreeMap<String, Option<Value>>,
}

impl Frame {
    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no variables are declared.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(name, slot)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.vars.iter().map(|(name, slot)| (name.as_str(), slot.as_ref()))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            return f.write_str("(empty)");
        }
        let mut first = true;
        for (name, slot) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match slot {
                Some(value) => write!(f, "{name}={}", value.typed())?,
                None => write!(f, "{name}=<uninitialized>")?,
            }
        }
        Ok(())
    }
}

/// All frames of a running program.
#[derive(Debug, Clone, Default)]
pub struct Frames {
    global: Frame,
    locals: Vec<Frame>,
    temporary: Option<Frame>,
}

impl Frames {
    /// Empty global frame, no local or temporary frames.
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self.locals.last().ok_or(FrameError::MissingFrame(kind)),
            FrameKind::Temporary => self.temporary.as_ref().ok_or(FrameError::MissingFrame(kind)),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self.locals.last_mut().ok_or(FrameError::MissingFrame(kind)),
            FrameKind::Temporary => self.temporary.as_mut().ok_or(FrameError::MissingFrame(kind)),
        }
    }

    /// Declare `var` as uninitialized.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        let frame = self.frame_mut(var.frame)?;
        if frame.vars.contains_key(&var.name) {
            return Err(FrameError::Redefined(var.clone()));
        }
        frame.vars.insert(var.name.clone(), None);
        Ok(())
    }

    /// The slot of `var`: `None` when declared but uninitialized.
    pub fn slot(&self, var: &VarRef) -> Result<Option<&Value>, FrameError> {
        self.frame(var.frame)?
            .vars
            .get(&var.name)
            .map(Option::as_ref)
            .ok_or_else(|| FrameError::Undefined(var.clone()))
    }

    /// The value of an initialized variable.
    pub fn read(&self, var: &VarRef) -> Result<&Value, FrameError> {
        self.slot(var)?
            .ok_or_else(|| FrameError::Uninitialized(var.clone()))
    }

    /// Assign to a declared variable. Never declares.
    pub fn write(&mut self, var: &VarRef, value: Value) -> Result<(), FrameError> {
        let slot = self
            .frame_mut(var.frame)?
            .vars
            .get_mut(&var.name)
            .ok_or_else(|| FrameError::Undefined(var.clone()))?;
        *slot = Some(value);
        Ok(())
    }

    /// `CREATEFRAME`: a fresh temporary frame, discarding any previous one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::default());
    }

    /// `PUSHFRAME`: the temporary frame becomes the innermost local frame.
    pub fn push_local(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::MissingFrame(FrameKind::Temporary))?;
        self.locals.push(frame);
        Ok(())
    }

    /// `POPFRAME`: the innermost local frame replaces the temporary frame.
    pub fn pop_local(&mut self) -> Result<(), FrameError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FrameError::MissingFrame(FrameKind::Local))?;
        self.temporary = Some(frame);
        Ok(())
    }

    /// Declared variables across global, temporary and all local frames.
    pub fn live_count(&self) -> usize {
        self.global.len()
            + self.temporary.as_ref().map_or(0, Frame::len)
            + self.locals.iter().map(Frame::len).sum::<usize>()
    }

    /// The global frame.
    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The temporary frame, if staged.
    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Local frames, outermost first.
    pub fn locals(&self) -> &[Frame] {
        &self.locals
    }
}
