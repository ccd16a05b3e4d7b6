//! Execution statistics: executed-instruction count, hottest instruction and
//! peak number of declared variables.

use ippvm_common::{Instruction, Opcode};
use std::collections::HashMap;
use std::str::FromStr;

/// One selectable counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// Executed instructions, excluding `LABEL`, `DPRINT` and `BREAK`.
    Insts,
    /// Declared order of the hottest instruction, bookkeeping excluded.
    Hot,
    /// Peak number of declared variables.
    Vars,
}

impl FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insts" => Ok(StatKind::Insts),
            "hot" => Ok(StatKind::Hot),
            "vars" => Ok(StatKind::Vars),
            other => Err(format!("unknown statistic '{other}'")),
        }
    }
}

/// Counters updated after every executed instruction.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    insts: u64,
    hits: HashMap<(Opcode, u32), u64>,
    vars: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one executed instruction; `live_vars` is the number of
    /// declared variables after it ran.
    pub fn record(&mut self, instr: &Instruction, live_vars: usize) {
        if !instr.opcode.is_bookkeeping() {
            self.insts += 1;
            *self.hits.entry((instr.opcode, instr.order)).or_insert(0) += 1;
        }
        self.vars = self.vars.max(live_vars);
    }

    pub fn insts(&self) -> u64 {
        self.insts
    }

    /// Lowest declared order among the instructions of the opcode with the
    /// most hits. `LABEL`, `DPRINT` and `BREAK` never count. Ties between
    /// opcodes go to the one whose first instruction comes earliest. `0` when
    /// nothing counted ran.
    pub fn hot(&self) -> u32 {
        let mut per_opcode: HashMap<Opcode, (u64, u32)> = HashMap::new();
        for (&(opcode, order), &count) in &self.hits {
            let entry = per_opcode.entry(opcode).or_insert((0, u32::MAX));
            entry.0 += count;
            entry.1 = entry.1.min(order);
        }
        per_opcode
            .into_values()
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
            .map_or(0, |(_, order)| order)
    }

    pub fn vars(&self) -> usize {
        self.vars
    }

    /// The selected counters, one per line, in the given order.
    pub fn report(&self, selection: &[StatKind]) -> String {
        let mut out = String::new();
        for kind in selection {
            let line = match kind {
                StatKind::Insts => self.insts.to_string(),
                StatKind::Hot => self.hot().to_string(),
                StatKind::Vars => self.vars.to_string(),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
