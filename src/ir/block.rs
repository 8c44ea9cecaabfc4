use std::fmt;

use crate::ir::opcode::{Label, Op};

/// A finished translation unit: straight-line bytecode with resolved-at-run-time
/// labels. Every path ends in `Ret`, which hands the next guest PC back.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Guest address of the first instruction.
    pub entry: u64,
    pub ops: Vec<Op>,
    pub label_count: u32,
    pub local_count: u32,
}

impl Function {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Position of each `MarkLabel`, indexed by label number.
    pub fn label_positions(&self) -> Vec<Option<usize>> {
        let mut positions = vec![None; self.label_count as usize];
        for (pc, op) in self.ops.iter().enumerate() {
            if let Op::MarkLabel(Label(l)) = op {
                if let Some(slot) = positions.get_mut(*l as usize) {
                    *slot = Some(pc);
                }
            }
        }
        positions
    }

    pub fn count_ops(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function @ {:#x} ({} locals):", self.entry, self.local_count)?;
        for op in &self.ops {
            match op {
                Op::MarkLabel(_) => writeln!(f, "{}", op)?,
                _ => writeln!(f, "    {}", op)?,
            }
        }
        Ok(())
    }
}
