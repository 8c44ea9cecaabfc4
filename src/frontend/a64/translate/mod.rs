mod helpers;
mod visitor;
mod data_processing_addsub;
mod data_processing_logical;
mod data_processing_bitfield;
mod data_processing_shift;
mod data_processing_csel;
mod data_processing_pcrel;
mod data_processing_multiply;
mod data_processing_register;
mod data_processing_ccmp;
mod data_processing_crc32;
mod move_wide;
mod branch;
mod exception;
mod system;
mod simd_helpers;
mod simd_arithmetic;
mod simd_compare;
mod simd_cvt;
mod simd_move;
mod simd_shift;
mod simd_crypto;

pub use data_processing_bitfield::{BitfieldKind, BitfieldStrategy};
pub use data_processing_csel::SelectKind;
pub use simd_shift::RightShift;
pub use visitor::TranslatorVisitor;

use log::{debug, trace};

use crate::config::EmitterConfig;
use crate::error::EmitError;
use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
use crate::ir::block::Function;
use crate::ir::emitter::EmitterContext;

/// True when `mnemonic` never falls through to the next instruction.
fn ends_block(mnemonic: Mnemonic) -> bool {
    use Mnemonic::*;
    matches!(mnemonic, B | BL | BR | BLR | RET | SVC | BRK | UND)
}

/// Translate a unit of basic blocks into one function.
///
/// Every block start gets a label first, so branches between blocks of the
/// unit become direct jumps. A block whose last instruction can fall through
/// continues at the following address. The first error aborts the unit.
pub fn translate_unit(config: &EmitterConfig, blocks: &[Vec<OpCode64>]) -> Result<Function, EmitError> {
    let entry = blocks
        .iter()
        .find_map(|block| block.first())
        .map_or(0, |op| op.address);
    let mut ctx = EmitterContext::new(entry);

    let mut labels = Vec::with_capacity(blocks.len());
    for block in blocks {
        labels.push(block.first().map(|op| ctx.register_block(op.address)));
    }

    let mut visitor = TranslatorVisitor::new(&mut ctx, config);
    let mut count = 0usize;
    for (block, label) in blocks.iter().zip(labels) {
        let (Some(label), Some(last)) = (label, block.last()) else {
            continue;
        };
        visitor.ctx.mark_label(label);
        for op in block {
            trace!("{:#x}: {:?}", op.address, op.mnemonic);
            visitor.dispatch(op)?;
            count += 1;
        }
        if !ends_block(last.mnemonic) {
            visitor.ctx.emit_goto(last.next_address());
        }
    }

    let func = ctx.finish();
    debug!(
        "translated {} instructions in {} blocks at {:#x} into {} ops ({})",
        count,
        blocks.len(),
        entry,
        func.len(),
        config.backend().name()
    );
    Ok(func)
}

/// Translate a single basic block.
pub fn translate_block(config: &EmitterConfig, ops: &[OpCode64]) -> Result<Function, EmitError> {
    translate_unit(config, &[ops.to_vec()])
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::OnceLock;

    use crate::config::EmitterConfig;
    use crate::exec::{CpuState, Interpreter};
    use crate::frontend::a64::opcode::OpCode64;

    /// Translate `ops` as one block with the scalar backend, run it and
    /// return the next guest address.
    pub fn run(ops: &[OpCode64], state: &mut CpuState) -> u64 {
        static SCALAR: OnceLock<EmitterConfig> = OnceLock::new();
        run_with(SCALAR.get_or_init(EmitterConfig::scalar), ops, state)
    }

    pub fn run_with(config: &EmitterConfig, ops: &[OpCode64], state: &mut CpuState) -> u64 {
        let func = super::translate_block(config, ops).unwrap();
        Interpreter::new(config).run(&func, state).unwrap()
    }
}
