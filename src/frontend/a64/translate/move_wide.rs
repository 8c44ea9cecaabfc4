use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::opcode::Op;

fn check_hw(op: &OpCode64) -> u32 {
    let pos = op.shift as u32;
    if pos % 16 != 0 || pos >= op.datasize() {
        panic!("Invalid move wide shift {}", pos);
    }
    pos
}

impl<'a> TranslatorVisitor<'a> {
    /// MOVZ - Move wide with zero
    pub fn movz(&mut self, op: &OpCode64) -> EmitResult {
        let pos = check_hw(op);
        self.ctx.emit_ldc_i((op.imm & 0xFFFF) << pos, op.reg_size);
        self.ctx.emit_st_intzr(op.rd, op.reg_size);
        Ok(())
    }

    /// MOVN - Move wide with NOT
    pub fn movn(&mut self, op: &OpCode64) -> EmitResult {
        let pos = check_hw(op);
        self.ctx.emit_ldc_i(!((op.imm & 0xFFFF) << pos), op.reg_size);
        self.ctx.emit_st_intzr(op.rd, op.reg_size);
        Ok(())
    }

    /// MOVK - Move wide with keep
    pub fn movk(&mut self, op: &OpCode64) -> EmitResult {
        let pos = check_hw(op);
        let size = op.reg_size;
        self.ctx.emit_ld_intzr(op.rd, size);
        self.ctx.emit_ldc_i(!(0xFFFFu64 << pos), size);
        self.ctx.emit(Op::And);
        self.ctx.emit_ldc_i((op.imm & 0xFFFF) << pos, size);
        self.ctx.emit(Op::Or);
        self.ctx.emit_st_intzr(op.rd, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::exec::CpuState;
    use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
    use crate::frontend::a64::translate::testing::run;

    #[test]
    fn test_mov_wide_builds_constant() {
        let mut state = CpuState::new();
        let ops = [
            OpCode64::new(Mnemonic::MOVZ, 0).x().rd(0).imm(0x1234).shift_amount(48),
            OpCode64::new(Mnemonic::MOVK, 4).x().rd(0).imm(0x5678).shift_amount(16),
            OpCode64::new(Mnemonic::MOVK, 8).x().rd(0).imm(0x9ABC),
        ];
        run(&ops, &mut state);
        assert_eq!(state.x[0], 0x1234_0000_5678_9ABC);
    }

    #[test]
    fn test_movn_32bit_zero_extends() {
        let mut state = CpuState::new();
        state.x[0] = u64::MAX;
        let ops = [
            OpCode64::new(Mnemonic::MOVN, 0).w().rd(0).imm(0x1).shift_amount(16),
            OpCode64::new(Mnemonic::MOVN, 4).x().rd(1).imm(0),
        ];
        run(&ops, &mut state);
        assert_eq!(state.x[0], 0xFFFE_FFFF);
        assert_eq!(state.x[1], u64::MAX);
    }

    #[test]
    #[should_panic(expected = "Invalid move wide shift")]
    fn test_movz_32bit_rejects_high_halves() {
        let mut state = CpuState::new();
        run(&[OpCode64::new(Mnemonic::MOVZ, 0).w().rd(0).imm(1).shift_amount(32)], &mut state);
    }
}
