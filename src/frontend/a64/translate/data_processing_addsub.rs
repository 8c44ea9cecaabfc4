use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::{RegisterSize, ShiftType};
use crate::ir::opcode::{Flag, Op};

impl<'a> TranslatorVisitor<'a> {
    // --- ADD/SUB immediate ---

    pub fn add_sub_imm(&mut self, op: &OpCode64, sub: bool, set_flags: bool) -> EmitResult {
        if op.shift != 0 && op.shift != 12 {
            panic!("Invalid ADD/SUB immediate shift {}", op.shift);
        }
        self.ctx.emit_ld_intsp(op.rn, op.reg_size);
        self.ctx.emit_ldc_i(op.imm << op.shift, op.reg_size);
        self.emit_add_sub(op, sub, set_flags, true);
        Ok(())
    }

    // --- ADD/SUB shifted register ---

    pub fn add_sub_shift(&mut self, op: &OpCode64, sub: bool, set_flags: bool) -> EmitResult {
        if op.shift_type == ShiftType::ROR {
            panic!("Invalid ADD/SUB shift type {:?}", op.shift_type);
        }
        self.ctx.emit_ld_intzr(op.rn, op.reg_size);
        self.emit_shifted_operand(op);
        self.emit_add_sub(op, sub, set_flags, false);
        Ok(())
    }

    // --- ADD/SUB extended register ---

    pub fn add_sub_ext(&mut self, op: &OpCode64, sub: bool, set_flags: bool) -> EmitResult {
        if op.shift > 4 {
            panic!("Invalid extended register shift {}", op.shift);
        }
        self.ctx.emit_ld_intsp(op.rn, op.reg_size);
        self.emit_extended_operand(op);
        self.emit_add_sub(op, sub, set_flags, true);
        Ok(())
    }

    /// `[op1, op2] ->` Rd. Flag-setting forms always write ZR-style Rd.
    fn emit_add_sub(&mut self, op: &OpCode64, sub: bool, set_flags: bool, rd_is_sp: bool) {
        let size = op.reg_size;
        if !set_flags {
            self.ctx.emit(if sub { Op::Sub } else { Op::Add });
            if rd_is_sp {
                self.ctx.emit_st_intsp(op.rd, size);
            } else {
                self.ctx.emit_st_intzr(op.rd, size);
            }
            return;
        }

        let op2 = self.ctx.store_local();
        let op1 = self.ctx.store_local();
        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(op2));
        self.ctx.emit(if sub { Op::Sub } else { Op::Add });
        let res = self.ctx.store_local();

        if sub {
            self.emit_sub_flags(op1, op2, res, size);
        } else {
            self.emit_add_flags(op1, op2, res, size, None);
        }

        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit_st_intzr(op.rd, size);
    }

    // --- ADC/SBC ---

    /// SBC is ADC of the inverted second operand.
    pub fn adc_sbc(&mut self, op: &OpCode64, sub: bool, set_flags: bool) -> EmitResult {
        let size = op.reg_size;

        self.ctx.emit_ld_intzr(op.rn, size);
        let op1 = self.ctx.store_local();
        self.ctx.emit_ld_intzr(op.rm, size);
        if sub {
            self.ctx.emit(Op::Not);
        }
        let op2 = self.ctx.store_local();
        self.ctx.emit_ld_flag(Flag::C);
        let carry = self.ctx.store_local();

        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(op2));
        self.ctx.emit(Op::Add);
        self.ctx.emit(Op::LdLoc(carry));
        if size == RegisterSize::Int64 {
            self.ctx.emit(Op::ConvU8);
        }
        self.ctx.emit(Op::Add);

        if set_flags {
            let res = self.ctx.store_local();
            self.emit_add_flags(op1, op2, res, size, Some(carry));
            self.ctx.emit(Op::LdLoc(res));
        }
        self.ctx.emit_st_intzr(op.rd, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::exec::CpuState;
    use crate::flags::{self, Nzcv};
    use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
    use crate::frontend::a64::translate::testing::run;

    #[test]
    fn test_adds_imm_32bit_overflow() {
        let mut state = CpuState::new();
        state.x[1] = 0x7FFF_FFFF;
        let op = OpCode64::new(Mnemonic::ADDS_imm, 0).w().regs(0, 1, 0).imm(1);
        run(&[op], &mut state);
        assert_eq!(state.x[0], 0x8000_0000);
        assert_eq!(state.flags, Nzcv::new(true, false, false, true));
    }

    #[test]
    fn test_sub_imm_uses_sp() {
        let mut state = CpuState::new();
        state.sp = 0x1000;
        let op = OpCode64::new(Mnemonic::SUB_imm, 0).x().regs(31, 31, 0).imm(1).shift_amount(12);
        run(&[op], &mut state);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_subs_matches_reference() {
        let cases = [(5u64, 5u64), (3, 5), (5, 3), (0x8000_0000_0000_0000, 1), (0, 0x8000_0000_0000_0000)];
        for (a, b) in cases {
            let mut state = CpuState::new();
            state.x[1] = a;
            state.x[2] = b;
            let op = OpCode64::new(Mnemonic::SUBS_shift, 0).x().regs(0, 1, 2);
            run(&[op], &mut state);
            let (res, nzcv) = flags::sub(a, b, 64);
            assert_eq!(state.x[0], res, "{:#x} - {:#x}", a, b);
            assert_eq!(state.flags, nzcv, "{:#x} - {:#x}", a, b);
        }
    }

    #[test]
    fn test_cmp_writes_only_flags() {
        let mut state = CpuState::new();
        state.x[1] = 7;
        let op = OpCode64::new(Mnemonic::SUBS_imm, 0).w().regs(31, 1, 0).imm(7);
        run(&[op], &mut state);
        assert_eq!(state.flags, Nzcv::new(false, true, true, false));
        assert_eq!(state.sp, CpuState::new().sp);
    }

    #[test]
    fn test_adc_sbc_use_carry() {
        for carry in [false, true] {
            for (a, b) in [(u64::MAX, 0u64), (u64::MAX, u64::MAX), (1, 2), (0x7FFF_FFFF_FFFF_FFFF, 0)] {
                let mut state = CpuState::new();
                state.x[1] = a;
                state.x[2] = b;
                state.flags.c = carry;
                run(&[OpCode64::new(Mnemonic::ADCS, 0).x().regs(0, 1, 2)], &mut state);
                let (res, nzcv) = flags::add_with_carry(a, b, carry, 64);
                assert_eq!((state.x[0], state.flags), (res, nzcv));

                let mut state = CpuState::new();
                state.x[1] = a;
                state.x[2] = b;
                state.flags.c = carry;
                run(&[OpCode64::new(Mnemonic::SBCS, 0).w().regs(0, 1, 2)], &mut state);
                let (res, nzcv) = flags::sub_with_borrow(a & 0xFFFF_FFFF, b & 0xFFFF_FFFF, carry, 32);
                assert_eq!((state.x[0], state.flags), (res, nzcv));
            }
        }
    }
}
