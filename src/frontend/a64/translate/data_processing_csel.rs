use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::opcode::Op;

/// What the conditional-select family does to Rm when the condition fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    /// CSEL
    Plain,
    /// CSINC
    Increment,
    /// CSINV
    Invert,
    /// CSNEG
    Negate,
}

impl<'a> TranslatorVisitor<'a> {
    /// Rd = cond ? Rn : f(Rm). Each arm stores Rd itself.
    pub fn csel(&mut self, op: &OpCode64, kind: SelectKind) -> EmitResult {
        let size = op.reg_size;
        let take_rn = self.ctx.define_label();
        let end = self.ctx.define_label();

        self.ctx.emit_cond_branch(op.cond, take_rn);

        self.ctx.emit_ld_intzr(op.rm, size);
        match kind {
            SelectKind::Plain => {}
            SelectKind::Increment => {
                self.ctx.emit_ldc_i(1, size);
                self.ctx.emit(Op::Add);
            }
            SelectKind::Invert => self.ctx.emit(Op::Not),
            SelectKind::Negate => self.ctx.emit(Op::Neg),
        }
        self.ctx.emit_st_intzr(op.rd, size);
        self.ctx.emit(Op::Br(end));

        self.ctx.mark_label(take_rn);
        self.ctx.emit_ld_intzr(op.rn, size);
        self.ctx.emit_st_intzr(op.rd, size);

        self.ctx.mark_label(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::exec::CpuState;
    use crate::flags::Nzcv;
    use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
    use crate::frontend::a64::translate::testing::run;
    use crate::ir::cond::Cond;

    fn select(mnemonic: Mnemonic, cond: Cond, flags: Nzcv) -> u64 {
        let mut state = CpuState::new();
        state.flags = flags;
        state.x[1] = 10;
        state.x[2] = 20;
        run(&[OpCode64::new(mnemonic, 0).x().regs(0, 1, 2).cond(cond)], &mut state);
        state.x[0]
    }

    #[test]
    fn test_select_family() {
        let zero = Nzcv::new(false, true, false, false);
        assert_eq!(select(Mnemonic::CSEL, Cond::EQ, zero), 10);
        assert_eq!(select(Mnemonic::CSEL, Cond::NE, zero), 20);
        assert_eq!(select(Mnemonic::CSINC, Cond::NE, zero), 21);
        assert_eq!(select(Mnemonic::CSINV, Cond::NE, zero), !20);
        assert_eq!(select(Mnemonic::CSNEG, Cond::NE, zero), (-20i64) as u64);
        assert_eq!(select(Mnemonic::CSNEG, Cond::AL, zero), 10);
    }

    #[test]
    fn test_cset_from_zero_registers() {
        // CSET W0, GT is CSINC W0, WZR, WZR, LE
        let mut state = CpuState::new();
        state.x[0] = u64::MAX;
        state.flags = Nzcv::new(false, false, true, false);
        run(&[OpCode64::new(Mnemonic::CSINC, 0).w().regs(0, 31, 31).cond(Cond::LE)], &mut state);
        assert_eq!(state.x[0], 1);
    }
}
