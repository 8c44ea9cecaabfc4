use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::RegisterSize;
use crate::ir::opcode::{Op, StateCall};

/// Link register.
const REG_LR: u8 = 30;

impl<'a> TranslatorVisitor<'a> {
    /// Branch target of the immediate forms; `imm` is the signed byte offset.
    fn branch_target(op: &OpCode64) -> u64 {
        op.address.wrapping_add(op.imm)
    }

    /// Jump to `target` when the `I32`/`I64` on the stack is non-zero (or
    /// zero with `on_zero`), otherwise fall through.
    fn emit_branch_if(&mut self, on_zero: bool, target: u64) {
        let skip = self.ctx.define_label();
        self.ctx.emit(if on_zero { Op::BrTrue(skip) } else { Op::BrFalse(skip) });
        self.ctx.emit_goto(target);
        self.ctx.mark_label(skip);
    }

    fn emit_link(&mut self, op: &OpCode64) {
        self.ctx.emit_ldc_i8(op.next_address());
        self.ctx.emit_st_intzr(REG_LR, RegisterSize::Int64);
    }

    /// B - Unconditional branch
    pub fn b(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_goto(Self::branch_target(op));
        Ok(())
    }

    /// B.cond - Conditional branch
    pub fn b_cond(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_cond_check(op.cond);
        self.emit_branch_if(false, Self::branch_target(op));
        Ok(())
    }

    /// BL - Branch with link
    pub fn bl(&mut self, op: &OpCode64) -> EmitResult {
        let target = Self::branch_target(op);
        self.emit_link(op);
        if self.config.options().track_call_stack {
            self.ctx.emit_ldc_i8(target);
            self.ctx.emit_state_call(StateCall::EnterFunction);
        }
        self.ctx.emit_goto(target);
        Ok(())
    }

    /// BR - Branch to register
    pub fn br(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        self.ctx.emit(Op::Ret);
        Ok(())
    }

    /// BLR - Branch with link to register. Rn is read before LR is written.
    pub fn blr(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        let target = self.ctx.store_local();
        self.emit_link(op);
        if self.config.options().track_call_stack {
            self.ctx.emit(Op::LdLoc(target));
            self.ctx.emit_state_call(StateCall::EnterFunction);
        }
        self.ctx.emit(Op::LdLoc(target));
        self.ctx.emit(Op::Ret);
        Ok(())
    }

    /// RET - Return from subroutine
    pub fn ret(&mut self, op: &OpCode64) -> EmitResult {
        if self.config.options().track_call_stack {
            self.ctx.emit_state_call(StateCall::ExitFunction);
        }
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        self.ctx.emit(Op::Ret);
        Ok(())
    }

    /// CBZ/CBNZ - Compare and branch on (non-)zero. Rt is in `rd`.
    pub fn cbz(&mut self, op: &OpCode64, not_zero: bool) -> EmitResult {
        self.ctx.emit_ld_intzr(op.rd, op.reg_size);
        self.emit_branch_if(!not_zero, Self::branch_target(op));
        Ok(())
    }

    /// TBZ/TBNZ - Test bit `index` of Rt and branch.
    pub fn tbz(&mut self, op: &OpCode64, not_zero: bool) -> EmitResult {
        if op.index > 63 {
            panic!("Invalid test bit {}", op.index);
        }
        self.ctx.emit_ld_intzr(op.rd, RegisterSize::Int64);
        self.ctx.emit_ldc_i4(op.index as u32);
        self.ctx.emit(Op::ShrUn);
        self.ctx.emit_ldc_i8(1);
        self.ctx.emit(Op::And);
        self.emit_branch_if(!not_zero, Self::branch_target(op));
        Ok(())
    }
}
