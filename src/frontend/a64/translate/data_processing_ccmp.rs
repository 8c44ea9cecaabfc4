use crate::error::EmitResult;
use crate::flags::Nzcv;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::opcode::Op;

impl<'a> TranslatorVisitor<'a> {
    /// CCMP/CCMN: compare when the condition holds, otherwise load `nzcv`.
    /// The immediate forms take the 5-bit comparand in `imm`.
    pub fn ccmp(&mut self, op: &OpCode64, negate: bool, imm: bool) -> EmitResult {
        let size = op.reg_size;
        let fail = self.ctx.define_label();
        let end = self.ctx.define_label();

        self.ctx.emit_cond_check(op.cond);
        self.ctx.emit(Op::BrFalse(fail));

        self.ctx.emit_ld_intzr(op.rn, size);
        let op1 = self.ctx.store_local();
        if imm {
            self.ctx.emit_ldc_i(op.imm & 0x1F, size);
        } else {
            self.ctx.emit_ld_intzr(op.rm, size);
        }
        let op2 = self.ctx.store_local();

        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(op2));
        self.ctx.emit(if negate { Op::Add } else { Op::Sub });
        let res = self.ctx.store_local();
        if negate {
            self.emit_add_flags(op1, op2, res, size, None);
        } else {
            self.emit_sub_flags(op1, op2, res, size);
        }
        self.ctx.emit(Op::Br(end));

        self.ctx.mark_label(fail);
        self.ctx.emit_set_nzcv(Nzcv::from_imm4(op.nzcv as u32));

        self.ctx.mark_label(end);
        Ok(())
    }
}
