use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::opcode::Op;

impl<'a> TranslatorVisitor<'a> {
    // --- Logical immediate ---

    /// AND/ORR/EOR with the decoded bitmask in `wmask`. Only ANDS sets flags,
    /// and the non-flag forms may write SP.
    pub fn logical_imm(&mut self, op: &OpCode64, logic: Op, set_flags: bool) -> EmitResult {
        let size = op.reg_size;
        self.ctx.emit_ld_intzr(op.rn, size);
        self.ctx.emit_ldc_i(op.wmask, size);
        self.ctx.emit(logic);

        if set_flags {
            let res = self.ctx.store_local();
            self.emit_logical_flags(res, size);
            self.ctx.emit(Op::LdLoc(res));
            self.ctx.emit_st_intzr(op.rd, size);
        } else {
            self.ctx.emit_st_intsp(op.rd, size);
        }
        Ok(())
    }

    // --- Logical shifted register ---

    /// `invert` gives BIC/ORN/EON.
    pub fn logical_shift(&mut self, op: &OpCode64, logic: Op, invert: bool, set_flags: bool) -> EmitResult {
        let size = op.reg_size;
        self.ctx.emit_ld_intzr(op.rn, size);
        self.emit_shifted_operand(op);
        if invert {
            self.ctx.emit(Op::Not);
        }
        self.ctx.emit(logic);

        if set_flags {
            let res = self.ctx.store_local();
            self.emit_logical_flags(res, size);
            self.ctx.emit(Op::LdLoc(res));
        }
        self.ctx.emit_st_intzr(op.rd, size);
        Ok(())
    }
}
