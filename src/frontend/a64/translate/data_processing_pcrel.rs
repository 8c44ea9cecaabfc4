use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::RegisterSize;

impl<'a> TranslatorVisitor<'a> {
    /// ADR - Form PC-relative address. `imm` is the sign-extended byte offset.
    pub fn adr(&mut self, op: &OpCode64) -> EmitResult {
        let result = op.address.wrapping_add(op.imm);
        self.ctx.emit_ldc_i8(result);
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
        Ok(())
    }

    /// ADRP - Form PC-relative address to 4KB page. `imm` is already scaled by 4096.
    pub fn adrp(&mut self, op: &OpCode64) -> EmitResult {
        let base = op.address & !0xFFF;
        self.ctx.emit_ldc_i8(base.wrapping_add(op.imm));
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
        Ok(())
    }
}
