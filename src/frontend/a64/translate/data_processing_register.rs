use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::RegisterSize;
use crate::ir::helper::Helper;

impl<'a> TranslatorVisitor<'a> {
    // --- Bit counting ---

    /// CLZ - Count Leading Zeros
    pub fn clz(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_count(op, Helper::CountLeadingZeros(op.datasize() as u8));
        Ok(())
    }

    /// CLS - Count Leading Sign bits
    pub fn cls(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_count(op, Helper::CountLeadingSigns(op.datasize() as u8));
        Ok(())
    }

    fn emit_count(&mut self, op: &OpCode64, helper: Helper) {
        // The helpers take the full register and look at the low datasize bits.
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        self.ctx.emit_call(helper);
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
    }

    // --- Reversal ---

    /// RBIT - Reverse Bits
    pub fn rbit(&mut self, op: &OpCode64) -> EmitResult {
        let helper = match op.reg_size {
            RegisterSize::Int32 => Helper::ReverseBits32,
            _ => Helper::ReverseBits64,
        };
        self.emit_reverse(op, helper);
        Ok(())
    }

    /// REV16 - Reverse bytes in each halfword
    pub fn rev16(&mut self, op: &OpCode64) -> EmitResult {
        let helper = match op.reg_size {
            RegisterSize::Int32 => Helper::ReverseBytes16_32,
            _ => Helper::ReverseBytes16_64,
        };
        self.emit_reverse(op, helper);
        Ok(())
    }

    /// REV32 - Reverse bytes in each word; the W form is plain REV.
    pub fn rev32(&mut self, op: &OpCode64) -> EmitResult {
        let helper = match op.reg_size {
            RegisterSize::Int32 => Helper::ReverseBytes32_32,
            _ => Helper::ReverseBytes32_64,
        };
        self.emit_reverse(op, helper);
        Ok(())
    }

    /// REV64 - Reverse all eight bytes
    pub fn rev64(&mut self, op: &OpCode64) -> EmitResult {
        if op.reg_size != RegisterSize::Int64 {
            panic!("Invalid REV64 register size {}", op.reg_size);
        }
        self.emit_reverse(op, Helper::ReverseBytes64);
        Ok(())
    }

    fn emit_reverse(&mut self, op: &OpCode64, helper: Helper) {
        self.ctx.emit_ld_intzr(op.rn, op.reg_size);
        self.ctx.emit_call(helper);
        self.ctx.emit_st_intzr(op.rd, op.reg_size);
    }
}
