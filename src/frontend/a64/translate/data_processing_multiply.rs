use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::RegisterSize;
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;

impl<'a> TranslatorVisitor<'a> {
    // --- Divide ---

    /// SDIV/UDIV. Division by zero gives 0 and `MIN / -1` gives `MIN`; both
    /// are branched around so the divide itself never traps.
    pub fn div(&mut self, op: &OpCode64, signed: bool) -> EmitResult {
        let size = op.reg_size;

        self.ctx.emit_ld_intzr(op.rn, size);
        let n = self.ctx.store_local();
        self.ctx.emit_ld_intzr(op.rm, size);
        let m = self.ctx.store_local();

        let by_zero = self.ctx.define_label();
        let overflow = self.ctx.define_label();
        let end = self.ctx.define_label();

        self.ctx.emit(Op::LdLoc(m));
        self.ctx.emit_ldc_i(0, size);
        self.ctx.emit(Op::Ceq);
        self.ctx.emit(Op::BrTrue(by_zero));

        if signed {
            let min = match size {
                RegisterSize::Int32 => i32::MIN as u32 as u64,
                _ => i64::MIN as u64,
            };
            self.ctx.emit(Op::LdLoc(n));
            self.ctx.emit_ldc_i(min, size);
            self.ctx.emit(Op::Ceq);
            self.ctx.emit(Op::LdLoc(m));
            self.ctx.emit_ldc_i(u64::MAX, size);
            self.ctx.emit(Op::Ceq);
            self.ctx.emit(Op::And);
            self.ctx.emit(Op::BrTrue(overflow));
        }

        self.ctx.emit(Op::LdLoc(n));
        self.ctx.emit(Op::LdLoc(m));
        self.ctx.emit(if signed { Op::Div } else { Op::DivUn });
        self.ctx.emit_st_intzr(op.rd, size);
        self.ctx.emit(Op::Br(end));

        self.ctx.mark_label(by_zero);
        self.ctx.emit_ldc_i(0, size);
        self.ctx.emit_st_intzr(op.rd, size);
        self.ctx.emit(Op::Br(end));

        self.ctx.mark_label(overflow);
        if signed {
            self.ctx.emit(Op::LdLoc(n));
            self.ctx.emit_st_intzr(op.rd, size);
        }

        self.ctx.mark_label(end);
        Ok(())
    }

    // --- Multiply-add ---

    /// MADD/MSUB: `Ra +/- Rn * Rm`.
    pub fn madd(&mut self, op: &OpCode64, sub: bool) -> EmitResult {
        let size = op.reg_size;
        self.ctx.emit_ld_intzr(op.ra, size);
        self.ctx.emit_ld_intzr(op.rn, size);
        self.ctx.emit_ld_intzr(op.rm, size);
        self.ctx.emit(Op::Mul);
        self.ctx.emit(if sub { Op::Sub } else { Op::Add });
        self.ctx.emit_st_intzr(op.rd, size);
        Ok(())
    }

    /// SMADDL/SMSUBL/UMADDL/UMSUBL: 32x32 multiply widened to 64 bits.
    pub fn maddl(&mut self, op: &OpCode64, signed: bool, sub: bool) -> EmitResult {
        let widen = if signed { Op::ConvI8 } else { Op::ConvU8 };
        self.ctx.emit_ld_intzr(op.ra, RegisterSize::Int64);
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int32);
        self.ctx.emit(widen);
        self.ctx.emit_ld_intzr(op.rm, RegisterSize::Int32);
        self.ctx.emit(widen);
        self.ctx.emit(Op::Mul);
        self.ctx.emit(if sub { Op::Sub } else { Op::Add });
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
        Ok(())
    }

    /// SMULH/UMULH: high 64 bits of the 128-bit product.
    pub fn mulh(&mut self, op: &OpCode64, signed: bool) -> EmitResult {
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        self.ctx.emit_ld_intzr(op.rm, RegisterSize::Int64);
        self.ctx.emit_call(if signed { Helper::SMulHi128 } else { Helper::UMulHi128 });
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
        Ok(())
    }
}
