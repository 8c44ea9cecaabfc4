use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::ShiftType;
use crate::ir::opcode::Op;

impl<'a> TranslatorVisitor<'a> {
    /// LSLV/LSRV/ASRV/RORV. The amount is Rm modulo the datasize; the stack
    /// shifts mask it the same way.
    pub fn shift_variable(&mut self, op: &OpCode64, shift: ShiftType) -> EmitResult {
        let size = op.reg_size;
        self.ctx.emit_ld_intzr(op.rn, size);

        match shift {
            ShiftType::LSL | ShiftType::LSR | ShiftType::ASR => {
                self.ctx.emit_ld_intzr(op.rm, size);
                self.ctx.emit(match shift {
                    ShiftType::LSL => Op::Shl,
                    ShiftType::LSR => Op::ShrUn,
                    _ => Op::Shr,
                });
            }
            ShiftType::ROR => {
                let bits = op.datasize();
                let value = self.ctx.store_local();
                self.ctx.emit_ld_intzr(op.rm, size);
                self.ctx.emit_ldc_i((bits - 1) as u64, size);
                self.ctx.emit(Op::And);
                let amount = self.ctx.store_local();

                // A zero amount shifts left by `bits`, which masks to 0 and
                // ORs the value with itself.
                self.ctx.emit(Op::LdLoc(value));
                self.ctx.emit(Op::LdLoc(amount));
                self.ctx.emit(Op::ShrUn);
                self.ctx.emit(Op::LdLoc(value));
                self.ctx.emit_ldc_i(bits as u64, size);
                self.ctx.emit(Op::LdLoc(amount));
                self.ctx.emit(Op::Sub);
                self.ctx.emit(Op::Shl);
                self.ctx.emit(Op::Or);
            }
        }

        self.ctx.emit_st_intzr(op.rd, size);
        Ok(())
    }

    /// EXTR: bits `lsb..lsb+datasize` of `Rn:Rm`; `lsb` is in `imm`.
    pub fn extr(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.reg_size;
        let bits = op.datasize();
        let lsb = op.imm as u32;
        if lsb >= bits {
            panic!("Invalid EXTR lsb {}", lsb);
        }

        self.ctx.emit_ld_intzr(op.rm, size);
        if lsb != 0 {
            self.ctx.emit_ldc_i4(lsb);
            self.ctx.emit(Op::ShrUn);
            self.ctx.emit_ld_intzr(op.rn, size);
            self.ctx.emit_ldc_i4(bits - lsb);
            self.ctx.emit(Op::Shl);
            self.ctx.emit(Op::Or);
        }
        self.ctx.emit_st_intzr(op.rd, size);
        Ok(())
    }
}
