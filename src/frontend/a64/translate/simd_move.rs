use crate::backend::VectorBackend;
use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::{Narrowing, TranslatorVisitor};
use crate::frontend::a64::types::RegisterSize;
use crate::ir::opcode::Op;
use crate::vector::Vector128;

impl<'a> TranslatorVisitor<'a> {
    // --- FMOV ---

    /// FMOV (register)
    pub fn fmov_s(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.size_f() + 2;
        self.emit_build_vector(None, 1, size, 0, |v, _| v.ctx.emit_vector_extract_zx(op.rn, 0, size));
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// FMOV (scalar, immediate). `imm` holds the encoded float bits.
    pub fn fmov_si(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.size_f() + 2;
        self.emit_build_vector(None, 1, size, 0, |v, _| v.ctx.emit_ldc_i8(op.imm));
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// FMOV (vector, immediate): every lane gets the float bits in `imm`.
    pub fn fmov_vi(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.size_f() + 2;
        self.emit_build_vector(None, op.elems_f(), size, 0, |v, _| v.ctx.emit_ldc_i8(op.imm));
        self.emit_commit(op);
        Ok(())
    }

    /// FMOV to a general-purpose register; `top` reads Vn.D[1].
    pub fn fmov_ftoi(&mut self, op: &OpCode64, top: bool) -> EmitResult {
        if top {
            self.ctx.emit_vector_extract_zx(op.rn, 1, 3);
            self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
            return Ok(());
        }
        self.ctx.emit_vector_extract_zx(op.rn, 0, op.size_f() + 2);
        if op.reg_size == RegisterSize::Int32 {
            self.ctx.emit(Op::ConvU4);
        }
        self.ctx.emit_st_intzr(op.rd, op.reg_size);
        Ok(())
    }

    /// FMOV from a general-purpose register; `top` writes Vd.D[1] and keeps
    /// the lower half.
    pub fn fmov_itof(&mut self, op: &OpCode64, top: bool) -> EmitResult {
        if top {
            self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
            self.ctx.emit_vector_insert(op.rd, 1, 3);
            return Ok(());
        }
        self.emit_build_vector(None, 1, op.size_f() + 2, 0, |v, _| {
            v.ctx.emit_ld_intzr(op.rn, op.reg_size);
            if op.reg_size == RegisterSize::Int32 {
                v.ctx.emit(Op::ConvU8);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    // --- Bitwise select and immediates ---

    /// BSL: Vd = (Vd & Vn) | (!Vd & Vm)
    pub fn bsl_v(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.ctx.emit_ld_vec(op.rm);
        self.ctx.emit(Op::Xor);
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit(Op::And);
        self.ctx.emit_ld_vec(op.rm);
        self.ctx.emit(Op::Xor);
        self.emit_commit(op);
        Ok(())
    }

    /// BIT inserts Vn bits where Vm is set; BIF (`invert`) where it is clear.
    pub fn bit_v(&mut self, op: &OpCode64, invert: bool) -> EmitResult {
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit_ld_vec(op.rn);
        self.ctx.emit(Op::Xor);
        self.ctx.emit_ld_vec(op.rm);
        if invert {
            self.ctx.emit(Op::Not);
        }
        self.ctx.emit(Op::And);
        self.ctx.emit(Op::Xor);
        self.emit_commit(op);
        Ok(())
    }

    /// The 64-bit expanded immediate replicated to both halves.
    fn imm_pattern(op: &OpCode64, invert: bool) -> Vector128 {
        let imm = if invert { !op.imm } else { op.imm };
        Vector128::new(imm, imm)
    }

    /// MOVI/MVNI (`invert`). `imm` is the expanded 64-bit pattern.
    pub fn movi_v(&mut self, op: &OpCode64, invert: bool) -> EmitResult {
        self.ctx.emit(Op::LdcV(Self::imm_pattern(op, invert)));
        self.emit_commit(op);
        Ok(())
    }

    /// ORR/BIC (vector, immediate)
    pub fn orr_bic_vi(&mut self, op: &OpCode64, bic: bool) -> EmitResult {
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit(Op::LdcV(Self::imm_pattern(op, bic)));
        self.ctx.emit(if bic { Op::And } else { Op::Or });
        self.emit_commit(op);
        Ok(())
    }

    // --- Element moves ---

    /// DUP (general)
    pub fn dup_gp(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        let value = self.ctx.store_local();
        self.emit_int_lanes(op, false, |v, _| v.ctx.emit(Op::LdLoc(value)));
        Ok(())
    }

    /// DUP (element) to a scalar: Vd = Vn[index].
    pub fn dup_s(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.size as usize;
        self.emit_int_lanes(op, true, |v, _| v.ctx.emit_vector_extract_zx(op.rn, op.index as usize, size));
        Ok(())
    }

    /// DUP (element) to every lane.
    pub fn dup_v(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.size as usize;
        self.emit_int_lanes(op, false, |v, _| v.ctx.emit_vector_extract_zx(op.rn, op.index as usize, size));
        Ok(())
    }

    /// INS (general): Vd[index] = Rn, other lanes kept.
    pub fn ins_gp(&mut self, op: &OpCode64) -> EmitResult {
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
        self.ctx.emit_vector_insert(op.rd, op.index as usize, op.size as usize);
        Ok(())
    }

    /// INS (element): Vd[index] = Vn[src_index]
    pub fn ins_v(&mut self, op: &OpCode64) -> EmitResult {
        let size = op.size as usize;
        self.ctx.emit_vector_extract_zx(op.rn, op.src_index as usize, size);
        self.ctx.emit_vector_insert(op.rd, op.index as usize, size);
        Ok(())
    }

    /// UMOV and SMOV (`signed`)
    pub fn mov_s(&mut self, op: &OpCode64, signed: bool) -> EmitResult {
        self.ctx.emit_vector_extract(op.rn, op.index as usize, op.size as usize, signed);
        if op.reg_size == RegisterSize::Int32 {
            self.ctx.emit(Op::ConvU4);
        }
        self.ctx.emit_st_intzr(op.rd, op.reg_size);
        Ok(())
    }

    // --- Permutes ---

    /// EXT: bytes `imm..` of the concatenation Vm:Vn.
    pub fn ext_v(&mut self, op: &OpCode64) -> EmitResult {
        let bytes = op.vector_bytes();
        let position = op.imm as usize;
        if position >= bytes {
            panic!("Invalid EXT position {} for {} bytes", position, bytes);
        }
        self.emit_build_vector(None, bytes, 0, 0, |v, i| {
            let index = position + i;
            if index < bytes {
                v.ctx.emit_vector_extract_zx(op.rn, index, 0);
            } else {
                v.ctx.emit_vector_extract_zx(op.rm, index - bytes, 0);
            }
        });
        self.emit_commit(op);
        Ok(())
    }

    /// TBL over `tbl_regs` consecutive registers from Vn, wrapping at V31.
    pub fn tbl_v(&mut self, op: &OpCode64) -> EmitResult {
        let tables = op.tbl_regs as usize;
        if !(1..=4).contains(&tables) {
            panic!("Invalid table register count {}", tables);
        }
        for t in 0..tables {
            self.ctx.emit_ld_vec((op.rn + t as u8) % 32);
        }
        self.ctx.emit_ld_vec(op.rm);
        self.backend().emit_tbl(self.ctx, tables);
        self.emit_commit(op);
        Ok(())
    }

    /// TRN1/TRN2
    pub fn trn_v(&mut self, op: &OpCode64, part: usize) -> EmitResult {
        let size = op.size as usize;
        self.emit_int_lanes(op, false, |v, i| {
            let src = if i % 2 == 0 { op.rn } else { op.rm };
            v.ctx.emit_vector_extract_zx(src, (i & !1) + part, size);
        });
        Ok(())
    }

    /// ZIP1/ZIP2
    pub fn zip_v(&mut self, op: &OpCode64, part: usize) -> EmitResult {
        let size = op.size as usize;
        let base = part * op.elems() / 2;
        self.emit_int_lanes(op, false, |v, i| {
            let src = if i % 2 == 0 { op.rn } else { op.rm };
            v.ctx.emit_vector_extract_zx(src, base + i / 2, size);
        });
        Ok(())
    }

    /// UZP1/UZP2
    pub fn uzp_v(&mut self, op: &OpCode64, part: usize) -> EmitResult {
        let size = op.size as usize;
        let half = op.elems() / 2;
        self.emit_int_lanes(op, false, |v, i| {
            let (src, j) = if i < half { (op.rn, i) } else { (op.rm, i - half) };
            v.ctx.emit_vector_extract_zx(src, 2 * j + part, size);
        });
        Ok(())
    }

    // --- Narrowing ---

    /// XTN/SQXTN/UQXTN/SQXTUN. `size` is the destination lane size; the
    /// vector "2" forms fill the upper half and keep the lower.
    pub fn xtn(&mut self, op: &OpCode64, narrowing: Narrowing, scalar: bool) -> EmitResult {
        if op.size > 2 {
            panic!("Invalid narrowing size {}", op.size);
        }
        let size = op.size as usize;
        let signed = matches!(narrowing, Narrowing::SignedToSigned | Narrowing::SignedToUnsigned);
        let lane = |v: &mut Self, i: usize| {
            v.ctx.emit_vector_extract(op.rn, i, size + 1, signed);
            v.emit_narrow(narrowing, size);
        };

        if scalar {
            self.emit_build_vector(None, 1, size, 0, lane);
            self.ctx.emit_st_vec(op.rd);
        } else {
            let elems = 8 >> size;
            let part = op.part();
            let keep = if part == 1 { Some(op.rd) } else { None };
            self.emit_build_vector(keep, elems, size, part * elems, lane);
            self.emit_commit(op);
        }
        Ok(())
    }
}
