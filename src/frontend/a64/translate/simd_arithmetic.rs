use crate::backend::{ScalarBackend, VecFloatOp, VecFloatUnaryOp, VecIntOp, VecIntUnaryOp, VectorBackend};
use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::simd_helpers::float_helper;
use crate::frontend::a64::translate::visitor::{FloatHelper, Pairwise, TranslatorVisitor};
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;
use crate::soft::fp::RoundingMode;

fn fused_mul_add(size_f: usize) -> Helper {
    if size_f == 1 { Helper::FusedMulAddF64 } else { Helper::FusedMulAddF32 }
}

/// Lane-wise ops without a doubleword arrangement.
fn is_double(op: &OpCode64) -> bool {
    op.size > 2
}

/// Halfword and word lanes, the only sizes by-element multiplies and
/// SQDMULH accept.
fn is_elem_size(op: &OpCode64) -> bool {
    op.size == 1 || op.size == 2
}

impl<'a> TranslatorVisitor<'a> {
    // --- Integer, lane-wise ---

    /// Scalar form of a lane-wise integer op; only lane 0 is computed.
    pub fn scalar_int_op(&mut self, op: &OpCode64, vop: VecIntOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.ctx.emit_ld_vec(op.rm);
        ScalarBackend.emit_int_binary(self.ctx, vop, op.size as usize, 1);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    pub fn vector_int_op(&mut self, op: &OpCode64, vop: VecIntOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.ctx.emit_ld_vec(op.rm);
        self.backend().emit_int_binary(self.ctx, vop, op.size as usize, op.elems());
        self.emit_commit(op);
        Ok(())
    }

    pub fn vector_int_unary(&mut self, op: &OpCode64, uop: VecIntUnaryOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.backend().emit_int_unary(self.ctx, uop, op.size as usize, op.elems());
        self.emit_commit(op);
        Ok(())
    }

    /// MUL (vector)
    pub fn mul_v(&mut self, op: &OpCode64) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        self.vector_int_op(op, VecIntOp::Mul)
    }

    /// MUL (by element)
    pub fn mul_ve(&mut self, op: &OpCode64) -> EmitResult {
        if !is_elem_size(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let index = op.index as usize;
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rn, i, size);
            v.ctx.emit_vector_extract_zx(op.rm, index, size);
            v.ctx.emit(Op::Mul);
        });
        Ok(())
    }

    fn emit_mla(&mut self, op: &OpCode64, sub: bool, by_elem: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rd, i, size);
            v.ctx.emit_vector_extract_zx(op.rn, i, size);
            v.ctx.emit_vector_extract_zx(op.rm, if by_elem { op.index as usize } else { i }, size);
            v.ctx.emit(Op::Mul);
            v.ctx.emit(if sub { Op::Sub } else { Op::Add });
        });
        Ok(())
    }

    /// MLA/MLS (vector)
    pub fn mla_v(&mut self, op: &OpCode64, sub: bool) -> EmitResult {
        self.emit_mla(op, sub, false)
    }

    /// MLA/MLS (by element)
    pub fn mla_ve(&mut self, op: &OpCode64, sub: bool) -> EmitResult {
        if !is_elem_size(op) {
            return self.unsupported(op);
        }
        self.emit_mla(op, sub, true)
    }

    /// NEG/ABS (scalar), doubleword only.
    pub fn neg_abs_s(&mut self, op: &OpCode64, abs: bool) -> EmitResult {
        self.emit_build_vector(None, 1, 3, 0, |v, _| {
            v.ctx.emit_vector_extract_zx(op.rn, 0, 3);
            if abs {
                v.ctx.emit_call(Helper::Abs);
            } else {
                v.ctx.emit(Op::Neg);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    // --- Pairwise and across lanes ---

    /// ADDP (scalar): Dd = Vn.D[0] + Vn.D[1]
    pub fn addp_s(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_build_vector(None, 1, 3, 0, |v, _| {
            v.ctx.emit_vector_extract_zx(op.rn, 0, 3);
            v.ctx.emit_vector_extract_zx(op.rn, 1, 3);
            v.ctx.emit(Op::Add);
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// Pairwise forms: the lower half of Vd comes from adjacent pairs of Vn,
    /// the upper half from Vm.
    pub fn pairwise_v(&mut self, op: &OpCode64, combine: Pairwise) -> EmitResult {
        let size = op.size as usize;
        let half = op.elems() / 2;
        let signed = matches!(combine, Pairwise::SMax | Pairwise::SMin);
        self.emit_int_lanes(op, false, |v, i| {
            let src = if i < half { op.rn } else { op.rm };
            let j = (i % half) * 2;
            v.ctx.emit_vector_extract(src, j, size, signed);
            v.ctx.emit_vector_extract(src, j + 1, size, signed);
            v.emit_pairwise_combine(combine);
        });
        Ok(())
    }

    /// ADDV/SMAXV/SMINV/UMAXV/UMINV
    pub fn reduce_v(&mut self, op: &OpCode64, combine: Pairwise, signed: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = op.elems();
        self.emit_build_vector(None, 1, size, 0, |v, _| {
            v.ctx.emit_vector_extract(op.rn, 0, size, signed);
            for i in 1..elems {
                v.ctx.emit_vector_extract(op.rn, i, size, signed);
                v.emit_pairwise_combine(combine);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SADDLV/UADDLV: widening sum across lanes.
    pub fn saddlv_v(&mut self, op: &OpCode64, signed: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = op.elems();
        self.emit_build_vector(None, 1, size + 1, 0, |v, _| {
            v.ctx.emit_vector_extract(op.rn, 0, size, signed);
            for i in 1..elems {
                v.ctx.emit_vector_extract(op.rn, i, size, signed);
                v.ctx.emit(Op::Add);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    // --- Differences and halving ---

    /// Push `|Vn[ni] - Vm[mi]|` for lanes of `size`.
    fn emit_abs_diff(&mut self, op: &OpCode64, ni: usize, mi: usize, size: usize, signed: bool) {
        self.ctx.emit_vector_extract(op.rn, ni, size, signed);
        self.ctx.emit_vector_extract(op.rm, mi, size, signed);
        self.ctx.emit(Op::Sub);
        self.ctx.emit_call(Helper::Abs);
    }

    /// SABD/UABD, and SABA/UABA with `accumulate`.
    pub fn abd_v(&mut self, op: &OpCode64, signed: bool, accumulate: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        self.emit_int_lanes(op, false, |v, i| {
            v.emit_abs_diff(op, i, i, size, signed);
            if accumulate {
                v.ctx.emit_vector_extract_zx(op.rd, i, size);
                v.ctx.emit(Op::Add);
            }
        });
        Ok(())
    }

    /// SABDL/UABDL, and SABAL/UABAL with `accumulate`.
    pub fn abdl_v(&mut self, op: &OpCode64, signed: bool, accumulate: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = 8 >> size;
        let base = op.part() * elems;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.emit_abs_diff(op, base + i, base + i, size, signed);
            if accumulate {
                v.ctx.emit_vector_extract_zx(op.rd, i, size + 1);
                v.ctx.emit(Op::Add);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SHADD/UHADD/SHSUB/UHSUB/SRHADD. Lanes are at most 32 bits wide, so the
    /// intermediate never overflows an `I64`.
    pub fn halving_v(&mut self, op: &OpCode64, signed: bool, sub: bool, round: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract(op.rn, i, size, signed);
            v.ctx.emit_vector_extract(op.rm, i, size, signed);
            v.ctx.emit(if sub { Op::Sub } else { Op::Add });
            if round {
                v.ctx.emit_ldc_i8(1);
                v.ctx.emit(Op::Add);
            }
            v.ctx.emit_ldc_i4(1);
            v.ctx.emit(Op::Shr);
        });
        Ok(())
    }

    /// SADDLP/UADDLP, and SADALP/UADALP with `accumulate`.
    pub fn addlp_v(&mut self, op: &OpCode64, signed: bool, accumulate: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = op.elems() / 2;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.ctx.emit_vector_extract(op.rn, 2 * i, size, signed);
            v.ctx.emit_vector_extract(op.rn, 2 * i + 1, size, signed);
            v.ctx.emit(Op::Add);
            if accumulate {
                v.ctx.emit_vector_extract_zx(op.rd, i, size + 1);
                v.ctx.emit(Op::Add);
            }
        });
        self.emit_commit(op);
        Ok(())
    }

    // --- Saturating ---

    /// SUQADD (`signed`) and USQADD: Vd accumulates Vn of the opposite signedness.
    pub fn sat_acc(&mut self, op: &OpCode64, signed: bool, scalar: bool) -> EmitResult {
        let size = op.size as usize;
        self.emit_int_lanes(op, scalar, |v, i| {
            if size == 3 {
                v.ctx.emit_vector_extract(op.rn, i, 3, !signed);
                v.ctx.emit_vector_extract(op.rd, i, 3, signed);
                v.ctx.emit_call(if signed { Helper::SatSignedAcc64 } else { Helper::SatUnsignedAcc64 });
            } else {
                v.ctx.emit_vector_extract(op.rd, i, size, signed);
                v.ctx.emit_vector_extract(op.rn, i, size, !signed);
                v.ctx.emit(Op::Add);
                v.ctx.emit_call(if signed {
                    Helper::SatSignedToSigned(size as u8)
                } else {
                    Helper::SatSignedToUnsigned(size as u8)
                });
            }
        });
        Ok(())
    }

    /// SQABS and SQNEG (`neg`).
    pub fn sat_abs_neg(&mut self, op: &OpCode64, neg: bool, scalar: bool) -> EmitResult {
        let size = op.size as usize;
        self.emit_int_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_sx(op.rn, i, size);
            if neg {
                v.ctx.emit(Op::Neg);
            } else {
                v.ctx.emit_call(Helper::Abs);
            }
            v.ctx.emit_call(if size == 3 { Helper::SatAbsOrNeg64 } else { Helper::SatSignedToSigned(size as u8) });
        });
        Ok(())
    }

    /// SQDMULH/SQRDMULH: high half of the doubled product, saturated. The
    /// doubling is folded into a shift of `esize - 1`.
    pub fn sqdmulh(&mut self, op: &OpCode64, round: bool, scalar: bool) -> EmitResult {
        if !is_elem_size(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let esize = 8u32 << size;
        self.emit_int_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_sx(op.rn, i, size);
            v.ctx.emit_vector_extract_sx(op.rm, i, size);
            v.ctx.emit(Op::Mul);
            if round {
                v.ctx.emit_ldc_i8(1 << (esize - 2));
                v.ctx.emit(Op::Add);
            }
            v.ctx.emit_ldc_i4(esize - 1);
            v.ctx.emit(Op::Shr);
            v.ctx.emit_call(Helper::SatSignedToSigned(size as u8));
        });
        Ok(())
    }

    // --- Long, wide and narrow ---

    /// SADDL/UADDL/SSUBL/USUBL/SMULL/UMULL and their "2" forms.
    pub fn long_op(&mut self, op: &OpCode64, signed: bool, arith: Op) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = 8 >> size;
        let base = op.part() * elems;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.ctx.emit_vector_extract(op.rn, base + i, size, signed);
            v.ctx.emit_vector_extract(op.rm, base + i, size, signed);
            v.ctx.emit(arith);
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SADDW/UADDW/SSUBW/USUBW: wide Vn with narrow Vm.
    pub fn wide_op(&mut self, op: &OpCode64, signed: bool, arith: Op) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = 8 >> size;
        let base = op.part() * elems;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.ctx.emit_vector_extract(op.rn, i, size + 1, signed);
            v.ctx.emit_vector_extract(op.rm, base + i, size, signed);
            v.ctx.emit(arith);
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SMULL/UMULL (by element)
    pub fn mull_ve(&mut self, op: &OpCode64, signed: bool) -> EmitResult {
        if !is_elem_size(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = 8 >> size;
        let base = op.part() * elems;
        let index = op.index as usize;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.ctx.emit_vector_extract(op.rn, base + i, size, signed);
            v.ctx.emit_vector_extract(op.rm, index, size, signed);
            v.ctx.emit(Op::Mul);
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SMLAL/UMLAL/SMLSL/UMLSL, vector and by-element.
    pub fn mlal(&mut self, op: &OpCode64, signed: bool, sub: bool, by_elem: bool) -> EmitResult {
        if is_double(op) || (by_elem && !is_elem_size(op)) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let elems = 8 >> size;
        let base = op.part() * elems;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rd, i, size + 1);
            v.ctx.emit_vector_extract(op.rn, base + i, size, signed);
            v.ctx.emit_vector_extract(op.rm, if by_elem { op.index as usize } else { base + i }, size, signed);
            v.ctx.emit(Op::Mul);
            v.ctx.emit(if sub { Op::Sub } else { Op::Add });
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// ADDHN/SUBHN/RADDHN/RSUBHN: high half of each wide sum or difference.
    /// The "2" forms fill the upper half of Vd and keep the lower half.
    pub fn narrow_high(&mut self, op: &OpCode64, arith: Op, round: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let esize = 8u32 << size;
        let elems = 8 >> size;
        let part = op.part();
        let keep = if part == 1 { Some(op.rd) } else { None };
        self.emit_build_vector(keep, elems, size, part * elems, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rn, i, size + 1);
            v.ctx.emit_vector_extract_zx(op.rm, i, size + 1);
            v.ctx.emit(arith);
            if round {
                v.ctx.emit_ldc_i8(1 << (esize - 1));
                v.ctx.emit(Op::Add);
            }
            v.ctx.emit_ldc_i4(esize);
            v.ctx.emit(Op::ShrUn);
        });
        self.emit_commit(op);
        Ok(())
    }

    // --- Bit counting and reversal ---

    /// CLZ and CLS (`cls`) per lane.
    pub fn count_v(&mut self, op: &OpCode64, cls: bool) -> EmitResult {
        if is_double(op) {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let bits = 8u8 << size;
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rn, i, size);
            v.ctx.emit_call(if cls { Helper::CountLeadingSigns(bits) } else { Helper::CountLeadingZeros(bits) });
        });
        Ok(())
    }

    /// RBIT (vector): reverse the bits of each byte.
    pub fn rbit_v(&mut self, op: &OpCode64) -> EmitResult {
        if op.size != 0 {
            return self.unsupported(op);
        }
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rn, i, 0);
            v.ctx.emit_call(Helper::ReverseBits8);
        });
        Ok(())
    }

    /// REV16/REV32/REV64: reverse lanes within each container of
    /// `1 << container` bytes.
    pub fn rev_v(&mut self, op: &OpCode64, container: u8) -> EmitResult {
        if op.size >= container {
            return self.unsupported(op);
        }
        let size = op.size as usize;
        let flip = (1usize << (container - op.size)) - 1;
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rn, i ^ flip, size);
        });
        Ok(())
    }

    // --- Float ---

    /// Scalar form of a lane-wise float op.
    pub fn scalar_float_op(&mut self, op: &OpCode64, fop: VecFloatOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.ctx.emit_ld_vec(op.rm);
        ScalarBackend.emit_float_binary(self.ctx, fop, op.size_f(), 1);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    pub fn vector_float_op(&mut self, op: &OpCode64, fop: VecFloatOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.ctx.emit_ld_vec(op.rm);
        self.backend().emit_float_binary(self.ctx, fop, op.size_f(), op.elems_f());
        self.emit_commit(op);
        Ok(())
    }

    pub fn scalar_float_unary(&mut self, op: &OpCode64, uop: VecFloatUnaryOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        ScalarBackend.emit_float_unary(self.ctx, uop, op.size_f(), 1);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    pub fn vector_float_unary(&mut self, op: &OpCode64, uop: VecFloatUnaryOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.backend().emit_float_unary(self.ctx, uop, op.size_f(), op.elems_f());
        self.emit_commit(op);
        Ok(())
    }

    fn emit_fmul_by_elem(&mut self, op: &OpCode64, mulx: bool, scalar: bool) {
        let size_f = op.size_f();
        let index = op.index as usize;
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            v.ctx.emit_vector_extract_f(op.rm, index, size_f);
            if mulx {
                v.ctx.emit_call(float_helper(FloatHelper::MulX, size_f));
            } else {
                v.ctx.emit(Op::Mul);
            }
        });
    }

    /// FMUL/FMULX (scalar, by element)
    pub fn fmul_se(&mut self, op: &OpCode64, mulx: bool) -> EmitResult {
        self.emit_fmul_by_elem(op, mulx, true);
        Ok(())
    }

    /// FMUL/FMULX (vector, by element)
    pub fn fmul_ve(&mut self, op: &OpCode64, mulx: bool) -> EmitResult {
        self.emit_fmul_by_elem(op, mulx, false);
        Ok(())
    }

    /// FABD: |Vn - Vm|
    pub fn fabd(&mut self, op: &OpCode64, scalar: bool) -> EmitResult {
        let size_f = op.size_f();
        let abs = if size_f == 1 { Helper::AbsF64 } else { Helper::AbsF32 };
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            v.ctx.emit_vector_extract_f(op.rm, i, size_f);
            v.ctx.emit(Op::Sub);
            v.ctx.emit_call(abs);
        });
        Ok(())
    }

    /// Binary float ops computed by a helper per lane.
    pub fn float_helper_op(&mut self, op: &OpCode64, helper: FloatHelper, scalar: bool) -> EmitResult {
        let size_f = op.size_f();
        let helper = float_helper(helper, size_f);
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            v.ctx.emit_vector_extract_f(op.rm, i, size_f);
            v.ctx.emit_call(helper);
        });
        Ok(())
    }

    /// FRECPE/FRSQRTE/FRECPX
    pub fn float_estimate(&mut self, op: &OpCode64, helper: FloatHelper, scalar: bool) -> EmitResult {
        let size_f = op.size_f();
        let helper = float_helper(helper, size_f);
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            v.ctx.emit_call(helper);
        });
        Ok(())
    }

    /// FRINT*. `None` rounds with FPCR.RMode.
    pub fn frint(&mut self, op: &OpCode64, mode: Option<RoundingMode>, scalar: bool) -> EmitResult {
        let size_f = op.size_f();
        let round = if size_f == 1 { Helper::RoundF64(mode) } else { Helper::RoundF32(mode) };
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            v.ctx.emit_call(round);
        });
        Ok(())
    }

    /// FADDP (scalar): sum of the two lanes of Vn.
    pub fn faddp_s(&mut self, op: &OpCode64) -> EmitResult {
        let size_f = op.size_f();
        self.emit_float_lanes(op, true, |v, _| {
            v.ctx.emit_vector_extract_f(op.rn, 0, size_f);
            v.ctx.emit_vector_extract_f(op.rn, 1, size_f);
            v.ctx.emit(Op::Add);
        });
        Ok(())
    }

    /// FADDP/FMAXP/FMINP (vector). `None` adds.
    pub fn float_pairwise_v(&mut self, op: &OpCode64, helper: Option<FloatHelper>) -> EmitResult {
        let size_f = op.size_f();
        let half = op.elems_f() / 2;
        let helper = helper.map(|h| float_helper(h, size_f));
        self.emit_float_lanes(op, false, |v, i| {
            let src = if i < half { op.rn } else { op.rm };
            let j = (i % half) * 2;
            v.ctx.emit_vector_extract_f(src, j, size_f);
            v.ctx.emit_vector_extract_f(src, j + 1, size_f);
            match helper {
                Some(helper) => v.ctx.emit_call(helper),
                None => v.ctx.emit(Op::Add),
            }
        });
        Ok(())
    }

    // --- Fused multiply ---

    /// `Vd += (±Vn) * Vm` per lane, or against `Vm[index]` for by-element forms.
    fn emit_fmla(&mut self, op: &OpCode64, sub: bool, by_elem: bool, scalar: bool) {
        let size_f = op.size_f();
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            if sub {
                v.ctx.emit(Op::Neg);
            }
            v.ctx.emit_vector_extract_f(op.rm, if by_elem { op.index as usize } else { i }, size_f);
            v.ctx.emit_vector_extract_f(op.rd, i, size_f);
            v.ctx.emit_call(fused_mul_add(size_f));
        });
    }

    /// FMLA/FMLS (vector)
    pub fn fmla_v(&mut self, op: &OpCode64, sub: bool) -> EmitResult {
        self.emit_fmla(op, sub, false, false);
        Ok(())
    }

    /// FMLA/FMLS (scalar, by element)
    pub fn fmla_se(&mut self, op: &OpCode64, sub: bool) -> EmitResult {
        self.emit_fmla(op, sub, true, true);
        Ok(())
    }

    /// FMLA/FMLS (vector, by element)
    pub fn fmla_ve(&mut self, op: &OpCode64, sub: bool) -> EmitResult {
        self.emit_fmla(op, sub, true, false);
        Ok(())
    }

    /// FMADD/FMSUB/FNMADD/FNMSUB: `(±Rn) * Rm + (±Ra)` with one rounding.
    pub fn fmadd_s(&mut self, op: &OpCode64, neg_product: bool, neg_addend: bool) -> EmitResult {
        let size_f = op.size_f();
        self.emit_float_lanes(op, true, |v, _| {
            v.ctx.emit_vector_extract_f(op.rn, 0, size_f);
            if neg_product {
                v.ctx.emit(Op::Neg);
            }
            v.ctx.emit_vector_extract_f(op.rm, 0, size_f);
            v.ctx.emit_vector_extract_f(op.ra, 0, size_f);
            if neg_addend {
                v.ctx.emit(Op::Neg);
            }
            v.ctx.emit_call(fused_mul_add(size_f));
        });
        Ok(())
    }

    /// FNMUL
    pub fn fnmul_s(&mut self, op: &OpCode64) -> EmitResult {
        let size_f = op.size_f();
        self.emit_float_lanes(op, true, |v, _| {
            v.ctx.emit_vector_extract_f(op.rn, 0, size_f);
            v.ctx.emit_vector_extract_f(op.rm, 0, size_f);
            v.ctx.emit(Op::Mul);
            v.ctx.emit(Op::Neg);
        });
        Ok(())
    }
}
