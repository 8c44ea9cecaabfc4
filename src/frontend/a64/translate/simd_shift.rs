use crate::backend::{ScalarBackend, VecShiftOp, VectorBackend};
use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::helpers::ones;
use crate::frontend::a64::translate::visitor::{Narrowing, TranslatorVisitor};
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;

/// Flavour of an immediate right shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightShift {
    pub signed: bool,
    pub round: bool,
}

impl RightShift {
    pub const SIGNED: RightShift = RightShift { signed: true, round: false };
    pub const UNSIGNED: RightShift = RightShift { signed: false, round: false };
    pub const SIGNED_ROUND: RightShift = RightShift { signed: true, round: true };
    pub const UNSIGNED_ROUND: RightShift = RightShift { signed: false, round: true };

    fn helper(self, esize: u32) -> Helper {
        let esize = esize as u8;
        if self.signed {
            Helper::SignedShrImm { round: self.round, esize }
        } else {
            Helper::UnsignedShrImm { round: self.round, esize }
        }
    }
}

impl<'a> TranslatorVisitor<'a> {
    /// SHL/SSHR/USHR (scalar), doubleword only.
    pub fn shift_imm_s(&mut self, op: &OpCode64, sop: VecShiftOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        ScalarBackend.emit_shift_imm(self.ctx, sop, 3, 1, op.shift as u32);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SHL/SSHR/USHR (vector)
    pub fn shift_imm_v(&mut self, op: &OpCode64, sop: VecShiftOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.backend().emit_shift_imm(self.ctx, sop, op.size as usize, op.elems(), op.shift as u32);
        self.emit_commit(op);
        Ok(())
    }

    /// Push lane `index` of Vn shifted right by the immediate.
    fn emit_shr_lane(&mut self, op: &OpCode64, rs: RightShift, index: usize, size: usize) {
        let esize = 8u32 << size;
        let shift = op.shift as u32;
        if shift == 0 || shift > esize {
            panic!("Invalid right shift {} for {}-bit lanes", shift, esize);
        }
        self.ctx.emit_vector_extract(op.rn, index, size, rs.signed);
        self.ctx.emit_ldc_i4(shift);
        self.ctx.emit_call(rs.helper(esize));
    }

    /// SSRA/USRA/SRSHR/URSHR/SRSRA/URSRA
    pub fn shr_acc(&mut self, op: &OpCode64, rs: RightShift, accumulate: bool, scalar: bool) -> EmitResult {
        let size = op.size as usize;
        self.emit_int_lanes(op, scalar, |v, i| {
            v.emit_shr_lane(op, rs, i, size);
            if accumulate {
                v.ctx.emit_vector_extract_zx(op.rd, i, size);
                v.ctx.emit(Op::Add);
            }
        });
        Ok(())
    }

    /// SHRN/RSHRN and the saturating narrowing right shifts. `size` is the
    /// destination lane size.
    pub fn shr_narrow(&mut self, op: &OpCode64, rs: RightShift, narrowing: Narrowing, scalar: bool) -> EmitResult {
        if op.size > 2 {
            panic!("Invalid narrowing size {}", op.size);
        }
        let size = op.size as usize;
        let lane = |v: &mut Self, i: usize| {
            v.emit_shr_lane(op, rs, i, size + 1);
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

    /// SSHLL/USHLL, and SHLL (`shll`) which always shifts by the lane width.
    pub fn shll(&mut self, op: &OpCode64, signed: bool, shll: bool) -> EmitResult {
        if op.size > 2 {
            panic!("Invalid widening size {}", op.size);
        }
        let size = op.size as usize;
        let shift = if shll { 8u32 << size } else { op.shift as u32 };
        let elems = 8 >> size;
        let base = op.part() * elems;
        self.emit_build_vector(None, elems, size + 1, 0, |v, i| {
            v.ctx.emit_vector_extract(op.rn, base + i, size, signed);
            if shift != 0 {
                v.ctx.emit_ldc_i4(shift);
                v.ctx.emit(Op::Shl);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SLI and SRI (`right`): shift Vn and insert it, keeping the bits of Vd
    /// the shift vacated.
    pub fn sli_sri(&mut self, op: &OpCode64, right: bool) -> EmitResult {
        let size = op.size as usize;
        let esize = 8u32 << size;
        let shift = op.shift as u32;
        let lane_mask = ones(esize as u64);
        let keep = match (right, shift) {
            (true, s) if s >= esize => lane_mask,
            (true, s) => !(lane_mask >> s) & lane_mask,
            (false, s) if s >= esize => panic!("Invalid left shift {} for {}-bit lanes", s, esize),
            (false, s) => !(lane_mask << s) & lane_mask,
        };
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract_zx(op.rd, i, size);
            v.ctx.emit_ldc_i8(keep);
            v.ctx.emit(Op::And);
            if right && shift >= esize {
                return;
            }
            v.ctx.emit_vector_extract_zx(op.rn, i, size);
            v.ctx.emit_ldc_i4(shift);
            v.ctx.emit(if right { Op::ShrUn } else { Op::Shl });
            v.ctx.emit(Op::Or);
        });
        Ok(())
    }

    /// SSHL/USHL/SRSHL/URSHL/SQSHL/UQSHL/SQRSHL/UQRSHL (register). The shift
    /// is the signed low byte of each Vm lane; negative values shift right.
    pub fn shl_reg(&mut self, op: &OpCode64, signed: bool, round: bool, saturate: bool) -> EmitResult {
        let size = op.size as usize;
        let code = op.size;
        let helper = match (signed, saturate) {
            (true, false) => Helper::SignedShlReg { round, size: code },
            (false, false) => Helper::UnsignedShlReg { round, size: code },
            (true, true) => Helper::SignedShlRegSat { round, size: code },
            (false, true) => Helper::UnsignedShlRegSat { round, size: code },
        };
        self.emit_int_lanes(op, false, |v, i| {
            v.ctx.emit_vector_extract(op.rn, i, size, signed);
            v.ctx.emit_vector_extract_zx(op.rm, i, size);
            v.ctx.emit_call(helper);
        });
        Ok(())
    }
}
