use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::{FloatHelper, Narrowing, Pairwise, TranslatorVisitor};
use crate::frontend::a64::types::RegisterSize;
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;

/// Float helper for a lane of `size_f`.
pub fn float_helper(helper: FloatHelper, size_f: usize) -> Helper {
    let double = size_f == 1;
    match helper {
        FloatHelper::Max => if double { Helper::MaxF64 } else { Helper::MaxF32 },
        FloatHelper::Min => if double { Helper::MinF64 } else { Helper::MinF32 },
        FloatHelper::MaxNum => if double { Helper::MaxNumF64 } else { Helper::MaxNumF32 },
        FloatHelper::MinNum => if double { Helper::MinNumF64 } else { Helper::MinNumF32 },
        FloatHelper::MulX => if double { Helper::MulXF64 } else { Helper::MulXF32 },
        FloatHelper::RecipStep => if double { Helper::RecipStepF64 } else { Helper::RecipStepF32 },
        FloatHelper::RsqrtStep => if double { Helper::RsqrtStepF64 } else { Helper::RsqrtStepF32 },
        FloatHelper::RecipEstimate => if double { Helper::RecipEstimateF64 } else { Helper::RecipEstimateF32 },
        FloatHelper::InvSqrtEstimate => {
            if double { Helper::InvSqrtEstimateF64 } else { Helper::InvSqrtEstimateF32 }
        }
        FloatHelper::RecipExponent => if double { Helper::RecipExponentF64 } else { Helper::RecipExponentF32 },
    }
}

/// Saturating float to integer conversion, truncating toward zero.
pub fn float_to_int_helper(size_f: usize, to_64: bool, signed: bool) -> Helper {
    match (size_f, to_64, signed) {
        (0, false, true) => Helper::SatF32ToS32,
        (0, false, false) => Helper::SatF32ToU32,
        (0, true, true) => Helper::SatF32ToS64,
        (0, true, false) => Helper::SatF32ToU64,
        (1, false, true) => Helper::SatF64ToS32,
        (1, false, false) => Helper::SatF64ToU32,
        (1, true, true) => Helper::SatF64ToS64,
        (1, true, false) => Helper::SatF64ToU64,
        _ => panic!("Invalid float size {}", size_f),
    }
}

impl<'a> TranslatorVisitor<'a> {
    // --- Register writes ---

    /// Write the `V128` on the stack to Vd, clearing bits 127:64 for 64-bit forms.
    pub fn emit_commit(&mut self, op: &OpCode64) {
        if op.reg_size != RegisterSize::Simd128 {
            self.ctx.emit(Op::VecZeroUpper);
        }
        self.ctx.emit_st_vec(op.rd);
    }

    /// Build a vector lane by lane. Starts from register `keep` (or zero) and
    /// inserts `elems` integer lanes of `size` at `offset..`; `lane` must push
    /// one `I64` per call.
    pub fn emit_build_vector(
        &mut self,
        keep: Option<u8>,
        elems: usize,
        size: usize,
        offset: usize,
        mut lane: impl FnMut(&mut Self, usize),
    ) {
        match keep {
            Some(reg) => self.ctx.emit_ld_vec(reg),
            None => self.ctx.emit(Op::VecZero),
        }
        for i in 0..elems {
            lane(self, i);
            self.ctx.emit_vector_insert_tmp(offset + i, size);
        }
    }

    /// Float analogue of `emit_build_vector`; `lane` pushes one float of `size_f`.
    pub fn emit_build_vector_f(
        &mut self,
        keep: Option<u8>,
        elems: usize,
        size_f: usize,
        offset: usize,
        mut lane: impl FnMut(&mut Self, usize),
    ) {
        match keep {
            Some(reg) => self.ctx.emit_ld_vec(reg),
            None => self.ctx.emit(Op::VecZero),
        }
        for i in 0..elems {
            lane(self, i);
            self.ctx.emit_vector_insert_f_tmp(offset + i, size_f);
        }
    }

    /// Compute every integer lane of Vd from scratch and write it. Scalar
    /// forms compute lane 0 only and leave the rest of Vd zero.
    pub fn emit_int_lanes(&mut self, op: &OpCode64, scalar: bool, lane: impl FnMut(&mut Self, usize)) {
        let elems = if scalar { 1 } else { op.elems() };
        self.emit_build_vector(None, elems, op.size as usize, 0, lane);
        if scalar {
            self.ctx.emit_st_vec(op.rd);
        } else {
            self.emit_commit(op);
        }
    }

    /// Float analogue of `emit_int_lanes`.
    pub fn emit_float_lanes(&mut self, op: &OpCode64, scalar: bool, lane: impl FnMut(&mut Self, usize)) {
        let elems = if scalar { 1 } else { op.elems_f() };
        self.emit_build_vector_f(None, elems, op.size_f(), 0, lane);
        if scalar {
            self.ctx.emit_st_vec(op.rd);
        } else {
            self.emit_commit(op);
        }
    }

    /// Push a float constant of lane type `size_f`.
    pub fn emit_ldc_f(&mut self, value: f64, size_f: usize) {
        match size_f {
            0 => self.ctx.emit_ldc_r4(value as f32),
            1 => self.ctx.emit_ldc_r8(value),
            _ => panic!("Invalid float size {}", size_f),
        }
    }

    /// Multiply the float on the stack by `2^exp`.
    pub fn emit_scale_f(&mut self, exp: i32, size_f: usize) {
        self.emit_ldc_f(2f64.powi(exp), size_f);
        self.ctx.emit(Op::Mul);
    }

    // --- Lane combiners ---

    /// Combine the two `I64` lanes on the stack.
    pub fn emit_pairwise_combine(&mut self, combine: Pairwise) {
        match combine {
            Pairwise::Add => self.ctx.emit(Op::Add),
            Pairwise::SMax => self.ctx.emit_call(Helper::Max),
            Pairwise::SMin => self.ctx.emit_call(Helper::Min),
            Pairwise::UMax => self.ctx.emit_call(Helper::MaxUn),
            Pairwise::UMin => self.ctx.emit_call(Helper::MinUn),
        }
    }

    /// Bring the `I64` on the stack, holding a value of `8 << (size + 1)` bits,
    /// into range for a lane of `8 << size` bits.
    pub fn emit_narrow(&mut self, narrowing: Narrowing, size: usize) {
        let size = size as u8;
        match narrowing {
            // Insertion keeps the low bits
            Narrowing::Truncate => {}
            Narrowing::SignedToSigned => self.ctx.emit_call(Helper::SatSignedToSigned(size)),
            Narrowing::UnsignedToUnsigned => self.ctx.emit_call(Helper::SatUnsignedToUnsigned(size)),
            Narrowing::SignedToUnsigned => self.ctx.emit_call(Helper::SatSignedToUnsigned(size)),
        }
    }
}
