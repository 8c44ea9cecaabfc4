//! Vector backends.
//!
//! SIMD emitters describe *what* a lane-wise operation is; a backend decides
//! *how* it is emitted. `PackedBackend` uses host SIMD primitives where the
//! capability set allows, `ScalarBackend` extracts, computes and reinserts
//! one lane at a time. Both leave the same `V128` on the stack.
//!
//! Every method expects its operands already pushed (first operand deepest)
//! and leaves exactly one result. Results of 64-bit forms may carry junk in
//! the upper half; the caller zeroes it before committing.

mod caps;
mod packed;
mod scalar;

pub use caps::HostCapabilities;
pub use packed::PackedBackend;
pub use scalar::ScalarBackend;

use crate::ir::emitter::EmitterContext;

/// Lane-wise binary integer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecIntOp {
    Add,
    Sub,
    Mul,
    SMax,
    SMin,
    UMax,
    UMin,
    CmEq,
    CmGt,
    CmGe,
    CmHi,
    CmHs,
    CmTst,
    SqAdd,
    UqAdd,
    SqSub,
    UqSub,
    URHadd,
    And,
    Bic,
    Orr,
    Orn,
    Eor,
}

impl VecIntOp {
    /// Whether lanes are read sign-extended.
    pub fn is_signed(self) -> bool {
        matches!(self, VecIntOp::SMax | VecIntOp::SMin | VecIntOp::CmGt | VecIntOp::CmGe | VecIntOp::SqAdd | VecIntOp::SqSub)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, VecIntOp::And | VecIntOp::Bic | VecIntOp::Orr | VecIntOp::Orn | VecIntOp::Eor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecIntUnaryOp {
    Abs,
    Neg,
    Not,
    Cnt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecFloatOp {
    Add,
    Sub,
    Mul,
    Div,
    CmEq,
    CmGe,
    CmGt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecFloatUnaryOp {
    Abs,
    Neg,
    Sqrt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecShiftOp {
    Shl,
    UShr,
    SShr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesOp {
    Encrypt,
    Decrypt,
    MixColumns,
    InvMixColumns,
}

pub trait VectorBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> HostCapabilities;

    /// `[a, b] -> [a op b]` over `elems` lanes of `8 << size` bits.
    fn emit_int_binary(&self, ctx: &mut EmitterContext, op: VecIntOp, size: usize, elems: usize);

    /// `[a] -> [op a]`.
    fn emit_int_unary(&self, ctx: &mut EmitterContext, op: VecIntUnaryOp, size: usize, elems: usize);

    /// `[a, b] -> [a op b]` over `elems` float lanes; compares yield all-ones lanes.
    fn emit_float_binary(&self, ctx: &mut EmitterContext, op: VecFloatOp, size_f: usize, elems: usize);

    fn emit_float_unary(&self, ctx: &mut EmitterContext, op: VecFloatUnaryOp, size_f: usize, elems: usize);

    /// `[a] -> [a shifted by shift]`; right shifts take `shift` in 1..=esize.
    fn emit_shift_imm(&self, ctx: &mut EmitterContext, op: VecShiftOp, size: usize, elems: usize, shift: u32);

    /// `[t0 .. t(n-1), indices] -> [result]` for 1..=4 table registers.
    fn emit_tbl(&self, ctx: &mut EmitterContext, tables: usize);

    /// `[crc: I32, value: I64] -> [I32]` over `8 << size` bits of value.
    fn emit_crc32(&self, ctx: &mut EmitterContext, castagnoli: bool, size: usize);

    /// AESE/AESD take `[d, n]`; the MixColumns forms take `[a]`.
    fn emit_aes(&self, ctx: &mut EmitterContext, op: AesOp);
}
