use crate::backend::scalar::ScalarBackend;
use crate::backend::{AesOp, HostCapabilities, VecFloatOp, VecFloatUnaryOp, VecIntOp, VecIntUnaryOp, VecShiftOp, VectorBackend};
use crate::ir::emitter::EmitterContext;
use crate::ir::intrinsic::Intrinsic;
use crate::ir::opcode::{Op, StateCall};
use crate::vector::Vector128;

/// Lowers lane-wise operations to host SIMD primitives.
///
/// Any operation whose primitive is missing from the capability set, or has
/// no packed form for the element size, goes to the scalar fallback.
#[derive(Debug, Clone, Copy)]
pub struct PackedBackend {
    caps: HostCapabilities,
    scalar: ScalarBackend,
}

fn splat(byte: u8) -> Vector128 {
    Vector128::from_bytes([byte; 16])
}

fn float_mask(size_f: usize, sign: bool) -> Vector128 {
    match (size_f, sign) {
        (0, false) => Vector128::from_u32_lanes([0x7FFF_FFFF; 4]),
        (0, true) => Vector128::from_u32_lanes([0x8000_0000; 4]),
        (1, false) => Vector128::new(0x7FFF_FFFF_FFFF_FFFF, 0x7FFF_FFFF_FFFF_FFFF),
        (1, true) => Vector128::new(1 << 63, 1 << 63),
        _ => panic!("Invalid vector float size {}", size_f),
    }
}

/// `[a, b] -> [b, a]`.
fn emit_swap(ctx: &mut EmitterContext) {
    let b = ctx.store_local();
    let a = ctx.store_local();
    ctx.emit(Op::LdLoc(b));
    ctx.emit(Op::LdLoc(a));
}

fn emit_not(ctx: &mut EmitterContext) {
    ctx.emit(Op::LdcV(!Vector128::ZERO));
    ctx.emit(Op::Intrinsic(Intrinsic::Pxor));
}

impl PackedBackend {
    pub fn new(caps: HostCapabilities) -> Self {
        Self { caps, scalar: ScalarBackend }
    }

    pub fn supports(&self, intrinsic: Intrinsic) -> bool {
        intrinsic.is_valid() && self.caps.contains(intrinsic.required_caps())
    }

    fn all(&self, intrinsics: &[Intrinsic]) -> bool {
        intrinsics.iter().all(|i| self.supports(*i))
    }

    fn intrinsic(&self, ctx: &mut EmitterContext, intrinsic: Intrinsic) {
        ctx.emit(Op::Intrinsic(intrinsic));
    }

    /// Saturating add/sub: compute the clamped and the wrapping result and
    /// set QC when any of the `bytes` low bytes differ.
    fn emit_saturating(&self, ctx: &mut EmitterContext, sat: Intrinsic, wrap: Intrinsic, bytes: usize) {
        let b = ctx.store_local();
        let a = ctx.store_local();
        ctx.emit(Op::LdLoc(a));
        ctx.emit(Op::LdLoc(b));
        self.intrinsic(ctx, sat);
        let result = ctx.store_local();

        ctx.emit(Op::LdLoc(result));
        ctx.emit(Op::LdLoc(a));
        ctx.emit(Op::LdLoc(b));
        self.intrinsic(ctx, wrap);
        self.intrinsic(ctx, Intrinsic::Pcmpeq(0));
        self.intrinsic(ctx, Intrinsic::Pmovmskb);

        let mask = if bytes >= 16 { 0xFFFF } else { (1u32 << bytes) - 1 };
        let done = ctx.define_label();
        ctx.emit_ldc_i4(mask);
        ctx.emit(Op::And);
        ctx.emit_ldc_i4(mask);
        ctx.emit(Op::Ceq);
        ctx.emit(Op::BrTrue(done));
        ctx.emit_state_call(StateCall::SetSaturated);
        ctx.mark_label(done);
        ctx.emit(Op::LdLoc(result));
    }
}

impl VectorBackend for PackedBackend {
    fn name(&self) -> &'static str {
        "packed"
    }

    fn capabilities(&self) -> HostCapabilities {
        self.caps
    }

    fn emit_int_binary(&self, ctx: &mut EmitterContext, op: VecIntOp, size: usize, elems: usize) {
        let s = size as u8;
        let simple = match op {
            VecIntOp::Add => Some(Intrinsic::Padd(s)),
            VecIntOp::Sub => Some(Intrinsic::Psub(s)),
            VecIntOp::Mul if size == 1 => Some(Intrinsic::Pmullw),
            VecIntOp::Mul if size == 2 => Some(Intrinsic::Pmulld),
            VecIntOp::SMax => Some(Intrinsic::Pmaxs(s)),
            VecIntOp::SMin => Some(Intrinsic::Pmins(s)),
            VecIntOp::UMax => Some(Intrinsic::Pmaxu(s)),
            VecIntOp::UMin => Some(Intrinsic::Pminu(s)),
            VecIntOp::CmEq => Some(Intrinsic::Pcmpeq(s)),
            VecIntOp::CmGt => Some(Intrinsic::Pcmpgt(s)),
            VecIntOp::URHadd => Some(Intrinsic::Pavg(s)),
            VecIntOp::And => Some(Intrinsic::Pand),
            VecIntOp::Orr => Some(Intrinsic::Por),
            VecIntOp::Eor => Some(Intrinsic::Pxor),
            _ => None,
        };
        if let Some(intrinsic) = simple {
            if self.supports(intrinsic) {
                self.intrinsic(ctx, intrinsic);
                return;
            }
            return self.scalar.emit_int_binary(ctx, op, size, elems);
        }

        match op {
            VecIntOp::CmGe if self.supports(Intrinsic::Pcmpgt(s)) => {
                emit_swap(ctx);
                self.intrinsic(ctx, Intrinsic::Pcmpgt(s));
                emit_not(ctx);
            }
            VecIntOp::CmHi if self.all(&[Intrinsic::Pmaxu(s), Intrinsic::Pcmpeq(s)]) => {
                // max(a, b) == b means a <= b
                let b = ctx.store_local();
                let a = ctx.store_local();
                ctx.emit(Op::LdLoc(a));
                ctx.emit(Op::LdLoc(b));
                self.intrinsic(ctx, Intrinsic::Pmaxu(s));
                ctx.emit(Op::LdLoc(b));
                self.intrinsic(ctx, Intrinsic::Pcmpeq(s));
                emit_not(ctx);
            }
            VecIntOp::CmHs if self.all(&[Intrinsic::Pmaxu(s), Intrinsic::Pcmpeq(s)]) => {
                let b = ctx.store_local();
                let a = ctx.store_local();
                ctx.emit(Op::LdLoc(a));
                ctx.emit(Op::LdLoc(b));
                self.intrinsic(ctx, Intrinsic::Pmaxu(s));
                ctx.emit(Op::LdLoc(a));
                self.intrinsic(ctx, Intrinsic::Pcmpeq(s));
            }
            VecIntOp::CmTst if self.supports(Intrinsic::Pcmpeq(s)) => {
                self.intrinsic(ctx, Intrinsic::Pand);
                ctx.emit(Op::LdcV(Vector128::ZERO));
                self.intrinsic(ctx, Intrinsic::Pcmpeq(s));
                emit_not(ctx);
            }
            VecIntOp::SqAdd | VecIntOp::UqAdd | VecIntOp::SqSub | VecIntOp::UqSub => {
                let (sat, wrap) = match op {
                    VecIntOp::SqAdd => (Intrinsic::Padds(s), Intrinsic::Padd(s)),
                    VecIntOp::UqAdd => (Intrinsic::Paddus(s), Intrinsic::Padd(s)),
                    VecIntOp::SqSub => (Intrinsic::Psubs(s), Intrinsic::Psub(s)),
                    _ => (Intrinsic::Psubus(s), Intrinsic::Psub(s)),
                };
                if self.all(&[sat, wrap, Intrinsic::Pcmpeq(0), Intrinsic::Pmovmskb]) {
                    self.emit_saturating(ctx, sat, wrap, elems << size);
                } else {
                    self.scalar.emit_int_binary(ctx, op, size, elems);
                }
            }
            VecIntOp::Bic if self.supports(Intrinsic::Pandn) => {
                emit_swap(ctx);
                self.intrinsic(ctx, Intrinsic::Pandn);
            }
            VecIntOp::Orn if self.supports(Intrinsic::Por) => {
                emit_not(ctx);
                self.intrinsic(ctx, Intrinsic::Por);
            }
            _ => self.scalar.emit_int_binary(ctx, op, size, elems),
        }
    }

    fn emit_int_unary(&self, ctx: &mut EmitterContext, op: VecIntUnaryOp, size: usize, elems: usize) {
        let s = size as u8;
        match op {
            VecIntUnaryOp::Abs if self.supports(Intrinsic::Pabs(s)) => self.intrinsic(ctx, Intrinsic::Pabs(s)),
            VecIntUnaryOp::Neg if self.supports(Intrinsic::Psub(s)) => {
                let a = ctx.store_local();
                ctx.emit(Op::LdcV(Vector128::ZERO));
                ctx.emit(Op::LdLoc(a));
                self.intrinsic(ctx, Intrinsic::Psub(s));
            }
            VecIntUnaryOp::Not if self.supports(Intrinsic::Pxor) => emit_not(ctx),
            _ => self.scalar.emit_int_unary(ctx, op, size, elems),
        }
    }

    fn emit_float_binary(&self, ctx: &mut EmitterContext, op: VecFloatOp, size_f: usize, elems: usize) {
        let s = size_f as u8;
        let (intrinsic, swap) = match op {
            VecFloatOp::Add => (Intrinsic::Addp(s), false),
            VecFloatOp::Sub => (Intrinsic::Subp(s), false),
            VecFloatOp::Mul => (Intrinsic::Mulp(s), false),
            VecFloatOp::Div => (Intrinsic::Divp(s), false),
            VecFloatOp::CmEq => (Intrinsic::Cmpeqp(s), false),
            // a >= b is b <= a, false when unordered
            VecFloatOp::CmGe => (Intrinsic::Cmplep(s), true),
            VecFloatOp::CmGt => (Intrinsic::Cmpltp(s), true),
        };
        if !self.supports(intrinsic) {
            return self.scalar.emit_float_binary(ctx, op, size_f, elems);
        }
        if swap {
            emit_swap(ctx);
        }
        self.intrinsic(ctx, intrinsic);
    }

    fn emit_float_unary(&self, ctx: &mut EmitterContext, op: VecFloatUnaryOp, size_f: usize, elems: usize) {
        match op {
            VecFloatUnaryOp::Abs if self.supports(Intrinsic::Pand) => {
                ctx.emit(Op::LdcV(float_mask(size_f, false)));
                self.intrinsic(ctx, Intrinsic::Pand);
            }
            VecFloatUnaryOp::Neg if self.supports(Intrinsic::Pxor) => {
                ctx.emit(Op::LdcV(float_mask(size_f, true)));
                self.intrinsic(ctx, Intrinsic::Pxor);
            }
            VecFloatUnaryOp::Sqrt if self.supports(Intrinsic::Sqrtp(size_f as u8)) => {
                self.intrinsic(ctx, Intrinsic::Sqrtp(size_f as u8));
            }
            _ => self.scalar.emit_float_unary(ctx, op, size_f, elems),
        }
    }

    fn emit_shift_imm(&self, ctx: &mut EmitterContext, op: VecShiftOp, size: usize, elems: usize, shift: u32) {
        let s = size as u8;
        let intrinsic = match op {
            VecShiftOp::Shl => Intrinsic::Psll(s, shift as u8),
            VecShiftOp::UShr => Intrinsic::Psrl(s, shift as u8),
            VecShiftOp::SShr => Intrinsic::Psra(s, shift as u8),
        };
        if shift <= 64 && self.supports(intrinsic) {
            self.intrinsic(ctx, intrinsic);
        } else {
            self.scalar.emit_shift_imm(ctx, op, size, elems, shift);
        }
    }

    fn emit_tbl(&self, ctx: &mut EmitterContext, tables: usize) {
        if !(1..=4).contains(&tables) {
            panic!("Invalid table register count {}", tables);
        }
        if !self.all(&[Intrinsic::Pshufb, Intrinsic::Psub(0), Intrinsic::Paddus(0), Intrinsic::Por]) {
            return self.scalar.emit_tbl(ctx, tables);
        }

        let indices = ctx.store_local();
        let mut regs: Vec<_> = (0..tables).map(|_| ctx.store_local()).collect();
        regs.reverse();

        for (j, table) in regs.into_iter().enumerate() {
            // Bias the indices so only those addressing this table keep bit 7 clear.
            ctx.emit(Op::LdLoc(table));
            ctx.emit(Op::LdLoc(indices));
            ctx.emit(Op::LdcV(splat((16 * j) as u8)));
            self.intrinsic(ctx, Intrinsic::Psub(0));
            ctx.emit(Op::LdcV(splat(0x70)));
            self.intrinsic(ctx, Intrinsic::Paddus(0));
            self.intrinsic(ctx, Intrinsic::Pshufb);
            if j > 0 {
                self.intrinsic(ctx, Intrinsic::Por);
            }
        }
    }

    fn emit_crc32(&self, ctx: &mut EmitterContext, castagnoli: bool, size: usize) {
        if castagnoli && self.supports(Intrinsic::Crc32c(size as u8)) {
            self.intrinsic(ctx, Intrinsic::Crc32c(size as u8));
        } else {
            self.scalar.emit_crc32(ctx, castagnoli, size);
        }
    }

    fn emit_aes(&self, ctx: &mut EmitterContext, op: AesOp) {
        if !self.caps.contains(HostCapabilities::AES) {
            return self.scalar.emit_aes(ctx, op);
        }
        match op {
            AesOp::Encrypt => {
                self.intrinsic(ctx, Intrinsic::Pxor);
                ctx.emit(Op::LdcV(Vector128::ZERO));
                self.intrinsic(ctx, Intrinsic::Aesenclast);
            }
            AesOp::Decrypt => {
                self.intrinsic(ctx, Intrinsic::Pxor);
                ctx.emit(Op::LdcV(Vector128::ZERO));
                self.intrinsic(ctx, Intrinsic::Aesdeclast);
            }
            AesOp::MixColumns => {
                // Undo SubBytes/ShiftRows so AESENC leaves only MixColumns.
                ctx.emit(Op::LdcV(Vector128::ZERO));
                self.intrinsic(ctx, Intrinsic::Aesdeclast);
                ctx.emit(Op::LdcV(Vector128::ZERO));
                self.intrinsic(ctx, Intrinsic::Aesenc);
            }
            AesOp::InvMixColumns => self.intrinsic(ctx, Intrinsic::Aesimc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intrinsics(ctx: &EmitterContext) -> Vec<Intrinsic> {
        ctx.ops()
            .iter()
            .filter_map(|op| match op {
                Op::Intrinsic(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_add_uses_padd() {
        let backend = PackedBackend::new(HostCapabilities::SSE2);
        let mut ctx = EmitterContext::new(0);
        backend.emit_int_binary(&mut ctx, VecIntOp::Add, 3, 2);
        assert_eq!(ctx.ops(), &[Op::Intrinsic(Intrinsic::Padd(3))]);
    }

    #[test]
    fn test_missing_capability_falls_back() {
        let backend = PackedBackend::new(HostCapabilities::SSE2);
        let mut ctx = EmitterContext::new(0);
        backend.emit_int_binary(&mut ctx, VecIntOp::Mul, 2, 4);
        assert!(intrinsics(&ctx).is_empty());
        assert!(ctx.ops().iter().any(|op| matches!(op, Op::VecInsertInt { .. })));

        let backend = PackedBackend::new(HostCapabilities::SSE2 | HostCapabilities::SSE41);
        let mut ctx = EmitterContext::new(0);
        backend.emit_int_binary(&mut ctx, VecIntOp::Mul, 2, 4);
        assert_eq!(intrinsics(&ctx), vec![Intrinsic::Pmulld]);
    }

    #[test]
    fn test_saturating_sets_qc_conditionally() {
        let backend = PackedBackend::new(HostCapabilities::SSE2);
        let mut ctx = EmitterContext::new(0);
        backend.emit_int_binary(&mut ctx, VecIntOp::UqAdd, 0, 8);
        assert!(ctx.ops().contains(&Op::StateCall(StateCall::SetSaturated)));
        assert!(ctx.ops().contains(&Op::LdcI4(0xFF)));
        assert_eq!(intrinsics(&ctx)[0], Intrinsic::Paddus(0));
    }

    #[test]
    fn test_tbl_needs_ssse3() {
        let mut ctx = EmitterContext::new(0);
        PackedBackend::new(HostCapabilities::SSE2).emit_tbl(&mut ctx, 2);
        assert!(intrinsics(&ctx).is_empty());

        let mut ctx = EmitterContext::new(0);
        PackedBackend::new(HostCapabilities::SSE2 | HostCapabilities::SSSE3).emit_tbl(&mut ctx, 2);
        assert_eq!(intrinsics(&ctx).iter().filter(|i| **i == Intrinsic::Pshufb).count(), 2);
    }

    #[test]
    fn test_crc32_only_castagnoli_is_accelerated() {
        let backend = PackedBackend::new(HostCapabilities::all());
        let mut ctx = EmitterContext::new(0);
        backend.emit_crc32(&mut ctx, false, 2);
        backend.emit_crc32(&mut ctx, true, 2);
        assert_eq!(intrinsics(&ctx), vec![Intrinsic::Crc32c(2)]);
    }
}
