use crate::backend::{AesOp, HostCapabilities, VecFloatOp, VecFloatUnaryOp, VecIntOp, VecIntUnaryOp, VecShiftOp, VectorBackend};
use crate::ir::emitter::EmitterContext;
use crate::ir::helper::Helper;
use crate::ir::opcode::{Local, Op};

/// Per-lane fallback: extract, compute on `I64`/float, insert into a zero vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

fn check_tables(tables: usize) {
    if !(1..=4).contains(&tables) {
        panic!("Invalid table register count {}", tables);
    }
}

/// Turn an `I32` 0/1 into an all-ones or all-zeros `I64` lane mask.
fn emit_mask_from_bool(ctx: &mut EmitterContext) {
    ctx.emit(Op::ConvU8);
    ctx.emit(Op::Neg);
}

fn emit_lane_pair(ctx: &mut EmitterContext, a: Local, b: Local, index: usize, size: usize, signed: bool) {
    let extract = Op::VecExtractInt { index: index as u8, size: size as u8, signed };
    ctx.emit(Op::LdLoc(a));
    ctx.emit(extract);
    ctx.emit(Op::LdLoc(b));
    ctx.emit(extract);
}

impl ScalarBackend {
    fn emit_int_lane_op(&self, ctx: &mut EmitterContext, op: VecIntOp, size: usize) {
        match op {
            VecIntOp::Add => ctx.emit(Op::Add),
            VecIntOp::Sub => ctx.emit(Op::Sub),
            VecIntOp::Mul => ctx.emit(Op::Mul),
            VecIntOp::SMax => ctx.emit_call(Helper::Max),
            VecIntOp::SMin => ctx.emit_call(Helper::Min),
            VecIntOp::UMax => ctx.emit_call(Helper::MaxUn),
            VecIntOp::UMin => ctx.emit_call(Helper::MinUn),
            VecIntOp::CmEq => {
                ctx.emit(Op::Ceq);
                emit_mask_from_bool(ctx);
            }
            VecIntOp::CmGt => {
                ctx.emit(Op::Cgt);
                emit_mask_from_bool(ctx);
            }
            VecIntOp::CmHi => {
                ctx.emit(Op::CgtUn);
                emit_mask_from_bool(ctx);
            }
            VecIntOp::CmGe | VecIntOp::CmHs => {
                ctx.emit(if op == VecIntOp::CmGe { Op::Clt } else { Op::CltUn });
                ctx.emit_ldc_i4(0);
                ctx.emit(Op::Ceq);
                emit_mask_from_bool(ctx);
            }
            VecIntOp::CmTst => {
                ctx.emit(Op::And);
                ctx.emit_ldc_i8(0);
                ctx.emit(Op::Ceq);
                ctx.emit_ldc_i4(0);
                ctx.emit(Op::Ceq);
                emit_mask_from_bool(ctx);
            }
            VecIntOp::SqAdd if size == 3 => ctx.emit_call(Helper::SatSignedAdd64),
            VecIntOp::UqAdd if size == 3 => ctx.emit_call(Helper::SatUnsignedAdd64),
            VecIntOp::SqSub if size == 3 => ctx.emit_call(Helper::SatSignedSub64),
            VecIntOp::UqSub if size == 3 => ctx.emit_call(Helper::SatUnsignedSub64),
            VecIntOp::SqAdd => {
                ctx.emit(Op::Add);
                ctx.emit_call(Helper::SatSignedToSigned(size as u8));
            }
            VecIntOp::UqAdd => {
                ctx.emit(Op::Add);
                ctx.emit_call(Helper::SatUnsignedToUnsigned(size as u8));
            }
            VecIntOp::SqSub => {
                ctx.emit(Op::Sub);
                ctx.emit_call(Helper::SatSignedToSigned(size as u8));
            }
            VecIntOp::UqSub => {
                // A borrow shows up as a negative difference.
                ctx.emit(Op::Sub);
                ctx.emit_call(Helper::SatSignedToUnsigned(size as u8));
            }
            VecIntOp::URHadd => {
                ctx.emit(Op::Add);
                ctx.emit_ldc_i8(1);
                ctx.emit(Op::Add);
                ctx.emit_ldc_i4(1);
                ctx.emit(Op::ShrUn);
            }
            VecIntOp::And | VecIntOp::Bic | VecIntOp::Orr | VecIntOp::Orn | VecIntOp::Eor => {
                panic!("Invalid lane operation {:?}", op)
            }
        }
    }
}

impl VectorBackend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::empty()
    }

    fn emit_int_binary(&self, ctx: &mut EmitterContext, op: VecIntOp, size: usize, elems: usize) {
        if op.is_bitwise() {
            if matches!(op, VecIntOp::Bic | VecIntOp::Orn) {
                ctx.emit(Op::Not);
            }
            ctx.emit(match op {
                VecIntOp::And | VecIntOp::Bic => Op::And,
                VecIntOp::Orr | VecIntOp::Orn => Op::Or,
                _ => Op::Xor,
            });
            return;
        }

        let b = ctx.store_local();
        let a = ctx.store_local();
        ctx.emit(Op::VecZero);
        for index in 0..elems {
            emit_lane_pair(ctx, a, b, index, size, op.is_signed());
            self.emit_int_lane_op(ctx, op, size);
            ctx.emit_vector_insert_tmp(index, size);
        }
    }

    fn emit_int_unary(&self, ctx: &mut EmitterContext, op: VecIntUnaryOp, size: usize, elems: usize) {
        if op == VecIntUnaryOp::Not {
            ctx.emit(Op::Not);
            return;
        }

        let a = ctx.store_local();
        ctx.emit(Op::VecZero);
        for index in 0..elems {
            ctx.emit(Op::LdLoc(a));
            ctx.emit(Op::VecExtractInt {
                index: index as u8,
                size: size as u8,
                signed: op != VecIntUnaryOp::Cnt,
            });
            match op {
                VecIntUnaryOp::Abs => ctx.emit_call(Helper::Abs),
                VecIntUnaryOp::Neg => ctx.emit(Op::Neg),
                VecIntUnaryOp::Cnt => ctx.emit_call(Helper::CountSetBits8),
                VecIntUnaryOp::Not => unreachable!(),
            }
            ctx.emit_vector_insert_tmp(index, size);
        }
    }

    fn emit_float_binary(&self, ctx: &mut EmitterContext, op: VecFloatOp, size_f: usize, elems: usize) {
        let b = ctx.store_local();
        let a = ctx.store_local();
        ctx.emit(Op::VecZero);
        for index in 0..elems {
            let extract = Op::VecExtractFloat { index: index as u8, size_f: size_f as u8 };
            ctx.emit(Op::LdLoc(a));
            ctx.emit(extract);
            ctx.emit(Op::LdLoc(b));
            ctx.emit(extract);
            let arith = match op {
                VecFloatOp::Add => Some(Op::Add),
                VecFloatOp::Sub => Some(Op::Sub),
                VecFloatOp::Mul => Some(Op::Mul),
                VecFloatOp::Div => Some(Op::Div),
                _ => None,
            };
            if let Some(arith) = arith {
                ctx.emit(arith);
                ctx.emit_vector_insert_f_tmp(index, size_f);
                continue;
            }
            match op {
                VecFloatOp::CmEq => ctx.emit(Op::Ceq),
                VecFloatOp::CmGt => ctx.emit(Op::Cgt),
                _ => {
                    // ordered a >= b is !(a < b or unordered)
                    ctx.emit(Op::CltUn);
                    ctx.emit_ldc_i4(0);
                    ctx.emit(Op::Ceq);
                }
            }
            emit_mask_from_bool(ctx);
            ctx.emit_vector_insert_tmp(index, size_f + 2);
        }
    }

    fn emit_float_unary(&self, ctx: &mut EmitterContext, op: VecFloatUnaryOp, size_f: usize, elems: usize) {
        let a = ctx.store_local();
        ctx.emit(Op::VecZero);
        for index in 0..elems {
            ctx.emit(Op::LdLoc(a));
            ctx.emit(Op::VecExtractFloat { index: index as u8, size_f: size_f as u8 });
            match (op, size_f) {
                (VecFloatUnaryOp::Neg, _) => ctx.emit(Op::Neg),
                (VecFloatUnaryOp::Abs, 0) => ctx.emit_call(Helper::AbsF32),
                (VecFloatUnaryOp::Abs, _) => ctx.emit_call(Helper::AbsF64),
                (VecFloatUnaryOp::Sqrt, 0) => ctx.emit_call(Helper::SqrtF32),
                (VecFloatUnaryOp::Sqrt, _) => ctx.emit_call(Helper::SqrtF64),
            }
            ctx.emit_vector_insert_f_tmp(index, size_f);
        }
    }

    fn emit_shift_imm(&self, ctx: &mut EmitterContext, op: VecShiftOp, size: usize, elems: usize, shift: u32) {
        let a = ctx.store_local();
        ctx.emit(Op::VecZero);
        for index in 0..elems {
            if op == VecShiftOp::UShr && shift >= 64 {
                ctx.emit_ldc_i8(0);
            } else {
                ctx.emit(Op::LdLoc(a));
                ctx.emit(Op::VecExtractInt {
                    index: index as u8,
                    size: size as u8,
                    signed: op == VecShiftOp::SShr,
                });
                match op {
                    VecShiftOp::Shl => {
                        ctx.emit_ldc_i4(shift);
                        ctx.emit(Op::Shl);
                    }
                    VecShiftOp::UShr => {
                        ctx.emit_ldc_i4(shift);
                        ctx.emit(Op::ShrUn);
                    }
                    VecShiftOp::SShr => {
                        ctx.emit_ldc_i4(shift.min(63));
                        ctx.emit(Op::Shr);
                    }
                }
            }
            ctx.emit_vector_insert_tmp(index, size);
        }
    }

    fn emit_tbl(&self, ctx: &mut EmitterContext, tables: usize) {
        check_tables(tables);
        ctx.emit_call(Helper::Tbl(tables as u8));
    }

    fn emit_crc32(&self, ctx: &mut EmitterContext, castagnoli: bool, size: usize) {
        ctx.emit_call(if castagnoli { Helper::Crc32c(size as u8) } else { Helper::Crc32(size as u8) });
    }

    fn emit_aes(&self, ctx: &mut EmitterContext, op: AesOp) {
        ctx.emit_call(match op {
            AesOp::Encrypt => Helper::AesEncrypt,
            AesOp::Decrypt => Helper::AesDecrypt,
            AesOp::MixColumns => Helper::AesMixColumns,
            AesOp::InvMixColumns => Helper::AesInvMixColumns,
        });
    }
}
