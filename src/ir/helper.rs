//! Direct references to the pure routines emitted code may call.
//!
//! A `Helper` names one routine; `invoke` resolves it with a `match`, so
//! there is no name lookup at emission or run time. Saturating helpers
//! report clamping through `ProcessorState::set_saturated`.

use crate::config::ProcessorState;
use crate::ir::types::Type;
use crate::ir::value::Value;
use crate::soft::estimate::EstimateTables;
use crate::soft::fp::{self, RoundingMode};
use crate::soft::{aes, bits, crc32, mul_hi, saturate, sha, shift};
use crate::vector::Vector128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Helper {
    // --- Bits ---
    CountLeadingZeros(u8),
    CountLeadingSigns(u8),
    CountSetBits8,
    ReverseBits8,
    ReverseBits32,
    ReverseBits64,
    ReverseBytes16_32,
    ReverseBytes32_32,
    ReverseBytes16_64,
    ReverseBytes32_64,
    ReverseBytes64,

    // --- Integer ---
    SMulHi128,
    UMulHi128,
    Max,
    Min,
    MaxUn,
    MinUn,
    Abs,
    Crc32(u8),
    Crc32c(u8),

    // --- Float to integer, saturating, NaN to zero ---
    SatF32ToS32,
    SatF32ToU32,
    SatF64ToS32,
    SatF64ToU32,
    SatF32ToS64,
    SatF32ToU64,
    SatF64ToS64,
    SatF64ToU64,

    // --- Float ---
    /// Round to integral; `None` uses FPCR.RMode.
    RoundF32(Option<RoundingMode>),
    RoundF64(Option<RoundingMode>),
    /// Integer (I64, sign-extended when the flag is set) to float under FPCR.RMode.
    IntToF32(bool),
    IntToF64(bool),
    /// Double to single under FPCR.RMode.
    NarrowF64ToF32,
    AbsF32,
    AbsF64,
    SqrtF32,
    SqrtF64,
    MaxF32,
    MaxF64,
    MinF32,
    MinF64,
    MaxNumF32,
    MaxNumF64,
    MinNumF32,
    MinNumF64,
    MulXF32,
    MulXF64,
    RecipStepF32,
    RecipStepF64,
    RsqrtStepF32,
    RsqrtStepF64,
    RecipExponentF32,
    RecipExponentF64,
    RecipEstimateF32,
    RecipEstimateF64,
    InvSqrtEstimateF32,
    InvSqrtEstimateF64,
    /// `a * b + c` with a single rounding.
    FusedMulAddF32,
    FusedMulAddF64,

    // --- Saturation to an element of `8 << size` bits ---
    SatSignedToSigned(u8),
    SatSignedToUnsigned(u8),
    SatUnsignedToSigned(u8),
    SatUnsignedToUnsigned(u8),
    SatAbsOrNeg64,
    SatSignedAdd64,
    SatSignedSub64,
    SatUnsignedAdd64,
    SatUnsignedSub64,
    SatSignedAcc64,
    SatUnsignedAcc64,

    // --- Shifts ---
    SignedShrImm { round: bool, esize: u8 },
    UnsignedShrImm { round: bool, esize: u8 },
    SignedShlReg { round: bool, size: u8 },
    UnsignedShlReg { round: bool, size: u8 },
    SignedShlRegSat { round: bool, size: u8 },
    UnsignedShlRegSat { round: bool, size: u8 },

    // --- Crypto ---
    Sha1HashChoose,
    Sha1HashMajority,
    Sha1HashParity,
    Sha1FixedRotate,
    Sha1SchedulePart1,
    Sha1SchedulePart2,
    Sha256HashLower,
    Sha256HashUpper,
    Sha256SchedulePart1,
    Sha256SchedulePart2,
    AesEncrypt,
    AesDecrypt,
    AesMixColumns,
    AesInvMixColumns,

    // --- Table lookup over 1..=4 registers: tables pushed first, indices last ---
    Tbl(u8),
}

const I32_1: &[Type] = &[Type::I32];
const I64_1: &[Type] = &[Type::I64];
const I64_2: &[Type] = &[Type::I64, Type::I64];
const I64_I32: &[Type] = &[Type::I64, Type::I32];
const F32_1: &[Type] = &[Type::F32];
const F64_1: &[Type] = &[Type::F64];
const F32_2: &[Type] = &[Type::F32, Type::F32];
const F64_2: &[Type] = &[Type::F64, Type::F64];
const F32_3: &[Type] = &[Type::F32, Type::F32, Type::F32];
const F64_3: &[Type] = &[Type::F64, Type::F64, Type::F64];
const V_1: &[Type] = &[Type::V128];
const V_2: &[Type] = &[Type::V128, Type::V128];
const V_3: &[Type] = &[Type::V128, Type::V128, Type::V128];
const V_4: &[Type] = &[Type::V128, Type::V128, Type::V128, Type::V128];
const V_5: &[Type] = &[Type::V128, Type::V128, Type::V128, Type::V128, Type::V128];
const V_I32_V: &[Type] = &[Type::V128, Type::I32, Type::V128];

impl Helper {
    /// Argument types in push order and the result type.
    pub fn signature(self) -> (&'static [Type], Type) {
        use Helper::*;
        match self {
            CountLeadingZeros(_) | CountLeadingSigns(_) | CountSetBits8 | ReverseBits8 | ReverseBits64
            | ReverseBytes16_64 | ReverseBytes32_64 | ReverseBytes64 | Abs => (I64_1, Type::I64),
            ReverseBits32 | ReverseBytes16_32 | ReverseBytes32_32 | Sha1FixedRotate => (I32_1, Type::I32),
            SMulHi128 | UMulHi128 | Max | Min | MaxUn | MinUn => (I64_2, Type::I64),
            Crc32(_) | Crc32c(_) => (&[Type::I32, Type::I64], Type::I32),

            SatF32ToS32 | SatF32ToU32 => (F32_1, Type::I32),
            SatF64ToS32 | SatF64ToU32 => (F64_1, Type::I32),
            SatF32ToS64 | SatF32ToU64 => (F32_1, Type::I64),
            SatF64ToS64 | SatF64ToU64 => (F64_1, Type::I64),

            RoundF32(_) | AbsF32 | SqrtF32 | RecipExponentF32 | RecipEstimateF32 | InvSqrtEstimateF32 => {
                (F32_1, Type::F32)
            }
            RoundF64(_) | AbsF64 | SqrtF64 | RecipExponentF64 | RecipEstimateF64 | InvSqrtEstimateF64 => {
                (F64_1, Type::F64)
            }
            MaxF32 | MinF32 | MaxNumF32 | MinNumF32 | MulXF32 | RecipStepF32 | RsqrtStepF32 => (F32_2, Type::F32),
            MaxF64 | MinF64 | MaxNumF64 | MinNumF64 | MulXF64 | RecipStepF64 | RsqrtStepF64 => (F64_2, Type::F64),
            IntToF32(_) => (I64_1, Type::F32),
            IntToF64(_) => (I64_1, Type::F64),
            NarrowF64ToF32 => (F64_1, Type::F32),
            FusedMulAddF32 => (F32_3, Type::F32),
            FusedMulAddF64 => (F64_3, Type::F64),

            SatSignedToSigned(_) | SatSignedToUnsigned(_) | SatUnsignedToSigned(_) | SatUnsignedToUnsigned(_)
            | SatAbsOrNeg64 => (I64_1, Type::I64),
            SatSignedAdd64 | SatSignedSub64 | SatUnsignedAdd64 | SatUnsignedSub64 | SatSignedAcc64
            | SatUnsignedAcc64 => (I64_2, Type::I64),

            SignedShrImm { .. } | UnsignedShrImm { .. } => (I64_I32, Type::I64),
            SignedShlReg { .. } | UnsignedShlReg { .. } | SignedShlRegSat { .. } | UnsignedShlRegSat { .. } => {
                (I64_2, Type::I64)
            }

            Sha1HashChoose | Sha1HashMajority | Sha1HashParity => (V_I32_V, Type::V128),
            Sha1SchedulePart1 | Sha256HashLower | Sha256HashUpper | Sha256SchedulePart2 => (V_3, Type::V128),
            Sha1SchedulePart2 | Sha256SchedulePart1 | AesEncrypt | AesDecrypt => (V_2, Type::V128),
            AesMixColumns | AesInvMixColumns => (V_1, Type::V128),

            Tbl(1) => (V_2, Type::V128),
            Tbl(2) => (V_3, Type::V128),
            Tbl(3) => (V_4, Type::V128),
            Tbl(4) => (V_5, Type::V128),
            Tbl(n) => panic!("Invalid table register count {}", n),
        }
    }

    /// Run the routine. `args` must already match `signature()`.
    pub fn invoke(self, args: &[Value], state: &mut dyn ProcessorState, tables: &EstimateTables) -> Value {
        use Helper::*;
        let i32_arg = |i: usize| match args[i] {
            Value::I32(v) => v,
            other => panic!("Invalid helper argument {} for {:?}", other, self),
        };
        let i64_arg = |i: usize| match args[i] {
            Value::I64(v) => v,
            other => panic!("Invalid helper argument {} for {:?}", other, self),
        };
        let f32_arg = |i: usize| match args[i] {
            Value::F32(v) => v,
            other => panic!("Invalid helper argument {} for {:?}", other, self),
        };
        let f64_arg = |i: usize| match args[i] {
            Value::F64(v) => v,
            other => panic!("Invalid helper argument {} for {:?}", other, self),
        };
        let v_arg = |i: usize| match args[i] {
            Value::V128(v) => v,
            other => panic!("Invalid helper argument {} for {:?}", other, self),
        };
        fn report(state: &mut dyn ProcessorState, (value, saturated): (u64, bool)) -> Value {
            if saturated {
                state.set_saturated();
            }
            Value::I64(value)
        }

        match self {
            CountLeadingZeros(size) => Value::I64(bits::count_leading_zeros(i64_arg(0), size as u32)),
            CountLeadingSigns(size) => Value::I64(bits::count_leading_signs(i64_arg(0), size as u32)),
            CountSetBits8 => Value::I64(bits::count_set_bits8(i64_arg(0))),
            ReverseBits8 => Value::I64(bits::reverse_bits8(i64_arg(0) as u32) as u64),
            ReverseBits32 => Value::I32(bits::reverse_bits32(i32_arg(0))),
            ReverseBits64 => Value::I64(bits::reverse_bits64(i64_arg(0))),
            ReverseBytes16_32 => Value::I32(bits::reverse_bytes16_32(i32_arg(0))),
            ReverseBytes32_32 => Value::I32(bits::reverse_bytes32_32(i32_arg(0))),
            ReverseBytes16_64 => Value::I64(bits::reverse_bytes16_64(i64_arg(0))),
            ReverseBytes32_64 => Value::I64(bits::reverse_bytes32_64(i64_arg(0))),
            ReverseBytes64 => Value::I64(bits::reverse_bytes64(i64_arg(0))),

            SMulHi128 => Value::I64(mul_hi::smul_hi128(i64_arg(0) as i64, i64_arg(1) as i64) as u64),
            UMulHi128 => Value::I64(mul_hi::umul_hi128(i64_arg(0), i64_arg(1))),
            Max => Value::I64((i64_arg(0) as i64).max(i64_arg(1) as i64) as u64),
            Min => Value::I64((i64_arg(0) as i64).min(i64_arg(1) as i64) as u64),
            MaxUn => Value::I64(i64_arg(0).max(i64_arg(1))),
            MinUn => Value::I64(i64_arg(0).min(i64_arg(1))),
            Abs => Value::I64((i64_arg(0) as i64).wrapping_abs() as u64),
            Crc32(size) => Value::I32(crc32::crc32_sized(false, i32_arg(0), i64_arg(1), size as usize)),
            Crc32c(size) => Value::I32(crc32::crc32_sized(true, i32_arg(0), i64_arg(1), size as usize)),

            SatF32ToS32 => Value::I32(saturate::sat_f32_to_s32(f32_arg(0)) as u32),
            SatF32ToU32 => Value::I32(saturate::sat_f32_to_u32(f32_arg(0))),
            SatF64ToS32 => Value::I32(saturate::sat_f64_to_s32(f64_arg(0)) as u32),
            SatF64ToU32 => Value::I32(saturate::sat_f64_to_u32(f64_arg(0))),
            SatF32ToS64 => Value::I64(saturate::sat_f32_to_s64(f32_arg(0)) as u64),
            SatF32ToU64 => Value::I64(saturate::sat_f32_to_u64(f32_arg(0))),
            SatF64ToS64 => Value::I64(saturate::sat_f64_to_s64(f64_arg(0)) as u64),
            SatF64ToU64 => Value::I64(saturate::sat_f64_to_u64(f64_arg(0))),

            RoundF32(mode) => {
                let mode = mode.unwrap_or_else(|| state.rounding_mode());
                Value::F32(fp::round_f32(f32_arg(0), mode))
            }
            RoundF64(mode) => {
                let mode = mode.unwrap_or_else(|| state.rounding_mode());
                Value::F64(fp::round_f64(f64_arg(0), mode))
            }
            IntToF32(signed) => Value::F32(fp::int_to_f32(i64_arg(0), signed, state.rounding_mode())),
            IntToF64(signed) => Value::F64(fp::int_to_f64(i64_arg(0), signed, state.rounding_mode())),
            NarrowF64ToF32 => Value::F32(fp::f64_to_f32(f64_arg(0), state.rounding_mode())),
            AbsF32 => Value::F32(f32_arg(0).abs()),
            AbsF64 => Value::F64(f64_arg(0).abs()),
            SqrtF32 => Value::F32(f32_arg(0).sqrt()),
            SqrtF64 => Value::F64(f64_arg(0).sqrt()),
            MaxF32 => Value::F32(fp::fp_max_f32(f32_arg(0), f32_arg(1))),
            MaxF64 => Value::F64(fp::fp_max(f64_arg(0), f64_arg(1))),
            MinF32 => Value::F32(fp::fp_min_f32(f32_arg(0), f32_arg(1))),
            MinF64 => Value::F64(fp::fp_min(f64_arg(0), f64_arg(1))),
            MaxNumF32 => Value::F32(fp::fp_max_num_f32(f32_arg(0), f32_arg(1))),
            MaxNumF64 => Value::F64(fp::fp_max_num(f64_arg(0), f64_arg(1))),
            MinNumF32 => Value::F32(fp::fp_min_num_f32(f32_arg(0), f32_arg(1))),
            MinNumF64 => Value::F64(fp::fp_min_num(f64_arg(0), f64_arg(1))),
            MulXF32 => Value::F32(fp::fp_mul_x_f32(f32_arg(0), f32_arg(1))),
            MulXF64 => Value::F64(fp::fp_mul_x(f64_arg(0), f64_arg(1))),
            RecipStepF32 => Value::F32(fp::fp_recip_step_fused_f32(f32_arg(0), f32_arg(1))),
            RecipStepF64 => Value::F64(fp::fp_recip_step_fused(f64_arg(0), f64_arg(1))),
            RsqrtStepF32 => Value::F32(fp::fp_rsqrt_step_fused_f32(f32_arg(0), f32_arg(1))),
            RsqrtStepF64 => Value::F64(fp::fp_rsqrt_step_fused(f64_arg(0), f64_arg(1))),
            RecipExponentF32 => Value::F32(fp::fp_recip_exponent_f32(f32_arg(0))),
            RecipExponentF64 => Value::F64(fp::fp_recip_exponent(f64_arg(0))),
            RecipEstimateF32 => Value::F32(tables.recip_estimate_f32(f32_arg(0))),
            RecipEstimateF64 => Value::F64(tables.recip_estimate(f64_arg(0))),
            InvSqrtEstimateF32 => Value::F32(tables.inv_sqrt_estimate_f32(f32_arg(0))),
            InvSqrtEstimateF64 => Value::F64(tables.inv_sqrt_estimate(f64_arg(0))),
            FusedMulAddF32 => Value::F32(f32_arg(0).mul_add(f32_arg(1), f32_arg(2))),
            FusedMulAddF64 => Value::F64(f64_arg(0).mul_add(f64_arg(1), f64_arg(2))),

            SatSignedToSigned(size) => {
                let (v, s) = saturate::signed_src_signed_dst(i64_arg(0) as i64, size as usize);
                report(state, (v as u64, s))
            }
            SatSignedToUnsigned(size) => report(state, saturate::signed_src_unsigned_dst(i64_arg(0) as i64, size as usize)),
            SatUnsignedToSigned(size) => {
                let (v, s) = saturate::unsigned_src_signed_dst(i64_arg(0), size as usize);
                report(state, (v as u64, s))
            }
            SatUnsignedToUnsigned(size) => report(state, saturate::unsigned_src_unsigned_dst(i64_arg(0), size as usize)),
            SatAbsOrNeg64 => {
                let (v, s) = saturate::unary_signed_abs_or_neg(i64_arg(0) as i64);
                report(state, (v as u64, s))
            }
            SatSignedAdd64 => {
                let (v, s) = saturate::binary_signed_add(i64_arg(0) as i64, i64_arg(1) as i64);
                report(state, (v as u64, s))
            }
            SatSignedSub64 => {
                let (v, s) = saturate::binary_signed_sub(i64_arg(0) as i64, i64_arg(1) as i64);
                report(state, (v as u64, s))
            }
            SatUnsignedAdd64 => report(state, saturate::binary_unsigned_add(i64_arg(0), i64_arg(1))),
            SatUnsignedSub64 => report(state, saturate::binary_unsigned_sub(i64_arg(0), i64_arg(1))),
            SatSignedAcc64 => {
                let (v, s) = saturate::binary_signed_acc(i64_arg(0), i64_arg(1) as i64);
                report(state, (v as u64, s))
            }
            SatUnsignedAcc64 => report(state, saturate::binary_unsigned_acc(i64_arg(0) as i64, i64_arg(1))),

            SignedShrImm { round, esize } => {
                Value::I64(shift::signed_shr(i64_arg(0) as i64, i32_arg(1), round, esize as u32) as u64)
            }
            UnsignedShrImm { round, esize } => {
                Value::I64(shift::unsigned_shr(i64_arg(0), i32_arg(1), round, esize as u32))
            }
            SignedShlReg { round, size } => {
                Value::I64(shift::signed_shl_reg(i64_arg(0) as i64, i64_arg(1) as i64, round, size as usize) as u64)
            }
            UnsignedShlReg { round, size } => {
                Value::I64(shift::unsigned_shl_reg(i64_arg(0), i64_arg(1), round, size as usize))
            }
            SignedShlRegSat { round, size } => {
                let (v, s) = shift::signed_shl_reg_sat(i64_arg(0) as i64, i64_arg(1) as i64, round, size as usize);
                report(state, (v as u64, s))
            }
            UnsignedShlRegSat { round, size } => {
                report(state, shift::unsigned_shl_reg_sat(i64_arg(0), i64_arg(1), round, size as usize))
            }

            Sha1HashChoose => Value::V128(sha::sha1_hash_choose(v_arg(0), i32_arg(1), v_arg(2))),
            Sha1HashMajority => Value::V128(sha::sha1_hash_majority(v_arg(0), i32_arg(1), v_arg(2))),
            Sha1HashParity => Value::V128(sha::sha1_hash_parity(v_arg(0), i32_arg(1), v_arg(2))),
            Sha1FixedRotate => Value::I32(sha::sha1_fixed_rotate(i32_arg(0))),
            Sha1SchedulePart1 => Value::V128(sha::sha1_schedule_part1(v_arg(0), v_arg(1), v_arg(2))),
            Sha1SchedulePart2 => Value::V128(sha::sha1_schedule_part2(v_arg(0), v_arg(1))),
            Sha256HashLower => Value::V128(sha::sha256_hash_lower(v_arg(0), v_arg(1), v_arg(2))),
            Sha256HashUpper => Value::V128(sha::sha256_hash_upper(v_arg(0), v_arg(1), v_arg(2))),
            Sha256SchedulePart1 => Value::V128(sha::sha256_schedule_part1(v_arg(0), v_arg(1))),
            Sha256SchedulePart2 => Value::V128(sha::sha256_schedule_part2(v_arg(0), v_arg(1), v_arg(2))),
            AesEncrypt => Value::V128(aes::encrypt(v_arg(0), v_arg(1))),
            AesDecrypt => Value::V128(aes::decrypt(v_arg(0), v_arg(1))),
            AesMixColumns => Value::V128(aes::mix_columns(v_arg(0))),
            AesInvMixColumns => Value::V128(aes::inv_mix_columns(v_arg(0))),

            Tbl(count) => {
                let count = count as usize;
                let tables: Vec<Vector128> = (0..count).map(|i| v_arg(i)).collect();
                Value::V128(table_lookup(&tables, v_arg(count)))
            }
        }
    }
}

/// TBL: each index byte selects from the concatenated tables, out of range reads 0.
pub fn table_lookup(tables: &[Vector128], indices: Vector128) -> Vector128 {
    let mut bytes = [0u8; 16];
    for (i, out) in bytes.iter_mut().enumerate() {
        let index = indices.byte(i) as usize;
        if index < tables.len() * 16 {
            *out = tables[index / 16].byte(index % 16);
        }
    }
    Vector128::from_bytes(bytes)
}
