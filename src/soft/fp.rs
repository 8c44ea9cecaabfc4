// Pure Rust implementations of ARM floating-point semantics that have no
// direct equivalent in Rust's IEEE operators: rounding by an explicit mode,
// FMAX/FMIN NaN and signed-zero rules, FMULX, the Newton step helpers,
// FRECPX and inexact conversions under FPCR.RMode.
//
// Single-precision entry points widen to f64 where that is exact.

use std::cmp::Ordering;

/// FPCR.RMode plus the ties-away mode used only by FRINTA/FCVTA*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    ToNearest,
    TowardsPlusInfinity,
    TowardsMinusInfinity,
    TowardsZero,
    TiesAway,
}

pub const FPCR_RMODE_SHIFT: u32 = 22;
pub const FPCR_RMODE_MASK: u32 = 0b11 << FPCR_RMODE_SHIFT;

impl RoundingMode {
    pub fn from_fpcr(fpcr: u32) -> Self {
        match (fpcr >> FPCR_RMODE_SHIFT) & 0b11 {
            0 => RoundingMode::ToNearest,
            1 => RoundingMode::TowardsPlusInfinity,
            2 => RoundingMode::TowardsMinusInfinity,
            _ => RoundingMode::TowardsZero,
        }
    }

    /// FPCR.RMode encoding. `TiesAway` has none.
    pub fn fpcr_bits(self) -> Option<u32> {
        match self {
            RoundingMode::ToNearest => Some(0),
            RoundingMode::TowardsPlusInfinity => Some(1 << FPCR_RMODE_SHIFT),
            RoundingMode::TowardsMinusInfinity => Some(2 << FPCR_RMODE_SHIFT),
            RoundingMode::TowardsZero => Some(3 << FPCR_RMODE_SHIFT),
            RoundingMode::TiesAway => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Round to integral
// ---------------------------------------------------------------------------

pub fn round_f64(value: f64, mode: RoundingMode) -> f64 {
    match mode {
        RoundingMode::ToNearest => value.round_ties_even(),
        RoundingMode::TowardsPlusInfinity => value.ceil(),
        RoundingMode::TowardsMinusInfinity => value.floor(),
        RoundingMode::TowardsZero => value.trunc(),
        RoundingMode::TiesAway => value.round(),
    }
}

pub fn round_f32(value: f32, mode: RoundingMode) -> f32 {
    match mode {
        RoundingMode::ToNearest => value.round_ties_even(),
        RoundingMode::TowardsPlusInfinity => value.ceil(),
        RoundingMode::TowardsMinusInfinity => value.floor(),
        RoundingMode::TowardsZero => value.trunc(),
        RoundingMode::TiesAway => value.round(),
    }
}

// ---------------------------------------------------------------------------
// NaN handling
// ---------------------------------------------------------------------------

const F64_QUIET_BIT: u64 = 1 << 51;

fn is_snan(value: f64) -> bool {
    value.is_nan() && value.to_bits() & F64_QUIET_BIT == 0
}

fn quiet(value: f64) -> f64 {
    f64::from_bits(value.to_bits() | F64_QUIET_BIT)
}

/// FPProcessNaNs: signalling operands win over quiet ones, then operand order.
pub fn process_nans(a: f64, b: f64) -> Option<f64> {
    if is_snan(a) {
        Some(quiet(a))
    } else if is_snan(b) {
        Some(quiet(b))
    } else if a.is_nan() {
        Some(a)
    } else if b.is_nan() {
        Some(b)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// FMAX / FMIN / FMAXNM / FMINNM
// ---------------------------------------------------------------------------

pub fn fp_max(a: f64, b: f64) -> f64 {
    if let Some(nan) = process_nans(a, b) {
        return nan;
    }
    if a == 0.0 && b == 0.0 {
        // +0 beats -0
        return if a.is_sign_negative() && b.is_sign_negative() { -0.0 } else { 0.0 };
    }
    if a > b { a } else { b }
}

pub fn fp_min(a: f64, b: f64) -> f64 {
    if let Some(nan) = process_nans(a, b) {
        return nan;
    }
    if a == 0.0 && b == 0.0 {
        return if a.is_sign_negative() || b.is_sign_negative() { -0.0 } else { 0.0 };
    }
    if a < b { a } else { b }
}

fn is_qnan(value: f64) -> bool {
    value.is_nan() && !is_snan(value)
}

pub fn fp_max_num(mut a: f64, mut b: f64) -> f64 {
    if is_qnan(a) && !is_qnan(b) {
        a = f64::NEG_INFINITY;
    } else if !is_qnan(a) && is_qnan(b) {
        b = f64::NEG_INFINITY;
    }
    fp_max(a, b)
}

pub fn fp_min_num(mut a: f64, mut b: f64) -> f64 {
    if is_qnan(a) && !is_qnan(b) {
        a = f64::INFINITY;
    } else if !is_qnan(a) && is_qnan(b) {
        b = f64::INFINITY;
    }
    fp_min(a, b)
}

fn narrow(value: f64) -> f32 {
    value as f32
}

pub fn fp_max_f32(a: f32, b: f32) -> f32 {
    narrow(fp_max(a as f64, b as f64))
}

pub fn fp_min_f32(a: f32, b: f32) -> f32 {
    narrow(fp_min(a as f64, b as f64))
}

pub fn fp_max_num_f32(a: f32, b: f32) -> f32 {
    narrow(fp_max_num(a as f64, b as f64))
}

pub fn fp_min_num_f32(a: f32, b: f32) -> f32 {
    narrow(fp_min_num(a as f64, b as f64))
}

// ---------------------------------------------------------------------------
// FMULX and Newton-Raphson steps
// ---------------------------------------------------------------------------

fn zero_times_infinity(a: f64, b: f64) -> bool {
    (a == 0.0 && b.is_infinite()) || (a.is_infinite() && b == 0.0)
}

/// FMULX: like multiply, but ±0 × ±∞ = ±2.0 instead of NaN.
pub fn fp_mul_x(a: f64, b: f64) -> f64 {
    if let Some(nan) = process_nans(a, b) {
        return nan;
    }
    if zero_times_infinity(a, b) {
        let negative = a.is_sign_negative() != b.is_sign_negative();
        return if negative { -2.0 } else { 2.0 };
    }
    a * b
}

pub fn fp_mul_x_f32(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        return narrow(fp_mul_x(a as f64, b as f64));
    }
    if zero_times_infinity(a as f64, b as f64) {
        return narrow(fp_mul_x(a as f64, b as f64));
    }
    a * b
}

/// FRECPS: 2.0 - a*b with a single rounding.
pub fn fp_recip_step_fused(a: f64, b: f64) -> f64 {
    if let Some(nan) = process_nans(a, b) {
        return nan;
    }
    if zero_times_infinity(a, b) {
        return 2.0;
    }
    (-a).mul_add(b, 2.0)
}

pub fn fp_recip_step_fused_f32(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        return narrow(fp_recip_step_fused(a as f64, b as f64));
    }
    if zero_times_infinity(a as f64, b as f64) {
        return 2.0;
    }
    (-a).mul_add(b, 2.0)
}

/// FRSQRTS: (3.0 - a*b) / 2 with a single rounding of the product-sum.
pub fn fp_rsqrt_step_fused(a: f64, b: f64) -> f64 {
    if let Some(nan) = process_nans(a, b) {
        return nan;
    }
    if zero_times_infinity(a, b) {
        return 1.5;
    }
    (-a).mul_add(b, 3.0) / 2.0
}

pub fn fp_rsqrt_step_fused_f32(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        return narrow(fp_rsqrt_step_fused(a as f64, b as f64));
    }
    if zero_times_infinity(a as f64, b as f64) {
        return 1.5;
    }
    (-a).mul_add(b, 3.0) / 2.0
}

/// FRECPX: keep the sign, invert the exponent, clear the fraction.
pub fn fp_recip_exponent(value: f64) -> f64 {
    if value.is_nan() {
        return quiet(value);
    }
    let bits = value.to_bits();
    let not_exp = (!bits >> 52) & 0x7FF;
    let exp = if not_exp == 0x7FF { 0x7FE } else { not_exp };
    f64::from_bits((bits & (1 << 63)) | (exp << 52))
}

pub fn fp_recip_exponent_f32(value: f32) -> f32 {
    if value.is_nan() {
        return f32::from_bits(value.to_bits() | 0x0040_0000);
    }
    let bits = value.to_bits();
    let not_exp = (!bits >> 23) & 0xFF;
    let exp = if not_exp == 0xFF { 0xFE } else { not_exp };
    f32::from_bits((bits & (1 << 31)) | (exp << 23))
}

// ---------------------------------------------------------------------------
// Conversions under a rounding mode
// ---------------------------------------------------------------------------

// Rust's `as` rounds to nearest even. Directed modes move that result one
// ulp when it lands on the wrong side of the exact value.
fn directed_step(mode: RoundingMode, nearest_vs_exact: Ordering, negative: bool) -> Option<bool> {
    match (mode, nearest_vs_exact) {
        (RoundingMode::TowardsPlusInfinity, Ordering::Less) => Some(true),
        (RoundingMode::TowardsMinusInfinity, Ordering::Greater) => Some(false),
        (RoundingMode::TowardsZero, Ordering::Greater) if !negative => Some(false),
        (RoundingMode::TowardsZero, Ordering::Less) if negative => Some(true),
        _ => None,
    }
}

/// Next representable value above (`up`) or below. Infinities step to MAX.
fn step_f64(value: f64, up: bool) -> f64 {
    if value == 0.0 {
        let tiny = f64::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = value.to_bits();
    f64::from_bits(if (value > 0.0) == up { bits + 1 } else { bits - 1 })
}

fn step_f32(value: f32, up: bool) -> f32 {
    if value == 0.0 {
        let tiny = f32::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = value.to_bits();
    f32::from_bits(if (value > 0.0) == up { bits + 1 } else { bits - 1 })
}

fn int_value(value: u64, signed: bool) -> i128 {
    if signed {
        value as i64 as i128
    } else {
        value as i128
    }
}

/// SCVTF/UCVTF to double. `signed` reads `value` as two's complement.
pub fn int_to_f64(value: u64, signed: bool, mode: RoundingMode) -> f64 {
    let exact = int_value(value, signed);
    let nearest = if signed { value as i64 as f64 } else { value as f64 };
    match directed_step(mode, (nearest as i128).cmp(&exact), exact < 0) {
        Some(up) => step_f64(nearest, up),
        None => nearest,
    }
}

pub fn int_to_f32(value: u64, signed: bool, mode: RoundingMode) -> f32 {
    let exact = int_value(value, signed);
    let nearest = if signed { value as i64 as f32 } else { value as f32 };
    match directed_step(mode, (nearest as i128).cmp(&exact), exact < 0) {
        Some(up) => step_f32(nearest, up),
        None => nearest,
    }
}

/// FCVT double to single. Overflow saturates to MAX in the modes that
/// never round away from zero on that side.
pub fn f64_to_f32(value: f64, mode: RoundingMode) -> f32 {
    if value.is_nan() {
        return f32::from_bits((value as f32).to_bits() | 0x0040_0000);
    }
    let nearest = value as f32;
    let order = (nearest as f64).partial_cmp(&value).unwrap_or(Ordering::Equal);
    match directed_step(mode, order, value < 0.0) {
        Some(up) => step_f32(nearest, up),
        None => nearest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_modes() {
        assert_eq!(round_f64(2.5, RoundingMode::ToNearest), 2.0);
        assert_eq!(round_f64(3.5, RoundingMode::ToNearest), 4.0);
        assert_eq!(round_f64(2.5, RoundingMode::TiesAway), 3.0);
        assert_eq!(round_f64(-2.5, RoundingMode::TiesAway), -3.0);
        assert_eq!(round_f64(-1.2, RoundingMode::TowardsPlusInfinity), -1.0);
        assert_eq!(round_f64(-1.2, RoundingMode::TowardsMinusInfinity), -2.0);
        assert_eq!(round_f32(-1.7, RoundingMode::TowardsZero), -1.0);
    }

    #[test]
    fn test_rounding_mode_fpcr_round_trip() {
        for mode in [
            RoundingMode::ToNearest,
            RoundingMode::TowardsPlusInfinity,
            RoundingMode::TowardsMinusInfinity,
            RoundingMode::TowardsZero,
        ] {
            let bits = mode.fpcr_bits().unwrap();
            assert_eq!(RoundingMode::from_fpcr(bits | 0x0300_0000), mode);
        }
        assert_eq!(RoundingMode::TiesAway.fpcr_bits(), None);
    }

    #[test]
    fn test_max_min_signed_zero() {
        assert!(fp_max(-0.0, 0.0).is_sign_positive());
        assert!(fp_max(0.0, -0.0).is_sign_positive());
        assert!(fp_min(-0.0, 0.0).is_sign_negative());
        assert!(fp_min(0.0, -0.0).is_sign_negative());
    }

    #[test]
    fn test_max_min_nan_propagation() {
        assert!(fp_max(f64::NAN, 1.0).is_nan());
        assert!(fp_min(1.0, f64::NAN).is_nan());
        assert_eq!(fp_max_num(f64::NAN, 1.0), 1.0);
        assert_eq!(fp_min_num(-3.0, f64::NAN), -3.0);
        let snan = f64::from_bits(0x7FF0_0000_0000_0001);
        assert!(fp_max_num(snan, 1.0).is_nan());
        assert_eq!(fp_max_num_f32(f32::NAN, 2.0), 2.0);
    }

    #[test]
    fn test_mul_x_zero_times_infinity() {
        assert_eq!(fp_mul_x(0.0, f64::INFINITY), 2.0);
        assert_eq!(fp_mul_x(-0.0, f64::INFINITY), -2.0);
        assert_eq!(fp_mul_x_f32(f32::NEG_INFINITY, 0.0), -2.0);
        assert_eq!(fp_mul_x(3.0, 2.0), 6.0);
    }

    #[test]
    fn test_step_helpers() {
        assert_eq!(fp_recip_step_fused(0.0, f64::INFINITY), 2.0);
        assert_eq!(fp_recip_step_fused(0.5, 2.0), 1.0);
        assert_eq!(fp_rsqrt_step_fused_f32(f32::INFINITY, 0.0), 1.5);
        assert_eq!(fp_rsqrt_step_fused(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_recip_exponent() {
        assert_eq!(fp_recip_exponent(1.0), 2.0);
        assert_eq!(fp_recip_exponent(-4.0), -0.5);
        assert_eq!(fp_recip_exponent_f32(-0.0).to_bits(), 0x8000_0000 | (0xFE << 23));
    }

    #[test]
    fn test_int_to_float_directed() {
        let big = (1u64 << 53) + 1;
        let two53 = 9007199254740992.0;
        assert_eq!(int_to_f64(big, true, RoundingMode::ToNearest), two53);
        assert_eq!(int_to_f64(big, true, RoundingMode::TowardsPlusInfinity), two53 + 2.0);
        assert_eq!(int_to_f64(big, true, RoundingMode::TowardsMinusInfinity), two53);
        assert_eq!(int_to_f64(big, true, RoundingMode::TowardsZero), two53);

        let neg = big.wrapping_neg();
        assert_eq!(int_to_f64(neg, true, RoundingMode::TowardsPlusInfinity), -two53);
        assert_eq!(int_to_f64(neg, true, RoundingMode::TowardsMinusInfinity), -two53 - 2.0);
        assert_eq!(int_to_f64(neg, true, RoundingMode::TowardsZero), -two53);

        // Largest double below 2^64
        assert_eq!(int_to_f64(u64::MAX, false, RoundingMode::ToNearest), 18446744073709551616.0);
        assert_eq!(int_to_f64(u64::MAX, false, RoundingMode::TowardsZero), 18446744073709549568.0);
        assert_eq!(int_to_f32(u64::MAX, false, RoundingMode::TowardsZero), f32::from_bits(0x5F7F_FFFF));

        assert_eq!(int_to_f32((1 << 24) + 1, true, RoundingMode::TowardsPlusInfinity), 16777218.0);
        assert_eq!(int_to_f32((1 << 24) + 1, true, RoundingMode::ToNearest), 16777216.0);
        assert_eq!(int_to_f32(12345, false, RoundingMode::TowardsMinusInfinity), 12345.0);
        assert_eq!(int_to_f32(0, true, RoundingMode::TowardsMinusInfinity), 0.0);
    }

    #[test]
    fn test_double_to_single_directed() {
        let ulp = f32::EPSILON as f64;
        let above = 1.0 + 0.75 * ulp;
        assert_eq!(f64_to_f32(above, RoundingMode::ToNearest), 1.0 + f32::EPSILON);
        assert_eq!(f64_to_f32(above, RoundingMode::TowardsPlusInfinity), 1.0 + f32::EPSILON);
        assert_eq!(f64_to_f32(above, RoundingMode::TowardsMinusInfinity), 1.0);
        assert_eq!(f64_to_f32(above, RoundingMode::TowardsZero), 1.0);

        let below = -(1.0 + 0.25 * ulp);
        assert_eq!(f64_to_f32(below, RoundingMode::ToNearest), -1.0);
        assert_eq!(f64_to_f32(below, RoundingMode::TowardsMinusInfinity), -1.0 - f32::EPSILON);
        assert_eq!(f64_to_f32(below, RoundingMode::TowardsZero), -1.0);

        assert_eq!(f64_to_f32(f64::MAX, RoundingMode::ToNearest), f32::INFINITY);
        assert_eq!(f64_to_f32(f64::MAX, RoundingMode::TowardsZero), f32::MAX);
        assert_eq!(f64_to_f32(f64::MAX, RoundingMode::TowardsMinusInfinity), f32::MAX);
        assert_eq!(f64_to_f32(-f64::MAX, RoundingMode::TowardsPlusInfinity), -f32::MAX);
        assert_eq!(f64_to_f32(f64::INFINITY, RoundingMode::TowardsZero), f32::INFINITY);

        assert_eq!(f64_to_f32(1e-300, RoundingMode::ToNearest), 0.0);
        assert_eq!(f64_to_f32(1e-300, RoundingMode::TowardsPlusInfinity), f32::from_bits(1));
        assert_eq!(f64_to_f32(-1e-300, RoundingMode::TowardsMinusInfinity), -f32::from_bits(1));
        assert!(f64_to_f32(f64::NAN, RoundingMode::TowardsZero).is_nan());
    }
}
