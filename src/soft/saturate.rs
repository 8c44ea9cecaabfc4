//! Saturating numeric conversions and 64-bit saturating arithmetic.
//!
//! Integer routines return `(result, saturated)` in the style of the
//! `overflowing_*` methods; the caller turns `saturated` into a QC report.
//! Float-to-int conversions saturate silently and map NaN to zero.

// ---------------------------------------------------------------------------
// Float -> int (already rounded to integral; truncation toward zero for the rest)
// ---------------------------------------------------------------------------

pub fn sat_f32_to_s32(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    if value >= i32::MAX as f32 {
        i32::MAX
    } else if value <= i32::MIN as f32 {
        i32::MIN
    } else {
        value as i32
    }
}

pub fn sat_f32_to_s64(value: f32) -> i64 {
    if value.is_nan() {
        return 0;
    }
    if value >= i64::MAX as f32 {
        i64::MAX
    } else if value <= i64::MIN as f32 {
        i64::MIN
    } else {
        value as i64
    }
}

pub fn sat_f32_to_u32(value: f32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    if value >= u32::MAX as f32 {
        u32::MAX
    } else if value <= 0.0 {
        0
    } else {
        value as u32
    }
}

pub fn sat_f32_to_u64(value: f32) -> u64 {
    if value.is_nan() {
        return 0;
    }
    if value >= u64::MAX as f32 {
        u64::MAX
    } else if value <= 0.0 {
        0
    } else {
        value as u64
    }
}

pub fn sat_f64_to_s32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    if value >= i32::MAX as f64 {
        i32::MAX
    } else if value <= i32::MIN as f64 {
        i32::MIN
    } else {
        value as i32
    }
}

pub fn sat_f64_to_s64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    if value >= i64::MAX as f64 {
        i64::MAX
    } else if value <= i64::MIN as f64 {
        i64::MIN
    } else {
        value as i64
    }
}

pub fn sat_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    if value >= u32::MAX as f64 {
        u32::MAX
    } else if value <= 0.0 {
        0
    } else {
        value as u32
    }
}

pub fn sat_f64_to_u64(value: f64) -> u64 {
    if value.is_nan() {
        return 0;
    }
    if value >= u64::MAX as f64 {
        u64::MAX
    } else if value <= 0.0 {
        0
    } else {
        value as u64
    }
}

// ---------------------------------------------------------------------------
// Narrowing to an element of `8 << size` bits
// ---------------------------------------------------------------------------

fn signed_bounds(size: usize) -> (i64, i64) {
    if size > 3 {
        panic!("Invalid saturation size {}", size);
    }
    let bits = 8u32 << size;
    if bits == 64 {
        (i64::MIN, i64::MAX)
    } else {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    }
}

fn unsigned_max(size: usize) -> u64 {
    if size > 3 {
        panic!("Invalid saturation size {}", size);
    }
    let bits = 8u32 << size;
    if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

pub fn signed_src_signed_dst(op: i64, size: usize) -> (i64, bool) {
    let (min, max) = signed_bounds(size);
    if op > max {
        (max, true)
    } else if op < min {
        (min, true)
    } else {
        (op, false)
    }
}

pub fn signed_src_unsigned_dst(op: i64, size: usize) -> (u64, bool) {
    let max = unsigned_max(size);
    if op < 0 {
        (0, true)
    } else if op as u64 > max {
        (max, true)
    } else {
        (op as u64, false)
    }
}

pub fn unsigned_src_signed_dst(op: u64, size: usize) -> (i64, bool) {
    let (_, max) = signed_bounds(size);
    if op > max as u64 {
        (max, true)
    } else {
        (op as i64, false)
    }
}

pub fn unsigned_src_unsigned_dst(op: u64, size: usize) -> (u64, bool) {
    let max = unsigned_max(size);
    if op > max {
        (max, true)
    } else {
        (op, false)
    }
}

// ---------------------------------------------------------------------------
// 64-bit saturating arithmetic
// ---------------------------------------------------------------------------

/// Saturate the result of a 64-bit ABS or NEG: only `i64::MIN` can overflow.
pub fn unary_signed_abs_or_neg(op: i64) -> (i64, bool) {
    if op == i64::MIN {
        (i64::MAX, true)
    } else {
        (op, false)
    }
}

pub fn binary_signed_add(op1: i64, op2: i64) -> (i64, bool) {
    let (add, overflow) = op1.overflowing_add(op2);
    if overflow {
        (if op1 < 0 { i64::MIN } else { i64::MAX }, true)
    } else {
        (add, false)
    }
}

pub fn binary_unsigned_add(op1: u64, op2: u64) -> (u64, bool) {
    match op1.checked_add(op2) {
        Some(add) => (add, false),
        None => (u64::MAX, true),
    }
}

pub fn binary_signed_sub(op1: i64, op2: i64) -> (i64, bool) {
    let (sub, overflow) = op1.overflowing_sub(op2);
    if overflow {
        (if op1 < 0 { i64::MIN } else { i64::MAX }, true)
    } else {
        (sub, false)
    }
}

pub fn binary_unsigned_sub(op1: u64, op2: u64) -> (u64, bool) {
    match op1.checked_sub(op2) {
        Some(sub) => (sub, false),
        None => (0, true),
    }
}

/// SUQADD: unsigned `op1` accumulated into signed `op2`, saturating to the signed range.
pub fn binary_signed_acc(op1: u64, op2: i64) -> (i64, bool) {
    if op1 <= i64::MAX as u64 {
        let add = (op1 as i64).wrapping_add(op2);
        if (!op2 & add) < 0 {
            (i64::MAX, true)
        } else {
            (add, false)
        }
    } else if op2 >= 0 {
        (i64::MAX, true)
    } else {
        let add = op1.wrapping_add(op2 as u64);
        if add > i64::MAX as u64 {
            (i64::MAX, true)
        } else {
            (add as i64, false)
        }
    }
}

/// USQADD: signed `op1` accumulated into unsigned `op2`, saturating to the unsigned range.
pub fn binary_unsigned_acc(op1: i64, op2: u64) -> (u64, bool) {
    if op1 >= 0 {
        let add = (op1 as u64).wrapping_add(op2);
        if add < op1 as u64 && add < op2 {
            (u64::MAX, true)
        } else {
            (add, false)
        }
    } else if op2 > i64::MAX as u64 {
        ((op1 as u64).wrapping_add(op2), false)
    } else {
        let add = op1.wrapping_add(op2 as i64);
        if add < 0 {
            (0, true)
        } else {
            (add as u64, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_float_to_int_nan_is_zero() {
        assert_eq!(sat_f32_to_s32(f32::NAN), 0);
        assert_eq!(sat_f64_to_u64(f64::NAN), 0);
        assert_eq!(sat_f64_to_s64(-f64::NAN), 0);
    }

    #[test]
    fn test_float_to_int_clamps() {
        assert_eq!(sat_f32_to_s32(3.0e9), i32::MAX);
        assert_eq!(sat_f32_to_s32(-3.0e9), i32::MIN);
        assert_eq!(sat_f64_to_u32(-1.0), 0);
        assert_eq!(sat_f64_to_u32(5.0e9), u32::MAX);
        assert_eq!(sat_f64_to_s64(f64::INFINITY), i64::MAX);
        assert_eq!(sat_f32_to_u64(f32::NEG_INFINITY), 0);
    }

    #[test]
    fn test_float_to_int_exact_boundaries() {
        assert_eq!(sat_f64_to_s32(2147483647.0), i32::MAX);
        assert_eq!(sat_f64_to_s32(-2147483648.0), i32::MIN);
        assert_eq!(sat_f64_to_s32(2147483646.0), 2147483646);
        assert_eq!(sat_f64_to_u32(4294967295.0), u32::MAX);
        assert_eq!(sat_f64_to_u32(4294967294.0), 4294967294);
        assert_eq!(sat_f64_to_s32(-1.9), -1);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(signed_src_signed_dst(128, 0), (127, true));
        assert_eq!(signed_src_signed_dst(-129, 0), (-128, true));
        assert_eq!(signed_src_signed_dst(-128, 0), (-128, false));
        assert_eq!(signed_src_unsigned_dst(-1, 1), (0, true));
        assert_eq!(signed_src_unsigned_dst(70000, 1), (0xFFFF, true));
        assert_eq!(unsigned_src_signed_dst(0x8000_0000, 2), (0x7FFF_FFFF, true));
        assert_eq!(unsigned_src_unsigned_dst(256, 0), (255, true));
        assert_eq!(unsigned_src_unsigned_dst(255, 0), (255, false));
    }

    #[test]
    fn test_binary_64() {
        assert_eq!(binary_signed_add(i64::MAX, 1), (i64::MAX, true));
        assert_eq!(binary_signed_add(i64::MIN, -1), (i64::MIN, true));
        assert_eq!(binary_signed_sub(i64::MIN, 1), (i64::MIN, true));
        assert_eq!(binary_signed_sub(0, i64::MIN), (i64::MAX, true));
        assert_eq!(binary_unsigned_add(u64::MAX, 1), (u64::MAX, true));
        assert_eq!(binary_unsigned_sub(0, 1), (0, true));
        assert_eq!(unary_signed_abs_or_neg(i64::MIN), (i64::MAX, true));
    }

    proptest! {
        #[test]
        fn test_signed_acc_matches_wide(op1 in any::<u64>(), op2 in any::<i64>()) {
            let wide = op1 as i128 + op2 as i128;
            let expected = wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
            prop_assert_eq!(binary_signed_acc(op1, op2), (expected, wide != expected as i128));
        }

        #[test]
        fn test_unsigned_acc_matches_wide(op1 in any::<i64>(), op2 in any::<u64>()) {
            let wide = op1 as i128 + op2 as i128;
            let expected = wide.clamp(0, u64::MAX as i128) as u64;
            prop_assert_eq!(binary_unsigned_acc(op1, op2), (expected, wide != expected as i128));
        }

        #[test]
        fn test_signed_add_matches_wide(a in any::<i64>(), b in any::<i64>()) {
            let wide = a as i128 + b as i128;
            let expected = wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
            prop_assert_eq!(binary_signed_add(a, b), (expected, wide != expected as i128));
        }
    }
}
