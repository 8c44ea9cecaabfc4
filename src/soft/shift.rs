//! Per-lane shifts by a signed register amount, and rounding right shifts.
//!
//! Register shift amounts come from the signed low byte of the Rm lane:
//! negative shifts right, and any magnitude of at least the lane width
//! produces zero (or the sign fill for a non-rounding signed right shift).

use crate::soft::saturate;

fn esize(size: usize) -> u32 {
    if size > 3 {
        panic!("Invalid shift element size {}", size);
    }
    8 << size
}

/// Right shift of a sign-extended lane by `shift` in 1..=128.
pub fn signed_shr(value: i64, shift: u32, round: bool, esize: u32) -> i64 {
    if round {
        if shift >= 127 {
            return 0;
        }
        ((value as i128 + (1i128 << (shift - 1))) >> shift) as i64
    } else if shift >= esize {
        if value < 0 { -1 } else { 0 }
    } else {
        value >> shift
    }
}

/// Right shift of a zero-extended lane by `shift` in 1..=128.
pub fn unsigned_shr(value: u64, shift: u32, round: bool, esize: u32) -> u64 {
    if round {
        if shift > 64 {
            return 0;
        }
        ((value as u128 + (1u128 << (shift - 1))) >> shift) as u64
    } else if shift >= esize {
        0
    } else {
        value >> shift
    }
}

pub fn signed_shl_reg(value: i64, shift: i64, round: bool, size: usize) -> i64 {
    let esize = esize(size);
    let amount = shift as i8 as i32;
    if amount < 0 {
        signed_shr(value, amount.unsigned_abs(), round, esize)
    } else if amount > 0 {
        if amount as u32 >= esize {
            return 0;
        }
        value << amount
    } else {
        value
    }
}

pub fn unsigned_shl_reg(value: u64, shift: u64, round: bool, size: usize) -> u64 {
    let esize = esize(size);
    let amount = shift as i8 as i32;
    if amount < 0 {
        unsigned_shr(value, amount.unsigned_abs(), round, esize)
    } else if amount > 0 {
        if amount as u32 >= esize {
            return 0;
        }
        value << amount
    } else {
        value
    }
}

fn signed_sign_sat(op: i64, esize: u32) -> (i64, bool) {
    let max = if esize == 64 { i64::MAX } else { (1i64 << (esize - 1)) - 1 };
    let min = if esize == 64 { i64::MIN } else { -(1i64 << (esize - 1)) };
    match op {
        0 => (0, false),
        op if op > 0 => (max, true),
        _ => (min, true),
    }
}

fn unsigned_sign_sat(op: u64, esize: u32) -> (u64, bool) {
    if op == 0 {
        (0, false)
    } else {
        (u64::MAX >> (64 - esize), true)
    }
}

pub fn signed_shl_reg_sat(value: i64, shift: i64, round: bool, size: usize) -> (i64, bool) {
    let esize = esize(size);
    let amount = shift as i8 as i32;
    if amount < 0 {
        (signed_shr(value, amount.unsigned_abs(), round, esize), false)
    } else if amount > 0 {
        let amount = amount as u32;
        if amount >= esize {
            return signed_sign_sat(value, esize);
        }
        if esize == 64 {
            let shl = value << amount;
            if shl >> amount != value {
                signed_sign_sat(value, esize)
            } else {
                (shl, false)
            }
        } else {
            saturate::signed_src_signed_dst(value << amount, size)
        }
    } else {
        (value, false)
    }
}

pub fn unsigned_shl_reg_sat(value: u64, shift: u64, round: bool, size: usize) -> (u64, bool) {
    let esize = esize(size);
    let amount = shift as i8 as i32;
    if amount < 0 {
        (unsigned_shr(value, amount.unsigned_abs(), round, esize), false)
    } else if amount > 0 {
        let amount = amount as u32;
        if amount >= esize {
            return unsigned_sign_sat(value, esize);
        }
        if esize == 64 {
            let shl = value << amount;
            if shl >> amount != value {
                unsigned_sign_sat(value, esize)
            } else {
                (shl, false)
            }
        } else {
            saturate::unsigned_src_unsigned_dst(value << amount, size)
        }
    } else {
        (value, false)
    }
}
