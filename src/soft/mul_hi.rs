//! High 64 bits of a 64x64 -> 128-bit multiply, built from 32-bit partial products.

pub fn umul_hi128(left: u64, right: u64) -> u64 {
    let l_high = left >> 32;
    let l_low = left & 0xFFFF_FFFF;
    let r_high = right >> 32;
    let r_low = right & 0xFFFF_FFFF;

    let z2 = l_low * r_low;
    let t = l_high * r_low + (z2 >> 32);
    let mut z1 = t & 0xFFFF_FFFF;
    let z0 = t >> 32;

    z1 += l_low * r_high;

    l_high * r_high + z0 + (z1 >> 32)
}

/// Signed variant: unsigned high product corrected for negative operands.
pub fn smul_hi128(left: i64, right: i64) -> i64 {
    let mut result = umul_hi128(left as u64, right as u64) as i64;
    if left < 0 {
        result = result.wrapping_sub(right);
    }
    if right < 0 {
        result = result.wrapping_sub(left);
    }
    result
}
