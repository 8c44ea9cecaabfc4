//! 128-bit SIMD&FP register value and typed lane access.
//!
//! A `Vector128` is a plain `Copy` value. Lane operations never mutate in
//! place; `insert_*` returns the updated vector, so a permute can assemble its
//! result in a local without touching the register it is still reading from.
//!
//! Integer lanes are addressed by `size` (0 = byte .. 3 = doubleword), giving
//! `16 >> size` lanes. Float lanes are addressed by `size_f` (0 = single,
//! 1 = double), giving `4 >> size_f` lanes. Out-of-range sizes or indices are
//! decoder/dispatch defects and panic.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector128(u128);

impl Vector128 {
    pub const ZERO: Vector128 = Vector128(0);

    pub const fn new(lo: u64, hi: u64) -> Self {
        Self(((hi as u128) << 64) | lo as u128)
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }

    pub const fn lo(self) -> u64 {
        self.0 as u64
    }

    pub const fn hi(self) -> u64 {
        (self.0 >> 64) as u64
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_le_bytes(bytes))
    }

    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }

    pub fn from_u32_lanes(lanes: [u32; 4]) -> Self {
        let mut v = Self::ZERO;
        for (i, lane) in lanes.iter().enumerate() {
            v = v.insert_int(i, 2, *lane as u64);
        }
        v
    }

    pub fn to_u32_lanes(self) -> [u32; 4] {
        [0, 1, 2, 3].map(|i| self.extract_int(i, 2, false) as u32)
    }

    /// Number of integer lanes for the given element size.
    pub fn lane_count(size: usize) -> usize {
        check_size(size);
        16 >> size
    }

    /// Extract integer lane `index` of `8 << size` bits, sign- or zero-extended to 64 bits.
    pub fn extract_int(self, index: usize, size: usize, signed: bool) -> u64 {
        check_index(index, size);
        let bits = 8usize << size;
        let raw = (self.0 >> (index * bits)) as u64;
        if bits == 64 {
            return raw;
        }
        let mask = (1u64 << bits) - 1;
        let value = raw & mask;
        if signed {
            let shift = 64 - bits;
            (((value << shift) as i64) >> shift) as u64
        } else {
            value
        }
    }

    /// Return a copy with integer lane `index` replaced by the low `8 << size` bits of `value`.
    pub fn insert_int(self, index: usize, size: usize, value: u64) -> Self {
        check_index(index, size);
        let bits = 8usize << size;
        let lane_mask: u128 = if bits == 64 { u64::MAX as u128 } else { ((1u128 << bits) - 1) as u128 };
        let shift = index * bits;
        let cleared = self.0 & !(lane_mask << shift);
        Self(cleared | (((value as u128) & lane_mask) << shift))
    }

    pub fn extract_f32(self, index: usize) -> f32 {
        check_float_index(index, 0);
        f32::from_bits(self.extract_int(index, 2, false) as u32)
    }

    pub fn extract_f64(self, index: usize) -> f64 {
        check_float_index(index, 1);
        f64::from_bits(self.extract_int(index, 3, false))
    }

    pub fn insert_f32(self, index: usize, value: f32) -> Self {
        check_float_index(index, 0);
        self.insert_int(index, 2, value.to_bits() as u64)
    }

    pub fn insert_f64(self, index: usize, value: f64) -> Self {
        check_float_index(index, 1);
        self.insert_int(index, 3, value.to_bits())
    }

    /// Clear bits 127:64, as required after writing a 64-bit (narrow) register form.
    pub const fn zero_upper(self) -> Self {
        Self(self.0 & u64::MAX as u128)
    }

    pub fn byte(self, index: usize) -> u8 {
        self.extract_int(index, 0, false) as u8
    }
}

fn check_size(size: usize) {
    if size > 3 {
        panic!("Invalid vector element size {}", size);
    }
}

fn check_index(index: usize, size: usize) {
    check_size(size);
    if index >= 16 >> size {
        panic!("Invalid vector lane index {} for element size {}", index, size);
    }
}

fn check_float_index(index: usize, size_f: usize) {
    if size_f > 1 {
        panic!("Invalid vector float size {}", size_f);
    }
    if index >= 4 >> size_f {
        panic!("Invalid vector float lane index {} for size {}", index, size_f);
    }
}

impl BitAnd for Vector128 {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Vector128 {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitXor for Vector128 {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for Vector128 {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for Vector128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector128({:#018x}:{:016x})", self.hi(), self.lo())
    }
}

impl fmt::Display for Vector128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi(), self.lo())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_insert_each_size() {
        let v = Vector128::new(0x8877_6655_4433_2211, 0xFFEE_DDCC_BBAA_0099);
        assert_eq!(v.extract_int(0, 0, false), 0x11);
        assert_eq!(v.extract_int(15, 0, false), 0xFF);
        assert_eq!(v.extract_int(15, 0, true), u64::MAX);
        assert_eq!(v.extract_int(3, 1, false), 0x8877);
        assert_eq!(v.extract_int(3, 1, true), 0xFFFF_FFFF_FFFF_8877);
        assert_eq!(v.extract_int(1, 2, false), 0x8877_6655);
        assert_eq!(v.extract_int(1, 3, false), 0xFFEE_DDCC_BBAA_0099);

        let w = v.insert_int(2, 1, 0x1234_5678);
        assert_eq!(w.extract_int(2, 1, false), 0x5678);
        assert_eq!(w.extract_int(1, 1, false), 0x4433);
        assert_eq!(w.hi(), v.hi());
    }

    #[test]
    fn test_float_lanes() {
        let v = Vector128::ZERO.insert_f32(3, -1.5).insert_f64(0, 2.25);
        assert_eq!(v.extract_f32(3), -1.5);
        assert_eq!(v.extract_f64(0), 2.25);
        assert_eq!(v.extract_f32(2), 0.0);
    }

    #[test]
    fn test_zero_upper() {
        let v = Vector128::new(1, 2).zero_upper();
        assert_eq!(v, Vector128::new(1, 0));
    }

    #[test]
    fn test_u32_lane_helpers() {
        let v = Vector128::from_u32_lanes([1, 2, 3, 4]);
        assert_eq!(v.to_u32_lanes(), [1, 2, 3, 4]);
        assert_eq!(v.lo(), 0x0000_0002_0000_0001);
    }

    #[test]
    #[should_panic(expected = "Invalid vector lane index")]
    fn test_lane_index_out_of_range() {
        Vector128::ZERO.extract_int(8, 1, false);
    }

    #[test]
    #[should_panic(expected = "Invalid vector float lane index")]
    fn test_float_index_out_of_range() {
        Vector128::ZERO.extract_f64(2);
    }

    #[test]
    #[should_panic(expected = "Invalid vector element size")]
    fn test_size_out_of_range() {
        Vector128::ZERO.insert_int(0, 4, 0);
    }
}
