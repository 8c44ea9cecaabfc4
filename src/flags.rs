//! Reference model of the NZCV condition flags.
//!
//! NZCV occupies bits 31:28 of the architectural register: N=31, Z=30, C=29,
//! V=28. The emitters compute flags in bytecode; the functions here are the
//! independent model those sequences are checked against.

/// NZCV mask (bits 31:28)
pub const NZCV_MASK: u32 = 0xF000_0000;

pub const N_FLAG_BIT: u32 = 31;
pub const Z_FLAG_BIT: u32 = 30;
pub const C_FLAG_BIT: u32 = 29;
pub const V_FLAG_BIT: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nzcv {
    pub n: bool,
    pub z: bool,
    pub c: bool,
    pub v: bool,
}

impl Nzcv {
    pub const fn new(n: bool, z: bool, c: bool, v: bool) -> Self {
        Self { n, z, c, v }
    }

    /// Pack into bits 31:28.
    pub fn to_bits(self) -> u32 {
        ((self.n as u32) << N_FLAG_BIT)
            | ((self.z as u32) << Z_FLAG_BIT)
            | ((self.c as u32) << C_FLAG_BIT)
            | ((self.v as u32) << V_FLAG_BIT)
    }

    /// Unpack from bits 31:28; other bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            n: bits & (1 << N_FLAG_BIT) != 0,
            z: bits & (1 << Z_FLAG_BIT) != 0,
            c: bits & (1 << C_FLAG_BIT) != 0,
            v: bits & (1 << V_FLAG_BIT) != 0,
        }
    }

    /// The 4-bit immediate form used by CCMP/CCMN/FCCMP.
    pub fn from_imm4(imm: u32) -> Self {
        Self::from_bits((imm & 0xF) << V_FLAG_BIT)
    }
}

fn mask(bits: u32) -> u64 {
    match bits {
        32 => u32::MAX as u64,
        64 => u64::MAX,
        _ => panic!("Invalid datasize {}", bits),
    }
}

fn sign_bit(value: u64, bits: u32) -> bool {
    (value >> (bits - 1)) & 1 != 0
}

/// AddWithCarry over a 32- or 64-bit datasize. Returns the truncated result and its flags.
pub fn add_with_carry(x: u64, y: u64, carry_in: bool, bits: u32) -> (u64, Nzcv) {
    let mask = mask(bits);
    let x = x & mask;
    let y = y & mask;
    let wide = x as u128 + y as u128 + carry_in as u128;
    let result = (wide as u64) & mask;
    let c = (wide >> bits) != 0;
    let v = sign_bit(!(x ^ y) & (x ^ result), bits);
    let nzcv = Nzcv {
        n: sign_bit(result, bits),
        z: result == 0,
        c,
        v,
    };
    (result, nzcv)
}

/// SUBS/CMP: `x - y` is `x + !y + 1`, so C means "no borrow".
pub fn sub_with_borrow(x: u64, y: u64, carry_in: bool, bits: u32) -> (u64, Nzcv) {
    add_with_carry(x, !y & mask(bits), carry_in, bits)
}

pub fn add(x: u64, y: u64, bits: u32) -> (u64, Nzcv) {
    add_with_carry(x, y, false, bits)
}

pub fn sub(x: u64, y: u64, bits: u32) -> (u64, Nzcv) {
    sub_with_borrow(x, y, true, bits)
}

/// ANDS/BICS/TST: N and Z from the result, C and V cleared.
pub fn logical(result: u64, bits: u32) -> Nzcv {
    let result = result & mask(bits);
    Nzcv {
        n: sign_bit(result, bits),
        z: result == 0,
        c: false,
        v: false,
    }
}

/// FCMP: unordered compares set C and V only.
pub fn fcmp(a: f64, b: f64) -> Nzcv {
    if a.is_nan() || b.is_nan() {
        Nzcv::new(false, false, true, true)
    } else if a == b {
        Nzcv::new(false, true, true, false)
    } else if a < b {
        Nzcv::new(true, false, false, false)
    } else {
        Nzcv::new(false, false, true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nzcv_round_trip() {
        for bits in 0u32..16 {
            let packed = bits << 28;
            assert_eq!(Nzcv::from_bits(packed).to_bits(), packed, "Round-trip failed for NZCV={:#x}", packed);
        }
        assert_eq!(Nzcv::from_bits(0x0FFF_FFFF), Nzcv::default());
    }

    #[test]
    fn test_nzcv_individual_flags() {
        assert!(Nzcv::from_bits(0x8000_0000).n);
        assert!(Nzcv::from_bits(0x4000_0000).z);
        assert!(Nzcv::from_bits(0x2000_0000).c);
        assert!(Nzcv::from_bits(0x1000_0000).v);
        assert_eq!(Nzcv::from_imm4(0b1010), Nzcv::new(true, false, true, false));
    }

    #[test]
    fn test_add_flags() {
        let (r, f) = add(0x7FFF_FFFF, 1, 32);
        assert_eq!(r, 0x8000_0000);
        assert_eq!(f, Nzcv::new(true, false, false, true));

        let (r, f) = add(u64::MAX, 1, 64);
        assert_eq!(r, 0);
        assert_eq!(f, Nzcv::new(false, true, true, false));
    }

    #[test]
    fn test_sub_flags() {
        let (r, f) = sub(5, 5, 64);
        assert_eq!(r, 0);
        assert_eq!(f, Nzcv::new(false, true, true, false));

        let (_, f) = sub(3, 5, 32);
        assert_eq!(f, Nzcv::new(true, false, false, false));

        let (_, f) = sub(0x8000_0000, 1, 32);
        assert_eq!(f, Nzcv::new(false, false, true, true));
    }

    #[test]
    fn test_logical_flags() {
        assert_eq!(logical(0, 64), Nzcv::new(false, true, false, false));
        assert_eq!(logical(0x8000_0000, 32), Nzcv::new(true, false, false, false));
        assert_eq!(logical(0x1_0000_0000, 32), Nzcv::new(false, true, false, false));
    }

    #[test]
    fn test_fcmp_flags() {
        assert_eq!(fcmp(f64::NAN, 1.0), Nzcv::new(false, false, true, true));
        assert_eq!(fcmp(1.0, 1.0), Nzcv::new(false, true, true, false));
        assert_eq!(fcmp(-1.0, 1.0), Nzcv::new(true, false, false, false));
        assert_eq!(fcmp(2.0, 1.0), Nzcv::new(false, false, true, false));
        assert_eq!(fcmp(-0.0, 0.0), Nzcv::new(false, true, true, false));
    }
}
