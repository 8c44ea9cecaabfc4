//! AES round building blocks on a 128-bit state (FIPS-197 byte order, byte 0
//! in the low lane, column-major).
//!
//! The S-boxes are derived at compile time from the GF(2^8) inverse and the
//! affine transform rather than transcribed.

use crate::vector::Vector128;

const fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= 0x1B;
        }
        b >>= 1;
    }
    product
}

const fn gf_inverse(a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    // a^254 == a^-1 in GF(2^8)
    let mut result = 1u8;
    let mut i = 0;
    while i < 254 {
        result = gf_mul(result, a);
        i += 1;
    }
    result
}

const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = gf_inverse(i as u8);
        sbox[i] = b ^ b.rotate_left(1) ^ b.rotate_left(2) ^ b.rotate_left(3) ^ b.rotate_left(4) ^ 0x63;
        i += 1;
    }
    sbox
}

const fn build_inv_sbox(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

pub static SBOX: [u8; 256] = build_sbox();
pub static INV_SBOX: [u8; 256] = build_inv_sbox(&SBOX);

pub fn sub_bytes(state: Vector128) -> Vector128 {
    Vector128::from_bytes(state.to_bytes().map(|b| SBOX[b as usize]))
}

pub fn inv_sub_bytes(state: Vector128) -> Vector128 {
    Vector128::from_bytes(state.to_bytes().map(|b| INV_SBOX[b as usize]))
}

pub fn shift_rows(state: Vector128) -> Vector128 {
    let s = state.to_bytes();
    let mut out = [0u8; 16];
    for c in 0..4 {
        for r in 0..4 {
            out[r + 4 * c] = s[r + 4 * ((c + r) % 4)];
        }
    }
    Vector128::from_bytes(out)
}

pub fn inv_shift_rows(state: Vector128) -> Vector128 {
    let s = state.to_bytes();
    let mut out = [0u8; 16];
    for c in 0..4 {
        for r in 0..4 {
            out[r + 4 * ((c + r) % 4)] = s[r + 4 * c];
        }
    }
    Vector128::from_bytes(out)
}

fn mix_with(state: Vector128, m: [u8; 4]) -> Vector128 {
    let s = state.to_bytes();
    let mut out = [0u8; 16];
    for c in 0..4 {
        let col = [s[4 * c], s[4 * c + 1], s[4 * c + 2], s[4 * c + 3]];
        for r in 0..4 {
            out[4 * c + r] = gf_mul(col[0], m[(4 - r) % 4])
                ^ gf_mul(col[1], m[(5 - r) % 4])
                ^ gf_mul(col[2], m[(6 - r) % 4])
                ^ gf_mul(col[3], m[(7 - r) % 4]);
        }
    }
    Vector128::from_bytes(out)
}

pub fn mix_columns(state: Vector128) -> Vector128 {
    mix_with(state, [2, 3, 1, 1])
}

pub fn inv_mix_columns(state: Vector128) -> Vector128 {
    mix_with(state, [14, 11, 13, 9])
}

/// AESE: AddRoundKey, then SubBytes and ShiftRows.
pub fn encrypt(value: Vector128, round_key: Vector128) -> Vector128 {
    sub_bytes(shift_rows(value ^ round_key))
}

/// AESD: AddRoundKey, then InvSubBytes and InvShiftRows.
pub fn decrypt(value: Vector128, round_key: Vector128) -> Vector128 {
    inv_sub_bytes(inv_shift_rows(value ^ round_key))
}
