//! SHA-1 and SHA-256 four-round and message-schedule primitives, as used by
//! the SHA1C/P/M/H/SU0/SU1 and SHA256H/H2/SU0/SU1 instructions.
//!
//! Vectors hold four 32-bit words with word 0 in the low lane.

use crate::vector::Vector128;

#[inline]
fn sha_choose(x: u32, y: u32, z: u32) -> u32 {
    ((y ^ z) & x) ^ z
}

#[inline]
fn sha_majority(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | ((x | y) & z)
}

#[inline]
fn sha_parity(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

// ---------------------------------------------------------------------------
// SHA-1
// ---------------------------------------------------------------------------

fn sha1_hash(abcd: Vector128, mut e: u32, wk: Vector128, f: fn(u32, u32, u32) -> u32) -> Vector128 {
    let mut x = abcd.to_u32_lanes();
    let w = wk.to_u32_lanes();
    for &wk_e in &w {
        let t = f(x[1], x[2], x[3]);
        e = e.wrapping_add(x[0].rotate_left(5)).wrapping_add(t).wrapping_add(wk_e);
        x[1] = x[1].rotate_left(30);
        // rotate the 160-bit Y:X right by one word: new X = [e, x0, x1, x2], new Y = x3
        let x3 = x[3];
        x = [e, x[0], x[1], x[2]];
        e = x3;
    }
    Vector128::from_u32_lanes(x)
}

pub fn sha1_hash_choose(abcd: Vector128, e: u32, wk: Vector128) -> Vector128 {
    sha1_hash(abcd, e, wk, sha_choose)
}

pub fn sha1_hash_majority(abcd: Vector128, e: u32, wk: Vector128) -> Vector128 {
    sha1_hash(abcd, e, wk, sha_majority)
}

pub fn sha1_hash_parity(abcd: Vector128, e: u32, wk: Vector128) -> Vector128 {
    sha1_hash(abcd, e, wk, sha_parity)
}

/// SHA1H
pub fn sha1_fixed_rotate(e: u32) -> u32 {
    e.rotate_left(30)
}

/// SHA1SU0
pub fn sha1_schedule_part1(w0_3: Vector128, w4_7: Vector128, w8_11: Vector128) -> Vector128 {
    Vector128::new(w0_3.hi(), w4_7.lo()) ^ w0_3 ^ w8_11
}

/// SHA1SU1
pub fn sha1_schedule_part2(tw0_3: Vector128, w12_15: Vector128) -> Vector128 {
    let t = (tw0_3 ^ Vector128::from_u128(w12_15.as_u128() >> 32)).to_u32_lanes();
    let tw0 = t[0].rotate_left(1);
    let tw1 = t[1].rotate_left(1);
    let tw2 = t[2].rotate_left(1);
    let tw3 = t[3].rotate_left(1) ^ t[0].rotate_left(2);
    Vector128::from_u32_lanes([tw0, tw1, tw2, tw3])
}

// ---------------------------------------------------------------------------
// SHA-256
// ---------------------------------------------------------------------------

#[inline]
fn sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline]
fn sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

fn sha256_hash(abcd: Vector128, efgh: Vector128, wk: Vector128, part1: bool) -> Vector128 {
    let mut x = abcd.to_u32_lanes();
    let mut y = efgh.to_u32_lanes();
    let w = wk.to_u32_lanes();
    for &wk_e in &w {
        let chs = sha_choose(y[0], y[1], y[2]);
        let maj = sha_majority(x[0], x[1], x[2]);
        let t1 = y[3].wrapping_add(sigma1(y[0])).wrapping_add(chs).wrapping_add(wk_e);
        x[3] = t1.wrapping_add(x[3]);
        y[3] = t1.wrapping_add(sigma0(x[0])).wrapping_add(maj);
        // rotate the 256-bit Y:X right by one word
        let (x3, y3) = (x[3], y[3]);
        x = [y3, x[0], x[1], x[2]];
        y = [x3, y[0], y[1], y[2]];
    }
    Vector128::from_u32_lanes(if part1 { x } else { y })
}

/// SHA256H
pub fn sha256_hash_lower(abcd: Vector128, efgh: Vector128, wk: Vector128) -> Vector128 {
    sha256_hash(abcd, efgh, wk, true)
}

/// SHA256H2
pub fn sha256_hash_upper(efgh: Vector128, abcd: Vector128, wk: Vector128) -> Vector128 {
    sha256_hash(abcd, efgh, wk, false)
}

/// SHA256SU0
pub fn sha256_schedule_part1(w0_3: Vector128, w4_7: Vector128) -> Vector128 {
    let w = w0_3.to_u32_lanes();
    let next = w4_7.to_u32_lanes()[0];
    let mut result = [0u32; 4];
    for e in 0..4 {
        let elt = if e <= 2 { w[e + 1] } else { next };
        let elt = elt.rotate_right(7) ^ elt.rotate_right(18) ^ (elt >> 3);
        result[e] = elt.wrapping_add(w[e]);
    }
    Vector128::from_u32_lanes(result)
}

/// SHA256SU1
pub fn sha256_schedule_part2(w0_3: Vector128, w8_11: Vector128, w12_15: Vector128) -> Vector128 {
    let w0 = w0_3.to_u32_lanes();
    let w8 = w8_11.to_u32_lanes();
    let w12 = w12_15.to_u32_lanes();
    let small_sigma1 = |x: u32| x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10);

    let mut result = [0u32; 4];
    let t1 = [w12[2], w12[3]];
    for e in 0..2 {
        result[e] = small_sigma1(t1[e]).wrapping_add(w0[e]).wrapping_add(w8[e + 1]);
    }
    let t1 = [result[0], result[1]];
    for e in 2..4 {
        let other = if e == 3 { w12[0] } else { w8[e + 1] };
        result[e] = small_sigma1(t1[e - 2]).wrapping_add(w0[e]).wrapping_add(other);
    }
    Vector128::from_u32_lanes(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_single_block(msg: &[u8]) -> [u32; 16] {
        let mut block = [0u8; 64];
        block[..msg.len()].copy_from_slice(msg);
        block[msg.len()] = 0x80;
        let bits = (msg.len() as u64) * 8;
        block[56..].copy_from_slice(&bits.to_be_bytes());
        let mut words = [0u32; 16];
        for (i, w) in words.iter_mut().enumerate() {
            *w = u32::from_be_bytes([block[i * 4], block[i * 4 + 1], block[i * 4 + 2], block[i * 4 + 3]]);
        }
        words
    }

    fn add_lanes(a: Vector128, b: Vector128) -> Vector128 {
        let (a, b) = (a.to_u32_lanes(), b.to_u32_lanes());
        Vector128::from_u32_lanes([0, 1, 2, 3].map(|i| a[i].wrapping_add(b[i])))
    }

    #[test]
    fn test_sha1_abc_through_primitives() {
        let words = pad_single_block(b"abc");
        let mut w: Vec<Vector128> = (0..4)
            .map(|i| Vector128::from_u32_lanes([words[i * 4], words[i * 4 + 1], words[i * 4 + 2], words[i * 4 + 3]]))
            .collect();
        for i in 4..20 {
            let su0 = sha1_schedule_part1(w[i - 4], w[i - 3], w[i - 2]);
            w.push(sha1_schedule_part2(su0, w[i - 1]));
        }

        let h = [0x6745_2301u32, 0xEFCD_AB89, 0x98BA_DCFE, 0x1032_5476, 0xC3D2_E1F0];
        let mut abcd = Vector128::from_u32_lanes([h[0], h[1], h[2], h[3]]);
        let mut e = h[4];
        for (i, wi) in w.iter().enumerate() {
            let k = [0x5A82_7999u32, 0x6ED9_EBA1, 0x8F1B_BCDC, 0xCA62_C1D6][i / 5];
            let wk = add_lanes(*wi, Vector128::from_u32_lanes([k; 4]));
            let next_e = sha1_fixed_rotate(abcd.to_u32_lanes()[0]);
            abcd = match i / 5 {
                0 => sha1_hash_choose(abcd, e, wk),
                2 => sha1_hash_majority(abcd, e, wk),
                _ => sha1_hash_parity(abcd, e, wk),
            };
            e = next_e;
        }
        let out = abcd.to_u32_lanes();
        let digest = [
            out[0].wrapping_add(h[0]),
            out[1].wrapping_add(h[1]),
            out[2].wrapping_add(h[2]),
            out[3].wrapping_add(h[3]),
            e.wrapping_add(h[4]),
        ];
        assert_eq!(digest, [0xA999_3E36, 0x4706_816A, 0xBA3E_2571, 0x7850_C26C, 0x9CD0_D89D]);
    }

    #[test]
    fn test_sha256_abc_through_primitives() {
        const K: [u32; 64] = [
            0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
            0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
            0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
            0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
            0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
            0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
            0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
            0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
        ];
        let words = pad_single_block(b"abc");
        let mut w: Vec<Vector128> = (0..4)
            .map(|i| Vector128::from_u32_lanes([words[i * 4], words[i * 4 + 1], words[i * 4 + 2], words[i * 4 + 3]]))
            .collect();
        for i in 4..16 {
            let su0 = sha256_schedule_part1(w[i - 4], w[i - 3]);
            w.push(sha256_schedule_part2(su0, w[i - 2], w[i - 1]));
        }

        let h = [
            0x6a09e667u32, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
        ];
        let mut abcd = Vector128::from_u32_lanes([h[0], h[1], h[2], h[3]]);
        let mut efgh = Vector128::from_u32_lanes([h[4], h[5], h[6], h[7]]);
        for (i, wi) in w.iter().enumerate() {
            let k = Vector128::from_u32_lanes([K[i * 4], K[i * 4 + 1], K[i * 4 + 2], K[i * 4 + 3]]);
            let wk = add_lanes(*wi, k);
            let saved = abcd;
            abcd = sha256_hash_lower(abcd, efgh, wk);
            efgh = sha256_hash_upper(efgh, saved, wk);
        }
        let digest_lo = add_lanes(abcd, Vector128::from_u32_lanes([h[0], h[1], h[2], h[3]])).to_u32_lanes();
        let digest_hi = add_lanes(efgh, Vector128::from_u32_lanes([h[4], h[5], h[6], h[7]])).to_u32_lanes();
        assert_eq!(digest_lo, [0xba7816bf, 0x8f01cfea, 0x414140de, 0x5dae2223]);
        assert_eq!(digest_hi, [0xb00361a3, 0x96177a9c, 0xb410ff61, 0xf20015ad]);
    }
}
