//! Lane-level model of the host SIMD primitives.

use crate::ir::intrinsic::Intrinsic;
use crate::ir::value::Value;
use crate::soft::{aes, crc32};
use crate::vector::Vector128;

fn lanes(size: u8) -> usize {
    16 >> size
}

fn bits(size: u8) -> u32 {
    8 << size
}

fn map2(a: Vector128, b: Vector128, size: u8, signed: bool, f: impl Fn(u64, u64) -> u64) -> Vector128 {
    let mut out = Vector128::ZERO;
    for i in 0..lanes(size) {
        let x = a.extract_int(i, size as usize, signed);
        let y = b.extract_int(i, size as usize, signed);
        out = out.insert_int(i, size as usize, f(x, y));
    }
    out
}

fn map1(a: Vector128, size: u8, signed: bool, f: impl Fn(u64) -> u64) -> Vector128 {
    let mut out = Vector128::ZERO;
    for i in 0..lanes(size) {
        out = out.insert_int(i, size as usize, f(a.extract_int(i, size as usize, signed)));
    }
    out
}

fn mask(cond: bool) -> u64 {
    if cond { u64::MAX } else { 0 }
}

fn clamp_signed(value: i64, size: u8) -> u64 {
    let max = (1i64 << (bits(size) - 1)) - 1;
    value.clamp(-max - 1, max) as u64
}

fn clamp_unsigned(value: i64, size: u8) -> u64 {
    let max = (1i64 << bits(size)) - 1;
    value.clamp(0, max) as u64
}

fn map_f2(a: Vector128, b: Vector128, size_f: u8, f32op: fn(f32, f32) -> f32, f64op: fn(f64, f64) -> f64) -> Vector128 {
    let mut out = Vector128::ZERO;
    if size_f == 0 {
        for i in 0..4 {
            out = out.insert_f32(i, f32op(a.extract_f32(i), b.extract_f32(i)));
        }
    } else {
        for i in 0..2 {
            out = out.insert_f64(i, f64op(a.extract_f64(i), b.extract_f64(i)));
        }
    }
    out
}

fn cmp_f2(a: Vector128, b: Vector128, size_f: u8, f32op: fn(f32, f32) -> bool, f64op: fn(f64, f64) -> bool) -> Vector128 {
    let mut out = Vector128::ZERO;
    if size_f == 0 {
        for i in 0..4 {
            out = out.insert_int(i, 2, mask(f32op(a.extract_f32(i), b.extract_f32(i))));
        }
    } else {
        for i in 0..2 {
            out = out.insert_int(i, 3, mask(f64op(a.extract_f64(i), b.extract_f64(i))));
        }
    }
    out
}

fn shift_count(size: u8, count: u8) -> Option<u32> {
    let count = count as u32;
    (count < bits(size)).then_some(count)
}

fn pshufb(a: Vector128, b: Vector128) -> Vector128 {
    let table = a.to_bytes();
    let control = b.to_bytes();
    Vector128::from_bytes(control.map(|c| if c & 0x80 != 0 { 0 } else { table[(c & 0x0F) as usize] }))
}

/// Evaluate `intrinsic` over arguments in push order.
pub fn evaluate(intrinsic: Intrinsic, args: &[Value]) -> Value {
    use Intrinsic::*;
    let v = |i: usize| match args[i] {
        Value::V128(v) => v,
        other => panic!("Invalid intrinsic argument {} for {}", other, intrinsic),
    };

    match intrinsic {
        Crc32c(size) => {
            let (crc, value) = match (args[0], args[1]) {
                (Value::I32(crc), Value::I64(value)) => (crc, value),
                _ => panic!("Invalid intrinsic arguments for {}", intrinsic),
            };
            return Value::I32(crc32::crc32_sized(true, crc, value, size as usize));
        }
        Pmovmskb => {
            let bytes = v(0).to_bytes();
            let bits = bytes.iter().enumerate().fold(0u32, |acc, (i, b)| acc | (((*b >> 7) as u32) << i));
            return Value::I32(bits);
        }
        _ => {}
    }

    let result = match intrinsic {
        Padd(s) => map2(v(0), v(1), s, false, |x, y| x.wrapping_add(y)),
        Psub(s) => map2(v(0), v(1), s, false, |x, y| x.wrapping_sub(y)),
        Pmullw => map2(v(0), v(1), 1, false, |x, y| x.wrapping_mul(y)),
        Pmulld => map2(v(0), v(1), 2, false, |x, y| x.wrapping_mul(y)),
        Padds(s) => map2(v(0), v(1), s, true, |x, y| clamp_signed((x as i64) + (y as i64), s)),
        Paddus(s) => map2(v(0), v(1), s, false, |x, y| clamp_unsigned((x + y) as i64, s)),
        Psubs(s) => map2(v(0), v(1), s, true, |x, y| clamp_signed((x as i64) - (y as i64), s)),
        Psubus(s) => map2(v(0), v(1), s, false, |x, y| clamp_unsigned(x as i64 - y as i64, s)),
        Pavg(s) => map2(v(0), v(1), s, false, |x, y| (x + y + 1) >> 1),
        Pand => v(0) & v(1),
        Pandn => !v(0) & v(1),
        Por => v(0) | v(1),
        Pxor => v(0) ^ v(1),
        Pcmpeq(s) => map2(v(0), v(1), s, false, |x, y| mask(x == y)),
        Pcmpgt(s) => map2(v(0), v(1), s, true, |x, y| mask((x as i64) > (y as i64))),
        Pmaxs(s) => map2(v(0), v(1), s, true, |x, y| (x as i64).max(y as i64) as u64),
        Pmins(s) => map2(v(0), v(1), s, true, |x, y| (x as i64).min(y as i64) as u64),
        Pmaxu(s) => map2(v(0), v(1), s, false, |x, y| x.max(y)),
        Pminu(s) => map2(v(0), v(1), s, false, |x, y| x.min(y)),
        Pabs(s) => map1(v(0), s, true, |x| (x as i64).wrapping_abs() as u64),
        Psll(s, count) => match shift_count(s, count) {
            Some(n) => map1(v(0), s, false, |x| x << n),
            None => Vector128::ZERO,
        },
        Psrl(s, count) => match shift_count(s, count) {
            Some(n) => map1(v(0), s, false, |x| x >> n),
            None => Vector128::ZERO,
        },
        Psra(s, count) => {
            let n = shift_count(s, count).unwrap_or(bits(s) - 1);
            map1(v(0), s, true, |x| ((x as i64) >> n) as u64)
        }
        Pshufb => pshufb(v(0), v(1)),
        Addp(s) => map_f2(v(0), v(1), s, |x, y| x + y, |x, y| x + y),
        Subp(s) => map_f2(v(0), v(1), s, |x, y| x - y, |x, y| x - y),
        Mulp(s) => map_f2(v(0), v(1), s, |x, y| x * y, |x, y| x * y),
        Divp(s) => map_f2(v(0), v(1), s, |x, y| x / y, |x, y| x / y),
        Sqrtp(s) => map_f2(v(0), v(0), s, |x, _| x.sqrt(), |x, _| x.sqrt()),
        Cmpeqp(s) => cmp_f2(v(0), v(1), s, |x, y| x == y, |x, y| x == y),
        Cmpltp(s) => cmp_f2(v(0), v(1), s, |x, y| x < y, |x, y| x < y),
        Cmplep(s) => cmp_f2(v(0), v(1), s, |x, y| x <= y, |x, y| x <= y),
        Aesenc => aes::mix_columns(aes::sub_bytes(aes::shift_rows(v(0)))) ^ v(1),
        Aesenclast => aes::sub_bytes(aes::shift_rows(v(0))) ^ v(1),
        Aesdec => aes::inv_mix_columns(aes::inv_sub_bytes(aes::inv_shift_rows(v(0)))) ^ v(1),
        Aesdeclast => aes::inv_sub_bytes(aes::inv_shift_rows(v(0))) ^ v(1),
        Aesimc => aes::inv_mix_columns(v(0)),
        Crc32c(_) | Pmovmskb => unreachable!(),
    };
    Value::V128(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vv(a: Vector128, b: Vector128) -> [Value; 2] {
        [Value::V128(a), Value::V128(b)]
    }

    fn bytes(b: [u8; 16]) -> Vector128 {
        Vector128::from_bytes(b)
    }

    #[test]
    fn test_saturating_byte_add() {
        let a = bytes([0x7F, 0xFF, 0x80, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let b = bytes([1, 1, 0xFF, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let r = evaluate(Intrinsic::Padds(0), &vv(a, b)).as_v128().unwrap_or_default();
        assert_eq!(&r.to_bytes()[..4], &[0x7F, 0x00, 0x80, 2]);
        let r = evaluate(Intrinsic::Paddus(0), &vv(a, b)).as_v128().unwrap_or_default();
        assert_eq!(&r.to_bytes()[..4], &[0x80, 0xFF, 0xFF, 2]);
        let r = evaluate(Intrinsic::Psubus(0), &vv(b, a)).as_v128().unwrap_or_default();
        assert_eq!(&r.to_bytes()[..4], &[0, 0, 0x7F, 0]);
    }

    #[test]
    fn test_pandn_complements_first_operand() {
        let a = Vector128::new(0xF0, 0);
        let b = Vector128::new(0xFF, 0);
        assert_eq!(evaluate(Intrinsic::Pandn, &vv(a, b)), Value::V128(Vector128::new(0x0F, 0)));
    }

    #[test]
    fn test_shift_counts_past_width() {
        let a = Vector128::from_u32_lanes([0x8000_0000, 1, 2, 3]);
        let r = evaluate(Intrinsic::Psrl(2, 32), &[Value::V128(a)]);
        assert_eq!(r, Value::V128(Vector128::ZERO));
        let r = evaluate(Intrinsic::Psra(2, 40), &[Value::V128(a)]).as_v128().unwrap_or_default();
        assert_eq!(r.to_u32_lanes(), [u32::MAX, 0, 0, 0]);
    }

    #[test]
    fn test_pshufb_high_bit_zeroes() {
        let table = bytes(core::array::from_fn(|i| i as u8 * 2));
        let mut control = [0x80u8; 16];
        control[0] = 3;
        control[1] = 0x1F;
        let r = evaluate(Intrinsic::Pshufb, &vv(table, bytes(control))).as_v128().unwrap_or_default();
        assert_eq!(r.byte(0), 6);
        assert_eq!(r.byte(1), 30);
        assert_eq!(r.byte(2), 0);
    }

    #[test]
    fn test_pmovmskb() {
        let mut b = [0u8; 16];
        b[0] = 0x80;
        b[15] = 0xFF;
        assert_eq!(evaluate(Intrinsic::Pmovmskb, &[Value::V128(bytes(b))]), Value::I32(0x8001));
    }

    #[test]
    fn test_aes_round_composition_matches_arm_forms() {
        let state = Vector128::new(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210);
        let key = Vector128::new(0x1111, 0x2222);
        let last = evaluate(Intrinsic::Aesenclast, &vv(state ^ key, Vector128::ZERO));
        assert_eq!(last, Value::V128(aes::encrypt(state, key)));
        let last = evaluate(Intrinsic::Aesdeclast, &vv(state ^ key, Vector128::ZERO));
        assert_eq!(last, Value::V128(aes::decrypt(state, key)));
    }
}
