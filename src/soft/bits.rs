//! Bit counting and bit/byte reversal.

const CLZ_NIBBLE: [u8; 16] = [4, 3, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0];

fn check_bits(size: u32) {
    if !matches!(size, 8 | 16 | 32 | 64) {
        panic!("Invalid bit count size {}", size);
    }
}

/// Leading zeros of the low `size` bits of `value`, scanning nibbles from the MSB.
pub fn count_leading_zeros(value: u64, size: u32) -> u64 {
    check_bits(size);
    let value = if size == 64 { value } else { value & ((1u64 << size) - 1) };
    if value == 0 {
        return size as u64;
    }
    let mut nibble = size;
    let mut count = 0u64;
    loop {
        nibble -= 4;
        let pre = CLZ_NIBBLE[((value >> nibble) & 0xF) as usize];
        count += pre as u64;
        if pre != 4 {
            return count;
        }
    }
}

/// Number of bits after the MSB that equal it: `clz(value ^ (value >> 1)) - 1`
/// over a `size`-bit field.
pub fn count_leading_signs(value: u64, size: u32) -> u64 {
    check_bits(size);
    let field = if size == 64 { value } else { value & ((1u64 << size) - 1) };
    let diff = field ^ (field >> 1);
    let low_mask = (1u64 << (size - 1)) - 1;
    count_leading_zeros(diff & low_mask, size) - 1
}

/// Population count of the low byte.
pub fn count_set_bits8(value: u64) -> u64 {
    let value = value & 0xFF;
    if value == 0xFF {
        return 8;
    }
    let value = ((value >> 1) & 0x55) + (value & 0x55);
    let value = ((value >> 2) & 0x33) + (value & 0x33);
    (value >> 4) + (value & 0x0F)
}

pub fn reverse_bits8(value: u32) -> u32 {
    let value = ((value & 0xAA) >> 1) | ((value & 0x55) << 1);
    let value = ((value & 0xCC) >> 2) | ((value & 0x33) << 2);
    ((value & 0xF0) >> 4) | ((value & 0x0F) << 4)
}

pub fn reverse_bits32(value: u32) -> u32 {
    let value = ((value & 0xAAAA_AAAA) >> 1) | ((value & 0x5555_5555) << 1);
    let value = ((value & 0xCCCC_CCCC) >> 2) | ((value & 0x3333_3333) << 2);
    let value = ((value & 0xF0F0_F0F0) >> 4) | ((value & 0x0F0F_0F0F) << 4);
    let value = ((value & 0xFF00_FF00) >> 8) | ((value & 0x00FF_00FF) << 8);
    (value >> 16) | (value << 16)
}

pub fn reverse_bits64(value: u64) -> u64 {
    let value = ((value & 0xAAAA_AAAA_AAAA_AAAA) >> 1) | ((value & 0x5555_5555_5555_5555) << 1);
    let value = ((value & 0xCCCC_CCCC_CCCC_CCCC) >> 2) | ((value & 0x3333_3333_3333_3333) << 2);
    let value = ((value & 0xF0F0_F0F0_F0F0_F0F0) >> 4) | ((value & 0x0F0F_0F0F_0F0F_0F0F) << 4);
    let value = ((value & 0xFF00_FF00_FF00_FF00) >> 8) | ((value & 0x00FF_00FF_00FF_00FF) << 8);
    let value = ((value & 0xFFFF_0000_FFFF_0000) >> 16) | ((value & 0x0000_FFFF_0000_FFFF) << 16);
    (value >> 32) | (value << 32)
}

/// Byte-reversal granularity: bytes are swapped within each container of this size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevSize {
    Rev16,
    Rev32,
    Rev64,
}

pub fn reverse_bytes(value: u64, size: RevSize) -> u64 {
    let value = ((value & 0xFF00_FF00_FF00_FF00) >> 8) | ((value & 0x00FF_00FF_00FF_00FF) << 8);
    if size == RevSize::Rev16 {
        return value;
    }
    let value = ((value & 0xFFFF_0000_FFFF_0000) >> 16) | ((value & 0x0000_FFFF_0000_FFFF) << 16);
    if size == RevSize::Rev32 {
        return value;
    }
    (value >> 32) | (value << 32)
}

pub fn reverse_bytes16_32(value: u32) -> u32 {
    reverse_bytes16_64(value as u64) as u32
}

pub fn reverse_bytes32_32(value: u32) -> u32 {
    reverse_bytes32_64(value as u64) as u32
}

pub fn reverse_bytes16_64(value: u64) -> u64 {
    reverse_bytes(value, RevSize::Rev16)
}

pub fn reverse_bytes32_64(value: u64) -> u64 {
    reverse_bytes(value, RevSize::Rev32)
}

pub fn reverse_bytes64(value: u64) -> u64 {
    reverse_bytes(value, RevSize::Rev64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clz() {
        assert_eq!(count_leading_zeros(0, 32), 32);
        assert_eq!(count_leading_zeros(1, 64), 63);
        assert_eq!(count_leading_zeros(0x8000_0000, 32), 0);
        assert_eq!(count_leading_zeros(0x0F, 8), 4);
        assert_eq!(count_leading_zeros(0x0001_0000, 32), 15);
    }

    #[test]
    fn test_cls() {
        assert_eq!(count_leading_signs(0, 32), 31);
        assert_eq!(count_leading_signs(0xFFFF_FFFF, 32), 31);
        assert_eq!(count_leading_signs(u64::MAX, 64), 63);
        assert_eq!(count_leading_signs(1, 64), 62);
        assert_eq!(count_leading_signs(0x7F, 8), 0);
        assert_eq!(count_leading_signs(0xF0, 8), 3);
    }

    #[test]
    fn test_count_set_bits8() {
        for b in 0u64..256 {
            assert_eq!(count_set_bits8(b), b.count_ones() as u64);
        }
    }

    #[test]
    fn test_reverse_known_values() {
        assert_eq!(reverse_bits8(0x01), 0x80);
        assert_eq!(reverse_bits32(0x0000_0001), 0x8000_0000);
        assert_eq!(reverse_bits64(0x0000_0000_0000_00F1), 0x8F00_0000_0000_0000);
        assert_eq!(reverse_bytes16_64(0x1122_3344_5566_7788), 0x2211_4433_6655_8877);
        assert_eq!(reverse_bytes32_64(0x1122_3344_5566_7788), 0x4433_2211_8877_6655);
        assert_eq!(reverse_bytes64(0x1122_3344_5566_7788), 0x8877_6655_4433_2211);
        assert_eq!(reverse_bytes32_32(0x1122_3344), 0x4433_2211);
        assert_eq!(reverse_bytes16_32(0x1122_3344), 0x2211_4433);
    }

    proptest! {
        #[test]
        fn test_reverse_bits64_involution(x in any::<u64>()) {
            prop_assert_eq!(reverse_bits64(reverse_bits64(x)), x);
            prop_assert_eq!(reverse_bits64(x), x.reverse_bits());
        }

        #[test]
        fn test_reverse_bytes64_involution(x in any::<u64>()) {
            prop_assert_eq!(reverse_bytes64(reverse_bytes64(x)), x);
            prop_assert_eq!(reverse_bytes64(x), x.swap_bytes());
        }

        #[test]
        fn test_clz_matches_builtin(x in any::<u64>()) {
            prop_assert_eq!(count_leading_zeros(x, 64), x.leading_zeros() as u64);
            prop_assert_eq!(count_leading_zeros(x & 0xFFFF_FFFF, 32), (x as u32).leading_zeros() as u64);
        }

        #[test]
        fn test_cls_matches_definition(x in any::<u32>()) {
            let expected = if (x as i32) < 0 { (!x).leading_zeros() - 1 } else { x.leading_zeros() - 1 };
            prop_assert_eq!(count_leading_signs(x as u64, 32), expected as u64);
        }
    }
}
