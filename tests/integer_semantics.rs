//! General-register data processing against plain Rust arithmetic.

use std::sync::OnceLock;

use a64emit::exec::{CpuState, Interpreter};
use a64emit::{translate_block, EmitterConfig, HostCapabilities, Mnemonic, OpCode64};
use proptest::prelude::*;

fn config() -> &'static EmitterConfig {
    static CONFIG: OnceLock<EmitterConfig> = OnceLock::new();
    CONFIG.get_or_init(EmitterConfig::scalar)
}

fn packed() -> &'static EmitterConfig {
    static CONFIG: OnceLock<EmitterConfig> = OnceLock::new();
    CONFIG.get_or_init(|| EmitterConfig::with_capabilities(HostCapabilities::all()))
}

fn run_with(config: &EmitterConfig, ops: &[OpCode64], state: &mut CpuState) -> u64 {
    let func = translate_block(config, ops).unwrap();
    Interpreter::new(config).run(&func, state).unwrap()
}

fn binary(mnemonic: Mnemonic, w: bool, n: u64, m: u64) -> u64 {
    let mut state = CpuState::new();
    state.x[1] = n;
    state.x[2] = m;
    let op = OpCode64::new(mnemonic, 0).regs(0, 1, 2);
    let op = if w { op.w() } else { op.x() };
    run_with(config(), &[op], &mut state);
    state.x[0]
}

#[test]
fn test_division_edges() {
    let _ = env_logger::builder().is_test(true).try_init();
    assert_eq!(binary(Mnemonic::UDIV, false, 77, 0), 0);
    assert_eq!(binary(Mnemonic::SDIV, false, 77, 0), 0);
    assert_eq!(binary(Mnemonic::SDIV, false, i64::MIN as u64, u64::MAX), i64::MIN as u64);
    assert_eq!(binary(Mnemonic::SDIV, true, i32::MIN as u32 as u64, u32::MAX as u64), i32::MIN as u32 as u64);
    assert_eq!(binary(Mnemonic::SDIV, false, -7i64 as u64, 2), -3i64 as u64);
    assert_eq!(binary(Mnemonic::SDIV, true, -7i32 as u32 as u64, 2), -3i32 as u32 as u64);
    assert_eq!(binary(Mnemonic::UDIV, true, 0xFFFF_FFFF_0000_0010, 4), 4);
}

#[test]
fn test_crc32_check_value() {
    // "123456789": eight bytes through CRC32X then the last through CRC32B.
    let data = b"123456789";
    for config in [config(), packed()] {
        let mut state = CpuState::new();
        state.x[1] = 0xFFFF_FFFF;
        state.x[2] = u64::from_le_bytes(data[..8].try_into().unwrap());
        state.x[3] = data[8] as u64;
        let ops = [
            OpCode64::new(Mnemonic::CRC32, 0).regs(1, 1, 2).elem(3),
            OpCode64::new(Mnemonic::CRC32, 4).regs(1, 1, 3).elem(0),
        ];
        run_with(config, &ops, &mut state);
        assert_eq!(state.x[1] as u32 ^ 0xFFFF_FFFF, 0xCBF4_3926, "{}", config.backend().name());
    }
}

#[test]
fn test_crc32c_check_value() {
    let data = b"123456789";
    for config in [config(), packed()] {
        let mut state = CpuState::new();
        state.x[1] = 0xFFFF_FFFF;
        for (i, &byte) in data.iter().enumerate() {
            state.x[2] = byte as u64;
            run_with(config, &[OpCode64::new(Mnemonic::CRC32C, i as u64 * 4).regs(1, 1, 2).elem(0)], &mut state);
        }
        assert_eq!(state.x[1] as u32 ^ 0xFFFF_FFFF, 0xE306_9283);
    }
}

#[test]
fn test_count_leading() {
    let unary = |mnemonic: Mnemonic, w: bool, n: u64| {
        let mut state = CpuState::new();
        state.x[1] = n;
        let op = OpCode64::new(mnemonic, 0).regs(0, 1, 0);
        run_with(config(), &[if w { op.w() } else { op.x() }], &mut state);
        state.x[0]
    };
    assert_eq!(unary(Mnemonic::CLZ, false, 0), 64);
    assert_eq!(unary(Mnemonic::CLZ, true, 0xFFFF_FFFF_0000_0000), 32);
    assert_eq!(unary(Mnemonic::CLZ, true, 1), 31);
    assert_eq!(unary(Mnemonic::CLS, false, 0), 63);
    assert_eq!(unary(Mnemonic::CLS, false, u64::MAX), 63);
    assert_eq!(unary(Mnemonic::CLS, true, 0xC000_0000), 1);
}

proptest! {
    #[test]
    fn prop_division_matches_rust(n in any::<u64>(), m in any::<u64>()) {
        let expected_u = n.checked_div(m).unwrap_or(0);
        prop_assert_eq!(binary(Mnemonic::UDIV, false, n, m), expected_u);

        let expected_s = if m == 0 { 0 } else { (n as i64).wrapping_div(m as i64) as u64 };
        prop_assert_eq!(binary(Mnemonic::SDIV, false, n, m), expected_s);

        let (n32, m32) = (n as u32, m as u32);
        let expected_w = if m32 == 0 { 0 } else { (n32 as i32).wrapping_div(m32 as i32) as u32 as u64 };
        prop_assert_eq!(binary(Mnemonic::SDIV, true, n, m), expected_w);
    }

    #[test]
    fn prop_reverse_is_involution(value in any::<u64>(), w in any::<bool>()) {
        for mnemonic in [Mnemonic::RBIT, Mnemonic::REV16, Mnemonic::REV32] {
            let mut state = CpuState::new();
            state.x[1] = value;
            let make = |at: u64, rn: u8| {
                let op = OpCode64::new(mnemonic, at).regs(0, rn, 0);
                if w { op.w() } else { op.x() }
            };
            run_with(config(), &[make(0, 1), make(4, 0)], &mut state);
            let expected = if w { value & 0xFFFF_FFFF } else { value };
            prop_assert_eq!(state.x[0], expected, "{:?}", mnemonic);
        }
    }

    #[test]
    fn prop_rev64_and_rbit_match_rust(value in any::<u64>()) {
        let mut state = CpuState::new();
        state.x[1] = value;
        let ops = [
            OpCode64::new(Mnemonic::REV64, 0).x().regs(2, 1, 0),
            OpCode64::new(Mnemonic::RBIT, 4).x().regs(3, 1, 0),
            OpCode64::new(Mnemonic::UMULH, 8).x().regs(4, 1, 1),
        ];
        run_with(config(), &ops, &mut state);
        prop_assert_eq!(state.x[2], value.swap_bytes());
        prop_assert_eq!(state.x[3], value.reverse_bits());
        prop_assert_eq!(state.x[4], ((value as u128 * value as u128) >> 64) as u64);
    }
}
