//! Branches, exception hooks and multi-block units.

use std::sync::OnceLock;

use a64emit::exec::{CpuState, Interpreter};
use a64emit::ir::Op;
use a64emit::{translate_block, translate_unit, EmitError, EmitterConfig, Mnemonic, OpCode64, TranslationOptions};
use proptest::prelude::*;

fn config() -> &'static EmitterConfig {
    static CONFIG: OnceLock<EmitterConfig> = OnceLock::new();
    CONFIG.get_or_init(EmitterConfig::scalar)
}

fn tracking() -> &'static EmitterConfig {
    static CONFIG: OnceLock<EmitterConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        EmitterConfig::scalar().with_options(TranslationOptions { track_call_stack: true, accelerate: false })
    })
}

fn run_unit(config: &EmitterConfig, blocks: &[Vec<OpCode64>], state: &mut CpuState) -> u64 {
    let func = translate_unit(config, blocks).unwrap();
    Interpreter::new(config).run(&func, state).unwrap()
}

fn run(ops: &[OpCode64], state: &mut CpuState) -> u64 {
    run_unit(config(), &[ops.to_vec()], state)
}

/// X0 counts down to zero and X1 counts iterations, then leave at 0x10C.
fn countdown() -> Vec<Vec<OpCode64>> {
    vec![vec![
        OpCode64::new(Mnemonic::SUB_imm, 0x100).x().regs(0, 0, 0).imm(1),
        OpCode64::new(Mnemonic::ADD_imm, 0x104).x().regs(1, 1, 0).imm(1),
        OpCode64::new(Mnemonic::CBNZ, 0x108).x().rd(0).imm(-8i64 as u64),
    ]]
}

#[test]
fn test_backward_branch_inside_unit_loops() {
    let _ = env_logger::builder().is_test(true).try_init();
    // The CBNZ target 0x100 is the unit's own block, so the loop never
    // leaves the function until X0 reaches zero.
    let mut state = CpuState::new();
    state.x[0] = 10;
    let next = run_unit(config(), &countdown(), &mut state);
    assert_eq!(next, 0x10C);
    assert_eq!(state.x[0], 0);
    assert_eq!(state.x[1], 10);
}

#[test]
fn test_branch_to_unknown_block_leaves() {
    // Same loop but the CBNZ target lies outside the unit
    let mut state = CpuState::new();
    state.x[0] = 10;
    let ops = [
        OpCode64::new(Mnemonic::SUB_imm, 0x104).x().regs(0, 0, 0).imm(1),
        OpCode64::new(Mnemonic::CBNZ, 0x108).x().rd(0).imm(-8i64 as u64),
    ];
    assert_eq!(run(&ops, &mut state), 0x100);
    assert_eq!(state.x[0], 9);
}

#[test]
fn test_blocks_link_in_either_order() {
    let first = vec![
        OpCode64::new(Mnemonic::MOVZ, 0x0).x().rd(0).imm(1),
        OpCode64::new(Mnemonic::B, 0x4).imm(0x1C),
    ];
    let second = vec![
        OpCode64::new(Mnemonic::ADD_imm, 0x20).x().regs(0, 0, 0).imm(2),
        OpCode64::new(Mnemonic::B, 0x24).imm(0x1C),
    ];
    let third = vec![
        OpCode64::new(Mnemonic::ADD_imm, 0x40).x().regs(0, 0, 0).imm(4),
        OpCode64::new(Mnemonic::RET, 0x44).rn(30),
    ];

    for blocks in [
        vec![first.clone(), second.clone(), third.clone()],
        vec![first.clone(), third.clone(), second.clone()],
    ] {
        let mut state = CpuState::new();
        state.x[30] = 0xABC0;
        let func = translate_unit(config(), &blocks).unwrap();
        assert_eq!(func.entry, 0);
        assert_eq!(func.count_ops(|op| matches!(op, Op::Ret)), 1);
        assert_eq!(Interpreter::new(config()).run(&func, &mut state).unwrap(), 0xABC0);
        assert_eq!(state.x[0], 7);
    }
}

#[test]
fn test_cbz_and_tbz_both_ways() {
    let cases = [
        (Mnemonic::CBZ, 0u64, 0, true),
        (Mnemonic::CBZ, 1 << 40, 0, false),
        (Mnemonic::CBNZ, 1 << 40, 0, true),
        (Mnemonic::CBNZ, 0, 0, false),
        (Mnemonic::TBZ, 1 << 40, 40, false),
        (Mnemonic::TBZ, 1 << 40, 41, true),
        (Mnemonic::TBNZ, 1 << 63, 63, true),
        (Mnemonic::TBNZ, 1 << 62, 63, false),
    ];
    for (mnemonic, value, bit, taken) in cases {
        let mut state = CpuState::new();
        state.x[3] = value;
        let op = OpCode64::new(mnemonic, 0x800).x().rd(3).imm(0x20).lanes(bit, 0);
        let expected = if taken { 0x820 } else { 0x804 };
        assert_eq!(run(&[op], &mut state), expected, "{:?} {:#x} bit {}", mnemonic, value, bit);
    }
}

#[test]
fn test_cbz_w_form_ignores_upper_half() {
    let mut state = CpuState::new();
    state.x[3] = 0xFFFF_FFFF_0000_0000;
    let op = OpCode64::new(Mnemonic::CBZ, 0x800).w().rd(3).imm(0x20);
    assert_eq!(run(&[op], &mut state), 0x820);
}

#[test]
fn test_call_stack_tracking() {
    let mut state = CpuState::new();
    run_unit(tracking(), &[vec![OpCode64::new(Mnemonic::BL, 0x1000).imm(0x200)]], &mut state);
    assert_eq!(state.call_stack, vec![0x1200]);
    assert_eq!(state.x[30], 0x1004);

    state.x[9] = 0x5000;
    run_unit(tracking(), &[vec![OpCode64::new(Mnemonic::BLR, 0x1200).rn(9)]], &mut state);
    assert_eq!(state.call_stack, vec![0x1200, 0x5000]);
    assert_eq!(state.x[30], 0x1204);

    let next = run_unit(tracking(), &[vec![OpCode64::new(Mnemonic::RET, 0x5000).rn(30)]], &mut state);
    assert_eq!(next, 0x1204);
    assert_eq!(state.call_stack, vec![0x1200]);
}

#[test]
fn test_untracked_calls_leave_stack_alone() {
    let mut state = CpuState::new();
    run(&[OpCode64::new(Mnemonic::BL, 0x1000).imm(0x200)], &mut state);
    run(&[OpCode64::new(Mnemonic::RET, 0x1200).rn(30)], &mut state);
    assert!(state.call_stack.is_empty());
}

#[test]
fn test_exceptions_stop_or_continue() {
    for (mnemonic, stop) in [
        (Mnemonic::SVC, false),
        (Mnemonic::SVC, true),
        (Mnemonic::BRK, false),
        (Mnemonic::BRK, true),
        (Mnemonic::UND, false),
        (Mnemonic::UND, true),
    ] {
        let mut state = CpuState::new();
        state.stop_on_exception = stop;
        let op = OpCode64::new(mnemonic, 0x3000).imm(0x1_0042).raw(0xD400_0841);
        let next = run(&[op], &mut state);
        assert_eq!(next, if stop { 0 } else { 0x3004 }, "{:?}", mnemonic);
        assert_eq!(state.running, !stop);
        match mnemonic {
            // Only the low 16 bits of the immediate are reported
            Mnemonic::SVC => assert_eq!(state.svc_calls, vec![(0x3000, 0x42)]),
            Mnemonic::BRK => assert_eq!(state.breakpoints, vec![(0x3000, 0x42)]),
            _ => assert_eq!(state.undefined, vec![(0x3000, 0xD400_0841)]),
        }
    }
}

#[test]
fn test_exception_inside_loop_stops_unit() {
    let mut blocks = countdown();
    blocks[0].insert(0, OpCode64::new(Mnemonic::BRK, 0xFC).imm(1));
    let mut state = CpuState::new();
    state.x[0] = 10;
    state.stop_on_exception = true;
    let next = run_unit(config(), &blocks, &mut state);
    assert_eq!(next, 0);
    assert_eq!(state.x[0], 10);
    assert_eq!(state.breakpoints.len(), 1);
}

#[test]
fn test_unsupported_reports_address() {
    let ops = [
        OpCode64::new(Mnemonic::MOVZ, 0x40).x().rd(0).imm(1),
        OpCode64::new(Mnemonic::MUL_Ve, 0x44).q().regs(0, 1, 2).elem(3),
    ];
    match translate_block(config(), &ops) {
        Err(EmitError::Unsupported { address, .. }) => assert_eq!(address, 0x44),
        other => panic!("expected Unsupported, got {:?}", other.map(|f| f.len())),
    }
}

proptest! {
    #[test]
    fn prop_loop_runs_x0_times(count in 1u64..200) {
        let mut state = CpuState::new();
        state.x[0] = count;
        prop_assert_eq!(run_unit(config(), &countdown(), &mut state), 0x10C);
        prop_assert_eq!(state.x[1], count);
    }

    #[test]
    fn prop_tbz_tests_one_bit(value in any::<u64>(), bit in 0u8..64) {
        let mut state = CpuState::new();
        state.x[5] = value;
        let op = OpCode64::new(Mnemonic::TBNZ, 0x100).x().rd(5).imm(0x40).lanes(bit, 0);
        let taken = run(&[op], &mut state) == 0x140;
        prop_assert_eq!(taken, (value >> bit) & 1 == 1);
    }
}
