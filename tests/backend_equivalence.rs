//! The packed backend and the scalar fallback must leave identical guest
//! state for every opcode that routes through `VectorBackend`.

use std::sync::OnceLock;

use a64emit::exec::{CpuState, Interpreter};
use a64emit::{translate_block, EmitterConfig, HostCapabilities, Mnemonic, OpCode64, Vector128};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Lane-wise integer op valid for element sizes up to `max`.
    Int(u8),
    Bitwise,
    Float,
    ShiftLeft,
    ShiftRight,
    Tbl,
    Crc,
    AesRound,
    AesMix,
}

const CASES: &[(Mnemonic, Shape)] = &[
    (Mnemonic::ADD_V, Shape::Int(3)),
    (Mnemonic::SUB_V, Shape::Int(3)),
    (Mnemonic::MUL_V, Shape::Int(2)),
    (Mnemonic::SMAX_V, Shape::Int(2)),
    (Mnemonic::SMIN_V, Shape::Int(2)),
    (Mnemonic::UMAX_V, Shape::Int(2)),
    (Mnemonic::UMIN_V, Shape::Int(2)),
    (Mnemonic::URHADD_V, Shape::Int(2)),
    (Mnemonic::CMEQ_V, Shape::Int(3)),
    (Mnemonic::CMGT_V, Shape::Int(3)),
    (Mnemonic::CMGE_V, Shape::Int(3)),
    (Mnemonic::CMHI_V, Shape::Int(3)),
    (Mnemonic::CMHS_V, Shape::Int(3)),
    (Mnemonic::CMTST_V, Shape::Int(3)),
    (Mnemonic::CMEQ_Vz, Shape::Int(3)),
    (Mnemonic::CMLT_Vz, Shape::Int(3)),
    (Mnemonic::CMLE_Vz, Shape::Int(3)),
    (Mnemonic::SQADD_V, Shape::Int(3)),
    (Mnemonic::UQADD_V, Shape::Int(3)),
    (Mnemonic::SQSUB_V, Shape::Int(3)),
    (Mnemonic::UQSUB_V, Shape::Int(3)),
    (Mnemonic::ABS_V, Shape::Int(3)),
    (Mnemonic::NEG_V, Shape::Int(3)),
    (Mnemonic::AND_V, Shape::Bitwise),
    (Mnemonic::BIC_V, Shape::Bitwise),
    (Mnemonic::ORR_V, Shape::Bitwise),
    (Mnemonic::ORN_V, Shape::Bitwise),
    (Mnemonic::EOR_V, Shape::Bitwise),
    (Mnemonic::NOT_V, Shape::Bitwise),
    (Mnemonic::CNT_V, Shape::Bitwise),
    (Mnemonic::FADD_V, Shape::Float),
    (Mnemonic::FSUB_V, Shape::Float),
    (Mnemonic::FMUL_V, Shape::Float),
    (Mnemonic::FDIV_V, Shape::Float),
    (Mnemonic::FCMEQ_V, Shape::Float),
    (Mnemonic::FCMGE_V, Shape::Float),
    (Mnemonic::FCMGT_V, Shape::Float),
    (Mnemonic::FCMLT_Vz, Shape::Float),
    (Mnemonic::FABS_V, Shape::Float),
    (Mnemonic::FNEG_V, Shape::Float),
    (Mnemonic::FSQRT_V, Shape::Float),
    (Mnemonic::SHL_V, Shape::ShiftLeft),
    (Mnemonic::SSHR_V, Shape::ShiftRight),
    (Mnemonic::USHR_V, Shape::ShiftRight),
    (Mnemonic::TBL_V, Shape::Tbl),
    (Mnemonic::CRC32, Shape::Crc),
    (Mnemonic::CRC32C, Shape::Crc),
    (Mnemonic::AESE, Shape::AesRound),
    (Mnemonic::AESD, Shape::AesRound),
    (Mnemonic::AESMC, Shape::AesMix),
    (Mnemonic::AESIMC, Shape::AesMix),
];

fn scalar() -> &'static EmitterConfig {
    static CONFIG: OnceLock<EmitterConfig> = OnceLock::new();
    CONFIG.get_or_init(EmitterConfig::scalar)
}

fn packed() -> &'static EmitterConfig {
    static CONFIG: OnceLock<EmitterConfig> = OnceLock::new();
    CONFIG.get_or_init(|| EmitterConfig::with_capabilities(HostCapabilities::all()))
}

/// A valid opcode of `shape`; the seeds pick the element size, the 64- or
/// 128-bit form and the shift or table count.
fn build(mnemonic: Mnemonic, shape: Shape, size_seed: u8, q: bool, extra: u8) -> OpCode64 {
    let vector = |op: OpCode64, size: u8, q: bool| {
        let op = op.regs(0, 1, 2).elem(size);
        if q { op.q() } else { op.d() }
    };
    let op = OpCode64::new(mnemonic, 0x1000);
    match shape {
        Shape::Int(max) => {
            let size = size_seed % (max + 1);
            vector(op, size, q || size == 3)
        }
        Shape::Bitwise => vector(op, 0, q),
        Shape::Float => {
            let size = size_seed % 2;
            vector(op, size, q || size == 1)
        }
        Shape::ShiftLeft | Shape::ShiftRight => {
            let size = size_seed % 4;
            let esize = 8u32 << size;
            let shift = match shape {
                Shape::ShiftLeft => extra as u32 % esize,
                _ => 1 + extra as u32 % esize,
            };
            vector(op, size, q || size == 3).shift_amount(shift as u8)
        }
        Shape::Tbl => {
            let op = op.regs(0, 1, 5).tbl(extra % 4 + 1);
            if q { op.q() } else { op.d() }
        }
        Shape::Crc => op.regs(3, 1, 2).elem(size_seed % 4),
        Shape::AesRound | Shape::AesMix => op.regs(0, 1, 0),
    }
}

fn seeded_state(words: &[u64; 16], x1: u64, x2: u64) -> CpuState {
    let mut state = CpuState::new();
    for (i, pair) in words.chunks(2).enumerate() {
        state.v[i] = Vector128::new(pair[0], pair[1]);
    }
    state.x[1] = x1;
    state.x[2] = x2;
    state
}

fn execute(config: &EmitterConfig, op: OpCode64, state: &mut CpuState) -> u64 {
    let func = translate_block(config, &[op]).unwrap();
    Interpreter::new(config).run(&func, state).unwrap()
}

fn assert_equivalent(op: OpCode64, state: &CpuState) {
    let mut slow = state.clone();
    let mut fast = state.clone();
    let slow_next = execute(scalar(), op, &mut slow);
    let fast_next = execute(packed(), op, &mut fast);
    assert_eq!(slow_next, fast_next, "{:?}", op);
    assert_eq!(slow, fast, "{:?} diverged", op);
}

#[test]
fn test_packed_config_is_packed() {
    assert_eq!(scalar().backend().name(), "scalar");
    assert_eq!(packed().backend().name(), "packed");
}

#[test]
fn test_saturation_boundaries() {
    let _ = env_logger::builder().is_test(true).try_init();
    let edges = [0u64, 1, 0x7F, 0x80, 0xFF, 0x7FFF, 0x8000, 0xFFFF, 0x7FFF_FFFF, 0x8000_0000, u64::MAX, i64::MAX as u64];
    for mnemonic in [Mnemonic::SQADD_V, Mnemonic::UQADD_V, Mnemonic::SQSUB_V, Mnemonic::UQSUB_V] {
        for size in 0..4u8 {
            for &a in &edges {
                for &b in &edges {
                    let mut state = CpuState::new();
                    state.v[1] = Vector128::ZERO.insert_int(0, size as usize, a).insert_int(1, size as usize, b);
                    state.v[2] = Vector128::ZERO.insert_int(0, size as usize, b).insert_int(1, size as usize, a);
                    assert_equivalent(build(mnemonic, Shape::Int(3), size, true, 0), &state);
                }
            }
        }
    }
}

#[test]
fn test_every_case_with_seeded_inputs() {
    let mut rng = StdRng::seed_from_u64(0xA64E);
    for &(mnemonic, shape) in CASES {
        for size in 0..4u8 {
            for q in [false, true] {
                let mut words = [0u64; 16];
                rng.fill(&mut words);
                let state = seeded_state(&words, rng.gen(), rng.gen());
                assert_equivalent(build(mnemonic, shape, size, q, rng.gen()), &state);
            }
        }
    }
}

#[test]
fn test_tbl_out_of_range_indices() {
    for tables in 1..=4u8 {
        let mut state = seeded_state(&[0x0123_4567_89AB_CDEF; 16], 0, 0);
        state.v[5] = Vector128::from_bytes([0, 15, 16, 31, 32, 47, 48, 63, 64, 65, 0x7F, 0x80, 0xF0, 0xFF, 3, 200]);
        let op = OpCode64::new(Mnemonic::TBL_V, 0).q().regs(0, 1, 5).tbl(tables);
        assert_equivalent(op, &state);

        let mut check = state.clone();
        execute(packed(), op, &mut check);
        let limit = 16 * tables as usize;
        for (i, &index) in state.v[5].to_bytes().iter().enumerate() {
            if index as usize >= limit {
                assert_eq!(check.v[0].byte(i), 0, "index {} with {} tables", index, tables);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_backends_agree(
        case in 0..CASES.len(),
        size in 0u8..4,
        q in any::<bool>(),
        extra in any::<u8>(),
        words in any::<[u64; 16]>(),
        x1 in any::<u64>(),
        x2 in any::<u64>(),
    ) {
        let (mnemonic, shape) = CASES[case];
        let op = build(mnemonic, shape, size, q, extra);
        assert_equivalent(op, &seeded_state(&words, x1, x2));
    }

    #[test]
    fn prop_small_lanes_agree(case in 0..CASES.len(), size in 0u8..4, q in any::<bool>(), bytes in any::<[u8; 16]>()) {
        // Narrow values hit equal lanes, zero lanes and tiny floats far more often.
        let (mnemonic, shape) = CASES[case];
        let small: Vec<u64> = bytes.iter().map(|b| (*b as u64 & 0x3) * 0x0101_0101_0101_0101).collect();
        let mut words = [0u64; 16];
        words.copy_from_slice(&small);
        let op = build(mnemonic, shape, size, q, bytes[0]);
        assert_equivalent(op, &seeded_state(&words, small[0], small[1]));
    }
}
