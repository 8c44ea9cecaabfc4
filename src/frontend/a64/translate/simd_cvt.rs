use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::simd_helpers::float_to_int_helper;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::RegisterSize;
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;
use crate::soft::fp::RoundingMode;

fn check_wide(op: &OpCode64) {
    if op.size_f() != 1 {
        panic!("Invalid float size {} for {:?}", op.size_f(), op.mnemonic);
    }
}

impl<'a> TranslatorVisitor<'a> {
    /// Integer on the stack to a float of `size_f`. Only a 32-bit source
    /// into a double is exact; everything else rounds by FPCR.RMode.
    fn emit_int_to_float(&mut self, size_f: usize, signed: bool, source_32: bool) {
        if size_f == 1 && source_32 {
            self.ctx.emit(if signed { Op::ConvR8 } else { Op::ConvR8Un });
            return;
        }
        if source_32 {
            self.ctx.emit(if signed { Op::ConvI8 } else { Op::ConvU8 });
        }
        self.ctx.emit_call(if size_f == 1 { Helper::IntToF64(signed) } else { Helper::IntToF32(signed) });
    }

    /// Float on the stack to an integer of `to_64` width: scale by
    /// `2^fbits`, round with `mode` (or truncate), then saturate.
    fn emit_float_to_int(&mut self, size_f: usize, mode: Option<RoundingMode>, signed: bool, to_64: bool, fbits: Option<u8>) {
        if let Some(fbits) = fbits {
            self.emit_scale_f(fbits as i32, size_f);
        }
        if let Some(mode) = mode {
            self.ctx.emit_call(if size_f == 1 { Helper::RoundF64(Some(mode)) } else { Helper::RoundF32(Some(mode)) });
        }
        self.ctx.emit_call(float_to_int_helper(size_f, to_64, signed));
    }

    /// FCVT (scalar) between single and double; `size` names the source.
    pub fn fcvt_s(&mut self, op: &OpCode64) -> EmitResult {
        let src = op.size_f();
        let dst = 1 - src;
        self.emit_build_vector_f(None, 1, dst, 0, |v, _| {
            v.ctx.emit_vector_extract_f(op.rn, 0, src);
            if dst == 1 {
                v.ctx.emit(Op::ConvR8);
            } else {
                v.ctx.emit_call(Helper::NarrowF64ToF32);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// FCVTL/FCVTL2: widen two singles from the lower (or upper) half of Vn
    /// to doubles. `size` names the destination.
    pub fn fcvtl_v(&mut self, op: &OpCode64) -> EmitResult {
        check_wide(op);
        let base = op.part() * 2;
        self.emit_build_vector_f(None, 2, 1, 0, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, base + i, 0);
            v.ctx.emit(Op::ConvR8);
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// FCVTN/FCVTN2: narrow two doubles into the lower (or upper) half of Vd.
    /// `size` names the source.
    pub fn fcvtn_v(&mut self, op: &OpCode64) -> EmitResult {
        check_wide(op);
        let part = op.part();
        let keep = if part == 1 { Some(op.rd) } else { None };
        self.emit_build_vector_f(keep, 2, 0, part * 2, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, 1);
            v.ctx.emit_call(Helper::NarrowF64ToF32);
        });
        self.emit_commit(op);
        Ok(())
    }

    /// FCVT{Z,N,A,M,P}{S,U} to a general-purpose register.
    pub fn fcvt_gp(&mut self, op: &OpCode64, mode: Option<RoundingMode>, signed: bool, fixed: bool) -> EmitResult {
        let size_f = op.size_f();
        let to_64 = op.reg_size == RegisterSize::Int64;
        self.ctx.emit_vector_extract_f(op.rn, 0, size_f);
        self.emit_float_to_int(size_f, mode, signed, to_64, fixed.then_some(op.fbits));
        self.ctx.emit_st_intzr(op.rd, op.reg_size);
        Ok(())
    }

    /// FCVT{Z,N}{S,U} into SIMD lanes of the same width as the source.
    pub fn fcvt_simd(
        &mut self,
        op: &OpCode64,
        mode: Option<RoundingMode>,
        signed: bool,
        scalar: bool,
        fixed: bool,
    ) -> EmitResult {
        let size_f = op.size_f();
        let elems = if scalar { 1 } else { op.elems_f() };
        let fbits = fixed.then_some(op.fbits);
        self.emit_build_vector(None, elems, size_f + 2, 0, |v, i| {
            v.ctx.emit_vector_extract_f(op.rn, i, size_f);
            v.emit_float_to_int(size_f, mode, signed, size_f == 1, fbits);
            if size_f == 0 {
                v.ctx.emit(Op::ConvU8);
            }
        });
        if scalar {
            self.ctx.emit_st_vec(op.rd);
        } else {
            self.emit_commit(op);
        }
        Ok(())
    }

    /// SCVTF/UCVTF from a general-purpose register.
    pub fn cvtf_gp(&mut self, op: &OpCode64, signed: bool, fixed: bool) -> EmitResult {
        let size_f = op.size_f();
        self.emit_build_vector_f(None, 1, size_f, 0, |v, _| {
            v.ctx.emit_ld_intzr(op.rn, op.reg_size);
            v.emit_int_to_float(size_f, signed, op.reg_size == RegisterSize::Int32);
            if fixed {
                v.emit_scale_f(-(op.fbits as i32), size_f);
            }
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SCVTF/UCVTF on SIMD lanes.
    pub fn cvtf_simd(&mut self, op: &OpCode64, signed: bool, scalar: bool, fixed: bool) -> EmitResult {
        let size_f = op.size_f();
        let size = size_f + 2;
        self.emit_float_lanes(op, scalar, |v, i| {
            v.ctx.emit_vector_extract(op.rn, i, size, signed);
            v.emit_int_to_float(size_f, signed, false);
            if fixed {
                v.emit_scale_f(-(op.fbits as i32), size_f);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::exec::CpuState;
    use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
    use crate::frontend::a64::translate::testing::run;
    use crate::soft::fp::RoundingMode;
    use crate::vector::Vector128;

    const MODES: [RoundingMode; 4] = [
        RoundingMode::ToNearest,
        RoundingMode::TowardsPlusInfinity,
        RoundingMode::TowardsMinusInfinity,
        RoundingMode::TowardsZero,
    ];

    fn with_mode(mode: RoundingMode) -> CpuState {
        let mut state = CpuState::new();
        state.fpcr = mode.fpcr_bits().unwrap();
        state
    }

    fn to_gp(op: OpCode64, value: f64) -> u64 {
        let mut state = CpuState::new();
        state.v[1] = if op.size == 1 {
            Vector128::ZERO.insert_f64(0, value)
        } else {
            Vector128::ZERO.insert_f32(0, value as f32)
        };
        run(&[op.rd(0).rn(1)], &mut state);
        state.x[0]
    }

    #[test]
    fn test_fcvtzs_truncates_and_saturates() {
        let w = OpCode64::new(Mnemonic::FCVTZS_Gp, 0).w().elem(1);
        assert_eq!(to_gp(w, 3.7), 3);
        assert_eq!(to_gp(w, -3.7), (-3i32) as u32 as u64);
        assert_eq!(to_gp(w, -1e20), i32::MIN as u32 as u64);
        assert_eq!(to_gp(w, f64::NAN), 0);

        let x = OpCode64::new(Mnemonic::FCVTZU_Gp, 0).x().elem(0);
        assert_eq!(to_gp(x, -5.0), 0);
        assert_eq!(to_gp(x, 1e30), u64::MAX);
    }

    #[test]
    fn test_fcvt_rounding_modes() {
        let ms = OpCode64::new(Mnemonic::FCVTMS_Gp, 0).x().elem(1);
        let ps = OpCode64::new(Mnemonic::FCVTPS_Gp, 0).x().elem(1);
        let au = OpCode64::new(Mnemonic::FCVTAU_Gp, 0).w().elem(0);
        assert_eq!(to_gp(ms, -1.5), -2i64 as u64);
        assert_eq!(to_gp(ps, 1.25), 2);
        assert_eq!(to_gp(au, 2.5), 3);
    }

    #[test]
    fn test_fcvtzu_fixed_point() {
        let op = OpCode64::new(Mnemonic::FCVTZU_Gp_Fixed, 0).x().elem(1).fbits(4);
        assert_eq!(to_gp(op, 1.5), 24);
    }

    #[test]
    fn test_fcvtns_vector_ties_to_even() {
        let mut state = CpuState::new();
        state.v[1] = Vector128::ZERO.insert_f32(0, 0.5).insert_f32(1, 1.5).insert_f32(2, 2.5).insert_f32(3, -2.5);
        run(&[OpCode64::new(Mnemonic::FCVTNS_V, 0).q().regs(0, 1, 0).elem(0)], &mut state);
        assert_eq!(state.v[0].to_u32_lanes(), [0, 2, 2, -2i32 as u32]);
    }

    #[test]
    fn test_scvtf_and_ucvtf_from_gp() {
        let mut state = CpuState::new();
        state.x[1] = 0xFFFF_FFFF;
        state.x[2] = 256;
        let ops = [
            OpCode64::new(Mnemonic::SCVTF_Gp, 0).w().rd(0).rn(1).elem(0),
            OpCode64::new(Mnemonic::UCVTF_Gp, 4).w().rd(3).rn(1).elem(1),
            OpCode64::new(Mnemonic::SCVTF_Gp_Fixed, 8).x().rd(4).rn(2).elem(1).fbits(8),
        ];
        run(&ops, &mut state);
        assert_eq!(state.v[0], Vector128::ZERO.insert_f32(0, -1.0));
        assert_eq!(state.v[3], Vector128::ZERO.insert_f64(0, 4294967295.0));
        assert_eq!(state.v[4], Vector128::ZERO.insert_f64(0, 1.0));
    }

    #[test]
    fn test_cvtf_vector_lanes() {
        let mut state = CpuState::new();
        state.v[1] = Vector128::new(-4i64 as u64, 10);
        let ops = [
            OpCode64::new(Mnemonic::SCVTF_V, 0).q().regs(2, 1, 0).elem(1),
            OpCode64::new(Mnemonic::UCVTF_V_Fixed, 4).q().regs(3, 1, 0).elem(1).fbits(1),
        ];
        run(&ops, &mut state);
        assert_eq!(state.v[2], Vector128::ZERO.insert_f64(0, -4.0).insert_f64(1, 10.0));
        assert_eq!(state.v[3].extract_f64(1), 5.0);
        assert_eq!(state.v[3].extract_f64(0), (u64::MAX - 3) as f64 / 2.0);
    }

    #[test]
    fn test_precision_conversions() {
        let mut state = CpuState::new();
        state.v[1] = Vector128::ZERO.insert_f32(0, 1.5).insert_f32(1, -2.0).insert_f32(2, 3.0).insert_f32(3, 0.25);
        state.v[2] = Vector128::ZERO.insert_f64(0, 0.5).insert_f64(1, 8.0);
        state.v[5] = Vector128::new(0x1234, 0xFFFF);
        let ops = [
            OpCode64::new(Mnemonic::FCVT_S, 0).regs(0, 1, 0).elem(0),
            OpCode64::new(Mnemonic::FCVTL_V, 4).q().regs(3, 1, 0).elem(1),
            OpCode64::new(Mnemonic::FCVTN_V, 8).d().regs(4, 2, 0).elem(1),
            OpCode64::new(Mnemonic::FCVTN_V, 12).q().regs(5, 2, 0).elem(1),
        ];
        run(&ops, &mut state);
        assert_eq!(state.v[0], Vector128::ZERO.insert_f64(0, 1.5));
        assert_eq!(state.v[3], Vector128::ZERO.insert_f64(0, 3.0).insert_f64(1, 0.25));
        assert_eq!(state.v[4], Vector128::ZERO.insert_f32(0, 0.5).insert_f32(1, 8.0));
        assert_eq!(state.v[5], Vector128::new(0x1234, 0).insert_f32(2, 0.5).insert_f32(3, 8.0));
    }

    #[test]
    fn test_scvtf_gp_follows_fpcr() {
        let two53 = 9007199254740992.0;
        // (mode, 2^53 + 1, -(2^53 + 1)) into a double
        let expected = [
            (two53, -two53),
            (two53 + 2.0, -two53),
            (two53, -two53 - 2.0),
            (two53, -two53),
        ];
        for (mode, (pos, neg)) in MODES.into_iter().zip(expected) {
            let mut state = with_mode(mode);
            state.x[1] = (1 << 53) + 1;
            state.x[2] = state.x[1].wrapping_neg();
            let ops = [
                OpCode64::new(Mnemonic::SCVTF_Gp, 0).x().rd(0).rn(1).elem(1),
                OpCode64::new(Mnemonic::SCVTF_Gp, 4).x().rd(3).rn(2).elem(1),
            ];
            run(&ops, &mut state);
            assert_eq!(state.v[0].extract_f64(0), pos, "{:?}", mode);
            assert_eq!(state.v[3].extract_f64(0), neg, "{:?}", mode);
        }
    }

    #[test]
    fn test_cvtf_gp_to_single_follows_fpcr() {
        // W form: 2^24 + 1 needs rounding into a single.
        // X form unsigned: u64::MAX rounds to 2^64 or the single below it.
        let below_2_64 = f32::from_bits(0x5F7F_FFFF);
        let expected = [
            (16777216.0, 18446744073709551616.0f32),
            (16777218.0, 18446744073709551616.0),
            (16777216.0, below_2_64),
            (16777216.0, below_2_64),
        ];
        for (mode, (w, x)) in MODES.into_iter().zip(expected) {
            let mut state = with_mode(mode);
            state.x[1] = (1 << 24) + 1;
            state.x[2] = u64::MAX;
            let ops = [
                OpCode64::new(Mnemonic::SCVTF_Gp, 0).w().rd(0).rn(1).elem(0),
                OpCode64::new(Mnemonic::UCVTF_Gp, 4).x().rd(3).rn(2).elem(0),
            ];
            run(&ops, &mut state);
            assert_eq!(state.v[0].extract_f32(0), w, "{:?}", mode);
            assert_eq!(state.v[3].extract_f32(0), x, "{:?}", mode);
        }
    }

    #[test]
    fn test_word_to_double_is_exact_in_every_mode() {
        for mode in MODES {
            let mut state = with_mode(mode);
            state.x[1] = 0xFFFF_FFFF;
            let ops = [
                OpCode64::new(Mnemonic::SCVTF_Gp, 0).w().rd(0).rn(1).elem(1),
                OpCode64::new(Mnemonic::UCVTF_Gp_Fixed, 4).w().rd(2).rn(1).elem(1).fbits(4),
            ];
            run(&ops, &mut state);
            assert_eq!(state.v[0].extract_f64(0), -1.0);
            assert_eq!(state.v[2].extract_f64(0), 4294967295.0 / 16.0);
        }
    }

    #[test]
    fn test_scvtf_vector_follows_fpcr() {
        // Lanes 2^24 + 1, -(2^24 + 1), 2^24 + 3, 7
        let lanes = [(1u32 << 24) + 1, ((1i32 << 24) + 1).wrapping_neg() as u32, (1 << 24) + 3, 7];
        let expected = [
            [16777216.0, -16777216.0, 16777220.0, 7.0],
            [16777218.0, -16777216.0, 16777220.0, 7.0],
            [16777216.0, -16777218.0, 16777218.0, 7.0],
            [16777216.0, -16777216.0, 16777218.0, 7.0],
        ];
        for (mode, want) in MODES.into_iter().zip(expected) {
            let mut state = with_mode(mode);
            state.v[1] = Vector128::from_u32_lanes(lanes);
            run(&[OpCode64::new(Mnemonic::SCVTF_V, 0).q().regs(0, 1, 0).elem(0)], &mut state);
            let got: Vec<f32> = (0..4).map(|i| state.v[0].extract_f32(i)).collect();
            assert_eq!(got, want, "{:?}", mode);
        }
    }

    #[test]
    fn test_narrowing_follows_fpcr() {
        let ulp = f32::EPSILON as f64;
        let up = 1.0 + f32::EPSILON;
        // (FCVT of 1 + 0.75 ulp, FCVTN lanes of -(1 + 0.25 ulp) and f64::MAX)
        let expected = [
            (up, -1.0, f32::INFINITY),
            (up, -1.0, f32::INFINITY),
            (1.0, -up, f32::MAX),
            (1.0, -1.0, f32::MAX),
        ];
        for (mode, (scalar, lane0, lane1)) in MODES.into_iter().zip(expected) {
            let mut state = with_mode(mode);
            state.v[1] = Vector128::ZERO.insert_f64(0, 1.0 + 0.75 * ulp);
            state.v[2] = Vector128::ZERO.insert_f64(0, -(1.0 + 0.25 * ulp)).insert_f64(1, f64::MAX);
            let ops = [
                OpCode64::new(Mnemonic::FCVT_S, 0).regs(0, 1, 0).elem(1),
                OpCode64::new(Mnemonic::FCVTN_V, 4).d().regs(3, 2, 0).elem(1),
            ];
            run(&ops, &mut state);
            assert_eq!(state.v[0], Vector128::ZERO.insert_f32(0, scalar), "{:?}", mode);
            assert_eq!(state.v[3].extract_f32(0), lane0, "{:?}", mode);
            assert_eq!(state.v[3].extract_f32(1), lane1, "{:?}", mode);
        }
    }
}
