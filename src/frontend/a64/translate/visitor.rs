use log::warn;

use crate::backend::{
    AesOp, VecFloatOp, VecFloatUnaryOp, VecIntOp, VecIntUnaryOp, VecShiftOp, VectorBackend,
};
use crate::config::EmitterConfig;
use crate::error::{EmitError, EmitResult};
use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
use crate::frontend::a64::translate::data_processing_csel::SelectKind;
use crate::frontend::a64::translate::simd_shift::RightShift;
use crate::frontend::a64::types::ShiftType;
use crate::ir::emitter::EmitterContext;
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;
use crate::soft::fp::RoundingMode;

/// Translator visitor: appends the semantics of decoded opcodes to an
/// emission context.
///
/// The visitor never stores the opcode it is handed; everything an emitter
/// needs is read from the `OpCode64` and the shared configuration.
pub struct TranslatorVisitor<'a> {
    pub ctx: &'a mut EmitterContext,
    pub config: &'a EmitterConfig,
}

impl<'a> TranslatorVisitor<'a> {
    pub fn new(ctx: &'a mut EmitterContext, config: &'a EmitterConfig) -> Self {
        Self { ctx, config }
    }

    /// Vector backend picked when the configuration was built.
    pub fn backend(&self) -> &'a dyn VectorBackend {
        self.config.backend()
    }

    /// Report an opcode shape this core does not implement.
    pub fn unsupported(&self, op: &OpCode64) -> EmitResult {
        warn!("unsupported {:?} at {:#x}", op.mnemonic, op.address);
        Err(EmitError::Unsupported { mnemonic: op.mnemonic, address: op.address })
    }

    /// Emit one opcode.
    pub fn dispatch(&mut self, op: &OpCode64) -> EmitResult {
        use Mnemonic::*;

        self.ctx.set_current_op(*op);

        match op.mnemonic {
            // --- Add/subtract ---
            ADD_imm => self.add_sub_imm(op, false, false),
            ADDS_imm => self.add_sub_imm(op, false, true),
            SUB_imm => self.add_sub_imm(op, true, false),
            SUBS_imm => self.add_sub_imm(op, true, true),
            ADD_shift => self.add_sub_shift(op, false, false),
            ADDS_shift => self.add_sub_shift(op, false, true),
            SUB_shift => self.add_sub_shift(op, true, false),
            SUBS_shift => self.add_sub_shift(op, true, true),
            ADD_ext => self.add_sub_ext(op, false, false),
            ADDS_ext => self.add_sub_ext(op, false, true),
            SUB_ext => self.add_sub_ext(op, true, false),
            SUBS_ext => self.add_sub_ext(op, true, true),
            ADC => self.adc_sbc(op, false, false),
            ADCS => self.adc_sbc(op, false, true),
            SBC => self.adc_sbc(op, true, false),
            SBCS => self.adc_sbc(op, true, true),

            // --- Logical ---
            AND_imm => self.logical_imm(op, Op::And, false),
            ANDS_imm => self.logical_imm(op, Op::And, true),
            ORR_imm => self.logical_imm(op, Op::Or, false),
            EOR_imm => self.logical_imm(op, Op::Xor, false),
            AND_shift => self.logical_shift(op, Op::And, false, false),
            ANDS_shift => self.logical_shift(op, Op::And, false, true),
            BIC_shift => self.logical_shift(op, Op::And, true, false),
            BICS_shift => self.logical_shift(op, Op::And, true, true),
            ORR_shift => self.logical_shift(op, Op::Or, false, false),
            ORN_shift => self.logical_shift(op, Op::Or, true, false),
            EOR_shift => self.logical_shift(op, Op::Xor, false, false),
            EON_shift => self.logical_shift(op, Op::Xor, true, false),

            // --- Shift, extract, bit counting ---
            LSLV => self.shift_variable(op, ShiftType::LSL),
            LSRV => self.shift_variable(op, ShiftType::LSR),
            ASRV => self.shift_variable(op, ShiftType::ASR),
            RORV => self.shift_variable(op, ShiftType::ROR),
            EXTR => self.extr(op),
            CLS => self.cls(op),
            CLZ => self.clz(op),
            RBIT => self.rbit(op),
            REV16 => self.rev16(op),
            REV32 => self.rev32(op),
            REV64 => self.rev64(op),

            // --- Multiply and divide ---
            SDIV => self.div(op, true),
            UDIV => self.div(op, false),
            MADD => self.madd(op, false),
            MSUB => self.madd(op, true),
            SMADDL => self.maddl(op, true, false),
            SMSUBL => self.maddl(op, true, true),
            UMADDL => self.maddl(op, false, false),
            UMSUBL => self.maddl(op, false, true),
            SMULH => self.mulh(op, true),
            UMULH => self.mulh(op, false),

            // --- Moves and addresses ---
            MOVZ => self.movz(op),
            MOVN => self.movn(op),
            MOVK => self.movk(op),
            ADR => self.adr(op),
            ADRP => self.adrp(op),

            // --- Conditional ---
            CCMN_imm => self.ccmp(op, true, true),
            CCMN_reg => self.ccmp(op, true, false),
            CCMP_imm => self.ccmp(op, false, true),
            CCMP_reg => self.ccmp(op, false, false),
            CSEL => self.csel(op, SelectKind::Plain),
            CSINC => self.csel(op, SelectKind::Increment),
            CSINV => self.csel(op, SelectKind::Invert),
            CSNEG => self.csel(op, SelectKind::Negate),

            // --- Bitfield ---
            BFM => self.bfm(op),
            SBFM => self.sbfm(op),
            UBFM => self.ubfm(op),

            // --- Branches ---
            B => self.b(op),
            B_cond => self.b_cond(op),
            BL => self.bl(op),
            BR => self.br(op),
            BLR => self.blr(op),
            RET => self.ret(op),
            CBZ => self.cbz(op, false),
            CBNZ => self.cbz(op, true),
            TBZ => self.tbz(op, false),
            TBNZ => self.tbz(op, true),

            // --- Exceptions and system ---
            SVC => self.svc(op),
            BRK => self.brk(op),
            UND => self.und(op),
            MRS => self.mrs(op),
            MSR => self.msr(op),
            NOP | HINT | DMB | DSB | ISB | PRFM => Ok(()),
            CLREX => self.clrex(op),
            SYS => self.sys(op),

            // --- CRC ---
            CRC32 => self.crc32(op, false),
            CRC32C => self.crc32(op, true),

            // --- SIMD integer arithmetic ---
            ADD_S => self.scalar_int_op(op, VecIntOp::Add),
            ADD_V => self.vector_int_op(op, VecIntOp::Add),
            SUB_S => self.scalar_int_op(op, VecIntOp::Sub),
            SUB_V => self.vector_int_op(op, VecIntOp::Sub),
            MUL_V => self.mul_v(op),
            MUL_Ve => self.mul_ve(op),
            MLA_V => self.mla_v(op, false),
            MLA_Ve => self.mla_ve(op, false),
            MLS_V => self.mla_v(op, true),
            MLS_Ve => self.mla_ve(op, true),
            NEG_S => self.neg_abs_s(op, false),
            NEG_V => self.vector_int_unary(op, VecIntUnaryOp::Neg),
            ABS_S => self.neg_abs_s(op, true),
            ABS_V => self.vector_int_unary(op, VecIntUnaryOp::Abs),
            ADDP_S => self.addp_s(op),
            ADDP_V => self.pairwise_v(op, Pairwise::Add),
            ADDV_V => self.reduce_v(op, Pairwise::Add, false),
            SADDLV_V => self.saddlv_v(op, true),
            UADDLV_V => self.saddlv_v(op, false),
            SMAX_V => self.vector_int_op(op, VecIntOp::SMax),
            SMIN_V => self.vector_int_op(op, VecIntOp::SMin),
            UMAX_V => self.vector_int_op(op, VecIntOp::UMax),
            UMIN_V => self.vector_int_op(op, VecIntOp::UMin),
            SMAXP_V => self.pairwise_v(op, Pairwise::SMax),
            SMINP_V => self.pairwise_v(op, Pairwise::SMin),
            UMAXP_V => self.pairwise_v(op, Pairwise::UMax),
            UMINP_V => self.pairwise_v(op, Pairwise::UMin),
            SMAXV_V => self.reduce_v(op, Pairwise::SMax, true),
            SMINV_V => self.reduce_v(op, Pairwise::SMin, true),
            UMAXV_V => self.reduce_v(op, Pairwise::UMax, false),
            UMINV_V => self.reduce_v(op, Pairwise::UMin, false),
            SABD_V => self.abd_v(op, true, false),
            UABD_V => self.abd_v(op, false, false),
            SABA_V => self.abd_v(op, true, true),
            UABA_V => self.abd_v(op, false, true),
            SABDL_V => self.abdl_v(op, true, false),
            UABDL_V => self.abdl_v(op, false, false),
            SABAL_V => self.abdl_v(op, true, true),
            UABAL_V => self.abdl_v(op, false, true),
            SHADD_V => self.halving_v(op, true, false, false),
            UHADD_V => self.halving_v(op, false, false, false),
            SHSUB_V => self.halving_v(op, true, true, false),
            UHSUB_V => self.halving_v(op, false, true, false),
            SRHADD_V => self.halving_v(op, true, false, true),
            URHADD_V => self.vector_int_op(op, VecIntOp::URHadd),
            SADDLP_V => self.addlp_v(op, true, false),
            UADDLP_V => self.addlp_v(op, false, false),
            SADALP_V => self.addlp_v(op, true, true),
            UADALP_V => self.addlp_v(op, false, true),
            SQADD_S => self.scalar_int_op(op, VecIntOp::SqAdd),
            SQADD_V => self.vector_int_op(op, VecIntOp::SqAdd),
            UQADD_S => self.scalar_int_op(op, VecIntOp::UqAdd),
            UQADD_V => self.vector_int_op(op, VecIntOp::UqAdd),
            SQSUB_S => self.scalar_int_op(op, VecIntOp::SqSub),
            SQSUB_V => self.vector_int_op(op, VecIntOp::SqSub),
            UQSUB_S => self.scalar_int_op(op, VecIntOp::UqSub),
            UQSUB_V => self.vector_int_op(op, VecIntOp::UqSub),
            SUQADD_S => self.sat_acc(op, true, true),
            SUQADD_V => self.sat_acc(op, true, false),
            USQADD_S => self.sat_acc(op, false, true),
            USQADD_V => self.sat_acc(op, false, false),
            SQABS_S => self.sat_abs_neg(op, false, true),
            SQABS_V => self.sat_abs_neg(op, false, false),
            SQNEG_S => self.sat_abs_neg(op, true, true),
            SQNEG_V => self.sat_abs_neg(op, true, false),
            SQDMULH_S => self.sqdmulh(op, false, true),
            SQDMULH_V => self.sqdmulh(op, false, false),
            SQRDMULH_S => self.sqdmulh(op, true, true),
            SQRDMULH_V => self.sqdmulh(op, true, false),
            SADDL_V => self.long_op(op, true, Op::Add),
            UADDL_V => self.long_op(op, false, Op::Add),
            SSUBL_V => self.long_op(op, true, Op::Sub),
            USUBL_V => self.long_op(op, false, Op::Sub),
            SADDW_V => self.wide_op(op, true, Op::Add),
            UADDW_V => self.wide_op(op, false, Op::Add),
            SSUBW_V => self.wide_op(op, true, Op::Sub),
            USUBW_V => self.wide_op(op, false, Op::Sub),
            SMULL_V => self.long_op(op, true, Op::Mul),
            UMULL_V => self.long_op(op, false, Op::Mul),
            SMULL_Ve => self.mull_ve(op, true),
            UMULL_Ve => self.mull_ve(op, false),
            SMLAL_V => self.mlal(op, true, false, false),
            UMLAL_V => self.mlal(op, false, false, false),
            SMLAL_Ve => self.mlal(op, true, false, true),
            UMLAL_Ve => self.mlal(op, false, false, true),
            SMLSL_V => self.mlal(op, true, true, false),
            UMLSL_V => self.mlal(op, false, true, false),
            SMLSL_Ve => self.mlal(op, true, true, true),
            UMLSL_Ve => self.mlal(op, false, true, true),
            ADDHN_V => self.narrow_high(op, Op::Add, false),
            SUBHN_V => self.narrow_high(op, Op::Sub, false),
            RADDHN_V => self.narrow_high(op, Op::Add, true),
            RSUBHN_V => self.narrow_high(op, Op::Sub, true),
            CNT_V => self.vector_int_unary(op, VecIntUnaryOp::Cnt),
            CLZ_V => self.count_v(op, false),
            CLS_V => self.count_v(op, true),
            RBIT_V => self.rbit_v(op),
            REV16_V => self.rev_v(op, 1),
            REV32_V => self.rev_v(op, 2),
            REV64_V => self.rev_v(op, 3),

            // --- SIMD float arithmetic ---
            FADD_S => self.scalar_float_op(op, VecFloatOp::Add),
            FADD_V => self.vector_float_op(op, VecFloatOp::Add),
            FSUB_S => self.scalar_float_op(op, VecFloatOp::Sub),
            FSUB_V => self.vector_float_op(op, VecFloatOp::Sub),
            FMUL_S => self.scalar_float_op(op, VecFloatOp::Mul),
            FMUL_V => self.vector_float_op(op, VecFloatOp::Mul),
            FMUL_Se => self.fmul_se(op, false),
            FMUL_Ve => self.fmul_ve(op, false),
            FDIV_S => self.scalar_float_op(op, VecFloatOp::Div),
            FDIV_V => self.vector_float_op(op, VecFloatOp::Div),
            FABD_S => self.fabd(op, true),
            FABD_V => self.fabd(op, false),
            FMULX_S => self.float_helper_op(op, FloatHelper::MulX, true),
            FMULX_V => self.float_helper_op(op, FloatHelper::MulX, false),
            FMULX_Se => self.fmul_se(op, true),
            FMULX_Ve => self.fmul_ve(op, true),
            FABS_S => self.scalar_float_unary(op, VecFloatUnaryOp::Abs),
            FABS_V => self.vector_float_unary(op, VecFloatUnaryOp::Abs),
            FNEG_S => self.scalar_float_unary(op, VecFloatUnaryOp::Neg),
            FNEG_V => self.vector_float_unary(op, VecFloatUnaryOp::Neg),
            FSQRT_S => self.scalar_float_unary(op, VecFloatUnaryOp::Sqrt),
            FSQRT_V => self.vector_float_unary(op, VecFloatUnaryOp::Sqrt),
            FMAX_S => self.float_helper_op(op, FloatHelper::Max, true),
            FMAX_V => self.float_helper_op(op, FloatHelper::Max, false),
            FMIN_S => self.float_helper_op(op, FloatHelper::Min, true),
            FMIN_V => self.float_helper_op(op, FloatHelper::Min, false),
            FMAXNM_S => self.float_helper_op(op, FloatHelper::MaxNum, true),
            FMAXNM_V => self.float_helper_op(op, FloatHelper::MaxNum, false),
            FMINNM_S => self.float_helper_op(op, FloatHelper::MinNum, true),
            FMINNM_V => self.float_helper_op(op, FloatHelper::MinNum, false),
            FADDP_S => self.faddp_s(op),
            FADDP_V => self.float_pairwise_v(op, None),
            FMAXP_V => self.float_pairwise_v(op, Some(FloatHelper::Max)),
            FMINP_V => self.float_pairwise_v(op, Some(FloatHelper::Min)),
            FMLA_V => self.fmla_v(op, false),
            FMLA_Se => self.fmla_se(op, false),
            FMLA_Ve => self.fmla_ve(op, false),
            FMLS_V => self.fmla_v(op, true),
            FMLS_Se => self.fmla_se(op, true),
            FMLS_Ve => self.fmla_ve(op, true),
            FMADD_S => self.fmadd_s(op, false, false),
            FMSUB_S => self.fmadd_s(op, true, false),
            FNMADD_S => self.fmadd_s(op, true, true),
            FNMSUB_S => self.fmadd_s(op, false, true),
            FNMUL_S => self.fnmul_s(op),
            FRINTA_S => self.frint(op, Some(RoundingMode::TiesAway), true),
            FRINTA_V => self.frint(op, Some(RoundingMode::TiesAway), false),
            FRINTI_S | FRINTX_S => self.frint(op, None, true),
            FRINTI_V | FRINTX_V => self.frint(op, None, false),
            FRINTM_S => self.frint(op, Some(RoundingMode::TowardsMinusInfinity), true),
            FRINTM_V => self.frint(op, Some(RoundingMode::TowardsMinusInfinity), false),
            FRINTN_S => self.frint(op, Some(RoundingMode::ToNearest), true),
            FRINTN_V => self.frint(op, Some(RoundingMode::ToNearest), false),
            FRINTP_S => self.frint(op, Some(RoundingMode::TowardsPlusInfinity), true),
            FRINTP_V => self.frint(op, Some(RoundingMode::TowardsPlusInfinity), false),
            FRINTZ_S => self.frint(op, Some(RoundingMode::TowardsZero), true),
            FRINTZ_V => self.frint(op, Some(RoundingMode::TowardsZero), false),
            FRECPE_S => self.float_estimate(op, FloatHelper::RecipEstimate, true),
            FRECPE_V => self.float_estimate(op, FloatHelper::RecipEstimate, false),
            FRECPS_S => self.float_helper_op(op, FloatHelper::RecipStep, true),
            FRECPS_V => self.float_helper_op(op, FloatHelper::RecipStep, false),
            FRSQRTE_S => self.float_estimate(op, FloatHelper::InvSqrtEstimate, true),
            FRSQRTE_V => self.float_estimate(op, FloatHelper::InvSqrtEstimate, false),
            FRSQRTS_S => self.float_helper_op(op, FloatHelper::RsqrtStep, true),
            FRSQRTS_V => self.float_helper_op(op, FloatHelper::RsqrtStep, false),
            FRECPX_S => self.float_estimate(op, FloatHelper::RecipExponent, true),

            // --- SIMD compare ---
            CMEQ_S => self.scalar_int_op(op, VecIntOp::CmEq),
            CMEQ_V => self.vector_int_op(op, VecIntOp::CmEq),
            CMEQ_Sz => self.cmp_zero(op, VecIntOp::CmEq, false, true),
            CMEQ_Vz => self.cmp_zero(op, VecIntOp::CmEq, false, false),
            CMGE_S => self.scalar_int_op(op, VecIntOp::CmGe),
            CMGE_V => self.vector_int_op(op, VecIntOp::CmGe),
            CMGE_Sz => self.cmp_zero(op, VecIntOp::CmGe, false, true),
            CMGE_Vz => self.cmp_zero(op, VecIntOp::CmGe, false, false),
            CMGT_S => self.scalar_int_op(op, VecIntOp::CmGt),
            CMGT_V => self.vector_int_op(op, VecIntOp::CmGt),
            CMGT_Sz => self.cmp_zero(op, VecIntOp::CmGt, false, true),
            CMGT_Vz => self.cmp_zero(op, VecIntOp::CmGt, false, false),
            CMLE_Sz => self.cmp_zero(op, VecIntOp::CmGe, true, true),
            CMLE_Vz => self.cmp_zero(op, VecIntOp::CmGe, true, false),
            CMLT_Sz => self.cmp_zero(op, VecIntOp::CmGt, true, true),
            CMLT_Vz => self.cmp_zero(op, VecIntOp::CmGt, true, false),
            CMHI_S => self.scalar_int_op(op, VecIntOp::CmHi),
            CMHI_V => self.vector_int_op(op, VecIntOp::CmHi),
            CMHS_S => self.scalar_int_op(op, VecIntOp::CmHs),
            CMHS_V => self.vector_int_op(op, VecIntOp::CmHs),
            CMTST_S => self.scalar_int_op(op, VecIntOp::CmTst),
            CMTST_V => self.vector_int_op(op, VecIntOp::CmTst),
            FCMEQ_S => self.scalar_float_op(op, VecFloatOp::CmEq),
            FCMEQ_V => self.vector_float_op(op, VecFloatOp::CmEq),
            FCMEQ_Sz => self.fcmp_zero(op, VecFloatOp::CmEq, false, true),
            FCMEQ_Vz => self.fcmp_zero(op, VecFloatOp::CmEq, false, false),
            FCMGE_S => self.scalar_float_op(op, VecFloatOp::CmGe),
            FCMGE_V => self.vector_float_op(op, VecFloatOp::CmGe),
            FCMGE_Sz => self.fcmp_zero(op, VecFloatOp::CmGe, false, true),
            FCMGE_Vz => self.fcmp_zero(op, VecFloatOp::CmGe, false, false),
            FCMGT_S => self.scalar_float_op(op, VecFloatOp::CmGt),
            FCMGT_V => self.vector_float_op(op, VecFloatOp::CmGt),
            FCMGT_Sz => self.fcmp_zero(op, VecFloatOp::CmGt, false, true),
            FCMGT_Vz => self.fcmp_zero(op, VecFloatOp::CmGt, false, false),
            FCMLE_Sz => self.fcmp_zero(op, VecFloatOp::CmGe, true, true),
            FCMLE_Vz => self.fcmp_zero(op, VecFloatOp::CmGe, true, false),
            FCMLT_Sz => self.fcmp_zero(op, VecFloatOp::CmGt, true, true),
            FCMLT_Vz => self.fcmp_zero(op, VecFloatOp::CmGt, true, false),
            FCMP_S | FCMPE_S => self.fcmp(op, false),
            FCMP_Sz | FCMPE_Sz => self.fcmp(op, true),
            FCCMP_S | FCCMPE_S => self.fccmp(op),
            FCSEL_S => self.fcsel(op),

            // --- SIMD convert ---
            FCVT_S => self.fcvt_s(op),
            FCVTL_V => self.fcvtl_v(op),
            FCVTN_V => self.fcvtn_v(op),
            FCVTZS_Gp => self.fcvt_gp(op, None, true, false),
            FCVTZS_Gp_Fixed => self.fcvt_gp(op, None, true, true),
            FCVTZS_S => self.fcvt_simd(op, None, true, true, false),
            FCVTZS_V => self.fcvt_simd(op, None, true, false, false),
            FCVTZS_V_Fixed => self.fcvt_simd(op, None, true, false, true),
            FCVTZU_Gp => self.fcvt_gp(op, None, false, false),
            FCVTZU_Gp_Fixed => self.fcvt_gp(op, None, false, true),
            FCVTZU_S => self.fcvt_simd(op, None, false, true, false),
            FCVTZU_V => self.fcvt_simd(op, None, false, false, false),
            FCVTZU_V_Fixed => self.fcvt_simd(op, None, false, false, true),
            FCVTNS_S => self.fcvt_simd(op, Some(RoundingMode::ToNearest), true, true, false),
            FCVTNS_V => self.fcvt_simd(op, Some(RoundingMode::ToNearest), true, false, false),
            FCVTNU_S => self.fcvt_simd(op, Some(RoundingMode::ToNearest), false, true, false),
            FCVTNU_V => self.fcvt_simd(op, Some(RoundingMode::ToNearest), false, false, false),
            FCVTAS_Gp => self.fcvt_gp(op, Some(RoundingMode::TiesAway), true, false),
            FCVTAU_Gp => self.fcvt_gp(op, Some(RoundingMode::TiesAway), false, false),
            FCVTMS_Gp => self.fcvt_gp(op, Some(RoundingMode::TowardsMinusInfinity), true, false),
            FCVTMU_Gp => self.fcvt_gp(op, Some(RoundingMode::TowardsMinusInfinity), false, false),
            FCVTPS_Gp => self.fcvt_gp(op, Some(RoundingMode::TowardsPlusInfinity), true, false),
            FCVTPU_Gp => self.fcvt_gp(op, Some(RoundingMode::TowardsPlusInfinity), false, false),
            SCVTF_Gp => self.cvtf_gp(op, true, false),
            SCVTF_Gp_Fixed => self.cvtf_gp(op, true, true),
            SCVTF_S => self.cvtf_simd(op, true, true, false),
            SCVTF_V => self.cvtf_simd(op, true, false, false),
            SCVTF_V_Fixed => self.cvtf_simd(op, true, false, true),
            UCVTF_Gp => self.cvtf_gp(op, false, false),
            UCVTF_Gp_Fixed => self.cvtf_gp(op, false, true),
            UCVTF_S => self.cvtf_simd(op, false, true, false),
            UCVTF_V => self.cvtf_simd(op, false, false, false),
            UCVTF_V_Fixed => self.cvtf_simd(op, false, false, true),

            // --- SIMD move ---
            FMOV_S => self.fmov_s(op),
            FMOV_Si => self.fmov_si(op),
            FMOV_Vi => self.fmov_vi(op),
            FMOV_Ftoi => self.fmov_ftoi(op, false),
            FMOV_Itof => self.fmov_itof(op, false),
            FMOV_Ftoi1 => self.fmov_ftoi(op, true),
            FMOV_Itof1 => self.fmov_itof(op, true),
            AND_V => self.vector_int_op(op, VecIntOp::And),
            BIC_V => self.vector_int_op(op, VecIntOp::Bic),
            ORR_V => self.vector_int_op(op, VecIntOp::Orr),
            ORN_V => self.vector_int_op(op, VecIntOp::Orn),
            EOR_V => self.vector_int_op(op, VecIntOp::Eor),
            NOT_V => self.vector_int_unary(op, VecIntUnaryOp::Not),
            BSL_V => self.bsl_v(op),
            BIT_V => self.bit_v(op, false),
            BIF_V => self.bit_v(op, true),
            MOVI_V => self.movi_v(op, false),
            MVNI_V => self.movi_v(op, true),
            ORR_Vi => self.orr_bic_vi(op, false),
            BIC_Vi => self.orr_bic_vi(op, true),
            DUP_Gp => self.dup_gp(op),
            DUP_S => self.dup_s(op),
            DUP_V => self.dup_v(op),
            INS_Gp => self.ins_gp(op),
            INS_V => self.ins_v(op),
            UMOV_S => self.mov_s(op, false),
            SMOV_S => self.mov_s(op, true),
            EXT_V => self.ext_v(op),
            TBL_V => self.tbl_v(op),
            TRN1_V => self.trn_v(op, 0),
            TRN2_V => self.trn_v(op, 1),
            ZIP1_V => self.zip_v(op, 0),
            ZIP2_V => self.zip_v(op, 1),
            UZP1_V => self.uzp_v(op, 0),
            UZP2_V => self.uzp_v(op, 1),
            XTN_V => self.xtn(op, Narrowing::Truncate, false),
            SQXTN_S => self.xtn(op, Narrowing::SignedToSigned, true),
            SQXTN_V => self.xtn(op, Narrowing::SignedToSigned, false),
            UQXTN_S => self.xtn(op, Narrowing::UnsignedToUnsigned, true),
            UQXTN_V => self.xtn(op, Narrowing::UnsignedToUnsigned, false),
            SQXTUN_S => self.xtn(op, Narrowing::SignedToUnsigned, true),
            SQXTUN_V => self.xtn(op, Narrowing::SignedToUnsigned, false),

            // --- SIMD shift ---
            SHL_S => self.shift_imm_s(op, VecShiftOp::Shl),
            SHL_V => self.shift_imm_v(op, VecShiftOp::Shl),
            SSHR_S => self.shift_imm_s(op, VecShiftOp::SShr),
            SSHR_V => self.shift_imm_v(op, VecShiftOp::SShr),
            USHR_S => self.shift_imm_s(op, VecShiftOp::UShr),
            USHR_V => self.shift_imm_v(op, VecShiftOp::UShr),
            SSRA_S => self.shr_acc(op, RightShift::SIGNED, true, true),
            SSRA_V => self.shr_acc(op, RightShift::SIGNED, true, false),
            USRA_S => self.shr_acc(op, RightShift::UNSIGNED, true, true),
            USRA_V => self.shr_acc(op, RightShift::UNSIGNED, true, false),
            SRSHR_S => self.shr_acc(op, RightShift::SIGNED_ROUND, false, true),
            SRSHR_V => self.shr_acc(op, RightShift::SIGNED_ROUND, false, false),
            URSHR_S => self.shr_acc(op, RightShift::UNSIGNED_ROUND, false, true),
            URSHR_V => self.shr_acc(op, RightShift::UNSIGNED_ROUND, false, false),
            SRSRA_S => self.shr_acc(op, RightShift::SIGNED_ROUND, true, true),
            SRSRA_V => self.shr_acc(op, RightShift::SIGNED_ROUND, true, false),
            URSRA_S => self.shr_acc(op, RightShift::UNSIGNED_ROUND, true, true),
            URSRA_V => self.shr_acc(op, RightShift::UNSIGNED_ROUND, true, false),
            SHRN_V => self.shr_narrow(op, RightShift::UNSIGNED, Narrowing::Truncate, false),
            RSHRN_V => self.shr_narrow(op, RightShift::UNSIGNED_ROUND, Narrowing::Truncate, false),
            SQSHRN_S => self.shr_narrow(op, RightShift::SIGNED, Narrowing::SignedToSigned, true),
            SQSHRN_V => self.shr_narrow(op, RightShift::SIGNED, Narrowing::SignedToSigned, false),
            UQSHRN_S => self.shr_narrow(op, RightShift::UNSIGNED, Narrowing::UnsignedToUnsigned, true),
            UQSHRN_V => self.shr_narrow(op, RightShift::UNSIGNED, Narrowing::UnsignedToUnsigned, false),
            SQRSHRN_S => self.shr_narrow(op, RightShift::SIGNED_ROUND, Narrowing::SignedToSigned, true),
            SQRSHRN_V => self.shr_narrow(op, RightShift::SIGNED_ROUND, Narrowing::SignedToSigned, false),
            UQRSHRN_S => self.shr_narrow(op, RightShift::UNSIGNED_ROUND, Narrowing::UnsignedToUnsigned, true),
            UQRSHRN_V => self.shr_narrow(op, RightShift::UNSIGNED_ROUND, Narrowing::UnsignedToUnsigned, false),
            SQSHRUN_S => self.shr_narrow(op, RightShift::SIGNED, Narrowing::SignedToUnsigned, true),
            SQSHRUN_V => self.shr_narrow(op, RightShift::SIGNED, Narrowing::SignedToUnsigned, false),
            SQRSHRUN_S => self.shr_narrow(op, RightShift::SIGNED_ROUND, Narrowing::SignedToUnsigned, true),
            SQRSHRUN_V => self.shr_narrow(op, RightShift::SIGNED_ROUND, Narrowing::SignedToUnsigned, false),
            SSHLL_V => self.shll(op, true, false),
            USHLL_V => self.shll(op, false, false),
            SHLL_V => self.shll(op, false, true),
            SLI_V => self.sli_sri(op, false),
            SRI_V => self.sli_sri(op, true),
            SSHL_V => self.shl_reg(op, true, false, false),
            USHL_V => self.shl_reg(op, false, false, false),
            SRSHL_V => self.shl_reg(op, true, true, false),
            URSHL_V => self.shl_reg(op, false, true, false),
            SQSHL_V => self.shl_reg(op, true, false, true),
            UQSHL_V => self.shl_reg(op, false, false, true),
            SQRSHL_V => self.shl_reg(op, true, true, true),
            UQRSHL_V => self.shl_reg(op, false, true, true),

            // --- Crypto ---
            AESD => self.aes_round(op, AesOp::Decrypt),
            AESE => self.aes_round(op, AesOp::Encrypt),
            AESIMC => self.aes_mix(op, AesOp::InvMixColumns),
            AESMC => self.aes_mix(op, AesOp::MixColumns),
            SHA1C => self.sha1_hash(op, Helper::Sha1HashChoose),
            SHA1M => self.sha1_hash(op, Helper::Sha1HashMajority),
            SHA1P => self.sha1_hash(op, Helper::Sha1HashParity),
            SHA1H => self.sha1h(op),
            SHA1SU0 => self.sha_schedule(op, Helper::Sha1SchedulePart1),
            SHA1SU1 => self.sha_schedule(op, Helper::Sha1SchedulePart2),
            SHA256H => self.sha_schedule(op, Helper::Sha256HashLower),
            SHA256H2 => self.sha_schedule(op, Helper::Sha256HashUpper),
            SHA256SU0 => self.sha_schedule(op, Helper::Sha256SchedulePart1),
            SHA256SU1 => self.sha_schedule(op, Helper::Sha256SchedulePart2),
        }
    }
}

/// Lane combiners shared by the pairwise and across-lanes forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairwise {
    Add,
    SMax,
    SMin,
    UMax,
    UMin,
}

/// Float routines that have no direct stack op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatHelper {
    Max,
    Min,
    MaxNum,
    MinNum,
    MulX,
    RecipStep,
    RsqrtStep,
    RecipEstimate,
    InvSqrtEstimate,
    RecipExponent,
}

/// How a wide lane is brought down to half its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    Truncate,
    SignedToSigned,
    UnsignedToUnsigned,
    SignedToUnsigned,
}
