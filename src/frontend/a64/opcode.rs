//! Decoded opcode descriptors.
//!
//! Decoding raw instruction words is the caller's job; an `OpCode64` is the
//! already-decoded, immutable description of one instruction that the
//! emitters consume. The builder methods exist so callers and tests can
//! assemble descriptors field by field.

use crate::frontend::a64::types::{ExtendType, RegisterSize, ShiftType};
use crate::ir::cond::Cond;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Mnemonic {
    // --- Add/subtract ---
    ADD_imm, ADDS_imm, SUB_imm, SUBS_imm,
    ADD_shift, ADDS_shift, SUB_shift, SUBS_shift,
    ADD_ext, ADDS_ext, SUB_ext, SUBS_ext,
    ADC, ADCS, SBC, SBCS,

    // --- Logical ---
    AND_imm, ANDS_imm, ORR_imm, EOR_imm,
    AND_shift, ANDS_shift, BIC_shift, BICS_shift, ORR_shift, ORN_shift, EOR_shift, EON_shift,

    // --- Shift, extract, bit counting ---
    LSLV, LSRV, ASRV, RORV, EXTR,
    CLS, CLZ, RBIT, REV16, REV32, REV64,

    // --- Multiply and divide ---
    SDIV, UDIV, MADD, MSUB, SMADDL, SMSUBL, UMADDL, UMSUBL, SMULH, UMULH,

    // --- Moves and addresses ---
    MOVZ, MOVN, MOVK, ADR, ADRP,

    // --- Conditional ---
    CCMN_imm, CCMN_reg, CCMP_imm, CCMP_reg,
    CSEL, CSINC, CSINV, CSNEG,

    // --- Bitfield ---
    BFM, SBFM, UBFM,

    // --- Branches ---
    B, B_cond, BL, BR, BLR, RET, CBZ, CBNZ, TBZ, TBNZ,

    // --- Exceptions and system ---
    SVC, BRK, UND,
    MRS, MSR, NOP, HINT, CLREX, DMB, DSB, ISB, SYS, PRFM,

    // --- CRC ---
    CRC32, CRC32C,

    // --- SIMD integer arithmetic ---
    ADD_S, ADD_V, SUB_S, SUB_V, MUL_V, MUL_Ve, MLA_V, MLA_Ve, MLS_V, MLS_Ve,
    NEG_S, NEG_V, ABS_S, ABS_V,
    ADDP_S, ADDP_V, ADDV_V, SADDLV_V, UADDLV_V,
    SMAX_V, SMIN_V, UMAX_V, UMIN_V, SMAXP_V, SMINP_V, UMAXP_V, UMINP_V,
    SMAXV_V, SMINV_V, UMAXV_V, UMINV_V,
    SABD_V, UABD_V, SABA_V, UABA_V, SABDL_V, UABDL_V, SABAL_V, UABAL_V,
    SHADD_V, UHADD_V, SHSUB_V, UHSUB_V, SRHADD_V, URHADD_V,
    SADDLP_V, UADDLP_V, SADALP_V, UADALP_V,
    SQADD_S, SQADD_V, UQADD_S, UQADD_V, SQSUB_S, SQSUB_V, UQSUB_S, UQSUB_V,
    SUQADD_S, SUQADD_V, USQADD_S, USQADD_V, SQABS_S, SQABS_V, SQNEG_S, SQNEG_V,
    SQDMULH_S, SQDMULH_V, SQRDMULH_S, SQRDMULH_V,
    SADDL_V, UADDL_V, SSUBL_V, USUBL_V, SADDW_V, UADDW_V, SSUBW_V, USUBW_V,
    SMULL_V, UMULL_V, SMULL_Ve, UMULL_Ve,
    SMLAL_V, UMLAL_V, SMLAL_Ve, UMLAL_Ve, SMLSL_V, UMLSL_V, SMLSL_Ve, UMLSL_Ve,
    ADDHN_V, SUBHN_V, RADDHN_V, RSUBHN_V,
    CNT_V, CLZ_V, CLS_V, RBIT_V, REV16_V, REV32_V, REV64_V,

    // --- SIMD float arithmetic ---
    FADD_S, FADD_V, FSUB_S, FSUB_V, FMUL_S, FMUL_V, FMUL_Se, FMUL_Ve, FDIV_S, FDIV_V,
    FABD_S, FABD_V, FMULX_S, FMULX_V, FMULX_Se, FMULX_Ve,
    FABS_S, FABS_V, FNEG_S, FNEG_V, FSQRT_S, FSQRT_V,
    FMAX_S, FMAX_V, FMIN_S, FMIN_V, FMAXNM_S, FMAXNM_V, FMINNM_S, FMINNM_V,
    FADDP_S, FADDP_V, FMAXP_V, FMINP_V,
    FMLA_V, FMLA_Se, FMLA_Ve, FMLS_V, FMLS_Se, FMLS_Ve,
    FMADD_S, FMSUB_S, FNMADD_S, FNMSUB_S, FNMUL_S,
    FRINTA_S, FRINTA_V, FRINTI_S, FRINTI_V, FRINTM_S, FRINTM_V, FRINTN_S, FRINTN_V,
    FRINTP_S, FRINTP_V, FRINTX_S, FRINTX_V, FRINTZ_S, FRINTZ_V,
    FRECPE_S, FRECPE_V, FRECPS_S, FRECPS_V, FRSQRTE_S, FRSQRTE_V, FRSQRTS_S, FRSQRTS_V, FRECPX_S,

    // --- SIMD compare ---
    CMEQ_S, CMEQ_V, CMEQ_Sz, CMEQ_Vz, CMGE_S, CMGE_V, CMGE_Sz, CMGE_Vz,
    CMGT_S, CMGT_V, CMGT_Sz, CMGT_Vz, CMLE_Sz, CMLE_Vz, CMLT_Sz, CMLT_Vz,
    CMHI_S, CMHI_V, CMHS_S, CMHS_V, CMTST_S, CMTST_V,
    FCMEQ_S, FCMEQ_V, FCMEQ_Sz, FCMEQ_Vz, FCMGE_S, FCMGE_V, FCMGE_Sz, FCMGE_Vz,
    FCMGT_S, FCMGT_V, FCMGT_Sz, FCMGT_Vz, FCMLE_Sz, FCMLE_Vz, FCMLT_Sz, FCMLT_Vz,
    FCMP_S, FCMPE_S, FCMP_Sz, FCMPE_Sz, FCCMP_S, FCCMPE_S, FCSEL_S,

    // --- SIMD convert ---
    FCVT_S, FCVTL_V, FCVTN_V,
    FCVTZS_Gp, FCVTZS_Gp_Fixed, FCVTZS_S, FCVTZS_V, FCVTZS_V_Fixed,
    FCVTZU_Gp, FCVTZU_Gp_Fixed, FCVTZU_S, FCVTZU_V, FCVTZU_V_Fixed,
    FCVTNS_S, FCVTNS_V, FCVTNU_S, FCVTNU_V,
    FCVTAS_Gp, FCVTAU_Gp, FCVTMS_Gp, FCVTMU_Gp, FCVTPS_Gp, FCVTPU_Gp,
    SCVTF_Gp, SCVTF_Gp_Fixed, SCVTF_S, SCVTF_V, SCVTF_V_Fixed,
    UCVTF_Gp, UCVTF_Gp_Fixed, UCVTF_S, UCVTF_V, UCVTF_V_Fixed,

    // --- SIMD move ---
    FMOV_S, FMOV_Si, FMOV_Vi, FMOV_Ftoi, FMOV_Itof, FMOV_Ftoi1, FMOV_Itof1,
    AND_V, BIC_V, ORR_V, ORN_V, EOR_V, NOT_V, BSL_V, BIT_V, BIF_V,
    MOVI_V, MVNI_V, ORR_Vi, BIC_Vi,
    DUP_Gp, DUP_S, DUP_V, INS_Gp, INS_V, UMOV_S, SMOV_S, EXT_V, TBL_V,
    TRN1_V, TRN2_V, ZIP1_V, ZIP2_V, UZP1_V, UZP2_V,
    XTN_V, SQXTN_S, SQXTN_V, UQXTN_S, UQXTN_V, SQXTUN_S, SQXTUN_V,

    // --- SIMD shift ---
    SHL_S, SHL_V, SSHR_S, SSHR_V, USHR_S, USHR_V, SSRA_S, SSRA_V, USRA_S, USRA_V,
    SRSHR_S, SRSHR_V, URSHR_S, URSHR_V, SRSRA_S, SRSRA_V, URSRA_S, URSRA_V,
    SHRN_V, RSHRN_V,
    SQSHRN_S, SQSHRN_V, UQSHRN_S, UQSHRN_V, SQRSHRN_S, SQRSHRN_V, UQRSHRN_S, UQRSHRN_V,
    SQSHRUN_S, SQSHRUN_V, SQRSHRUN_S, SQRSHRUN_V,
    SSHLL_V, USHLL_V, SHLL_V, SLI_V, SRI_V,
    SSHL_V, USHL_V, SRSHL_V, URSHL_V, SQSHL_V, UQSHL_V, SQRSHL_V, UQRSHL_V,

    // --- Crypto ---
    AESD, AESE, AESIMC, AESMC,
    SHA1C, SHA1H, SHA1M, SHA1P, SHA1SU0, SHA1SU1,
    SHA256H, SHA256H2, SHA256SU0, SHA256SU1,
}

/// One decoded instruction. Fields an instruction does not use keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCode64 {
    pub mnemonic: Mnemonic,
    pub address: u64,
    /// Raw instruction word, reported for undefined encodings.
    pub raw: u32,
    pub reg_size: RegisterSize,
    pub rd: u8,
    pub rn: u8,
    pub rm: u8,
    pub ra: u8,
    /// Element size code (0 = byte .. 3 = doubleword), or 0 = single / 1 = double for FP.
    pub size: u8,
    pub imm: u64,
    pub shift_type: ShiftType,
    /// Shift amount for shifted-register forms, SIMD shift immediates and MOVZ/MOVK.
    pub shift: u8,
    pub extend: ExtendType,
    pub cond: Cond,
    /// Element index for by-element, INS, DUP, UMOV/SMOV; bit number for TBZ/TBNZ.
    pub index: u8,
    pub src_index: u8,
    pub fbits: u8,
    /// Number of table registers for TBL.
    pub tbl_regs: u8,
    /// Bitfield imms.
    pub pos: u8,
    /// Bitfield immr.
    pub bf_shift: u8,
    pub wmask: u64,
    pub tmask: u64,
    /// Flags CCMP/CCMN/FCCMP set when their condition fails.
    pub nzcv: u8,
    /// MRS/MSR/SYS operand as `op0:op1:CRn:CRm:op2`.
    pub sys: u32,
}

impl OpCode64 {
    pub fn new(mnemonic: Mnemonic, address: u64) -> Self {
        Self {
            mnemonic,
            address,
            raw: 0,
            reg_size: RegisterSize::Int64,
            rd: 0,
            rn: 0,
            rm: 0,
            ra: 0,
            size: 0,
            imm: 0,
            shift_type: ShiftType::LSL,
            shift: 0,
            extend: ExtendType::UXTX,
            cond: Cond::AL,
            index: 0,
            src_index: 0,
            fbits: 0,
            tbl_regs: 1,
            pos: 0,
            bf_shift: 0,
            wmask: 0,
            tmask: 0,
            nzcv: 0,
            sys: 0,
        }
    }

    // --- Builders ---

    pub fn with_size(mut self, reg_size: RegisterSize) -> Self {
        self.reg_size = reg_size;
        self
    }

    pub fn w(self) -> Self {
        self.with_size(RegisterSize::Int32)
    }

    pub fn x(self) -> Self {
        self.with_size(RegisterSize::Int64)
    }

    pub fn d(self) -> Self {
        self.with_size(RegisterSize::Simd64)
    }

    pub fn q(self) -> Self {
        self.with_size(RegisterSize::Simd128)
    }

    pub fn regs(mut self, rd: u8, rn: u8, rm: u8) -> Self {
        self.rd = rd;
        self.rn = rn;
        self.rm = rm;
        self
    }

    pub fn rd(mut self, rd: u8) -> Self {
        self.rd = rd;
        self
    }

    pub fn rn(mut self, rn: u8) -> Self {
        self.rn = rn;
        self
    }

    pub fn rm(mut self, rm: u8) -> Self {
        self.rm = rm;
        self
    }

    pub fn ra(mut self, ra: u8) -> Self {
        self.ra = ra;
        self
    }

    pub fn elem(mut self, size: u8) -> Self {
        self.size = size;
        self
    }

    pub fn imm(mut self, imm: u64) -> Self {
        self.imm = imm;
        self
    }

    pub fn shifted(mut self, shift_type: ShiftType, amount: u8) -> Self {
        self.shift_type = shift_type;
        self.shift = amount;
        self
    }

    pub fn shift_amount(mut self, amount: u8) -> Self {
        self.shift = amount;
        self
    }

    pub fn extended(mut self, extend: ExtendType, amount: u8) -> Self {
        self.extend = extend;
        self.shift = amount;
        self
    }

    pub fn cond(mut self, cond: Cond) -> Self {
        self.cond = cond;
        self
    }

    pub fn lanes(mut self, index: u8, src_index: u8) -> Self {
        self.index = index;
        self.src_index = src_index;
        self
    }

    pub fn fbits(mut self, fbits: u8) -> Self {
        self.fbits = fbits;
        self
    }

    pub fn tbl(mut self, regs: u8) -> Self {
        self.tbl_regs = regs;
        self
    }

    pub fn bitfield(mut self, imms: u8, immr: u8) -> Self {
        self.pos = imms;
        self.bf_shift = immr;
        self
    }

    pub fn masks(mut self, wmask: u64, tmask: u64) -> Self {
        self.wmask = wmask;
        self.tmask = tmask;
        self
    }

    pub fn nzcv(mut self, nzcv: u8) -> Self {
        self.nzcv = nzcv;
        self
    }

    pub fn sys_reg(mut self, encoding: u32) -> Self {
        self.sys = encoding;
        self
    }

    pub fn raw(mut self, raw: u32) -> Self {
        self.raw = raw;
        self
    }

    // --- Derived properties ---

    pub fn datasize(&self) -> u32 {
        match self.reg_size {
            RegisterSize::Int32 => 32,
            RegisterSize::Int64 => 64,
            other => panic!("Invalid integer register size {}", other),
        }
    }

    pub fn size_f(&self) -> usize {
        (self.size & 1) as usize
    }

    /// Bytes of the vector operand: 8 for a 64-bit form, 16 for a 128-bit form.
    pub fn vector_bytes(&self) -> usize {
        match self.reg_size {
            RegisterSize::Simd128 => 16,
            _ => 8,
        }
    }

    pub fn elems(&self) -> usize {
        self.vector_bytes() >> self.size
    }

    pub fn elems_f(&self) -> usize {
        self.vector_bytes() >> (self.size_f() + 2)
    }

    /// Second-half ("2") forms write the upper half of the destination.
    pub fn part(&self) -> usize {
        (self.reg_size == RegisterSize::Simd128) as usize
    }

    pub fn next_address(&self) -> u64 {
        self.address.wrapping_add(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let op = OpCode64::new(Mnemonic::ADD_imm, 0x1000).w().regs(1, 2, 0).imm(5);
        assert_eq!(op.datasize(), 32);
        assert_eq!(op.rd, 1);
        assert_eq!(op.rn, 2);
        assert_eq!(op.imm, 5);
        assert_eq!(op.next_address(), 0x1004);
    }

    #[test]
    fn test_lane_counts() {
        let op = OpCode64::new(Mnemonic::ADD_V, 0).q().elem(1);
        assert_eq!(op.elems(), 8);
        let op = OpCode64::new(Mnemonic::ADD_V, 0).d().elem(0);
        assert_eq!(op.elems(), 8);
        let op = OpCode64::new(Mnemonic::FADD_V, 0).q().elem(1);
        assert_eq!(op.elems_f(), 2);
        let op = OpCode64::new(Mnemonic::FADD_V, 0).d().elem(0);
        assert_eq!(op.elems_f(), 2);
    }

    #[test]
    #[should_panic(expected = "Invalid integer register size")]
    fn test_datasize_of_vector_form_panics() {
        OpCode64::new(Mnemonic::ADD_V, 0).q().datasize();
    }
}
