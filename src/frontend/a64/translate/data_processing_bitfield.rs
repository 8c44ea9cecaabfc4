use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::helpers::decode_bit_masks;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::{RegisterSize, ShiftType};
use crate::ir::opcode::Op;

/// Which bitfield move is being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitfieldKind {
    /// SBFM
    Signed,
    /// UBFM
    Unsigned,
    /// BFM
    Insert,
}

/// Emission shape for a bitfield move.
///
/// Every specialised shape computes the same value as `General`, the
/// rotate/mask/merge formula from the architecture, for the operands
/// `select` picks it for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitfieldStrategy {
    /// SBFM with `imms == datasize - 1`: ASR #immr.
    Asr,
    /// SBFM with `imms < immr`: SBFIZ.
    Sbfiz,
    /// SBFM #0, #7/#15/#31: SXTB/SXTH/SXTW.
    Sxt,
    /// UBFM with `imms == datasize - 1`: LSR #immr.
    Lsr,
    /// UBFM with `imms + 1 == immr`: LSL.
    Lsl,
    /// UBFM with `imms < immr`: UBFIZ.
    Ubfiz,
    /// UBFM #0, #7/#15 (and #31 on X): UXTB/UXTH/UXTW.
    Uxt,
    General,
}

impl BitfieldStrategy {
    pub fn select(kind: BitfieldKind, datasize: u32, imms: u32, immr: u32) -> Self {
        match kind {
            BitfieldKind::Signed => {
                if imms + 1 == datasize {
                    BitfieldStrategy::Asr
                } else if imms < immr {
                    BitfieldStrategy::Sbfiz
                } else if immr == 0 && matches!(imms, 7 | 15 | 31) {
                    BitfieldStrategy::Sxt
                } else {
                    BitfieldStrategy::General
                }
            }
            BitfieldKind::Unsigned => {
                if imms + 1 == datasize {
                    BitfieldStrategy::Lsr
                } else if imms + 1 == immr {
                    BitfieldStrategy::Lsl
                } else if imms < immr {
                    BitfieldStrategy::Ubfiz
                } else if immr == 0 && matches!(imms, 7 | 15 | 31) {
                    BitfieldStrategy::Uxt
                } else {
                    BitfieldStrategy::General
                }
            }
            BitfieldKind::Insert => BitfieldStrategy::General,
        }
    }

    pub fn applies_to(self, kind: BitfieldKind) -> bool {
        match self {
            BitfieldStrategy::Asr | BitfieldStrategy::Sbfiz | BitfieldStrategy::Sxt => kind == BitfieldKind::Signed,
            BitfieldStrategy::Lsr | BitfieldStrategy::Lsl | BitfieldStrategy::Ubfiz | BitfieldStrategy::Uxt => {
                kind == BitfieldKind::Unsigned
            }
            BitfieldStrategy::General => true,
        }
    }
}

impl<'a> TranslatorVisitor<'a> {
    /// BFM - Bitfield Move
    pub fn bfm(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_bitfield_move(op, BitfieldKind::Insert)
    }

    /// SBFM - Signed Bitfield Move
    pub fn sbfm(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_bitfield_move(op, BitfieldKind::Signed)
    }

    /// UBFM - Unsigned Bitfield Move
    pub fn ubfm(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_bitfield_move(op, BitfieldKind::Unsigned)
    }

    fn emit_bitfield_move(&mut self, op: &OpCode64, kind: BitfieldKind) -> EmitResult {
        let strategy = BitfieldStrategy::select(kind, op.datasize(), op.pos as u32, op.bf_shift as u32);
        self.emit_bitfield(op, kind, strategy);
        Ok(())
    }

    /// Emit a bitfield move with an explicit strategy. `pos` holds imms and
    /// `bf_shift` holds immr.
    pub fn emit_bitfield(&mut self, op: &OpCode64, kind: BitfieldKind, strategy: BitfieldStrategy) {
        let size = op.reg_size;
        let bits = op.datasize();
        let imms = op.pos as u32;
        let immr = op.bf_shift as u32;
        if imms >= bits || immr >= bits {
            panic!("Invalid bitfield immediates imms={} immr={}", imms, immr);
        }
        if !strategy.applies_to(kind) {
            panic!("Invalid bitfield strategy {:?} for {:?}", strategy, kind);
        }

        match strategy {
            BitfieldStrategy::Asr => {
                self.ctx.emit_ld_intzr(op.rn, size);
                self.emit_shift_imm(size, ShiftType::ASR, immr);
            }
            BitfieldStrategy::Lsr => {
                self.ctx.emit_ld_intzr(op.rn, size);
                self.emit_shift_imm(size, ShiftType::LSR, immr);
            }
            BitfieldStrategy::Lsl => {
                self.ctx.emit_ld_intzr(op.rn, size);
                self.emit_shift_imm(size, ShiftType::LSL, bits - immr);
            }
            BitfieldStrategy::Sbfiz | BitfieldStrategy::Ubfiz => {
                // Move the field to the top, then back down to its lsb
                let width = imms + 1;
                let lsb = bits - immr;
                let down = if strategy == BitfieldStrategy::Sbfiz { ShiftType::ASR } else { ShiftType::LSR };
                self.ctx.emit_ld_intzr(op.rn, size);
                self.emit_shift_imm(size, ShiftType::LSL, bits - width);
                self.emit_shift_imm(size, down, bits - width - lsb);
            }
            BitfieldStrategy::Sxt | BitfieldStrategy::Uxt => {
                let signed = strategy == BitfieldStrategy::Sxt;
                self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int64);
                self.ctx.emit(match (imms, signed) {
                    (7, true) => Op::ConvI1,
                    (7, false) => Op::ConvU1,
                    (15, true) => Op::ConvI2,
                    (15, false) => Op::ConvU2,
                    (_, true) => Op::ConvI4,
                    (_, false) => Op::ConvU4,
                });
                // The narrowing conversions leave an I32
                if size == RegisterSize::Int64 {
                    self.ctx.emit(if signed { Op::ConvI8 } else { Op::ConvU8 });
                }
            }
            BitfieldStrategy::General => self.emit_bitfield_general(op, kind, bits, imms, immr),
        }

        self.ctx.emit_st_intzr(op.rd, size);
    }

    fn emit_bitfield_general(&mut self, op: &OpCode64, kind: BitfieldKind, bits: u32, imms: u32, immr: u32) {
        let size = op.reg_size;
        let masks = match decode_bit_masks(bits == 64, imms, immr, false) {
            Some(masks) => masks,
            None => panic!("Invalid bitfield immediates imms={} immr={}", imms, immr),
        };

        // bot = ROR(src, immr) AND wmask
        self.ctx.emit_ld_intzr(op.rn, size);
        let src = self.ctx.store_local();
        self.ctx.emit(Op::LdLoc(src));
        self.emit_ror_imm(size, immr);
        self.ctx.emit_ldc_i(masks.wmask, size);
        self.ctx.emit(Op::And);

        match kind {
            BitfieldKind::Unsigned => {
                self.ctx.emit_ldc_i(masks.tmask, size);
                self.ctx.emit(Op::And);
            }
            BitfieldKind::Signed => {
                self.ctx.emit_ldc_i(masks.tmask, size);
                self.ctx.emit(Op::And);

                // top = Replicate(src<imms>)
                self.ctx.emit(Op::LdLoc(src));
                self.emit_shift_imm(size, ShiftType::LSL, bits - 1 - imms);
                self.emit_shift_imm(size, ShiftType::ASR, bits - 1);
                self.ctx.emit_ldc_i(!masks.tmask, size);
                self.ctx.emit(Op::And);
                self.ctx.emit(Op::Or);
            }
            BitfieldKind::Insert => {
                self.ctx.emit_ld_intzr(op.rd, size);
                let dst = self.ctx.store_local();

                // bot |= dst AND NOT wmask
                self.ctx.emit(Op::LdLoc(dst));
                self.ctx.emit_ldc_i(!masks.wmask, size);
                self.ctx.emit(Op::And);
                self.ctx.emit(Op::Or);

                // result = (dst AND NOT tmask) OR (bot AND tmask)
                self.ctx.emit_ldc_i(masks.tmask, size);
                self.ctx.emit(Op::And);
                self.ctx.emit(Op::LdLoc(dst));
                self.ctx.emit_ldc_i(!masks.tmask, size);
                self.ctx.emit(Op::And);
                self.ctx.emit(Op::Or);
            }
        }
    }
}
