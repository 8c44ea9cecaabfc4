use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::{ExtendType, RegisterSize, ShiftType};
use crate::ir::opcode::{Flag, Local, Op};

/// Result of DecodeBitMasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMasks {
    pub wmask: u64,
    pub tmask: u64,
}

/// Decode bitmask immediates for logical and bitfield instructions.
/// See ARM ARM "DecodeBitMasks" pseudocode.
pub fn decode_bit_masks(imm_n: bool, imms: u32, immr: u32, immediate: bool) -> Option<BitMasks> {
    // Element size comes from the highest set bit of N:NOT(imms)
    let combined = ((imm_n as u32) << 6) | (!imms & 0x3F);
    let len = highest_set_bit(combined)?;
    if len < 1 {
        return None;
    }

    let levels = (1u64 << len) - 1;
    let s = (imms as u64) & levels;
    let r = (immr as u64) & levels;

    // For immediate, all-ones S is reserved
    if immediate && s == levels {
        return None;
    }

    let d = s.wrapping_sub(r) & levels;
    let esize = 1u32 << len;
    let welem = ones(s + 1);
    let telem = ones(d + 1);

    let wmask = replicate(rotate_right_bits(welem, r as u32, esize), esize);
    let tmask = replicate(telem, esize);

    Some(BitMasks { wmask, tmask })
}

/// Find the highest set bit position (0-indexed).
fn highest_set_bit(value: u32) -> Option<u32> {
    if value == 0 {
        None
    } else {
        Some(31 - value.leading_zeros())
    }
}

/// Create a mask of `n` ones.
pub fn ones(n: u64) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Rotate `value` right by `amount` bits within an `esize`-bit element.
pub fn rotate_right_bits(value: u64, amount: u32, esize: u32) -> u64 {
    if esize == 0 || amount % esize == 0 {
        return value & ones(esize as u64);
    }
    let amount = amount % esize;
    let mask = ones(esize as u64);
    let value = value & mask;
    ((value >> amount) | (value << (esize - amount))) & mask
}

/// Replicate an `esize`-bit pattern to fill 64 bits.
pub fn replicate(value: u64, esize: u32) -> u64 {
    if esize == 0 {
        return 0;
    }
    let value = value & ones(esize as u64);
    let mut result = 0u64;
    let mut shift = 0u32;
    while shift < 64 {
        result |= value << shift;
        shift += esize;
    }
    result
}

fn width(size: RegisterSize) -> u32 {
    match size {
        RegisterSize::Int32 => 32,
        RegisterSize::Int64 => 64,
        other => panic!("Invalid integer register size {}", other),
    }
}

impl<'a> TranslatorVisitor<'a> {
    // --- Operands ---

    /// Shift the value on top of the stack by a constant amount.
    pub fn emit_shift_imm(&mut self, size: RegisterSize, shift: ShiftType, amount: u32) {
        if amount == 0 {
            return;
        }
        match shift {
            ShiftType::LSL => {
                self.ctx.emit_ldc_i4(amount);
                self.ctx.emit(Op::Shl);
            }
            ShiftType::LSR => {
                self.ctx.emit_ldc_i4(amount);
                self.ctx.emit(Op::ShrUn);
            }
            ShiftType::ASR => {
                self.ctx.emit_ldc_i4(amount);
                self.ctx.emit(Op::Shr);
            }
            ShiftType::ROR => self.emit_ror_imm(size, amount),
        }
    }

    /// Rotate the value on top of the stack right by a constant amount.
    pub fn emit_ror_imm(&mut self, size: RegisterSize, amount: u32) {
        let bits = width(size);
        let amount = amount % bits;
        if amount == 0 {
            return;
        }
        let value = self.ctx.store_local();
        self.ctx.emit(Op::LdLoc(value));
        self.ctx.emit_ldc_i4(amount);
        self.ctx.emit(Op::ShrUn);
        self.ctx.emit(Op::LdLoc(value));
        self.ctx.emit_ldc_i4(bits - amount);
        self.ctx.emit(Op::Shl);
        self.ctx.emit(Op::Or);
    }

    /// Push Rm shifted by the opcode's shift type and amount.
    pub fn emit_shifted_operand(&mut self, op: &OpCode64) {
        self.ctx.emit_ld_intzr(op.rm, op.reg_size);
        self.emit_shift_imm(op.reg_size, op.shift_type, op.shift as u32);
    }

    /// Push Rm extended by the opcode's extend type, then shifted left by 0..=4.
    pub fn emit_extended_operand(&mut self, op: &OpCode64) {
        let is_64 = op.reg_size == RegisterSize::Int64;
        self.ctx.emit_ld_intzr(op.rm, RegisterSize::Int64);

        let narrow = match op.extend {
            ExtendType::UXTB => Some(Op::ConvU1),
            ExtendType::UXTH => Some(Op::ConvU2),
            ExtendType::UXTW => Some(Op::ConvU4),
            ExtendType::SXTB => Some(Op::ConvI1),
            ExtendType::SXTH => Some(Op::ConvI2),
            ExtendType::SXTW => Some(Op::ConvI4),
            ExtendType::UXTX | ExtendType::SXTX => None,
        };
        match narrow {
            Some(conv) => {
                self.ctx.emit(conv);
                if is_64 {
                    self.ctx.emit(if op.extend.is_signed() { Op::ConvI8 } else { Op::ConvU8 });
                }
            }
            None if !is_64 => self.ctx.emit(Op::ConvU4),
            None => {}
        }

        if op.shift != 0 {
            self.ctx.emit_ldc_i4(op.shift as u32);
            self.ctx.emit(Op::Shl);
        }
    }

    // --- Flags ---

    pub fn emit_nz_flags(&mut self, res: Local, size: RegisterSize) {
        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit_ldc_i(0, size);
        self.ctx.emit(Op::Clt);
        self.ctx.emit_st_flag(Flag::N);

        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit_ldc_i(0, size);
        self.ctx.emit(Op::Ceq);
        self.ctx.emit_st_flag(Flag::Z);
    }

    /// Flags of `res = op1 + op2 (+ carry)`. `carry` is an `I32` local.
    pub fn emit_add_flags(&mut self, op1: Local, op2: Local, res: Local, size: RegisterSize, carry: Option<Local>) {
        self.emit_nz_flags(res, size);

        // Unsigned overflow wraps the result below op1 (or onto it with a carry in)
        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::CltUn);
        if let Some(carry) = carry {
            self.ctx.emit(Op::LdLoc(res));
            self.ctx.emit(Op::LdLoc(op1));
            self.ctx.emit(Op::Ceq);
            self.ctx.emit(Op::LdLoc(carry));
            self.ctx.emit(Op::And);
            self.ctx.emit(Op::Or);
        }
        self.ctx.emit_st_flag(Flag::C);

        // V = ((op1 ^ res) & (op2 ^ res)) < 0
        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit(Op::Xor);
        self.ctx.emit(Op::LdLoc(op2));
        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit(Op::Xor);
        self.ctx.emit(Op::And);
        self.ctx.emit_ldc_i(0, size);
        self.ctx.emit(Op::Clt);
        self.ctx.emit_st_flag(Flag::V);
    }

    /// Flags of `res = op1 - op2`.
    pub fn emit_sub_flags(&mut self, op1: Local, op2: Local, res: Local, size: RegisterSize) {
        self.emit_nz_flags(res, size);

        // C = !(op1 <u op2)
        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(op2));
        self.ctx.emit(Op::CltUn);
        self.ctx.emit_ldc_i4(0);
        self.ctx.emit(Op::Ceq);
        self.ctx.emit_st_flag(Flag::C);

        // V = ((op1 ^ op2) & (op1 ^ res)) < 0
        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(op2));
        self.ctx.emit(Op::Xor);
        self.ctx.emit(Op::LdLoc(op1));
        self.ctx.emit(Op::LdLoc(res));
        self.ctx.emit(Op::Xor);
        self.ctx.emit(Op::And);
        self.ctx.emit_ldc_i(0, size);
        self.ctx.emit(Op::Clt);
        self.ctx.emit_st_flag(Flag::V);
    }

    pub fn emit_logical_flags(&mut self, res: Local, size: RegisterSize) {
        self.emit_nz_flags(res, size);
        self.ctx.emit_ldc_i4(0);
        self.ctx.emit_st_flag(Flag::C);
        self.ctx.emit_ldc_i4(0);
        self.ctx.emit_st_flag(Flag::V);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CpuState;
    use crate::frontend::a64::opcode::Mnemonic;
    use crate::frontend::a64::translate::testing::run;

    #[test]
    fn test_decode_bit_masks_basic() {
        // AND X0, X0, #0xFF => N=1 (64-bit element), imms=0b000111, immr=0
        let m = decode_bit_masks(true, 0b000111, 0, true).unwrap();
        assert_eq!(m.wmask, 0x0000_0000_0000_00FF);

        // N=0, imms=0b000111 => 32-bit element, replicated
        let m = decode_bit_masks(false, 0b000111, 0, true).unwrap();
        assert_eq!(m.wmask, 0x0000_00FF_0000_00FF);
    }

    #[test]
    fn test_decode_bit_masks_64bit() {
        // S=60, R=0 => welem = ones(61)
        let m = decode_bit_masks(true, 0b111100, 0, true).unwrap();
        assert_eq!(m.wmask, 0x1FFF_FFFF_FFFF_FFFF);
    }

    #[test]
    fn test_decode_bit_masks_all_ones_reserved() {
        assert!(decode_bit_masks(true, 0b111111, 0, true).is_none());
        assert!(decode_bit_masks(true, 0b111111, 0, false).is_some());
    }

    #[test]
    fn test_decode_bit_masks_bitfield_tmask() {
        // UBFM X0, X1, #8, #15 (UBFX #8, #8): tmask covers S-R+1 bits
        let m = decode_bit_masks(true, 15, 8, false).unwrap();
        assert_eq!(m.tmask, 0xFF);
        assert_eq!(m.wmask, 0xFF00_0000_0000_00FF);
    }

    #[test]
    fn test_replicate() {
        assert_eq!(replicate(0xFF, 8), 0xFFFF_FFFF_FFFF_FFFF);
        assert_eq!(replicate(0x0F, 8), 0x0F0F_0F0F_0F0F_0F0F);
        assert_eq!(replicate(0xFFFF, 16), 0xFFFF_FFFF_FFFF_FFFF);
    }

    #[test]
    fn test_rotate_right_bits() {
        assert_eq!(rotate_right_bits(1, 1, 8), 0x80);
        assert_eq!(rotate_right_bits(0x81, 0, 8), 0x81);
        assert_eq!(rotate_right_bits(1, 1, 64), 1 << 63);
    }

    #[test]
    fn test_extended_operand_sign_extends_byte() {
        let mut state = CpuState::new();
        state.x[1] = 100;
        state.x[2] = 0xFFFF_FF80;
        let op = OpCode64::new(Mnemonic::ADD_ext, 0)
            .x()
            .regs(0, 1, 2)
            .extended(ExtendType::SXTB, 2);
        run(&[op], &mut state);
        assert_eq!(state.x[0], 100u64.wrapping_sub(0x80 << 2));
    }

    #[test]
    fn test_shifted_operand_rotates() {
        let mut state = CpuState::new();
        state.x[2] = 0x1;
        let op = OpCode64::new(Mnemonic::ORR_shift, 0)
            .w()
            .regs(0, 31, 2)
            .shifted(ShiftType::ROR, 4);
        run(&[op], &mut state);
        assert_eq!(state.x[0], 0x1000_0000);
    }
}
