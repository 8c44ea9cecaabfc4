use std::collections::HashMap;

use crate::flags::Nzcv;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::types::{RegisterSize, REG_SP_ZR};
use crate::ir::block::Function;
use crate::ir::cond::Cond;
use crate::ir::helper::Helper;
use crate::ir::opcode::{Flag, Label, Local, Op, StateCall};

/// Emission context: the append-only builder for one translation unit.
///
/// Owns the op list, the label and local allocators, the opcode currently
/// being emitted and the guest-address to block-label map that decides
/// whether a branch can jump inside the unit.
#[derive(Debug)]
pub struct EmitterContext {
    entry: u64,
    ops: Vec<Op>,
    label_count: u32,
    local_count: u32,
    current: Option<OpCode64>,
    block_labels: HashMap<u64, Label>,
}

impl EmitterContext {
    pub fn new(entry: u64) -> Self {
        Self {
            entry,
            ops: Vec::new(),
            label_count: 0,
            local_count: 0,
            current: None,
            block_labels: HashMap::new(),
        }
    }

    pub fn emit(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn define_label(&mut self) -> Label {
        let label = Label(self.label_count);
        self.label_count += 1;
        label
    }

    pub fn mark_label(&mut self, label: Label) {
        self.emit(Op::MarkLabel(label));
    }

    pub fn new_local(&mut self) -> Local {
        let local = Local(self.local_count);
        self.local_count += 1;
        local
    }

    /// Pop the top of stack into a fresh local.
    pub fn store_local(&mut self) -> Local {
        let local = self.new_local();
        self.emit(Op::StLoc(local));
        local
    }

    pub fn current_op(&self) -> Option<&OpCode64> {
        self.current.as_ref()
    }

    pub fn set_current_op(&mut self, op: OpCode64) {
        self.current = Some(op);
    }

    // --- Block linkage ---

    /// Give the block starting at `address` a label other branches can jump to.
    pub fn register_block(&mut self, address: u64) -> Label {
        if let Some(label) = self.block_labels.get(&address) {
            return *label;
        }
        let label = self.define_label();
        self.block_labels.insert(address, label);
        label
    }

    pub fn block_label(&self, address: u64) -> Option<Label> {
        self.block_labels.get(&address).copied()
    }

    /// Continue at `address`: a direct jump when that block is part of this
    /// unit, otherwise return the address to the dispatcher.
    pub fn emit_goto(&mut self, address: u64) {
        match self.block_label(address) {
            Some(label) => self.emit(Op::Br(label)),
            None => self.emit_return(address),
        }
    }

    pub fn emit_return(&mut self, address: u64) {
        self.emit(Op::LdcI8(address));
        self.emit(Op::Ret);
    }

    // --- Constants ---

    pub fn emit_ldc_i4(&mut self, value: u32) {
        self.emit(Op::LdcI4(value));
    }

    pub fn emit_ldc_i8(&mut self, value: u64) {
        self.emit(Op::LdcI8(value));
    }

    pub fn emit_ldc_r4(&mut self, value: f32) {
        self.emit(Op::LdcR4(value));
    }

    pub fn emit_ldc_r8(&mut self, value: f64) {
        self.emit(Op::LdcR8(value));
    }

    /// Integer constant of the operand width.
    pub fn emit_ldc_i(&mut self, value: u64, size: RegisterSize) {
        match size {
            RegisterSize::Int32 => self.emit_ldc_i4(value as u32),
            RegisterSize::Int64 => self.emit_ldc_i8(value),
            _ => panic!("Invalid integer register size {}", size),
        }
    }

    // --- General-purpose registers ---

    /// Read Rn with register 31 as the zero register.
    pub fn emit_ld_intzr(&mut self, reg: u8, size: RegisterSize) {
        if reg == REG_SP_ZR {
            self.emit_ldc_i(0, size);
        } else {
            self.emit(Op::LdInt(reg));
            if size == RegisterSize::Int32 {
                self.emit(Op::ConvU4);
            }
        }
    }

    /// Write Rd with register 31 as the zero register: the value is discarded.
    pub fn emit_st_intzr(&mut self, reg: u8, size: RegisterSize) {
        if reg == REG_SP_ZR {
            self.emit(Op::Pop);
        } else {
            if size == RegisterSize::Int32 {
                self.emit(Op::ConvU8);
            }
            self.emit(Op::StInt(reg));
        }
    }

    /// Read Rn with register 31 as SP.
    pub fn emit_ld_intsp(&mut self, reg: u8, size: RegisterSize) {
        self.emit(Op::LdInt(reg));
        if size == RegisterSize::Int32 {
            self.emit(Op::ConvU4);
        }
    }

    pub fn emit_st_intsp(&mut self, reg: u8, size: RegisterSize) {
        if size == RegisterSize::Int32 {
            self.emit(Op::ConvU8);
        }
        self.emit(Op::StInt(reg));
    }

    // --- Vector registers ---

    pub fn emit_ld_vec(&mut self, reg: u8) {
        self.emit(Op::LdVec(reg));
    }

    pub fn emit_st_vec(&mut self, reg: u8) {
        self.emit(Op::StVec(reg));
    }

    /// Push lane `index` of `reg` as an `I64`.
    pub fn emit_vector_extract(&mut self, reg: u8, index: usize, size: usize, signed: bool) {
        check_lane(index, size);
        self.emit(Op::LdVec(reg));
        self.emit(Op::VecExtractInt { index: index as u8, size: size as u8, signed });
    }

    pub fn emit_vector_extract_sx(&mut self, reg: u8, index: usize, size: usize) {
        self.emit_vector_extract(reg, index, size, true);
    }

    pub fn emit_vector_extract_zx(&mut self, reg: u8, index: usize, size: usize) {
        self.emit_vector_extract(reg, index, size, false);
    }

    /// Pop an `I64` and write it into lane `index` of `reg`.
    pub fn emit_vector_insert(&mut self, reg: u8, index: usize, size: usize) {
        check_lane(index, size);
        let value = self.store_local();
        self.emit(Op::LdVec(reg));
        self.emit(Op::LdLoc(value));
        self.emit(Op::VecInsertInt { index: index as u8, size: size as u8 });
        self.emit(Op::StVec(reg));
    }

    /// Insert the `I64` on top of the stack into the vector beneath it.
    pub fn emit_vector_insert_tmp(&mut self, index: usize, size: usize) {
        check_lane(index, size);
        self.emit(Op::VecInsertInt { index: index as u8, size: size as u8 });
    }

    pub fn emit_vector_extract_f(&mut self, reg: u8, index: usize, size_f: usize) {
        check_float_lane(index, size_f);
        self.emit(Op::LdVec(reg));
        self.emit(Op::VecExtractFloat { index: index as u8, size_f: size_f as u8 });
    }

    pub fn emit_vector_insert_f(&mut self, reg: u8, index: usize, size_f: usize) {
        check_float_lane(index, size_f);
        let value = self.store_local();
        self.emit(Op::LdVec(reg));
        self.emit(Op::LdLoc(value));
        self.emit(Op::VecInsertFloat { index: index as u8, size_f: size_f as u8 });
        self.emit(Op::StVec(reg));
    }

    pub fn emit_vector_insert_f_tmp(&mut self, index: usize, size_f: usize) {
        check_float_lane(index, size_f);
        self.emit(Op::VecInsertFloat { index: index as u8, size_f: size_f as u8 });
    }

    pub fn emit_vector_zero_upper(&mut self, reg: u8) {
        self.emit(Op::LdVec(reg));
        self.emit(Op::VecZeroUpper);
        self.emit(Op::StVec(reg));
    }

    pub fn emit_vector_zero_all(&mut self, reg: u8) {
        self.emit(Op::VecZero);
        self.emit(Op::StVec(reg));
    }

    // --- Flags ---

    pub fn emit_ld_flag(&mut self, flag: Flag) {
        self.emit(Op::LdFlag(flag));
    }

    pub fn emit_st_flag(&mut self, flag: Flag) {
        self.emit(Op::StFlag(flag));
    }

    /// Store constant flags, as CCMP does when its condition fails.
    pub fn emit_set_nzcv(&mut self, nzcv: Nzcv) {
        for (flag, value) in [(Flag::N, nzcv.n), (Flag::Z, nzcv.z), (Flag::C, nzcv.c), (Flag::V, nzcv.v)] {
            self.emit_ldc_i4(value as u32);
            self.emit_st_flag(flag);
        }
    }

    /// Push `I32` 1 when `cond` holds for the current flags.
    pub fn emit_cond_check(&mut self, cond: Cond) {
        let negate = match cond {
            Cond::AL | Cond::NV => {
                self.emit_ldc_i4(1);
                return;
            }
            Cond::EQ | Cond::NE => {
                self.emit_ld_flag(Flag::Z);
                cond == Cond::NE
            }
            Cond::CS | Cond::CC => {
                self.emit_ld_flag(Flag::C);
                cond == Cond::CC
            }
            Cond::MI | Cond::PL => {
                self.emit_ld_flag(Flag::N);
                cond == Cond::PL
            }
            Cond::VS | Cond::VC => {
                self.emit_ld_flag(Flag::V);
                cond == Cond::VC
            }
            Cond::HI | Cond::LS => {
                // C > Z is C && !Z
                self.emit_ld_flag(Flag::C);
                self.emit_ld_flag(Flag::Z);
                self.emit(Op::CgtUn);
                cond == Cond::LS
            }
            Cond::GE | Cond::LT => {
                self.emit_ld_flag(Flag::N);
                self.emit_ld_flag(Flag::V);
                self.emit(Op::Xor);
                cond == Cond::GE
            }
            Cond::GT | Cond::LE => {
                self.emit_ld_flag(Flag::N);
                self.emit_ld_flag(Flag::V);
                self.emit(Op::Xor);
                self.emit_ld_flag(Flag::Z);
                self.emit(Op::Or);
                cond == Cond::GT
            }
        };
        if negate {
            self.emit_ldc_i4(0);
            self.emit(Op::Ceq);
        }
    }

    /// Branch to `label` when `cond` holds.
    pub fn emit_cond_branch(&mut self, cond: Cond, label: Label) {
        self.emit_cond_check(cond);
        self.emit(Op::BrTrue(label));
    }

    // --- Calls ---

    pub fn emit_call(&mut self, helper: Helper) {
        self.emit(Op::Call(helper));
    }

    pub fn emit_state_call(&mut self, call: StateCall) {
        self.emit(Op::StateCall(call));
    }

    pub fn finish(self) -> Function {
        Function {
            entry: self.entry,
            ops: self.ops,
            label_count: self.label_count,
            local_count: self.local_count,
        }
    }
}

fn check_lane(index: usize, size: usize) {
    if size > 3 {
        panic!("Invalid vector element size {}", size);
    }
    if index >= 16 >> size {
        panic!("Invalid vector lane index {} for element size {}", index, size);
    }
}

fn check_float_lane(index: usize, size_f: usize) {
    if size_f > 1 {
        panic!("Invalid vector float size {}", size_f);
    }
    if index >= 4 >> size_f {
        panic!("Invalid vector float lane index {} for size {}", index, size_f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ld_intzr_reads_zero_register_as_constant() {
        let mut ctx = EmitterContext::new(0);
        ctx.emit_ld_intzr(31, RegisterSize::Int64);
        ctx.emit_ld_intzr(31, RegisterSize::Int32);
        ctx.emit_ld_intzr(3, RegisterSize::Int32);
        assert_eq!(ctx.ops(), &[Op::LdcI8(0), Op::LdcI4(0), Op::LdInt(3), Op::ConvU4]);
    }

    #[test]
    fn test_st_intzr_discards_zero_register() {
        let mut ctx = EmitterContext::new(0);
        ctx.emit_st_intzr(31, RegisterSize::Int32);
        ctx.emit_st_intsp(31, RegisterSize::Int64);
        assert_eq!(ctx.ops(), &[Op::Pop, Op::StInt(31)]);
    }

    #[test]
    fn test_goto_shapes() {
        let mut ctx = EmitterContext::new(0x1000);
        let label = ctx.register_block(0x1000);
        ctx.emit_goto(0x1000);
        ctx.emit_goto(0x2000);
        assert_eq!(ctx.ops(), &[Op::Br(label), Op::LdcI8(0x2000), Op::Ret]);
    }

    #[test]
    fn test_register_block_is_idempotent() {
        let mut ctx = EmitterContext::new(0);
        let a = ctx.register_block(0x40);
        let b = ctx.register_block(0x40);
        assert_eq!(a, b);
        assert_eq!(ctx.finish().label_count, 1);
    }

    #[test]
    #[should_panic(expected = "Invalid vector lane index")]
    fn test_vector_extract_checks_lane() {
        let mut ctx = EmitterContext::new(0);
        ctx.emit_vector_extract(0, 4, 2, false);
    }

    #[test]
    fn test_label_positions() {
        let mut ctx = EmitterContext::new(0);
        let a = ctx.define_label();
        let b = ctx.define_label();
        ctx.emit(Op::Br(b));
        ctx.mark_label(b);
        ctx.mark_label(a);
        let func = ctx.finish();
        assert_eq!(func.label_positions(), vec![Some(2), Some(1)]);
    }
}
