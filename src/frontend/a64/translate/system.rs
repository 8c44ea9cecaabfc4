use log::debug;

use crate::error::{EmitError, EmitResult};
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::{RegisterSize, SysReg, DCZ_BLOCK_BYTES, DC_ZVA};
use crate::ir::opcode::{Op, StateCall};

impl<'a> TranslatorVisitor<'a> {
    fn system_register(&self, op: &OpCode64) -> Result<SysReg, EmitError> {
        SysReg::from_encoding(op.sys).ok_or(EmitError::UnknownSystemRegister {
            address: op.address,
            encoding: op.sys,
        })
    }

    /// MRS - Move system register to general-purpose register. Rt is in `rd`.
    pub fn mrs(&mut self, op: &OpCode64) -> EmitResult {
        let reg = self.system_register(op)?;
        self.ctx.emit(Op::LdSysReg(reg));
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int64);
        Ok(())
    }

    /// MSR - Move general-purpose register to system register.
    pub fn msr(&mut self, op: &OpCode64) -> EmitResult {
        let reg = self.system_register(op)?;
        if !reg.is_writable() {
            return Err(EmitError::UnknownSystemRegister { address: op.address, encoding: op.sys });
        }
        self.ctx.emit_ld_intzr(op.rd, RegisterSize::Int64);
        self.ctx.emit(Op::StSysReg(reg));
        Ok(())
    }

    /// SYS - System instruction. DC ZVA zeroes a block; the other cache and
    /// TLB maintenance operations have no effect on guest-visible state.
    pub fn sys(&mut self, op: &OpCode64) -> EmitResult {
        if op.sys != DC_ZVA {
            debug!("SYS {:#07x} at {:#x} ignored", op.sys, op.address);
            return Ok(());
        }

        self.ctx.emit_ld_intzr(op.rd, RegisterSize::Int64);
        self.ctx.emit_ldc_i8(!(DCZ_BLOCK_BYTES - 1));
        self.ctx.emit(Op::And);
        let base = self.ctx.store_local();
        for offset in (0..DCZ_BLOCK_BYTES).step_by(8) {
            self.ctx.emit(Op::LdLoc(base));
            self.ctx.emit_ldc_i8(offset);
            self.ctx.emit(Op::Add);
            self.ctx.emit_ldc_i8(0);
            self.ctx.emit(Op::WriteMem64);
        }
        Ok(())
    }

    /// CLREX - Clear exclusive monitor
    pub fn clrex(&mut self, _op: &OpCode64) -> EmitResult {
        self.ctx.emit_state_call(StateCall::ClearExclusive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EmitterConfig;
    use crate::error::EmitError;
    use crate::exec::CpuState;
    use crate::flags::Nzcv;
    use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
    use crate::frontend::a64::translate::testing::run;
    use crate::frontend::a64::translate::translate_block;
    use crate::frontend::a64::types::{sys_encoding, SysReg, DC_ZVA};

    #[test]
    fn test_mrs_reads() {
        let mut state = CpuState::new();
        state.tpidrro = 0xAAAA;
        state.flags = Nzcv::new(true, false, true, false);
        let ops = [
            OpCode64::new(Mnemonic::MRS, 0).rd(0).sys_reg(SysReg::TpidrroEl0.encoding()),
            OpCode64::new(Mnemonic::MRS, 4).rd(1).sys_reg(SysReg::DczidEl0.encoding()),
            OpCode64::new(Mnemonic::MRS, 8).rd(2).sys_reg(SysReg::Nzcv.encoding()),
        ];
        run(&ops, &mut state);
        assert_eq!(state.x[0], 0xAAAA);
        assert_eq!(state.x[1], 4);
        assert_eq!(state.x[2], 0xA000_0000);
    }

    #[test]
    fn test_msr_writes() {
        let mut state = CpuState::new();
        state.x[0] = 0x1234;
        state.x[1] = 0x6000_0000;
        let ops = [
            OpCode64::new(Mnemonic::MSR, 0).rd(0).sys_reg(SysReg::TpidrEl0.encoding()),
            OpCode64::new(Mnemonic::MSR, 4).rd(1).sys_reg(SysReg::Nzcv.encoding()),
        ];
        run(&ops, &mut state);
        assert_eq!(state.tpidr, 0x1234);
        assert_eq!(state.flags, Nzcv::new(false, true, true, false));
    }

    #[test]
    fn test_unknown_system_register_is_an_error() {
        let config = EmitterConfig::scalar();
        let encoding = sys_encoding(3, 0, 1, 0, 0);
        let op = OpCode64::new(Mnemonic::MRS, 0x40).sys_reg(encoding);
        assert_eq!(
            translate_block(&config, &[op]).unwrap_err(),
            EmitError::UnknownSystemRegister { address: 0x40, encoding }
        );

        // CTR_EL0 is read-only
        let op = OpCode64::new(Mnemonic::MSR, 0x44).sys_reg(SysReg::CtrEl0.encoding());
        assert!(translate_block(&config, &[op]).is_err());
    }

    #[test]
    fn test_dc_zva_zeroes_aligned_block() {
        let mut state = CpuState::new();
        for i in 0..16u64 {
            state.memory.insert(0x1000 + i * 8, u64::MAX);
        }
        state.x[3] = 0x1013;
        run(&[OpCode64::new(Mnemonic::SYS, 0).rd(3).sys_reg(DC_ZVA)], &mut state);
        for i in 0..8u64 {
            assert_eq!(state.read_memory_64(0x1000 + i * 8), 0);
        }
        assert_eq!(state.read_memory_64(0x1040), u64::MAX);
    }

    #[test]
    fn test_clrex_and_barriers() {
        let mut state = CpuState::new();
        let ops = [
            OpCode64::new(Mnemonic::DMB, 0),
            OpCode64::new(Mnemonic::CLREX, 4),
            OpCode64::new(Mnemonic::NOP, 8),
            OpCode64::new(Mnemonic::SYS, 12).sys_reg(sys_encoding(1, 3, 7, 5, 1)),
        ];
        assert_eq!(run(&ops, &mut state), 16);
        assert_eq!(state.exclusive_clears, 1);
    }
}
