use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::frontend::a64::types::RegisterSize;

impl<'a> TranslatorVisitor<'a> {
    /// CRC32{B,H,W,X} and CRC32C{B,H,W,X}. `size` picks the operand width of
    /// Rm; Wn holds the running checksum.
    pub fn crc32(&mut self, op: &OpCode64, castagnoli: bool) -> EmitResult {
        if op.size > 3 {
            panic!("Invalid CRC32 operand size {}", op.size);
        }
        self.ctx.emit_ld_intzr(op.rn, RegisterSize::Int32);
        self.ctx.emit_ld_intzr(op.rm, RegisterSize::Int64);
        self.backend().emit_crc32(self.ctx, castagnoli, op.size as usize);
        self.ctx.emit_st_intzr(op.rd, RegisterSize::Int32);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::HostCapabilities;
    use crate::config::EmitterConfig;
    use crate::exec::CpuState;
    use crate::frontend::a64::opcode::{Mnemonic, OpCode64};
    use crate::frontend::a64::translate::testing::{run, run_with};
    use crate::soft::crc32;

    #[test]
    fn test_crc32_widths() {
        let mut state = CpuState::new();
        state.x[1] = 0xFFFF_FFFF_1234_5678;
        state.x[2] = 0x0807_0605_0403_0201;
        let ops = [
            OpCode64::new(Mnemonic::CRC32, 0).regs(3, 1, 2).elem(0),
            OpCode64::new(Mnemonic::CRC32, 4).regs(4, 1, 2).elem(1),
            OpCode64::new(Mnemonic::CRC32C, 8).regs(5, 1, 2).elem(2),
            OpCode64::new(Mnemonic::CRC32C, 12).regs(6, 1, 2).elem(3),
        ];
        run(&ops, &mut state);
        assert_eq!(state.x[3], crc32::crc32b(0x1234_5678, 0x01) as u64);
        assert_eq!(state.x[4], crc32::crc32h(0x1234_5678, 0x0201) as u64);
        assert_eq!(state.x[5], crc32::crc32cw(0x1234_5678, 0x0403_0201) as u64);
        assert_eq!(state.x[6], crc32::crc32cx(0x1234_5678, 0x0807_0605_0403_0201) as u64);
    }

    #[test]
    fn test_crc32c_accelerated_matches() {
        let config = EmitterConfig::with_capabilities(HostCapabilities::all());
        let mut state = CpuState::new();
        state.x[1] = 0xDEAD_BEEF;
        state.x[2] = 0x0123_4567_89AB_CDEF;
        let op = OpCode64::new(Mnemonic::CRC32C, 0).regs(0, 1, 2).elem(3);
        run_with(&config, &[op], &mut state);
        assert_eq!(state.x[0], crc32::crc32cx(0xDEAD_BEEF, 0x0123_4567_89AB_CDEF) as u64);
    }
}
