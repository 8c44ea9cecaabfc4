use crate::backend::{AesOp, VectorBackend};
use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::helper::Helper;
use crate::ir::opcode::Op;

impl<'a> TranslatorVisitor<'a> {
    /// AESE/AESD: Vd = round(Vd, Vn)
    pub fn aes_round(&mut self, op: &OpCode64, aop: AesOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit_ld_vec(op.rn);
        self.backend().emit_aes(self.ctx, aop);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// AESMC/AESIMC
    pub fn aes_mix(&mut self, op: &OpCode64, aop: AesOp) -> EmitResult {
        self.ctx.emit_ld_vec(op.rn);
        self.backend().emit_aes(self.ctx, aop);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SHA1C/SHA1M/SHA1P: Qd = hash(Qd, Sn, Vm.4S)
    pub fn sha1_hash(&mut self, op: &OpCode64, helper: Helper) -> EmitResult {
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit_vector_extract_zx(op.rn, 0, 2);
        self.ctx.emit(Op::ConvU4);
        self.ctx.emit_ld_vec(op.rm);
        self.ctx.emit_call(helper);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SHA1H: Sd = ROL(Sn, 30)
    pub fn sha1h(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_build_vector(None, 1, 2, 0, |v, _| {
            v.ctx.emit_vector_extract_zx(op.rn, 0, 2);
            v.ctx.emit(Op::ConvU4);
            v.ctx.emit_call(Helper::Sha1FixedRotate);
            v.ctx.emit(Op::ConvU8);
        });
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }

    /// SHA1SU0/SHA1SU1/SHA256H/SHA256H2/SHA256SU0/SHA256SU1: Vd = f(Vd, Vn[, Vm]).
    pub fn sha_schedule(&mut self, op: &OpCode64, helper: Helper) -> EmitResult {
        let (args, _) = helper.signature();
        self.ctx.emit_ld_vec(op.rd);
        self.ctx.emit_ld_vec(op.rn);
        match args.len() {
            2 => {}
            3 => self.ctx.emit_ld_vec(op.rm),
            n => panic!("Invalid SHA helper {:?} with {} operands", helper, n),
        }
        self.ctx.emit_call(helper);
        self.ctx.emit_st_vec(op.rd);
        Ok(())
    }
}
