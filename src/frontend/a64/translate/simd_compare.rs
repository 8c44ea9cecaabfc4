use crate::backend::{ScalarBackend, VecFloatOp, VecIntOp, VectorBackend};
use crate::error::EmitResult;
use crate::flags::Nzcv;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::opcode::{Flag, Op};

impl<'a> TranslatorVisitor<'a> {
    /// Push Vn and a zero vector; `swap` puts the zero first so that
    /// `0 >= Vn` and `0 > Vn` give CMLE and CMLT.
    fn emit_against_zero(&mut self, op: &OpCode64, swap: bool) {
        if swap {
            self.ctx.emit(Op::VecZero);
            self.ctx.emit_ld_vec(op.rn);
        } else {
            self.ctx.emit_ld_vec(op.rn);
            self.ctx.emit(Op::VecZero);
        }
    }

    /// CMEQ/CMGE/CMGT/CMLE/CMLT (zero)
    pub fn cmp_zero(&mut self, op: &OpCode64, vop: VecIntOp, swap: bool, scalar: bool) -> EmitResult {
        self.emit_against_zero(op, swap);
        if scalar {
            ScalarBackend.emit_int_binary(self.ctx, vop, op.size as usize, 1);
            self.ctx.emit_st_vec(op.rd);
        } else {
            self.backend().emit_int_binary(self.ctx, vop, op.size as usize, op.elems());
            self.emit_commit(op);
        }
        Ok(())
    }

    /// FCMEQ/FCMGE/FCMGT/FCMLE/FCMLT (zero)
    pub fn fcmp_zero(&mut self, op: &OpCode64, fop: VecFloatOp, swap: bool, scalar: bool) -> EmitResult {
        self.emit_against_zero(op, swap);
        if scalar {
            ScalarBackend.emit_float_binary(self.ctx, fop, op.size_f(), 1);
            self.ctx.emit_st_vec(op.rd);
        } else {
            self.backend().emit_float_binary(self.ctx, fop, op.size_f(), op.elems_f());
            self.emit_commit(op);
        }
        Ok(())
    }

    /// NZCV from comparing lane 0 of Vn with lane 0 of Vm (or +0.0).
    /// Unordered gives 0011.
    fn emit_fcmp_flags(&mut self, op: &OpCode64, zero: bool) {
        let size_f = op.size_f();
        self.ctx.emit_vector_extract_f(op.rn, 0, size_f);
        let a = self.ctx.store_local();
        if zero {
            self.emit_ldc_f(0.0, size_f);
        } else {
            self.ctx.emit_vector_extract_f(op.rm, 0, size_f);
        }
        let b = self.ctx.store_local();

        self.ctx.emit(Op::LdLoc(a));
        self.ctx.emit(Op::LdLoc(b));
        self.ctx.emit(Op::Clt);
        self.ctx.emit_st_flag(Flag::N);

        self.ctx.emit(Op::LdLoc(a));
        self.ctx.emit(Op::LdLoc(b));
        self.ctx.emit(Op::Ceq);
        self.ctx.emit_st_flag(Flag::Z);

        self.ctx.emit(Op::LdLoc(a));
        self.ctx.emit(Op::LdLoc(b));
        self.ctx.emit(Op::Clt);
        self.ctx.emit_ldc_i4(0);
        self.ctx.emit(Op::Ceq);
        self.ctx.emit_st_flag(Flag::C);

        self.ctx.emit(Op::LdLoc(a));
        self.ctx.emit(Op::LdLoc(b));
        self.ctx.emit(Op::CltUn);
        self.ctx.emit(Op::LdLoc(a));
        self.ctx.emit(Op::LdLoc(b));
        self.ctx.emit(Op::CgtUn);
        self.ctx.emit(Op::And);
        self.ctx.emit_st_flag(Flag::V);
    }

    /// FCMP/FCMPE
    pub fn fcmp(&mut self, op: &OpCode64, zero: bool) -> EmitResult {
        self.emit_fcmp_flags(op, zero);
        Ok(())
    }

    /// FCCMP/FCCMPE: compare if the condition holds, otherwise set NZCV
    /// from the immediate.
    pub fn fccmp(&mut self, op: &OpCode64) -> EmitResult {
        let compare = self.ctx.define_label();
        let end = self.ctx.define_label();

        self.ctx.emit_cond_branch(op.cond, compare);
        self.ctx.emit_set_nzcv(Nzcv::from_imm4(op.nzcv as u32));
        self.ctx.emit(Op::Br(end));

        self.ctx.mark_label(compare);
        self.emit_fcmp_flags(op, false);

        self.ctx.mark_label(end);
        Ok(())
    }

    /// FCSEL: Vd = cond ? Vn : Vm, scalar. Each arm writes Vd.
    pub fn fcsel(&mut self, op: &OpCode64) -> EmitResult {
        let size_f = op.size_f();
        let take_rn = self.ctx.define_label();
        let end = self.ctx.define_label();

        self.ctx.emit_cond_branch(op.cond, take_rn);

        self.emit_build_vector_f(None, 1, size_f, 0, |v, _| v.ctx.emit_vector_extract_f(op.rm, 0, size_f));
        self.ctx.emit_st_vec(op.rd);
        self.ctx.emit(Op::Br(end));

        self.ctx.mark_label(take_rn);
        self.emit_build_vector_f(None, 1, size_f, 0, |v, _| v.ctx.emit_vector_extract_f(op.rn, 0, size_f));
        self.ctx.emit_st_vec(op.rd);

        self.ctx.mark_label(end);
        Ok(())
    }
}
