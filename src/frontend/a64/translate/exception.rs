use crate::error::EmitResult;
use crate::frontend::a64::opcode::OpCode64;
use crate::frontend::a64::translate::visitor::TranslatorVisitor;
use crate::ir::opcode::{Op, StateCall};

impl<'a> TranslatorVisitor<'a> {
    /// Call the exception hook, then leave with 0 if it stopped the thread or
    /// continue at the next instruction.
    fn emit_exception(&mut self, op: &OpCode64, call: StateCall) {
        let cont = self.ctx.define_label();
        self.ctx.emit_state_call(call);
        self.ctx.emit(Op::IsRunning);
        self.ctx.emit(Op::BrTrue(cont));
        self.ctx.emit_return(0);
        self.ctx.mark_label(cont);
        self.ctx.emit_goto(op.next_address());
    }

    /// SVC - Supervisor call
    pub fn svc(&mut self, op: &OpCode64) -> EmitResult {
        let imm = (op.imm & 0xFFFF) as u32;
        self.emit_exception(op, StateCall::SupervisorCall { address: op.address, imm });
        Ok(())
    }

    /// BRK - Breakpoint
    pub fn brk(&mut self, op: &OpCode64) -> EmitResult {
        let imm = (op.imm & 0xFFFF) as u32;
        self.emit_exception(op, StateCall::Breakpoint { address: op.address, imm });
        Ok(())
    }

    /// Undefined encoding, reported with its raw word.
    pub fn und(&mut self, op: &OpCode64) -> EmitResult {
        self.emit_exception(op, StateCall::Undefined { address: op.address, raw: op.raw });
        Ok(())
    }
}
