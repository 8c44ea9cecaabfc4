use log::trace;
use thiserror::Error;

use crate::config::{EmitterConfig, ProcessorState};
use crate::exec::intrinsic;
use crate::exec::state::CpuState;
use crate::frontend::a64::types::SysReg;
use crate::ir::block::Function;
use crate::ir::opcode::{Flag, Label, Local, Op, StateCall};
use crate::ir::types::Type;
use crate::ir::value::Value;
use crate::vector::Vector128;

/// Reported by CTR_EL0: 64-byte cache lines, VIPT L1I.
const CTR_EL0_VALUE: u64 = 0x8444_C004;

/// DCZID_EL0: log2 of the DC ZVA block size in words.
const DCZID_EL0_VALUE: u64 = 4;

const DEFAULT_STEP_LIMIT: u64 = 1 << 24;

/// Malformed bytecode. Well-formed emitter output never produces these.
#[derive(Debug, Error, PartialEq)]
pub enum ExecError {
    #[error("stack underflow at op {pc} ({op})")]
    StackUnderflow { pc: usize, op: Op },
    #[error("type mismatch at op {pc} ({op}): found {found}")]
    TypeMismatch { pc: usize, op: Op, found: Type },
    #[error("label {0} is never marked")]
    UnknownLabel(Label),
    #[error("local {0} read before it was stored")]
    UninitializedLocal(Local),
    #[error("integer division by zero at op {pc}")]
    DivideByZero { pc: usize },
    #[error("integer division overflow at op {pc}")]
    Overflow { pc: usize },
    #[error("{0:?} is not writable")]
    ReadOnlySystemRegister(SysReg),
    #[error("{depth} values left on the stack at return")]
    UnbalancedStack { depth: usize },
    #[error("execution ran past the last op")]
    FellOffEnd,
    #[error("step limit of {0} ops exceeded")]
    StepLimit(u64),
}

/// Reference interpreter for emitted functions.
pub struct Interpreter<'a> {
    config: &'a EmitterConfig,
    step_limit: u64,
}

struct Frame<'f> {
    func: &'f Function,
    labels: Vec<Option<usize>>,
    stack: Vec<Value>,
    locals: Vec<Option<Value>>,
    pc: usize,
    op: Op,
}

impl<'f> Frame<'f> {
    fn pop(&mut self) -> Result<Value, ExecError> {
        self.stack.pop().ok_or(ExecError::StackUnderflow { pc: self.pc, op: self.op })
    }

    fn push(&mut self, value: impl Into<Value>) {
        self.stack.push(value.into());
    }

    fn mismatch(&self, found: &Value) -> ExecError {
        ExecError::TypeMismatch { pc: self.pc, op: self.op, found: found.get_type() }
    }

    fn pop_i32(&mut self) -> Result<u32, ExecError> {
        match self.pop()? {
            Value::I32(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    fn pop_i64(&mut self) -> Result<u64, ExecError> {
        match self.pop()? {
            Value::I64(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    fn pop_int(&mut self) -> Result<u64, ExecError> {
        let value = self.pop()?;
        value.as_int().ok_or_else(|| self.mismatch(&value))
    }

    fn pop_v128(&mut self) -> Result<Vector128, ExecError> {
        match self.pop()? {
            Value::V128(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    /// Pop `types.len()` values and return them in push order.
    fn pop_args(&mut self, types: &[Type]) -> Result<Vec<Value>, ExecError> {
        let mut args = Vec::with_capacity(types.len());
        for ty in types.iter().rev() {
            let value = self.pop()?;
            if value.get_type() != *ty {
                return Err(self.mismatch(&value));
            }
            args.push(value);
        }
        args.reverse();
        Ok(args)
    }

    fn pop_pair(&mut self) -> Result<(Value, Value), ExecError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        if lhs.get_type() != rhs.get_type() {
            return Err(self.mismatch(&rhs));
        }
        Ok((lhs, rhs))
    }

    fn jump(&mut self, label: Label) -> Result<(), ExecError> {
        match self.labels.get(label.index()).copied().flatten() {
            Some(target) => {
                self.pc = target;
                Ok(())
            }
            None => Err(ExecError::UnknownLabel(label)),
        }
    }
}

impl<'a> Interpreter<'a> {
    pub fn new(config: &'a EmitterConfig) -> Self {
        Self { config, step_limit: DEFAULT_STEP_LIMIT }
    }

    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Run `func` against `state` and return the guest address to continue at.
    pub fn run(&self, func: &Function, state: &mut CpuState) -> Result<u64, ExecError> {
        let mut frame = Frame {
            func,
            labels: func.label_positions(),
            stack: Vec::new(),
            locals: vec![None; func.local_count as usize],
            pc: 0,
            op: Op::Pop,
        };

        let mut steps = 0u64;
        loop {
            let Some(op) = frame.func.ops.get(frame.pc).copied() else {
                return Err(ExecError::FellOffEnd);
            };
            steps += 1;
            if steps > self.step_limit {
                return Err(ExecError::StepLimit(self.step_limit));
            }
            frame.op = op;
            let pc = frame.pc;
            frame.pc += 1;

            if let Op::Ret = op {
                let target = frame.pop_i64()?;
                if !frame.stack.is_empty() {
                    return Err(ExecError::UnbalancedStack { depth: frame.stack.len() });
                }
                trace!("ret {:#x} after {} ops", target, steps);
                return Ok(target);
            }

            self.step(&mut frame, op, state).map_err(|err| {
                trace!("fault at op {}: {}", pc, op);
                err
            })?;
        }
    }

    fn step(&self, frame: &mut Frame<'_>, op: Op, state: &mut CpuState) -> Result<(), ExecError> {
        match op {
            Op::LdcI4(v) => frame.push(v),
            Op::LdcI8(v) => frame.push(v),
            Op::LdcR4(v) => frame.push(v),
            Op::LdcR8(v) => frame.push(v),
            Op::LdcV(v) => frame.push(v),
            Op::Dup => {
                let value = frame.pop()?;
                frame.push(value);
                frame.push(value);
            }
            Op::Pop => {
                frame.pop()?;
            }
            Op::LdLoc(local) => {
                let value = frame
                    .locals
                    .get(local.index())
                    .copied()
                    .flatten()
                    .ok_or(ExecError::UninitializedLocal(local))?;
                frame.push(value);
            }
            Op::StLoc(local) => {
                let value = frame.pop()?;
                match frame.locals.get_mut(local.index()) {
                    Some(slot) => *slot = Some(value),
                    None => return Err(ExecError::UninitializedLocal(local)),
                }
            }

            Op::LdInt(reg) => frame.push(state.reg(reg)),
            Op::StInt(reg) => {
                let value = frame.pop_i64()?;
                state.set_reg(reg, value);
            }
            Op::LdVec(reg) => frame.push(state.v[reg as usize]),
            Op::StVec(reg) => state.v[reg as usize] = frame.pop_v128()?,
            Op::LdFlag(flag) => {
                let f = state.flags;
                let bit = match flag {
                    Flag::N => f.n,
                    Flag::Z => f.z,
                    Flag::C => f.c,
                    Flag::V => f.v,
                };
                frame.push(bit as u32);
            }
            Op::StFlag(flag) => {
                let bit = frame.pop_i32()? != 0;
                match flag {
                    Flag::N => state.flags.n = bit,
                    Flag::Z => state.flags.z = bit,
                    Flag::C => state.flags.c = bit,
                    Flag::V => state.flags.v = bit,
                }
            }
            Op::LdSysReg(reg) => {
                let value = match reg {
                    SysReg::Nzcv => state.nzcv().to_bits() as u64,
                    SysReg::Fpcr => state.fpcr() as u64,
                    SysReg::Fpsr => state.fpsr() as u64,
                    SysReg::TpidrEl0 => state.tpidr(),
                    SysReg::TpidrroEl0 => state.tpidrro(),
                    SysReg::CntfrqEl0 => state.counter_frequency(),
                    SysReg::CntpctEl0 => state.counter(),
                    SysReg::CtrEl0 => CTR_EL0_VALUE,
                    SysReg::DczidEl0 => DCZID_EL0_VALUE,
                };
                frame.push(value);
            }
            Op::StSysReg(reg) => {
                let value = frame.pop_i64()?;
                match reg {
                    SysReg::Nzcv => state.set_nzcv(crate::flags::Nzcv::from_bits(value as u32)),
                    SysReg::Fpcr => state.set_fpcr(value as u32),
                    SysReg::Fpsr => state.set_fpsr(value as u32),
                    SysReg::TpidrEl0 => state.set_tpidr(value),
                    other => return Err(ExecError::ReadOnlySystemRegister(other)),
                }
            }

            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::DivUn | Op::And | Op::Or | Op::Xor => {
                let (lhs, rhs) = frame.pop_pair()?;
                let result = binary(frame, op, lhs, rhs)?;
                frame.push(result);
            }
            Op::Neg | Op::Not => {
                let value = frame.pop()?;
                let result = match (op, value) {
                    (Op::Neg, Value::I32(v)) => Value::I32(v.wrapping_neg()),
                    (Op::Neg, Value::I64(v)) => Value::I64(v.wrapping_neg()),
                    (Op::Neg, Value::F32(v)) => Value::F32(-v),
                    (Op::Neg, Value::F64(v)) => Value::F64(-v),
                    (Op::Not, Value::I32(v)) => Value::I32(!v),
                    (Op::Not, Value::I64(v)) => Value::I64(!v),
                    (Op::Not, Value::V128(v)) => Value::V128(!v),
                    (_, other) => return Err(frame.mismatch(&other)),
                };
                frame.push(result);
            }
            Op::Shl | Op::Shr | Op::ShrUn => {
                let amount = frame.pop_int()? as u32;
                let value = frame.pop()?;
                let result = match (op, value) {
                    (Op::Shl, Value::I32(v)) => Value::I32(v << (amount & 31)),
                    (Op::Shl, Value::I64(v)) => Value::I64(v << (amount & 63)),
                    (Op::Shr, Value::I32(v)) => Value::I32(((v as i32) >> (amount & 31)) as u32),
                    (Op::Shr, Value::I64(v)) => Value::I64(((v as i64) >> (amount & 63)) as u64),
                    (Op::ShrUn, Value::I32(v)) => Value::I32(v >> (amount & 31)),
                    (Op::ShrUn, Value::I64(v)) => Value::I64(v >> (amount & 63)),
                    (_, other) => return Err(frame.mismatch(&other)),
                };
                frame.push(result);
            }

            Op::Ceq | Op::Cgt | Op::CgtUn | Op::Clt | Op::CltUn => {
                let (lhs, rhs) = frame.pop_pair()?;
                let result = compare(frame, op, lhs, rhs)?;
                frame.push(result as u32);
            }

            Op::ConvI1 | Op::ConvU1 | Op::ConvI2 | Op::ConvU2 | Op::ConvI4 | Op::ConvU4 | Op::ConvI8 | Op::ConvU8 => {
                let value = frame.pop()?;
                let result = convert_int(frame, op, value)?;
                frame.push(result);
            }
            Op::ConvR4 | Op::ConvR8 | Op::ConvR4Un | Op::ConvR8Un => {
                let value = frame.pop()?;
                let unsigned = matches!(op, Op::ConvR4Un | Op::ConvR8Un);
                let wide = match value {
                    Value::I32(v) if unsigned => v as f64,
                    Value::I32(v) => v as i32 as f64,
                    Value::I64(v) if unsigned => {
                        if matches!(op, Op::ConvR4Un) {
                            frame.push(v as f32);
                            return Ok(());
                        }
                        v as f64
                    }
                    Value::I64(v) => {
                        if matches!(op, Op::ConvR4) {
                            frame.push(v as i64 as f32);
                            return Ok(());
                        }
                        v as i64 as f64
                    }
                    Value::F32(v) => v as f64,
                    Value::F64(v) => v,
                    other => return Err(frame.mismatch(&other)),
                };
                if matches!(op, Op::ConvR4 | Op::ConvR4Un) {
                    frame.push(wide as f32);
                } else {
                    frame.push(wide);
                }
            }
            Op::Bitcast(ty) => {
                let value = frame.pop()?;
                let result = match (value, ty) {
                    (Value::I32(v), Type::F32) => Value::F32(f32::from_bits(v)),
                    (Value::F32(v), Type::I32) => Value::I32(v.to_bits()),
                    (Value::I64(v), Type::F64) => Value::F64(f64::from_bits(v)),
                    (Value::F64(v), Type::I64) => Value::I64(v.to_bits()),
                    (v, ty) if v.get_type() == ty => v,
                    (other, _) => return Err(frame.mismatch(&other)),
                };
                frame.push(result);
            }

            Op::VecExtractInt { index, size, signed } => {
                let v = frame.pop_v128()?;
                frame.push(v.extract_int(index as usize, size as usize, signed));
            }
            Op::VecInsertInt { index, size } => {
                let value = frame.pop_i64()?;
                let v = frame.pop_v128()?;
                frame.push(v.insert_int(index as usize, size as usize, value));
            }
            Op::VecExtractFloat { index, size_f } => {
                let v = frame.pop_v128()?;
                if size_f == 0 {
                    frame.push(v.extract_f32(index as usize));
                } else {
                    frame.push(v.extract_f64(index as usize));
                }
            }
            Op::VecInsertFloat { index, size_f } => {
                let value = frame.pop()?;
                let v = frame.pop_v128()?;
                let result = match (value, size_f) {
                    (Value::F32(f), 0) => v.insert_f32(index as usize, f),
                    (Value::F64(f), 1) => v.insert_f64(index as usize, f),
                    (other, _) => return Err(frame.mismatch(&other)),
                };
                frame.push(result);
            }
            Op::VecZero => frame.push(Vector128::ZERO),
            Op::VecZeroUpper => {
                let v = frame.pop_v128()?;
                frame.push(v.zero_upper());
            }
            Op::Intrinsic(i) => {
                let (types, _) = i.signature();
                let args = frame.pop_args(types)?;
                frame.push(intrinsic::evaluate(i, &args));
            }

            Op::MarkLabel(_) => {}
            Op::Br(label) => frame.jump(label)?,
            Op::BrTrue(label) => {
                if frame.pop_int()? != 0 {
                    frame.jump(label)?;
                }
            }
            Op::BrFalse(label) => {
                if frame.pop_int()? == 0 {
                    frame.jump(label)?;
                }
            }
            Op::Ret => unreachable!(),

            Op::Call(helper) => {
                let (types, _) = helper.signature();
                let args = frame.pop_args(types)?;
                let result = helper.invoke(&args, state, self.config.tables());
                frame.push(result);
            }
            Op::StateCall(call) => match call {
                StateCall::SupervisorCall { address, imm } => state.on_supervisor_call(address, imm),
                StateCall::Breakpoint { address, imm } => state.on_breakpoint(address, imm),
                StateCall::Undefined { address, raw } => state.on_undefined(address, raw),
                StateCall::ClearExclusive => state.clear_exclusive(),
                StateCall::EnterFunction => {
                    let target = frame.pop_i64()?;
                    state.enter_function(target);
                }
                StateCall::ExitFunction => state.exit_function(),
                StateCall::SetSaturated => state.set_saturated(),
            },
            Op::IsRunning => frame.push(state.is_running() as u32),
            Op::WriteMem64 => {
                let value = frame.pop_i64()?;
                let address = frame.pop_i64()?;
                state.write_memory_64(address, value);
            }
        }
        Ok(())
    }
}

fn binary(frame: &Frame<'_>, op: Op, lhs: Value, rhs: Value) -> Result<Value, ExecError> {
    let pc = frame.pc - 1;
    let result = match (lhs, rhs) {
        (Value::I32(a), Value::I32(b)) => Value::I32(match op {
            Op::Add => a.wrapping_add(b),
            Op::Sub => a.wrapping_sub(b),
            Op::Mul => a.wrapping_mul(b),
            Op::Div => {
                if b == 0 {
                    return Err(ExecError::DivideByZero { pc });
                }
                (a as i32).checked_div(b as i32).ok_or(ExecError::Overflow { pc })? as u32
            }
            Op::DivUn => a.checked_div(b).ok_or(ExecError::DivideByZero { pc })?,
            Op::And => a & b,
            Op::Or => a | b,
            _ => a ^ b,
        }),
        (Value::I64(a), Value::I64(b)) => Value::I64(match op {
            Op::Add => a.wrapping_add(b),
            Op::Sub => a.wrapping_sub(b),
            Op::Mul => a.wrapping_mul(b),
            Op::Div => {
                if b == 0 {
                    return Err(ExecError::DivideByZero { pc });
                }
                (a as i64).checked_div(b as i64).ok_or(ExecError::Overflow { pc })? as u64
            }
            Op::DivUn => a.checked_div(b).ok_or(ExecError::DivideByZero { pc })?,
            Op::And => a & b,
            Op::Or => a | b,
            _ => a ^ b,
        }),
        (Value::F32(a), Value::F32(b)) => Value::F32(match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
            _ => return Err(frame.mismatch(&lhs)),
        }),
        (Value::F64(a), Value::F64(b)) => Value::F64(match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
            _ => return Err(frame.mismatch(&lhs)),
        }),
        (Value::V128(a), Value::V128(b)) => Value::V128(match op {
            Op::And => a & b,
            Op::Or => a | b,
            Op::Xor => a ^ b,
            _ => return Err(frame.mismatch(&lhs)),
        }),
        _ => return Err(frame.mismatch(&lhs)),
    };
    Ok(result)
}

fn compare(frame: &Frame<'_>, op: Op, lhs: Value, rhs: Value) -> Result<bool, ExecError> {
    let result = match (lhs, rhs) {
        (Value::I32(a), Value::I32(b)) => int_compare(op, a as u64, b as u64, a as i32 as i64, b as i32 as i64),
        (Value::I64(a), Value::I64(b)) => int_compare(op, a, b, a as i64, b as i64),
        (Value::F32(a), Value::F32(b)) => float_compare(op, a as f64, b as f64),
        (Value::F64(a), Value::F64(b)) => float_compare(op, a, b),
        _ => return Err(frame.mismatch(&lhs)),
    };
    Ok(result)
}

fn int_compare(op: Op, ua: u64, ub: u64, sa: i64, sb: i64) -> bool {
    match op {
        Op::Ceq => ua == ub,
        Op::Cgt => sa > sb,
        Op::CgtUn => ua > ub,
        Op::Clt => sa < sb,
        _ => ua < ub,
    }
}

/// The `Un` forms are true when either operand is NaN.
fn float_compare(op: Op, a: f64, b: f64) -> bool {
    let unordered = a.is_nan() || b.is_nan();
    match op {
        Op::Ceq => a == b,
        Op::Cgt => a > b,
        Op::CgtUn => unordered || a > b,
        Op::Clt => a < b,
        _ => unordered || a < b,
    }
}

fn convert_int(frame: &Frame<'_>, op: Op, value: Value) -> Result<Value, ExecError> {
    // Integer sources keep their bits; float sources saturate toward zero.
    let (bits, from_float) = match value {
        Value::I32(v) => (v as u64, None),
        Value::I64(v) => (v, None),
        Value::F32(v) => (0, Some(v as f64)),
        Value::F64(v) => (0, Some(v)),
        Value::V128(_) => return Err(frame.mismatch(&value)),
    };
    let result = match (op, from_float) {
        (Op::ConvI1, None) => Value::I32(bits as i8 as i32 as u32),
        (Op::ConvU1, None) => Value::I32(bits as u8 as u32),
        (Op::ConvI2, None) => Value::I32(bits as i16 as i32 as u32),
        (Op::ConvU2, None) => Value::I32(bits as u16 as u32),
        (Op::ConvI4, None) | (Op::ConvU4, None) => Value::I32(bits as u32),
        (Op::ConvI8, None) => match value {
            Value::I32(v) => Value::I64(v as i32 as i64 as u64),
            _ => Value::I64(bits),
        },
        (Op::ConvU8, None) => Value::I64(bits),
        (Op::ConvI1, Some(f)) => Value::I32(f as i8 as i32 as u32),
        (Op::ConvU1, Some(f)) => Value::I32(f as u8 as u32),
        (Op::ConvI2, Some(f)) => Value::I32(f as i16 as i32 as u32),
        (Op::ConvU2, Some(f)) => Value::I32(f as u16 as u32),
        (Op::ConvI4, Some(f)) => Value::I32(f as i32 as u32),
        (Op::ConvU4, Some(f)) => Value::I32(f as u32),
        (Op::ConvI8, Some(f)) => Value::I64(f as i64 as u64),
        (_, Some(f)) => Value::I64(f as u64),
        _ => return Err(frame.mismatch(&value)),
    };
    Ok(result)
}
