use std::fmt;

use crate::frontend::a64::types::SysReg;
use crate::ir::helper::Helper;
use crate::ir::intrinsic::Intrinsic;
use crate::ir::types::Type;
use crate::vector::Vector128;

/// Branch target inside a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl Label {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Function-scoped temporary slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Local(pub u32);

impl Local {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc{}", self.0)
    }
}

/// One of the four condition flags, loaded and stored as an `I32` 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    N,
    Z,
    C,
    V,
}

/// Calls out to the processor state. Operands, if any, come from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateCall {
    SupervisorCall { address: u64, imm: u32 },
    Breakpoint { address: u64, imm: u32 },
    Undefined { address: u64, raw: u32 },
    ClearExclusive,
    /// Pops the `I64` call target.
    EnterFunction,
    ExitFunction,
    SetSaturated,
}

/// Stack-machine operations.
///
/// Binary operations pop the right operand (top of stack) and then the left
/// one, and require both to have the same type; shifts take an `I32` or `I64`
/// amount which is masked to the operand width. Integer comparisons and
/// conditional branches consume integers; comparisons push `I32` 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    // --- Constants and stack ---
    LdcI4(u32),
    LdcI8(u64),
    LdcR4(f32),
    LdcR8(f64),
    LdcV(Vector128),
    Dup,
    Pop,
    LdLoc(Local),
    StLoc(Local),

    // --- Guest state ---
    /// X0..X30 as `I64`; register 31 is SP.
    LdInt(u8),
    StInt(u8),
    LdVec(u8),
    StVec(u8),
    LdFlag(Flag),
    StFlag(Flag),
    LdSysReg(SysReg),
    StSysReg(SysReg),

    // --- Arithmetic and logic ---
    Add,
    Sub,
    Mul,
    Div,
    DivUn,
    Neg,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    ShrUn,

    // --- Comparison ---
    Ceq,
    Cgt,
    CgtUn,
    Clt,
    CltUn,

    // --- Conversion ---
    ConvI1,
    ConvU1,
    ConvI2,
    ConvU2,
    ConvI4,
    ConvU4,
    ConvI8,
    ConvU8,
    ConvR4,
    ConvR8,
    ConvR4Un,
    ConvR8Un,
    /// Reinterpret the bits of the top value as the given type of equal width.
    Bitcast(Type),

    // --- Vector lanes ---
    /// Pops a `V128`, pushes lane `index` of `8 << size` bits as `I64`.
    VecExtractInt { index: u8, size: u8, signed: bool },
    /// Pops an `I64` value, then a `V128`; pushes the updated vector.
    VecInsertInt { index: u8, size: u8 },
    VecExtractFloat { index: u8, size_f: u8 },
    VecInsertFloat { index: u8, size_f: u8 },
    VecZero,
    VecZeroUpper,
    Intrinsic(Intrinsic),

    // --- Control flow ---
    MarkLabel(Label),
    Br(Label),
    BrTrue(Label),
    BrFalse(Label),
    /// Pops the `I64` address execution continues at.
    Ret,

    // --- Calls ---
    Call(Helper),
    StateCall(StateCall),
    /// Pushes `I32` 1 while the guest thread should keep running.
    IsRunning,
    /// Pops an `I64` value, then an `I64` address.
    WriteMem64,
}

impl Op {
    pub fn is_branch(&self) -> bool {
        matches!(self, Op::Br(_) | Op::BrTrue(_) | Op::BrFalse(_) | Op::Ret)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::LdcI4(v) => write!(f, "ldc.i4 {:#x}", v),
            Op::LdcI8(v) => write!(f, "ldc.i8 {:#x}", v),
            Op::LdcR4(v) => write!(f, "ldc.r4 {}", v),
            Op::LdcR8(v) => write!(f, "ldc.r8 {}", v),
            Op::LdcV(v) => write!(f, "ldc.v {}", v),
            Op::LdLoc(l) => write!(f, "ldloc {}", l),
            Op::StLoc(l) => write!(f, "stloc {}", l),
            Op::LdInt(r) if *r == 31 => write!(f, "ld sp"),
            Op::LdInt(r) => write!(f, "ld x{}", r),
            Op::StInt(r) if *r == 31 => write!(f, "st sp"),
            Op::StInt(r) => write!(f, "st x{}", r),
            Op::LdVec(r) => write!(f, "ld v{}", r),
            Op::StVec(r) => write!(f, "st v{}", r),
            Op::VecExtractInt { index, size, signed } => {
                write!(f, "vec.extract.{}{} [{}]", if *signed { 's' } else { 'u' }, 8 << size, index)
            }
            Op::VecInsertInt { index, size } => write!(f, "vec.insert.i{} [{}]", 8 << size, index),
            Op::VecExtractFloat { index, size_f } => write!(f, "vec.extract.f{} [{}]", 32 << size_f, index),
            Op::VecInsertFloat { index, size_f } => write!(f, "vec.insert.f{} [{}]", 32 << size_f, index),
            Op::Intrinsic(i) => write!(f, "{}", i),
            Op::MarkLabel(l) => write!(f, "{}:", l),
            Op::Br(l) => write!(f, "br {}", l),
            Op::BrTrue(l) => write!(f, "brtrue {}", l),
            Op::BrFalse(l) => write!(f, "brfalse {}", l),
            Op::Call(h) => write!(f, "call {:?}", h),
            other => write!(f, "{:?}", other),
        }
    }
}
