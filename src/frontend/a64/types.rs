use std::fmt;

/// Register number 31: SP or ZR depending on the operand.
pub const REG_SP_ZR: u8 = 31;

/// Operand width class of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegisterSize {
    Int32,
    #[default]
    Int64,
    Simd64,
    Simd128,
}

impl RegisterSize {
    pub fn bits(self) -> u32 {
        match self {
            RegisterSize::Int32 => 32,
            RegisterSize::Int64 | RegisterSize::Simd64 => 64,
            RegisterSize::Simd128 => 128,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    pub fn is_simd(self) -> bool {
        matches!(self, RegisterSize::Simd64 | RegisterSize::Simd128)
    }
}

impl fmt::Display for RegisterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterSize::Int32 => write!(f, "W"),
            RegisterSize::Int64 => write!(f, "X"),
            RegisterSize::Simd64 => write!(f, "D"),
            RegisterSize::Simd128 => write!(f, "Q"),
        }
    }
}

/// Shift type for data processing instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ShiftType {
    #[default]
    LSL = 0,
    LSR = 1,
    ASR = 2,
    ROR = 3,
}

impl ShiftType {
    pub fn from_u8(val: u8) -> Self {
        match val & 3 {
            0 => ShiftType::LSL,
            1 => ShiftType::LSR,
            2 => ShiftType::ASR,
            _ => ShiftType::ROR,
        }
    }
}

/// Register extension for the extended-register forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ExtendType {
    UXTB = 0,
    UXTH = 1,
    UXTW = 2,
    #[default]
    UXTX = 3,
    SXTB = 4,
    SXTH = 5,
    SXTW = 6,
    SXTX = 7,
}

impl ExtendType {
    pub fn from_u8(val: u8) -> Self {
        match val & 7 {
            0 => ExtendType::UXTB,
            1 => ExtendType::UXTH,
            2 => ExtendType::UXTW,
            3 => ExtendType::UXTX,
            4 => ExtendType::SXTB,
            5 => ExtendType::SXTH,
            6 => ExtendType::SXTW,
            _ => ExtendType::SXTX,
        }
    }

    pub fn is_signed(self) -> bool {
        self as u8 >= 4
    }

    /// Source width in bits before extension.
    pub fn source_bits(self) -> u32 {
        8 << (self as u8 & 3)
    }
}

/// Pack an MRS/MSR/SYS operand into `op0:op1:CRn:CRm:op2`.
pub const fn sys_encoding(op0: u32, op1: u32, crn: u32, crm: u32, op2: u32) -> u32 {
    (op0 << 14) | (op1 << 11) | (crn << 7) | (crm << 3) | op2
}

/// System registers reachable from EL0 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SysReg {
    Nzcv,
    Fpcr,
    Fpsr,
    TpidrEl0,
    TpidrroEl0,
    CntfrqEl0,
    CntpctEl0,
    CtrEl0,
    DczidEl0,
}

impl SysReg {
    pub const fn encoding(self) -> u32 {
        match self {
            SysReg::Nzcv => sys_encoding(3, 3, 4, 2, 0),
            SysReg::Fpcr => sys_encoding(3, 3, 4, 4, 0),
            SysReg::Fpsr => sys_encoding(3, 3, 4, 4, 1),
            SysReg::TpidrEl0 => sys_encoding(3, 3, 13, 0, 2),
            SysReg::TpidrroEl0 => sys_encoding(3, 3, 13, 0, 3),
            SysReg::CntfrqEl0 => sys_encoding(3, 3, 14, 0, 0),
            SysReg::CntpctEl0 => sys_encoding(3, 3, 14, 0, 1),
            SysReg::CtrEl0 => sys_encoding(3, 3, 0, 0, 1),
            SysReg::DczidEl0 => sys_encoding(3, 3, 0, 0, 7),
        }
    }

    pub fn from_encoding(encoding: u32) -> Option<SysReg> {
        [
            SysReg::Nzcv,
            SysReg::Fpcr,
            SysReg::Fpsr,
            SysReg::TpidrEl0,
            SysReg::TpidrroEl0,
            SysReg::CntfrqEl0,
            SysReg::CntpctEl0,
            SysReg::CtrEl0,
            SysReg::DczidEl0,
        ]
        .into_iter()
        .find(|reg| reg.encoding() == encoding)
    }

    /// Registers MSR may write from EL0.
    pub fn is_writable(self) -> bool {
        matches!(self, SysReg::Nzcv | SysReg::Fpcr | SysReg::Fpsr | SysReg::TpidrEl0)
    }
}

/// `DC ZVA, Xt` as a SYS encoding.
pub const DC_ZVA: u32 = sys_encoding(1, 3, 7, 4, 1);

/// Size of the block DC ZVA zeroes; DCZID_EL0 reports log2(words) = 4.
pub const DCZ_BLOCK_BYTES: u64 = 64;
