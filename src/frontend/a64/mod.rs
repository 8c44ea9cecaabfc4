pub mod opcode;
pub mod types;
pub mod translate;

pub use opcode::{Mnemonic, OpCode64};
pub use types::{ExtendType, RegisterSize, ShiftType, SysReg};
pub use translate::{translate_block, translate_unit, TranslatorVisitor};
