use thiserror::Error;

use crate::frontend::a64::opcode::Mnemonic;

/// Recoverable failures while emitting a translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("unsupported instruction {mnemonic:?} at {address:#x}")]
    Unsupported { mnemonic: Mnemonic, address: u64 },

    #[error("unknown system register {encoding:#07x} at {address:#x}")]
    UnknownSystemRegister { address: u64, encoding: u32 },
}

pub type EmitResult = Result<(), EmitError>;
