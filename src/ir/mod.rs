pub mod block;
pub mod cond;
pub mod emitter;
pub mod helper;
pub mod intrinsic;
pub mod opcode;
pub mod types;
pub mod value;

pub use block::Function;
pub use cond::Cond;
pub use emitter::EmitterContext;
pub use helper::Helper;
pub use intrinsic::Intrinsic;
pub use opcode::{Flag, Label, Local, Op, StateCall};
pub use types::Type;
pub use value::Value;
