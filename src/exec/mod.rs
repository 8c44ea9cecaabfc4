//! Reference execution of emitted functions.
//!
//! The interpreter gives the bytecode a precise meaning so that emitted
//! sequences can be checked against the reference model, and so that both
//! vector backends can be compared on the same input.

mod interpreter;
mod intrinsic;
mod state;

pub use interpreter::{ExecError, Interpreter};
pub use intrinsic::evaluate as evaluate_intrinsic;
pub use state::CpuState;
