//! AArch64 instruction semantics for a stack-machine translator.
//!
//! Decoded instructions (`OpCode64`) go in; bytecode that reproduces their
//! architectural effect comes out. Each opcode category has an emitter in
//! `frontend::a64::translate`, SIMD lane work is routed through a
//! `VectorBackend` picked once per `EmitterConfig`, and the `soft` module
//! holds the reference routines that helper calls resolve to.
//!
//! `exec::Interpreter` runs emitted functions against a `CpuState`.

pub mod backend;
pub mod config;
pub mod error;
pub mod exec;
pub mod flags;
pub mod frontend;
pub mod ir;
pub mod soft;
pub mod vector;

pub use backend::{HostCapabilities, VectorBackend};
pub use config::{EmitterConfig, ProcessorState, TranslationOptions};
pub use error::{EmitError, EmitResult};
pub use flags::Nzcv;
pub use frontend::a64::{translate_block, translate_unit, Mnemonic, OpCode64};
pub use ir::{EmitterContext, Function, Op};
pub use vector::Vector128;
