use std::fmt;

use crate::ir::types::Type;
use crate::vector::Vector128;

/// A runtime value of the stack machine. Integers are stored as raw bits;
/// signedness belongs to the operation, not the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I32(u32),
    I64(u64),
    F32(f32),
    F64(f64),
    V128(Vector128),
}

impl Value {
    pub fn get_type(&self) -> Type {
        match self {
            Value::I32(_) => Type::I32,
            Value::I64(_) => Type::I64,
            Value::F32(_) => Type::F32,
            Value::F64(_) => Type::F64,
            Value::V128(_) => Type::V128,
        }
    }

    pub fn as_i32(&self) -> Option<u32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<u64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_v128(&self) -> Option<Vector128> {
        match self {
            Value::V128(v) => Some(*v),
            _ => None,
        }
    }

    /// Either integer width, zero-extended. Used where the machine accepts both.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::I32(v) => Some(*v as u64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Zero for the given type.
    pub fn zero(ty: Type) -> Value {
        match ty {
            Type::I32 => Value::I32(0),
            Type::I64 => Value::I64(0),
            Type::F32 => Value::F32(0.0),
            Type::F64 => Value::F64(0.0),
            Type::V128 => Value::V128(Vector128::ZERO),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "#{:#x}:i32", v),
            Value::I64(v) => write!(f, "#{:#x}:i64", v),
            Value::F32(v) => write!(f, "#{}:f32", v),
            Value::F64(v) => write!(f, "#{}:f64", v),
            Value::V128(v) => write!(f, "#{}:v128", v),
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::I32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<Vector128> for Value {
    fn from(v: Vector128) -> Self {
        Value::V128(v)
    }
}
