use std::fmt;

use crate::backend::HostCapabilities;
use crate::ir::types::Type;

/// Host SIMD primitives the accelerated backend emits.
///
/// They are modelled on the SSE instruction of the same name, including its
/// operand order: binary primitives pop the second source (top of stack)
/// and then the first. Sized variants take the element size code
/// (0 = byte .. 3 = quadword); float variants take 0 = single, 1 = double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Padd(u8),
    Psub(u8),
    Pmullw,
    Pmulld,
    Padds(u8),
    Paddus(u8),
    Psubs(u8),
    Psubus(u8),
    Pavg(u8),
    Pand,
    Pandn,
    Por,
    Pxor,
    Pcmpeq(u8),
    Pcmpgt(u8),
    Pmaxs(u8),
    Pmins(u8),
    Pmaxu(u8),
    Pminu(u8),
    Pabs(u8),
    Psll(u8, u8),
    Psrl(u8, u8),
    Psra(u8, u8),
    Pmovmskb,
    Pshufb,
    Addp(u8),
    Subp(u8),
    Mulp(u8),
    Divp(u8),
    Sqrtp(u8),
    Cmpeqp(u8),
    Cmpltp(u8),
    Cmplep(u8),
    Crc32c(u8),
    Aesenc,
    Aesenclast,
    Aesdec,
    Aesdeclast,
    Aesimc,
}

impl Intrinsic {
    /// Host features required to use this primitive.
    pub fn required_caps(self) -> HostCapabilities {
        use Intrinsic::*;
        match self {
            Pmulld => HostCapabilities::SSE41,
            Pcmpeq(3) => HostCapabilities::SSE41,
            Pcmpgt(3) => HostCapabilities::SSE42,
            Pmaxs(0) | Pmaxs(2) | Pmins(0) | Pmins(2) => HostCapabilities::SSE41,
            Pmaxu(1) | Pmaxu(2) | Pminu(1) | Pminu(2) => HostCapabilities::SSE41,
            Pabs(_) | Pshufb => HostCapabilities::SSSE3,
            Crc32c(_) => HostCapabilities::SSE42,
            Aesenc | Aesenclast | Aesdec | Aesdeclast | Aesimc => HostCapabilities::AES,
            _ => HostCapabilities::SSE2,
        }
    }

    /// Whether the primitive exists at all for its operand shape.
    pub fn is_valid(self) -> bool {
        use Intrinsic::*;
        match self {
            Padd(s) | Psub(s) | Pcmpeq(s) | Pcmpgt(s) => s <= 3,
            Padds(s) | Paddus(s) | Psubs(s) | Psubus(s) | Pavg(s) => s <= 1,
            Pmaxs(s) | Pmins(s) | Pmaxu(s) | Pminu(s) | Pabs(s) => s <= 2,
            Psll(s, _) | Psrl(s, _) => (1..=3).contains(&s),
            Psra(s, _) => (1..=2).contains(&s),
            Addp(s) | Subp(s) | Mulp(s) | Divp(s) | Sqrtp(s) | Cmpeqp(s) | Cmpltp(s) | Cmplep(s) => s <= 1,
            Crc32c(s) => s <= 3,
            _ => true,
        }
    }

    /// Argument types in push order, and the result type.
    pub fn signature(self) -> (&'static [Type], Type) {
        use Intrinsic::*;
        const V1: &[Type] = &[Type::V128];
        const V2: &[Type] = &[Type::V128, Type::V128];
        match self {
            Pabs(_) | Psll(..) | Psrl(..) | Psra(..) | Sqrtp(_) | Aesimc => (V1, Type::V128),
            Pmovmskb => (V1, Type::I32),
            Crc32c(_) => (&[Type::I32, Type::I64], Type::I32),
            _ => (V2, Type::V128),
        }
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const INT: [&str; 4] = ["b", "w", "d", "q"];
        const FLT: [&str; 2] = ["ps", "pd"];
        let int = |s: &u8| INT.get(*s as usize).copied().unwrap_or("?");
        let flt = |s: &u8| FLT.get(*s as usize).copied().unwrap_or("?");
        use Intrinsic::*;
        match self {
            Padd(s) => write!(f, "padd{}", int(s)),
            Psub(s) => write!(f, "psub{}", int(s)),
            Pmullw => write!(f, "pmullw"),
            Pmulld => write!(f, "pmulld"),
            Padds(s) => write!(f, "padds{}", int(s)),
            Paddus(s) => write!(f, "paddus{}", int(s)),
            Psubs(s) => write!(f, "psubs{}", int(s)),
            Psubus(s) => write!(f, "psubus{}", int(s)),
            Pavg(s) => write!(f, "pavg{}", int(s)),
            Pand => write!(f, "pand"),
            Pandn => write!(f, "pandn"),
            Por => write!(f, "por"),
            Pxor => write!(f, "pxor"),
            Pcmpeq(s) => write!(f, "pcmpeq{}", int(s)),
            Pcmpgt(s) => write!(f, "pcmpgt{}", int(s)),
            Pmaxs(s) => write!(f, "pmaxs{}", int(s)),
            Pmins(s) => write!(f, "pmins{}", int(s)),
            Pmaxu(s) => write!(f, "pmaxu{}", int(s)),
            Pminu(s) => write!(f, "pminu{}", int(s)),
            Pabs(s) => write!(f, "pabs{}", int(s)),
            Psll(s, imm) => write!(f, "psll{} {}", int(s), imm),
            Psrl(s, imm) => write!(f, "psrl{} {}", int(s), imm),
            Psra(s, imm) => write!(f, "psra{} {}", int(s), imm),
            Pmovmskb => write!(f, "pmovmskb"),
            Pshufb => write!(f, "pshufb"),
            Addp(s) => write!(f, "add{}", flt(s)),
            Subp(s) => write!(f, "sub{}", flt(s)),
            Mulp(s) => write!(f, "mul{}", flt(s)),
            Divp(s) => write!(f, "div{}", flt(s)),
            Sqrtp(s) => write!(f, "sqrt{}", flt(s)),
            Cmpeqp(s) => write!(f, "cmpeq{}", flt(s)),
            Cmpltp(s) => write!(f, "cmplt{}", flt(s)),
            Cmplep(s) => write!(f, "cmple{}", flt(s)),
            Crc32c(s) => write!(f, "crc32{}", int(s)),
            Aesenc => write!(f, "aesenc"),
            Aesenclast => write!(f, "aesenclast"),
            Aesdec => write!(f, "aesdec"),
            Aesdeclast => write!(f, "aesdeclast"),
            Aesimc => write!(f, "aesimc"),
        }
    }
}
