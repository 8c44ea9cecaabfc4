//! Software reference library: the pure routines behind every helper call
//! the emitters can reference, and the model the accelerated backend's
//! intrinsics are interpreted against.

pub mod aes;
pub mod bits;
pub mod crc32;
pub mod estimate;
pub mod fp;
pub mod mul_hi;
pub mod saturate;
pub mod sha;
pub mod shift;
