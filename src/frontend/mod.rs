pub mod a64;
