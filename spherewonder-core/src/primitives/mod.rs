//! Reference implementation of the arithmetic primitive library.
//!
//! The generated shader code calls GLSL functions with these exact semantics;
//! the Rust versions back the CPU evaluator and the escape-time reference.

pub mod affine;
pub mod projective;
