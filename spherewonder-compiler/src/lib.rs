//! Expression compiler: text to GLSL against the primitive library.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod eval;
pub mod library;
pub mod parser;
pub mod template;

pub use ast::{Expr, OpKind, MAX_NESTING};
pub use codegen::{float_literal, generate, ArithmeticMode, CodeFragment, MAX_CODE_LENGTH};
pub use error::CompileError;
pub use eval::{evaluate, evaluate_affine};
pub use library::{Function, AFFINE_GLSL, PROJECTIVE_GLSL};
pub use parser::parse;
pub use template::{
    compile_fragments, compile_program, CompiledFragments, ProgramSources, ShaderSettings,
    VERTEX_SHADER,
};

/// Parse `source` and generate code for `mode`.
pub fn compile(source: &str, mode: ArithmeticMode) -> Result<CodeFragment, CompileError> {
    let expr = parse(source)?;
    generate(&expr, mode)
}
