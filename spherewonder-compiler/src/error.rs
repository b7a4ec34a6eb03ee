//! Compile error types.

use crate::ast::MAX_NESTING;
use crate::codegen::{ArithmeticMode, MAX_CODE_LENGTH};
use thiserror::Error;

/// Why an expression could not be turned into shader code.
///
/// Every variant names the offending construct. A failed compile leaves any
/// previously compiled program untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unsupported function `{0}`")]
    UnsupportedFunction(String),

    #[error("unknown symbol `{name}` in {mode} arithmetic")]
    UnknownSymbol { name: String, mode: ArithmeticMode },

    #[error("`{construct}` takes {expected} argument(s) but was given {found}")]
    Arity {
        construct: String,
        expected: usize,
        found: usize,
    },

    #[error("exponent `{0}` is not a constant")]
    UnsupportedExponent(String),

    #[error("exponent 0 is not supported")]
    ZeroExponent,

    #[error("generated code is longer than {max} bytes", max = MAX_CODE_LENGTH)]
    CodeTooLarge,

    #[error("expression nests deeper than {max} levels", max = MAX_NESTING)]
    NestingTooDeep,

    #[error("constant {0} is not a finite number")]
    NonFiniteConstant(f64),

    #[error("iteration bound must be between 1 and {max}", max = i32::MAX)]
    InvalidIterationBound,

    #[error("in {field}: {source}")]
    InExpression {
        field: &'static str,
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub(crate) fn in_field(self, field: &'static str) -> Self {
        CompileError::InExpression {
            field,
            source: Box::new(self),
        }
    }

    /// The innermost error, with field wrappers removed.
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::InExpression { source, .. } => source.root(),
            other => other,
        }
    }
}
