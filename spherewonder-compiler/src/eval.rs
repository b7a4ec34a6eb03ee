//! CPU evaluation of expression trees with the reference primitives.
//!
//! Follows the same structural rules as the code generator: integer powers
//! are repeated multiplication, other constant exponents go through `pow`,
//! and the reserved symbols resolve per arithmetic mode. Integer powers are
//! computed by squaring, so exponents too long to emit still evaluate.

use crate::ast::{Expr, OpKind, MAX_NESTING};
use crate::codegen::{classify_exponent, ArithmeticMode, Exponent};
use crate::error::CompileError;
use crate::library::Function;
use spherewonder_core::primitives::{affine, projective};
use spherewonder_core::{Complex, HomogeneousCoord};

/// Arithmetic a tree can be evaluated in.
trait Algebra {
    type Value: Copy;

    const MODE: ArithmeticMode;

    fn constant(value: f64) -> Self::Value;
    fn imaginary_unit() -> Self::Value;
    /// Value bound to a reserved symbol other than `i`/`I`.
    fn symbol(&self, name: &str) -> Option<Self::Value>;

    fn add(a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn opp(a: &Self::Value) -> Self::Value;
    fn mul(a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn div(a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn pow(a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn call(f: Function, a: &Self::Value) -> Self::Value;
}

struct Projective<'a> {
    z: &'a HomogeneousCoord,
    c: &'a HomogeneousCoord,
}

impl Algebra for Projective<'_> {
    type Value = HomogeneousCoord;

    const MODE: ArithmeticMode = ArithmeticMode::Projective;

    fn constant(value: f64) -> HomogeneousCoord {
        HomogeneousCoord::new(value, 0.0, 1.0, 0.0)
    }

    fn imaginary_unit() -> HomogeneousCoord {
        HomogeneousCoord::I
    }

    fn symbol(&self, name: &str) -> Option<HomogeneousCoord> {
        match name {
            "z" => Some(*self.z),
            "c" => Some(*self.c),
            _ => None,
        }
    }

    fn add(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
        projective::add(a, b)
    }
    fn sub(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
        projective::sub(a, b)
    }
    fn opp(a: &HomogeneousCoord) -> HomogeneousCoord {
        projective::opp(a)
    }
    fn mul(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
        projective::mul(a, b)
    }
    fn div(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
        projective::div(a, b)
    }
    fn pow(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
        projective::pow(a, b)
    }

    fn call(f: Function, a: &HomogeneousCoord) -> HomogeneousCoord {
        match f {
            Function::Sqrt => projective::sqrt(a),
            Function::Exp => projective::exp(a),
            Function::Log => projective::log(a),
            Function::Sin => projective::sin(a),
            Function::Cos => projective::cos(a),
        }
    }
}

struct Affine {
    c: Complex,
}

impl Algebra for Affine {
    type Value = Complex;

    const MODE: ArithmeticMode = ArithmeticMode::Affine;

    fn constant(value: f64) -> Complex {
        Complex::real(value)
    }

    fn imaginary_unit() -> Complex {
        Complex::I
    }

    fn symbol(&self, name: &str) -> Option<Complex> {
        (name == "c").then_some(self.c)
    }

    fn add(a: &Complex, b: &Complex) -> Complex {
        affine::add(a, b)
    }
    fn sub(a: &Complex, b: &Complex) -> Complex {
        affine::sub(a, b)
    }
    fn opp(a: &Complex) -> Complex {
        affine::opp(a)
    }
    fn mul(a: &Complex, b: &Complex) -> Complex {
        affine::mul(a, b)
    }
    fn div(a: &Complex, b: &Complex) -> Complex {
        affine::div(a, b)
    }
    fn pow(a: &Complex, b: &Complex) -> Complex {
        affine::pow(a, b)
    }

    fn call(f: Function, a: &Complex) -> Complex {
        match f {
            Function::Sqrt => affine::sqrt(a),
            Function::Exp => affine::exp(a),
            Function::Log => affine::log(a),
            Function::Sin => affine::sin(a),
            Function::Cos => affine::cos(a),
        }
    }
}

fn eval<A: Algebra>(algebra: &A, expr: &Expr) -> Result<A::Value, CompileError> {
    match expr {
        Expr::Operator { op, args } => match (op, args.as_slice()) {
            (OpKind::Negate, [a]) => Ok(A::opp(&eval(algebra, a)?)),
            (OpKind::Power, [base, exponent]) => {
                let base = eval(algebra, base)?;
                match classify_exponent(exponent)? {
                    Exponent::Integer(n) => Ok(integer_power::<A>(base, n)),
                    Exponent::Real(e) => Ok(A::pow(&base, &A::constant(e))),
                }
            }
            (OpKind::Add, [a, b]) => binary(algebra, A::add, a, b),
            (OpKind::Subtract, [a, b]) => binary(algebra, A::sub, a, b),
            (OpKind::Multiply, [a, b]) => binary(algebra, A::mul, a, b),
            (OpKind::Divide, [a, b]) => binary(algebra, A::div, a, b),
            _ => Err(CompileError::Arity {
                construct: op.symbol().to_string(),
                expected: op.arity(),
                found: args.len(),
            }),
        },
        Expr::Call { name, arg } => {
            let f = Function::from_name(name)
                .ok_or_else(|| CompileError::UnsupportedFunction(name.clone()))?;
            Ok(A::call(f, &eval(algebra, arg)?))
        }
        Expr::Symbol(name) if name == "i" || name == "I" => Ok(A::imaginary_unit()),
        Expr::Symbol(name) => algebra
            .symbol(name)
            .ok_or_else(|| CompileError::UnknownSymbol {
                name: name.clone(),
                mode: A::MODE,
            }),
        Expr::Constant(value) => {
            if !value.is_finite() {
                return Err(CompileError::NonFiniteConstant(*value));
            }
            Ok(A::constant(*value))
        }
    }
}

fn binary<A: Algebra>(
    algebra: &A,
    f: fn(&A::Value, &A::Value) -> A::Value,
    a: &Expr,
    b: &Expr,
) -> Result<A::Value, CompileError> {
    let a = eval(algebra, a)?;
    let b = eval(algebra, b)?;
    Ok(f(&a, &b))
}

/// `base^n` for `n >= 1` by binary exponentiation.
fn integer_power<A: Algebra>(base: A::Value, n: u64) -> A::Value {
    let mut result = base;
    let mut square = base;
    let mut remaining = n - 1;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = A::mul(&result, &square);
        }
        remaining >>= 1;
        if remaining > 0 {
            square = A::mul(&square, &square);
        }
    }
    result
}

fn check_depth(expr: &Expr) -> Result<(), CompileError> {
    if expr.depth() > MAX_NESTING {
        return Err(CompileError::NestingTooDeep);
    }
    Ok(())
}

/// Evaluate `expr` in projective arithmetic with `z` and `c` bound.
pub fn evaluate(
    expr: &Expr,
    z: &HomogeneousCoord,
    c: &HomogeneousCoord,
) -> Result<HomogeneousCoord, CompileError> {
    check_depth(expr)?;
    eval(&Projective { z, c }, expr)
}

/// Evaluate `expr` in affine arithmetic with `c` bound. `z` is not available.
pub fn evaluate_affine(expr: &Expr, c: Complex) -> Result<Complex, CompileError> {
    check_depth(expr)?;
    eval(&Affine { c }, expr)
}
