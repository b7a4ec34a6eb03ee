//! GLSL code generation from expression trees.

use crate::ast::{Expr, OpKind, MAX_NESTING};
use crate::error::CompileError;
use crate::library::Function;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest code fragment the generator produces, in bytes.
///
/// Integer powers copy their base once per factor, so nested powers grow
/// multiplicatively; every intermediate result is held to this length.
pub const MAX_CODE_LENGTH: usize = 64 * 1024;

/// Numeric representation the generated code is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticMode {
    /// Homogeneous `vec4` coordinates, `_p*` primitives
    Projective,
    /// Plain `vec2` complex numbers, `_c*` primitives
    Affine,
}

impl ArithmeticMode {
    pub fn prefix(&self) -> &'static str {
        match self {
            ArithmeticMode::Projective => "_p",
            ArithmeticMode::Affine => "_c",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticMode::Projective => "projective",
            ArithmeticMode::Affine => "affine",
        }
    }

    fn imaginary_unit(&self) -> &'static str {
        match self {
            ArithmeticMode::Projective => "vec4(0.0, 1.0, 1.0, 0.0)",
            ArithmeticMode::Affine => "vec2(0.0, 1.0)",
        }
    }

    fn parameter(&self) -> &'static str {
        match self {
            ArithmeticMode::Projective => "c",
            ArithmeticMode::Affine => "(c.xy / (c.w + c.z))",
        }
    }

    fn constant(&self, value: f64) -> String {
        let v = float_literal(value);
        match self {
            ArithmeticMode::Projective => format!("vec4({v}, 0.0, 1.0, 0.0)"),
            ArithmeticMode::Affine => format!("vec2({v}, 0.0)"),
        }
    }
}

impl fmt::Display for ArithmeticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single side-effect-free GLSL expression.
///
/// Only the generator creates fragments, so a fragment is always well formed
/// against the primitive library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CodeFragment(String);

impl CodeFragment {
    pub(crate) fn new(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CodeFragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a constant exponent is realized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Exponent {
    /// Positive integer: repeated multiplication
    Integer(u64),
    /// Anything else: the `Pow` primitive
    Real(f64),
}

/// Classify the exponent operand of a power.
pub(crate) fn classify_exponent(exponent: &Expr) -> Result<Exponent, CompileError> {
    let Some(value) = exponent.constant_value() else {
        return Err(CompileError::UnsupportedExponent(exponent.to_string()));
    };
    if !value.is_finite() {
        return Err(CompileError::NonFiniteConstant(value));
    }
    if value == 0.0 {
        return Err(CompileError::ZeroExponent);
    }
    if value.fract() != 0.0 || value < 0.0 {
        return Ok(Exponent::Real(value));
    }
    // Saturates above u64::MAX, which no length budget admits anyway
    Ok(Exponent::Integer(value as u64))
}

/// GLSL float literal; always carries a decimal point or an exponent.
pub fn float_literal(value: f64) -> String {
    let s = value.to_string();
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

/// Translate `expr` into GLSL against the primitives of `mode`.
pub fn generate(expr: &Expr, mode: ArithmeticMode) -> Result<CodeFragment, CompileError> {
    if expr.depth() > MAX_NESTING {
        return Err(CompileError::NestingTooDeep);
    }
    let code = emit(expr, mode)?;
    log::debug!("Generated {mode} code: {code}");
    Ok(CodeFragment::new(code))
}

fn emit(expr: &Expr, mode: ArithmeticMode) -> Result<String, CompileError> {
    match expr {
        Expr::Operator { op, args } => emit_operator(*op, args, mode),
        Expr::Call { name, arg } => {
            let function = Function::from_name(name)
                .ok_or_else(|| CompileError::UnsupportedFunction(name.clone()))?;
            let arg = emit(arg, mode)?;
            within_budget(format!("_{}({arg})", function.name()))
        }
        Expr::Symbol(name) => emit_symbol(name, mode),
        Expr::Constant(value) => {
            if !value.is_finite() {
                return Err(CompileError::NonFiniteConstant(*value));
            }
            Ok(mode.constant(*value))
        }
    }
}

fn emit_symbol(name: &str, mode: ArithmeticMode) -> Result<String, CompileError> {
    match (name, mode) {
        ("i" | "I", _) => Ok(mode.imaginary_unit().to_string()),
        ("c", _) => Ok(mode.parameter().to_string()),
        ("z", ArithmeticMode::Projective) => Ok("z".to_string()),
        _ => Err(CompileError::UnknownSymbol {
            name: name.to_string(),
            mode,
        }),
    }
}

fn emit_operator(op: OpKind, args: &[Expr], mode: ArithmeticMode) -> Result<String, CompileError> {
    if args.len() != op.arity() {
        return Err(CompileError::Arity {
            construct: op.symbol().to_string(),
            expected: op.arity(),
            found: args.len(),
        });
    }

    if let (OpKind::Power, [base, exponent]) = (op, args) {
        let base = emit(base, mode)?;
        return match classify_exponent(exponent)? {
            Exponent::Integer(n) => multiplication_chain(&base, n, mode),
            Exponent::Real(e) => within_budget(format!(
                "{}{}({base}, {})",
                mode.prefix(),
                op.primitive(),
                mode.constant(e)
            )),
        };
    }

    let args = args
        .iter()
        .map(|a| emit(a, mode))
        .collect::<Result<Vec<_>, _>>()?;
    within_budget(format!("{}{}({})", mode.prefix(), op.primitive(), args.join(", ")))
}

fn within_budget(code: String) -> Result<String, CompileError> {
    if code.len() > MAX_CODE_LENGTH {
        return Err(CompileError::CodeTooLarge);
    }
    Ok(code)
}

/// `base^n` as `n - 1` left-associated multiplications.
///
/// The final length is known up front, so an oversized chain is rejected
/// before anything is built.
fn multiplication_chain(base: &str, n: u64, mode: ArithmeticMode) -> Result<String, CompileError> {
    let mul = format!("{}{}", mode.prefix(), OpKind::Multiply.primitive());
    // Each step wraps as `mul(acc, base)`
    let step = (mul.len() + base.len() + 4) as u64;
    let length = (base.len() as u64).saturating_add(step.saturating_mul(n - 1));
    if length > MAX_CODE_LENGTH as u64 {
        return Err(CompileError::CodeTooLarge);
    }
    Ok((1..n).fold(base.to_string(), |acc, _| format!("{mul}({acc}, {base})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn gen(source: &str, mode: ArithmeticMode) -> Result<String, CompileError> {
        generate(&parse(source)?, mode).map(CodeFragment::into_string)
    }

    #[test]
    fn quadratic_map_projective() {
        assert_eq!(
            gen("z^2 + c", ArithmeticMode::Projective).unwrap(),
            "_pAdd(_pMul(z, z), c)"
        );
    }

    #[test]
    fn zero_constant_affine() {
        assert_eq!(gen("0.0", ArithmeticMode::Affine).unwrap(), "vec2(0.0, 0.0)");
    }

    #[test]
    fn cube_is_left_associated() {
        assert_eq!(
            gen("z^3", ArithmeticMode::Projective).unwrap(),
            "_pMul(_pMul(z, z), z)"
        );
    }

    #[test]
    fn first_power_is_the_base() {
        assert_eq!(gen("z^1", ArithmeticMode::Projective).unwrap(), "z");
    }

    #[test]
    fn integer_power_uses_n_minus_one_multiplications() {
        for n in 1..=12u32 {
            let code = gen(&format!("z^{n}"), ArithmeticMode::Projective).unwrap();
            assert_eq!(code.matches("_pMul").count(), n as usize - 1, "z^{n}: {code}");
            assert!(!code.contains("Pow"), "z^{n}: {code}");
        }
    }

    #[test]
    fn fractional_and_negative_exponents_use_pow() {
        assert_eq!(
            gen("z^0.5", ArithmeticMode::Projective).unwrap(),
            "_pPow(z, vec4(0.5, 0.0, 1.0, 0.0))"
        );
        assert_eq!(
            gen("c^-2", ArithmeticMode::Affine).unwrap(),
            "_cPow((c.xy / (c.w + c.z)), vec2(-2.0, 0.0))"
        );
    }

    #[test]
    fn zero_exponent_is_rejected() {
        assert_eq!(
            gen("z^0", ArithmeticMode::Projective),
            Err(CompileError::ZeroExponent)
        );
    }

    #[test]
    fn symbolic_exponent_is_rejected() {
        assert_eq!(
            gen("z^c", ArithmeticMode::Projective),
            Err(CompileError::UnsupportedExponent("c".to_string()))
        );
    }

    #[test]
    fn long_single_power_is_expanded() {
        let code = gen("z^2000", ArithmeticMode::Projective).unwrap();
        assert_eq!(code.matches("_pMul").count(), 1999);
        assert!(code.len() <= MAX_CODE_LENGTH);
    }

    #[test]
    fn chain_length_is_computed_exactly() {
        for n in [1u64, 2, 7, 40] {
            let code = multiplication_chain("z", n, ArithmeticMode::Projective).unwrap();
            assert_eq!(code.len() as u64, 1 + 10 * (n - 1), "{n}");
        }
    }

    #[test]
    fn nested_powers_hit_the_length_budget() {
        for source in ["(z^1000)^1000", "((z^100)^100)^100", "((z^1000)^1000)^1000", "z^1e300"] {
            assert_eq!(
                gen(source, ArithmeticMode::Projective),
                Err(CompileError::CodeTooLarge),
                "{source}"
            );
        }
    }

    #[test]
    fn oversized_sums_hit_the_length_budget() {
        // Each operand fits on its own, their sum does not
        let half = "z^4000";
        assert!(gen(half, ArithmeticMode::Projective).is_ok());
        assert_eq!(
            gen(&format!("{half} + {half}"), ArithmeticMode::Projective),
            Err(CompileError::CodeTooLarge)
        );
    }

    #[test]
    fn deep_hand_built_tree_is_rejected() {
        let deep = (0..MAX_NESTING).fold(Expr::symbol("z"), |e, _| Expr::negate(e));
        assert_eq!(
            generate(&deep, ArithmeticMode::Projective),
            Err(CompileError::NestingTooDeep)
        );
    }

    #[test]
    fn imaginary_unit_in_both_modes() {
        assert_eq!(
            gen("i", ArithmeticMode::Projective).unwrap(),
            "vec4(0.0, 1.0, 1.0, 0.0)"
        );
        assert_eq!(gen("I", ArithmeticMode::Affine).unwrap(), "vec2(0.0, 1.0)");
    }

    #[test]
    fn z_is_unknown_in_affine_mode() {
        assert_eq!(
            gen("z + 1", ArithmeticMode::Affine),
            Err(CompileError::UnknownSymbol {
                name: "z".to_string(),
                mode: ArithmeticMode::Affine
            })
        );
    }

    #[test]
    fn other_symbols_are_unknown() {
        assert!(matches!(
            gen("w", ArithmeticMode::Projective),
            Err(CompileError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn negation_and_division() {
        assert_eq!(
            gen("-z / c", ArithmeticMode::Projective).unwrap(),
            "_pDiv(_pOpp(z), c)"
        );
    }

    #[test]
    fn functions_keep_their_name() {
        assert_eq!(
            gen("sin(z) - cos(c)", ArithmeticMode::Projective).unwrap(),
            "_pSub(_sin(z), _cos(c))"
        );
        assert_eq!(
            gen("exp(c)", ArithmeticMode::Affine).unwrap(),
            "_exp((c.xy / (c.w + c.z)))"
        );
    }

    #[test]
    fn unsupported_function_is_named() {
        assert_eq!(
            gen("tan(z)", ArithmeticMode::Projective),
            Err(CompileError::UnsupportedFunction("tan".to_string()))
        );
    }

    #[test]
    fn integer_constants_get_a_decimal_point() {
        assert_eq!(
            gen("2", ArithmeticMode::Projective).unwrap(),
            "vec4(2.0, 0.0, 1.0, 0.0)"
        );
        assert_eq!(float_literal(1e21), "1000000000000000000000.0");
        assert_eq!(float_literal(0.125), "0.125");
    }

    #[test]
    fn non_finite_constants_are_rejected() {
        assert_eq!(
            generate(&Expr::constant(f64::INFINITY), ArithmeticMode::Affine),
            Err(CompileError::NonFiniteConstant(f64::INFINITY))
        );
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let expr = Expr::Operator {
            op: OpKind::Add,
            args: vec![Expr::symbol("z")],
        };
        assert_eq!(
            generate(&expr, ArithmeticMode::Projective),
            Err(CompileError::Arity {
                construct: "+".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let expr = parse("(z^3 - 2z) / (z + i) + sqrt(c)").unwrap();
        let a = generate(&expr, ArithmeticMode::Projective).unwrap();
        let b = generate(&expr, ArithmeticMode::Projective).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ArithmeticMode::Projective).unwrap(),
            "\"projective\""
        );
    }
}
