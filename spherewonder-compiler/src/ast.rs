//! Expression tree shared by the parser, the code generator and the CPU
//! evaluator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deepest expression tree, and deepest parenthesis nesting, that is accepted.
pub const MAX_NESTING: usize = 128;

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Add,
    Subtract,
    Negate,
    Multiply,
    Divide,
    Power,
}

impl OpKind {
    /// Number of arguments the operator takes.
    pub fn arity(&self) -> usize {
        match self {
            OpKind::Negate => 1,
            _ => 2,
        }
    }

    /// Suffix of the primitive library function implementing the operator.
    pub fn primitive(&self) -> &'static str {
        match self {
            OpKind::Add => "Add",
            OpKind::Subtract => "Sub",
            OpKind::Negate => "Opp",
            OpKind::Multiply => "Mul",
            OpKind::Divide => "Div",
            OpKind::Power => "Pow",
        }
    }

    /// Source-level operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            OpKind::Add => "+",
            OpKind::Subtract | OpKind::Negate => "-",
            OpKind::Multiply => "*",
            OpKind::Divide => "/",
            OpKind::Power => "^",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Operator applied to its arguments, in source order
    Operator { op: OpKind, args: Vec<Expr> },
    /// Named function applied to a single argument
    Call { name: String, arg: Box<Expr> },
    Symbol(String),
    Constant(f64),
}

impl Expr {
    pub fn binary(op: OpKind, left: Expr, right: Expr) -> Self {
        Expr::Operator {
            op,
            args: vec![left, right],
        }
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Operator {
            op: OpKind::Negate,
            args: vec![inner],
        }
    }

    pub fn call(name: impl Into<String>, arg: Expr) -> Self {
        Expr::Call {
            name: name.into(),
            arg: Box::new(arg),
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    /// Whether `name` occurs as a symbol anywhere in the tree.
    pub fn mentions_symbol(&self, name: &str) -> bool {
        match self {
            Expr::Operator { args, .. } => args.iter().any(|a| a.mentions_symbol(name)),
            Expr::Call { arg, .. } => arg.mentions_symbol(name),
            Expr::Symbol(s) => s == name,
            Expr::Constant(_) => false,
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    ///
    /// Walks with an explicit stack, so arbitrarily deep trees are measured
    /// without recursion.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Operator { args, .. } => pending.extend(args.iter().map(|a| (a, depth + 1))),
                Expr::Call { arg, .. } => pending.push((arg, depth + 1)),
                Expr::Symbol(_) | Expr::Constant(_) => {}
            }
        }
        deepest
    }

    /// Value of a constant exponent: a `Constant` or a negated `Constant`.
    pub fn constant_value(&self) -> Option<f64> {
        match self {
            Expr::Constant(v) => Some(*v),
            Expr::Operator {
                op: OpKind::Negate,
                args,
            } => match args.as_slice() {
                [Expr::Constant(v)] => Some(-*v),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Fully parenthesized infix form.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Operator { op, args } => match args.as_slice() {
                [inner] => write!(f, "({op}{inner})"),
                [left, right] => write!(f, "({left} {op} {right})"),
                _ => {
                    write!(f, "{}(", op.primitive())?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")
                }
            },
            Expr::Call { name, arg } => write!(f, "{name}({arg})"),
            Expr::Symbol(s) => f.write_str(s),
            Expr::Constant(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parenthesizes_everything() {
        let e = Expr::binary(
            OpKind::Add,
            Expr::binary(OpKind::Power, Expr::symbol("z"), Expr::constant(2.0)),
            Expr::negate(Expr::symbol("c")),
        );
        assert_eq!(e.to_string(), "((z ^ 2) + (-c))");
    }

    #[test]
    fn mentions_symbol_searches_calls() {
        let e = Expr::call("sin", Expr::binary(OpKind::Multiply, Expr::constant(2.0), Expr::symbol("z")));
        assert!(e.mentions_symbol("z"));
        assert!(!e.mentions_symbol("c"));
    }

    #[test]
    fn depth_counts_the_longest_path() {
        assert_eq!(Expr::symbol("z").depth(), 1);
        let e = Expr::binary(
            OpKind::Add,
            Expr::call("sin", Expr::negate(Expr::symbol("z"))),
            Expr::constant(1.0),
        );
        assert_eq!(e.depth(), 4);
    }

    #[test]
    fn constant_value_accepts_negated_constants_only() {
        assert_eq!(Expr::constant(3.0).constant_value(), Some(3.0));
        assert_eq!(Expr::negate(Expr::constant(0.5)).constant_value(), Some(-0.5));
        assert_eq!(Expr::negate(Expr::symbol("z")).constant_value(), None);
        assert_eq!(Expr::symbol("z").constant_value(), None);
    }
}
