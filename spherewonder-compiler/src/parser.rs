//! `nom` parser for expression text.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := atom ('^' unary)?
//! atom    := number implicit? | '(' expr ')' | ident ('(' expr ')')?
//! implicit:= (('(' expr ')') | ident call?) ('^' unary)?
//! ```
//!
//! `^` is right-associative and binds tighter than a leading minus, so
//! `-z^2` is `-(z^2)`. A number directly followed by a name or a
//! parenthesized expression is multiplied with it (`2z`, `3(z + 1)`).

use crate::ast::{Expr, OpKind, MAX_NESTING};
use crate::error::CompileError;
use nom::Parser;
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;
type Fail<'a> = nom::Err<VerboseError<&'a str>>;

/// Reported when the tree or the parentheses nest deeper than [`MAX_NESTING`].
const TOO_DEEP: &str = "at most 128 levels of nesting";

/// A parsed subtree and its depth, so depth checks never walk the tree.
struct Node {
    expr: Expr,
    depth: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Node { expr, depth: 1 }
    }

    fn binary(input: &str, op: OpKind, left: Node, right: Node) -> Result<Self, Fail<'_>> {
        let depth = left.depth.max(right.depth) + 1;
        check_nesting(input, depth)?;
        Ok(Node {
            expr: Expr::binary(op, left.expr, right.expr),
            depth,
        })
    }

    fn negate(input: &str, inner: Node) -> Result<Self, Fail<'_>> {
        let depth = inner.depth + 1;
        check_nesting(input, depth)?;
        Ok(Node {
            expr: Expr::negate(inner.expr),
            depth,
        })
    }

    fn call(input: &str, name: String, arg: Node) -> Result<Self, Fail<'_>> {
        let depth = arg.depth + 1;
        check_nesting(input, depth)?;
        Ok(Node {
            expr: Expr::call(name, arg.expr),
            depth,
        })
    }
}

/// Fails without backtracking, so the error points at the nesting itself.
fn check_nesting(input: &str, depth: usize) -> Result<(), Fail<'_>> {
    if depth > MAX_NESTING {
        return Err(nom::Err::Failure(VerboseError {
            errors: vec![(input, VerboseErrorKind::Context(TOO_DEEP))],
        }));
    }
    Ok(())
}

/// Parse a complete expression.
pub fn parse(source: &str) -> Result<Expr, CompileError> {
    match all_consuming(delimited(multispace0, root, multispace0))(source) {
        Ok((_, node)) => Ok(node.expr),
        Err(err) => Err(to_compile_error(err, source)),
    }
}

fn root(input: &str) -> PResult<'_, Node> {
    parse_add_sub(input, 0)
}

// `nesting` counts the parentheses, signs and exponents enclosing the input.

/// Left-associative `+`/`-`.
fn parse_add_sub<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    let (mut input, mut left) = parse_mul_div(input, nesting)?;
    loop {
        let (next, op) = opt(alt((ws_char('+'), ws_char('-')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        let operand = |i: &'a str| parse_mul_div(i, nesting);
        let (next, right) = context("operand", operand)(next)?;
        let op = if op_char == '+' {
            OpKind::Add
        } else {
            OpKind::Subtract
        };
        left = Node::binary(input, op, left, right)?;
        input = next;
    }
    Ok((input, left))
}

/// Left-associative `*`/`/`.
fn parse_mul_div<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    let (mut input, mut left) = parse_unary(input, nesting)?;
    loop {
        let (next, op) = opt(alt((ws_char('*'), ws_char('/')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        let operand = |i: &'a str| parse_unary(i, nesting);
        let (next, right) = context("operand", operand)(next)?;
        let op = if op_char == '*' {
            OpKind::Multiply
        } else {
            OpKind::Divide
        };
        left = Node::binary(input, op, left, right)?;
        input = next;
    }
    Ok((input, left))
}

fn parse_unary(input: &str, nesting: usize) -> PResult<'_, Node> {
    check_nesting(input, nesting)?;
    if let Ok((rest, _)) = ws_char('-').parse(input) {
        let (rest, inner) = parse_unary(rest, nesting + 1)?;
        return Ok((rest, Node::negate(input, inner)?));
    }
    if let Ok((rest, _)) = ws_char('+').parse(input) {
        return parse_unary(rest, nesting + 1);
    }
    parse_power(input, nesting, parse_atom)
}

/// `base ('^' unary)?` with the exponent parsed at unary level, which makes
/// `^` right-associative.
fn parse_power<'a>(
    input: &'a str,
    nesting: usize,
    base: fn(&'a str, usize) -> PResult<'a, Node>,
) -> PResult<'a, Node> {
    let (rest, base) = base(input, nesting)?;
    let exponent = |i: &'a str| parse_unary(i, nesting + 1);
    let (rest, exponent) = opt(preceded(ws_char('^'), context("exponent", exponent))).parse(rest)?;

    let node = match exponent {
        Some(exponent) => Node::binary(input, OpKind::Power, base, exponent)?,
        None => base,
    };
    Ok((rest, node))
}

fn parse_atom<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    alt((
        |i: &'a str| parse_scaled_number(i, nesting),
        |i: &'a str| parse_parenthesized(i, nesting),
        |i: &'a str| parse_name(i, nesting),
    ))
    .parse(input)
}

/// Atoms that may follow a number for implicit multiplication.
fn parse_juxtaposed<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    alt((
        |i: &'a str| parse_parenthesized(i, nesting),
        |i: &'a str| parse_name(i, nesting),
    ))
    .parse(input)
}

/// A number, optionally multiplied by an immediately following factor.
fn parse_scaled_number<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    let (rest, value) = ws(number).parse(input)?;
    let factor = |i: &'a str| parse_power(i, nesting, parse_juxtaposed);
    let (rest, factor) = opt(factor).parse(rest)?;

    let constant = Node::leaf(Expr::constant(value));
    let node = match factor {
        Some(factor) => Node::binary(input, OpKind::Multiply, constant, factor)?,
        None => constant,
    };
    Ok((rest, node))
}

fn parse_parenthesized<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    let inner = |i: &'a str| parse_add_sub(i, nesting + 1);
    delimited(ws_char('('), inner, context("')'", ws_char(')'))).parse(input)
}

/// A symbol, or a function call when followed by a parenthesized argument.
fn parse_name<'a>(input: &'a str, nesting: usize) -> PResult<'a, Node> {
    let (rest, name) = ws(identifier).parse(input)?;
    let argument = |i: &'a str| parse_parenthesized(i, nesting);
    let (rest, arg) = opt(argument).parse(rest)?;

    let node = match arg {
        Some(arg) => Node::call(input, name, arg)?,
        None => Node::leaf(Expr::symbol(name)),
    };
    Ok((rest, node))
}

/// Unsigned decimal literal: `12`, `1.5`, `3.`, `.25`, `2e-3`.
///
/// An `e` that is not followed by digits is left for the caller, so `2exp(z)`
/// reads as `2 * exp(z)`.
fn number(input: &str) -> PResult<'_, f64> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)));

    map_res(recognize(pair(mantissa, opt(exponent))), str::parse::<f64>).parse(input)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn identifier(input: &str) -> PResult<'_, String> {
    map(
        recognize(pair(
            take_while1(|c: char| c == '_' || c.is_ascii_alphabetic()),
            take_while(|c: char| c == '_' || c.is_ascii_alphanumeric()),
        )),
        str::to_string,
    )
    .parse(input)
}

fn ws<'a, O, P>(mut parser: P) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    P: FnMut(&'a str) -> PResult<'a, O>,
{
    move |input| delimited(multispace0, &mut parser, multispace0)(input)
}

fn ws_char<'a>(c: char) -> impl FnMut(&'a str) -> PResult<'a, char> {
    ws(char(c))
}

/// Report the deepest failure position, described by the innermost context
/// recorded for it.
fn to_compile_error(err: nom::Err<VerboseError<&str>>, source: &str) -> CompileError {
    let e = match err {
        nom::Err::Incomplete(_) => {
            return CompileError::Syntax {
                offset: source.len(),
                message: "incomplete input".to_string(),
            }
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
    };

    let Some((rest, kind)) = e.errors.first() else {
        return CompileError::Syntax {
            offset: 0,
            message: "syntax error".to_string(),
        };
    };
    let offset = source.len() - rest.len();

    let context = e.errors.iter().find_map(|(_, kind)| match kind {
        VerboseErrorKind::Context(ctx) => Some(*ctx),
        _ => None,
    });

    let message = match (context, kind) {
        (Some(ctx), _) => format!("expected {ctx}"),
        (None, VerboseErrorKind::Char(c)) => format!("expected '{c}'"),
        (None, VerboseErrorKind::Nom(nom::error::ErrorKind::Eof)) => {
            format!("unexpected `{}`", rest.chars().next().unwrap_or(' '))
        }
        (None, _) => "expected an expression".to_string(),
    };

    CompileError::Syntax { offset, message }
}
