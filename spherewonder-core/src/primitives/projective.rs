//! Projective complex arithmetic on homogeneous coordinates.
//!
//! Mirrors the `_p*` GLSL primitives and the `vec4` overloads of the
//! transcendental functions. Every binary operation renormalizes its result
//! to unit 4-norm so orbits stay bounded however close they get to infinity.

use crate::complex::Complex;
use crate::homogeneous::HomogeneousCoord;

use super::affine;

/// Relative size of a component pair below which it counts as zero for the
/// transcendental functions (which are evaluated through the affine chart).
pub const CHART_THRESHOLD: f64 = 1e-6;

#[inline]
fn parts(a: &HomogeneousCoord) -> (Complex, Complex) {
    (a.numerator(), a.denominator())
}

#[inline]
fn build(num: Complex, den: Complex) -> HomogeneousCoord {
    HomogeneousCoord::from_parts(num, den).normalized()
}

/// `n_a/d_a + n_b/d_b = (n_a·d_b + d_a·n_b) : d_a·d_b`
pub fn add(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    let (nb, db) = parts(b);
    build(na.mul(&db).add(&da.mul(&nb)), da.mul(&db))
}

pub fn sub(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    let (nb, db) = parts(b);
    build(na.mul(&db).sub(&da.mul(&nb)), da.mul(&db))
}

/// Additive inverse. Not renormalized: negation preserves the norm.
pub fn opp(a: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    HomogeneousCoord::from_parts(na.neg(), da)
}

pub fn mul(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    let (nb, db) = parts(b);
    build(na.mul(&nb), da.mul(&db))
}

pub fn div(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    let (nb, db) = parts(b);
    build(na.mul(&db), da.mul(&nb))
}

/// Multiplicative inverse: swap numerator and denominator.
pub fn inv(a: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    HomogeneousCoord::from_parts(da, na)
}

/// `a^e` with the real exponent `e = Re(n_b / d_b)`.
///
/// Numerator and denominator are raised separately; negative exponents swap
/// them first so that zero and infinity stay exact.
pub fn pow(a: &HomogeneousCoord, b: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    let (nb, db) = parts(b);
    let e = nb.div(&db);
    if e.re < 0.0 {
        let e = e.neg();
        return build(affine::pow(&da, &e), affine::pow(&na, &e));
    }
    build(affine::pow(&na, &e), affine::pow(&da, &e))
}

/// A square root of `n/d`, taken as `sqrt(n) : sqrt(d)`.
pub fn sqrt(a: &HomogeneousCoord) -> HomogeneousCoord {
    let (na, da) = parts(a);
    build(affine::sqrt(&na), affine::sqrt(&da))
}

fn is_infinite(a: &HomogeneousCoord) -> bool {
    a.denominator().norm() < CHART_THRESHOLD * a.norm()
}

fn is_zero(a: &HomogeneousCoord) -> bool {
    a.numerator().norm() < CHART_THRESHOLD * a.norm()
}

fn through_affine(a: &HomogeneousCoord, f: fn(&Complex) -> Complex) -> HomogeneousCoord {
    if is_infinite(a) {
        return HomogeneousCoord::INFINITY;
    }
    let (na, da) = parts(a);
    HomogeneousCoord::from_complex(f(&na.div(&da)))
}

/// Exponential. Maps infinity to infinity (the essential singularity is
/// collapsed onto the escape point).
pub fn exp(a: &HomogeneousCoord) -> HomogeneousCoord {
    through_affine(a, affine::exp)
}

/// Principal logarithm; zero and infinity both map to infinity.
pub fn log(a: &HomogeneousCoord) -> HomogeneousCoord {
    if is_zero(a) {
        return HomogeneousCoord::INFINITY;
    }
    through_affine(a, affine::log)
}

pub fn sin(a: &HomogeneousCoord) -> HomogeneousCoord {
    through_affine(a, affine::sin)
}

pub fn cos(a: &HomogeneousCoord) -> HomogeneousCoord {
    through_affine(a, affine::cos)
}

/// Chordal distance `|n_a·d_b − d_a·n_b|`. Assumes both inputs are normalized.
pub fn dist(a: &HomogeneousCoord, b: &HomogeneousCoord) -> f64 {
    let (na, da) = parts(a);
    let (nb, db) = parts(b);
    na.mul(&db).sub(&da.mul(&nb)).norm()
}
