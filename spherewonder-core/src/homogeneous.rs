//! Homogeneous complex coordinates on the Riemann sphere.
//!
//! A coordinate `[x_num, y_num, x_den, y_den]` stands for the ratio
//! `(x_num + i·y_num) : (x_den + i·y_den)`. The point at infinity is always
//! represented by [`HomogeneousCoord::INFINITY`]; every other point can be
//! normalized to unit Euclidean norm over all four components.

use crate::complex::Complex;
use serde::{Deserialize, Serialize};

/// Distance from the antipode `(0, 0, -1)` below which a sphere direction is
/// treated as the point at infinity.
pub const ANTIPODE_TOLERANCE: f64 = 1e-5;

/// Homogeneous complex coordinate `(numerator : denominator)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HomogeneousCoord(pub [f64; 4]);

impl HomogeneousCoord {
    /// The point at infinity `(1 : 0)`.
    pub const INFINITY: Self = Self([1.0, 0.0, 0.0, 0.0]);
    /// The origin `(0 : 1)`.
    pub const ZERO: Self = Self([0.0, 0.0, 1.0, 0.0]);
    /// The imaginary unit `(i : 1)`.
    pub const I: Self = Self([0.0, 1.0, 1.0, 0.0]);

    pub const fn new(x_num: f64, y_num: f64, x_den: f64, y_den: f64) -> Self {
        Self([x_num, y_num, x_den, y_den])
    }

    /// Build from numerator and denominator without normalizing.
    pub fn from_parts(numerator: Complex, denominator: Complex) -> Self {
        Self([numerator.re, numerator.im, denominator.re, denominator.im])
    }

    /// Lift an affine complex number `z` to `normalize(z : 1)`.
    pub fn from_complex(z: Complex) -> Self {
        Self::from_parts(z, Complex::ONE).normalized()
    }

    /// Lift a real number `v` to `normalize(v : 1)`.
    pub fn from_real(v: f64) -> Self {
        Self::from_complex(Complex::real(v))
    }

    #[inline]
    pub fn numerator(&self) -> Complex {
        Complex::new(self.0[0], self.0[1])
    }

    #[inline]
    pub fn denominator(&self) -> Complex {
        Complex::new(self.0[2], self.0[3])
    }

    #[inline]
    pub fn components(&self) -> [f64; 4] {
        self.0
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit 4-norm. A zero vector has no direction and is returned as is.
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            return *self;
        }
        Self(self.0.map(|v| v / norm))
    }

    /// Affine value `numerator / denominator`, or `None` at (or numerically
    /// at) infinity.
    pub fn to_affine(&self) -> Option<Complex> {
        let p = self.normalized();
        let den = p.denominator();
        if den.norm() < f64::EPSILON {
            return None;
        }
        Some(p.numerator().div(&den))
    }

    /// Chordal distance between the two points on the Riemann sphere.
    ///
    /// Both coordinates are normalized first, so the result lies in `[0, 1]`.
    pub fn chordal_distance(&self, other: &Self) -> f64 {
        crate::primitives::projective::dist(&self.normalized(), &other.normalized())
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Map a direction on the unit sphere to a normalized homogeneous coordinate.
///
/// The north pole `(0, 0, 1)` maps to zero and the south pole `(0, 0, -1)`
/// is the one singular point of `(x, y, 1 + z, 0)`, which is why directions
/// within [`ANTIPODE_TOLERANCE`] of it return [`HomogeneousCoord::INFINITY`]
/// exactly.
pub fn to_projective(direction: [f64; 3]) -> HomogeneousCoord {
    let [x, y, z] = direction;
    let antipode_distance = (x * x + y * y + (z + 1.0) * (z + 1.0)).sqrt();
    if antipode_distance < ANTIPODE_TOLERANCE {
        return HomogeneousCoord::INFINITY;
    }

    HomogeneousCoord::new(x, y, 1.0 + z, 0.0).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &HomogeneousCoord, b: &HomogeneousCoord) {
        for (x, y) in a.0.iter().zip(b.0.iter()) {
            assert!((x - y).abs() < 1e-12, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn south_pole_is_exact_infinity() {
        assert_eq!(to_projective([0.0, 0.0, -1.0]), HomogeneousCoord::INFINITY);
    }

    #[test]
    fn near_south_pole_is_still_infinity() {
        let p = to_projective([4e-6, -4e-6, -1.0]);
        assert_eq!(p, HomogeneousCoord::INFINITY);
    }

    #[test]
    fn just_outside_the_antipode_ball_stays_finite() {
        // Unit directions at distance 2e-5 from (0, 0, -1)
        let theta: f64 = 2e-5;
        for direction in [
            [theta.sin(), 0.0, -theta.cos()],
            [0.0, -theta.sin(), -theta.cos()],
        ] {
            let p = to_projective(direction);
            assert_ne!(p, HomogeneousCoord::INFINITY);
            assert!(p.0.iter().all(|v| v.is_finite()), "{p:?}");
            assert!((p.norm() - 1.0).abs() < 1e-12, "{p:?}");
            assert!(p.chordal_distance(&HomogeneousCoord::INFINITY) < 1e-4, "{p:?}");
        }
    }

    #[test]
    fn north_pole_is_zero() {
        assert_close(&to_projective([0.0, 0.0, 1.0]), &HomogeneousCoord::ZERO);
    }

    #[test]
    fn equator_point_keeps_unit_norm() {
        let p = to_projective([1.0, 0.0, 0.0]);
        assert!((p.norm() - 1.0).abs() < 1e-12);
        // (1 + 0i) : (1 + 0i) = 1
        let z = p.to_affine().unwrap();
        assert!((z.re - 1.0).abs() < 1e-12);
        assert!(z.im.abs() < 1e-12);
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let p = to_projective([0.36, -0.48, 0.8]);
        assert_close(&p, &p.normalized());
    }

    #[test]
    fn infinity_has_no_affine_value() {
        assert_eq!(HomogeneousCoord::INFINITY.to_affine(), None);
    }

    #[test]
    fn from_complex_round_trips_through_affine() {
        let z = Complex::new(-2.5, 0.75);
        let back = HomogeneousCoord::from_complex(z).to_affine().unwrap();
        assert!((back.re - z.re).abs() < 1e-12);
        assert!((back.im - z.im).abs() < 1e-12);
    }
}
