//! Möbius transformations realized as real 4x4 matrices.
//!
//! A 2x2 complex matrix `[[α, ε], [γ, η]]` acts on `(numerator, denominator)`
//! as `(α·n + ε·d, γ·n + η·d)`. Writing each complex entry `p + iq` as the
//! real block `[[p, -q], [q, p]]` gives the 4x4 matrix uploaded to shaders.

use crate::complex::Complex;
use crate::error::DegenerateTransform;
use crate::homogeneous::HomogeneousCoord;
use crate::matrix::Mat4;
use crate::primitives::affine;
use serde::{Deserialize, Serialize};

/// Pole separation (chordal distance) below which two poles are considered
/// the same point.
pub const MIN_POLE_SEPARATION: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobiusTransform {
    matrix: Mat4,
}

impl Default for MobiusTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl MobiusTransform {
    pub const fn identity() -> Self {
        Self {
            matrix: Mat4::identity(),
        }
    }

    /// Lay out the complex block matrix `[[alpha, epsilon], [gamma, eta]]`.
    pub fn from_blocks(alpha: Complex, epsilon: Complex, gamma: Complex, eta: Complex) -> Self {
        Self {
            matrix: Mat4::from_rows([
                [alpha.re, -alpha.im, epsilon.re, -epsilon.im],
                [alpha.im, alpha.re, epsilon.im, epsilon.re],
                [gamma.re, -gamma.im, eta.re, -eta.im],
                [gamma.im, gamma.re, eta.im, eta.re],
            ]),
        }
    }

    /// Complex entries `[alpha, epsilon, gamma, eta]` of the block form.
    pub fn blocks(&self) -> [Complex; 4] {
        let m = &self.matrix.data;
        [
            Complex::new(m[0][0], m[1][0]),
            Complex::new(m[0][2], m[1][2]),
            Complex::new(m[2][0], m[3][0]),
            Complex::new(m[2][2], m[3][2]),
        ]
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Complex determinant `αη − εγ` of the block form.
    pub fn complex_determinant(&self) -> Complex {
        let [alpha, epsilon, gamma, eta] = self.blocks();
        alpha.mul(&eta).sub(&epsilon.mul(&gamma))
    }

    /// The same map with its block matrix scaled to unit determinant.
    ///
    /// Every zoom multiplies the determinant by its scale, so an accumulator
    /// left unscaled drifts out of `f32` range. A singular or non-finite
    /// matrix is returned as is.
    pub fn normalized(&self) -> Self {
        let root = affine::sqrt(&self.complex_determinant());
        if !root.is_finite() || root.norm_sq() == 0.0 {
            return *self;
        }
        let [alpha, epsilon, gamma, eta] = self.blocks();
        Self::from_blocks(
            alpha.div(&root),
            epsilon.div(&root),
            gamma.div(&root),
            eta.div(&root),
        )
    }

    /// Image of `point`, renormalized.
    pub fn apply(&self, point: &HomogeneousCoord) -> HomogeneousCoord {
        HomogeneousCoord(self.matrix.transform(point.components())).normalized()
    }

    pub fn approx_eq(&self, other: &MobiusTransform, tolerance: f64) -> bool {
        self.matrix.approx_eq(&other.matrix, tolerance)
    }

    pub fn to_column_major_f32(&self) -> [f32; 16] {
        self.matrix.to_column_major_f32()
    }
}

/// Build the transform that scales by `scale` around the two poles.
///
/// With `P = u_n·v_d` and `Q = u_d·v_n` for `pole1 = (u_n : u_d)` and
/// `pole2 = (v_n : v_d)`, the matrix
///
/// ```text
/// [[P − sQ,         (s − 1)·u_n·v_n],
///  [(1 − s)·u_d·v_d, sP − Q        ]]
/// ```
///
/// fixes `pole1` with eigenvalue `P − Q` and `pole2` with eigenvalue
/// `s·(P − Q)`, and has determinant `s·(P − Q)²`. Dividing by `P − Q`
/// leaves a transform with determinant `s` that is exactly the identity
/// for `s = 1`.
pub fn build_increment(
    pole1: &HomogeneousCoord,
    pole2: &HomogeneousCoord,
    scale: f64,
) -> Result<MobiusTransform, DegenerateTransform> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(DegenerateTransform::InvalidScale(scale));
    }
    if !pole1.is_finite() || !pole2.is_finite() {
        return Err(DegenerateTransform::NonFinitePole);
    }

    let u = pole1.normalized();
    let v = pole2.normalized();
    let (un, ud) = (u.numerator(), u.denominator());
    let (vn, vd) = (v.numerator(), v.denominator());

    let p = un.mul(&vd);
    let q = ud.mul(&vn);
    let delta = p.sub(&q);

    let separation = delta.norm();
    if separation < MIN_POLE_SEPARATION {
        return Err(DegenerateTransform::CoincidentPoles { separation });
    }

    let alpha = p.sub(&q.scale(scale));
    let epsilon = un.mul(&vn).scale(scale - 1.0);
    let gamma = ud.mul(&vd).scale(1.0 - scale);
    let eta = p.scale(scale).sub(&q);

    Ok(MobiusTransform::from_blocks(
        alpha.div(&delta),
        epsilon.div(&delta),
        gamma.div(&delta),
        eta.div(&delta),
    ))
}

/// Apply `increment` after all navigation already in `accumulator`:
/// `accumulator × increment`.
pub fn compose(accumulator: &MobiusTransform, increment: &MobiusTransform) -> MobiusTransform {
    MobiusTransform {
        matrix: accumulator.matrix.multiply(&increment.matrix),
    }
}
