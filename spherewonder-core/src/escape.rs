// spherewonder-core/src/escape.rs

//! CPU reference for the shader's escape-time loop and palette depth.

use crate::homogeneous::HomogeneousCoord;
use crate::primitives::projective;
use serde::{Deserialize, Serialize};

/// Chordal distance to infinity below which an orbit has escaped.
pub const ESCAPE_DISTANCE: f64 = 1e-3;

/// Iterations per full cycle through the palette.
pub const PALETTE_PERIOD: f64 = 64.0;

/// Number of entries in the palette texture.
pub const PALETTE_SIZE: u32 = 512;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscapeResult {
    /// Iteration at which the escape test first succeeded, or the bound
    pub iterations: u32,
    pub escaped: bool,
    /// Smoothed palette position in `[0, 1)`, zero for captive orbits
    pub depth: f64,
}

/// Smoothed palette position `fract((iter − log2(−ln d)) / 64)`.
///
/// `d` is clamped to the smallest positive float so an orbit that lands
/// exactly on infinity still gets a finite depth.
pub fn smooth_depth(iterations: u32, distance: f64) -> f64 {
    let d = distance.max(f64::MIN_POSITIVE);
    let smooth = f64::from(iterations) - (-d.ln()).log2();
    (smooth / PALETTE_PERIOD).rem_euclid(1.0)
}

/// Texture coordinate of `depth` in the palette, sampling texel centers.
pub fn palette_coordinate(depth: f64) -> f64 {
    let size = f64::from(PALETTE_SIZE);
    ((size - 1.0) * depth + 0.5) / size
}

/// Iterate `f(z, c)` from `z0` until the orbit reaches infinity or the bound
/// is used up.
pub fn escape_time<F>(
    f: F,
    z0: HomogeneousCoord,
    c: HomogeneousCoord,
    max_iterations: u32,
) -> EscapeResult
where
    F: Fn(&HomogeneousCoord, &HomogeneousCoord) -> HomogeneousCoord,
{
    let mut z = z0.normalized();

    for iter in 0..max_iterations {
        let d = projective::dist(&z, &HomogeneousCoord::INFINITY);
        if d < ESCAPE_DISTANCE {
            return EscapeResult {
                iterations: iter,
                escaped: true,
                depth: smooth_depth(iter, d),
            };
        }
        z = f(&z, &c);
    }

    EscapeResult {
        iterations: max_iterations,
        escaped: false,
        depth: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(z: &HomogeneousCoord, c: &HomogeneousCoord) -> HomogeneousCoord {
        projective::add(&projective::mul(z, z), c)
    }

    #[test]
    fn two_escapes_under_squaring() {
        // 2, 4, 16, 256, 65536: the last is within 1e-3 of infinity
        let result = escape_time(
            quadratic,
            HomogeneousCoord::from_real(2.0),
            HomogeneousCoord::from_real(0.0),
            100,
        );
        assert!(result.escaped);
        assert_eq!(result.iterations, 4);
        assert!((0.0..1.0).contains(&result.depth));
    }

    #[test]
    fn origin_is_captive() {
        let result = escape_time(
            quadratic,
            HomogeneousCoord::ZERO,
            HomogeneousCoord::from_real(-1.0),
            50,
        );
        assert!(!result.escaped);
        assert_eq!(result.iterations, 50);
        assert_eq!(result.depth, 0.0);
    }

    #[test]
    fn infinity_escapes_immediately() {
        let result = escape_time(
            quadratic,
            HomogeneousCoord::INFINITY,
            HomogeneousCoord::ZERO,
            10,
        );
        assert_eq!(result.iterations, 0);
        assert!(result.escaped);
        assert!(result.depth.is_finite());
    }

    #[test]
    fn zero_bound_runs_no_iterations() {
        let result = escape_time(quadratic, HomogeneousCoord::INFINITY, HomogeneousCoord::ZERO, 0);
        assert!(!result.escaped);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn palette_coordinate_hits_texel_centers() {
        assert_eq!(palette_coordinate(0.0), 0.5 / 512.0);
        assert!((palette_coordinate(1.0) - 511.5 / 512.0).abs() < 1e-15);
    }
}
