//! Pointer-to-sphere projection.

use crate::config::SceneConfig;
use crate::matrix::Mat4;
use crate::navigation::Target;

/// Which sphere, if any, the pointer is over.
///
/// `pointer` is in clip space; `x` is multiplied by `aspect` so distances are
/// measured in the same units on both axes. When both pick discs contain the
/// pointer the strictly closer center wins, and ties go to the target that
/// comes first in [`Target::ALL`].
pub fn pick(pointer: [f64; 2], aspect: f64, config: &SceneConfig) -> Option<Target> {
    let x = pointer[0] * aspect;
    let y = pointer[1];

    let mut best: Option<(Target, f64)> = None;
    for target in Target::ALL {
        let placement = config.placement(target);
        let dx = x - placement.pick_center[0];
        let dy = y - placement.pick_center[1];
        let dist_sq = dx * dx + dy * dy;

        if dist_sq >= placement.pick_radius_sq {
            continue;
        }
        match best {
            Some((_, best_sq)) if best_sq <= dist_sq => {}
            _ => best = Some((target, dist_sq)),
        }
    }

    best.map(|(target, _)| target)
}

/// View-space point where the pointer ray leaves the unit sphere at `center`.
///
/// The ray starts at the camera and passes through the pointer, using the
/// projection's diagonal scale terms to undo the perspective. Returns the far
/// root `t = (−b + √Δ) / 2a` of `a·t² + b·t + c = 0`, or `None` when the ray
/// misses the sphere.
pub fn shadow(pointer: [f64; 2], projection: &Mat4, center: [f64; 3]) -> Option<[f64; 3]> {
    let dir = [
        pointer[0] / projection.data[0][0],
        pointer[1] / projection.data[1][1],
        -1.0,
    ];

    let a = dot(&dir, &dir);
    let b = -2.0 * dot(&dir, &center);
    let c = dot(&center, &center) - 1.0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b + discriminant.sqrt()) / (2.0 * a);
    Some(dir.map(|v| v * t))
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
