//! Per-sphere navigation state.

use crate::error::DegenerateTransform;
use crate::homogeneous::{to_projective, HomogeneousCoord};
use crate::matrix::Mat4;
use crate::mobius::{build_increment, compose, MobiusTransform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A navigable sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Parameter space: `c` varies over the sphere
    Parameter,
    /// Dynamical space: the starting `z` varies over the sphere
    Dynamical,
}

impl Target {
    /// All targets in pick priority order.
    pub const ALL: [Target; 2] = [Target::Parameter, Target::Dynamical];

    pub fn name(&self) -> &'static str {
        match self {
            Target::Parameter => "parameter",
            Target::Dynamical => "dynamical",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated navigation of one sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Accumulated zoom, applied to the sphere's homogeneous coordinates
    pub mobius: MobiusTransform,
    /// Accumulated drag rotation of the sphere mesh
    pub rotation: Mat4,
    /// Cached inverse of `rotation`
    pub inverse_rotation: Mat4,
    /// Placement of the sphere in view space
    pub model: Mat4,
}

impl NavigationState {
    pub fn new(model: Mat4) -> Self {
        Self {
            mobius: MobiusTransform::identity(),
            rotation: Mat4::identity(),
            inverse_rotation: Mat4::identity(),
            model,
        }
    }

    /// Sphere center in view space.
    pub fn center(&self) -> [f64; 3] {
        let [x, y, z, _] = self.model.transform([0.0, 0.0, 0.0, 1.0]);
        [x, y, z]
    }

    /// The point facing the camera and its antipode, pulled back into the
    /// sphere's local frame.
    pub fn reference_poles(&self) -> (HomogeneousCoord, HomogeneousCoord) {
        let pull_back = |v: [f64; 4]| {
            let [x, y, z, _] = self.inverse_rotation.transform(v);
            to_projective([x, y, z])
        };
        (
            pull_back([0.0, 0.0, 1.0, 0.0]),
            pull_back([0.0, 0.0, -1.0, 0.0]),
        )
    }

    /// Zoom by `scale` around the point facing the camera.
    ///
    /// On error the state is left unchanged.
    pub fn zoom(&mut self, scale: f64) -> Result<(), DegenerateTransform> {
        let (near, far) = self.reference_poles();
        let increment = build_increment(&near, &far, scale)?;
        self.mobius = compose(&self.mobius, &increment).normalized();
        Ok(())
    }

    /// Rotate by a pointer drag of `(dx, dy)` clip units.
    ///
    /// The axis `(−dy, dx, 0)` is expressed in the local frame and the angle
    /// is its length. Returns `false` (state unchanged) for a zero-length drag.
    pub fn rotate(&mut self, dx: f64, dy: f64) -> bool {
        let axis = self.inverse_rotation.transform_vector([-dy, dx, 0.0]);
        let angle = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();

        let Some(step) = Mat4::rotation(angle, axis) else {
            return false;
        };
        let rotation = self.rotation.multiply(&step);
        let Some(inverse) = rotation.invert() else {
            return false;
        };

        self.rotation = rotation;
        self.inverse_rotation = inverse;
        true
    }

    /// Direction from the sphere center to a view-space point, in the
    /// sphere's local (unrotated) frame.
    pub fn local_direction(&self, view_point: [f64; 3]) -> [f64; 3] {
        let c = self.center();
        self.inverse_rotation.transform_vector([
            view_point[0] - c[0],
            view_point[1] - c[1],
            view_point[2] - c[2],
        ])
    }

    /// Homogeneous coordinate shown at a local sphere direction, after the
    /// accumulated zoom.
    pub fn coordinate_at(&self, local_direction: [f64; 3]) -> HomogeneousCoord {
        self.mobius.apply(&to_projective(local_direction))
    }

    /// Restore identity zoom and rotation. The placement is kept.
    pub fn reset(&mut self) {
        self.mobius = MobiusTransform::identity();
        self.rotation = Mat4::identity();
        self.inverse_rotation = Mat4::identity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_poles_are_zero_and_infinity() {
        let state = NavigationState::new(Mat4::identity());
        let (near, far) = state.reference_poles();
        assert_eq!(far, HomogeneousCoord::INFINITY);
        assert!(near.chordal_distance(&HomogeneousCoord::ZERO) < 1e-12);
    }

    #[test]
    fn zoom_unit_scale_keeps_identity() {
        let mut state = NavigationState::new(Mat4::identity());
        state.zoom(1.0).unwrap();
        assert!(state.mobius.approx_eq(&MobiusTransform::identity(), 1e-12));
    }

    #[test]
    fn rejected_zoom_leaves_state_untouched() {
        let mut state = NavigationState::new(Mat4::identity());
        state.zoom(1.5).unwrap();
        let before = state.clone();
        assert!(state.zoom(-1.0).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn zero_drag_is_noop() {
        let mut state = NavigationState::new(Mat4::identity());
        assert!(!state.rotate(0.0, 0.0));
        assert_eq!(state.rotation, Mat4::identity());
    }

    #[test]
    fn rotation_keeps_cached_inverse_in_sync() {
        let mut state = NavigationState::new(Mat4::identity());
        assert!(state.rotate(0.1, -0.05));
        assert!(state.rotate(-0.3, 0.2));
        let product = state.rotation.multiply(&state.inverse_rotation);
        assert!(product.approx_eq(&Mat4::identity(), 1e-12));
    }

    #[test]
    fn reset_restores_identity_but_keeps_model() {
        let model = Mat4::translation(0.0, 0.0, -3.0);
        let mut state = NavigationState::new(model);
        state.rotate(0.4, 0.1);
        state.zoom(2.0).unwrap();
        state.reset();
        assert_eq!(state, NavigationState::new(model));
    }

    #[test]
    fn local_direction_undoes_placement_and_rotation() {
        let mut state = NavigationState::new(Mat4::translation(0.0, 0.0, -3.0));
        state.rotate(0.0, 0.7);
        let world = state.rotation.transform_vector([0.0, 0.0, 1.0]);
        let local = state.local_direction([world[0], world[1], world[2] - 3.0]);
        assert!(local[0].abs() < 1e-12);
        assert!(local[1].abs() < 1e-12);
        assert!((local[2] - 1.0).abs() < 1e-12);
    }
}
