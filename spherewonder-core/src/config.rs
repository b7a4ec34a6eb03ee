//! Scene configuration.
//!
//! Sphere placements, pick regions and camera parameters are constants of
//! the scene, not derived from the rendered geometry.

use crate::matrix::Mat4;
use crate::navigation::Target;

/// Where a navigable sphere sits and how pointer picking finds it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpherePlacement {
    /// Translation of the unit sphere in view space
    pub translation: [f64; 3],
    /// Center of the pick disc in aspect-corrected clip space
    pub pick_center: [f64; 2],
    /// Squared radius of the pick disc
    pub pick_radius_sq: f64,
}

impl SpherePlacement {
    pub fn model_matrix(&self) -> Mat4 {
        let [x, y, z] = self.translation;
        Mat4::translation(x, y, z)
    }
}

/// Configuration for the two-sphere navigation scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Vertical field of view in radians
    pub field_of_view: f64,
    pub z_near: f64,
    pub z_far: f64,
    /// Parameter-space sphere (c varies over the surface)
    pub parameter: SpherePlacement,
    /// Dynamical-space sphere (the starting z varies over the surface)
    pub dynamical: SpherePlacement,
    /// Scale change per unit of wheel delta: scale = 1 + delta_y * sensitivity
    pub scroll_sensitivity: f64,
    /// Lower clamp for the scroll scale factor, keeps it positive
    pub min_scroll_scale: f64,
}

impl SceneConfig {
    pub fn placement(&self, target: Target) -> &SpherePlacement {
        match target {
            Target::Parameter => &self.parameter,
            Target::Dynamical => &self.dynamical,
        }
    }

    /// Scroll scale factor for a wheel delta.
    pub fn scroll_scale(&self, delta_y: f64) -> f64 {
        (1.0 + delta_y * self.scroll_sensitivity).max(self.min_scroll_scale)
    }

    pub fn projection(&self, aspect: f64) -> Mat4 {
        Mat4::perspective(self.field_of_view, aspect, self.z_near, self.z_far)
    }
}

/// Default scene: a large parameter sphere in front of the camera and a
/// smaller dynamical sphere down and to the right.
pub static DEFAULT_SCENE: SceneConfig = SceneConfig {
    field_of_view: std::f64::consts::FRAC_PI_4,
    z_near: 1.0,
    z_far: 20.0,
    parameter: SpherePlacement {
        translation: [0.0, 0.0, -3.0],
        pick_center: [0.0, 0.0],
        pick_radius_sq: 0.73,
    },
    dynamical: SpherePlacement {
        translation: [2.2, -1.2, -6.0],
        pick_center: [0.885, -0.483],
        pick_radius_sq: 0.14,
    },
    scroll_sensitivity: 0.001,
    min_scroll_scale: 0.05,
};
