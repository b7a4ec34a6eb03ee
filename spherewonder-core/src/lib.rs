pub mod complex;
pub mod config;
pub mod error;
pub mod escape;
pub mod homogeneous;
pub mod interaction;
pub mod matrix;
pub mod mobius;
pub mod navigation;
pub mod picking;
pub mod primitives;

pub use complex::Complex;
pub use config::{SceneConfig, SpherePlacement, DEFAULT_SCENE};
pub use error::DegenerateTransform;
pub use escape::{escape_time, smooth_depth, EscapeResult, ESCAPE_DISTANCE};
pub use homogeneous::{to_projective, HomogeneousCoord, ANTIPODE_TOLERANCE};
pub use interaction::{
    client_to_clip, CanvasRect, GestureOutcome, NavigationScene, PointerState, SceneSnapshot,
};
pub use matrix::Mat4;
pub use mobius::{build_increment, compose, MobiusTransform, MIN_POLE_SEPARATION};
pub use navigation::{NavigationState, Target};
pub use picking::{pick, shadow};
