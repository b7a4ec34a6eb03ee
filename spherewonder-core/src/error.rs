//! Navigation error types.

use thiserror::Error;

/// A gesture that cannot be turned into an invertible Möbius transform.
///
/// Raised by ordinary input (zero-length drags, wild scroll deltas), so
/// callers recover by leaving the navigation state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DegenerateTransform {
    #[error("poles coincide (separation {separation:e})")]
    CoincidentPoles { separation: f64 },

    #[error("scale factor {0} is not a positive finite number")]
    InvalidScale(f64),

    #[error("pole is not a finite homogeneous coordinate")]
    NonFinitePole,
}
