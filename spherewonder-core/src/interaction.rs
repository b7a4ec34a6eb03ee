//! Pointer and wheel gesture handling for the two-sphere scene.
//!
//! The scene owns both navigation states and the pointer state. Event
//! handlers run to completion one at a time, so a gesture always reads the
//! inverse rotation from before its own update.

use crate::config::SceneConfig;
use crate::homogeneous::HomogeneousCoord;
use crate::matrix::Mat4;
use crate::navigation::{NavigationState, Target};
use crate::picking::{pick, shadow};
use serde::{Deserialize, Serialize};

/// Canvas bounding rectangle in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert page coordinates to clip space (`[-1, 1]`, y up).
///
/// Assumes the canvas has no padding or border.
pub fn client_to_clip(client_x: f64, client_y: f64, rect: &CanvasRect) -> [f64; 2] {
    let x = (client_x - rect.left) / rect.width;
    let y = (client_y - rect.top) / rect.height;
    [x * 2.0 - 1.0, y * -2.0 + 1.0]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub position: [f64; 2],
    pub last_position: [f64; 2],
    pub is_down: bool,
    /// Target grabbed at pointer-down, rotated by subsequent moves
    pub captured: Option<Target>,
}

/// What a gesture did to the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The pointer is not over any sphere (or nothing is being dragged)
    Missed,
    /// A target was hit but its state did not change
    Unchanged(Target),
    /// The target's navigation state was updated
    Updated(Target),
}

/// Navigation state of both spheres, persisted by the page as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub parameter: NavigationState,
    pub dynamical: NavigationState,
    /// Schema version for future migrations
    version: u32,
}

impl SceneSnapshot {
    const CURRENT_VERSION: u32 = 1;

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a stored snapshot. Returns `None` for malformed JSON or a
    /// snapshot written by another schema version.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<SceneSnapshot>(json) {
            Ok(snapshot) if snapshot.version == Self::CURRENT_VERSION => Some(snapshot),
            Ok(snapshot) => {
                log::warn!("Discarding snapshot with version {}", snapshot.version);
                None
            }
            Err(e) => {
                log::warn!("Failed to parse snapshot: {e}");
                None
            }
        }
    }
}

pub struct NavigationScene {
    config: &'static SceneConfig,
    parameter: NavigationState,
    dynamical: NavigationState,
    pointer: PointerState,
    aspect: f64,
    projection: Mat4,
}

impl NavigationScene {
    pub fn new(config: &'static SceneConfig) -> Self {
        Self {
            config,
            parameter: NavigationState::new(config.parameter.model_matrix()),
            dynamical: NavigationState::new(config.dynamical.model_matrix()),
            pointer: PointerState::default(),
            aspect: 1.0,
            projection: config.projection(1.0),
        }
    }

    pub fn config(&self) -> &'static SceneConfig {
        self.config
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Update the canvas aspect ratio (width / height). Non-positive or
    /// non-finite values are ignored.
    pub fn set_aspect(&mut self, aspect: f64) {
        if !aspect.is_finite() || aspect <= 0.0 {
            log::warn!("Ignoring invalid aspect ratio {aspect}");
            return;
        }
        self.aspect = aspect;
        self.projection = self.config.projection(aspect);
    }

    pub fn state(&self, target: Target) -> &NavigationState {
        match target {
            Target::Parameter => &self.parameter,
            Target::Dynamical => &self.dynamical,
        }
    }

    fn state_mut(&mut self, target: Target) -> &mut NavigationState {
        match target {
            Target::Parameter => &mut self.parameter,
            Target::Dynamical => &mut self.dynamical,
        }
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn pick(&self, pointer: [f64; 2]) -> Option<Target> {
        pick(pointer, self.aspect, self.config)
    }

    pub fn pointer_down(&mut self, pointer: [f64; 2]) -> Option<Target> {
        self.track(pointer);
        self.pointer.is_down = true;
        self.pointer.captured = self.pick(pointer);
        self.pointer.captured
    }

    pub fn pointer_up(&mut self) {
        self.pointer.is_down = false;
        self.pointer.captured = None;
    }

    /// Track the pointer and rotate the captured sphere while dragging.
    pub fn pointer_move(&mut self, pointer: [f64; 2]) -> GestureOutcome {
        let [dx, dy] = self.track(pointer);

        let target = match (self.pointer.is_down, self.pointer.captured) {
            (true, Some(target)) => target,
            _ => return GestureOutcome::Missed,
        };

        if self.state_mut(target).rotate(dx, dy) {
            GestureOutcome::Updated(target)
        } else {
            GestureOutcome::Unchanged(target)
        }
    }

    /// Zoom the sphere under the pointer by one wheel step.
    ///
    /// A zero delta leaves the state untouched. Degenerate increments are
    /// skipped and logged.
    pub fn scroll(&mut self, pointer: [f64; 2], delta_y: f64) -> GestureOutcome {
        self.track(pointer);

        let Some(target) = self.pick(pointer) else {
            return GestureOutcome::Missed;
        };

        let scale = self.config.scroll_scale(delta_y);
        if scale == 1.0 {
            return GestureOutcome::Unchanged(target);
        }

        match self.state_mut(target).zoom(scale) {
            Ok(()) => GestureOutcome::Updated(target),
            Err(e) => {
                log::warn!("Skipping {target} zoom: {e}");
                GestureOutcome::Unchanged(target)
            }
        }
    }

    pub fn reset(&mut self, target: Target) {
        self.state_mut(target).reset();
        log::info!("Reset {target} navigation");
    }

    pub fn reset_all(&mut self) {
        for target in Target::ALL {
            self.reset(target);
        }
    }

    /// View-space point of `target`'s sphere under the pointer.
    pub fn shadow(&self, pointer: [f64; 2], target: Target) -> Option<[f64; 3]> {
        shadow(pointer, &self.projection, self.state(target).center())
    }

    /// Homogeneous coordinate shown under the pointer on `target`'s sphere.
    pub fn coordinate_under_pointer(
        &self,
        pointer: [f64; 2],
        target: Target,
    ) -> Option<HomogeneousCoord> {
        let point = self.shadow(pointer, target)?;
        let state = self.state(target);
        Some(state.coordinate_at(state.local_direction(point)))
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            parameter: self.parameter.clone(),
            dynamical: self.dynamical.clone(),
            version: SceneSnapshot::CURRENT_VERSION,
        }
    }

    pub fn restore(&mut self, snapshot: SceneSnapshot) {
        self.parameter = snapshot.parameter;
        self.dynamical = snapshot.dynamical;
    }

    /// Record a new pointer position and return the delta from the last one.
    fn track(&mut self, pointer: [f64; 2]) -> [f64; 2] {
        self.pointer.last_position = self.pointer.position;
        self.pointer.position = pointer;
        [
            pointer[0] - self.pointer.last_position[0],
            pointer[1] - self.pointer.last_position[1],
        ]
    }
}
