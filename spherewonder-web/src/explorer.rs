//! JavaScript-facing wrapper around the navigation scene and the compiler.
//!
//! Pointer positions cross the boundary in clip space; the page converts
//! page coordinates with [`Explorer::client_to_clip`] first. Matrices are
//! returned column-major, ready for `uniformMatrix4fv`.

use js_sys::Float32Array;
use serde::Serialize;
use spherewonder_compiler::{compile_program, ProgramSources, ShaderSettings};
use spherewonder_core::{
    client_to_clip, CanvasRect, GestureOutcome, HomogeneousCoord, Mat4, NavigationScene,
    SceneSnapshot, Target, DEFAULT_SCENE,
};
use wasm_bindgen::prelude::*;

/// Depth of the pointer marker passed to the fragment shaders.
const MARKER_DEPTH: f32 = -2.5;

/// Result of a compile, as serialized for the page.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CompileReport<'a> {
    Ok { program: &'a ProgramSources },
    Error { message: String },
}

#[wasm_bindgen]
pub struct Explorer {
    scene: NavigationScene,
    settings: ShaderSettings,
    program: Option<ProgramSources>,
    /// Parameter value shown on the dynamical sphere
    parameter: HomogeneousCoord,
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Explorer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Explorer {
        Explorer {
            scene: NavigationScene::new(&DEFAULT_SCENE),
            settings: ShaderSettings::default(),
            program: None,
            parameter: HomogeneousCoord::ZERO,
        }
    }

    /// Update the projection for a canvas of `width` x `height` CSS pixels.
    pub fn resize(&mut self, width: f64, height: f64) {
        if height > 0.0 {
            self.scene.set_aspect(width / height);
        }
    }

    /// Page coordinates to clip space for a canvas at the given rectangle.
    pub fn client_to_clip(
        &self,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Vec<f64> {
        let rect = CanvasRect {
            left,
            top,
            width,
            height,
        };
        client_to_clip(client_x, client_y, &rect).to_vec()
    }

    /// Start a drag. Returns the name of the captured sphere, if any.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        self.scene
            .pointer_down([x, y])
            .map(|target| target.name().to_string())
    }

    /// Track the pointer. Returns `true` when a sphere rotated.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        matches!(self.scene.pointer_move([x, y]), GestureOutcome::Updated(_))
    }

    pub fn pointer_up(&mut self) {
        self.scene.pointer_up();
    }

    /// Zoom the sphere under the pointer. Returns `true` when it changed.
    pub fn scroll(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        matches!(self.scene.scroll([x, y], delta_y), GestureOutcome::Updated(_))
    }

    pub fn reset(&mut self, target: &str) -> Result<(), JsValue> {
        self.scene.reset(parse_target(target)?);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.scene.reset_all();
    }

    /// Use the parameter-sphere point under the pointer as the dynamical
    /// sphere's parameter. Returns `false` when the pointer misses the sphere.
    pub fn select_parameter(&mut self, x: f64, y: f64) -> bool {
        match self
            .scene
            .coordinate_under_pointer([x, y], Target::Parameter)
        {
            Some(coord) => {
                log::debug!("Selected parameter {:?}", coord.to_affine());
                self.parameter = coord;
                true
            }
            None => false,
        }
    }

    /// Compile new settings (JSON, as produced by `settings_json`).
    ///
    /// Returns a JSON report: `{"status":"ok","program":{...}}` or
    /// `{"status":"error","message":"..."}`. On error the previous program
    /// and settings stay in place.
    pub fn compile(&mut self, settings_json: &str) -> Result<String, JsValue> {
        let settings: ShaderSettings = serde_json::from_str(settings_json)
            .map_err(|e| JsValue::from_str(&format!("Parse settings: {e}")))?;

        let report = match compile_program(&settings) {
            Ok(program) => {
                self.settings = settings;
                let program = self.program.insert(program);
                serde_json::to_string(&CompileReport::Ok { program })
            }
            Err(e) => {
                log::warn!("Compile failed: {e}");
                serde_json::to_string(&CompileReport::Error {
                    message: e.to_string(),
                })
            }
        };
        report.map_err(|e| JsValue::from_str(&format!("Serialize report: {e}")))
    }

    /// The most recently compiled program as JSON, or `None` before the
    /// first successful compile.
    pub fn program_json(&self) -> Option<String> {
        let program = self.program.as_ref()?;
        serde_json::to_string(program).ok()
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.settings)
            .map_err(|e| JsValue::from_str(&format!("Serialize settings: {e}")))
    }

    pub fn mobius_matrix(&self, target: &str) -> Result<Float32Array, JsValue> {
        let state = self.scene.state(parse_target(target)?);
        Ok(to_f32_array(&state.mobius.to_column_major_f32()))
    }

    pub fn rotation_matrix(&self, target: &str) -> Result<Float32Array, JsValue> {
        let state = self.scene.state(parse_target(target)?);
        Ok(matrix_array(&state.rotation))
    }

    pub fn model_matrix(&self, target: &str) -> Result<Float32Array, JsValue> {
        let state = self.scene.state(parse_target(target)?);
        Ok(matrix_array(&state.model))
    }

    pub fn projection_matrix(&self) -> Float32Array {
        matrix_array(self.scene.projection())
    }

    /// `uParameter` for the dynamical program.
    pub fn parameter_uniform(&self) -> Float32Array {
        to_f32_array(&self.parameter.components().map(|v| v as f32))
    }

    /// `uMousePosition`: the pointer in clip space at the marker depth.
    pub fn mouse_uniform(&self) -> Float32Array {
        let [x, y] = self.scene.pointer().position;
        to_f32_array(&[x as f32, y as f32, MARKER_DEPTH])
    }

    /// Navigation state of both spheres as JSON, for persistence.
    pub fn state_json(&self) -> Result<String, JsValue> {
        self.scene
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&format!("Serialize state: {e}")))
    }

    /// Restore state saved by `state_json`. Returns `false` (state kept)
    /// when the JSON is unusable.
    pub fn restore_state(&mut self, json: &str) -> bool {
        match SceneSnapshot::from_json(json) {
            Some(snapshot) => {
                self.scene.restore(snapshot);
                true
            }
            None => false,
        }
    }
}

fn parse_target(name: &str) -> Result<Target, JsValue> {
    Target::ALL
        .into_iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown target: {name}")))
}

fn matrix_array(m: &Mat4) -> Float32Array {
    to_f32_array(&m.to_column_major_f32())
}

fn to_f32_array(values: &[f32]) -> Float32Array {
    Float32Array::from(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_json(f_expr: &str) -> String {
        serde_json::to_string(&ShaderSettings {
            f_expr: f_expr.to_string(),
            ..ShaderSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn compile_reports_program_on_success() {
        let mut explorer = Explorer::new();
        let report = explorer.compile(&settings_json("z^3 + c")).unwrap();
        assert!(report.starts_with(r#"{"status":"ok""#), "{report}");
        assert!(report.contains("_pMul(_pMul(z, z), z)"));
        assert!(explorer.program_json().is_some());
    }

    #[test]
    fn compile_error_keeps_previous_program() {
        let mut explorer = Explorer::new();
        explorer.compile(&settings_json("z^2 + c")).unwrap();
        let before = explorer.program_json();

        let report = explorer.compile(&settings_json("z^2 +")).unwrap();
        assert!(report.starts_with(r#"{"status":"error""#), "{report}");
        assert!(report.contains("syntax error"));
        assert_eq!(explorer.program_json(), before);
        assert!(explorer.settings_json().unwrap().contains(r#""f_expr":"z^2 + c""#));
    }

    #[test]
    fn state_survives_save_and_restore() {
        let mut explorer = Explorer::new();
        explorer.scroll(0.0, 0.0, 150.0);
        let saved = explorer.state_json().unwrap();

        let mut other = Explorer::new();
        assert!(other.restore_state(&saved));
        assert!(!other.restore_state("{}"));
        assert!(other
            .scene
            .state(Target::Parameter)
            .mobius
            .approx_eq(&explorer.scene.state(Target::Parameter).mobius, 1e-14));
    }

    #[test]
    fn parameter_selection_needs_a_hit() {
        let mut explorer = Explorer::new();
        assert!(!explorer.select_parameter(-0.99, 0.99));
        assert!(explorer.select_parameter(0.1, 0.1));
        assert_ne!(explorer.parameter, HomogeneousCoord::ZERO);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn matrices_have_sixteen_entries() {
        let explorer = Explorer::new();
        assert_eq!(explorer.mobius_matrix("parameter").unwrap().length(), 16);
        assert_eq!(explorer.model_matrix("dynamical").unwrap().length(), 16);
        assert_eq!(explorer.projection_matrix().length(), 16);
    }

    #[wasm_bindgen_test]
    fn unknown_target_is_an_error() {
        let mut explorer = Explorer::new();
        assert!(explorer.reset("elsewhere").is_err());
        assert!(explorer.rotation_matrix("elsewhere").is_err());
    }
}
