//! Shader program assembly.
//!
//! Compiled fragments are spliced verbatim into a fixed escape-time
//! template, once for the parameter-space sphere and once for the
//! dynamical-space sphere.

use crate::codegen::{ArithmeticMode, CodeFragment};
use crate::error::CompileError;
use crate::library::{AFFINE_GLSL, PROJECTIVE_GLSL};
use crate::{compile, parser::parse};
use serde::{Deserialize, Serialize};
use spherewonder_core::escape::{ESCAPE_DISTANCE, PALETTE_PERIOD, PALETTE_SIZE};

/// User-editable inputs of a shader program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShaderSettings {
    /// Iterated map `f(z, c)`, projective
    pub f_expr: String,
    /// Critical point the parameter-space orbit starts from, projective in `c`
    pub crit_expr: String,
    /// Parameter used by the dynamical-space sphere, affine in `c`
    pub c_expr: String,
    pub max_iterations: u32,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            f_expr: "z^2 + c".to_string(),
            crit_expr: "0.0".to_string(),
            c_expr: "c".to_string(),
            max_iterations: 100,
        }
    }
}

/// The three compiled fragments of a program.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompiledFragments {
    pub f: CodeFragment,
    pub crit: CodeFragment,
    pub c: CodeFragment,
}

/// Assembled GLSL sources; both fragment shaders pair with `vertex`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgramSources {
    pub vertex: String,
    pub parameter_fragment: String,
    pub dynamical_fragment: String,
}

pub const VERTEX_SHADER: &str = r#"
attribute vec4 aPosition;

uniform mat4 uLocalMatrix;
uniform mat4 uModelMatrix;
uniform mat4 uProjMatrix;

varying vec4 modelPos;
varying vec4 localPos;

void main(void) {
  localPos = aPosition;
  modelPos = uProjMatrix * uModelMatrix * uLocalMatrix * aPosition;
  gl_Position = modelPos;
}
"#;

/// Compile all three expressions of `settings`.
///
/// The critical point is evaluated before `z` exists, so it may only depend
/// on `c`.
pub fn compile_fragments(settings: &ShaderSettings) -> Result<CompiledFragments, CompileError> {
    let f = compile(&settings.f_expr, ArithmeticMode::Projective).map_err(|e| e.in_field("f"))?;

    let crit_ast = parse(&settings.crit_expr).map_err(|e| e.in_field("critical point"))?;
    if crit_ast.mentions_symbol("z") {
        return Err(CompileError::UnknownSymbol {
            name: "z".to_string(),
            mode: ArithmeticMode::Projective,
        }
        .in_field("critical point"));
    }
    let crit = crate::codegen::generate(&crit_ast, ArithmeticMode::Projective)
        .map_err(|e| e.in_field("critical point"))?;

    let c = compile(&settings.c_expr, ArithmeticMode::Affine).map_err(|e| e.in_field("c"))?;

    Ok(CompiledFragments { f, crit, c })
}

/// Compile `settings` into complete vertex and fragment sources.
pub fn compile_program(settings: &ShaderSettings) -> Result<ProgramSources, CompileError> {
    // The bound is spliced into a GLSL `int`
    if settings.max_iterations == 0 || settings.max_iterations > i32::MAX as u32 {
        return Err(CompileError::InvalidIterationBound);
    }
    let fragments = compile_fragments(settings)?;

    let parameter_init = format!(
        "vec4 c = uMobiusMatrix * vec4(localPos.xy, 1.0 + localPos.z, 0.0);\n  \
         vec4 z = {};",
        fragments.crit
    );
    let dynamical_init = format!(
        "vec4 z = uMobiusMatrix * vec4(localPos.xy, 1.0 + localPos.z, 0.0);\n  \
         vec4 c = uParameter;\n  \
         c = normalize(vec4({}, 1.0, 0.0));",
        fragments.c
    );

    log::info!(
        "Compiled program: f = {}, crit = {}, c = {}, {} iterations",
        settings.f_expr,
        settings.crit_expr,
        settings.c_expr,
        settings.max_iterations
    );

    Ok(ProgramSources {
        vertex: VERTEX_SHADER.to_string(),
        parameter_fragment: fragment_source(&parameter_init, &fragments.f, settings.max_iterations),
        dynamical_fragment: fragment_source(&dynamical_init, &fragments.f, settings.max_iterations),
    })
}

fn fragment_source(init: &str, f: &CodeFragment, max_iterations: u32) -> String {
    let palette_last = PALETTE_SIZE - 1;
    format!(
        r#"precision highp float;

uniform sampler2D uColorPalette;
uniform vec3 uMousePosition;
uniform mat4 uProjMatrix;
uniform mat4 uMobiusMatrix;
uniform vec4 uParameter;

varying vec4 modelPos;
varying vec4 localPos;

const int MAX_ITERATIONS = {max_iterations};
{AFFINE_GLSL}
{PROJECTIVE_GLSL}
vec4 _iterate(vec4 z, vec4 c) {{
  return {f};
}}

void main(void) {{
  {init}

  gl_FragColor = vec4(0.0, 0.0, 0.0, 1.0);

  for (int iter = 0; iter < MAX_ITERATIONS; iter++) {{
    float d = _pDist(normalize(z), _pInfinity);
    if (d < {escape}) {{
      d = max(d, 1e-30);
      float depth = fract((float(iter) - log2(-log(d))) / {period});
      gl_FragColor = texture2D(
        uColorPalette,
        vec2(({palette_last}.0 * depth + 0.5) / {palette_size}.0, 0.5)
      );
      break;
    }}
    z = _iterate(z, c);
  }}

  vec2 marker = modelPos.xy / modelPos.w - uMousePosition.xy;
  marker.x *= uProjMatrix[1][1] / uProjMatrix[0][0];
  if (length(marker) < 0.01) {{
    gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0);
  }}
}}
"#,
        escape = crate::codegen::float_literal(ESCAPE_DISTANCE),
        period = crate::codegen::float_literal(PALETTE_PERIOD),
        palette_size = PALETTE_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_compile() {
        let program = compile_program(&ShaderSettings::default()).unwrap();
        assert!(program
            .parameter_fragment
            .contains("return _pAdd(_pMul(z, z), c);"));
        assert!(program
            .parameter_fragment
            .contains("vec4 z = vec4(0.0, 0.0, 1.0, 0.0);"));
        assert!(program
            .dynamical_fragment
            .contains("c = normalize(vec4((c.xy / (c.w + c.z)), 1.0, 0.0));"));
        assert!(program.parameter_fragment.contains("const int MAX_ITERATIONS = 100;"));
        assert_eq!(program.vertex, VERTEX_SHADER);
    }

    #[test]
    fn iteration_bound_must_fit_a_glsl_int() {
        for max_iterations in [0, i32::MAX as u32 + 1, u32::MAX] {
            let settings = ShaderSettings {
                max_iterations,
                ..ShaderSettings::default()
            };
            assert_eq!(
                compile_program(&settings),
                Err(CompileError::InvalidIterationBound),
                "{max_iterations}"
            );
        }

        let settings = ShaderSettings {
            max_iterations: i32::MAX as u32,
            ..ShaderSettings::default()
        };
        let program = compile_program(&settings).unwrap();
        assert!(program
            .dynamical_fragment
            .contains("const int MAX_ITERATIONS = 2147483647;"));
    }

    #[test]
    fn errors_name_the_failing_field() {
        let settings = ShaderSettings {
            c_expr: "z".to_string(),
            ..ShaderSettings::default()
        };
        let err = compile_program(&settings).unwrap_err();
        assert!(matches!(err, CompileError::InExpression { field: "c", .. }), "{err:?}");
        assert!(matches!(err.root(), CompileError::UnknownSymbol { .. }));
    }

    #[test]
    fn critical_point_cannot_use_z() {
        let settings = ShaderSettings {
            crit_expr: "z + 1".to_string(),
            ..ShaderSettings::default()
        };
        let err = compile_program(&settings).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InExpression {
                field: "critical point",
                ..
            }
        ));
    }

    #[test]
    fn critical_point_may_depend_on_c() {
        let settings = ShaderSettings {
            f_expr: "z^3 + c".to_string(),
            crit_expr: "-c / 3".to_string(),
            ..ShaderSettings::default()
        };
        let fragments = compile_fragments(&settings).unwrap();
        assert_eq!(
            fragments.crit.as_str(),
            "_pDiv(_pOpp(c), vec4(3.0, 0.0, 1.0, 0.0))"
        );
    }

    #[test]
    fn escape_constants_are_glsl_floats() {
        let program = compile_program(&ShaderSettings::default()).unwrap();
        assert!(program.parameter_fragment.contains("if (d < 0.001)"));
        assert!(program.parameter_fragment.contains("/ 64.0);"));
        assert!(program.parameter_fragment.contains("(511.0 * depth + 0.5) / 512.0"));
    }
}
