// spherewonder-compiler/src/library.rs

//! GLSL source of the arithmetic primitive library.
//!
//! The generated expressions call these functions by name. Their semantics
//! match `spherewonder_core::primitives`: projective binary operations
//! renormalize to unit 4-norm, affine ones do not.

/// Functions callable from expressions. Every one is overloaded for `vec2`
/// (affine) and `vec4` (projective) arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
}

impl Function {
    pub const ALL: [Function; 5] = [
        Function::Sqrt,
        Function::Exp,
        Function::Log,
        Function::Sin,
        Function::Cos,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sin => "sin",
            Function::Cos => "cos",
        }
    }
}

/// `vec2` complex arithmetic (`_c*`) and the `vec2` function overloads.
pub const AFFINE_GLSL: &str = r#"
vec2 _cAdd(vec2 a, vec2 b) { return a + b; }
vec2 _cSub(vec2 a, vec2 b) { return a - b; }
vec2 _cOpp(vec2 a) { return -a; }

vec2 _cMul(vec2 a, vec2 b) {
  return vec2(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x);
}

vec2 _cDiv(vec2 a, vec2 b) {
  return vec2(dot(a, b), a.y * b.x - a.x * b.y) / dot(b, b);
}

// Principal branch; only the real part of b is used
vec2 _cPow(vec2 a, vec2 b) {
  float r = pow(length(a), b.x);
  float theta = atan(a.y, a.x) * b.x;
  return r * vec2(cos(theta), sin(theta));
}

vec2 _sqrt(vec2 a) {
  float r = sqrt(length(a));
  float theta = atan(a.y, a.x) / 2.0;
  return r * vec2(cos(theta), sin(theta));
}

vec2 _exp(vec2 a) {
  return exp(a.x) * vec2(cos(a.y), sin(a.y));
}

vec2 _log(vec2 a) {
  return vec2(log(length(a)), atan(a.y, a.x));
}

vec2 _sin(vec2 a) {
  float e = exp(a.y);
  float ch = (e + 1.0 / e) / 2.0;
  float sh = (e - 1.0 / e) / 2.0;
  return vec2(sin(a.x) * ch, cos(a.x) * sh);
}

vec2 _cos(vec2 a) {
  float e = exp(a.y);
  float ch = (e + 1.0 / e) / 2.0;
  float sh = (e - 1.0 / e) / 2.0;
  return vec2(cos(a.x) * ch, -sin(a.x) * sh);
}
"#;

/// Homogeneous `vec4` arithmetic (`_p*`) and the `vec4` function overloads.
///
/// Requires [`AFFINE_GLSL`] to be declared first.
pub const PROJECTIVE_GLSL: &str = r#"
const vec4 _pInfinity = vec4(1.0, 0.0, 0.0, 0.0);

vec4 _pAdd(vec4 a, vec4 b) {
  return normalize(vec4(
    a.x * b.z - a.y * b.w + a.z * b.x - a.w * b.y,
    a.x * b.w + a.y * b.z + a.z * b.y + a.w * b.x,
    a.z * b.z - a.w * b.w,
    a.z * b.w + a.w * b.z
  ));
}

vec4 _pSub(vec4 a, vec4 b) {
  return normalize(vec4(
    a.x * b.z - a.y * b.w - a.z * b.x + a.w * b.y,
    a.x * b.w + a.y * b.z - a.z * b.y - a.w * b.x,
    a.z * b.z - a.w * b.w,
    a.z * b.w + a.w * b.z
  ));
}

vec4 _pOpp(vec4 a) { return vec4(-a.xy, a.zw); }

vec4 _pMul(vec4 a, vec4 b) {
  return normalize(vec4(_cMul(a.xy, b.xy), _cMul(a.zw, b.zw)));
}

vec4 _pDiv(vec4 a, vec4 b) {
  return normalize(vec4(_cMul(a.xy, b.zw), _cMul(a.zw, b.xy)));
}

vec4 _pInv(vec4 a) { return vec4(a.zw, a.xy); }

// Negative exponents swap numerator and denominator first so that zero and
// infinity stay exact
vec4 _pPow(vec4 a, vec4 b) {
  vec2 e = _cDiv(b.xy, b.zw);
  if (e.x < 0.0) {
    return normalize(vec4(_cPow(a.zw, -e), _cPow(a.xy, -e)));
  }
  return normalize(vec4(_cPow(a.xy, e), _cPow(a.zw, e)));
}

// Chordal distance; both arguments normalized
float _pDist(vec4 a, vec4 b) {
  return length(vec2(
    a.x * b.z - a.y * b.w - a.z * b.x + a.w * b.y,
    a.x * b.w + a.y * b.z - a.z * b.y - a.w * b.x
  ));
}

bool _pIsInfinite(vec4 a) { return length(a.zw) < 1e-6 * length(a); }
bool _pIsZero(vec4 a) { return length(a.xy) < 1e-6 * length(a); }
vec4 _pLift(vec2 a) { return normalize(vec4(a, 1.0, 0.0)); }

vec4 _sqrt(vec4 a) {
  return normalize(vec4(_sqrt(a.xy), _sqrt(a.zw)));
}

vec4 _exp(vec4 a) {
  if (_pIsInfinite(a)) return _pInfinity;
  return _pLift(_exp(_cDiv(a.xy, a.zw)));
}

vec4 _log(vec4 a) {
  if (_pIsInfinite(a) || _pIsZero(a)) return _pInfinity;
  return _pLift(_log(_cDiv(a.xy, a.zw)));
}

vec4 _sin(vec4 a) {
  if (_pIsInfinite(a)) return _pInfinity;
  return _pLift(_sin(_cDiv(a.xy, a.zw)));
}

vec4 _cos(vec4 a) {
  if (_pIsInfinite(a)) return _pInfinity;
  return _pLift(_cos(_cDiv(a.xy, a.zw)));
}
"#;
