use serde::{Deserialize, Serialize};

/// A 4x4 matrix acting on column vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    /// Row-major order: data[row][column]
    pub data: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    /// Returns the identity matrix (no transformation)
    pub const fn identity() -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub const fn from_rows(data: [[f64; 4]; 4]) -> Self {
        Self { data }
    }

    /// Creates a translation matrix for moving by (x, y, z)
    pub const fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0, x],
                [0.0, 1.0, 0.0, y],
                [0.0, 0.0, 1.0, z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Counterclockwise rotation of `angle` radians about `axis`.
    ///
    /// Returns `None` when the axis is too short to define a direction.
    pub fn rotation(angle: f64, axis: [f64; 3]) -> Option<Self> {
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if len < 1e-12 {
            return None;
        }
        let [x, y, z] = axis.map(|v| v / len);
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;

        Some(Self {
            data: [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y, 0.0],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x, 0.0],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        })
    }

    /// OpenGL-style perspective projection looking down -z.
    pub fn perspective(fovy: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (fovy / 2.0).tan();
        let nf = 1.0 / (near - far);
        Self {
            data: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) * nf, 2.0 * far * near * nf],
                [0.0, 0.0, -1.0, 0.0],
            ],
        }
    }

    /// Multiplies this matrix by another (self × other)
    ///
    /// Applied to a vector, `other` acts first.
    pub fn multiply(&self, other: &Mat4) -> Self {
        let mut result = [[0.0; 4]; 4];

        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }

        Self { data: result }
    }

    /// Applies the matrix to a 4-component column vector.
    pub fn transform(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (i, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| self.data[i][k] * v[k]).sum();
        }
        out
    }

    /// Applies the linear part to a direction (w = 0).
    pub fn transform_vector(&self, v: [f64; 3]) -> [f64; 3] {
        let [x, y, z, _] = self.transform([v[0], v[1], v[2], 0.0]);
        [x, y, z]
    }

    pub fn transpose(&self) -> Self {
        let mut result = [[0.0; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.data[j][i];
            }
        }
        Self { data: result }
    }

    fn flat(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (i, row) in self.data.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(row);
        }
        out
    }

    /// 2x2 sub-determinants shared by `determinant` and `invert`.
    fn minors(a: &[f64; 16]) -> [f64; 12] {
        [
            a[0] * a[5] - a[1] * a[4],
            a[0] * a[6] - a[2] * a[4],
            a[0] * a[7] - a[3] * a[4],
            a[1] * a[6] - a[2] * a[5],
            a[1] * a[7] - a[3] * a[5],
            a[2] * a[7] - a[3] * a[6],
            a[8] * a[13] - a[9] * a[12],
            a[8] * a[14] - a[10] * a[12],
            a[8] * a[15] - a[11] * a[12],
            a[9] * a[14] - a[10] * a[13],
            a[9] * a[15] - a[11] * a[13],
            a[10] * a[15] - a[11] * a[14],
        ]
    }

    pub fn determinant(&self) -> f64 {
        let b = Self::minors(&self.flat());
        b[0] * b[11] - b[1] * b[10] + b[2] * b[9] + b[3] * b[8] - b[4] * b[7] + b[5] * b[6]
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Self> {
        let a = self.flat();
        let b = Self::minors(&a);
        let det = b[0] * b[11] - b[1] * b[10] + b[2] * b[9] + b[3] * b[8] - b[4] * b[7]
            + b[5] * b[6];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let out = [
            a[5] * b[11] - a[6] * b[10] + a[7] * b[9],
            a[2] * b[10] - a[1] * b[11] - a[3] * b[9],
            a[13] * b[5] - a[14] * b[4] + a[15] * b[3],
            a[10] * b[4] - a[9] * b[5] - a[11] * b[3],
            a[6] * b[8] - a[4] * b[11] - a[7] * b[7],
            a[0] * b[11] - a[2] * b[8] + a[3] * b[7],
            a[14] * b[2] - a[12] * b[5] - a[15] * b[1],
            a[8] * b[5] - a[10] * b[2] + a[11] * b[1],
            a[4] * b[10] - a[5] * b[8] + a[7] * b[6],
            a[1] * b[8] - a[0] * b[10] - a[3] * b[6],
            a[12] * b[4] - a[13] * b[2] + a[15] * b[0],
            a[9] * b[2] - a[8] * b[4] - a[11] * b[0],
            a[5] * b[7] - a[4] * b[9] - a[6] * b[6],
            a[0] * b[9] - a[1] * b[7] + a[2] * b[6],
            a[13] * b[1] - a[12] * b[3] - a[14] * b[0],
            a[8] * b[3] - a[9] * b[1] + a[10] * b[0],
        ];

        let mut data = [[0.0; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = out[i * 4 + j] * inv_det;
            }
        }
        Some(Self { data })
    }

    /// 16 floats in column-major order, as `uniformMatrix4fv` expects
    /// with `transpose = false`.
    pub fn to_column_major_f32(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for (j, chunk) in out.chunks_exact_mut(4).enumerate() {
            for (i, cell) in chunk.iter_mut().enumerate() {
                *cell = self.data[i][j] as f32;
            }
        }
        out
    }

    /// Largest absolute component-wise difference.
    pub fn max_abs_diff(&self, other: &Mat4) -> f64 {
        self.flat()
            .iter()
            .zip(other.flat().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    pub fn approx_eq(&self, other: &Mat4, tolerance: f64) -> bool {
        self.max_abs_diff(other) <= tolerance
    }
}
