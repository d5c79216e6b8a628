//! Uniform call kinds, their evaluated argument lists and the typed producers
//! that compute those arguments from live frame state.

use cgmath::{Matrix2, Matrix3, Matrix4};

use crate::gfx::scene::{Primitive, SceneState};

/// State a uniform producer may read while a primitive is drawn.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub primitive: &'a Primitive,
    pub scene: &'a SceneState,
}

/// Value producer evaluated at draw time.
pub type Producer<T> = Box<dyn Fn(&FrameContext<'_>) -> T>;

/// Which uniform-set call a binding uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    FloatArray,
    Int,
    IntArray,
    Vec2,
    Vec2Array,
    IVec2,
    IVec2Array,
    Vec3,
    Vec3Array,
    IVec3,
    IVec3Array,
    Vec4,
    Vec4Array,
    IVec4,
    IVec4Array,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformKind {
    /// Name of the equivalent GL entry point.
    pub fn gl_name(self) -> &'static str {
        match self {
            UniformKind::Float => "uniform1f",
            UniformKind::FloatArray => "uniform1fv",
            UniformKind::Int => "uniform1i",
            UniformKind::IntArray => "uniform1iv",
            UniformKind::Vec2 => "uniform2f",
            UniformKind::Vec2Array => "uniform2fv",
            UniformKind::IVec2 => "uniform2i",
            UniformKind::IVec2Array => "uniform2iv",
            UniformKind::Vec3 => "uniform3f",
            UniformKind::Vec3Array => "uniform3fv",
            UniformKind::IVec3 => "uniform3i",
            UniformKind::IVec3Array => "uniform3iv",
            UniformKind::Vec4 => "uniform4f",
            UniformKind::Vec4Array => "uniform4fv",
            UniformKind::IVec4 => "uniform4i",
            UniformKind::IVec4Array => "uniform4iv",
            UniformKind::Mat2 => "uniformMatrix2fv",
            UniformKind::Mat3 => "uniformMatrix3fv",
            UniformKind::Mat4 => "uniformMatrix4fv",
        }
    }
}

/// Positional arguments of one uniform-set call, minus the location.
///
/// Array variants carry flat component lists. Matrix data is column-major.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    FloatArray(Vec<f32>),
    Int(i32),
    IntArray(Vec<i32>),
    Vec2([f32; 2]),
    Vec2Array(Vec<f32>),
    IVec2([i32; 2]),
    IVec2Array(Vec<i32>),
    Vec3([f32; 3]),
    Vec3Array(Vec<f32>),
    IVec3([i32; 3]),
    IVec3Array(Vec<i32>),
    Vec4([f32; 4]),
    Vec4Array(Vec<f32>),
    IVec4([i32; 4]),
    IVec4Array(Vec<i32>),
    Mat2 { transpose: bool, data: [f32; 4] },
    Mat3 { transpose: bool, data: [f32; 9] },
    Mat4 { transpose: bool, data: [f32; 16] },
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::FloatArray(_) => UniformKind::FloatArray,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::IntArray(_) => UniformKind::IntArray,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec2Array(_) => UniformKind::Vec2Array,
            UniformValue::IVec2(_) => UniformKind::IVec2,
            UniformValue::IVec2Array(_) => UniformKind::IVec2Array,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec3Array(_) => UniformKind::Vec3Array,
            UniformValue::IVec3(_) => UniformKind::IVec3,
            UniformValue::IVec3Array(_) => UniformKind::IVec3Array,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Vec4Array(_) => UniformKind::Vec4Array,
            UniformValue::IVec4(_) => UniformKind::IVec4,
            UniformValue::IVec4Array(_) => UniformKind::IVec4Array,
            UniformValue::Mat2 { .. } => UniformKind::Mat2,
            UniformValue::Mat3 { .. } => UniformKind::Mat3,
            UniformValue::Mat4 { .. } => UniformKind::Mat4,
        }
    }
}

/// A uniform's call kind together with the producer of its arguments.
///
/// Each variant's producer returns exactly the data its call kind needs, so a
/// binding can never hand a matrix to a vector call.
pub enum UniformSource {
    Float(Producer<f32>),
    FloatArray(Producer<Vec<f32>>),
    Int(Producer<i32>),
    IntArray(Producer<Vec<i32>>),
    Vec2(Producer<[f32; 2]>),
    Vec2Array(Producer<Vec<f32>>),
    IVec2(Producer<[i32; 2]>),
    IVec2Array(Producer<Vec<i32>>),
    Vec3(Producer<[f32; 3]>),
    Vec3Array(Producer<Vec<f32>>),
    IVec3(Producer<[i32; 3]>),
    IVec3Array(Producer<Vec<i32>>),
    Vec4(Producer<[f32; 4]>),
    Vec4Array(Producer<Vec<f32>>),
    IVec4(Producer<[i32; 4]>),
    IVec4Array(Producer<Vec<i32>>),
    Mat2(Producer<Matrix2<f32>>),
    Mat3(Producer<Matrix3<f32>>),
    Mat4(Producer<Matrix4<f32>>),
}

impl UniformSource {
    pub fn float(f: impl Fn(&FrameContext<'_>) -> f32 + 'static) -> Self {
        UniformSource::Float(Box::new(f))
    }

    pub fn int(f: impl Fn(&FrameContext<'_>) -> i32 + 'static) -> Self {
        UniformSource::Int(Box::new(f))
    }

    pub fn vec3(f: impl Fn(&FrameContext<'_>) -> [f32; 3] + 'static) -> Self {
        UniformSource::Vec3(Box::new(f))
    }

    pub fn vec3_array(f: impl Fn(&FrameContext<'_>) -> Vec<f32> + 'static) -> Self {
        UniformSource::Vec3Array(Box::new(f))
    }

    pub fn vec4(f: impl Fn(&FrameContext<'_>) -> [f32; 4] + 'static) -> Self {
        UniformSource::Vec4(Box::new(f))
    }

    pub fn mat4(f: impl Fn(&FrameContext<'_>) -> Matrix4<f32> + 'static) -> Self {
        UniformSource::Mat4(Box::new(f))
    }

    /// A producer that always yields the same integer, e.g. a sampler unit.
    pub fn constant_int(value: i32) -> Self {
        UniformSource::Int(Box::new(move |_| value))
    }

    pub fn kind(&self) -> UniformKind {
        match self {
            UniformSource::Float(_) => UniformKind::Float,
            UniformSource::FloatArray(_) => UniformKind::FloatArray,
            UniformSource::Int(_) => UniformKind::Int,
            UniformSource::IntArray(_) => UniformKind::IntArray,
            UniformSource::Vec2(_) => UniformKind::Vec2,
            UniformSource::Vec2Array(_) => UniformKind::Vec2Array,
            UniformSource::IVec2(_) => UniformKind::IVec2,
            UniformSource::IVec2Array(_) => UniformKind::IVec2Array,
            UniformSource::Vec3(_) => UniformKind::Vec3,
            UniformSource::Vec3Array(_) => UniformKind::Vec3Array,
            UniformSource::IVec3(_) => UniformKind::IVec3,
            UniformSource::IVec3Array(_) => UniformKind::IVec3Array,
            UniformSource::Vec4(_) => UniformKind::Vec4,
            UniformSource::Vec4Array(_) => UniformKind::Vec4Array,
            UniformSource::IVec4(_) => UniformKind::IVec4,
            UniformSource::IVec4Array(_) => UniformKind::IVec4Array,
            UniformSource::Mat2(_) => UniformKind::Mat2,
            UniformSource::Mat3(_) => UniformKind::Mat3,
            UniformSource::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Runs the producer against the current frame. Matrices are never transposed.
    pub fn evaluate(&self, frame: &FrameContext<'_>) -> UniformValue {
        match self {
            UniformSource::Float(f) => UniformValue::Float(f(frame)),
            UniformSource::FloatArray(f) => UniformValue::FloatArray(f(frame)),
            UniformSource::Int(f) => UniformValue::Int(f(frame)),
            UniformSource::IntArray(f) => UniformValue::IntArray(f(frame)),
            UniformSource::Vec2(f) => UniformValue::Vec2(f(frame)),
            UniformSource::Vec2Array(f) => UniformValue::Vec2Array(f(frame)),
            UniformSource::IVec2(f) => UniformValue::IVec2(f(frame)),
            UniformSource::IVec2Array(f) => UniformValue::IVec2Array(f(frame)),
            UniformSource::Vec3(f) => UniformValue::Vec3(f(frame)),
            UniformSource::Vec3Array(f) => UniformValue::Vec3Array(f(frame)),
            UniformSource::IVec3(f) => UniformValue::IVec3(f(frame)),
            UniformSource::IVec3Array(f) => UniformValue::IVec3Array(f(frame)),
            UniformSource::Vec4(f) => UniformValue::Vec4(f(frame)),
            UniformSource::Vec4Array(f) => UniformValue::Vec4Array(f(frame)),
            UniformSource::IVec4(f) => UniformValue::IVec4(f(frame)),
            UniformSource::IVec4Array(f) => UniformValue::IVec4Array(f(frame)),
            UniformSource::Mat2(f) => UniformValue::Mat2 {
                transpose: false,
                data: column_major_2(f(frame)),
            },
            UniformSource::Mat3(f) => UniformValue::Mat3 {
                transpose: false,
                data: column_major_3(f(frame)),
            },
            UniformSource::Mat4(f) => UniformValue::Mat4 {
                transpose: false,
                data: column_major_4(f(frame)),
            },
        }
    }
}

fn column_major_2(matrix: Matrix2<f32>) -> [f32; 4] {
    let data: &[f32; 4] = matrix.as_ref();
    *data
}

fn column_major_3(matrix: Matrix3<f32>) -> [f32; 9] {
    let data: &[f32; 9] = matrix.as_ref();
    *data
}

fn column_major_4(matrix: Matrix4<f32>) -> [f32; 16] {
    let data: &[f32; 16] = matrix.as_ref();
    *data
}

impl std::fmt::Debug for UniformSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UniformSource({})", self.kind().gl_name())
    }
}
