//! Shader uniforms.
//!
//! A [`Uniform`] is a cheap `Copy` view of one location inside one linked
//! program. Setting it makes the program current through the [`Context`],
//! so the upload always lands in the right program and the program binding
//! stays tracked by the state stack.

use crate::state::Context;

/// A value that can be uploaded to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    /// `int`, `bool` or sampler.
    Int(i32),
    /// `uint`
    UInt(u32),
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `vec3`
    Vec3([f32; 3]),
    /// `vec4`
    Vec4([f32; 4]),
    /// `ivec2`
    IVec2([i32; 2]),
    /// `ivec3`
    IVec3([i32; 3]),
    /// `ivec4`
    IVec4([i32; 4]),
    /// Column-major `mat3`.
    Mat3([f32; 9]),
    /// Column-major `mat4`.
    Mat4([f32; 16]),
    /// `int[]` or `sampler[]`
    IntArray(&'a [i32]),
    /// `float[]`
    FloatArray(&'a [f32]),
    /// `vec2[]`
    Vec2Array(&'a [[f32; 2]]),
    /// `vec3[]`
    Vec3Array(&'a [[f32; 3]]),
    /// `vec4[]`
    Vec4Array(&'a [[f32; 4]]),
    /// `mat4[]`
    Mat4Array(&'a [[f32; 16]]),
}

impl UniformValue<'_> {
    /// Float components of the value, flattened.
    ///
    /// Empty for integer values.
    #[must_use]
    pub fn float_components(&self) -> &[f32] {
        match self {
            Self::Float(v) => std::slice::from_ref(v),
            Self::Vec2(v) => v.as_slice(),
            Self::Vec3(v) => v.as_slice(),
            Self::Vec4(v) => v.as_slice(),
            Self::Mat3(v) => v.as_slice(),
            Self::Mat4(v) => v.as_slice(),
            Self::FloatArray(v) => *v,
            Self::Vec2Array(v) => bytemuck::cast_slice(*v),
            Self::Vec3Array(v) => bytemuck::cast_slice(*v),
            Self::Vec4Array(v) => bytemuck::cast_slice(*v),
            Self::Mat4Array(v) => bytemuck::cast_slice(*v),
            Self::Int(_)
            | Self::UInt(_)
            | Self::IVec2(_)
            | Self::IVec3(_)
            | Self::IVec4(_)
            | Self::IntArray(_) => &[],
        }
    }

    /// Signed integer components of the value, flattened.
    ///
    /// Empty for float and unsigned values.
    #[must_use]
    pub fn int_components(&self) -> &[i32] {
        match self {
            Self::Int(v) => std::slice::from_ref(v),
            Self::IVec2(v) => v.as_slice(),
            Self::IVec3(v) => v.as_slice(),
            Self::IVec4(v) => v.as_slice(),
            Self::IntArray(v) => *v,
            _ => &[],
        }
    }
}

impl From<i32> for UniformValue<'_> {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UniformValue<'_> {
    fn from(value: bool) -> Self {
        Self::Int(i32::from(value))
    }
}

impl From<u32> for UniformValue<'_> {
    fn from(value: u32) -> Self {
        Self::UInt(value)
    }
}

impl From<f32> for UniformValue<'_> {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<[f32; 2]> for UniformValue<'_> {
    fn from(value: [f32; 2]) -> Self {
        Self::Vec2(value)
    }
}

impl From<[f32; 3]> for UniformValue<'_> {
    fn from(value: [f32; 3]) -> Self {
        Self::Vec3(value)
    }
}

impl From<[f32; 4]> for UniformValue<'_> {
    fn from(value: [f32; 4]) -> Self {
        Self::Vec4(value)
    }
}

impl From<[i32; 2]> for UniformValue<'_> {
    fn from(value: [i32; 2]) -> Self {
        Self::IVec2(value)
    }
}

impl From<[i32; 3]> for UniformValue<'_> {
    fn from(value: [i32; 3]) -> Self {
        Self::IVec3(value)
    }
}

impl From<[i32; 4]> for UniformValue<'_> {
    fn from(value: [i32; 4]) -> Self {
        Self::IVec4(value)
    }
}

impl From<[f32; 9]> for UniformValue<'_> {
    fn from(value: [f32; 9]) -> Self {
        Self::Mat3(value)
    }
}

impl From<[f32; 16]> for UniformValue<'_> {
    fn from(value: [f32; 16]) -> Self {
        Self::Mat4(value)
    }
}

impl<'a> From<&'a [i32]> for UniformValue<'a> {
    fn from(value: &'a [i32]) -> Self {
        Self::IntArray(value)
    }
}

impl<'a> From<&'a [f32]> for UniformValue<'a> {
    fn from(value: &'a [f32]) -> Self {
        Self::FloatArray(value)
    }
}

impl<'a> From<&'a [[f32; 2]]> for UniformValue<'a> {
    fn from(value: &'a [[f32; 2]]) -> Self {
        Self::Vec2Array(value)
    }
}

impl<'a> From<&'a [[f32; 3]]> for UniformValue<'a> {
    fn from(value: &'a [[f32; 3]]) -> Self {
        Self::Vec3Array(value)
    }
}

impl<'a> From<&'a [[f32; 4]]> for UniformValue<'a> {
    fn from(value: &'a [[f32; 4]]) -> Self {
        Self::Vec4Array(value)
    }
}

impl<'a> From<&'a [[f32; 16]]> for UniformValue<'a> {
    fn from(value: &'a [[f32; 16]]) -> Self {
        Self::Mat4Array(value)
    }
}

/// One uniform location of a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uniform {
    program: u32,
    location: Option<u32>,
}

impl Uniform {
    pub(crate) const fn new(program: u32, location: Option<u32>) -> Self {
        Self { program, location }
    }

    /// `true` when the program actually has this uniform.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.location.is_some()
    }

    /// Native location, if any.
    #[inline]
    #[must_use]
    pub const fn location(&self) -> Option<u32> {
        self.location
    }

    /// Uploads `value`, making the owning program current first.
    ///
    /// Setting an invalid uniform does nothing.
    pub fn set<'v>(&self, ctx: &mut Context, value: impl Into<UniformValue<'v>>) {
        let Some(location) = self.location else {
            return;
        };

        ctx.use_program_name(self.program);
        ctx.gl().set_uniform(location, value.into());
    }
}
