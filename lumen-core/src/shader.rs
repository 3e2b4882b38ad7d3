//! The shader service seen by meshes and models.
//!
//! Compiling and linking programs is the caller's business. Drawing code only needs to make a
//! program current and to set uniforms by name, which is what [`Shader`] exposes.

use glam::{IVec3, Mat4, Vec2, Vec3, Vec4};

/// A value that can be assigned to a shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    IVec3(IVec3),
    Mat4(Mat4),
}

macro_rules! uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

uniform_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    IVec3 => IVec3,
    Mat4 => Mat4,
}

/// A linked shader program.
///
/// Implementations must silently ignore uniform names the program does not declare.
pub trait Shader {
    /// Makes the program current.
    fn use_program(&self);

    /// Sets the uniform called `name`.
    fn set(&self, name: &str, value: UniformValue);
}
