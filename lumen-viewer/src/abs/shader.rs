//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! Uniforms are written as [`UniformValue`]s, and [`ShaderProgram`] implements
//! [`lumen_core::Shader`] so models can draw with it.

use std::sync::Arc;

use glow::HasContext;
use lumen_core::UniformValue;

/// Human-readable name of a shader stage, for error messages.
fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "Vertex",
        glow::FRAGMENT_SHADER => "Fragment",
        glow::GEOMETRY_SHADER => "Geometry",
        _ => "Unknown",
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    ///
    /// On failure the error carries the stage and the driver's info log.
    pub fn new(gl: &Arc<glow::Context>, shader_type: u32, source: &str) -> Result<Self, String> {
        unsafe {
            let shader = gl.create_shader(shader_type).map_err(|e| e.to_string())?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(format!("{} shader failed to compile: {}", stage_name(shader_type), log));
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Writes `value` to the uniform at `location` of the current program.
unsafe fn apply_uniform(gl: &glow::Context, location: &glow::UniformLocation, value: UniformValue) {
    let location = Some(location);
    unsafe {
        match value {
            UniformValue::Bool(v) => gl.uniform_1_i32(location, v as i32),
            UniformValue::Int(v) => gl.uniform_1_i32(location, v),
            UniformValue::Float(v) => gl.uniform_1_f32(location, v),
            UniformValue::Vec2(v) => gl.uniform_2_f32(location, v.x, v.y),
            UniformValue::Vec3(v) => gl.uniform_3_f32(location, v.x, v.y, v.z),
            UniformValue::Vec4(v) => gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
            UniformValue::IVec3(v) => gl.uniform_3_i32(location, v.x, v.y, v.z),
            UniformValue::Mat4(v) => gl.uniform_matrix_4_f32_slice(location, false, v.as_ref()),
        }
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, String> {
        unsafe {
            let program = gl.create_program().map_err(|e| e.to_string())?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(log);
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
            })
        }
    }

    /// Compiles and links a program from a vertex and a fragment shader source.
    pub fn from_sources(gl: &Arc<glow::Context>, vertex: &str, fragment: &str) -> Result<Self, String> {
        let vert = Shader::new(gl, glow::VERTEX_SHADER, vertex)?;
        let frag = Shader::new(gl, glow::FRAGMENT_SHADER, fragment)?;
        ShaderProgram::new(gl, &[&vert, &frag]).map_err(|e| format!("Shader program failed to link: {}", e))
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform of the program, which must be current. Unknown names are ignored.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        unsafe {
            if let Some(location) = self.gl.get_uniform_location(self.id, name) {
                apply_uniform(&self.gl, &location, value.into());
            }
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

impl lumen_core::Shader for ShaderProgram {
    fn use_program(&self) {
        ShaderProgram::use_program(self);
    }

    fn set(&self, name: &str, value: UniformValue) {
        self.set_uniform(name, value);
    }
}
