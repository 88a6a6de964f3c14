//! # Native Backends
//!
//! Every native GL call in the crate goes through [`GlBackend`]. Objects are
//! addressed by their raw `u32` names; 0 always means "nothing", so binding
//! name 0 unbinds and deleting name 0 never reaches the driver.
//!
//! ```text
//! ┌─────────┐   bind_*/set_*   ┌─────────┐   raw calls   ┌──────────────────┐
//! │ Context │ ───────────────→ │ overlay │ ────────────→ │ dyn GlBackend    │
//! └─────────┘   (idempotent)   └─────────┘  (only diffs) │ ├ GlowBackend    │
//!                                                        │ └ RecordingBackend│
//!                                                        └──────────────────┘
//! ```

mod glow_backend;
mod recording;

pub use glow_backend::GlowBackend;
pub use recording::{GlCall, RecordingBackend, SimulatedState};

use crate::debug::DebugMessage;
use crate::uniform::UniformValue;

/// Raw OpenGL entry points used by the state layer and resource objects.
///
/// All methods take `&self`: the GL context is global mutable state owned by
/// the driver, not by this object.
pub trait GlBackend {
    // === BUFFERS ===

    /// Generates a buffer name, 0 on failure.
    fn create_buffer(&self) -> u32;
    /// Deletes a buffer name.
    fn delete_buffer(&self, name: u32);
    /// `glBindBuffer`.
    fn bind_buffer(&self, target: u32, name: u32);
    /// `glBufferData` with initial contents.
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    /// `glBufferData` with uninitialized storage.
    fn buffer_data_size(&self, target: u32, size: usize, usage: u32);
    /// `glBufferSubData`.
    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]);

    // === TEXTURES ===

    /// Generates a texture name, 0 on failure.
    fn create_texture(&self) -> u32;
    /// Deletes a texture name.
    fn delete_texture(&self, name: u32);
    /// `glActiveTexture(GL_TEXTURE0 + unit)`.
    fn active_texture(&self, unit: u32);
    /// `glBindTexture` on the active unit.
    fn bind_texture(&self, target: u32, name: u32);
    /// `glTexParameteri`.
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    /// `glTexParameterf`.
    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32);
    /// `glTexImage2D`.
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    );
    /// `glTexImage2DMultisample`.
    fn tex_image_2d_multisample(
        &self,
        target: u32,
        samples: u32,
        internal_format: u32,
        width: u32,
        height: u32,
    );
    /// `glTexStorage3D`.
    fn tex_storage_3d(&self, target: u32, levels: u32, internal_format: u32, width: u32, height: u32, depth: u32);
    /// `glTexImage3D` at level 0.
    #[allow(clippy::too_many_arguments)]
    fn tex_image_3d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        depth: u32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    );
    /// `glTexSubImage3D` at level 0, starting at `(0, 0, z_offset)`.
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_3d(
        &self,
        target: u32,
        z_offset: u32,
        width: u32,
        height: u32,
        depth: u32,
        format: u32,
        data_type: u32,
        pixels: &[u8],
    );
    /// `glGenerateMipmap`.
    fn generate_mipmap(&self, target: u32);

    // === RENDERBUFFERS ===

    /// Generates a renderbuffer name, 0 on failure.
    fn create_renderbuffer(&self) -> u32;
    /// Deletes a renderbuffer name.
    fn delete_renderbuffer(&self, name: u32);
    /// `glBindRenderbuffer(GL_RENDERBUFFER, name)`.
    fn bind_renderbuffer(&self, name: u32);
    /// `glRenderbufferStorage`.
    fn renderbuffer_storage(&self, internal_format: u32, width: u32, height: u32);
    /// `glRenderbufferStorageMultisample`.
    fn renderbuffer_storage_multisample(
        &self,
        samples: u32,
        internal_format: u32,
        width: u32,
        height: u32,
    );

    // === FRAMEBUFFERS ===

    /// Generates a framebuffer name, 0 on failure.
    fn create_framebuffer(&self) -> u32;
    /// Deletes a framebuffer name.
    fn delete_framebuffer(&self, name: u32);
    /// `glBindFramebuffer`.
    fn bind_framebuffer(&self, target: u32, name: u32);
    /// `glFramebufferTexture2D` at level 0.
    fn framebuffer_texture_2d(&self, target: u32, attachment: u32, texture_target: u32, texture: u32);
    /// `glFramebufferRenderbuffer`.
    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, renderbuffer: u32);
    /// `glCheckFramebufferStatus`.
    fn check_framebuffer_status(&self, target: u32) -> u32;
    /// `glDrawBuffers`.
    fn draw_buffers(&self, buffers: &[u32]);
    /// `glClear`.
    fn clear(&self, mask: u32);
    /// `glBlitFramebuffer`; rectangles are `[x0, y0, x1, y1]`.
    fn blit_framebuffer(&self, source: [i32; 4], destination: [i32; 4], mask: u32, filter: u32);
    /// `glViewport`.
    fn viewport(&self, x: i32, y: i32, width: u32, height: u32);

    // === VERTEX ARRAYS ===

    /// Generates a vertex array name, 0 on failure.
    fn create_vertex_array(&self) -> u32;
    /// Deletes a vertex array name.
    fn delete_vertex_array(&self, name: u32);
    /// `glBindVertexArray`.
    fn bind_vertex_array(&self, name: u32);
    /// `glEnableVertexAttribArray`.
    fn enable_vertex_attrib_array(&self, index: u32);
    /// `glVertexAttribPointer`.
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    /// `glVertexAttribIPointer`.
    fn vertex_attrib_pointer_integer(&self, index: u32, size: i32, data_type: u32, stride: i32, offset: i32);
    /// `glVertexAttribDivisor`.
    fn vertex_attrib_divisor(&self, index: u32, divisor: u32);
    /// `glDrawArrays` or `glDrawArraysInstanced`.
    fn draw_arrays(&self, mode: u32, first: i32, count: i32, instances: i32);
    /// `glDrawElements` or `glDrawElementsInstanced`.
    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32, instances: i32);

    // === SHADERS & PROGRAMS ===

    /// Creates a shader object, 0 on failure.
    fn create_shader(&self, kind: u32) -> u32;
    /// `glShaderSource`.
    fn shader_source(&self, shader: u32, source: &str);
    /// `glCompileShader`.
    fn compile_shader(&self, shader: u32);
    /// `GL_COMPILE_STATUS`.
    fn shader_compile_status(&self, shader: u32) -> bool;
    /// Shader info log.
    fn shader_info_log(&self, shader: u32) -> String;
    /// Deletes a shader object.
    fn delete_shader(&self, shader: u32);
    /// Creates a program object, 0 on failure.
    fn create_program(&self) -> u32;
    /// Deletes a program object.
    fn delete_program(&self, program: u32);
    /// `glAttachShader`.
    fn attach_shader(&self, program: u32, shader: u32);
    /// `glDetachShader`.
    fn detach_shader(&self, program: u32, shader: u32);
    /// `glLinkProgram`.
    fn link_program(&self, program: u32);
    /// `GL_LINK_STATUS`.
    fn program_link_status(&self, program: u32) -> bool;
    /// Program info log.
    fn program_info_log(&self, program: u32) -> String;
    /// `glUseProgram`.
    fn use_program(&self, program: u32);
    /// `glGetUniformLocation`; `None` when the program has no such uniform.
    fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;
    /// `glUniform*` on the program currently in use.
    fn set_uniform(&self, location: u32, value: UniformValue<'_>);

    // === CAPABILITIES ===

    /// `glEnable`.
    fn enable(&self, capability: u32);
    /// `glDisable`.
    fn disable(&self, capability: u32);
    /// `glIsEnabled`.
    fn is_enabled(&self, capability: u32) -> bool;

    // === FIXED FUNCTIONS ===

    /// `glClearColor`.
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    /// `glBlendFuncSeparate`.
    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    /// `glDepthFunc`.
    fn depth_func(&self, function: u32);
    /// `glCullFace`.
    fn cull_face(&self, mode: u32);
    /// `glColorMask`.
    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool);
    /// `glDepthMask`.
    fn depth_mask(&self, mask: bool);
    /// `glStencilFunc`.
    fn stencil_func(&self, function: u32, reference: i32, mask: u32);
    /// `glStencilMask`.
    fn stencil_mask(&self, mask: u32);
    /// `glStencilOp`.
    fn stencil_op(&self, stencil_fail: u32, depth_fail: u32, pass: u32);
    /// `glScissor`.
    fn scissor(&self, x: i32, y: i32, width: u32, height: u32);

    // === DEBUG OUTPUT ===

    /// Enables synchronous `GL_DEBUG_OUTPUT` for every message. `false`
    /// when the context was not created with the debug flag.
    fn enable_debug_output(&self) -> bool;
    /// Takes up to `max` messages off the driver's debug log, oldest first.
    fn debug_messages(&self, max: u32) -> Vec<DebugMessage>;

    // === QUERIES ===

    /// `glGetIntegerv` for a single value.
    fn get_parameter_i32(&self, parameter: u32) -> i32;
    /// `glGetFloatv` for a single value.
    fn get_parameter_f32(&self, parameter: u32) -> f32;
}
