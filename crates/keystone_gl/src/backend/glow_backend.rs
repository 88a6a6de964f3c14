//! OpenGL backend on top of `glow`.
//!
//! The only place in the crate that talks to the driver.

// Every glow entry point is unsafe: the caller promises a current context on
// this thread. `GlowBackend` is `!Send` through the `Rc` it lives in, so that
// promise holds for as long as the context made current at startup stays so.
#![allow(unsafe_code)]

use std::num::NonZeroU32;

use glow::HasContext;

use super::GlBackend;
use crate::debug::DebugMessage;
use crate::uniform::UniformValue;

/// Native backend wrapping a loaded `glow::Context`.
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// Wraps a context that is current on the calling thread.
    #[must_use]
    pub fn new(gl: glow::Context) -> Self {
        tracing::info!("OpenGL backend: {}", gl.version().vendor_info);
        Self { gl }
    }

    /// The wrapped `glow` context.
    #[must_use]
    pub fn raw(&self) -> &glow::Context {
        &self.gl
    }
}

impl std::fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowBackend").finish_non_exhaustive()
    }
}

#[inline]
fn name_of(raw: NonZeroU32) -> u32 {
    raw.get()
}

/// Logs a failed allocation and maps it to the null name.
fn created<T>(result: Result<T, String>, what: &str, into_name: impl FnOnce(T) -> u32) -> u32 {
    match result {
        Ok(object) => into_name(object),
        Err(message) => {
            tracing::warn!("failed to create {what}: {message}");
            0
        }
    }
}

#[inline]
fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl GlBackend for GlowBackend {
    fn create_buffer(&self) -> u32 {
        created(unsafe { self.gl.create_buffer() }, "buffer", |b| name_of(b.0))
    }

    fn delete_buffer(&self, name: u32) {
        if let Some(raw) = NonZeroU32::new(name) {
            unsafe { self.gl.delete_buffer(glow::NativeBuffer(raw)) };
        }
    }

    fn bind_buffer(&self, target: u32, name: u32) {
        unsafe { self.gl.bind_buffer(target, NonZeroU32::new(name).map(glow::NativeBuffer)) };
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) };
    }

    fn buffer_data_size(&self, target: u32, size: usize, usage: u32) {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        unsafe { self.gl.buffer_data_size(target, size, usage) };
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        let offset = i32::try_from(offset).unwrap_or(i32::MAX);
        unsafe { self.gl.buffer_sub_data_u8_slice(target, offset, data) };
    }

    fn create_texture(&self) -> u32 {
        created(unsafe { self.gl.create_texture() }, "texture", |t| name_of(t.0))
    }

    fn delete_texture(&self, name: u32) {
        if let Some(raw) = NonZeroU32::new(name) {
            unsafe { self.gl.delete_texture(glow::NativeTexture(raw)) };
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture(&self, target: u32, name: u32) {
        unsafe { self.gl.bind_texture(target, NonZeroU32::new(name).map(glow::NativeTexture)) };
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) };
    }

    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32) {
        unsafe { self.gl.tex_parameter_f32(target, parameter, value) };
    }

    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                0,
                clamp_i32(internal_format),
                clamp_i32(width),
                clamp_i32(height),
                0,
                format,
                data_type,
                glow::PixelUnpackData::Slice(pixels),
            );
        }
    }

    fn tex_image_2d_multisample(
        &self,
        target: u32,
        samples: u32,
        internal_format: u32,
        width: u32,
        height: u32,
    ) {
        unsafe {
            self.gl.tex_image_2d_multisample(
                target,
                clamp_i32(samples),
                clamp_i32(internal_format),
                clamp_i32(width),
                clamp_i32(height),
                true,
            );
        }
    }

    fn tex_storage_3d(&self, target: u32, levels: u32, internal_format: u32, width: u32, height: u32, depth: u32) {
        unsafe {
            self.gl.tex_storage_3d(
                target,
                clamp_i32(levels),
                internal_format,
                clamp_i32(width),
                clamp_i32(height),
                clamp_i32(depth),
            );
        }
    }

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
    ) {
        unsafe {
            self.gl.tex_image_3d(
                target,
                0,
                clamp_i32(internal_format),
                clamp_i32(width),
                clamp_i32(height),
                clamp_i32(depth),
                0,
                format,
                data_type,
                glow::PixelUnpackData::Slice(pixels),
            );
        }
    }

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
    ) {
        unsafe {
            self.gl.tex_sub_image_3d(
                target,
                0,
                0,
                0,
                clamp_i32(z_offset),
                clamp_i32(width),
                clamp_i32(height),
                clamp_i32(depth),
                format,
                data_type,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn generate_mipmap(&self, target: u32) {
        unsafe { self.gl.generate_mipmap(target) };
    }

    fn create_renderbuffer(&self) -> u32 {
        created(unsafe { self.gl.create_renderbuffer() }, "renderbuffer", |r| name_of(r.0))
    }

    fn delete_renderbuffer(&self, name: u32) {
        if let Some(raw) = NonZeroU32::new(name) {
            unsafe { self.gl.delete_renderbuffer(glow::NativeRenderbuffer(raw)) };
        }
    }

    fn bind_renderbuffer(&self, name: u32) {
        unsafe {
            self.gl
                .bind_renderbuffer(glow::RENDERBUFFER, NonZeroU32::new(name).map(glow::NativeRenderbuffer));
        }
    }

    fn renderbuffer_storage(&self, internal_format: u32, width: u32, height: u32) {
        unsafe {
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                internal_format,
                clamp_i32(width),
                clamp_i32(height),
            );
        }
    }

    fn renderbuffer_storage_multisample(
        &self,
        samples: u32,
        internal_format: u32,
        width: u32,
        height: u32,
    ) {
        unsafe {
            self.gl.renderbuffer_storage_multisample(
                glow::RENDERBUFFER,
                clamp_i32(samples),
                internal_format,
                clamp_i32(width),
                clamp_i32(height),
            );
        }
    }

    fn create_framebuffer(&self) -> u32 {
        created(unsafe { self.gl.create_framebuffer() }, "framebuffer", |f| name_of(f.0))
    }

    fn delete_framebuffer(&self, name: u32) {
        if let Some(raw) = NonZeroU32::new(name) {
            unsafe { self.gl.delete_framebuffer(glow::NativeFramebuffer(raw)) };
        }
    }

    fn bind_framebuffer(&self, target: u32, name: u32) {
        unsafe {
            self.gl
                .bind_framebuffer(target, NonZeroU32::new(name).map(glow::NativeFramebuffer));
        }
    }

    fn framebuffer_texture_2d(&self, target: u32, attachment: u32, texture_target: u32, texture: u32) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                target,
                attachment,
                texture_target,
                NonZeroU32::new(texture).map(glow::NativeTexture),
                0,
            );
        }
    }

    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, renderbuffer: u32) {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                target,
                attachment,
                glow::RENDERBUFFER,
                NonZeroU32::new(renderbuffer).map(glow::NativeRenderbuffer),
            );
        }
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { self.gl.check_framebuffer_status(target) }
    }

    fn draw_buffers(&self, buffers: &[u32]) {
        unsafe { self.gl.draw_buffers(buffers) };
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) };
    }

    fn blit_framebuffer(&self, source: [i32; 4], destination: [i32; 4], mask: u32, filter: u32) {
        let [sx0, sy0, sx1, sy1] = source;
        let [dx0, dy0, dx1, dy1] = destination;
        unsafe {
            self.gl
                .blit_framebuffer(sx0, sy0, sx1, sy1, dx0, dy0, dx1, dy1, mask, filter);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, clamp_i32(width), clamp_i32(height)) };
    }

    fn create_vertex_array(&self) -> u32 {
        created(unsafe { self.gl.create_vertex_array() }, "vertex array", |v| name_of(v.0))
    }

    fn delete_vertex_array(&self, name: u32) {
        if let Some(raw) = NonZeroU32::new(name) {
            unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(raw)) };
        }
    }

    fn bind_vertex_array(&self, name: u32) {
        unsafe {
            self.gl
                .bind_vertex_array(NonZeroU32::new(name).map(glow::NativeVertexArray));
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset);
        }
    }

    fn vertex_attrib_pointer_integer(&self, index: u32, size: i32, data_type: u32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_i32(index, size, data_type, stride, offset);
        }
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        unsafe { self.gl.vertex_attrib_divisor(index, divisor) };
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32, instances: i32) {
        unsafe {
            if instances == 1 {
                self.gl.draw_arrays(mode, first, count);
            } else {
                self.gl.draw_arrays_instanced(mode, first, count, instances);
            }
        }
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32, instances: i32) {
        unsafe {
            if instances == 1 {
                self.gl.draw_elements(mode, count, index_type, offset);
            } else {
                self.gl
                    .draw_elements_instanced(mode, count, index_type, offset, instances);
            }
        }
    }

    fn create_shader(&self, kind: u32) -> u32 {
        created(unsafe { self.gl.create_shader(kind) }, "shader", |s| name_of(s.0))
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(raw) = NonZeroU32::new(shader) {
            unsafe { self.gl.shader_source(glow::NativeShader(raw), source) };
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(raw) = NonZeroU32::new(shader) {
            unsafe { self.gl.compile_shader(glow::NativeShader(raw)) };
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        NonZeroU32::new(shader)
            .is_some_and(|raw| unsafe { self.gl.get_shader_compile_status(glow::NativeShader(raw)) })
    }

    fn shader_info_log(&self, shader: u32) -> String {
        NonZeroU32::new(shader)
            .map(|raw| unsafe { self.gl.get_shader_info_log(glow::NativeShader(raw)) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(raw) = NonZeroU32::new(shader) {
            unsafe { self.gl.delete_shader(glow::NativeShader(raw)) };
        }
    }

    fn create_program(&self) -> u32 {
        created(unsafe { self.gl.create_program() }, "program", |p| name_of(p.0))
    }

    fn delete_program(&self, program: u32) {
        if let Some(raw) = NonZeroU32::new(program) {
            unsafe { self.gl.delete_program(glow::NativeProgram(raw)) };
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (NonZeroU32::new(program), NonZeroU32::new(shader)) {
            unsafe {
                self.gl
                    .attach_shader(glow::NativeProgram(program), glow::NativeShader(shader));
            }
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (NonZeroU32::new(program), NonZeroU32::new(shader)) {
            unsafe {
                self.gl
                    .detach_shader(glow::NativeProgram(program), glow::NativeShader(shader));
            }
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(raw) = NonZeroU32::new(program) {
            unsafe { self.gl.link_program(glow::NativeProgram(raw)) };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        NonZeroU32::new(program)
            .is_some_and(|raw| unsafe { self.gl.get_program_link_status(glow::NativeProgram(raw)) })
    }

    fn program_info_log(&self, program: u32) -> String {
        NonZeroU32::new(program)
            .map(|raw| unsafe { self.gl.get_program_info_log(glow::NativeProgram(raw)) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: u32) {
        unsafe { self.gl.use_program(NonZeroU32::new(program).map(glow::NativeProgram)) };
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let program = glow::NativeProgram(NonZeroU32::new(program)?);
        unsafe { self.gl.get_uniform_location(program, name) }.map(|location| location.0)
    }

    fn set_uniform(&self, location: u32, value: UniformValue<'_>) {
        let location = glow::NativeUniformLocation(location);
        let location = Some(&location);

        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::UInt(v) => self.gl.uniform_1_u32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(location, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(location, x, y, z, w),
                UniformValue::IVec2([x, y]) => self.gl.uniform_2_i32(location, x, y),
                UniformValue::IVec3([x, y, z]) => self.gl.uniform_3_i32(location, x, y, z),
                UniformValue::IVec4([x, y, z, w]) => self.gl.uniform_4_i32(location, x, y, z, w),
                UniformValue::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(location, false, &m),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
                UniformValue::IntArray(v) => self.gl.uniform_1_i32_slice(location, v),
                UniformValue::FloatArray(v) => self.gl.uniform_1_f32_slice(location, v),
                UniformValue::Vec2Array(v) => {
                    self.gl.uniform_2_f32_slice(location, bytemuck::cast_slice(v));
                }
                UniformValue::Vec3Array(v) => {
                    self.gl.uniform_3_f32_slice(location, bytemuck::cast_slice(v));
                }
                UniformValue::Vec4Array(v) => {
                    self.gl.uniform_4_f32_slice(location, bytemuck::cast_slice(v));
                }
                UniformValue::Mat4Array(v) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(location, false, bytemuck::cast_slice(v));
                }
            }
        }
    }

    fn enable(&self, capability: u32) {
        unsafe { self.gl.enable(capability) };
    }

    fn disable(&self, capability: u32) {
        unsafe { self.gl.disable(capability) };
    }

    fn is_enabled(&self, capability: u32) -> bool {
        unsafe { self.gl.is_enabled(capability) }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.clear_color(red, green, blue, alpha) };
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        unsafe { self.gl.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha) };
    }

    fn depth_func(&self, function: u32) {
        unsafe { self.gl.depth_func(function) };
    }

    fn cull_face(&self, mode: u32) {
        unsafe { self.gl.cull_face(mode) };
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        unsafe { self.gl.color_mask(red, green, blue, alpha) };
    }

    fn depth_mask(&self, mask: bool) {
        unsafe { self.gl.depth_mask(mask) };
    }

    fn stencil_func(&self, function: u32, reference: i32, mask: u32) {
        unsafe { self.gl.stencil_func(function, reference, mask) };
    }

    fn stencil_mask(&self, mask: u32) {
        unsafe { self.gl.stencil_mask(mask) };
    }

    fn stencil_op(&self, stencil_fail: u32, depth_fail: u32, pass: u32) {
        unsafe { self.gl.stencil_op(stencil_fail, depth_fail, pass) };
    }

    fn scissor(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.scissor(x, y, clamp_i32(width), clamp_i32(height)) };
    }

    fn enable_debug_output(&self) -> bool {
        let flags = unsafe { self.gl.get_parameter_i32(glow::CONTEXT_FLAGS) };
        if u32::try_from(flags).unwrap_or(0) & glow::CONTEXT_FLAG_DEBUG_BIT == 0 {
            return false;
        }

        unsafe {
            self.gl.enable(glow::DEBUG_OUTPUT);
            self.gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
            self.gl
                .debug_message_control(glow::DONT_CARE, glow::DONT_CARE, glow::DONT_CARE, &[], true);
        }
        true
    }

    fn debug_messages(&self, max: u32) -> Vec<DebugMessage> {
        unsafe { self.gl.get_debug_message_log(max) }
            .into_iter()
            .map(|entry| DebugMessage::from_raw(entry.source, entry.msg_type, entry.id, entry.severity, entry.message))
            .collect()
    }

    fn get_parameter_i32(&self, parameter: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(parameter) }
    }

    fn get_parameter_f32(&self, parameter: u32) -> f32 {
        unsafe { self.gl.get_parameter_f32(parameter) }
    }
}
