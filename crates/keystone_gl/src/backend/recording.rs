//! Headless backend.
//!
//! Records every call and keeps a simulated copy of the GPU state the calls
//! would produce. Tests compare [`SimulatedState`] snapshots to check that a
//! pop really undid what its frame changed on the "GPU", not only in the
//! overlay bookkeeping.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::Mutex;

use super::GlBackend;
use crate::debug::DebugMessage;
use crate::uniform::UniformValue;

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum GlCall {
    CreateObject { name: u32 },
    DeleteObject { name: u32 },
    BindBuffer { target: u32, name: u32 },
    BufferData { target: u32, size: usize, usage: u32 },
    BufferSubData { target: u32, offset: usize, size: usize },
    ActiveTexture { unit: u32 },
    BindTexture { target: u32, name: u32 },
    TexParameterI32 { target: u32, parameter: u32, value: i32 },
    TexParameterF32 { target: u32, parameter: u32, value: f32 },
    TexImage2D { target: u32, internal_format: u32, width: u32, height: u32 },
    TexImage2DMultisample { target: u32, samples: u32, width: u32, height: u32 },
    TexStorage3D { target: u32, internal_format: u32, width: u32, height: u32, depth: u32 },
    TexImage3D { target: u32, internal_format: u32, width: u32, height: u32, depth: u32 },
    TexSubImage3D { target: u32, z_offset: u32, width: u32, height: u32, depth: u32, size: usize },
    GenerateMipmap { target: u32 },
    BindRenderbuffer { name: u32 },
    RenderbufferStorage { internal_format: u32, samples: u32, width: u32, height: u32 },
    BindFramebuffer { target: u32, name: u32 },
    FramebufferTexture2D { attachment: u32, texture: u32 },
    FramebufferRenderbuffer { attachment: u32, renderbuffer: u32 },
    DrawBuffers { buffers: Vec<u32> },
    Clear { mask: u32 },
    BlitFramebuffer { source: [i32; 4], destination: [i32; 4], mask: u32, filter: u32 },
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    BindVertexArray { name: u32 },
    EnableVertexAttribArray { index: u32 },
    VertexAttribPointer { index: u32, size: i32, data_type: u32, integer: bool, stride: i32, offset: i32 },
    VertexAttribDivisor { index: u32, divisor: u32 },
    DrawArrays { mode: u32, first: i32, count: i32, instances: i32 },
    DrawElements { mode: u32, count: i32, index_type: u32, offset: i32, instances: i32 },
    CompileShader { shader: u32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    UseProgram { program: u32 },
    SetUniform { location: u32, floats: Vec<f32>, ints: Vec<i32> },
    Enable { capability: u32 },
    Disable { capability: u32 },
    ClearColor { color: [f32; 4] },
    BlendFuncSeparate { factors: [u32; 4] },
    DepthFunc { function: u32 },
    CullFace { mode: u32 },
    ColorMask { mask: [bool; 4] },
    DepthMask { mask: bool },
    StencilFunc { function: u32, reference: i32, mask: u32 },
    StencilMask { mask: u32 },
    StencilOp { actions: [u32; 3] },
    Scissor { x: i32, y: i32, width: u32, height: u32 },
    EnableDebugOutput { granted: bool },
}

/// The GPU state a sequence of calls leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedState {
    /// Non-zero buffer bindings by target.
    pub buffers: BTreeMap<u32, u32>,
    /// Draw framebuffer binding.
    pub draw_framebuffer: u32,
    /// Read framebuffer binding.
    pub read_framebuffer: u32,
    /// Renderbuffer binding.
    pub renderbuffer: u32,
    /// Active texture unit.
    pub active_texture: u32,
    /// Non-zero texture bindings by (unit, target).
    pub textures: BTreeMap<(u32, u32), u32>,
    /// Vertex array binding.
    pub vertex_array: u32,
    /// Program in use.
    pub program: u32,
    /// Viewport rectangle.
    pub viewport: (i32, i32, u32, u32),
    /// Enabled capabilities.
    pub enabled: BTreeSet<u32>,
    /// Clear color.
    pub clear_color: [f32; 4],
    /// Blend factors (src rgb, dst rgb, src alpha, dst alpha).
    pub blend: [u32; 4],
    /// Depth comparison.
    pub depth_func: u32,
    /// Culled facet.
    pub cull_face: u32,
    /// Color write mask.
    pub color_mask: [bool; 4],
    /// Depth write mask.
    pub depth_mask: bool,
    /// Stencil function, reference and mask.
    pub stencil_func: (u32, i32, u32),
    /// Stencil write mask.
    pub stencil_mask: u32,
    /// Stencil actions.
    pub stencil_op: [u32; 3],
    /// Scissor rectangle.
    pub scissor: (i32, i32, u32, u32),
}

impl SimulatedState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            buffers: BTreeMap::new(),
            draw_framebuffer: 0,
            read_framebuffer: 0,
            renderbuffer: 0,
            active_texture: 0,
            textures: BTreeMap::new(),
            vertex_array: 0,
            program: 0,
            viewport: (0, 0, width, height),
            enabled: std::iter::once(glow::MULTISAMPLE).collect(),
            clear_color: [0.0; 4],
            blend: [glow::ONE, glow::ZERO, glow::ONE, glow::ZERO],
            depth_func: glow::LESS,
            cull_face: glow::BACK,
            color_mask: [true; 4],
            depth_mask: true,
            stencil_func: (glow::ALWAYS, 0, 0xFF),
            stencil_mask: 0xFF,
            stencil_op: [glow::KEEP; 3],
            scissor: (0, 0, width, height),
        }
    }

    /// Texture bound to `target` on `unit`, 0 if none.
    #[must_use]
    pub fn texture(&self, unit: u32, target: u32) -> u32 {
        self.textures.get(&(unit, target)).copied().unwrap_or(0)
    }

    /// Buffer bound to `target`, 0 if none.
    #[must_use]
    pub fn buffer(&self, target: u32) -> u32 {
        self.buffers.get(&target).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
struct Recorder {
    calls: Vec<GlCall>,
    state: SimulatedState,
    live: BTreeSet<u32>,
    next_name: u32,
    debug_output: bool,
    debug_log: Vec<DebugMessage>,
}

/// Backend that executes nothing and remembers everything.
#[derive(Debug)]
pub struct RecordingBackend {
    inner: Mutex<Recorder>,
    fail_compile: bool,
    fail_link: bool,
    framebuffer_status: u32,
    max_vertex_attribs: i32,
    max_anisotropy: f32,
    uniforms: HashMap<String, u32>,
    debug_context: bool,
}

impl RecordingBackend {
    /// Headless backend with an 800x600 default framebuffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_viewport(800, 600)
    }

    /// Headless backend with the given default framebuffer size.
    #[must_use]
    pub fn with_viewport(width: u32, height: u32) -> Self {
        Self {
            inner: Mutex::new(Recorder {
                calls: Vec::new(),
                state: SimulatedState::new(width, height),
                live: BTreeSet::new(),
                next_name: 1,
                debug_output: false,
                debug_log: Vec::new(),
            }),
            fail_compile: false,
            fail_link: false,
            framebuffer_status: glow::FRAMEBUFFER_COMPLETE,
            max_vertex_attribs: 16,
            max_anisotropy: 16.0,
            uniforms: HashMap::new(),
            debug_context: false,
        }
    }

    /// Every shader fails to compile.
    #[must_use]
    pub fn failing_compile(mut self) -> Self {
        self.fail_compile = true;
        self
    }

    /// Every program fails to link.
    #[must_use]
    pub fn failing_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    /// Every framebuffer reports `GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT`.
    #[must_use]
    pub fn incomplete_framebuffers(mut self) -> Self {
        self.framebuffer_status = glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT;
        self
    }

    /// Overrides `GL_MAX_VERTEX_ATTRIBS`.
    #[must_use]
    pub fn with_max_vertex_attribs(mut self, max: i32) -> Self {
        self.max_vertex_attribs = max;
        self
    }

    /// Declares uniforms every linked program exposes; locations follow
    /// declaration order.
    #[must_use]
    pub fn with_uniforms(mut self, names: &[&str]) -> Self {
        self.uniforms = names
            .iter()
            .zip(0_u32..)
            .map(|(name, location)| ((*name).to_owned(), location))
            .collect();
        self
    }

    /// Behaves like a context created with the debug flag.
    #[must_use]
    pub fn with_debug_context(mut self) -> Self {
        self.debug_context = true;
        self
    }

    /// Queues a driver message. Dropped unless debug output is enabled,
    /// like a real driver would.
    pub fn push_debug_message(&self, message: DebugMessage) {
        let mut inner = self.inner.lock();
        if inner.debug_output {
            inner.debug_log.push(message);
        }
    }

    /// Messages queued and not yet taken.
    #[must_use]
    pub fn pending_debug_messages(&self) -> usize {
        self.inner.lock().debug_log.len()
    }

    /// Copy of the call log.
    #[must_use]
    pub fn calls(&self) -> Vec<GlCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    /// Forgets the call log, keeping the simulated state.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Snapshot of the simulated GPU state.
    #[must_use]
    pub fn state(&self) -> SimulatedState {
        self.inner.lock().state.clone()
    }

    /// `true` while `name` has been created and not deleted.
    #[must_use]
    pub fn is_live(&self, name: u32) -> bool {
        self.inner.lock().live.contains(&name)
    }

    fn record(&self, call: GlCall) {
        self.inner.lock().calls.push(call);
    }

    fn record_with(&self, call: GlCall, update: impl FnOnce(&mut SimulatedState)) {
        let mut inner = self.inner.lock();
        update(&mut inner.state);
        inner.calls.push(call);
    }

    fn generate(&self) -> u32 {
        let mut inner = self.inner.lock();
        let name = inner.next_name;
        inner.next_name += 1;
        inner.live.insert(name);
        inner.calls.push(GlCall::CreateObject { name });
        name
    }

    fn delete(&self, name: u32) {
        let mut inner = self.inner.lock();
        inner.live.remove(&name);
        inner.calls.push(GlCall::DeleteObject { name });
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlBackend for RecordingBackend {
    fn create_buffer(&self) -> u32 {
        self.generate()
    }

    fn delete_buffer(&self, name: u32) {
        self.delete(name);
    }

    fn bind_buffer(&self, target: u32, name: u32) {
        self.record_with(GlCall::BindBuffer { target, name }, |state| {
            if name == 0 {
                state.buffers.remove(&target);
            } else {
                state.buffers.insert(target, name);
            }
        });
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.record(GlCall::BufferData { target, size: data.len(), usage });
    }

    fn buffer_data_size(&self, target: u32, size: usize, usage: u32) {
        self.record(GlCall::BufferData { target, size, usage });
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        self.record(GlCall::BufferSubData { target, offset, size: data.len() });
    }

    fn create_texture(&self) -> u32 {
        self.generate()
    }

    fn delete_texture(&self, name: u32) {
        self.delete(name);
    }

    fn active_texture(&self, unit: u32) {
        self.record_with(GlCall::ActiveTexture { unit }, |state| state.active_texture = unit);
    }

    fn bind_texture(&self, target: u32, name: u32) {
        self.record_with(GlCall::BindTexture { target, name }, |state| {
            let key = (state.active_texture, target);
            if name == 0 {
                state.textures.remove(&key);
            } else {
                state.textures.insert(key, name);
            }
        });
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        self.record(GlCall::TexParameterI32 { target, parameter, value });
    }

    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32) {
        self.record(GlCall::TexParameterF32 { target, parameter, value });
    }

    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        _format: u32,
        _data_type: u32,
        _pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D { target, internal_format, width, height });
    }

    fn tex_image_2d_multisample(
        &self,
        target: u32,
        samples: u32,
        _internal_format: u32,
        width: u32,
        height: u32,
    ) {
        self.record(GlCall::TexImage2DMultisample { target, samples, width, height });
    }

    fn tex_storage_3d(&self, target: u32, _levels: u32, internal_format: u32, width: u32, height: u32, depth: u32) {
        self.record(GlCall::TexStorage3D { target, internal_format, width, height, depth });
    }

    fn tex_image_3d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        depth: u32,
        _format: u32,
        _data_type: u32,
        _pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage3D { target, internal_format, width, height, depth });
    }

    fn tex_sub_image_3d(
        &self,
        target: u32,
        z_offset: u32,
        width: u32,
        height: u32,
        depth: u32,
        _format: u32,
        _data_type: u32,
        pixels: &[u8],
    ) {
        self.record(GlCall::TexSubImage3D {
            target,
            z_offset,
            width,
            height,
            depth,
            size: pixels.len(),
        });
    }

    fn generate_mipmap(&self, target: u32) {
        self.record(GlCall::GenerateMipmap { target });
    }

    fn create_renderbuffer(&self) -> u32 {
        self.generate()
    }

    fn delete_renderbuffer(&self, name: u32) {
        self.delete(name);
    }

    fn bind_renderbuffer(&self, name: u32) {
        self.record_with(GlCall::BindRenderbuffer { name }, |state| state.renderbuffer = name);
    }

    fn renderbuffer_storage(&self, internal_format: u32, width: u32, height: u32) {
        self.record(GlCall::RenderbufferStorage { internal_format, samples: 0, width, height });
    }

    fn renderbuffer_storage_multisample(
        &self,
        samples: u32,
        internal_format: u32,
        width: u32,
        height: u32,
    ) {
        self.record(GlCall::RenderbufferStorage { internal_format, samples, width, height });
    }

    fn create_framebuffer(&self) -> u32 {
        self.generate()
    }

    fn delete_framebuffer(&self, name: u32) {
        self.delete(name);
    }

    fn bind_framebuffer(&self, target: u32, name: u32) {
        self.record_with(GlCall::BindFramebuffer { target, name }, |state| match target {
            glow::DRAW_FRAMEBUFFER => state.draw_framebuffer = name,
            glow::READ_FRAMEBUFFER => state.read_framebuffer = name,
            _ => {
                state.draw_framebuffer = name;
                state.read_framebuffer = name;
            }
        });
    }

    fn framebuffer_texture_2d(&self, _target: u32, attachment: u32, _texture_target: u32, texture: u32) {
        self.record(GlCall::FramebufferTexture2D { attachment, texture });
    }

    fn framebuffer_renderbuffer(&self, _target: u32, attachment: u32, renderbuffer: u32) {
        self.record(GlCall::FramebufferRenderbuffer { attachment, renderbuffer });
    }

    fn check_framebuffer_status(&self, _target: u32) -> u32 {
        self.framebuffer_status
    }

    fn draw_buffers(&self, buffers: &[u32]) {
        self.record(GlCall::DrawBuffers { buffers: buffers.to_vec() });
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear { mask });
    }

    fn blit_framebuffer(&self, source: [i32; 4], destination: [i32; 4], mask: u32, filter: u32) {
        self.record(GlCall::BlitFramebuffer { source, destination, mask, filter });
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record_with(GlCall::Viewport { x, y, width, height }, |state| {
            state.viewport = (x, y, width, height);
        });
    }

    fn create_vertex_array(&self) -> u32 {
        self.generate()
    }

    fn delete_vertex_array(&self, name: u32) {
        self.delete(name);
    }

    fn bind_vertex_array(&self, name: u32) {
        self.record_with(GlCall::BindVertexArray { name }, |state| state.vertex_array = name);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray { index });
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer { index, size, data_type, integer: false, stride, offset });
    }

    fn vertex_attrib_pointer_integer(&self, index: u32, size: i32, data_type: u32, stride: i32, offset: i32) {
        self.record(GlCall::VertexAttribPointer { index, size, data_type, integer: true, stride, offset });
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        self.record(GlCall::VertexAttribDivisor { index, divisor });
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32, instances: i32) {
        self.record(GlCall::DrawArrays { mode, first, count, instances });
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32, instances: i32) {
        self.record(GlCall::DrawElements { mode, count, index_type, offset, instances });
    }

    fn create_shader(&self, _kind: u32) -> u32 {
        self.generate()
    }

    fn shader_source(&self, _shader: u32, _source: &str) {}

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader { shader });
    }

    fn shader_compile_status(&self, _shader: u32) -> bool {
        !self.fail_compile
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        if self.fail_compile {
            "0:1(1): error: syntax error".to_owned()
        } else {
            String::new()
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.delete(shader);
    }

    fn create_program(&self) -> u32 {
        self.generate()
    }

    fn delete_program(&self, program: u32) {
        self.delete(program);
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram { program });
    }

    fn program_link_status(&self, _program: u32) -> bool {
        !self.fail_link
    }

    fn program_info_log(&self, _program: u32) -> String {
        if self.fail_link {
            "error: unresolved symbol".to_owned()
        } else {
            String::new()
        }
    }

    fn use_program(&self, program: u32) {
        self.record_with(GlCall::UseProgram { program }, |state| state.program = program);
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        self.uniforms.get(name).copied()
    }

    fn set_uniform(&self, location: u32, value: UniformValue<'_>) {
        self.record(GlCall::SetUniform {
            location,
            floats: value.float_components().to_vec(),
            ints: value.int_components().to_vec(),
        });
    }

    fn enable(&self, capability: u32) {
        self.record_with(GlCall::Enable { capability }, |state| {
            state.enabled.insert(capability);
        });
    }

    fn disable(&self, capability: u32) {
        self.record_with(GlCall::Disable { capability }, |state| {
            state.enabled.remove(&capability);
        });
    }

    fn is_enabled(&self, capability: u32) -> bool {
        self.inner.lock().state.enabled.contains(&capability)
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        let color = [red, green, blue, alpha];
        self.record_with(GlCall::ClearColor { color }, |state| state.clear_color = color);
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        let factors = [src_rgb, dst_rgb, src_alpha, dst_alpha];
        self.record_with(GlCall::BlendFuncSeparate { factors }, |state| state.blend = factors);
    }

    fn depth_func(&self, function: u32) {
        self.record_with(GlCall::DepthFunc { function }, |state| state.depth_func = function);
    }

    fn cull_face(&self, mode: u32) {
        self.record_with(GlCall::CullFace { mode }, |state| state.cull_face = mode);
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        let mask = [red, green, blue, alpha];
        self.record_with(GlCall::ColorMask { mask }, |state| state.color_mask = mask);
    }

    fn depth_mask(&self, mask: bool) {
        self.record_with(GlCall::DepthMask { mask }, |state| state.depth_mask = mask);
    }

    fn stencil_func(&self, function: u32, reference: i32, mask: u32) {
        self.record_with(GlCall::StencilFunc { function, reference, mask }, |state| {
            state.stencil_func = (function, reference, mask);
        });
    }

    fn stencil_mask(&self, mask: u32) {
        self.record_with(GlCall::StencilMask { mask }, |state| state.stencil_mask = mask);
    }

    fn stencil_op(&self, stencil_fail: u32, depth_fail: u32, pass: u32) {
        let actions = [stencil_fail, depth_fail, pass];
        self.record_with(GlCall::StencilOp { actions }, |state| state.stencil_op = actions);
    }

    fn scissor(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record_with(GlCall::Scissor { x, y, width, height }, |state| {
            state.scissor = (x, y, width, height);
        });
    }

    fn enable_debug_output(&self) -> bool {
        let granted = self.debug_context;
        let mut inner = self.inner.lock();
        inner.debug_output |= granted;
        inner.calls.push(GlCall::EnableDebugOutput { granted });
        granted
    }

    fn debug_messages(&self, max: u32) -> Vec<DebugMessage> {
        let mut inner = self.inner.lock();
        let take = inner.debug_log.len().min(usize::try_from(max).unwrap_or(usize::MAX));
        inner.debug_log.drain(..take).collect()
    }

    fn get_parameter_i32(&self, parameter: u32) -> i32 {
        match parameter {
            glow::MAX_VERTEX_ATTRIBS => self.max_vertex_attribs,
            glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS => 80,
            _ => 0,
        }
    }

    fn get_parameter_f32(&self, parameter: u32) -> f32 {
        match parameter {
            glow::MAX_TEXTURE_MAX_ANISOTROPY_EXT => self.max_anisotropy,
            _ => 0.0,
        }
    }
}
