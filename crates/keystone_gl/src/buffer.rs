//! GPU buffers.

use bytemuck::Pod;

use crate::handle::{Handle, ObjectKind};
use crate::state::Context;

/// Binding targets a [`Buffer`] can be created for.
///
/// `GL_ELEMENT_ARRAY_BUFFER` is absent on purpose: it is vertex array state,
/// see [`VertexArray::set_indices`](crate::vertex_array::VertexArray::set_indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum BufferTarget {
    Array = glow::ARRAY_BUFFER,
    AtomicCounter = glow::ATOMIC_COUNTER_BUFFER,
    CopyRead = glow::COPY_READ_BUFFER,
    CopyWrite = glow::COPY_WRITE_BUFFER,
    DispatchIndirect = glow::DISPATCH_INDIRECT_BUFFER,
    DrawIndirect = glow::DRAW_INDIRECT_BUFFER,
    PixelPack = glow::PIXEL_PACK_BUFFER,
    PixelUnpack = glow::PIXEL_UNPACK_BUFFER,
    Query = glow::QUERY_BUFFER,
    ShaderStorage = glow::SHADER_STORAGE_BUFFER,
    Texture = glow::TEXTURE_BUFFER,
    TransformFeedback = glow::TRANSFORM_FEEDBACK_BUFFER,
    Uniform = glow::UNIFORM_BUFFER,
}

impl BufferTarget {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Usage hints for `glBufferData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum BufferUsage {
    StreamDraw = glow::STREAM_DRAW,
    StreamRead = glow::STREAM_READ,
    StreamCopy = glow::STREAM_COPY,
    #[default]
    StaticDraw = glow::STATIC_DRAW,
    StaticRead = glow::STATIC_READ,
    StaticCopy = glow::STATIC_COPY,
    DynamicDraw = glow::DYNAMIC_DRAW,
    DynamicRead = glow::DYNAMIC_READ,
    DynamicCopy = glow::DYNAMIC_COPY,
}

impl BufferUsage {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// When storage is re-specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AllocationPolicy {
    /// Every upload re-specifies the storage.
    #[default]
    Reallocate,
    /// Storage is only re-specified when the upload does not fit.
    Grow,
}

/// A buffer object bound to one target for its whole life.
#[derive(Debug)]
pub struct Buffer {
    handle: Handle,
    target: BufferTarget,
    policy: AllocationPolicy,
    byte_size: usize,
}

impl Buffer {
    /// Allocates an empty buffer for `target`.
    #[must_use]
    pub fn new(ctx: &Context, target: BufferTarget) -> Self {
        Self {
            handle: Handle::create(ctx.gl(), ObjectKind::Buffer),
            target,
            policy: AllocationPolicy::default(),
            byte_size: 0,
        }
    }

    /// Native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// Target this buffer binds to.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> BufferTarget {
        self.target
    }

    /// Current allocation policy.
    #[inline]
    #[must_use]
    pub const fn allocation_policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Changes the allocation policy.
    pub fn set_allocation_policy(&mut self, policy: AllocationPolicy) {
        self.policy = policy;
    }

    /// Size of the allocated storage in bytes.
    #[inline]
    #[must_use]
    pub const fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Binds the buffer to its target.
    pub fn bind(&self, ctx: &mut Context) {
        ctx.bind_buffer(self);
    }

    /// Uploads `data`, re-specifying storage according to the policy.
    pub fn set_data<T: Pod>(&mut self, ctx: &mut Context, data: &[T], usage: BufferUsage) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.bind(ctx);

        if self.needs_storage(bytes.len()) {
            ctx.gl().buffer_data(self.target.raw(), bytes, usage.raw());
            self.byte_size = bytes.len();
        } else {
            ctx.gl().buffer_sub_data(self.target.raw(), 0, bytes);
        }
    }

    /// Drops the storage.
    pub fn set_data_empty(&mut self, ctx: &mut Context, usage: BufferUsage) {
        self.bind(ctx);
        ctx.gl().buffer_data_size(self.target.raw(), 0, usage.raw());
        self.byte_size = 0;
    }

    /// Allocates `byte_count` bytes of uninitialized storage, according to
    /// the policy.
    pub fn set_data_empty_size(&mut self, ctx: &mut Context, byte_count: usize, usage: BufferUsage) {
        self.bind(ctx);

        if self.needs_storage(byte_count) {
            ctx.gl().buffer_data_size(self.target.raw(), byte_count, usage.raw());
            self.byte_size = byte_count;
        }
    }

    /// Overwrites elements starting at element `index`.
    pub fn set_sub_data<T: Pod>(&mut self, ctx: &mut Context, index: usize, data: &[T]) {
        self.bind(ctx);
        ctx.gl().buffer_sub_data(
            self.target.raw(),
            index * std::mem::size_of::<T>(),
            bytemuck::cast_slice(data),
        );
    }

    fn needs_storage(&self, byte_count: usize) -> bool {
        match self.policy {
            AllocationPolicy::Reallocate => true,
            AllocationPolicy::Grow => byte_count > self.byte_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GlCall, RecordingBackend};
    use std::rc::Rc;

    fn context() -> (Rc<RecordingBackend>, Context) {
        let recording = Rc::new(RecordingBackend::new());
        let ctx = Context::new(recording.clone(), 800, 600);
        (recording, ctx)
    }

    fn allocations(recording: &RecordingBackend) -> usize {
        recording.count(|call| matches!(call, GlCall::BufferData { .. }))
    }

    #[test]
    fn test_set_data_binds_and_uploads() {
        let (recording, mut ctx) = context();
        let mut buffer = Buffer::new(&ctx, BufferTarget::Array);

        buffer.set_data(&mut ctx, &[1.0_f32, 2.0, 3.0], BufferUsage::StaticDraw);

        assert_eq!(ctx.bound_buffer(BufferTarget::Array), buffer.name());
        assert_eq!(buffer.byte_size(), 12);
        assert_eq!(allocations(&recording), 1);
    }

    #[test]
    fn test_grow_policy_reuses_storage() {
        let (recording, mut ctx) = context();
        let mut buffer = Buffer::new(&ctx, BufferTarget::Uniform);
        buffer.set_allocation_policy(AllocationPolicy::Grow);

        buffer.set_data_empty_size(&mut ctx, 256, BufferUsage::DynamicDraw);
        buffer.set_data_empty_size(&mut ctx, 128, BufferUsage::DynamicDraw);
        buffer.set_data(&mut ctx, &[0_u32; 16], BufferUsage::DynamicDraw);
        assert_eq!(allocations(&recording), 1);
        assert_eq!(buffer.byte_size(), 256);

        buffer.set_data_empty_size(&mut ctx, 512, BufferUsage::DynamicDraw);
        assert_eq!(allocations(&recording), 2);
    }

    #[test]
    fn test_sub_data_offset_is_in_elements() {
        let (recording, mut ctx) = context();
        let mut buffer = Buffer::new(&ctx, BufferTarget::Array);

        buffer.set_sub_data(&mut ctx, 3, &[[0.0_f32; 4]; 2]);

        let calls = recording.calls();
        assert!(calls.contains(&GlCall::BufferSubData {
            target: glow::ARRAY_BUFFER,
            offset: 48,
            size: 32,
        }));
    }
}
