//! # Vertex Arrays
//!
//! Attribute layouts are validated up front and return [`GlError`]; running
//! out of attribute slots is fatal.
//!
//! ```text
//! set_layout(buffer, [Vec3, Vec2, Mat4], stride 0)
//!
//!   slot:   0      1      2..=5
//!   offset: 0      12     20, 36, 52, 68
//!   stride: 84 (sum of the attribute sizes)
//! ```
//!
//! The element array binding is vertex array state, so index buffers are
//! owned by the [`VertexArray`] and bound while it is bound instead of going
//! through the context's buffer bindings.

use std::collections::BTreeSet;

use bytemuck::Pod;

use crate::buffer::{Buffer, BufferTarget, BufferUsage};
use crate::enums::DataType;
use crate::error::{fatal, GlError, GlResult};
use crate::handle::{Handle, ObjectKind};
use crate::state::Context;

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// One vertex attribute pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    index: u32,
    size: i32,
    data_type: DataType,
    stride: i32,
    offset: i32,
    normalize: bool,
    integer: bool,
}

impl VertexAttribute {
    /// Validates and creates an attribute at shader location `index`.
    ///
    /// # Errors
    ///
    /// - [`GlError::InvalidAttributeSize`] unless `size` is 1 to 4.
    /// - [`GlError::InvalidAttributeType`] for types that are not vertex
    ///   attribute types.
    /// - [`GlError::PackedTypeSizeMismatch`] when a packed type is not
    ///   paired with its component count.
    pub fn new(index: u32, size: i32, data_type: DataType, stride: i32, offset: i32) -> GlResult<Self> {
        if !(1..=4).contains(&size) {
            return Err(GlError::InvalidAttributeSize(size));
        }

        let required = match data_type {
            DataType::Int2_10_10_10Rev | DataType::UnsignedInt2_10_10_10Rev => Some(4),
            DataType::UnsignedInt10F11F11FRev => Some(3),
            DataType::UnsignedInt8_8_8_8Rev | DataType::UnsignedInt24_8 => {
                return Err(GlError::InvalidAttributeType(data_type));
            }
            _ => None,
        };

        if let Some(required) = required {
            if size != required {
                return Err(GlError::PackedTypeSizeMismatch { data_type, required, size });
            }
        }

        Ok(Self {
            index,
            size,
            data_type,
            stride,
            offset,
            normalize: false,
            integer: false,
        })
    }

    /// Fixed-point data is normalized to `[0, 1]` or `[-1, 1]`.
    #[must_use]
    pub const fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Uploads through `glVertexAttribIPointer`, for `int`/`ivec` inputs.
    #[must_use]
    pub const fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Shader location.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Byte offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> i32 {
        self.offset
    }

    /// Byte stride between vertices.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> i32 {
        self.stride
    }

    /// Size of one attribute value in bytes.
    #[must_use]
    pub const fn byte_size(&self) -> i32 {
        match self.data_type {
            DataType::Byte | DataType::UnsignedByte => self.size,
            DataType::Short | DataType::UnsignedShort | DataType::HalfFloat => self.size * 2,
            DataType::Int | DataType::UnsignedInt | DataType::Float | DataType::Fixed => self.size * 4,
            DataType::Double => self.size * 8,
            DataType::Int2_10_10_10Rev
            | DataType::UnsignedInt2_10_10_10Rev
            | DataType::UnsignedInt10F11F11FRev
            | DataType::UnsignedInt8_8_8_8Rev
            | DataType::UnsignedInt24_8 => 4,
        }
    }
}

/// Shader input types understood by [`VertexArray::set_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AttributeKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    /// Four consecutive `vec4` slots.
    Mat4,
    Int,
    IVec2,
    IVec3,
    IVec4,
}

impl AttributeKind {
    const fn components(self) -> i32 {
        match self {
            Self::Float | Self::Int => 1,
            Self::Vec2 | Self::IVec2 => 2,
            Self::Vec3 | Self::IVec3 => 3,
            Self::Vec4 | Self::IVec4 | Self::Mat4 => 4,
        }
    }

    const fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::IVec2 | Self::IVec3 | Self::IVec4)
    }
}

/// Primitive assembly modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum PrimitiveMode {
    Points = glow::POINTS,
    LineStrip = glow::LINE_STRIP,
    LineLoop = glow::LINE_LOOP,
    Lines = glow::LINES,
    LineStripAdjacency = glow::LINE_STRIP_ADJACENCY,
    LinesAdjacency = glow::LINES_ADJACENCY,
    TriangleStrip = glow::TRIANGLE_STRIP,
    TriangleFan = glow::TRIANGLE_FAN,
    Triangles = glow::TRIANGLES,
    TriangleStripAdjacency = glow::TRIANGLE_STRIP_ADJACENCY,
    TrianglesAdjacency = glow::TRIANGLES_ADJACENCY,
    Patches = glow::PATCHES,
}

impl PrimitiveMode {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Integer types usable as element indices.
pub trait IndexElement: Pod {
    /// Matching `type` argument for `glDrawElements`.
    const DATA_TYPE: DataType;
}

impl IndexElement for u8 {
    const DATA_TYPE: DataType = DataType::UnsignedByte;
}

impl IndexElement for u16 {
    const DATA_TYPE: DataType = DataType::UnsignedShort;
}

impl IndexElement for u32 {
    const DATA_TYPE: DataType = DataType::UnsignedInt;
}

// =============================================================================
// VERTEX ARRAY
// =============================================================================

/// A vertex array object and its index buffer.
#[derive(Debug)]
pub struct VertexArray {
    handle: Handle,
    indices: Option<Handle>,
    index_type: DataType,
    index_count: u32,
    unused_indices: Option<BTreeSet<u32>>,
}

impl VertexArray {
    /// Allocates an empty vertex array.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            handle: Handle::create(ctx.gl(), ObjectKind::VertexArray),
            indices: None,
            index_type: DataType::UnsignedInt,
            index_count: 0,
            unused_indices: None,
        }
    }

    /// Native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// Number of indices last uploaded with [`set_indices`](Self::set_indices).
    #[inline]
    #[must_use]
    pub const fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the vertex array.
    pub fn bind(&self, ctx: &mut Context) {
        ctx.bind_vertex_array(self);
    }

    /// Points `attributes` at `buffer`. A `divisor` above 0 makes them
    /// per-instance.
    ///
    /// # Errors
    ///
    /// [`GlError::WrongBufferTarget`] unless `buffer` targets `ARRAY`.
    pub fn set_vertex_attributes(
        &mut self,
        ctx: &mut Context,
        buffer: &Buffer,
        attributes: &[VertexAttribute],
        divisor: u32,
    ) -> GlResult<()> {
        if buffer.target() != BufferTarget::Array {
            return Err(GlError::WrongBufferTarget {
                expected: BufferTarget::Array,
                actual: buffer.target(),
            });
        }

        self.bind(ctx);
        buffer.bind(ctx);

        let gl = ctx.gl();
        for attribute in attributes {
            gl.enable_vertex_attrib_array(attribute.index);

            if attribute.integer {
                gl.vertex_attrib_pointer_integer(
                    attribute.index,
                    attribute.size,
                    attribute.data_type.raw(),
                    attribute.stride,
                    attribute.offset,
                );
            } else {
                gl.vertex_attrib_pointer(
                    attribute.index,
                    attribute.size,
                    attribute.data_type.raw(),
                    attribute.normalize,
                    attribute.stride,
                    attribute.offset,
                );
            }

            if divisor > 0 {
                gl.vertex_attrib_divisor(attribute.index, divisor);
            }
        }

        let unused = self.unused_indices(ctx);
        for attribute in attributes {
            unused.remove(&attribute.index);
        }

        Ok(())
    }

    /// Lays out tightly packed `kinds` in the first free attribute slots.
    /// A `stride` of 0 uses the packed vertex size.
    ///
    /// Slots are only taken once the whole layout is accepted.
    ///
    /// # Errors
    ///
    /// As [`set_vertex_attributes`](Self::set_vertex_attributes).
    ///
    /// # Panics
    ///
    /// Fatal when no free slot (or four consecutive ones for
    /// [`AttributeKind::Mat4`]) is left.
    pub fn set_layout(
        &mut self,
        ctx: &mut Context,
        buffer: &Buffer,
        kinds: &[AttributeKind],
        stride: i32,
        divisor: u32,
    ) -> GlResult<()> {
        if buffer.target() != BufferTarget::Array {
            return Err(GlError::WrongBufferTarget {
                expected: BufferTarget::Array,
                actual: buffer.target(),
            });
        }

        let mut free = self.unused_indices(ctx).clone();
        let mut attributes = Vec::with_capacity(kinds.len());
        let mut offset = 0;

        for &kind in kinds {
            let data_type = if kind.is_integer() { DataType::Int } else { DataType::Float };
            let slots = if kind == AttributeKind::Mat4 { 4 } else { 1 };
            let Some(first) = first_run(&free, slots) else {
                fatal(&format!("no {slots} consecutive vertex attribute slots available"));
            };

            for index in first..first + slots {
                let mut attribute = VertexAttribute::new(index, kind.components(), data_type, 0, offset)?;
                if kind.is_integer() {
                    attribute = attribute.integer();
                }

                offset += attribute.byte_size();
                free.remove(&index);
                attributes.push(attribute);
            }
        }

        let stride = if stride == 0 { offset } else { stride };
        for attribute in &mut attributes {
            attribute.stride = stride;
        }

        self.set_vertex_attributes(ctx, buffer, &attributes, divisor)
    }

    /// First of `consecutive` free attribute slots.
    ///
    /// # Panics
    ///
    /// Fatal when there is no such run.
    pub fn first_unused_index(&mut self, ctx: &Context, consecutive: u32) -> u32 {
        match first_run(self.unused_indices(ctx), consecutive) {
            Some(start) => start,
            None => fatal(&format!("no {consecutive} consecutive vertex attribute slots available")),
        }
    }

    /// Uploads the index buffer, replacing any previous one.
    pub fn set_indices<T: IndexElement>(&mut self, ctx: &mut Context, indices: &[T]) {
        self.bind(ctx);

        let gl = ctx.gl();
        let name = match &self.indices {
            Some(handle) => handle.name(),
            None => {
                let handle = Handle::create(gl, ObjectKind::Buffer);
                let name = handle.name();
                self.indices = Some(handle);
                name
            }
        };

        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, name);
        gl.buffer_data(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(indices),
            BufferUsage::StaticDraw.raw(),
        );

        self.index_type = T::DATA_TYPE;
        self.index_count = u32::try_from(indices.len()).unwrap_or(u32::MAX);
    }

    /// `glDrawArrays`, instanced when `instances` is not 1.
    pub fn draw_arrays(&self, ctx: &mut Context, mode: PrimitiveMode, first: i32, count: u32, instances: u32) {
        self.bind(ctx);
        ctx.gl()
            .draw_arrays(mode.raw(), first, to_i32(count), to_i32(instances));
    }

    /// `glDrawElements` over `count` indices starting at index `offset`,
    /// instanced when `instances` is not 1.
    pub fn draw_elements(&self, ctx: &mut Context, mode: PrimitiveMode, count: u32, offset: u32, instances: u32) {
        let index_size = match self.index_type {
            DataType::UnsignedByte => 1,
            DataType::UnsignedShort => 2,
            _ => 4,
        };

        self.bind(ctx);
        ctx.gl().draw_elements(
            mode.raw(),
            to_i32(count),
            self.index_type.raw(),
            to_i32(offset.saturating_mul(index_size)),
            to_i32(instances),
        );
    }

    /// Draws every uploaded index.
    pub fn draw_all_elements(&self, ctx: &mut Context, mode: PrimitiveMode, instances: u32) {
        self.draw_elements(ctx, mode, self.index_count, 0, instances);
    }

    fn unused_indices(&mut self, ctx: &Context) -> &mut BTreeSet<u32> {
        self.unused_indices
            .get_or_insert_with(|| (0..ctx.capabilities().max_vertex_attribs()).collect())
    }
}

/// Start of the lowest run of `consecutive` indices in `free`.
fn first_run(free: &BTreeSet<u32>, consecutive: u32) -> Option<u32> {
    let mut start = 0;
    let mut count = 0;

    for &index in free {
        if count != 0 && index == start + count {
            count += 1;
        } else {
            start = index;
            count = 1;
        }

        if count == consecutive {
            return Some(start);
        }
    }
    None
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
