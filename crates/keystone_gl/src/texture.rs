//! Textures.
//!
//! Parameter changes bind the texture to unit 0 in the caller's current
//! frame, like any other bind.
//!
//! Array textures get immutable storage from
//! [`initialize_array`](Texture::initialize_array) and are then filled one
//! layer at a time with [`set_layer_data`](Texture::set_layer_data).

use crate::enums::{DataType, Format, InternalFormat};
use crate::error::{GlError, GlResult};
use crate::handle::{Handle, ObjectKind};
use crate::state::Context;

/// Texture binding targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum TextureTarget {
    Texture1D = glow::TEXTURE_1D,
    Texture2D = glow::TEXTURE_2D,
    Texture3D = glow::TEXTURE_3D,
    Texture1DArray = glow::TEXTURE_1D_ARRAY,
    Texture2DArray = glow::TEXTURE_2D_ARRAY,
    Rectangle = glow::TEXTURE_RECTANGLE,
    CubeMap = glow::TEXTURE_CUBE_MAP,
    CubeMapArray = glow::TEXTURE_CUBE_MAP_ARRAY,
    Buffer = glow::TEXTURE_BUFFER,
    Texture2DMultisample = glow::TEXTURE_2D_MULTISAMPLE,
    Texture2DMultisampleArray = glow::TEXTURE_2D_MULTISAMPLE_ARRAY,
}

impl TextureTarget {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Minification and magnification filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum FilterFunction {
    Nearest = glow::NEAREST,
    Linear = glow::LINEAR,
    NearestMipmapNearest = glow::NEAREST_MIPMAP_NEAREST,
    LinearMipmapNearest = glow::LINEAR_MIPMAP_NEAREST,
    NearestMipmapLinear = glow::NEAREST_MIPMAP_LINEAR,
    LinearMipmapLinear = glow::LINEAR_MIPMAP_LINEAR,
}

impl FilterFunction {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// `true` for filters that sample mipmaps.
    #[must_use]
    pub const fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum WrapMode {
    ClampToEdge = glow::CLAMP_TO_EDGE,
    ClampToBorder = glow::CLAMP_TO_BORDER,
    Repeat = glow::REPEAT,
    MirroredRepeat = glow::MIRRORED_REPEAT,
    MirrorClampToEdge = glow::MIRROR_CLAMP_TO_EDGE,
}

impl WrapMode {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// A texture object.
#[derive(Debug)]
pub struct Texture {
    handle: Handle,
    target: TextureTarget,
    width: u32,
    height: u32,
    layers: u32,
}

impl Texture {
    /// Allocates a texture for `target`.
    #[must_use]
    pub fn new(ctx: &Context, target: TextureTarget) -> Self {
        Self {
            handle: Handle::create(ctx.gl(), ObjectKind::Texture),
            target,
            width: 0,
            height: 0,
            layers: 0,
        }
    }

    /// Native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// Binding target.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> TextureTarget {
        self.target
    }

    /// Width of level 0, 0 before storage is specified.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of level 0, 0 before storage is specified.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Array layers (or depth) of level 0, 0 for 2D textures.
    #[inline]
    #[must_use]
    pub const fn layers(&self) -> u32 {
        self.layers
    }

    /// Binds the texture to `unit`.
    pub fn bind(&self, ctx: &mut Context, unit: u32) {
        ctx.bind_texture(unit, self);
    }

    /// `GL_TEXTURE_MIN_FILTER`
    pub fn set_minifying_filter(&mut self, ctx: &mut Context, filter: FilterFunction) {
        self.parameter_i32(ctx, glow::TEXTURE_MIN_FILTER, filter.raw());
    }

    /// `GL_TEXTURE_MAG_FILTER`. Only `Nearest` and `Linear` are accepted.
    ///
    /// # Errors
    ///
    /// [`GlError::InvalidMagnificationFilter`] for mipmap filters.
    pub fn set_magnification_filter(&mut self, ctx: &mut Context, filter: FilterFunction) -> GlResult<()> {
        if filter.uses_mipmaps() {
            return Err(GlError::InvalidMagnificationFilter(filter));
        }

        self.parameter_i32(ctx, glow::TEXTURE_MAG_FILTER, filter.raw());
        Ok(())
    }

    /// `GL_TEXTURE_WRAP_S`
    pub fn set_wrap_s(&mut self, ctx: &mut Context, mode: WrapMode) {
        self.parameter_i32(ctx, glow::TEXTURE_WRAP_S, mode.raw());
    }

    /// `GL_TEXTURE_WRAP_T`
    pub fn set_wrap_t(&mut self, ctx: &mut Context, mode: WrapMode) {
        self.parameter_i32(ctx, glow::TEXTURE_WRAP_T, mode.raw());
    }

    /// `GL_TEXTURE_WRAP_R`
    pub fn set_wrap_r(&mut self, ctx: &mut Context, mode: WrapMode) {
        self.parameter_i32(ctx, glow::TEXTURE_WRAP_R, mode.raw());
    }

    /// `GL_TEXTURE_MAX_ANISOTROPY`, within `[1, max]`.
    ///
    /// # Errors
    ///
    /// [`GlError::AnisotropyOutOfRange`] outside that range.
    pub fn set_anisotropy(&mut self, ctx: &mut Context, value: f32) -> GlResult<()> {
        let max = ctx.capabilities().max_texture_max_anisotropy();
        if !(1.0..=max).contains(&value) {
            return Err(GlError::AnisotropyOutOfRange { value, max });
        }

        self.bind(ctx, 0);
        ctx.gl()
            .tex_parameter_f32(self.target.raw(), glow::TEXTURE_MAX_ANISOTROPY_EXT, value);
        Ok(())
    }

    /// Generates the mipmap chain from level 0.
    pub fn generate_mipmap(&mut self, ctx: &mut Context) {
        self.bind(ctx, 0);
        ctx.gl().generate_mipmap(self.target.raw());
    }

    /// Allocates uninitialized 2D storage.
    pub fn set_empty_2d(&mut self, ctx: &mut Context, width: u32, height: u32, internal_format: InternalFormat) {
        let (format, data_type) = transfer_format(internal_format);

        self.bind(ctx, 0);
        ctx.gl().tex_image_2d(
            self.target.raw(),
            internal_format.raw(),
            width,
            height,
            format.raw(),
            data_type.raw(),
            None,
        );
        self.width = width;
        self.height = height;
    }

    /// Uploads 2D pixel data to level 0.
    #[allow(clippy::too_many_arguments)]
    pub fn set_data_2d(
        &mut self,
        ctx: &mut Context,
        width: u32,
        height: u32,
        internal_format: InternalFormat,
        format: Format,
        data_type: DataType,
        pixels: &[u8],
    ) {
        self.bind(ctx, 0);
        ctx.gl().tex_image_2d(
            self.target.raw(),
            internal_format.raw(),
            width,
            height,
            format.raw(),
            data_type.raw(),
            Some(pixels),
        );
        self.width = width;
        self.height = height;
    }

    /// Allocates multisample storage; the target must be
    /// [`TextureTarget::Texture2DMultisample`].
    pub fn initialize_multisample(
        &mut self,
        ctx: &mut Context,
        width: u32,
        height: u32,
        internal_format: InternalFormat,
        samples: u32,
    ) {
        self.bind(ctx, 0);
        ctx.gl().tex_image_2d_multisample(
            self.target.raw(),
            samples,
            internal_format.raw(),
            width,
            height,
        );
        self.width = width;
        self.height = height;
    }

    /// Allocates immutable single-level storage of `layers` slices, for
    /// [`TextureTarget::Texture2DArray`] or [`TextureTarget::Texture3D`].
    pub fn initialize_array(
        &mut self,
        ctx: &mut Context,
        internal_format: InternalFormat,
        width: u32,
        height: u32,
        layers: u32,
    ) {
        self.bind(ctx, 0);
        ctx.gl()
            .tex_storage_3d(self.target.raw(), 1, internal_format.raw(), width, height, layers);
        self.width = width;
        self.height = height;
        self.layers = layers;
    }

    /// Uploads every layer of level 0 at once, replacing the storage.
    #[allow(clippy::too_many_arguments)]
    pub fn set_data_3d(
        &mut self,
        ctx: &mut Context,
        width: u32,
        height: u32,
        layers: u32,
        internal_format: InternalFormat,
        format: Format,
        data_type: DataType,
        pixels: &[u8],
    ) {
        self.bind(ctx, 0);
        ctx.gl().tex_image_3d(
            self.target.raw(),
            internal_format.raw(),
            width,
            height,
            layers,
            format.raw(),
            data_type.raw(),
            Some(pixels),
        );
        self.width = width;
        self.height = height;
        self.layers = layers;
    }

    /// Replaces one full layer of level 0.
    ///
    /// # Errors
    ///
    /// [`GlError::LayerOutOfRange`] unless `layer` is below
    /// [`layers`](Self::layers).
    pub fn set_layer_data(
        &mut self,
        ctx: &mut Context,
        layer: u32,
        format: Format,
        data_type: DataType,
        pixels: &[u8],
    ) -> GlResult<()> {
        if layer >= self.layers {
            return Err(GlError::LayerOutOfRange {
                layer,
                layers: self.layers,
            });
        }

        self.bind(ctx, 0);
        ctx.gl().tex_sub_image_3d(
            self.target.raw(),
            layer,
            self.width,
            self.height,
            1,
            format.raw(),
            data_type.raw(),
            pixels,
        );
        Ok(())
    }

    fn parameter_i32(&self, ctx: &mut Context, parameter: u32, value: u32) {
        self.bind(ctx, 0);
        ctx.gl()
            .tex_parameter_i32(self.target.raw(), parameter, i32::try_from(value).unwrap_or(i32::MAX));
    }
}

/// Client format and type accepted alongside `internal_format` when no
/// pixels are uploaded.
const fn transfer_format(internal_format: InternalFormat) -> (Format, DataType) {
    match internal_format {
        InternalFormat::DepthComponent
        | InternalFormat::DepthComponent16
        | InternalFormat::DepthComponent24
        | InternalFormat::DepthComponent32F => (Format::DepthComponent, DataType::Float),
        InternalFormat::DepthStencil | InternalFormat::Depth24Stencil8 | InternalFormat::Depth32FStencil8 => {
            (Format::DepthStencil, DataType::UnsignedInt24_8)
        }
        InternalFormat::StencilIndex8 => (Format::StencilIndex, DataType::UnsignedByte),
        InternalFormat::R32I => (Format::RedInteger, DataType::Int),
        InternalFormat::R32UI => (Format::RedInteger, DataType::UnsignedInt),
        InternalFormat::Rgba32UI => (Format::RgbaInteger, DataType::UnsignedInt),
        _ => (Format::Rgba, DataType::UnsignedByte),
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

    #[test]
    fn test_magnification_rejects_mipmap_filters() {
        let (_, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2D);

        assert_eq!(
            texture.set_magnification_filter(&mut ctx, FilterFunction::LinearMipmapLinear),
            Err(GlError::InvalidMagnificationFilter(FilterFunction::LinearMipmapLinear))
        );
        assert!(texture.set_magnification_filter(&mut ctx, FilterFunction::Nearest).is_ok());
    }

    #[test]
    fn test_anisotropy_range() {
        let (_, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2D);

        assert!(texture.set_anisotropy(&mut ctx, 0.5).is_err());
        assert!(texture.set_anisotropy(&mut ctx, 64.0).is_err());
        assert!(texture.set_anisotropy(&mut ctx, 4.0).is_ok());
    }

    #[test]
    fn test_parameters_bind_to_unit_zero() {
        let (recording, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2D);

        texture.set_wrap_s(&mut ctx, WrapMode::Repeat);
        texture.set_wrap_t(&mut ctx, WrapMode::Repeat);

        assert_eq!(ctx.bound_texture(0, TextureTarget::Texture2D), texture.name());
        let binds = recording.count(|call| matches!(call, GlCall::BindTexture { .. }));
        assert_eq!(binds, 1);
    }

    #[test]
    fn test_empty_depth_storage_uses_depth_transfer() {
        let (recording, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2D);

        texture.set_empty_2d(&mut ctx, 512, 256, InternalFormat::DepthComponent24);

        assert_eq!((texture.width(), texture.height()), (512, 256));
        assert!(recording.calls().contains(&GlCall::TexImage2D {
            target: glow::TEXTURE_2D,
            internal_format: glow::DEPTH_COMPONENT24,
            width: 512,
            height: 256,
        }));
    }

    #[test]
    fn test_array_storage_and_layer_upload() {
        let (recording, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2DArray);

        texture.initialize_array(&mut ctx, InternalFormat::Rgba8, 16, 16, 4);
        texture
            .set_layer_data(&mut ctx, 3, Format::Rgba, DataType::UnsignedByte, &[0; 16 * 16 * 4])
            .unwrap();

        assert_eq!(texture.layers(), 4);
        assert!(recording.calls().contains(&GlCall::TexStorage3D {
            target: glow::TEXTURE_2D_ARRAY,
            internal_format: glow::RGBA8,
            width: 16,
            height: 16,
            depth: 4,
        }));
        assert!(recording.calls().contains(&GlCall::TexSubImage3D {
            target: glow::TEXTURE_2D_ARRAY,
            z_offset: 3,
            width: 16,
            height: 16,
            depth: 1,
            size: 1024,
        }));
        assert_eq!(ctx.bound_texture(0, TextureTarget::Texture2DArray), texture.name());
    }

    #[test]
    fn test_layer_out_of_range() {
        let (recording, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2DArray);

        let before = texture.set_layer_data(&mut ctx, 0, Format::Rgba, DataType::UnsignedByte, &[]);
        assert_eq!(before, Err(GlError::LayerOutOfRange { layer: 0, layers: 0 }));

        texture.initialize_array(&mut ctx, InternalFormat::Rgba8, 4, 4, 2);
        let past = texture.set_layer_data(&mut ctx, 2, Format::Rgba, DataType::UnsignedByte, &[0; 64]);
        assert_eq!(past, Err(GlError::LayerOutOfRange { layer: 2, layers: 2 }));
        assert_eq!(recording.count(|call| matches!(call, GlCall::TexSubImage3D { .. })), 0);
    }

    #[test]
    fn test_full_array_upload() {
        let (recording, mut ctx) = context();
        let mut texture = Texture::new(&ctx, TextureTarget::Texture2DArray);

        texture.set_data_3d(
            &mut ctx,
            2,
            2,
            3,
            InternalFormat::Rgba8,
            Format::Rgba,
            DataType::UnsignedByte,
            &[255; 2 * 2 * 3 * 4],
        );

        assert_eq!((texture.width(), texture.height(), texture.layers()), (2, 2, 3));
        assert_eq!(recording.count(|call| matches!(call, GlCall::TexImage3D { depth: 3, .. })), 1);
    }
}
