//! Typed wrappers over the raw GL enumerants shared by several modules.
//!
//! Every enum is `#[repr(u32)]` with the GL value as discriminant, so
//! [`raw`](Capability::raw) is a plain cast.

/// Server-side capabilities toggled with `glEnable`/`glDisable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Capability {
    /// Color blending.
    Blend = glow::BLEND,
    /// Logical pixel operations.
    ColorLogicOp = glow::COLOR_LOGIC_OP,
    /// Polygon culling.
    CullFace = glow::CULL_FACE,
    /// Depth comparisons.
    DepthTest = glow::DEPTH_TEST,
    /// Stencil testing.
    StencilTest = glow::STENCIL_TEST,
    /// Scissor rectangle.
    ScissorTest = glow::SCISSOR_TEST,
    /// Multisample rasterization.
    Multisample = glow::MULTISAMPLE,
    /// Polygon offset for filled primitives.
    PolygonOffsetFill = glow::POLYGON_OFFSET_FILL,
    /// Point size written by the vertex shader.
    ProgramPointSize = glow::PROGRAM_POINT_SIZE,
    /// Primitive restart index.
    PrimitiveRestart = glow::PRIMITIVE_RESTART,
    /// Seamless cube map filtering.
    TextureCubeMapSeamless = glow::TEXTURE_CUBE_MAP_SEAMLESS,
    /// Linear to sRGB conversion on write.
    FramebufferSrgb = glow::FRAMEBUFFER_SRGB,
}

impl Capability {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Source/destination factors for `glBlendFuncSeparate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum BlendFactor {
    /// `0`
    Zero = glow::ZERO,
    /// `1`
    One = glow::ONE,
    /// Source color.
    SrcColor = glow::SRC_COLOR,
    /// `1 - source color`
    OneMinusSrcColor = glow::ONE_MINUS_SRC_COLOR,
    /// Source alpha.
    SrcAlpha = glow::SRC_ALPHA,
    /// `1 - source alpha`
    OneMinusSrcAlpha = glow::ONE_MINUS_SRC_ALPHA,
    /// Destination color.
    DstColor = glow::DST_COLOR,
    /// `1 - destination color`
    OneMinusDstColor = glow::ONE_MINUS_DST_COLOR,
    /// Destination alpha.
    DstAlpha = glow::DST_ALPHA,
    /// `1 - destination alpha`
    OneMinusDstAlpha = glow::ONE_MINUS_DST_ALPHA,
    /// `min(As, 1 - Ad)`
    SrcAlphaSaturate = glow::SRC_ALPHA_SATURATE,
}

impl BlendFactor {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Comparison used by the depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum CompareFunction {
    /// Never passes.
    Never = glow::NEVER,
    /// Passes if incoming < stored.
    Less = glow::LESS,
    /// Passes if incoming == stored.
    Equal = glow::EQUAL,
    /// Passes if incoming <= stored.
    LessOrEqual = glow::LEQUAL,
    /// Passes if incoming > stored.
    Greater = glow::GREATER,
    /// Passes if incoming != stored.
    NotEqual = glow::NOTEQUAL,
    /// Passes if incoming >= stored.
    GreaterOrEqual = glow::GEQUAL,
    /// Always passes.
    Always = glow::ALWAYS,
}

impl CompareFunction {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Facets culled when [`Capability::CullFace`] is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum CullFace {
    /// Front-facing polygons.
    Front = glow::FRONT,
    /// Back-facing polygons.
    Back = glow::BACK,
    /// Both facets.
    FrontAndBack = glow::FRONT_AND_BACK,
}

impl CullFace {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Action taken on the stencil buffer by `glStencilOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum StencilAction {
    /// Keep the current value.
    Keep = glow::KEEP,
    /// Set to 0.
    Zero = glow::ZERO,
    /// Set to the reference value.
    Replace = glow::REPLACE,
    /// Increment, clamping at the maximum.
    Increment = glow::INCR,
    /// Increment, wrapping to 0.
    IncrementWrap = glow::INCR_WRAP,
    /// Decrement, clamping at 0.
    Decrement = glow::DECR,
    /// Decrement, wrapping to the maximum.
    DecrementWrap = glow::DECR_WRAP,
    /// Bitwise invert.
    Invert = glow::INVERT,
}

impl StencilAction {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Component data types for vertex attributes and pixel transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataType {
    /// `u8`
    UnsignedByte = glow::UNSIGNED_BYTE,
    /// `i8`
    Byte = glow::BYTE,
    /// `u16`
    UnsignedShort = glow::UNSIGNED_SHORT,
    /// `i16`
    Short = glow::SHORT,
    /// `u32`
    UnsignedInt = glow::UNSIGNED_INT,
    /// `i32`
    Int = glow::INT,
    /// 16-bit float.
    HalfFloat = glow::HALF_FLOAT,
    /// `f32`
    Float = glow::FLOAT,
    /// `f64`
    Double = glow::DOUBLE,
    /// 16.16 fixed point.
    Fixed = glow::FIXED,
    /// Signed 2-10-10-10 packed.
    Int2_10_10_10Rev = glow::INT_2_10_10_10_REV,
    /// Unsigned 2-10-10-10 packed.
    UnsignedInt2_10_10_10Rev = glow::UNSIGNED_INT_2_10_10_10_REV,
    /// Packed 10F-11F-11F float.
    UnsignedInt10F11F11FRev = glow::UNSIGNED_INT_10F_11F_11F_REV,
    /// Packed 8-8-8-8 reversed (pixel transfers only).
    UnsignedInt8_8_8_8Rev = glow::UNSIGNED_INT_8_8_8_8_REV,
    /// Packed 24-8 depth/stencil (pixel transfers only).
    UnsignedInt24_8 = glow::UNSIGNED_INT_24_8,
}

impl DataType {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Pixel data formats for texture uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Format {
    /// R
    Red = glow::RED,
    /// RG
    Rg = glow::RG,
    /// RGB
    Rgb = glow::RGB,
    /// BGR
    Bgr = glow::BGR,
    /// RGBA
    Rgba = glow::RGBA,
    /// BGRA
    Bgra = glow::BGRA,
    /// Integer R
    RedInteger = glow::RED_INTEGER,
    /// Integer RG
    RgInteger = glow::RG_INTEGER,
    /// Integer RGB
    RgbInteger = glow::RGB_INTEGER,
    /// Integer RGBA
    RgbaInteger = glow::RGBA_INTEGER,
    /// Stencil index.
    StencilIndex = glow::STENCIL_INDEX,
    /// Depth.
    DepthComponent = glow::DEPTH_COMPONENT,
    /// Packed depth/stencil.
    DepthStencil = glow::DEPTH_STENCIL,
}

impl Format {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Storage formats for textures and renderbuffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum InternalFormat {
    DepthComponent = glow::DEPTH_COMPONENT,
    DepthStencil = glow::DEPTH_STENCIL,
    Red = glow::RED,
    Rg = glow::RG,
    Rgb = glow::RGB,
    Rgba = glow::RGBA,
    R8 = glow::R8,
    Rg8 = glow::RG8,
    Rgb8 = glow::RGB8,
    Rgba8 = glow::RGBA8,
    Srgb8 = glow::SRGB8,
    Srgb8Alpha8 = glow::SRGB8_ALPHA8,
    R16F = glow::R16F,
    Rg16F = glow::RG16F,
    Rgb16F = glow::RGB16F,
    Rgba16F = glow::RGBA16F,
    R32F = glow::R32F,
    Rg32F = glow::RG32F,
    Rgb32F = glow::RGB32F,
    Rgba32F = glow::RGBA32F,
    R11FG11FB10F = glow::R11F_G11F_B10F,
    R32I = glow::R32I,
    R32UI = glow::R32UI,
    Rgba32UI = glow::RGBA32UI,
    DepthComponent16 = glow::DEPTH_COMPONENT16,
    DepthComponent24 = glow::DEPTH_COMPONENT24,
    DepthComponent32F = glow::DEPTH_COMPONENT32F,
    Depth24Stencil8 = glow::DEPTH24_STENCIL8,
    Depth32FStencil8 = glow::DEPTH32F_STENCIL8,
    StencilIndex8 = glow::STENCIL_INDEX8,
}

impl InternalFormat {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_matches_gl_constants() {
        assert_eq!(Capability::DepthTest.raw(), glow::DEPTH_TEST);
        assert_eq!(BlendFactor::OneMinusSrcAlpha.raw(), glow::ONE_MINUS_SRC_ALPHA);
        assert_eq!(CompareFunction::LessOrEqual.raw(), glow::LEQUAL);
        assert_eq!(StencilAction::Decrement.raw(), glow::DECR);
        assert_eq!(InternalFormat::Depth24Stencil8.raw(), glow::DEPTH24_STENCIL8);
    }
}
