//! # GL Error Types
//!
//! Two tiers, intentionally kept apart:
//! - [`GlError`]: argument validation the caller can correct and retry.
//! - [`fatal`]: driver-level programming errors. GPU state past that point
//!   cannot be trusted, so the process goes down.

use thiserror::Error;

/// Recoverable errors raised by the GL resource layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlError {
    /// Vertex attribute component count outside `1..=4`.
    #[error("vertex attribute size must be 1, 2, 3 or 4, got {0}")]
    InvalidAttributeSize(i32),

    /// Data type not allowed for a vertex attribute.
    #[error("data type {0:?} cannot be used for a vertex attribute")]
    InvalidAttributeType(crate::enums::DataType),

    /// Packed data type paired with the wrong component count.
    #[error("data type {data_type:?} must be paired with size {required}, got {size}")]
    PackedTypeSizeMismatch {
        /// The packed type.
        data_type: crate::enums::DataType,
        /// The required component count.
        required: i32,
        /// The component count that was supplied.
        size: i32,
    },

    /// A buffer was bound to the wrong target for the operation.
    #[error("buffer must have target {expected:?}, has {actual:?}")]
    WrongBufferTarget {
        /// Target the operation needs.
        expected: crate::buffer::BufferTarget,
        /// Target the buffer was created with.
        actual: crate::buffer::BufferTarget,
    },

    /// Magnification filters only support NEAREST and LINEAR.
    #[error("magnification filter must be NEAREST or LINEAR, got {0:?}")]
    InvalidMagnificationFilter(crate::texture::FilterFunction),

    /// Anisotropy outside `[1, max]`.
    #[error("anisotropy must be within [1.0, {max}], got {value}")]
    AnisotropyOutOfRange {
        /// Requested anisotropy.
        value: f32,
        /// Driver maximum.
        max: f32,
    },

    /// Array layer past the allocated layer count.
    #[error("layer {layer} out of range for a texture with {layers} layers")]
    LayerOutOfRange {
        /// Requested layer.
        layer: u32,
        /// Allocated layers.
        layers: u32,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for GL resource operations.
pub type GlResult<T> = Result<T, GlError>;

/// Logs a fatal GL diagnostic and takes the process down.
///
/// The workspace builds with `panic = "abort"`, so this never unwinds in a
/// shipped binary. Test harnesses unwind, which lets `#[should_panic]`
/// observe the failure.
#[cold]
#[track_caller]
pub fn fatal(message: &str) -> ! {
    tracing::error!("fatal GL error: {message}");
    panic!("fatal GL error: {message}");
}
