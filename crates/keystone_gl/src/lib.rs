//! # KEYSTONE GL
//!
//! Stack-scoped OpenGL state tracking. Every bind, enable and fixed-function
//! setting goes through one [`Context`], which skips calls that change
//! nothing and undoes exactly what a scope changed when it ends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Buffer · Texture · Framebuffer · VertexArray · Program      │
//! │        (resources: own a Handle, bind through the Context)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Context: frame stack of sparse overlays                     │
//! │    bindings · viewport · enables · functions                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  GlBackend                                                   │
//! │    GlowBackend (real driver) │ RecordingBackend (headless)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ARCHITECT'S MANDATE
//!
//! - A bind that changes nothing issues nothing
//! - Every push has a pop
//! - Driver-level programming errors are fatal, never caught
//! - Driver debug messages land in `tracing`, nowhere else
//! - One context, one thread

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod buffer;
pub mod capabilities;
pub mod config;
pub mod debug;
pub mod enums;
pub mod error;
pub mod framebuffer;
pub mod handle;
pub mod program;
pub mod renderbuffer;
pub mod shader;
pub mod state;
pub mod texture;
pub mod uniform;
pub mod vertex_array;

pub use backend::{GlBackend, GlCall, GlowBackend, RecordingBackend, SimulatedState};
pub use buffer::{AllocationPolicy, Buffer, BufferTarget, BufferUsage};
pub use capabilities::Capabilities;
pub use config::ContextConfig;
pub use debug::{DebugMessage, DebugSeverity, DebugSource, DebugType};
pub use enums::{BlendFactor, Capability, CompareFunction, CullFace, DataType, Format, InternalFormat, StencilAction};
pub use error::{fatal, GlError, GlResult};
pub use handle::{Handle, ObjectKind};

// === STATE STACK ===
pub use state::{
    BlendFunction, Context, ContextScope, FramebufferTarget, ScissorRect, StencilFunction, StencilOperation,
    Viewport,
};

// === RESOURCES ===
pub use framebuffer::{Attachment, AttachmentKind, ClearMask, Framebuffer};
pub use program::Program;
pub use renderbuffer::Renderbuffer;
pub use shader::{Shader, ShaderKind};
pub use texture::{FilterFunction, Texture, TextureTarget, WrapMode};
pub use uniform::{Uniform, UniformValue};
pub use vertex_array::{AttributeKind, IndexElement, PrimitiveMode, VertexArray, VertexAttribute};
