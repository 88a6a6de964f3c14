//! Shader stages, compiled on construction.

use std::rc::Rc;

use crate::error::fatal;
use crate::handle::Handle;
use crate::state::Context;

/// Shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ShaderKind {
    Vertex = glow::VERTEX_SHADER,
    TessControl = glow::TESS_CONTROL_SHADER,
    TessEvaluation = glow::TESS_EVALUATION_SHADER,
    Geometry = glow::GEOMETRY_SHADER,
    Fragment = glow::FRAGMENT_SHADER,
    Compute = glow::COMPUTE_SHADER,
}

impl ShaderKind {
    /// Raw GL enumerant.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// A compiled shader object.
#[derive(Debug)]
pub struct Shader {
    handle: Handle,
    kind: ShaderKind,
}

impl Shader {
    /// Creates and compiles a shader.
    ///
    /// # Panics
    ///
    /// Fatal when compilation fails; the info log is part of the diagnostic.
    #[must_use]
    pub fn new(ctx: &Context, kind: ShaderKind, source: &str) -> Self {
        let gl = Rc::clone(ctx.gl());
        let deleter = Rc::clone(&gl);
        let handle = Handle::generate(|| gl.create_shader(kind.raw()), move |name| deleter.delete_shader(name));

        gl.shader_source(handle.name(), source);
        gl.compile_shader(handle.name());

        if !gl.shader_compile_status(handle.name()) {
            let log = gl.shader_info_log(handle.name());
            fatal(&format!("failed to compile {kind:?} shader:\n{log}"));
        }

        Self { handle, kind }
    }

    /// Native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// Stage this shader was compiled for.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ShaderKind {
        self.kind
    }
}
