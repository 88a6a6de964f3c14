//! # Native Object Handles
//!
//! [`Handle`] owns exactly one native GL name. It is move-only: ownership
//! moves with the value and the deleter runs once, from `Drop`. A handle
//! whose name is 0 (allocation failed, released, or never owned) deletes
//! nothing, and binding it unbinds.

use std::fmt;
use std::rc::Rc;

use crate::backend::GlBackend;

/// Kinds of native objects [`Handle::create`] can allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `glGenBuffers`
    Buffer,
    /// `glGenTextures`
    Texture,
    /// `glGenRenderbuffers`
    Renderbuffer,
    /// `glGenFramebuffers`
    Framebuffer,
    /// `glGenVertexArrays`
    VertexArray,
    /// `glCreateProgram`
    Program,
}

type Deleter = Box<dyn Fn(u32)>;

/// RAII owner of one native GL name.
pub struct Handle {
    name: u32,
    deleter: Option<Deleter>,
}

impl Handle {
    /// Allocates a name with `generator`; `deleter` runs on drop.
    pub fn generate(generator: impl FnOnce() -> u32, deleter: impl Fn(u32) + 'static) -> Self {
        Self::from_raw(generator(), deleter)
    }

    /// Takes ownership of an existing name.
    pub fn from_raw(name: u32, deleter: impl Fn(u32) + 'static) -> Self {
        Self {
            name,
            deleter: Some(Box::new(deleter)),
        }
    }

    /// Wraps a name that is never deleted, such as the default framebuffer.
    #[must_use]
    pub const fn unowned(name: u32) -> Self {
        Self { name, deleter: None }
    }

    /// Allocates one object of `kind` through `gl`.
    #[must_use]
    pub fn create(gl: &Rc<dyn GlBackend>, kind: ObjectKind) -> Self {
        let name = match kind {
            ObjectKind::Buffer => gl.create_buffer(),
            ObjectKind::Texture => gl.create_texture(),
            ObjectKind::Renderbuffer => gl.create_renderbuffer(),
            ObjectKind::Framebuffer => gl.create_framebuffer(),
            ObjectKind::VertexArray => gl.create_vertex_array(),
            ObjectKind::Program => gl.create_program(),
        };

        if name == 0 {
            tracing::warn!("{kind:?} allocation returned name 0");
        }

        let gl = Rc::clone(gl);
        Self::from_raw(name, move |name| match kind {
            ObjectKind::Buffer => gl.delete_buffer(name),
            ObjectKind::Texture => gl.delete_texture(name),
            ObjectKind::Renderbuffer => gl.delete_renderbuffer(name),
            ObjectKind::Framebuffer => gl.delete_framebuffer(name),
            ObjectKind::VertexArray => gl.delete_vertex_array(name),
            ObjectKind::Program => gl.delete_program(name),
        })
    }

    /// Raw native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.name
    }

    /// `true` if the name is not 0.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.name != 0
    }

    /// Gives up ownership and returns the name. The handle is left holding 0.
    #[must_use = "the released name is no longer deleted automatically"]
    pub fn release(&mut self) -> u32 {
        self.deleter = None;
        std::mem::take(&mut self.name)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.name == 0 {
            return;
        }

        if let Some(deleter) = &self.deleter {
            deleter(self.name);
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("name", &self.name)
            .field("owned", &self.deleter.is_some())
            .finish()
    }
}
