//! Renderbuffers.

use crate::enums::InternalFormat;
use crate::handle::{Handle, ObjectKind};
use crate::state::Context;

/// A renderbuffer object.
#[derive(Debug)]
pub struct Renderbuffer {
    handle: Handle,
}

impl Renderbuffer {
    /// Allocates a renderbuffer without storage.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            handle: Handle::create(ctx.gl(), ObjectKind::Renderbuffer),
        }
    }

    /// Native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// Binds to `GL_RENDERBUFFER`.
    pub fn bind(&self, ctx: &mut Context) {
        ctx.bind_renderbuffer(self);
    }

    /// `glRenderbufferStorage`
    pub fn set_storage(&mut self, ctx: &mut Context, internal_format: InternalFormat, width: u32, height: u32) {
        self.bind(ctx);
        ctx.gl().renderbuffer_storage(internal_format.raw(), width, height);
    }

    /// `glRenderbufferStorageMultisample`
    pub fn set_storage_multisample(
        &mut self,
        ctx: &mut Context,
        internal_format: InternalFormat,
        width: u32,
        height: u32,
        samples: u32,
    ) {
        self.bind(ctx);
        ctx.gl()
            .renderbuffer_storage_multisample(samples, internal_format.raw(), width, height);
    }
}
