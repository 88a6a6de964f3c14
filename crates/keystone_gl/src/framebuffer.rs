//! # Framebuffers
//!
//! A [`Framebuffer`] owns its attachments. Each `attach_*` call creates the
//! backing texture or renderbuffer at the framebuffer's viewport size,
//! initializes it inside its own [`ContextScope`], then attaches it:
//!
//! ```text
//! attach_texture(Color(0), RGBA8)
//!   ├─ scope { set_empty_2d, CLAMP_TO_EDGE, LINEAR }   (bindings restored)
//!   └─ bind DRAW + glFramebufferTexture2D               (stays bound)
//! ```
//!
//! Attaching twice to the same point, and calling
//! [`Framebuffer::set_draw_buffers`] on an incomplete framebuffer, are fatal.

use std::collections::BTreeMap;
use std::ops::BitOr;

use crate::enums::InternalFormat;
use crate::error::fatal;
use crate::handle::{Handle, ObjectKind};
use crate::renderbuffer::Renderbuffer;
use crate::state::{Context, ContextScope, FramebufferTarget};
use crate::texture::{FilterFunction, Texture, TextureTarget, WrapMode};

// =============================================================================
// ATTACHMENT POINTS
// =============================================================================

/// Framebuffer attachment points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attachment {
    /// `GL_COLOR_ATTACHMENTi`
    Color(u32),
    /// `GL_DEPTH_ATTACHMENT`
    Depth,
    /// `GL_STENCIL_ATTACHMENT`
    Stencil,
    /// `GL_DEPTH_STENCIL_ATTACHMENT`
    DepthStencil,
}

impl Attachment {
    /// Raw GL enumerant.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Color(index) => glow::COLOR_ATTACHMENT0 + index,
            Self::Depth => glow::DEPTH_ATTACHMENT,
            Self::Stencil => glow::STENCIL_ATTACHMENT,
            Self::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

/// What backs an attachment point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Nothing attached.
    None,
    /// A 2D texture.
    Texture,
    /// A 2D multisample texture.
    TextureMultisample,
    /// A renderbuffer.
    Renderbuffer,
    /// A multisample renderbuffer.
    RenderbufferMultisample,
}

/// Buffers selected by [`Framebuffer::clear`] and [`Framebuffer::blit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearMask(u32);

impl ClearMask {
    /// `GL_COLOR_BUFFER_BIT`
    pub const COLOR: Self = Self(glow::COLOR_BUFFER_BIT);
    /// `GL_DEPTH_BUFFER_BIT`
    pub const DEPTH: Self = Self(glow::DEPTH_BUFFER_BIT);
    /// `GL_STENCIL_BUFFER_BIT`
    pub const STENCIL: Self = Self(glow::STENCIL_BUFFER_BIT);

    /// Raw bit mask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for ClearMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

enum Storage {
    Texture {
        texture: Texture,
        internal_format: InternalFormat,
    },
    TextureMultisample {
        texture: Texture,
        internal_format: InternalFormat,
        samples: u32,
    },
    Renderbuffer {
        buffer: Renderbuffer,
        internal_format: InternalFormat,
    },
    RenderbufferMultisample {
        buffer: Renderbuffer,
        internal_format: InternalFormat,
        samples: u32,
    },
}

impl Storage {
    const fn kind(&self) -> AttachmentKind {
        match self {
            Self::Texture { .. } => AttachmentKind::Texture,
            Self::TextureMultisample { .. } => AttachmentKind::TextureMultisample,
            Self::Renderbuffer { .. } => AttachmentKind::Renderbuffer,
            Self::RenderbufferMultisample { .. } => AttachmentKind::RenderbufferMultisample,
        }
    }
}

// =============================================================================
// FRAMEBUFFER
// =============================================================================

/// A framebuffer object and the storage attached to it.
pub struct Framebuffer {
    handle: Handle,
    viewport_width: u32,
    viewport_height: u32,
    attachments: BTreeMap<Attachment, Storage>,
    draw_buffers: Vec<u32>,
}

impl Framebuffer {
    /// Allocates an empty framebuffer whose attachments will be
    /// `viewport_width` by `viewport_height`.
    #[must_use]
    pub fn new(ctx: &Context, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            handle: Handle::create(ctx.gl(), ObjectKind::Framebuffer),
            viewport_width,
            viewport_height,
            attachments: BTreeMap::new(),
            draw_buffers: Vec::new(),
        }
    }

    /// The window-system framebuffer, sized to the context's default viewport.
    #[must_use]
    pub fn default_framebuffer(ctx: &Context) -> Self {
        let viewport = ctx.default_viewport();
        Self {
            handle: Handle::unowned(0),
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            attachments: BTreeMap::new(),
            draw_buffers: Vec::new(),
        }
    }

    /// A new framebuffer with the same attachment layout and draw buffers,
    /// at a different size.
    #[must_use]
    pub fn resized(&self, ctx: &mut Context, width: u32, height: u32) -> Self {
        let mut resized = Self::new(ctx, width, height);

        for (&attachment, storage) in &self.attachments {
            match *storage {
                Storage::Texture { internal_format, .. } => {
                    resized.attach_texture(ctx, attachment, internal_format);
                }
                Storage::TextureMultisample { internal_format, samples, .. } => {
                    resized.attach_texture_multisample(ctx, attachment, internal_format, samples);
                }
                Storage::Renderbuffer { internal_format, .. } => {
                    resized.attach_renderbuffer(ctx, attachment, internal_format);
                }
                Storage::RenderbufferMultisample { internal_format, samples, .. } => {
                    resized.attach_renderbuffer_multisample(ctx, attachment, internal_format, samples);
                }
            }
        }

        if !self.draw_buffers.is_empty() {
            resized.set_draw_buffers(ctx, &self.draw_buffers);
        }

        resized
    }

    /// Native name; 0 for the default framebuffer.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// Width of the viewport set when this framebuffer is bound for drawing.
    #[inline]
    #[must_use]
    pub const fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// Height of the viewport set when this framebuffer is bound for drawing.
    #[inline]
    #[must_use]
    pub const fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Binds to `GL_DRAW_FRAMEBUFFER`, which also sets the viewport.
    pub fn bind_for_drawing(&self, ctx: &mut Context) {
        ctx.bind_framebuffer(FramebufferTarget::Draw, self);
    }

    /// Binds to `GL_READ_FRAMEBUFFER`.
    pub fn bind_for_reading(&self, ctx: &mut Context) {
        ctx.bind_framebuffer(FramebufferTarget::Read, self);
    }

    /// Clears the selected buffers.
    pub fn clear(&self, ctx: &mut Context, mask: ClearMask) {
        self.bind_for_drawing(ctx);
        ctx.gl().clear(mask.bits());
    }

    /// Copies a region of this framebuffer into the currently draw-bound
    /// one. Rectangles are `[x, y, width, height]`.
    pub fn blit(&self, ctx: &mut Context, source: [i32; 4], destination: [i32; 4], mask: ClearMask, linear: bool) {
        self.bind_for_reading(ctx);

        let corners = |[x, y, width, height]: [i32; 4]| [x, y, x + width, y + height];
        let filter = if linear { glow::LINEAR } else { glow::NEAREST };
        ctx.gl()
            .blit_framebuffer(corners(source), corners(destination), mask.bits(), filter);
    }

    // -------------------------------------------------------------------------
    // Attachments
    // -------------------------------------------------------------------------

    /// Creates a linear, edge-clamped 2D texture and attaches it.
    pub fn attach_texture(&mut self, ctx: &mut Context, attachment: Attachment, internal_format: InternalFormat) {
        self.check_free(attachment);

        let mut texture = Texture::new(ctx, TextureTarget::Texture2D);
        {
            let mut scope = ContextScope::new(ctx);
            texture.set_empty_2d(&mut scope, self.viewport_width, self.viewport_height, internal_format);
            texture.set_wrap_s(&mut scope, WrapMode::ClampToEdge);
            texture.set_wrap_t(&mut scope, WrapMode::ClampToEdge);
            texture.set_minifying_filter(&mut scope, FilterFunction::Linear);
            if let Err(error) = texture.set_magnification_filter(&mut scope, FilterFunction::Linear) {
                fatal(&error.to_string());
            }
        }

        self.bind_for_drawing(ctx);
        ctx.gl().framebuffer_texture_2d(
            glow::DRAW_FRAMEBUFFER,
            attachment.raw(),
            TextureTarget::Texture2D.raw(),
            texture.name(),
        );

        self.attachments
            .insert(attachment, Storage::Texture { texture, internal_format });
    }

    /// Creates a 2D multisample texture and attaches it.
    pub fn attach_texture_multisample(
        &mut self,
        ctx: &mut Context,
        attachment: Attachment,
        internal_format: InternalFormat,
        samples: u32,
    ) {
        self.check_free(attachment);

        let mut texture = Texture::new(ctx, TextureTarget::Texture2DMultisample);
        {
            let mut scope = ContextScope::new(ctx);
            texture.initialize_multisample(
                &mut scope,
                self.viewport_width,
                self.viewport_height,
                internal_format,
                samples,
            );
        }

        self.bind_for_drawing(ctx);
        ctx.gl().framebuffer_texture_2d(
            glow::DRAW_FRAMEBUFFER,
            attachment.raw(),
            TextureTarget::Texture2DMultisample.raw(),
            texture.name(),
        );

        self.attachments.insert(
            attachment,
            Storage::TextureMultisample { texture, internal_format, samples },
        );
    }

    /// Creates a renderbuffer and attaches it.
    pub fn attach_renderbuffer(&mut self, ctx: &mut Context, attachment: Attachment, internal_format: InternalFormat) {
        self.check_free(attachment);

        let mut buffer = Renderbuffer::new(ctx);
        {
            let mut scope = ContextScope::new(ctx);
            buffer.set_storage(&mut scope, internal_format, self.viewport_width, self.viewport_height);
        }

        self.bind_for_drawing(ctx);
        ctx.gl()
            .framebuffer_renderbuffer(glow::DRAW_FRAMEBUFFER, attachment.raw(), buffer.name());

        self.attachments
            .insert(attachment, Storage::Renderbuffer { buffer, internal_format });
    }

    /// Creates a multisample renderbuffer and attaches it.
    pub fn attach_renderbuffer_multisample(
        &mut self,
        ctx: &mut Context,
        attachment: Attachment,
        internal_format: InternalFormat,
        samples: u32,
    ) {
        self.check_free(attachment);

        let mut buffer = Renderbuffer::new(ctx);
        {
            let mut scope = ContextScope::new(ctx);
            buffer.set_storage_multisample(
                &mut scope,
                internal_format,
                self.viewport_width,
                self.viewport_height,
                samples,
            );
        }

        self.bind_for_drawing(ctx);
        ctx.gl()
            .framebuffer_renderbuffer(glow::DRAW_FRAMEBUFFER, attachment.raw(), buffer.name());

        self.attachments.insert(
            attachment,
            Storage::RenderbufferMultisample { buffer, internal_format, samples },
        );
    }

    /// What backs `attachment`.
    #[must_use]
    pub fn attachment_kind(&self, attachment: Attachment) -> AttachmentKind {
        self.attachments
            .get(&attachment)
            .map_or(AttachmentKind::None, Storage::kind)
    }

    /// Texture attached at `attachment`, if it is a plain 2D texture.
    #[must_use]
    pub fn texture(&self, attachment: Attachment) -> Option<&Texture> {
        match self.attachments.get(&attachment)? {
            Storage::Texture { texture, .. } => Some(texture),
            _ => None,
        }
    }

    /// Texture attached at `attachment`, if it is a multisample texture.
    #[must_use]
    pub fn texture_multisample(&self, attachment: Attachment) -> Option<&Texture> {
        match self.attachments.get(&attachment)? {
            Storage::TextureMultisample { texture, .. } => Some(texture),
            _ => None,
        }
    }

    /// Renderbuffer attached at `attachment`, single or multisample.
    #[must_use]
    pub fn renderbuffer(&self, attachment: Attachment) -> Option<&Renderbuffer> {
        match self.attachments.get(&attachment)? {
            Storage::Renderbuffer { buffer, .. } | Storage::RenderbufferMultisample { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Selects the color attachments drawn to, then verifies completeness.
    ///
    /// # Panics
    ///
    /// Fatal when the framebuffer is incomplete.
    pub fn set_draw_buffers(&mut self, ctx: &mut Context, color_attachments: &[u32]) {
        self.bind_for_drawing(ctx);

        let buffers: Vec<u32> = color_attachments
            .iter()
            .map(|&index| Attachment::Color(index).raw())
            .collect();
        ctx.gl().draw_buffers(&buffers);

        let status = ctx.gl().check_framebuffer_status(glow::DRAW_FRAMEBUFFER);
        if status != glow::FRAMEBUFFER_COMPLETE {
            fatal(&format!("framebuffer {} is not complete (0x{status:x})", self.name()));
        }

        self.draw_buffers = color_attachments.to_vec();
    }

    /// Color attachment indices last passed to
    /// [`set_draw_buffers`](Self::set_draw_buffers).
    #[must_use]
    pub fn draw_buffers(&self) -> &[u32] {
        &self.draw_buffers
    }

    fn check_free(&self, attachment: Attachment) {
        if self.attachments.contains_key(&attachment) {
            fatal(&format!(
                "framebuffer {} already has an attachment at 0x{:x}",
                self.name(),
                attachment.raw()
            ));
        }
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self
            .attachments
            .iter()
            .map(|(attachment, storage)| (*attachment, storage.kind()))
            .collect();

        f.debug_struct("Framebuffer")
            .field("name", &self.name())
            .field("viewport", &(self.viewport_width, self.viewport_height))
            .field("attachments", &kinds)
            .field("draw_buffers", &self.draw_buffers)
            .finish()
    }
}
