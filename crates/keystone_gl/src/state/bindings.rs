//! Object bindings: buffers, framebuffers (with their viewport),
//! renderbuffers, textures, vertex arrays and the current program.

use super::{Context, Frame, Viewport};
use crate::buffer::{Buffer, BufferTarget};
use crate::error::fatal;
use crate::framebuffer::Framebuffer;
use crate::program::Program;
use crate::renderbuffer::Renderbuffer;
use crate::texture::{Texture, TextureTarget};
use crate::vertex_array::VertexArray;

/// Framebuffer binding points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// `GL_DRAW_FRAMEBUFFER`; also sets the viewport.
    Draw,
    /// `GL_READ_FRAMEBUFFER`
    Read,
    /// Draw, then read.
    Both,
}

/// A single tracked binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum BindingKey {
    Buffer(BufferTarget),
    DrawFramebuffer,
    ReadFramebuffer,
    Renderbuffer,
    Texture(u32, TextureTarget),
    VertexArray,
    Program,
}

impl Context {
    // =========================================================================
    // BINDERS
    // =========================================================================

    /// Binds `buffer` to its target.
    pub fn bind_buffer(&mut self, buffer: &Buffer) {
        self.bind_buffer_name(buffer.target(), buffer.name());
    }

    /// Binds a raw buffer name; 0 unbinds.
    pub fn bind_buffer_name(&mut self, target: BufferTarget, name: u32) {
        self.bind(BindingKey::Buffer(target), name);
    }

    /// Binds `framebuffer`. Binding for drawing also sets the viewport to
    /// the framebuffer's size.
    pub fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: &Framebuffer) {
        self.bind_framebuffer_name(
            target,
            framebuffer.name(),
            Viewport::new(framebuffer.viewport_width(), framebuffer.viewport_height()),
        );
    }

    /// Binds the default framebuffer with the default viewport.
    pub fn bind_default_framebuffer(&mut self, target: FramebufferTarget) {
        self.bind_framebuffer_name(target, 0, self.default_viewport);
    }

    /// Binds a raw framebuffer name with the viewport it implies.
    pub fn bind_framebuffer_name(&mut self, target: FramebufferTarget, name: u32, viewport: Viewport) {
        match target {
            FramebufferTarget::Both => {
                self.bind_framebuffer_name(FramebufferTarget::Draw, name, viewport);
                self.bind_framebuffer_name(FramebufferTarget::Read, name, viewport);
            }
            FramebufferTarget::Draw => {
                if self.bind(BindingKey::DrawFramebuffer, name) {
                    self.set_viewport(viewport);
                }
            }
            FramebufferTarget::Read => {
                self.bind(BindingKey::ReadFramebuffer, name);
            }
        }
    }

    /// Binds `renderbuffer`.
    pub fn bind_renderbuffer(&mut self, renderbuffer: &Renderbuffer) {
        self.bind_renderbuffer_name(renderbuffer.name());
    }

    /// Binds a raw renderbuffer name; 0 unbinds.
    pub fn bind_renderbuffer_name(&mut self, name: u32) {
        self.bind(BindingKey::Renderbuffer, name);
    }

    /// Binds `texture` to texture unit `unit`.
    pub fn bind_texture(&mut self, unit: u32, texture: &Texture) {
        self.bind_texture_name(unit, texture.target(), texture.name());
    }

    /// Binds a raw texture name to `target` on `unit`; 0 unbinds.
    pub fn bind_texture_name(&mut self, unit: u32, target: TextureTarget, name: u32) {
        self.bind(BindingKey::Texture(unit, target), name);
    }

    /// Unbinds whatever is bound to `target` on `unit`.
    pub fn clear_texture(&mut self, unit: u32, target: TextureTarget) {
        self.bind_texture_name(unit, target, 0);
    }

    /// Binds `vertex_array`.
    pub fn bind_vertex_array(&mut self, vertex_array: &VertexArray) {
        self.bind_vertex_array_name(vertex_array.name());
    }

    /// Binds a raw vertex array name; 0 unbinds.
    pub fn bind_vertex_array_name(&mut self, name: u32) {
        self.bind(BindingKey::VertexArray, name);
    }

    /// Makes `program` current. Using a program that is not linked is fatal.
    pub fn use_program(&mut self, program: &Program) {
        if !program.is_linked() {
            fatal("cannot use a program that has not been linked");
        }

        self.use_program_name(program.name());
    }

    /// Makes no program current.
    pub fn clear_program(&mut self) {
        self.use_program_name(0);
    }

    pub(crate) fn use_program_name(&mut self, name: u32) {
        self.bind(BindingKey::Program, name);
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    /// Buffer bound to `target`.
    #[must_use]
    pub fn bound_buffer(&self, target: BufferTarget) -> u32 {
        self.binding_at(self.current(), BindingKey::Buffer(target))
    }

    /// Framebuffer bound for drawing or reading. `Both` reports the draw
    /// binding.
    #[must_use]
    pub fn bound_framebuffer(&self, target: FramebufferTarget) -> u32 {
        let key = match target {
            FramebufferTarget::Draw | FramebufferTarget::Both => BindingKey::DrawFramebuffer,
            FramebufferTarget::Read => BindingKey::ReadFramebuffer,
        };
        self.binding_at(self.current(), key)
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport_at(self.current())
    }

    /// Bound renderbuffer.
    #[must_use]
    pub fn bound_renderbuffer(&self) -> u32 {
        self.binding_at(self.current(), BindingKey::Renderbuffer)
    }

    /// Texture bound to `target` on `unit`.
    #[must_use]
    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> u32 {
        self.binding_at(self.current(), BindingKey::Texture(unit, target))
    }

    /// Bound vertex array.
    #[must_use]
    pub fn bound_vertex_array(&self) -> u32 {
        self.binding_at(self.current(), BindingKey::VertexArray)
    }

    /// Current program.
    #[must_use]
    pub fn current_program(&self) -> u32 {
        self.binding_at(self.current(), BindingKey::Program)
    }

    /// The global active texture unit. Not scoped by push/pop.
    #[must_use]
    pub const fn active_texture_unit(&self) -> u32 {
        self.active_texture_unit
    }

    // =========================================================================
    // OVERLAY
    // =========================================================================

    fn binding_at(&self, visible: usize, key: BindingKey) -> u32 {
        self.lookup(visible, |frame| frame.bindings.get(&key).copied())
            .unwrap_or(0)
    }

    fn viewport_at(&self, visible: usize) -> Viewport {
        self.lookup(visible, |frame| frame.viewport)
            .unwrap_or(self.default_viewport)
    }

    /// Binds `name` at `key`. Returns `true` if a native call was issued.
    fn bind(&mut self, key: BindingKey, name: u32) -> bool {
        if self.binding_at(self.current(), key) == name {
            return false;
        }

        self.apply_binding(key, name);

        let inherited = self.binding_at(self.parent(), key);
        let top = self.top_mut();
        if inherited == name {
            top.bindings.remove(&key);
        } else {
            top.bindings.insert(key, name);
        }

        true
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport_at(self.current()) == viewport {
            return;
        }

        self.apply_viewport(viewport);

        let inherited = self.viewport_at(self.parent());
        self.top_mut().viewport = (inherited != viewport).then_some(viewport);
    }

    fn activate_texture_unit(&mut self, unit: u32) {
        if self.active_texture_unit != unit {
            self.gl.active_texture(unit);
            self.active_texture_unit = unit;
        }
    }

    fn apply_binding(&mut self, key: BindingKey, name: u32) {
        tracing::trace!(?key, name, "bind");

        match key {
            BindingKey::Buffer(target) => self.gl.bind_buffer(target.raw(), name),
            BindingKey::DrawFramebuffer => self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, name),
            BindingKey::ReadFramebuffer => self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, name),
            BindingKey::Renderbuffer => self.gl.bind_renderbuffer(name),
            BindingKey::Texture(unit, target) => {
                self.activate_texture_unit(unit);
                self.gl.bind_texture(target.raw(), name);
            }
            BindingKey::VertexArray => self.gl.bind_vertex_array(name),
            BindingKey::Program => self.gl.use_program(name),
        }
    }

    fn apply_viewport(&self, viewport: Viewport) {
        tracing::trace!(width = viewport.width, height = viewport.height, "viewport");
        self.gl.viewport(0, 0, viewport.width, viewport.height);
    }

    /// Re-issues the parent's value for everything `frame` overrode.
    pub(super) fn restore_bindings(&mut self, frame: &Frame) {
        for &key in frame.bindings.keys() {
            let name = self.binding_at(self.current(), key);
            self.apply_binding(key, name);
        }

        if frame.viewport.is_some() {
            self.apply_viewport(self.viewport_at(self.current()));
        }
    }
}
