//! # Shader Programs
//!
//! A [`Program`] is built in two phases: shaders are attached while it is
//! unlinked, then [`Program::link`] freezes it. Modifying a linked program
//! and using an unlinked one are both fatal.
//!
//! Uniform locations are looked up once per name and cached.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::fatal;
use crate::handle::{Handle, ObjectKind};
use crate::shader::{Shader, ShaderKind};
use crate::state::Context;
use crate::uniform::Uniform;

/// A shader program.
#[derive(Debug)]
pub struct Program {
    handle: Handle,
    linked: bool,
    attached: Vec<u32>,
    owned_shaders: Vec<Shader>,
    uniforms: RefCell<HashMap<String, Uniform>>,
}

impl Program {
    /// Creates an empty, unlinked program.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            handle: Handle::create(ctx.gl(), ObjectKind::Program),
            linked: false,
            attached: Vec::new(),
            owned_shaders: Vec::new(),
            uniforms: RefCell::new(HashMap::new()),
        }
    }

    /// Native name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> u32 {
        self.handle.name()
    }

    /// `true` once [`link`](Self::link) succeeded.
    #[inline]
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.linked
    }

    /// Attaches a compiled shader.
    pub fn attach_shader(&mut self, ctx: &Context, shader: &Shader) {
        self.ensure_not_linked();
        ctx.gl().attach_shader(self.name(), shader.name());
        self.attached.push(shader.name());
    }

    /// Compiles `source` and attaches it. The shader lives until linking.
    pub fn attach_source(&mut self, ctx: &Context, kind: ShaderKind, source: &str) {
        let shader = Shader::new(ctx, kind, source);
        self.attach_shader(ctx, &shader);
        self.owned_shaders.push(shader);
    }

    /// Links the program and detaches its shaders.
    ///
    /// # Panics
    ///
    /// Fatal when already linked or when linking fails.
    pub fn link(&mut self, ctx: &Context) {
        self.ensure_not_linked();

        let gl = ctx.gl();
        let name = self.name();
        gl.link_program(name);

        if !gl.program_link_status(name) {
            let log = gl.program_info_log(name);
            fatal(&format!("failed to link program {name}:\n{log}"));
        }

        for shader in self.attached.drain(..) {
            gl.detach_shader(name, shader);
        }
        self.owned_shaders.clear();
        self.linked = true;

        tracing::debug!(program = name, "linked");
    }

    /// Makes this program current.
    pub fn use_program(&self, ctx: &mut Context) {
        ctx.use_program(self);
    }

    /// Uniform `name`. Missing uniforms yield an invalid [`Uniform`] whose
    /// setters do nothing; the first lookup logs a warning.
    ///
    /// # Panics
    ///
    /// Fatal when the program is not linked.
    #[must_use]
    pub fn uniform(&self, ctx: &Context, name: &str) -> Uniform {
        self.lookup(ctx, name, true)
    }

    /// `true` if the linked program has an active uniform `name`.
    ///
    /// # Panics
    ///
    /// Fatal when the program is not linked.
    #[must_use]
    pub fn has_uniform(&self, ctx: &Context, name: &str) -> bool {
        self.lookup(ctx, name, false).is_valid()
    }

    fn lookup(&self, ctx: &Context, name: &str, warn: bool) -> Uniform {
        self.ensure_linked();

        if let Some(uniform) = self.uniforms.borrow().get(name) {
            return *uniform;
        }

        let uniform = Uniform::new(self.name(), ctx.gl().uniform_location(self.name(), name));
        if warn && !uniform.is_valid() {
            tracing::warn!(program = self.name(), uniform = name, "uniform not found");
        }

        self.uniforms.borrow_mut().insert(name.to_owned(), uniform);
        uniform
    }

    fn ensure_linked(&self) {
        if !self.linked {
            fatal(&format!("program {} is not linked", self.name()));
        }
    }

    fn ensure_not_linked(&self) {
        if self.linked {
            fatal(&format!("program {} is already linked and cannot be modified", self.name()));
        }
    }
}
