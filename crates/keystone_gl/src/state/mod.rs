//! # Stack-Scoped GL State
//!
//! The [`Context`] tracks every piece of GL state the engine touches as a
//! stack of sparse overlay frames:
//!
//! ```text
//! ┌──────────────────────────┐  top   effective(key) = first overlay entry
//! │ frame 2: {DEPTH_TEST: on} │        found walking down, else the root
//! ├──────────────────────────┤        default (0, a constant, or the value
//! │ frame 1: {ARRAY: 7}       │        queried once from the driver)
//! ├──────────────────────────┤
//! │ frame 0 (root)            │
//! └──────────────────────────┘
//! ```
//!
//! Every mutator compares against the effective value first and issues no
//! native call when nothing changes. A frame only records values that differ
//! from its parent, so [`Context::pop`] re-issues exactly the calls needed
//! to bring the GPU back to the parent's state.
//!
//! The active texture unit is the exception: there is one unit register
//! shared by all frames, and it is never restored on pop.

mod bindings;
mod enables;
mod functions;

pub use bindings::FramebufferTarget;
pub use functions::{BlendFunction, ScissorRect, StencilFunction, StencilOperation};

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::backend::GlBackend;
use crate::capabilities::Capabilities;
use crate::config::ContextConfig;
use crate::debug::DEBUG_LOG_BATCH;
use crate::enums::Capability;
use crate::error::fatal;

use bindings::BindingKey;
use functions::{FunctionKey, FunctionState};

/// Viewport dimensions; the origin is always (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One push scope's worth of overridden state.
#[derive(Debug, Default)]
struct Frame {
    bindings: BTreeMap<BindingKey, u32>,
    viewport: Option<Viewport>,
    enables: BTreeMap<Capability, bool>,
    functions: BTreeMap<FunctionKey, FunctionState>,
}

impl Frame {
    fn is_empty(&self) -> bool {
        self.bindings.is_empty()
            && self.viewport.is_none()
            && self.enables.is_empty()
            && self.functions.is_empty()
    }
}

/// The GL state stack of one GL context.
///
/// `!Send`: a GL context is current on exactly one thread.
pub struct Context {
    gl: Rc<dyn GlBackend>,
    default_viewport: Viewport,
    frames: Vec<Frame>,
    active_texture_unit: u32,
    enable_defaults: RefCell<HashMap<Capability, bool>>,
    capabilities: Capabilities,
}

impl Context {
    /// Creates a context whose default framebuffer is `width` x `height`.
    #[must_use]
    pub fn new(gl: Rc<dyn GlBackend>, width: u32, height: u32) -> Self {
        tracing::info!("GL context created, default viewport {width}x{height}");

        Self {
            capabilities: Capabilities::new(Rc::clone(&gl)),
            gl,
            default_viewport: Viewport::new(width, height),
            frames: vec![Frame::default()],
            active_texture_unit: 0,
            enable_defaults: RefCell::new(HashMap::new()),
        }
    }

    /// Creates a context from a loaded configuration.
    #[must_use]
    pub fn from_config(gl: Rc<dyn GlBackend>, config: &ContextConfig) -> Self {
        let mut ctx = Self::new(gl, config.viewport_width, config.viewport_height);
        if config.debug_output {
            ctx.enable_debug_output();
        }
        ctx
    }

    /// Turns on driver debug output. Returns `false` when the context was
    /// not created with the debug flag.
    pub fn enable_debug_output(&mut self) -> bool {
        let granted = self.gl.enable_debug_output();
        if granted {
            tracing::info!("GL debug output enabled");
        } else {
            tracing::warn!("GL debug output unavailable: context lacks the debug flag");
        }
        granted
    }

    /// Routes every pending driver debug message to `tracing` and returns
    /// how many there were. Call once per frame.
    pub fn flush_debug_messages(&self) -> usize {
        let mut routed = 0;
        loop {
            let batch = self.gl.debug_messages(DEBUG_LOG_BATCH);
            for message in &batch {
                message.route();
            }
            routed += batch.len();

            if batch.len() < usize::try_from(DEBUG_LOG_BATCH).unwrap_or(usize::MAX) {
                return routed;
            }
        }
    }

    /// The native backend.
    #[inline]
    #[must_use]
    pub fn gl(&self) -> &Rc<dyn GlBackend> {
        &self.gl
    }

    /// Cached implementation limits.
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Size of the default framebuffer.
    #[inline]
    #[must_use]
    pub const fn default_viewport(&self) -> Viewport {
        self.default_viewport
    }

    /// Number of frames on the stack, the root included.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    // =========================================================================
    // STACK
    // =========================================================================

    /// Opens a new frame on top of the stack.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
        tracing::debug!(depth = self.frames.len(), "push GL state");
    }

    /// Closes the top frame, restoring everything it changed to the parent's
    /// effective values.
    ///
    /// Popping the root frame is fatal.
    pub fn pop(&mut self) {
        if self.frames.len() <= 1 {
            fatal("OpenGL state stack underflow");
        }

        let Some(frame) = self.frames.pop() else {
            fatal("OpenGL state stack underflow");
        };

        tracing::debug!(depth = self.frames.len(), restored = !frame.is_empty(), "pop GL state");

        self.restore_bindings(&frame);
        self.restore_enables(&frame);
        self.restore_functions(&frame);
    }

    /// Fatal unless only the root frame remains.
    pub fn check_stack_consistency(&self) {
        if self.frames.len() != 1 {
            fatal(&format!(
                "OpenGL state stack inconsistent: {} frames left, push and pop must balance",
                self.frames.len() - 1
            ));
        }
    }

    /// Pushes a frame that is popped when the returned guard drops.
    pub fn scope(&mut self) -> ContextScope<'_> {
        ContextScope::new(self)
    }

    // =========================================================================
    // OVERLAY PLUMBING
    // =========================================================================

    /// Frames visible from the top of the stack.
    #[inline]
    fn current(&self) -> usize {
        self.frames.len()
    }

    /// Frames visible from the parent of the top frame. 0 at the root, which
    /// makes every lookup fall through to the default.
    #[inline]
    fn parent(&self) -> usize {
        self.frames.len() - 1
    }

    /// Effective value over the bottom `visible` frames.
    fn lookup<T: Copy>(&self, visible: usize, select: impl Fn(&Frame) -> Option<T>) -> Option<T> {
        self.frames[..visible].iter().rev().find_map(select)
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.check_stack_consistency();
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("default_viewport", &self.default_viewport)
            .field("depth", &self.frames.len())
            .field("active_texture_unit", &self.active_texture_unit)
            .finish_non_exhaustive()
    }
}

/// RAII frame: pushes on creation, pops on drop.
///
/// Dereferences to the [`Context`], so state set through the guard lives
/// exactly as long as the guard.
pub struct ContextScope<'a> {
    ctx: &'a mut Context,
}

impl<'a> ContextScope<'a> {
    /// Pushes a frame onto `ctx`.
    pub fn new(ctx: &'a mut Context) -> Self {
        ctx.push();
        Self { ctx }
    }
}

impl Deref for ContextScope<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for ContextScope<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.ctx.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    fn context() -> (Rc<RecordingBackend>, Context) {
        let recording = Rc::new(RecordingBackend::new());
        let ctx = Context::new(recording.clone(), 800, 600);
        (recording, ctx)
    }

    #[test]
    fn test_push_pop_depth() {
        let (_, mut ctx) = context();
        assert_eq!(ctx.depth(), 1);

        ctx.push();
        ctx.push();
        assert_eq!(ctx.depth(), 3);

        ctx.pop();
        ctx.pop();
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_scope_pops_on_drop() {
        let (_, mut ctx) = context();
        {
            let mut scope = ctx.scope();
            let inner = scope.scope();
            assert_eq!(inner.depth(), 3);
        }
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_pop_root_is_fatal() {
        let (_, mut ctx) = context();
        ctx.pop();
    }

    #[test]
    #[should_panic(expected = "inconsistent")]
    fn test_unbalanced_stack_is_fatal() {
        let (_, mut ctx) = context();
        ctx.push();
        ctx.check_stack_consistency();
    }

    #[test]
    fn test_empty_frame_pops_silently() {
        let (recording, mut ctx) = context();
        ctx.push();
        ctx.pop();
        assert_eq!(recording.call_count(), 0);
    }
}
