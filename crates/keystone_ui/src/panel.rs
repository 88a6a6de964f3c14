//! Solid-color rectangle.

use keystone_gl::{Capability, ClearMask, Context};

use crate::element::{Element, ElementState};

/// Fills its bounds with one color by clearing a scissored region of the
/// current draw framebuffer.
#[derive(Debug, PartialEq)]
pub struct Panel {
    state: ElementState,
    color: [f32; 4],
    opaque: bool,
}

impl Panel {
    /// An opaque panel with the default element size.
    #[must_use]
    pub fn new(color: [f32; 4]) -> Self {
        Self {
            state: ElementState::new(),
            color,
            opaque: true,
        }
    }

    /// An opaque panel with the given default size.
    #[must_use]
    pub fn with_default_size(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            state: ElementState::with_default_size(width, height),
            color,
            opaque: true,
        }
    }

    /// Makes the panel invisible to [`opaque_element_at`](crate::Container::opaque_element_at).
    #[must_use]
    pub fn transparent(mut self) -> Self {
        self.opaque = false;
        self
    }

    /// Fill color.
    #[must_use]
    pub const fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Changes the fill color.
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }
}

impl Element for Panel {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn draw(&self, ctx: &mut Context, _time: f32, _dt: f32) {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return;
        }

        // Scissor origin is bottom-left.
        let height = i64::from(ctx.viewport().height);
        let y = height - i64::try_from(bounds.bottom()).unwrap_or(i64::MAX);
        let x = i32::try_from(bounds.x).unwrap_or(i32::MAX);
        let y = i32::try_from(y).unwrap_or(if y < 0 { i32::MIN } else { i32::MAX });

        ctx.enable(Capability::ScissorTest);
        ctx.set_scissor(x, y, bounds.width, bounds.height);
        let [red, green, blue, alpha] = self.color;
        ctx.set_clear_color(red, green, blue, alpha);
        ctx.gl().clear(ClearMask::COLOR.bits());
    }

    fn is_opaque(&self) -> bool {
        self.opaque
    }
}
