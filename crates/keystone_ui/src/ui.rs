//! # UI Root
//!
//! Owns the top-level [`Container`] and the window size it is laid out in.

use keystone_gl::Context;

use crate::container::Container;
use crate::config::UiConfig;
use crate::element::{Element, ElementId, ElementState};
use crate::error::ConstraintResult;

/// The root of an element hierarchy.
#[derive(Debug)]
pub struct Ui {
    container: Container,
    width: u32,
    height: u32,
    default_element_size: (u32, u32),
}

impl Ui {
    /// An empty UI for a `width` × `height` window.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(&UiConfig {
            width,
            height,
            ..UiConfig::default()
        })
    }

    /// An empty UI sized by `config`.
    #[must_use]
    pub fn from_config(config: &UiConfig) -> Self {
        tracing::info!(width = config.width, height = config.height, "ui created");
        Self {
            container: Container::new(),
            width: config.width,
            height: config.height,
            default_element_size: (config.default_element_width, config.default_element_height),
        }
    }

    /// Window width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Window height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Element state carrying the configured default size.
    #[must_use]
    pub fn element_state(&self) -> ElementState {
        ElementState::with_default_size(self.default_element_size.0, self.default_element_size.1)
    }

    /// Root container.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Root container, mutably.
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Replaces the root container, returning the old one.
    pub fn set_container(&mut self, container: Container) -> Container {
        std::mem::replace(&mut self.container, container)
    }

    /// Changes the window size and lays out again.
    ///
    /// # Errors
    ///
    /// Layout errors from [`Container::layout`].
    pub fn resize(&mut self, width: u32, height: u32) -> ConstraintResult<()> {
        self.width = width;
        self.height = height;
        self.layout()
    }

    /// Lays out the root container at the current window size.
    ///
    /// # Errors
    ///
    /// Layout errors from [`Container::layout`].
    pub fn layout(&mut self) -> ConstraintResult<()> {
        self.container.layout(self.width, self.height)
    }

    /// Draws every element inside one scope for the whole UI.
    pub fn draw(&self, ctx: &mut Context, time: f32, dt: f32) {
        let mut scope = ctx.scope();
        self.container.draw(&mut scope, time, dt);
    }

    /// See [`Container::element_at`].
    #[must_use]
    pub fn element_at(&self, x: i32, y: i32) -> Option<ElementId> {
        self.container.element_at(x, y)
    }

    /// See [`Container::opaque_element_at`].
    #[must_use]
    pub fn opaque_element_at(&self, x: i32, y: i32) -> Option<ElementId> {
        self.container.opaque_element_at(x, y)
    }
}
