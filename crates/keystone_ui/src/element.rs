//! # Elements
//!
//! An [`Element`] is anything a container can place and draw. The container
//! only computes and assigns bounds; how an element renders is its own
//! business.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use keystone_gl::Context;

use crate::bounds::Bounds;
use crate::container::Container;
use crate::error::ConstraintResult;

/// Default size of an element that never had one set.
pub const DEFAULT_ELEMENT_SIZE: (u32, u32) = (20, 20);

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocates a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Per-element data shared by every [`Element`] implementation.
#[derive(Debug, PartialEq, Eq)]
pub struct ElementState {
    id: ElementId,
    bounds: Bounds,
    default_size: (u32, u32),
    initialized: bool,
}

impl ElementState {
    /// Fresh state with a new id and the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_size(DEFAULT_ELEMENT_SIZE.0, DEFAULT_ELEMENT_SIZE.1)
    }

    /// Fresh state with a new id and the given default size.
    #[must_use]
    pub fn with_default_size(width: u32, height: u32) -> Self {
        Self {
            id: ElementId::next(),
            bounds: Bounds::ZERO,
            default_size: (width, height),
            initialized: false,
        }
    }

    /// The element's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// `true` once bounds were assigned or initialized.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for ElementState {
    fn default() -> Self {
        Self::new()
    }
}

/// A placeable, drawable UI element.
pub trait Element {
    /// Shared element data.
    fn state(&self) -> &ElementState;

    /// Shared element data, mutably.
    fn state_mut(&mut self) -> &mut ElementState;

    /// Draws the element. The caller has already pushed a state scope.
    fn draw(&self, ctx: &mut Context, time: f32, dt: f32);

    /// Called after the bounds changed.
    ///
    /// # Errors
    ///
    /// Containers propagate failures from laying out their children.
    fn on_resize(&mut self) -> ConstraintResult<()> {
        Ok(())
    }

    /// Transparent elements are skipped by
    /// [`Container::opaque_element_at`].
    fn is_opaque(&self) -> bool {
        true
    }

    /// Downcast for hit-testing into nested containers.
    fn as_container(&self) -> Option<&Container> {
        None
    }

    /// Mutable downcast.
    fn as_container_mut(&mut self) -> Option<&mut Container> {
        None
    }

    /// Identity.
    fn id(&self) -> ElementId {
        self.state().id
    }

    /// Current bounds.
    fn bounds(&self) -> Bounds {
        self.state().bounds
    }

    /// Size applied by [`initialize_bounds`](Self::initialize_bounds).
    fn default_size(&self) -> (u32, u32) {
        self.state().default_size
    }

    /// Changes the default size.
    fn set_default_size(&mut self, width: u32, height: u32) {
        self.state_mut().default_size = (width, height);
    }

    /// Applies the default size once, unless bounds were already set.
    fn initialize_bounds(&mut self) {
        let state = self.state_mut();
        if !state.initialized {
            let (width, height) = state.default_size;
            state.bounds.width = width;
            state.bounds.height = height;
            state.initialized = true;
        }
    }

    /// Assigns bounds and fires [`on_resize`](Self::on_resize) if they
    /// changed.
    ///
    /// # Errors
    ///
    /// Whatever `on_resize` returns.
    fn set_bounds(&mut self, bounds: Bounds) -> ConstraintResult<()> {
        let state = self.state_mut();
        state.initialized = true;
        if state.bounds == bounds {
            return Ok(());
        }
        state.bounds = bounds;
        self.on_resize()
    }
}

impl fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id())
            .field("bounds", &self.bounds())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counted {
        state: ElementState,
        resizes: u32,
    }

    impl Element for Counted {
        fn state(&self) -> &ElementState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ElementState {
            &mut self.state
        }

        fn draw(&self, _ctx: &mut Context, _time: f32, _dt: f32) {}

        fn on_resize(&mut self) -> ConstraintResult<()> {
            self.resizes += 1;
            Ok(())
        }
    }

    fn counted() -> Counted {
        Counted {
            state: ElementState::new(),
            resizes: 0,
        }
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ElementId::next(), ElementId::next());
        assert_ne!(counted().id(), counted().id());
    }

    #[test]
    fn test_initialize_applies_default_once() {
        let mut p = counted();
        p.initialize_bounds();
        assert_eq!(p.bounds(), Bounds::new(0, 0, 20, 20));

        p.set_default_size(50, 50);
        p.initialize_bounds();
        assert_eq!(p.bounds(), Bounds::new(0, 0, 20, 20));
    }

    #[test]
    fn test_explicit_bounds_win_over_default() {
        let mut p = counted();
        p.set_bounds(Bounds::new(1, 2, 3, 4)).unwrap();
        p.initialize_bounds();

        assert_eq!(p.bounds(), Bounds::new(1, 2, 3, 4));
        assert!(p.state().is_initialized());
    }

    #[test]
    fn test_resize_fires_on_change_only() {
        let mut p = counted();
        p.set_bounds(Bounds::new(0, 0, 10, 10)).unwrap();
        p.set_bounds(Bounds::new(0, 0, 10, 10)).unwrap();
        p.set_bounds(Bounds::new(5, 0, 10, 10)).unwrap();

        assert_eq!(p.resizes, 2);
    }
}
