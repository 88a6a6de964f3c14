//! # Container
//!
//! Owns elements and the constraints between them, and resolves those
//! constraints into bounds.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ seed: element bounds, container pinned on all four edges │
//! ├──────────────────────────────────────────────────────────┤
//! │ apply edges in resolution order, fixed before moving     │
//! │   edge ← fixed + distance   (EAST/SOUTH: fixed - dist)   │
//! │   opposite edge follows unless already pinned            │
//! ├──────────────────────────────────────────────────────────┤
//! │ check: left ≤ right, top ≤ bottom, origin ≥ 0            │
//! ├──────────────────────────────────────────────────────────┤
//! │ assign bounds (nested containers lay out in turn)        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every anchor has at most one incoming constraint per axis. An edge runs
//! after the edge that positions its fixed anchor, or, when that anchor is
//! free, after the edge that positions the opposite edge carrying it. Those
//! links are acyclic, so one ordered pass resolves everything.

use std::collections::HashMap;

use keystone_gl::Context;

use crate::bounds::Bounds;
use crate::constraint::{Anchor, Constraint, Distance, Location};
use crate::element::{Element, ElementId, ElementState};
use crate::error::{ConstraintError, ConstraintResult};
use crate::tree::ConstraintTree;

/// A group of elements laid out by anchor constraints.
pub struct Container {
    state: ElementState,
    elements: Vec<Box<dyn Element>>,
    tree: ConstraintTree,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ElementState::new(),
            elements: Vec::new(),
            tree: ConstraintTree::new(),
        }
    }

    // =========================================================================
    // ELEMENTS
    // =========================================================================

    /// Takes ownership of `element`. Later elements draw on top.
    pub fn add_element(&mut self, element: Box<dyn Element>) -> ElementId {
        let id = element.id();
        self.elements.push(element);
        id
    }

    /// Convenience for [`add_element`](Self::add_element).
    pub fn add<E: Element + 'static>(&mut self, element: E) -> ElementId {
        self.add_element(Box::new(element))
    }

    /// Removes an element and every constraint that mentions it. Anchors
    /// that were positioned relative to it become unconstrained.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Box<dyn Element>> {
        let position = self.elements.iter().position(|e| e.id() == id)?;
        let element = self.elements.remove(position);

        let kept = self
            .tree
            .constraints()
            .into_iter()
            .filter(|c| c.moving().element() != Some(id) && c.fixed().element() != Some(id));
        let mut tree = ConstraintTree::new();
        for constraint in kept {
            tree.attach(constraint);
        }
        self.tree = tree;

        tracing::debug!(element = %id, constraints = self.tree.edge_count(), "element removed");
        Some(element)
    }

    /// `true` if this container owns `id`.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id() == id)
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// `true` without elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element ids in draw order.
    #[must_use]
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id()).collect()
    }

    /// The element with `id`.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&dyn Element> {
        self.elements.iter().find(|e| e.id() == id).map(|e| &**e)
    }

    /// The element with `id`, mutably.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut (dyn Element + 'static)> {
        self.elements.iter_mut().find(|e| e.id() == id).map(|e| &mut **e)
    }

    /// Current bounds of `id`.
    #[must_use]
    pub fn bounds_of(&self, id: ElementId) -> Option<Bounds> {
        self.element(id).map(Element::bounds)
    }

    // =========================================================================
    // CONSTRAINTS
    // =========================================================================

    /// Adds a constraint. Corner anchors are split into one constraint per
    /// axis; either all parts are added or none.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::Invalid`] when the anchor axes do not match
    /// - [`ConstraintError::ElementNotInContainer`] for foreign elements
    /// - [`ConstraintError::ContainerCannotMove`] for a moving container anchor
    /// - [`ConstraintError::SelfLoop`] when both anchors are the same
    /// - [`ConstraintError::AlreadyConstrained`] when the moving anchor
    ///   already has an incoming constraint on that axis
    /// - [`ConstraintError::Cycle`] when the fixed anchor would take its
    ///   position from the moving one, directly or through the opposite edge
    ///   of an unconstrained anchor
    pub fn add_constraint(&mut self, constraint: Constraint) -> ConstraintResult<()> {
        if !constraint.is_valid() {
            return Err(ConstraintError::Invalid(constraint));
        }
        self.check_member("moving", constraint.moving())?;
        self.check_member("fixed", constraint.fixed())?;
        if constraint.moving().is_container() {
            return Err(ConstraintError::ContainerCannotMove(constraint));
        }
        if constraint.moving() == constraint.fixed() {
            return Err(ConstraintError::SelfLoop(constraint));
        }

        let components = constraint.components();
        for component in &components {
            if component.moving() == component.fixed() {
                return Err(ConstraintError::SelfLoop(constraint));
            }
            if let Some(conflicting) = self.tree.incoming(&component.moving()) {
                return Err(ConstraintError::AlreadyConstrained {
                    constraint,
                    conflicting,
                });
            }
            if self.tree.would_cycle(component) {
                return Err(ConstraintError::Cycle(constraint));
            }
        }

        for component in components {
            self.tree.attach(component);
        }
        tracing::trace!(%constraint, "constraint added");
        Ok(())
    }

    /// Pins `moving` at `pixels` from `fixed`.
    ///
    /// # Errors
    ///
    /// See [`add_constraint`](Self::add_constraint).
    pub fn constrain(&mut self, moving: Anchor, fixed: Anchor, pixels: i32) -> ConstraintResult<()> {
        self.add_constraint(Constraint::new(moving, fixed, pixels))
    }

    /// Pins `moving` at a fraction of the container width from `fixed`.
    ///
    /// # Errors
    ///
    /// See [`add_constraint`](Self::add_constraint).
    pub fn add_width_relative_constraint(
        &mut self,
        moving: Anchor,
        fixed: Anchor,
        fraction: f32,
    ) -> ConstraintResult<()> {
        self.add_constraint(Constraint::new(moving, fixed, Distance::WidthRelative(fraction)))
    }

    /// Pins `moving` at a fraction of the container height from `fixed`.
    ///
    /// # Errors
    ///
    /// See [`add_constraint`](Self::add_constraint).
    pub fn add_height_relative_constraint(
        &mut self,
        moving: Anchor,
        fixed: Anchor,
        fraction: f32,
    ) -> ConstraintResult<()> {
        self.add_constraint(Constraint::new(moving, fixed, Distance::HeightRelative(fraction)))
    }

    /// Drops every constraint. Elements keep their current bounds.
    pub fn clear_constraints(&mut self) {
        self.tree = ConstraintTree::new();
    }

    /// Number of single-axis constraints.
    #[must_use]
    pub const fn constraint_count(&self) -> usize {
        self.tree.edge_count()
    }

    /// Single-axis constraints in resolution order.
    #[must_use]
    pub fn constraints(&self) -> Vec<Constraint> {
        self.tree.resolution_order()
    }

    /// Number of anchor nodes in the constraint forest, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    fn check_member(&self, role: &'static str, anchor: Anchor) -> ConstraintResult<()> {
        match anchor.element() {
            Some(element) if !self.contains(element) => Err(ConstraintError::ElementNotInContainer { role, element }),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // LAYOUT
    // =========================================================================

    /// Resolves all constraints for a `width` × `height` container at the
    /// window origin.
    ///
    /// # Errors
    ///
    /// [`ConstraintError::Flipped`] or [`ConstraintError::OutOfBounds`]; no
    /// element bounds change in that case. Errors from nested containers
    /// surface after this container's bounds were assigned.
    pub fn layout(&mut self, width: u32, height: u32) -> ConstraintResult<()> {
        self.layout_within(Bounds::new(0, 0, width, height))
    }

    fn layout_within(&mut self, area: Bounds) -> ConstraintResult<()> {
        if self.elements.is_empty() {
            return Ok(());
        }

        let mut slots = HashMap::with_capacity(self.elements.len());
        let mut records = Vec::with_capacity(self.elements.len());
        for (slot, element) in self.elements.iter_mut().enumerate() {
            element.initialize_bounds();
            slots.insert(element.id(), slot);
            records.push(EdgeRecord::seeded(element.bounds()));
        }
        let container = EdgeRecord::pinned(area);

        for constraint in self.tree.resolution_order() {
            let Some(moving) = constraint.moving().element() else {
                continue;
            };
            let slot = *slots.get(&moving).ok_or(ConstraintError::UnknownElement(moving))?;

            let fixed = match constraint.fixed().element() {
                None => container.edge(constraint.fixed().location()),
                Some(id) => {
                    let fixed_slot = slots.get(&id).ok_or(ConstraintError::UnknownElement(id))?;
                    records[*fixed_slot].edge(constraint.fixed().location())
                }
            };

            let location = constraint.moving().location();
            let mut distance = i64::from(constraint.resolve_distance(area.width, area.height));
            if matches!(location, Location::East | Location::South) {
                distance = -distance;
            }

            let record = &mut records[slot];
            record.pin(location, fixed + distance);
            if record.is_flipped() {
                return Err(ConstraintError::Flipped(constraint));
            }
        }

        let resolved = self
            .elements
            .iter()
            .zip(&records)
            .map(|(element, record)| record.to_bounds(element.id()))
            .collect::<ConstraintResult<Vec<_>>>()?;

        for (element, bounds) in self.elements.iter_mut().zip(resolved) {
            element.set_bounds(bounds)?;
        }

        tracing::debug!(
            width = area.width,
            height = area.height,
            elements = self.elements.len(),
            constraints = self.tree.edge_count(),
            "layout resolved"
        );
        Ok(())
    }

    // =========================================================================
    // HIT TESTING
    // =========================================================================

    /// Topmost element under the point, descending into nested containers.
    /// `None` means the point hits only this container.
    #[must_use]
    pub fn element_at(&self, x: i32, y: i32) -> Option<ElementId> {
        let element = self.elements.iter().rev().find(|e| e.bounds().contains(x, y))?;
        match element.as_container() {
            Some(nested) => nested.element_at(x, y).or(Some(element.id())),
            None => Some(element.id()),
        }
    }

    /// Like [`element_at`](Self::element_at), skipping transparent elements.
    /// A nested container whose own elements miss the point is skipped too.
    #[must_use]
    pub fn opaque_element_at(&self, x: i32, y: i32) -> Option<ElementId> {
        for element in self.elements.iter().rev() {
            if !element.is_opaque() || !element.bounds().contains(x, y) {
                continue;
            }
            match element.as_container() {
                Some(nested) => {
                    if let Some(hit) = nested.opaque_element_at(x, y) {
                        return Some(hit);
                    }
                }
                None => return Some(element.id()),
            }
        }
        None
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.state.id())
            .field("elements", &self.elements)
            .field("constraints", &self.tree.edge_count())
            .finish()
    }
}

impl Element for Container {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    /// Draws children in order, each inside its own state scope.
    fn draw(&self, ctx: &mut Context, time: f32, dt: f32) {
        for element in &self.elements {
            let mut scope = ctx.scope();
            element.draw(&mut scope, time, dt);
        }
    }

    fn on_resize(&mut self) -> ConstraintResult<()> {
        let area = self.bounds();
        self.layout_within(area)
    }

    fn as_container(&self) -> Option<&Container> {
        Some(self)
    }

    fn as_container_mut(&mut self) -> Option<&mut Container> {
        Some(self)
    }
}

// =============================================================================
// TEMPORARY BOUNDS
// =============================================================================

/// Signed edges plus which of them a constraint has already pinned.
#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
    fixed_left: bool,
    fixed_right: bool,
    fixed_top: bool,
    fixed_bottom: bool,
}

impl EdgeRecord {
    fn seeded(bounds: Bounds) -> Self {
        Self {
            left: i64::from(bounds.x),
            right: i64::from(bounds.x) + i64::from(bounds.width),
            top: i64::from(bounds.y),
            bottom: i64::from(bounds.y) + i64::from(bounds.height),
            fixed_left: false,
            fixed_right: false,
            fixed_top: false,
            fixed_bottom: false,
        }
    }

    fn pinned(bounds: Bounds) -> Self {
        Self {
            fixed_left: true,
            fixed_right: true,
            fixed_top: true,
            fixed_bottom: true,
            ..Self::seeded(bounds)
        }
    }

    /// Position of an edge location. Corners never reach the tree.
    fn edge(&self, location: Location) -> i64 {
        match location {
            Location::East => self.right,
            Location::West => self.left,
            Location::North => self.top,
            Location::South => self.bottom,
            Location::NorthWest | Location::NorthEast | Location::SouthWest | Location::SouthEast => 0,
        }
    }

    /// Moves one edge to `target`; the opposite edge follows unless pinned.
    fn pin(&mut self, location: Location, target: i64) {
        let delta = target - self.edge(location);
        match location {
            Location::East => {
                self.right += delta;
                if !self.fixed_left {
                    self.left += delta;
                }
                self.fixed_right = true;
            }
            Location::West => {
                self.left += delta;
                if !self.fixed_right {
                    self.right += delta;
                }
                self.fixed_left = true;
            }
            Location::North => {
                self.top += delta;
                if !self.fixed_bottom {
                    self.bottom += delta;
                }
                self.fixed_top = true;
            }
            Location::South => {
                self.bottom += delta;
                if !self.fixed_top {
                    self.top += delta;
                }
                self.fixed_bottom = true;
            }
            Location::NorthWest | Location::NorthEast | Location::SouthWest | Location::SouthEast => {}
        }
    }

    fn is_flipped(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    fn to_bounds(self, element: ElementId) -> ConstraintResult<Bounds> {
        let out_of_bounds = || ConstraintError::OutOfBounds {
            element,
            left: self.left,
            top: self.top,
        };
        let convert = |value: i64| u32::try_from(value).map_err(|_| out_of_bounds());

        Ok(Bounds::new(
            convert(self.left)?,
            convert(self.top)?,
            convert(self.right - self.left)?,
            convert(self.bottom - self.top)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Panel;

    fn sized(width: u32, height: u32) -> Panel {
        Panel::with_default_size(width, height, [1.0; 4])
    }

    #[test]
    fn test_pin_keeps_width() {
        let mut record = EdgeRecord::seeded(Bounds::new(0, 0, 100, 50));
        record.pin(Location::East, 800);

        assert_eq!((record.left, record.right), (700, 800));
        assert!(record.fixed_right && !record.fixed_left);
    }

    #[test]
    fn test_pin_stretches_between_fixed_edges() {
        let mut record = EdgeRecord::seeded(Bounds::new(0, 0, 20, 20));
        record.pin(Location::West, 10);
        record.pin(Location::East, 90);

        assert_eq!((record.left, record.right), (10, 90));
    }

    #[test]
    fn test_foreign_element_rejected() {
        let mut container = Container::new();
        let inside = container.add(sized(10, 10));
        let outside = ElementId::next();

        let result = container.constrain(Anchor::new(inside, Location::West), Anchor::new(outside, Location::East), 0);
        assert_eq!(
            result,
            Err(ConstraintError::ElementNotInContainer {
                role: "fixed",
                element: outside
            })
        );
    }

    #[test]
    fn test_container_cannot_move() {
        let mut container = Container::new();
        let e = container.add(sized(10, 10));

        let result = container.constrain(Anchor::container(Location::West), Anchor::new(e, Location::West), 0);
        assert!(matches!(result, Err(ConstraintError::ContainerCannotMove(_))));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut container = Container::new();
        let e = container.add(sized(10, 10));
        let anchor = Anchor::new(e, Location::NorthEast);

        assert!(matches!(container.constrain(anchor, anchor, 5), Err(ConstraintError::SelfLoop(_))));
        // Same edge on one axis only.
        let partial = container.constrain(anchor, Anchor::new(e, Location::NorthWest), 5);
        assert!(matches!(partial, Err(ConstraintError::SelfLoop(_))));
        assert_eq!(container.constraint_count(), 0);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut container = Container::new();
        let a = container.add(sized(10, 10));
        let b = container.add(sized(10, 10));

        container
            .constrain(Anchor::new(a, Location::East), Anchor::new(b, Location::East), 5)
            .unwrap();
        let back = container.constrain(Anchor::new(b, Location::East), Anchor::new(a, Location::East), 5);

        assert!(matches!(back, Err(ConstraintError::Cycle(_))));
        assert_eq!(container.constraint_count(), 1);
    }

    #[test]
    fn test_cycle_through_free_opposite_edge_rejected() {
        let mut container = Container::new();
        let a = container.add(sized(10, 10));
        let b = container.add(sized(10, 10));

        container
            .constrain(Anchor::new(b, Location::West), Anchor::new(a, Location::East), 5)
            .unwrap();
        // a.E follows a.W, so a.W cannot follow b.E, which follows b.W.
        let back = container.constrain(Anchor::new(a, Location::West), Anchor::new(b, Location::East), 5);

        assert!(matches!(back, Err(ConstraintError::Cycle(_))));
        assert_eq!(container.constraint_count(), 1);
    }

    #[test]
    fn test_edge_against_own_opposite_edge() {
        let mut container = Container::new();
        let a = container.add(sized(10, 10));
        let west = Anchor::new(a, Location::West);
        let east = Anchor::new(a, Location::East);

        assert!(matches!(container.constrain(west, east, 30), Err(ConstraintError::Cycle(_))));

        container.constrain(east, Anchor::container(Location::East), 0).unwrap();
        container.constrain(west, east, -30).unwrap();
        container.layout(100, 100).unwrap();
        assert_eq!(container.bounds_of(a), Some(Bounds::new(70, 0, 30, 10)));
    }

    #[test]
    fn test_constraints_listed_in_resolution_order() {
        let mut container = Container::new();
        let a = container.add(sized(10, 10));
        let b = container.add(sized(10, 10));

        container
            .constrain(Anchor::new(b, Location::West), Anchor::new(a, Location::East), 0)
            .unwrap();
        container
            .constrain(Anchor::new(a, Location::West), Anchor::container(Location::West), 0)
            .unwrap();

        let moving: Vec<Anchor> = container.constraints().iter().map(Constraint::moving).collect();
        assert_eq!(moving, vec![Anchor::new(a, Location::West), Anchor::new(b, Location::West)]);
    }

    #[test]
    fn test_remove_element_frees_dependents() {
        let mut container = Container::new();
        let a = container.add(sized(10, 10));
        let b = container.add(sized(10, 10));
        container
            .constrain(Anchor::new(a, Location::West), Anchor::container(Location::West), 30)
            .unwrap();
        container
            .constrain(Anchor::new(b, Location::West), Anchor::new(a, Location::East), 5)
            .unwrap();

        assert!(container.remove_element(a).is_some());
        assert_eq!(container.constraint_count(), 0);
        assert!(container.remove_element(a).is_none());

        // b is free again and may be constrained elsewhere.
        container
            .constrain(Anchor::new(b, Location::West), Anchor::container(Location::West), 1)
            .unwrap();
        container.layout(100, 100).unwrap();
        assert_eq!(container.bounds_of(b), Some(Bounds::new(1, 0, 10, 10)));
    }

    #[test]
    fn test_negative_origin_rejected() {
        let mut container = Container::new();
        let e = container.add(sized(10, 10));
        container
            .constrain(Anchor::new(e, Location::East), Anchor::container(Location::West), 0)
            .unwrap();

        let result = container.layout(100, 100);
        assert!(matches!(result, Err(ConstraintError::OutOfBounds { left: -10, .. })));
        assert_eq!(container.bounds_of(e), Some(Bounds::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_empty_layout_is_noop() {
        let mut container = Container::new();
        assert!(container.layout(10, 10).is_ok());
    }
}
