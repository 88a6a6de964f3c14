//! # Anchors and Constraints
//!
//! A constraint pins one anchor (the *moving* side) at a distance from
//! another anchor (the *fixed* side). Anchors name one of eight locations on
//! an element, or on the container when the element is `None`.
//!
//! Corner locations carry two axes. Before a constraint enters a container's
//! tree it is split into single-axis components:
//!
//! ```text
//!  NW ── N ── NE       horizontal: NW/W/SW → WEST,  NE/E/SE → EAST
//!  │          │        vertical:   NW/N/NE → NORTH, SW/S/SE → SOUTH
//!  W          E
//!  │          │
//!  SW ── S ── SE
//! ```

use std::fmt;

use crate::element::ElementId;

// =============================================================================
// LOCATION
// =============================================================================

/// A point on an element's outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Location {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Location {
    /// Every location, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::West,
        Self::East,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    /// Alias for [`NorthWest`](Self::NorthWest).
    pub const TOP_LEFT: Self = Self::NorthWest;
    /// Alias for [`North`](Self::North).
    pub const TOP: Self = Self::North;
    /// Alias for [`NorthEast`](Self::NorthEast).
    pub const TOP_RIGHT: Self = Self::NorthEast;
    /// Alias for [`West`](Self::West).
    pub const LEFT: Self = Self::West;
    /// Alias for [`East`](Self::East).
    pub const RIGHT: Self = Self::East;
    /// Alias for [`SouthWest`](Self::SouthWest).
    pub const BOTTOM_LEFT: Self = Self::SouthWest;
    /// Alias for [`South`](Self::South).
    pub const BOTTOM: Self = Self::South;
    /// Alias for [`SouthEast`](Self::SouthEast).
    pub const BOTTOM_RIGHT: Self = Self::SouthEast;

    /// Horizontal edge this location lies on, if any.
    #[must_use]
    pub const fn horizontal(self) -> Option<Self> {
        match self {
            Self::NorthEast | Self::East | Self::SouthEast => Some(Self::East),
            Self::NorthWest | Self::West | Self::SouthWest => Some(Self::West),
            Self::North | Self::South => None,
        }
    }

    /// Vertical edge this location lies on, if any.
    #[must_use]
    pub const fn vertical(self) -> Option<Self> {
        match self {
            Self::NorthEast | Self::North | Self::NorthWest => Some(Self::North),
            Self::SouthEast | Self::South | Self::SouthWest => Some(Self::South),
            Self::East | Self::West => None,
        }
    }

    /// Point-mirrored location: EAST for WEST, SOUTH_WEST for NORTH_EAST.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::NorthWest => Self::SouthEast,
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::West => Self::East,
            Self::East => Self::West,
            Self::SouthWest => Self::NorthEast,
            Self::South => Self::North,
            Self::SouthEast => Self::NorthWest,
        }
    }

    /// Upper-case compass name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NorthWest => "NORTH_WEST",
            Self::North => "NORTH",
            Self::NorthEast => "NORTH_EAST",
            Self::West => "WEST",
            Self::East => "EAST",
            Self::SouthWest => "SOUTH_WEST",
            Self::South => "SOUTH",
            Self::SouthEast => "SOUTH_EAST",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ANCHOR
// =============================================================================

/// An element location. Equality is identity: same element, same location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    element: Option<ElementId>,
    location: Location,
}

impl Anchor {
    /// Anchor on an element.
    #[must_use]
    pub const fn new(element: ElementId, location: Location) -> Self {
        Self {
            element: Some(element),
            location,
        }
    }

    /// Anchor on the container that owns the constraint.
    #[must_use]
    pub const fn container(location: Location) -> Self {
        Self {
            element: None,
            location,
        }
    }

    /// The element, or `None` for the container.
    #[inline]
    #[must_use]
    pub const fn element(&self) -> Option<ElementId> {
        self.element
    }

    /// The location.
    #[inline]
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// `true` for a container anchor.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.element.is_none()
    }

    /// The same element's EAST or WEST anchor, if this location has one.
    #[must_use]
    pub fn horizontal_component(&self) -> Option<Self> {
        self.location.horizontal().map(|location| Self { location, ..*self })
    }

    /// The same element's NORTH or SOUTH anchor, if this location has one.
    #[must_use]
    pub fn vertical_component(&self) -> Option<Self> {
        self.location.vertical().map(|location| Self { location, ..*self })
    }

    /// The anchor across the same element or container.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        Self {
            element: self.element,
            location: self.location.opposite(),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element {
            Some(element) => write!(f, "[{element}, {}]", self.location),
            None => write!(f, "[container, {}]", self.location),
        }
    }
}

// =============================================================================
// DISTANCE
// =============================================================================

/// Offset between the fixed and moving anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// Pixels.
    Absolute(i32),
    /// Fraction of the container width.
    WidthRelative(f32),
    /// Fraction of the container height.
    HeightRelative(f32),
}

impl Distance {
    /// Pixel distance for a container of the given size. Relative distances
    /// truncate toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn resolve(self, width: u32, height: u32) -> i32 {
        match self {
            Self::Absolute(pixels) => pixels,
            Self::WidthRelative(fraction) => (f64::from(width) * f64::from(fraction)) as i32,
            Self::HeightRelative(fraction) => (f64::from(height) * f64::from(fraction)) as i32,
        }
    }

    /// `true` unless absolute.
    #[inline]
    #[must_use]
    pub const fn is_relative(self) -> bool {
        !matches!(self, Self::Absolute(_))
    }
}

impl From<i32> for Distance {
    fn from(pixels: i32) -> Self {
        Self::Absolute(pixels)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(pixels) => write!(f, "{pixels}"),
            Self::WidthRelative(fraction) => write!(f, "{fraction}*width"),
            Self::HeightRelative(fraction) => write!(f, "{fraction}*height"),
        }
    }
}

// =============================================================================
// CONSTRAINT
// =============================================================================

/// `moving` is placed `distance` away from `fixed`.
///
/// Distances point inward for EAST and SOUTH moving anchors: a positive
/// distance pulls those edges left and up, toward the inside of a container
/// they are pinned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    moving: Anchor,
    fixed: Anchor,
    distance: Distance,
}

impl Constraint {
    /// Creates a constraint. Validity is checked when it is added to a
    /// container, see [`is_valid`](Self::is_valid).
    #[must_use]
    pub fn new(moving: Anchor, fixed: Anchor, distance: impl Into<Distance>) -> Self {
        Self {
            moving,
            fixed,
            distance: distance.into(),
        }
    }

    /// The anchor being positioned.
    #[inline]
    #[must_use]
    pub const fn moving(&self) -> Anchor {
        self.moving
    }

    /// The reference anchor.
    #[inline]
    #[must_use]
    pub const fn fixed(&self) -> Anchor {
        self.fixed
    }

    /// The unresolved distance.
    #[inline]
    #[must_use]
    pub const fn distance(&self) -> Distance {
        self.distance
    }

    /// Pixel distance inside a `width` × `height` container.
    #[inline]
    #[must_use]
    pub fn resolve_distance(&self, width: u32, height: u32) -> i32 {
        self.distance.resolve(width, height)
    }

    /// `true` if the distance depends on the container size.
    #[inline]
    #[must_use]
    pub const fn is_distance_relative(&self) -> bool {
        self.distance.is_relative()
    }

    /// Same distance, different anchors.
    #[must_use]
    pub const fn with_anchors(&self, moving: Anchor, fixed: Anchor) -> Self {
        Self {
            moving,
            fixed,
            distance: self.distance,
        }
    }

    /// Both anchors have a horizontal component, or neither does; same for
    /// the vertical axis.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        let (moving, fixed) = (self.moving.location, self.fixed.location);
        moving.horizontal().is_some() == fixed.horizontal().is_some()
            && moving.vertical().is_some() == fixed.vertical().is_some()
    }

    /// The EAST/WEST part of this constraint.
    #[must_use]
    pub fn horizontal_constraint(&self) -> Option<Self> {
        Some(self.with_anchors(self.moving.horizontal_component()?, self.fixed.horizontal_component()?))
    }

    /// The NORTH/SOUTH part of this constraint.
    #[must_use]
    pub fn vertical_constraint(&self) -> Option<Self> {
        Some(self.with_anchors(self.moving.vertical_component()?, self.fixed.vertical_component()?))
    }

    /// Single-axis components, horizontal first.
    #[must_use]
    pub fn components(&self) -> Vec<Self> {
        [self.horizontal_constraint(), self.vertical_constraint()]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constraint{{ Fixed={}, Moving={}, Distance={} }}",
            self.fixed, self.moving, self.distance
        )
    }
}
