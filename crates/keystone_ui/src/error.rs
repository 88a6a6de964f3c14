//! # Layout Errors
//!
//! Everything here is a design-time mistake in how a layout was put
//! together. Unlike fatal GL errors these are returned, so a caller can log
//! them and try different constraints. Operations that fail leave the
//! container exactly as it was.

use thiserror::Error;

use crate::constraint::{Anchor, Constraint};
use crate::element::ElementId;

/// Errors raised while building or resolving a constraint layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintError {
    /// The anchors do not expose the same axes.
    #[error("invalid constraint (anchor axes do not match): {0}")]
    Invalid(Constraint),

    /// An anchor refers to an element this container does not own.
    #[error("{role} element {element} is not in this container")]
    ElementNotInContainer {
        /// `"moving"` or `"fixed"`.
        role: &'static str,
        /// The foreign element.
        element: ElementId,
    },

    /// The container's own edges cannot be the moving side.
    #[error("the container itself cannot be moved: {0}")]
    ContainerCannotMove(Constraint),

    /// An anchor constrained to itself.
    #[error("an anchor cannot be constrained to itself: {0}")]
    SelfLoop(Constraint),

    /// The moving anchor already has an incoming constraint on this axis.
    #[error("moving anchor is already constrained: {constraint} conflicts with {conflicting}")]
    AlreadyConstrained {
        /// The rejected constraint.
        constraint: Constraint,
        /// The existing edge into the same anchor.
        conflicting: Constraint,
    },

    /// The fixed anchor depends on the moving anchor.
    #[error("constraint would create a cycle: {0}")]
    Cycle(Constraint),

    /// Applying a constraint placed an edge past its opposite edge.
    #[error("constraint flipped its element: {0}")]
    Flipped(Constraint),

    /// A resolved rectangle starts left of or above the window origin.
    #[error("element {element} resolved to a negative origin ({left}, {top})")]
    OutOfBounds {
        /// The element.
        element: ElementId,
        /// Resolved left edge.
        left: i64,
        /// Resolved top edge.
        top: i64,
    },

    /// No element with that id.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for layout operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

impl ConstraintError {
    /// The anchor a rejected constraint tried to move, if any.
    #[must_use]
    pub fn moving_anchor(&self) -> Option<Anchor> {
        match self {
            Self::Invalid(c)
            | Self::ContainerCannotMove(c)
            | Self::SelfLoop(c)
            | Self::Cycle(c)
            | Self::Flipped(c)
            | Self::AlreadyConstrained { constraint: c, .. } => Some(c.moving()),
            _ => None,
        }
    }
}
