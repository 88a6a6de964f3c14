//! # KEYSTONE UI
//!
//! Anchor-constraint layout for elements drawn through the KEYSTONE GL
//! state stack.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     UI PIPELINE                         │
//! ├────────────────────────────────────────────────────────┤
//! │  Constraints → Constraint Forest → Layout → Draw       │
//! │       ↓               ↓               ↓        ↓       │
//! │  Validation    One edge per axis   Bounds   Scoped GL  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ARCHITECT'S MANDATE
//!
//! - A rejected constraint leaves the container untouched
//! - Same constraints and size, same pixels
//! - A flipped element is a bug in the layout, never clamped

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bounds;
pub mod config;
pub mod constraint;
pub mod container;
pub mod element;
pub mod error;
pub mod panel;
pub mod ui;

mod tree;

pub use bounds::Bounds;
pub use config::UiConfig;
pub use constraint::{Anchor, Constraint, Distance, Location};
pub use container::Container;
pub use element::{Element, ElementId, ElementState, DEFAULT_ELEMENT_SIZE};
pub use error::{ConstraintError, ConstraintResult};
pub use panel::Panel;
pub use ui::Ui;
