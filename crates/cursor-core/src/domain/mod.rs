//! Domain entities for shared cursors.
//!
//! This module contains pure arithmetic with no infrastructure dependencies.
//!
//! # What lives in the domain? (for beginners)
//!
//! The innermost layer of the crate holds the rules that make the system what
//! it is, and nothing else: no sockets, no timers, no DOM.  For a shared
//! cursor that rule is the coordinate transform.  A pointer position is only
//! meaningful relative to the element it was captured on, and every peer has
//! its own copy of that element at its own size.  The domain turns pixels into
//! element-relative fractions and back.
//!
//! Because nothing here performs I/O, every function can be tested on any
//! platform without setup.

/// Target rectangles and the fixed-point transform.
///
/// See [`geometry::normalize`] and [`geometry::denormalize`].
pub mod geometry;
