//! # cursor-core
//!
//! Shared library for the shared-cursor protocol: the wire frame codec and the
//! coordinate transform that makes frames resolution independent.
//!
//! It has zero dependencies on timers, network sockets, or UI toolkits, so the
//! same code can run wherever a peer runs.
//!
//! # Architecture overview (for beginners)
//!
//! A shared cursor lets several peers watch each other point at "the same"
//! element, even though each peer renders that element at its own size and
//! position.  Every local pointer sample is converted into a fraction of the
//! element, packed into six bytes, and sent to every connected peer.  Each
//! receiver unpacks the frame and scales the fraction onto its own element.
//!
//! This crate (`cursor-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How bytes travel between peers.  A frame is three `u16`
//!   values: the event kind code and the normalized x and y.
//!
//! - **`domain`** – Pure arithmetic with no I/O.  `TargetRect` describes an
//!   element; `normalize` and `denormalize` convert between pixels and the
//!   fixed-point fraction used on the wire.
//!
//! The session crate (`cursor-session`) builds the throttled pipeline, the
//! peer registry and the attach/detach lifecycle on top of these pieces.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `cursor_core::TargetRect` instead of `cursor_core::domain::geometry::TargetRect`.
pub use domain::geometry::{denormalize, normalize, NormalizedPoint, TargetRect, NORMALIZED_MAX};
pub use protocol::codec::{decode_frame, encode_frame, ProtocolError};
pub use protocol::messages::{CursorFrame, EventKind, FRAME_SIZE};
