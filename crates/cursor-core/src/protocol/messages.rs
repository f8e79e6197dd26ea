//! Pointer event kinds and the cursor frame carried on the wire.
//!
//! A frame is three unsigned 16-bit integers and nothing else:
//!
//! ```text
//! [kind:2][x:2][y:2]
//! ```
//!
//! There is no version byte and no length prefix.  The transport delivers
//! whole messages, so the only validation possible on receipt is "exactly six
//! bytes" and "known kind code".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::NormalizedPoint;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of an encoded [`CursorFrame`] in bytes.
pub const FRAME_SIZE: usize = 6;

// ── Event kinds ───────────────────────────────────────────────────────────────

/// The pointer activity a frame describes.
///
/// The numeric codes are part of the wire format and must never be reordered
/// or reused: a peer running an older build decodes by code, not by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum EventKind {
    /// The pointer is hovering over the element without a button held.
    Over = 0,
    /// A press began (mouse down, touch start).
    Start = 1,
    /// The pointer moved while pressed.
    Move = 2,
    /// The press ended (mouse up, touch end).
    End = 3,
}

impl EventKind {
    /// Every kind, in wire-code order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Over,
        EventKind::Start,
        EventKind::Move,
        EventKind::End,
    ];

    /// Returns the wire code for this kind.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Returns the lowercase name used in logs and configuration.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Over => "over",
            EventKind::Start => "start",
            EventKind::Move => "move",
            EventKind::End => "end",
        }
    }
}

impl TryFrom<u16> for EventKind {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventKind::Over),
            1 => Ok(EventKind::Start),
            2 => Ok(EventKind::Move),
            3 => Ok(EventKind::End),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// One pointer event as sent to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorFrame {
    /// What the pointer did.
    pub kind: EventKind,
    /// Where, as a fraction of the sender's element.
    pub point: NormalizedPoint,
}

impl CursorFrame {
    pub fn new(kind: EventKind, point: NormalizedPoint) -> Self {
        Self { kind, point }
    }

    /// Returns the three wire fields in order: kind code, x, y.
    pub fn fields(&self) -> [u16; 3] {
        [self.kind.code(), self.point.x, self.point.y]
    }
}
