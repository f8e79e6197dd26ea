//! Binary codec for cursor frames.
//!
//! Wire format:
//! ```text
//! [kind:2][x:2][y:2]
//! ```
//! Total size: 6 bytes.  All fields are `u16` in the host's native byte order,
//! which is what a typed `u16` array view produces on the sending side of the
//! browser implementation this protocol interoperates with.

use crate::domain::geometry::NormalizedPoint;
use crate::protocol::messages::{CursorFrame, EventKind, FRAME_SIZE};
use thiserror::Error;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The payload is not exactly [`FRAME_SIZE`] bytes long.
    #[error("invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The kind field holds a code outside the known [`EventKind`] set.
    #[error("unknown event kind code: {0}")]
    UnknownEventKind(u16),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`CursorFrame`] into its 6-byte wire form.
///
/// Encoding cannot fail: every field is already a `u16`.
///
/// # Examples
///
/// ```rust
/// use cursor_core::domain::geometry::NormalizedPoint;
/// use cursor_core::protocol::{decode_frame, encode_frame};
/// use cursor_core::protocol::messages::{CursorFrame, EventKind};
///
/// let frame = CursorFrame::new(EventKind::Move, NormalizedPoint::new(32767, 32767));
/// let bytes = encode_frame(&frame);
/// assert_eq!(bytes.len(), 6);
/// assert_eq!(decode_frame(&bytes).unwrap(), frame);
/// ```
pub fn encode_frame(frame: &CursorFrame) -> [u8; FRAME_SIZE] {
    encode_fields(frame.fields())
}

/// Encodes three raw `u16` fields without checking the kind code.
///
/// Peers only ever send frames built from a valid [`EventKind`]; this is
/// exposed so that diagnostics and tests can produce frames a newer peer
/// might send.
pub fn encode_fields(fields: [u16; 3]) -> [u8; FRAME_SIZE] {
    let mut buf = [0u8; FRAME_SIZE];
    for (slot, field) in buf.chunks_exact_mut(2).zip(fields) {
        slot.copy_from_slice(&field.to_ne_bytes());
    }
    buf
}

/// Decodes a frame from a complete message payload.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidLength`] if `bytes` is not exactly six bytes
/// long, or [`ProtocolError::UnknownEventKind`] if the kind code is not one of
/// the four known kinds.
///
/// # Examples
///
/// ```rust
/// use cursor_core::protocol::{decode_frame, encode_fields, ProtocolError};
///
/// let unknown = encode_fields([99, 0, 0]);
/// assert_eq!(decode_frame(&unknown), Err(ProtocolError::UnknownEventKind(99)));
/// ```
pub fn decode_frame(bytes: &[u8]) -> Result<CursorFrame, ProtocolError> {
    let [code, x, y] = decode_fields(bytes)?;
    let kind = EventKind::try_from(code).map_err(|_| ProtocolError::UnknownEventKind(code))?;
    Ok(CursorFrame {
        kind,
        point: NormalizedPoint { x, y },
    })
}

/// Splits a 6-byte payload into its three raw fields.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidLength`] for any other payload size.
pub fn decode_fields(bytes: &[u8]) -> Result<[u16; 3], ProtocolError> {
    if bytes.len() != FRAME_SIZE {
        return Err(ProtocolError::InvalidLength {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        });
    }
    Ok([read_u16(bytes, 0), read_u16(bytes, 2), read_u16(bytes, 4)])
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([buf[offset], buf[offset + 1]])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
