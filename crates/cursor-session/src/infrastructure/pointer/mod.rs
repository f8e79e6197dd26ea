//! Pointer-event source abstraction.
//!
//! A pointer source watches one target element and yields a stream of raw
//! samples: where the pointer is (in absolute page coordinates), what it is
//! doing (hovering, pressing, dragging, releasing), and some pass-through
//! metadata the session re-emits untouched.
//!
//! Mouse, touch and pen input all collapse into the same [`PointerPhase`]
//! set, so the session does not care which device produced a sample.
//!
//! # Testability
//!
//! The `PointerSource` trait lets tests and the demo binary feed scripted
//! samples through [`mock::ScriptedPointerSource`] instead of a real UI.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;

use cursor_core::EventKind;

use crate::infrastructure::geometry::ElementHandle;

pub mod mock;

/// What the pointer is doing in a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Hovering over the element with no button held.
    Over,
    /// Button pressed or touch started.
    Down,
    /// Moved while pressed.
    Move,
    /// Button released or touch ended.
    Up,
    /// Left the element.
    Leave,
    /// The platform aborted the gesture.
    Cancel,
}

impl PointerPhase {
    /// The wire event kind for this phase, or `None` for phases that are not
    /// shared with peers.
    pub fn event_kind(self) -> Option<EventKind> {
        match self {
            PointerPhase::Over => Some(EventKind::Over),
            PointerPhase::Down => Some(EventKind::Start),
            PointerPhase::Move => Some(EventKind::Move),
            PointerPhase::Up => Some(EventKind::End),
            PointerPhase::Leave | PointerPhase::Cancel => None,
        }
    }
}

/// Input device that produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerDevice {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Pass-through details about a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerMetadata {
    /// Milliseconds since the source started.
    pub timestamp_ms: u64,
    /// Distinguishes simultaneous touches.
    pub pointer_id: u32,
    pub device: PointerDevice,
}

/// One pointer sample in absolute page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub metadata: PointerMetadata,
}

impl RawPointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            x,
            y,
            metadata: PointerMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: PointerMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Options for [`PointerSource::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenOptions {
    /// Deliver hover samples ([`PointerPhase::Over`]) as well as presses.
    pub include_over: bool,
}

/// Error type for pointer source operations.
#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    #[error("element {0} is already being listened to")]
    AlreadyListening(ElementHandle),
}

/// Trait abstracting pointer sample production for one element.
pub trait PointerSource: Send + Sync {
    /// Starts listening on `target` and returns the sample stream.
    fn listen(
        &self,
        target: &ElementHandle,
        options: ListenOptions,
    ) -> Result<UnboundedReceiver<RawPointerEvent>, PointerError>;

    /// Stops listening on `target`; the stream returned by `listen` ends.
    /// Stopping an element that is not being listened to is a no-op.
    fn stop(&self, target: &ElementHandle);
}
