//! BoundsTracker: keeps the attached element's rectangle current.
//!
//! Elements move and resize between pointer samples, so the session asks for
//! a fresh rectangle before every outbound frame instead of caching one.
//! Inbound frames use the last refreshed rectangle; a viewport resize pushes
//! a refresh through [`CursorSession::notify_resize`].
//!
//! [`CursorSession::notify_resize`]: crate::application::share_cursor::CursorSession::notify_resize

use std::sync::Arc;

use cursor_core::TargetRect;

use crate::infrastructure::geometry::{ElementHandle, GeometryProvider};

pub struct BoundsTracker {
    geometry: Arc<dyn GeometryProvider>,
    target: Option<ElementHandle>,
    rect: TargetRect,
}

impl BoundsTracker {
    pub fn new(geometry: Arc<dyn GeometryProvider>) -> Self {
        Self {
            geometry,
            target: None,
            rect: TargetRect::ZERO,
        }
    }

    /// Switches to a new element (or none).  The rectangle is not refreshed
    /// until [`refresh`](Self::refresh) is called.
    pub fn set_target(&mut self, target: Option<ElementHandle>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<&ElementHandle> {
        self.target.as_ref()
    }

    /// Re-queries the geometry provider.
    ///
    /// Falls back to [`TargetRect::ZERO`] when no element is attached or the
    /// provider no longer knows it.
    pub fn refresh(&mut self) -> TargetRect {
        self.rect = self
            .target
            .as_ref()
            .and_then(|target| self.geometry.bounding_rect(target))
            .unwrap_or(TargetRect::ZERO);
        self.rect
    }

    /// The rectangle from the last refresh.
    pub fn current(&self) -> TargetRect {
        self.rect
    }
}
