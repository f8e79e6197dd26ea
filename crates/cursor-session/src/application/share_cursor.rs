//! CursorSession: shares one element's pointer activity with every peer.
//!
//! This use case is the heart of the crate.  It wires the collaborators
//! together in both directions:
//!
//! ```text
//! outbound:  PointerSource ─► Throttle ─► BoundsTracker::refresh
//!                ─► normalize ─► encode_frame ─► ChannelRegistry::broadcast
//!
//! inbound:   ChannelEvent::Message ─► decode_frame
//!                ─► denormalize (local rect) ─► SessionEvent::Data
//! ```
//!
//! # Lifecycle
//!
//! A session starts *detached*.  [`attach`](CursorSession::attach) subscribes
//! to the pointer source for one element; attaching again first detaches
//! from the previous element.  [`detach`](CursorSession::detach) is
//! idempotent and synchronous: once it returns, no further frame for the old
//! attachment is broadcast, including one that was waiting in the throttle.
//!
//! A detached session still tracks peers (joins and removals are reported)
//! but drops inbound frames, because there is no local element to map them
//! onto.
//!
//! # Architecture
//!
//! The session depends only on traits (`PeerTransport`, `PointerSource`,
//! `GeometryProvider`).  All implementations are injected at construction
//! time.  Work happens on two kinds of Tokio tasks (the channel pump and the
//! per-attachment pointer pump) plus the throttle timer, so the mutable state
//! they share sits behind `parking_lot` mutexes.  Lock order is
//! attachment → throttle → bounds → registry.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use cursor_core::{
    decode_frame, denormalize, encode_frame, normalize, CursorFrame, EventKind, TargetRect,
};

use crate::application::manage_peers::ChannelRegistry;
use crate::application::throttle::Throttle;
use crate::application::track_bounds::BoundsTracker;
use crate::infrastructure::geometry::{ElementHandle, GeometryProvider};
use crate::infrastructure::pointer::{
    ListenOptions, PointerError, PointerMetadata, PointerSource, RawPointerEvent,
};
use crate::infrastructure::transport::{
    ChannelEvent, ChannelOptions, DataChannel, PeerId, PeerTransport, TransportError,
};

/// Minimum gap between two outbound frames unless configured otherwise.
pub const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_millis(10);

/// Label of the data channel unless configured otherwise.
pub const DEFAULT_CHANNEL_LABEL: &str = "cursor";

/// Error type for the share-cursor use case.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("pointer source error: {0}")]
    Pointer(#[from] PointerError),
}

/// Runtime session settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub throttle_delay: Duration,
    pub channel_label: String,
    /// Passed verbatim to [`PeerTransport::create_data_channel`].
    pub channel_options: ChannelOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throttle_delay: DEFAULT_THROTTLE_DELAY,
            channel_label: DEFAULT_CHANNEL_LABEL.to_string(),
            channel_options: ChannelOptions::default(),
        }
    }
}

/// Notifications delivered to the session's owner.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A peer's pointer, mapped onto our element (pixels from its top-left).
    Data {
        peer_id: PeerId,
        kind: EventKind,
        x: i32,
        y: i32,
    },
    /// A peer's channel opened.
    Join { peer_id: PeerId },
    /// A registered peer's channel closed.
    Remove { peer_id: PeerId },
    /// Our own pointer sample, in native page coordinates, as it went out.
    Pointer {
        kind: EventKind,
        x: f64,
        y: f64,
        metadata: PointerMetadata,
    },
}

// ── Shared state ──────────────────────────────────────────────────────────────

/// State touched by the pump tasks and the throttle timer.
struct SessionShared {
    bounds: Mutex<BoundsTracker>,
    registry: Mutex<ChannelRegistry>,
    events: UnboundedSender<SessionEvent>,
}

impl SessionShared {
    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            trace!("session event receiver dropped");
        }
    }

    /// Handles one throttle-released local sample.
    fn handle_sample(&self, sample: RawPointerEvent) {
        let Some(kind) = sample.phase.event_kind() else {
            return;
        };

        let rect = self.bounds.lock().refresh();

        self.emit(SessionEvent::Pointer {
            kind,
            x: sample.x,
            y: sample.y,
            metadata: sample.metadata,
        });

        if rect.is_degenerate() {
            trace!("target has no area; {kind} sample not broadcast");
            return;
        }

        let frame = CursorFrame::new(kind, normalize(sample.x, sample.y, &rect));
        let report = self.registry.lock().broadcast(&encode_frame(&frame));
        trace!(
            "broadcast {kind} ({}, {}) to {} peer(s), {} failed",
            frame.point.x,
            frame.point.y,
            report.delivered,
            report.failed.len()
        );
    }

    fn handle_channel_event(&self, event: ChannelEvent) {
        trace!("channel event from {}", event.peer_id());
        match event {
            ChannelEvent::Opened { peer_id, channel } => self.handle_opened(peer_id, channel),
            ChannelEvent::Message { peer_id, payload } => self.handle_message(peer_id, &payload),
            ChannelEvent::Closed { peer_id } => self.handle_closed(peer_id),
        }
    }

    fn handle_opened(&self, peer_id: PeerId, channel: Arc<dyn DataChannel>) {
        let replaced = self.registry.lock().add(peer_id.clone(), channel);
        if replaced {
            debug!("peer {peer_id} reconnected; channel replaced");
        } else {
            debug!("peer {peer_id} joined");
        }
        self.emit(SessionEvent::Join { peer_id });
    }

    fn handle_message(&self, peer_id: PeerId, payload: &[u8]) {
        let frame = match decode_frame(payload) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("dropping frame from {peer_id}: {e}");
                return;
            }
        };

        let rect = self.bounds.lock().current();
        if rect.is_degenerate() {
            trace!("no local target; dropping {} frame from {peer_id}", frame.kind);
            return;
        }

        let (x, y) = denormalize(frame.point, &rect);
        self.emit(SessionEvent::Data {
            peer_id,
            kind: frame.kind,
            x,
            y,
        });
    }

    fn handle_closed(&self, peer_id: PeerId) {
        if self.registry.lock().remove(&peer_id).is_some() {
            debug!("peer {peer_id} left");
            self.emit(SessionEvent::Remove { peer_id });
        } else {
            debug!("close notification for unknown peer {peer_id} ignored");
        }
    }
}

/// The live subscription to one element.
struct Attachment {
    target: ElementHandle,
    throttle: Arc<Throttle<RawPointerEvent>>,
    pump: JoinHandle<()>,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// The share-cursor use case.
pub struct CursorSession {
    shared: Arc<SessionShared>,
    pointer_source: Arc<dyn PointerSource>,
    throttle_delay: Duration,
    attachment: Mutex<Option<Attachment>>,
    channel_pump: JoinHandle<()>,
}

impl CursorSession {
    /// Creates a session on an already-connected transport.
    ///
    /// Returns the session and the stream of [`SessionEvent`]s.  Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if the transport cannot create the
    /// data channel.  This is not retried.
    pub fn new(
        transport: Arc<dyn PeerTransport>,
        pointer_source: Arc<dyn PointerSource>,
        geometry: Arc<dyn GeometryProvider>,
        config: SessionConfig,
    ) -> Result<(Self, UnboundedReceiver<SessionEvent>), SessionError> {
        let mut channel_events =
            transport.create_data_channel(&config.channel_label, &config.channel_options)?;

        let (events, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SessionShared {
            bounds: Mutex::new(BoundsTracker::new(geometry)),
            registry: Mutex::new(ChannelRegistry::new()),
            events,
        });

        let pump_shared = Arc::clone(&shared);
        let channel_pump = tokio::spawn(async move {
            while let Some(event) = channel_events.recv().await {
                pump_shared.handle_channel_event(event);
            }
            debug!("channel event stream ended");
        });

        info!(
            "cursor session created on channel {:?} (throttle {:?})",
            config.channel_label, config.throttle_delay
        );

        Ok((
            Self {
                shared,
                pointer_source,
                throttle_delay: config.throttle_delay,
                attachment: Mutex::new(None),
                channel_pump,
            },
            events_rx,
        ))
    }

    /// Starts sharing pointer activity on `target`.
    ///
    /// Detaches from any previous element first.  Returns `self` so calls can
    /// be chained.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Pointer`] if the pointer source refuses to
    /// listen on `target`; the session is left detached.
    pub fn attach(&self, target: ElementHandle) -> Result<&Self, SessionError> {
        let mut attachment = self.attachment.lock();
        if let Some(previous) = attachment.take() {
            self.release(previous);
        }

        let mut samples = self
            .pointer_source
            .listen(&target, ListenOptions { include_over: true })?;

        let rect = {
            let mut bounds = self.shared.bounds.lock();
            bounds.set_target(Some(target.clone()));
            bounds.refresh()
        };

        let shared = Arc::clone(&self.shared);
        let throttle = Arc::new(Throttle::new(
            self.throttle_delay,
            move |sample: RawPointerEvent| shared.handle_sample(sample),
        ));

        let pump_throttle = Arc::clone(&throttle);
        let pump = tokio::spawn(async move {
            while let Some(sample) = samples.recv().await {
                // Phases peers never see must not displace a pending sample.
                if sample.phase.event_kind().is_some() {
                    pump_throttle.schedule(sample);
                }
            }
        });

        info!(
            "attached to {target} at ({}, {}) {}x{}",
            rect.x, rect.y, rect.width, rect.height
        );
        *attachment = Some(Attachment {
            target,
            throttle,
            pump,
        });
        Ok(self)
    }

    /// Stops sharing pointer activity.  No-op when already detached.
    pub fn detach(&self) {
        if let Some(previous) = self.attachment.lock().take() {
            self.release(previous);
        }
    }

    fn release(&self, attachment: Attachment) {
        // Stop the throttle first: a sample the pump is scheduling right now
        // is then refused.
        attachment.throttle.stop();
        attachment.pump.abort();
        self.pointer_source.stop(&attachment.target);

        let mut bounds = self.shared.bounds.lock();
        bounds.set_target(None);
        bounds.refresh();

        info!("detached from {}", attachment.target);
    }

    /// Re-reads the attached element's rectangle, e.g. after a viewport
    /// resize, so inbound frames map onto the new size.
    pub fn notify_resize(&self) -> TargetRect {
        let rect = self.shared.bounds.lock().refresh();
        debug!("bounds refreshed to {}x{}", rect.width, rect.height);
        rect
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.lock().is_some()
    }

    /// The currently attached element.
    pub fn target(&self) -> Option<ElementHandle> {
        self.attachment.lock().as_ref().map(|a| a.target.clone())
    }

    /// The rectangle inbound frames are currently mapped onto.
    pub fn current_bounds(&self) -> TargetRect {
        self.shared.bounds.lock().current()
    }

    /// Connected peers in the order their channels opened.
    pub fn peers(&self) -> Vec<PeerId> {
        self.shared.registry.lock().peers()
    }
}

impl Drop for CursorSession {
    fn drop(&mut self) {
        self.detach();
        self.channel_pump.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
