//! Peer transport abstraction: data channels and their lifecycle events.
//!
//! # What is a data channel? (for beginners)
//!
//! Peers in a shared-cursor session are already connected to each other by
//! some external signalling layer (a WebRTC mesh, a relay server, ...).  This
//! crate never opens sockets itself.  Instead it asks the transport for a
//! *named* data channel, and the transport reports back, for every connected
//! peer:
//!
//! ```text
//! create_data_channel("cursor", options)
//!        │
//!        ▼
//!   ChannelEvent::Opened  { peer_id, channel }   ← a peer's channel is ready
//!   ChannelEvent::Message { peer_id, payload }   ← the peer sent us bytes
//!   ChannelEvent::Closed  { peer_id }            ← the peer went away
//! ```
//!
//! The `channel` handle in `Opened` is how we send bytes *to* that peer.
//!
//! # Sub-modules
//!
//! - **`loopback`** – An in-memory mesh used by the demo binary and the
//!   integration tests.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

pub mod loopback;

// ── Peer identity ─────────────────────────────────────────────────────────────

/// Opaque identifier of a remote peer, supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random identifier (UUID v4), the way signalling servers
    /// usually name anonymous peers.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure to send on a single data channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("data channel is closed")]
    Closed,
    #[error("data channel is closing")]
    Closing,
}

/// Failure of the transport as a whole.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport handle cannot create data channels at all.
    #[error("transport does not support data channels")]
    Unsupported,
    /// A channel with this label was already requested from this transport.
    #[error("data channel {0:?} already exists")]
    DuplicateLabel(String),
}

// ── Channel options ───────────────────────────────────────────────────────────

/// Delivery options passed verbatim to the transport when the channel is
/// created.
///
/// The default asks for ordered delivery with no retransmits: a lost cursor
/// frame is superseded by the next one anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOptions {
    #[serde(default = "default_ordered")]
    pub ordered: bool,
    /// `None` means "fully reliable" (unlimited retransmits).
    #[serde(default = "default_max_retransmits")]
    pub max_retransmits: Option<u16>,
}

fn default_ordered() -> bool {
    true
}
fn default_max_retransmits() -> Option<u16> {
    Some(0)
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            ordered: default_ordered(),
            max_retransmits: default_max_retransmits(),
        }
    }
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// Outbound half of one peer's data channel.
///
/// `send` must not block: implementations queue the bytes or fail fast.
#[cfg_attr(test, mockall::automock)]
pub trait DataChannel: Send + Sync {
    fn send(&self, payload: &[u8]) -> Result<(), ChannelError>;
}

/// Lifecycle and message notifications for one named channel.
pub enum ChannelEvent {
    Opened {
        peer_id: PeerId,
        channel: Arc<dyn DataChannel>,
    },
    Message {
        peer_id: PeerId,
        payload: Vec<u8>,
    },
    Closed {
        peer_id: PeerId,
    },
}

impl ChannelEvent {
    pub fn peer_id(&self) -> &PeerId {
        match self {
            ChannelEvent::Opened { peer_id, .. }
            | ChannelEvent::Message { peer_id, .. }
            | ChannelEvent::Closed { peer_id } => peer_id,
        }
    }
}

impl fmt::Debug for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelEvent::Opened { peer_id, .. } => {
                f.debug_struct("Opened").field("peer_id", peer_id).finish_non_exhaustive()
            }
            ChannelEvent::Message { peer_id, payload } => f
                .debug_struct("Message")
                .field("peer_id", peer_id)
                .field("len", &payload.len())
                .finish(),
            ChannelEvent::Closed { peer_id } => {
                f.debug_struct("Closed").field("peer_id", peer_id).finish()
            }
        }
    }
}

/// The already-established multi-peer connection the session rides on.
pub trait PeerTransport: Send + Sync {
    /// Requests a named data channel to every current and future peer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unsupported`] if this transport cannot carry
    /// data channels.
    fn create_data_channel(
        &self,
        label: &str,
        options: &ChannelOptions,
    ) -> Result<UnboundedReceiver<ChannelEvent>, TransportError>;
}
