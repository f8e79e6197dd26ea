//! ChannelRegistry: the set of peers we are currently sharing the cursor with.
//!
//! The registry mirrors the transport's channel notifications:
//!
//! ```text
//! ChannelEvent::Opened { peer_id, channel }  ──►  add(peer_id, channel)
//! ChannelEvent::Closed { peer_id }           ──►  remove(peer_id)
//! local pointer sample                       ──►  broadcast(frame)
//! ```
//!
//! # Ordering and duplicates (for beginners)
//!
//! Peers are kept in the order their channels opened, and `broadcast` walks
//! them in that order.  A peer id appears at most once: when a peer
//! reconnects, its new channel replaces the old one in place instead of being
//! added a second time, so the reconnecting peer does not receive every frame
//! twice.
//!
//! # Failure isolation
//!
//! One peer's channel failing (closing mid-send, buffer full, ...) must not
//! stop the others from receiving the frame.  `broadcast` logs and records
//! each failure in the returned [`BroadcastReport`] and carries on.

use std::sync::Arc;

use tracing::warn;

use crate::infrastructure::transport::{ChannelError, DataChannel, PeerId};

/// A connected peer and the channel used to reach it.
#[derive(Clone)]
pub struct PeerChannel {
    pub peer_id: PeerId,
    pub channel: Arc<dyn DataChannel>,
}

impl std::fmt::Debug for PeerChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerChannel")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

/// Outcome of one [`ChannelRegistry::broadcast`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of channels that accepted the frame.
    pub delivered: usize,
    /// Channels that rejected it, in registry order.
    pub failed: Vec<(PeerId, ChannelError)>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered registry of peer channels.
#[derive(Default)]
pub struct ChannelRegistry {
    peers: Vec<PeerChannel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `channel` for `peer_id`.
    ///
    /// Returns `true` if an existing channel for the same peer was replaced.
    pub fn add(&mut self, peer_id: PeerId, channel: Arc<dyn DataChannel>) -> bool {
        match self.peers.iter_mut().find(|p| p.peer_id == peer_id) {
            Some(existing) => {
                existing.channel = channel;
                true
            }
            None => {
                self.peers.push(PeerChannel { peer_id, channel });
                false
            }
        }
    }

    /// Unregisters `peer_id`, returning its entry if it was registered.
    pub fn remove(&mut self, peer_id: &PeerId) -> Option<PeerChannel> {
        let idx = self.peers.iter().position(|p| p.peer_id == *peer_id)?;
        Some(self.peers.remove(idx))
    }

    /// Sends `frame` to every registered channel.
    pub fn broadcast(&self, frame: &[u8]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for peer in &self.peers {
            match peer.channel.send(frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("couldn't send cursor to peer {}: {e}", peer.peer_id);
                    report.failed.push((peer.peer_id.clone(), e));
                }
            }
        }
        report
    }

    /// Peer ids in registration order.
    pub fn peers(&self) -> Vec<PeerId> {
        self.peers.iter().map(|p| p.peer_id.clone()).collect()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.iter().any(|p| p.peer_id == *peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
