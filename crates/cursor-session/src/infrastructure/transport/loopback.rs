//! In-memory peer mesh.
//!
//! `LoopbackHub` plays the role of the signalling layer: every peer that
//! joins the hub and creates a data channel with a given label is
//! cross-wired with every other peer that created a channel with the same
//! label.  Bytes sent on a channel arrive as [`ChannelEvent::Message`] on the
//! other side, unmodified.
//!
//! ```text
//!            LoopbackHub
//!        ┌────────┴────────┐
//!   alice ◄──── link ────► bob
//!        ▲                 ▲
//!        └────── link ─────┴──► carol
//! ```
//!
//! `disconnect` tears every link of one peer down and notifies the others
//! with [`ChannelEvent::Closed`]; sends on a torn-down link fail with
//! [`ChannelError::Closed`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::{
    ChannelError, ChannelEvent, ChannelOptions, DataChannel, PeerId, PeerTransport,
    TransportError,
};

/// A channel endpoint registered with the hub.
struct Endpoint {
    peer_id: PeerId,
    label: String,
    options: ChannelOptions,
    events: UnboundedSender<ChannelEvent>,
}

/// An open pair of channels between two peers.
struct Link {
    a: PeerId,
    b: PeerId,
    label: String,
    open: Arc<AtomicBool>,
}

impl Link {
    fn involves(&self, peer_id: &PeerId) -> bool {
        self.a == *peer_id || self.b == *peer_id
    }
}

#[derive(Default)]
struct HubState {
    endpoints: Vec<Endpoint>,
    links: Vec<Link>,
}

/// Shared in-memory mesh.  Cloning the hub shares the same mesh.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a transport handle for `peer_id` on this mesh.
    pub fn join(&self, peer_id: impl Into<PeerId>) -> LoopbackTransport {
        LoopbackTransport {
            peer_id: peer_id.into(),
            hub: self.clone(),
        }
    }

    /// Drops every channel belonging to `peer_id`.
    ///
    /// Each remaining peer that was linked to it receives
    /// [`ChannelEvent::Closed`], and so does `peer_id` itself for each of its
    /// former partners.  Returns the number of links torn down.
    pub fn disconnect(&self, peer_id: &PeerId) -> usize {
        let mut state = self.state.lock();
        let (dropped, kept): (Vec<Link>, Vec<Link>) = std::mem::take(&mut state.links)
            .into_iter()
            .partition(|link| link.involves(peer_id));
        state.links = kept;

        for link in &dropped {
            link.open.store(false, Ordering::SeqCst);
            notify(&state.endpoints, &link.a, &link.label, ChannelEvent::Closed {
                peer_id: link.b.clone(),
            });
            notify(&state.endpoints, &link.b, &link.label, ChannelEvent::Closed {
                peer_id: link.a.clone(),
            });
        }
        state.endpoints.retain(|endpoint| endpoint.peer_id != *peer_id);

        debug!("loopback peer {peer_id} disconnected ({} links)", dropped.len());
        dropped.len()
    }

    /// Returns the options `peer_id` requested for the `label` channel, if it
    /// has created one.
    pub fn channel_options(&self, peer_id: &PeerId, label: &str) -> Option<ChannelOptions> {
        self.state
            .lock()
            .endpoints
            .iter()
            .find(|e| e.peer_id == *peer_id && e.label == label)
            .map(|e| e.options)
    }

    /// Number of open links on the mesh.
    pub fn link_count(&self) -> usize {
        self.state.lock().links.len()
    }

    fn register(
        &self,
        peer_id: &PeerId,
        label: &str,
        options: &ChannelOptions,
    ) -> Result<UnboundedReceiver<ChannelEvent>, TransportError> {
        let mut state = self.state.lock();
        if state
            .endpoints
            .iter()
            .any(|e| e.peer_id == *peer_id && e.label == label)
        {
            return Err(TransportError::DuplicateLabel(label.to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut new_links = Vec::new();

        for other in state
            .endpoints
            .iter()
            .filter(|e| e.label == label && e.peer_id != *peer_id)
        {
            let open = Arc::new(AtomicBool::new(true));

            // Our handle delivers into the other peer's event stream, and
            // theirs into ours.
            let to_other = LoopbackChannel {
                from: peer_id.clone(),
                to: other.events.clone(),
                open: Arc::clone(&open),
            };
            let to_us = LoopbackChannel {
                from: other.peer_id.clone(),
                to: tx.clone(),
                open: Arc::clone(&open),
            };

            let _ = tx.send(ChannelEvent::Opened {
                peer_id: other.peer_id.clone(),
                channel: Arc::new(to_other),
            });
            let _ = other.events.send(ChannelEvent::Opened {
                peer_id: peer_id.clone(),
                channel: Arc::new(to_us),
            });

            new_links.push(Link {
                a: peer_id.clone(),
                b: other.peer_id.clone(),
                label: label.to_string(),
                open,
            });
        }

        debug!(
            "loopback peer {peer_id} opened channel {label:?} to {} peer(s)",
            new_links.len()
        );

        state.links.extend(new_links);
        state.endpoints.push(Endpoint {
            peer_id: peer_id.clone(),
            label: label.to_string(),
            options: *options,
            events: tx,
        });
        Ok(rx)
    }
}

fn notify(endpoints: &[Endpoint], peer_id: &PeerId, label: &str, event: ChannelEvent) {
    if let Some(endpoint) = endpoints
        .iter()
        .find(|e| e.peer_id == *peer_id && e.label == label)
    {
        let _ = endpoint.events.send(event);
    }
}

/// One peer's view of the hub.
pub struct LoopbackTransport {
    peer_id: PeerId,
    hub: LoopbackHub,
}

impl PeerTransport for LoopbackTransport {
    fn create_data_channel(
        &self,
        label: &str,
        options: &ChannelOptions,
    ) -> Result<UnboundedReceiver<ChannelEvent>, TransportError> {
        self.hub.register(&self.peer_id, label, options)
    }
}

/// Sending half of a loopback link.
struct LoopbackChannel {
    from: PeerId,
    to: UnboundedSender<ChannelEvent>,
    open: Arc<AtomicBool>,
}

impl DataChannel for LoopbackChannel {
    fn send(&self, payload: &[u8]) -> Result<(), ChannelError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        self.to
            .send(ChannelEvent::Message {
                peer_id: self.from.clone(),
                payload: payload.to_vec(),
            })
            .map_err(|_| ChannelError::Closed)
    }
}
