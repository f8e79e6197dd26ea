//! Integration tests for `ChannelRegistry` driven by loopback channels.
//!
//! The registry is fed from real `ChannelEvent::Opened` notifications, the
//! same way the session feeds it, and its broadcast is checked against what
//! each peer's event stream actually receives.

use tokio::sync::mpsc::UnboundedReceiver;

use cursor_session::application::manage_peers::ChannelRegistry;
use cursor_session::infrastructure::transport::loopback::LoopbackHub;
use cursor_session::infrastructure::transport::{
    ChannelError, ChannelEvent, ChannelOptions, PeerId, PeerTransport,
};

fn open(hub: &LoopbackHub, id: &str) -> UnboundedReceiver<ChannelEvent> {
    hub.join(id)
        .create_data_channel("cursor", &ChannelOptions::default())
        .expect("create channel")
}

/// Registers every `Opened` event waiting on `rx`.
fn register_opened(registry: &mut ChannelRegistry, rx: &mut UnboundedReceiver<ChannelEvent>) {
    while let Ok(event) = rx.try_recv() {
        if let ChannelEvent::Opened { peer_id, channel } = event {
            registry.add(peer_id, channel);
        }
    }
}

fn payloads(rx: &mut UnboundedReceiver<ChannelEvent>) -> Vec<Vec<u8>> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|event| match event {
            ChannelEvent::Message { payload, .. } => Some(payload),
            _ => None,
        })
        .collect()
}

#[test]
fn test_broadcast_reaches_every_opened_peer() {
    // Arrange
    let hub = LoopbackHub::new();
    let mut hub_rx = open(&hub, "hub");
    let mut one = open(&hub, "one");
    let mut two = open(&hub, "two");
    let mut registry = ChannelRegistry::new();
    register_opened(&mut registry, &mut hub_rx);

    // Act
    let report = registry.broadcast(&[1, 0, 2, 0, 3, 0]);

    // Assert
    assert_eq!(report.delivered, 2);
    assert_eq!(payloads(&mut one), vec![vec![1, 0, 2, 0, 3, 0]]);
    assert_eq!(payloads(&mut two), vec![vec![1, 0, 2, 0, 3, 0]]);
}

#[test]
fn test_broadcast_skips_disconnected_peer_and_reports_it() {
    // Arrange – three peers, the middle one drops without the registry
    // having been told yet
    let hub = LoopbackHub::new();
    let mut hub_rx = open(&hub, "hub");
    let mut first = open(&hub, "first");
    let _second = open(&hub, "second");
    let mut third = open(&hub, "third");
    let mut registry = ChannelRegistry::new();
    register_opened(&mut registry, &mut hub_rx);
    hub.disconnect(&PeerId::from("second"));

    // Act
    let report = registry.broadcast(&[0; 6]);

    // Assert
    assert_eq!(report.delivered, 2);
    assert_eq!(
        report.failed,
        vec![(PeerId::from("second"), ChannelError::Closed)]
    );
    assert_eq!(payloads(&mut first).len(), 1);
    assert_eq!(payloads(&mut third).len(), 1);
}

#[test]
fn test_reconnected_peer_is_reached_through_new_channel_only() {
    // Arrange
    let hub = LoopbackHub::new();
    let mut hub_rx = open(&hub, "hub");
    let _old = open(&hub, "peer");
    let mut registry = ChannelRegistry::new();
    register_opened(&mut registry, &mut hub_rx);

    hub.disconnect(&PeerId::from("peer"));
    let mut new = open(&hub, "peer");
    register_opened(&mut registry, &mut hub_rx);

    // Act
    let report = registry.broadcast(&[9; 6]);

    // Assert
    assert!(report.is_complete());
    assert_eq!(registry.len(), 1);
    assert_eq!(payloads(&mut new), vec![vec![9; 6]]);
}
