//! `sharedcursor` demo entry point.
//!
//! Builds two peers on an in-memory loopback mesh, each with its own page
//! and a differently sized canvas, and replays a scripted pointer trail on
//! the first one.  Everything the second peer receives is logged, already
//! mapped onto its own canvas.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()               -- throttle, channel label/options, log level
//!  └─ LoopbackHub                 -- stands in for the signalling layer
//!       ├─ Peer "small" 200x200   -- CursorSession + LayoutTree + scripted pointer
//!       └─ Peer "large" 500x500   -- CursorSession + LayoutTree + scripted pointer
//!  └─ replay trail on "small", then disconnect it
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cursor_session::infrastructure::geometry::{ElementBox, ElementHandle, LayoutTree};
use cursor_session::infrastructure::pointer::mock::ScriptedPointerSource;
use cursor_session::infrastructure::pointer::{PointerPhase, RawPointerEvent};
use cursor_session::infrastructure::storage::config::{load_config, AppConfig};
use cursor_session::infrastructure::transport::loopback::LoopbackHub;
use cursor_session::infrastructure::transport::PeerId;
use cursor_session::{CursorSession, SessionEvent};

/// One simulated participant: its page, its pointer and its session.
struct Peer {
    name: &'static str,
    id: PeerId,
    canvas: ElementHandle,
    pointer: Arc<ScriptedPointerSource>,
    session: CursorSession,
}

impl Peer {
    fn join(
        hub: &LoopbackHub,
        name: &'static str,
        canvas_box: ElementBox,
        config: &AppConfig,
    ) -> anyhow::Result<(Self, UnboundedReceiver<SessionEvent>)> {
        let id = PeerId::generate();
        let canvas = ElementHandle::new("canvas");

        let page = Arc::new(LayoutTree::new());
        page.insert("body", ElementBox::new(8.0, 8.0, 1264.0, 704.0));
        page.insert(canvas.clone(), canvas_box.with_parent("body"));

        let pointer = Arc::new(ScriptedPointerSource::new());
        let (session, events) = CursorSession::new(
            Arc::new(hub.join(id.clone())),
            pointer.clone(),
            page,
            config.session_config(),
        )
        .with_context(|| format!("creating session for {name}"))?;

        session
            .attach(canvas.clone())
            .with_context(|| format!("attaching {name} to its canvas"))?;
        info!("peer {name} is {id}, bounds {:?}", session.current_bounds());

        Ok((
            Self {
                name,
                id,
                canvas,
                pointer,
                session,
            },
            events,
        ))
    }
}

async fn log_events(name: &'static str, mut events: UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Data { peer_id, kind, x, y } => {
                info!("[{name}] {kind} from {peer_id} at ({x}, {y})");
            }
            SessionEvent::Join { peer_id } => info!("[{name}] {peer_id} joined"),
            SessionEvent::Remove { peer_id } => info!("[{name}] {peer_id} left"),
            SessionEvent::Pointer { kind, x, y, .. } => {
                info!("[{name}] local {kind} at ({x}, {y})");
            }
        }
    }
}

/// A press-drag-release across the canvas, preceded by a hover.
fn trail(origin: (f64, f64), size: f64) -> Vec<RawPointerEvent> {
    let at = |fraction: f64| (origin.0 + size * fraction, origin.1 + size * fraction);
    let mut samples = Vec::new();

    let (x, y) = at(0.1);
    samples.push(RawPointerEvent::new(PointerPhase::Over, x, y));
    samples.push(RawPointerEvent::new(PointerPhase::Down, x, y));
    for step in 2..=8 {
        let (x, y) = at(step as f64 / 10.0);
        samples.push(RawPointerEvent::new(PointerPhase::Move, x, y));
    }
    let (x, y) = at(0.9);
    samples.push(RawPointerEvent::new(PointerPhase::Up, x, y));
    samples
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = load_config();
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.session.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    let config = loaded.unwrap_or_else(|e| {
        warn!("using default configuration: {e}");
        AppConfig::default()
    });

    info!("sharedcursor demo starting");

    let hub = LoopbackHub::new();
    let (small, small_events) =
        Peer::join(&hub, "small", ElementBox::new(0.0, 0.0, 200.0, 200.0), &config)?;
    let (large, large_events) =
        Peer::join(&hub, "large", ElementBox::new(208.0, 0.0, 500.0, 500.0), &config)?;

    tokio::spawn(log_events(small.name, small_events));
    tokio::spawn(log_events(large.name, large_events));

    // Let both sessions see each other's channel open.
    tokio::time::sleep(Duration::from_millis(10)).await;
    info!("{} sees peers {:?}", small.name, small.session.peers());

    // Space samples two throttle windows apart so every one goes out.
    let gap = config.session_config().throttle_delay * 2;
    let bounds = small.session.current_bounds();
    for sample in trail((bounds.x, bounds.y), bounds.width) {
        small.pointer.inject_event(&small.canvas, sample);
        tokio::time::sleep(gap).await;
    }

    info!("disconnecting {}", small.name);
    hub.disconnect(&small.id);
    tokio::time::sleep(Duration::from_millis(10)).await;

    small.session.detach();
    large.session.detach();

    info!("sharedcursor demo finished");
    Ok(())
}
