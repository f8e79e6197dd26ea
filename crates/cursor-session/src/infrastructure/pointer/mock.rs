//! Scripted pointer source for tests and the demo binary.
//!
//! Allows callers to inject synthetic [`RawPointerEvent`]s for an element as
//! if a user were moving the pointer over it.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{ListenOptions, PointerError, PointerPhase, PointerSource, RawPointerEvent};
use crate::infrastructure::geometry::ElementHandle;

struct Listener {
    sender: UnboundedSender<RawPointerEvent>,
    options: ListenOptions,
}

/// A [`PointerSource`] driven by [`inject_event`](Self::inject_event).
#[derive(Default)]
pub struct ScriptedPointerSource {
    listeners: Mutex<HashMap<ElementHandle, Listener>>,
    stop_count: Mutex<u32>,
}

impl ScriptedPointerSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a sample on `target`, as if produced by the user.
    ///
    /// Returns `false` if nobody is listening on `target`, or if the sample
    /// is a hover and the listener did not ask for hover samples.
    pub fn inject_event(&self, target: &ElementHandle, event: RawPointerEvent) -> bool {
        let listeners = self.listeners.lock();
        let Some(listener) = listeners.get(target) else {
            return false;
        };
        if event.phase == PointerPhase::Over && !listener.options.include_over {
            return false;
        }
        listener.sender.send(event).is_ok()
    }

    /// Injects every sample in `trail` in order; returns how many were
    /// delivered.
    pub fn inject_trail<I>(&self, target: &ElementHandle, trail: I) -> usize
    where
        I: IntoIterator<Item = RawPointerEvent>,
    {
        trail
            .into_iter()
            .filter(|event| self.inject_event(target, *event))
            .count()
    }

    pub fn is_listening(&self, target: &ElementHandle) -> bool {
        self.listeners.lock().contains_key(target)
    }

    /// Options the current listener on `target` asked for.
    pub fn listen_options(&self, target: &ElementHandle) -> Option<ListenOptions> {
        self.listeners.lock().get(target).map(|l| l.options)
    }

    /// Number of times [`PointerSource::stop`] released a listener.
    pub fn stop_count(&self) -> u32 {
        *self.stop_count.lock()
    }
}

impl PointerSource for ScriptedPointerSource {
    fn listen(
        &self,
        target: &ElementHandle,
        options: ListenOptions,
    ) -> Result<UnboundedReceiver<RawPointerEvent>, PointerError> {
        let mut listeners = self.listeners.lock();
        if listeners.contains_key(target) {
            return Err(PointerError::AlreadyListening(target.clone()));
        }
        let (sender, rx) = mpsc::unbounded_channel();
        listeners.insert(target.clone(), Listener { sender, options });
        Ok(rx)
    }

    fn stop(&self, target: &ElementHandle) {
        // Dropping the sender ends the stream.
        if self.listeners.lock().remove(target).is_some() {
            *self.stop_count.lock() += 1;
        }
    }
}
