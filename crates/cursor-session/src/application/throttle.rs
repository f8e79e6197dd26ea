//! Trailing-edge throttle.
//!
//! Pointer sources fire far more often than peers need frames.  `Throttle`
//! coalesces a burst of values into one callback per interval, carrying the
//! *latest* value:
//!
//! ```text
//! schedule:  a   b   c   d
//! time (ms): 0   2   4   6        10
//! callback:                        d
//! ```
//!
//! There is never more than one value waiting.  A new value overwrites the
//! pending one; it does not queue behind it.
//!
//! # Cancellation
//!
//! [`cancel`](Throttle::cancel) and [`stop`](Throttle::stop) are synchronous:
//! once they return, no previously scheduled value will reach the callback.
//! The callback runs under the throttle's lock, which is what makes that
//! guarantee hold when the timer fires on another worker thread.  The
//! callback must therefore never call back into the same throttle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

struct State<T> {
    pending: Option<T>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every cancel so a timer that already woke up can tell its
    /// value was withdrawn.
    generation: u64,
    stopped: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    callback: Box<dyn Fn(T) + Send + Sync>,
}

impl<T> Shared<T> {
    fn fire(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.stopped || state.generation != generation {
            return;
        }
        state.timer = None;
        if let Some(value) = state.pending.take() {
            (self.callback)(value);
        }
    }

    fn withdraw(state: &mut State<T>) {
        state.generation = state.generation.wrapping_add(1);
        state.pending = None;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

/// Rate limiter delivering at most one value per interval, trailing edge.
pub struct Throttle<T> {
    interval: Duration,
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Throttle<T> {
    pub fn new<F>(interval: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            interval,
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    pending: None,
                    timer: None,
                    generation: 0,
                    stopped: false,
                }),
                callback: Box::new(callback),
            }),
        }
    }

    /// Makes `value` the pending value and arms the timer if it is idle.
    ///
    /// Ignored after [`stop`](Self::stop).
    ///
    /// # Panics
    ///
    /// Arming the timer spawns a task, so this must be called from within a
    /// Tokio runtime.
    pub fn schedule(&self, value: T) {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return;
        }
        state.pending = Some(value);
        if state.timer.is_some() {
            return;
        }

        let generation = state.generation;
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            shared.fire(generation);
        }));
    }

    /// Drops the pending value and disarms the timer.  Later schedules work
    /// normally.
    pub fn cancel(&self) {
        Shared::withdraw(&mut self.shared.state.lock());
    }

    /// Cancels and refuses every future schedule.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        Shared::withdraw(&mut state);
        state.stopped = true;
    }

    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().pending.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().stopped
    }
}

impl<T> Drop for Throttle<T> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        Shared::withdraw(&mut state);
        state.stopped = true;
    }
}
