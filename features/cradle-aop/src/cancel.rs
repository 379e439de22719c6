use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

/// Cooperative cancellation for bounded waits
///
/// The retry interceptor sleeps on this between attempts; cancelling from
/// any thread wakes the sleeper immediately.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<CancelInner>);

#[derive(Default)]
struct CancelInner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.0.cancelled.lock();
        *cancelled = true;
        self.0.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.cancelled.lock()
    }

    /// Blocks for up to `delay`
    ///
    /// Returns `true` if the full delay elapsed, `false` if the token was
    /// cancelled before or during the wait.
    pub fn wait(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut cancelled = self.0.cancelled.lock();
        while !*cancelled {
            if self.0.condvar.wait_until(&mut cancelled, deadline).timed_out() {
                return !*cancelled;
            }
        }
        false
    }
}
