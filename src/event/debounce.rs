use std::cell::Cell;
use std::time::{Duration, Instant};

/// Trailing-edge debounced signal.
///
/// Every [`mark`](Self::mark) pushes the deadline a full window past the
/// latest call, so a continuous burst never fires until it pauses.
/// [`poll`](Self::poll) reports readiness exactly once per armed deadline.
#[derive(Debug)]
pub struct DebouncedSignal {
    window: Duration,
    deadline: Cell<Option<Instant>>,
}

impl DebouncedSignal {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: Cell::new(None),
        }
    }

    /// Record a qualifying event, resetting the deadline
    pub fn mark(&self) {
        self.mark_at(Instant::now());
    }

    /// Record a qualifying event observed at `now`
    pub fn mark_at(&self, now: Instant) {
        self.deadline.set(Some(now + self.window));
    }

    /// True once `now` has passed the armed deadline; disarms on firing
    pub fn poll(&self, now: Instant) -> bool {
        match self.deadline.get() {
            Some(deadline) if now >= deadline => {
                self.deadline.set(None);
                true
            }
            _ => false,
        }
    }

    /// Drop any armed deadline without firing
    pub fn reset(&self) {
        self.deadline.set(None);
    }
}
