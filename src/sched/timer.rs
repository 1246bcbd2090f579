//! A periodic timer with drift-reset rescheduling.

use once_cell::sync::Lazy;
use std::time::Instant;

use crate::core::signal::Interrupt;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Milliseconds since process start. Monotonic, never wall-clock.
pub fn now_ms() -> u64 {
    EPOCH.elapsed().as_millis() as u64
}

type Callback = Box<dyn FnMut(u64) -> Result<(), Interrupt>>;

/// One registered periodic callback.
///
/// The first firing lands one full interval after registration.
/// Rescheduling is `now + interval`, not `next_due + interval`: a callback
/// that overruns its slot skips the missed firings instead of bursting to
/// catch up.
pub struct Timer {
    interval_ms: u64,
    next_due_ms: u64,
    callback: Callback,
}

impl Timer {
    pub fn new(interval_ms: u64, now: u64, callback: Callback) -> Timer {
        let interval_ms = interval_ms.max(1);
        Timer {
            interval_ms,
            next_due_ms: now + interval_ms,
            callback,
        }
    }

    /// Fire the callback if due, then reschedule from `now`.
    pub fn run_if_due(&mut self, now: u64) -> Result<(), Interrupt> {
        if now < self.next_due_ms {
            return Ok(());
        }
        (self.callback)(now)?;
        self.next_due_ms = now + self.interval_ms;
        Ok(())
    }

    pub fn next_due_in_ms(&self, now: u64) -> u64 {
        self.next_due_ms.saturating_sub(now)
    }
}
