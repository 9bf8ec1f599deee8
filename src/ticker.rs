//! Fixed-period tick scheduling against a monotonic millisecond clock.
//!
//! The first tick is due immediately. After a tick runs late (a slow HTTP
//! probe, a full eleven-attempt send) the next deadline is measured from
//! the moment of the late tick, so missed periods are never replayed in a
//! burst.

/// What the caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickWait {
    /// Run a tick now.
    Due,
    /// Nothing due; sleep at most this many milliseconds.
    Sleep(u64),
}

pub struct Ticker {
    period_ms: u64,
    next_due_ms: u64,
}

impl Ticker {
    pub fn new(period_ms: u32, now_ms: u64) -> Self {
        Self {
            period_ms: u64::from(period_ms),
            next_due_ms: now_ms,
        }
    }

    /// Check the clock. When a tick is due the deadline advances by one
    /// period; callers must run the tick on `Due`.
    pub fn poll(&mut self, now_ms: u64) -> TickWait {
        if now_ms < self.next_due_ms {
            return TickWait::Sleep(self.next_due_ms - now_ms);
        }
        let scheduled = self.next_due_ms + self.period_ms;
        self.next_due_ms = if scheduled > now_ms {
            scheduled
        } else {
            now_ms + self.period_ms
        };
        TickWait::Due
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}
