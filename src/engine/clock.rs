// Clock - wall-clock time sources for state timestamps

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait representing a millisecond clock used for state timestamps and the
/// resonance recency window.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the UNIX epoch
    fn now_ms(&self) -> u64;
}

/// Default time source backed by `SystemTime::now`.
#[derive(Debug, Default)]
pub struct SystemTimeSource {
    _unit: (),
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Deterministic time source for tests and offline runs.
///
/// Each call to `now_ms()` returns the current reading and then advances it
/// by a fixed step (10ms by default) so timestamps stay monotonic.
#[derive(Debug)]
pub struct StubTimeSource {
    now_ms: AtomicU64,
    step_ms: u64,
}

impl StubTimeSource {
    pub fn new(start_ms: u64, step_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
            step_ms,
        }
    }

    /// Clock that never advances on its own
    pub fn fixed(start_ms: u64) -> Self {
        Self::new(start_ms, 0)
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for StubTimeSource {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

impl TimeSource for StubTimeSource {
    fn now_ms(&self) -> u64 {
        self.now_ms.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
