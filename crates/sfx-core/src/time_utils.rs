use std::sync::atomic::{AtomicU64, Ordering};

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Source of unix-second timestamps for cooldown decisions.
pub trait Clock: Send + Sync {
    fn now_unix_seconds(&self) -> u64;
}

/// Wall-clock implementation backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> u64 {
        current_unix_timestamp()
    }
}

/// Settable clock for deterministic cooldown scenarios.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_unix_seconds: AtomicU64,
}

impl ManualClock {
    pub fn new(now_unix_seconds: u64) -> Self {
        Self {
            now_unix_seconds: AtomicU64::new(now_unix_seconds),
        }
    }

    pub fn set(&self, now_unix_seconds: u64) {
        self.now_unix_seconds.store(now_unix_seconds, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now_unix_seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix_seconds(&self) -> u64 {
        self.now_unix_seconds.load(Ordering::SeqCst)
    }
}
