//! Wall-clock abstraction so block forging stays deterministic in tests

/// Source of Unix timestamps for newly forged blocks.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds, with sub-second precision.
    fn now(&self) -> f64;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Clock pinned to a single instant. Used by tests that need
/// reproducible block timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}
