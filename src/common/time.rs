use std::time::Duration;

#[cfg_attr(feature = "quanta", path = "time/clock_quanta.rs")]
#[cfg_attr(not(feature = "quanta"), path = "time/clock_compat.rs")]
pub(crate) mod clock;

/// Measures the wall-clock duration of a batch.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stopwatch {
    started: clock::Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            started: clock::Instant::now(),
        }
    }

    /// Returns the time elapsed since `start`, or zero if the clock went
    /// backwards.
    pub(crate) fn elapsed(&self) -> Duration {
        clock::Instant::now()
            .checked_duration_since(self.started)
            .unwrap_or_default()
    }
}
