use std::time::{Duration, Instant};

/// Enforces a minimum spacing between consecutive outbound API calls.
///
/// Calls are strictly sequential, so this is a plain elapsed-time check
/// with a blocking sleep. The delay math is separated from the sleep so
/// tests can drive it with fabricated instants.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Block until at least `min_interval` has passed since the previous
    /// call returned, then record the current instant.
    pub fn wait(&mut self) {
        if let Some(delay) = self.delay_until_ready(Instant::now()) {
            std::thread::sleep(delay);
        }
        self.last_call = Some(Instant::now());
    }

    fn delay_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_call?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
