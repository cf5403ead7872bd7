//! Fixed-interval call spacing
//!
//! Used to keep person lookups at least `interval` apart so the lookup
//! endpoint is not flooded and sink updates stay observably ordered.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default spacing between person lookups
pub const DEFAULT_LOOKUP_INTERVAL: Duration = Duration::from_secs(3);

/// Enforces a minimum interval between successive permits
#[derive(Debug)]
pub struct IntervalLimiter {
    last_permit: Mutex<Option<Instant>>,
    interval: Duration,
}

impl IntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_permit: Mutex::new(None),
            interval,
        }
    }

    /// Wait for the next lookup slot and return how long that took
    ///
    /// The first call is granted at once. Each later call is held back until
    /// `interval` has passed since the previous grant; a caller that was idle
    /// for longer than that is not delayed at all.
    pub async fn wait(&self) -> Duration {
        let mut last_permit = self.last_permit.lock().await;
        let requested_at = Instant::now();

        let ready_at = match *last_permit {
            Some(previous) => (previous + self.interval).max(requested_at),
            None => requested_at,
        };
        if ready_at > requested_at {
            tokio::time::sleep_until(ready_at).await;
        }

        let granted_at = Instant::now();
        *last_permit = Some(granted_at);
        granted_at - requested_at
    }
}

impl Default for IntervalLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_INTERVAL)
    }
}
