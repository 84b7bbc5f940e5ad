//! Process-wide request spacing for the geocoding provider.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Nominatim's usage policy asks for at most one request per second.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Serializes request starts so that no two are closer than `min_interval`.
///
/// Waiters queue on the lock in arrival order; the lock is released before the
/// request itself is sent.
pub struct RateGate {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for the next free slot and claim it. Returns the claimed start time.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_start.lock().await;
        if let Some(prev) = *last {
            sleep_until(prev + self.min_interval).await;
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
