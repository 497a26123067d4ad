//! Process-wide throttle on processing starts.
//!
//! One [`RateGate`] is shared by every running job. The last-acquire
//! timestamp lives behind an async mutex that is held across the wait, so
//! concurrent callers are serialized and no two of them can claim the same
//! interval slot.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    last_acquired: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_acquired: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until at least `interval` has passed since the previous
    /// acquire anywhere in the process, then record now as the new
    /// last-acquire time. Returns that time.
    ///
    /// The first acquire never waits.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_acquired.lock().await;

        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            let now = Instant::now();
            if ready_at > now {
                debug!(
                    wait_ms = (ready_at - now).as_millis() as u64,
                    "rate gate closed, waiting"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}
