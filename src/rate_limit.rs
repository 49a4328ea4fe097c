use std::time::Duration;
use tracing::debug;

/// Randomised pause between consecutive listing visits, so requests do
/// not arrive at a fixed cadence.
pub struct RateLimiter {
    min: Duration,
    max: Duration,
    rng: fastrand::Rng,
    primed: bool,
}

impl RateLimiter {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self::with_rng(min, max, fastrand::Rng::new())
    }

    pub fn with_rng(min: Duration, max: Duration, rng: fastrand::Rng) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            rng,
            primed: false,
        }
    }

    /// Draw a delay uniformly from `[min, max]`
    pub fn next_delay(&mut self) -> Duration {
        let span = self.max - self.min;
        self.min + span.mul_f64(self.rng.f64())
    }

    /// Sleep before every call but the first
    pub async fn pause(&mut self) {
        if !self.primed {
            self.primed = true;
            return;
        }
        let delay = self.next_delay();
        debug!("Waiting {:?} before next listing", delay);
        tokio::time::sleep(delay).await;
    }
}
