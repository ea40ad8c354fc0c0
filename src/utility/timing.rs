// ============================================
// TIMING UTILITY - Request/Upstream Latency
// ============================================
// Usage:
//   1. Manual tracking: let timer = Timer::start("name"); ... timer.stop();
//      Timer::start_with_threshold("name", ms) only logs when slower than ms
//   2. Async wrapper: let result = timed_async("name", || async { ... }).await;
//   3. Handlers: Timer::silent("name") and read elapsed_ms() for the envelope
// ============================================

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const SLOW_MS: u128 = 1000;

/// Timer for measuring execution time
pub struct Timer {
    name: String,
    start: Instant,
    threshold_ms: u128,
    silent: bool,
    logged: bool,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self::build(name.into(), 0, false)
    }

    /// Only logs if execution exceeds threshold (in milliseconds)
    pub fn start_with_threshold(name: impl Into<String>, threshold_ms: u128) -> Self {
        Self::build(name.into(), threshold_ms, false)
    }

    /// Never logs; use elapsed_ms() manually
    pub fn silent(name: impl Into<String>) -> Self {
        Self::build(name.into(), 0, true)
    }

    fn build(name: String, threshold_ms: u128, silent: bool) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
            silent,
            logged: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Stop the timer and log the result
    pub fn stop(mut self) -> Duration {
        let duration = self.start.elapsed();
        self.log_duration(duration);
        self.logged = true;
        duration
    }

    fn log_duration(&self, duration: Duration) {
        if self.silent {
            return;
        }

        let ms = duration.as_millis();
        if ms < self.threshold_ms {
            return;
        }

        if ms > SLOW_MS {
            warn!(timer = %self.name, elapsed_ms = ms as u64, "slow operation");
        } else {
            info!(timer = %self.name, elapsed_ms = ms as u64, "timed");
        }
    }

    /// Time an async function
    pub async fn measure_async<F, Fut, R>(name: impl Into<String>, f: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let timer = Self::start(name);
        let result = f().await;
        timer.stop();
        result
    }
}

// Auto-log on drop unless already stopped
impl Drop for Timer {
    fn drop(&mut self) {
        if !self.logged {
            self.log_duration(self.start.elapsed());
        }
    }
}

/// Time an async function (shorthand)
pub async fn timed_async<F, Fut, R>(name: impl Into<String>, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = R>,
{
    Timer::measure_async(name, f).await
}
