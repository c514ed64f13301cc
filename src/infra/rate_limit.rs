//! Minimum-gap throttle for outbound upstream calls.

use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Default spacing between consecutive upstream calls.
pub const DEFAULT_MIN_GAP: Duration = Duration::from_secs(3);

/// Cooperative throttle guaranteeing a minimum gap between consecutive
/// calls, not a maximum rate over a window.
pub struct RateLimiter {
    min_gap: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_call: None,
        }
    }

    /// Suspends until at least `min_gap` has passed since the previous call,
    /// then stamps the current time as the new last-call instant.
    ///
    /// The wait is an await point, never a busy-wait, so concurrent tasks on
    /// the same runtime keep making progress.
    pub async fn wait_turn(&mut self) {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.min_gap {
                sleep(self.min_gap - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_turn_is_immediate() {
        let mut limiter = RateLimiter::new(Duration::from_secs(3));
        let before = Instant::now();
        limiter.wait_turn().await;
        assert_eq!(Instant::now() - before, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_turns_are_spaced() {
        let mut limiter = RateLimiter::new(Duration::from_secs(3));
        limiter.wait_turn().await;
        let before = Instant::now();
        limiter.wait_turn().await;
        assert!(Instant::now() - before >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_gap_passes_straight_through() {
        let mut limiter = RateLimiter::new(Duration::from_secs(3));
        limiter.wait_turn().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        limiter.wait_turn().await;
        assert_eq!(Instant::now() - before, Duration::ZERO);
    }
}
