use std::time::Duration;

/// Bounded exponential backoff for transient backend failures.
///
/// The delay before retry `n` (zero-based) is `base * 2^n`, clamped to `max`.
/// `max_retries == 0` disables retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base: Duration,
    /// Upper bound on any single delay.
    pub max: Duration,
}

impl RetryPolicy {
    /// Upper bound applied when no explicit cap is configured.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

    /// A policy that never retries.
    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            base: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Exponential policy with the default delay cap.
    pub const fn exponential(max_retries: u32, base: Duration) -> Self {
        Self {
            max_retries,
            base,
            max: Self::DEFAULT_MAX_DELAY,
        }
    }

    /// Delay before the given zero-based retry.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
