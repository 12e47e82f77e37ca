//! Exponential backoff schedule for rate-limited calls.

use std::time::Duration;

/// Attempts made by default before a rate limit is reported.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Delay after the first rate-limited attempt, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 3_000;

/// Growth factor applied to the delay after each further attempt.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 3.0;

/// Immutable retry configuration for a guarded call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay_ms: u64,
    /// Multiplier applied per additional attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            backoff_multiplier,
        }
    }

    /// Attempts actually made; a policy of zero still makes one.
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether another attempt follows the 0-indexed `attempt_index`.
    pub fn has_attempt_after(&self, attempt_index: u32) -> bool {
        attempt_index.saturating_add(1) < self.effective_attempts()
    }

    /// Delay to wait after the failed attempt `attempt_index` (0-indexed).
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        calculate_backoff(attempt_index, self.base_delay_ms, self.backoff_multiplier)
    }
}

/// Calculate `base_ms * multiplier^attempt_index`, saturating on overflow.
///
/// No jitter is applied: the schedule is part of the caller-visible contract.
pub fn calculate_backoff(attempt_index: u32, base_ms: u64, multiplier: f64) -> Duration {
    let exponent = i32::try_from(attempt_index).unwrap_or(i32::MAX);
    let delay_ms = base_ms as f64 * multiplier.powi(exponent);

    if !delay_ms.is_finite() || delay_ms >= u64::MAX as f64 {
        return Duration::from_millis(u64::MAX);
    }
    Duration::from_millis(delay_ms.max(0.0).round() as u64)
}
