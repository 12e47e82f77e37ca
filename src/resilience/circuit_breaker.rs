//! Quota circuit breaker shared by every caller of a remote endpoint.
//!
//! # States
//! - Closed: calls pass through
//! - Open: the endpoint signalled rate limiting, calls fail fast
//!
//! # State Transitions
//! ```text
//! Closed → Open: any rate-limited attempt (resets the cooldown)
//! Open → Closed: first admission check after the cooldown elapsed
//! ```
//!
//! There is no half-open probe: the call that observes the expired cooldown
//! simply proceeds. The state is a single atomic deadline, so concurrent trips
//! are idempotent and a late clear can never erase a newer trip.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::observability::metrics;

/// Cooldown after a rate-limit signal.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(120_000);

/// Observable circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
}

/// Point-in-time view of a circuit, for status output.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub tripped: bool,
    pub retry_after_ms: Option<u64>,
}

/// Circuit breaker guarding one remote endpoint.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    cooldown: Duration,
    epoch: Instant,
    /// Microseconds since `epoch` (offset by one) at which the cooldown ends.
    /// Zero while the circuit is not tripped.
    reset_at: AtomicU64,
}

impl CircuitBreaker {
    /// Create a closed circuit with the given cooldown.
    pub fn new(name: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            name: name.into(),
            cooldown,
            epoch: Instant::now(),
            reset_at: AtomicU64::new(0),
        }
    }

    /// Create a closed circuit with the two-minute default cooldown.
    pub fn with_default_cooldown(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_COOLDOWN)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    fn now_micros(&self) -> u64 {
        let elapsed = u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX - 1);
        elapsed.saturating_add(1)
    }

    /// Precondition check run before every guarded call.
    ///
    /// Returns `Err(retry_after)` while the cooldown is active. Once it has
    /// elapsed the trip is cleared and the call may proceed.
    pub fn admit(&self) -> Result<(), Duration> {
        let mut reset_at = self.reset_at.load(Ordering::Acquire);
        loop {
            if reset_at == 0 {
                return Ok(());
            }

            let now = self.now_micros();
            if now < reset_at {
                metrics::record_circuit_rejection(&self.name);
                return Err(Duration::from_micros(reset_at - now));
            }

            match self
                .reset_at
                .compare_exchange(reset_at, 0, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    tracing::info!(circuit = %self.name, "Cooldown elapsed, circuit closed");
                    return Ok(());
                }
                // Someone tripped the circuit again in between; re-evaluate.
                Err(current) => reset_at = current,
            }
        }
    }

    /// Trip the circuit: open it until `now + cooldown`.
    pub fn trip(&self) {
        let cooldown = u64::try_from(self.cooldown.as_micros()).unwrap_or(u64::MAX);
        let reset_at = self.now_micros().saturating_add(cooldown);
        let previous = self.reset_at.fetch_max(reset_at, Ordering::AcqRel);

        if previous == 0 {
            tracing::warn!(
                circuit = %self.name,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Rate limit detected, circuit opened"
            );
        }
        metrics::record_circuit_trip(&self.name);
    }

    /// True while a trip is recorded, even if its cooldown already elapsed
    /// and no call has cleared it yet.
    pub fn is_tripped(&self) -> bool {
        self.reset_at.load(Ordering::Acquire) != 0
    }

    /// Remaining cooldown, if any. Does not clear an expired trip.
    pub fn retry_after(&self) -> Option<Duration> {
        let reset_at = self.reset_at.load(Ordering::Acquire);
        let now = self.now_micros();
        (reset_at != 0 && now < reset_at).then(|| Duration::from_micros(reset_at - now))
    }

    pub fn state(&self) -> CircuitState {
        if self.retry_after().is_some() {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let retry_after = self.retry_after();
        CircuitSnapshot {
            name: self.name.clone(),
            state: if retry_after.is_some() { CircuitState::Open } else { CircuitState::Closed },
            tripped: self.is_tripped(),
            retry_after_ms: retry_after.map(|d| d.as_millis() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_initially_closed() {
        let circuit = CircuitBreaker::with_default_cooldown("gemini");
        assert_eq!(circuit.state(), CircuitState::Closed);
        assert!(!circuit.is_tripped());
        assert!(circuit.admit().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trip_and_cooldown() {
        let circuit = CircuitBreaker::with_default_cooldown("gemini");
        circuit.trip();

        assert_eq!(circuit.state(), CircuitState::Open);
        assert_eq!(circuit.admit(), Err(Duration::from_millis(120_000)));

        tokio::time::advance(Duration::from_millis(119_999)).await;
        assert_eq!(circuit.admit(), Err(Duration::from_millis(1)));

        tokio::time::advance(Duration::from_millis(1)).await;
        // Expired but not yet observed by a call.
        assert!(circuit.is_tripped());
        assert_eq!(circuit.state(), CircuitState::Closed);

        assert!(circuit.admit().is_ok());
        assert!(!circuit.is_tripped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrip_extends_cooldown() {
        let circuit = CircuitBreaker::new("gemini", Duration::from_secs(10));
        circuit.trip();
        tokio::time::advance(Duration::from_secs(6)).await;
        circuit.trip();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(circuit.admit(), Err(Duration::from_secs(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_trips_idempotent() {
        let circuit = Arc::new(CircuitBreaker::new("gemini", Duration::from_secs(30)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let circuit = circuit.clone();
                tokio::spawn(async move { circuit.trip() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(circuit.retry_after(), Some(Duration::from_secs(30)));
        let snapshot = circuit.snapshot();
        assert_eq!(snapshot.state, CircuitState::Open);
        assert_eq!(snapshot.retry_after_ms, Some(30_000));
    }
}
