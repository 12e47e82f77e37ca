//! Guarded calls: circuit check, bounded retries and backoff.
//!
//! # Flow
//! ```text
//! guarded call
//!     → circuit_breaker.rs admit()      (fail fast with CircuitOpen)
//!     → operation()
//!     → on error: classify.rs           (RateLimited | Other)
//!         RateLimited → trip circuit, sleep backoff.rs delay, retry
//!                       (RateLimited once attempts run out)
//!         Other       → return immediately, circuit untouched
//! ```
//!
//! The circuit is tripped on every rate-limited attempt, including the last
//! one, so concurrent callers sharing it stop issuing requests at once.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::lifecycle::CancelToken;
use crate::observability::metrics;
use crate::resilience::backoff::RetryPolicy;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::classify::{classify_description, Classifier, FailureKind};

/// Why a guarded call did not produce a value.
#[derive(Debug)]
pub enum GateError<E> {
    /// Cooldown active; the operation was not invoked.
    CircuitOpen { retry_after: Duration },

    /// The remote kept signalling rate limits until attempts ran out.
    RateLimited { attempts: u32, last_error: E },

    /// Any other failure, passed through unchanged.
    Other(E),

    /// The caller abandoned the call.
    Cancelled,
}

impl<E: fmt::Display> fmt::Display for GateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::CircuitOpen { retry_after } => write!(
                f,
                "circuit open: cooldown active for another {}ms",
                retry_after.as_millis()
            ),
            GateError::RateLimited { attempts, last_error } => {
                write!(f, "rate limited after {} attempt(s): {}", attempts, last_error)
            }
            GateError::Other(e) => write!(f, "{}", e),
            GateError::Cancelled => write!(f, "call cancelled"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for GateError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GateError::RateLimited { last_error, .. } => Some(last_error),
            GateError::Other(e) => e.source(),
            GateError::CircuitOpen { .. } | GateError::Cancelled => None,
        }
    }
}

impl<E> GateError<E> {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::CircuitOpen { .. } => "circuit_open",
            GateError::RateLimited { .. } => "rate_limited",
            GateError::Other(_) => "other",
            GateError::Cancelled => "cancelled",
        }
    }

    /// The underlying operation error, if one was produced.
    pub fn into_inner(self) -> Option<E> {
        match self {
            GateError::RateLimited { last_error, .. } => Some(last_error),
            GateError::Other(e) => Some(e),
            GateError::CircuitOpen { .. } | GateError::Cancelled => None,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, GateError::CircuitOpen { .. })
    }
}

/// A remote-call gate: one shared circuit plus a retry policy.
///
/// Cheap to clone; clones share the circuit.
#[derive(Clone)]
pub struct Gate {
    circuit: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    classifier: Classifier,
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("circuit", &self.circuit.name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Gate {
    pub fn new(circuit: Arc<CircuitBreaker>, policy: RetryPolicy) -> Self {
        Self {
            circuit,
            policy,
            classifier: classify_description,
        }
    }

    /// Replace the rate-limit detection rule.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn circuit(&self) -> &Arc<CircuitBreaker> {
        &self.circuit
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` through the gate.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, GateError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.call_with_cancel(&CancelToken::never(), operation).await
    }

    /// Run `operation` through the gate, abandoning it when `cancel` fires.
    pub async fn call_with_cancel<F, Fut, T, E>(
        &self,
        cancel: &CancelToken,
        operation: F,
    ) -> Result<T, GateError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let span = tracing::debug_span!(
            "guarded_call",
            call_id = %Uuid::new_v4(),
            circuit = %self.circuit.name()
        );
        let result = run_guarded(&self.circuit, &self.policy, self.classifier, cancel, operation)
            .instrument(span)
            .await;

        metrics::record_gate_outcome(match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        });
        result
    }
}

/// Run `operation` against `circuit` with `policy` and the default classifier.
pub async fn guarded_call<F, Fut, T, E>(
    circuit: &CircuitBreaker,
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, GateError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    run_guarded(circuit, policy, classify_description, &CancelToken::never(), operation).await
}

async fn run_guarded<F, Fut, T, E>(
    circuit: &CircuitBreaker,
    policy: &RetryPolicy,
    classify: Classifier,
    cancel: &CancelToken,
    mut operation: F,
) -> Result<T, GateError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    if let Err(retry_after) = circuit.admit() {
        tracing::debug!(
            retry_after_ms = retry_after.as_millis() as u64,
            "Circuit open, skipping remote call"
        );
        return Err(GateError::CircuitOpen { retry_after });
    }

    let mut attempt: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(GateError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GateError::Cancelled),
            outcome = operation() => outcome,
        };

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        match classify(&error.to_string()) {
            FailureKind::Other => {
                tracing::debug!(attempt = attempt + 1, error = %error, "Remote call failed");
                return Err(GateError::Other(error));
            }
            FailureKind::RateLimited => {
                circuit.trip();

                if !policy.has_attempt_after(attempt) {
                    tracing::warn!(
                        attempts = attempt + 1,
                        error = %error,
                        "Remote still rate limited, giving up"
                    );
                    return Err(GateError::RateLimited {
                        attempts: attempt + 1,
                        last_error: error,
                    });
                }

                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Remote rate limited, retrying after backoff"
                );
                metrics::record_retry(delay);

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(GateError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}
