//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the generative endpoint:
//!     → circuit_breaker.rs (fail fast while a quota cooldown is active)
//!     → retries.rs (run the call, classify failures)
//!     → classify.rs (rate limited or not, by error text)
//!     → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Only rate-limit failures are retried; everything else is reported at once
//! - Any rate-limit signal opens the circuit for every caller sharing it
//! - Circuits are owned values shared via Arc, one per endpoint (registry.rs)

pub mod backoff;
pub mod circuit_breaker;
pub mod classify;
pub mod registry;
pub mod retries;

pub use backoff::RetryPolicy;
pub use circuit_breaker::{CircuitBreaker, CircuitSnapshot, CircuitState, DEFAULT_COOLDOWN};
pub use classify::{classify_description, classify_failure, FailureKind};
pub use registry::CircuitRegistry;
pub use retries::{guarded_call, Gate, GateError};
