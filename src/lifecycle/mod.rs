//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Cancellation::cancel()
//!
//! Cancellation (cancel.rs):
//!     CancelToken → resilience gate (backoff sleep + remote call)
//! ```

pub mod cancel;
pub mod signals;

pub use cancel::{CancelToken, Cancellation};
