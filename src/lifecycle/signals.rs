//! OS signal handling.
//!
//! An interrupt (Ctrl-C / SIGINT) cancels every in-flight guarded call so no
//! backoff timer is left pending when the user abandons the process.

use tokio::task::JoinHandle;

use crate::lifecycle::Cancellation;

/// Spawn a task that cancels `cancellation` on the first interrupt.
pub fn cancel_on_interrupt(cancellation: Cancellation) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, cancelling in-flight calls");
                cancellation.cancel();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
            }
        }
    })
}
