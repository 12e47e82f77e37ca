//! Cancellation of in-flight guarded calls.

use std::sync::Arc;
use tokio::sync::watch;

/// Coordinator that cancels every call holding one of its tokens.
///
/// Backed by a watch channel so tokens created after `cancel()` still observe it.
#[derive(Debug, Clone)]
pub struct Cancellation {
    tx: Arc<watch::Sender<bool>>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Hand out a token for one or more calls.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel all calls holding a token from this coordinator.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side, threaded through backoff delays and remote calls.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; pends forever if the coordinator is gone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_token_observes_cancel() {
        let cancellation = Cancellation::new();
        let token = cancellation.token();
        assert!(!token.is_cancelled());

        cancellation.cancel();
        assert!(token.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("token should resolve after cancel");
    }

    #[tokio::test]
    async fn test_late_token_sees_cancel() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        assert!(cancellation.token().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_token_pends() {
        let token = CancelToken::never();
        let result = tokio::time::timeout(Duration::from_secs(3600), token.cancelled()).await;
        assert!(result.is_err());
    }
}
