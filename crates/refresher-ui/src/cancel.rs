use std::future::Future;

use async_std::channel::{self, Receiver, Sender};
use futures::future::{self, Either};
use futures::pin_mut;

/// Cooperative cancellation shared by every blocking step of a command.
///
/// Cloning is cheap and every clone observes the same state. Nothing is ever
/// sent on the inner channel: cancelling closes it, which wakes all pending
/// receivers at once.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(1);
        Self { tx, rx }
    }

    /// Fires the signal. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        if self.tx.close() {
            tracing::debug!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.is_closed()
    }

    /// Resolves once the signal fires.
    pub async fn cancelled(&self) {
        while self.rx.recv().await.is_ok() {}
    }

    /// Drives `fut` to completion unless the signal fires first, in which
    /// case `fut` is dropped and `None` is returned.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        let cancelled = self.cancelled();
        pin_mut!(fut);
        pin_mut!(cancelled);
        match future::select(fut, cancelled).await {
            Either::Left((out, _)) => Some(out),
            Either::Right(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[async_std::test]
    async fn run_completes() {
        let signal = CancelSignal::new();
        assert_eq!(signal.run(async { 42 }).await, Some(42));
        assert!(!signal.is_cancelled());
    }

    #[async_std::test]
    async fn run_is_interrupted() {
        let signal = CancelSignal::new();
        let remote = signal.clone();
        async_std::task::spawn(async move {
            async_std::task::sleep(Duration::from_millis(20)).await;
            remote.cancel();
        });
        let out = signal.run(future::pending::<()>()).await;
        assert_eq!(out, None);
        assert!(signal.is_cancelled());
    }

    #[async_std::test]
    async fn already_cancelled() {
        let signal = CancelSignal::new();
        signal.cancel();
        signal.cancel();
        assert_eq!(signal.run(async { 1 }).await, None);
        signal.cancelled().await;
    }
}
