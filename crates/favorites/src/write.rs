//! Background store writes.
//!
//! Store writes never block the caller: they are spawned onto the runtime the
//! coordinator was built on and tracked so that [`Scope::shutdown`] can cancel
//! and drain them. Each write reports its own failure through `tracing`; the
//! returned [`PendingWrite`] only needs to be kept by callers that care when
//! (or whether) the write landed.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Handle to a background store write.
///
/// Dropping it detaches the write; it still runs to completion (or until the
/// coordinator shuts down).
#[derive(Debug)]
pub struct PendingWrite {
    join: Option<JoinHandle<bool>>,
}
impl PendingWrite {
    fn skipped() -> Self {
        Self { join: None }
    }

    /// Wait for the write to finish.
    ///
    /// Returns `true` if the store accepted the write, `false` if it failed,
    /// was cancelled by shutdown or was never started.
    pub async fn wait(self) -> bool {
        let Some(join) = self.join else {
            return false;
        };
        match join.await {
            Ok(written) => written,
            Err(err) => {
                tracing::warn!(error = %err, "Background favorites write did not complete");
                false
            },
        }
    }

    /// Returns `true` once the write has finished one way or another.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

/// Lifetime scope for background writes.
#[derive(Debug)]
pub(crate) struct Scope {
    runtime: Handle,
    tracker: TaskTracker,
    token: CancellationToken,
}
impl Scope {
    pub(crate) fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tracker: TaskTracker::new(),
            token: CancellationToken::new(),
        }
    }

    /// Spawn a write. The future resolves to whether the write succeeded.
    pub(crate) fn spawn<F>(&self, label: &'static str, write: F) -> PendingWrite
    where
        F: Future<Output = bool> + Send + 'static,
    {
        if self.token.is_cancelled() {
            tracing::warn!(write = label, "Favorites coordinator is shut down; skipping write");
            return PendingWrite::skipped();
        }
        let token = self.token.clone();
        let join = self.tracker.spawn_on(
            async move {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        tracing::debug!(write = label, "Background write cancelled by shutdown");
                        false
                    },
                    written = write => written,
                }
            },
            &self.runtime,
        );
        PendingWrite { join: Some(join) }
    }

    /// Cancel in-flight writes and wait for every task to finish.
    pub(crate) async fn shutdown(&self) {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawned_write_reports_result() {
        let scope = Scope::new(Handle::current());
        assert!(scope.spawn("ok", async { true }).wait().await);
        assert!(!scope.spawn("failed", async { false }).wait().await);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_writes() {
        let scope = Scope::new(Handle::current());
        let pending = scope.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            true
        });
        scope.shutdown().await;
        assert!(!pending.wait().await);
    }

    #[tokio::test]
    async fn test_writes_after_shutdown_are_skipped() {
        let scope = Scope::new(Handle::current());
        scope.shutdown().await;
        let pending = scope.spawn("late", async { true });
        assert!(pending.is_finished());
        assert!(!pending.wait().await);
    }
}
