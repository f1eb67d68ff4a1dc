use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Wait for every outstanding pipeline to reach a terminal state.
    Join,
    /// Signal every outstanding pipeline to give up, then wait for them to record it.
    Abandon,
}

/// Owns every background pipeline so shutdown can join or abandon them.
///
/// At most `max_concurrent` jobs run at once; the rest wait for a permit.
/// Jobs receive a cancellation token that fires only on `Abandon`.
pub struct PipelineExecutor {
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl PipelineExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            cancel: CancellationToken::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    pub fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    /// Returns false without spawning when the executor is shutting down.
    pub fn spawn<F, Fut>(&self, job: F) -> bool
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.tracker.is_closed() {
            return false;
        }
        let permits = self.permits.clone();
        let token = self.cancel.child_token();
        self.tracker.spawn(async move {
            // A closed semaphore means we are abandoning; the job still runs
            // so it can observe the cancelled token and record that.
            let _permit = tokio::select! {
                permit = permits.acquire_owned() => permit.ok(),
                _ = token.cancelled() => None,
            };
            job(token).await;
        });
        true
    }

    pub async fn shutdown(&self, mode: ShutdownMode) {
        self.tracker.close();
        if mode == ShutdownMode::Abandon {
            self.cancel.cancel();
            self.permits.close();
        }
        tracing::info!(outstanding = self.tracker.len(), ?mode, "waiting for pipelines");
        self.tracker.wait().await;
    }
}
