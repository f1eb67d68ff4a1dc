use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::store::TaskStore;
use crate::error::StoreError;

#[derive(Clone, Copy, Debug)]
pub struct RetentionPolicy {
    /// How long a finished task stays pollable.
    pub keep_finished: Duration,
    /// Running tasks older than this get reported; they are never evicted.
    pub stale_after: Duration,
    pub sweep_every: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: usize,
    pub stale: usize,
}

pub fn sweep_once(store: &dyn TaskStore, policy: &RetentionPolicy) -> Result<SweepReport, StoreError> {
    let now = Utc::now();
    let keep = chrono::Duration::from_std(policy.keep_finished).unwrap_or(chrono::Duration::MAX);
    let stale_after = chrono::Duration::from_std(policy.stale_after).unwrap_or(chrono::Duration::MAX);

    let finished_cutoff = now.checked_sub_signed(keep).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let evicted = store.evict_finished(finished_cutoff)?;

    let stale_cutoff = now.checked_sub_signed(stale_after).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let stale: Vec<_> = store
        .list(usize::MAX)?
        .into_iter()
        .filter(|task| !task.status.is_terminal() && task.created_at < stale_cutoff)
        .collect();
    for task in &stale {
        tracing::warn!(
            task_id = %task.id,
            status = %task.status,
            created_at = %task.created_at,
            "task has been running longer than the configured task timeout"
        );
    }

    Ok(SweepReport {
        evicted,
        stale: stale.len(),
    })
}

/// Runs `sweep_once` on an interval until `shutdown` fires.
pub fn spawn_sweeper(
    store: Arc<dyn TaskStore>,
    policy: RetentionPolicy,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(policy.sweep_every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            match sweep_once(store.as_ref(), &policy) {
                Ok(report) if report.evicted > 0 => {
                    tracing::info!(evicted = report.evicted, "evicted finished tasks");
                }
                Ok(_) => {}
                Err(err) => tracing::error!("task sweep failed: {}", err),
            }
        }
        tracing::debug!("task sweeper stopped");
    })
}
