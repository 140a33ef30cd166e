//! Update scheduler
//!
//! A single-worker FIFO queue serializing every ledger mutation in the
//! process, regardless of target ledger. Each queued update is raced against
//! a fixed timeout; failures and timeouts are logged and swallowed so one bad
//! update can never stall the queue. A timed-out update is abandoned, not
//! cancelled: its task keeps running detached and may still commit whatever
//! it was about to.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

/// Fixed limit for one queued update
pub const UPDATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type carried by update futures
pub type UpdateError = Box<dyn std::error::Error + Send + Sync>;

type UpdateFuture = Pin<Box<dyn Future<Output = Result<(), UpdateError>> + Send>>;

/// How a queued update ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Completed,
    Failed,
    TimedOut,
}

struct Job {
    label: String,
    fut: UpdateFuture,
    done: oneshot::Sender<UpdateOutcome>,
}

/// Single-worker FIFO update queue
pub struct UpdateScheduler {
    tx: mpsc::UnboundedSender<Job>,
}

impl UpdateScheduler {
    /// Spawn the worker with the standard timeout.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        Self::with_timeout(UPDATE_TIMEOUT)
    }

    pub fn with_timeout(limit: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let handle = tokio::spawn(job.fut);
                let outcome = match timeout(limit, handle).await {
                    Ok(Ok(Ok(()))) => UpdateOutcome::Completed,
                    Ok(Ok(Err(e))) => {
                        tracing::error!("Scheduled update '{}' failed: {}", job.label, e);
                        UpdateOutcome::Failed
                    }
                    Ok(Err(join_err)) => {
                        tracing::error!("Scheduled update '{}' aborted: {}", job.label, join_err);
                        UpdateOutcome::Failed
                    }
                    Err(_) => {
                        tracing::error!(
                            "Scheduled update '{}' timed out after {:?}; abandoning it",
                            job.label,
                            limit
                        );
                        UpdateOutcome::TimedOut
                    }
                };
                // The caller may have gone away; the queue advances either way
                let _ = job.done.send(outcome);
            }
        });
        Self { tx }
    }

    /// Queue an update behind everything already queued.
    ///
    /// Resolves once the update completes, fails, or is abandoned; never
    /// returns an error, so waiting on one update cannot poison another.
    pub async fn queue_update<F>(&self, label: &str, fut: F) -> UpdateOutcome
    where
        F: Future<Output = Result<(), UpdateError>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job = Job {
            label: label.to_string(),
            fut: Box::pin(fut),
            done: done_tx,
        };
        if self.tx.send(job).is_err() {
            tracing::error!("Update queue worker is gone; dropping '{}'", label);
            return UpdateOutcome::Failed;
        }
        done_rx.await.unwrap_or(UpdateOutcome::Failed)
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_updates_run_in_queue_order() {
        let scheduler = UpdateScheduler::new();
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let labels: Vec<String> = (0..3).map(|i| format!("update-{i}")).collect();
        let mut waits = Vec::new();
        for i in 0..3 {
            let order = Arc::clone(&order);
            waits.push(scheduler.queue_update(&labels[i], async move {
                order.lock().await.push(i);
                Ok(())
            }));
        }
        for wait in waits {
            assert_eq!(wait.await, UpdateOutcome::Completed);
        }
        assert_eq!(*order.lock().await, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stall_the_queue() {
        let scheduler = UpdateScheduler::new();
        let outcome = scheduler
            .queue_update("bad", async { Err("boom".into()) })
            .await;
        assert_eq!(outcome, UpdateOutcome::Failed);

        let outcome = scheduler.queue_update("good", async { Ok(()) }).await;
        assert_eq!(outcome, UpdateOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_update_is_abandoned_after_timeout() {
        let scheduler = UpdateScheduler::new();

        let outcome = scheduler
            .queue_update("stuck", async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await;
        assert_eq!(outcome, UpdateOutcome::TimedOut);

        // The queue advances and later updates still complete
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let outcome = scheduler
            .queue_update("after", async move {
                ran_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(outcome, UpdateOutcome::Completed);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_update_keeps_running_detached() {
        let scheduler = UpdateScheduler::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let finished_clone = Arc::clone(&finished);
        let outcome = scheduler
            .queue_update("slow", async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                finished_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(outcome, UpdateOutcome::TimedOut);
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        // No cancellation is propagated: once its sleep elapses, the
        // abandoned task still finishes its work
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
