//! In-process stand-in for an OS job scheduler: reruns a job with
//! exponential backoff until it stops asking for a retry, and starts it
//! again whenever new work is signalled.

use super::{BackgroundJob, WorkResult};
use crate::utils::config::RetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            initial_backoff: Duration::from_secs(config.initial_backoff_secs),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failed run (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Run `job` until it succeeds, fails permanently, runs out of attempts, or
/// `cancel_rx` flips to `true`. Cancellation reports `Retry`.
pub async fn run_with_backoff(
    job: &dyn BackgroundJob,
    policy: &RetryPolicy,
    mut cancel_rx: watch::Receiver<bool>,
) -> WorkResult {
    let name = job.name();

    for attempt in 1..=policy.max_attempts {
        log::debug!("[ra-worker] {} attempt {}/{}", name, attempt, policy.max_attempts);
        let result = job.run().await;
        if result != WorkResult::Retry {
            log::info!("[ra-worker] {} finished: {:?}", name, result);
            return result;
        }
        if attempt == policy.max_attempts {
            break;
        }

        let delay = policy.backoff_for(attempt);
        log::info!("[ra-worker] {} will retry in {:?}", name, delay);
        let cancelled = tokio::select! {
            _ = tokio::time::sleep(delay) => false,
            changed = cancel_rx.changed() => changed.is_err() || *cancel_rx.borrow(),
        };
        if cancelled {
            log::info!("[ra-worker] {} cancelled", name);
            return WorkResult::Retry;
        }
    }

    log::warn!(
        "[ra-worker] {} gave up after {} attempts",
        name,
        policy.max_attempts
    );
    WorkResult::Retry
}

/// Run `job` with backoff each time `signal` is notified, until `cancel_rx` flips to `true`.
///
/// A notification that arrives while a run is in progress triggers one more run afterwards.
pub fn spawn_on_signal(
    job: Arc<dyn BackgroundJob>,
    policy: RetryPolicy,
    signal: Arc<Notify>,
    mut cancel_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = job.name();
        log::debug!("[ra-worker] {} scheduler started", name);

        loop {
            let cancelled = tokio::select! {
                _ = signal.notified() => false,
                changed = cancel_rx.changed() => changed.is_err() || *cancel_rx.borrow(),
            };
            if cancelled {
                break;
            }

            let result = run_with_backoff(job.as_ref(), &policy, cancel_rx.clone()).await;
            if result == WorkResult::Retry && *cancel_rx.borrow() {
                break;
            }
        }

        log::debug!("[ra-worker] {} scheduler stopped", name);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::BoxFuture;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedJob {
        results: Mutex<Vec<WorkResult>>,
        runs: AtomicU32,
    }

    impl ScriptedJob {
        fn new(mut results: Vec<WorkResult>) -> Self {
            results.reverse();
            Self {
                results: Mutex::new(results),
                runs: AtomicU32::new(0),
            }
        }
    }

    impl BackgroundJob for ScriptedJob {
        fn name(&self) -> String {
            "scripted".to_string()
        }

        fn run(&self) -> BoxFuture<'_, WorkResult> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let next = self.results.lock().unwrap().pop().unwrap_or(WorkResult::Retry);
            Box::pin(async move { next })
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            max_attempts,
        }
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_secs(60));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(120));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(240));
        assert_eq!(policy.backoff_for(10), Duration::from_secs(3600));
        assert_eq!(policy.backoff_for(40), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let job = ScriptedJob::new(vec![WorkResult::Retry, WorkResult::Retry, WorkResult::Success]);
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let result = run_with_backoff(&job, &fast_policy(5), cancel_rx).await;
        assert_eq!(result, WorkResult::Success);
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let job = ScriptedJob::new(vec![WorkResult::PermanentFailure]);
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let result = run_with_backoff(&job, &fast_policy(5), cancel_rx).await;
        assert_eq!(result, WorkResult::PermanentFailure);
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let job = ScriptedJob::new(vec![]);
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let result = run_with_backoff(&job, &fast_policy(3), cancel_rx).await;
        assert_eq!(result, WorkResult::Retry);
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);
    }

    async fn wait_for_runs(job: &ScriptedJob, runs: u32) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while job.runs.load(Ordering::SeqCst) < runs {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_signal_schedules_a_run() {
        let job = Arc::new(ScriptedJob::new(vec![
            WorkResult::Retry,
            WorkResult::Success,
            WorkResult::Success,
        ]));
        let signal = Arc::new(Notify::new());
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let handle = spawn_on_signal(job.clone(), fast_policy(5), signal.clone(), cancel_rx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);

        signal.notify_one();
        wait_for_runs(&job, 2).await;

        signal.notify_one();
        wait_for_runs(&job, 3).await;

        cancel_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancel_stops_idle_scheduler() {
        let job = Arc::new(ScriptedJob::new(vec![]));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let handle = spawn_on_signal(job.clone(), fast_policy(1), Arc::new(Notify::new()), cancel_rx);
        cancel_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff() {
        let job = ScriptedJob::new(vec![]);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let policy = RetryPolicy {
            initial_backoff: Duration::from_secs(600),
            max_backoff: Duration::from_secs(600),
            max_attempts: 5,
        };

        let run = run_with_backoff(&job, &policy, cancel_rx);
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel_tx.send(true).unwrap();
        };
        let (result, _) = tokio::join!(run, cancel);

        assert_eq!(result, WorkResult::Retry);
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }
}
