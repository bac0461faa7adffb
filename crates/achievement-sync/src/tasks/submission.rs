use super::{BackgroundJob, BoxFuture, WorkResult};
use crate::repository::AchievementRepository;
use std::sync::Arc;

/// Drains the pending award queue. Backoff belongs to the caller.
pub struct SubmissionWorker {
    repository: Arc<AchievementRepository>,
}

impl SubmissionWorker {
    pub fn new(repository: Arc<AchievementRepository>) -> Self {
        Self { repository }
    }

    pub async fn run(&self) -> WorkResult {
        match self.repository.drain_pending_submissions().await {
            Ok(report) if report.is_complete() => {
                if !report.confirmed.is_empty() {
                    log::info!(
                        "[ra-worker] Confirmed {} pending awards",
                        report.confirmed.len()
                    );
                }
                WorkResult::Success
            }
            Ok(report) => {
                log::warn!(
                    "[ra-worker] {} awards confirmed, {} still pending",
                    report.confirmed.len(),
                    report.failed.len()
                );
                WorkResult::Retry
            }
            Err(e) if e.is_terminal() => {
                log::warn!("[ra-worker] Giving up: {}", e);
                WorkResult::PermanentFailure
            }
            Err(e) => {
                log::error!("[ra-worker] Submission run failed: {}", e);
                WorkResult::Retry
            }
        }
    }
}

impl BackgroundJob for SubmissionWorker {
    fn name(&self) -> String {
        "pending-achievement-submission".to_string()
    }

    fn run(&self) -> BoxFuture<'_, WorkResult> {
        Box::pin(SubmissionWorker::run(self))
    }
}
