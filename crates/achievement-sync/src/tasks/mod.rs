pub mod heartbeat;
pub mod scheduler;
pub mod submission;

use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome reported back to whatever schedules a background job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    Success,
    /// Run the whole job again later
    Retry,
    /// Retrying cannot help
    PermanentFailure,
}

pub trait BackgroundJob: Send + Sync {
    fn name(&self) -> String;
    /// Execute one attempt
    fn run(&self) -> BoxFuture<'_, WorkResult>;
}
