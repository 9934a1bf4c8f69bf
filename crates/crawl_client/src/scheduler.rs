use std::time::Duration;

use crawl_core::{RunId, Stage};

/// Decides when a scheduled stage becomes due.
///
/// The state machine only asks for "`stage` of `run` after `delay`"; implementations may
/// sleep, poll or wait for a push notification instead.
#[async_trait::async_trait]
pub trait Scheduler: Send + Sync {
    async fn wait(&self, run: RunId, stage: Stage, delay: Duration);
}

/// Sleeps for exactly the requested delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelayScheduler;

#[async_trait::async_trait]
impl Scheduler for FixedDelayScheduler {
    async fn wait(&self, _run: RunId, _stage: Stage, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
