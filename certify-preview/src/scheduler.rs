//! Delay source for retries
//!
//! The fetcher never calls `tokio::time::sleep` directly so the retry state
//! machine can be driven without real timers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Suspend the caller for `delay`
    async fn sleep(&self, delay: Duration);
}

/// Real timer backed by the tokio runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Completes every delay immediately and records what was requested
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }

    pub fn sleeps(&self) -> usize {
        self.delays.lock().len()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().push(delay);
        tokio::task::yield_now().await;
    }
}
