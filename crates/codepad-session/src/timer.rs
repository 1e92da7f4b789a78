//! Injectable sleep used for the compile delay and the post-run display window.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio clock. Under a paused test runtime the clock is
/// virtual, so tests can step through delays with `tokio::time::advance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Collapses every delay to a single scheduler yield.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateTimer;

#[async_trait]
impl Timer for ImmediateTimer {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}
