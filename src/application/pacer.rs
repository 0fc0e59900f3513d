// Pacing between live samples - injectable so tests and batch runs go full speed
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait before the next step.
    async fn pause(&self);
}

/// Sleeps a fixed interval between steps.
#[derive(Debug, Clone)]
pub struct TokioPacer {
    interval: Duration,
}

impl TokioPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// No delay; only yields so other tasks (and stop requests) get a turn.
#[derive(Debug, Clone, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self) {
        tokio::task::yield_now().await;
    }
}

pub fn pacer_for(interval: Duration) -> Arc<dyn Pacer> {
    if interval.is_zero() {
        Arc::new(NoPacer)
    } else {
        Arc::new(TokioPacer::new(interval))
    }
}
