//! Progress reporting for long-running effectful stages

use async_trait::async_trait;

/// Receives status updates while the commit stage runs
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Informational status line
    async fn on_message(&self, message: &str);

    /// Non-fatal problem; the current PR continues
    async fn on_warning(&self, message: &str);
}

/// Progress sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}

    async fn on_warning(&self, _message: &str) {}
}
