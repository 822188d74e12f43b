use crate::domain::ports::PosterMetrics;

/// Reports batch metrics as log events.
#[derive(Debug, Clone)]
pub struct TracingMetrics;

impl PosterMetrics for TracingMetrics {
    async fn record_batch_completion(&self, succeeded: usize, failed: usize) {
        tracing::info!(
            target: "poster_metrics",
            succeeded,
            failed,
            "batch completed"
        );
    }

    async fn record_batch_failure(&self) {
        tracing::info!(target: "poster_metrics", "batch rejected");
    }
}
