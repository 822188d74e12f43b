/*
   Module `ports` specifies the API by which external modules interact with the poster domain.

   All traits are bounded by `Send + Sync + 'static`, since their implementations must be shareable
   between request-handling threads.
*/

use std::future::Future;

use poster_core::{PosterRequest, ThemeSummary};

use crate::domain::models::*;

/// `PosterService` is the public API for the poster domain.
pub trait PosterService: Clone + Send + Sync + 'static {
    /// Asynchronously run a generation batch.
    ///
    /// # Errors
    ///
    /// - [GeneratePostersError::Generation] if the request is invalid or its shared inputs
    ///   cannot be resolved. Per-theme failures are part of the `Ok` value instead.
    fn generate_posters(
        &self,
        req: PosterRequest,
    ) -> impl Future<Output = Result<Vec<PosterOutcome>, GeneratePostersError>> + Send;

    /// The known themes, in catalog order.
    fn list_themes(&self) -> Vec<ThemeSummary>;

    /// File names of the newest artifacts, newest first.
    fn recent_posters(&self, limit: usize)
    -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;
}

/// `PosterMetrics` describes an aggregator of batch related metrics.
pub trait PosterMetrics: Send + Sync + Clone + 'static {
    /// Record a batch that ran, whatever its per-theme outcomes.
    fn record_batch_completion(
        &self,
        succeeded: usize,
        failed: usize,
    ) -> impl Future<Output = ()> + Send;

    /// Record a batch rejected before any theme was rendered.
    fn record_batch_failure(&self) -> impl Future<Output = ()> + Send;
}

/// `PosterGallery` lists artifacts already written to the output sink.
pub trait PosterGallery: Send + Sync + Clone + 'static {
    fn recent(&self, limit: usize) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;
}
