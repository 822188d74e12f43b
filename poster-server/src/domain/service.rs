/*!
   Module `service` provides the canonical implementation of the [PosterService] port.
*/

use poster_core::{
    BatchSummary, FontProvider, Geocoder, PosterJobRunner, PosterRenderer, PosterRequest,
    ThemeSummary,
};

use std::sync::Arc;

use anyhow::Context;

use super::{
    models::{BatchId, GeneratePostersError, PosterOutcome},
    ports::{PosterGallery, PosterMetrics, PosterService},
};

/// Canonical implementation of the [PosterService] port. Batches run on the blocking thread
/// pool, one at a time per request, against a runner shared by every request.
pub struct Service<G, F, R, M, Y>
where
    G: Geocoder + 'static,
    F: FontProvider + 'static,
    R: PosterRenderer + 'static,
    M: PosterMetrics,
    Y: PosterGallery,
{
    runner: Arc<PosterJobRunner<G, F, R>>,
    metrics: M,
    gallery: Y,
}

impl<G, F, R, M, Y> Service<G, F, R, M, Y>
where
    G: Geocoder + 'static,
    F: FontProvider + 'static,
    R: PosterRenderer + 'static,
    M: PosterMetrics,
    Y: PosterGallery,
{
    pub fn new(runner: PosterJobRunner<G, F, R>, metrics: M, gallery: Y) -> Self {
        Self {
            runner: Arc::new(runner),
            metrics,
            gallery,
        }
    }
}

impl<G, F, R, M, Y> Clone for Service<G, F, R, M, Y>
where
    G: Geocoder + 'static,
    F: FontProvider + 'static,
    R: PosterRenderer + 'static,
    M: PosterMetrics,
    Y: PosterGallery,
{
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            metrics: self.metrics.clone(),
            gallery: self.gallery.clone(),
        }
    }
}

impl<G, F, R, M, Y> PosterService for Service<G, F, R, M, Y>
where
    G: Geocoder + 'static,
    F: FontProvider + 'static,
    R: PosterRenderer + 'static,
    M: PosterMetrics,
    Y: PosterGallery,
{
    /// Run the batch in `req` and record its metrics.
    ///
    /// # Errors
    ///
    /// - Propagates any [poster_core::GenerationError] returned by the runner.
    /// - [GeneratePostersError::Unknown] if the blocking task could not complete.
    async fn generate_posters(
        &self,
        req: PosterRequest,
    ) -> Result<Vec<PosterOutcome>, GeneratePostersError> {
        let runner = Arc::clone(&self.runner);
        let batch = BatchId::random();

        let result = tokio::task::spawn_blocking(move || {
            let namer = runner.namer().with_suffix(&batch.short());
            runner.run_with_namer(req, &namer)
        })
        .await
        .context("poster batch did not complete")?;

        match result {
            Ok(results) => {
                let summary = BatchSummary::of(&results);
                self.metrics
                    .record_batch_completion(summary.succeeded, summary.failed)
                    .await;

                Ok(results.iter().map(PosterOutcome::from).collect())
            }
            Err(err) => {
                self.metrics.record_batch_failure().await;
                Err(err.into())
            }
        }
    }

    fn list_themes(&self) -> Vec<ThemeSummary> {
        self.runner
            .catalog()
            .themes()
            .map(|theme| theme.summary())
            .collect()
    }

    async fn recent_posters(&self, limit: usize) -> anyhow::Result<Vec<String>> {
        self.gallery.recent(limit).await
    }
}
