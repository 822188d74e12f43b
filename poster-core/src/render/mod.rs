use crate::{
    error::RenderError,
    types::{Coordinates, FontSet, Labels, OutputFormat, Theme},
};

use std::{path::Path, sync::Arc};

mod layout;

pub use layout::LayoutRenderer;

/// Everything a renderer needs for one theme of a batch. The theme travels
/// with the job; renderers keep no per-theme state between calls.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub theme: &'a Theme,
    pub coordinates: Coordinates,
    /// Map radius around the center, in meters.
    pub distance: u32,
    /// Poster size in inches.
    pub width: f32,
    pub height: f32,
    pub format: OutputFormat,
    pub labels: &'a Labels,
    pub fonts: &'a FontSet,
    pub output: &'a Path,
}

/// Draws a poster and writes it to `job.output`.
pub trait PosterRenderer: Send + Sync {
    fn render(&self, job: &RenderJob<'_>) -> Result<(), RenderError>;
}

impl<R: PosterRenderer + ?Sized> PosterRenderer for Arc<R> {
    fn render(&self, job: &RenderJob<'_>) -> Result<(), RenderError> {
        (**self).render(job)
    }
}
