/*!
   Module `runner` drives a batch: validate the request, resolve the inputs
   shared by every theme once, then render each selected theme in turn.

   Batch states: validating, resolving shared inputs, rendering each theme,
   completed. Only the first two can end the batch early. Once shared inputs
   are resolved the batch always completes with one result per theme.
*/

use crate::{
    catalog::ThemeCatalog,
    coords::{CoordinateResolver, Geocoder},
    error::{GenerationError, RenderError},
    fonts::{FontProvider, FontResolver},
    naming::OutputNamer,
    render::{PosterRenderer, RenderJob},
    request::{GenerationRequest, PosterRequest, ThemeSelection},
    types::{Coordinates, FontSet, Labels},
};

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{Level, event, span};

/// The outcome of one theme of a batch.
#[derive(Debug)]
pub struct GenerationResult {
    theme: String,
    outcome: Result<PathBuf, RenderError>,
}

impl GenerationResult {
    pub fn new(theme: String, outcome: Result<PathBuf, RenderError>) -> Self {
        Self { theme, outcome }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn outcome(&self) -> &Result<PathBuf, RenderError> {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn file(&self) -> Option<&Path> {
        self.outcome.as_ref().ok().map(PathBuf::as_path)
    }

    pub fn error(&self) -> Option<&RenderError> {
        self.outcome.as_ref().err()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(results: &[GenerationResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();

        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

/// Inputs resolved once per batch and handed to every render call.
struct SharedInputs<'a> {
    request: &'a GenerationRequest,
    coordinates: Coordinates,
    fonts: FontSet,
    labels: Labels,
}

pub struct PosterJobRunner<G, F, R>
where
    G: Geocoder,
    F: FontProvider,
    R: PosterRenderer,
{
    catalog: Arc<ThemeCatalog>,
    coordinates: CoordinateResolver<G>,
    fonts: FontResolver<F>,
    renderer: R,
    namer: OutputNamer,
}

impl<G, F, R> PosterJobRunner<G, F, R>
where
    G: Geocoder,
    F: FontProvider,
    R: PosterRenderer,
{
    pub fn new(
        catalog: Arc<ThemeCatalog>,
        geocoder: G,
        font_provider: F,
        renderer: R,
        namer: OutputNamer,
    ) -> Self {
        Self {
            catalog,
            coordinates: CoordinateResolver::new(geocoder),
            fonts: FontResolver::new(font_provider),
            renderer,
            namer,
        }
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn namer(&self) -> &OutputNamer {
        &self.namer
    }

    /// Runs a batch, naming artifacts with the runner's own namer.
    pub fn run(&self, request: PosterRequest) -> Result<Vec<GenerationResult>, GenerationError> {
        self.run_with_namer(request, &self.namer)
    }

    /// Runs a batch and returns one result per selected theme, in selection
    /// order.
    ///
    /// # Errors
    ///
    /// - [GenerationError::Validation] if the request is invalid.
    /// - Any coordinate or font resolution failure. No theme is attempted in
    ///   that case.
    ///
    /// Per-theme failures are never returned as errors; they are recorded in
    /// the corresponding [GenerationResult].
    pub fn run_with_namer(
        &self,
        request: PosterRequest,
        namer: &OutputNamer,
    ) -> Result<Vec<GenerationResult>, GenerationError> {
        let span = span!(Level::INFO, "batch", city = %request.city);
        let _guard = span.enter();

        let request = request.validate()?;

        let coordinates = self.coordinates.resolve(&request)?;
        let fonts = self.fonts.resolve(request.font_family())?;

        let shared = SharedInputs {
            request: &request,
            coordinates,
            fonts,
            labels: request.labels(),
        };

        let keys: Vec<String> = match request.themes() {
            ThemeSelection::Single(key) => vec![key.clone()],
            ThemeSelection::All => self.catalog.keys().map(str::to_owned).collect(),
        };

        event!(
            Level::INFO,
            "Rendering {} theme(s) for {}, {}",
            keys.len(),
            request.city(),
            request.country()
        );

        let results: Vec<GenerationResult> = keys
            .into_iter()
            .map(|key| {
                let outcome = self.render_theme(&key, &shared, namer);

                match &outcome {
                    Ok(path) => event!(Level::INFO, "Theme {} written to {}", key, path.display()),
                    Err(err) => event!(Level::WARN, "Theme {} failed: {}", key, err),
                }

                GenerationResult::new(key, outcome)
            })
            .collect();

        let summary = BatchSummary::of(&results);
        event!(
            Level::INFO,
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );

        Ok(results)
    }

    fn render_theme(
        &self,
        key: &str,
        shared: &SharedInputs<'_>,
        namer: &OutputNamer,
    ) -> Result<PathBuf, RenderError> {
        let theme = self.catalog.get(key)?;
        let request = shared.request;
        let output = namer.name(request.city(), key, request.format());

        let job = RenderJob {
            theme,
            coordinates: shared.coordinates,
            distance: request.distance(),
            width: request.width(),
            height: request.height(),
            format: request.format(),
            labels: &shared.labels,
            fonts: &shared.fonts,
            output: &output,
        };

        // A renderer that panics only loses its own theme.
        match panic::catch_unwind(AssertUnwindSafe(|| self.renderer.render(&job))) {
            Ok(rendered) => rendered.map(|()| output),
            Err(payload) => Err(RenderError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        catalog::test::sample_theme,
        coords::test::CountingGeocoder,
        error::{ThemeError, ValidationError},
        fonts::SystemFontProvider,
        types::OutputFormat,
    };

    use std::sync::Mutex;

    use usvg::fontdb::Database;

    /// Records every job it sees; fails or panics for chosen themes.
    #[derive(Default)]
    struct RecordingRenderer {
        seen: Mutex<Vec<(String, PathBuf, Coordinates)>>,
        failing: Vec<&'static str>,
        panicking: Vec<&'static str>,
    }

    impl RecordingRenderer {
        fn seen_themes(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|(theme, _, _)| theme.clone())
                .collect()
        }
    }

    impl PosterRenderer for RecordingRenderer {
        fn render(&self, job: &RenderJob<'_>) -> Result<(), RenderError> {
            let key = job.theme.key();
            self.seen
                .lock()
                .unwrap()
                .push((key.to_owned(), job.output.to_path_buf(), job.coordinates));

            if self.panicking.iter().any(|k| *k == key) {
                panic!("palette exploded");
            }

            if self.failing.iter().any(|k| *k == key) {
                return Err(RenderError::Pipeline(anyhow::anyhow!("disk full")));
            }

            Ok(())
        }
    }

    const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

    type TestRunner =
        PosterJobRunner<Arc<CountingGeocoder>, SystemFontProvider, Arc<RecordingRenderer>>;

    fn runner(
        geocoder: Arc<CountingGeocoder>,
        renderer: Arc<RecordingRenderer>,
    ) -> TestRunner {
        let catalog = ThemeCatalog::from_themes([
            sample_theme("terracotta"),
            sample_theme("noir"),
            sample_theme("blueprint"),
        ]);

        PosterJobRunner::new(
            Arc::new(catalog),
            geocoder,
            SystemFontProvider::with_database(Arc::new(Database::new())),
            renderer,
            OutputNamer::new("posters"),
        )
    }

    fn all_themes(city: &str, country: &str) -> PosterRequest {
        let mut request = PosterRequest::new(city, country);
        request.all_themes = true;
        request
    }

    #[test]
    fn test_all_themes_follow_catalog_order() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder, renderer.clone());

        let results = runner.run(all_themes("Paris", "France")).unwrap();

        let themes: Vec<&str> = results.iter().map(GenerationResult::theme).collect();
        assert_eq!(themes, vec!["terracotta", "noir", "blueprint"]);
        assert!(results.iter().all(GenerationResult::is_success));
        assert_eq!(renderer.seen_themes(), vec!["terracotta", "noir", "blueprint"]);
    }

    #[test]
    fn test_blank_location_produces_no_results() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder.clone(), renderer.clone());

        for request in [all_themes("", "France"), all_themes("Paris", "   ")] {
            let err = runner.run(request).unwrap_err();
            assert!(matches!(
                err,
                GenerationError::Validation(ValidationError::MissingLocation)
            ));
        }

        assert_eq!(geocoder.calls(), 0);
        assert!(renderer.seen_themes().is_empty());
    }

    #[test]
    fn test_explicit_coordinates_single_theme() {
        let geocoder = Arc::new(CountingGeocoder::new(None));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder.clone(), renderer.clone());

        let mut request = PosterRequest::new("Paris", "France");
        request.latitude = Some("48.8566".to_owned());
        request.longitude = Some("2.3522".to_owned());
        request.theme = "terracotta".to_owned();

        let results = runner.run(request).unwrap();

        assert_eq!(geocoder.calls(), 0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].theme(), "terracotta");
        assert_eq!(
            results[0].file(),
            Some(Path::new("posters/paris_terracotta.png"))
        );
        assert_eq!(renderer.seen.lock().unwrap()[0].2, PARIS);
    }

    #[test]
    fn test_geocoding_happens_once_per_batch() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder.clone(), renderer.clone());

        let results = runner.run(all_themes("Paris", "France")).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(geocoder.calls(), 1);
        assert!(
            renderer
                .seen
                .lock()
                .unwrap()
                .iter()
                .all(|(_, _, coordinates)| *coordinates == PARIS)
        );
    }

    #[test]
    fn test_failing_theme_does_not_affect_siblings() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer {
            failing: vec!["noir"],
            ..Default::default()
        });
        let runner = runner(geocoder, renderer.clone());

        let results = runner.run(all_themes("Paris", "France")).unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(results[2].is_success());
        assert_eq!(results[1].theme(), "noir");
        assert!(results[1].error().unwrap().to_string().contains("disk full"));
        assert_eq!(
            BatchSummary::of(&results),
            BatchSummary {
                succeeded: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_panicking_renderer_is_isolated() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer {
            panicking: vec!["terracotta"],
            ..Default::default()
        });
        let runner = runner(geocoder, renderer.clone());

        let results = runner.run(all_themes("Paris", "France")).unwrap();

        assert!(matches!(
            results[0].error(),
            Some(RenderError::Panicked(message)) if message == "palette exploded"
        ));
        assert!(results[1].is_success());
        assert!(results[2].is_success());
    }

    #[test]
    fn test_unknown_theme_is_a_theme_failure() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder, renderer.clone());

        let mut request = PosterRequest::new("Paris", "France");
        request.theme = "vaporwave".to_owned();

        let results = runner.run(request).unwrap();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].error(),
            Some(RenderError::Theme(ThemeError::NotFound(key))) if key == "vaporwave"
        ));
        assert!(renderer.seen_themes().is_empty());
    }

    #[test]
    fn test_unknown_location_aborts_batch() {
        let geocoder = Arc::new(CountingGeocoder::new(None));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder, renderer.clone());

        let err = runner.run(all_themes("Atlantis", "Nowhere")).unwrap_err();

        assert!(matches!(err, GenerationError::LocationNotFound { .. }));
        assert!(renderer.seen_themes().is_empty());
    }

    #[test]
    fn test_unknown_font_aborts_batch() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder, renderer.clone());

        let mut request = all_themes("Paris", "France");
        request.font_family = Some("Noto Sans JP".to_owned());

        let err = runner.run(request).unwrap_err();

        assert!(matches!(err, GenerationError::FontResolution(_)));
        assert!(renderer.seen_themes().is_empty());
    }

    #[test]
    fn test_namer_suffix_reaches_output_paths() {
        let geocoder = Arc::new(CountingGeocoder::new(Some(PARIS)));
        let renderer = Arc::new(RecordingRenderer::default());
        let runner = runner(geocoder, renderer.clone());
        let namer = runner.namer().with_suffix("batch1");

        let mut request = PosterRequest::new("Paris", "France");
        request.format = OutputFormat::Svg;
        request.theme = "noir".to_owned();

        let results = runner.run_with_namer(request, &namer).unwrap();

        assert_eq!(
            results[0].file(),
            Some(Path::new("posters/paris_noir_batch1.svg"))
        );
        assert_eq!(
            renderer.seen.lock().unwrap()[0].1,
            PathBuf::from("posters/paris_noir_batch1.svg")
        );
    }
}
