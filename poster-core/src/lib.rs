mod catalog;
mod constants;
mod coords;
mod error;
mod fonts;
mod naming;
mod render;
mod request;
mod runner;
mod types;

pub use catalog::{DirectoryThemeSource, EmbeddedThemeSource, ThemeCatalog, ThemeSource};
pub use constants::{
    DEFAULT_DISTANCE, DEFAULT_HEIGHT, DEFAULT_THEME, DEFAULT_WIDTH, MAX_DISTANCE,
    MAX_POSTER_SIZE, MIN_DISTANCE, MIN_POSTER_SIZE,
};
#[cfg(feature = "nominatim")]
pub use coords::{DEFAULT_NOMINATIM_URL, NominatimGeocoder};
pub use coords::{
    CachingGeocoder, CoordinateResolver, DEFAULT_GEOCODER_CACHE_CAPACITY, Geocoder,
    parse_coordinate,
};
pub use error::{
    CoordinateParseError, FontResolutionError, GenerationError, RenderError, ThemeError,
    ValidationError,
};
pub use fonts::{FontProvider, FontResolver, SystemFontProvider};
pub use naming::OutputNamer;
pub use render::{LayoutRenderer, PosterRenderer, RenderJob};
pub use request::{GenerationRequest, PosterRequest, ThemeSelection};
pub use runner::{BatchSummary, GenerationResult, PosterJobRunner};
pub use types::{
    Color, CoordinateField, Coordinates, FontFace, FontSet, InvalidColorError, Labels,
    OutputFormat, Palette, RoadPalette, Theme, ThemeSummary,
};
