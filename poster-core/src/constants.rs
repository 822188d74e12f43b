pub const DEFAULT_THEME: &str = "terracotta";

pub const DEFAULT_DISTANCE: u32 = 18_000;
pub const MIN_DISTANCE: u32 = 2_000;
pub const MAX_DISTANCE: u32 = 30_000;

pub const DEFAULT_WIDTH: f32 = 12.0;
pub const DEFAULT_HEIGHT: f32 = 16.0;
pub const MIN_POSTER_SIZE: f32 = 4.0;
pub const MAX_POSTER_SIZE: f32 = 20.0;

pub(crate) const POINTS_PER_INCH: f32 = 72.0;
pub(crate) const PNG_DPI: f32 = 300.0;
pub(crate) const CSS_DPI: f32 = 96.0;

pub(crate) const DEFAULT_FONT_FAMILY: &str = "sans-serif";

// Fallbacks for road tiers a theme file leaves out.
pub(crate) const ROAD_MOTORWAY: &str = "#888888";
pub(crate) const ROAD_PRIMARY: &str = "#999999";
pub(crate) const ROAD_SECONDARY: &str = "#aaaaaa";
pub(crate) const ROAD_TERTIARY: &str = "#bbbbbb";
pub(crate) const ROAD_RESIDENTIAL: &str = "#cccccc";
pub(crate) const ROAD_OTHER: &str = "#bbbbbb";
