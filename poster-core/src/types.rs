use crate::{
    constants::{
        DEFAULT_FONT_FAMILY, ROAD_MOTORWAY, ROAD_OTHER, ROAD_PRIMARY, ROAD_RESIDENTIAL,
        ROAD_SECONDARY, ROAD_TERTIARY,
    },
    error::ValidationError,
};

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(r#"invalid color "{0}": expected #RGB or #RRGGBB"#)]
pub struct InvalidColorError(String);

/// A hex color, normalised to lower-case `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn parse(raw: &str) -> Result<Self, InvalidColorError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| InvalidColorError(raw.to_owned()))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColorError(raw.to_owned()));
        }

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_owned(),
            _ => return Err(InvalidColorError(raw.to_owned())),
        };

        Ok(Color(format!("#{}", expanded.to_ascii_lowercase())))
    }

    // Only for literals known to be well formed.
    pub(crate) fn from_static(hex: &'static str) -> Self {
        Color(hex.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialized with the same keys theme files use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadPalette {
    #[serde(rename = "road_motorway")]
    pub motorway: Color,
    #[serde(rename = "road_primary")]
    pub primary: Color,
    #[serde(rename = "road_secondary")]
    pub secondary: Color,
    #[serde(rename = "road_tertiary")]
    pub tertiary: Color,
    #[serde(rename = "road_residential")]
    pub residential: Color,
    #[serde(rename = "road_default")]
    pub other: Color,
}

impl Default for RoadPalette {
    fn default() -> Self {
        RoadPalette {
            motorway: Color::from_static(ROAD_MOTORWAY),
            primary: Color::from_static(ROAD_PRIMARY),
            secondary: Color::from_static(ROAD_SECONDARY),
            tertiary: Color::from_static(ROAD_TERTIARY),
            residential: Color::from_static(ROAD_RESIDENTIAL),
            other: Color::from_static(ROAD_OTHER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    // Fade painted behind the caption, usually equal to the background.
    pub gradient: Color,
    pub water: Color,
    pub parks: Color,
    pub roads: RoadPalette,
}

/// A named color palette. Immutable once loaded into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    key: String,
    name: String,
    description: String,
    palette: Palette,
}

impl Theme {
    pub fn new(key: String, name: String, description: String, palette: Palette) -> Self {
        Self {
            key,
            name,
            description,
            palette,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn summary(&self) -> ThemeSummary {
        ThemeSummary {
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            background: self.palette.background.clone(),
            text: self.palette.text.clone(),
            gradient: self.palette.gradient.clone(),
            water: self.palette.water.clone(),
            parks: self.palette.parks.clone(),
            roads: self.palette.roads.clone(),
        }
    }
}

/// What a theme picker needs to draw a swatch for a theme. Color keys match
/// the theme file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "bg")]
    pub background: Color,
    pub text: Color,
    #[serde(rename = "gradient_color")]
    pub gradient: Color,
    pub water: Color,
    pub parks: Color,
    #[serde(flatten)]
    pub roads: RoadPalette,
}

#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        Ok(match format.trim().to_ascii_lowercase().as_str() {
            "png" => OutputFormat::Png,
            "svg" => OutputFormat::Svg,
            "pdf" => OutputFormat::Pdf,
            _ => return Err(ValidationError::UnknownFormat(format.to_owned())),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

impl Display for CoordinateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateField::Latitude => f.write_str("latitude"),
            CoordinateField::Longitude => f.write_str("longitude"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }
}

// Rendered as it appears on the poster, e.g. `48.8566° N / 2.3522° E`.
impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lat_hemisphere = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let lon_hemisphere = if self.longitude >= 0.0 { 'E' } else { 'W' };

        write!(
            f,
            "{:.4}° {} / {:.4}° {}",
            self.latitude.abs(),
            lat_hemisphere,
            self.longitude.abs(),
            lon_hemisphere
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
}

impl FontFace {
    pub fn new(family: impl Into<String>, weight: u16) -> Self {
        FontFace {
            family: family.into(),
            weight,
        }
    }
}

/// Faces used for the three text roles of a poster caption.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSet {
    pub bold: FontFace,
    pub regular: FontFace,
    pub light: FontFace,
}

impl Default for FontSet {
    fn default() -> Self {
        FontSet {
            bold: FontFace::new(DEFAULT_FONT_FAMILY, 700),
            regular: FontFace::new(DEFAULT_FONT_FAMILY, 400),
            light: FontFace::new(DEFAULT_FONT_FAMILY, 300),
        }
    }
}

/// Caption text, after display overrides have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub city: String,
    pub country: String,
}
