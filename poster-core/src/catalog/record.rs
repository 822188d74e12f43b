use crate::{
    error::ThemeError,
    types::{Color, InvalidColorError, Palette, RoadPalette, Theme},
};

use serde::Deserialize;

/// On-disk shape of a theme. Only the four base colors are mandatory.
#[derive(Debug, Deserialize)]
struct ThemeRecord {
    name: Option<String>,
    description: Option<String>,
    bg: String,
    text: String,
    gradient_color: Option<String>,
    water: String,
    parks: String,
    road_motorway: Option<String>,
    road_primary: Option<String>,
    road_secondary: Option<String>,
    road_tertiary: Option<String>,
    road_residential: Option<String>,
    road_default: Option<String>,
}

/// Parses one theme record. Any failure is attributed to `key`.
pub(crate) fn parse_theme(key: &str, json: &str) -> Result<Theme, ThemeError> {
    let malformed = |reason: String| ThemeError::Malformed {
        key: key.to_owned(),
        reason,
    };

    let record: ThemeRecord =
        serde_json::from_str(json).map_err(|err| malformed(err.to_string()))?;

    record
        .into_theme(key)
        .map_err(|err| malformed(err.to_string()))
}

impl ThemeRecord {
    fn into_theme(self, key: &str) -> Result<Theme, InvalidColorError> {
        let background = Color::parse(&self.bg)?;
        let gradient = optional_color(self.gradient_color.as_deref(), &background)?;

        let fallback = RoadPalette::default();
        let roads = RoadPalette {
            motorway: optional_color(self.road_motorway.as_deref(), &fallback.motorway)?,
            primary: optional_color(self.road_primary.as_deref(), &fallback.primary)?,
            secondary: optional_color(self.road_secondary.as_deref(), &fallback.secondary)?,
            tertiary: optional_color(self.road_tertiary.as_deref(), &fallback.tertiary)?,
            residential: optional_color(
                self.road_residential.as_deref(),
                &fallback.residential,
            )?,
            other: optional_color(self.road_default.as_deref(), &fallback.other)?,
        };

        let palette = Palette {
            background,
            text: Color::parse(&self.text)?,
            gradient,
            water: Color::parse(&self.water)?,
            parks: Color::parse(&self.parks)?,
            roads,
        };

        Ok(Theme::new(
            key.to_owned(),
            self.name.unwrap_or_else(|| key.to_owned()),
            self.description.unwrap_or_default(),
            palette,
        ))
    }
}

fn optional_color(raw: Option<&str>, fallback: &Color) -> Result<Color, InvalidColorError> {
    match raw {
        Some(raw) => Color::parse(raw),
        None => Ok(fallback.clone()),
    }
}
