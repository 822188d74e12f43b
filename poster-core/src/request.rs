use crate::{
    constants::{
        DEFAULT_DISTANCE, DEFAULT_HEIGHT, DEFAULT_THEME, DEFAULT_WIDTH, MAX_DISTANCE,
        MAX_POSTER_SIZE, MIN_DISTANCE, MIN_POSTER_SIZE,
    },
    error::ValidationError,
    types::{Labels, OutputFormat},
};

use serde::Deserialize;

/// A batch generation request as it arrives from the outside world. Defaults
/// are filled in here; [PosterRequest::validate] turns it into a
/// [GenerationRequest].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PosterRequest {
    pub city: String,
    pub country: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub theme: String,
    pub all_themes: bool,
    pub distance: u32,
    pub width: f32,
    pub height: f32,
    pub format: OutputFormat,
    pub display_city: Option<String>,
    pub display_country: Option<String>,
    pub country_label: Option<String>,
    pub font_family: Option<String>,
}

impl Default for PosterRequest {
    fn default() -> Self {
        PosterRequest {
            city: String::new(),
            country: String::new(),
            latitude: None,
            longitude: None,
            theme: DEFAULT_THEME.to_owned(),
            all_themes: false,
            distance: DEFAULT_DISTANCE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            format: OutputFormat::default(),
            display_city: None,
            display_country: None,
            country_label: None,
            font_family: None,
        }
    }
}

impl PosterRequest {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        PosterRequest {
            city: city.into(),
            country: country.into(),
            ..Default::default()
        }
    }

    pub fn validate(self) -> Result<GenerationRequest, ValidationError> {
        let city = self.city.trim();
        let country = self.country.trim();

        if city.is_empty() || country.is_empty() {
            return Err(ValidationError::MissingLocation);
        }

        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&self.distance) {
            return Err(ValidationError::OutOfRange {
                field: "distance",
                value: self.distance as f64,
                min: MIN_DISTANCE as f64,
                max: MAX_DISTANCE as f64,
            });
        }

        check_poster_size("width", self.width)?;
        check_poster_size("height", self.height)?;

        let themes = if self.all_themes {
            ThemeSelection::All
        } else {
            match non_blank(Some(self.theme)) {
                Some(key) => ThemeSelection::Single(key),
                None => ThemeSelection::Single(DEFAULT_THEME.to_owned()),
            }
        };

        Ok(GenerationRequest {
            city: city.to_owned(),
            country: country.to_owned(),
            latitude: non_blank(self.latitude),
            longitude: non_blank(self.longitude),
            themes,
            distance: self.distance,
            width: self.width,
            height: self.height,
            format: self.format,
            display_city: non_blank(self.display_city),
            display_country: non_blank(self.display_country),
            country_label: non_blank(self.country_label),
            font_family: non_blank(self.font_family),
        })
    }
}

fn check_poster_size(field: &'static str, value: f32) -> Result<(), ValidationError> {
    if value.is_finite() && (MIN_POSTER_SIZE..=MAX_POSTER_SIZE).contains(&value) {
        return Ok(());
    }

    Err(ValidationError::OutOfRange {
        field,
        value: value as f64,
        min: MIN_POSTER_SIZE as f64,
        max: MAX_POSTER_SIZE as f64,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSelection {
    Single(String),
    /// Every theme in the catalog, in catalog order.
    All,
}

/// A validated request. Every string field is trimmed and every optional
/// field is either absent or non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    city: String,
    country: String,
    latitude: Option<String>,
    longitude: Option<String>,
    themes: ThemeSelection,
    distance: u32,
    width: f32,
    height: f32,
    format: OutputFormat,
    display_city: Option<String>,
    display_country: Option<String>,
    country_label: Option<String>,
    font_family: Option<String>,
}

impl GenerationRequest {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn latitude(&self) -> Option<&str> {
        self.latitude.as_deref()
    }

    pub fn longitude(&self) -> Option<&str> {
        self.longitude.as_deref()
    }

    pub fn themes(&self) -> &ThemeSelection {
        &self.themes
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// The caption text. An explicit country label wins over the display
    /// country, which wins over the country itself.
    pub fn labels(&self) -> Labels {
        let city = self.display_city.as_deref().unwrap_or(&self.city);
        let country = self
            .country_label
            .as_deref()
            .or(self.display_country.as_deref())
            .unwrap_or(&self.country);

        Labels {
            city: city.to_owned(),
            country: country.to_owned(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let req: PosterRequest =
            serde_json::from_str(r#"{"city": "Paris", "country": "France"}"#).unwrap();

        assert_eq!(req, PosterRequest::new("Paris", "France"));
        assert_eq!(req.theme, "terracotta");
        assert_eq!(req.distance, 18_000);
        assert_eq!(req.format, OutputFormat::Png);
    }

    #[test]
    fn test_blank_city_or_country_is_rejected() {
        for (city, country) in [("", "France"), ("Paris", ""), ("  ", "\t"), ("", "")] {
            let result = PosterRequest::new(city, country).validate();
            assert_eq!(result, Err(ValidationError::MissingLocation));
        }
    }

    #[test]
    fn test_distance_bounds() {
        let mut req = PosterRequest::new("Paris", "France");
        req.distance = 1_000;

        let err = req.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "distance",
                ..
            }
        ));
    }

    #[test]
    fn test_poster_size_bounds() {
        let mut req = PosterRequest::new("Paris", "France");
        req.height = f32::NAN;
        assert!(req.validate().is_err());

        let mut req = PosterRequest::new("Paris", "France");
        req.width = 21.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_optionals_become_absent() {
        let mut req = PosterRequest::new(" Paris ", "France");
        req.latitude = Some("  ".to_owned());
        req.font_family = Some(String::new());
        req.theme = " ".to_owned();

        let validated = req.validate().unwrap();
        assert_eq!(validated.city(), "Paris");
        assert_eq!(validated.latitude(), None);
        assert_eq!(validated.font_family(), None);
        assert_eq!(
            validated.themes(),
            &ThemeSelection::Single("terracotta".to_owned())
        );
    }

    #[test]
    fn test_all_themes_ignores_theme_key() {
        let mut req = PosterRequest::new("Paris", "France");
        req.all_themes = true;
        req.theme = "noir".to_owned();

        assert_eq!(req.validate().unwrap().themes(), &ThemeSelection::All);
    }

    #[test]
    fn test_label_precedence() {
        let mut req = PosterRequest::new("Paris", "France");
        req.display_city = Some("Paname".to_owned());
        req.display_country = Some("République française".to_owned());

        let labels = req.clone().validate().unwrap().labels();
        assert_eq!(labels.city, "Paname");
        assert_eq!(labels.country, "République française");

        req.country_label = Some("FR".to_owned());
        assert_eq!(req.validate().unwrap().labels().country, "FR");
    }
}
