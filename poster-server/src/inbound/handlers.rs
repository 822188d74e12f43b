use super::api::{ApiError, ApiSuccess};
use crate::domain::models::PosterOutcome;
use crate::domain::ports::PosterService;
use crate::inbound::AppState;

use poster_core::{MAX_DISTANCE, MIN_DISTANCE, PosterRequest, ThemeSummary, ValidationError};

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How many artifacts the poster listing shows.
const RECENT_POSTER_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Error)]
pub(super) enum ParseGeneratePostersHttpRequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Body(String),
}

impl From<JsonRejection> for ParseGeneratePostersHttpRequestError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection.body_text())
    }
}

/// A JSON number or a string holding one. Form-backed clients send strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Blank text counts as absent.
    fn parse(self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        match self {
            NumberOrText::Number(value) => Ok(Some(value)),
            NumberOrText::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }

                text.parse().map(Some).map_err(|_| ValidationError::InvalidNumber {
                    field,
                    input: text.to_owned(),
                })
            }
        }
    }

    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(value) => value.to_string(),
            NumberOrText::Text(text) => text,
        }
    }
}

fn parse_number(
    value: Option<NumberOrText>,
    field: &'static str,
) -> Result<Option<f64>, ValidationError> {
    value.map(|value| value.parse(field)).transpose().map(Option::flatten)
}

fn whole_distance(value: f64) -> Result<u32, ValidationError> {
    let rounded = value.round();
    if rounded.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&rounded) {
        return Ok(rounded as u32);
    }

    Err(ValidationError::OutOfRange {
        field: "distance",
        value,
        min: f64::from(MIN_DISTANCE),
        max: f64::from(MAX_DISTANCE),
    })
}

/// The body of a batch generation request. Every field may be absent or
/// null; absent fields take the request defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratePostersHttpRequestBody {
    city: Option<String>,
    country: Option<String>,
    latitude: Option<NumberOrText>,
    longitude: Option<NumberOrText>,
    theme: Option<String>,
    all_themes: Option<bool>,
    distance: Option<NumberOrText>,
    width: Option<NumberOrText>,
    height: Option<NumberOrText>,
    format: Option<String>,
    display_city: Option<String>,
    display_country: Option<String>,
    country_label: Option<String>,
    font_family: Option<String>,
}

impl GeneratePostersHttpRequestBody {
    /// Converts the HTTP request body into a domain request. Range checks are
    /// left to the domain; only the shape of each field is checked here.
    fn try_into_domain(self) -> Result<PosterRequest, ParseGeneratePostersHttpRequestError> {
        let city = self.city.unwrap_or_default();
        let country = self.country.unwrap_or_default();

        if city.trim().is_empty() || country.trim().is_empty() {
            return Err(ValidationError::MissingLocation.into());
        }

        let defaults = PosterRequest::default();

        let distance = match parse_number(self.distance, "distance")? {
            Some(value) => whole_distance(value)?,
            None => defaults.distance,
        };
        let width = parse_number(self.width, "width")?.map_or(defaults.width, |v| v as f32);
        let height = parse_number(self.height, "height")?.map_or(defaults.height, |v| v as f32);

        let format = match self.format.as_deref().map(str::trim) {
            Some(format) if !format.is_empty() => format.parse()?,
            _ => defaults.format,
        };

        Ok(PosterRequest {
            city,
            country,
            latitude: self.latitude.map(NumberOrText::into_text),
            longitude: self.longitude.map(NumberOrText::into_text),
            theme: self.theme.unwrap_or(defaults.theme),
            all_themes: self.all_themes.unwrap_or(defaults.all_themes),
            distance,
            width,
            height,
            format,
            display_city: self.display_city,
            display_country: self.display_country,
            country_label: self.country_label,
            font_family: self.font_family,
        })
    }
}

/// One entry of a batch response: the artifact's file name, or why the theme failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PosterResultData {
    Created { theme: String, file: String },
    Failed { theme: String, error: String },
}

impl From<&PosterOutcome> for PosterResultData {
    fn from(outcome: &PosterOutcome) -> Self {
        let theme = outcome.theme().to_owned();
        match outcome.result() {
            Ok(file) => Self::Created {
                theme,
                file: file.to_owned(),
            },
            Err(error) => Self::Failed {
                theme,
                error: error.to_owned(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratePostersResponseData {
    results: Vec<PosterResultData>,
}

impl From<&[PosterOutcome]> for GeneratePostersResponseData {
    fn from(outcomes: &[PosterOutcome]) -> Self {
        Self {
            results: outcomes.iter().map(PosterResultData::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListThemesResponseData {
    themes: Vec<ThemeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPostersResponseData {
    posters: Vec<String>,
}

/// Run a generation batch.
///
/// # Responses
///
/// - 200 OK: the batch ran; each theme reports a file or an error.
/// - 400 Bad request: the body is not a valid request, or the request failed validation.
/// - 422 Unprocessable entity: coordinates, location or font could not be resolved.
/// - 502 Bad gateway: the geocoder could not be reached.
pub(super) async fn generate_posters<PS: PosterService>(
    State(state): State<AppState<PS>>,
    body: Result<Json<GeneratePostersHttpRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<GeneratePostersResponseData>, ApiError> {
    let Json(body) = body.map_err(ParseGeneratePostersHttpRequestError::from)?;
    let domain_req = body.try_into_domain()?;

    state
        .poster_service
        .generate_posters(domain_req)
        .await
        .map_err(ApiError::from)
        .map(|ref outcomes| ApiSuccess::new(StatusCode::OK, outcomes.as_slice().into()))
}

pub(super) async fn list_themes<PS: PosterService>(
    State(state): State<AppState<PS>>,
) -> ApiSuccess<ListThemesResponseData> {
    let themes = state.poster_service.list_themes();
    ApiSuccess::new(StatusCode::OK, ListThemesResponseData { themes })
}

pub(super) async fn recent_posters<PS: PosterService>(
    State(state): State<AppState<PS>>,
) -> Result<ApiSuccess<RecentPostersResponseData>, ApiError> {
    let posters = state
        .poster_service
        .recent_posters(RECENT_POSTER_LIMIT)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RecentPostersResponseData { posters },
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    use poster_core::OutputFormat;

    use serde_json::json;

    fn body(value: serde_json::Value) -> GeneratePostersHttpRequestBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_form_strings_are_accepted() {
        let request = body(json!({
            "city": "Paris",
            "country": "France",
            "latitude": "",
            "longitude": "",
            "distance": "12000",
            "width": "8.5",
            "height": "11",
            "format": "PDF",
            "theme": "noir",
            "all_themes": false,
        }))
        .try_into_domain()
        .unwrap();

        assert_eq!(request.distance, 12_000);
        assert_eq!(request.width, 8.5);
        assert_eq!(request.height, 11.0);
        assert_eq!(request.format, OutputFormat::Pdf);
        assert_eq!(request.theme, "noir");
        assert_eq!(request.latitude.as_deref(), Some(""));
    }

    #[test]
    fn test_numbers_and_nulls_are_accepted() {
        let request = body(json!({
            "city": "Paris",
            "country": "France",
            "latitude": 48.8566,
            "longitude": -2.35,
            "distance": 9000,
            "width": null,
            "theme": null,
            "format": null,
        }))
        .try_into_domain()
        .unwrap();

        let defaults = PosterRequest::default();
        assert_eq!(request.latitude.as_deref(), Some("48.8566"));
        assert_eq!(request.longitude.as_deref(), Some("-2.35"));
        assert_eq!(request.distance, 9_000);
        assert_eq!(request.width, defaults.width);
        assert_eq!(request.theme, defaults.theme);
        assert_eq!(request.format, defaults.format);
    }

    #[test]
    fn test_missing_location_comes_first() {
        let err = body(json!({ "city": null, "country": "France", "format": "tiff" }))
            .try_into_domain()
            .unwrap_err();

        assert_eq!(
            err,
            ParseGeneratePostersHttpRequestError::Validation(ValidationError::MissingLocation)
        );
    }

    #[test]
    fn test_malformed_fields_are_rejected() {
        let err = body(json!({ "city": "Paris", "country": "France", "width": "wide" }))
            .try_into_domain()
            .unwrap_err();
        assert_eq!(err.to_string(), r#"width must be a number, got "wide""#);

        let err = body(json!({ "city": "Paris", "country": "France", "format": "tiff" }))
            .try_into_domain()
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Unknown output format: "tiff""#);

        let err = body(json!({ "city": "Paris", "country": "France", "distance": -5 }))
            .try_into_domain()
            .unwrap_err();
        assert!(matches!(
            err,
            ParseGeneratePostersHttpRequestError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
}
