use crate::types::{CoordinateField, OutputFormat};

use std::path::PathBuf;

use thiserror::Error;

/// A request that cannot be processed at all. No per-theme results are
/// produced when this is returned.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("City and Country are required.")]
    MissingLocation,
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error(r#"Unknown output format: "{0}""#)]
    UnknownFormat(String),
    #[error(r#"{field} must be a number, got "{input}""#)]
    InvalidNumber { field: &'static str, input: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(r#"invalid {field} "{input}": {reason}"#)]
pub struct CoordinateParseError {
    pub field: CoordinateField,
    pub input: String,
    pub reason: &'static str,
}

#[derive(Debug, Error)]
pub enum FontResolutionError {
    #[error(r#"font family "{0}" was not found"#)]
    FamilyNotFound(String),
    #[error(r#"failed to load font family "{family}": {source:#}"#)]
    Acquisition {
        family: String,
        source: anyhow::Error,
    },
}

/// Failures attributable to a single theme key.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error(r#"theme "{0}" was not found"#)]
    NotFound(String),
    #[error(r#"theme "{key}" is malformed: {reason}"#)]
    Malformed { key: String, reason: String },
}

/// Anything that goes wrong while producing one theme's artifact. These are
/// recorded in that theme's [GenerationResult](crate::GenerationResult) and
/// never abort the batch.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error("{0} output is not supported by this renderer")]
    UnsupportedFormat(OutputFormat),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("renderer panicked: {0}")]
    Panicked(String),
    #[error("rendering failed: {0:#}")]
    Pipeline(#[from] anyhow::Error),
}

/// Request-level failures. Either the request was invalid or one of the
/// inputs shared by every theme of the batch could not be resolved.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    CoordinateParse(#[from] CoordinateParseError),
    #[error("Could not find coordinates for {city}, {country}")]
    LocationNotFound { city: String, country: String },
    #[error("Geocoding {city}, {country} failed: {source:#}")]
    Geocoding {
        city: String,
        country: String,
        source: anyhow::Error,
    },
    #[error(transparent)]
    FontResolution(#[from] FontResolutionError),
}
