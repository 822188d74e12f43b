use crate::{
    error::GenerationError,
    request::GenerationRequest,
    types::{CoordinateField, Coordinates},
};

use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, event};

mod cache;
#[cfg(feature = "nominatim")]
mod nominatim;
mod parse;

pub use cache::{CachingGeocoder, DEFAULT_GEOCODER_CACHE_CAPACITY};
#[cfg(feature = "nominatim")]
pub use nominatim::{DEFAULT_NOMINATIM_URL, NominatimGeocoder};
pub use parse::parse_coordinate;

/// Turns a city/country pair into coordinates.
pub trait Geocoder: Send + Sync {
    /// Returns the best match, or `None` if the place is unknown. Errors are
    /// reserved for failures of the backend itself.
    fn locate(&self, city: &str, country: &str) -> Result<Option<Coordinates>>;
}

impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    fn locate(&self, city: &str, country: &str) -> Result<Option<Coordinates>> {
        (**self).locate(city, country)
    }
}

/// Chooses between the coordinates a user typed in and a geocoding lookup.
#[derive(Debug, Clone)]
pub struct CoordinateResolver<G: Geocoder> {
    geocoder: G,
}

impl<G: Geocoder> CoordinateResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Explicit coordinates always win. The geocoder is only consulted when
    /// the request does not carry both a latitude and a longitude.
    ///
    /// # Errors
    ///
    /// - [GenerationError::CoordinateParse] if a supplied value is malformed.
    /// - [GenerationError::LocationNotFound] if the geocoder has no match.
    /// - [GenerationError::Geocoding] if the geocoder itself failed.
    pub fn resolve(&self, request: &GenerationRequest) -> Result<Coordinates, GenerationError> {
        if let (Some(latitude), Some(longitude)) = (request.latitude(), request.longitude()) {
            let coordinates = Coordinates::new(
                parse_coordinate(latitude, CoordinateField::Latitude)?,
                parse_coordinate(longitude, CoordinateField::Longitude)?,
            );

            event!(Level::DEBUG, "Using explicit coordinates {}", coordinates);

            return Ok(coordinates);
        }

        let (city, country) = (request.city(), request.country());

        event!(Level::INFO, "Looking up coordinates for {}, {}", city, country);

        match self.geocoder.locate(city, country) {
            Ok(Some(coordinates)) => {
                event!(Level::INFO, "Found {}, {} at {}", city, country, coordinates);
                Ok(coordinates)
            }
            Ok(None) => Err(GenerationError::LocationNotFound {
                city: city.to_owned(),
                country: country.to_owned(),
            }),
            Err(source) => Err(GenerationError::Geocoding {
                city: city.to_owned(),
                country: country.to_owned(),
                source,
            }),
        }
    }
}
