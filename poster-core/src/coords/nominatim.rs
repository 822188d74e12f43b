use super::Geocoder;
use crate::types::Coordinates;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{Level, event};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

const USER_AGENT: &str = concat!("city-map-poster/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Blocking client for the OpenStreetMap Nominatim search API.
///
/// Must not be created or dropped on an async executor thread; the server
/// builds it inside `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn locate(&self, city: &str, country: &str) -> Result<Option<Coordinates>> {
        let query = format!("{city}, {country}");

        let places: Vec<Place> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .context("Geocoding request failed")?
            .error_for_status()
            .context("Geocoding service returned an error")?
            .json()
            .context("Geocoding service returned an unexpected body")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        event!(Level::DEBUG, "Nominatim matched {:?}", place.display_name);

        let latitude = place
            .lat
            .parse::<f64>()
            .with_context(|| format!("Invalid latitude in geocoding response: {}", place.lat))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .with_context(|| format!("Invalid longitude in geocoding response: {}", place.lon))?;

        Ok(Some(Coordinates::new(latitude, longitude)))
    }
}
