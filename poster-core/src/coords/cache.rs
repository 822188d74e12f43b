use super::Geocoder;
use crate::types::Coordinates;

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use anyhow::Result;
use tracing::{Level, event};

/// How many locations a [CachingGeocoder] remembers unless told otherwise.
pub const DEFAULT_GEOCODER_CACHE_CAPACITY: usize = 1024;

type CacheKey = (String, String);

#[derive(Debug, Default)]
struct Entries {
    // Coordinates with the tick of their last use.
    map: HashMap<CacheKey, (Coordinates, u64)>,
    clock: u64,
}

impl Entries {
    fn get(&mut self, key: &CacheKey) -> Option<Coordinates> {
        self.clock += 1;
        let clock = self.clock;

        self.map.get_mut(key).map(|(coordinates, used)| {
            *used = clock;
            *coordinates
        })
    }

    fn insert(&mut self, key: CacheKey, coordinates: Coordinates, capacity: usize) {
        if !self.map.contains_key(&key) && self.map.len() >= capacity {
            let oldest = self
                .map
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(key, _)| key.clone());

            if let Some(oldest) = oldest {
                self.map.remove(&oldest);
            }
        }

        self.clock += 1;
        self.map.insert(key, (coordinates, self.clock));
    }
}

/// Remembers successful lookups so repeated batches for the same city do not
/// hit the backend again. Misses and errors are not cached. At most
/// `capacity` locations are kept; the least recently used one is evicted
/// first.
#[derive(Debug)]
pub struct CachingGeocoder<G: Geocoder> {
    inner: G,
    capacity: usize,
    entries: Mutex<Entries>,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self::with_capacity(inner, DEFAULT_GEOCODER_CACHE_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(inner: G, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cache_key(city: &str, country: &str) -> CacheKey {
        (city.to_lowercase(), country.to_lowercase())
    }
}

impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    fn locate(&self, city: &str, country: &str) -> Result<Option<Coordinates>> {
        let key = Self::cache_key(city, country);

        // A poisoned lock only means another lookup panicked; the entries
        // themselves are still consistent.
        let cached = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key);

        if let Some(hit) = cached {
            event!(Level::DEBUG, "Using cached coordinates for {}, {}", city, country);
            return Ok(Some(hit));
        }

        let found = self.inner.locate(city, country)?;

        if let Some(coordinates) = found {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, coordinates, self.capacity);
        }

        Ok(found)
    }
}
