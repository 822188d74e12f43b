use crate::{error::ThemeError, types::Theme};

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use tracing::{Level, event, span};

mod directory;
mod embedded;
mod record;

pub use directory::DirectoryThemeSource;
pub use embedded::EmbeddedThemeSource;

/// Where themes are stored. The catalog only ever enumerates keys and fetches
/// records one at a time, so a broken record never hides the others.
pub trait ThemeSource: Send + Sync {
    /// Every theme key, in the source's discovery order.
    fn keys(&self) -> Result<Vec<String>>;

    fn fetch(&self, key: &str) -> Result<Theme, ThemeError>;
}

impl<S: ThemeSource + ?Sized> ThemeSource for Arc<S> {
    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn fetch(&self, key: &str) -> Result<Theme, ThemeError> {
        (**self).fetch(key)
    }
}

/// Read-only index of the known themes. Iteration follows the discovery order
/// of the source, which is also the order of "all themes" batches.
#[derive(Debug, Clone, Default)]
pub struct ThemeCatalog {
    order: Vec<String>,
    themes: HashMap<String, Theme>,
    rejected: HashMap<String, ThemeError>,
}

impl ThemeCatalog {
    /// Loads every theme of `source`. Malformed records are logged and left
    /// out of the catalog; asking for one of them later reports why.
    pub fn load_all<S: ThemeSource + ?Sized>(source: &S) -> Result<Self> {
        let span = span!(Level::DEBUG, "load_themes");
        let _guard = span.enter();

        let mut catalog = ThemeCatalog::default();

        for key in source.keys()? {
            if catalog.themes.contains_key(&key) || catalog.rejected.contains_key(&key) {
                event!(Level::WARN, "Duplicate theme key {:?}, keeping the first", key);
                continue;
            }

            match source.fetch(&key) {
                Ok(theme) => catalog.insert(theme),
                Err(err) => {
                    event!(Level::WARN, "Skipping theme {:?}: {}", key, err);
                    catalog.rejected.insert(key, err);
                }
            }
        }

        event!(
            Level::INFO,
            "Loaded {} themes ({} rejected)",
            catalog.len(),
            catalog.rejected.len()
        );

        Ok(catalog)
    }

    /// Builds a catalog from already parsed themes, keeping their order.
    pub fn from_themes(themes: impl IntoIterator<Item = Theme>) -> Self {
        let mut catalog = ThemeCatalog::default();

        for theme in themes {
            if !catalog.themes.contains_key(theme.key()) {
                catalog.insert(theme);
            }
        }

        catalog
    }

    fn insert(&mut self, theme: Theme) {
        self.order.push(theme.key().to_owned());
        self.themes.insert(theme.key().to_owned(), theme);
    }

    pub fn get(&self, key: &str) -> Result<&Theme, ThemeError> {
        if let Some(theme) = self.themes.get(key) {
            return Ok(theme);
        }

        match self.rejected.get(key) {
            Some(err) => Err(err.clone()),
            None => Err(ThemeError::NotFound(key.to_owned())),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        self.order.iter().filter_map(|key| self.themes.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
