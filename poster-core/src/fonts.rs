use crate::{
    error::FontResolutionError,
    types::{FontFace, FontSet},
};

use std::sync::Arc;

use tracing::{Level, event};
use usvg::fontdb::{Database, Family, Query, Weight};

/// Acquires the faces of a font family by name.
pub trait FontProvider: Send + Sync {
    fn load(&self, family: &str) -> Result<FontSet, FontResolutionError>;
}

impl<P: FontProvider + ?Sized> FontProvider for Arc<P> {
    fn load(&self, family: &str) -> Result<FontSet, FontResolutionError> {
        (**self).load(family)
    }
}

#[derive(Debug, Clone)]
pub struct FontResolver<P: FontProvider> {
    provider: P,
}

impl<P: FontProvider> FontResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// A blank or absent family means the default font set.
    pub fn resolve(&self, family: Option<&str>) -> Result<FontSet, FontResolutionError> {
        match family.map(str::trim).filter(|family| !family.is_empty()) {
            None => Ok(FontSet::default()),
            Some(family) => {
                event!(Level::INFO, "Resolving font family {:?}", family);
                self.provider.load(family)
            }
        }
    }
}

/// Looks families up in a font database, by default the fonts installed on
/// the system.
#[derive(Debug, Clone)]
pub struct SystemFontProvider {
    database: Arc<Database>,
}

impl SystemFontProvider {
    pub fn new() -> Self {
        let mut database = Database::new();
        database.load_system_fonts();

        event!(Level::DEBUG, "Loaded {} system font faces", database.len());

        Self::with_database(Arc::new(database))
    }

    pub fn with_database(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// The database, so a renderer can rasterise with the same faces.
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.database)
    }

    fn closest_face(&self, family: &str, weight: Weight) -> Option<FontFace> {
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight,
            ..Query::default()
        };

        let id = self.database.query(&query)?;
        let face = self.database.face(id)?;
        let name = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| family.to_owned());

        Some(FontFace::new(name, face.weight.0))
    }
}

impl Default for SystemFontProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FontProvider for SystemFontProvider {
    fn load(&self, family: &str) -> Result<FontSet, FontResolutionError> {
        let regular = self
            .closest_face(family, Weight::NORMAL)
            .ok_or_else(|| FontResolutionError::FamilyNotFound(family.to_owned()))?;

        // The database always answers with the nearest weight once the family
        // itself matched, so these only fall back if the face vanished.
        let bold = self
            .closest_face(family, Weight::BOLD)
            .unwrap_or_else(|| regular.clone());
        let light = self
            .closest_face(family, Weight::LIGHT)
            .unwrap_or_else(|| regular.clone());

        Ok(FontSet {
            bold,
            regular,
            light,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl FontProvider for CountingProvider {
        fn load(&self, family: &str) -> Result<FontSet, FontResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if family == "Missing Sans" {
                return Err(FontResolutionError::FamilyNotFound(family.to_owned()));
            }

            Ok(FontSet {
                bold: FontFace::new(family, 700),
                regular: FontFace::new(family, 400),
                light: FontFace::new(family, 300),
            })
        }
    }

    #[test]
    fn test_blank_family_uses_default() {
        let provider = Arc::new(CountingProvider::default());
        let resolver = FontResolver::new(provider.clone());

        assert_eq!(resolver.resolve(None).unwrap(), FontSet::default());
        assert_eq!(resolver.resolve(Some("   ")).unwrap(), FontSet::default());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_named_family_goes_to_provider() {
        let resolver = FontResolver::new(CountingProvider::default());

        let fonts = resolver.resolve(Some(" Noto Sans JP ")).unwrap();

        assert_eq!(fonts.bold, FontFace::new("Noto Sans JP", 700));
    }

    #[test]
    fn test_unknown_family_fails() {
        let resolver = FontResolver::new(CountingProvider::default());

        let err = resolver.resolve(Some("Missing Sans")).unwrap_err();

        assert!(matches!(err, FontResolutionError::FamilyNotFound(family) if family == "Missing Sans"));
    }

    #[test]
    fn test_empty_database_knows_no_family() {
        let provider = SystemFontProvider::with_database(Arc::new(Database::new()));

        assert!(matches!(
            provider.load("Roboto"),
            Err(FontResolutionError::FamilyNotFound(_))
        ));
    }
}
