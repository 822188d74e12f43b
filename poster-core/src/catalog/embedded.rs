use super::{ThemeSource, record::parse_theme};
use crate::{error::ThemeError, types::Theme};

use anyhow::Result;

macro_rules! builtin_theme {
    ($key:literal) => {
        ($key, include_str!(concat!("../../themes/", $key, ".json")))
    };
}

// Sorted by key, matching the order a directory of the same files yields.
const BUILTIN_THEMES: &[(&str, &str)] = &[
    builtin_theme!("autumn"),
    builtin_theme!("blueprint"),
    builtin_theme!("forest"),
    builtin_theme!("japanese_ink"),
    builtin_theme!("midnight_blue"),
    builtin_theme!("monochrome_blue"),
    builtin_theme!("neon_cyberpunk"),
    builtin_theme!("noir"),
    builtin_theme!("ocean"),
    builtin_theme!("pastel_dream"),
    builtin_theme!("sunset"),
    builtin_theme!("terracotta"),
    builtin_theme!("warm_beige"),
];

/// The palettes compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedThemeSource;

impl ThemeSource for EmbeddedThemeSource {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(BUILTIN_THEMES
            .iter()
            .map(|(key, _)| key.to_string())
            .collect())
    }

    fn fetch(&self, key: &str) -> Result<Theme, ThemeError> {
        let (_, json) = BUILTIN_THEMES
            .iter()
            .find(|(builtin, _)| *builtin == key)
            .ok_or_else(|| ThemeError::NotFound(key.to_owned()))?;

        parse_theme(key, json)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::ThemeCatalog;

    #[test]
    fn test_every_builtin_theme_parses() {
        let catalog = ThemeCatalog::load_all(&EmbeddedThemeSource).unwrap();

        assert_eq!(catalog.len(), BUILTIN_THEMES.len());
    }

    #[test]
    fn test_builtin_keys_are_sorted() {
        let keys = EmbeddedThemeSource.keys().unwrap();
        let mut sorted = keys.clone();
        sorted.sort();

        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_default_theme_is_builtin() {
        let theme = EmbeddedThemeSource
            .fetch(crate::constants::DEFAULT_THEME)
            .unwrap();

        assert_eq!(theme.name(), "Terracotta");
    }
}
