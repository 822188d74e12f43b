use super::{ThemeSource, record::parse_theme};
use crate::{error::ThemeError, types::Theme};

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const THEME_EXTENSION: &str = "json";

/// Themes stored as `<key>.json` files in a single directory. Keys are
/// discovered in file name order.
#[derive(Debug, Clone)]
pub struct DirectoryThemeSource {
    dir: PathBuf,
}

impl DirectoryThemeSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        // Keys map straight to file names; refuse anything that could escape
        // the directory.
        if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
            return None;
        }

        Some(self.dir.join(format!("{key}.{THEME_EXTENSION}")))
    }
}

impl ThemeSource for DirectoryThemeSource {
    fn keys(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read theme directory {}", self.dir.display()))?;

        let mut keys = Vec::new();

        for entry in entries {
            let path = entry?.path();

            if !path.is_file() || path.extension().is_none_or(|ext| ext != THEME_EXTENSION) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_owned());
            }
        }

        keys.sort();

        Ok(keys)
    }

    fn fetch(&self, key: &str) -> Result<Theme, ThemeError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| ThemeError::NotFound(key.to_owned()))?;

        let json = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ThemeError::NotFound(key.to_owned()),
            _ => ThemeError::Malformed {
                key: key.to_owned(),
                reason: err.to_string(),
            },
        })?;

        parse_theme(key, &json)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::ThemeCatalog;

    const MINIMAL: &str =
        r##"{"bg": "#F5EDE4", "text": "#8B4513", "water": "#A8C4C4", "parks": "#E8E0D0"}"##;

    #[test]
    fn test_keys_are_sorted_json_stems() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("terracotta.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("autumn.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("noir.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("README.md"), "not a theme").unwrap();

        let source = DirectoryThemeSource::new(dir.path());

        assert_eq!(
            source.keys().unwrap(),
            vec!["autumn", "noir", "terracotta"]
        );
    }

    #[test]
    fn test_broken_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let catalog = ThemeCatalog::load_all(&DirectoryThemeSource::new(dir.path())).unwrap();

        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["good"]);
        assert!(matches!(
            catalog.get("bad"),
            Err(ThemeError::Malformed { key, .. }) if key == "bad"
        ));
    }

    #[test]
    fn test_fetch_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryThemeSource::new(dir.path());

        assert_eq!(
            source.fetch("../secrets").unwrap_err(),
            ThemeError::NotFound("../secrets".to_owned())
        );
        assert_eq!(
            source.fetch("absent").unwrap_err(),
            ThemeError::NotFound("absent".to_owned())
        );
    }

    #[test]
    fn test_missing_directory_fails_enumeration() {
        let source = DirectoryThemeSource::new("/definitely/not/a/theme/dir");

        assert!(source.keys().is_err());
    }
}
