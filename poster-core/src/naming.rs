use crate::types::OutputFormat;

use std::path::{Path, PathBuf};

/// Derives artifact paths inside an output directory.
///
/// Names are `<city>_<theme>[_<suffix>].<ext>` and depend only on their
/// inputs. The namer never invents a suffix itself: callers that must not
/// overwrite earlier artifacts pass one (a timestamp, a batch id) through
/// [OutputNamer::with_suffix].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNamer {
    dir: PathBuf,
    suffix: Option<String>,
}

impl OutputNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            suffix: None,
        }
    }

    pub fn with_suffix(&self, suffix: &str) -> Self {
        let suffix = slugify(suffix);

        Self {
            dir: self.dir.clone(),
            suffix: (!suffix.is_empty()).then_some(suffix),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self, city: &str, theme_key: &str, format: OutputFormat) -> PathBuf {
        let mut stem = format!("{}_{}", slug_or(city, "city"), slug_or(theme_key, "theme"));

        if let Some(suffix) = &self.suffix {
            stem.push('_');
            stem.push_str(suffix);
        }

        self.dir.join(format!("{stem}.{}", format.extension()))
    }
}

fn slug_or(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        fallback.to_owned()
    } else {
        slug
    }
}

/// Lower-cases `text` and collapses every run of characters that are not
/// alphanumeric into a single `_`. Non-ASCII letters are kept.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_name_is_deterministic() {
        let namer = OutputNamer::new("posters");

        let first = namer.name("Paris", "terracotta", OutputFormat::Png);
        let second = namer.name("Paris", "terracotta", OutputFormat::Png);

        assert_eq!(first, second);
        assert_eq!(first, PathBuf::from("posters/paris_terracotta.png"));
    }

    #[test]
    fn test_name_is_filesystem_safe() {
        let namer = OutputNamer::new("out");

        assert_eq!(
            namer.name("  New York / NY ", "midnight_blue", OutputFormat::Svg),
            PathBuf::from("out/new_york_ny_midnight_blue.svg")
        );
        assert_eq!(
            namer.name("../../etc", "noir", OutputFormat::Pdf),
            PathBuf::from("out/etc_noir.pdf")
        );
        assert_eq!(
            namer.name("São Paulo", "ocean", OutputFormat::Png),
            PathBuf::from("out/são_paulo_ocean.png")
        );
    }

    #[test]
    fn test_unnameable_city_gets_placeholder() {
        let namer = OutputNamer::new("out");

        assert_eq!(
            namer.name("!!!", "noir", OutputFormat::Png),
            PathBuf::from("out/city_noir.png")
        );
    }

    #[test]
    fn test_suffix_keeps_batches_apart() {
        let namer = OutputNamer::new("posters");
        let batch = namer.with_suffix("20260101_120000");

        assert_eq!(
            batch.name("Paris", "noir", OutputFormat::Png),
            PathBuf::from("posters/paris_noir_20260101_120000.png")
        );
        assert_ne!(
            batch.name("Paris", "noir", OutputFormat::Png),
            namer.name("Paris", "noir", OutputFormat::Png)
        );
        assert_eq!(namer.with_suffix("--"), namer);
    }
}
