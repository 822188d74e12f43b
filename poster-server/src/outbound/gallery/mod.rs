use crate::domain::ports::PosterGallery;

use poster_core::OutputFormat;

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use anyhow::Context;

/// Lists artifacts in the directory posters are written to.
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    dir: Arc<PathBuf>,
}

impl DirectoryGallery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }
}

impl PosterGallery for DirectoryGallery {
    async fn recent(&self, limit: usize) -> anyhow::Result<Vec<String>> {
        let dir = Arc::clone(&self.dir);

        tokio::task::spawn_blocking(move || newest_artifacts(&dir, limit))
            .await
            .context("listing posters did not complete")?
    }
}

fn is_artifact(path: &Path) -> bool {
    let extensions = [OutputFormat::Png, OutputFormat::Svg, OutputFormat::Pdf].map(|f| f.extension());

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

fn newest_artifacts(dir: &Path, limit: usize) -> anyhow::Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        // Nothing has been generated yet.
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", dir.display()));
        }
    };

    let mut artifacts: Vec<(SystemTime, String)> = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if !metadata.is_file() || !is_artifact(&path) {
            continue;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        artifacts.push((modified, entry.file_name().to_string_lossy().into_owned()));
    }

    artifacts.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    Ok(artifacts
        .into_iter()
        .take(limit)
        .map(|(_, name)| name)
        .collect())
}
