use poster_core::{GenerationError, GenerationResult};

use derive_more::From;
use thiserror::Error;
use uuid::Uuid;

/// Identifies one generation batch. Its short form keeps the batch's file
/// names apart from earlier batches for the same city and theme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, From)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(8);
        simple
    }
}

/// What a client learns about one theme of a finished batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosterOutcome {
    theme: String,
    result: Result<String, String>,
}

impl PosterOutcome {
    pub fn created(theme: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            result: Ok(file.into()),
        }
    }

    pub fn failed(theme: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            result: Err(error.into()),
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// The artifact's file name, or the failure message.
    pub fn result(&self) -> Result<&str, &str> {
        self.result.as_deref().map_err(String::as_str)
    }
}

impl From<&GenerationResult> for PosterOutcome {
    fn from(result: &GenerationResult) -> Self {
        match result.outcome() {
            Ok(path) => {
                let file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Self::created(result.theme(), file)
            }
            Err(err) => Self::failed(result.theme(), err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeneratePostersError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
