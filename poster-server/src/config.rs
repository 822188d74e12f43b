use poster_core::DEFAULT_NOMINATIM_URL;

use std::{env, path::PathBuf};

use anyhow::Context;

const SERVER_PORT_KEY: &str = "SERVER_PORT";
const THEMES_DIR_KEY: &str = "THEMES_DIR";
const POSTERS_DIR_KEY: &str = "POSTERS_DIR";
const GEOCODER_URL_KEY: &str = "GEOCODER_URL";

const DEFAULT_SERVER_PORT: &str = "5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: String,
    /// Directory of theme files. The built-in themes are served when it does
    /// not exist.
    pub themes_dir: PathBuf,
    pub posters_dir: PathBuf,
    pub geocoder_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let server_port = env_or(SERVER_PORT_KEY, DEFAULT_SERVER_PORT)?;
        server_port
            .parse::<u16>()
            .with_context(|| format!("{SERVER_PORT_KEY} is not a valid port: {server_port}"))?;

        Ok(Config {
            server_port,
            themes_dir: env_or(THEMES_DIR_KEY, "themes")?.into(),
            posters_dir: env_or(POSTERS_DIR_KEY, "posters")?.into(),
            geocoder_url: env_or(GEOCODER_URL_KEY, DEFAULT_NOMINATIM_URL)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> anyhow::Result<String> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_owned()),
        Err(err) => Err(err).with_context(|| format!("failed to read {key}")),
    }
}
