// src/config/options.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::consts::*;
use crate::error::ConfigError;

/// Settings for one scrape run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Competition listing page, e.g. `https://host/results.php?cid=179`.
    pub listing_url: String,
    /// Display name the competition is stored under.
    pub competition_name: String,
    /// JSON database file.
    pub store_path: PathBuf,
    pub request_pause_ms: u64,
}

/// On-disk shape of `ballroom_scrape.toml`. Every key is optional so
/// environment variables can fill the gaps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileOptions {
    pub listing_url: Option<String>,
    pub competition_name: Option<String>,
    pub store_path: Option<PathBuf>,
    pub request_pause_ms: Option<u64>,
}

impl FileOptions {
    pub fn from_toml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: s!(path), source })
    }

    /// Read `path` if it exists; a missing file is an empty config.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: shown.clone(), source })?;
        Self::from_toml_str(&text, &shown)
    }
}

impl RunOptions {
    /// Config file (from `BALLROOM_SCRAPE_CONFIG` or `./ballroom_scrape.toml`),
    /// then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let file = FileOptions::read(&config_path())?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with `env` lookups. Env wins.
    pub fn resolve<F>(file: FileOptions, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let store_path = resolve_store_path(&file, &env);
        let listing_url = non_empty(env(LISTING_URL_ENV))
            .or_else(|| non_empty(file.listing_url))
            .ok_or(ConfigError::Missing("listing_url"))?;
        let competition_name = non_empty(env(COMPETITION_NAME_ENV))
            .or_else(|| non_empty(file.competition_name))
            .ok_or(ConfigError::Missing("competition_name"))?;

        if !listing_url.starts_with("http://") && !listing_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "listing_url must be an http(s) URL: {listing_url}"
            )));
        }

        Ok(Self {
            listing_url,
            competition_name,
            store_path,
            request_pause_ms: file.request_pause_ms.unwrap_or(REQUEST_PAUSE_MS),
        })
    }
}

fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
}

/// Store location alone, for tools that do not scrape.
pub fn load_store_path() -> Result<PathBuf, ConfigError> {
    let file = FileOptions::read(&config_path())?;
    Ok(resolve_store_path(&file, |key| std::env::var(key).ok()))
}

fn resolve_store_path<F>(file: &FileOptions, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    env(STORE_PATH_ENV)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| file.store_path.clone())
        .unwrap_or_else(default_store_path)
}

pub fn default_store_path() -> PathBuf {
    PathBuf::from(STORE_DIR).join(STORE_FILE)
}

pub fn debug_log_path() -> PathBuf {
    PathBuf::from(STORE_DIR).join(DEBUG_LOG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn file_values_are_used_when_env_is_empty() {
        let file = FileOptions::from_toml_str(
            r#"
            listing_url = "https://ballroomcompexpress.com/results.php?cid=179"
            competition_name = "Dances with Owls 2025"
            request_pause_ms = 10
            "#,
            "test.toml",
        )
        .unwrap();
        let opts = RunOptions::resolve(file, env_of(&[])).unwrap();
        assert_eq!(opts.competition_name, "Dances with Owls 2025");
        assert_eq!(opts.request_pause_ms, 10);
        assert_eq!(opts.store_path, default_store_path());
    }

    #[test]
    fn env_overrides_file() {
        let file = FileOptions {
            listing_url: Some(s!("https://a.example/results.php?cid=1")),
            competition_name: Some(s!("From File")),
            ..Default::default()
        };
        let env = env_of(&[
            (COMPETITION_NAME_ENV, "From Env"),
            (STORE_PATH_ENV, "/tmp/db.json"),
        ]);
        let opts = RunOptions::resolve(file, env).unwrap();
        assert_eq!(opts.competition_name, "From Env");
        assert_eq!(opts.store_path, PathBuf::from("/tmp/db.json"));
        assert_eq!(opts.listing_url, "https://a.example/results.php?cid=1");
    }

    #[test]
    fn missing_competition_name_is_an_error() {
        let file = FileOptions {
            listing_url: Some(s!("https://a.example/results.php?cid=1")),
            competition_name: Some(s!("   ")),
            ..Default::default()
        };
        let err = RunOptions::resolve(file, env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("competition_name")));
    }

    #[test]
    fn non_http_listing_url_is_rejected() {
        let env = env_of(&[
            (LISTING_URL_ENV, "results.php?cid=1"),
            (COMPETITION_NAME_ENV, "X"),
        ]);
        let err = RunOptions::resolve(FileOptions::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let err = FileOptions::from_toml_str("listing = \"x\"", "bad.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
