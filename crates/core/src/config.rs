//! Application configuration loaded from `~/.config/sgadmin/config.toml`
//! with `SGADMIN_*` environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the user's config/data roots owned by the console.
pub const APP_DIR: &str = "sgadmin";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "SGADMIN";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Runtime settings for the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base address of the REST API, e.g. `http://localhost:8000`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base address media paths are resolved against. Falls back to `api_base_url`.
    #[serde(default)]
    pub media_base_url: Option<String>,
    /// Optional request timeout. Unset leaves the HTTP client defaults in place.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Directory holding the two persisted session entries.
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
    /// Directory receiving `sgadmin.log`.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            media_base_url: None,
            request_timeout_secs: None,
            session_dir: default_session_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Base address used to resolve relative media paths.
    pub fn media_base(&self) -> &str {
        self.media_base_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(&self.api_base_url)
    }
}

/// Location of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Write a default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: PathBuf) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let defaults = AppConfig::default();
    let contents = format!(
        "# sgadmin configuration\n\
         # Every key can be overridden with an SGADMIN_<KEY> environment variable.\n\
         api_base_url = \"{}\"\n\
         # media_base_url = \"{}\"\n\
         # request_timeout_secs = 30\n\
         session_dir = \"{}\"\n\
         log_dir = \"{}\"\n",
        defaults.api_base_url,
        defaults.api_base_url,
        escape_path(&defaults.session_dir),
        escape_path(&defaults.log_dir),
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Default configuration written");
    Ok(())
}

fn escape_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_session_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("session")
}

fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_values_from_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
api_base_url = "https://api.example.com"
media_base_url = "https://cdn.example.com"
request_timeout_secs = 12
session_dir = "/tmp/sgadmin-session"
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.media_base(), "https://cdn.example.com");
        assert_eq!(config.request_timeout_secs, Some(12));
        assert_eq!(config.session_dir, PathBuf::from("/tmp/sgadmin-session"));
        Ok(())
    }

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert!(!config.api_base_url.is_empty());
        assert_eq!(config.media_base(), config.api_base_url);
        assert_eq!(config.request_timeout_secs, None);
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(path.clone())?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);

        // An existing file is never overwritten.
        fs::write(&path, "api_base_url = \"http://other\"\n")?;
        write_default_config(path.clone())?;
        assert_eq!(AppConfig::load_from(&path)?.api_base_url, "http://other");
        Ok(())
    }
}
