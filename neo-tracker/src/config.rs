use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use neo_common::Locale;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "NASA_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub locale: Locale,

    /// NASA API key. `NASA_API_KEY` takes precedence when set.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout. Unset means the transport default (none).
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default)]
    pub export_csv: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_base_url() -> String {
    "https://api.nasa.gov/neo/rest/v1/feed".to_string()
}

fn default_user_agent() -> String {
    format!("neo-tracker/{}", env!("CARGO_PKG_VERSION"))
}

fn default_image_dir() -> String {
    "data/image_cache".to_string()
}

fn default_fonts_dir() -> String {
    "fonts".to_string()
}

fn default_font_family() -> String {
    "DejaVu Sans".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            locale: Locale::default(),
            api_key: None,
            feed: FeedConfig::default(),
            query: QueryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            fonts_dir: default_fonts_dir(),
            font_family: default_font_family(),
            export_csv: false,
        }
    }
}

impl TrackerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the API key, preferring the environment value.
    ///
    /// A missing or blank key is a startup error: no request is ever sent
    /// without a credential.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .into_iter()
            .chain(self.api_key.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .with_context(|| {
                format!(
                    "No NASA API key configured: set {} or `api_key` in the config file",
                    API_KEY_ENV
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = TrackerConfig::from_toml("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.feed.base_url, "https://api.nasa.gov/neo/rest/v1/feed");
        assert!(config.feed.timeout_seconds.is_none());
        assert!(config.query.start_date.is_none());
        assert_eq!(config.output.image_dir, "data/image_cache");
        assert!(!config.output.export_csv);
    }

    #[test]
    fn test_full_toml() {
        let config = TrackerConfig::from_toml(
            r#"
            log_level = "debug"
            locale = "fr"
            api_key = "abc"

            [feed]
            base_url = "http://127.0.0.1:9000/feed"
            timeout_seconds = 5

            [query]
            start_date = "2025-08-20"
            end_date = "2025-08-22"

            [output]
            export_csv = true
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.locale, Locale::Fr);
        assert_eq!(config.feed.timeout_seconds, Some(5));
        assert_eq!(
            config.query.start_date,
            NaiveDate::from_ymd_opt(2025, 8, 20)
        );
        assert!(config.output.export_csv);
        assert_eq!(config.output.font_family, "DejaVu Sans");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(TrackerConfig::from_toml("locale = \"klingon\"").is_err());
        assert!(TrackerConfig::from_toml("[query]\nstart_date = \"yesterday\"").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn test_api_key_resolution() {
        let mut config = TrackerConfig::default();
        assert!(config.resolve_api_key(None).is_err());
        assert!(config.resolve_api_key(Some("   ".to_string())).is_err());

        config.api_key = Some("from-file".to_string());
        assert_eq!(config.resolve_api_key(None).unwrap(), "from-file");
        assert_eq!(
            config.resolve_api_key(Some("from-env".to_string())).unwrap(),
            "from-env"
        );
        assert_eq!(
            config.resolve_api_key(Some(String::new())).unwrap(),
            "from-file"
        );
    }
}
