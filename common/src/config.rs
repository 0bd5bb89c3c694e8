use crate::types::SegmentMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const MODEL_ENV: &str = "SLIDEGEN_MODEL";
pub const API_BASE_ENV: &str = "SLIDEGEN_API_BASE";
pub const OUTPUT_DIR_ENV: &str = "SLIDEGEN_OUTPUT_DIR";
pub const LOG_PATH_ENV: &str = "SLIDEGEN_LOG_PATH";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 900;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {source}")]
    Parse { source: serde_json::Error },
    #[error("Failed to parse TOML config: {source}")]
    TomlParse { source: toml::de::Error },
    #[error("Failed to serialize config: {reason}")]
    Serialize { reason: String },
    #[error("Cannot find config directory")]
    NoConfigDir,
}

/// Slidegen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Gemini API key. Read from `GOOGLE_API_KEY` when not set in the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub output_dir: PathBuf,
    pub max_chunk_chars: usize,
    pub segment_mode: SegmentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            output_dir: PathBuf::from("."),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            segment_mode: SegmentMode::default(),
            log_path: None,
        }
    }
}

impl SlideConfig {
    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("slidegen").join("config.json"))
    }

    /// Load the user config file if present, then apply environment overrides.
    pub async fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        let config = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from_file(&path).await?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    /// Load configuration from a JSON or TOML file (chosen by extension).
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let config = Self::parse(path, &contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(contents).map_err(|source| ConfigError::TomlParse { source })
        } else {
            serde_json::from_str(contents).map_err(|source| ConfigError::Parse { source })
        }
    }

    /// Overlay values from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup. Empty values are
    /// treated as unset.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(model) = get(MODEL_ENV) {
            self.model = model;
        }
        if let Some(base) = get(API_BASE_ENV) {
            self.api_base = base;
        }
        if let Some(dir) = get(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = get(LOG_PATH_ENV) {
            self.log_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Save configuration to the user config file
    pub async fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to_file(&path).await?;
        Ok(path)
    }

    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        let contents = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
                reason: e.to_string(),
            })?
        } else {
            serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse { source })?
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(path, contents).await.map_err(io_err)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Log file location, defaulting to the system temp directory.
    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("slidegen.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_replace_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (API_KEY_ENV, "secret"),
            (MODEL_ENV, "gemini-pro"),
            (OUTPUT_DIR_ENV, "decks"),
            (LOG_PATH_ENV, "  "),
        ]);
        let config = SlideConfig::default()
            .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.output_dir, PathBuf::from("decks"));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.log_path.is_none());
        assert!(config.has_api_key());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = SlideConfig {
            api_key: Some("   ".to_string()),
            ..SlideConfig::default()
        };
        assert!(!config.has_api_key());
        assert!(!SlideConfig::default().has_api_key());
    }

    #[tokio::test]
    async fn loads_partial_toml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("slidegen.toml");
        tokio::fs::write(&toml_path, "model = \"gemini-pro\"\nsegment_mode = \"markers\"\n")
            .await
            .unwrap();
        let config = SlideConfig::load_from_file(&toml_path).await.unwrap();
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.segment_mode, SegmentMode::Markers);
        assert_eq!(config.max_chunk_chars, DEFAULT_MAX_CHUNK_CHARS);

        let json_path = dir.path().join("slidegen.json");
        tokio::fs::write(&json_path, r#"{"max_chunk_chars": 300}"#)
            .await
            .unwrap();
        let config = SlideConfig::load_from_file(&json_path).await.unwrap();
        assert_eq!(config.max_chunk_chars, 300);
        assert_eq!(config.segment_mode, SegmentMode::FixedLength);
    }

    #[tokio::test]
    async fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = SlideConfig {
            model: "gemini-pro".to_string(),
            max_chunk_chars: 700,
            ..SlideConfig::default()
        };

        config.save_to_file(&path).await.unwrap();
        let loaded = SlideConfig::load_from_file(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = SlideConfig::load_from_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
