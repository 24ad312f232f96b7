//! Configuration loading and precedence: CLI > Env > File > Defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::Transition;
use crate::utils::logging::LogLevel;

/// Config file picked up from the current directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "concatx.toml";

/// Encoder settings for rendered transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub crf: u8,
    pub preset: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 18,
            preset: "medium".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Upper bound on concurrent engine processes
    pub max_concurrency: usize,
    /// Directory for fragments; a temporary directory when unset
    pub work_dir: Option<PathBuf>,
    /// Keep fragments and the concat list after the run
    pub keep_fragments: bool,
    /// Replace an existing output file
    pub overwrite: bool,
    pub log_level: LogLevel,
    pub render: RenderSettings,
    /// Transition used when the command line gives none
    pub transition: Option<Transition>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            max_concurrency: num_cpus::get().max(1),
            work_dir: None,
            keep_fragments: false,
            overwrite: false,
            log_level: LogLevel::Info,
            render: RenderSettings::default(),
            transition: None,
        }
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSource {
    /// Config file that was read, if any
    pub file: Option<PathBuf>,
    /// Number of `CONCATX_*` variables applied on top
    pub env_overrides: usize,
}

impl ConfigSource {
    pub fn log(&self) {
        match &self.file {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => debug!("No config file found, using defaults"),
        }
        if self.env_overrides > 0 {
            debug!("Applied {} environment variable overrides", self.env_overrides);
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Read a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Config file to read: `explicit`, else `concatx.toml` in the current directory if present
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                default.exists().then(|| default.to_path_buf())
            }
        }
    }

    /// Defaults, then the config file, then `CONCATX_*` environment variables
    ///
    /// Runs before logging is installed, so what was loaded is returned as a
    /// [`ConfigSource`] to be logged afterwards.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), DomainError> {
        let file = Self::locate(explicit);
        let mut config = match &file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let env_overrides = config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok((config, ConfigSource { file, env_overrides }))
    }

    /// Apply environment overrides through `lookup`; returns how many applied
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = 0;

        if let Some(value) = lookup("CONCATX_FFMPEG") {
            self.ffmpeg_path = PathBuf::from(value);
            overrides += 1;
        }
        if let Some(value) = lookup("CONCATX_FFPROBE") {
            self.ffprobe_path = PathBuf::from(value);
            overrides += 1;
        }
        if let Some(value) = lookup("CONCATX_MAX_CONCURRENCY") {
            self.max_concurrency = value.trim().parse().map_err(|_| {
                DomainError::Config(format!("CONCATX_MAX_CONCURRENCY '{}' is not a number", value))
            })?;
            overrides += 1;
        }
        if let Some(value) = lookup("CONCATX_WORK_DIR") {
            self.work_dir = Some(PathBuf::from(value));
            overrides += 1;
        }
        if let Some(value) = lookup("CONCATX_KEEP_FRAGMENTS") {
            self.keep_fragments = parse_bool("CONCATX_KEEP_FRAGMENTS", &value)?;
            overrides += 1;
        }
        if let Some(value) = lookup("CONCATX_OVERWRITE") {
            self.overwrite = parse_bool("CONCATX_OVERWRITE", &value)?;
            overrides += 1;
        }
        if let Some(value) = lookup("CONCATX_LOG_LEVEL") {
            self.log_level = LogLevel::parse(&value).ok_or_else(|| {
                DomainError::Config(format!("CONCATX_LOG_LEVEL '{}' is not a log level", value))
            })?;
            overrides += 1;
        }

        Ok(overrides)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_concurrency == 0 {
            return Err(DomainError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.render.crf > 51 {
            return Err(DomainError::Config("crf cannot exceed 51".to_string()));
        }
        if let Some(transition) = &self.transition {
            if transition.duration_ms == 0 {
                return Err(DomainError::Config(
                    "default transition needs a non-zero duration_ms".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DomainError::Config(format!(
            "{} '{}' is not a boolean",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(config.max_concurrency >= 1);
        assert!(!config.keep_fragments);
        assert!(config.transition.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            max_concurrency = 2
            log_level = "debug"

            [render]
            crf = 23

            [transition]
            name = "wipeleft"
            duration_ms = 750
            "#,
        )
        .unwrap();

        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.render.crf, 23);
        assert_eq!(config.render.preset, "medium");
        assert_eq!(config.transition, Some(Transition::new("wipeleft", 750)));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("max_concurrency = \"many\""),
            Err(DomainError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CONCATX_FFPROBE", "/usr/local/bin/ffprobe"),
            ("CONCATX_MAX_CONCURRENCY", "3"),
            ("CONCATX_KEEP_FRAGMENTS", "yes"),
            ("CONCATX_OVERWRITE", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        let applied = config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.ffprobe_path, PathBuf::from("/usr/local/bin/ffprobe"));
        assert_eq!(config.max_concurrency, 3);
        assert!(config.keep_fragments);
        assert!(config.overwrite);
        assert_eq!(applied, 4);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env(|key| (key == "CONCATX_KEEP_FRAGMENTS").then(|| "maybe".to_string()))
            .is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = AppConfig {
            max_concurrency: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_rejects_bad_overwrite() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env(|key| (key == "CONCATX_OVERWRITE").then(|| "sometimes".to_string()))
            .is_err());
        assert!(!config.overwrite);
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let explicit = PathBuf::from("/etc/concatx/custom.toml");
        assert_eq!(AppConfig::locate(Some(&explicit)), Some(explicit));
    }
}
