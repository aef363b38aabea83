// Person From Vid - Configuration Model
// Validated parameter tree for every pipeline stage.
// Sources: YAML/JSON file, or defaults overlaid with PERSONFROMVID_* env vars.
// A `Config` can only be obtained through validation, and every mutation
// re-validates before it takes effect.

pub mod env;
pub mod paths;
pub mod sections;
pub mod system;
mod validation;

#[cfg(test)]
mod tests;

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_LOG_FILENAME, KEY_PATH_DELIMITER, LOGS_FOLDER};
use crate::error::{PfvError, Result, ValidationError, ValidationErrors};

pub use sections::{
    CloseupDetectionConfig, ConfigSection, Device, FrameExtractionConfig, FrameSelectionConfig,
    HeadAngleConfig, ImageFormat, JpegConfig, LogLevel, LoggingConfig, ModelConfig, OutputConfig,
    OutputImageConfig, PngConfig, PoseClassificationConfig, ProcessingConfig, QualityConfig,
    StorageConfig,
};

/// On-disk config format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(PfvError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }
}

/// The unvalidated parameter tree. Build one freely, then pass it to `Config::new`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub models: ModelConfig,
    pub frame_extraction: FrameExtractionConfig,
    pub quality: QualityConfig,
    pub pose_classification: PoseClassificationConfig,
    pub head_angle: HeadAngleConfig,
    pub closeup_detection: CloseupDetectionConfig,
    pub frame_selection: FrameSelectionConfig,
    pub output: OutputConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Run every field and cross-field check across all groups.
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors: Vec<ValidationError> = Vec::new();
        self.models.check_fields(ModelConfig::GROUP, &mut errors);
        self.frame_extraction.check_fields(FrameExtractionConfig::GROUP, &mut errors);
        self.quality.check_fields(QualityConfig::GROUP, &mut errors);
        self.pose_classification.check_fields(PoseClassificationConfig::GROUP, &mut errors);
        self.head_angle.check_fields(HeadAngleConfig::GROUP, &mut errors);
        self.closeup_detection.check_fields(CloseupDetectionConfig::GROUP, &mut errors);
        self.frame_selection.check_fields(FrameSelectionConfig::GROUP, &mut errors);
        self.output.check_fields(OutputConfig::GROUP, &mut errors);
        self.storage.check_fields(StorageConfig::GROUP, &mut errors);
        self.processing.check_fields(ProcessingConfig::GROUP, &mut errors);
        self.logging.check_fields(LoggingConfig::GROUP, &mut errors);
        ValidationErrors::into_result(errors)
    }
}

/// A validated configuration. Read it through `Deref<Target = Settings>`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Config {
    settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        // Schema defaults sit inside every bound (see test_defaults_are_valid).
        Self {
            settings: Settings::default(),
        }
    }
}

impl Deref for Config {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.settings
    }
}

impl AsRef<Settings> for Config {
    fn as_ref(&self) -> &Settings {
        &self.settings
    }
}

impl TryFrom<Settings> for Config {
    type Error = PfvError;

    fn try_from(settings: Settings) -> Result<Self> {
        Config::new(settings)
    }
}

impl Config {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Build from a generic value tree (keys = group and field names).
    /// Type errors and unknown keys are reported against the dotted field path.
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        let settings: Settings = serde_path_to_error::deserialize(value).map_err(|err| {
            let field = match err.path().to_string() {
                p if p == "." => "config".to_string(),
                p => p,
            };
            ValidationErrors::single(field, err.into_inner().to_string())
        })?;

        Config::new(settings)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.settings)?)
    }

    /// Parse config text in the given format.
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self> {
        if contents.trim().is_empty() {
            return Config::from_value(Value::Null);
        }

        let value: Value = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
            ConfigFormat::Json => serde_json::from_str(contents)?,
        };
        Config::from_value(value)
    }

    /// Render in the given format. Enums and paths come out as plain strings.
    pub fn render(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(&self.settings)?),
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(&self.settings)?),
        }
    }

    /// Load configuration from a YAML or JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PfvError::NotFound(path.display().to_string()));
        }

        let format = ConfigFormat::from_path(path)?;
        let contents = fs::read_to_string(path)?;
        let config = Config::parse(&contents, format)?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML or JSON file, creating the parent directory.
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        let rendered = self.render(format)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, rendered)?;

        log::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Defaults overlaid with `PERSONFROMVID_<GROUP>__<FIELD>` variables from the process env.
    pub fn from_env() -> Result<Self> {
        Config::from_env_vars(std::env::vars())
    }

    /// Defaults overlaid with the given variables. Names without the prefix are skipped.
    pub fn from_env_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value = Config::default().to_value()?;
        let applied = env::overlay_env(&mut value, vars);
        if applied > 0 {
            log::debug!("Applied {} environment override(s)", applied);
        }
        Config::from_value(value)
    }

    /// Apply a mutation. It runs on a copy, and the copy replaces `self` only if
    /// every constraint still holds. On error `self` is unchanged.
    pub fn update<F>(&mut self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Settings),
    {
        let mut candidate = self.settings.clone();
        mutate(&mut candidate);
        candidate.validate()?;
        self.settings = candidate;
        Ok(())
    }

    /// Set one field from its text form, addressed by dotted key
    /// (e.g. `frame_selection.quality_weight`).
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let path: Vec<String> = key
            .split(KEY_PATH_DELIMITER)
            .map(|segment| segment.trim().to_ascii_lowercase())
            .collect();

        let mut value = self.to_value()?;
        if !env::assign(&mut value, &path, raw) {
            return Err(ValidationErrors::single(key, "unknown configuration key").into());
        }

        *self = Config::from_value(value)?;
        log::debug!("Config override {} = {}", key, raw);
        Ok(())
    }

    /// Where file logging writes, if it is enabled.
    pub fn resolved_log_file(&self) -> Option<PathBuf> {
        if !self.logging.enable_file_logging {
            return None;
        }
        Some(match &self.logging.log_file {
            Some(path) => path.clone(),
            None => self
                .storage
                .cache_directory
                .join(LOGS_FOLDER)
                .join(DEFAULT_LOG_FILENAME),
        })
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let settings = Settings::deserialize(deserializer)?;
        settings.validate().map_err(serde::de::Error::custom)?;
        Ok(Self { settings })
    }
}

/// Default configuration with environment variable overrides.
pub fn get_default_config() -> Result<Config> {
    Config::from_env()
}

/// Load from `path` when it is given and exists, otherwise from defaults plus env.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) if p.exists() => Config::from_file(p),
        Some(p) => {
            log::debug!("Config file {} not found, using defaults and environment", p.display());
            get_default_config()
        }
        None => get_default_config(),
    }
}
