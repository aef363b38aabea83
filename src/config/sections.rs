// Config groups
// One record per pipeline stage. Every bounded field is checked by the group's
// `check_fields`, which the root config runs on load and on every mutation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths;
use super::validation::{check_min, check_optional_min, check_optional_range, check_range};
use crate::constants::{self, MAX_WEIGHT_SUM, WEIGHT_SUM_EPSILON};
use crate::error::{ValidationError, ValidationErrors};

/// A named group of fields with its own bound checks.
pub trait ConfigSection {
    /// Dotted path of the group inside the root config.
    const GROUP: &'static str;

    /// Append every violated constraint, with field paths under `prefix`.
    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>);

    /// Validate this group on its own.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        self.check_fields(Self::GROUP, &mut errors);
        ValidationErrors::into_result(errors)
    }
}

/// Computation device preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[serde(alias = "CPU")]
    Cpu,
    #[serde(alias = "GPU")]
    Gpu,
    #[serde(alias = "AUTO")]
    Auto,
}

impl Default for Device {
    fn default() -> Self {
        Device::Auto
    }
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Gpu => "gpu",
            Device::Auto => "auto",
        }
    }
}

/// Logging levels, spelled the way config files write them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[serde(alias = "debug")]
    Debug,
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "warning", alias = "WARN", alias = "warn")]
    Warning,
    #[serde(alias = "error")]
    Error,
    #[serde(alias = "critical")]
    Critical,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// The `log` crate has no critical level, so it folds into Error.
    pub fn as_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => log::LevelFilter::Error,
        }
    }
}

/// Output image encoding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[serde(alias = "PNG")]
    Png,
    #[serde(alias = "JPEG", alias = "jpg", alias = "JPG")]
    Jpeg,
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Jpeg
    }
}

impl ImageFormat {
    /// File extension used for generated images, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// AI model selection and inference settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub face_detection_model: String,
    pub pose_estimation_model: String,
    pub head_pose_model: String,
    pub device: Device,
    pub batch_size: u32,
    pub confidence_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detection_model: constants::DEFAULT_FACE_DETECTION_MODEL.to_string(),
            pose_estimation_model: constants::DEFAULT_POSE_ESTIMATION_MODEL.to_string(),
            head_pose_model: constants::DEFAULT_HEAD_POSE_MODEL.to_string(),
            device: Device::Auto,
            batch_size: constants::DEFAULT_BATCH_SIZE,
            confidence_threshold: constants::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ConfigSection for ModelConfig {
    const GROUP: &'static str = "models";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(errors, prefix, "batch_size", self.batch_size, 1, 64);
        check_range(errors, prefix, "confidence_threshold", self.confidence_threshold, 0.0, 1.0);
    }
}

/// Keyframe and temporal sampling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FrameExtractionConfig {
    /// Seconds between temporal samples
    pub temporal_sampling_interval: f64,
    pub enable_keyframe_detection: bool,
    pub enable_temporal_sampling: bool,
    /// None means unlimited
    pub max_frames_per_video: Option<u32>,
    pub deduplication_enabled: bool,
}

impl Default for FrameExtractionConfig {
    fn default() -> Self {
        Self {
            temporal_sampling_interval: 0.25,
            enable_keyframe_detection: true,
            enable_temporal_sampling: true,
            max_frames_per_video: None,
            deduplication_enabled: true,
        }
    }
}

impl ConfigSection for FrameExtractionConfig {
    const GROUP: &'static str = "frame_extraction";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(
            errors,
            prefix,
            "temporal_sampling_interval",
            self.temporal_sampling_interval,
            0.1,
            2.0,
        );
        check_optional_min(errors, prefix, "max_frames_per_video", self.max_frames_per_video, 10);
    }
}

/// Image quality gates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Laplacian variance floor
    pub blur_threshold: f64,
    pub brightness_min: f64,
    pub brightness_max: f64,
    pub contrast_min: f64,
    pub enable_multiple_metrics: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            blur_threshold: 100.0,
            brightness_min: 30.0,
            brightness_max: 225.0,
            contrast_min: 20.0,
            enable_multiple_metrics: true,
        }
    }
}

impl ConfigSection for QualityConfig {
    const GROUP: &'static str = "quality";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_min(errors, prefix, "blur_threshold", self.blur_threshold, 10.0);
        check_range(errors, prefix, "brightness_min", self.brightness_min, 0.0, 255.0);
        check_range(errors, prefix, "brightness_max", self.brightness_max, 0.0, 255.0);
        check_min(errors, prefix, "contrast_min", self.contrast_min, 0.0);
    }
}

/// Hip-knee angle thresholds, in degrees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PoseClassificationConfig {
    pub standing_hip_knee_angle_min: f64,
    pub sitting_hip_knee_angle_min: f64,
    pub sitting_hip_knee_angle_max: f64,
    pub squatting_hip_knee_angle_max: f64,
    /// Face area ratio above which a frame counts as a closeup
    pub closeup_face_area_threshold: f64,
}

impl Default for PoseClassificationConfig {
    fn default() -> Self {
        Self {
            standing_hip_knee_angle_min: 160.0,
            sitting_hip_knee_angle_min: 80.0,
            sitting_hip_knee_angle_max: 120.0,
            squatting_hip_knee_angle_max: 90.0,
            closeup_face_area_threshold: 0.15,
        }
    }
}

impl ConfigSection for PoseClassificationConfig {
    const GROUP: &'static str = "pose_classification";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(
            errors,
            prefix,
            "standing_hip_knee_angle_min",
            self.standing_hip_knee_angle_min,
            120.0,
            180.0,
        );
        check_range(
            errors,
            prefix,
            "sitting_hip_knee_angle_min",
            self.sitting_hip_knee_angle_min,
            45.0,
            120.0,
        );
        check_range(
            errors,
            prefix,
            "sitting_hip_knee_angle_max",
            self.sitting_hip_knee_angle_max,
            80.0,
            160.0,
        );
        check_range(
            errors,
            prefix,
            "squatting_hip_knee_angle_max",
            self.squatting_hip_knee_angle_max,
            45.0,
            120.0,
        );
        check_range(
            errors,
            prefix,
            "closeup_face_area_threshold",
            self.closeup_face_area_threshold,
            0.05,
            0.5,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HeadAngleConfig {
    pub yaw_threshold_degrees: f64,
    pub pitch_threshold_degrees: f64,
    pub max_roll_degrees: f64,
    pub profile_yaw_threshold: f64,
}

impl Default for HeadAngleConfig {
    fn default() -> Self {
        Self {
            yaw_threshold_degrees: 22.5,
            pitch_threshold_degrees: 22.5,
            max_roll_degrees: 30.0,
            profile_yaw_threshold: 67.5,
        }
    }
}

impl ConfigSection for HeadAngleConfig {
    const GROUP: &'static str = "head_angle";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(
            errors,
            prefix,
            "yaw_threshold_degrees",
            self.yaw_threshold_degrees,
            10.0,
            45.0,
        );
        check_range(
            errors,
            prefix,
            "pitch_threshold_degrees",
            self.pitch_threshold_degrees,
            10.0,
            45.0,
        );
        check_range(errors, prefix, "max_roll_degrees", self.max_roll_degrees, 15.0, 60.0);
        check_range(
            errors,
            prefix,
            "profile_yaw_threshold",
            self.profile_yaw_threshold,
            45.0,
            90.0,
        );
    }
}

/// Face area ratio thresholds for shot type classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CloseupDetectionConfig {
    pub extreme_closeup_threshold: f64,
    pub closeup_threshold: f64,
    pub medium_closeup_threshold: f64,
    pub medium_shot_threshold: f64,
    pub shoulder_width_threshold: f64,
    pub enable_composition_analysis: bool,
    /// Uses inter-ocular distance
    pub enable_distance_estimation: bool,
}

impl Default for CloseupDetectionConfig {
    fn default() -> Self {
        Self {
            extreme_closeup_threshold: 0.25,
            closeup_threshold: 0.15,
            medium_closeup_threshold: 0.08,
            medium_shot_threshold: 0.03,
            shoulder_width_threshold: 0.35,
            enable_composition_analysis: true,
            enable_distance_estimation: true,
        }
    }
}

impl ConfigSection for CloseupDetectionConfig {
    const GROUP: &'static str = "closeup_detection";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(
            errors,
            prefix,
            "extreme_closeup_threshold",
            self.extreme_closeup_threshold,
            0.15,
            0.5,
        );
        check_range(errors, prefix, "closeup_threshold", self.closeup_threshold, 0.08, 0.3);
        check_range(
            errors,
            prefix,
            "medium_closeup_threshold",
            self.medium_closeup_threshold,
            0.04,
            0.15,
        );
        check_range(
            errors,
            prefix,
            "medium_shot_threshold",
            self.medium_shot_threshold,
            0.01,
            0.08,
        );
        check_range(
            errors,
            prefix,
            "shoulder_width_threshold",
            self.shoulder_width_threshold,
            0.2,
            0.6,
        );
    }
}

/// Frame ranking weights and thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FrameSelectionConfig {
    pub min_quality_threshold: f64,
    pub face_size_weight: f64,
    pub quality_weight: f64,
    pub diversity_threshold: f64,
}

impl Default for FrameSelectionConfig {
    fn default() -> Self {
        Self {
            min_quality_threshold: 0.2,
            face_size_weight: 0.3,
            quality_weight: 0.7,
            diversity_threshold: 0.8,
        }
    }
}

impl FrameSelectionConfig {
    pub fn weight_sum(&self) -> f64 {
        self.face_size_weight + self.quality_weight
    }
}

impl ConfigSection for FrameSelectionConfig {
    const GROUP: &'static str = "frame_selection";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(errors, prefix, "min_quality_threshold", self.min_quality_threshold, 0.0, 1.0);
        check_range(errors, prefix, "face_size_weight", self.face_size_weight, 0.0, 1.0);
        check_range(errors, prefix, "quality_weight", self.quality_weight, 0.0, 1.0);
        check_range(errors, prefix, "diversity_threshold", self.diversity_threshold, 0.0, 1.0);

        if self.weight_sum() > MAX_WEIGHT_SUM + WEIGHT_SUM_EPSILON {
            errors.push(ValidationError::new(
                super::validation::field_path(prefix, "quality_weight"),
                format!(
                    "face_size_weight ({}) + quality_weight ({}) must not exceed {}",
                    self.face_size_weight, self.quality_weight, MAX_WEIGHT_SUM
                ),
            ));
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PngConfig {
    pub optimize: bool,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self { optimize: true }
    }
}

impl ConfigSection for PngConfig {
    const GROUP: &'static str = "output.image.png";

    fn check_fields(&self, _prefix: &str, _errors: &mut Vec<ValidationError>) {}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    pub quality: u32,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: constants::DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ConfigSection for JpegConfig {
    const GROUP: &'static str = "output.image.jpeg";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(errors, prefix, "quality", self.quality, 70, 100);
    }
}

/// Generated image settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputImageConfig {
    pub format: ImageFormat,
    pub face_crop_enabled: bool,
    pub full_frame_enabled: bool,
    /// Fraction of the face box added on each side
    pub face_crop_padding: f64,
    /// Longest side after proportional resize; None keeps the source size
    pub resize: Option<u32>,
    pub png: PngConfig,
    pub jpeg: JpegConfig,
}

impl Default for OutputImageConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            face_crop_enabled: true,
            full_frame_enabled: true,
            face_crop_padding: 0.2,
            resize: None,
            png: PngConfig::default(),
            jpeg: JpegConfig::default(),
        }
    }
}

impl ConfigSection for OutputImageConfig {
    const GROUP: &'static str = "output.image";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(errors, prefix, "face_crop_padding", self.face_crop_padding, 0.0, 1.0);
        check_optional_range(errors, prefix, "resize", self.resize, 256, 4096);
        self.png.check_fields(&super::validation::field_path(prefix, "png"), errors);
        self.jpeg.check_fields(&super::validation::field_path(prefix, "jpeg"), errors);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Frames to emit per pose/angle category
    pub min_frames_per_category: u32,
    pub preserve_metadata: bool,
    pub image: OutputImageConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_frames_per_category: 3,
            preserve_metadata: true,
            image: OutputImageConfig::default(),
        }
    }
}

impl ConfigSection for OutputConfig {
    const GROUP: &'static str = "output";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_range(errors, prefix, "min_frames_per_category", self.min_frames_per_category, 1, 10);
        self.image.check_fields(&super::validation::field_path(prefix, "image"), errors);
    }
}

/// Cache and temp directory handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(
        deserialize_with = "paths::deserialize_path",
        serialize_with = "paths::serialize_path"
    )]
    pub cache_directory: PathBuf,
    /// None lets the pipeline pick one per run
    #[serde(
        deserialize_with = "paths::deserialize_optional_path",
        serialize_with = "paths::serialize_optional_path"
    )]
    pub temp_directory: Option<PathBuf>,
    pub cleanup_temp_on_success: bool,
    pub cleanup_temp_on_failure: bool,
    /// Overrides both cleanup flags
    pub keep_temp: bool,
    pub force_temp_cleanup: bool,
    pub max_cache_size_gb: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_directory: default_cache_directory(),
            temp_directory: None,
            cleanup_temp_on_success: true,
            cleanup_temp_on_failure: false,
            keep_temp: false,
            force_temp_cleanup: false,
            max_cache_size_gb: constants::DEFAULT_MAX_CACHE_SIZE_GB,
        }
    }
}

impl ConfigSection for StorageConfig {
    const GROUP: &'static str = "storage";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        if self.cache_directory.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                super::validation::field_path(prefix, "cache_directory"),
                "path must not be empty",
            ));
        }
        check_range(errors, prefix, "max_cache_size_gb", self.max_cache_size_gb, 0.5, 50.0);
    }
}

/// Platform user cache dir (e.g. `~/.cache/personfromvid` on Linux)
pub fn default_cache_directory() -> PathBuf {
    directories::ProjectDirs::from("", constants::APP_ORGANIZATION, constants::APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join(constants::APP_NAME))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    pub enable_resume: bool,
    pub save_intermediate_results: bool,
    /// None means unlimited
    pub max_processing_time_minutes: Option<u32>,
    pub parallel_workers: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            enable_resume: true,
            save_intermediate_results: true,
            max_processing_time_minutes: None,
            parallel_workers: 1,
        }
    }
}

impl ConfigSection for ProcessingConfig {
    const GROUP: &'static str = "processing";

    fn check_fields(&self, prefix: &str, errors: &mut Vec<ValidationError>) {
        check_optional_min(
            errors,
            prefix,
            "max_processing_time_minutes",
            self.max_processing_time_minutes,
            1,
        );
        check_range(errors, prefix, "parallel_workers", self.parallel_workers, 1, 16);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub enable_file_logging: bool,
    /// None falls back to `<cache>/logs/personfromvid.log`
    #[serde(
        deserialize_with = "paths::deserialize_optional_path",
        serialize_with = "paths::serialize_optional_path"
    )]
    pub log_file: Option<PathBuf>,
    pub enable_rich_console: bool,
    pub enable_structured_output: bool,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            enable_file_logging: false,
            log_file: None,
            enable_rich_console: true,
            enable_structured_output: true,
            verbose: false,
        }
    }
}

impl LoggingConfig {
    /// `verbose` wins over the configured level.
    pub fn effective_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            self.level.as_level_filter()
        }
    }
}

impl ConfigSection for LoggingConfig {
    const GROUP: &'static str = "logging";

    // Enum and path fields are checked by their types.
    fn check_fields(&self, _prefix: &str, _errors: &mut Vec<ValidationError>) {}
}
