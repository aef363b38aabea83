// Config model tests: load/save, bounds, cross-field weights, env overlay, provisioning

use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::error::PfvError;

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn validation_errors(result: Result<Config>) -> ValidationErrors {
    match result {
        Err(PfvError::Validation(errs)) => errs,
        Err(other) => panic!("expected validation error, got {:?}", other),
        Ok(_) => panic!("expected validation error, got Ok"),
    }
}

/// Default config with the cache pointed inside a scratch dir
fn scratch_config(tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config
        .update(|s| s.storage.cache_directory = tmp.path().join("cache"))
        .unwrap();
    config
}

// ---------------------------------------------------------------
// Defaults and bounds
// ---------------------------------------------------------------

#[test]
fn test_defaults_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());

    let config = Config::default();
    assert_eq!(config.models.device, Device::Auto);
    assert_eq!(config.models.batch_size, 1);
    assert_eq!(config.output.image.format, ImageFormat::Jpeg);
    assert_eq!(config.output.image.jpeg.quality, 95);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(config.storage.temp_directory.is_none());
    assert!(config
        .storage
        .cache_directory
        .to_string_lossy()
        .contains("personfromvid"));
}

#[test]
fn test_batch_size_bounds() {
    for bad in [0, 65] {
        let models = ModelConfig {
            batch_size: bad,
            ..Default::default()
        };
        let errs = models.validate().unwrap_err();
        assert!(errs.mentions("models.batch_size"), "batch_size={} should fail", bad);
    }

    for good in [1, 64] {
        let models = ModelConfig {
            batch_size: good,
            ..Default::default()
        };
        assert!(models.validate().is_ok(), "batch_size={} should pass", good);
    }
}

#[test]
fn test_optional_fields_bounded_only_when_set() {
    let mut config = Config::default();
    assert!(config.update(|s| s.frame_extraction.max_frames_per_video = Some(10)).is_ok());
    assert!(config.update(|s| s.output.image.resize = Some(4096)).is_ok());

    let err = config.update(|s| s.output.image.resize = Some(100)).unwrap_err();
    assert!(err.to_string().contains("output.image.resize"));

    let err = config.update(|s| s.processing.max_processing_time_minutes = Some(0)).unwrap_err();
    assert!(err.to_string().contains("processing.max_processing_time_minutes"));
}

#[test]
fn test_all_violations_reported_together() {
    let mut settings = Settings::default();
    settings.models.confidence_threshold = 1.5;
    settings.output.image.jpeg.quality = 50;
    settings.processing.parallel_workers = 0;

    let errs = settings.validate().unwrap_err();
    assert_eq!(errs.errors().len(), 3);
    assert!(errs.mentions("models.confidence_threshold"));
    assert!(errs.mentions("output.image.jpeg.quality"));
    assert!(errs.mentions("processing.parallel_workers"));
    assert!(Config::new(settings).is_err());
}

// ---------------------------------------------------------------
// Cross-field weight constraint
// ---------------------------------------------------------------

#[test]
fn test_weight_sum_checked_on_each_assignment() {
    let mut config = Config::default();
    // Either weight is checked against the other's current value, so quality drops first
    config.update(|s| s.frame_selection.quality_weight = 0.3).unwrap();

    // 0.6 + 0.3 is fine
    config.update(|s| s.frame_selection.face_size_weight = 0.6).unwrap();

    // 0.6 + 0.5 = 1.1
    let err = config.update(|s| s.frame_selection.quality_weight = 0.5).unwrap_err();
    assert!(matches!(err, PfvError::Validation(_)));
    assert!(err.to_string().contains("must not exceed 1"));
    assert_eq!(config.frame_selection.quality_weight, 0.3, "failed update must not stick");

    config.update(|s| s.frame_selection.quality_weight = 0.4).unwrap();
    assert_eq!(config.frame_selection.weight_sum(), 1.0);
}

#[test]
fn test_raising_face_weight_uses_current_quality_weight() {
    let mut config = Config::default();
    // default quality_weight is 0.7
    let err = config.update(|s| s.frame_selection.face_size_weight = 0.6).unwrap_err();
    assert!(err.to_string().contains("frame_selection.quality_weight"));
    assert_eq!(config.frame_selection.face_size_weight, 0.3);
}

#[test]
fn test_weight_sum_checked_in_standalone_section() {
    let section = FrameSelectionConfig {
        face_size_weight: 0.6,
        quality_weight: 0.5,
        ..Default::default()
    };
    assert!(section.validate().is_err());
}

#[test]
fn test_set_by_key_revalidates() {
    let mut config = Config::default();
    config.set("frame_selection.quality_weight", "0.3").unwrap();
    config.set("frame_selection.face_size_weight", "0.6").unwrap();
    assert!(config.set("frame_selection.quality_weight", "0.5").is_err());
    assert_eq!(config.frame_selection.quality_weight, 0.3);

    config.set("models.device", "GPU").unwrap();
    assert_eq!(config.models.device, Device::Gpu);

    let err = config.set("models.no_such_field", "1").unwrap_err();
    assert!(err.to_string().contains("unknown configuration key"));
}

// ---------------------------------------------------------------
// File load / save
// ---------------------------------------------------------------

#[test]
fn test_yaml_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.yaml");

    let mut config = scratch_config(&tmp);
    config
        .update(|s| {
            s.models.device = Device::Cpu;
            s.models.batch_size = 8;
            s.storage.temp_directory = Some(PathBuf::from("/tmp/pfv-temp"));
            s.logging.level = LogLevel::Warning;
            s.logging.log_file = Some(PathBuf::from("/tmp/pfv-logs/run.log"));
            s.output.image.resize = Some(1024);
            s.frame_extraction.temporal_sampling_interval = 0.3;
        })
        .unwrap();

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip_of_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("config.json");

    let config = Config::default();
    config.to_file(&path).unwrap();
    assert_eq!(Config::from_file(&path).unwrap(), config);
}

#[test]
fn test_saved_file_uses_plain_strings() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.yml");
    let config = scratch_config(&tmp);
    config.to_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("device: auto"));
    assert!(text.contains("level: INFO"));
    assert!(text.contains("format: jpeg"));
    assert!(text.contains(&format!("cache_directory: {}", tmp.path().join("cache").display())));

    let rendered = config.render(ConfigFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(json["models"]["device"], json!("auto"));
    assert_eq!(json["logging"]["level"], json!("INFO"));
    assert!(json["storage"]["cache_directory"].is_string());
}

#[test]
fn test_partial_file_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("partial.yaml");
    std::fs::write(
        &path,
        "models:\n  batch_size: 4\n  device: GPU\nlogging:\n  level: debug\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.models.batch_size, 4);
    assert_eq!(config.models.device, Device::Gpu);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.quality, QualityConfig::default());
}

#[test]
fn test_empty_yaml_is_all_defaults() {
    let config = Config::parse("", ConfigFormat::Yaml).unwrap();
    assert_eq!(config.models, ModelConfig::default());
}

#[test]
fn test_missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = Config::from_file(&tmp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, PfvError::NotFound(_)));
}

#[test]
fn test_unsupported_extension() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[models]\nbatch_size = 2\n").unwrap();

    assert!(matches!(Config::from_file(&path), Err(PfvError::UnsupportedFormat(_))));
    assert!(matches!(
        Config::default().to_file(&path),
        Err(PfvError::UnsupportedFormat(_))
    ));
    assert_eq!(ConfigFormat::from_path(&tmp.path().join("X.YML")).unwrap(), ConfigFormat::Yaml);
}

#[test]
fn test_out_of_range_file_value_names_field() {
    let errs = validation_errors(Config::from_value(json!({ "models": { "batch_size": 65 } })));
    assert!(errs.mentions("models.batch_size"));
}

#[test]
fn test_wrong_type_names_field() {
    let errs = validation_errors(Config::from_value(json!({ "models": { "batch_size": "four" } })));
    assert!(errs.mentions("models.batch_size"), "got {}", errs);
}

#[test]
fn test_unknown_keys_rejected() {
    let errs = validation_errors(Config::from_value(json!({ "models": { "batch": 2 } })));
    assert!(errs.to_string().contains("unknown field `batch`"), "got {}", errs);

    let errs = validation_errors(Config::from_value(json!({ "extras": {} })));
    assert!(errs.to_string().contains("extras"), "got {}", errs);
}

#[test]
fn test_bad_enum_and_empty_cache_path_rejected() {
    let errs = validation_errors(Config::from_value(json!({ "models": { "device": "tpu" } })));
    assert!(errs.mentions("models.device"));

    let errs =
        validation_errors(Config::from_value(json!({ "storage": { "cache_directory": "" } })));
    assert!(errs.mentions("storage.cache_directory"));
}

#[test]
fn test_empty_optional_path_means_unset() {
    let config = Config::from_value(json!({
        "storage": { "temp_directory": "" },
        "logging": { "log_file": null }
    }))
    .unwrap();
    assert!(config.storage.temp_directory.is_none());
    assert!(config.logging.log_file.is_none());
}

#[test]
fn test_serde_deserialize_validates() {
    let result: std::result::Result<Config, _> =
        serde_json::from_value(json!({ "processing": { "parallel_workers": 17 } }));
    assert!(result.is_err());
}

// ---------------------------------------------------------------
// Environment overlay and resolution
// ---------------------------------------------------------------

#[test]
fn test_env_overlay_nested_groups() {
    let config = Config::from_env_vars(env(&[
        ("PERSONFROMVID_MODELS__BATCH_SIZE", "4"),
        ("PERSONFROMVID_MODELS__DEVICE", "cpu"),
        ("PERSONFROMVID_OUTPUT__IMAGE__JPEG__QUALITY", "80"),
        ("PERSONFROMVID_OUTPUT__IMAGE__FORMAT", "png"),
        ("PERSONFROMVID_STORAGE__TEMP_DIRECTORY", "/tmp/pfv"),
        ("PERSONFROMVID_LOGGING__VERBOSE", "true"),
        ("UNRELATED", "1"),
    ]))
    .unwrap();

    assert_eq!(config.models.batch_size, 4);
    assert_eq!(config.models.device, Device::Cpu);
    assert_eq!(config.output.image.jpeg.quality, 80);
    assert_eq!(config.output.image.format, ImageFormat::Png);
    assert_eq!(config.storage.temp_directory, Some(PathBuf::from("/tmp/pfv")));
    assert!(config.logging.verbose);
}

#[test]
fn test_env_overlay_keeps_numeric_looking_strings() {
    let config =
        Config::from_env_vars(env(&[("PERSONFROMVID_MODELS__HEAD_POSE_MODEL", "2024")])).unwrap();
    assert_eq!(config.models.head_pose_model, "2024");
}

#[test]
fn test_env_overlay_path_fields_take_raw_text() {
    let config = Config::from_env_vars(env(&[
        ("PERSONFROMVID_STORAGE__TEMP_DIRECTORY", "/data/run #2"),
        ("PERSONFROMVID_LOGGING__LOG_FILE", "/var/log/a: b.log"),
    ]))
    .unwrap();
    assert_eq!(config.storage.temp_directory, Some(PathBuf::from("/data/run #2")));
    assert_eq!(config.logging.log_file, Some(PathBuf::from("/var/log/a: b.log")));

    let config =
        Config::from_env_vars(env(&[("PERSONFROMVID_STORAGE__TEMP_DIRECTORY", "2024")])).unwrap();
    assert_eq!(config.storage.temp_directory, Some(PathBuf::from("2024")));

    let config =
        Config::from_env_vars(env(&[("PERSONFROMVID_STORAGE__TEMP_DIRECTORY", "")])).unwrap();
    assert!(config.storage.temp_directory.is_none());
}

#[test]
fn test_set_path_fields_take_raw_text() {
    let mut config = Config::default();
    config.set("logging.log_file", "/var/log/a: b.log").unwrap();
    config.set("storage.temp_directory", "2024").unwrap();
    assert_eq!(config.logging.log_file, Some(PathBuf::from("/var/log/a: b.log")));
    assert_eq!(config.storage.temp_directory, Some(PathBuf::from("2024")));

    config.set("storage.temp_directory", "/data/run #2").unwrap();
    assert_eq!(config.storage.temp_directory, Some(PathBuf::from("/data/run #2")));
}

#[test]
fn test_env_overlay_validated() {
    let errs =
        validation_errors(Config::from_env_vars(env(&[("PERSONFROMVID_MODELS__BATCH_SIZE", "0")])));
    assert!(errs.mentions("models.batch_size"));

    let errs = validation_errors(Config::from_env_vars(env(&[
        ("PERSONFROMVID_FRAME_SELECTION__FACE_SIZE_WEIGHT", "0.6"),
        ("PERSONFROMVID_FRAME_SELECTION__QUALITY_WEIGHT", "0.5"),
    ])));
    assert!(errs.mentions("frame_selection.quality_weight"));
}

#[test]
fn test_env_unknown_variable_ignored() {
    let config = Config::from_env_vars(env(&[("PERSONFROMVID_MODELS__TURBO", "1")])).unwrap();
    assert_eq!(config.models, ModelConfig::default());
}

#[test]
fn test_load_config_prefers_existing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pfv.json");
    std::fs::write(&path, r#"{"processing": {"parallel_workers": 6}}"#).unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.processing.parallel_workers, 6);
}

#[test]
fn test_load_config_missing_path_falls_back() {
    let tmp = TempDir::new().unwrap();
    let config = load_config(Some(&tmp.path().join("none.yaml"))).unwrap();
    assert_eq!(config.output.min_frames_per_category, 3);
}

// ---------------------------------------------------------------
// Logging helpers
// ---------------------------------------------------------------

#[test]
fn test_log_level_mapping() {
    assert_eq!(LogLevel::Warning.as_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Critical.as_level_filter(), log::LevelFilter::Error);

    let logging = LoggingConfig {
        level: LogLevel::Error,
        verbose: true,
        ..Default::default()
    };
    assert_eq!(logging.effective_level(), log::LevelFilter::Debug);
}

#[test]
fn test_resolved_log_file() {
    let tmp = TempDir::new().unwrap();
    let mut config = scratch_config(&tmp);
    assert_eq!(config.resolved_log_file(), None);

    config.update(|s| s.logging.enable_file_logging = true).unwrap();
    assert_eq!(
        config.resolved_log_file(),
        Some(tmp.path().join("cache").join("logs").join("personfromvid.log"))
    );

    let custom = tmp.path().join("elsewhere").join("run.log");
    config.update(|s| s.logging.log_file = Some(custom.clone())).unwrap();
    assert_eq!(config.resolved_log_file(), Some(custom));
}

// ---------------------------------------------------------------
// Provisioning and readiness
// ---------------------------------------------------------------

#[test]
fn test_create_directories_idempotent() {
    let tmp = TempDir::new().unwrap();
    let mut config = scratch_config(&tmp);
    config
        .update(|s| {
            s.storage.temp_directory = Some(tmp.path().join("temp"));
            s.logging.log_file = Some(tmp.path().join("logs").join("pfv.log"));
        })
        .unwrap();

    config.create_directories().unwrap();
    config.create_directories().unwrap();

    assert!(tmp.path().join("cache").is_dir());
    assert!(tmp.path().join("temp").is_dir());
    assert!(tmp.path().join("logs").is_dir());
    assert!(!tmp.path().join("logs").join("pfv.log").exists());
}

#[test]
fn test_create_directories_reports_filesystem_error() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "not a dir").unwrap();

    let mut config = Config::default();
    config
        .update(|s| s.storage.cache_directory = blocker.join("cache"))
        .unwrap();

    assert!(matches!(
        config.create_directories(),
        Err(PfvError::Filesystem { .. })
    ));
}

#[test]
fn test_system_requirements_writable_cache() {
    let tmp = TempDir::new().unwrap();
    let mut config = scratch_config(&tmp);
    config.update(|s| s.storage.max_cache_size_gb = 0.5).unwrap();

    let issues = config.validate_system_requirements();
    assert!(
        !issues.iter().any(|i| i.contains("not writable")),
        "unexpected issues: {:?}",
        issues
    );
    assert!(!tmp.path().join("cache").join(".write_test").exists());
}

#[test]
fn test_system_requirements_unwritable_cache() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "not a dir").unwrap();

    let mut config = Config::default();
    config
        .update(|s| {
            s.storage.cache_directory = blocker.join("cache");
            s.storage.max_cache_size_gb = 0.5;
        })
        .unwrap();

    let issues = config.validate_system_requirements();
    assert!(issues.iter().any(|i| i.starts_with("Cache directory not writable")));
}
