// Person From Vid Constants
// Defaults shared by the config schema, the env overlay and the naming engine.

pub const APP_NAME: &str = "personfromvid";
pub const APP_ORGANIZATION: &str = "codeprimate";

// Environment overlay
pub const ENV_PREFIX: &str = "PERSONFROMVID_";
pub const ENV_NESTED_DELIMITER: &str = "__";
pub const KEY_PATH_DELIMITER: char = '.';
// Text fields whose default is null, so their type cannot be read off the default tree
pub const STRING_VALUED_KEYS: [&str; 2] = ["storage.temp_directory", "logging.log_file"];

// Models
pub const DEFAULT_FACE_DETECTION_MODEL: &str = "yolov8s-face";
pub const DEFAULT_POSE_ESTIMATION_MODEL: &str = "yolov8s-pose";
pub const DEFAULT_HEAD_POSE_MODEL: &str = "sixdrepnet";
pub const DEFAULT_BATCH_SIZE: u32 = 1;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

// Output images
pub const DEFAULT_JPEG_QUALITY: u32 = 95;

// Frame selection weights must not sum above 1.0 (tolerance absorbs float noise)
pub const MAX_WEIGHT_SUM: f64 = 1.0;
pub const WEIGHT_SUM_EPSILON: f64 = 1e-9;

// Storage
pub const DEFAULT_MAX_CACHE_SIZE_GB: f64 = 5.0;
pub const WRITE_TEST_FILENAME: &str = ".write_test";
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

// Logging
pub const LOGS_FOLDER: &str = "logs";
pub const DEFAULT_LOG_FILENAME: &str = "personfromvid.log";

// Naming
pub const FILENAME_SEPARATOR: &str = "_";
pub const FACE_CROP_TAG: &str = "face";
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";
pub const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MAX_COLLISION_SEQUENCE: u32 = 99_999;
