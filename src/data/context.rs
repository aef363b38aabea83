// Run-scoped context shared by output stages

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What the output stage needs to know about the current run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingContext {
    /// Stem used as the filename prefix (usually the video file stem)
    pub video_base_name: String,
    /// Where generated images go. Created by the pipeline driver, not here.
    pub output_directory: PathBuf,
}

impl ProcessingContext {
    pub fn new(video_base_name: impl Into<String>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            video_base_name: video_base_name.into(),
            output_directory: output_directory.into(),
        }
    }

    /// Context for a video file: the base name is the file stem.
    pub fn for_video(video_path: &Path, output_directory: impl Into<PathBuf>) -> Self {
        let base = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        Self::new(base, output_directory)
    }
}
