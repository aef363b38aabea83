// Person From Vid - Output Naming
// Turns frame metadata into descriptive, collision-free image filenames.
//
// Full frame: {base}_{category}_{head-direction}_{shot-type}_{rank:03}.{ext}
//             (empty components and their separators are dropped)
// Face crop:  {base}_face_{head-angle}_{rank:03}.{ext}
// Collision:  {stem}_{seq:03}.{ext}
//
// One engine per run. Its issued-name state is never shared or persisted.


use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::constants::{
    FACE_CROP_TAG, FILENAME_SEPARATOR, INVALID_FILENAME_CHARS, MAX_COLLISION_SEQUENCE,
    MAX_FILENAME_LENGTH,
};
use crate::data::{FrameData, ProcessingContext};
use crate::error::{PfvError, Result};

#[derive(Debug, Clone)]
pub struct NamingEngine {
    video_base_name: String,
    output_directory: PathBuf,
    used_filenames: HashSet<String>,
    /// Highest sequence number issued per stem
    sequence_counters: HashMap<String, u32>,
}

impl NamingEngine {
    pub fn new(context: &ProcessingContext) -> Self {
        Self {
            video_base_name: context.video_base_name.clone(),
            output_directory: context.output_directory.clone(),
            used_filenames: HashSet::new(),
            sequence_counters: HashMap::new(),
        }
    }

    pub fn video_base_name(&self) -> &str {
        &self.video_base_name
    }

    /// Filename for a full-frame image.
    pub fn get_full_frame_filename(
        &mut self,
        frame: &FrameData,
        category: &str,
        rank: u32,
        extension: &str,
    ) -> Result<String> {
        let head_direction = head_direction(frame);
        let shot_type = shot_type(frame);
        let rank = format!("{:03}", rank);

        let parts = [
            self.video_base_name.as_str(),
            category,
            head_direction.as_str(),
            shot_type.as_str(),
            rank.as_str(),
        ];
        let base = parts
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(FILENAME_SEPARATOR);

        self.ensure_unique_filename(format!("{}.{}", base, extension))
    }

    /// Filename for a cropped face image. All four components are always present.
    pub fn get_face_crop_filename(
        &mut self,
        _frame: &FrameData,
        head_angle: &str,
        rank: u32,
        extension: &str,
    ) -> Result<String> {
        let rank = format!("{:03}", rank);
        let base = [self.video_base_name.as_str(), FACE_CROP_TAG, head_angle, rank.as_str()]
            .join(FILENAME_SEPARATOR);

        self.ensure_unique_filename(format!("{}.{}", base, extension))
    }

    /// Join a filename onto the output directory. No filesystem access.
    pub fn get_full_output_path(&self, filename: &str) -> PathBuf {
        self.output_directory.join(filename)
    }

    /// True if `filename` is safe to write and belongs to this run.
    pub fn validate_filename(&self, filename: &str) -> bool {
        if filename.is_empty() {
            return false;
        }

        if filename.chars().any(|c| INVALID_FILENAME_CHARS.contains(&c)) {
            return false;
        }

        if filename.chars().count() > MAX_FILENAME_LENGTH {
            return false;
        }

        filename.starts_with(&self.video_base_name)
    }

    /// Forget every issued name and counter.
    pub fn reset_counters(&mut self) {
        self.used_filenames.clear();
        self.sequence_counters.clear();
    }

    pub fn issued_count(&self) -> usize {
        self.used_filenames.len()
    }

    /// Claim `candidate` if unused, otherwise the next free `{stem}_{seq:03}{ext}`.
    /// Sequence numbers per stem only ever grow.
    fn ensure_unique_filename(&mut self, candidate: String) -> Result<String> {
        if !self.used_filenames.contains(&candidate) {
            self.used_filenames.insert(candidate.clone());
            return Ok(candidate);
        }

        let (stem, ext) = split_extension(&candidate);
        let mut sequence = self.sequence_counters.get(stem).copied().unwrap_or(0) + 1;

        while sequence <= MAX_COLLISION_SEQUENCE {
            let filename = format!("{}_{:03}{}", stem, sequence, ext);
            if !self.used_filenames.contains(&filename) {
                log::debug!("Filename collision on {}, using {}", candidate, filename);
                self.used_filenames.insert(filename.clone());
                self.sequence_counters.insert(stem.to_string(), sequence);
                return Ok(filename);
            }
            sequence += 1;
        }

        Err(PfvError::Naming(format!(
            "no free sequence number for {} (limit {})",
            candidate, MAX_COLLISION_SEQUENCE
        )))
    }
}

/// Best head pose direction, filename-safe. Empty if unknown.
fn head_direction(frame: &FrameData) -> String {
    frame
        .get_best_head_pose()
        .and_then(|pose| pose.direction.as_deref())
        .map(filename_label)
        .unwrap_or_default()
}

/// First non-empty shot type, filename-safe. Empty if unknown.
fn shot_type(frame: &FrameData) -> String {
    frame
        .closeup_detections
        .iter()
        .filter_map(|c| c.shot_type.as_deref())
        .find(|s| !s.is_empty())
        .map(filename_label)
        .unwrap_or_default()
}

/// "Looking Left" -> "looking-left"
fn filename_label(label: &str) -> String {
    label.replace(' ', "-").to_lowercase()
}

/// Split at the last dot into (stem, ".ext"). A leading or trailing dot is
/// part of the stem.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < filename.len() => filename.split_at(idx),
        _ => (filename, ""),
    }
}
