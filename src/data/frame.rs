// Per-frame detection results

use serde::{Deserialize, Serialize};

/// Head orientation estimate for one detected face
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeadPoseResult {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub confidence: f64,
    /// Classified direction label (e.g. "front", "looking left")
    pub direction: Option<String>,
}

/// Shot framing classification for one detected face
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CloseupDetection {
    /// e.g. "closeup", "medium shot"
    pub shot_type: Option<String>,
    pub confidence: f64,
    pub face_area_ratio: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FrameData {
    pub frame_id: String,
    pub head_poses: Vec<HeadPoseResult>,
    pub closeup_detections: Vec<CloseupDetection>,
}

impl FrameData {
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            ..Default::default()
        }
    }

    /// Highest-confidence head pose, if any. Ties keep the earliest.
    pub fn get_best_head_pose(&self) -> Option<&HeadPoseResult> {
        self.head_poses.iter().fold(None, |best, pose| match best {
            Some(b) if b.confidence >= pose.confidence => Some(b),
            _ => Some(pose),
        })
    }
}
