// Records produced by upstream pipeline stages
// Detection and classification happen elsewhere; these are their typed outputs.

pub mod context;
pub mod frame;

pub use context::ProcessingContext;
pub use frame::{CloseupDetection, FrameData, HeadPoseResult};
