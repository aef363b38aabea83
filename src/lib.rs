// Person From Vid - Library Entry Point
// Configuration model and output naming for the frame extraction pipeline.

pub mod constants;
pub mod error;
pub mod config;
pub mod data;
pub mod naming;
pub mod logging;

pub use config::{get_default_config, load_config, Config, ConfigFormat, Settings};
pub use data::{CloseupDetection, FrameData, HeadPoseResult, ProcessingContext};
pub use error::{PfvError, Result, ValidationError, ValidationErrors};
pub use naming::NamingEngine;
