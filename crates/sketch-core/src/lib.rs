pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod path;
pub mod style;
pub mod transform;
pub mod video;

pub use config::{Backend, CanvasConfig};
pub use error::{Error, Result};
pub use frame::{FrameController, compute_sleep_duration, frame_filename};
pub use geometry::{CornerRadii, KAPPA};
pub use path::{Path, PathAccumulator, PathCmd};
pub use style::{Color, FontStyle, Paint, StyleState, TextStyle};
pub use transform::{Transform, TransformStack};
pub use video::{CaptureOutcome, FrameEncoder, RecordingState, VideoCaptureController};

// Re-export kurbo so downstream crates share one geometry version.
pub use kurbo;
