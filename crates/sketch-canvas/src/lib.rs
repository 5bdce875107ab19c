pub mod canvas;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod tick;

pub use canvas::Canvas;
pub use error::{CanvasError, Result};
pub use output::{DEFAULT_VIDEO_FILE, VideoOptions};
pub use tick::Tick;

pub use sketch_core::kurbo::Point;
pub use sketch_core::{
    Backend, CanvasConfig, Color, CornerRadii, FontStyle, FrameEncoder, Path, RecordingState,
};
pub use sketch_render::{DisplayEvents, Frame, Presenter, Surface, SurfaceError, image, vello};
