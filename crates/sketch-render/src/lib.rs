pub mod display;
pub mod document;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod fonts;
pub mod raster;
pub mod surface;

pub use display::{DisplaySurface, Frame, Presenter};
pub use document::DocumentSurface;
pub use error::SurfaceError;
pub use export::{format_for_path, load_image, save_image};
pub use ffmpeg::{FfmpegEncoder, FfmpegOptions};
pub use fonts::FontBook;
pub use raster::RasterSurface;
pub use surface::{DisplayEvents, MatrixStack, Surface, create_surface};

// Re-export so presenters and callers share one version of each.
pub use image;
pub use vello;
