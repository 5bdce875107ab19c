use sketch_render::SurfaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Core(#[from] sketch_core::Error),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// A draw or output call reached a canvas whose surface was torn down.
    #[error("the canvas surface has been closed")]
    SurfaceClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
