use sketch_core::Backend;
use thiserror::Error;

/// Failures raised by backend surfaces and file output.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// `save` was given an extension other than `.png`, `.jpg` or `.webp`.
    #[error("unsupported image format for `{0}`: expected .png, .jpg or .webp")]
    UnsupportedFormat(String),

    #[error("`{operation}` is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: Backend,
    },

    #[error("cannot allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    /// A live display canvas was requested without a presenter.
    #[error("the GPU backend needs a display presenter")]
    NoPresenter,

    #[error("presenter: {0}")]
    Presenter(String),

    /// Font data could not be parsed, or no face exists to draw text with.
    #[error("font: {0}")]
    Font(String),

    #[error("surface is closed")]
    Closed,

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] sketch_core::Error),
}
