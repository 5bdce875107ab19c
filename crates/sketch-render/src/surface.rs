//! The backend surface capability interface.
//!
//! A canvas owns exactly one `Box<dyn Surface>` picked by
//! [`create_surface`]. Backends receive resolved `BezPath`s and paints;
//! they own their matrix stack and never see canvas style state.

use crate::display::{DisplaySurface, Presenter};
use crate::document::DocumentSurface;
use crate::error::SurfaceError;
use crate::raster::RasterSurface;
use image::RgbaImage;
use kurbo::{Affine, BezPath, Point, Rect};
use sketch_core::{Backend, CanvasConfig, Color, Paint, TextStyle};

/// Input observed by a live display since the last poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayEvents {
    /// The designated cancel key (Escape) is pressed.
    pub cancel_pressed: bool,
    /// The window manager asked the window to close.
    pub close_requested: bool,
}

impl DisplayEvents {
    pub fn should_stop(&self) -> bool {
        self.cancel_pressed || self.close_requested
    }
}

pub trait Surface {
    fn backend(&self) -> Backend;

    /// Actual pixel size, which may differ from the requested size.
    fn size(&self) -> (u32, u32);

    /// Logical-to-physical scale factor.
    fn density(&self) -> f64 {
        1.0
    }

    /// Replace every pixel with `color`, ignoring the current transform.
    fn clear(&mut self, color: Color);

    fn draw_path(&mut self, path: &BezPath, paint: &Paint);

    /// Draw `text` with its baseline starting at `origin`.
    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        style: &TextStyle,
        paint: &Paint,
    ) -> Result<(), SurfaceError>;

    /// Register font file bytes for later `draw_text` calls and return the
    /// family name to select them with.
    fn load_font(&mut self, _data: Vec<u8>) -> Result<String, SurfaceError> {
        Err(SurfaceError::Unsupported {
            operation: "load_font",
            backend: self.backend(),
        })
    }

    /// Draw `image` scaled into `dst`, with its alpha multiplied by `alpha`.
    fn draw_image(&mut self, image: &RgbaImage, dst: Rect, alpha: f32);

    /// Push a copy of the current transform.
    fn save(&mut self);

    /// Pop the transform saved by the matching `save`.
    fn restore(&mut self);

    /// Compose `transform` onto the current matrix.
    fn concat(&mut self, transform: Affine);

    fn current_transform(&self) -> Affine;

    /// The current frame as straight-alpha RGBA8.
    fn snapshot(&mut self) -> Result<RgbaImage, SurfaceError>;

    /// Submit the frame to the display. Off-screen backends do nothing.
    fn present(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn poll_events(&mut self) -> DisplayEvents {
        DisplayEvents::default()
    }

    /// End the current page and start a `width × height` one.
    fn begin_page(&mut self, _width: f64, _height: f64) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported {
            operation: "add_page",
            backend: self.backend(),
        })
    }

    /// Release the surface. Document surfaces write their file here.
    fn close(&mut self) -> Result<(), SurfaceError>;
}

/// Build the surface selected by `config.backend`.
///
/// The display backend needs a `presenter` (window + GPU device); the
/// other backends ignore it.
pub fn create_surface(
    config: &CanvasConfig,
    presenter: Option<Box<dyn Presenter>>,
) -> Result<Box<dyn Surface>, SurfaceError> {
    config.validate()?;
    log::debug!(
        "creating {} surface {}x{}",
        config.backend,
        config.width,
        config.height
    );
    match config.backend {
        Backend::Raster => Ok(Box::new(RasterSurface::new(config.width, config.height)?)),
        Backend::Document => {
            let output = config
                .output
                .clone()
                .ok_or(sketch_core::Error::MissingDocumentOutput)?;
            Ok(Box::new(DocumentSurface::new(
                output,
                config.width as f64,
                config.height as f64,
            )))
        }
        Backend::Display => {
            let presenter = presenter.ok_or(SurfaceError::NoPresenter)?;
            Ok(Box::new(DisplaySurface::new(presenter)?))
        }
    }
}

// ─── Matrix stack ────────────────────────────────────────────────────────

/// Save/restore stack of affine transforms used by the backends.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Affine,
    saved: Vec<Affine>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new(Affine::IDENTITY)
    }
}

impl MatrixStack {
    pub fn new(base: Affine) -> Self {
        Self {
            current: base,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> Affine {
        self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Returns `false` when there was nothing to restore.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(m) => {
                self.current = m;
                true
            }
            None => false,
        }
    }

    pub fn concat(&mut self, transform: Affine) {
        self.current = self.current * transform;
    }
}
