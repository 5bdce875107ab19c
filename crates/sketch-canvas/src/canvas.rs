//! The canvas aggregate root and its immediate-mode drawing API.
//!
//! Every shape call builds one path into the accumulator and renders it
//! straight away with the current style. Output (files, video, pages) and
//! the per-tick loop live in `output.rs` and `tick.rs`.

use crate::error::{CanvasError, Result};
use crate::pipeline;
use image::RgbaImage;
use kurbo::{Affine, Point, Rect, Shape};
use sketch_core::geometry;
use sketch_core::{
    Backend, CanvasConfig, Color, CornerRadii, FontStyle, FrameController, Path, PathAccumulator,
    StyleState, Transform, TransformStack, VideoCaptureController,
};
use sketch_render::{Presenter, Surface, create_surface};
use std::collections::BTreeSet;
use std::path::Path as FsPath;

pub struct Canvas {
    pub(crate) config: CanvasConfig,
    width: u32,
    height: u32,
    density: f64,
    pub(crate) frames: FrameController,
    style: StyleState,
    path: PathAccumulator,
    pub(crate) transforms: TransformStack,
    /// `None` once the surface has been torn down.
    pub(crate) surface: Option<Box<dyn Surface>>,
    pub(crate) video: VideoCaptureController,
    /// Families registered through [`Canvas::load_font`].
    fonts: BTreeSet<String>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("backend", &self.config.backend)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("density", &self.density)
            .field("frame_count", &self.frames.frame_count())
            .field("closed", &self.surface.is_none())
            .finish_non_exhaustive()
    }
}

/// The live surface, or [`CanvasError::SurfaceClosed`] after teardown.
pub(crate) fn live(surface: &mut Option<Box<dyn Surface>>) -> Result<&mut dyn Surface> {
    match surface {
        Some(s) => Ok(s.as_mut()),
        None => Err(CanvasError::SurfaceClosed),
    }
}

impl Canvas {
    /// Build an off-screen (raster) or document canvas from `config`.
    ///
    /// The display backend needs a window; use [`Canvas::with_presenter`].
    pub fn new(config: CanvasConfig) -> Result<Self> {
        let surface = create_surface(&config, None)?;
        Ok(Self::setup(config, surface))
    }

    /// Build a canvas whose display backend presents through `presenter`.
    pub fn with_presenter(config: CanvasConfig, presenter: Box<dyn Presenter>) -> Result<Self> {
        let surface = create_surface(&config, Some(presenter))?;
        Ok(Self::setup(config, surface))
    }

    /// Build a canvas on a caller-supplied surface.
    pub fn with_surface(config: CanvasConfig, surface: Box<dyn Surface>) -> Result<Self> {
        config.validate()?;
        Ok(Self::setup(config, surface))
    }

    /// Adopt the surface's actual size and apply its density once.
    fn setup(config: CanvasConfig, mut surface: Box<dyn Surface>) -> Self {
        let (width, height) = surface.size();
        let density = surface.density();
        if density != 1.0 {
            surface.concat(Affine::scale(density));
        }
        log::debug!(
            "canvas {:?}: {}x{} on {} backend, density {}",
            config.title,
            width,
            height,
            config.backend,
            density
        );
        Self {
            frames: FrameController::new(config.fps),
            config,
            width,
            height,
            density,
            style: StyleState::default(),
            path: PathAccumulator::new(),
            transforms: TransformStack::new(),
            surface: Some(surface),
            video: VideoCaptureController::new(),
            fonts: BTreeSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn backend(&self) -> Backend {
        self.config.backend
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn is_closed(&self) -> bool {
        self.surface.is_none()
    }

    /// The path being accumulated, for building arbitrary shapes before
    /// calling [`Canvas::render`].
    pub fn path_mut(&mut self) -> &mut Path {
        self.path.path_mut()
    }

    // ─── Background ──────────────────────────────────────────────────────

    /// Cover the canvas with a color, under the current transform.
    pub fn background(&mut self, r: f32, g: f32, b: f32, a: f32) -> Result<()> {
        let surface = live(&mut self.surface)?;
        let full = Rect::new(0.0, 0.0, self.width as f64, self.height as f64);
        surface.draw_path(
            &full.to_path(sketch_core::path::CURVE_TOLERANCE),
            &sketch_core::Paint::Fill(Color::rgba(r, g, b, a)),
        );
        Ok(())
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) -> Result<()> {
        live(&mut self.surface)?.clear(Color::TRANSPARENT);
        Ok(())
    }

    // ─── Style ───────────────────────────────────────────────────────────

    pub fn fill(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.style.set_fill(Color::rgba(r, g, b, a));
    }

    pub fn no_fill(&mut self) {
        self.style.no_fill();
    }

    pub fn stroke(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.style.set_stroke(Color::rgba(r, g, b, a));
    }

    pub fn stroke_weight(&mut self, weight: f64) {
        self.style.set_stroke_weight(weight);
    }

    pub fn no_stroke(&mut self) {
        self.style.no_stroke();
    }

    /// Opacity multiplier for images.
    pub fn alpha(&mut self, a: f32) {
        self.style.set_alpha(a);
    }

    pub fn text_font(&mut self, family: impl Into<String>) {
        let family = family.into();
        if !family.is_empty() && !self.fonts.contains(&family) {
            log::debug!("text font {family:?} is not a loaded font; backend will resolve it");
        }
        self.style.set_text_font(family);
    }

    pub fn text_size(&mut self, size: f64) {
        self.style.set_text_size(size);
    }

    pub fn text_style(&mut self, style: FontStyle) {
        self.style.set_text_style(style);
    }

    // ─── Shapes ──────────────────────────────────────────────────────────

    /// Render the accumulated path with the current style.
    ///
    /// With `rewind` the path is discarded afterwards; without it the path
    /// stays for inspection or another pass. Returns the number of draw
    /// calls issued.
    pub fn render(&mut self, rewind: bool) -> Result<usize> {
        let surface = live(&mut self.surface)?;
        let draws = pipeline::draw_path(surface, &self.style, self.path.current());
        if rewind {
            self.path.rewind();
        }
        Ok(draws)
    }

    fn shape(&mut self, build: impl FnOnce(&mut Path)) -> Result<()> {
        if self.surface.is_none() {
            return Err(CanvasError::SurfaceClosed);
        }
        build(self.path.path_mut());
        self.render(true).map(drop)
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        self.shape(|p| geometry::line(p, x1, y1, x2, y2))
    }

    /// Ellipse inscribed in the box `(x, y, w, h)`.
    pub fn ellipse(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        self.shape(|p| geometry::ellipse(p, x, y, w, h))
    }

    /// Circle of diameter `d` centered on `(x, y)`.
    pub fn circle(&mut self, x: f64, y: f64, d: f64) -> Result<()> {
        self.shape(|p| geometry::circle(p, x, y, d))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn quad(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        x4: f64,
        y4: f64,
    ) -> Result<()> {
        self.shape(|p| geometry::quad(p, x1, y1, x2, y2, x3, y3, x4, y4))
    }

    /// Rectangle with optional per-corner radii. See [`CornerRadii`].
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, radii: CornerRadii) -> Result<()> {
        self.shape(|p| geometry::rect(p, x, y, w, h, radii))
    }

    pub fn triangle(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> Result<()> {
        self.shape(|p| geometry::triangle(p, x1, y1, x2, y2, x3, y3))
    }

    pub fn polygon(&mut self, points: &[Point]) -> Result<()> {
        self.shape(|p| geometry::polygon(p, points))
    }

    /// Always fails with `NotImplemented("arc")`.
    pub fn arc(&mut self, x: f64, y: f64, w: f64, h: f64, start: f64, stop: f64) -> Result<()> {
        geometry::arc(self.path.path_mut(), x, y, w, h, start, stop)?;
        self.render(true).map(drop)
    }

    /// Render a caller-built path with the current style.
    pub fn draw_path(&mut self, path: &Path) -> Result<()> {
        self.shape(|p| p.extend(path))
    }

    // ─── Text & images ───────────────────────────────────────────────────

    /// Draw `text` with its baseline starting at `(x, y)`.
    ///
    /// Fails with `SurfaceError::Font` when the backend has no face to
    /// draw with.
    pub fn text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        let surface = live(&mut self.surface)?;
        pipeline::draw_text(surface, &self.style, text, Point::new(x, y))?;
        Ok(())
    }

    /// Draw `img` at `(x, y)`, at its natural size unless `w`/`h` are given.
    pub fn image(
        &mut self,
        img: &RgbaImage,
        x: f64,
        y: f64,
        w: Option<f64>,
        h: Option<f64>,
    ) -> Result<()> {
        let surface = live(&mut self.surface)?;
        let w = w.unwrap_or(img.width() as f64);
        let h = h.unwrap_or(img.height() as f64);
        surface.draw_image(img, Rect::new(x, y, x + w, y + h), self.style.alpha);
        Ok(())
    }

    pub fn load_image(&self, path: impl AsRef<FsPath>) -> Result<RgbaImage> {
        Ok(sketch_render::load_image(path.as_ref())?)
    }

    /// Hand a font file to the backend and return the family name that
    /// selects it through [`Canvas::text_font`].
    pub fn load_font(&mut self, path: impl AsRef<FsPath>) -> Result<String> {
        let path = path.as_ref();
        let surface = live(&mut self.surface)?;
        let bytes = std::fs::read(path)?;
        let family = surface.load_font(bytes)?;
        log::debug!("loaded font {family:?} from {}", path.display());
        self.fonts.insert(family.clone());
        Ok(family)
    }

    /// Whether `family` was registered with [`Canvas::load_font`].
    pub fn has_font(&self, family: &str) -> bool {
        self.fonts.contains(family)
    }

    // ─── Transforms ──────────────────────────────────────────────────────

    pub fn push(&mut self) -> Result<()> {
        live(&mut self.surface)?.save();
        self.transforms.push();
        Ok(())
    }

    /// Fails with `UnbalancedPop` when there is no outstanding `push`.
    pub fn pop(&mut self) -> Result<()> {
        let surface = live(&mut self.surface)?;
        self.transforms.pop()?;
        surface.restore();
        Ok(())
    }

    pub fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        self.apply(Transform::Translate(x, y))
    }

    /// Rotate by `deg` degrees.
    pub fn rotate(&mut self, deg: f64) -> Result<()> {
        self.apply(Transform::Rotate(deg))
    }

    /// Uniform scale when `sy` is `None`.
    pub fn scale(&mut self, sx: f64, sy: Option<f64>) -> Result<()> {
        self.apply(Transform::scale(sx, sy))
    }

    fn apply(&mut self, transform: Transform) -> Result<()> {
        live(&mut self.surface)?.concat(transform.to_affine());
        Ok(())
    }

    /// The surface's current matrix, density scale included.
    pub fn current_transform(&self) -> Result<Affine> {
        self.surface
            .as_deref()
            .map(|s| s.current_transform())
            .ok_or(CanvasError::SurfaceClosed)
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        if self.video.is_recording()
            && let Err(e) = self.video.finish()
        {
            log::warn!("finishing video on drop: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sketch_render::SurfaceError;

    fn raster(w: u32, h: u32) -> Canvas {
        Canvas::new(CanvasConfig::new(w, h)).unwrap()
    }

    #[test]
    fn defaults_follow_config() {
        let canvas = raster(30, 20);
        assert_eq!((canvas.width(), canvas.height()), (30, 20));
        assert_eq!(canvas.density(), 1.0);
        assert_eq!(canvas.backend(), Backend::Raster);
        assert_eq!(canvas.style(), &StyleState::default());
    }

    #[test]
    fn render_keeps_path_without_rewind() {
        let mut canvas = raster(10, 10);
        canvas.path_mut().move_to((0.0, 0.0)).line_to((5.0, 5.0));
        assert_eq!(canvas.render(false).unwrap(), 2);
        assert_eq!(canvas.render(true).unwrap(), 2);
        assert_eq!(canvas.render(true).unwrap(), 0);
    }

    #[test]
    fn arc_is_not_implemented() {
        let mut canvas = raster(10, 10);
        let err = canvas.arc(0.0, 0.0, 5.0, 5.0, 0.0, 90.0).unwrap_err();
        assert!(matches!(
            err,
            CanvasError::Core(sketch_core::Error::NotImplemented("arc"))
        ));
    }

    #[test]
    fn rotate_takes_degrees() {
        let mut canvas = raster(10, 10);
        canvas.rotate(90.0).unwrap();
        let p = canvas.current_transform().unwrap() * Point::new(1.0, 0.0);
        assert!((p.x - 0.0).abs() < 1e-9 && (p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scale_with_one_argument_is_uniform() {
        let mut canvas = raster(10, 10);
        canvas.scale(3.0, None).unwrap();
        assert_eq!(canvas.current_transform().unwrap(), Affine::scale(3.0));
    }

    #[test]
    fn load_font_rejects_files_that_are_not_fonts() {
        let dir = std::env::temp_dir().join(format!("sketch-font-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("Mono.ttf");
        std::fs::write(&file, b"not really a font").unwrap();

        let mut canvas = raster(4, 4);
        let err = canvas.load_font(&file).unwrap_err();
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(err, CanvasError::Surface(SurfaceError::Font(_))));
        assert!(!canvas.has_font("Mono"));
    }

    #[test]
    fn text_inks_the_raster_or_reports_a_missing_font() {
        let mut canvas = raster(100, 40);
        canvas.fill(0.0, 0.0, 0.0, 1.0);
        canvas.no_stroke();
        canvas.text_size(32.0);
        match canvas.text("HELLO", 5.0, 35.0) {
            Ok(()) => {
                let img = canvas.snapshot().unwrap();
                assert!(img.pixels().any(|p| p.0[3] > 0));
            }
            Err(e) => assert!(matches!(e, CanvasError::Surface(SurfaceError::Font(_)))),
        }
    }
}
