//! Live display surface: draws are encoded into a Vello `Scene`.
//!
//! The window, GPU device and input handling live behind [`Presenter`];
//! this surface only builds the scene and forwards presentation,
//! read-back, polling and teardown.
//!
//! The scene only ever holds the draws issued since the last hand-off.
//! Each [`Frame`] is composited onto the presenter's persistent target and
//! the scene is reset, so nothing drawn in earlier frames is re-encoded.

use crate::error::SurfaceError;
use crate::fonts::FontBook;
use crate::surface::{DisplayEvents, MatrixStack, Surface};
use image::RgbaImage;
use kurbo::{Affine, BezPath, Point, Rect, Stroke, Vec2};
use peniko::{Blob, Fill, ImageFormat};
use sketch_core::{Backend, Color, Paint, TextStyle};
use std::sync::Arc;
use vello::Scene;

/// Draws pending since the previous hand-off to the presenter.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    /// New draws, to be composited over the target's current contents.
    pub scene: &'a Scene,
    /// Reset the target to this color before drawing `scene`.
    pub clear: Option<Color>,
    pub width: u32,
    pub height: u32,
}

/// The window + GPU collaborator behind a live display canvas.
///
/// Implementations keep a persistent render target (a texture the size of
/// the framebuffer). Every [`Frame`] is drawn onto it without clearing it
/// first, unless the frame carries `clear`.
pub trait Presenter {
    /// Framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Window content scale (1.0 on standard-density displays).
    fn content_scale(&self) -> f64;

    /// Draw `frame` onto the target and swap the target onto the window.
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), SurfaceError>;

    /// Draw `frame` onto the target and read the target back as
    /// straight-alpha RGBA8.
    fn read_pixels(&mut self, frame: &Frame<'_>) -> Result<RgbaImage, SurfaceError>;

    fn poll_events(&mut self) -> DisplayEvents;

    /// Destroy the window and abandon the GPU context.
    fn close(&mut self);
}

pub struct DisplaySurface {
    scene: Scene,
    /// Set by `clear`, consumed by the next hand-off.
    pending_clear: Option<Color>,
    presenter: Box<dyn Presenter>,
    matrix: MatrixStack,
    fonts: FontBook,
    width: u32,
    height: u32,
    density: f64,
    closed: bool,
}

impl DisplaySurface {
    /// Size the surface from the presenter's framebuffer. The content
    /// scale is reported through `density`, not applied here.
    pub fn new(presenter: Box<dyn Presenter>) -> Result<Self, SurfaceError> {
        let (width, height) = presenter.framebuffer_size();
        if width == 0 || height == 0 {
            return Err(SurfaceError::Allocation { width, height });
        }
        let density = presenter.content_scale();
        log::debug!("display: framebuffer {width}x{height}, density {density}");
        Ok(Self {
            scene: Scene::new(),
            pending_clear: None,
            presenter,
            matrix: MatrixStack::default(),
            fonts: FontBook::new(),
            width,
            height,
            density,
            closed: false,
        })
    }

    /// Draws not yet handed to the presenter.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The presenter now owns everything drawn so far.
    fn handed_off(&mut self) {
        self.scene.reset();
        self.pending_clear = None;
    }
}

fn to_peniko(color: Color) -> peniko::Color {
    let [r, g, b, a] = color.to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

impl Surface for DisplaySurface {
    fn backend(&self) -> Backend {
        Backend::Display
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn density(&self) -> f64 {
        self.density
    }

    /// Drops the pending draws; the target is reset on the next hand-off.
    fn clear(&mut self, color: Color) {
        self.scene.reset();
        self.pending_clear = Some(color);
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        let transform = self.matrix.current();
        match *paint {
            Paint::Fill(color) => {
                self.scene
                    .fill(Fill::NonZero, transform, to_peniko(color), None, path);
            }
            Paint::Stroke { color, width } => {
                self.scene
                    .stroke(&Stroke::new(width), transform, to_peniko(color), None, path);
            }
        }
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        style: &TextStyle,
        paint: &Paint,
    ) -> Result<(), SurfaceError> {
        let outline = self.fonts.outline(text, origin, style)?;
        self.draw_path(&outline, paint);
        Ok(())
    }

    fn load_font(&mut self, data: Vec<u8>) -> Result<String, SurfaceError> {
        self.fonts.load_data(data)
    }

    fn draw_image(&mut self, image: &RgbaImage, dst: Rect, alpha: f32) {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let blob = Blob::new(Arc::new(image.as_raw().clone()));
        let mut img = peniko::Image::new(blob, ImageFormat::Rgba8, w, h);
        img.alpha = alpha.clamp(0.0, 1.0);
        let placement = self.matrix.current()
            * Affine::translate(Vec2::new(dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / w as f64, dst.height() / h as f64);
        self.scene.draw_image(&img, placement);
    }

    fn save(&mut self) {
        self.matrix.save();
    }

    fn restore(&mut self) {
        if !self.matrix.restore() {
            log::warn!("display: restore with empty matrix stack");
        }
    }

    fn concat(&mut self, transform: Affine) {
        self.matrix.concat(transform);
    }

    fn current_transform(&self) -> Affine {
        self.matrix.current()
    }

    fn snapshot(&mut self) -> Result<RgbaImage, SurfaceError> {
        if self.closed {
            return Err(SurfaceError::Closed);
        }
        let pixels = self.presenter.read_pixels(&Frame {
            scene: &self.scene,
            clear: self.pending_clear,
            width: self.width,
            height: self.height,
        })?;
        self.handed_off();
        Ok(pixels)
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if self.closed {
            return Err(SurfaceError::Closed);
        }
        self.presenter.present(&Frame {
            scene: &self.scene,
            clear: self.pending_clear,
            width: self.width,
            height: self.height,
        })?;
        self.handed_off();
        Ok(())
    }

    fn poll_events(&mut self) -> DisplayEvents {
        if self.closed {
            return DisplayEvents {
                close_requested: true,
                ..DisplayEvents::default()
            };
        }
        self.presenter.poll_events()
    }

    fn close(&mut self) -> Result<(), SurfaceError> {
        if !self.closed {
            log::info!("display: closing window");
            self.presenter.close();
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct State {
        presented: u32,
        closed: u32,
        events: DisplayEvents,
        /// Path count and clear color of every frame handed over.
        frames: Vec<(u32, Option<Color>)>,
    }

    struct FakeWindow(Rc<RefCell<State>>);

    impl Presenter for FakeWindow {
        fn framebuffer_size(&self) -> (u32, u32) {
            (200, 100)
        }

        fn content_scale(&self) -> f64 {
            2.0
        }

        fn present(&mut self, frame: &Frame<'_>) -> Result<(), SurfaceError> {
            let mut state = self.0.borrow_mut();
            state.presented += 1;
            state.frames.push((frame.scene.encoding().n_paths, frame.clear));
            Ok(())
        }

        fn read_pixels(&mut self, frame: &Frame<'_>) -> Result<RgbaImage, SurfaceError> {
            self.0
                .borrow_mut()
                .frames
                .push((frame.scene.encoding().n_paths, frame.clear));
            Ok(RgbaImage::new(frame.width, frame.height))
        }

        fn poll_events(&mut self) -> DisplayEvents {
            self.0.borrow().events
        }

        fn close(&mut self) {
            self.0.borrow_mut().closed += 1;
        }
    }

    #[test]
    fn reports_framebuffer_size_and_density() {
        let state = Rc::new(RefCell::new(State::default()));
        let surface = DisplaySurface::new(Box::new(FakeWindow(state))).unwrap();
        assert_eq!(surface.size(), (200, 100));
        assert_eq!(surface.density(), 2.0);
        assert_eq!(surface.current_transform(), Affine::IDENTITY);
    }

    #[test]
    fn present_and_close_reach_presenter_once() {
        let state = Rc::new(RefCell::new(State::default()));
        let mut surface = DisplaySurface::new(Box::new(FakeWindow(state.clone()))).unwrap();
        surface.present().unwrap();
        surface.close().unwrap();
        surface.close().unwrap();
        assert_eq!(state.borrow().presented, 1);
        assert_eq!(state.borrow().closed, 1);
        assert!(matches!(surface.present(), Err(SurfaceError::Closed)));
        assert!(surface.poll_events().should_stop());
    }

    fn dot() -> BezPath {
        kurbo::Shape::to_path(&kurbo::Circle::new((10.0, 10.0), 5.0), 0.1)
    }

    #[test]
    fn each_frame_carries_only_new_draws() {
        let state = Rc::new(RefCell::new(State::default()));
        let mut surface = DisplaySurface::new(Box::new(FakeWindow(state.clone()))).unwrap();
        for _ in 0..50 {
            surface.draw_path(&dot(), &Paint::Fill(Color::WHITE));
            surface.draw_path(&dot(), &Paint::Fill(Color::BLACK));
            surface.present().unwrap();
        }
        assert_eq!(surface.scene().encoding().n_paths, 0);
        assert!(state.borrow().frames.iter().all(|f| *f == (2, None)));
        assert_eq!(state.borrow().frames.len(), 50);
    }

    #[test]
    fn clear_is_handed_off_once() {
        let state = Rc::new(RefCell::new(State::default()));
        let mut surface = DisplaySurface::new(Box::new(FakeWindow(state.clone()))).unwrap();
        surface.draw_path(&dot(), &Paint::Fill(Color::WHITE));
        surface.clear(Color::TRANSPARENT);
        surface.draw_path(&dot(), &Paint::Fill(Color::BLACK));
        surface.snapshot().unwrap();
        surface.present().unwrap();
        assert_eq!(
            state.borrow().frames,
            vec![(1, Some(Color::TRANSPARENT)), (0, None)]
        );
    }

    #[test]
    fn snapshot_reads_framebuffer_size() {
        let state = Rc::new(RefCell::new(State::default()));
        let mut surface = DisplaySurface::new(Box::new(FakeWindow(state))).unwrap();
        let img = surface.snapshot().unwrap();
        assert_eq!(img.dimensions(), (200, 100));
    }
}
