//! Render pipeline: turns the pending path plus the current style into
//! surface draw calls.
//!
//! Passes always run fill first, then stroke, so a stroke sits on top of
//! its own fill. Text follows the same order but never touches the path.

use kurbo::Point;
use sketch_core::{Path, StyleState};
use sketch_render::{Surface, SurfaceError};

/// Draw `path` once per active style pass. Returns the number of draw calls.
///
/// An empty path issues nothing.
pub fn draw_path(surface: &mut dyn Surface, style: &StyleState, path: &Path) -> usize {
    if path.is_empty() {
        log::trace!("render: empty path, nothing to draw");
        return 0;
    }
    let bez = path.to_bez_path();
    let mut draws = 0;
    for paint in style.passes() {
        surface.draw_path(&bez, &paint);
        draws += 1;
    }
    draws
}

/// Draw `text` with its baseline at `origin`, fill pass then stroke pass.
///
/// Stops at the first pass the surface rejects.
pub fn draw_text(
    surface: &mut dyn Surface,
    style: &StyleState,
    text: &str,
    origin: Point,
) -> Result<usize, SurfaceError> {
    let mut draws = 0;
    for paint in style.passes() {
        surface.draw_text(text, origin, &style.text, &paint)?;
        draws += 1;
    }
    Ok(draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use kurbo::{Affine, BezPath, Rect};
    use pretty_assertions::assert_eq;
    use sketch_core::{Backend, Color, Paint, TextStyle};

    #[derive(Debug, PartialEq)]
    enum Call {
        Path(Paint),
        Text(String, Paint),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Surface for Recorder {
        fn backend(&self) -> Backend {
            Backend::Raster
        }
        fn size(&self) -> (u32, u32) {
            (10, 10)
        }
        fn clear(&mut self, _: Color) {}
        fn draw_path(&mut self, _: &BezPath, paint: &Paint) {
            self.calls.push(Call::Path(*paint));
        }
        fn draw_text(
            &mut self,
            text: &str,
            _: Point,
            _: &TextStyle,
            paint: &Paint,
        ) -> Result<(), SurfaceError> {
            self.calls.push(Call::Text(text.to_string(), *paint));
            Ok(())
        }
        fn draw_image(&mut self, _: &RgbaImage, _: Rect, _: f32) {}
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn concat(&mut self, _: Affine) {}
        fn current_transform(&self) -> Affine {
            Affine::IDENTITY
        }
        fn snapshot(&mut self) -> Result<RgbaImage, SurfaceError> {
            Ok(RgbaImage::new(10, 10))
        }
        fn close(&mut self) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    fn triangle() -> Path {
        let mut path = Path::new();
        path.move_to((0.0, 0.0)).line_to((5.0, 0.0)).line_to((0.0, 5.0)).close();
        path
    }

    #[test]
    fn fill_is_drawn_before_stroke() {
        let mut surface = Recorder::default();
        let style = StyleState::default();
        assert_eq!(draw_path(&mut surface, &style, &triangle()), 2);
        assert!(matches!(surface.calls[0], Call::Path(Paint::Fill(_))));
        assert!(matches!(surface.calls[1], Call::Path(Paint::Stroke { .. })));
    }

    #[test]
    fn disabled_passes_are_skipped() {
        let mut surface = Recorder::default();
        let mut style = StyleState::default();
        style.no_fill();
        style.no_stroke();
        assert_eq!(draw_path(&mut surface, &style, &triangle()), 0);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn empty_path_draws_nothing() {
        let mut surface = Recorder::default();
        assert_eq!(draw_path(&mut surface, &StyleState::default(), &Path::new()), 0);
    }

    #[test]
    fn text_uses_fill_then_stroke() {
        let mut surface = Recorder::default();
        let mut style = StyleState::default();
        style.set_fill(Color::WHITE);
        style.set_stroke_weight(2.0);
        assert_eq!(draw_text(&mut surface, &style, "hi", Point::new(1.0, 2.0)).unwrap(), 2);
        assert_eq!(
            surface.calls,
            vec![
                Call::Text("hi".into(), Paint::Fill(Color::WHITE)),
                Call::Text(
                    "hi".into(),
                    Paint::Stroke {
                        color: Color::BLACK,
                        width: 2.0
                    }
                ),
            ]
        );
    }
}
