//! Off-screen software raster surface backed by a tiny-skia `Pixmap`.

use crate::error::SurfaceError;
use crate::fonts::FontBook;
use crate::surface::{MatrixStack, Surface};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Vec2};
use sketch_core::{Backend, Color, Paint, TextStyle};
use tiny_skia::{ColorU8, FillRule, FilterQuality, Pixmap, PixmapPaint, Stroke, Transform};

pub struct RasterSurface {
    pixmap: Pixmap,
    matrix: MatrixStack,
    fonts: FontBook,
    closed: bool,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::Allocation { width, height })?;
        Ok(Self {
            pixmap,
            matrix: MatrixStack::default(),
            fonts: FontBook::new(),
            closed: false,
        })
    }

    fn transform(&self) -> Transform {
        to_skia_transform(self.matrix.current())
    }
}

impl Surface for RasterSurface {
    fn backend(&self) -> Backend {
        Backend::Raster
    }

    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self, color: Color) {
        let [r, g, b, a] = color.to_rgba8();
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        let Some(skia_path) = to_skia_path(path) else {
            log::trace!("raster: skipping empty or degenerate path");
            return;
        };
        let transform = self.transform();
        match *paint {
            Paint::Fill(color) => {
                self.pixmap.fill_path(
                    &skia_path,
                    &skia_paint(color),
                    FillRule::Winding,
                    transform,
                    None,
                );
            }
            Paint::Stroke { color, width } => {
                let stroke = Stroke {
                    width: width as f32,
                    ..Stroke::default()
                };
                self.pixmap
                    .stroke_path(&skia_path, &skia_paint(color), &stroke, transform, None);
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
        let Some(src) = to_pixmap(image) else {
            return;
        };
        let sx = dst.width() / image.width() as f64;
        let sy = dst.height() / image.height() as f64;
        let placement = self.matrix.current()
            * Affine::translate(Vec2::new(dst.x0, dst.y0))
            * Affine::scale_non_uniform(sx, sy);
        let paint = PixmapPaint {
            opacity: alpha.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, src.as_ref(), &paint, to_skia_transform(placement), None);
    }

    fn save(&mut self) {
        self.matrix.save();
    }

    fn restore(&mut self) {
        if !self.matrix.restore() {
            log::warn!("raster: restore with empty matrix stack");
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
        let mut out = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(out)
    }

    fn close(&mut self) -> Result<(), SurfaceError> {
        self.closed = true;
        Ok(())
    }
}

// ─── Conversions ─────────────────────────────────────────────────────────

fn skia_paint(color: Color) -> tiny_skia::Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn to_skia_transform(m: Affine) -> Transform {
    let [a, b, c, d, e, f] = m.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Straight-alpha RGBA8 → premultiplied pixmap.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;
    use pretty_assertions::assert_eq;

    fn square(x: f64, y: f64, size: f64) -> BezPath {
        Rect::new(x, y, x + size, y + size).to_path(0.1)
    }

    #[test]
    fn fill_covers_interior() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.draw_path(&square(5.0, 5.0, 10.0), &Paint::Fill(Color::rgb(1.0, 0.0, 0.0)));
        let img = surface.snapshot().unwrap();
        assert_eq!(img.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn transform_moves_subsequent_draws() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        surface.save();
        surface.concat(Affine::translate(Vec2::new(20.0, 20.0)));
        surface.draw_path(&square(0.0, 0.0, 10.0), &Paint::Fill(Color::WHITE));
        surface.restore();
        assert_eq!(surface.current_transform(), Affine::IDENTITY);

        let img = surface.snapshot().unwrap();
        assert_eq!(img.get_pixel(25, 25).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 0]);
    }

    #[test]
    fn clear_ignores_transform() {
        let mut surface = RasterSurface::new(8, 8).unwrap();
        surface.concat(Affine::scale(0.1));
        surface.clear(Color::rgb(0.0, 0.0, 1.0));
        let img = surface.snapshot().unwrap();
        assert!(img.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn image_is_scaled_into_destination() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        surface.draw_image(&src, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        let img = surface.snapshot().unwrap();
        assert_eq!(img.get_pixel(5, 5).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(15, 15).0, [0, 0, 0, 0]);
    }

    #[test]
    fn zero_sized_surface_fails_to_allocate() {
        assert!(matches!(
            RasterSurface::new(0, 10),
            Err(SurfaceError::Allocation { width: 0, height: 10 })
        ));
    }

    #[test]
    fn text_is_inked_or_reported() {
        let mut surface = RasterSurface::new(100, 40).unwrap();
        let style = TextStyle {
            size: 32.0,
            ..TextStyle::default()
        };
        let result = surface.draw_text(
            "HELLO",
            Point::new(5.0, 35.0),
            &style,
            &Paint::Fill(Color::BLACK),
        );
        match result {
            Ok(()) => {
                let img = surface.snapshot().unwrap();
                assert!(img.pixels().any(|p| p.0[3] > 0));
            }
            Err(e) => assert!(matches!(e, SurfaceError::Font(_))),
        }
    }

    #[test]
    fn load_font_rejects_non_font_bytes() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        assert!(matches!(
            surface.load_font(b"not really a font".to_vec()),
            Err(SurfaceError::Font(_))
        ));
    }

    #[test]
    fn add_page_is_unsupported() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        assert!(matches!(
            surface.begin_page(4.0, 4.0),
            Err(SurfaceError::Unsupported { operation: "add_page", .. })
        ));
    }
}
