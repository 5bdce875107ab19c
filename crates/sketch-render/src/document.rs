//! Paginated PDF document surface.
//!
//! Each page is recorded into its own content stream. The page starts with
//! a y-flip so drawing happens in canvas space (origin top-left, y down).
//! The file is written on `close`.
//!
//! Text uses the standard PDF base-14 fonts, so nothing is embedded: the
//! family name picks Helvetica, Times or Courier and the style picks the
//! bold/italic face. Fonts registered with `load_font` only contribute
//! their family name to that choice.

use crate::error::SurfaceError;
use crate::fonts::FontBook;
use crate::surface::{MatrixStack, Surface};
use image::RgbaImage;
use kurbo::{Affine, BezPath, PathEl, Point, Rect};
use pdf_writer::types::TextRenderingMode;
use pdf_writer::{Content, Name, Pdf, Ref, Str};
use sketch_core::{Backend, Color, FontStyle, Paint, TextStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;

struct Page {
    width: f64,
    height: f64,
    content: Vec<u8>,
}

pub struct DocumentSurface {
    output: PathBuf,
    pages: Vec<Page>,
    content: Content,
    page_size: (f64, f64),
    matrix: MatrixStack,
    /// Base-14 font name → resource name.
    fonts: BTreeMap<&'static str, String>,
    loaded: FontBook,
    /// Embedded images, referenced as `/Im<index>`.
    images: Vec<RgbaImage>,
    /// Quantised alpha → resource name.
    alpha_states: BTreeMap<u8, String>,
    closed: bool,
}

impl DocumentSurface {
    pub fn new(output: PathBuf, width: f64, height: f64) -> Self {
        let mut surface = Self {
            output,
            pages: Vec::new(),
            content: Content::new(),
            page_size: (width, height),
            matrix: MatrixStack::default(),
            fonts: BTreeMap::new(),
            loaded: FontBook::new(),
            images: Vec::new(),
            alpha_states: BTreeMap::new(),
            closed: false,
        };
        surface.start_page(width, height);
        surface
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.closed)
    }

    fn start_page(&mut self, width: f64, height: f64) {
        self.page_size = (width, height);
        self.matrix = MatrixStack::default();
        self.content = Content::new();
        self.content
            .transform([1.0, 0.0, 0.0, -1.0, 0.0, height as f32]);
    }

    fn end_page(&mut self) {
        // Unbalanced saves would corrupt the content stream.
        while self.matrix.restore() {
            self.content.restore_state();
        }
        let content = std::mem::replace(&mut self.content, Content::new());
        self.pages.push(Page {
            width: self.page_size.0,
            height: self.page_size.1,
            content: content.finish(),
        });
    }

    /// Select the fill or stroke color, plus an alpha graphics state if needed.
    fn apply_paint(&mut self, paint: &Paint) {
        let color = paint.color();
        self.apply_alpha(color.a);
        match *paint {
            Paint::Fill(c) => {
                self.content.set_fill_rgb(c.r, c.g, c.b);
            }
            Paint::Stroke { color: c, width } => {
                self.content.set_stroke_rgb(c.r, c.g, c.b);
                self.content.set_line_width(width as f32);
            }
        }
    }

    fn apply_alpha(&mut self, alpha: f32) {
        let q = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        if q == 255 {
            return;
        }
        let next = self.alpha_states.len();
        let name = self
            .alpha_states
            .entry(q)
            .or_insert_with(|| format!("Ga{next}"));
        self.content.set_parameters(Name(name.as_bytes()));
    }

    fn font_resource(&mut self, style: &TextStyle) -> String {
        let base = base_font(&style.family, style.style);
        let next = self.fonts.len();
        self.fonts
            .entry(base)
            .or_insert_with(|| format!("F{next}"))
            .clone()
    }

    fn write_path(&mut self, path: &BezPath) {
        let mut last = Point::ORIGIN;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    self.content.move_to(p.x as f32, p.y as f32);
                    last = p;
                }
                PathEl::LineTo(p) => {
                    self.content.line_to(p.x as f32, p.y as f32);
                    last = p;
                }
                PathEl::QuadTo(c, p) => {
                    let c1 = last.lerp(c, 2.0 / 3.0);
                    let c2 = p.lerp(c, 2.0 / 3.0);
                    self.content.cubic_to(
                        c1.x as f32,
                        c1.y as f32,
                        c2.x as f32,
                        c2.y as f32,
                        p.x as f32,
                        p.y as f32,
                    );
                    last = p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    self.content.cubic_to(
                        c1.x as f32,
                        c1.y as f32,
                        c2.x as f32,
                        c2.y as f32,
                        p.x as f32,
                        p.y as f32,
                    );
                    last = p;
                }
                PathEl::ClosePath => {
                    self.content.close_path();
                }
            }
        }
    }

    fn write_file(&self) -> Result<(), SurfaceError> {
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();
        let page_ids: Vec<(Ref, Ref)> = self
            .pages
            .iter()
            .map(|_| (alloc.bump(), alloc.bump()))
            .collect();
        let font_ids: Vec<(&str, &str, Ref)> = self
            .fonts
            .iter()
            .map(|(base, name)| (*base, name.as_str(), alloc.bump()))
            .collect();
        let image_ids: Vec<(String, Ref, Ref)> = (0..self.images.len())
            .map(|i| (format!("Im{i}"), alloc.bump(), alloc.bump()))
            .collect();
        let alpha_ids: Vec<(f32, &str, Ref)> = self
            .alpha_states
            .iter()
            .map(|(q, name)| (*q as f32 / 255.0, name.as_str(), alloc.bump()))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(page_ids.len() as i32);

        for (page, &(page_id, content_id)) in self.pages.iter().zip(&page_ids) {
            {
                let mut writer = pdf.page(page_id);
                writer
                    .media_box(pdf_writer::Rect::new(
                        0.0,
                        0.0,
                        page.width as f32,
                        page.height as f32,
                    ))
                    .parent(tree_id)
                    .contents(content_id);
                let mut resources = writer.resources();
                {
                    let mut fonts = resources.fonts();
                    for (_, name, id) in &font_ids {
                        fonts.pair(Name(name.as_bytes()), *id);
                    }
                }
                {
                    let mut x_objects = resources.x_objects();
                    for (name, id, _) in &image_ids {
                        x_objects.pair(Name(name.as_bytes()), *id);
                    }
                }
                {
                    let mut states = resources.ext_g_states();
                    for (_, name, id) in &alpha_ids {
                        states.pair(Name(name.as_bytes()), *id);
                    }
                }
            }
            pdf.stream(content_id, &page.content);
        }

        for (base, _, id) in &font_ids {
            pdf.type1_font(*id).base_font(Name(base.as_bytes()));
        }

        for (image, (_, id, mask_id)) in self.images.iter().zip(&image_ids) {
            let (rgb, alpha) = split_alpha(image);
            {
                let mut xobject = pdf.image_xobject(*id, &rgb);
                xobject.width(image.width() as i32);
                xobject.height(image.height() as i32);
                xobject.color_space().device_rgb();
                xobject.bits_per_component(8);
                xobject.s_mask(*mask_id);
            }
            let mut mask = pdf.image_xobject(*mask_id, &alpha);
            mask.width(image.width() as i32);
            mask.height(image.height() as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
        }

        for (alpha, _, id) in &alpha_ids {
            pdf.ext_graphics(*id)
                .non_stroking_alpha(*alpha)
                .stroking_alpha(*alpha);
        }

        std::fs::write(&self.output, pdf.finish())?;
        log::info!(
            "wrote {} page(s) to {}",
            self.pages.len(),
            self.output.display()
        );
        Ok(())
    }
}

impl Surface for DocumentSurface {
    fn backend(&self) -> Backend {
        Backend::Document
    }

    fn size(&self) -> (u32, u32) {
        (self.page_size.0 as u32, self.page_size.1 as u32)
    }

    fn clear(&mut self, color: Color) {
        // A page has no pixels to wipe; paint over it in untransformed canvas space.
        let (w, h) = self.page_size;
        self.content.save_state();
        let current = self.matrix.current();
        if current.determinant() != 0.0 {
            let [a, b, c, d, e, f] = current.inverse().as_coeffs();
            self.content
                .transform([a as f32, b as f32, c as f32, d as f32, e as f32, f as f32]);
        }
        self.apply_alpha(color.a);
        self.content.set_fill_rgb(color.r, color.g, color.b);
        self.content.rect(0.0, 0.0, w as f32, h as f32);
        self.content.fill_nonzero();
        self.content.restore_state();
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        if path.elements().is_empty() {
            return;
        }
        self.content.save_state();
        self.apply_paint(paint);
        self.write_path(path);
        match paint {
            Paint::Fill(_) => self.content.fill_nonzero(),
            Paint::Stroke { .. } => self.content.stroke(),
        };
        self.content.restore_state();
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        style: &TextStyle,
        paint: &Paint,
    ) -> Result<(), SurfaceError> {
        let font = self.font_resource(style);
        let bytes: Vec<u8> = text
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
            .collect();

        self.content.save_state();
        self.apply_paint(paint);
        // Undo the page flip locally so glyphs stand upright.
        self.content
            .transform([1.0, 0.0, 0.0, -1.0, origin.x as f32, origin.y as f32]);
        self.content.begin_text();
        self.content.set_font(Name(font.as_bytes()), style.size as f32);
        if matches!(paint, Paint::Stroke { .. }) {
            self.content
                .set_text_rendering_mode(TextRenderingMode::Stroke);
        }
        self.content.show(Str(&bytes));
        self.content.end_text();
        self.content.restore_state();
        Ok(())
    }

    fn load_font(&mut self, data: Vec<u8>) -> Result<String, SurfaceError> {
        let family = self.loaded.load_data(data)?;
        log::debug!(
            "document: {family:?} maps to {}",
            base_font(&family, FontStyle::Normal)
        );
        Ok(family)
    }

    fn draw_image(&mut self, image: &RgbaImage, dst: Rect, alpha: f32) {
        let name = format!("Im{}", self.images.len());
        self.images.push(image.clone());

        self.content.save_state();
        self.apply_alpha(alpha);
        self.content.transform([
            dst.width() as f32,
            0.0,
            0.0,
            -dst.height() as f32,
            dst.x0 as f32,
            dst.y1 as f32,
        ]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
    }

    fn save(&mut self) {
        self.matrix.save();
        self.content.save_state();
    }

    fn restore(&mut self) {
        if self.matrix.restore() {
            self.content.restore_state();
        } else {
            log::warn!("document: restore with empty matrix stack");
        }
    }

    fn concat(&mut self, transform: Affine) {
        self.matrix.concat(transform);
        let [a, b, c, d, e, f] = transform.as_coeffs();
        self.content
            .transform([a as f32, b as f32, c as f32, d as f32, e as f32, f as f32]);
    }

    fn current_transform(&self) -> Affine {
        self.matrix.current()
    }

    fn snapshot(&mut self) -> Result<RgbaImage, SurfaceError> {
        Err(SurfaceError::Unsupported {
            operation: "snapshot",
            backend: Backend::Document,
        })
    }

    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), SurfaceError> {
        if self.closed {
            return Err(SurfaceError::Closed);
        }
        self.end_page();
        self.start_page(width, height);
        log::debug!("document: page {} ({width}x{height})", self.pages.len() + 1);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SurfaceError> {
        if self.closed {
            return Ok(());
        }
        self.end_page();
        self.closed = true;
        self.write_file()
    }
}

fn base_font(family: &str, style: FontStyle) -> &'static str {
    let family = family.to_ascii_lowercase();
    let serif = family.contains("times") || (family.contains("serif") && !family.contains("sans"));
    let mono = family.contains("courier") || family.contains("mono");
    match (mono, serif, style) {
        (true, _, FontStyle::Normal) => "Courier",
        (true, _, FontStyle::Bold) => "Courier-Bold",
        (true, _, FontStyle::Italic) => "Courier-Oblique",
        (true, _, FontStyle::BoldItalic) => "Courier-BoldOblique",
        (false, true, FontStyle::Normal) => "Times-Roman",
        (false, true, FontStyle::Bold) => "Times-Bold",
        (false, true, FontStyle::Italic) => "Times-Italic",
        (false, true, FontStyle::BoldItalic) => "Times-BoldItalic",
        (false, false, FontStyle::Normal) => "Helvetica",
        (false, false, FontStyle::Bold) => "Helvetica-Bold",
        (false, false, FontStyle::Italic) => "Helvetica-Oblique",
        (false, false, FontStyle::BoldItalic) => "Helvetica-BoldOblique",
    }
}

/// Split straight-alpha RGBA into an RGB plane and an alpha plane.
fn split_alpha(image: &RgbaImage) -> (Vec<u8>, Vec<u8>) {
    let mut rgb = Vec::with_capacity(image.as_raw().len() / 4 * 3);
    let mut alpha = Vec::with_capacity(image.as_raw().len() / 4);
    for px in image.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
    }
    (rgb, alpha)
}
