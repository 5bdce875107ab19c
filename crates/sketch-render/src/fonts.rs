//! Font lookup and glyph outlining for the pixel backends.
//!
//! Faces come from `fontdb`: fonts registered through [`FontBook::load_data`]
//! first, then the system fonts, loaded once on the first miss. Glyphs are
//! outlined with `ttf-parser` into a `BezPath` in canvas space, so text goes
//! through the same fill/stroke path as every other shape.

use crate::error::SurfaceError;
use fontdb::{Database, Family, ID, Query, Source, Stretch, Style, Weight};
use kurbo::{BezPath, Point};
use sketch_core::TextStyle;
use std::collections::HashMap;
use std::sync::Arc;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Face bytes and the face index within them.
type FaceData = (Arc<[u8]>, u32);

pub struct FontBook {
    db: Database,
    system_loaded: bool,
    cache: HashMap<ID, FaceData>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            system_loaded: false,
            cache: HashMap::new(),
        }
    }

    /// Register font file bytes and return the family name of the first face.
    pub fn load_data(&mut self, data: Vec<u8>) -> Result<String, SurfaceError> {
        let ids = self.db.load_font_source(Source::Binary(Arc::new(data)));
        let family = ids
            .first()
            .and_then(|id| self.db.face(*id))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| SurfaceError::Font("data holds no usable font face".into()))?;
        log::debug!("fonts: registered {family:?} ({} face(s))", ids.len());
        Ok(family)
    }

    /// Outline `text` with its baseline starting at `origin`.
    ///
    /// Fails with [`SurfaceError::Font`] when no face at all is available.
    pub fn outline(
        &mut self,
        text: &str,
        origin: Point,
        style: &TextStyle,
    ) -> Result<BezPath, SurfaceError> {
        let (data, index) = self.face_for(style)?;
        let face = Face::parse(&data, index).map_err(|e| SurfaceError::Font(e.to_string()))?;
        Ok(outline_glyphs(&face, text, origin, style.size))
    }

    fn face_for(&mut self, style: &TextStyle) -> Result<FaceData, SurfaceError> {
        let id = self
            .resolve(style)
            .ok_or_else(|| SurfaceError::Font(format!("no font for family {:?}", style.family)))?;
        if let Some(cached) = self.cache.get(&id) {
            return Ok(cached.clone());
        }
        let face = self
            .db
            .with_face_data(id, |data, index| (Arc::<[u8]>::from(data), index))
            .ok_or_else(|| SurfaceError::Font(format!("font source for {id:?} is unreadable")))?;
        self.cache.insert(id, face.clone());
        Ok(face)
    }

    fn resolve(&mut self, style: &TextStyle) -> Option<ID> {
        if let Some(id) = self.query(style) {
            return Some(id);
        }
        if !self.system_loaded {
            self.system_loaded = true;
            self.db.load_system_fonts();
            log::debug!("fonts: loaded {} system face(s)", self.db.len());
        }
        let default_family = TextStyle {
            family: String::new(),
            ..style.clone()
        };
        self.query(style)
            .or_else(|| self.query(&default_family))
            .or_else(|| self.db.faces().next().map(|face| face.id))
    }

    fn query(&self, style: &TextStyle) -> Option<ID> {
        let family = if style.family.is_empty() {
            Family::SansSerif
        } else {
            Family::Name(&style.family)
        };
        self.db.query(&Query {
            families: &[family],
            weight: if style.style.is_bold() {
                Weight::BOLD
            } else {
                Weight::NORMAL
            },
            style: if style.style.is_italic() {
                Style::Italic
            } else {
                Style::Normal
            },
            stretch: Stretch::Normal,
        })
    }
}

/// Lay glyphs out left to right by their horizontal advance.
fn outline_glyphs(face: &Face<'_>, text: &str, origin: Point, size: f64) -> BezPath {
    let scale = size / face.units_per_em() as f64;
    let mut pen = GlyphPen {
        path: BezPath::new(),
        x: origin.x,
        y: origin.y,
        scale,
    };
    for ch in text.chars().filter(|c| !c.is_control()) {
        let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
        face.outline_glyph(glyph, &mut pen);
        pen.x += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
    }
    pen.path
}

/// Font units (y up) to canvas space (y down) at the pen position.
struct GlyphPen {
    path: BezPath,
    x: f64,
    y: f64,
    scale: f64,
}

impl GlyphPen {
    fn at(&self, x: f32, y: f32) -> Point {
        Point::new(
            self.x + x as f64 * self.scale,
            self.y - y as f64 * self.scale,
        )
    }
}

impl OutlineBuilder for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.at(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.at(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.at(x1, y1), self.at(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.at(x1, y1), self.at(x2, y2), self.at(x, y));
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}
