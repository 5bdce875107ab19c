//! Shape geometry: high-level shape parameters → path commands.
//!
//! Every builder appends to a target [`Path`] and always starts its shape
//! with a `MoveTo`. Nothing here touches a surface.

use crate::error::{Error, Result};
use crate::path::Path;
use kurbo::Point;

/// Control-point distance for approximating a quarter circle with a cubic.
pub const KAPPA: f64 = 0.5522847498;

pub fn line(path: &mut Path, x1: f64, y1: f64, x2: f64, y2: f64) {
    path.move_to((x1, y1)).line_to((x2, y2));
}

/// Four-cubic approximation of the ellipse inscribed in `[x, x+w] × [y, y+h]`.
pub fn ellipse(path: &mut Path, x: f64, y: f64, w: f64, h: f64) {
    let ox = w / 2.0 * KAPPA;
    let oy = h / 2.0 * KAPPA;
    let xe = x + w;
    let ye = y + h;
    let xm = x + w / 2.0;
    let ym = y + h / 2.0;

    path.move_to((x, ym));
    path.cubic_to((x, ym - oy), (xm - ox, y), (xm, y));
    path.cubic_to((xm + ox, y), (xe, ym - oy), (xe, ym));
    path.cubic_to((xe, ym + oy), (xm + ox, ye), (xm, ye));
    path.cubic_to((xm - ox, ye), (x, ym + oy), (x, ym));
}

/// Circle of diameter `d` centred on `(x, y)`, using the native circle primitive.
pub fn circle(path: &mut Path, x: f64, y: f64, d: f64) {
    path.add_circle((x, y), d / 2.0);
}

#[allow(clippy::too_many_arguments)]
pub fn quad(
    path: &mut Path,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    x4: f64,
    y4: f64,
) {
    path.move_to((x1, y1))
        .line_to((x2, y2))
        .line_to((x3, y3))
        .line_to((x4, y4))
        .close();
}

pub fn triangle(path: &mut Path, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
    path.move_to((x1, y1))
        .line_to((x2, y2))
        .line_to((x3, y3))
        .close();
}

/// Closed polygon through `points`. An empty slice emits nothing.
pub fn polygon(path: &mut Path, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close();
}

/// Arcs with arbitrary start and sweep angles are not supported yet.
pub fn arc(
    _path: &mut Path,
    _x: f64,
    _y: f64,
    _w: f64,
    _h: f64,
    _start: f64,
    _stop: f64,
) -> Result<()> {
    Err(Error::NotImplemented("arc"))
}

// ─── Rectangles ──────────────────────────────────────────────────────────

/// Optional per-corner radii for [`rect`].
///
/// With no top-left radius the rectangle has square corners. Each
/// other unset corner inherits from its predecessor: tr ← tl, br ← tr,
/// bl ← br.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CornerRadii {
    pub tl: Option<f64>,
    pub tr: Option<f64>,
    pub br: Option<f64>,
    pub bl: Option<f64>,
}

impl CornerRadii {
    pub const SQUARE: Self = Self {
        tl: None,
        tr: None,
        br: None,
        bl: None,
    };

    pub fn uniform(r: f64) -> Self {
        Self {
            tl: Some(r),
            ..Self::SQUARE
        }
    }

    pub fn new(tl: f64, tr: f64, br: f64, bl: f64) -> Self {
        Self {
            tl: Some(tl),
            tr: Some(tr),
            br: Some(br),
            bl: Some(bl),
        }
    }

    /// Cascade missing radii, then clamp each one against the box.
    ///
    /// Every radius is checked against both the absolute width and the
    /// absolute height, one after the other, so a radius can be clamped
    /// twice. Returns `None` for a square-cornered rectangle.
    pub fn resolve(&self, w: f64, h: f64) -> Option<ResolvedRadii> {
        let tl = self.tl?;
        let tr = self.tr.unwrap_or(tl);
        let br = self.br.unwrap_or(tr);
        let bl = self.bl.unwrap_or(br);

        let abs_w = w.abs();
        let abs_h = h.abs();
        let clamp = |mut r: f64| {
            if abs_w < 2.0 * r {
                r = abs_w / 2.0;
            }
            if abs_h < 2.0 * r {
                r = abs_h / 2.0;
            }
            r
        };

        Some(ResolvedRadii {
            tl: clamp(tl),
            tr: clamp(tr),
            br: clamp(br),
            bl: clamp(bl),
        })
    }
}

/// Corner radii after cascading and clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRadii {
    pub tl: f64,
    pub tr: f64,
    pub br: f64,
    pub bl: f64,
}

/// Rectangle at `(x, y)` of size `w × h`, optionally with rounded corners.
pub fn rect(path: &mut Path, x: f64, y: f64, w: f64, h: f64, radii: CornerRadii) {
    let Some(r) = radii.resolve(w, h) else {
        path.move_to((x, y))
            .line_to((x + w, y))
            .line_to((x + w, y + h))
            .line_to((x, y + h))
            .close();
        return;
    };

    path.move_to((x + r.tl, y))
        .arc_to((x + w, y), (x + w, y + h), r.tr)
        .arc_to((x + w, y + h), (x, y + h), r.br)
        .arc_to((x, y + h), (x, y), r.bl)
        .arc_to((x, y), (x + w, y), r.tl)
        .close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCmd;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_is_move_then_line() {
        let mut path = Path::new();
        line(&mut path, 1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            path.commands(),
            &[
                PathCmd::MoveTo(Point::new(1.0, 2.0)),
                PathCmd::LineTo(Point::new(3.0, 4.0)),
            ]
        );
    }

    #[test]
    fn ellipse_uses_kappa_offsets() {
        let mut path = Path::new();
        ellipse(&mut path, 0.0, 0.0, 200.0, 100.0);
        let PathCmd::CubicTo(c1, c2, end) = path.commands()[1] else {
            panic!("expected cubic");
        };
        assert_eq!(c1, Point::new(0.0, 50.0 - 50.0 * KAPPA));
        assert_eq!(c2, Point::new(100.0 - 100.0 * KAPPA, 0.0));
        assert_eq!(end, Point::new(100.0, 0.0));
    }

    #[test]
    fn circle_uses_native_primitive() {
        let mut path = Path::new();
        circle(&mut path, 10.0, 20.0, 30.0);
        assert_eq!(
            path.commands(),
            &[PathCmd::Circle {
                center: Point::new(10.0, 20.0),
                radius: 15.0,
            }]
        );
    }

    #[test]
    fn square_rect_is_closed_four_point_polygon() {
        let mut path = Path::new();
        rect(&mut path, 10.0, 10.0, 50.0, 50.0, CornerRadii::SQUARE);
        assert_eq!(
            path.commands(),
            &[
                PathCmd::MoveTo(Point::new(10.0, 10.0)),
                PathCmd::LineTo(Point::new(60.0, 10.0)),
                PathCmd::LineTo(Point::new(60.0, 60.0)),
                PathCmd::LineTo(Point::new(10.0, 60.0)),
                PathCmd::Close,
            ]
        );
    }

    #[test]
    fn radii_cascade_from_predecessor() {
        let radii = CornerRadii {
            tl: Some(4.0),
            tr: None,
            br: Some(8.0),
            bl: None,
        };
        let r = radii.resolve(100.0, 100.0).unwrap();
        assert_eq!(
            r,
            ResolvedRadii {
                tl: 4.0,
                tr: 4.0,
                br: 8.0,
                bl: 8.0,
            }
        );
    }

    #[test]
    fn missing_top_left_means_square_corners() {
        let radii = CornerRadii {
            tl: None,
            tr: Some(5.0),
            br: None,
            bl: None,
        };
        assert_eq!(radii.resolve(10.0, 10.0), None);
    }

    #[test]
    fn oversized_radius_clamps_to_half_edge() {
        let r = CornerRadii::uniform(30.0).resolve(40.0, 40.0).unwrap();
        assert_eq!(r.tl, 20.0);
        assert_eq!(r.br, 20.0);
    }

    #[test]
    fn clamp_checks_both_axes_for_every_corner() {
        // Wide, short box: the 10-unit height clamps every corner to 5
        // even though the width alone would allow 30.
        let r = CornerRadii::uniform(30.0).resolve(200.0, 10.0).unwrap();
        assert_eq!(
            r,
            ResolvedRadii {
                tl: 5.0,
                tr: 5.0,
                br: 5.0,
                bl: 5.0,
            }
        );
    }

    #[test]
    fn clamp_uses_absolute_dimensions() {
        let r = CornerRadii::uniform(30.0).resolve(-40.0, -20.0).unwrap();
        assert_eq!(r.tl, 10.0);
    }

    #[test]
    fn rounded_rect_starts_after_top_left_radius() {
        let mut path = Path::new();
        rect(&mut path, 0.0, 0.0, 40.0, 40.0, CornerRadii::uniform(30.0));
        assert_eq!(path.commands()[0], PathCmd::MoveTo(Point::new(20.0, 0.0)));
        assert_eq!(
            path.commands()[1],
            PathCmd::ArcTo(Point::new(40.0, 0.0), Point::new(40.0, 40.0), 20.0)
        );
        assert_eq!(path.commands().last(), Some(&PathCmd::Close));
    }

    #[test]
    fn polygon_closes_through_every_vertex() {
        let mut path = Path::new();
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.0),
        ];
        polygon(&mut path, &pts);
        assert_eq!(path.len(), 4);
        assert_eq!(path.commands()[3], PathCmd::Close);

        let mut empty = Path::new();
        polygon(&mut empty, &[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn arc_is_not_implemented() {
        let mut path = Path::new();
        let err = arc(&mut path, 0.0, 0.0, 10.0, 10.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::NotImplemented("arc")));
        assert!(path.is_empty());
    }
}
