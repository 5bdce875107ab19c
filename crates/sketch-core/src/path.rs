//! Path commands and the per-canvas path accumulator.
//!
//! A [`Path`] is an append-only list of [`PathCmd`]s. Backends never see
//! the raw commands: they receive a `kurbo::BezPath` built by
//! [`Path::to_bez_path`], which resolves tangent arcs and circles into
//! plain curve segments.

use kurbo::{Arc, BezPath, Circle, Point, Shape, Vec2};
use smallvec::SmallVec;
use std::f64::consts::{PI, TAU};

/// Tolerance used when flattening arcs and circles into cubic segments.
pub const CURVE_TOLERANCE: f64 = 0.1;

/// One instruction in a vector path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    /// control 1, control 2, end
    CubicTo(Point, Point, Point),
    /// Tangent arc: line toward the corner `p1`, rounded with `radius`,
    /// leaving along the direction of `p2`.
    ArcTo(Point, Point, f64),
    /// A complete circular sub-path.
    Circle { center: Point, radius: f64 },
    Close,
}

/// An ordered list of path commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: SmallVec<[PathCmd; 8]>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.cmds.push(PathCmd::MoveTo(p.into()));
        self
    }

    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.cmds.push(PathCmd::LineTo(p.into()));
        self
    }

    pub fn cubic_to(
        &mut self,
        c1: impl Into<Point>,
        c2: impl Into<Point>,
        end: impl Into<Point>,
    ) -> &mut Self {
        self.cmds.push(PathCmd::CubicTo(c1.into(), c2.into(), end.into()));
        self
    }

    pub fn arc_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        radius: f64,
    ) -> &mut Self {
        self.cmds.push(PathCmd::ArcTo(p1.into(), p2.into(), radius));
        self
    }

    pub fn add_circle(&mut self, center: impl Into<Point>, radius: f64) -> &mut Self {
        self.cmds.push(PathCmd::Circle {
            center: center.into(),
            radius,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.cmds.push(PathCmd::Close);
        self
    }

    pub fn extend(&mut self, other: &Path) {
        self.cmds.extend_from_slice(&other.cmds);
    }

    pub fn commands(&self) -> &[PathCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Drop every command, keeping the allocation.
    pub fn rewind(&mut self) {
        self.cmds.clear();
    }

    /// Resolve the commands into a `BezPath` that any backend can consume.
    ///
    /// Drawing commands issued with no current point start at the origin;
    /// commands after a `Close` restart from the closed sub-path's start.
    pub fn to_bez_path(&self) -> BezPath {
        let mut bez = BezPath::new();
        let mut current = Point::ORIGIN;
        let mut subpath_start = Point::ORIGIN;
        let mut needs_move = true;

        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    bez.move_to(p);
                    current = p;
                    subpath_start = p;
                    needs_move = false;
                }
                PathCmd::LineTo(p) => {
                    if needs_move {
                        bez.move_to(current);
                        needs_move = false;
                    }
                    bez.line_to(p);
                    current = p;
                }
                PathCmd::CubicTo(c1, c2, end) => {
                    if needs_move {
                        bez.move_to(current);
                        needs_move = false;
                    }
                    bez.curve_to(c1, c2, end);
                    current = end;
                }
                PathCmd::ArcTo(p1, p2, radius) => {
                    if needs_move {
                        bez.move_to(current);
                        needs_move = false;
                    }
                    match tangent_arc(current, p1, p2, radius) {
                        Some(arc) => {
                            bez.line_to(arc.start);
                            for el in arc.arc.append_iter(CURVE_TOLERANCE) {
                                bez.push(el);
                            }
                            current = arc.end;
                        }
                        None => {
                            bez.line_to(p1);
                            current = p1;
                        }
                    }
                }
                PathCmd::Circle { center, radius } => {
                    for el in Circle::new(center, radius).path_elements(CURVE_TOLERANCE) {
                        bez.push(el);
                    }
                    current = center + Vec2::new(radius, 0.0);
                    subpath_start = current;
                    needs_move = true;
                }
                PathCmd::Close => {
                    if !needs_move {
                        bez.close_path();
                    }
                    current = subpath_start;
                    needs_move = true;
                }
            }
        }
        bez
    }
}

/// A circular arc rounding the corner between two line segments.
#[derive(Debug, Clone, Copy)]
pub struct TangentArc {
    /// Tangent point on the incoming segment.
    pub start: Point,
    /// Tangent point on the outgoing segment.
    pub end: Point,
    pub arc: Arc,
}

/// Fit a circle of `radius` into the corner `p0 → p1 → p2`.
///
/// Returns `None` when the corner is degenerate (zero or non-finite radius,
/// zero-length legs, or collinear points); the caller then draws a straight
/// line to `p1`.
pub fn tangent_arc(p0: Point, p1: Point, p2: Point, radius: f64) -> Option<TangentArc> {
    if !(radius > 0.0) || !radius.is_finite() {
        return None;
    }
    let d0 = p0 - p1;
    let d2 = p2 - p1;
    let (l0, l2) = (d0.hypot(), d2.hypot());
    if l0 == 0.0 || l2 == 0.0 {
        return None;
    }
    let u0 = d0 / l0;
    let u2 = d2 / l2;
    if u0.cross(u2).abs() < 1e-9 {
        return None;
    }

    let half = u0.dot(u2).clamp(-1.0, 1.0).acos() / 2.0;
    let dist = radius / half.tan();
    let start = p1 + u0 * dist;
    let end = p1 + u2 * dist;
    let center = p1 + (u0 + u2).normalize() * (radius / half.sin());

    let start_angle = (start - center).atan2();
    let mut sweep = (end - center).atan2() - start_angle;
    while sweep > PI {
        sweep -= TAU;
    }
    while sweep <= -PI {
        sweep += TAU;
    }

    Some(TangentArc {
        start,
        end,
        arc: Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle: sweep,
            x_rotation: 0.0,
        },
    })
}

// ─── Accumulator ─────────────────────────────────────────────────────────

/// Holds the single path under construction for a canvas.
///
/// One path is built, rendered, and discarded per shape call.
#[derive(Debug, Default)]
pub struct PathAccumulator {
    path: Path,
}

impl PathAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The path shape builders append into.
    pub fn path_mut(&mut self) -> &mut Path {
        &mut self.path
    }

    pub fn append(&mut self, commands: &Path) {
        self.path.extend(commands);
    }

    /// Inspect the pending path without discarding it.
    pub fn current(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Take the accumulated path and leave the accumulator empty.
    pub fn consume_and_rewind(&mut self) -> Path {
        std::mem::take(&mut self.path)
    }

    pub fn rewind(&mut self) {
        self.path.rewind();
    }
}
