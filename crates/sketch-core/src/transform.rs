//! Transform commands and push/pop discipline.
//!
//! The backend surface owns the actual matrix stack. This side only turns
//! user calls into affine matrices and counts outstanding pushes so an
//! unmatched `pop` is rejected before it reaches the backend.

use crate::error::{Error, Result};
use kurbo::{Affine, Vec2};

/// A single transform applied on top of the current matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Translate(f64, f64),
    /// Clockwise rotation in degrees (y axis points down).
    Rotate(f64),
    Scale(f64, f64),
}

impl Transform {
    /// Uniform scale when `sy` is absent.
    pub fn scale(sx: f64, sy: Option<f64>) -> Self {
        Transform::Scale(sx, sy.unwrap_or(sx))
    }

    pub fn to_affine(&self) -> Affine {
        match *self {
            Transform::Translate(x, y) => Affine::translate(Vec2::new(x, y)),
            Transform::Rotate(deg) => Affine::rotate(deg.to_radians()),
            Transform::Scale(sx, sy) => Affine::scale_non_uniform(sx, sy),
        }
    }
}

/// Counts outstanding pushes.
#[derive(Debug, Default)]
pub struct TransformStack {
    depth: usize,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.depth += 1;
    }

    /// Fails with [`Error::UnbalancedPop`] when nothing is pushed.
    pub fn pop(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::UnbalancedPop);
        }
        self.depth -= 1;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Forget outstanding pushes, returning how many were dropped.
    pub fn reset(&mut self) -> usize {
        std::mem::take(&mut self.depth)
    }
}
