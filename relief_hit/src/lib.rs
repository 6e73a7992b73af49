// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Hit: geometry-level hit testing for text boxes and their controls.
//!
//! This crate knows nothing about text. It answers two questions given
//! plain kurbo geometry:
//!
//! - Does a point land on a box that may be rotated about an anchor?
//!   See [`OrientedBox`] and the [`PreciseHitTest`] trait.
//! - Which control of a selected box does a point target: the rotate handle,
//!   one of the eight resize handles, or the inner move zone?
//!   See [`controls::HandleLayout::hit_control`].
//!
//! Misses are the normal outcome and are reported as `None`.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use relief_hit::{HitParams, OrientedBox, PreciseHitTest};
//!
//! let body = OrientedBox {
//!     rect: Rect::new(80.0, 80.0, 120.0, 120.0),
//!     anchor: Point::new(100.0, 100.0),
//!     rotation_deg: 90.0,
//! };
//! let params = HitParams::default();
//! assert!(body.hit_test(Point::new(100.0, 100.0), &params).is_some());
//! assert!(body.hit_test(Point::new(200.0, 100.0), &params).is_none());
//! ```

#![no_std]

pub mod controls;

pub use controls::{ControlHit, Handle, HandleLayout};

use core::f64::consts::PI;
use kurbo::{Affine, Point, Rect};

/// Tolerances used by precise hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitParams {
    /// Extra distance, in local units, by which a box body is grown on every side.
    pub fill_tolerance: f64,
}

impl Default for HitParams {
    fn default() -> Self {
        Self {
            fill_tolerance: 5.0,
        }
    }
}

/// What part of a shape was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// The point lies inside the body (possibly within tolerance of its edge).
    Fill,
    /// The point lies on a control handle.
    Handle,
}

/// Result of a successful precise hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitScore {
    /// Distance from the point to the hit target's reference point; smaller is closer.
    pub distance: f64,
    /// What was hit.
    pub kind: HitKind,
}

/// Geometry that can be hit tested against a point.
pub trait PreciseHitTest {
    /// Hit test a point given in the same space as the geometry.
    fn hit_test(&self, pt: Point, params: &HitParams) -> Option<HitScore>;
}

/// Convert degrees to radians without relying on `std` float helpers.
#[inline]
pub fn radians(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// An axis-aligned box that is drawn rotated about an anchor point.
///
/// `rect` is the unrotated footprint in canvas space. The body hit test
/// undoes the rotation on the query point instead of rotating the box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    /// Unrotated footprint in canvas coordinates.
    pub rect: Rect,
    /// Point the rotation is applied about.
    pub anchor: Point,
    /// Clockwise rotation in degrees (y grows downwards).
    pub rotation_deg: f64,
}

impl OrientedBox {
    /// Map a canvas point into the unrotated frame of this box.
    pub fn to_local(&self, pt: Point) -> Point {
        if self.rotation_deg == 0.0 {
            pt
        } else {
            Affine::rotate_about(-radians(self.rotation_deg), self.anchor) * pt
        }
    }
}

impl PreciseHitTest for OrientedBox {
    fn hit_test(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let local = self.to_local(pt);
        let grown = self
            .rect
            .inflate(params.fill_tolerance, params.fill_tolerance);
        let inside = local.x >= grown.x0
            && local.x <= grown.x1
            && local.y >= grown.y0
            && local.y <= grown.y1;
        inside.then(|| HitScore {
            distance: local.distance(self.rect.center()),
            kind: HitKind::Fill,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_box(rotation_deg: f64) -> OrientedBox {
        // 100 wide, 20 tall, centered on the anchor.
        OrientedBox {
            rect: Rect::new(50.0, 90.0, 150.0, 110.0),
            anchor: Point::new(100.0, 100.0),
            rotation_deg,
        }
    }

    #[test]
    fn unrotated_hits_inside_and_tolerance_band() {
        let params = HitParams::default();
        let b = wide_box(0.0);
        assert!(b.hit_test(Point::new(100.0, 100.0), &params).is_some());
        assert!(b.hit_test(Point::new(154.0, 100.0), &params).is_some());
        assert!(b.hit_test(Point::new(156.0, 100.0), &params).is_none());
        assert!(b.hit_test(Point::new(100.0, 116.0), &params).is_none());
    }

    #[test]
    fn rotation_moves_the_footprint() {
        let params = HitParams::default();
        let b = wide_box(90.0);
        // The long axis now runs vertically through the anchor.
        assert!(b.hit_test(Point::new(100.0, 145.0), &params).is_some());
        assert!(b.hit_test(Point::new(145.0, 100.0), &params).is_none());
    }

    #[test]
    fn anchor_is_fixed_under_rotation() {
        let b = wide_box(37.0);
        let local = b.to_local(b.anchor);
        assert!((local.x - 100.0).abs() < 1e-9);
        assert!((local.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn score_prefers_points_near_the_center() {
        let params = HitParams::default();
        let b = wide_box(0.0);
        let near = b.hit_test(Point::new(101.0, 100.0), &params).unwrap();
        let far = b.hit_test(Point::new(140.0, 100.0), &params).unwrap();
        assert_eq!(near.kind, HitKind::Fill);
        assert!(near.distance < far.distance);
    }
}
