// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surface size and its containment test.

use kurbo::{Point, Rect};

/// Size of the drawing surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    /// A 9:16 portrait canvas, 540 by 960.
    fn default() -> Self {
        Self::new(540, 960)
    }
}

impl Canvas {
    /// Create a canvas. Dimensions are expected to be positive.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Full canvas rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Returns `true` if `pt` lies in `[0, width] x [0, height]`, edges included.
    pub fn contains(&self, pt: Point) -> bool {
        let r = self.rect();
        pt.x >= r.x0 && pt.x <= r.x1 && pt.y >= r.y0 && pt.y <= r.y1
    }
}
