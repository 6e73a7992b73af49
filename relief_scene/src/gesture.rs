// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer capture for the duration of a manipulation.
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use relief_scene::gesture::PointerCapture;
//!
//! let mut capture = PointerCapture::default();
//! capture.start(Point::new(10.0, 20.0));
//! assert_eq!(capture.total_offset(Point::new(30.0, 20.0)), Some(Vec2::new(20.0, 0.0)));
//! capture.release();
//! assert!(!capture.is_captured());
//! ```

use kurbo::{Point, Vec2};

/// Remembers where a captured pointer went down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerCapture {
    /// Press position, while captured.
    pub origin: Option<Point>,
}

impl PointerCapture {
    /// Begin capturing at `pos`.
    pub fn start(&mut self, pos: Point) {
        self.origin = Some(pos);
    }

    /// Displacement of `pos` from the press position.
    pub fn total_offset(&self, pos: Point) -> Option<Vec2> {
        self.origin.map(|origin| pos - origin)
    }

    /// End the capture.
    pub fn release(&mut self) {
        self.origin = None;
    }

    /// Returns `true` while captured.
    pub fn is_captured(&self) -> bool {
        self.origin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_capture_has_no_offset() {
        let capture = PointerCapture::default();
        assert!(!capture.is_captured());
        assert_eq!(capture.total_offset(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn offset_is_measured_from_the_press() {
        let mut capture = PointerCapture::default();
        capture.start(Point::new(5.0, 5.0));
        assert_eq!(
            capture.total_offset(Point::new(8.0, 1.0)),
            Some(Vec2::new(3.0, -4.0))
        );
        capture.release();
        assert_eq!(capture, PointerCapture::default());
    }
}
