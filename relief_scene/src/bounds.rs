// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding boxes of text items.
//!
//! Bounds are the item's footprint in canvas space with rotation ignored.
//! Rotation is handled by hit testing, which undoes it on the query point.

use kurbo::Rect;
use relief_text::TextMeasure;

use crate::TextItem;

/// Padding added on every side of the measured text.
pub const BOUNDS_PADDING: f64 = 10.0;

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Unrotated bounding box of `item` in canvas coordinates.
///
/// Lines are measured at the vertically scaled size (`font_size * scale_y`)
/// and the widest one is then scaled horizontally. The box is centered on
/// the anchor and padded by [`BOUNDS_PADDING`].
#[allow(
    clippy::cast_possible_truncation,
    reason = "font sizes are well inside f32 range"
)]
#[allow(
    clippy::cast_precision_loss,
    reason = "line counts are far below f64 precision limits"
)]
pub fn compute_bounds<M: TextMeasure + ?Sized>(item: &TextItem, measure: &M) -> Rect {
    let size = item.font_size * item.scale_y;
    let line_height = size * LINE_HEIGHT;
    let total_height = item.line_count() as f64 * line_height;

    let max_width = item
        .lines()
        .map(|line| f64::from(measure.line_width(&item.font, size as f32, line)) * item.scale_x)
        .fold(0.0_f64, f64::max);

    Rect::new(
        item.x - max_width / 2.0 - BOUNDS_PADDING,
        item.y - total_height / 2.0 - BOUNDS_PADDING,
        item.x + max_width / 2.0 + BOUNDS_PADDING,
        item.y + total_height / 2.0 + BOUNDS_PADDING,
    )
}
