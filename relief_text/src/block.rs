// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font-free fallback glyphs.

use kurbo::BezPath;

use crate::{FontChoice, TextMeasure, TextPainter, VerticalMetrics};

/// Advance of every character, in em.
const ADVANCE_EM: f32 = 0.6;
/// Horizontal inset of a block inside its advance, in em.
const INSET_EM: f32 = 0.05;
/// Height of a block above the baseline, in em.
const BLOCK_HEIGHT_EM: f32 = 0.7;
const ASCENT_EM: f32 = 0.8;
const DESCENT_EM: f32 = 0.2;

/// Monospaced block glyphs that need no font data.
///
/// Every character advances by 0.6 em. Visible characters draw as a solid
/// block 0.5 em wide and 0.7 em tall standing on the baseline; whitespace
/// only advances. The font choice is ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockGlyphs;

impl BlockGlyphs {
    /// Vertical metrics used for block glyphs at `size`.
    pub fn metrics(size: f32) -> VerticalMetrics {
        VerticalMetrics {
            ascent: size * ASCENT_EM,
            descent: size * DESCENT_EM,
        }
    }

    /// Advance of a single character at `size`.
    pub fn advance(size: f32) -> f32 {
        size * ADVANCE_EM
    }

    /// Append the block for one character whose advance starts at `x`.
    pub(crate) fn push_block(path: &mut BezPath, x: f64, size: f32) {
        let size = f64::from(size);
        let x0 = x + size * f64::from(INSET_EM);
        let x1 = x + size * f64::from(ADVANCE_EM - INSET_EM);
        let y0 = -size * f64::from(BLOCK_HEIGHT_EM);
        path.move_to((x0, y0));
        path.line_to((x1, y0));
        path.line_to((x1, 0.0));
        path.line_to((x0, 0.0));
        path.close_path();
    }
}

impl TextMeasure for BlockGlyphs {
    #[allow(
        clippy::cast_precision_loss,
        reason = "character counts of a single line are far below f32 precision limits"
    )]
    fn line_width(&self, _font: &FontChoice, size: f32, line: &str) -> f32 {
        line.chars().count() as f32 * Self::advance(size)
    }

    fn vertical_metrics(&self, _font: &FontChoice, size: f32) -> VerticalMetrics {
        Self::metrics(size)
    }
}

impl TextPainter for BlockGlyphs {
    fn line_outline(&self, _font: &FontChoice, size: f32, line: &str) -> BezPath {
        let mut path = BezPath::new();
        let advance = f64::from(Self::advance(size));
        let mut x = 0.0;
        for ch in line.chars() {
            if !ch.is_whitespace() {
                Self::push_block(&mut path, x, size);
            }
            x += advance;
        }
        path
    }
}
