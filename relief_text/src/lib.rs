// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Text: font resolution, line measurement and glyph outlines.
//!
//! Text items never touch font data directly. They carry a [`FontChoice`] and
//! a base size, and everything size-dependent goes through two traits:
//!
//! - [`TextMeasure`] answers "how wide is this line" and "where does the
//!   baseline sit". The bounds engine and hit testing only need this.
//! - [`TextPainter`] additionally produces glyph outlines for a line, which
//!   [`fill_line`] turns into an imaging path and fills with the current paint.
//!
//! Two implementations are provided:
//!
//! - [`FontBook`] resolves families against fonts registered at runtime and
//!   reads metrics and outlines with `skrifa`.
//! - [`BlockGlyphs`] draws every visible character as a solid block. It is the
//!   fallback when a family cannot be resolved and needs no font data at all,
//!   which makes it handy for tests.
//!
//! Lines are laid out left to right from x = 0 with the baseline at y = 0 and
//! y growing downwards.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod block;
mod book;

pub use block::BlockGlyphs;
pub use book::{FontBook, FontError, TEXT_WEIGHT};

use alloc::string::String;
use kurbo::BezPath;
use relief_imaging::{DrawOp, ImagingBackend, PathDesc, PathId};

/// Which font a text item asks for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontChoice {
    /// The host's default family.
    #[default]
    System,
    /// A named family, or a comma separated list of families tried in order.
    Family(String),
}

impl FontChoice {
    /// Convenience constructor for a named family.
    pub fn family(name: impl Into<String>) -> Self {
        Self::Family(name.into())
    }
}

/// Vertical extents of a font at a given size, both measured from the baseline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VerticalMetrics {
    /// Distance from the baseline up to the top of the em box.
    pub ascent: f32,
    /// Distance from the baseline down to the bottom of the em box.
    pub descent: f32,
}

impl VerticalMetrics {
    /// Offset from the vertical middle of the em box down to the baseline.
    ///
    /// Drawing a line with its baseline at `center + middle_to_baseline()`
    /// centers the em box on `center`.
    pub fn middle_to_baseline(&self) -> f32 {
        (self.ascent - self.descent) * 0.5
    }
}

/// Line measurement.
pub trait TextMeasure {
    /// Advance width of a single line of text at `size` pixels.
    fn line_width(&self, font: &FontChoice, size: f32, line: &str) -> f32;

    /// Vertical metrics of the resolved font at `size` pixels.
    fn vertical_metrics(&self, font: &FontChoice, size: f32) -> VerticalMetrics;
}

/// Line measurement plus glyph outlines.
pub trait TextPainter: TextMeasure {
    /// Outline of every glyph in `line`, laid out from the origin on the baseline.
    fn line_outline(&self, font: &FontChoice, size: f32, line: &str) -> BezPath;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn line_width(&self, font: &FontChoice, size: f32, line: &str) -> f32 {
        (**self).line_width(font, size, line)
    }

    fn vertical_metrics(&self, font: &FontChoice, size: f32) -> VerticalMetrics {
        (**self).vertical_metrics(font, size)
    }
}

impl<T: TextPainter + ?Sized> TextPainter for &T {
    fn line_outline(&self, font: &FontChoice, size: f32, line: &str) -> BezPath {
        (**self).line_outline(font, size, line)
    }
}

/// Create a path resource for `line` and fill it with the current paint and transform.
///
/// Returns the created path so the caller can destroy it once every recording
/// that references it is gone. Lines without any visible glyph create nothing.
pub fn fill_line<B, P>(
    backend: &mut B,
    painter: &P,
    font: &FontChoice,
    size: f32,
    line: &str,
) -> Option<PathId>
where
    B: ImagingBackend + ?Sized,
    P: TextPainter + ?Sized,
{
    let outline = painter.line_outline(font, size, line);
    if outline.elements().is_empty() {
        return None;
    }
    let path = backend.create_path(PathDesc::from_bez_path(&outline));
    backend.draw(DrawOp::FillPath(path));
    Some(path)
}
