// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text items and their identity.

use alloc::string::String;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point};
use relief_hit::radians;
use relief_text::FontChoice;

/// Smallest scale factor an item may have on either axis.
pub const MIN_SCALE: f64 = 0.1;

/// Base font size given to items created or loaded with an unusable size.
pub const MIN_FONT_SIZE: f64 = 1.0;

/// Returns `true` for a usable base font size: finite and positive.
pub fn is_valid_font_size(size: f64) -> bool {
    size.is_finite() && size > 0.0
}

/// Stable identity of a text item. Ids are handed out in increasing order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

/// The depth plane an item is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Layer {
    /// The base plane, drawn at full opacity.
    Background,
    /// The plane drawn offset and translucent on top of the background.
    Foreground,
}

/// A positioned, rotatable, scalable block of text.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextItem {
    /// Identity; assigned by the store.
    pub id: ItemId,
    /// Plane the item belongs to. Fixed at creation.
    pub layer: Layer,
    /// Content; lines are separated by `\n`.
    pub text: String,
    /// Base font size in pixels, before scaling.
    pub font_size: f64,
    /// Requested font.
    #[cfg_attr(feature = "serde", serde(default))]
    pub font: FontChoice,
    /// Anchor (center) x in canvas coordinates.
    pub x: f64,
    /// Anchor (center) y in canvas coordinates.
    pub y: f64,
    /// Clockwise rotation about the anchor, in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: f64,
    /// Horizontal scale factor, never below [`MIN_SCALE`].
    #[cfg_attr(feature = "serde", serde(default = "unit_scale"))]
    pub scale_x: f64,
    /// Vertical scale factor, never below [`MIN_SCALE`].
    #[cfg_attr(feature = "serde", serde(default = "unit_scale"))]
    pub scale_y: f64,
}

#[cfg(feature = "serde")]
fn unit_scale() -> f64 {
    1.0
}

impl TextItem {
    /// Anchor point.
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns `true` if the text is empty or only whitespace.
    ///
    /// Blank items are neither drawn nor hit-testable.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Lines of the text, split on `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split('\n')
    }

    /// Number of lines; an empty text still counts as one line.
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Font size as it appears on screen after vertical scaling, rounded to whole pixels.
    pub fn effective_font_size(&self) -> f64 {
        (self.font_size * self.scale_y).round()
    }

    /// Item space to canvas space: translate to the anchor (plus `offset_x`), rotate, scale.
    pub fn transform(&self, offset_x: f64) -> Affine {
        Affine::translate((self.x + offset_x, self.y))
            * Affine::rotate(radians(self.rotation))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Clamp both scale factors to [`MIN_SCALE`].
    pub(crate) fn clamp_scale(&mut self) {
        self.scale_x = self.scale_x.max(MIN_SCALE);
        self.scale_y = self.scale_y.max(MIN_SCALE);
    }

    /// Replace an unusable base font size with [`MIN_FONT_SIZE`].
    ///
    /// Returns `true` if the size had to be replaced.
    pub(crate) fn sanitize_font_size(&mut self) -> bool {
        if is_valid_font_size(self.font_size) {
            return false;
        }
        self.font_size = MIN_FONT_SIZE;
        true
    }
}
