// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

use crate::color::contrast_color;

/// Inputs read on every composite.
///
/// With the `serde` feature colors are written as `#RRGGBB` strings and
/// missing fields take their default values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Fill of the whole canvas under the background plane.
    #[cfg_attr(feature = "serde", serde(with = "crate::color::hex_serde"))]
    pub background: Color,
    /// Color of background-plane text.
    #[cfg_attr(feature = "serde", serde(with = "crate::color::hex_serde"))]
    pub background_text: Color,
    /// Color of foreground-plane text.
    #[cfg_attr(feature = "serde", serde(with = "crate::color::hex_serde"))]
    pub foreground_text: Color,
    /// Horizontal shift of the foreground plane in pixels.
    pub offset: f64,
    /// Opacity the foreground plane is composited at.
    pub opacity: f32,
    /// Whether to finish with the blurred restacking pass.
    pub depth_pass: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::from_rgb8(0x05, 0x00, 0xFB),
            background_text: Color::from_rgb8(0x02, 0x0F, 0x5F),
            foreground_text: Color::from_rgb8(0xFE, 0x01, 0x91),
            offset: 12.0,
            opacity: 0.8,
            depth_pass: true,
        }
    }
}

impl RenderConfig {
    /// Apply a color preset.
    ///
    /// Background text gets the contrast color of the new background.
    pub fn apply_preset(&mut self, background: Color, foreground_text: Color) {
        self.background = background;
        self.foreground_text = foreground_text;
        self.background_text = contrast_color(background);
    }

    /// [`Self::opacity`] limited to `0..=1`; NaN counts as fully opaque.
    pub fn foreground_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }
}
