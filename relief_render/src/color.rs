// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hex color strings and derived colors.

use alloc::format;
use alloc::string::{String, ToString};

use peniko::Color;

/// A color string that is not `#RRGGBB` or `#RGB`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The leading `#` is missing.
    #[error("color `{0}` must start with `#`")]
    MissingHash(String),
    /// Neither three nor six digits follow the `#`.
    #[error("color `{0}` must have 3 or 6 hex digits")]
    BadLength(String),
    /// A character after the `#` is not a hex digit.
    #[error("color `{0}` contains a non-hex digit")]
    BadDigit(String),
}

/// Parse an opaque `#RRGGBB` or `#RGB` color. Digits are case-insensitive.
///
/// ```
/// use peniko::Color;
/// use relief_render::parse_hex;
///
/// assert_eq!(parse_hex("#FE0191").unwrap(), Color::from_rgb8(0xFE, 0x01, 0x91));
/// assert_eq!(parse_hex("#fff").unwrap(), Color::WHITE);
/// assert!(parse_hex("FE0191").is_err());
/// ```
pub fn parse_hex(s: &str) -> Result<Color, ColorError> {
    let digits = s
        .strip_prefix('#')
        .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::BadDigit(s.to_string()));
    }
    let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).unwrap_or(0);
    let [r, g, b] = match digits.len() {
        6 => [0, 2, 4].map(|i| (nibble(i) << 4) | nibble(i + 1)),
        3 => [0, 1, 2].map(|i| nibble(i) * 0x11),
        _ => return Err(ColorError::BadLength(s.to_string())),
    };
    Ok(Color::from_rgb8(r, g, b))
}

/// Format the opaque part of `color` as uppercase `#RRGGBB`.
pub fn to_hex(color: Color) -> String {
    let c = color.to_rgba8();
    format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
}

/// Perceived brightness in `0..=255` using the `299/587/114` luma weights.
pub fn brightness(color: Color) -> f64 {
    let c = color.to_rgba8();
    (f64::from(c.r) * 299.0 + f64::from(c.g) * 587.0 + f64::from(c.b) * 114.0) / 1000.0
}

/// Black on bright colors, white on dark ones.
pub fn contrast_color(color: Color) -> Color {
    if brightness(color) > 128.0 {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

/// Channel-wise inverse of the opaque part of `color`.
pub fn complementary_color(color: Color) -> Color {
    let c = color.to_rgba8();
    Color::from_rgb8(255 - c.r, 255 - c.g, 255 - c.b)
}

#[cfg(feature = "serde")]
pub(crate) mod hex_serde {
    use alloc::string::String;

    use peniko::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(*color))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_forms() {
        assert_eq!(parse_hex("#0500FB"), Ok(Color::from_rgb8(5, 0, 251)));
        assert_eq!(parse_hex("#0500fb"), Ok(Color::from_rgb8(5, 0, 251)));
        assert_eq!(parse_hex("#1aF"), Ok(Color::from_rgb8(0x11, 0xAA, 0xFF)));
    }

    #[test]
    fn malformed_strings() {
        assert_eq!(
            parse_hex("0500FB"),
            Err(ColorError::MissingHash("0500FB".into()))
        );
        assert_eq!(parse_hex("#05"), Err(ColorError::BadLength("#05".into())));
        assert_eq!(parse_hex("#"), Err(ColorError::BadLength("#".into())));
        assert_eq!(parse_hex("#GG00FB"), Err(ColorError::BadDigit("#GG00FB".into())));
        assert_eq!(parse_hex("#+1+2+3"), Err(ColorError::BadDigit("#+1+2+3".into())));
        assert_eq!(parse_hex("#é12"), Err(ColorError::BadDigit("#é12".into())));
    }

    #[test]
    fn hex_formatting_is_uppercase() {
        assert_eq!(to_hex(Color::from_rgb8(0xfe, 0x01, 0x91)), "#FE0191");
    }

    #[test]
    fn contrast_picks_black_or_white() {
        assert_eq!(contrast_color(Color::from_rgb8(5, 0, 251)), Color::WHITE);
        assert_eq!(contrast_color(Color::from_rgb8(255, 255, 0)), Color::BLACK);
        // Exactly 128 is still dark.
        assert_eq!(contrast_color(Color::from_rgb8(128, 128, 128)), Color::WHITE);
    }

    #[test]
    fn complement_inverts_channels() {
        assert_eq!(
            complementary_color(Color::from_rgb8(5, 0, 251)),
            Color::from_rgb8(250, 255, 4)
        );
    }
}
