// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime font registry backed by `skrifa`.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{BezPath, Point};
use log::{debug, warn};
use peniko::{Blob, FontData};
use skrifa::instance::{Location, LocationRef, Size};
use skrifa::metrics::{GlyphMetrics, Metrics};
use skrifa::outline::OutlinePen;
use skrifa::{FontRef, MetadataProvider};

use crate::{BlockGlyphs, FontChoice, TextMeasure, TextPainter, VerticalMetrics};

/// Errors raised while registering fonts.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// The bytes could not be parsed as a font (or the collection index is out of range).
    #[error("font data for family `{family}` is not a readable font")]
    InvalidFont {
        /// Family the font was being registered under.
        family: String,
    },
    /// Reading a font file failed.
    #[cfg(feature = "std")]
    #[error("failed to read font file {}", .path.display())]
    Io {
        /// Path that was being read.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Weight text is set in unless changed with [`FontBook::set_weight`]: bold.
pub const TEXT_WEIGHT: f32 = 700.0;

const WEIGHT_AXIS: &str = "wght";

/// One registered face and the weight it declares.
#[derive(Clone, Debug)]
struct Face {
    data: FontData,
    weight: f32,
}

/// Fonts registered by family name.
///
/// A family may hold several faces, typically a regular and a bold file.
/// Lookups pick the face whose declared weight is closest to the book's
/// weight, [`TEXT_WEIGHT`] unless changed; variable fonts are additionally
/// instanced at that weight on their `wght` axis.
///
/// Family lookup is case-insensitive. A [`FontChoice::Family`] may name
/// several comma separated families, CSS style; the first registered one
/// wins. [`FontChoice::System`] and families that cannot be resolved use the
/// default family, which is the first one registered unless changed with
/// [`FontBook::set_default_family`]. With no usable font at all, measurement
/// and outlines fall back to [`BlockGlyphs`].
#[derive(Debug)]
pub struct FontBook {
    faces: BTreeMap<String, Vec<Face>>,
    default_family: Option<String>,
    weight: f32,
    /// Families already reported as missing, so the warning is logged once.
    reported: RefCell<BTreeSet<String>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self {
            faces: BTreeMap::new(),
            default_family: None,
            weight: TEXT_WEIGHT,
            reported: RefCell::default(),
        }
    }
}

impl FontBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` (face `index` of a font file or collection) under `family`.
    ///
    /// Registering more faces under the same family adds to it.
    pub fn register(
        &mut self,
        family: &str,
        data: Vec<u8>,
        index: u32,
    ) -> Result<(), FontError> {
        let Ok(font) = FontRef::from_index(&data, index) else {
            return Err(FontError::InvalidFont {
                family: family.to_string(),
            });
        };
        let weight = font.attributes().weight.value();
        let key = normalize(family);
        debug!("registered font family `{key}` (face {index}, weight {weight})");
        self.faces.entry(key.clone()).or_default().push(Face {
            data: FontData::new(Blob::from(data), index),
            weight,
        });
        if self.default_family.is_none() {
            self.default_family = Some(key);
        }
        Ok(())
    }

    /// Read a font file from disk and register its first face under `family`.
    #[cfg(feature = "std")]
    pub fn load_file(
        &mut self,
        family: &str,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register(family, data, 0)
    }

    /// Make `family` the default. Returns `false` if it is not registered.
    pub fn set_default_family(&mut self, family: &str) -> bool {
        let key = normalize(family);
        if self.faces.contains_key(&key) {
            self.default_family = Some(key);
            true
        } else {
            false
        }
    }

    /// Weight text is set in.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Set the weight text is set in, on the usual 1 to 1000 scale.
    ///
    /// Non-finite values are ignored.
    pub fn set_weight(&mut self, weight: f32) {
        if weight.is_finite() {
            self.weight = weight.clamp(1.0, 1000.0);
        }
    }

    /// Registered family names, normalized.
    pub fn families(&self) -> impl Iterator<Item = &str> + '_ {
        self.faces.keys().map(String::as_str)
    }

    /// Returns `true` if no font is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Resolve a choice to registered font data, if any.
    pub fn resolve(&self, choice: &FontChoice) -> Option<&FontData> {
        if let FontChoice::Family(list) = choice {
            let found = list
                .split(',')
                .map(normalize)
                .find_map(|name| self.closest_face(&name));
            if found.is_some() {
                return found;
            }
            if self.reported.borrow_mut().insert(list.clone()) {
                warn!("font family `{list}` is not registered, using the default family");
            }
        }
        self.default_family
            .as_ref()
            .and_then(|name| self.closest_face(name))
    }

    /// Face of `family` whose weight is nearest the book's; the first registered wins ties.
    fn closest_face(&self, family: &str) -> Option<&FontData> {
        let distance = |face: &Face| {
            if face.weight > self.weight {
                face.weight - self.weight
            } else {
                self.weight - face.weight
            }
        };
        self.faces
            .get(family)?
            .iter()
            .reduce(|best, face| if distance(face) < distance(best) { face } else { best })
            .map(|face| &face.data)
    }

    fn with_font<R>(
        &self,
        choice: &FontChoice,
        f: impl for<'a> FnOnce(&FontRef<'a>, LocationRef<'a>) -> R,
    ) -> Option<R> {
        let data = self.resolve(choice)?;
        let font = FontRef::from_index(data.data.as_ref(), data.index).ok()?;
        let location: Location = font.axes().location([(WEIGHT_AXIS, self.weight)]);
        Some(f(&font, LocationRef::from(&location)))
    }
}

fn normalize(family: &str) -> String {
    family
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_lowercase()
}

impl TextMeasure for FontBook {
    fn line_width(&self, font: &FontChoice, size: f32, line: &str) -> f32 {
        self.with_font(font, |face, location| {
            let charmap = face.charmap();
            let metrics = GlyphMetrics::new(face, Size::new(size), location);
            line.chars()
                .map(|ch| {
                    charmap
                        .map(ch)
                        .and_then(|gid| metrics.advance_width(gid))
                        .unwrap_or(BlockGlyphs::advance(size))
                })
                .sum::<f32>()
        })
        .unwrap_or_else(|| BlockGlyphs.line_width(font, size, line))
    }

    fn vertical_metrics(&self, font: &FontChoice, size: f32) -> VerticalMetrics {
        self.with_font(font, |face, location| {
            let metrics = Metrics::new(face, Size::new(size), location);
            VerticalMetrics {
                ascent: metrics.ascent,
                descent: -metrics.descent,
            }
        })
        .unwrap_or_else(|| BlockGlyphs::metrics(size))
    }
}

/// Pen that appends outlines to a path, flipping Y and shifting by the pen position.
struct LinePen<'a> {
    path: &'a mut BezPath,
    dx: f64,
}

impl LinePen<'_> {
    fn pt(&self, x: f32, y: f32) -> Point {
        Point::new(self.dx + f64::from(x), -f64::from(y))
    }
}

impl OutlinePen for LinePen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.pt(x1, y1), self.pt(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.pt(x1, y1), self.pt(x2, y2), self.pt(x, y));
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

impl TextPainter for FontBook {
    fn line_outline(&self, font: &FontChoice, size: f32, line: &str) -> BezPath {
        self.with_font(font, |face, location| {
            let charmap = face.charmap();
            let metrics = GlyphMetrics::new(face, Size::new(size), location);
            let outlines = face.outline_glyphs();
            let mut path = BezPath::new();
            let mut x = 0.0_f64;
            for ch in line.chars() {
                let advance = match charmap.map(ch) {
                    Some(gid) => {
                        if let Some(glyph) = outlines.get(gid) {
                            let mut pen = LinePen {
                                path: &mut path,
                                dx: x,
                            };
                            // A glyph that fails to draw leaves a gap; its advance still applies.
                            let _ = glyph.draw((Size::new(size), location), &mut pen);
                        }
                        metrics
                            .advance_width(gid)
                            .unwrap_or(BlockGlyphs::advance(size))
                    }
                    None => {
                        if !ch.is_whitespace() {
                            BlockGlyphs::push_block(&mut path, x, size);
                        }
                        BlockGlyphs::advance(size)
                    }
                };
                x += f64::from(advance);
            }
            path
        })
        .unwrap_or_else(|| BlockGlyphs.line_outline(font, size, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_garbage() {
        let mut book = FontBook::new();
        let err = book
            .register("Nope", b"not a font".to_vec(), 0)
            .expect_err("garbage is not a font");
        assert!(matches!(err, FontError::InvalidFont { ref family } if family == "Nope"));
        assert!(book.is_empty());
    }

    #[test]
    fn empty_book_falls_back_to_blocks() {
        let book = FontBook::new();
        let choice = FontChoice::family("Arial, sans-serif");

        assert!(book.resolve(&choice).is_none());
        assert_eq!(
            book.line_width(&choice, 40.0, "Trae"),
            BlockGlyphs.line_width(&choice, 40.0, "Trae")
        );
        assert_eq!(
            book.vertical_metrics(&FontChoice::System, 40.0),
            BlockGlyphs::metrics(40.0)
        );
        assert_eq!(
            book.line_outline(&choice, 40.0, "Trae").elements().len(),
            BlockGlyphs.line_outline(&choice, 40.0, "Trae").elements().len()
        );
    }

    #[test]
    fn family_names_are_normalized() {
        assert_eq!(normalize(" 'Noto Sans' "), "noto sans");
        assert_eq!(normalize("\"Arial\""), "arial");
        assert!(!FontBook::new().set_default_family("arial"));
    }

    #[cfg(feature = "std")]
    #[test]
    fn missing_file_reports_path() {
        let mut book = FontBook::new();
        let err = book
            .load_file("Missing", "/definitely/not/here.ttf")
            .expect_err("file does not exist");
        assert!(matches!(err, FontError::Io { .. }));
        assert!(std::format!("{err}").contains("here.ttf"));
    }
}
