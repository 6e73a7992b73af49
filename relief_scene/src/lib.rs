// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Scene: the editable content of a two-plane depth composition.
//!
//! A scene is a flat, ordered list of [`TextItem`]s held by a [`TextStore`].
//! Each item sits on one of two [`Layer`]s and carries its own anchor,
//! rotation and per-axis scale. Insertion order is paint order.
//!
//! - [`compute_bounds`] gives an item's unrotated footprint, measured through
//!   any [`relief_text::TextMeasure`].
//! - [`TextStore::hit_test`] finds the topmost item under a point, undoing
//!   rotation about the anchor.
//! - [`Editor`] is the single-selection controller: it turns pointer presses,
//!   moves and releases into moves, resizes and rotations of the selected
//!   item, and reports the [`interaction::Cursor`] to show.
//! - [`Canvas`] is the drawing surface size; resizing it recenters items that
//!   fall outside.
//! - [`seed_default_texts`] fills a store with randomized starter content.
//!
//! Nothing here draws. `relief_render` turns a store into imaging ops.
//!
//! ## Features
//!
//! - `std` (default): use the standard library for float math.
//! - `libm`: float math for `no_std` targets.
//! - `serde`: `Serialize`/`Deserialize` for items, layers and the canvas.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bounds;
mod canvas;
pub mod gesture;
pub mod interaction;
mod item;
mod seed;
mod store;

pub use bounds::{BOUNDS_PADDING, LINE_HEIGHT, compute_bounds};
pub use canvas::Canvas;
pub use interaction::Editor;
pub use item::{ItemId, Layer, MIN_FONT_SIZE, MIN_SCALE, TextItem, is_valid_font_size};
pub use seed::{DEFAULT_TEXT_COUNT, DEFAULT_TEXTS, seed_default_texts};
pub use store::{Selection, TextStore};
