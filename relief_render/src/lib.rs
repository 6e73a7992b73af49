// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Render: turns a relief scene into imaging operations.
//!
//! The depth illusion comes from two planes of text. The background plane is
//! drawn as is; the foreground plane is drawn shifted sideways and composited
//! translucently over it. An optional final pass restacks blurred, shifted
//! copies of the frame under a sharp one.
//!
//! Output goes to any [`relief_imaging::ImagingBackend`], so the same frame
//! can be rasterized with `relief_imaging_vello_cpu` or inspected with
//! `relief_imaging_ref` in tests.
//!
//! ## Minimal example
//!
//! ```
//! use relief_imaging_ref::RefBackend;
//! use relief_render::{Compositor, RenderConfig};
//! use relief_scene::{Canvas, Layer, TextStore};
//! use relief_text::BlockGlyphs;
//!
//! let mut store = TextStore::new();
//! store.add_item(Layer::Background, "Depth", 60.0, 270.0, 480.0);
//! store.add_item(Layer::Foreground, "Depth", 60.0, 270.0, 480.0);
//!
//! let compositor = Compositor::new(BlockGlyphs, RenderConfig::default());
//! let mut backend = RefBackend::default();
//! compositor.generate_image(&mut backend, &store, Canvas::default());
//! assert_eq!(backend.live_paths(), 0);
//! ```
//!
//! ## Features
//!
//! - `std` (default): use the standard library.
//! - `libm`: float math for `no_std` targets.
//! - `serde`: `Serialize`/`Deserialize` for [`RenderConfig`], with colors as hex strings.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod color;
mod compositor;
mod config;
mod layer;
mod overlay;

pub use color::{
    ColorError, brightness, complementary_color, contrast_color, parse_hex, to_hex,
};
pub use compositor::{Compositor, DEPTH_ECHOES, DepthEcho};
pub use config::RenderConfig;
pub use layer::{FrameResources, render_layer, text_shadow};
pub use overlay::{ROTATE_GREEN, SELECTION_BLUE, render_selection_overlay};
