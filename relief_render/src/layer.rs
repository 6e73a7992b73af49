// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing one plane of text items.

use alloc::vec::Vec;

use kurbo::Affine;
use peniko::{Brush, Color};
use relief_imaging::{
    DrawOp, FilterDesc, ImagingBackend, ImagingBackendExt, PaintDesc, PaintId, PathId, PictureId,
    StateOp,
};
use relief_scene::{LINE_HEIGHT, Layer, TextItem, TextStore};
use relief_text::{TextPainter, fill_line};

/// Soft shadow under every text item: 30% black, offset (2, 2), canvas blur 5.
pub fn text_shadow() -> FilterDesc {
    FilterDesc::drop_shadow(2.0, 2.0, 2.5, Color::BLACK.with_alpha(0.3))
}

/// Backend resources created while drawing a frame.
///
/// Everything is kept alive until [`FrameResources::release`] so that
/// pictures recorded during the frame can still replay the paths they use.
#[derive(Debug, Default)]
#[must_use = "resources leak on the backend unless released"]
pub struct FrameResources {
    paths: Vec<PathId>,
    paints: Vec<PaintId>,
    pictures: Vec<PictureId>,
}

impl FrameResources {
    /// Create a solid paint owned by this frame.
    pub fn solid<B: ImagingBackend + ?Sized>(&mut self, backend: &mut B, color: Color) -> PaintId {
        let id = backend.create_paint(PaintDesc {
            brush: Brush::Solid(color),
        });
        self.paints.push(id);
        id
    }

    /// Take ownership of a path.
    pub fn adopt_path(&mut self, id: PathId) {
        self.paths.push(id);
    }

    /// Take ownership of a picture.
    pub fn adopt_picture(&mut self, id: PictureId) {
        self.pictures.push(id);
    }

    /// Number of paths owned.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Destroy every owned resource, pictures first.
    pub fn release<B: ImagingBackend + ?Sized>(self, backend: &mut B) {
        for id in self.pictures {
            backend.destroy_picture(id);
        }
        for id in self.paths {
            backend.destroy_path(id);
        }
        for id in self.paints {
            backend.destroy_paint(id);
        }
    }
}

/// Draw every visible item of `layer` in paint order, shifted right by `offset_x`.
///
/// Each item is placed at its anchor, rotated and scaled, and filled in
/// `color` at its base font size. Lines are centered horizontally on the
/// anchor and the block of lines is centered vertically, `1.2` font sizes
/// apart. Every item casts [`text_shadow`].
///
/// Leaves the backend transform in an unspecified state.
pub fn render_layer<B, P>(
    backend: &mut B,
    painter: &P,
    store: &TextStore,
    layer: Layer,
    color: Color,
    offset_x: f64,
    resources: &mut FrameResources,
) where
    B: ImagingBackend + ?Sized,
    P: TextPainter + ?Sized,
{
    let paint = resources.solid(backend, color);
    backend.state(StateOp::SetPaint(paint));
    for item in store.items_of(layer) {
        // Shadow offset and blur are in device pixels, not item space.
        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        backend.with_filter_layer(text_shadow(), |b| {
            draw_item(b, painter, item, offset_x, resources);
        });
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "font sizes are well inside f32 range"
)]
#[allow(
    clippy::cast_precision_loss,
    reason = "line counts are far below f64 precision limits"
)]
fn draw_item<B, P>(
    backend: &mut B,
    painter: &P,
    item: &TextItem,
    offset_x: f64,
    resources: &mut FrameResources,
) where
    B: ImagingBackend + ?Sized,
    P: TextPainter + ?Sized,
{
    let size = item.font_size as f32;
    let line_height = item.font_size * LINE_HEIGHT;
    let start_y = -((item.line_count() - 1) as f64) * line_height / 2.0;
    let to_baseline = f64::from(painter.vertical_metrics(&item.font, size).middle_to_baseline());
    let base = item.transform(offset_x);

    for (i, line) in item.lines().enumerate() {
        let width = f64::from(painter.line_width(&item.font, size, line));
        let y = start_y + i as f64 * line_height + to_baseline;
        backend.state(StateOp::SetTransform(
            base * Affine::translate((-width / 2.0, y)),
        ));
        if let Some(path) = fill_line(backend, painter, &item.font, size, line) {
            resources.adopt_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_imaging_ref::RefBackend;
    use relief_text::BlockGlyphs;

    #[test]
    fn multi_line_items_stack_around_anchor() {
        let mut store = TextStore::new();
        store.add_item(Layer::Background, "AB\nAB\nAB", 40.0, 100.0, 200.0);
        let mut backend = RefBackend::default();
        let mut res = FrameResources::default();
        render_layer(
            &mut backend,
            &BlockGlyphs,
            &store,
            Layer::Background,
            Color::WHITE,
            0.0,
            &mut res,
        );

        // Lines 48 apart centered on y = 200; the baseline sits 12 below each line center.
        let ys: Vec<f64> = backend
            .draws()
            .map(|(_, state)| state.transform.translation().y)
            .collect();
        assert_eq!(ys.len(), 3);
        for (y, expected) in ys.iter().zip([164.0, 212.0, 260.0]) {
            assert!((y - expected).abs() < 1e-3, "{ys:?}");
        }
        assert_eq!(res.path_count(), 3);
        res.release(&mut backend);
        assert_eq!(backend.live_paths(), 0);
    }

    #[test]
    fn each_item_gets_a_shadow_layer() {
        let mut store = TextStore::new();
        store.add_item(Layer::Foreground, "A", 40.0, 50.0, 50.0);
        store.add_item(Layer::Foreground, "B", 40.0, 150.0, 50.0);
        store.add_item(Layer::Foreground, "  ", 40.0, 150.0, 50.0);
        store.add_item(Layer::Background, "C", 40.0, 150.0, 50.0);
        let mut backend = RefBackend::default();
        let mut res = FrameResources::default();
        render_layer(
            &mut backend,
            &BlockGlyphs,
            &store,
            Layer::Foreground,
            Color::BLACK,
            0.0,
            &mut res,
        );

        let draws: Vec<_> = backend.draws().collect();
        assert_eq!(draws.len(), 2);
        for (_, state) in draws {
            assert_eq!(state.layer_depth(), 1);
            assert_eq!(state.layer_top().unwrap().filter, Some(text_shadow()));
        }
        assert_eq!(backend.current_state().layer_depth(), 0);
        res.release(&mut backend);
    }

    #[test]
    fn rotation_and_scale_reach_the_path_transform() {
        let mut store = TextStore::new();
        let id = store.add_item(Layer::Background, "A", 40.0, 100.0, 100.0).id;
        let mut item = store.get(id).unwrap().clone();
        store.remove_item(id);
        item.rotation = 90.0;
        item.scale_x = 2.0;
        store.import(item);

        let mut backend = RefBackend::default();
        let mut res = FrameResources::default();
        render_layer(
            &mut backend,
            &BlockGlyphs,
            &store,
            Layer::Background,
            Color::BLACK,
            5.0,
            &mut res,
        );
        let (_, state) = backend.draws().next().unwrap();
        // Local +x maps to canvas +y, doubled.
        let [a, b, ..] = state.transform.as_coeffs();
        assert!(a.abs() < 1e-9 && (b - 2.0).abs() < 1e-9, "{:?}", state.transform);
        res.release(&mut backend);
    }
}
