// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection chrome drawn over the preview.

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Stroke};
use peniko::Color;
use relief_hit::{Handle, HandleLayout};
use relief_imaging::{DrawOp, ImagingBackend, PathDesc, StateOp};
use relief_scene::{TextStore, compute_bounds};
use relief_text::TextMeasure;

use crate::FrameResources;

/// Selection frame, handle fill and connector color.
pub const SELECTION_BLUE: Color = Color::from_rgb8(0x00, 0x7B, 0xFF);
/// Rotate handle fill color.
pub const ROTATE_GREEN: Color = Color::from_rgb8(0x28, 0xA7, 0x45);

const LINE_WIDTH: f64 = 2.0;
const DASH: [f64; 2] = [5.0, 5.0];
/// Rotate disc radius beyond the handle half-size.
const ROTATE_EXTRA_RADIUS: f64 = 4.0;

#[allow(
    clippy::cast_possible_truncation,
    reason = "overlay geometry is in canvas pixels, well inside f32 range"
)]
fn rect_op(r: Rect, fill: bool) -> DrawOp {
    let (x0, y0, x1, y1) = (r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32);
    if fill {
        DrawOp::FillRect { x0, y0, x1, y1 }
    } else {
        DrawOp::StrokeRect { x0, y0, x1, y1 }
    }
}

/// Draw the frame, resize handles and rotate handle of the selected item.
///
/// Nothing is drawn without a selection or when the selected item is blank.
/// Bounds are recomputed from the item rather than taken from the cached
/// selection so the chrome always matches the drawn text.
pub fn render_selection_overlay<B, M>(
    backend: &mut B,
    store: &TextStore,
    measure: &M,
    layout: &HandleLayout,
    resources: &mut FrameResources,
) where
    B: ImagingBackend + ?Sized,
    M: TextMeasure + ?Sized,
{
    let Some(item) = store.selected().filter(|it| !it.is_blank()) else {
        return;
    };
    let bounds = compute_bounds(item, measure);
    let blue = resources.solid(backend, SELECTION_BLUE);
    let white = resources.solid(backend, Color::WHITE);
    let green = resources.solid(backend, ROTATE_GREEN);

    backend.state(StateOp::SetTransform(Affine::IDENTITY));

    backend.state(StateOp::SetPaint(blue));
    backend.state(StateOp::SetStroke(
        Stroke::new(LINE_WIDTH).with_dashes(0.0, DASH),
    ));
    backend.draw(rect_op(bounds, false));

    backend.state(StateOp::SetStroke(Stroke::new(LINE_WIDTH)));
    let half = layout.handle_size / 2.0;
    for handle in Handle::ALL {
        let square = Rect::from_center_size(handle.position(bounds), (2.0 * half, 2.0 * half));
        backend.state(StateOp::SetPaint(blue));
        backend.draw(rect_op(square, true));
        backend.state(StateOp::SetPaint(white));
        backend.draw(rect_op(square, false));
    }

    let top = Point::new(bounds.center().x, bounds.y0);
    let knob = layout.rotate_handle(bounds);
    let mut connector = BezPath::new();
    connector.move_to(top);
    connector.line_to(knob);
    let connector = backend.create_path(PathDesc::from_bez_path(&connector));
    resources.adopt_path(connector);
    backend.state(StateOp::SetPaint(blue));
    backend.draw(DrawOp::StrokePath(connector));

    let disc = Circle::new(knob, half + ROTATE_EXTRA_RADIUS).to_path(0.1);
    let disc = backend.create_path(PathDesc::from_bez_path(&disc));
    resources.adopt_path(disc);
    backend.state(StateOp::SetPaint(green));
    backend.draw(DrawOp::FillPath(disc));
    backend.state(StateOp::SetPaint(white));
    backend.draw(DrawOp::StrokePath(disc));
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use relief_imaging_ref::RefBackend;
    use relief_scene::Layer;
    use relief_text::BlockGlyphs;

    fn overlay_for(store: &TextStore) -> RefBackend {
        let mut backend = RefBackend::default();
        let mut res = FrameResources::default();
        render_selection_overlay(
            &mut backend,
            store,
            &BlockGlyphs,
            &HandleLayout::default(),
            &mut res,
        );
        res.release(&mut backend);
        backend
    }

    #[test]
    fn nothing_without_selection() {
        let mut store = TextStore::new();
        store.add_item(Layer::Background, "A", 40.0, 100.0, 100.0);
        assert_eq!(overlay_for(&store).draws().count(), 0);
    }

    #[test]
    fn nothing_for_blank_selection() {
        let mut store = TextStore::new();
        let id = store.add_item(Layer::Background, " ", 40.0, 100.0, 100.0).id;
        store.select(id, &BlockGlyphs);
        assert_eq!(overlay_for(&store).draws().count(), 0);
    }

    #[test]
    fn frame_handles_and_rotate_knob() {
        let mut store = TextStore::new();
        // "ABCD" at 40px: bounds 142..258 x 166..234.
        let id = store.add_item(Layer::Background, "ABCD", 40.0, 200.0, 200.0).id;
        store.select(id, &BlockGlyphs);
        let backend = overlay_for(&store);
        let draws: Vec<_> = backend.draws().collect();

        // Dashed frame, 8 filled and outlined handles, connector, disc fill and outline.
        assert_eq!(draws.len(), 1 + 16 + 1 + 2);

        let (frame, frame_state) = draws[0];
        let DrawOp::StrokeRect { x0, y0, x1, y1 } = *frame else {
            panic!("expected the frame first, got {frame:?}");
        };
        for (got, want) in [(x0, 142.0), (y0, 166.0), (x1, 258.0), (y1, 234.0)] {
            assert!((got - want).abs() < 1e-3, "{frame:?}");
        }
        let dashed = frame_state.stroke.as_ref().unwrap();
        assert_eq!(dashed.width, 2.0);
        assert_eq!(&dashed.dash_pattern[..], &DASH[..]);

        let handle_fills = draws
            .iter()
            .filter(|(op, _)| matches!(op, DrawOp::FillRect { .. }))
            .count();
        assert_eq!(handle_fills, 8);
        let DrawOp::FillRect { x0, y0, x1, y1 } = *draws[1].0 else {
            panic!("expected the first handle fill, got {:?}", draws[1].0);
        };
        for (got, want) in [(x0, 134.0), (y0, 158.0), (x1, 150.0), (y1, 174.0)] {
            assert!((got - want).abs() < 1e-3, "{:?}", draws[1].0);
        }
        let (_, outline_state) = draws[2];
        assert!(outline_state.stroke.as_ref().unwrap().dash_pattern.is_empty());
        assert!(matches!(draws[17].0, DrawOp::StrokePath(_)));
        assert!(matches!(draws[18].0, DrawOp::FillPath(_)));
        assert_eq!(backend.live_paths(), 0);
    }
}
