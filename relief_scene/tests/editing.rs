// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end editing behavior through the public API.

use kurbo::{Point, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relief_hit::HitParams;
use relief_scene::interaction::{Cursor, Interaction};
use relief_scene::{Canvas, Editor, Layer, MIN_SCALE, TextStore, seed_default_texts};
use relief_text::{BlockGlyphs, FontChoice, TextMeasure, VerticalMetrics};

/// Every line measures 80 wide regardless of content or size.
#[derive(Clone, Copy, Debug)]
struct FixedWidth;

impl TextMeasure for FixedWidth {
    fn line_width(&self, _font: &FontChoice, _size: f32, _line: &str) -> f32 {
        80.0
    }

    fn vertical_metrics(&self, _font: &FontChoice, size: f32) -> VerticalMetrics {
        VerticalMetrics {
            ascent: size * 0.8,
            descent: size * 0.2,
        }
    }
}

#[test]
fn corner_drag_scales_from_initial_bounds() {
    let mut editor = Editor::new(FixedWidth);
    // 50/3 px at line height 1.2 is 20 tall; with padding the bounds are 100 x 40.
    let id = editor.add_item(Layer::Foreground, "Depth", 50.0 / 3.0, 200.0, 200.0);
    let bounds = editor.selection_bounds().unwrap();
    assert!((bounds.width() - 100.0).abs() < 1e-9);
    assert!((bounds.height() - 40.0).abs() < 1e-9);

    let corner = Point::new(bounds.x1, bounds.y1);
    assert_eq!(editor.pointer_down(corner), Cursor::ResizeNwSe);
    editor.pointer_move(corner + Vec2::new(20.0, 10.0));
    editor.pointer_move(corner + Vec2::new(50.0, 50.0));
    editor.pointer_up();

    let item = editor.store().get(id).unwrap();
    assert!((item.scale_x - 1.5).abs() < 1e-9, "{}", item.scale_x);
    assert!((item.scale_y - 2.25).abs() < 1e-9, "{}", item.scale_y);
    assert_eq!(item.effective_font_size(), 38.0);
}

#[test]
fn canvas_growth_recenters_stray_items() {
    let mut editor = Editor::new(BlockGlyphs);
    let stray = editor.add_item(Layer::Background, "Far", 40.0, 2000.0, 2000.0);
    let kept = editor.add_item(Layer::Background, "Near", 40.0, 100.0, 100.0);

    assert_eq!(editor.resize_canvas(Canvas::new(1080, 1920)), 1);
    assert_eq!(editor.store().get(stray).unwrap().anchor(), Point::new(540.0, 960.0));
    assert_eq!(editor.store().get(kept).unwrap().anchor(), Point::new(100.0, 100.0));
    assert_eq!(editor.canvas(), Canvas::new(1080, 1920));
}

#[test]
fn anchor_hits_its_own_item() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut seeded = TextStore::new();
    for _ in 0..8 {
        seed_default_texts(&mut rng, Canvas::default(), &mut seeded);
    }
    for item in seeded.items() {
        for rotation in [0.0, 33.0, -120.0] {
            let mut alone = TextStore::new();
            let mut copy = item.clone();
            copy.rotation = rotation;
            let id = alone.import(copy);
            let hit = alone.hit_test(item.anchor(), &BlockGlyphs, &HitParams::default());
            assert_eq!(hit, Some(id), "{} at {rotation}", item.text);
        }
    }
}

#[test]
fn random_resize_drags_respect_scale_floor() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut editor = Editor::new(BlockGlyphs);
    let id = editor.add_item(Layer::Foreground, "Trae", 40.0, 270.0, 480.0);

    for _ in 0..200 {
        let bounds = editor.selection_bounds().unwrap();
        let corner = Point::new(bounds.x0, bounds.y0);
        if editor.pointer_down(corner) != Cursor::ResizeNwSe {
            // Tiny boxes put the rotate handle on top of the corner.
            editor.pointer_up();
            continue;
        }
        assert!(matches!(editor.interaction(), Interaction::Resizing { .. }));
        for _ in 0..5 {
            let d = Vec2::new(rng.gen_range(-800.0..800.0), rng.gen_range(-800.0..800.0));
            editor.pointer_move(corner + d);
            let item = editor.store().get(id).unwrap();
            assert!(item.scale_x >= MIN_SCALE && item.scale_y >= MIN_SCALE);
        }
        editor.pointer_up();
    }
}

#[test]
fn clear_all_leaves_nothing_to_draw_or_hit() {
    let mut editor = Editor::new(BlockGlyphs);
    editor.seed(&mut StdRng::seed_from_u64(5));
    editor.add_text(Layer::Foreground);
    editor.clear_all();

    assert_eq!(editor.store().items_of(Layer::Background).count(), 0);
    assert_eq!(editor.store().items_of(Layer::Foreground).count(), 0);
    assert!(editor.store().selection().is_none());
    for x in (0..540).step_by(30) {
        for y in (0..960).step_by(30) {
            assert_eq!(editor.hit_test(Point::new(f64::from(x), f64::from(y))), None);
        }
    }
}

#[test]
fn reset_restores_canvas_and_keeps_ids_fresh() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut editor = Editor::new(BlockGlyphs);
    let before = editor.add_text(Layer::Background);
    editor.resize_canvas(Canvas::new(800, 600));

    editor.reset(&mut rng);
    assert_eq!(editor.canvas(), Canvas::default());
    assert_eq!(editor.store().len(), 8);
    assert!(editor.store().selection().is_none());
    assert!(editor.store().items().iter().all(|it| it.id > before));
}

#[test]
fn select_then_move_through_control() {
    let mut editor = Editor::new(BlockGlyphs);
    let a = editor.add_item(Layer::Background, "ABCD", 40.0, 100.0, 100.0);
    let b = editor.add_item(Layer::Foreground, "ABCD", 40.0, 400.0, 400.0);

    // First press selects `a` and, being central, grabs it.
    assert_eq!(editor.pointer_down(Point::new(100.0, 100.0)), Cursor::Grabbing);
    assert_eq!(editor.store().selected_id(), Some(a));
    editor.pointer_move(Point::new(120.0, 90.0));
    editor.pointer_up();
    assert_eq!(editor.store().get(a).unwrap().anchor(), Point::new(120.0, 90.0));
    assert_eq!(editor.store().get(b).unwrap().anchor(), Point::new(400.0, 400.0));
    assert_eq!(editor.pointer_move(Point::new(120.0, 90.0)), Cursor::Grab);
}
