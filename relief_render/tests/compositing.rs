// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What the compositor emits, and what it looks like once rasterized.

use peniko::Color;
use relief_imaging::{DrawOp, FilterDesc};
use relief_imaging_ref::RefBackend;
use relief_imaging_vello_cpu::render_to_rgba;
use relief_render::{Compositor, DEPTH_ECHOES, RenderConfig};
use relief_scene::{Canvas, ItemId, Layer, TextStore};
use relief_text::BlockGlyphs;

fn stacked_pair() -> (TextStore, ItemId, ItemId) {
    let mut store = TextStore::new();
    let a = store.add_item(Layer::Background, "A", 40.0, 100.0, 100.0).id;
    let b = store.add_item(Layer::Foreground, "B", 40.0, 100.0, 100.0).id;
    (store, a, b)
}

fn config(depth_pass: bool) -> RenderConfig {
    RenderConfig {
        depth_pass,
        ..RenderConfig::default()
    }
}

/// Text fills only; the canvas fills are rects.
fn text_draws(backend: &RefBackend) -> Vec<(f64, f32)> {
    backend
        .draws()
        .filter(|(op, _)| matches!(op, DrawOp::FillPath(_)))
        .map(|(_, state)| (state.transform.translation().x, state.effective_opacity()))
        .collect()
}

#[test]
fn foreground_is_shifted_and_translucent() {
    let (store, _, _) = stacked_pair();
    let compositor = Compositor::new(BlockGlyphs, config(false));
    let mut backend = RefBackend::default();
    compositor.generate_image(&mut backend, &store, Canvas::new(200, 200));

    let draws = text_draws(&backend);
    assert_eq!(draws.len(), 2, "{draws:?}");
    let (bg_x, bg_alpha) = draws[0];
    let (fg_x, fg_alpha) = draws[1];
    assert!((fg_x - bg_x - 12.0).abs() < 1e-9, "{bg_x} vs {fg_x}");
    assert_eq!(bg_alpha, 1.0);
    assert!((fg_alpha - 0.8).abs() < 1e-6);
}

#[test]
fn offset_and_opacity_are_reread_each_frame() {
    let (store, _, _) = stacked_pair();
    let mut compositor = Compositor::new(BlockGlyphs, config(false));
    compositor.config_mut().offset = -7.0;
    compositor.config_mut().opacity = 0.5;
    let mut backend = RefBackend::default();
    compositor.generate_image(&mut backend, &store, Canvas::new(200, 200));

    let draws = text_draws(&backend);
    assert!((draws[1].0 - draws[0].0 + 7.0).abs() < 1e-9);
    assert!((draws[1].1 - 0.5).abs() < 1e-6);
}

#[test]
fn depth_pass_restacks_frame() {
    let (store, _, _) = stacked_pair();
    let compositor = Compositor::new(BlockGlyphs, config(true));
    let mut backend = RefBackend::default();
    compositor.generate_image(&mut backend, &store, Canvas::new(200, 200));

    let pictures: Vec<_> = backend
        .draws()
        .filter_map(|(op, state)| match op {
            DrawOp::DrawPicture { transform, .. } => Some((*transform, state.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(pictures.len(), 3);
    for ((transform, state), echo) in pictures.iter().zip(DEPTH_ECHOES) {
        assert_eq!(transform.translation(), kurbo::Vec2::from(echo.offset));
        let layer = state.layer_top().unwrap();
        assert_eq!(layer.filter, Some(FilterDesc::blur(echo.blur)));
        assert_eq!(layer.opacity, Some(echo.opacity));
    }
    let (sharp, sharp_state) = &pictures[2];
    assert_eq!(*sharp, kurbo::Affine::IDENTITY);
    assert_eq!(sharp_state.layer_depth(), 0);
}

#[test]
fn overlay_only_in_preview() {
    let (mut store, a, _) = stacked_pair();
    store.select(a, &BlockGlyphs);
    let compositor = Compositor::new(BlockGlyphs, config(true));

    let count_stroke_rects = |preview: bool| {
        let mut backend = RefBackend::default();
        if preview {
            compositor.generate_preview(&mut backend, &store, Canvas::new(200, 200));
        } else {
            compositor.generate_image(&mut backend, &store, Canvas::new(200, 200));
        }
        assert_eq!(backend.live_paths(), 0);
        backend
            .draws()
            .filter(|(op, _)| matches!(op, DrawOp::StrokeRect { .. }))
            .count()
    };
    assert_eq!(count_stroke_rects(false), 0);
    // Frame plus eight handle outlines.
    assert_eq!(count_stroke_rects(true), 9);
}

#[test]
fn empty_store_is_just_the_background() {
    let compositor = Compositor::new(BlockGlyphs, config(false));
    let mut backend = RefBackend::default();
    compositor.generate_image(&mut backend, &TextStore::new(), Canvas::new(30, 20));
    let ops: Vec<_> = backend.draws().map(|(op, _)| op.clone()).collect();
    let full = DrawOp::FillRect {
        x0: 0.0,
        y0: 0.0,
        x1: 30.0,
        y1: 20.0,
    };
    assert_eq!(ops, vec![full.clone(), full]);
}

const SIZE: u16 = 200;

fn pixel(buf: &[u8], x: usize, y: usize) -> [u8; 4] {
    let i = (y * usize::from(SIZE) + x) * 4;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

fn assert_near(actual: [u8; 4], expected: [u8; 3], tolerance: u8) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= tolerance,
            "pixel {actual:?} differs from {expected:?}"
        );
    }
    assert_eq!(actual[3], 255, "frame must be opaque");
}

fn rasterize(depth_pass: bool) -> Vec<u8> {
    let (store, _, _) = stacked_pair();
    let compositor = Compositor::new(BlockGlyphs, config(depth_pass));
    render_to_rgba(SIZE, SIZE, |backend| {
        compositor.generate_image(backend, &store, Canvas::new(200, 200));
    })
}

// Block glyphs at 40px: "A" covers x 90..110 and "B", shifted by 12, covers
// x 102..122; both span y 84..112.
#[test]
fn foreground_never_fully_occludes_background() {
    let buf = rasterize(false);
    let bg = RenderConfig::default().background.to_rgba8();
    assert_near(pixel(&buf, 20, 180), [bg.r, bg.g, bg.b], 2);

    // Background text alone.
    assert_near(pixel(&buf, 95, 98), [2, 15, 95], 4);
    // Foreground text over the background fill: 0.8 * #FE0191 + 0.2 * #0500FB.
    let over_fill = pixel(&buf, 116, 98);
    assert_near(over_fill, [204, 1, 166], 4);
    // Foreground text over background text: 0.8 * #FE0191 + 0.2 * #020F5F.
    let over_text = pixel(&buf, 106, 98);
    assert_near(over_text, [204, 4, 135], 4);
    assert!(over_text[2] + 20 < over_fill[2]);

    let fg = Color::from_rgb8(0xFE, 0x01, 0x91).to_rgba8();
    assert_ne!([over_text[0], over_text[1], over_text[2]], [fg.r, fg.g, fg.b]);
}

#[test]
fn depth_pass_keeps_interior_sharp() {
    let flat = rasterize(false);
    let deep = rasterize(true);
    for (x, y) in [(95, 98), (106, 98), (116, 98), (20, 180)] {
        let (f, d) = (pixel(&flat, x, y), pixel(&deep, x, y));
        for (a, b) in f.iter().zip(d) {
            assert!(a.abs_diff(b) <= 3, "({x}, {y}): {f:?} vs {d:?}");
        }
    }
}
