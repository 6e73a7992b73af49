// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Randomized starter content.

use log::debug;
use rand::Rng;

use crate::{Canvas, Layer, TextStore};

/// Texts the starter content is drawn from.
pub const DEFAULT_TEXTS: [&str; 4] = ["JueJin", "Vibe Coding", "Trae", "掘金MCP"];

/// Number of items [`seed_default_texts`] adds.
pub const DEFAULT_TEXT_COUNT: usize = 8;

/// Add [`DEFAULT_TEXT_COUNT`] random items from [`DEFAULT_TEXTS`] to `store`.
///
/// Each item lands on either layer with equal probability, gets a base size
/// in `40..=80` and an anchor kept one font size away from every canvas edge.
/// On a canvas too small for that margin the anchor falls back to the center
/// on the cramped axis.
pub fn seed_default_texts<R: Rng + ?Sized>(rng: &mut R, canvas: Canvas, store: &mut TextStore) {
    let center = canvas.center();
    for _ in 0..DEFAULT_TEXT_COUNT {
        let text = DEFAULT_TEXTS[rng.gen_range(0..DEFAULT_TEXTS.len())];
        let layer = if rng.gen_bool(0.5) {
            Layer::Background
        } else {
            Layer::Foreground
        };
        let size = f64::from(rng.gen_range(40_u32..=80));
        let x = spread(rng, size, f64::from(canvas.width), center.x);
        let y = spread(rng, size, f64::from(canvas.height), center.y);
        store.add_item(layer, text, size, x, y);
    }
    debug!("seeded {DEFAULT_TEXT_COUNT} starter items");
}

fn spread<R: Rng + ?Sized>(rng: &mut R, margin: f64, extent: f64, fallback: f64) -> f64 {
    let (lo, hi) = (margin, extent - margin);
    if lo < hi { rng.gen_range(lo..hi) } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeds_eight_items_inside_margins() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut store = TextStore::new();
        let canvas = Canvas::default();
        seed_default_texts(&mut rng, canvas, &mut store);

        assert_eq!(store.len(), DEFAULT_TEXT_COUNT);
        for item in store.items() {
            assert!(DEFAULT_TEXTS.contains(&item.text.as_str()));
            assert!((40.0..=80.0).contains(&item.font_size));
            assert_eq!(item.font_size.fract(), 0.0);
            assert!(item.x >= item.font_size && item.x <= 540.0 - item.font_size);
            assert!(item.y >= item.font_size && item.y <= 960.0 - item.font_size);
            assert_eq!((item.rotation, item.scale_x, item.scale_y), (0.0, 1.0, 1.0));
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let run = |seed| {
            let mut store = TextStore::new();
            seed_default_texts(&mut StdRng::seed_from_u64(seed), Canvas::default(), &mut store);
            store.items().to_vec()
        };
        assert_eq!(run(3), run(3));
    }

    #[test]
    fn tiny_canvas_uses_center() {
        let mut store = TextStore::new();
        let canvas = Canvas::new(60, 1000);
        seed_default_texts(&mut StdRng::seed_from_u64(1), canvas, &mut store);
        assert!(store.items().iter().all(|it| it.x == 30.0));
    }
}
