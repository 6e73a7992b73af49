// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered collection of text items and the selection slot.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use log::{debug, warn};
use relief_hit::{HitParams, OrientedBox, PreciseHitTest};
use relief_text::{FontChoice, TextMeasure};

use crate::{Canvas, ItemId, Layer, MIN_FONT_SIZE, TextItem, compute_bounds};

/// The selected item together with its cached bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    /// Selected item.
    pub id: ItemId,
    /// Bounds of the item when they were last computed.
    pub bounds: Rect,
}

/// Owns every text item. Insertion order is paint order: later items draw on
/// top and are hit first.
///
/// At most one item is selected. The selection caches the item's bounds for
/// control hit testing; anything that changes the item's geometry must call
/// [`TextStore::refresh_selection`] before the next hit test.
#[derive(Clone, Debug, Default)]
pub struct TextStore {
    items: Vec<TextItem>,
    next_id: u32,
    selection: Option<Selection>,
    default_font: FontChoice,
}

impl TextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new item on top of the paint order and return it.
    ///
    /// The item starts unrotated, unscaled and with the store's default font.
    /// A non-finite or non-positive `font_size` is replaced by [`MIN_FONT_SIZE`].
    pub fn add_item(
        &mut self,
        layer: Layer,
        text: impl Into<String>,
        font_size: f64,
        x: f64,
        y: f64,
    ) -> &TextItem {
        let id = self.allocate_id();
        let mut item = TextItem {
            id,
            layer,
            text: text.into(),
            font_size,
            font: self.default_font.clone(),
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        if item.sanitize_font_size() {
            warn!("{id:?} had font size {font_size}, using {MIN_FONT_SIZE}");
        }
        debug!("added {id:?} on {layer:?} at ({x:.1}, {y:.1})");
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Append a fully specified item, replacing its id with a fresh one.
    ///
    /// Scale factors below the floor are clamped and an unusable font size is
    /// replaced, as in [`TextStore::add_item`].
    pub fn import(&mut self, mut item: TextItem) -> ItemId {
        let source = item.id;
        item.id = self.allocate_id();
        item.clamp_scale();
        if item.sanitize_font_size() {
            warn!("imported {source:?} had an unusable font size, using {MIN_FONT_SIZE}");
        }
        let id = item.id;
        debug!("imported {id:?} on {:?}", item.layer);
        self.items.push(item);
        id
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Remove an item. Clears the selection if it pointed at the removed item.
    pub fn remove_item(&mut self, id: ItemId) -> Option<TextItem> {
        let idx = self.items.iter().position(|it| it.id == id)?;
        if self.selected_id() == Some(id) {
            self.selection = None;
        }
        debug!("removed {id:?}");
        Some(self.items.remove(idx))
    }

    /// Remove every item and clear the selection. Ids are not reused afterwards.
    pub fn clear_all(&mut self) {
        debug!("cleared {} items", self.items.len());
        self.items.clear();
        self.selection = None;
    }

    /// Select `id` and cache its bounds. Returns `false` (leaving the
    /// selection cleared) if no such item exists or its text is blank.
    pub fn select<M: TextMeasure + ?Sized>(&mut self, id: ItemId, measure: &M) -> bool {
        self.selection = self.get(id).filter(|it| !it.is_blank()).map(|item| Selection {
            id,
            bounds: compute_bounds(item, measure),
        });
        debug!("selection is now {:?}", self.selected_id());
        self.selection.is_some()
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        if self.selection.take().is_some() {
            debug!("selection cleared");
        }
    }

    /// Recompute the cached bounds of the selected item.
    ///
    /// An item whose text became blank loses the selection.
    pub fn refresh_selection<M: TextMeasure + ?Sized>(&mut self, measure: &M) {
        if let Some(id) = self.selected_id() {
            self.select(id, measure);
        }
    }

    /// The current selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Id of the selected item, if any.
    pub fn selected_id(&self) -> Option<ItemId> {
        self.selection.map(|s| s.id)
    }

    /// The selected item, if any.
    pub fn selected(&self) -> Option<&TextItem> {
        self.selected_id().and_then(|id| self.get(id))
    }

    /// Look up an item by id.
    pub fn get(&self, id: ItemId) -> Option<&TextItem> {
        self.items.iter().find(|it| it.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut TextItem> {
        self.items.iter_mut().find(|it| it.id == id)
    }

    /// Every item in paint order, blank ones included.
    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    /// Non-blank items on `layer`, in paint order.
    pub fn items_of(&self, layer: Layer) -> impl Iterator<Item = &TextItem> + '_ {
        self.items
            .iter()
            .filter(move |it| it.layer == layer && !it.is_blank())
    }

    /// Number of items, blank ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Font given to items added from now on.
    pub fn default_font(&self) -> &FontChoice {
        &self.default_font
    }

    pub(crate) fn set_default_font(&mut self, font: FontChoice) {
        self.default_font = font;
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut TextItem> + '_ {
        self.items.iter_mut()
    }

    /// Topmost non-blank item whose padded, tolerance-grown footprint contains `pt`.
    ///
    /// Rotated items are tested by rotating `pt` back about the item's anchor.
    pub fn hit_test<M: TextMeasure + ?Sized>(
        &self,
        pt: Point,
        measure: &M,
        params: &HitParams,
    ) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .filter(|it| !it.is_blank())
            .find(|it| {
                let body = OrientedBox {
                    rect: compute_bounds(it, measure),
                    anchor: it.anchor(),
                    rotation_deg: it.rotation,
                };
                body.hit_test(pt, params).is_some()
            })
            .map(|it| it.id)
    }

    /// Move every item whose anchor lies outside `canvas` to the canvas center.
    ///
    /// Returns the number of items moved.
    pub fn recenter_outside(&mut self, canvas: Canvas) -> usize {
        let center = canvas.center();
        let mut moved = 0;
        for item in self.items.iter_mut().filter(|it| !canvas.contains(it.anchor())) {
            item.x = center.x;
            item.y = center.y;
            moved += 1;
        }
        if moved > 0 {
            debug!("recentered {moved} items into {}x{}", canvas.width, canvas.height);
        }
        moved
    }
}
