// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pointer-driven editing controller.
//!
//! [`Editor`] owns the store, the canvas and the one in-progress
//! manipulation. Hosts forward pointer events in canvas coordinates and use
//! the returned [`Cursor`] for feedback:
//!
//! ```
//! use kurbo::Point;
//! use relief_scene::{Editor, Layer};
//! use relief_scene::interaction::Cursor;
//! use relief_text::BlockGlyphs;
//!
//! let mut editor = Editor::new(BlockGlyphs);
//! let id = editor.add_item(Layer::Foreground, "Hello", 60.0, 200.0, 300.0);
//!
//! // Pressing in the middle of the selected item starts a move.
//! assert_eq!(editor.pointer_down(Point::new(200.0, 300.0)), Cursor::Grabbing);
//! editor.pointer_move(Point::new(230.0, 310.0));
//! editor.pointer_up();
//!
//! let item = editor.store().get(id).unwrap();
//! assert_eq!((item.x, item.y), (230.0, 310.0));
//! ```

use alloc::string::String;

use kurbo::{Point, Rect, Size, Vec2};
use log::{debug, trace};
use rand::Rng;
use relief_hit::{ControlHit, Handle, HandleLayout, HitParams};
use relief_text::{FontChoice, TextMeasure};

use crate::gesture::PointerCapture;
use crate::{
    Canvas, ItemId, Layer, MIN_SCALE, TextItem, TextStore, is_valid_font_size, seed_default_texts,
};

/// Base font size of items created by [`Editor::add_text`].
pub const NEW_TEXT_SIZE: f64 = 60.0;

/// Pointer shape a host should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Nothing under the pointer.
    #[default]
    Default,
    /// Over an item that a press would select.
    Pointer,
    /// Over the move zone; a press starts a move.
    Grab,
    /// A move is in progress.
    Grabbing,
    /// Over the rotate handle, or rotating.
    Crosshair,
    /// Diagonal resize along the top-left to bottom-right axis.
    ResizeNwSe,
    /// Diagonal resize along the top-right to bottom-left axis.
    ResizeNeSw,
    /// Vertical resize.
    ResizeNs,
    /// Horizontal resize.
    ResizeEw,
}

impl Cursor {
    /// Resize cursor for `handle`.
    pub fn for_handle(handle: Handle) -> Self {
        match handle {
            Handle::Nw | Handle::Se => Self::ResizeNwSe,
            Handle::Ne | Handle::Sw => Self::ResizeNeSw,
            Handle::N | Handle::S => Self::ResizeNs,
            Handle::W | Handle::E => Self::ResizeEw,
        }
    }
}

/// The manipulation in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interaction {
    /// No button held.
    #[default]
    Idle,
    /// Dragging an item; the anchor follows the pointer minus `grab`.
    Moving {
        /// Item being moved.
        item: ItemId,
        /// Pointer position relative to the anchor at press time.
        grab: Vec2,
    },
    /// Dragging a resize handle.
    Resizing {
        /// Item being resized.
        item: ItemId,
        /// Handle being dragged.
        handle: Handle,
        /// Scale factors at press time.
        initial_scale: Vec2,
        /// Bounds size at press time.
        initial_size: Size,
    },
    /// Dragging the rotate handle.
    Rotating {
        /// Item being rotated.
        item: ItemId,
        /// Rotation center: the item anchor at press time.
        center: Point,
        /// Pointer angle at press time minus the item rotation, in degrees.
        initial_angle: f64,
    },
}

impl Interaction {
    /// Item under manipulation, if any.
    pub fn item(&self) -> Option<ItemId> {
        match *self {
            Self::Idle => None,
            Self::Moving { item, .. } | Self::Resizing { item, .. } | Self::Rotating { item, .. } => {
                Some(item)
            }
        }
    }

    /// Cursor shown while this manipulation is active.
    pub fn cursor(&self) -> Cursor {
        match *self {
            Self::Idle => Cursor::Default,
            Self::Moving { .. } => Cursor::Grabbing,
            Self::Resizing { handle, .. } => Cursor::for_handle(handle),
            Self::Rotating { .. } => Cursor::Crosshair,
        }
    }
}

/// Angle of `pt` around `center` in degrees, clockwise in y-down space.
fn angle_deg(center: Point, pt: Point) -> f64 {
    (pt - center).atan2().to_degrees()
}

/// Single-selection, single-manipulation text editor.
///
/// All geometry is measured through `M`, which must be the same measure the
/// renderer uses for the handles to line up with the drawn text.
#[derive(Clone, Debug)]
pub struct Editor<M> {
    store: TextStore,
    canvas: Canvas,
    measure: M,
    layout: HandleLayout,
    hit_params: HitParams,
    interaction: Interaction,
    capture: PointerCapture,
}

impl<M: TextMeasure> Editor<M> {
    /// Create an editor with an empty store on the default canvas.
    pub fn new(measure: M) -> Self {
        Self::with_canvas(measure, Canvas::default())
    }

    /// Create an editor with an empty store on `canvas`.
    pub fn with_canvas(measure: M, canvas: Canvas) -> Self {
        Self {
            store: TextStore::new(),
            canvas,
            measure,
            layout: HandleLayout::default(),
            hit_params: HitParams::default(),
            interaction: Interaction::Idle,
            capture: PointerCapture::default(),
        }
    }

    /// The items and selection.
    pub fn store(&self) -> &TextStore {
        &self.store
    }

    /// The current canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// The text measure.
    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Handle geometry used for control hits.
    pub fn layout(&self) -> &HandleLayout {
        &self.layout
    }

    /// The manipulation in progress.
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Returns `true` while a move, resize or rotate is in progress.
    pub fn is_interacting(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    /// Cached bounds of the selected item.
    pub fn selection_bounds(&self) -> Option<Rect> {
        self.store.selection().map(|s| s.bounds)
    }

    /// Topmost item under `pt`.
    pub fn hit_test(&self, pt: Point) -> Option<ItemId> {
        self.store.hit_test(pt, &self.measure, &self.hit_params)
    }

    fn control_at(&self, pt: Point) -> Option<(ItemId, ControlHit)> {
        let selection = self.store.selection()?;
        if self.store.get(selection.id).is_none_or(TextItem::is_blank) {
            return None;
        }
        self.layout
            .hit_control(pt, selection.bounds)
            .map(|hit| (selection.id, hit))
    }

    /// Press at `pt`.
    ///
    /// Controls of the selected item are checked first. Otherwise the topmost
    /// item under the pointer is selected, and a move starts if the press is in
    /// its move zone. A press on empty space clears the selection.
    pub fn pointer_down(&mut self, pt: Point) -> Cursor {
        if self.is_interacting() {
            self.finish();
        }
        if let Some((id, hit)) = self.control_at(pt) {
            self.begin(id, hit, pt);
            return self.interaction.cursor();
        }
        match self.hit_test(pt) {
            Some(id) => {
                self.store.select(id, &self.measure);
                if let Some(bounds) = self.selection_bounds()
                    && self.layout.in_move_zone(pt, bounds)
                {
                    self.begin(id, ControlHit::Move, pt);
                    return self.interaction.cursor();
                }
                Cursor::Pointer
            }
            None => {
                self.store.deselect();
                Cursor::Default
            }
        }
    }

    fn begin(&mut self, id: ItemId, hit: ControlHit, pt: Point) {
        let Some(item) = self.store.get(id) else {
            return;
        };
        self.interaction = match hit {
            ControlHit::Move => Interaction::Moving {
                item: id,
                grab: pt - item.anchor(),
            },
            ControlHit::Resize(handle) => Interaction::Resizing {
                item: id,
                handle,
                initial_scale: Vec2::new(item.scale_x, item.scale_y),
                initial_size: self
                    .selection_bounds()
                    .map(|b| b.size())
                    .unwrap_or(Size::ZERO),
            },
            ControlHit::Rotate => Interaction::Rotating {
                item: id,
                center: item.anchor(),
                initial_angle: angle_deg(item.anchor(), pt) - item.rotation,
            },
        };
        self.capture.start(pt);
        debug!("started {:?}", self.interaction);
    }

    /// Pointer moved to `pt`.
    ///
    /// While idle this only reports the cursor for the hovered target.
    /// During a manipulation it updates the item from the press-time state
    /// and the current position alone, so the result does not depend on how
    /// many moves were reported in between.
    pub fn pointer_move(&mut self, pt: Point) -> Cursor {
        if self.is_interacting() {
            self.drag_to(pt);
            return self.interaction.cursor();
        }
        self.hover_cursor(pt)
    }

    fn hover_cursor(&self, pt: Point) -> Cursor {
        match self.control_at(pt) {
            Some((_, ControlHit::Rotate)) => return Cursor::Crosshair,
            Some((_, ControlHit::Resize(handle))) => return Cursor::for_handle(handle),
            Some((_, ControlHit::Move)) => return Cursor::Grab,
            None => {}
        }
        let Some(id) = self.hit_test(pt) else {
            return Cursor::Default;
        };
        if self.store.selection().is_some()
            && let Some(item) = self.store.get(id)
        {
            let bounds = crate::compute_bounds(item, &self.measure);
            if self.layout.in_move_zone(pt, bounds) {
                return Cursor::Grab;
            }
        }
        Cursor::Pointer
    }

    fn drag_to(&mut self, pt: Point) {
        let interaction = self.interaction;
        let Some(item) = interaction.item().and_then(|id| self.store.get_mut(id)) else {
            // The item went away under the pointer.
            self.finish();
            return;
        };
        match interaction {
            Interaction::Idle => {}
            Interaction::Moving { grab, .. } => {
                let anchor = pt - grab;
                item.x = anchor.x;
                item.y = anchor.y;
            }
            Interaction::Rotating {
                center,
                initial_angle,
                ..
            } => {
                item.rotation = angle_deg(center, pt) - initial_angle;
            }
            Interaction::Resizing {
                handle,
                initial_scale,
                initial_size,
                ..
            } => {
                let delta = self.capture.total_offset(pt).unwrap_or(Vec2::ZERO);
                let factor = resize_factor(handle, delta, initial_size);
                item.scale_x = (initial_scale.x * factor.x).max(MIN_SCALE);
                item.scale_y = (initial_scale.y * factor.y).max(MIN_SCALE);
            }
        }
        trace!(
            "{:?} -> pos ({:.1}, {:.1}) rot {:.1} scale ({:.3}, {:.3})",
            item.id, item.x, item.y, item.rotation, item.scale_x, item.scale_y
        );
        self.store.refresh_selection(&self.measure);
    }

    /// Release the button. Ends any manipulation.
    pub fn pointer_up(&mut self) {
        if self.is_interacting() {
            self.finish();
        }
    }

    /// The pointer left the canvas. Treated as a release.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// The host window lost focus. Treated as a release.
    pub fn focus_lost(&mut self) {
        self.pointer_up();
    }

    fn finish(&mut self) {
        debug!("finished {:?}", self.interaction);
        self.interaction = Interaction::Idle;
        self.capture.release();
    }

    /// Remove the selected item. Returns it, or `None` without a selection.
    pub fn delete_selected(&mut self) -> Option<TextItem> {
        let id = self.store.selected_id()?;
        self.remove_item(id)
    }

    /// Add a placeholder text item at the canvas center and select it.
    pub fn add_text(&mut self, layer: Layer) -> ItemId {
        let text = match layer {
            Layer::Background => "New Background Text",
            Layer::Foreground => "New Foreground Text",
        };
        let center = self.canvas.center();
        self.add_item(layer, text, NEW_TEXT_SIZE, center.x, center.y)
    }

    /// Add an item and select it.
    pub fn add_item(
        &mut self,
        layer: Layer,
        text: impl Into<String>,
        font_size: f64,
        x: f64,
        y: f64,
    ) -> ItemId {
        let id = self.store.add_item(layer, text, font_size, x, y).id;
        self.store.select(id, &self.measure);
        id
    }

    /// Take over an item built elsewhere, such as one loaded from a saved scene.
    ///
    /// The item gets a fresh id. The selection is left alone.
    pub fn import(&mut self, item: TextItem) -> ItemId {
        self.store.import(item)
    }

    /// Remove an item, ending any manipulation of it.
    pub fn remove_item(&mut self, id: ItemId) -> Option<TextItem> {
        if self.interaction.item() == Some(id) {
            self.finish();
        }
        self.store.remove_item(id)
    }

    /// Remove every item.
    pub fn clear_all(&mut self) {
        if self.is_interacting() {
            self.finish();
        }
        self.store.clear_all();
    }

    /// Select `id`. Returns `false` if there is no such item.
    pub fn select(&mut self, id: ItemId) -> bool {
        self.store.select(id, &self.measure)
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.store.deselect();
    }

    fn edit(&mut self, id: ItemId, f: impl FnOnce(&mut TextItem)) -> bool {
        let Some(item) = self.store.get_mut(id) else {
            return false;
        };
        f(item);
        self.store.refresh_selection(&self.measure);
        if self.interaction.item() == Some(id) && self.store.selected_id() != Some(id) {
            self.finish();
        }
        true
    }

    /// Replace the text of an item.
    pub fn set_text(&mut self, id: ItemId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.edit(id, |item| item.text = text)
    }

    /// Set the base font size of an item. Non-positive or non-finite sizes are rejected.
    pub fn set_font_size(&mut self, id: ItemId, font_size: f64) -> bool {
        if !is_valid_font_size(font_size) {
            return false;
        }
        self.edit(id, |item| item.font_size = font_size)
    }

    /// Set the font of an item.
    pub fn set_font(&mut self, id: ItemId, font: FontChoice) -> bool {
        self.edit(id, |item| item.font = font)
    }

    /// Set the font of every item and of items added later.
    pub fn set_font_all(&mut self, font: FontChoice) {
        for item in self.store.items_mut() {
            item.font = font.clone();
        }
        debug!("font of all items set to {font:?}");
        self.store.set_default_font(font);
        self.store.refresh_selection(&self.measure);
    }

    /// Change the canvas size, recentering items whose anchor falls outside it.
    ///
    /// Returns the number of recentered items.
    pub fn resize_canvas(&mut self, canvas: Canvas) -> usize {
        debug!(
            "canvas {}x{} -> {}x{}",
            self.canvas.width, self.canvas.height, canvas.width, canvas.height
        );
        self.canvas = canvas;
        let moved = self.store.recenter_outside(canvas);
        self.store.refresh_selection(&self.measure);
        moved
    }

    /// Add the randomized starter content to the current canvas.
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        seed_default_texts(rng, self.canvas, &mut self.store);
    }

    /// Drop every item, restore the default canvas and reseed.
    ///
    /// Ids keep increasing across resets.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.clear_all();
        self.canvas = Canvas::default();
        self.seed(rng);
        debug!("reset to {} items", self.store.len());
    }
}

/// Scale multipliers for dragging `handle` by `delta` from a box of `size`.
///
/// East and south edges grow with positive deltas, west and north with
/// negative ones. An axis the handle does not control keeps factor 1.
fn resize_factor(handle: Handle, delta: Vec2, size: Size) -> Vec2 {
    let axis = |dir: f64, d: f64, extent: f64| {
        if dir == 0.0 || extent <= 0.0 {
            1.0
        } else {
            1.0 + dir * d / extent
        }
    };
    Vec2::new(
        axis(handle.x_dir(), delta.x, size.width),
        axis(handle.y_dir(), delta.y, size.height),
    )
}
