// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Imaging Reference Backend.
//!
//! A small, stateful implementation of [`ImagingBackend`] and
//! [`ResourceBackend`] that records every operation together with the imaging
//! state it was applied under.
//!
//! It does **not** rasterize. It exists so tests can assert on what the
//! renderer emits: which paint a glyph was filled with, which transform it was
//! placed under, and how deeply it was nested inside opacity or filter layers.

#![no_std]

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use relief_imaging::{
    Affine, DrawOp, ImagingBackend, ImagingOp, LayerOp, PaintDesc, PaintId, PathDesc, PathId,
    PictureDesc, PictureId, RecordedOps, ResourceBackend, StateOp, StrokeStyle,
};

/// Snapshot of the current imaging state inside the backend.
#[derive(Clone, Debug, Default)]
pub struct StateSnapshot {
    /// Current transform.
    pub transform: Affine,
    /// Active layers, outermost first.
    pub layers: Vec<LayerOp>,
    /// Current paint, if set.
    pub paint: Option<PaintId>,
    /// Current stroke style, if set.
    pub stroke: Option<StrokeStyle>,
}

impl StateSnapshot {
    /// Number of active layers on the layer stack.
    pub fn layer_depth(&self) -> usize {
        self.layers.len()
    }

    /// The most recently pushed layer, if any.
    pub fn layer_top(&self) -> Option<&LayerOp> {
        self.layers.last()
    }

    /// Product of the opacities of every active layer.
    ///
    /// This is the alpha a draw made in this state ends up composited at,
    /// ignoring the paint's own alpha.
    pub fn effective_opacity(&self) -> f32 {
        self.layers
            .iter()
            .filter_map(|layer| layer.opacity)
            .product()
    }
}

/// Event recorded by the reference backend.
#[derive(Clone, Debug)]
pub enum Event {
    /// State operation and the resulting state snapshot.
    State {
        /// State operation that was applied.
        op: StateOp,
        /// Snapshot after applying the state operation.
        state: StateSnapshot,
    },
    /// Draw operation and the state snapshot used for drawing.
    Draw {
        /// Draw operation that was applied.
        op: DrawOp,
        /// Snapshot at the time of drawing.
        state: StateSnapshot,
    },
}

/// Recording implementation of the imaging backend.
///
/// This backend:
/// - Stores resource descriptors in vectors keyed by their IDs,
/// - Tracks current imaging state,
/// - Records [`Event`]s as state and draw operations are applied,
/// - Supports recordings via `begin_record`/`end_record`.
///
/// Pictures are not expanded when drawn; a `DrawPicture` is logged as a single
/// draw event. Use [`RefBackend::picture`] to inspect what it would replay.
#[derive(Default, Debug)]
pub struct RefBackend {
    paths: Vec<Option<PathDesc>>,
    paints: Vec<Option<PaintDesc>>,
    pictures: Vec<Option<PictureDesc>>,

    events: Vec<Event>,
    ops: Vec<ImagingOp>,
    recording_start: Option<usize>,
    state: StateSnapshot,
}

impl RefBackend {
    /// Returns a slice of recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns a slice of raw imaging operations.
    pub fn ops(&self) -> &[ImagingOp] {
        &self.ops
    }

    /// Iterate over draw events only.
    pub fn draws(&self) -> impl Iterator<Item = (&DrawOp, &StateSnapshot)> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Draw { op, state } => Some((op, state)),
            Event::State { .. } => None,
        })
    }

    /// Current imaging state.
    pub fn current_state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Look up a live path resource.
    pub fn path(&self, id: PathId) -> Option<&PathDesc> {
        self.paths.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Look up a live paint resource.
    pub fn paint(&self, id: PaintId) -> Option<&PaintDesc> {
        self.paints.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Look up a live picture resource.
    pub fn picture(&self, id: PictureId) -> Option<&PictureDesc> {
        self.pictures.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Number of paths that have been created and not destroyed.
    pub fn live_paths(&self) -> usize {
        self.paths.iter().flatten().count()
    }

    /// Clears all recorded events and ops but keeps resources.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.ops.clear();
        self.recording_start = None;
    }
}

fn next_id<T>(slots: &[Option<T>], what: &str) -> u32 {
    u32::try_from(slots.len())
        .unwrap_or_else(|_| panic!("RefBackend: too many {what} for a u32 id"))
}

fn clear_slot<T>(slots: &mut [Option<T>], idx: u32) {
    if let Some(slot) = slots.get_mut(idx as usize) {
        *slot = None;
    }
}

impl ResourceBackend for RefBackend {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        let id = next_id(&self.paths, "paths");
        self.paths.push(Some(desc));
        PathId(id)
    }

    fn destroy_path(&mut self, id: PathId) {
        clear_slot(&mut self.paths, id.0);
    }

    fn create_paint(&mut self, desc: PaintDesc) -> PaintId {
        let id = next_id(&self.paints, "paints");
        self.paints.push(Some(desc));
        PaintId(id)
    }

    fn destroy_paint(&mut self, id: PaintId) {
        clear_slot(&mut self.paints, id.0);
    }

    fn create_picture(&mut self, desc: PictureDesc) -> PictureId {
        let id = next_id(&self.pictures, "pictures");
        self.pictures.push(Some(desc));
        PictureId(id)
    }

    fn destroy_picture(&mut self, id: PictureId) {
        clear_slot(&mut self.pictures, id.0);
    }
}

impl ImagingBackend for RefBackend {
    fn state(&mut self, op: StateOp) {
        match &op {
            StateOp::SetTransform(tx) => self.state.transform = *tx,
            StateOp::PushLayer(layer) => self.state.layers.push(layer.clone()),
            StateOp::PopLayer => {
                self.state.layers.pop();
            }
            StateOp::SetPaint(id) => self.state.paint = Some(*id),
            StateOp::SetStroke(style) => self.state.stroke = Some(style.clone()),
        }

        self.ops.push(ImagingOp::State(op.clone()));
        self.events.push(Event::State {
            op,
            state: self.state.clone(),
        });
    }

    fn draw(&mut self, op: DrawOp) {
        self.ops.push(ImagingOp::Draw(op.clone()));
        self.events.push(Event::Draw {
            op,
            state: self.state.clone(),
        });
    }

    fn begin_record(&mut self) {
        self.recording_start = Some(self.ops.len());
    }

    fn end_record(&mut self) -> RecordedOps {
        let start = self.recording_start.take().unwrap_or(self.ops.len());
        RecordedOps {
            ops: Arc::from(&self.ops[start..]),
        }
    }
}
