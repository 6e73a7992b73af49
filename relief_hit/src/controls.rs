// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control handles around a selected box.
//!
//! Handles are laid out on the unrotated bounding box: four corners, four
//! edge midpoints and a rotate handle floating above the top edge. Each
//! handle accepts points within a square zone of half-extent
//! `handle_size / 2 + tolerance` around its center.

use kurbo::{Point, Rect};

use crate::{HitKind, HitScore};

/// One of the eight resize handles, named by compass direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Top-left corner.
    Nw,
    /// Top-right corner.
    Ne,
    /// Bottom-left corner.
    Sw,
    /// Bottom-right corner.
    Se,
    /// Top edge midpoint.
    N,
    /// Bottom edge midpoint.
    S,
    /// Left edge midpoint.
    W,
    /// Right edge midpoint.
    E,
}

impl Handle {
    /// All handles in hit-test order.
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::Ne,
        Self::Sw,
        Self::Se,
        Self::N,
        Self::S,
        Self::W,
        Self::E,
    ];

    /// Center of this handle on `bounds`.
    pub fn position(self, bounds: Rect) -> Point {
        let c = bounds.center();
        let x = match self.x_dir() {
            d if d < 0.0 => bounds.x0,
            d if d > 0.0 => bounds.x1,
            _ => c.x,
        };
        let y = match self.y_dir() {
            d if d < 0.0 => bounds.y0,
            d if d > 0.0 => bounds.y1,
            _ => c.y,
        };
        Point::new(x, y)
    }

    /// Horizontal edge this handle drags: `-1` for west, `1` for east, `0` for neither.
    pub fn x_dir(self) -> f64 {
        match self {
            Self::Nw | Self::Sw | Self::W => -1.0,
            Self::Ne | Self::Se | Self::E => 1.0,
            Self::N | Self::S => 0.0,
        }
    }

    /// Vertical edge this handle drags: `-1` for north, `1` for south, `0` for neither.
    pub fn y_dir(self) -> f64 {
        match self {
            Self::Nw | Self::Ne | Self::N => -1.0,
            Self::Sw | Self::Se | Self::S => 1.0,
            Self::W | Self::E => 0.0,
        }
    }
}

/// What a pointer over a selected box targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlHit {
    /// The rotate handle above the top edge.
    Rotate,
    /// A resize handle.
    Resize(Handle),
    /// The inner zone of the body, away from the edges.
    Move,
}

/// Sizes and distances of the control handles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleLayout {
    /// Drawn edge length of a square handle.
    pub handle_size: f64,
    /// Extra slack around a handle that still counts as a hit.
    pub tolerance: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_offset: f64,
    /// Inset from every edge that delimits the move zone.
    pub move_inset: f64,
}

impl Default for HandleLayout {
    fn default() -> Self {
        Self {
            handle_size: 16.0,
            tolerance: 8.0,
            rotate_offset: 30.0,
            move_inset: 20.0,
        }
    }
}

impl HandleLayout {
    /// Center of the rotate handle for `bounds`.
    pub fn rotate_handle(&self, bounds: Rect) -> Point {
        Point::new(bounds.center().x, bounds.y0 - self.rotate_offset)
    }

    /// Inner zone of `bounds` in which a press starts a move.
    ///
    /// Empty (`None`) when the box is too small to have one.
    pub fn move_zone(&self, bounds: Rect) -> Option<Rect> {
        let i = self.move_inset;
        let zone = Rect::new(bounds.x0 + i, bounds.y0 + i, bounds.x1 - i, bounds.y1 - i);
        (zone.x0 <= zone.x1 && zone.y0 <= zone.y1).then_some(zone)
    }

    /// Returns `true` if `pt` is inside the move zone of `bounds`, edges included.
    pub fn in_move_zone(&self, pt: Point, bounds: Rect) -> bool {
        self.move_zone(bounds).is_some_and(|z| {
            pt.x >= z.x0 && pt.x <= z.x1 && pt.y >= z.y0 && pt.y <= z.y1
        })
    }

    fn hit_handle(&self, pt: Point, center: Point) -> Option<HitScore> {
        let reach = self.handle_size * 0.5 + self.tolerance;
        let d = pt - center;
        (d.x.abs() <= reach && d.y.abs() <= reach).then(|| HitScore {
            distance: d.hypot(),
            kind: HitKind::Handle,
        })
    }

    /// Classify `pt` against the controls of a selected box with `bounds`.
    ///
    /// The rotate handle wins over resize handles, which win over the move zone.
    pub fn hit_control(&self, pt: Point, bounds: Rect) -> Option<ControlHit> {
        if self.hit_handle(pt, self.rotate_handle(bounds)).is_some() {
            return Some(ControlHit::Rotate);
        }
        if let Some(handle) = Handle::ALL
            .into_iter()
            .find(|h| self.hit_handle(pt, h.position(bounds)).is_some())
        {
            return Some(ControlHit::Resize(handle));
        }
        self.in_move_zone(pt, bounds).then_some(ControlHit::Move)
    }
}
