// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Imaging: a small imaging IR shared by the text compositor and its backends.
//!
//! The compositor never talks to a rasterizer directly. It emits a stream of
//! plain data operations and lets a backend decide how to turn them into pixels:
//!
//! - **Resources** are opaque handles ([`PathId`], [`PaintId`], [`PictureId`])
//!   created through [`ResourceBackend`].
//! - **Operations** are either [`StateOp`] (transform, paint, stroke, layer
//!   scopes) or [`DrawOp`] (fill/stroke geometry, replay a picture).
//! - **Layers** ([`LayerOp`]) are the only compositing primitive: a layer
//!   collects everything drawn inside it on a fresh surface and composites that
//!   surface into its parent with an optional filter and opacity. This is how
//!   the foreground plane gets its reduced alpha and how text gets its soft
//!   shadow.
//! - **Pictures** are recordings installed as resources. Drawing a picture
//!   replays its operations under an extra transform, which is how a finished
//!   frame can be restacked on top of itself with small offsets.
//!
//! # Example
//!
//! ```
//! use kurbo::Affine;
//! use peniko::{Brush, Color};
//! use relief_imaging::{
//!     DrawOp, ImagingBackend, ImagingBackendExt, PaintDesc, StateOp, record_picture,
//! };
//!
//! fn paint_frame(backend: &mut dyn ImagingBackend) {
//!     let red = backend.create_paint(PaintDesc {
//!         brush: Brush::Solid(Color::from_rgba8(220, 40, 40, 255)),
//!     });
//!     let frame = record_picture(backend, |b| {
//!         b.state(StateOp::SetPaint(red));
//!         b.draw(DrawOp::FillRect { x0: 0.0, y0: 0.0, x1: 10.0, y1: 10.0 });
//!     });
//!     backend.with_opacity_layer(0.5, |b| {
//!         b.draw(DrawOp::DrawPicture {
//!             picture: frame,
//!             transform: Affine::translate((2.0, 2.0)),
//!         });
//!     });
//! }
//! ```

#![no_std]

extern crate alloc;

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use kurbo::{BezPath, PathEl};
use peniko::Brush;

/// Identifier for a path resource.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathId(pub u32);

/// Identifier for a paint resource.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintId(pub u32);

/// Identifier for a picture resource.
///
/// A picture stays drawable for as long as every resource its recording
/// references is alive.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PictureId(pub u32);

/// Affine transform type used by the imaging IR.
pub type Affine = kurbo::Affine;

/// Stroke style used by [`StateOp::SetStroke`], including dashes.
pub type StrokeStyle = kurbo::Stroke;

/// Image filter applied when a layer is composited into its parent.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterDesc {
    /// Gaussian blur of the layer contents.
    Blur {
        /// Standard deviation in device pixels.
        std_deviation: f32,
    },
    /// Blurred, tinted copy of the layer's alpha drawn under the layer contents.
    DropShadow {
        /// Shadow offset along the X axis.
        dx: f32,
        /// Shadow offset along the Y axis.
        dy: f32,
        /// Blur standard deviation.
        std_deviation: f32,
        /// Shadow color (its alpha scales the shadow).
        color: peniko::Color,
    },
}

impl FilterDesc {
    /// Create a uniform Gaussian blur filter.
    #[inline]
    pub const fn blur(std_deviation: f32) -> Self {
        Self::Blur { std_deviation }
    }

    /// Create a drop shadow filter.
    #[inline]
    pub const fn drop_shadow(dx: f32, dy: f32, std_deviation: f32, color: peniko::Color) -> Self {
        Self::DropShadow {
            dx,
            dy,
            std_deviation,
            color,
        }
    }
}

/// Parameters for a pushed compositing layer.
///
/// Everything drawn between the push and the matching pop lands on an
/// isolated surface. On pop, `filter` is applied to that surface and the
/// result is composited into the parent at `opacity`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerOp {
    /// Optional filter applied to the layer contents.
    pub filter: Option<FilterDesc>,
    /// Optional opacity (0–1) used when compositing into the parent.
    pub opacity: Option<f32>,
}

impl LayerOp {
    /// Returns true if this layer has no effect at all.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.filter.is_none() && self.opacity.is_none()
    }
}

/// State operations that mutate the current imaging state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    /// Set the current transform matrix.
    SetTransform(Affine),
    /// Push a new layer. Must be matched by [`StateOp::PopLayer`].
    PushLayer(LayerOp),
    /// Pop the most recently pushed layer.
    PopLayer,
    /// Set the current paint resource.
    SetPaint(PaintId),
    /// Set the current stroke style.
    SetStroke(StrokeStyle),
}

/// Draw operations that produce pixels given the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill the given path (non-zero rule) with the current paint.
    FillPath(PathId),
    /// Stroke the given path with the current stroke and paint.
    StrokePath(PathId),
    /// Fill an axis-aligned rectangle with the current paint.
    FillRect {
        /// Minimum X coordinate.
        x0: f32,
        /// Minimum Y coordinate.
        y0: f32,
        /// Maximum X coordinate.
        x1: f32,
        /// Maximum Y coordinate.
        y1: f32,
    },
    /// Stroke an axis-aligned rectangle with the current stroke and paint.
    StrokeRect {
        /// Minimum X coordinate.
        x0: f32,
        /// Minimum Y coordinate.
        y0: f32,
        /// Maximum X coordinate.
        x1: f32,
        /// Maximum Y coordinate.
        y1: f32,
    },
    /// Replay a picture with `transform` prepended to every transform it sets.
    DrawPicture {
        /// Picture resource to draw.
        picture: PictureId,
        /// Transform applied to the picture.
        transform: Affine,
    },
}

/// Description of a path resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PathDesc {
    /// Command buffer describing the path geometry.
    pub commands: Box<[PathCmd]>,
}

impl PathDesc {
    /// Lower a kurbo path into a command buffer.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "IR coordinates are f32 by design"
    )]
    pub fn from_bez_path(path: &BezPath) -> Self {
        let pt = |p: kurbo::Point| (p.x as f32, p.y as f32);
        let commands: Vec<PathCmd> = path
            .elements()
            .iter()
            .map(|el| match *el {
                PathEl::MoveTo(p) => {
                    let (x, y) = pt(p);
                    PathCmd::MoveTo { x, y }
                }
                PathEl::LineTo(p) => {
                    let (x, y) = pt(p);
                    PathCmd::LineTo { x, y }
                }
                PathEl::QuadTo(c, p) => {
                    let (x1, y1) = pt(c);
                    let (x, y) = pt(p);
                    PathCmd::QuadTo { x1, y1, x, y }
                }
                PathEl::CurveTo(c1, c2, p) => {
                    let (x1, y1) = pt(c1);
                    let (x2, y2) = pt(c2);
                    let (x, y) = pt(p);
                    PathCmd::CurveTo {
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    }
                }
                PathEl::ClosePath => PathCmd::Close,
            })
            .collect();
        Self {
            commands: commands.into_boxed_slice(),
        }
    }

    /// Convert the command buffer back into a kurbo path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut p = BezPath::new();
        for cmd in self.commands.iter() {
            match *cmd {
                PathCmd::MoveTo { x, y } => p.move_to((f64::from(x), f64::from(y))),
                PathCmd::LineTo { x, y } => p.line_to((f64::from(x), f64::from(y))),
                PathCmd::QuadTo { x1, y1, x, y } => p.quad_to(
                    (f64::from(x1), f64::from(y1)),
                    (f64::from(x), f64::from(y)),
                ),
                PathCmd::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => p.curve_to(
                    (f64::from(x1), f64::from(y1)),
                    (f64::from(x2), f64::from(y2)),
                    (f64::from(x), f64::from(y)),
                ),
                PathCmd::Close => p.close_path(),
            }
        }
        p
    }
}

/// Simple path command enumeration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathCmd {
    /// Move the current point without drawing.
    MoveTo {
        /// X coordinate of the new point.
        x: f32,
        /// Y coordinate of the new point.
        y: f32,
    },
    /// Line from the current point to the given point.
    LineTo {
        /// X coordinate of the line end.
        x: f32,
        /// Y coordinate of the line end.
        y: f32,
    },
    /// Quadratic Bézier segment.
    QuadTo {
        /// X coordinate of the control point.
        x1: f32,
        /// Y coordinate of the control point.
        y1: f32,
        /// X coordinate of the curve end.
        x: f32,
        /// Y coordinate of the curve end.
        y: f32,
    },
    /// Cubic Bézier segment.
    CurveTo {
        /// X coordinate of the first control point.
        x1: f32,
        /// Y coordinate of the first control point.
        y1: f32,
        /// X coordinate of the second control point.
        x2: f32,
        /// Y coordinate of the second control point.
        y2: f32,
        /// X coordinate of the curve end.
        x: f32,
        /// Y coordinate of the curve end.
        y: f32,
    },
    /// Close the current subpath.
    Close,
}

/// Description of a paint resource.
#[derive(Clone, Debug)]
pub struct PaintDesc {
    /// Brush used when filling or stroking.
    pub brush: Brush,
}

/// Description of a picture resource.
#[derive(Clone, Debug)]
pub struct PictureDesc {
    /// Recorded operations replayed when the picture is drawn.
    pub recording: RecordedOps,
}

/// Unified imaging operation used by recordings.
#[derive(Clone, Debug, PartialEq)]
pub enum ImagingOp {
    /// State-changing operation.
    State(StateOp),
    /// Drawing operation.
    Draw(DrawOp),
}

/// A captured sequence of imaging operations.
///
/// Recordings reference resources by id; they are only meaningful on the
/// backend that created those resources.
#[derive(Clone, Debug)]
pub struct RecordedOps {
    /// Captured operations in issue order.
    pub ops: Arc<[ImagingOp]>,
}

/// Resource lifetime interface.
///
/// Ids must stay valid and refer to the same resource until destroyed.
pub trait ResourceBackend {
    /// Create a path resource.
    fn create_path(&mut self, desc: PathDesc) -> PathId;
    /// Destroy a previously created path.
    fn destroy_path(&mut self, id: PathId);

    /// Create a paint resource.
    fn create_paint(&mut self, desc: PaintDesc) -> PaintId;
    /// Destroy a previously created paint.
    fn destroy_paint(&mut self, id: PaintId);

    /// Create a picture resource.
    fn create_picture(&mut self, desc: PictureDesc) -> PictureId;
    /// Destroy a previously created picture.
    fn destroy_picture(&mut self, id: PictureId);
}

/// Minimal imaging backend trait.
pub trait ImagingBackend: ResourceBackend {
    /// Apply a state operation.
    ///
    /// Inside an active recording the operation is both applied and captured.
    fn state(&mut self, op: StateOp);

    /// Apply a draw operation.
    fn draw(&mut self, op: DrawOp);

    /// Begin capturing subsequent operations. Only one recording may be active.
    fn begin_record(&mut self);

    /// End the current recording and return the captured operations.
    fn end_record(&mut self) -> RecordedOps;

    /// Push a new layer onto the layer stack.
    #[inline]
    fn layer_push(&mut self, op: LayerOp) {
        self.state(StateOp::PushLayer(op));
    }

    /// Pop the most recently pushed layer.
    #[inline]
    fn layer_pop(&mut self) {
        self.state(StateOp::PopLayer);
    }
}

/// Scoped helpers for [`ImagingBackend`] callers.
///
/// Kept separate from [`ImagingBackend`] so that `&mut dyn ImagingBackend`
/// stays usable while these methods take closures.
pub trait ImagingBackendExt: ImagingBackend {
    /// Run `f` inside a pushed layer, popping it afterwards.
    ///
    /// Note: if `f` panics, the layer will not be popped.
    #[inline]
    fn with_layer<R>(&mut self, op: LayerOp, f: impl FnOnce(&mut Self) -> R) -> R {
        self.layer_push(op);
        let out = f(self);
        self.layer_pop();
        out
    }

    /// Run `f` inside an opacity layer.
    #[inline]
    fn with_opacity_layer<R>(&mut self, opacity: f32, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_layer(
            LayerOp {
                filter: None,
                opacity: Some(opacity),
            },
            f,
        )
    }

    /// Run `f` inside a filter layer.
    #[inline]
    fn with_filter_layer<R>(&mut self, filter: FilterDesc, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_layer(
            LayerOp {
                filter: Some(filter),
                opacity: None,
            },
            f,
        )
    }

    /// Run `f` inside a layer that is filtered and then composited at `opacity`.
    #[inline]
    fn with_effect_layer<R>(
        &mut self,
        filter: FilterDesc,
        opacity: f32,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.with_layer(
            LayerOp {
                filter: Some(filter),
                opacity: Some(opacity),
            },
            f,
        )
    }
}

impl<B: ImagingBackend + ?Sized> ImagingBackendExt for B {}

/// Record the operations issued by `f` while still applying them to `backend`.
pub fn record_ops<B, F>(backend: &mut B, f: F) -> RecordedOps
where
    B: ImagingBackend + ?Sized,
    F: FnOnce(&mut B),
{
    backend.begin_record();
    f(backend);
    backend.end_record()
}

/// Record the operations issued by `f` and install them as a picture.
///
/// The operations are applied to `backend` as they are recorded, so the
/// caller sees them drawn once before the picture is ever replayed.
pub fn record_picture<B, F>(backend: &mut B, f: F) -> PictureId
where
    B: ImagingBackend + ?Sized,
    F: FnOnce(&mut B),
{
    let recording = record_ops(backend, f);
    backend.create_picture(PictureDesc { recording })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::{Circle, Shape};
    use peniko::Color;

    #[derive(Default)]
    struct CountingBackend {
        next_path: u32,
        next_paint: u32,
        pictures: Vec<PictureDesc>,
        ops: Vec<ImagingOp>,
        recording_start: Option<usize>,
    }

    impl ResourceBackend for CountingBackend {
        fn create_path(&mut self, _desc: PathDesc) -> PathId {
            self.next_path += 1;
            PathId(self.next_path - 1)
        }

        fn destroy_path(&mut self, _id: PathId) {}

        fn create_paint(&mut self, _desc: PaintDesc) -> PaintId {
            self.next_paint += 1;
            PaintId(self.next_paint - 1)
        }

        fn destroy_paint(&mut self, _id: PaintId) {}

        fn create_picture(&mut self, desc: PictureDesc) -> PictureId {
            self.pictures.push(desc);
            PictureId(u32::try_from(self.pictures.len() - 1).unwrap())
        }

        fn destroy_picture(&mut self, _id: PictureId) {}
    }

    impl ImagingBackend for CountingBackend {
        fn state(&mut self, op: StateOp) {
            self.ops.push(ImagingOp::State(op));
        }

        fn draw(&mut self, op: DrawOp) {
            self.ops.push(ImagingOp::Draw(op));
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

    #[test]
    fn record_picture_applies_and_captures() {
        let mut backend = CountingBackend::default();
        let paint = backend.create_paint(PaintDesc {
            brush: Brush::Solid(Color::WHITE),
        });

        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        let picture = record_picture(&mut backend, |b| {
            b.state(StateOp::SetPaint(paint));
            b.draw(DrawOp::FillRect {
                x0: 0.0,
                y0: 0.0,
                x1: 4.0,
                y1: 4.0,
            });
        });

        assert_eq!(picture, PictureId(0));
        assert_eq!(backend.ops.len(), 3, "recorded ops are also applied");
        assert_eq!(backend.pictures[0].recording.ops.len(), 2);
    }

    #[test]
    fn scoped_layers_are_balanced() {
        let mut backend = CountingBackend::default();
        backend.with_effect_layer(FilterDesc::blur(1.5), 0.6, |b| {
            b.with_opacity_layer(0.8, |_| {});
        });

        let pushes = backend
            .ops
            .iter()
            .filter(|op| matches!(op, ImagingOp::State(StateOp::PushLayer(_))))
            .count();
        let pops = backend
            .ops
            .iter()
            .filter(|op| matches!(op, ImagingOp::State(StateOp::PopLayer)))
            .count();
        assert_eq!(pushes, 2);
        assert_eq!(pops, 2);
        assert_eq!(
            backend.ops[0],
            ImagingOp::State(StateOp::PushLayer(LayerOp {
                filter: Some(FilterDesc::Blur { std_deviation: 1.5 }),
                opacity: Some(0.6),
            }))
        );
    }

    #[test]
    fn layer_noop_detection() {
        assert!(LayerOp::default().is_noop());
        assert!(
            !LayerOp {
                filter: None,
                opacity: Some(1.0),
            }
            .is_noop()
        );
    }

    #[test]
    fn bez_path_lowering_keeps_structure() {
        let circle = Circle::new((10.0, 10.0), 5.0).to_path(0.1);
        let desc = PathDesc::from_bez_path(&circle);
        assert!(matches!(desc.commands[0], PathCmd::MoveTo { .. }));
        assert!(matches!(desc.commands.last(), Some(PathCmd::Close)));
        assert_eq!(desc.to_bez_path().elements().len(), circle.elements().len());

        let square = PathDesc {
            commands: vec![
                PathCmd::MoveTo { x: 0.0, y: 0.0 },
                PathCmd::LineTo { x: 1.0, y: 0.0 },
                PathCmd::Close,
            ]
            .into_boxed_slice(),
        };
        assert_eq!(PathDesc::from_bez_path(&square.to_bez_path()), square);
    }
}
