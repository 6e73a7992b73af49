// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello CPU–backed implementation of the relief imaging backend.
//!
//! This crate implements [`ImagingBackend`] on top of the sparse-strips
//! [`vello_cpu::RenderContext`]. Layers map onto `vello_cpu` layers, so layer
//! opacity and the blur/drop-shadow filters are applied by the rasterizer.
//! Pictures are replayed from their IR on every draw.
//!
//! [`render_to_rgba`] wraps the usual context/pixmap dance for callers that
//! just want pixels back.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use kurbo::{Affine, Cap, Join};
use peniko::Brush;
use relief_imaging::{
    DrawOp, FilterDesc, ImagingBackend, ImagingOp, LayerOp, PaintDesc, PaintId, PathDesc, PathId,
    PictureDesc, PictureId, RecordedOps, ResourceBackend, StateOp, StrokeStyle,
};
use vello_common::filter_effects::{EdgeMode, Filter, FilterPrimitive};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath, Cap as CpuCap, Join as CpuJoin, Rect, Shape, Stroke, StrokeOpts,
};
use vello_cpu::{Image as CpuImage, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings};

/// Flattening tolerance used when outlining dashed strokes.
const STROKE_TOLERANCE: f64 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StackEntry {
    Noop,
    Pushed,
}

/// CPU-backed implementation of the imaging backend using `vello_cpu`.
pub struct VelloCpuImagingBackend<'ctx> {
    /// Underlying Vello CPU render context to draw into.
    pub ctx: &'ctx mut RenderContext,
    paths: Vec<Option<BezPath>>,
    paints: Vec<Option<PaintDesc>>,
    pictures: Vec<Option<PictureDesc>>,

    stack: Vec<StackEntry>,
    current_paint: Option<PaintId>,
    current_transform: Affine,
    current_stroke: Stroke,
    /// Set when the active stroke has a dash pattern `vello_cpu` will not apply itself.
    current_dashes: Option<Stroke>,
    recording_ops: Vec<ImagingOp>,
    recording_active: bool,
}

impl fmt::Debug for VelloCpuImagingBackend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuImagingBackend")
            .field("paths", &self.paths.len())
            .field("paints", &self.paints.len())
            .field("pictures", &self.pictures.len())
            .field("layer_depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl<'ctx> VelloCpuImagingBackend<'ctx> {
    /// Create a new backend that renders into the given CPU render context.
    pub fn new(ctx: &'ctx mut RenderContext) -> Self {
        Self {
            ctx,
            paths: Vec::new(),
            paints: Vec::new(),
            pictures: Vec::new(),
            stack: Vec::new(),
            current_paint: None,
            current_transform: Affine::IDENTITY,
            current_stroke: Stroke::default(),
            current_dashes: None,
            recording_ops: Vec::new(),
            recording_active: false,
        }
    }

    fn path_to_bez(&self, id: PathId) -> Option<BezPath> {
        self.paths.get(id.0 as usize)?.clone()
    }

    fn affine_to_cpu(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn filter_to_vello(filter: FilterDesc) -> Filter {
        // `vello_cpu` scales filter parameters by the transform active at push time.
        match filter {
            FilterDesc::Blur { std_deviation } => {
                Filter::from_primitive(FilterPrimitive::GaussianBlur {
                    std_deviation,
                    edge_mode: EdgeMode::None,
                })
            }
            FilterDesc::DropShadow {
                dx,
                dy,
                std_deviation,
                color,
            } => Filter::from_primitive(FilterPrimitive::DropShadow {
                dx,
                dy,
                std_deviation,
                color,
                edge_mode: EdgeMode::None,
            }),
        }
    }

    fn stroke_to_cpu(style: &StrokeStyle) -> Stroke {
        let mut stroke = Stroke::new(style.width);
        stroke.miter_limit = style.miter_limit;
        stroke.join = match style.join {
            Join::Bevel => CpuJoin::Bevel,
            Join::Miter => CpuJoin::Miter,
            Join::Round => CpuJoin::Round,
        };
        stroke.start_cap = match style.start_cap {
            Cap::Butt => CpuCap::Butt,
            Cap::Round => CpuCap::Round,
            Cap::Square => CpuCap::Square,
        };
        stroke.end_cap = match style.end_cap {
            Cap::Butt => CpuCap::Butt,
            Cap::Round => CpuCap::Round,
            Cap::Square => CpuCap::Square,
        };
        stroke
    }

    fn apply_current_paint(&mut self) {
        let Some(id) = self.current_paint else {
            return;
        };
        if let Some(Some(PaintDesc { brush })) = self.paints.get(id.0 as usize) {
            match brush.clone() {
                Brush::Solid(color) => self.ctx.set_paint(color),
                Brush::Gradient(gradient) => self.ctx.set_paint(gradient),
                Brush::Image(image_brush) => {
                    let source = ImageSource::from_peniko_image_data(&image_brush.image);
                    self.ctx.set_paint(CpuImage {
                        image: source,
                        sampler: image_brush.sampler,
                    });
                }
            }
        }
    }

    /// Stroke `path` with the current stroke, outlining it first when dashed.
    fn stroke_bez(&mut self, path: &BezPath) {
        match &self.current_dashes {
            Some(dashed) => {
                let outline = vello_cpu::kurbo::stroke(
                    path.iter(),
                    dashed,
                    &StrokeOpts::default(),
                    STROKE_TOLERANCE,
                );
                self.ctx.fill_path(&outline);
            }
            None => self.ctx.stroke_path(path),
        }
    }

    fn pop_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(StackEntry::Pushed) = self.stack.pop() {
                self.ctx.pop_layer();
            }
        }
    }

    fn draw_picture(&mut self, picture: PictureId, transform: Affine) {
        let Some(Some(desc)) = self.pictures.get(picture.0 as usize) else {
            return;
        };
        let ops = desc.recording.ops.clone();

        let saved_transform = self.current_transform;
        let saved_paint = self.current_paint;
        let saved_stroke = self.current_stroke.clone();
        let saved_dashes = self.current_dashes.clone();
        let saved_depth = self.stack.len();
        let saved_recording = self.recording_active;
        self.recording_active = false;

        // Recordings set absolute transforms; prepend the picture placement.
        self.state(StateOp::SetTransform(saved_transform * transform));
        for op in ops.iter() {
            match op {
                ImagingOp::State(StateOp::SetTransform(xf)) => {
                    self.state(StateOp::SetTransform(saved_transform * transform * *xf));
                }
                ImagingOp::State(s) => self.state(s.clone()),
                ImagingOp::Draw(d) => self.draw(d.clone()),
            }
        }
        self.pop_to(saved_depth);

        self.recording_active = saved_recording;
        self.current_transform = saved_transform;
        self.ctx.set_transform(Self::affine_to_cpu(saved_transform));
        self.ctx.set_stroke(saved_stroke.clone());
        self.current_stroke = saved_stroke;
        self.current_dashes = saved_dashes;
        self.current_paint = saved_paint;
        self.apply_current_paint();
    }
}

fn next_id<T>(slots: &[Option<T>], what: &str) -> u32 {
    u32::try_from(slots.len())
        .unwrap_or_else(|_| panic!("VelloCpuImagingBackend: too many {what} for a u32 id"))
}

fn clear_slot<T>(slots: &mut [Option<T>], idx: u32) {
    if let Some(slot) = slots.get_mut(idx as usize) {
        *slot = None;
    }
}

impl ResourceBackend for VelloCpuImagingBackend<'_> {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        let id = next_id(&self.paths, "paths");
        let path = desc.to_bez_path();
        // Rebuild in the rasterizer's kurbo types.
        let mut p = BezPath::new();
        for el in path.elements() {
            match *el {
                kurbo::PathEl::MoveTo(a) => p.move_to((a.x, a.y)),
                kurbo::PathEl::LineTo(a) => p.line_to((a.x, a.y)),
                kurbo::PathEl::QuadTo(a, b) => p.quad_to((a.x, a.y), (b.x, b.y)),
                kurbo::PathEl::CurveTo(a, b, c) => p.curve_to((a.x, a.y), (b.x, b.y), (c.x, c.y)),
                kurbo::PathEl::ClosePath => p.close_path(),
            }
        }
        self.paths.push(Some(p));
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

impl ImagingBackend for VelloCpuImagingBackend<'_> {
    fn state(&mut self, op: StateOp) {
        if self.recording_active {
            self.recording_ops.push(ImagingOp::State(op.clone()));
        }
        match op {
            StateOp::SetTransform(xf) => {
                self.current_transform = xf;
                self.ctx.set_transform(Self::affine_to_cpu(xf));
            }
            StateOp::PushLayer(layer) => {
                let LayerOp { filter, opacity } = layer;
                if filter.is_some() || opacity.is_some() {
                    let filter = filter.map(Self::filter_to_vello);
                    self.ctx.push_layer(None, None, opacity, None, filter);
                    self.stack.push(StackEntry::Pushed);
                } else {
                    self.stack.push(StackEntry::Noop);
                }
            }
            StateOp::PopLayer => match self.stack.pop() {
                Some(StackEntry::Noop) => {}
                Some(StackEntry::Pushed) => self.ctx.pop_layer(),
                None => panic!("PopLayer with empty stack"),
            },
            StateOp::SetPaint(id) => {
                self.current_paint = Some(id);
                self.apply_current_paint();
            }
            StateOp::SetStroke(style) => {
                let stroke = Self::stroke_to_cpu(&style);
                self.current_dashes = (!style.dash_pattern.is_empty()).then(|| {
                    stroke
                        .clone()
                        .with_dashes(style.dash_offset, style.dash_pattern.iter().copied())
                });
                self.ctx.set_stroke(stroke.clone());
                self.current_stroke = stroke;
            }
        }
    }

    fn draw(&mut self, op: DrawOp) {
        if self.recording_active {
            self.recording_ops.push(ImagingOp::Draw(op.clone()));
        }

        match op {
            DrawOp::FillPath(id) => {
                if let Some(path) = self.path_to_bez(id) {
                    self.ctx.fill_path(&path);
                }
            }
            DrawOp::StrokePath(id) => {
                if let Some(path) = self.path_to_bez(id) {
                    self.stroke_bez(&path);
                }
            }
            DrawOp::FillRect { x0, y0, x1, y1 } => {
                let rect = Rect::new(x0.into(), y0.into(), x1.into(), y1.into());
                self.ctx.fill_rect(&rect);
            }
            DrawOp::StrokeRect { x0, y0, x1, y1 } => {
                let rect = Rect::new(x0.into(), y0.into(), x1.into(), y1.into());
                if self.current_dashes.is_some() {
                    self.stroke_bez(&rect.to_path(STROKE_TOLERANCE));
                } else {
                    self.ctx.stroke_rect(&rect);
                }
            }
            DrawOp::DrawPicture { picture, transform } => self.draw_picture(picture, transform),
        }
    }

    fn begin_record(&mut self) {
        self.recording_ops.clear();
        self.recording_active = true;
    }

    fn end_record(&mut self) -> RecordedOps {
        self.recording_active = false;
        RecordedOps {
            ops: core::mem::take(&mut self.recording_ops).into(),
        }
    }
}

/// Render with a fresh context and return unpremultiplied RGBA8 pixels, row-major.
pub fn render_to_rgba<F>(width: u16, height: u16, build: F) -> Vec<u8>
where
    F: FnOnce(&mut VelloCpuImagingBackend<'_>),
{
    let settings = RenderSettings {
        // Keep output on the u8 pipeline even if `f32_pipeline` is enabled elsewhere.
        render_mode: RenderMode::OptimizeSpeed,
        ..RenderSettings::default()
    };
    let mut ctx = RenderContext::new_with(width, height, settings);
    {
        let mut backend = VelloCpuImagingBackend::new(&mut ctx);
        build(&mut backend);
    }

    let mut pixmap = Pixmap::new(width, height);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    let unpremul = pixmap.take_unpremultiplied();
    let mut bytes = Vec::with_capacity(unpremul.len() * 4);
    for p in unpremul {
        bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
    }
    bytes
}
