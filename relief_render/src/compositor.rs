// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-plane depth compositing.

use kurbo::Affine;
use log::trace;
use peniko::Color;
use relief_hit::HandleLayout;
use relief_imaging::{
    DrawOp, FilterDesc, ImagingBackend, ImagingBackendExt, PictureId, StateOp, record_picture,
};
use relief_scene::{Canvas, Layer, TextStore};
use relief_text::TextPainter;

use crate::{FrameResources, RenderConfig, render_layer, render_selection_overlay};

/// One blurred, shifted, translucent copy of the frame drawn by the depth pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthEcho {
    /// Shift of the copy in pixels.
    pub offset: (f64, f64),
    /// Blur standard deviation in pixels.
    pub blur: f32,
    /// Opacity of the copy.
    pub opacity: f32,
}

/// The echoes drawn, in order, before the sharp frame is restacked on top.
pub const DEPTH_ECHOES: [DepthEcho; 2] = [
    DepthEcho {
        offset: (2.0, 2.0),
        blur: 1.5,
        opacity: 0.6,
    },
    DepthEcho {
        offset: (-1.0, -1.0),
        blur: 0.8,
        opacity: 0.4,
    },
];

/// Composites a [`TextStore`] onto an imaging backend.
///
/// A frame is built as:
///
/// 1. white, then the configured background color, over the whole canvas;
/// 2. the background plane at full opacity;
/// 3. the foreground plane shifted right by `offset`, composited at `opacity`;
/// 4. optionally the depth pass: the frame so far is redrawn as
///    [`DEPTH_ECHOES`] and then once more sharp on top.
///
/// [`Compositor::generate_preview`] additionally draws the selection chrome.
#[derive(Clone, Debug)]
pub struct Compositor<P> {
    painter: P,
    config: RenderConfig,
    layout: HandleLayout,
}

impl<P: TextPainter> Compositor<P> {
    /// Create a compositor drawing text through `painter`.
    pub fn new(painter: P, config: RenderConfig) -> Self {
        Self {
            painter,
            config,
            layout: HandleLayout::default(),
        }
    }

    /// The text painter.
    pub fn painter(&self) -> &P {
        &self.painter
    }

    /// Current render inputs.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Mutable render inputs; changes apply to the next frame.
    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// Handle geometry used for the selection chrome.
    pub fn layout(&self) -> &HandleLayout {
        &self.layout
    }

    /// Draw the export image: both planes and the depth pass, no selection chrome.
    pub fn generate_image<B: ImagingBackend + ?Sized>(
        &self,
        backend: &mut B,
        store: &TextStore,
        canvas: Canvas,
    ) {
        let resources = self.composite(backend, store, canvas);
        resources.release(backend);
    }

    /// Draw the interactive preview: the export image plus selection chrome.
    pub fn generate_preview<B: ImagingBackend + ?Sized>(
        &self,
        backend: &mut B,
        store: &TextStore,
        canvas: Canvas,
    ) {
        let mut resources = self.composite(backend, store, canvas);
        render_selection_overlay(backend, store, &self.painter, &self.layout, &mut resources);
        resources.release(backend);
    }

    fn composite<B: ImagingBackend + ?Sized>(
        &self,
        backend: &mut B,
        store: &TextStore,
        canvas: Canvas,
    ) -> FrameResources {
        trace!(
            "compositing {} items on {}x{}",
            store.len(),
            canvas.width,
            canvas.height
        );
        let mut resources = FrameResources::default();
        let frame = record_picture(backend, |b| self.draw_planes(b, store, canvas, &mut resources));
        resources.adopt_picture(frame);
        if self.config.depth_pass {
            draw_depth_pass(backend, frame);
        }
        resources
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "canvas dimensions are far below f32 precision limits"
    )]
    fn draw_planes<B: ImagingBackend + ?Sized>(
        &self,
        backend: &mut B,
        store: &TextStore,
        canvas: Canvas,
        resources: &mut FrameResources,
    ) {
        let cfg = &self.config;
        let full = DrawOp::FillRect {
            x0: 0.0,
            y0: 0.0,
            x1: canvas.width as f32,
            y1: canvas.height as f32,
        };
        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        let white = resources.solid(backend, Color::WHITE);
        backend.state(StateOp::SetPaint(white));
        backend.draw(full.clone());
        let background = resources.solid(backend, cfg.background);
        backend.state(StateOp::SetPaint(background));
        backend.draw(full);

        render_layer(
            backend,
            &self.painter,
            store,
            Layer::Background,
            cfg.background_text,
            0.0,
            resources,
        );

        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        backend.with_opacity_layer(cfg.foreground_opacity(), |b| {
            render_layer(
                b,
                &self.painter,
                store,
                Layer::Foreground,
                cfg.foreground_text,
                cfg.offset,
                resources,
            );
        });
        backend.state(StateOp::SetTransform(Affine::IDENTITY));
    }
}

/// Redraw `frame` as the depth echoes and then sharp on top.
fn draw_depth_pass<B: ImagingBackend + ?Sized>(backend: &mut B, frame: PictureId) {
    backend.state(StateOp::SetTransform(Affine::IDENTITY));
    for echo in DEPTH_ECHOES {
        backend.with_effect_layer(FilterDesc::blur(echo.blur), echo.opacity, |b| {
            b.draw(DrawOp::DrawPicture {
                picture: frame,
                transform: Affine::translate(echo.offset),
            });
        });
    }
    backend.draw(DrawOp::DrawPicture {
        picture: frame,
        transform: Affine::IDENTITY,
    });
}
