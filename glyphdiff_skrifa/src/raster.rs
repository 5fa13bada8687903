// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outline to coverage: a Skrifa pen that builds a path, and a Vello CPU fill.

use glyphdiff::Bitmap;
use skrifa::outline::OutlinePen;
use vello_cpu::kurbo::{Affine, BezPath, Shape};
use vello_cpu::{Pixmap, RenderContext, RenderMode, RenderSettings};

/// Records outline commands into a [`BezPath`] with y pointing down.
#[derive(Default)]
pub(crate) struct PathPen {
    pub(crate) path: BezPath,
}

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to((f64::from(x), -f64::from(y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to((f64::from(x), -f64::from(y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.path.quad_to(
            (f64::from(x1), -f64::from(y1)),
            (f64::from(x), -f64::from(y)),
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path.curve_to(
            (f64::from(x1), -f64::from(y1)),
            (f64::from(x2), -f64::from(y2)),
            (f64::from(x), -f64::from(y)),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Fill `path` (pixel units, y down) into a bitmap covering its pixel bounds.
///
/// The bitmap's origin is the top-left corner of the smallest integer box that
/// contains the path. A path with no area renders as an empty bitmap.
pub(crate) fn rasterize(path: &BezPath) -> Result<Bitmap, String> {
    if path.elements().is_empty() {
        return Ok(Bitmap::empty());
    }
    let bounds = path.bounding_box();
    let (x0, y0) = (bounds.x0.floor(), bounds.y0.floor());
    let (x1, y1) = (bounds.x1.ceil(), bounds.y1.ceil());
    if x1 <= x0 || y1 <= y0 {
        return Ok(Bitmap::empty());
    }
    let width = pixel_extent(x1 - x0)?;
    let height = pixel_extent(y1 - y0)?;

    let settings = RenderSettings {
        render_mode: RenderMode::OptimizeSpeed,
        ..RenderSettings::default()
    };
    let mut ctx = RenderContext::new_with(width, height, settings);
    ctx.set_transform(Affine::translate((-x0, -y0)));
    ctx.set_paint(peniko::Color::BLACK);
    ctx.fill_path(path);
    ctx.flush();

    let mut pixmap = Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);
    // Black ink: alpha is the coverage.
    let coverage = pixmap.take_unpremultiplied().into_iter().map(|p| p.a).collect();
    Bitmap::new(u32::from(width), u32::from(height), coverage)
        .ok_or_else(|| String::from("pixmap size does not match its bounds"))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "only cast once checked to be a finite integer in 1..=u16::MAX"
)]
fn pixel_extent(extent: f64) -> Result<u16, String> {
    if extent.is_finite() && extent <= f64::from(u16::MAX) {
        Ok(extent as u16)
    } else {
        Err(format!("glyph extent {extent} exceeds {} pixels", u16::MAX))
    }
}
