// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend capability traits and the bitmap they produce.

use std::fmt::Debug;
use std::path::Path;

use crate::error::{FaceError, RenderError};

/// Resolution used when none is requested, in dots per inch.
pub const DEFAULT_DPI: u32 = 96;

/// Parameters for opening a face and setting its character size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FaceRequest {
    /// Index of the face within the font file.
    pub face_index: u32,
    /// Character size in points.
    pub char_size: u32,
    /// Horizontal and vertical resolution in dots per inch.
    pub dpi: u32,
}

impl FaceRequest {
    /// Request face 0 at `char_size` points and [`DEFAULT_DPI`].
    pub const fn new(char_size: u32) -> Self {
        Self {
            face_index: 0,
            char_size,
            dpi: DEFAULT_DPI,
        }
    }

    /// Replace the resolution.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Size of the em square in pixels at the requested resolution.
    #[allow(
        clippy::cast_precision_loss,
        reason = "point sizes and resolutions are far below f32's exact integer range"
    )]
    pub fn pixels_per_em(&self) -> f32 {
        self.char_size as f32 * self.dpi as f32 / 72.0
    }
}

/// One implementation of the glyph rasterization capability set.
///
/// Two instances (base and test) may be alive at the same time and must not share
/// mutable state. Dropping a backend shuts its library down and releases the
/// artifact it was loaded from.
pub trait RasterizationBackend: Debug {
    /// Short human-readable name, used in logs.
    fn label(&self) -> &str;

    /// Open face `request.face_index` of `font` and set its character size.
    ///
    /// The returned face borrows the backend, so it is always closed before the
    /// backend is torn down.
    fn open_face(
        &self,
        font: &Path,
        request: FaceRequest,
    ) -> Result<Box<dyn GlyphFace + '_>, FaceError>;
}

/// An opened face at a fixed character size. Dropping it closes the face.
pub trait GlyphFace {
    /// Number of glyphs in the face. Glyph ids are `0..num_glyphs()`.
    fn num_glyphs(&self) -> u32;

    /// Load and rasterize one glyph.
    fn render_glyph(&mut self, glyph_id: u32) -> Result<Bitmap, RenderError>;
}

/// A rendered glyph: row-major 8-bit coverage, tightly packed.
///
/// `0` is no ink and `255` is full ink. Whitespace and undefined glyphs render as
/// a 0×0 bitmap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap a coverage buffer.
    ///
    /// Returns `None` if `pixels.len()` is not `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A 0×0 bitmap.
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Coverage values, `height` rows of `width` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True if either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sum of coverage divided by 255.
    pub fn ink_mass(&self) -> f64 {
        let total: u64 = self.pixels.iter().map(|&c| u64::from(c)).sum();
        #[allow(
            clippy::cast_precision_loss,
            reason = "glyph bitmaps are nowhere near 2^53 total coverage"
        )]
        let total = total as f64;
        total / 255.0
    }
}
