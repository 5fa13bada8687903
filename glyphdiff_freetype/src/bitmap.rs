// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalization of FreeType glyph-slot bitmaps into tightly packed coverage.

use core::fmt;

use glyphdiff::Bitmap;

/// `FT_PIXEL_MODE_MONO`: one bit per pixel, most significant bit first.
pub(crate) const PIXEL_MODE_MONO: u8 = 1;
/// `FT_PIXEL_MODE_GRAY`: one byte of coverage per pixel.
pub(crate) const PIXEL_MODE_GRAY: u8 = 2;

/// A borrowed view of an `FT_Bitmap`.
///
/// `buffer` spans `rows * |pitch|` bytes. A negative pitch means rows are stored
/// bottom-up.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RawBitmap<'a> {
    pub(crate) rows: u32,
    pub(crate) width: u32,
    pub(crate) pitch: i32,
    pub(crate) pixel_mode: u8,
    pub(crate) buffer: &'a [u8],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ConvertError {
    PixelMode(u8),
    Truncated { needed: usize, len: usize },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelMode(mode) => write!(f, "unsupported pixel mode {mode}"),
            Self::Truncated { needed, len } => {
                write!(f, "bitmap buffer holds {len} bytes, needs {needed}")
            }
        }
    }
}

impl RawBitmap<'_> {
    /// Bytes a row of this bitmap needs at minimum.
    fn row_bytes(&self) -> Result<usize, ConvertError> {
        let width = self.width as usize;
        match self.pixel_mode {
            PIXEL_MODE_GRAY => Ok(width),
            PIXEL_MODE_MONO => Ok(width.div_ceil(8)),
            mode => Err(ConvertError::PixelMode(mode)),
        }
    }

    /// Copy into a top-down, pitch-free coverage bitmap.
    pub(crate) fn to_coverage(&self) -> Result<Bitmap, ConvertError> {
        if self.rows == 0 || self.width == 0 {
            return Ok(Bitmap::empty());
        }
        let row_bytes = self.row_bytes()?;
        let stride = self.pitch.unsigned_abs() as usize;
        let rows = self.rows as usize;
        let needed = stride * rows;
        if stride < row_bytes || self.buffer.len() < needed {
            return Err(ConvertError::Truncated {
                needed: needed.max(row_bytes * rows),
                len: self.buffer.len(),
            });
        }

        let width = self.width as usize;
        let mut pixels = Vec::with_capacity(width * rows);
        for y in 0..rows {
            let stored = if self.pitch < 0 { rows - 1 - y } else { y };
            let row = &self.buffer[stored * stride..][..row_bytes];
            match self.pixel_mode {
                PIXEL_MODE_MONO => {
                    pixels.extend((0..width).map(|x| {
                        let bit = row[x / 8] & (0x80 >> (x % 8));
                        if bit != 0 { u8::MAX } else { 0 }
                    }));
                }
                _ => pixels.extend_from_slice(row),
            }
        }
        Bitmap::new(self.width, self.rows, pixels).ok_or(ConvertError::Truncated {
            needed,
            len: self.buffer.len(),
        })
    }
}
