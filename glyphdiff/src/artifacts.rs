// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image artifacts for captured glyphs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use png::{BitDepth, ColorType, Encoder};

use crate::backend::Bitmap;
use crate::error::ArtifactError;
use crate::sweep::Side;

/// Content directory that captured glyph images are written into.
///
/// Files are named `{base|test}_{glyph_id}.png`, so captures of different glyphs
/// never collide, and a rerun overwrites the previous run's files in place.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    dir: PathBuf,
}

impl ArtifactStore {
    /// Use `root/dir` as the content directory, creating it if needed.
    ///
    /// Paths handed back by [`ArtifactStore::write_glyph`] are relative to `root`,
    /// which is where the report lives.
    pub fn create(root: &Path, dir: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let store = Self {
            root: root.to_path_buf(),
            dir: dir.into(),
        };
        let full = store.directory();
        fs::create_dir_all(&full)
            .map_err(|source| ArtifactError::CreateDir { path: full, source })?;
        Ok(store)
    }

    /// Absolute (or root-relative) path of the content directory.
    pub fn directory(&self) -> PathBuf {
        self.root.join(&self.dir)
    }

    /// File name used for `glyph_id` rendered by `side`.
    pub fn file_name(side: Side, glyph_id: u32) -> String {
        format!("{}_{glyph_id}.png", side.tag())
    }

    /// Encode `bitmap` and write it, replacing any earlier file for the same glyph.
    ///
    /// Returns the path relative to the report root.
    pub fn write_glyph(
        &self,
        side: Side,
        glyph_id: u32,
        bitmap: &Bitmap,
    ) -> Result<PathBuf, ArtifactError> {
        if bitmap.is_empty() {
            return Err(ArtifactError::EmptyBitmap { glyph_id });
        }
        let relative = self.dir.join(Self::file_name(side, glyph_id));
        let path = self.root.join(&relative);
        let file = File::create(&path).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        encode_png(&mut out, bitmap).map_err(|source| ArtifactError::Encode {
            path: path.clone(),
            source,
        })?;
        out.flush()
            .map_err(|source| ArtifactError::Write { path, source })?;
        Ok(relative)
    }
}

/// Encode a non-empty bitmap as an 8-bit grayscale PNG, dark ink on white.
pub fn encode_png<W: Write>(out: W, bitmap: &Bitmap) -> Result<(), png::EncodingError> {
    let mut encoder = Encoder::new(out, bitmap.width(), bitmap.height());
    encoder.set_color(ColorType::Grayscale);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let inverted: Vec<u8> = bitmap.pixels().iter().map(|&c| u8::MAX - c).collect();
    writer.write_image_data(&inverted)?;
    writer.finish()
}
