// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyphdiff FreeType: a [`RasterizationBackend`] backed by a FreeType build
//! loaded from a shared library at run time.
//!
//! Two builds of FreeType can be compared in one process: each artifact is
//! opened with local symbol scope (and deep binding on Linux), and all seven
//! entry points the comparison uses are resolved when the backend is loaded.
//! A missing entry point is a load error; there is no partial mode.
//!
//! Glyphs are loaded with `FT_LOAD_DEFAULT` and rendered in
//! `FT_RENDER_MODE_NORMAL`. Monochrome results are expanded to full coverage.
//!
//! ```no_run
//! use std::path::Path;
//! use glyphdiff::{RasterizationBackend, FaceRequest};
//! use glyphdiff_freetype::FreeTypeBackend;
//!
//! let backend = FreeTypeBackend::load(Path::new("/opt/freetype-base/lib/libfreetype.so"))?;
//! let mut face = backend.open_face(Path::new("Font.ttf"), FaceRequest::new(12))?;
//! let bitmap = face.render_glyph(0)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bitmap;
mod ffi;

use std::path::{Path, PathBuf};

use glyphdiff::{
    Bitmap, FaceError, FaceRequest, GlyphFace, LoadError, RasterizationBackend, RenderError,
};
use log::debug;

use crate::ffi::{Library, LoadFailure, Stage};

/// A FreeType build loaded from a shared library.
///
/// Dropping the backend calls `FT_Done_FreeType` and then unloads the library.
#[derive(Debug)]
pub struct FreeTypeBackend {
    artifact: PathBuf,
    label: String,
    library: Library,
}

impl FreeTypeBackend {
    /// Load the shared library at `artifact` and initialise it.
    pub fn load(artifact: &Path) -> Result<Self, LoadError> {
        let library = Library::load(artifact).map_err(|failure| match failure {
            LoadFailure::Open(err) => LoadError::Open {
                artifact: artifact.to_path_buf(),
                reason: err.to_string(),
            },
            LoadFailure::MissingSymbol(symbol) => LoadError::MissingSymbol {
                artifact: artifact.to_path_buf(),
                symbol,
            },
            LoadFailure::Init(code) => LoadError::Init {
                artifact: artifact.to_path_buf(),
                code: code.0,
            },
        })?;
        debug!("loaded FreeType from {}", artifact.display());
        Ok(Self {
            artifact: artifact.to_path_buf(),
            label: artifact.display().to_string(),
            library,
        })
    }

    /// Path the library was loaded from.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }
}

impl RasterizationBackend for FreeTypeBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn open_face(
        &self,
        font: &Path,
        request: FaceRequest,
    ) -> Result<Box<dyn GlyphFace + '_>, FaceError> {
        let mut face = self
            .library
            .open_face(font, request.face_index)
            .map_err(|code| FaceError::Open {
                font: font.to_path_buf(),
                reason: code.map_or_else(
                    || String::from("path contains an interior NUL"),
                    |code| code.to_string(),
                ),
            })?;
        // A failure here drops `face`, which closes it.
        face.set_char_size(request.char_size, request.dpi)
            .map_err(|code| FaceError::SetSize {
                font: font.to_path_buf(),
                char_size: request.char_size,
                reason: code.to_string(),
            })?;
        let num_glyphs = face.num_glyphs();
        Ok(Box::new(FreeTypeFace { face, num_glyphs }))
    }
}

struct FreeTypeFace<'lib> {
    face: ffi::Face<'lib>,
    num_glyphs: u32,
}

impl GlyphFace for FreeTypeFace<'_> {
    fn num_glyphs(&self) -> u32 {
        self.num_glyphs
    }

    fn render_glyph(&mut self, glyph_id: u32) -> Result<Bitmap, RenderError> {
        if glyph_id >= self.num_glyphs {
            return Err(RenderError::OutOfRange {
                glyph_id,
                num_glyphs: self.num_glyphs,
            });
        }
        let converted = self
            .face
            .render(glyph_id, |raw| raw.to_coverage())
            .map_err(|(stage, code)| match stage {
                Stage::Load => RenderError::Load {
                    glyph_id,
                    reason: code.to_string(),
                },
                Stage::Render => RenderError::Rasterize {
                    glyph_id,
                    reason: code.to_string(),
                },
            })?;
        converted.map_err(|err| RenderError::Rasterize {
            glyph_id,
            reason: err.to_string(),
        })
    }
}
