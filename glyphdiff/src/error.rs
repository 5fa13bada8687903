// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types, one per failure family.
//!
//! Loading a backend, opening a face, preparing the content directory and writing
//! the report are fatal for a run. Per-glyph [`RenderError`]s and failed image
//! writes are logged by the sweep and never abort it.

use core::fmt;
use std::io;
use std::path::PathBuf;

/// A backend artifact could not be turned into a usable backend.
#[derive(Debug)]
pub enum LoadError {
    /// The artifact could not be opened at all.
    Open {
        /// Path of the artifact.
        artifact: PathBuf,
        /// Loader diagnostic.
        reason: String,
    },
    /// A required capability symbol is missing from the artifact.
    MissingSymbol {
        /// Path of the artifact.
        artifact: PathBuf,
        /// Name of the unresolved symbol.
        symbol: &'static str,
    },
    /// The library's own initialisation call failed.
    Init {
        /// Path of the artifact.
        artifact: PathBuf,
        /// Backend-specific error code.
        code: i32,
    },
    /// The artifact name does not refer to any known backend.
    Unknown {
        /// The name as given.
        name: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { artifact, reason } => {
                write!(f, "cannot load backend `{}`: {reason}", artifact.display())
            }
            Self::MissingSymbol { artifact, symbol } => write!(
                f,
                "backend `{}` does not export `{symbol}`",
                artifact.display()
            ),
            Self::Init { artifact, code } => write!(
                f,
                "backend `{}` failed to initialise (error {code})",
                artifact.display()
            ),
            Self::Unknown { name } => write!(f, "unknown built-in backend `{name}`"),
        }
    }
}

impl core::error::Error for LoadError {}

/// A face could not be opened or sized.
#[derive(Debug)]
pub enum FaceError {
    /// The font file could not be read.
    Read {
        /// Path of the font.
        font: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The backend rejected the font or face index.
    Open {
        /// Path of the font.
        font: PathBuf,
        /// Backend diagnostic.
        reason: String,
    },
    /// The backend rejected the character size.
    SetSize {
        /// Path of the font.
        font: PathBuf,
        /// Requested size in points.
        char_size: u32,
        /// Backend diagnostic.
        reason: String,
    },
}

impl fmt::Display for FaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { font, source } => {
                write!(f, "cannot read font `{}`: {source}", font.display())
            }
            Self::Open { font, reason } => {
                write!(f, "cannot open face in `{}`: {reason}", font.display())
            }
            Self::SetSize {
                font,
                char_size,
                reason,
            } => write!(
                f,
                "cannot set size {char_size}pt on `{}`: {reason}",
                font.display()
            ),
        }
    }
}

impl core::error::Error for FaceError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Open { .. } | Self::SetSize { .. } => None,
        }
    }
}

/// A single glyph could not be rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The glyph id is not below the face's glyph count.
    OutOfRange {
        /// Requested glyph.
        glyph_id: u32,
        /// Glyph count of the face.
        num_glyphs: u32,
    },
    /// The backend could not load the glyph.
    Load {
        /// Requested glyph.
        glyph_id: u32,
        /// Backend diagnostic.
        reason: String,
    },
    /// The glyph loaded but could not be rasterized.
    Rasterize {
        /// Requested glyph.
        glyph_id: u32,
        /// Backend diagnostic.
        reason: String,
    },
}

impl RenderError {
    /// The glyph this error is about.
    pub const fn glyph_id(&self) -> u32 {
        match self {
            Self::OutOfRange { glyph_id, .. }
            | Self::Load { glyph_id, .. }
            | Self::Rasterize { glyph_id, .. } => *glyph_id,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                glyph_id,
                num_glyphs,
            } => write!(f, "glyph {glyph_id} out of range (face has {num_glyphs})"),
            Self::Load { glyph_id, reason } => {
                write!(f, "cannot load glyph {glyph_id}: {reason}")
            }
            Self::Rasterize { glyph_id, reason } => {
                write!(f, "cannot rasterize glyph {glyph_id}: {reason}")
            }
        }
    }
}

impl core::error::Error for RenderError {}

/// An image artifact or its directory could not be written.
#[derive(Debug)]
pub enum ArtifactError {
    /// The content directory could not be created.
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The image file could not be created or written.
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// PNG encoding failed.
    Encode {
        /// File path.
        path: PathBuf,
        /// Underlying encoder error.
        source: png::EncodingError,
    },
    /// There is nothing to encode.
    EmptyBitmap {
        /// Glyph whose bitmap was empty.
        glyph_id: u32,
    },
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create content directory `{}`: {source}",
                path.display()
            ),
            Self::Write { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Encode { path, source } => {
                write!(f, "cannot encode `{}`: {source}", path.display())
            }
            Self::EmptyBitmap { glyph_id } => {
                write!(f, "glyph {glyph_id} has an empty bitmap")
            }
        }
    }
}

impl core::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
            Self::EmptyBitmap { .. } => None,
        }
    }
}

/// The report document could not be written.
#[derive(Debug)]
pub struct ReportError {
    /// Report path.
    pub path: PathBuf,
    /// Underlying I/O error.
    pub source: io::Error,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot write report `{}`: {}",
            self.path.display(),
            self.source
        )
    }
}

impl core::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Any failure that ends a run before a report is produced.
#[derive(Debug)]
pub enum RunError {
    /// A backend could not be loaded.
    Load(LoadError),
    /// A face could not be opened under one of the backends.
    Face(FaceError),
    /// The content directory could not be prepared.
    Artifacts(ArtifactError),
    /// The report could not be written.
    Report(ReportError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => err.fmt(f),
            Self::Face(err) => err.fmt(f),
            Self::Artifacts(err) => err.fmt(f),
            Self::Report(err) => err.fmt(f),
        }
    }
}

impl core::error::Error for RunError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Face(err) => Some(err),
            Self::Artifacts(err) => Some(err),
            Self::Report(err) => Some(err),
        }
    }
}

impl From<LoadError> for RunError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<FaceError> for RunError {
    fn from(err: FaceError) -> Self {
        Self::Face(err)
    }
}

impl From<ArtifactError> for RunError {
    fn from(err: ArtifactError) -> Self {
        Self::Artifacts(err)
    }
}

impl From<ReportError> for RunError {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}
