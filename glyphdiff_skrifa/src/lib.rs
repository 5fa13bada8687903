// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyphdiff Skrifa: a built-in [`RasterizationBackend`] that needs no shared
//! library.
//!
//! Outlines come from [`skrifa`] and are filled with [`vello_cpu`]. Two variants
//! exist so that a comparison can run entirely in-process:
//!
//! - `skrifa`: unhinted outlines at the requested size.
//! - `skrifa-hinted`: outlines hinted with the automatic/embedded hinter,
//!   smooth LCD target.
//!
//! Comparing one against the other shows which glyphs hinting changes.

mod raster;

use std::fs;
use std::path::{Path, PathBuf};

use glyphdiff::{Bitmap, FaceError, FaceRequest, GlyphFace, RasterizationBackend, RenderError};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{
    Engine as HintEngine, HintingInstance, HintingOptions, SmoothMode as HintSmoothMode,
    Target as HintTarget,
};
use skrifa::raw::TableProvider;
use skrifa::{FontRef, GlyphId, MetadataProvider};

use crate::raster::{PathPen, rasterize};

const HINTING_OPTIONS: HintingOptions = HintingOptions {
    engine: HintEngine::AutoFallback,
    target: HintTarget::Smooth {
        mode: HintSmoothMode::Lcd,
        symmetric_rendering: false,
        preserve_linear_metrics: true,
    },
};

/// Which outlines the backend rasterizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Unhinted outlines.
    Unhinted,
    /// Hinted outlines.
    Hinted,
}

impl Variant {
    /// Every variant.
    pub const ALL: [Self; 2] = [Self::Unhinted, Self::Hinted];

    /// Name of the variant, as used after `builtin:`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unhinted => "skrifa",
            Self::Hinted => "skrifa-hinted",
        }
    }

    /// Look a variant up by [`Variant::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.name() == name)
    }
}

/// Built-in backend over Skrifa and Vello CPU.
#[derive(Clone, Debug)]
pub struct SkrifaBackend {
    variant: Variant,
    label: String,
}

impl SkrifaBackend {
    /// Create a backend of the given variant.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            label: format!("builtin:{}", variant.name()),
        }
    }

    /// The variant this backend renders.
    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl RasterizationBackend for SkrifaBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn open_face(
        &self,
        font: &Path,
        request: FaceRequest,
    ) -> Result<Box<dyn GlyphFace + '_>, FaceError> {
        let data = fs::read(font).map_err(|source| FaceError::Read {
            font: font.to_path_buf(),
            source,
        })?;
        let open_error = |reason: String| FaceError::Open {
            font: font.to_path_buf(),
            reason,
        };
        let font_ref = FontRef::from_index(&data, request.face_index)
            .map_err(|err| open_error(err.to_string()))?;
        let num_glyphs = font_ref
            .maxp()
            .map_err(|err| open_error(format!("maxp: {err}")))?
            .num_glyphs();

        let size = Size::new(request.pixels_per_em());
        let hinting = match self.variant {
            Variant::Unhinted => None,
            Variant::Hinted => {
                let outlines = font_ref.outline_glyphs();
                let instance =
                    HintingInstance::new(&outlines, size, LocationRef::default(), HINTING_OPTIONS)
                        .map_err(|err| FaceError::SetSize {
                            font: font.to_path_buf(),
                            char_size: request.char_size,
                            reason: err.to_string(),
                        })?;
                Some(instance)
            }
        };

        Ok(Box::new(SkrifaFace {
            font: font.to_path_buf(),
            data,
            face_index: request.face_index,
            num_glyphs: u32::from(num_glyphs),
            size,
            hinting,
        }))
    }
}

struct SkrifaFace {
    font: PathBuf,
    data: Vec<u8>,
    face_index: u32,
    num_glyphs: u32,
    size: Size,
    hinting: Option<HintingInstance>,
}

impl GlyphFace for SkrifaFace {
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
        let font_ref =
            FontRef::from_index(&self.data, self.face_index).map_err(|err| RenderError::Load {
                glyph_id,
                reason: format!("{}: {err}", self.font.display()),
            })?;
        let outlines = font_ref.outline_glyphs();
        let Some(outline) = outlines.get(GlyphId::new(glyph_id)) else {
            // No outline data for this id, e.g. a bitmap-only glyph.
            return Ok(Bitmap::empty());
        };

        let mut pen = PathPen::default();
        let drawn = match &self.hinting {
            Some(hinting) => outline.draw(hinting, &mut pen),
            None => outline.draw(self.size, &mut pen),
        };
        drawn.map_err(|err| RenderError::Load {
            glyph_id,
            reason: err.to_string(),
        })?;
        rasterize(&pen.path).map_err(|reason| RenderError::Rasterize { glyph_id, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ];

    fn system_font() -> Option<PathBuf> {
        SYSTEM_FONTS.iter().map(PathBuf::from).find(|p| p.is_file())
    }

    #[test]
    fn variant_names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(Variant::from_name(variant.name()), Some(variant));
        }
        assert_eq!(Variant::from_name("freetype"), None, "unknown name");
        let backend = SkrifaBackend::new(Variant::Hinted);
        assert_eq!(backend.label(), "builtin:skrifa-hinted");
    }

    #[test]
    fn missing_font_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SkrifaBackend::new(Variant::Unhinted);
        let err = backend
            .open_face(&dir.path().join("absent.ttf"), FaceRequest::new(12))
            .err()
            .expect("no such file");
        assert!(matches!(err, FaceError::Read { .. }), "unexpected {err:?}");
    }

    #[test]
    fn garbage_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("garbage.ttf");
        fs::write(&font, b"definitely not sfnt data").unwrap();
        let backend = SkrifaBackend::new(Variant::Unhinted);
        let err = backend
            .open_face(&font, FaceRequest::new(12))
            .err()
            .expect("not a font");
        assert!(matches!(err, FaceError::Open { .. }), "unexpected {err:?}");
    }

    #[test]
    fn system_font_renders_when_available() {
        let Some(font) = system_font() else {
            eprintln!("no system font found; skipping");
            return;
        };
        for variant in Variant::ALL {
            let backend = SkrifaBackend::new(variant);
            let mut face = backend.open_face(&font, FaceRequest::new(24)).unwrap();
            let num_glyphs = face.num_glyphs();
            assert!(num_glyphs > 1, "font has glyphs");
            let inked = (1..num_glyphs.min(64))
                .filter_map(|id| face.render_glyph(id).ok())
                .filter(|bitmap| !bitmap.is_empty())
                .count();
            assert!(inked > 0, "{variant:?}: some glyph has ink");
            let err = face.render_glyph(num_glyphs).unwrap_err();
            assert!(
                matches!(err, RenderError::OutOfRange { .. }),
                "unexpected {err:?}"
            );
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let Some(font) = system_font() else {
            eprintln!("no system font found; skipping");
            return;
        };
        let backend = SkrifaBackend::new(Variant::Unhinted);
        let render_all = || {
            let mut face = backend.open_face(&font, FaceRequest::new(16)).unwrap();
            (0..face.num_glyphs().min(32))
                .map(|id| face.render_glyph(id))
                .collect::<Vec<_>>()
        };
        assert_eq!(render_all(), render_all(), "same font, same bitmaps");
    }
}
