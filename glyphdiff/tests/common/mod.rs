// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted in-memory backends for integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glyphdiff::{Bitmap, FaceError, FaceRequest, GlyphFace, RasterizationBackend, RenderError};

/// What a scripted glyph renders as.
#[derive(Clone, Debug)]
pub(crate) enum Glyph {
    /// Nothing to draw (whitespace).
    Blank,
    /// A `width` × `height` block with every pixel at `coverage`.
    Block { width: u32, height: u32, coverage: u8 },
    /// The backend reports a render error.
    Broken,
}

impl Glyph {
    pub(crate) const fn solid(width: u32, height: u32) -> Self {
        Self::Block {
            width,
            height,
            coverage: u8::MAX,
        }
    }

    fn render(&self, glyph_id: u32) -> Result<Bitmap, RenderError> {
        match *self {
            Self::Blank => Ok(Bitmap::empty()),
            Self::Block {
                width,
                height,
                coverage,
            } => Ok(Bitmap::new(width, height, vec![coverage; (width * height) as usize])
                .expect("block size matches its buffer")),
            Self::Broken => Err(RenderError::Rasterize {
                glyph_id,
                reason: "scripted failure".into(),
            }),
        }
    }
}

/// Open/close/render bookkeeping shared between a backend and its faces.
#[derive(Clone, Debug, Default)]
pub(crate) struct Journal {
    pub(crate) opened: Rc<Cell<u32>>,
    pub(crate) closed: Rc<Cell<u32>>,
    pub(crate) rendered: Rc<RefCell<Vec<u32>>>,
}

impl Journal {
    pub(crate) fn opened(&self) -> u32 {
        self.opened.get()
    }

    pub(crate) fn closed(&self) -> u32 {
        self.closed.get()
    }

    pub(crate) fn rendered(&self) -> Vec<u32> {
        self.rendered.borrow().clone()
    }
}

/// Backend whose glyph `i` is `glyphs[i]`, whatever font it is given.
#[derive(Debug)]
pub(crate) struct ScriptedBackend {
    label: String,
    glyphs: Vec<Glyph>,
    refuse_open: bool,
    pub(crate) journal: Journal,
}

impl ScriptedBackend {
    pub(crate) fn new(label: &str, glyphs: Vec<Glyph>) -> Self {
        Self {
            label: label.to_owned(),
            glyphs,
            refuse_open: false,
            journal: Journal::default(),
        }
    }

    /// A backend that rejects every font.
    pub(crate) fn refusing(label: &str) -> Self {
        Self {
            refuse_open: true,
            ..Self::new(label, Vec::new())
        }
    }
}

impl RasterizationBackend for ScriptedBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn open_face(
        &self,
        font: &Path,
        _request: FaceRequest,
    ) -> Result<Box<dyn GlyphFace + '_>, FaceError> {
        if self.refuse_open {
            return Err(FaceError::Open {
                font: font.to_path_buf(),
                reason: format!("{} refuses every font", self.label),
            });
        }
        self.journal.opened.set(self.journal.opened.get() + 1);
        Ok(Box::new(ScriptedFace { backend: self }))
    }
}

struct ScriptedFace<'a> {
    backend: &'a ScriptedBackend,
}

impl GlyphFace for ScriptedFace<'_> {
    fn num_glyphs(&self) -> u32 {
        u32::try_from(self.backend.glyphs.len()).expect("scripted faces are small")
    }

    fn render_glyph(&mut self, glyph_id: u32) -> Result<Bitmap, RenderError> {
        self.backend.journal.rendered.borrow_mut().push(glyph_id);
        self.backend.glyphs[glyph_id as usize].render(glyph_id)
    }
}

impl Drop for ScriptedFace<'_> {
    fn drop(&mut self) {
        let closed = &self.backend.journal.closed;
        closed.set(closed.get() + 1);
    }
}

/// The font path handed to scripted backends; it is never read.
pub(crate) fn font_path() -> PathBuf {
    PathBuf::from("Synthetic-Regular.ttf")
}

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
