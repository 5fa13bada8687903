// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyphdiff: differential regression testing for glyph rasterizers.
//!
//! Given a font, a character size, and two implementations of the same
//! rasterization capability set (a *base* build and a *test* build), this crate
//! renders every glyph with both, fingerprints each bitmap, and flags the glyphs
//! whose fingerprints differ. Flagged glyphs are written out as images under both
//! implementations and ranked by a difference score so that a reviewer can look
//! at the most suspicious glyphs first.
//!
//! It judges *divergence*, not correctness.
//!
//! ## Pipeline
//!
//! - [`RasterizationBackend`] / [`GlyphFace`]: the capability seam. Backends live in
//!   sibling crates (`glyphdiff_freetype`, `glyphdiff_skrifa`); tests use scripted ones.
//! - [`fingerprint`]: canonical 128-bit digest of a [`Bitmap`].
//! - [`GlyphTable`]: one [`GlyphRecord`] per glyph id, shared by all passes.
//! - [`sweep`]: one pass over a face in one [`SweepMode`]. [`compare`] runs the four
//!   passes in order: hash-base, hash-test, capture-base, capture-test.
//! - [`rank`]: orders records by descending difference, ties by ascending glyph id.
//! - [`emit`] / [`write_report`]: HTML document with one row per divergent glyph.
//!
//! [`run`] strings all of the above together.
//!
//! ## Difference score
//!
//! A captured glyph's score is its ink mass: the sum of its coverage values divided
//! by 255, i.e. the number of fully inked pixels it is equivalent to. The difference
//! of a divergent glyph is the absolute difference of the two ink masses, with a side
//! that has nothing to capture counting as zero ink. That covers an empty bitmap, a
//! failed render, and a glyph id the build does not have.

mod artifacts;
mod backend;
mod error;
mod fingerprint;
mod rank;
mod report;
mod run;
mod sweep;
mod table;

pub use artifacts::{ArtifactStore, encode_png};
pub use backend::{Bitmap, DEFAULT_DPI, FaceRequest, GlyphFace, RasterizationBackend};
pub use error::{ArtifactError, FaceError, LoadError, RenderError, ReportError, RunError};
pub use fingerprint::{Fingerprint, fingerprint};
pub use rank::{Ranking, rank, rank_records};
pub use report::{emit, write_report};
pub use run::{CaptureSource, Comparison, RunConfig, RunSummary, compare, run};
pub use sweep::{PassStats, Side, SweepMode, sweep};
pub use table::{GlyphRecord, GlyphTable};
