// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run orchestration: four passes, ranking, report.

use std::path::{Path, PathBuf};

use log::info;

use crate::artifacts::ArtifactStore;
use crate::backend::{DEFAULT_DPI, FaceRequest, GlyphFace, RasterizationBackend};
use crate::error::RunError;
use crate::rank::{Ranking, rank};
use crate::report::write_report;
use crate::sweep::{PassStats, SweepMode, sweep};
use crate::table::GlyphTable;

/// Which backend the capture-base pass renders with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CaptureSource {
    /// Capture base images with the base backend.
    #[default]
    BaseBackend,
    /// Capture base images with the test backend.
    ///
    /// Matches the historical harness, which rendered its "base" captures with the
    /// test build. Both images of a divergent glyph then come from the same build,
    /// so differences collapse to zero unless one side is empty.
    TestBackend,
}

/// Settings for one comparison run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Character size in points.
    pub char_size: u32,
    /// Rendering resolution in dots per inch.
    pub dpi: u32,
    /// Backend used by the capture-base pass.
    pub capture_base_with: CaptureSource,
    /// Directory the report is written to; image paths are relative to it.
    pub out_dir: PathBuf,
    /// Content directory for images, relative to `out_dir`.
    pub images_dir: PathBuf,
    /// File name of the report, relative to `out_dir`.
    pub report_name: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            char_size: 12,
            dpi: DEFAULT_DPI,
            capture_base_with: CaptureSource::default(),
            out_dir: PathBuf::from("."),
            images_dir: PathBuf::from("images"),
            report_name: PathBuf::from("index.html"),
        }
    }
}

impl RunConfig {
    /// Face parameters derived from this configuration.
    pub fn face_request(&self) -> FaceRequest {
        FaceRequest::new(self.char_size).with_dpi(self.dpi)
    }

    /// Full path of the report document.
    pub fn report_path(&self) -> PathBuf {
        self.out_dir.join(&self.report_name)
    }
}

/// Result of the four passes, before ranking.
#[derive(Clone, Debug)]
pub struct Comparison {
    /// The glyph table in glyph id order.
    pub table: GlyphTable,
    /// Glyph count reported by the base face.
    pub base_glyphs: u32,
    /// Glyph count reported by the test face.
    pub test_glyphs: u32,
    /// Per-pass counters, in [`SweepMode::ORDER`].
    pub passes: [(SweepMode, PassStats); 4],
}

/// Result of a full run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Ranked records.
    pub ranking: Ranking,
    /// Glyph count reported by the base face.
    pub base_glyphs: u32,
    /// Glyph count reported by the test face.
    pub test_glyphs: u32,
    /// Per-pass counters, in [`SweepMode::ORDER`].
    pub passes: [(SweepMode, PassStats); 4],
    /// Rows in the report.
    pub rows: usize,
    /// Where the report was written.
    pub report_path: PathBuf,
}

/// Run the four sweep passes over `font` under both backends.
///
/// Both faces are opened up front and the table is sized to the larger glyph
/// count, so a glyph id present in only one build is still addressed by every
/// pass; the build without it never fingerprints it, which makes it divergent.
/// Such a glyph scores its ink on the side that has it.
/// Faces are closed when this returns, on success or error.
pub fn compare(
    base: &dyn RasterizationBackend,
    test: &dyn RasterizationBackend,
    font: &Path,
    config: &RunConfig,
) -> Result<Comparison, RunError> {
    let request = config.face_request();
    let artifacts = ArtifactStore::create(&config.out_dir, &config.images_dir)?;
    let mut base_face = base.open_face(font, request)?;
    let mut test_face = test.open_face(font, request)?;

    let base_glyphs = base_face.num_glyphs();
    let test_glyphs = test_face.num_glyphs();
    if base_glyphs != test_glyphs {
        info!(
            "glyph counts differ: {} has {base_glyphs}, {} has {test_glyphs}",
            base.label(),
            test.label()
        );
    }

    let mut table = GlyphTable::new();
    table.presize(base_glyphs.max(test_glyphs) as usize);

    let mut passes = SweepMode::ORDER.map(|mode| (mode, PassStats::default()));
    for (mode, stats) in &mut passes {
        let face: &mut dyn GlyphFace = match (*mode, config.capture_base_with) {
            (SweepMode::HashBase, _) | (SweepMode::CaptureBase, CaptureSource::BaseBackend) => {
                &mut *base_face
            }
            _ => &mut *test_face,
        };
        *stats = sweep(face, *mode, &mut table, &artifacts);
        info!(
            "{mode}: {} visited, {} rendered, {} matching, {} empty, {} failed, {} captured, {} absent",
            stats.visited,
            stats.rendered,
            stats.skipped_matching,
            stats.skipped_empty,
            stats.failed,
            stats.captured,
            stats.absent
        );
    }

    Ok(Comparison {
        table,
        base_glyphs,
        test_glyphs,
        passes,
    })
}

/// Compare, rank, and write the report.
///
/// The report names the font by its path. Nothing is written to the report path
/// if any step before it fails.
pub fn run(
    base: &dyn RasterizationBackend,
    test: &dyn RasterizationBackend,
    font: &Path,
    config: &RunConfig,
) -> Result<RunSummary, RunError> {
    let comparison = compare(base, test, font, config)?;
    info!(
        "{} of {} glyph records diverge",
        comparison.table.divergent_count(),
        comparison.table.len()
    );
    let ranking = rank(comparison.table);
    let report_path = config.report_path();
    let rows = write_report(&report_path, &ranking, &font.display().to_string())?;
    info!("wrote {rows} row(s) to {}", report_path.display());
    Ok(RunSummary {
        ranking,
        base_glyphs: comparison.base_glyphs,
        test_glyphs: comparison.test_glyphs,
        passes: comparison.passes,
        rows,
        report_path,
    })
}
