// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One pass over every glyph of a face.

use core::fmt;

use log::{debug, warn};

use crate::artifacts::ArtifactStore;
use crate::backend::{Bitmap, GlyphFace};
use crate::fingerprint::fingerprint;
use crate::table::{GlyphRecord, GlyphTable};

/// Which of the two builds a value belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The baseline build.
    Base,
    /// The build under test.
    Test,
}

impl Side {
    /// Tag used in artifact names and logs.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Test => "test",
        }
    }
}

/// What a pass does with each glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SweepMode {
    /// Record `base_fingerprint`.
    HashBase,
    /// Record `test_fingerprint`.
    HashTest,
    /// For divergent, non-empty glyphs: write the base image and `base_score`.
    CaptureBase,
    /// For divergent, non-empty glyphs: write the test image and `test_score`.
    /// Every divergent glyph then has its `difference` settled.
    CaptureTest,
}

impl SweepMode {
    /// The order the passes must run in.
    pub const ORDER: [Self; 4] = [
        Self::HashBase,
        Self::HashTest,
        Self::CaptureBase,
        Self::CaptureTest,
    ];

    /// The side whose fields this pass writes.
    pub const fn side(self) -> Side {
        match self {
            Self::HashBase | Self::CaptureBase => Side::Base,
            Self::HashTest | Self::CaptureTest => Side::Test,
        }
    }

    /// True for the two capture passes.
    pub const fn is_capture(self) -> bool {
        matches!(self, Self::CaptureBase | Self::CaptureTest)
    }

    /// Name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::HashBase => "hash-base",
            Self::HashTest => "hash-test",
            Self::CaptureBase => "capture-base",
            Self::CaptureTest => "capture-test",
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters for one pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Glyph ids the pass walked over.
    pub visited: u32,
    /// Glyphs the backend rendered successfully.
    pub rendered: u32,
    /// Capture-pass glyphs skipped before rendering because their fingerprints match.
    pub skipped_matching: u32,
    /// Capture-pass glyphs with nothing to capture (0 width or height).
    pub skipped_empty: u32,
    /// Glyphs that failed to render or whose image could not be written.
    pub failed: u32,
    /// Images written.
    pub captured: u32,
    /// Divergent glyphs past the end of the face, settled as zero ink.
    pub absent: u32,
}

/// Run one pass of `mode` over every glyph of `face`.
///
/// Glyph ids past the end of `table` grow it. Capture passes check the
/// fingerprints first and do not render glyphs that already match. A glyph that
/// fails to render is logged and skipped; it never ends the pass.
///
/// Capture-test settles the difference of every divergent glyph in the table,
/// including those past the end of `face`. A test side with nothing captured
/// (an empty bitmap, a failed render, or no such glyph) is zero ink.
pub fn sweep(
    face: &mut dyn GlyphFace,
    mode: SweepMode,
    table: &mut GlyphTable,
    artifacts: &ArtifactStore,
) -> PassStats {
    let mut stats = PassStats::default();
    let num_glyphs = face.num_glyphs();
    for glyph_id in 0..num_glyphs {
        stats.visited += 1;
        let record = table.record_mut(glyph_id);

        if mode.is_capture() && record.fingerprints_match() {
            stats.skipped_matching += 1;
            continue;
        }

        let bitmap = match face.render_glyph(glyph_id) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                warn!("{mode}: {err}");
                stats.failed += 1;
                if mode == SweepMode::CaptureTest {
                    settle(record);
                }
                continue;
            }
        };
        stats.rendered += 1;

        match mode {
            SweepMode::HashBase => record.base_fingerprint = Some(fingerprint(&bitmap)),
            SweepMode::HashTest => record.test_fingerprint = Some(fingerprint(&bitmap)),
            SweepMode::CaptureBase | SweepMode::CaptureTest => {
                capture(record, mode.side(), &bitmap, artifacts, &mut stats);
            }
        }
    }

    if mode == SweepMode::CaptureTest {
        settle_absent(table, num_glyphs, &mut stats);
    }
    stats
}

/// Settle divergent glyphs at or past `first`, which the test face does not have.
fn settle_absent(table: &mut GlyphTable, first: u32, stats: &mut PassStats) {
    let end = u32::try_from(table.len()).unwrap_or(u32::MAX);
    for glyph_id in first..end {
        let record = table.record_mut(glyph_id);
        if record.fingerprints_match() {
            continue;
        }
        stats.absent += 1;
        settle(record);
    }
}

/// Set `difference` from the captured scores; a missing score is zero ink.
fn settle(record: &mut GlyphRecord) {
    let base = record.base_score.unwrap_or(0.0);
    let test = record.test_score.unwrap_or(0.0);
    record.difference = (base - test).abs();
    debug!(
        "glyph {}: difference {:.2}",
        record.glyph_id, record.difference
    );
}

fn capture(
    record: &mut GlyphRecord,
    side: Side,
    bitmap: &Bitmap,
    artifacts: &ArtifactStore,
    stats: &mut PassStats,
) {
    let glyph_id = record.glyph_id;
    let captured = if bitmap.is_empty() {
        debug!("glyph {glyph_id}: empty {} bitmap", side.tag());
        stats.skipped_empty += 1;
        None
    } else {
        match artifacts.write_glyph(side, glyph_id, bitmap) {
            Ok(path) => {
                stats.captured += 1;
                Some((path, bitmap.ink_mass()))
            }
            Err(err) => {
                warn!("glyph {glyph_id}: {err}");
                stats.failed += 1;
                None
            }
        }
    };

    let (image, score) = captured.unzip();
    match side {
        Side::Base => {
            record.base_image = image;
            record.base_score = score;
        }
        Side::Test => {
            record.test_image = image;
            record.test_score = score;
            settle(record);
        }
    }
}
