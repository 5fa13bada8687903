// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordering of records for review.

use core::cmp::Ordering;

use crate::table::{GlyphRecord, GlyphTable};

/// Records in review order: most different first.
///
/// Produced by [`rank`]. Position no longer equals glyph id; use
/// [`GlyphRecord::glyph_id`].
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    records: Vec<GlyphRecord>,
}

impl Ranking {
    /// Every record, ranked, including those with no difference.
    pub fn records(&self) -> &[GlyphRecord] {
        &self.records
    }

    /// Ranked records with a non-zero difference.
    ///
    /// Since ranking sorts by descending difference, these form a prefix.
    pub fn divergent(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.records.iter().filter(|record| record.difference > 0.0)
    }

    /// Number of ranked records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there is nothing ranked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rank a finished table.
///
/// Takes the table by value: once sorted, index and glyph id no longer agree.
pub fn rank(table: GlyphTable) -> Ranking {
    let mut records = table.into_records();
    rank_records(&mut records);
    Ranking { records }
}

/// Sort records by descending difference, ties by ascending glyph id.
///
/// The order is total over distinct glyph ids, so ranking is reproducible and
/// ranking an already ranked slice leaves it unchanged.
pub fn rank_records(records: &mut [GlyphRecord]) {
    records.sort_by(by_rank);
}

fn by_rank(a: &GlyphRecord, b: &GlyphRecord) -> Ordering {
    b.difference
        .total_cmp(&a.difference)
        .then_with(|| a.glyph_id.cmp(&b.glyph_id))
}
