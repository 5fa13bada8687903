// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph-id-indexed record table shared by all sweep passes.

use std::path::PathBuf;

use crate::fingerprint::Fingerprint;

/// Largest length a table can reach; every index must fit a `u32` glyph id.
const MAX_LEN: usize = (u32::MAX as usize).saturating_add(1);

/// Everything the four passes learn about one glyph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphRecord {
    /// Glyph id this record describes.
    pub glyph_id: u32,
    /// Base image, relative to the report, once captured.
    pub base_image: Option<PathBuf>,
    /// Test image, relative to the report, once captured.
    pub test_image: Option<PathBuf>,
    /// Fingerprint under the base backend, once hashed.
    pub base_fingerprint: Option<Fingerprint>,
    /// Fingerprint under the test backend, once hashed.
    pub test_fingerprint: Option<Fingerprint>,
    /// Base ink mass, once captured.
    pub base_score: Option<f64>,
    /// Test ink mass, once captured.
    pub test_score: Option<f64>,
    /// Non-negative difference score; only final after capture-test.
    pub difference: f64,
}

impl GlyphRecord {
    /// A blank record for `glyph_id`.
    pub fn new(glyph_id: u32) -> Self {
        Self {
            glyph_id,
            ..Self::default()
        }
    }

    /// True if both sides hashed to the same fingerprint, or neither was hashed.
    pub fn fingerprints_match(&self) -> bool {
        self.base_fingerprint == self.test_fingerprint
    }
}

/// Growable table of [`GlyphRecord`]s where the index is the glyph id.
///
/// Starts with one record. Addressing an index at or past the end doubles the
/// length until the index fits; records are never dropped, so whatever earlier
/// passes wrote survives every resize.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphTable {
    records: Vec<GlyphRecord>,
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphTable {
    /// A table holding a single blank record for glyph 0.
    pub fn new() -> Self {
        Self {
            records: vec![GlyphRecord::new(0)],
        }
    }

    /// Grow to at least `len` records in one step.
    ///
    /// Used when the glyph counts of both faces are known before the first pass.
    pub fn presize(&mut self, len: usize) {
        if len > self.records.len() {
            self.extend_to(len);
        }
    }

    /// Number of records, including blank ones past the last real glyph.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: a table holds at least one record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for `glyph_id`, if the table already reaches it.
    pub fn get(&self, glyph_id: u32) -> Option<&GlyphRecord> {
        self.records.get(glyph_id as usize)
    }

    /// Record for `glyph_id`, doubling the table until it fits.
    pub fn record_mut(&mut self, glyph_id: u32) -> &mut GlyphRecord {
        let index = glyph_id as usize;
        while index >= self.records.len() {
            let doubled = self.records.len().saturating_mul(2).max(1);
            self.extend_to(doubled);
        }
        &mut self.records[index]
    }

    /// All records in glyph id order.
    pub fn records(&self) -> &[GlyphRecord] {
        &self.records
    }

    /// Iterate records in glyph id order.
    pub fn iter(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.records.iter()
    }

    /// Number of records whose fingerprints differ.
    pub fn divergent_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| !record.fingerprints_match())
            .count()
    }

    pub(crate) fn into_records(self) -> Vec<GlyphRecord> {
        self.records
    }

    fn extend_to(&mut self, len: usize) {
        let len = len.min(MAX_LEN);
        let start = self.records.len();
        self.records.reserve(len.saturating_sub(start));
        for index in start..len {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "len is capped at MAX_LEN, so every index fits a u32"
            )]
            self.records.push(GlyphRecord::new(index as u32));
        }
    }
}
