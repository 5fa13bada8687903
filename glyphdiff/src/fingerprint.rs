// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bitmap fingerprints for exact-equality divergence testing.

use core::fmt;

use xxhash_rust::xxh3::Xxh3;

use crate::backend::Bitmap;

/// 128-bit digest of a rendered bitmap.
///
/// Formats as 32 lowercase hex digits: four 8-digit groups, most significant first.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u32; 4]);

impl Fingerprint {
    /// Split a 128-bit digest into its four 32-bit groups.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "each shift isolates exactly 32 bits"
    )]
    pub const fn from_digest(digest: u128) -> Self {
        Self([
            (digest >> 96) as u32,
            (digest >> 64) as u32,
            (digest >> 32) as u32,
            digest as u32,
        ])
    }

    /// The four groups, most significant first.
    pub const fn words(self) -> [u32; 4] {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a:08x}{b:08x}{c:08x}{d:08x}")
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Fingerprint a bitmap.
///
/// XXH3-128 over the width and height (little-endian `u32`) followed by the
/// coverage bytes. The dimensions are part of the input so that, for example, a
/// 2×3 and a 3×2 bitmap of identical bytes do not collide.
pub fn fingerprint(bitmap: &Bitmap) -> Fingerprint {
    let mut hasher = Xxh3::new();
    hasher.update(&bitmap.width().to_le_bytes());
    hasher.update(&bitmap.height().to_le_bytes());
    hasher.update(bitmap.pixels());
    Fingerprint::from_digest(hasher.digest128())
}
