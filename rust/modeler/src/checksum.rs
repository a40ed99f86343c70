// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Content checksum used as the deduplication key.
//!
//! A rolling 32-bit BSD checksum: every folded word first rotates the
//! accumulator right by one bit, then adds the word with wrap-around. It is
//! order-sensitive but far from collision-free, so a matching checksum only
//! nominates candidates for a full equality check.
//!
//! Floats fold their raw bit pattern. `+0.0` and `-0.0` produce different
//! checksums, and so do NaNs with different payloads.

use std::hash::{Hash, Hasher};

/// Order-sensitive 32-bit content digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Checksum {
    value: u32,
}

impl Checksum {
    /// Creates a zero checksum.
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Resets the accumulator to zero.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Folds a value into the checksum.
    ///
    /// ```
    /// use nodecad_modeler::Checksum;
    ///
    /// let mut a = Checksum::new();
    /// a.add(1i32);
    /// a.add(2i32);
    ///
    /// let mut b = Checksum::new();
    /// b.add(2i32);
    /// b.add(1i32);
    ///
    /// assert_ne!(a, b);
    /// ```
    #[inline]
    pub fn add<V: ChecksumValue>(&mut self, value: V) {
        value.fold_into(self);
    }

    /// Returns the raw digest.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Returns a hash derived from the digest alone.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    #[inline]
    fn fold_word(&mut self, word: u32) {
        self.value = self.value.rotate_right(1).wrapping_add(word);
    }

    #[inline]
    fn fold_wide(&mut self, wide: u64) {
        self.fold_word(wide as u32);
        self.fold_word((wide >> 32) as u32);
    }
}

/// A scalar that can be folded into a [`Checksum`].
pub trait ChecksumValue {
    fn fold_into(self, checksum: &mut Checksum);
}

impl ChecksumValue for i32 {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_word(self as u32);
    }
}

impl ChecksumValue for u32 {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_word(self);
    }
}

impl ChecksumValue for i64 {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_wide(self as u64);
    }
}

impl ChecksumValue for u64 {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_wide(self);
    }
}

impl ChecksumValue for usize {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_wide(self as u64);
    }
}

impl ChecksumValue for f32 {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_word(self.to_bits());
    }
}

impl ChecksumValue for f64 {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_wide(self.to_bits());
    }
}

impl ChecksumValue for Checksum {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_word(self.value);
    }
}

impl ChecksumValue for &Checksum {
    #[inline]
    fn fold_into(self, checksum: &mut Checksum) {
        checksum.fold_word(self.value);
    }
}

/// Payloads that can be stored in a [`crate::SharedPool`].
///
/// Two payloads that compare equal must produce equal checksums.
pub trait Checksumable {
    fn checksum(&self) -> Checksum;
}
