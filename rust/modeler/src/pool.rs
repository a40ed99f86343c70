// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference-counted, content-addressed payload pool.
//!
//! Interning a payload either bumps the reference count of an equal entry
//! already in the pool or stores a new one. Releasing an id drops one
//! reference and evicts the entry when the count reaches zero.
//!
//! Entries live in a generational [`SlotMap`], so a released id is rejected
//! with [`Error::NotFound`] even after its slot has been reused. A side index
//! groups entry ids by [`Checksum`]; the full equality check only runs against
//! the (almost always single-entry) bucket of a matching checksum.

use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use smallvec::SmallVec;

use crate::checksum::{Checksum, Checksumable};
use crate::config::DedupPolicy;
use crate::error::{Error, Result};
use crate::keys::ModelKey;

#[derive(Debug, Clone)]
struct PoolEntry<T> {
    value: T,
    checksum: Checksum,
    ref_count: usize,
}

type Bucket<K> = SmallVec<[K; 2]>;

/// A deduplicating store of `T` payloads addressed by `K` ids.
#[derive(Debug, Clone)]
pub struct SharedPool<K: Key, T> {
    entries: SlotMap<K, PoolEntry<T>>,
    by_checksum: FxHashMap<Checksum, Bucket<K>>,
    policy: DedupPolicy,
}

impl<K, T> SharedPool<K, T>
where
    K: Key + Into<ModelKey>,
    T: Checksumable + Eq,
{
    /// Creates an empty pool using [`DedupPolicy::Verify`].
    pub fn new() -> Self {
        Self::with_policy(DedupPolicy::Verify, 0)
    }

    /// Creates an empty pool with the given match policy and capacity.
    pub fn with_policy(policy: DedupPolicy, capacity: usize) -> Self {
        Self {
            entries: SlotMap::with_capacity_and_key(capacity),
            by_checksum: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            policy,
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Stores `value`, or takes another reference to an equal stored payload.
    pub fn intern(&mut self, value: T) -> K {
        let checksum = value.checksum();

        if let Some(bucket) = self.by_checksum.get(&checksum) {
            let found = match self.policy {
                DedupPolicy::Verify => bucket.iter().copied().find(|&id| {
                    self.entries
                        .get(id)
                        .map_or(false, |entry| entry.value == value)
                }),
                DedupPolicy::TrustChecksum => bucket.first().copied(),
            };
            if let Some(id) = found {
                if let Some(entry) = self.entries.get_mut(id) {
                    entry.ref_count += 1;
                    tracing::trace!(
                        id = ?id,
                        checksum = checksum.value(),
                        ref_count = entry.ref_count,
                        "Reused pooled payload"
                    );
                    return id;
                }
            }
        }

        let id = self.entries.insert(PoolEntry {
            value,
            checksum,
            ref_count: 1,
        });
        self.by_checksum.entry(checksum).or_default().push(id);
        tracing::trace!(id = ?id, checksum = checksum.value(), "Pooled new payload");
        id
    }

    /// Drops one reference to `id`, evicting the entry at zero.
    pub fn release(&mut self, id: K) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.into()))?;

        let Some(remaining) = entry.ref_count.checked_sub(1) else {
            tracing::error!(id = ?id, "Pooled payload with zero reference count");
            debug_assert!(false, "pooled payload with zero reference count");
            let key: ModelKey = id.into();
            return Err(Error::InvariantViolation(format!(
                "{key:?} held a zero reference count"
            )));
        };
        entry.ref_count = remaining;
        if remaining > 0 {
            return Ok(());
        }

        let checksum = entry.checksum;
        self.entries.remove(id);
        self.unindex(checksum, id);
        tracing::debug!(id = ?id, checksum = checksum.value(), "Evicted pooled payload");
        Ok(())
    }

    fn unindex(&mut self, checksum: Checksum, id: K) {
        let Some(bucket) = self.by_checksum.get_mut(&checksum) else {
            tracing::error!(id = ?id, checksum = checksum.value(), "Evicted payload missing from checksum index");
            debug_assert!(false, "evicted payload missing from checksum index");
            return;
        };
        bucket.retain(|k| *k != id);
        if bucket.is_empty() {
            self.by_checksum.remove(&checksum);
        }
    }

    /// Returns the payload stored under `id`.
    pub fn get(&self, id: K) -> Result<&T> {
        self.entries
            .get(id)
            .map(|entry| &entry.value)
            .ok_or_else(|| Error::NotFound(id.into()))
    }

    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of outstanding references to `id`, or `None` if it is not live.
    pub fn ref_count(&self, id: K) -> Option<usize> {
        self.entries.get(id).map(|entry| entry.ref_count)
    }

    /// Number of live, deduplicated entries (not the sum of references).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over live entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.entries.iter().map(|(id, entry)| (id, &entry.value))
    }

    /// Drops every entry regardless of outstanding references.
    ///
    /// Ids handed out earlier stay stale forever afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_checksum.clear();
    }
}

impl<K, T> Default for SharedPool<K, T>
where
    K: Key + Into<ModelKey>,
    T: Checksumable + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}
