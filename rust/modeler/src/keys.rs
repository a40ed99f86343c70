// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types for the model store.
//!
//! Pool ids are `slotmap` keys: a slot index plus a generation. Once an entry
//! is evicted its key goes stale, and a later entry that reuses the slot gets
//! a new generation, so an old id can never resolve to someone else's payload.
//! Mesh ids are plain counters that only ever grow.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for a deduplicated geometry payload.
    pub struct MeshGeometryId;

    /// Key for a deduplicated material list.
    pub struct MeshMaterialsId;
}

/// Identifier of a placed mesh instance in a [`crate::Model`].
///
/// Assigned in strictly increasing order and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MeshId(pub(crate) u64);

impl MeshId {
    /// Returns the raw numeric value of the id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// A key that can reference any entity held by the model store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Geometry(MeshGeometryId),
    Materials(MeshMaterialsId),
    Mesh(MeshId),
}

impl ModelKey {
    /// Returns a short name for the kind of entity the key refers to.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelKey::Geometry(_) => "geometry",
            ModelKey::Materials(_) => "materials",
            ModelKey::Mesh(_) => "mesh",
        }
    }
}

impl From<MeshGeometryId> for ModelKey {
    fn from(k: MeshGeometryId) -> Self {
        ModelKey::Geometry(k)
    }
}

impl From<MeshMaterialsId> for ModelKey {
    fn from(k: MeshMaterialsId) -> Self {
        ModelKey::Materials(k)
    }
}

impl From<MeshId> for ModelKey {
    fn from(k: MeshId) -> Self {
        ModelKey::Mesh(k)
    }
}
