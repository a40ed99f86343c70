// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Added/removed mesh bookkeeping between renderer synchronizations.
//!
//! The evaluation layer routes its edits through [`ModelChanges`]; the
//! renderer later calls [`ModelChanges::take`] and only uploads or drops the
//! meshes that actually changed. A mesh that is added and removed again
//! before the next sync never shows up at all.

use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::keys::MeshId;
use crate::mesh::Mesh;
use crate::model::Model;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelChanges {
    added: FxHashSet<MeshId>,
    removed: FxHashSet<MeshId>,
}

impl ModelChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mesh to `model` and records it.
    pub fn add_mesh(&mut self, model: &mut Model, mesh: Mesh) -> MeshId {
        let id = model.add_mesh(mesh);
        self.added.insert(id);
        id
    }

    /// Removes a mesh from `model` and records it. On failure nothing is
    /// recorded.
    pub fn remove_mesh(&mut self, model: &mut Model, id: MeshId) -> Result<()> {
        model.remove_mesh(id)?;
        self.record_removed(id);
        Ok(())
    }

    /// Clears `model`, recording every mesh it held.
    pub fn clear_model(&mut self, model: &mut Model) {
        let ids: Vec<MeshId> = model.meshes().map(|(id, _)| id).collect();
        model.clear();
        for id in ids {
            self.record_removed(id);
        }
    }

    fn record_removed(&mut self, id: MeshId) {
        if !self.added.remove(&id) {
            self.removed.insert(id);
        }
    }

    pub fn added(&self) -> &FxHashSet<MeshId> {
        &self.added
    }

    pub fn removed(&self) -> &FxHashSet<MeshId> {
        &self.removed
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Returns `(added, removed)` and starts a fresh change set.
    pub fn take(&mut self) -> (FxHashSet<MeshId>, FxHashSet<MeshId>) {
        tracing::trace!(
            added = self.added.len(),
            removed = self.removed.len(),
            "Synchronizing model changes"
        );
        (
            std::mem::take(&mut self.added),
            std::mem::take(&mut self.removed),
        )
    }
}
