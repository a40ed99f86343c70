// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scene-level model: placed mesh instances over shared payloads.
//!
//! The [`Model`] owns two [`SharedPool`]s, one for geometries and one for
//! material lists, plus a map from [`MeshId`] to [`MeshRef`]. Each `MeshRef`
//! holds exactly one reference into each pool, so for every pool entry the
//! number of `MeshRef`s pointing at it equals its reference count.
//!
//! ## Statistics vs. bounds
//!
//! [`Model::info`] reports storage cost: vertex and triangle counts are
//! summed over the deduplicated geometries, so 500 instances of one box count
//! as a single box. Bounding queries are the opposite: they visit every
//! instance, because instances sharing a geometry can sit anywhere in space.

use nalgebra::{Matrix4, Point3};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::config::{DedupPolicy, ModelConfig};
use crate::error::{Error, Result};
use crate::keys::{MeshGeometryId, MeshId, MeshMaterialsId};
use crate::mesh::{Mesh, MeshGeometry, MeshMaterials};
use crate::pool::SharedPool;
use crate::user_data::{UserData, UserValue};

/// One placed instance of a shared geometry with shared materials.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRef {
    geometry_id: MeshGeometryId,
    materials_id: MeshMaterialsId,
    transformation: Matrix4<f64>,
    user_data: UserData,
}

impl MeshRef {
    fn new(
        geometry_id: MeshGeometryId,
        materials_id: MeshMaterialsId,
        transformation: Matrix4<f64>,
    ) -> Self {
        Self {
            geometry_id,
            materials_id,
            transformation,
            user_data: UserData::default(),
        }
    }

    pub fn geometry_id(&self) -> MeshGeometryId {
        self.geometry_id
    }

    pub fn materials_id(&self) -> MeshMaterialsId {
        self.materials_id
    }

    pub fn transformation(&self) -> &Matrix4<f64> {
        &self.transformation
    }

    pub fn user_data(&self, key: &str) -> Option<&UserValue> {
        self.user_data.get(key)
    }

    pub fn user_data_entries(&self) -> &UserData {
        &self.user_data
    }
}

/// Model statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub geometry_count: usize,
    pub materials_count: usize,
    pub mesh_count: usize,
    /// Summed over deduplicated geometries.
    pub vertex_count: usize,
    /// Summed over deduplicated geometries.
    pub triangle_count: usize,
}

/// Deduplicating store of every mesh instance in the scene.
///
/// # Example
///
/// ```
/// use nodecad_modeler::{generators, Model, DEFAULT_MATERIAL};
/// use nalgebra::Matrix4;
///
/// let mut model = Model::new();
/// let a = model.add_mesh(generators::cuboid(1.0, 1.0, 1.0, DEFAULT_MATERIAL, Matrix4::identity()));
/// let b = model.add_mesh(generators::cuboid(1.0, 1.0, 1.0, DEFAULT_MATERIAL, Matrix4::identity()));
///
/// let info = model.info();
/// assert_eq!(info.mesh_count, 2);
/// assert_eq!(info.geometry_count, 1);
///
/// model.remove_mesh(a).unwrap();
/// model.remove_mesh(b).unwrap();
/// assert!(model.is_empty());
/// ```
#[derive(Debug)]
pub struct Model {
    geometries: SharedPool<MeshGeometryId, MeshGeometry>,
    materials: SharedPool<MeshMaterialsId, MeshMaterials>,
    meshes: FxHashMap<MeshId, MeshRef>,
    next_mesh_id: u64,
    config: ModelConfig,
}

impl Model {
    /// Creates an empty model with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    /// Creates an empty model with the given configuration.
    pub fn with_config(config: ModelConfig) -> Self {
        if config.dedup_policy == DedupPolicy::TrustChecksum {
            tracing::warn!("Checksum-only deduplication enabled; colliding payloads will be merged");
        }
        Self {
            geometries: SharedPool::with_policy(config.dedup_policy, config.geometry_capacity),
            materials: SharedPool::with_policy(config.dedup_policy, config.materials_capacity),
            meshes: FxHashMap::with_capacity_and_hasher(config.mesh_capacity, Default::default()),
            next_mesh_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Adds a mesh instance, sharing any geometry or materials already stored.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let (geometry, materials, transformation) = mesh.into_parts();
        let geometry_id = self.geometries.intern(geometry);
        let materials_id = self.materials.intern(materials);

        let id = MeshId(self.next_mesh_id);
        self.next_mesh_id += 1;
        self.meshes
            .insert(id, MeshRef::new(geometry_id, materials_id, transformation));

        tracing::debug!(
            mesh = %id,
            geometry = ?geometry_id,
            materials = ?materials_id,
            "Added mesh"
        );
        id
    }

    /// Removes a mesh instance, evicting payloads no other instance uses.
    ///
    /// Fails with [`Error::NotFound`] for an unknown id and leaves the model
    /// untouched.
    pub fn remove_mesh(&mut self, id: MeshId) -> Result<()> {
        let mesh_ref = self.meshes.get(&id).ok_or(Error::NotFound(id.into()))?;
        let (geometry_id, materials_id) = (mesh_ref.geometry_id, mesh_ref.materials_id);

        // Both releases must succeed once started.
        if !self.geometries.contains(geometry_id) || !self.materials.contains(materials_id) {
            tracing::error!(mesh = %id, "Mesh references an evicted payload");
            debug_assert!(false, "mesh references an evicted payload");
            return Err(Error::InvariantViolation(format!(
                "{id} references an evicted payload"
            )));
        }

        self.geometries.release(geometry_id)?;
        self.materials.release(materials_id)?;
        self.meshes.remove(&id);

        tracing::debug!(mesh = %id, "Removed mesh");
        Ok(())
    }

    /// Removes every mesh. Both pools end up empty; mesh ids keep counting
    /// from where they were.
    pub fn clear(&mut self) {
        let mesh_count = self.meshes.len();
        for (id, mesh_ref) in self.meshes.drain() {
            let released = self
                .geometries
                .release(mesh_ref.geometry_id)
                .and_then(|()| self.materials.release(mesh_ref.materials_id));
            if let Err(err) = released {
                tracing::error!(mesh = %id, error = %err, "Failed to release mesh payloads");
            }
        }

        if !self.geometries.is_empty() || !self.materials.is_empty() {
            tracing::error!(
                geometries = self.geometries.len(),
                materials = self.materials.len(),
                "Orphaned payloads after clearing model"
            );
            debug_assert!(false, "orphaned payloads after clearing model");
            self.geometries.clear();
            self.materials.clear();
        }

        tracing::debug!(mesh_count, "Cleared model");
    }

    /// Sets a user data entry on a mesh. The last write per key wins.
    pub fn set_mesh_user_data(
        &mut self,
        id: MeshId,
        key: impl Into<String>,
        value: impl Into<UserValue>,
    ) -> Result<()> {
        let mesh_ref = self
            .meshes
            .get_mut(&id)
            .ok_or(Error::NotFound(id.into()))?;
        mesh_ref.user_data.insert(key.into(), value.into());
        Ok(())
    }

    /// Returns a user data entry of a mesh.
    pub fn mesh_user_data(&self, id: MeshId, key: &str) -> Result<&UserValue> {
        self.mesh(id)?
            .user_data(key)
            .ok_or_else(|| Error::UserDataNotFound {
                mesh: id,
                key: key.to_string(),
            })
    }

    // --- Lookup ---

    pub fn mesh(&self, id: MeshId) -> Result<&MeshRef> {
        self.meshes.get(&id).ok_or(Error::NotFound(id.into()))
    }

    pub fn mesh_geometry(&self, mesh_ref: &MeshRef) -> Result<&MeshGeometry> {
        self.geometries.get(mesh_ref.geometry_id)
    }

    pub fn mesh_materials(&self, mesh_ref: &MeshRef) -> Result<&MeshMaterials> {
        self.materials.get(mesh_ref.materials_id)
    }

    pub fn contains_mesh(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Number of meshes sharing a geometry, or `None` if it is not stored.
    pub fn geometry_ref_count(&self, id: MeshGeometryId) -> Option<usize> {
        self.geometries.ref_count(id)
    }

    /// Number of meshes sharing a material list, or `None` if it is not stored.
    pub fn materials_ref_count(&self, id: MeshMaterialsId) -> Option<usize> {
        self.materials.ref_count(id)
    }

    // --- Enumeration ---

    /// Iterates over all mesh instances. The order is unspecified.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &MeshRef)> + '_ {
        self.meshes.iter().map(|(&id, mesh_ref)| (id, mesh_ref))
    }

    /// Callback form of [`Model::meshes`].
    pub fn enumerate_meshes(&self, mut processor: impl FnMut(MeshId, &MeshRef)) {
        for (id, mesh_ref) in self.meshes() {
            processor(id, mesh_ref);
        }
    }

    /// Iterates over the deduplicated geometries.
    pub fn geometries(&self) -> impl Iterator<Item = (MeshGeometryId, &MeshGeometry)> + '_ {
        self.geometries.iter()
    }

    /// Iterates over the deduplicated material lists.
    pub fn materials(&self) -> impl Iterator<Item = (MeshMaterialsId, &MeshMaterials)> + '_ {
        self.materials.iter()
    }

    /// Visits every vertex of every instance, in world space.
    pub fn enumerate_transformed_vertices(&self, mut processor: impl FnMut(Point3<f64>)) {
        for (id, mesh_ref) in self.meshes() {
            let geometry = match self.mesh_geometry(mesh_ref) {
                Ok(geometry) => geometry,
                Err(err) => {
                    tracing::error!(mesh = %id, error = %err, "Mesh geometry missing");
                    debug_assert!(false, "mesh references an evicted geometry");
                    continue;
                }
            };
            for vertex in geometry.vertices() {
                processor(mesh_ref.transformation.transform_point(vertex));
            }
        }
    }

    // --- Aggregate queries ---

    pub fn info(&self) -> ModelInfo {
        let (vertex_count, triangle_count) = self
            .geometries
            .iter()
            .fold((0, 0), |(vertices, triangles), (_, geometry)| {
                (
                    vertices + geometry.vertex_count(),
                    triangles + geometry.triangle_count(),
                )
            });

        ModelInfo {
            geometry_count: self.geometries.len(),
            materials_count: self.materials.len(),
            mesh_count: self.meshes.len(),
            vertex_count,
            triangle_count,
        }
    }

    /// Axis-aligned box around all instances in world space. Invalid (empty)
    /// when the model has no finite vertices.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        self.enumerate_transformed_vertices(|vertex| bounds.expand(&vertex));
        bounds
    }

    /// Sphere centered on the bounding box midpoint, reaching the farthest
    /// finite instance vertex. Invalid (empty) when the model has none.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        let bounds = self.bounding_box();
        if !bounds.is_valid() {
            return BoundingSphere::new();
        }

        let center = bounds.center();
        let mut radius = 0.0f64;
        self.enumerate_transformed_vertices(|vertex| {
            if vertex.iter().all(|c| c.is_finite()) {
                radius = radius.max(nalgebra::distance(&center, &vertex));
            }
        });
        BoundingSphere::with_radius(center, radius)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
