// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # NodeCAD Modeler
//!
//! Geometry model store for a node-based CAD editor.
//!
//! Every time a node recomputes, it hands its output meshes to a [`Model`].
//! Shapes produced by arrays and repeated operations are usually identical
//! up to placement, so the model splits each [`Mesh`] into geometry,
//! materials and transformation, and stores geometry and materials in
//! reference-counted [`SharedPool`]s keyed by a content [`Checksum`]. 500
//! copies of a box cost one box of storage plus 500 small [`MeshRef`]s.
//!
//! The store never computes geometry itself. It manages identity and sharing
//! of already-computed meshes, and answers aggregate queries over them.

pub mod bounds;
pub mod changes;
pub mod checksum;
pub mod config;
pub mod error;
pub mod generators;
pub mod keys;
pub mod mesh;
pub mod model;
pub mod pool;
pub mod user_data;

pub use bounds::{BoundingBox, BoundingSphere};
pub use changes::ModelChanges;
pub use checksum::{Checksum, ChecksumValue, Checksumable};
pub use config::{DedupPolicy, ModelConfig};
pub use error::{Error, Result};
pub use keys::{MeshGeometryId, MeshId, MeshMaterialsId, ModelKey};
pub use mesh::{Color, Material, Mesh, MeshGeometry, MeshMaterials, MeshTriangle, DEFAULT_MATERIAL};
pub use model::{MeshRef, Model, ModelInfo};
pub use pool::SharedPool;
pub use user_data::{UserData, UserValue};
