// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use nalgebra::{Matrix4, Point3, Vector3};
use nodecad_modeler::generators::{cuboid, cylinder};
use nodecad_modeler::{
    Color, Error, Material, MeshGeometryId, MeshId, Model, ModelInfo, SharedPool, DEFAULT_MATERIAL,
};

fn unit_cube_at(transformation: Matrix4<f64>) -> nodecad_modeler::Mesh {
    cuboid(1.0, 1.0, 1.0, DEFAULT_MATERIAL, transformation)
}

fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

#[test]
fn identical_cubes_share_geometry() {
    let mut model = Model::new();
    model.add_mesh(unit_cube_at(Matrix4::identity()));
    model.add_mesh(unit_cube_at(Matrix4::identity()));

    let info = model.info();
    assert_eq!(info.mesh_count, 2);
    assert_eq!(info.geometry_count, 1);
    assert_eq!(info.materials_count, 1);
}

#[test]
fn shared_geometry_bounds_cover_every_placement() {
    let mut model = Model::new();
    let left = model.add_mesh(unit_cube_at(translation(-10.0, 0.0, 0.0)));
    let right = model.add_mesh(unit_cube_at(translation(10.0, 0.0, 0.0)));
    assert_eq!(
        model.mesh(left).unwrap().geometry_id(),
        model.mesh(right).unwrap().geometry_id()
    );

    let bounds = model.bounding_box();
    assert!(bounds.is_valid());
    assert_relative_eq!(bounds.min.x, -10.5);
    assert_relative_eq!(bounds.max.x, 10.5);
    assert_relative_eq!(bounds.min.y, -0.5);
    assert_relative_eq!(bounds.max.z, 0.5);
    assert_eq!(bounds.center(), Point3::origin());

    let sphere = model.bounding_sphere();
    assert_eq!(sphere.center, Point3::origin());
    let corner = Vector3::new(10.5, 0.5, 0.5).norm();
    assert_relative_eq!(sphere.radius, corner, epsilon = 1e-12);
}

#[test]
fn add_then_remove_leaves_nothing() {
    let mut model = Model::new();
    let id = model.add_mesh(unit_cube_at(Matrix4::identity()));
    let geometry_id = model.mesh(id).unwrap().geometry_id();

    model.remove_mesh(id).unwrap();

    assert_eq!(model.info(), ModelInfo::default());
    assert_eq!(model.geometries().count(), 0);
    assert_eq!(model.geometry_ref_count(geometry_id), None);
}

#[test]
fn removing_unknown_mesh_changes_nothing() {
    let mut model = Model::new();
    let id = model.add_mesh(unit_cube_at(Matrix4::identity()));
    let geometry_id = model.mesh(id).unwrap().geometry_id();
    let before = model.info();

    let bogus = {
        let mut other = Model::new();
        for _ in 0..5 {
            other.add_mesh(unit_cube_at(Matrix4::identity()));
        }
        let last = other.meshes().map(|(id, _)| id).max().unwrap();
        last
    };
    assert!(!model.contains_mesh(bogus));

    let err = model.remove_mesh(bogus).unwrap_err();
    assert_eq!(err, Error::NotFound(bogus.into()));
    assert!(err.is_not_found());

    assert_eq!(model.info(), before);
    assert_eq!(model.geometry_ref_count(geometry_id), Some(1));
    assert!(model.contains_mesh(id));
}

#[test]
fn empty_model_bounds_are_defined() {
    let model = Model::new();

    let bounds = model.bounding_box();
    assert!(!bounds.is_valid());
    assert_eq!(bounds.sample_count, 0);
    assert_eq!(bounds.size(), Vector3::zeros());

    let sphere = model.bounding_sphere();
    assert!(!sphere.is_valid());
}

#[test]
fn single_point_geometry_gives_zero_radius_sphere() {
    let mut geometry = nodecad_modeler::MeshGeometry::new();
    geometry.add_vertex(Point3::new(1.0, 2.0, 3.0));
    let mut model = Model::new();
    model.add_mesh(nodecad_modeler::Mesh::new(
        geometry,
        nodecad_modeler::MeshMaterials::new(),
        translation(1.0, 0.0, 0.0),
    ));

    let sphere = model.bounding_sphere();
    assert!(sphere.is_valid());
    assert_eq!(sphere.radius, 0.0);
    assert_eq!(sphere.center, Point3::new(2.0, 2.0, 3.0));
}

#[test]
fn array_of_boxes_reports_storage_cost() {
    let mut model = Model::new();
    let mut ids: Vec<MeshId> = Vec::new();
    for i in 0..500 {
        ids.push(model.add_mesh(unit_cube_at(translation(i as f64 * 1.5, 0.0, 0.0))));
    }
    model.add_mesh(cylinder(0.5, 2.0, 24, DEFAULT_MATERIAL, Matrix4::identity()));

    let info = model.info();
    assert_eq!(info.mesh_count, 501);
    assert_eq!(info.geometry_count, 2);
    assert_eq!(info.materials_count, 1);
    assert_eq!(info.vertex_count, 8 + 50);
    assert_eq!(info.triangle_count, 12 + 96);

    let geometry_id = model.mesh(ids[0]).unwrap().geometry_id();
    assert_eq!(model.geometry_ref_count(geometry_id), Some(500));

    for id in &ids[..499] {
        model.remove_mesh(*id).unwrap();
    }
    assert_eq!(model.geometry_ref_count(geometry_id), Some(1));
    assert_eq!(model.info().geometry_count, 2);

    model.remove_mesh(ids[499]).unwrap();
    assert_eq!(model.geometry_ref_count(geometry_id), None);
    assert_eq!(model.info().geometry_count, 1);
}

#[test]
fn scaled_transform_scales_bounds() {
    let mut model = Model::new();
    let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(4.0, 1.0, 2.0));
    model.add_mesh(unit_cube_at(scale));

    let bounds = model.bounding_box();
    assert_relative_eq!(bounds.size().x, 4.0);
    assert_relative_eq!(bounds.size().y, 1.0);
    assert_relative_eq!(bounds.size().z, 2.0);
}

#[test]
fn clear_then_reuse() {
    let mut model = Model::new();
    let red = Material::new(Color::new(255, 0, 0));
    let first = model.add_mesh(cuboid(1.0, 1.0, 1.0, red, Matrix4::identity()));
    model.add_mesh(cylinder(1.0, 1.0, 8, red, Matrix4::identity()));

    model.clear();
    assert_eq!(model.info(), ModelInfo::default());
    assert!(model.mesh(first).is_err());

    let next = model.add_mesh(unit_cube_at(Matrix4::identity()));
    assert!(next > first);
    assert_eq!(model.info().geometry_count, 1);
}

#[test]
fn info_serializes_to_json() {
    let mut model = Model::new();
    model.add_mesh(unit_cube_at(Matrix4::identity()));

    let json = serde_json::to_value(model.info()).unwrap();
    assert_eq!(json["mesh_count"], 1);
    assert_eq!(json["vertex_count"], 8);
    assert_eq!(json["triangle_count"], 12);
}

#[test]
fn standalone_pool_of_geometries() {
    let mut pool: SharedPool<MeshGeometryId, nodecad_modeler::MeshGeometry> = SharedPool::new();
    let a = pool.intern(unit_cube_at(Matrix4::identity()).geometry);
    let b = pool.intern(unit_cube_at(translation(1.0, 0.0, 0.0)).geometry);
    let c = pool.intern(cuboid(2.0, 1.0, 1.0, DEFAULT_MATERIAL, Matrix4::identity()).geometry);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(pool.len(), 2);

    pool.release(a).unwrap();
    pool.release(b).unwrap();
    assert_eq!(pool.get(a).unwrap_err(), Error::NotFound(a.into()));
    assert_eq!(pool.get(c).unwrap().vertex_count(), 8);
}

#[test]
fn model_can_move_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Model>();
    assert_send_sync::<SharedPool<MeshGeometryId, nodecad_modeler::MeshGeometry>>();
}
