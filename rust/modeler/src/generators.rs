// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive mesh builders.
//!
//! Both builders produce geometry centered on the origin in local space; the
//! placement goes into the mesh transformation so that equally sized shapes
//! share one geometry in the model.

use std::f64::consts::TAU;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::mesh::{Material, Mesh, MeshGeometry, MeshMaterials, MeshTriangle};

/// Corner indices of each box face as two counter-clockwise triangles, with
/// the face normal.
const CUBOID_FACES: [([[u32; 3]; 2], [f64; 3]); 6] = [
    ([[0, 3, 2], [0, 2, 1]], [0.0, 0.0, -1.0]),
    ([[4, 5, 6], [4, 6, 7]], [0.0, 0.0, 1.0]),
    ([[0, 1, 5], [0, 5, 4]], [0.0, -1.0, 0.0]),
    ([[3, 7, 6], [3, 6, 2]], [0.0, 1.0, 0.0]),
    ([[0, 4, 7], [0, 7, 3]], [-1.0, 0.0, 0.0]),
    ([[1, 2, 6], [1, 6, 5]], [1.0, 0.0, 0.0]),
];

/// Axis-aligned box with extents `x`, `y`, `z`.
pub fn cuboid(x: f64, y: f64, z: f64, material: Material, transformation: Matrix4<f64>) -> Mesh {
    let mut materials = MeshMaterials::new();
    let material_index = materials.add_material(material);

    let (hx, hy, hz) = (x / 2.0, y / 2.0, z / 2.0);
    let mut geometry = MeshGeometry::with_capacity(8, 6, 12);
    for &cz in &[-hz, hz] {
        geometry.add_vertex(Point3::new(-hx, -hy, cz));
        geometry.add_vertex(Point3::new(hx, -hy, cz));
        geometry.add_vertex(Point3::new(hx, hy, cz));
        geometry.add_vertex(Point3::new(-hx, hy, cz));
    }

    for (triangles, [nx, ny, nz]) in CUBOID_FACES {
        let normal = geometry.add_normal(Vector3::new(nx, ny, nz));
        for vertices in triangles {
            geometry.add_triangle(MeshTriangle::new(
                vertices,
                [normal; 3],
                material_index,
            ));
        }
    }

    Mesh::new(geometry, materials, transformation)
}

/// Closed faceted cylinder of the given radius and height along Z.
///
/// Fewer than three segments are clamped to three.
pub fn cylinder(
    radius: f64,
    height: f64,
    segments: u32,
    material: Material,
    transformation: Matrix4<f64>,
) -> Mesh {
    let segments = segments.max(3);
    let mut materials = MeshMaterials::new();
    let material_index = materials.add_material(material);

    let n = segments as usize;
    let half = height / 2.0;
    let mut geometry = MeshGeometry::with_capacity(2 * n + 2, n + 2, 4 * n);

    // Bottom ring 0..n, top ring n..2n, side normals 0..n.
    for i in 0..segments {
        let angle = TAU * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        geometry.add_vertex(Point3::new(radius * cos, radius * sin, -half));
        geometry.add_normal(Vector3::new(cos, sin, 0.0));
    }
    for i in 0..n {
        let bottom = geometry.vertices()[i];
        geometry.add_vertex(Point3::new(bottom.x, bottom.y, half));
    }
    let bottom_center = geometry.add_vertex(Point3::new(0.0, 0.0, -half));
    let top_center = geometry.add_vertex(Point3::new(0.0, 0.0, half));
    let down = geometry.add_normal(-Vector3::z());
    let up = geometry.add_normal(Vector3::z());

    for i in 0..segments {
        let j = (i + 1) % segments;
        let (bi, bj) = (i, j);
        let (ti, tj) = (i + segments, j + segments);

        geometry.add_triangle(MeshTriangle::new([bi, bj, tj], [i, j, j], material_index));
        geometry.add_triangle(MeshTriangle::new([bi, tj, ti], [i, j, i], material_index));
        geometry.add_triangle(MeshTriangle::new(
            [bottom_center, bj, bi],
            [down; 3],
            material_index,
        ));
        geometry.add_triangle(MeshTriangle::new([top_center, ti, tj], [up; 3], material_index));
    }

    Mesh::new(geometry, materials, transformation)
}
