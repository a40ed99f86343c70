// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh payloads handed to the model store.
//!
//! A [`Mesh`] is what a shape node produces: a [`MeshGeometry`], the
//! [`MeshMaterials`] its triangles index into, and a placement matrix. The
//! model splits it apart and deduplicates the geometry and materials
//! independently.

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::checksum::{Checksum, Checksumable};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Surface material. Only a color for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
}

impl Material {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Material assigned to shapes that don't specify one.
pub const DEFAULT_MATERIAL: Material = Material::new(Color::new(200, 200, 200));

impl Default for Material {
    fn default() -> Self {
        DEFAULT_MATERIAL
    }
}

/// Ordered list of materials referenced by triangle material indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshMaterials {
    materials: Vec<Material>,
}

impl MeshMaterials {
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
        }
    }

    /// Adds a material and returns its index. An equal material already in
    /// the list is reused.
    pub fn add_material(&mut self, material: Material) -> u32 {
        if let Some(index) = self.materials.iter().position(|m| *m == material) {
            return index as u32;
        }
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    pub fn material(&self, index: u32) -> Option<&Material> {
        self.materials.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

impl Checksumable for MeshMaterials {
    fn checksum(&self) -> Checksum {
        let mut checksum = Checksum::new();
        checksum.add(self.materials.len());
        for material in &self.materials {
            checksum.add(material.color.r as u32);
            checksum.add(material.color.g as u32);
            checksum.add(material.color.b as u32);
        }
        checksum
    }
}

/// A triangle referencing vertices, normals and a material by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshTriangle {
    pub vertices: [u32; 3],
    pub normals: [u32; 3],
    pub material: u32,
}

impl MeshTriangle {
    pub fn new(vertices: [u32; 3], normals: [u32; 3], material: u32) -> Self {
        Self {
            vertices,
            normals,
            material,
        }
    }
}

/// Indexed triangle geometry in local coordinates.
///
/// Equality is bitwise on coordinates, the same view the checksum takes, so
/// `+0.0` and `-0.0` differ and a NaN coordinate still equals itself.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    triangles: Vec<MeshTriangle>,
}

impl MeshGeometry {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, normal_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(normal_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Adds a vertex and returns its index.
    #[inline]
    pub fn add_vertex(&mut self, vertex: Point3<f64>) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Adds a normal and returns its index.
    #[inline]
    pub fn add_normal(&mut self, normal: Vector3<f64>) -> u32 {
        self.normals.push(normal);
        (self.normals.len() - 1) as u32
    }

    /// Adds a triangle. Indices are not validated here; the shape layer is
    /// responsible for producing well-formed geometry.
    #[inline]
    pub fn add_triangle(&mut self, triangle: MeshTriangle) {
        self.triangles.push(triangle);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    pub fn vertex(&self, index: u32) -> Option<&Point3<f64>> {
        self.vertices.get(index as usize)
    }

    pub fn normal(&self, index: u32) -> Option<&Vector3<f64>> {
        self.normals.get(index as usize)
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }
}

#[inline]
fn point_bits(p: &Point3<f64>) -> [u64; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

#[inline]
fn vector_bits(v: &Vector3<f64>) -> [u64; 3] {
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

impl PartialEq for MeshGeometry {
    fn eq(&self, other: &Self) -> bool {
        // Cheap length checks first, coordinates last.
        self.vertices.len() == other.vertices.len()
            && self.normals.len() == other.normals.len()
            && self.triangles == other.triangles
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| point_bits(a) == point_bits(b))
            && self
                .normals
                .iter()
                .zip(&other.normals)
                .all(|(a, b)| vector_bits(a) == vector_bits(b))
    }
}

impl Eq for MeshGeometry {}

impl Checksumable for MeshGeometry {
    fn checksum(&self) -> Checksum {
        let mut checksum = Checksum::new();
        checksum.add(self.vertices.len());
        for v in &self.vertices {
            checksum.add(v.x);
            checksum.add(v.y);
            checksum.add(v.z);
        }
        checksum.add(self.normals.len());
        for n in &self.normals {
            checksum.add(n.x);
            checksum.add(n.y);
            checksum.add(n.z);
        }
        checksum.add(self.triangles.len());
        for t in &self.triangles {
            for &i in t.vertices.iter().chain(t.normals.iter()) {
                checksum.add(i);
            }
            checksum.add(t.material);
        }
        checksum
    }
}

/// A placed mesh: geometry and materials in local space plus a transform.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: MeshGeometry,
    pub materials: MeshMaterials,
    pub transformation: Matrix4<f64>,
}

impl Mesh {
    pub fn new(geometry: MeshGeometry, materials: MeshMaterials, transformation: Matrix4<f64>) -> Self {
        Self {
            geometry,
            materials,
            transformation,
        }
    }

    /// Splits the mesh into the parts the model stores separately.
    pub fn into_parts(self) -> (MeshGeometry, MeshMaterials, Matrix4<f64>) {
        (self.geometry, self.materials, self.transformation)
    }
}
