// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding volumes in f64 precision.
//!
//! Both shapes start out in an invalid "empty" state. An empty scene is a
//! normal state, so queries on it return these sentinels instead of failing.
//! Points with a NaN or infinite coordinate are ignored.

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
    /// Number of points folded in.
    pub sample_count: usize,
}

impl BoundingBox {
    /// Creates an empty box.
    pub fn new() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
            sample_count: 0,
        }
    }

    /// Creates a box spanning exactly the given points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bounds = Self::new();
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    /// Check if bounds are valid (at least one point added)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    /// Expand bounds to include a point. Non-finite points are skipped.
    #[inline]
    pub fn expand(&mut self, point: &Point3<f64>) {
        if !point.iter().all(|c| c.is_finite()) {
            return;
        }
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
        self.sample_count += 1;
    }

    /// Expand bounds to include another box.
    pub fn merge(&mut self, other: &BoundingBox) {
        if !other.is_valid() {
            return;
        }
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
        self.sample_count += other.sample_count;
    }

    /// Midpoint of the box, or the origin when empty.
    pub fn center(&self) -> Point3<f64> {
        if !self.is_valid() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths of the box, zero when empty.
    pub fn size(&self) -> Vector3<f64> {
        if !self.is_valid() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.is_valid()
            && (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounding sphere. A negative radius marks the empty sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl BoundingSphere {
    /// Creates an empty sphere.
    pub fn new() -> Self {
        Self {
            center: Point3::origin(),
            radius: -1.0,
        }
    }

    pub fn with_radius(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// A single point yields a valid sphere of radius zero.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.radius >= 0.0
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.is_valid() && nalgebra::distance(&self.center, point) <= self.radius
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::new()
    }
}
