//! Vector, bounding box and transform records

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Three component vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Axis aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {
    pub fn new(min: impl Into<Vector3>, max: impl Into<Vector3>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max.to_vec3() - self.min.to_vec3()
    }

    pub fn center(&self) -> Vec3 {
        (self.min.to_vec3() + self.max.to_vec3()) / 2.0
    }
}

/// 4x4 spatial matrix stored row-major
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub spatial_matrix: [f32; 16],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        spatial_matrix: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build from a column-major glam matrix
    pub fn from_mat4(m: Mat4) -> Self {
        Self {
            spatial_matrix: m.transpose().to_cols_array(),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array(&self.spatial_matrix).transpose()
    }

    /// Translation part of the matrix
    pub fn translation(&self) -> Vec3 {
        let m = &self.spatial_matrix;
        Vec3::new(m[3], m[7], m[11])
    }
}
