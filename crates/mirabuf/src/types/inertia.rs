//! Inertia tensor

use serde::{Deserialize, Serialize};

/// Symmetric inertia tensor about the center of mass (kg*m^2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InertiaMatrix {
    pub ixx: f32,
    pub ixy: f32,
    pub ixz: f32,
    pub iyy: f32,
    pub iyz: f32,
    pub izz: f32,
}

impl InertiaMatrix {
    /// Solid box approximation from a bounding box
    pub fn from_bounding_box(mass: f32, bbox_min: [f32; 3], bbox_max: [f32; 3]) -> Self {
        let w = bbox_max[0] - bbox_min[0];
        let h = bbox_max[1] - bbox_min[1];
        let d = bbox_max[2] - bbox_min[2];
        let k = mass / 12.0;
        Self {
            ixx: k * (h * h + d * d),
            ixy: 0.0,
            ixz: 0.0,
            iyy: k * (w * w + d * d),
            iyz: 0.0,
            izz: k * (w * w + h * h),
        }
    }

    /// Multiply every component, used when rescaling mass
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            ixx: self.ixx * factor,
            ixy: self.ixy * factor,
            ixz: self.ixz * factor,
            iyy: self.iyy * factor,
            iyz: self.iyz * factor,
            izz: self.izz * factor,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
