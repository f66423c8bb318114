//! Part definitions, instances and their geometry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, InertiaMatrix, Info, Transform, Vector3};

/// All parts of an assembly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parts {
    pub info: Info,
    /// Definitions keyed by component guid
    pub part_definitions: BTreeMap<String, PartDefinition>,
    /// Instances keyed by occurrence guid
    pub part_instances: BTreeMap<String, PartInstance>,
}

/// Shared geometric and physical definition of a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub info: Info,
    pub physical_data: PhysicalProperties,
    pub bounding_box: Option<BoundingBox>,
    pub bodies: Vec<Body>,
    /// Whether the simulator should move this part
    pub dynamic: bool,
}

/// Placement of a part definition in the assembly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartInstance {
    pub info: Info,
    /// Key into `Parts::part_definitions`
    pub part_definition_reference: Option<String>,
    /// Transform relative to the parent occurrence
    pub transform: Transform,
    /// Transform relative to the design root
    pub global_transform: Transform,
    /// Appearance key, `"default"` when unresolved
    pub appearance: String,
    pub physical_material: Option<String>,
    pub skip_collider: bool,
}

/// One body of a part definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub info: Info,
    /// Guid of the owning part definition
    pub part: String,
    pub triangle_mesh: TriangleMesh,
    pub appearance_override: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub info: Info,
    pub has_volume: bool,
    pub material_reference: String,
    pub mesh: Mesh,
}

/// Flat vertex buffers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// xyz triplets
    pub verts: Vec<f32>,
    /// xyz triplets, one per vertex
    pub normals: Vec<f32>,
    /// uv pairs, one per vertex
    pub uv: Vec<f32>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len() / 3
    }
}

/// Mass properties of a part definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    /// kg/m^3
    pub density: f64,
    /// kg
    pub mass: f64,
    /// m^3
    pub volume: f64,
    /// m^2
    pub area: f64,
    /// Center of mass
    pub com: Vector3,
    pub inertia: InertiaMatrix,
}
