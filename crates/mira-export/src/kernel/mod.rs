//! Geometry kernel interface
//!
//! Tessellation and mass-property computation belong to the host. The
//! pipeline reaches them only through [`GeometryKernel`], so a host adapter
//! can plug in its own mesher while tests and the CLI use
//! [`PrimitiveKernel`].

mod primitive;

use serde::{Deserialize, Serialize};

use crate::scene::{Body, BrepShape, Component, MeshData, PhysicalData, Scene};

pub use primitive::{
    PrimitiveKernel, component_extent, generate_box_mesh, generate_cylinder_mesh,
    generate_sphere_mesh,
};

/// Error type for kernel operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeometryError {
    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    #[error("Empty mesh: no triangles")]
    EmptyMesh,

    #[error("Tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),
}

/// Result type for kernel operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Triangle mesh quality requested from the tessellator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshQuality {
    #[default]
    Low,
    Normal,
    High,
    VeryHigh,
}

impl MeshQuality {
    /// Segments around a full circle for curved primitives
    pub fn segments(&self) -> u32 {
        match self {
            MeshQuality::Low => 12,
            MeshQuality::Normal => 24,
            MeshQuality::High => 48,
            MeshQuality::VeryHigh => 96,
        }
    }
}

/// Accuracy of mass-property calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationAccuracy {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

/// A tessellated mesh output from the kernel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh {
    pub vertices: Vec<[f32; 3]>,
    /// One normal per vertex
    pub normals: Vec<[f32; 3]>,
    /// One uv pair per vertex, may be empty
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
}

impl TessellatedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `(min, max)` over all vertices
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        Some((min, max))
    }

    /// Flatten into wire buffers
    pub fn into_wire(self) -> mirabuf::Mesh {
        mirabuf::Mesh {
            verts: self.vertices.into_iter().flatten().collect(),
            normals: self.normals.into_iter().flatten().collect(),
            uv: self.uvs.into_iter().flatten().collect(),
            indices: self.indices,
        }
    }
}

/// Geometry operations provided by the host
pub trait GeometryKernel {
    /// Name of this kernel, for logs
    fn name(&self) -> &str;

    /// Tessellate a boundary-representation body
    fn tessellate(
        &self,
        body: &Body,
        shape: &BrepShape,
        quality: MeshQuality,
    ) -> GeometryResult<TessellatedMesh>;

    /// Compute mass properties of a component
    fn physical_properties(
        &self,
        scene: &Scene,
        component: &Component,
        accuracy: CalculationAccuracy,
    ) -> GeometryResult<PhysicalData>;
}

/// Copy and validate the display mesh of a mesh body
pub fn display_mesh(mesh: &MeshData) -> GeometryResult<TessellatedMesh> {
    if mesh.indices.is_empty() {
        return Err(GeometryError::EmptyMesh);
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(GeometryError::Degenerate(format!(
            "{} indices is not a multiple of 3",
            mesh.indices.len()
        )));
    }
    let vertex_count = mesh.vertices.len();
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(GeometryError::Degenerate(format!(
            "index {} out of range for {} vertices",
            bad, vertex_count
        )));
    }

    Ok(TessellatedMesh {
        vertices: mesh.vertices.clone(),
        normals: mesh.normals.clone(),
        uvs: mesh.uv.clone(),
        indices: mesh.indices.clone(),
    })
}
