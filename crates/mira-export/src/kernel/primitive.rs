//! Built-in kernel for primitive B-rep shapes
//!
//! Tessellates boxes, cylinders and spheres, and estimates mass properties
//! from shape volumes when the host has not supplied them.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{
    CalculationAccuracy, GeometryError, GeometryKernel, GeometryResult, MeshQuality,
    TessellatedMesh, display_mesh,
};
use crate::scene::{Body, BodyGeometry, BrepShape, Component, PhysicalData, Scene};

/// Density used when a component has no material (aluminium, kg/m^3)
const FALLBACK_DENSITY: f64 = 2700.0;

/// Kernel that understands [`BrepShape`] primitives
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveKernel;

impl GeometryKernel for PrimitiveKernel {
    fn name(&self) -> &str {
        "primitive"
    }

    fn tessellate(
        &self,
        body: &Body,
        shape: &BrepShape,
        quality: MeshQuality,
    ) -> GeometryResult<TessellatedMesh> {
        validate_shape(shape)?;
        let segments = quality.segments();
        let mesh = match shape {
            BrepShape::Box { size } => generate_box_mesh(*size),
            BrepShape::Cylinder { radius, height } => {
                generate_cylinder_mesh(*radius, *height, segments)
            }
            BrepShape::Sphere { radius } => generate_sphere_mesh(*radius, segments),
            BrepShape::Opaque { handle } => {
                return Err(GeometryError::KernelNotAvailable(format!(
                    "body {} uses opaque shape {}",
                    body.token, handle
                )));
            }
        };
        if mesh.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }
        Ok(mesh)
    }

    fn physical_properties(
        &self,
        scene: &Scene,
        component: &Component,
        accuracy: CalculationAccuracy,
    ) -> GeometryResult<PhysicalData> {
        if let Some(physical) = &component.physical {
            return Ok(physical.clone());
        }

        let density = component
            .material
            .as_ref()
            .and_then(|m| {
                scene
                    .materials()
                    .iter()
                    .find(|d| d.name == m.name && d.id == m.id)
            })
            .map(|m| m.density as f64)
            .filter(|d| *d > 0.0)
            .unwrap_or(FALLBACK_DENSITY);

        let (volume, area) = match accuracy {
            CalculationAccuracy::Low => bounding_volume(component),
            _ => {
                let (v, a) = shape_volume(component);
                if v > 0.0 { (v, a) } else { bounding_volume(component) }
            }
        };

        let center = component_extent(component)
            .map(|(min, max)| (Vec3::from(min) + Vec3::from(max)) / 2.0)
            .unwrap_or(Vec3::ZERO);

        Ok(PhysicalData {
            mass: volume * density,
            volume,
            area,
            density,
            center_of_mass: center.to_array(),
            inertia: None,
        })
    }
}

fn validate_shape(shape: &BrepShape) -> GeometryResult<()> {
    let positive = |v: f32| v.is_finite() && v > 0.0;
    let ok = match shape {
        BrepShape::Box { size } => size.iter().all(|&s| positive(s)),
        BrepShape::Cylinder { radius, height } => positive(*radius) && positive(*height),
        BrepShape::Sphere { radius } => positive(*radius),
        BrepShape::Opaque { .. } => true,
    };
    if ok {
        Ok(())
    } else {
        Err(GeometryError::Degenerate(format!("{:?}", shape)))
    }
}

/// Half extents of a primitive centered on the origin
fn shape_half_extent(shape: &BrepShape) -> Option<Vec3> {
    match shape {
        BrepShape::Box { size } => Some(Vec3::from(*size) / 2.0),
        BrepShape::Cylinder { radius, height } => Some(Vec3::new(*radius, *radius, height / 2.0)),
        BrepShape::Sphere { radius } => Some(Vec3::splat(*radius)),
        BrepShape::Opaque { .. } => None,
    }
}

/// Bounding box of the visible bodies, or the one reported by the host
pub fn component_extent(component: &Component) -> Option<([f32; 3], [f32; 3])> {
    if let Some([min, max]) = component.bounding_box {
        return Some((min, max));
    }

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    let mut any = false;
    for body in component.visible_bodies() {
        match &body.geometry {
            BodyGeometry::Brep { shape } => {
                if let Some(h) = shape_half_extent(shape) {
                    min = min.min(-h);
                    max = max.max(h);
                    any = true;
                }
            }
            BodyGeometry::Mesh { mesh } => {
                for v in &mesh.vertices {
                    min = min.min(Vec3::from(*v));
                    max = max.max(Vec3::from(*v));
                    any = true;
                }
            }
        }
    }
    any.then(|| (min.to_array(), max.to_array()))
}

/// Volume and surface area of the bounding box
fn bounding_volume(component: &Component) -> (f64, f64) {
    match component_extent(component) {
        Some((min, max)) => {
            let s = Vec3::from(max) - Vec3::from(min);
            let volume = (s.x * s.y * s.z) as f64;
            let area = 2.0 * (s.x * s.y + s.y * s.z + s.z * s.x) as f64;
            (volume, area)
        }
        None => (0.0, 0.0),
    }
}

/// Summed analytic volume and area of the visible bodies
fn shape_volume(component: &Component) -> (f64, f64) {
    let mut volume = 0.0f64;
    let mut area = 0.0f64;
    for body in component.visible_bodies() {
        let (v, a) = match &body.geometry {
            BodyGeometry::Brep { shape } => match shape {
                BrepShape::Box { size } => (
                    size[0] * size[1] * size[2],
                    2.0 * (size[0] * size[1] + size[1] * size[2] + size[2] * size[0]),
                ),
                BrepShape::Cylinder { radius, height } => (
                    PI * radius * radius * height,
                    TAU * radius * radius + TAU * radius * height,
                ),
                BrepShape::Sphere { radius } => (
                    4.0 / 3.0 * PI * radius.powi(3),
                    4.0 * PI * radius * radius,
                ),
                BrepShape::Opaque { .. } => (0.0, 0.0),
            },
            BodyGeometry::Mesh { mesh } => match display_mesh(mesh) {
                Ok(m) => mesh_volume_area(&m),
                Err(_) => (0.0, 0.0),
            },
        };
        volume += v.abs() as f64;
        area += a as f64;
    }
    (volume, area)
}

/// Signed volume (divergence theorem) and surface area of a closed mesh
fn mesh_volume_area(mesh: &TessellatedMesh) -> (f32, f32) {
    let mut volume = 0.0;
    let mut area = 0.0;
    for tri in mesh.indices.chunks_exact(3) {
        let v0 = Vec3::from(mesh.vertices[tri[0] as usize]);
        let v1 = Vec3::from(mesh.vertices[tri[1] as usize]);
        let v2 = Vec3::from(mesh.vertices[tri[2] as usize]);
        volume += v0.dot(v1.cross(v2)) / 6.0;
        area += (v1 - v0).cross(v2 - v0).length() / 2.0;
    }
    (volume, area)
}

/// Box centered on the origin, 4 vertices per face
pub fn generate_box_mesh(size: [f32; 3]) -> TessellatedMesh {
    let h = Vec3::from(size) * 0.5;
    // (normal, u, v) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = TessellatedMesh::new();
    for (n, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (n + u * su + v * sv) * h;
            mesh.vertices.push(p.to_array());
            mesh.normals.push(n.to_array());
            mesh.uvs.push([(su + 1.0) / 2.0, (sv + 1.0) / 2.0]);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Cylinder along Z centered on the origin, with caps
pub fn generate_cylinder_mesh(radius: f32, height: f32, segments: u32) -> TessellatedMesh {
    let segments = segments.max(3);
    let half = height / 2.0;
    let mut mesh = TessellatedMesh::new();

    // Side: a bottom/top vertex pair per ring step, seam duplicated for uvs
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (s, c) = (t * TAU).sin_cos();
        let n = [c, s, 0.0];
        mesh.vertices.push([radius * c, radius * s, -half]);
        mesh.normals.push(n);
        mesh.uvs.push([t, 0.0]);
        mesh.vertices.push([radius * c, radius * s, half]);
        mesh.normals.push(n);
        mesh.uvs.push([t, 1.0]);
    }
    for i in 0..segments {
        let b0 = 2 * i;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        mesh.indices.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
    }

    for (z, normal) in [(half, 1.0f32), (-half, -1.0f32)] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices.push([0.0, 0.0, z]);
        mesh.normals.push([0.0, 0.0, normal]);
        mesh.uvs.push([0.5, 0.5]);
        for i in 0..segments {
            let (s, c) = (i as f32 / segments as f32 * TAU).sin_cos();
            mesh.vertices.push([radius * c, radius * s, z]);
            mesh.normals.push([0.0, 0.0, normal]);
            mesh.uvs.push([0.5 + c / 2.0, 0.5 + s / 2.0]);
        }
        for i in 0..segments {
            let a = center + 1 + i;
            let b = center + 1 + (i + 1) % segments;
            if normal > 0.0 {
                mesh.indices.extend_from_slice(&[center, a, b]);
            } else {
                mesh.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }
    mesh
}

/// UV sphere centered on the origin, poles on Z
pub fn generate_sphere_mesh(radius: f32, segments: u32) -> TessellatedMesh {
    let slices = segments.max(3);
    let stacks = (segments / 2).max(2);
    let mut mesh = TessellatedMesh::new();

    for st in 0..=stacks {
        let phi = PI * st as f32 / stacks as f32;
        let (sp, cp) = phi.sin_cos();
        for sl in 0..=slices {
            let theta = TAU * sl as f32 / slices as f32;
            let (st_, ct) = theta.sin_cos();
            let n = Vec3::new(sp * ct, sp * st_, cp);
            mesh.vertices.push((n * radius).to_array());
            mesh.normals.push(n.to_array());
            mesh.uvs
                .push([sl as f32 / slices as f32, st as f32 / stacks as f32]);
        }
    }

    let ring = slices + 1;
    for st in 0..stacks {
        for sl in 0..slices {
            let a = st * ring + sl;
            let b = a + ring;
            // Pole rows collapse to a point; skip their zero-area halves
            if st != 0 {
                mesh.indices.extend_from_slice(&[a, b, a + 1]);
            }
            if st != stacks - 1 {
                mesh.indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }
    mesh
}
