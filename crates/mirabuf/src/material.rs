//! Appearance and physical material tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Info;

/// Key used when an appearance or material cannot be resolved
pub const DEFAULT_MATERIAL_KEY: &str = "default";

/// Material tables shared by all parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    pub info: Info,
    /// Keyed by `"{name}_{id}"`
    pub appearances: BTreeMap<String, Appearance>,
    /// Keyed by `"{name}_{id}"`
    pub physical_materials: BTreeMap<String, PhysicalMaterial>,
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(127, 127, 127, 255)
    }
}

/// Visual material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub info: Info,
    pub albedo: Color,
    pub roughness: f64,
    pub metallic: f64,
    pub specular: f64,
}

/// Physical material used by the simulator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalMaterial {
    pub info: Info,
    pub description: String,
    /// kg/m^3
    pub density: f32,
    pub dynamic_friction: f32,
    pub static_friction: f32,
    pub restitution: f32,
    pub mechanical: MechanicalProperties,
    pub strength: StrengthProperties,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanicalProperties {
    /// Young's modulus (Pa)
    pub young_mod: f32,
    pub poisson_ratio: f32,
    /// Shear modulus (Pa)
    pub shear_mod: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrengthProperties {
    /// Pa
    pub yield_strength: f32,
    /// Pa
    pub tensile_strength: f32,
}
