//! Host entity snapshots
//!
//! Plain data copied out of the host object model. Every entity carries the
//! host's stable token; nothing here refers back to host objects.

use glam::Mat4;
use serde::{Deserialize, Serialize};

fn visible_default() -> bool {
    true
}

fn identity_matrix() -> [f32; 16] {
    mirabuf::Transform::IDENTITY.spatial_matrix
}

fn z_axis() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

/// Reference to a named host material or appearance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub name: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Composite table key, disambiguating same-named entries
    pub fn key(&self) -> String {
        material_key(&self.name, &self.id)
    }
}

/// Build the `"{name}_{id}"` key of a material table entry
pub fn material_key(name: &str, id: &str) -> String {
    format!("{}_{}", name, id)
}

/// Component definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub token: String,
    /// Host-assigned component id
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<Body>,
    /// Physical material assigned to the component
    #[serde(default)]
    pub material: Option<EntityRef>,
    /// Mass properties reported by the host, if already computed
    #[serde(default)]
    pub physical: Option<PhysicalData>,
    /// `[min, max]` in design units
    #[serde(default)]
    pub bounding_box: Option<[[f32; 3]; 2]>,
}

impl Component {
    pub fn new(token: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            id: id.into(),
            name: name.into(),
            bodies: Vec::new(),
            material: None,
            physical: None,
            bounding_box: None,
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn with_material(mut self, material: EntityRef) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_bounding_box(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.bounding_box = Some([min, max]);
        self
    }

    pub fn with_physical(mut self, physical: PhysicalData) -> Self {
        self.physical = Some(physical);
        self
    }

    /// Bodies the host shows (light bulb on)
    pub fn visible_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.visible)
    }
}

/// Placement of a component in the assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub token: String,
    pub name: String,
    /// Token of the instanced component
    pub component: String,
    /// Assembly context: token of the enclosing occurrence, `None` at top level
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "visible_default")]
    pub visible: bool,
    /// Row-major transform relative to the assembly context
    #[serde(default = "identity_matrix")]
    pub transform: [f32; 16],
    #[serde(default)]
    pub appearance: Option<EntityRef>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Occurrence {
    pub fn new(
        token: impl Into<String>,
        name: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            component: component.into(),
            parent: None,
            visible: true,
            transform: identity_matrix(),
            appearance: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = mirabuf::Transform::from_mat4(transform).spatial_matrix;
        self
    }

    pub fn with_appearance(mut self, appearance: EntityRef) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn with_attribute(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute {
            group: group.into(),
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Local transform as a glam matrix
    pub fn local_matrix(&self) -> Mat4 {
        mirabuf::Transform {
            spatial_matrix: self.transform,
        }
        .to_mat4()
    }

    pub fn attribute(&self, group: &str, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.group == group && a.name == name)
    }
}

/// Named marker attached to a host entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub group: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Body of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub token: String,
    pub name: String,
    #[serde(default = "visible_default")]
    pub visible: bool,
    #[serde(default)]
    pub appearance: Option<EntityRef>,
    pub geometry: BodyGeometry,
}

impl Body {
    pub fn brep(token: impl Into<String>, name: impl Into<String>, shape: BrepShape) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            visible: true,
            appearance: None,
            geometry: BodyGeometry::Brep { shape },
        }
    }

    pub fn mesh(token: impl Into<String>, name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            visible: true,
            appearance: None,
            geometry: BodyGeometry::Mesh { mesh },
        }
    }

    pub fn with_appearance(mut self, appearance: EntityRef) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Geometry backing a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyGeometry {
    /// Boundary representation, tessellated by the geometry kernel
    Brep { shape: BrepShape },
    /// Native mesh body; its display mesh is copied as-is
    Mesh { mesh: MeshData },
}

/// Boundary-representation shape handed to the geometry kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrepShape {
    /// Box centered on the component origin
    Box { size: [f32; 3] },
    /// Cylinder along Z centered on the component origin
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
    /// Shape only the host kernel can tessellate
    Opaque { handle: String },
}

/// Display mesh of a mesh body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub uv: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Host appearance (visual material)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceData {
    pub id: String,
    pub name: String,
    /// RGBA
    #[serde(default = "AppearanceData::default_color")]
    pub color: [u8; 4],
    #[serde(default)]
    pub roughness: f64,
    #[serde(default)]
    pub metallic: f64,
    #[serde(default)]
    pub specular: f64,
}

impl AppearanceData {
    fn default_color() -> [u8; 4] {
        [127, 127, 127, 255]
    }

    pub fn new(id: impl Into<String>, name: impl Into<String>, color: [u8; 4]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            roughness: 0.5,
            metallic: 0.0,
            specular: 0.5,
        }
    }

    pub fn key(&self) -> String {
        material_key(&self.name, &self.id)
    }
}

/// Host physical material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialData {
    pub id: String,
    pub name: String,
    pub description: String,
    /// kg/m^3
    pub density: f32,
    pub dynamic_friction: f32,
    pub static_friction: f32,
    pub restitution: f32,
    /// Pa
    pub young_modulus: f32,
    pub poisson_ratio: f32,
    /// Pa
    pub shear_modulus: f32,
    /// Pa
    pub yield_strength: f32,
    /// Pa
    pub tensile_strength: f32,
}

impl MaterialData {
    pub fn new(id: impl Into<String>, name: impl Into<String>, density: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            density,
            dynamic_friction: 0.5,
            static_friction: 0.5,
            restitution: 0.5,
            ..Default::default()
        }
    }

    pub fn key(&self) -> String {
        material_key(&self.name, &self.id)
    }
}

/// Mass properties as computed by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalData {
    /// kg
    pub mass: f64,
    /// m^3
    pub volume: f64,
    /// m^2
    pub area: f64,
    /// kg/m^3
    pub density: f64,
    pub center_of_mass: [f32; 3],
    /// `[ixx, ixy, ixz, iyy, iyz, izz]`
    pub inertia: Option<[f32; 6]>,
}

/// Host joint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    Rigid,
    Revolute,
    Slider,
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

/// Joint between two occurrences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointData {
    pub token: String,
    pub name: String,
    pub kind: JointKind,
    /// Occurrence the child side is attached to
    #[serde(default)]
    pub parent_occurrence: Option<String>,
    /// Occurrence moved by the joint
    #[serde(default)]
    pub child_occurrence: Option<String>,
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default = "z_axis")]
    pub axis: [f32; 3],
    /// `[lower, upper]`
    #[serde(default)]
    pub limits: Option<[f32; 2]>,
    #[serde(default)]
    pub suppressed: bool,
}

impl JointData {
    pub fn new(
        token: impl Into<String>,
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            kind,
            parent_occurrence: Some(parent.into()),
            child_occurrence: Some(child.into()),
            origin: [0.0; 3],
            axis: z_axis(),
            limits: None,
            suppressed: false,
        }
    }

    pub fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some([lower, upper]);
        self
    }

    pub fn with_axis(mut self, axis: [f32; 3]) -> Self {
        self.axis = axis;
        self
    }
}

/// Rigid group defined on the root component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidGroupData {
    pub token: String,
    #[serde(default)]
    pub name: String,
    /// Member occurrence tokens; `None` for members the host could not resolve
    pub occurrences: Vec<Option<String>>,
}

/// Cloud project the document lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub root_folder_id: String,
    #[serde(default = "visible_default")]
    pub valid: bool,
}
