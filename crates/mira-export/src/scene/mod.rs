//! Read-only snapshot of a host design
//!
//! The exporter never talks to the host application directly. An adapter
//! copies the design into a [`Scene`] (components, occurrences with their
//! assembly context, bodies, joints, rigid groups, materials) and the
//! pipeline reads from it. Insertion validates references so that the
//! occurrence graph is always a forest.

mod attributes;
mod entities;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use attributes::{AttributeStore, DocumentAttributes};
pub use entities::*;

/// Scene construction errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("Duplicate component token: {0}")]
    DuplicateComponent(String),
    #[error("Duplicate occurrence token: {0}")]
    DuplicateOccurrence(String),
    #[error("Occurrence {occurrence} references unknown component {component}")]
    UnknownComponent {
        occurrence: String,
        component: String,
    },
    #[error("Occurrence {occurrence} references unknown parent {parent}")]
    UnknownParent { occurrence: String, parent: String },
    #[error("Root component {0} is not part of the scene")]
    MissingRoot(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Serializable form of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    /// Document name
    pub name: String,
    /// Token of the design's root component
    pub root_component: String,
    pub components: Vec<Component>,
    /// Parents must precede their children
    pub occurrences: Vec<Occurrence>,
    pub appearances: Vec<AppearanceData>,
    pub materials: Vec<MaterialData>,
    pub joints: Vec<JointData>,
    pub rigid_groups: Vec<RigidGroupData>,
    pub attributes: DocumentAttributes,
    pub project: Option<ProjectInfo>,
}

/// Indexed, validated design snapshot
#[derive(Debug, Clone)]
pub struct Scene {
    name: String,
    root_component: String,
    components: Vec<Component>,
    occurrences: Vec<Occurrence>,
    appearances: Vec<AppearanceData>,
    materials: Vec<MaterialData>,
    joints: Vec<JointData>,
    rigid_groups: Vec<RigidGroupData>,
    attributes: DocumentAttributes,
    project: Option<ProjectInfo>,
    component_index: HashMap<String, usize>,
    occurrence_index: HashMap<String, usize>,
    /// Occurrence token -> indices of child occurrences, in insertion order
    children: HashMap<String, Vec<usize>>,
    /// Indices of occurrences directly under the root component
    roots: Vec<usize>,
}

impl Scene {
    /// Create a scene whose design root is `root`
    pub fn new(name: impl Into<String>, root: Component) -> Self {
        let root_component = root.token.clone();
        let mut scene = Self {
            name: name.into(),
            root_component,
            components: Vec::new(),
            occurrences: Vec::new(),
            appearances: Vec::new(),
            materials: Vec::new(),
            joints: Vec::new(),
            rigid_groups: Vec::new(),
            attributes: DocumentAttributes::new(),
            project: None,
            component_index: HashMap::new(),
            occurrence_index: HashMap::new(),
            children: HashMap::new(),
            roots: Vec::new(),
        };
        scene.component_index.insert(root.token.clone(), 0);
        scene.components.push(root);
        scene
    }

    /// Build and validate a scene from its serializable form
    pub fn from_document(doc: SceneDocument) -> Result<Self, SceneError> {
        let SceneDocument {
            name,
            root_component,
            components,
            occurrences,
            appearances,
            materials,
            joints,
            rigid_groups,
            attributes,
            project,
        } = doc;

        let mut rest = Vec::new();
        let mut root = None;
        for component in components {
            if root.is_none() && component.token == root_component {
                root = Some(component);
            } else {
                rest.push(component);
            }
        }
        let root = root.ok_or_else(|| SceneError::MissingRoot(root_component.clone()))?;

        let mut scene = Scene::new(name, root);
        for component in rest {
            scene.add_component(component)?;
        }
        for occurrence in occurrences {
            scene.add_occurrence(occurrence)?;
        }
        scene.appearances = appearances;
        scene.materials = materials;
        scene.joints = joints;
        scene.rigid_groups = rigid_groups;
        scene.attributes = attributes;
        scene.project = project;
        Ok(scene)
    }

    /// Serializable copy of this scene
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            name: self.name.clone(),
            root_component: self.root_component.clone(),
            components: self.components.clone(),
            occurrences: self.occurrences.clone(),
            appearances: self.appearances.clone(),
            materials: self.materials.clone(),
            joints: self.joints.clone(),
            rigid_groups: self.rigid_groups.clone(),
            attributes: self.attributes.clone(),
            project: self.project.clone(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        let doc: SceneDocument =
            serde_json::from_str(json).map_err(|e| SceneError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Load a JSON scene snapshot
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        let scene = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded scene '{}' from {:?}: {} components, {} occurrences",
            scene.name,
            path,
            scene.components.len(),
            scene.occurrences.len()
        );
        Ok(scene)
    }

    /// Write the scene back as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let content = serde_json::to_string_pretty(&self.to_document())
            .map_err(|e| SceneError::Parse(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| SceneError::Io(e.to_string()))
    }

    /// Add a component definition
    pub fn add_component(&mut self, component: Component) -> Result<(), SceneError> {
        if self.component_index.contains_key(&component.token) {
            return Err(SceneError::DuplicateComponent(component.token));
        }
        self.component_index
            .insert(component.token.clone(), self.components.len());
        self.components.push(component);
        Ok(())
    }

    /// Add an occurrence; its component and parent must already exist
    pub fn add_occurrence(&mut self, occurrence: Occurrence) -> Result<(), SceneError> {
        if self.occurrence_index.contains_key(&occurrence.token) {
            return Err(SceneError::DuplicateOccurrence(occurrence.token));
        }
        if !self.component_index.contains_key(&occurrence.component) {
            return Err(SceneError::UnknownComponent {
                occurrence: occurrence.token,
                component: occurrence.component,
            });
        }

        let index = self.occurrences.len();
        match &occurrence.parent {
            Some(parent) => {
                if !self.occurrence_index.contains_key(parent) {
                    return Err(SceneError::UnknownParent {
                        occurrence: occurrence.token.clone(),
                        parent: parent.clone(),
                    });
                }
                self.children.entry(parent.clone()).or_default().push(index);
            }
            None => self.roots.push(index),
        }

        self.occurrence_index.insert(occurrence.token.clone(), index);
        self.occurrences.push(occurrence);
        Ok(())
    }

    pub fn add_appearance(&mut self, appearance: AppearanceData) {
        self.appearances.push(appearance);
    }

    pub fn add_material(&mut self, material: MaterialData) {
        self.materials.push(material);
    }

    pub fn add_joint(&mut self, joint: JointData) {
        self.joints.push(joint);
    }

    pub fn add_rigid_group(&mut self, group: RigidGroupData) {
        self.rigid_groups.push(group);
    }

    pub fn set_project(&mut self, project: ProjectInfo) {
        self.project = Some(project);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_component(&self) -> &Component {
        // The root is inserted first by `new` and never removed
        &self.components[0]
    }

    /// Every distinct component definition, root first
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, token: &str) -> Option<&Component> {
        self.component_index
            .get(token)
            .map(|&i| &self.components[i])
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn occurrence(&self, token: &str) -> Option<&Occurrence> {
        self.occurrence_index
            .get(token)
            .map(|&i| &self.occurrences[i])
    }

    /// Occurrences placed directly in the root component
    pub fn root_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.roots.iter().map(|&i| &self.occurrences[i])
    }

    /// Child occurrences of an occurrence
    pub fn children(&self, token: &str) -> impl Iterator<Item = &Occurrence> {
        self.children
            .get(token)
            .into_iter()
            .flat_map(|c| c.iter().map(|&i| &self.occurrences[i]))
    }

    /// The occurrence enclosing `occurrence`, `None` at the root
    pub fn assembly_context(&self, occurrence: &Occurrence) -> Option<&Occurrence> {
        occurrence
            .parent
            .as_deref()
            .and_then(|p| self.occurrence(p))
    }

    /// Ancestors from the direct parent up to the top-level occurrence
    pub fn ancestors<'a>(&'a self, occurrence: &'a Occurrence) -> Vec<&'a Occurrence> {
        let mut chain = Vec::new();
        let mut current = self.assembly_context(occurrence);
        while let Some(occ) = current {
            chain.push(occ);
            current = self.assembly_context(occ);
        }
        chain
    }

    /// Visible means the occurrence and every ancestor are shown
    pub fn is_effectively_visible(&self, occurrence: &Occurrence) -> bool {
        occurrence.visible && self.ancestors(occurrence).iter().all(|a| a.visible)
    }

    pub fn appearances(&self) -> &[AppearanceData] {
        &self.appearances
    }

    pub fn materials(&self) -> &[MaterialData] {
        &self.materials
    }

    pub fn joints(&self) -> &[JointData] {
        &self.joints
    }

    pub fn rigid_groups(&self) -> &[RigidGroupData] {
        &self.rigid_groups
    }

    pub fn attributes(&self) -> &DocumentAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut DocumentAttributes {
        &mut self.attributes
    }

    pub fn project(&self) -> Option<&ProjectInfo> {
        self.project.as_ref()
    }
}
