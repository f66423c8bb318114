//! Root assembly message

use serde::{Deserialize, Serialize};

use crate::joint::Joints;
use crate::material::Materials;
use crate::parts::Parts;
use crate::signal::Signals;
use crate::types::{GraphContainer, Info, Thumbnail, Transform};

/// Root record of a Mirabuf file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub info: Info,
    pub data: AssemblyData,
    /// True for robots, false for static fields
    pub dynamic: bool,
    /// Occurrence tree; one root node for the design
    pub design_hierarchy: GraphContainer,
    /// Kinematic tree rooted at the ground node
    pub joint_hierarchy: GraphContainer,
    pub transform: Transform,
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyData {
    pub parts: Parts,
    pub joints: Joints,
    pub materials: Materials,
    pub signals: Signals,
}
