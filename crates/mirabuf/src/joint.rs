//! Joint definitions, instances, rigid groups and motors

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Info, UserData, Vector3};

/// Key of the sentinel node at the top of the joint hierarchy
pub const GROUND_NODE: &str = "ground";

/// Key of the joint definition/instance owning all unjointed parts
pub const GROUNDED_JOINT: &str = "grounded";

/// User data key flagging a wheel joint
pub const WHEEL_KEY: &str = "wheel";

/// All kinematic data of an assembly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Joints {
    pub info: Info,
    pub joint_definitions: BTreeMap<String, Joint>,
    pub joint_instances: BTreeMap<String, JointInstance>,
    pub rigid_groups: Vec<RigidGroup>,
    pub motor_definitions: BTreeMap<String, Motor>,
}

/// Joint definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub info: Info,
    /// Joint origin in design coordinates
    pub origin: Vector3,
    pub motion: JointMotion,
    pub user_data: UserData,
    /// Key into `Joints::motor_definitions`
    pub motor_reference: Option<String>,
}

impl Joint {
    /// Whether the joint was flagged as a wheel
    pub fn is_wheel(&self) -> bool {
        self.user_data.get(WHEEL_KEY) == Some("true")
    }
}

/// Motion allowed by a joint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum JointMotion {
    /// No relative motion
    #[default]
    Rigid,
    /// Rotation about an axis
    Revolute {
        axis: Vector3,
        limits: Option<JointLimits>,
    },
    /// Translation along an axis
    Slider {
        axis: Vector3,
        limits: Option<JointLimits>,
    },
    /// Free rotation about a point
    Ball,
}

impl JointMotion {
    pub fn display_name(&self) -> &'static str {
        match self {
            JointMotion::Rigid => "Rigid",
            JointMotion::Revolute { .. } => "Revolute",
            JointMotion::Slider { .. } => "Slider",
            JointMotion::Ball => "Ball",
        }
    }
}

/// Position limits (rad or m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub lower: f32,
    pub upper: f32,
}

/// Joint between two part instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointInstance {
    pub info: Info,
    /// Key into `Joints::joint_definitions`
    pub joint_reference: String,
    /// Occurrence guid of the parent side
    pub parent_part: String,
    /// Occurrence guid of the child side
    pub child_part: String,
    /// Occurrence guids moving with this joint
    pub parts: Vec<String>,
    /// Key into `Signals::signal_map`
    pub signal_reference: Option<String>,
}

/// Occurrences simulated as one immovable unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigidGroup {
    pub name: String,
    pub occurrences: Vec<String>,
}

/// Actuator attached to a joint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Motor {
    pub info: Info,
    /// rad/s or m/s
    pub max_velocity: f32,
    /// Nm or N
    pub max_effort: f32,
}
