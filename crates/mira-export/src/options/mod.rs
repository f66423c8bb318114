//! Export options
//!
//! One [`ExportOptions`] record holds every per-design setting. It is
//! persisted on the host document (see [`persistence`]) and handed to the
//! exporter unchanged for the duration of a run.

mod persistence;

use std::path::PathBuf;

use mirabuf::DeviceType;
use serde::{Deserialize, Serialize};

use crate::kernel::{CalculationAccuracy, MeshQuality};

pub use persistence::{LEGACY_GROUP, OPTIONS_GROUP, OPTIONS_NAME};

/// Current layout of the persisted options document
pub const FORMAT_VERSION: u32 = 1;

/// Options error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptionsError {
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Whether the design is a robot or a static field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    #[default]
    Robot,
    Field,
}

/// Signal driving a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    #[default]
    Pwm,
    Can,
    /// Not driven
    Passive,
}

impl SignalType {
    /// Wire device type, `None` for passive joints
    pub fn device_type(&self) -> Option<DeviceType> {
        match self {
            SignalType::Pwm => Some(DeviceType::Pwm),
            SignalType::Can => Some(DeviceType::Can),
            SignalType::Passive => None,
        }
    }
}

/// Where a configured joint hangs in the joint hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointParent {
    /// Directly under ground
    #[default]
    Root,
    /// Under another configured joint, by token
    Joint(String),
}

/// Per-joint configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JointConfig {
    pub joint_token: String,
    pub parent: JointParent,
    pub signal_type: SignalType,
    /// rad/s or m/s, 0 when unset
    pub speed: f32,
    /// Nm or N, 0 when unset
    pub force: f32,
}

impl JointConfig {
    pub fn new(joint_token: impl Into<String>) -> Self {
        Self {
            joint_token: joint_token.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = JointParent::Joint(parent.into());
        self
    }

    pub fn with_signal(mut self, signal_type: SignalType) -> Self {
        self.signal_type = signal_type;
        self
    }

    pub fn with_motor(mut self, speed: f32, force: f32) -> Self {
        self.speed = speed;
        self.force = force;
        self
    }

    pub fn has_motor(&self) -> bool {
        self.speed > 0.0 || self.force > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelType {
    #[default]
    Standard,
    Omni,
}

impl WheelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WheelType::Standard => "standard",
            WheelType::Omni => "omni",
        }
    }
}

/// Joint marked as a wheel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub joint_token: String,
    pub wheel_type: WheelType,
    pub signal_type: SignalType,
}

impl WheelConfig {
    pub fn new(joint_token: impl Into<String>) -> Self {
        Self {
            joint_token: joint_token.into(),
            ..Default::default()
        }
    }
}

/// Occurrence simulated as a loose game piece in field exports
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepieceConfig {
    pub occurrence_token: String,
    /// kg
    pub weight: f32,
    /// Friction of the piece's own material copy; 0 keeps the shared one
    pub friction: f32,
}

/// Units the host shows weights in. Display only; exported values are always SI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredUnits {
    Metric,
    #[default]
    Imperial,
}

/// Output target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportLocation {
    /// Blob sink of the active project
    Upload,
    /// Local file at `file_location`
    #[default]
    Download,
}

/// Per-design export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format_version: u32,
    /// Output path for downloads; also the base name of uploads
    pub file_location: PathBuf,
    pub name: String,
    pub version: String,
    pub export_mode: ExportMode,
    pub joints: Vec<JointConfig>,
    pub wheels: Vec<WheelConfig>,
    pub gamepieces: Vec<GamepieceConfig>,
    /// Display setting for the host UI; does not change the output
    pub preferred_units: PreferredUnits,
    /// Always kg regardless of `preferred_units`
    pub robot_weight_kg: f32,
    pub friction_override: bool,
    pub friction_override_coeff: Option<f32>,
    pub compress_output: bool,
    pub export_location: ExportLocation,
    pub visual_quality: MeshQuality,
    pub physical_accuracy: CalculationAccuracy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            file_location: PathBuf::new(),
            name: String::new(),
            version: String::new(),
            export_mode: ExportMode::default(),
            joints: Vec::new(),
            wheels: Vec::new(),
            gamepieces: Vec::new(),
            preferred_units: PreferredUnits::default(),
            robot_weight_kg: 0.0,
            friction_override: false,
            friction_override_coeff: None,
            compress_output: true,
            export_location: ExportLocation::default(),
            visual_quality: MeshQuality::default(),
            physical_accuracy: CalculationAccuracy::default(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn joint(&self, token: &str) -> Option<&JointConfig> {
        self.joints.iter().find(|j| j.joint_token == token)
    }

    pub fn wheel(&self, token: &str) -> Option<&WheelConfig> {
        self.wheels.iter().find(|w| w.joint_token == token)
    }

    pub fn gamepiece(&self, occurrence_token: &str) -> Option<&GamepieceConfig> {
        self.gamepieces
            .iter()
            .find(|g| g.occurrence_token == occurrence_token)
    }

    /// Friction applied to every physical material, if overridden
    pub fn friction_coefficient(&self) -> Option<f32> {
        if self.friction_override {
            self.friction_override_coeff
        } else {
            None
        }
    }

    /// Local output path; falls back to `"{name}.mira"` in the working directory
    pub fn output_path(&self, document_name: &str) -> PathBuf {
        if self.file_location.as_os_str().is_empty() {
            let name = if self.name.is_empty() {
                document_name
            } else {
                self.name.as_str()
            };
            PathBuf::from(format!("{}.{}", name, mirabuf::MIRA_EXTENSION))
        } else {
            self.file_location.clone()
        }
    }

    /// File name used for uploads
    pub fn upload_name(&self, document_name: &str) -> String {
        let base = self
            .file_location
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if self.name.is_empty() {
                    document_name.to_string()
                } else {
                    self.name.clone()
                }
            });
        format!("{}.{}", base, mirabuf::MIRA_EXTENSION)
    }
}
