//! Identification and thumbnail records

use serde::{Deserialize, Serialize};

/// Identification carried by most records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Export-stable identifier
    pub guid: String,
    /// Display name
    pub name: String,
    pub version: u32,
}

impl Info {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            version: crate::INFO_VERSION,
        }
    }
}

/// Preview image embedded in the assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// Image format extension ("png")
    pub extension: String,
    pub transparent: bool,
    /// Encoded image bytes
    pub data: Vec<u8>,
}
