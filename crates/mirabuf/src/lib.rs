//! Mirabuf interchange records
//!
//! This crate contains the message types of the Mirabuf format and the codec
//! that turns an [`Assembly`] into bytes and back:
//! - Assembly: root message (info, thumbnail, data tables, hierarchies)
//! - Parts: part definitions and instances
//! - Materials: appearance and physical material tables
//! - Joints / Signals: kinematic definitions, instances, rigid groups
//! - Codec: binary encoding with optional gzip compression

pub mod assembly;
pub mod codec;
pub mod joint;
pub mod material;
pub mod parts;
pub mod signal;
pub mod types;

pub use assembly::*;
pub use codec::*;
pub use joint::*;
pub use material::*;
pub use parts::*;
pub use signal::*;
pub use types::*;

/// Version written into every [`Info`] record
pub const INFO_VERSION: u32 = 5;

/// File extension of exported assemblies
pub const MIRA_EXTENSION: &str = "mira";
