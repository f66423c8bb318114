//! Reading and writing options on the host document
//!
//! Options are stored as one JSON document under
//! [`OPTIONS_GROUP`]/[`OPTIONS_NAME`]. Designs saved by older exporters carry
//! one attribute per field under [`LEGACY_GROUP`]; those are consulted for
//! every field the document lacks before falling back to defaults.

use serde_json::{Map, Value};

use super::{ExportOptions, FORMAT_VERSION, OptionsError};
use crate::scene::AttributeStore;

pub const OPTIONS_GROUP: &str = "mirabuf";
pub const OPTIONS_NAME: &str = "export_options";
pub const LEGACY_GROUP: &str = "synthesis";

/// Field name -> legacy attribute name
const LEGACY_FIELDS: &[(&str, &str)] = &[
    ("file_location", "fileLocation"),
    ("name", "name"),
    ("version", "version"),
    ("export_mode", "exportMode"),
    ("joints", "joints"),
    ("wheels", "wheels"),
    ("gamepieces", "gamepieces"),
    ("preferred_units", "preferredUnits"),
    ("robot_weight_kg", "robotWeight"),
    ("friction_override", "frictionOverride"),
    ("friction_override_coeff", "frictionOverrideCoeff"),
    ("compress_output", "compressOutput"),
    ("export_location", "exportLocation"),
    ("visual_quality", "visualQuality"),
    ("physical_accuracy", "physicalCalculationLevel"),
];

impl ExportOptions {
    /// Load options from document attributes, never failing
    pub fn read_from(store: &dyn AttributeStore) -> Self {
        let mut fields = match store.attribute(OPTIONS_GROUP, OPTIONS_NAME) {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    tracing::warn!("Ignoring malformed export options attribute");
                    Map::new()
                }
            },
            None => Map::new(),
        };

        // Drop fields the current layout cannot read
        fields.retain(|name, value| {
            let ok = field_is_valid(name, value);
            if !ok {
                tracing::warn!("Ignoring invalid export option {}", name);
            }
            ok
        });

        let mut legacy = 0;
        for (field, legacy_name) in LEGACY_FIELDS {
            if fields.contains_key(*field) {
                continue;
            }
            let Some(raw) = store.attribute(LEGACY_GROUP, legacy_name) else {
                continue;
            };
            match serde_json::from_str::<Value>(raw) {
                Ok(value) if field_is_valid(field, &value) => {
                    fields.insert(field.to_string(), value);
                    legacy += 1;
                }
                _ => tracing::warn!("Ignoring legacy export option {}", legacy_name),
            }
        }

        if fields.is_empty() {
            tracing::info!("No export options stored, using defaults");
            return Self::default();
        }
        if legacy > 0 {
            tracing::info!("Read {} export options from legacy attributes", legacy);
        }

        match serde_json::from_value::<ExportOptions>(Value::Object(fields)) {
            Ok(mut options) => {
                options.format_version = FORMAT_VERSION;
                options
            }
            Err(e) => {
                tracing::warn!("Failed to read export options: {}", e);
                Self::default()
            }
        }
    }

    /// Store options as a single JSON attribute
    pub fn write_to(&self, store: &mut dyn AttributeStore) -> Result<(), OptionsError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| OptionsError::Serialize(e.to_string()))?;
        store.set_attribute(OPTIONS_GROUP, OPTIONS_NAME, content);
        tracing::debug!("Saved export options");
        Ok(())
    }

    /// Parse a stored options document strictly
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|e| OptionsError::Deserialize(e.to_string()))
    }
}

/// Whether `value` deserializes as the field `name`
fn field_is_valid(name: &str, value: &Value) -> bool {
    let mut single = Map::new();
    single.insert(name.to_string(), value.clone());
    serde_json::from_value::<ExportOptions>(Value::Object(single)).is_ok()
}
