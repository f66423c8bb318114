//! Appearance and physical material tables

use mirabuf::{Appearance, DEFAULT_MATERIAL_KEY, Materials, PhysicalMaterial};

use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::fill::{Fill, touch};
use crate::options::ExportOptions;
use crate::progress::ProgressTracker;
use crate::scene::{AppearanceData, EntityRef, MaterialData};

/// Neutral grey appearance behind the `"default"` key
fn default_appearance() -> Appearance {
    Appearance {
        info: mirabuf::Info::new(DEFAULT_MATERIAL_KEY, DEFAULT_MATERIAL_KEY),
        roughness: 0.5,
        metallic: 0.0,
        specular: 0.5,
        ..Default::default()
    }
}

/// Generic physical material behind the `"default"` key
fn default_physical_material() -> PhysicalMaterial {
    PhysicalMaterial {
        info: mirabuf::Info::new(DEFAULT_MATERIAL_KEY, DEFAULT_MATERIAL_KEY),
        description: "Default material".to_string(),
        density: 2.0,
        dynamic_friction: 0.5,
        static_friction: 0.5,
        restitution: 0.5,
        ..Default::default()
    }
}

/// Build the appearance table; the first entry wins for duplicate keys
pub fn map_appearances(
    appearances: &[AppearanceData],
    materials: &mut Materials,
    progress: &mut ProgressTracker,
) -> ExportResult<()> {
    touch(&mut materials.info);
    materials
        .appearances
        .insert(DEFAULT_MATERIAL_KEY.to_string(), default_appearance());

    for data in appearances {
        progress.check()?;
        progress.add_material();

        let key = data.key();
        if materials.appearances.contains_key(&key) {
            tracing::debug!("Duplicate appearance {}", key);
            continue;
        }
        let mut appearance = Appearance::default();
        appearance.fill(Some(data), Some(&key));
        materials.appearances.insert(key, appearance);
    }
    Ok(())
}

/// Build the physical material table, applying the friction override
pub fn map_physical_materials(
    source: &[MaterialData],
    options: &ExportOptions,
    materials: &mut Materials,
    progress: &mut ProgressTracker,
) -> ExportResult<()> {
    touch(&mut materials.info);
    let friction = options.friction_coefficient();

    let mut default = default_physical_material();
    if let Some(coeff) = friction {
        default.static_friction = coeff;
        default.dynamic_friction = coeff;
    }
    materials
        .physical_materials
        .insert(DEFAULT_MATERIAL_KEY.to_string(), default);

    for data in source {
        progress.check()?;
        progress.add_material();

        let key = data.key();
        if materials.physical_materials.contains_key(&key) {
            tracing::debug!("Duplicate physical material {}", key);
            continue;
        }
        let mut material = PhysicalMaterial::default();
        material.fill(Some(data), Some(&key));
        if let Some(coeff) = friction {
            material.static_friction = coeff;
            material.dynamic_friction = coeff;
        }
        materials.physical_materials.insert(key, material);
    }
    Ok(())
}

/// Appearance key if present in the table, else `"default"`
pub fn resolve_appearance(materials: &Materials, reference: Option<&EntityRef>) -> String {
    reference
        .map(EntityRef::key)
        .filter(|key| materials.appearances.contains_key(key))
        .unwrap_or_else(|| DEFAULT_MATERIAL_KEY.to_string())
}

/// Physical material key if present in the table, else `"default"`
pub fn resolve_physical_material(materials: &Materials, reference: Option<&EntityRef>) -> String {
    reference
        .map(EntityRef::key)
        .filter(|key| materials.physical_materials.contains_key(key))
        .unwrap_or_else(|| DEFAULT_MATERIAL_KEY.to_string())
}

/// Map both tables from the scene
pub fn map_materials(ctx: &mut ExportContext, materials: &mut Materials) -> ExportResult<()> {
    let scene = ctx.scene;
    ctx.progress.set_message("Mapping materials");
    map_appearances(scene.appearances(), materials, &mut ctx.progress)?;
    map_physical_materials(scene.materials(), ctx.options, materials, &mut ctx.progress)?;
    tracing::debug!(
        "Mapped {} appearances, {} physical materials",
        materials.appearances.len(),
        materials.physical_materials.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::progress::{CancelToken, LogSink};

    #[test]
    fn test_appearances_dedup_and_default() {
        let sink = LogSink;
        let mut progress = ProgressTracker::new(CancelToken::new(), &sink);
        let mut materials = Materials::default();
        let source = vec![
            AppearanceData::new("1", "Red", [255, 0, 0, 255]),
            AppearanceData::new("1", "Red", [0, 255, 0, 255]),
            AppearanceData::new("2", "Red", [0, 0, 255, 255]),
        ];
        map_appearances(&source, &mut materials, &mut progress).unwrap();

        assert_eq!(materials.appearances.len(), 3);
        assert!(materials.appearances.contains_key(DEFAULT_MATERIAL_KEY));
        assert_eq!(materials.appearances["Red_1"].albedo.r, 255);
        assert_eq!(materials.appearances["Red_2"].albedo.b, 255);
    }

    #[test]
    fn test_friction_override_applies_to_all() {
        let sink = LogSink;
        let mut progress = ProgressTracker::new(CancelToken::new(), &sink);
        let mut materials = Materials::default();
        let options = ExportOptions {
            friction_override: true,
            friction_override_coeff: Some(0.9),
            ..Default::default()
        };
        let source = vec![MaterialData::new("s", "Steel", 7850.0)];
        map_physical_materials(&source, &options, &mut materials, &mut progress).unwrap();

        for material in materials.physical_materials.values() {
            assert_eq!(material.static_friction, 0.9);
            assert_eq!(material.dynamic_friction, 0.9);
        }
        assert_eq!(materials.physical_materials["Steel_s"].density, 7850.0);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let mut materials = Materials::default();
        materials
            .appearances
            .insert("Red_1".into(), Appearance::default());
        assert_eq!(
            resolve_appearance(&materials, Some(&EntityRef::new("Red", "1"))),
            "Red_1"
        );
        assert_eq!(
            resolve_appearance(&materials, Some(&EntityRef::new("Blue", "2"))),
            DEFAULT_MATERIAL_KEY
        );
        assert_eq!(resolve_physical_material(&materials, None), DEFAULT_MATERIAL_KEY);
    }

    #[test]
    fn test_cancel_while_mapping() {
        let sink = LogSink;
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut progress = ProgressTracker::new(cancel, &sink);
        progress.start("Robot", 0, 0, 1);
        let mut materials = Materials::default();
        let source = vec![AppearanceData::new("1", "Red", [255, 0, 0, 255])];
        let result = map_appearances(&source, &mut materials, &mut progress);
        assert!(matches!(result, Err(ExportError::Cancelled)));
    }
}
