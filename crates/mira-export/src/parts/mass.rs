//! Mass and game piece overrides applied after the part tree is built

use mirabuf::{DEFAULT_MATERIAL_KEY, Info, Materials, Parts};

use crate::options::{ExportMode, ExportOptions};

/// Scale definition masses so the placed robot weighs `robot_weight_kg`
pub fn apply_robot_weight(options: &ExportOptions, parts: &mut Parts) {
    if options.export_mode != ExportMode::Robot || options.robot_weight_kg <= 0.0 {
        return;
    }

    let total: f64 = parts
        .part_instances
        .values()
        .filter_map(|i| i.part_definition_reference.as_ref())
        .filter_map(|key| parts.part_definitions.get(key))
        .map(|d| d.physical_data.mass)
        .sum();
    if total <= 0.0 {
        tracing::warn!("Robot has no mass, ignoring weight override");
        return;
    }

    let factor = options.robot_weight_kg as f64 / total;
    for definition in parts.part_definitions.values_mut() {
        scale_mass(&mut definition.physical_data, factor);
    }
    tracing::info!(
        "Scaled robot mass from {:.3} kg to {:.3} kg",
        total,
        options.robot_weight_kg
    );
}

/// Set the mass of each weighted game piece definition in field exports
pub fn apply_gamepiece_weights(options: &ExportOptions, parts: &mut Parts) {
    if options.export_mode != ExportMode::Field {
        return;
    }
    for gamepiece in options.gamepieces.iter().filter(|g| g.weight > 0.0) {
        let Some(key) = parts
            .part_instances
            .get(&gamepiece.occurrence_token)
            .and_then(|i| i.part_definition_reference.clone())
        else {
            tracing::warn!(
                "Game piece {} is not part of the export",
                gamepiece.occurrence_token
            );
            continue;
        };
        if let Some(definition) = parts.part_definitions.get_mut(&key) {
            let physical = &mut definition.physical_data;
            if physical.mass > 0.0 {
                scale_mass(physical, gamepiece.weight as f64 / physical.mass);
            } else {
                physical.mass = gamepiece.weight as f64;
            }
        }
    }
}

/// Give each game piece with a friction setting its own physical material
/// copy, keyed `"{material}_{occurrence}"`, so parts sharing the source
/// material keep their friction.
pub fn apply_gamepiece_friction(
    options: &ExportOptions,
    materials: &mut Materials,
    parts: &mut Parts,
) {
    if options.export_mode != ExportMode::Field {
        return;
    }
    for gamepiece in options.gamepieces.iter().filter(|g| g.friction > 0.0) {
        let Some(instance) = parts.part_instances.get_mut(&gamepiece.occurrence_token) else {
            continue;
        };
        let base = instance
            .physical_material
            .clone()
            .unwrap_or_else(|| DEFAULT_MATERIAL_KEY.to_string());
        let key = format!("{}_{}", base, gamepiece.occurrence_token);
        if materials.physical_materials.contains_key(&key) {
            tracing::warn!("Material {} already exists, keeping it", key);
            continue;
        }
        let Some(source) = materials.physical_materials.get(&base) else {
            continue;
        };

        let mut material = source.clone();
        material.info = Info::new(
            key.clone(),
            format!("{} ({})", source.info.name, instance.info.name),
        );
        material.static_friction = gamepiece.friction;
        material.dynamic_friction = gamepiece.friction;
        materials.physical_materials.insert(key.clone(), material);
        instance.physical_material = Some(key);
    }
}

fn scale_mass(physical: &mut mirabuf::PhysicalProperties, factor: f64) {
    physical.mass *= factor;
    physical.density *= factor;
    physical.inertia = physical.inertia.scaled(factor as f32);
}
