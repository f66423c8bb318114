//! Which parts move with which joint

use std::collections::HashMap;

use mirabuf::{GROUNDED_JOINT, Joints, Parts};

use crate::context::ExportContext;
use crate::error::ExportResult;

/// Fill `parts` of every joint instance
///
/// An occurrence belongs to the nearest joint whose child is the occurrence
/// itself or one of its ancestors. Everything else, including the design
/// root, belongs to the grounded joint.
pub fn assign_joint_parts(
    ctx: &mut ExportContext,
    parts: &Parts,
    joints: &mut Joints,
) -> ExportResult<()> {
    let scene = ctx.scene;

    let mut owners: HashMap<&str, &str> = HashMap::new();
    for (key, instance) in &joints.joint_instances {
        if key == GROUNDED_JOINT {
            continue;
        }
        if let Some(previous) = owners.get(instance.child_part.as_str()) {
            tracing::warn!(
                "Joints {} and {} move the same part {}",
                previous,
                key,
                instance.child_part
            );
            continue;
        }
        owners.insert(instance.child_part.as_str(), key.as_str());
    }

    let mut assigned: HashMap<String, Vec<String>> = HashMap::new();
    let root_key = ctx.ids.component(scene.root_component())?;
    if parts.part_instances.contains_key(&root_key) {
        assigned
            .entry(GROUNDED_JOINT.to_string())
            .or_default()
            .push(root_key);
    }

    for occurrence in scene.occurrences() {
        ctx.progress.check()?;
        if !parts.part_instances.contains_key(&occurrence.token) {
            continue;
        }
        let key = ctx.ids.occurrence(occurrence)?;

        let owner = std::iter::once(occurrence)
            .chain(scene.ancestors(occurrence))
            .find_map(|occ| owners.get(occ.token.as_str()).copied())
            .unwrap_or(GROUNDED_JOINT);
        assigned.entry(owner.to_string()).or_default().push(key);
    }

    for (owner, keys) in assigned {
        if let Some(instance) = joints.joint_instances.get_mut(&owner) {
            instance.parts = keys;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::populate_joints;
    use crate::kernel::PrimitiveKernel;
    use crate::options::ExportOptions;
    use crate::parts::{build_design_tree, map_components};
    use crate::progress::{CancelToken, LogSink, ProgressTracker};
    use crate::scene::{Component, JointData, JointKind, Occurrence, Scene};
    use mirabuf::{Materials, Signals};

    #[test]
    fn test_nested_joints_claim_subtrees() {
        let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
        scene.add_component(Component::new("c", "1", "Part")).unwrap();
        scene
            .add_occurrence(Occurrence::new("base", "base", "c"))
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("arm", "arm", "c"))
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("arm_plate", "arm_plate", "c").with_parent("arm"))
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("hand", "hand", "c").with_parent("arm"))
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("finger", "finger", "c").with_parent("hand"))
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("hidden", "hidden", "c").with_parent("hand").hidden())
            .unwrap();
        scene.add_joint(JointData::new(
            "shoulder",
            "Shoulder",
            JointKind::Revolute,
            "base",
            "arm",
        ));
        scene.add_joint(JointData::new(
            "wrist",
            "Wrist",
            JointKind::Revolute,
            "arm",
            "hand",
        ));

        let sink = LogSink;
        let kernel = PrimitiveKernel;
        let options = ExportOptions::default();
        let progress = ProgressTracker::new(CancelToken::new(), &sink);
        let mut ctx = ExportContext::new(&scene, &options, &kernel, progress);

        let materials = Materials::default();
        let mut parts = Parts::default();
        map_components(&mut ctx, &materials, &mut parts).unwrap();
        build_design_tree(&mut ctx, &materials, &mut parts).unwrap();
        let mut joints = Joints::default();
        let mut signals = Signals::default();
        populate_joints(&mut ctx, &mut joints, &mut signals).unwrap();
        assign_joint_parts(&mut ctx, &parts, &mut joints).unwrap();

        let parts_of = |key: &str| joints.joint_instances[key].parts.clone();
        assert_eq!(parts_of(GROUNDED_JOINT), vec!["root_r", "base"]);
        assert_eq!(parts_of("shoulder"), vec!["arm", "arm_plate"]);
        assert_eq!(parts_of("wrist"), vec!["hand", "finger"]);
    }
}
