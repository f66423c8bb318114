//! Rigid groups

use mirabuf::{Joints, RigidGroup};

use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::fill::Fill;
use crate::scene::{JointData, Scene};

/// Emit the root component's rigid groups that keep more than one member
pub fn map_rigid_groups(ctx: &mut ExportContext, joints: &mut Joints) -> ExportResult<()> {
    let scene = ctx.scene;
    for group in scene.rigid_groups() {
        ctx.progress.check()?;

        let mut wire = RigidGroup::default();
        wire.fill(Some(group), None);
        for token in group.occurrences.iter().flatten() {
            if !is_exported(scene, token) {
                continue;
            }
            let key = ctx.ids.occurrence_token(token)?;
            if !wire.occurrences.contains(&key) {
                wire.occurrences.push(key);
            }
        }

        if wire.occurrences.len() > 1 {
            joints.rigid_groups.push(wire);
        } else {
            tracing::debug!(
                "Skipping rigid group {} with {} visible members",
                group.token,
                wire.occurrences.len()
            );
        }
    }
    Ok(())
}

/// Two-member group for a rigid joint, if both sides are exported
pub fn rigid_joint_group(
    ctx: &mut ExportContext,
    joint: &JointData,
) -> ExportResult<Option<RigidGroup>> {
    let scene = ctx.scene;
    let (Some(parent), Some(child)) = (&joint.parent_occurrence, &joint.child_occurrence) else {
        return Ok(None);
    };
    if parent == child || !is_exported(scene, parent) || !is_exported(scene, child) {
        return Ok(None);
    }
    Ok(Some(RigidGroup {
        name: joint.token.clone(),
        occurrences: vec![
            ctx.ids.occurrence_token(parent)?,
            ctx.ids.occurrence_token(child)?,
        ],
    }))
}

/// Present in the scene and visible together with its ancestors
pub(crate) fn is_exported(scene: &Scene, token: &str) -> bool {
    scene
        .occurrence(token)
        .is_some_and(|occ| scene.is_effectively_visible(occ))
}
