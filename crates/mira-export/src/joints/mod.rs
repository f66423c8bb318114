//! Joint definitions, instances, signals and motors
//!
//! Every export has a `"grounded"` joint owning the parts no other joint
//! moves. Host joints become definitions and instances when their motion
//! maps to the wire format; rigid joints become rigid groups instead.

mod hierarchy;
mod ownership;

use mirabuf::{
    GROUNDED_JOINT, Info, IoType, Joint, JointInstance, JointLimits, JointMotion, Joints, Motor,
    Signal, Signals, WHEEL_KEY,
};

use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::fill::{Fill, touch};
use crate::parts::{is_exported, rigid_joint_group};
use crate::scene::{JointData, JointKind};

pub use hierarchy::build_joint_hierarchy;
pub use ownership::assign_joint_parts;

/// User data key holding the wheel type of a wheel joint
pub const WHEEL_TYPE_KEY: &str = "wheel_type";

/// Populate joint definitions, instances, rigid-joint groups, signals and motors
pub fn populate_joints(
    ctx: &mut ExportContext,
    joints: &mut Joints,
    signals: &mut Signals,
) -> ExportResult<()> {
    touch(&mut joints.info);
    touch(&mut signals.info);
    ctx.progress.set_message("Mapping joints");

    let grounded = ctx.ids.grounded(GROUNDED_JOINT)?;
    joints.joint_definitions.insert(
        grounded.clone(),
        Joint {
            info: Info::new(grounded.clone(), GROUNDED_JOINT),
            ..Default::default()
        },
    );
    joints.joint_instances.insert(
        grounded.clone(),
        JointInstance {
            info: Info::new(grounded.clone(), GROUNDED_JOINT),
            joint_reference: grounded,
            ..Default::default()
        },
    );

    let scene = ctx.scene;
    for joint in scene.joints() {
        ctx.progress.check()?;
        ctx.progress.add_joint();

        if joint.suppressed {
            tracing::debug!("Skipping suppressed joint {}", joint.name);
            continue;
        }

        let motion = match joint.kind {
            JointKind::Rigid => {
                if let Some(group) = rigid_joint_group(ctx, joint)? {
                    joints.rigid_groups.push(group);
                }
                continue;
            }
            JointKind::Revolute => JointMotion::Revolute {
                axis: joint.axis.into(),
                limits: limits(joint),
            },
            JointKind::Slider => JointMotion::Slider {
                axis: joint.axis.into(),
                limits: limits(joint),
            },
            JointKind::Ball => JointMotion::Ball,
            JointKind::Cylindrical | JointKind::PinSlot | JointKind::Planar => {
                tracing::warn!(
                    "Joint {} has unsupported type {:?}, skipping",
                    joint.name,
                    joint.kind
                );
                continue;
            }
        };

        let Some((parent_part, child_part)) = endpoints(ctx, joint)? else {
            tracing::warn!(
                "Joint {} connects a hidden or missing occurrence, skipping",
                joint.name
            );
            continue;
        };

        map_joint(ctx, joint, motion, parent_part, child_part, joints, signals)?;
    }
    Ok(())
}

fn limits(joint: &JointData) -> Option<JointLimits> {
    joint
        .limits
        .map(|[lower, upper]| JointLimits { lower, upper })
}

/// Part keys of both sides; a missing parent means the design root
fn endpoints(ctx: &mut ExportContext, joint: &JointData) -> ExportResult<Option<(String, String)>> {
    let scene = ctx.scene;
    let Some(child) = joint.child_occurrence.as_deref() else {
        return Ok(None);
    };
    if !is_exported(scene, child) {
        return Ok(None);
    }
    let parent_part = match joint.parent_occurrence.as_deref() {
        Some(parent) if parent == child => return Ok(None),
        Some(parent) => {
            if !is_exported(scene, parent) {
                return Ok(None);
            }
            ctx.ids.occurrence_token(parent)?
        }
        None => ctx.ids.component(scene.root_component())?,
    };
    Ok(Some((parent_part, ctx.ids.occurrence_token(child)?)))
}

fn map_joint(
    ctx: &mut ExportContext,
    joint: &JointData,
    motion: JointMotion,
    parent_part: String,
    child_part: String,
    joints: &mut Joints,
    signals: &mut Signals,
) -> ExportResult<()> {
    let options = ctx.options;
    let key = ctx.ids.joint(joint)?;
    let config = options.joint(&joint.token);
    let wheel = options.wheel(&joint.token);

    let mut definition = Joint::default();
    definition.fill(Some(joint), Some(&key));
    definition.motion = motion;
    if let Some(wheel) = wheel {
        definition.user_data.insert(WHEEL_KEY, "true");
        definition
            .user_data
            .insert(WHEEL_TYPE_KEY, wheel.wheel_type.as_str());
    }

    if let Some(config) = config.filter(|c| c.has_motor()) {
        let motor_key = ctx.ids.motor(&key)?;
        joints.motor_definitions.insert(
            motor_key.clone(),
            Motor {
                info: Info::new(motor_key.clone(), format!("{} motor", joint.name)),
                max_velocity: config.speed,
                max_effort: config.force,
            },
        );
        definition.motor_reference = Some(motor_key);
    }

    let mut instance = JointInstance::default();
    instance.fill(Some(joint), Some(&key));
    instance.parent_part = parent_part;
    instance.child_part = child_part;

    let signal_type = config
        .map(|c| c.signal_type)
        .or_else(|| wheel.map(|w| w.signal_type));
    if let Some(device_type) = signal_type.and_then(|s| s.device_type()) {
        let signal_key = ctx.ids.signal(&key)?;
        signals.signal_map.insert(
            signal_key.clone(),
            Signal {
                info: Info::new(signal_key.clone(), joint.name.clone()),
                io: IoType::Output,
                device_type,
            },
        );
        instance.signal_reference = Some(signal_key);
    }

    tracing::debug!(
        "Joint {} ({}) {} -> {}",
        joint.name,
        definition.motion.display_name(),
        instance.parent_part,
        instance.child_part
    );
    joints.joint_definitions.insert(key.clone(), definition);
    joints.joint_instances.insert(key, instance);
    Ok(())
}
