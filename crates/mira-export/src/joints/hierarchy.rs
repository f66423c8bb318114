//! Kinematic tree rooted at ground

use std::collections::{BTreeMap, BTreeSet};

use mirabuf::{GROUND_NODE, GROUNDED_JOINT, GraphContainer, Joints, Node};

use crate::options::{ExportOptions, JointParent};

/// Build the joint hierarchy
///
/// Configured joints hang under their configured parent joint, wheels and
/// every other joint hang under ground. A parent that is not exported
/// leaves the joint under ground; joints whose parent chain loops are left
/// out.
pub fn build_joint_hierarchy(options: &ExportOptions, joints: &Joints) -> GraphContainer {
    let keys: BTreeSet<&str> = joints
        .joint_instances
        .keys()
        .map(String::as_str)
        .filter(|k| *k != GROUNDED_JOINT)
        .collect();

    let mut parents: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for &key in &keys {
        let parent = match options.joint(key).map(|c| &c.parent) {
            Some(JointParent::Joint(parent)) if options.wheel(key).is_none() => {
                if parent.as_str() != key && keys.contains(parent.as_str()) {
                    Some(parent.as_str())
                } else {
                    tracing::warn!(
                        "Joint {} has unknown parent {}, attaching to ground",
                        key,
                        parent
                    );
                    None
                }
            }
            _ => None,
        };
        parents.insert(key, parent);
    }

    // Drop joints that cannot reach ground
    let reachable: BTreeSet<&str> = keys
        .iter()
        .copied()
        .filter(|&key| {
            let mut seen = BTreeSet::new();
            let mut current = Some(key);
            while let Some(k) = current {
                if !seen.insert(k) {
                    tracing::warn!("Joint {} is part of a parent cycle, skipping", key);
                    return false;
                }
                current = parents.get(k).copied().flatten();
            }
            true
        })
        .collect();

    let mut children: BTreeMap<Option<&str>, Vec<&str>> = BTreeMap::new();
    for &key in &reachable {
        children
            .entry(parents.get(key).copied().flatten())
            .or_default()
            .push(key);
    }

    let mut ground = Node::new(GROUND_NODE);
    ground.children = subtree(None, &children);
    GraphContainer {
        nodes: vec![ground],
    }
}

fn subtree(parent: Option<&str>, children: &BTreeMap<Option<&str>, Vec<&str>>) -> Vec<Node> {
    children
        .get(&parent)
        .map(|keys| {
            keys.iter()
                .map(|&key| {
                    let mut node = Node::new(key);
                    node.children = subtree(Some(key), children);
                    node
                })
                .collect()
        })
        .unwrap_or_default()
}
