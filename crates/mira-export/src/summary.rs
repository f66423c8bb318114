//! Human-readable report of an assembly

use std::fmt;

use mirabuf::{Assembly, GROUND_NODE, Node};

/// Table sizes and joint tree of an assembly
pub struct ExportSummary<'a> {
    assembly: &'a Assembly,
}

impl<'a> ExportSummary<'a> {
    pub fn new(assembly: &'a Assembly) -> Self {
        Self { assembly }
    }

    fn write_joint(&self, f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth + 1);
        let arrow = if depth == 0 { "|-" } else { "|--->" };
        if node.value == GROUND_NODE {
            writeln!(f, "{}{} ground", indent, arrow)?;
        } else {
            let joints = &self.assembly.data.joints;
            let definition = joints
                .joint_instances
                .get(&node.value)
                .and_then(|i| joints.joint_definitions.get(&i.joint_reference));
            match definition {
                Some(def) => {
                    let wheel = if def.is_wheel() { " wheel: true" } else { "" };
                    writeln!(
                        f,
                        "{}{} {} type: {}{}",
                        indent,
                        arrow,
                        def.info.name,
                        def.motion.display_name(),
                        wheel
                    )?;
                }
                None => writeln!(f, "{}{} {} (missing)", indent, arrow, node.value)?,
            }
        }
        for child in &node.children {
            self.write_joint(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExportSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = &self.assembly.data;
        writeln!(f, "Assembly: {}", self.assembly.info.name)?;
        writeln!(f, "Dynamic: {}", self.assembly.dynamic)?;
        writeln!(f, "Appearances: {}", data.materials.appearances.len())?;
        writeln!(f, "Materials: {}", data.materials.physical_materials.len())?;
        writeln!(f, "Part-Definitions: {}", data.parts.part_definitions.len())?;
        writeln!(f, "Parts: {}", data.parts.part_instances.len())?;
        writeln!(f, "Rigid Groups: {}", data.joints.rigid_groups.len())?;
        writeln!(f, "Signals: {}", data.signals.signal_map.len())?;
        writeln!(f, "Joints: {}", data.joints.joint_definitions.len())?;
        writeln!(f, "Motors: {}", data.joints.motor_definitions.len())?;
        if let Some(thumbnail) = &self.assembly.thumbnail {
            writeln!(f, "Thumbnail: {}x{}", thumbnail.width, thumbnail.height)?;
        }
        writeln!(f, "Joint Hierarchy:")?;
        for node in &self.assembly.joint_hierarchy.nodes {
            self.write_joint(f, node, 0)?;
        }
        Ok(())
    }
}
