//! Part definitions and the occurrence tree
//!
//! Definitions are built once per distinct component. Instances are built
//! by walking the occurrence tree from the design root, so every visible
//! occurrence gets exactly one instance and one node.

mod mass;
mod rigid;

use glam::Mat4;
use mirabuf::{
    BoundingBox, InertiaMatrix, Materials, Node, PartDefinition, PartInstance, Parts,
    PhysicalProperties, Transform, TriangleMesh,
};

use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::fill::{Fill, touch};
use crate::kernel::{GeometryKernel, GeometryResult, MeshQuality, component_extent, display_mesh};
use crate::materials::{resolve_appearance, resolve_physical_material};
use crate::options::ExportMode;
use crate::scene::{Body, BodyGeometry, Component, Occurrence, PhysicalData, Scene};

pub use mass::{apply_gamepiece_friction, apply_gamepiece_weights, apply_robot_weight};
pub(crate) use rigid::is_exported;
pub use rigid::{map_rigid_groups, rigid_joint_group};

/// Attribute marking an occurrence that should not collide
pub const COLLISION_OFF_GROUP: &str = "synthesis";
pub const COLLISION_OFF_NAME: &str = "collision_off";

/// Build one part definition per component
pub fn map_components(
    ctx: &mut ExportContext,
    materials: &Materials,
    parts: &mut Parts,
) -> ExportResult<()> {
    touch(&mut parts.info);
    ctx.progress.set_message("Mapping components");

    let scene = ctx.scene;
    for component in scene.components() {
        ctx.progress.check()?;
        ctx.progress.add_component();

        let key = ctx.ids.component(component)?;
        let mut definition = PartDefinition::default();
        definition.fill(Some(component), Some(&key));
        definition.physical_data = physical_properties(ctx, component);
        definition.dynamic = ctx.options.export_mode == ExportMode::Robot;
        if definition.bounding_box.is_none() {
            definition.bounding_box =
                component_extent(component).map(|(min, max)| BoundingBox::new(min, max));
        }

        let material_reference = resolve_physical_material(materials, component.material.as_ref());
        for body in component.visible_bodies() {
            ctx.progress.check()?;
            let mut wire = mirabuf::Body::default();
            wire.fill(Some(body), None);
            wire.part = key.clone();
            wire.appearance_override = resolve_appearance(materials, body.appearance.as_ref());
            wire.triangle_mesh =
                triangle_mesh(ctx.kernel, body, ctx.options.visual_quality, &material_reference);
            definition.bodies.push(wire);
        }

        parts.part_definitions.insert(key, definition);
    }
    Ok(())
}

/// Tessellate or copy one body; failures leave the mesh empty
fn triangle_mesh(
    kernel: &dyn GeometryKernel,
    body: &Body,
    quality: MeshQuality,
    material_reference: &str,
) -> TriangleMesh {
    let mut mesh = TriangleMesh::default();
    mesh.fill(Some(body), None);
    mesh.material_reference = material_reference.to_string();

    let result: GeometryResult<_> = match &body.geometry {
        BodyGeometry::Brep { shape } => kernel.tessellate(body, shape, quality),
        BodyGeometry::Mesh { mesh } => display_mesh(mesh),
    };
    match result {
        Ok(tessellated) => mesh.mesh = tessellated.into_wire(),
        Err(e) => tracing::error!("Failed to mesh body {} ({}): {}", body.token, body.name, e),
    }
    mesh
}

/// Mass properties from the kernel, with inertia filled in from the bounds
fn physical_properties(ctx: &ExportContext, component: &Component) -> PhysicalProperties {
    let data = match ctx.kernel.physical_properties(
        ctx.scene,
        component,
        ctx.options.physical_accuracy,
    ) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(
                "No physical properties for component {}: {}",
                component.name,
                e
            );
            PhysicalData::default()
        }
    };

    let inertia = match data.inertia {
        Some([ixx, ixy, ixz, iyy, iyz, izz]) => InertiaMatrix {
            ixx,
            ixy,
            ixz,
            iyy,
            iyz,
            izz,
        },
        None => component_extent(component)
            .map(|(min, max)| InertiaMatrix::from_bounding_box(data.mass as f32, min, max))
            .unwrap_or_default(),
    };

    PhysicalProperties {
        density: data.density,
        mass: data.mass,
        volume: data.volume,
        area: data.area,
        com: data.center_of_mass.into(),
        inertia,
    }
}

/// World transform: the local transform composed with every assembly context
pub fn world_matrix(scene: &Scene, occurrence: &Occurrence) -> Mat4 {
    let mut matrix = occurrence.local_matrix();
    let mut current = scene.assembly_context(occurrence);
    while let Some(context) = current {
        matrix = context.local_matrix() * matrix;
        current = scene.assembly_context(context);
    }
    matrix
}

/// Build part instances and the design tree rooted at the root component
pub fn build_design_tree(
    ctx: &mut ExportContext,
    materials: &Materials,
    parts: &mut Parts,
) -> ExportResult<Node> {
    ctx.progress.set_message("Building design hierarchy");
    let scene = ctx.scene;
    let root = scene.root_component();
    let key = ctx.ids.component(root)?;

    let mut instance = PartInstance::default();
    instance.fill(Some(root), Some(&key));
    instance.appearance = resolve_appearance(materials, None);
    instance.physical_material = root
        .material
        .as_ref()
        .map(|m| resolve_physical_material(materials, Some(m)));
    if parts.part_definitions.contains_key(&key) {
        instance.part_definition_reference = Some(key.clone());
    }
    parts.part_instances.insert(key.clone(), instance);

    let mut node = Node::new(key);
    for occurrence in scene.root_occurrences() {
        ctx.progress.check()?;
        if occurrence.visible {
            node.children
                .push(parse_occurrence(ctx, occurrence, materials, parts)?);
        }
    }
    Ok(node)
}

fn parse_occurrence(
    ctx: &mut ExportContext,
    occurrence: &Occurrence,
    materials: &Materials,
    parts: &mut Parts,
) -> ExportResult<Node> {
    let scene = ctx.scene;
    ctx.progress.add_occurrence();

    let key = ctx.ids.occurrence(occurrence)?;
    let component = scene.component(&occurrence.component);
    let component_key = match component {
        Some(c) => Some(ctx.ids.component(c)?),
        None => None,
    };

    let mut instance = PartInstance::default();
    instance.fill(Some(occurrence), Some(&key));
    instance.skip_collider = occurrence
        .attribute(COLLISION_OFF_GROUP, COLLISION_OFF_NAME)
        .is_some();
    instance.appearance = resolve_appearance(materials, occurrence.appearance.as_ref());
    instance.physical_material = component
        .and_then(|c| c.material.as_ref())
        .map(|m| resolve_physical_material(materials, Some(m)));
    instance.global_transform = Transform::from_mat4(world_matrix(scene, occurrence));

    if let Some(component_key) = component_key
        && let Some(definition) = parts.part_definitions.get_mut(&component_key)
    {
        if ctx.options.export_mode == ExportMode::Field
            && ctx.options.gamepiece(&occurrence.token).is_some()
        {
            definition.dynamic = true;
        }
        instance.part_definition_reference = Some(component_key);
    }
    parts.part_instances.insert(key.clone(), instance);

    let mut node = Node::new(key);
    for child in scene.children(&occurrence.token) {
        ctx.progress.check()?;
        if child.visible {
            node.children
                .push(parse_occurrence(ctx, child, materials, parts)?);
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::PrimitiveKernel;
    use crate::options::{ExportOptions, GamepieceConfig};
    use crate::progress::{CancelToken, LogSink, ProgressTracker};
    use crate::scene::{BrepShape, MeshData};
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn plate() -> Body {
        Body::brep(
            "plate",
            "Plate",
            BrepShape::Box {
                size: [1.0, 1.0, 0.1],
            },
        )
    }

    fn nested_scene() -> Scene {
        let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
        scene
            .add_component(Component::new("c", "1", "Link").with_body(plate()))
            .unwrap();
        let step = Mat4::from_translation(Vec3::X);
        scene
            .add_occurrence(Occurrence::new("sub1", "Sub1", "c").with_transform(step))
            .unwrap();
        scene
            .add_occurrence(
                Occurrence::new("sub2", "Sub2", "c")
                    .with_parent("sub1")
                    .with_transform(step),
            )
            .unwrap();
        scene
            .add_occurrence(
                Occurrence::new("sub3", "Sub3", "c")
                    .with_parent("sub2")
                    .with_transform(step),
            )
            .unwrap();
        scene
    }

    fn run(scene: &Scene, options: &ExportOptions) -> (Parts, Node) {
        let sink = LogSink;
        let kernel = PrimitiveKernel;
        let progress = ProgressTracker::new(CancelToken::new(), &sink);
        let mut ctx = ExportContext::new(scene, options, &kernel, progress);
        let materials = Materials::default();
        let mut parts = Parts::default();
        map_components(&mut ctx, &materials, &mut parts).unwrap();
        let node = build_design_tree(&mut ctx, &materials, &mut parts).unwrap();
        (parts, node)
    }

    #[test]
    fn test_world_transform_composes_ancestors() {
        let scene = nested_scene();
        let sub3 = scene.occurrence("sub3").unwrap();
        let world = world_matrix(&scene, sub3);
        assert_relative_eq!(world.w_axis.x, 3.0);
        assert_eq!(world.x_axis, Mat4::IDENTITY.x_axis);

        let sub1 = scene.occurrence("sub1").unwrap();
        assert_eq!(world_matrix(&scene, sub1), sub1.local_matrix());
    }

    #[test]
    fn test_rotated_parent_moves_child() {
        let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
        scene.add_component(Component::new("c", "1", "Link")).unwrap();
        scene
            .add_occurrence(
                Occurrence::new("a", "A", "c")
                    .with_transform(Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            )
            .unwrap();
        scene
            .add_occurrence(
                Occurrence::new("b", "B", "c")
                    .with_parent("a")
                    .with_transform(Mat4::from_translation(Vec3::X)),
            )
            .unwrap();
        let world = world_matrix(&scene, scene.occurrence("b").unwrap());
        let origin = world.transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(origin.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tree_and_instances() {
        let scene = nested_scene();
        let (parts, node) = run(&scene, &ExportOptions::default());

        assert_eq!(node.value, "root_r");
        assert_eq!(node.count(), 4);
        assert_eq!(parts.part_instances.len(), 4);
        assert_eq!(parts.part_definitions.len(), 2);

        let sub3 = &parts.part_instances["sub3"];
        assert_eq!(sub3.part_definition_reference.as_deref(), Some("c_1"));
        assert_relative_eq!(sub3.global_transform.translation().x, 3.0);
        assert_relative_eq!(sub3.transform.translation().x, 1.0);
        assert_eq!(sub3.appearance, mirabuf::DEFAULT_MATERIAL_KEY);
    }

    #[test]
    fn test_invisible_subtree_skipped() {
        let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
        scene.add_component(Component::new("c", "1", "Link")).unwrap();
        scene
            .add_occurrence(Occurrence::new("shown", "Shown", "c"))
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("hidden", "Hidden", "c").hidden())
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("under", "Under", "c").with_parent("hidden"))
            .unwrap();

        let (parts, node) = run(&scene, &ExportOptions::default());
        assert!(!parts.part_instances.contains_key("hidden"));
        assert!(!parts.part_instances.contains_key("under"));
        assert!(node.find("hidden").is_none());
        assert!(node.find("shown").is_some());
    }

    #[test]
    fn test_hidden_body_and_bad_mesh() {
        let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
        let broken = Body::mesh(
            "broken",
            "Broken",
            MeshData {
                vertices: vec![[0.0; 3]],
                indices: vec![0, 1, 2],
                ..Default::default()
            },
        );
        scene
            .add_component(
                Component::new("c", "1", "A")
                    .with_body(plate())
                    .with_body(plate().hidden())
                    .with_body(broken),
            )
            .unwrap();
        let (parts, _) = run(&scene, &ExportOptions::default());
        let definition = &parts.part_definitions["c_1"];
        assert_eq!(definition.bodies.len(), 2);
        assert!(!definition.bodies[0].triangle_mesh.mesh.is_empty());
        assert!(definition.bodies[1].triangle_mesh.mesh.is_empty());
        assert_eq!(definition.bodies[0].part, "c_1");
    }

    #[test]
    fn test_collision_off_and_field_gamepiece() {
        let mut scene = Scene::new("Field", Component::new("root", "r", "Root"));
        scene.add_component(Component::new("ball", "1", "Ball")).unwrap();
        scene.add_component(Component::new("wall", "2", "Wall")).unwrap();
        scene
            .add_occurrence(
                Occurrence::new("ball1", "Ball:1", "ball").with_attribute(
                    COLLISION_OFF_GROUP,
                    COLLISION_OFF_NAME,
                    "true",
                ),
            )
            .unwrap();
        scene
            .add_occurrence(Occurrence::new("wall1", "Wall:1", "wall"))
            .unwrap();
        let options = ExportOptions {
            export_mode: ExportMode::Field,
            gamepieces: vec![GamepieceConfig {
                occurrence_token: "ball1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let (parts, _) = run(&scene, &options);
        assert!(parts.part_instances["ball1"].skip_collider);
        assert!(!parts.part_instances["wall1"].skip_collider);
        assert!(parts.part_definitions["ball_1"].dynamic);
        assert!(!parts.part_definitions["wall_2"].dynamic);
    }

    #[test]
    fn test_inertia_derived_from_bounds() {
        let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
        scene
            .add_component(Component::new("c", "1", "Plate").with_body(plate()))
            .unwrap();
        let (parts, _) = run(&scene, &ExportOptions::default());
        let physical = &parts.part_definitions["c_1"].physical_data;
        assert!(physical.mass > 0.0);
        assert!(!physical.inertia.is_zero());
    }
}
