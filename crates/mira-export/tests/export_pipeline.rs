//! End-to-end export tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use glam::{Mat4, Vec3};
use mira_export::kernel::PrimitiveKernel;
use mira_export::options::{ExportLocation, ExportMode, JointConfig, SignalType, WheelConfig};
use mira_export::output::BlobSink;
use mira_export::progress::ProgressUpdate;
use mira_export::scene::{
    AppearanceData, Body, BrepShape, Component, EntityRef, JointData, JointKind, MaterialData,
    Occurrence, ProjectInfo, RigidGroupData,
};
use mira_export::{
    CancelToken, ExportOptions, ExportOutcome, ExportTarget, Exporter, ProgressSink, Scene,
};
use mirabuf::{DEFAULT_MATERIAL_KEY, GROUND_NODE, GROUNDED_JOINT};

fn plate(token: &str) -> Body {
    Body::brep(
        token,
        "Plate",
        BrepShape::Box {
            size: [0.5, 0.5, 0.05],
        },
    )
}

fn robot() -> Scene {
    let mut scene = Scene::new("Robot", Component::new("root", "r", "Root"));
    scene.add_appearance(AppearanceData::new("1", "Red", [255, 0, 0, 255]));
    scene.add_material(MaterialData::new("al", "Aluminum", 2700.0));

    scene
        .add_component(
            Component::new("chassis", "1", "Chassis")
                .with_body(plate("c_body").with_appearance(EntityRef::new("Red", "1")))
                .with_body(plate("c_hidden").hidden())
                .with_material(EntityRef::new("Aluminum", "al")),
        )
        .unwrap();
    scene
        .add_component(
            Component::new("wheel", "2", "Wheel")
                .with_body(
                    Body::brep(
                        "w_body",
                        "Tread",
                        BrepShape::Cylinder {
                            radius: 0.1,
                            height: 0.05,
                        },
                    )
                    .with_appearance(EntityRef::new("Chrome", "404")),
                )
                .with_material(EntityRef::new("Rubber", "missing")),
        )
        .unwrap();

    let step = Mat4::from_translation(Vec3::X);
    scene
        .add_occurrence(Occurrence::new("sub1", "Chassis:1", "chassis").with_transform(step))
        .unwrap();
    scene
        .add_occurrence(
            Occurrence::new("sub2", "Chassis:2", "chassis")
                .with_parent("sub1")
                .with_transform(step),
        )
        .unwrap();
    scene
        .add_occurrence(
            Occurrence::new("sub3", "Chassis:3", "chassis")
                .with_parent("sub2")
                .with_transform(step),
        )
        .unwrap();
    scene
        .add_occurrence(Occurrence::new("wheel_l", "Wheel:1", "wheel").with_parent("sub1"))
        .unwrap();
    scene
        .add_occurrence(Occurrence::new("wheel_r", "Wheel:2", "wheel").with_parent("sub1"))
        .unwrap();
    scene
        .add_occurrence(Occurrence::new("spare", "Wheel:3", "wheel").hidden())
        .unwrap();

    scene.add_joint(JointData::new(
        "axle_l",
        "Left Axle",
        JointKind::Revolute,
        "sub1",
        "wheel_l",
    ));
    scene.add_joint(JointData::new(
        "axle_r",
        "Right Axle",
        JointKind::Revolute,
        "sub1",
        "wheel_r",
    ));
    scene.add_rigid_group(RigidGroupData {
        token: "frame".into(),
        name: "Frame".into(),
        occurrences: vec![Some("sub2".into()), Some("sub3".into()), Some("spare".into())],
    });
    scene.add_rigid_group(RigidGroupData {
        token: "lonely".into(),
        name: "Lonely".into(),
        occurrences: vec![Some("sub2".into()), Some("spare".into()), None],
    });
    scene
}

fn options() -> ExportOptions {
    ExportOptions {
        name: "Robot".into(),
        wheels: vec![
            WheelConfig::new("axle_l"),
            WheelConfig {
                signal_type: SignalType::Can,
                ..WheelConfig::new("axle_r")
            },
        ],
        ..Default::default()
    }
}

#[test]
fn test_assembly_contents() {
    let scene = robot();
    let kernel = PrimitiveKernel;
    let assembly = Exporter::new(&kernel)
        .build_assembly(&scene, &options())
        .unwrap();

    assert_eq!(assembly.info.name, "Robot");
    assert!(assembly.dynamic);

    let parts = &assembly.data.parts;
    // Hidden body skipped
    let chassis = &parts.part_definitions["chassis_1"];
    assert_eq!(chassis.bodies.len(), 1);
    assert!(!chassis.bodies[0].triangle_mesh.mesh.is_empty());
    assert_eq!(chassis.bodies[0].appearance_override, "Red_1");
    assert_eq!(
        chassis.bodies[0].triangle_mesh.material_reference,
        "Aluminum_al"
    );

    // Unknown appearance and material fall back to the sentinel
    let wheel = &parts.part_definitions["wheel_2"];
    assert_eq!(wheel.bodies[0].appearance_override, DEFAULT_MATERIAL_KEY);
    assert_eq!(
        wheel.bodies[0].triangle_mesh.material_reference,
        DEFAULT_MATERIAL_KEY
    );
    assert!(
        assembly
            .data
            .materials
            .appearances
            .contains_key(DEFAULT_MATERIAL_KEY)
    );

    // Invisible occurrence absent from instances and tree
    assert!(!parts.part_instances.contains_key("spare"));
    let root = &assembly.design_hierarchy.nodes[0];
    assert_eq!(assembly.design_hierarchy.nodes.len(), 1);
    assert!(root.find("spare").is_none());
    assert_eq!(root.count(), parts.part_instances.len());

    // Root -> Sub1 -> Sub2 -> Sub3 each translated by one along X
    let sub3 = &parts.part_instances["sub3"];
    let world = sub3.global_transform.to_mat4();
    assert_relative_eq!(world.w_axis.x, 3.0);
    assert_relative_eq!(world.w_axis.y, 0.0);
    let (_, rotation, _) = world.to_scale_rotation_translation();
    assert!(rotation.abs_diff_eq(glam::Quat::IDENTITY, 1e-6));
    let sub1 = &parts.part_instances["sub1"];
    assert_eq!(sub1.global_transform, sub1.transform);
}

#[test]
fn test_joints_and_groups() {
    let scene = robot();
    let kernel = PrimitiveKernel;
    let assembly = Exporter::new(&kernel)
        .build_assembly(&scene, &options())
        .unwrap();
    let joints = &assembly.data.joints;

    // Only the group with two visible members survives
    assert_eq!(joints.rigid_groups.len(), 1);
    assert_eq!(joints.rigid_groups[0].occurrences, vec!["sub2", "sub3"]);

    assert!(joints.joint_definitions.contains_key(GROUNDED_JOINT));
    assert!(joints.joint_definitions["axle_l"].is_wheel());
    assert_eq!(joints.joint_instances["axle_l"].parts, vec!["wheel_l"]);
    assert_eq!(
        joints.joint_instances[GROUNDED_JOINT].parts,
        vec!["root_r", "sub1", "sub2", "sub3"]
    );
    assert_eq!(assembly.data.signals.signal_map.len(), 2);

    let ground = &assembly.joint_hierarchy.nodes[0];
    assert_eq!(ground.value, GROUND_NODE);
    assert_eq!(ground.values(), vec![GROUND_NODE, "axle_l", "axle_r"]);
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("robot.mira");
    let scene = robot();
    let kernel = PrimitiveKernel;
    let exporter = Exporter::new(&kernel);

    for compress in [true, false] {
        let options = ExportOptions {
            file_location: path.clone(),
            compress_output: compress,
            ..options()
        };
        let outcome = exporter.export(&scene, &options);
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                target: ExportTarget::File(path.clone()),
                bytes: std::fs::metadata(&path).unwrap().len() as usize,
            }
        );

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(mirabuf::is_compressed(&bytes), compress);
        let decoded = mirabuf::decode(&bytes).unwrap();
        let expected = exporter.build_assembly(&scene, &options).unwrap();
        assert_eq!(decoded, expected);
    }
}

/// Cancels once a chosen counter reaches a limit
struct CancelAfter {
    cancel: CancelToken,
    limit: usize,
    counter: fn(&ProgressUpdate) -> usize,
    seen: AtomicUsize,
}

impl CancelAfter {
    fn new(cancel: &CancelToken, limit: usize, counter: fn(&ProgressUpdate) -> usize) -> Self {
        Self {
            cancel: cancel.clone(),
            limit,
            counter,
            seen: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for CancelAfter {
    fn report(&self, update: &ProgressUpdate) {
        let count = (self.counter)(update);
        self.seen.store(count, Ordering::SeqCst);
        if count >= self.limit {
            self.cancel.cancel();
        }
    }

    fn message(&self, _title: &str, _body: &str) {}
}

/// Export to a temporary file and check nothing was written
fn export_with(scene: &Scene, sink: &CancelAfter, cancel: CancelToken) -> ExportOutcome {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mira");
    let kernel = PrimitiveKernel;
    let options = ExportOptions {
        file_location: path.clone(),
        ..Default::default()
    };
    let outcome = Exporter::new(&kernel)
        .with_progress(sink)
        .with_cancel(cancel)
        .export(scene, &options);
    assert!(!path.exists());
    outcome
}

#[test]
fn test_cancel_after_three_components() {
    let mut scene = Scene::new("Big", Component::new("root", "r", "Root"));
    for i in 0..9 {
        scene
            .add_component(Component::new(format!("c{}", i), "1", format!("Part {}", i)))
            .unwrap();
    }
    assert_eq!(scene.components().len(), 10);

    let cancel = CancelToken::new();
    let sink = CancelAfter::new(&cancel, 3, |u| u.components);
    let outcome = export_with(&scene, &sink, cancel);

    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert_eq!(sink.seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_cancel_during_occurrence_walk() {
    let mut scene = Scene::new("Deep", Component::new("root", "r", "Root"));
    scene
        .add_component(Component::new("c", "1", "Part"))
        .unwrap();
    // o0 -> o1 -> o2 -> o3 -> o4, then o5..o9 at the root
    for i in 0..10 {
        let mut occurrence = Occurrence::new(format!("o{}", i), format!("Part:{}", i), "c");
        if (1..5).contains(&i) {
            occurrence = occurrence.with_parent(format!("o{}", i - 1));
        }
        scene.add_occurrence(occurrence).unwrap();
    }

    let cancel = CancelToken::new();
    let sink = CancelAfter::new(&cancel, 3, |u| u.occurrences);
    let outcome = export_with(&scene, &sink, cancel);

    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert_eq!(sink.seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_cancel_during_joint_mapping() {
    let mut scene = Scene::new("Arm", Component::new("root", "r", "Root"));
    scene
        .add_component(Component::new("c", "1", "Part"))
        .unwrap();
    for i in 0..5 {
        scene
            .add_occurrence(Occurrence::new(format!("o{}", i), format!("Part:{}", i), "c"))
            .unwrap();
    }
    for i in 1..5 {
        scene.add_joint(JointData::new(
            format!("j{}", i),
            format!("Joint {}", i),
            JointKind::Revolute,
            format!("o{}", i - 1),
            format!("o{}", i),
        ));
    }

    let cancel = CancelToken::new();
    let sink = CancelAfter::new(&cancel, 2, |u| u.joints);
    let outcome = export_with(&scene, &sink, cancel);

    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert_eq!(sink.seen.load(Ordering::SeqCst), 2);
}

struct RecordingSink {
    result: Option<String>,
    calls: AtomicUsize,
}

impl BlobSink for RecordingSink {
    fn upload(
        &self,
        project_id: &str,
        folder_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Option<String> {
        assert_eq!((project_id, folder_id, file_name), ("p1", "f1", "Robot.mira"));
        assert!(mirabuf::decode(bytes).is_ok());
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[test]
fn test_upload_outcomes() {
    let mut scene = robot();
    scene.set_project(ProjectInfo {
        id: "p1".into(),
        root_folder_id: "f1".into(),
        valid: true,
    });
    let kernel = PrimitiveKernel;
    let options = ExportOptions {
        export_location: ExportLocation::Upload,
        ..options()
    };

    let ok = RecordingSink {
        result: Some("urn:1".into()),
        calls: AtomicUsize::new(0),
    };
    let outcome = Exporter::new(&kernel)
        .with_blob_sink(&ok)
        .export(&scene, &options);
    assert!(matches!(
        outcome,
        ExportOutcome::Written { target: ExportTarget::Upload(ref handle), .. } if handle == "urn:1"
    ));

    let failing = RecordingSink {
        result: None,
        calls: AtomicUsize::new(0),
    };
    let outcome = Exporter::new(&kernel)
        .with_blob_sink(&failing)
        .with_debug(true)
        .export(&scene, &options);
    assert!(matches!(outcome, ExportOutcome::Failed { ref message } if message.contains("UploadFailed")));
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);

    // No sink configured: generic message outside debug mode
    let outcome = Exporter::new(&kernel).export(&scene, &options);
    assert_eq!(
        outcome,
        ExportOutcome::Failed {
            message: mira_export::exporter::GENERIC_FAILURE.into()
        }
    );
}

#[test]
fn test_host_joint_named_grounded_fails() {
    let mut scene = robot();
    scene.add_joint(JointData::new(
        GROUNDED_JOINT,
        "HostJoint",
        JointKind::Revolute,
        "sub1",
        "sub2",
    ));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("robot.mira");
    let kernel = PrimitiveKernel;
    let options = ExportOptions {
        file_location: path.clone(),
        ..options()
    };

    let outcome = Exporter::new(&kernel).export(&scene, &options);
    assert!(matches!(outcome, ExportOutcome::Failed { .. }));
    assert!(!path.exists());

    let debug = Exporter::new(&kernel).with_debug(true).export(&scene, &options);
    let ExportOutcome::Failed { message } = debug else {
        panic!("expected failure, got {:?}", debug);
    };
    assert!(message.contains("IdentifierCollision"));
}

#[test]
fn test_preferred_units_do_not_change_output() {
    let scene = robot();
    let kernel = PrimitiveKernel;
    let exporter = Exporter::new(&kernel);
    let metric = ExportOptions {
        preferred_units: mira_export::options::PreferredUnits::Metric,
        robot_weight_kg: 20.0,
        ..options()
    };
    let imperial = ExportOptions {
        preferred_units: mira_export::options::PreferredUnits::Imperial,
        ..metric.clone()
    };
    assert_eq!(
        exporter.build_assembly(&scene, &metric).unwrap(),
        exporter.build_assembly(&scene, &imperial).unwrap()
    );
}

#[test]
fn test_field_mode_is_static() {
    let scene = robot();
    let kernel = PrimitiveKernel;
    let options = ExportOptions {
        export_mode: ExportMode::Field,
        ..options()
    };
    let assembly = Exporter::new(&kernel)
        .build_assembly(&scene, &options)
        .unwrap();
    assert!(!assembly.dynamic);
    assert!(
        assembly
            .data
            .parts
            .part_definitions
            .values()
            .all(|d| !d.dynamic)
    );
}

#[test]
fn test_scene_json_round_trip_exports_same() {
    let scene = robot();
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("scene.json");
    scene.save(&path).unwrap();
    let loaded = Scene::load(&path).unwrap();

    let kernel = PrimitiveKernel;
    let exporter = Exporter::new(&kernel);
    let options = ExportOptions {
        joints: vec![JointConfig::new("axle_l").with_motor(10.0, 2.0)],
        ..options()
    };
    assert_eq!(
        exporter.build_assembly(&scene, &options).unwrap(),
        exporter.build_assembly(&loaded, &options).unwrap()
    );
}
