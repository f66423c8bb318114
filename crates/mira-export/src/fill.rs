//! Copy host entity attributes into wire records
//!
//! Each `Fill` impl copies what a record can take from one kind of host
//! entity. Filling without a source only stamps the info version, which
//! lets the builders create a record slot before its source is known.

use mirabuf::{Color, Info, INFO_VERSION, Transform, Vector3};

use crate::scene::{
    AppearanceData, Body, Component, JointData, MaterialData, Occurrence, RigidGroupData,
};

/// Fill `self` from a host entity, optionally overriding the guid
pub trait Fill<S: ?Sized> {
    fn fill(&mut self, source: Option<&S>, guid: Option<&str>);
}

fn fill_info(info: &mut Info, guid: Option<&str>, default_guid: &str, name: &str) {
    info.version = INFO_VERSION;
    info.guid = guid.unwrap_or(default_guid).to_string();
    info.name = name.to_string();
}

/// Stamp the info version of a record that has no source entity yet
pub fn touch(info: &mut Info) {
    info.version = INFO_VERSION;
}

impl Fill<Component> for mirabuf::PartDefinition {
    fn fill(&mut self, source: Option<&Component>, guid: Option<&str>) {
        let Some(component) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &component.token, &component.name);
        if let Some([min, max]) = component.bounding_box {
            self.bounding_box = Some(mirabuf::BoundingBox::new(min, max));
        }
    }
}

impl Fill<Occurrence> for mirabuf::PartInstance {
    fn fill(&mut self, source: Option<&Occurrence>, guid: Option<&str>) {
        let Some(occurrence) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &occurrence.token, &occurrence.name);
        self.transform = Transform {
            spatial_matrix: occurrence.transform,
        };
        if let Some(appearance) = &occurrence.appearance {
            self.appearance = appearance.key();
        }
    }
}

/// Instance of the design root, which has no occurrence
impl Fill<Component> for mirabuf::PartInstance {
    fn fill(&mut self, source: Option<&Component>, guid: Option<&str>) {
        let Some(component) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &component.token, &component.name);
        self.transform = Transform::IDENTITY;
        self.global_transform = Transform::IDENTITY;
    }
}

impl Fill<Body> for mirabuf::Body {
    fn fill(&mut self, source: Option<&Body>, guid: Option<&str>) {
        let Some(body) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &body.token, &body.name);
        if let Some(appearance) = &body.appearance {
            self.appearance_override = appearance.key();
        }
    }
}

impl Fill<Body> for mirabuf::TriangleMesh {
    fn fill(&mut self, source: Option<&Body>, guid: Option<&str>) {
        let Some(body) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &body.token, &body.name);
        self.has_volume = true;
    }
}

impl Fill<JointData> for mirabuf::Joint {
    fn fill(&mut self, source: Option<&JointData>, guid: Option<&str>) {
        let Some(joint) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &joint.token, &joint.name);
        self.origin = Vector3::from(joint.origin);
    }
}

impl Fill<JointData> for mirabuf::JointInstance {
    fn fill(&mut self, source: Option<&JointData>, guid: Option<&str>) {
        let Some(joint) = source else {
            touch(&mut self.info);
            return;
        };
        fill_info(&mut self.info, guid, &joint.token, &joint.name);
        self.joint_reference = self.info.guid.clone();
    }
}

impl Fill<RigidGroupData> for mirabuf::RigidGroup {
    fn fill(&mut self, source: Option<&RigidGroupData>, guid: Option<&str>) {
        // Rigid groups carry no info record
        if let Some(group) = source {
            self.name = guid.unwrap_or(&group.token).to_string();
        }
    }
}

impl Fill<AppearanceData> for mirabuf::Appearance {
    fn fill(&mut self, source: Option<&AppearanceData>, guid: Option<&str>) {
        let Some(appearance) = source else {
            touch(&mut self.info);
            return;
        };
        let key = appearance.key();
        fill_info(&mut self.info, guid, &key, &appearance.name);
        let [r, g, b, a] = appearance.color;
        self.albedo = Color::rgba(r, g, b, a);
        self.roughness = appearance.roughness;
        self.metallic = appearance.metallic;
        self.specular = appearance.specular;
    }
}

impl Fill<MaterialData> for mirabuf::PhysicalMaterial {
    fn fill(&mut self, source: Option<&MaterialData>, guid: Option<&str>) {
        let Some(material) = source else {
            touch(&mut self.info);
            return;
        };
        let key = material.key();
        fill_info(&mut self.info, guid, &key, &material.name);
        self.description = material.description.clone();
        self.density = material.density;
        self.dynamic_friction = material.dynamic_friction;
        self.static_friction = material.static_friction;
        self.restitution = material.restitution;
        self.mechanical = mirabuf::MechanicalProperties {
            young_mod: material.young_modulus,
            poisson_ratio: material.poisson_ratio,
            shear_mod: material.shear_modulus,
        };
        self.strength = mirabuf::StrengthProperties {
            yield_strength: material.yield_strength,
            tensile_strength: material.tensile_strength,
        };
    }
}

/// Assembly info comes from the root component, named after the document
impl Fill<Component> for mirabuf::Assembly {
    fn fill(&mut self, source: Option<&Component>, guid: Option<&str>) {
        let Some(component) = source else {
            touch(&mut self.info);
            return;
        };
        let name = guid.unwrap_or(&component.name);
        fill_info(&mut self.info, guid, &component.token, name);
        self.transform = Transform::IDENTITY;
    }
}
