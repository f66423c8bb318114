//! Stable identifiers for exported records
//!
//! Every key written to the assembly comes from [`IdentifierMapper`]. Keys
//! are derived from host tokens, so the same design exports with the same
//! keys. The mapper remembers which source each key was issued for and
//! refuses to hand the same key to two different sources.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{ExportError, ExportResult};
use crate::scene::{Component, JointData, Occurrence};

/// Kind of entity an identifier was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Component,
    Occurrence,
    Joint,
    /// The built-in joint owning every unmoved part
    Grounded,
    Signal,
    Motor,
}

impl Namespace {
    /// Namespaces whose keys must not overlap. Part definitions and part
    /// instances share one id space in the output.
    fn key_space(self) -> u8 {
        match self {
            Namespace::Component | Namespace::Occurrence => 0,
            Namespace::Joint | Namespace::Grounded => 1,
            Namespace::Signal => 2,
            Namespace::Motor => 3,
        }
    }
}

/// Issues and records identifiers for one export
#[derive(Debug, Default)]
pub struct IdentifierMapper {
    /// (namespace, source token) -> key
    issued: HashMap<(Namespace, String), String>,
    /// (key space, key) -> (namespace, source token)
    owners: HashMap<(u8, String), (Namespace, String)>,
}

impl IdentifierMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"{token}_{id}"` of a component
    pub fn component(&mut self, component: &Component) -> ExportResult<String> {
        self.issue(
            Namespace::Component,
            &component.token,
            format!("{}_{}", component.token, component.id),
        )
    }

    /// The occurrence's own token
    pub fn occurrence(&mut self, occurrence: &Occurrence) -> ExportResult<String> {
        self.issue(
            Namespace::Occurrence,
            &occurrence.token,
            occurrence.token.clone(),
        )
    }

    /// Occurrence key from a bare token, for joint and group references
    pub fn occurrence_token(&mut self, token: &str) -> ExportResult<String> {
        self.issue(Namespace::Occurrence, token, token.to_string())
    }

    pub fn joint(&mut self, joint: &JointData) -> ExportResult<String> {
        self.joint_token(&joint.token)
    }

    pub fn joint_token(&mut self, token: &str) -> ExportResult<String> {
        self.issue(Namespace::Joint, token, token.to_string())
    }

    /// Reserve the built-in grounded joint key. A host joint with the same
    /// token is then a collision rather than the same source.
    pub fn grounded(&mut self, key: &str) -> ExportResult<String> {
        self.issue(Namespace::Grounded, key, key.to_string())
    }

    /// Name-based UUID of the joint key
    pub fn signal(&mut self, joint_key: &str) -> ExportResult<String> {
        let key = Uuid::new_v5(&Uuid::NAMESPACE_OID, joint_key.as_bytes()).to_string();
        self.issue(Namespace::Signal, joint_key, key)
    }

    pub fn motor(&mut self, joint_key: &str) -> ExportResult<String> {
        self.issue(Namespace::Motor, joint_key, format!("{}_motor", joint_key))
    }

    /// Previously issued key of a source, if any
    pub fn get(&self, namespace: Namespace, token: &str) -> Option<&str> {
        self.issued
            .get(&(namespace, token.to_string()))
            .map(String::as_str)
    }

    /// Number of keys issued so far
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    fn issue(&mut self, namespace: Namespace, token: &str, key: String) -> ExportResult<String> {
        let source = (namespace, token.to_string());
        if let Some(existing) = self.issued.get(&source) {
            return Ok(existing.clone());
        }

        let slot = (namespace.key_space(), key.clone());
        if let Some((owner_ns, owner)) = self.owners.get(&slot) {
            return Err(ExportError::IdentifierCollision {
                namespace,
                key,
                first: format!("{:?} {}", owner_ns, owner),
                second: format!("{:?} {}", namespace, token),
            });
        }

        self.owners.insert(slot, source.clone());
        self.issued.insert(source, key.clone());
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_and_occurrence_keys_differ() {
        let mut ids = IdentifierMapper::new();
        let component = Component::new("tok", "7", "Arm");
        let occurrence = Occurrence::new("occ", "Arm:1", "tok");
        assert_eq!(ids.component(&component).unwrap(), "tok_7");
        assert_eq!(ids.occurrence(&occurrence).unwrap(), "occ");
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        let mut ids = IdentifierMapper::new();
        let component = Component::new("tok", "7", "Arm");
        let first = ids.component(&component).unwrap();
        let second = ids.component(&component).unwrap();
        assert_eq!(first, second);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get(Namespace::Component, "tok"), Some("tok_7"));
    }

    #[test]
    fn test_collision_is_reported() {
        let mut ids = IdentifierMapper::new();
        // Component "a" with id "b_c" and component "a_b" with id "c" share "a_b_c"
        ids.component(&Component::new("a", "b_c", "One")).unwrap();
        let result = ids.component(&Component::new("a_b", "c", "Two"));
        assert!(matches!(
            result,
            Err(ExportError::IdentifierCollision { ref key, .. }) if key == "a_b_c"
        ));
    }

    #[test]
    fn test_occurrence_token_colliding_with_component_key() {
        let mut ids = IdentifierMapper::new();
        ids.component(&Component::new("c", "1", "Part")).unwrap();
        let result = ids.occurrence(&Occurrence::new("c_1", "Part:1", "c"));
        assert!(matches!(
            result,
            Err(ExportError::IdentifierCollision { .. })
        ));
    }

    #[test]
    fn test_signal_and_motor_keys() {
        let mut ids = IdentifierMapper::new();
        let signal = ids.signal("j1").unwrap();
        assert_eq!(signal, ids.signal("j1").unwrap());
        assert_ne!(signal, ids.signal("j2").unwrap());
        assert!(Uuid::parse_str(&signal).is_ok());
        assert_eq!(ids.motor("j1").unwrap(), "j1_motor");
    }

    #[test]
    fn test_host_joint_cannot_take_grounded_key() {
        let mut ids = IdentifierMapper::new();
        assert_eq!(ids.grounded("grounded").unwrap(), "grounded");
        assert_eq!(ids.grounded("grounded").unwrap(), "grounded");
        let result = ids.joint_token("grounded");
        assert!(matches!(
            result,
            Err(ExportError::IdentifierCollision { namespace: Namespace::Joint, ref key, .. })
                if key == "grounded"
        ));
    }

    #[test]
    fn test_joint_may_share_occurrence_token() {
        let mut ids = IdentifierMapper::new();
        ids.occurrence_token("x").unwrap();
        assert_eq!(ids.joint_token("x").unwrap(), "x");
    }
}
