//! Document attribute storage

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named string attributes stored on a host document
pub trait AttributeStore {
    fn attribute(&self, group: &str, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, group: &str, name: &str, value: String);
}

/// In-memory attribute bag, grouped by owner id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAttributes {
    groups: BTreeMap<String, BTreeMap<String, String>>,
}

impl DocumentAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeMap::is_empty)
    }

    /// Names stored under a group
    pub fn names(&self, group: &str) -> impl Iterator<Item = &str> {
        self.groups
            .get(group)
            .into_iter()
            .flat_map(|g| g.keys().map(String::as_str))
    }
}

impl AttributeStore for DocumentAttributes {
    fn attribute(&self, group: &str, name: &str) -> Option<&str> {
        self.groups
            .get(group)
            .and_then(|g| g.get(name))
            .map(String::as_str)
    }

    fn set_attribute(&mut self, group: &str, name: &str, value: String) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_round_trip() {
        let mut attrs = DocumentAttributes::new();
        assert!(attrs.is_empty());
        attrs.set_attribute("mirabuf", "a", "1".into());
        attrs.set_attribute("mirabuf", "a", "2".into());
        assert_eq!(attrs.attribute("mirabuf", "a"), Some("2"));
        assert_eq!(attrs.attribute("other", "a"), None);
        assert_eq!(attrs.names("mirabuf").collect::<Vec<_>>(), vec!["a"]);
    }
}
