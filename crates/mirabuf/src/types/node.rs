//! Graph nodes used by the design and joint hierarchies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form string metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub data: BTreeMap<String, String>,
}

impl UserData {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

/// Tree node referencing a record by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Key of the referenced part instance or joint instance
    pub value: String,
    pub children: Vec<Node>,
    pub user_data: Option<UserData>,
}

impl Node {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
            user_data: None,
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Depth-first iterator over node values
    pub fn values(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.value.as_str());
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Find a node by value in this subtree
    pub fn find(&self, value: &str) -> Option<&Node> {
        if self.value == value {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(value))
    }
}

/// Container of root nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphContainer {
    pub nodes: Vec<Node>,
}
