//! Model document
//!
//! Provides [`ModelNode`], an insertion-ordered mapping from model keys to
//! canonical values or nested nodes.

use indexmap::IndexMap;
use serde::Serialize;

use carto_coerce::ModelValue;

/// Value or nested folder stored under a model key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelEntry {
    /// Attribute value
    Value(ModelValue),
    /// Folder, or instance of a named folder
    Folder(ModelNode),
}

/// One level of the model document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelNode {
    entries: IndexMap<String, ModelEntry>,
}

impl ModelNode {
    /// Empty node
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the node has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry under `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ModelEntry> {
        self.entries.get(key)
    }

    /// Attribute value under `key`
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&ModelValue> {
        match self.entries.get(key)? {
            ModelEntry::Value(value) => Some(value),
            ModelEntry::Folder(_) => None,
        }
    }

    /// Nested node under `key`
    #[must_use]
    pub fn folder(&self, key: &str) -> Option<&ModelNode> {
        match self.entries.get(key)? {
            ModelEntry::Folder(node) => Some(node),
            ModelEntry::Value(_) => None,
        }
    }

    /// Nested node at a key path, e.g. `["Server", "AdminServer", "SSL"]`
    #[must_use]
    pub fn folder_at(&self, keys: &[&str]) -> Option<&ModelNode> {
        keys.iter().try_fold(self, |node, key| node.folder(key))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Store an attribute value, replacing any earlier entry
    pub fn insert_value(&mut self, key: impl Into<String>, value: ModelValue) {
        self.entries.insert(key.into(), ModelEntry::Value(value));
    }

    /// Attach `node` under `key` unless it is empty
    ///
    /// Returns whether the node was attached.
    pub fn add_folder_if_not_empty(&mut self, key: impl Into<String>, node: ModelNode) -> bool {
        if node.is_empty() {
            return false;
        }
        self.entries.insert(key.into(), ModelEntry::Folder(node));
        true
    }

    /// Remove the entry under `key`
    pub fn remove(&mut self, key: &str) -> Option<ModelEntry> {
        self.entries.shift_remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_folder_not_attached() {
        let mut root = ModelNode::new();
        assert!(!root.add_folder_if_not_empty("Cluster", ModelNode::new()));
        assert!(root.is_empty());
    }

    #[test]
    fn nested_lookup() {
        let mut ssl = ModelNode::new();
        ssl.insert_value("Enabled", ModelValue::Bool(true));
        let mut server = ModelNode::new();
        server.add_folder_if_not_empty("SSL", ssl);
        let mut root = ModelNode::new();
        root.add_folder_if_not_empty("AdminServer", server);

        let found = root.folder_at(&["AdminServer", "SSL"]).unwrap();
        assert_eq!(found.value("Enabled"), Some(&ModelValue::Bool(true)));
        assert!(root.value("AdminServer").is_none());
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut node = ModelNode::new();
        node.insert_value("b", ModelValue::Int(1));
        node.insert_value("a", ModelValue::String("x".into()));
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"b":1,"a":"x"}"#);
    }

    #[test]
    fn remove_keeps_order() {
        let mut node = ModelNode::new();
        node.insert_value("a", ModelValue::Int(1));
        node.insert_value("b", ModelValue::Int(2));
        node.insert_value("c", ModelValue::Int(3));
        node.remove("b");
        assert_eq!(node.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
