//! Offline tree snapshot
//!
//! [`OfflineTree`] serves a management tree captured as a nested document:
//!
//! ```yaml
//! children:
//!   Servers:
//!     children:
//!       AdminServer:
//!         attributes:
//!           ListenPort: 7001
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use carto_coerce::RawValue;

use crate::{SourceError, TreeSource};

/// One folder of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeNode {
    /// Attribute values in listing order
    #[serde(default)]
    pub attributes: IndexMap<String, RawValue>,
    /// Child folders in listing order
    #[serde(default)]
    pub children: IndexMap<String, TreeNode>,
}

impl TreeNode {
    /// Empty node
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// With child folder
    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, child: TreeNode) -> Self {
        self.children.insert(name.into(), child);
        self
    }
}

/// Tree source over an in-memory snapshot
#[derive(Debug, Clone, Default)]
pub struct OfflineTree {
    root: TreeNode,
    current: String,
}

impl OfflineTree {
    /// Serve `root`
    #[must_use]
    pub fn new(root: TreeNode) -> Self {
        Self {
            root,
            current: "/".to_string(),
        }
    }

    /// Load a snapshot from YAML text
    ///
    /// # Errors
    /// [`SourceError::Snapshot`] if the text is not a snapshot document.
    pub fn from_yaml_str(text: &str) -> Result<Self, SourceError> {
        serde_yaml::from_str(text).map(Self::new).map_err(|e| SourceError::Snapshot {
            path: "<yaml>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a snapshot from JSON text
    ///
    /// # Errors
    /// [`SourceError::Snapshot`] if the text is not a snapshot document.
    pub fn from_json_str(text: &str) -> Result<Self, SourceError> {
        serde_json::from_str(text).map(Self::new).map_err(|e| SourceError::Snapshot {
            path: "<json>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a snapshot file; `.json` is read as JSON, anything else as YAML
    ///
    /// # Errors
    /// [`SourceError::Io`] if the file cannot be read,
    /// [`SourceError::Snapshot`] if it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.map_err(|e| match e {
            SourceError::Snapshot { message, .. } => SourceError::Snapshot {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Path of the cursor
    #[inline]
    #[must_use]
    pub fn current_path(&self) -> &str {
        &self.current
    }

    fn node(&self, path: &str) -> Option<&TreeNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.root, |node, segment| node.children.get(segment))
    }

    fn require(&self, path: &str) -> Result<&TreeNode, SourceError> {
        self.node(path).ok_or_else(|| SourceError::NoSuchPath(path.to_string()))
    }
}

impl TreeSource for OfflineTree {
    fn list_child_names(&mut self, path: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.require(path)?.children.keys().cloned().collect())
    }

    fn list_attributes(&mut self, path: &str) -> Result<IndexMap<String, RawValue>, SourceError> {
        Ok(self.require(path)?.attributes.clone())
    }

    fn get_attribute(&mut self, path: &str, name: &str) -> Result<RawValue, SourceError> {
        self.require(path)?
            .attributes
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NoSuchAttribute {
                path: path.to_string(),
                attribute: name.to_string(),
            })
    }

    fn path_exists(&mut self, path: &str) -> Result<bool, SourceError> {
        Ok(self.node(path).is_some())
    }

    fn set_current_path(&mut self, path: &str) -> Result<(), SourceError> {
        self.require(path)?;
        self.current = path.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> OfflineTree {
        OfflineTree::new(
            TreeNode::new().with_child(
                "Servers",
                TreeNode::new()
                    .with_child("ms1", TreeNode::new().with_attribute("ListenPort", 7001))
                    .with_child("ms2", TreeNode::new()),
            ),
        )
    }

    #[test]
    fn offline_list_children_in_order() {
        let mut tree = tree();
        assert_eq!(tree.list_child_names("/Servers").unwrap(), vec!["ms1", "ms2"]);
        assert_eq!(tree.list_child_names("/").unwrap(), vec!["Servers"]);
    }

    #[test]
    fn offline_attributes() {
        let mut tree = tree();
        assert_eq!(tree.list_attributes("/Servers/ms1").unwrap()["ListenPort"], RawValue::Int(7001));
        assert_eq!(tree.get_attribute("/Servers/ms1/", "ListenPort").unwrap(), RawValue::Int(7001));
        assert!(matches!(
            tree.get_attribute("/Servers/ms1", "Missing"),
            Err(SourceError::NoSuchAttribute { .. })
        ));
    }

    #[test]
    fn offline_paths() {
        let mut tree = tree();
        assert!(tree.path_exists("/Servers/ms2").unwrap());
        assert!(!tree.path_exists("/Clusters").unwrap());
        assert!(matches!(tree.set_current_path("/Clusters"), Err(SourceError::NoSuchPath(_))));
        tree.set_current_path("/Servers").unwrap();
        assert_eq!(tree.current_path(), "/Servers");
    }

    #[test]
    fn offline_from_yaml() {
        let mut tree = OfflineTree::from_yaml_str(
            r"
children:
  Servers:
    children:
      AdminServer:
        attributes:
          ListenPort: 7001
          Notes: ~
",
        )
        .unwrap();
        let attributes = tree.list_attributes("/Servers/AdminServer").unwrap();
        assert_eq!(attributes.len(), 2);
        assert!(attributes["Notes"].is_null());
    }

    #[test]
    fn offline_from_yaml_rejects_unknown_keys() {
        assert!(matches!(
            OfflineTree::from_yaml_str("kids: {}"),
            Err(SourceError::Snapshot { .. })
        ));
    }
}
