//! Testing utilities for the Cartograph workspace
//!
//! Shared schema and tree fixtures plus artifact stores for tests.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use carto_discover::{ArchiveError, ArtifactStore, OfflineTree, TreeNode};
use carto_schema::SchemaSet;
use carto_version::{AccessMode, Target};

/// Named collection `Foo` with attribute `Bar`, singleton `Log` below each
/// instance, a single-unknown-name `Realm` and an online-only `Stats`.
pub const FOO_SCHEMA: &str = r#"
folders:
  Foo:
    wlst_type: Foo${:s}
    name_token: FOO
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Foo${:s}/%FOO%
      WP002: /Foo${:s}/%FOO%/Tuning/%FOO%
    attributes:
      Bar:
        wlst_type: string
      Port:
        wlst_type: integer
        default_value: 7001
      Weight:
        wlst_type: double
        default_value: "1.0"
      Active:
        wlst_type: boolean
        default_value: "False"
      Secret:
        wlst_type: password
      Notes:
        - version: "[10,12.2.1)"
          wlst_type: string
        - version: "[12.2.1,)"
          wlst_type: delimited_string[comma]
      Tuning:
        wlst_type: string
        get_method: GET
        wlst_path: WP002
    folders:
      Log:
        wlst_attributes_path: WP001
        wlst_paths:
          WP001: /Foo${:s}/%FOO%/Log/%FOO%
        attributes:
          FileName:
            wlst_type: string
  Realm:
    name_token: REALM
    single_unpredictable_name: true
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Realm/%REALM%
    attributes:
      Enabled:
        wlst_type: boolean
  Stats:
    wlst_mode: online
    version: "[12.2.1,)"
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Stats
    attributes:
      Count:
        wlst_type: long
"#;

pub fn foo_schema() -> SchemaSet {
    SchemaSet::from_yaml_str(FOO_SCHEMA).unwrap()
}

pub fn target(version: &str, mode: AccessMode) -> Target {
    Target::new(version.parse().unwrap(), mode)
}

pub fn offline_target() -> Target {
    target("12.2.1.4", AccessMode::Offline)
}

/// `Foo` holding instances `X` and `Y`, each with a `Bar` value
pub fn foo_tree() -> TreeNode {
    TreeNode::new().with_child(
        "Foo",
        TreeNode::new()
            .with_child("X", TreeNode::new().with_attribute("Bar", "x"))
            .with_child("Y", TreeNode::new().with_attribute("Bar", "y")),
    )
}

pub fn foo_source() -> OfflineTree {
    OfflineTree::new(foo_tree())
}

/// Tree whose `Realm` folder lists the given instance names
pub fn realm_tree(names: &[&str]) -> TreeNode {
    let realms = names.iter().fold(TreeNode::new(), |realms, name| {
        realms.with_child(*name, TreeNode::new().with_attribute("Enabled", true))
    });
    TreeNode::new().with_child("Realm", realms)
}

/// Store that records every file and names it `files/<file name>`
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub added: Vec<PathBuf>,
}

impl ArtifactStore for MemoryStore {
    fn add_file(&mut self, path: &Path) -> Result<String, ArchiveError> {
        self.added.push(path.to_path_buf());
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Ok(format!("files/{name}"))
    }
}

/// Store that rejects every file
#[derive(Debug, Default)]
pub struct FailingStore;

impl ArtifactStore for FailingStore {
    fn add_file(&mut self, path: &Path) -> Result<String, ArchiveError> {
        Err(ArchiveError::Rejected {
            path: path.to_path_buf(),
            reason: "read-only store".to_string(),
        })
    }
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
