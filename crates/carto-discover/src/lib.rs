//! Cartograph Discovery
//!
//! Walks a versioned management tree and produces a model document, driven
//! entirely by schema metadata.
//!
//! # Core Concepts
//!
//! - [`TreeSource`]: live or offline tree, addressed by path
//! - [`Discoverer`]: depth-first walk from a [`Location`](carto_path::Location)
//! - [`ModelNode`]: the ordered document being produced
//! - [`HandlerRegistry`]: per-attribute post-processing, e.g. [`ArchivingHandler`]
//!
//! # Example
//!
//! ```rust
//! use carto_discover::{Discoverer, OfflineTree, TreeNode};
//! use carto_path::Location;
//! use carto_schema::SchemaSet;
//! use carto_version::{AccessMode, Target};
//!
//! let schema = SchemaSet::from_yaml_str(r#"
//! folders:
//!   Foo:
//!     wlst_type: Foo
//!     wlst_attributes_path: WP001
//!     wlst_paths:
//!       WP001: /Foo/%FOO%
//!     name_token: FOO
//!     attributes:
//!       Bar:
//!         wlst_type: string
//!         wlst_path: WP001
//! "#).unwrap();
//!
//! let tree = OfflineTree::new(TreeNode::new().with_child(
//!     "Foo",
//!     TreeNode::new().with_child("X", TreeNode::new().with_attribute("Bar", "x")),
//! ));
//!
//! let target = Target::new("12.2.1".parse().unwrap(), AccessMode::Offline);
//! let mut discoverer = Discoverer::new(&schema, tree, target);
//! let document = discoverer.discover(&Location::new()).unwrap();
//! assert!(document.folder_at(&["Foo", "X"]).is_some());
//! ```

#![warn(unreachable_pub)]

mod archive;
mod config;
mod document;
mod error;
mod handler;
mod snapshot;
mod source;
mod walker;

pub use archive::{ArchivingHandler, ArtifactStore};
pub use config::DiscoverConfig;
pub use document::{ModelEntry, ModelNode};
pub use error::{ArchiveError, DiscoverError, Result, SourceError};
pub use handler::{AttributeHandler, HandlerRegistry};
pub use snapshot::{OfflineTree, TreeNode};
pub use source::{Session, TreeSource};
pub use walker::{Discoverer, FolderKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
