//! Cartograph Schema
//!
//! Declarative description of a versioned management tree: which folders
//! exist in which versions, how their paths are templated and how each
//! attribute is typed.
//!
//! # Core Concepts
//!
//! - [`SchemaSet`]: every top-level [`FolderSchema`], loaded once
//! - [`FolderFragment`]: the description of a folder for one version range
//! - [`PathSet`]: symbolic path table plus the attributes/subfolders/list/create role keys
//! - [`AttributeSchema`]: wire name, types and fetch method of one attribute
//!
//! # Document layout
//!
//! ```yaml
//! folders:
//!   Server:
//!     name_token: SERVER
//!     wlst_attributes_path: WP001
//!     wlst_paths:
//!       WP001: /Server/%SERVER%
//!     attributes:
//!       ListenPort:
//!         wlst_type: integer
//! ```
//!
//! Any folder or attribute may instead map to a list of entries, each with
//! its own `version` range and `wlst_mode`.

#![warn(unreachable_pub)]

mod load;
mod model;
mod raw;

pub use model::{AttributeSchema, FetchMethod, FolderFragment, FolderSchema, PathSet, SchemaSet};

/// Errors loading a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema file could not be read
    #[error("failed to read schema {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File extension is not a known schema format
    #[error("unsupported schema format for {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// Malformed YAML document
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document parsed but failed a reference check
    #[error("invalid schema for folder {folder}: {reason}")]
    Invalid {
        /// Model folder path, e.g. `/Server/SSL`
        folder: String,
        /// What failed
        reason: String,
    },
}

/// Result type for schema loading
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
