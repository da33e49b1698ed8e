//! Cartograph Path Resolution
//!
//! Locations and path templates for walking a management tree.
//!
//! # Core Concepts
//!
//! - [`Location`]: model folder path plus bound name tokens
//! - [`PathResolver`]: turns a fragment's symbolic paths into tree paths
//! - [`PathRole`]: attributes, subfolders, list or create path
//!
//! # Example
//!
//! ```rust
//! use carto_path::{expand_tokens, split_dual_variant, strip_trailing_segments, Location};
//!
//! let (offline, online) = split_dual_variant("/Partition${:s}/%PARTITION%");
//! assert_eq!(online, "/Partitions/%PARTITION%");
//!
//! let mut location = Location::from_folders(&["Partition"]);
//! location.bind("PARTITION", "p1");
//! assert_eq!(expand_tokens(&location, &offline).unwrap(), "/Partition/p1");
//! assert_eq!(strip_trailing_segments("/Partition/p1", 1), "/Partition");
//! ```

#![warn(unreachable_pub)]

mod location;
mod resolver;
mod template;

pub use location::Location;
pub use resolver::{PathResolver, PathRole, ResolvedPaths};
pub use template::{expand_tokens, find_unresolved_tokens, split_dual_variant, strip_trailing_segments, variant_for};

/// Errors resolving a folder path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Symbolic path key not present in the fragment's path table
    #[error("path key '{key}' is not defined for folder {folder}")]
    MissingPathKey {
        /// Model folder path
        folder: String,
        /// Missing key
        key: String,
    },

    /// Placeholders left after substituting the bound tokens
    #[error("unresolved tokens {} in path {path}", tokens.join(", "))]
    UnresolvedTokens {
        /// Template being expanded
        path: String,
        /// Placeholder names without a binding
        tokens: Vec<String>,
    },

    /// Text is not a `/`-separated folder path
    #[error("invalid location '{0}'")]
    InvalidLocation(String),
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
