//! Cartograph Version Algebra
//!
//! Product versions, version ranges and access-mode scoping used to decide
//! which schema fragments apply to a connected system.
//!
//! # Core Concepts
//!
//! - [`Version`]: dotted numeric version with zero-padded comparison
//! - [`VersionRange`]: `[low,high)` interval with inclusive/exclusive bounds
//! - [`RangeByMode`]: accumulated coverage per [`AccessMode`]
//! - [`Target`]: the version and mode a discovery pass runs against
//!
//! # Example
//!
//! ```rust
//! use carto_version::{VersionRange, Version};
//!
//! let a: VersionRange = "[10,12)".parse().unwrap();
//! let b: VersionRange = "[11,13]".parse().unwrap();
//! assert_eq!(a.merge(&b).to_string(), "[10,13]");
//!
//! let v: Version = "12.2.1".parse().unwrap();
//! assert!(b.contains(&v));
//! ```

#![warn(unreachable_pub)]

mod mode;
mod range;
mod version;

pub use mode::{AccessMode, ModeScope, RangeByMode, Target};
pub use range::{Bound, VersionRange};
pub use version::Version;

/// Errors parsing or combining versions and ranges
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionRangeError {
    /// Range does not start with `[`/`(` or end with `]`/`)`
    #[error("version range '{0}' must start with '[' or '(' and end with ']' or ')'")]
    MissingBracket(String),

    /// Range has more than two bounds
    #[error("version range '{0}' is malformed")]
    Malformed(String),

    /// Version token is not dotted numeric
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    /// Unknown access mode name
    #[error("invalid mode '{0}' (expected offline, online or both)")]
    InvalidMode(String),

    /// Checked merge of ranges with versions between them
    #[error("version ranges {first} and {second} are disjoint")]
    Disjoint {
        /// Lower of the two ranges
        first: String,
        /// Higher of the two ranges
        second: String,
    },
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
