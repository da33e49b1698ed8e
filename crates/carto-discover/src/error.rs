//! Error types for discovery
//!
//! Provides errors for:
//! - Tree source access ([`SourceError`])
//! - Side-artifact archival ([`ArchiveError`])
//! - A whole discovery pass ([`DiscoverError`])

use std::path::PathBuf;

use carto_path::ResolutionError;
use carto_version::VersionRangeError;

/// Errors reported by a [`crate::TreeSource`]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Path does not exist in the tree
    #[error("no such path: {0}")]
    NoSuchPath(String),

    /// Attribute does not exist at the path
    #[error("no attribute {attribute} at {path}")]
    NoSuchAttribute { path: String, attribute: String },

    /// Connection or transport failure
    #[error("tree access failed at {path}: {message}")]
    Transport { path: String, message: String },

    /// Snapshot file could not be read
    #[error("failed to read tree snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file could not be parsed
    #[error("malformed tree snapshot {path}: {message}")]
    Snapshot { path: String, message: String },
}

impl SourceError {
    /// Create transport error for path
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors storing a side artifact
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// File could not be read or written
    #[error("io error archiving {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store refused the file
    #[error("cannot archive {path}: {reason}")]
    Rejected { path: PathBuf, reason: String },
}

/// Fatal errors of a discovery pass
///
/// Every variant raised during traversal carries `context`, the folders and
/// instance names leading to the failure (e.g. `Server AdminServer SSL`),
/// and `folder`, the model folder path.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Path template could not be resolved
    #[error("{context} ({folder}): {source}")]
    Resolution {
        context: String,
        folder: String,
        #[source]
        source: ResolutionError,
    },

    /// Single-instance folder has several live instances
    #[error("{context} ({folder}): expected at most one instance but found {count}")]
    Cardinality {
        context: String,
        folder: String,
        count: usize,
    },

    /// Tree source failed while navigating or reading
    #[error("{context} ({folder}): {source}")]
    Source {
        context: String,
        folder: String,
        #[source]
        source: SourceError,
    },

    /// Configured version or mode is invalid
    #[error("invalid configuration: {0}")]
    VersionRange(#[from] VersionRangeError),

    /// Configuration file could not be used
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DiscoverError {
    /// Descriptive location of a traversal error
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Resolution { context, .. }
            | Self::Cardinality { context, .. }
            | Self::Source { context, .. } => Some(context),
            Self::VersionRange(_) | Self::Config(_) => None,
        }
    }
}

/// Result type for discovery
pub type Result<T> = std::result::Result<T, DiscoverError>;
